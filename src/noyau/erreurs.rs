// src/noyau/erreurs.rs
//
// Erreurs du noyau
// ----------------
// Toutes locales, non réessayables, remontées telles quelles à l’appelant.
// Pas de résultat partiel : une évaluation qui échoue ne produit aucun nombre.

use thiserror::Error;

/// Raccourci utilisé dans tout le noyau.
pub type Resultat<T> = Result<T, EvalError>;

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum EvalError {
    /// Texte de littéral invalide pour sa base.
    #[error("littéral invalide: '{0}'")]
    MalformedLiteral(String),

    /// La suite de jetons ne se réduit pas à un seul nombre.
    #[error("expression invalide: {0}")]
    MalformedExpression(String),

    /// Opérateur sans son (ses) opérande(s).
    #[error("opérande manquante pour '{0}'")]
    MissingOperand(String),

    /// '?' sans ':' correspondant (ou ':' orphelin).
    #[error("ternaire invalide: {0}")]
    MalformedTernary(String),

    #[error("division par zéro")]
    DivisionByZero,

    /// Opération entière (bit à bit, décalage, puissance) sur une valeur fractionnaire.
    #[error("'{operateur}' exige un entier, reçu {valeur}")]
    NonIntegralOperand { operateur: String, valeur: String },

    /// Factorielle hors de [0, 20] ou non entière.
    #[error("factorielle hors domaine: {0}")]
    FactorialRangeError(String),

    #[error("fonction inconnue: '{0}'")]
    UnknownFunction(String),

    #[error("'{nom}' attend {attendu} argument(s), reçu {recu}")]
    FunctionArity {
        nom: String,
        attendu: usize,
        recu: usize,
    },

    /// ln/log hors de leur domaine (ou résultat non représentable).
    #[error("'{nom}' non défini pour {valeur}")]
    FunctionDomain { nom: String, valeur: String },

    /// Décalage ou exposant démesuré.
    #[error("'{operateur}' : opérande hors limites ({valeur})")]
    OperandOutOfRange { operateur: String, valeur: String },
}

impl EvalError {
    pub(crate) fn non_entier(operateur: &str, valeur: impl ToString) -> Self {
        EvalError::NonIntegralOperand {
            operateur: operateur.to_string(),
            valeur: valeur.to_string(),
        }
    }

    pub(crate) fn hors_limites(operateur: &str, valeur: impl ToString) -> Self {
        EvalError::OperandOutOfRange {
            operateur: operateur.to_string(),
            valeur: valeur.to_string(),
        }
    }
}
