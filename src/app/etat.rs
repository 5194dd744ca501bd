//! src/app/etat.rs
//!
//! État de session (sans vue, sans noyau).
//!
//! Rôle : contenir l’état de la calculatrice (entrée, résultat, erreur,
//! précision, démarche) et offrir des opérations simples sans logique d’affichage.
//!
//! Contrats :
//! - Aucune évaluation ici (pas de noyau, pas de parsing d’expression).
//! - Actions déterministes, sans effet de bord caché.
//! - Précision toujours bornée (via `Precision::new`).

use crate::noyau::{Demarche, Precision};

#[derive(Clone, Debug)]
pub struct Session {
    // --- entrée utilisateur ---
    pub entree: String,

    // --- sorties ---
    pub resultat: String, // rendu décimal canonique du dernier succès
    pub erreur: String,   // message d’erreur (si l’évaluation échoue)

    // --- démarche ---
    pub demarche: Demarche,
    pub afficher_demarche: bool,

    // --- paramètres ---
    pub precision: Precision,
}

impl Default for Session {
    fn default() -> Self {
        Self::new(Precision::default())
    }
}

impl Session {
    pub fn new(precision: Precision) -> Self {
        Self {
            entree: String::new(),
            resultat: String::new(),
            erreur: String::new(),
            demarche: Demarche::default(),
            afficher_demarche: false,
            precision,
        }
    }

    /* ------------------------ Actions (état seulement) ------------------------ */

    /// Remise à zéro totale (entrée + résultats), précision et démarche conservées.
    pub fn reset_total(&mut self) {
        self.entree.clear();
        self.clear_resultats();
    }

    /// Efface résultat + erreur + démarche (sans toucher à l’entrée).
    pub fn clear_resultats(&mut self) {
        self.resultat.clear();
        self.erreur.clear();
        self.demarche = Demarche::default();
    }

    /// Place une erreur.
    ///
    /// On CONSERVE `resultat` (dernier succès) pour ne pas perdre l’écran sur
    /// une faute ; la démarche, elle, n’a plus de sens.
    pub fn set_erreur(&mut self, msg: impl Into<String>) {
        self.erreur = msg.into();
        self.demarche = Demarche::default();
    }

    pub fn set_resultat(&mut self, resultat: impl Into<String>, demarche: Demarche) {
        self.erreur.clear();
        self.resultat = resultat.into();
        self.demarche = demarche;
    }

    /// Bornée dans [1, PRECISION_MAX].
    pub fn set_precision(&mut self, chiffres: usize) {
        self.precision = Precision::new(chiffres);
    }

    pub fn basculer_demarche(&mut self) -> bool {
        self.afficher_demarche = !self.afficher_demarche;
        self.afficher_demarche
    }
}
