// src/noyau/precision.rs
//
// Précision numérique (nombre maximal de chiffres significatifs d’une division).
// Valeur injectée à chaque évaluation : aucun état global mutable.

/// Précision par défaut (chiffres significatifs).
pub const PRECISION_DEFAUT: usize = 50;

/// Garde-fou : au-delà, une seule division coûte trop cher.
pub const PRECISION_MAX: usize = 10_000;

/// Variable d’environnement lue par `Precision::from_env`.
pub const VAR_PRECISION: &str = "CALC_PRECISION";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Precision(usize);

impl Precision {
    /// Borne dans [1, PRECISION_MAX] : 0 chiffre ne veut rien dire.
    pub fn new(chiffres: usize) -> Self {
        Self(chiffres.clamp(1, PRECISION_MAX))
    }

    pub fn chiffres(self) -> usize {
        self.0
    }

    /// Lit `CALC_PRECISION`; absente ou illisible => défaut.
    pub fn from_env() -> Self {
        std::env::var(VAR_PRECISION)
            .ok()
            .and_then(|s| Self::parse(&s))
            .unwrap_or_default()
    }

    /// "80" -> Some(Precision(80)), bornée. Texte invalide -> None.
    pub fn parse(s: &str) -> Option<Self> {
        s.trim().parse::<usize>().ok().map(Self::new)
    }
}

impl Default for Precision {
    fn default() -> Self {
        Self(PRECISION_DEFAUT)
    }
}
