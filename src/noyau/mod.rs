//! Noyau décimal exact
//!
//! Organisation interne :
//! - erreurs.rs    : EvalError (toutes les erreurs du noyau)
//! - precision.rs  : précision injectée (défaut 50 chiffres)
//! - nombre.rs     : Number = mantisse × 10^exposant, arithmétique exacte
//! - format.rs     : rendu décimal canonique + liste de jetons
//! - jetons.rs     : tokenisation (jamais d’échec, jetons Invalid)
//! - operateurs.rs : catalogue statique (précédence, associativité, règles)
//! - fonctions.rs  : abs ceil floor ln log min max + constantes pi, e
//! - eval.rs       : réduction par niveaux de précédence

pub mod erreurs;
pub mod eval;
pub mod fonctions;
pub mod format;
pub mod jetons;
pub mod nombre;
pub mod operateurs;
pub mod precision;

#[cfg(test)]
mod tests_scientifiques;

#[cfg(test)]
mod tests_fuzz_safe;

// API publique minimale
pub use erreurs::EvalError;
pub use eval::{eval_expression, evaluate, evaluate_number, evaluate_with, Demarche};
pub use nombre::Number;
pub use precision::Precision;
