//! Calculatrice décimale exacte
//!
//! Évalue des expressions (décimaux, 0b / 0o / 0x, opérateurs unaires,
//! binaires et ternaire, fonctions nommées) sans jamais passer par les
//! flottants pour l’arithmétique : mantisse entière × 10^exposant.
//!
//! ```
//! use calculatrice_decimale::evaluate;
//!
//! assert_eq!(evaluate("2 + 3 * 4").unwrap(), "14");
//! assert_eq!(evaluate("0.1 + 0.2").unwrap(), "0.3");
//! ```

pub mod app;
pub mod noyau;

use std::sync::Once;

pub use noyau::{eval_expression, evaluate, evaluate_number, evaluate_with, Demarche, EvalError, Number, Precision};

static TRACING_INIT: Once = Once::new();

/// Installe le subscriber `tracing` (une seule fois), seulement si RUST_LOG est défini.
/// Ex. : `RUST_LOG=calculatrice_decimale=trace` pour voir chaque réduction.
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{fmt, prelude::*, EnvFilter};

        if std::env::var("RUST_LOG").is_ok() {
            tracing_subscriber::registry()
                .with(fmt::layer().with_target(true).with_level(true).with_writer(std::io::stderr))
                .with(EnvFilter::from_default_env())
                .init();
        }
    });
}
