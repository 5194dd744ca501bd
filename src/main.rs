// src/main.rs
//
// Calculatrice décimale — point d’entrée en ligne de commande
// ------------------------------------------------------------
// Usage :
//   calculatrice_decimale [-p N] [--demarche] [EXPR...]
//
// - Avec EXPR : évalue l’expression (les mots sont joints par des espaces),
//   affiche le résultat, code de sortie 1 en cas d’erreur.
// - Sans EXPR : mode interactif (éditeur de ligne sur un terminal,
//   lecture ligne à ligne sinon ; voir :aide).
// - Précision : -p N, sinon CALC_PRECISION, sinon 50.
// - Traces : RUST_LOG=calculatrice_decimale=debug (sur stderr).

use std::io::{self, IsTerminal};
use std::process::ExitCode;

use clap::Parser;

use calculatrice_decimale::app::{self, vue::AIDE, Session};
use calculatrice_decimale::{init_tracing, Precision};

/// Options de la ligne de commande.
#[derive(Parser, Debug)]
#[command(name = "calculatrice_decimale")]
#[command(about = "Calculatrice décimale exacte")]
#[command(version)]
#[command(after_help = AIDE)]
struct Options {
    /// Chiffres significatifs des divisions (sinon CALC_PRECISION, sinon 50)
    #[arg(short, long, value_parser = lire_precision)]
    precision: Option<Precision>,

    /// Affiche la démarche (jetons lus + réductions)
    #[arg(long)]
    demarche: bool,

    /// Expression à évaluer ; sans elle, mode interactif
    #[arg(trailing_var_arg = true, allow_hyphen_values = true, allow_negative_numbers = true)]
    expression: Vec<String>,
}

fn lire_precision(s: &str) -> Result<Precision, String> {
    Precision::parse(s).ok_or_else(|| format!("précision invalide: '{s}'"))
}

fn main() -> ExitCode {
    init_tracing();

    let opts = Options::parse();

    let mut session = Session::new(opts.precision.unwrap_or_else(Precision::from_env));
    session.afficher_demarche = opts.demarche;

    // --- mode une expression ---
    if !opts.expression.is_empty() {
        session.entree = opts.expression.join(" ");
        if session.eval_via_noyau() {
            println!("{}", session.rendu());
            return ExitCode::SUCCESS;
        }
        eprintln!("{}", session.rendu());
        return ExitCode::FAILURE;
    }

    // --- mode interactif ---
    let stdin = io::stdin();
    let fin = if stdin.is_terminal() {
        app::repl_terminal(&mut session).map_err(|e| e.to_string())
    } else {
        app::repl(&mut session, stdin.lock(), io::stdout().lock()).map_err(|e| e.to_string())
    };

    match fin {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("erreur d’entrée/sortie: {e}");
            ExitCode::FAILURE
        }
    }
}
