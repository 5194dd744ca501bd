// src/app.rs
//
// Calculatrice décimale — module App (racine)
// -------------------------------------------
// Rôle:
// - Déclarer les sous-modules (etat.rs + vue.rs)
// - Ré-exporter Session
// - Fournir les boucles interactives :
//   * repl_terminal : éditeur de ligne (historique, ^C abandonne la ligne)
//   * repl          : lecture ligne à ligne (entrée redirigée, tests)
//
// Les boucles ne connaissent ni le noyau ni le format : tout passe par
// Session::traiter_ligne (vue.rs).

pub mod etat;
pub mod vue;

use std::io::{self, BufRead, Write};

use rustyline::{error::ReadlineError, DefaultEditor};

// Ré-export pratique : `use crate::app::Session;`
pub use etat::Session;
pub use vue::Sortie;

const INVITE: &str = "> ";

/// Boucle sur un flux de lignes ; s’arrête sur `:q` ou en fin d’entrée.
pub fn repl<R: BufRead, W: Write>(session: &mut Session, entree: R, mut sortie: W) -> io::Result<()> {
    for ligne in entree.lines() {
        match session.traiter_ligne(&ligne?) {
            Sortie::Quitter => break,
            Sortie::Afficher(texte) if texte.is_empty() => {}
            Sortie::Afficher(texte) => writeln!(sortie, "{texte}")?,
        }
    }

    tracing::debug!("fin de session");
    Ok(())
}

/// Boucle sur un terminal (rustyline) : invite, historique des lignes saisies.
pub fn repl_terminal(session: &mut Session) -> rustyline::Result<()> {
    let mut rl = DefaultEditor::new()?;

    loop {
        match rl.readline(INVITE) {
            Ok(ligne) => {
                if !ligne.trim().is_empty() {
                    let _ = rl.add_history_entry(ligne.as_str());
                }
                match session.traiter_ligne(&ligne) {
                    Sortie::Quitter => break,
                    Sortie::Afficher(texte) if texte.is_empty() => {}
                    Sortie::Afficher(texte) => println!("{texte}"),
                }
            }
            // ^C : ligne abandonnée, la session continue
            Err(ReadlineError::Interrupted) => continue,
            Err(ReadlineError::Eof) => break,
            Err(e) => return Err(e),
        }
    }

    tracing::debug!("fin de session");
    Ok(())
}
