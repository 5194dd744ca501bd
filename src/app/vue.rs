// src/app/vue.rs
//
// Vue (terminal)
// --------------
// Objectifs :
// - Même Session (etat.rs) pour le mode ligne de commande et le mode interactif
// - Une ligne lue = une commande (`:p N`, `:demarche`, `:c`, `:r`, `:q`, `:aide`)
//   ou une expression à évaluer
// - Rendu texte : résultat, ou "erreur: ..." ; démarche sur demande

use std::fmt::Write as _;

use crate::noyau::{eval_expression, fonctions::NOMS_FONCTIONS};

use super::etat::Session;

pub const AIDE: &str = "\
Commandes :
  :p N        précision (chiffres significatifs des divisions)
  :demarche   affiche / masque la démarche
  :c          efface résultat et erreur
  :r          remise à zéro (entrée + résultats ; précision et démarche gardées)
  :q          quitte
Opérateurs : + - * / % ^^ << >> < > <= >= == != & ^ | && || ~ ! ? :
Littéraux  : 12.5  0x1F  0b101  0o17  pi  e";

/// Ce que la boucle doit faire après une ligne.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Sortie {
    /// Texte à afficher (peut être vide).
    Afficher(String),
    Quitter,
}

/// Commande interactive reconnue.
#[derive(Clone, Debug, PartialEq, Eq)]
enum Commande {
    Precision(Option<usize>),
    Demarche,
    Effacer,
    Remettre,
    Quitter,
    Aide,
    Inconnue(String),
}

fn lire_commande(ligne: &str) -> Option<Commande> {
    let reste = ligne.strip_prefix(':')?;
    let mut mots = reste.split_whitespace();
    let nom = mots.next().unwrap_or_default();

    Some(match nom {
        "p" | "precision" => Commande::Precision(mots.next().and_then(|m| m.parse().ok())),
        "demarche" | "d" => Commande::Demarche,
        "c" => Commande::Effacer,
        "r" | "reset" => Commande::Remettre,
        "q" | "quit" => Commande::Quitter,
        "aide" | "h" | "help" => Commande::Aide,
        autre => Commande::Inconnue(autre.to_string()),
    })
}

impl Session {
    /// Traite une ligne (commande ou expression).
    pub fn traiter_ligne(&mut self, ligne: &str) -> Sortie {
        let ligne = ligne.trim();

        if let Some(cmd) = lire_commande(ligne) {
            return match cmd {
                Commande::Quitter => Sortie::Quitter,
                Commande::Precision(Some(n)) => {
                    self.set_precision(n);
                    Sortie::Afficher(format!("précision : {} chiffres", self.precision.chiffres()))
                }
                Commande::Precision(None) => Sortie::Afficher(format!(
                    "précision : {} chiffres (usage : :p N)",
                    self.precision.chiffres()
                )),
                Commande::Demarche => {
                    let etat = if self.basculer_demarche() { "affichée" } else { "masquée" };
                    Sortie::Afficher(format!("démarche {etat}"))
                }
                Commande::Effacer => {
                    self.clear_resultats();
                    Sortie::Afficher(String::new())
                }
                Commande::Remettre => {
                    self.reset_total();
                    Sortie::Afficher("session remise à zéro".into())
                }
                Commande::Aide => Sortie::Afficher(format!(
                    "{AIDE}\nFonctions  : {}",
                    NOMS_FONCTIONS.join(" ")
                )),
                Commande::Inconnue(c) => Sortie::Afficher(format!("commande inconnue ':{c}' (:aide)")),
            };
        }

        if ligne.is_empty() {
            return Sortie::Afficher(String::new());
        }

        self.entree = ligne.to_string();
        self.eval_via_noyau();
        Sortie::Afficher(self.rendu())
    }

    /// Évalue l’entrée via le noyau, puis dépose résultat/erreur/démarche dans l’état.
    pub fn eval_via_noyau(&mut self) -> bool {
        match eval_expression(&self.entree, self.precision) {
            Ok((resultat, demarche)) => {
                self.set_resultat(resultat, demarche);
                true
            }
            Err(e) => {
                self.set_erreur(e.to_string());
                false
            }
        }
    }

    /// Texte à afficher pour le dernier calcul.
    pub fn rendu(&self) -> String {
        if !self.erreur.is_empty() {
            return format!("erreur: {}", self.erreur);
        }

        let mut out = self.resultat.clone();
        if self.afficher_demarche {
            let _ = write!(out, "\n  jetons : {}", self.demarche.jetons);
            for etape in &self.demarche.etapes {
                let _ = write!(out, "\n  {etape}");
            }
        }
        out
    }
}
