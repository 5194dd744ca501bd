// src/noyau/format.rs
//
// Affichage
// ---------
// - format_nombre : rendu décimal canonique (pas de notation scientifique,
//   pas de zéros superflus : "5.00" -> "5", ".5" -> "0.5")
// - format_tokens : liste de jetons en texte (démarche / debug)

use num_traits::Signed;

use super::jetons::{Token, TokenKind};
use super::nombre::Number;

/* ------------------------ Nombre -> texte ------------------------ */

/// mantisse × 10^exposant -> texte décimal.
pub fn format_nombre(n: &Number) -> String {
    let negatif = n.mantissa().is_negative();
    let chiffres = n.mantissa().magnitude().to_str_radix(10);
    let e = n.exponent();

    let corps = if e >= 0 {
        let mut s = chiffres;
        s.push_str(&"0".repeat(e as usize));
        s
    } else {
        let apres = e.unsigned_abs() as usize;
        if chiffres.len() > apres {
            let (ent, frac) = chiffres.split_at(chiffres.len() - apres);
            format!("{ent}.{frac}")
        } else {
            format!("0.{}{chiffres}", "0".repeat(apres - chiffres.len()))
        }
    };

    if negatif {
        format!("-{corps}")
    } else {
        corps
    }
}

/* ------------------------ Jetons -> texte ------------------------ */

/// Texte source des jetons, séparés par des espaces.
pub fn format_tokens(tokens: &[Token]) -> String {
    tokens
        .iter()
        .filter(|t| t.kind != TokenKind::Empty)
        .map(|t| t.text.as_str())
        .collect::<Vec<_>>()
        .join(" ")
}
