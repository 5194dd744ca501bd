// src/noyau/fonctions.rs
//
// Fonctions nommées + constantes
// ------------------------------
// Recherche insensible à la casse. Fonctions reconnues :
//   abs(x), ceil(x) / ceiling(x), floor(x), ln(x), log(base, x), min(a, b), max(a, b)
//
// Nom inconnu ou mauvais nombre d’arguments : erreur explicite (pas de zéro
// silencieux). ln/log passent par f64 : résultat approché, pas exact.

use super::erreurs::{EvalError, Resultat};
use super::nombre::Number;
use super::precision::Precision;

/// π et e sur 100 décimales, tronqués à la précision à l’usage.
const PI_100: &str = "3.1415926535897932384626433832795028841971693993751058209749445923078164062862089986280348253421170679";
const E_100: &str = "2.7182818284590452353602874713526624977572470936999595749669676277240766303535475945713821785251664274";

/// Noms acceptés, pour les messages et l’aide de la ligne de commande.
pub const NOMS_FONCTIONS: [&str; 8] = ["abs", "ceil", "ceiling", "floor", "ln", "log", "min", "max"];

/// Constante par nom (pi, e), tronquée à `precision` chiffres significatifs.
pub fn constante(nom: &str, precision: Precision) -> Option<Resultat<Number>> {
    let texte = match nom.to_lowercase().as_str() {
        "pi" => PI_100,
        "e" => E_100,
        _ => return None,
    };
    Some(Number::parse_decimal(texte).map(|n| n.truncate(precision.chiffres())))
}

/// Appel d’une fonction par nom.
pub fn call(nom: &str, args: &[Number], precision: Precision) -> Resultat<Number> {
    let minuscule = nom.to_lowercase();

    let arite = |attendu: usize| -> Resultat<()> {
        if args.len() == attendu {
            Ok(())
        } else {
            Err(EvalError::FunctionArity {
                nom: minuscule.clone(),
                attendu,
                recu: args.len(),
            })
        }
    };

    match minuscule.as_str() {
        "abs" => {
            arite(1)?;
            Ok(args[0].abs())
        }
        "ceil" | "ceiling" => {
            arite(1)?;
            Ok(args[0].ceil())
        }
        "floor" => {
            arite(1)?;
            Ok(args[0].floor())
        }
        "min" => {
            arite(2)?;
            Ok(if args[0] <= args[1] {
                args[0].clone()
            } else {
                args[1].clone()
            })
        }
        "max" => {
            arite(2)?;
            Ok(if args[0] >= args[1] {
                args[0].clone()
            } else {
                args[1].clone()
            })
        }
        "ln" => {
            arite(1)?;
            let x = positif("ln", &args[0])?;
            vers_nombre("ln", &args[0], x.ln(), precision)
        }
        "log" => {
            arite(2)?;
            let base = positif("log", &args[0])?;
            let x = positif("log", &args[1])?;
            if base == 1.0 {
                return Err(domaine("log", &args[0]));
            }
            vers_nombre("log", &args[1], logarithme(base, x), precision)
        }
        _ => Err(EvalError::UnknownFunction(nom.to_string())),
    }
}

/// log_base(x) ; bases 2 et 10 via log2/log10 (exacts sur les puissances).
fn logarithme(base: f64, x: f64) -> f64 {
    if base == 10.0 {
        x.log10()
    } else if base == 2.0 {
        x.log2()
    } else {
        x.ln() / base.ln()
    }
}

fn domaine(nom: &str, valeur: &Number) -> EvalError {
    EvalError::FunctionDomain {
        nom: nom.to_string(),
        valeur: valeur.to_string(),
    }
}

/// Conversion f64 d’un argument strictement positif.
fn positif(nom: &str, valeur: &Number) -> Resultat<f64> {
    valeur
        .to_f64()
        .filter(|x| *x > 0.0)
        .ok_or_else(|| domaine(nom, valeur))
}

fn vers_nombre(nom: &str, argument: &Number, x: f64, precision: Precision) -> Resultat<Number> {
    Number::from_f64(x)
        .map(|n| n.truncate(precision.chiffres()))
        .ok_or_else(|| domaine(nom, argument))
}
