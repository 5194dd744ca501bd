//! Tests scientifiques (campagne) : invariants + bases + précédence + limites contrôlées.
//!
//! But : trouver les limites sans faire chauffer la machine.
//! - budget temps global
//! - tailles bornées (profondeur, longueur)
//! - précision limitée quand elle ne sert à rien
//!
//! Notes :
//! - la précédence est vérifiée paire par paire contre la forme parenthésée
//!   équivalente (mêmes résultats, erreurs comprises).
//! - la division tronque : on ne teste (a / b) * b == a que pour des b exacts
//!   (puissances de 2 et de 5).

use std::time::{Duration, Instant};

use pretty_assertions::assert_eq;

use super::erreurs::EvalError;
use super::operateurs::{Arity, Associativity, CATALOGUE};
use super::precision::Precision;
use super::{evaluate, evaluate_with};

fn eval_ok(expr: &str) -> String {
    evaluate(expr).unwrap_or_else(|e| panic!("expr={expr:?} err={e}"))
}

fn assert_eval_eq(expr: &str, attendu: &str) {
    assert_eq!(eval_ok(expr), attendu, "expr={expr:?}");
}

/// Budget global anti-gel.
fn budget(start: Instant, max: Duration) {
    if start.elapsed() > max {
        panic!("budget temps dépassé: {:?}", max);
    }
}

/* ------------------------ Précédence / associativité ------------------------ */

#[test]
fn sci_precedence_paire_par_paire() {
    let binaires: Vec<_> = CATALOGUE
        .iter()
        .copied()
        .filter(|op| op.arity() == Arity::Binary)
        .collect();

    for gauche in &binaires {
        for droite in &binaires {
            let (g, d) = (gauche.symbol(), droite.symbol());
            let brut = format!("6 {g} 3 {d} 2");

            let groupe_gauche = if gauche.precedence() > droite.precedence() {
                true
            } else if gauche.precedence() < droite.precedence() {
                false
            } else {
                gauche.associativity() == Associativity::Left
            };

            let parenthese = if groupe_gauche {
                format!("(6 {g} 3) {d} 2")
            } else {
                format!("6 {g} (3 {d} 2)")
            };

            assert_eq!(evaluate(&brut), evaluate(&parenthese), "{brut} vs {parenthese}");
        }
    }
}

#[test]
fn sci_unaires_avant_binaires() {
    assert_eval_eq("-2 ^^ 2", "4");
    assert_eval_eq("-3! + 1", "-5");
    assert_eval_eq("!0 + !5", "1");
    assert_eval_eq("~0 * 3", "-3");
    assert_eval_eq("2 * -3", "-6");
}

#[test]
fn sci_ternaire_imbrique_profond() {
    let t0 = Instant::now();
    let max = Duration::from_secs(5);

    // 0 ? 0 : 0 ? 0 : ... : 7
    let mut expr = String::new();
    for _ in 0..60 {
        expr.push_str("0 ? 0 : ");
        budget(t0, max);
    }
    expr.push('7');
    assert_eval_eq(&expr, "7");

    // 1 ? (1 ? (... ? 9 : 0) ...) : 0 sans parenthèses
    let mut expr = String::new();
    for _ in 0..40 {
        expr.push_str("1 ? ");
    }
    expr.push('9');
    for _ in 0..40 {
        expr.push_str(" : 0");
    }
    assert_eval_eq(&expr, "9");
}

/* ------------------------ Bases ------------------------ */

#[test]
fn sci_bases_coherentes() {
    for n in [0u64, 1, 7, 8, 15, 16, 31, 255, 256, 4095, 65535, 1 << 40] {
        let dec = n.to_string();
        assert_eval_eq(&format!("0x{n:x}"), &dec);
        assert_eval_eq(&format!("0X{n:X}"), &dec);
        assert_eval_eq(&format!("0b{n:b}"), &dec);
        assert_eval_eq(&format!("0o{n:o}"), &dec);
    }
    assert_eval_eq("0x1F + 0b11111 + 0o37", "93");
}

/* ------------------------ Cohérence arithmétique ------------------------ */

#[test]
fn sci_division_exacte_reversible() {
    for a in ["1", "7", "-12.5", "0.003", "123456789"] {
        for b in ["2", "4", "5", "8", "0.25", "-16"] {
            let q = eval_ok(&format!("{a} / {b}"));
            let retour = eval_ok(&format!("{q} * {b}"));
            assert_eq!(retour, eval_ok(a), "({a} / {b}) * {b}");
        }
    }
}

#[test]
fn sci_division_bornee_par_la_precision() {
    for p in [1usize, 5, 20, 50, 120] {
        let r = evaluate_with("22 / 7", Precision::new(p)).unwrap();
        let chiffres = r.chars().filter(|c| c.is_ascii_digit()).count();
        assert!(chiffres <= p, "p={p} r={r}");
    }
}

#[test]
fn sci_identites_bit_a_bit() {
    for x in ["0", "1", "-1", "42", "-1000", "123456789012345678901234567890"] {
        assert_eval_eq(&format!("~~{x}"), &eval_ok(x));
        assert_eval_eq(&format!("{x} ^ {x}"), "0");
        assert_eval_eq(&format!("{x} & {x}"), &eval_ok(x));
        assert_eval_eq(&format!("({x} << 7) >> 7"), &eval_ok(x));
        assert_eval_eq(&format!("{x} << -3 == {x} >> 3"), "1");
    }
}

#[test]
fn sci_factorielle_frontiere() {
    assert_eval_eq("20!", "2432902008176640000");
    assert!(matches!(evaluate("21!"), Err(EvalError::FactorialRangeError(_))));
    assert!(matches!(evaluate("(0 - 1)!"), Err(EvalError::FactorialRangeError(_))));
    assert_eval_eq("0!", "1");
}

#[test]
fn sci_constantes() {
    assert_eval_eq("pi > 3.14159 && pi < 3.1416", "1");
    assert_eval_eq("e > 2.718 && e < 2.7183", "1");
    assert_eq!(
        evaluate_with("pi", Precision::new(100)).unwrap(),
        "3.141592653589793238462643383279502884197169399375105820974944592307816406286208998628034825342117067"
    );
}

/* ------------------------ Stress contrôlé (sans brûler) ------------------------ */

#[test]
fn sci_stress_somme_plate() {
    let t0 = Instant::now();
    let max = Duration::from_secs(5);

    let mut expr = String::new();
    for k in 0..80 {
        if k > 0 {
            expr.push_str(" + ");
        }
        expr.push_str("1/2");
        budget(t0, max);
    }

    // 80*(1/2)=40
    assert_eval_eq(&expr, "40");
}

#[test]
fn sci_stress_parentheses_profondes() {
    let t0 = Instant::now();
    let max = Duration::from_secs(5);

    let profondeur = 120;
    let expr = format!("{}1{}", "(".repeat(profondeur), " + 1)".repeat(profondeur));
    budget(t0, max);

    assert_eval_eq(&expr, "121");
}

#[test]
fn sci_stress_bigint_safe() {
    let t0 = Instant::now();
    let max = Duration::from_secs(5);

    // gros numérateur contrôlé (100 chiffres)
    let big = "9".repeat(100);
    let r = eval_ok(&format!("{big} / 7 + 1 / 7"));
    budget(t0, max);

    // quotient tronqué à 50 chiffres significatifs ; l’addition reste exacte
    let (entier, frac) = r.split_once('.').unwrap_or_else(|| panic!("r={r}"));
    assert_eq!(entier.len(), 100);
    assert_eq!(&entier[..50], "14285714285714285714285714285714285714285714285714");
    assert!(entier[50..].chars().all(|c| c == '0'));
    assert_eq!(frac, "14285714285714285714285714285714285714285714285714");
}
