//! Tests fuzz safe : robustesse + déterminisme + limites contrôlées.
//!
//! But : marteler le pipeline sans brûler la machine.
//! - RNG déterministe (seed fixe)
//! - profondeur bornée, exposants et décalages petits
//! - budget temps global
//! - on accepte certaines erreurs attendues (division par zéro, factorielle hors
//!   domaine, etc.) mais jamais une erreur de forme : le générateur n’écrit que
//!   des expressions bien formées
//! - invariant clé : évaluer un résultat redonne ce résultat

use std::time::{Duration, Instant};

use super::erreurs::EvalError;
use super::precision::Precision;
use super::{eval_expression, evaluate_with};

/* ------------------------ RNG déterministe minimal ------------------------ */

#[derive(Clone)]
struct Rng {
    state: u64,
}
impl Rng {
    fn new(seed: u64) -> Self {
        Self { state: seed }
    }
    fn next_u32(&mut self) -> u32 {
        // LCG simple (déterministe)
        self.state = self.state.wrapping_mul(6364136223846793005).wrapping_add(1);
        (self.state >> 32) as u32
    }
    fn pick(&mut self, n: u32) -> u32 {
        if n == 0 {
            0
        } else {
            self.next_u32() % n
        }
    }
    fn coin(&mut self) -> bool {
        (self.next_u32() & 1) == 1
    }
    fn choose<'a>(&mut self, items: &[&'a str]) -> &'a str {
        items[self.pick(items.len() as u32) as usize]
    }
}

/* ------------------------ Budget anti-gel ------------------------ */

fn budget(start: Instant, max: Duration) {
    if start.elapsed() > max {
        panic!("budget temps dépassé: {:?}", max);
    }
}

/* ------------------------ Helpers fuzz ------------------------ */

/// Liste blanche : erreurs de *domaine*, normales pour un fuzz.
/// Une erreur de forme trahirait un bug du lexer ou de l’évaluateur.
fn is_erreur_attendue(e: &EvalError) -> bool {
    matches!(
        e,
        EvalError::DivisionByZero
            | EvalError::NonIntegralOperand { .. }
            | EvalError::FactorialRangeError(_)
            | EvalError::OperandOutOfRange { .. }
            | EvalError::FunctionDomain { .. }
    )
}

/* ------------------------ Génération d’expressions (bornée) ------------------------ */

fn gen_litteral(rng: &mut Rng) -> String {
    match rng.pick(8) {
        0 => "0".to_string(),
        1 => format!("{}", rng.pick(10)),
        2 => format!("{}.{}", rng.pick(100), rng.pick(1000)),
        3 => format!("-{}", rng.pick(20)),
        4 => format!("0x{:X}", rng.pick(4096)),
        5 => format!("0b{:b}", rng.pick(64)),
        6 => format!("0o{:o}", rng.pick(512)),
        _ => rng.choose(&["pi", "e", "PI"]).to_string(),
    }
}

fn gen_expr(rng: &mut Rng, depth: usize) -> String {
    if depth == 0 {
        return gen_litteral(rng);
    }
    let d = depth - 1;

    match rng.pick(12) {
        0 => gen_litteral(rng),
        1..=4 => {
            let op = rng.choose(&[
                "+", "-", "*", "/", "%", "<", ">", "<=", ">=", "==", "!=", "&", "^", "|", "&&", "||",
            ]);
            format!("({} {op} {})", gen_expr(rng, d), gen_expr(rng, d))
        }
        5 => {
            // exposant petit : la taille du résultat reste raisonnable
            let k = rng.pick(7) as i64 - 3;
            format!("({} ^^ {k})", gen_expr(rng, d))
        }
        6 => {
            let op = rng.choose(&["<<", ">>"]);
            format!("({} {op} {})", gen_expr(rng, d), rng.pick(9))
        }
        7 => {
            let op = rng.choose(&["-", "+", "~", "!"]);
            format!("{op}({})", gen_expr(rng, d))
        }
        8 => format!("({})!", gen_expr(rng, d)),
        9 => format!(
            "({} ? {} : {})",
            gen_expr(rng, d),
            gen_expr(rng, d),
            gen_expr(rng, d)
        ),
        10 => {
            let f = rng.choose(&["abs", "floor", "ceil", "Ceiling", "ln"]);
            format!("{f}({})", gen_expr(rng, d))
        }
        _ => {
            let f = rng.choose(&["min", "max", "log"]);
            if rng.coin() {
                format!("{f}({}, {})", gen_expr(rng, d), gen_expr(rng, d))
            } else {
                format!("{f}[{}, {{{}}}]", gen_expr(rng, d), gen_expr(rng, d))
            }
        }
    }
}

/* ------------------------ Helper somme balancée anti pile ------------------------ */

fn somme_balancee(terme: &str, n: usize) -> String {
    let mut items: Vec<String> = (0..n).map(|_| terme.to_string()).collect();
    while items.len() > 1 {
        let mut next = Vec::new();
        let mut i = 0;
        while i < items.len() {
            if i + 1 < items.len() {
                next.push(format!("({}+{})", items[i], items[i + 1]));
                i += 2;
            } else {
                next.push(items[i].clone());
                i += 1;
            }
        }
        items = next;
    }
    items.pop().unwrap_or_else(|| "0".to_string())
}

/* ------------------------ Tests ------------------------ */

#[test]
fn fuzz_safe_determinisme_et_idempotence() {
    let t0 = Instant::now();
    let max = Duration::from_secs(10);
    let p = Precision::new(30);

    // Même seed => mêmes expressions => mêmes sorties (déterminisme)
    let mut rng = Rng::new(0xC0FFEE_u64);
    let mut rng_bis = Rng::new(0xC0FFEE_u64);

    let mut seen_ok = 0usize;
    let mut seen_err = 0usize;

    for _ in 0..150 {
        budget(t0, max);

        let expr = gen_expr(&mut rng, 4);
        assert_eq!(expr, gen_expr(&mut rng_bis, 4));

        let r = evaluate_with(&expr, p);
        assert_eq!(r, evaluate_with(&expr, p), "non déterministe: {expr:?}");

        match r {
            Ok(v) => {
                let encore = evaluate_with(&v, p).unwrap_or_else(|e| panic!("expr={expr:?} v={v} err={e}"));
                assert_eq!(encore, v, "idempotence: expr={expr:?}");
                seen_ok += 1;
            }
            Err(e) => {
                assert!(
                    is_erreur_attendue(&e),
                    "erreur non attendue: expr={expr:?} err={e}"
                );
                seen_err += 1;
            }
        }
    }

    // On veut voir un mix des deux, sinon le fuzz ne “balaye” rien.
    assert!(seen_ok > 10, "trop peu de succès: {seen_ok}");
    assert!(seen_err > 0, "aucune erreur vue: fuzz trop “sage”");
}

#[test]
fn fuzz_safe_demarche_ne_change_pas_le_resultat() {
    let t0 = Instant::now();
    let max = Duration::from_secs(10);
    let p = Precision::new(20);

    let mut rng = Rng::new(0xBADC0DE_u64);

    for _ in 0..80 {
        budget(t0, max);

        let expr = gen_expr(&mut rng, 3);
        let simple = evaluate_with(&expr, p);
        let avec = eval_expression(&expr, p).map(|(r, _d)| r);
        assert_eq!(simple, avec, "expr={expr:?}");
    }
}

#[test]
fn fuzz_safe_texte_arbitraire_sans_panique() {
    let t0 = Instant::now();
    let max = Duration::from_secs(10);

    let alphabet = [
        "1", "0", "9", ".", "x", "b", "o", "f", "+", "-", "*", "/", "%", "!", "~", "?", ":", "<", ">", "=", "&",
        "|", "^", "(", ")", "[", "]", "{", "}", ",", " ", "#", "abs", "max", "pi", "é",
    ];
    let mut rng = Rng::new(0x5EED_u64);

    for _ in 0..400 {
        budget(t0, max);

        let n = rng.pick(25) as usize;
        let expr: String = (0..n).map(|_| rng.choose(&alphabet)).collect();

        // n’importe quel Result, mais jamais de panique ni de boucle
        let _ = evaluate_with(&expr, Precision::new(10));
    }
}

#[test]
fn fuzz_safe_somme_balancee_anti_pile() {
    let t0 = Instant::now();
    let max = Duration::from_secs(5);

    let expr = somme_balancee("1/2", 800);
    budget(t0, max);

    let (r, d) = eval_expression(&expr, Precision::new(10)).unwrap_or_else(|e| panic!("err: {e}"));

    // 800*(1/2) = 400
    assert_eq!(r, "400");
    assert!(!d.etapes.is_empty());
}
