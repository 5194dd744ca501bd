// src/noyau/operateurs.rs
//
// Catalogue des opérateurs (table statique, immuable)
// ---------------------------------------------------
// Une entrée par (symbole, arité, position). Précédences, de la plus forte :
//   14 unaires (+x -x ~x !x x!)
//   13 ^^            (droite)
//   12 * / %
//   11 + -
//   10 << >>
//    9 < > <= >=
//    8 == !=
//    7 &
//    6 ^
//    5 |
//    4 &&
//    3 ||
//    2 ? :           (droite)
// Les appels de fonction sont résolus avant toute réduction (au-dessus de tout).
//
// Comparaisons et && || rendent 1 ou 0. Pas de court-circuit observable :
// les deux opérandes sont déjà réduites quand l’opérateur s’applique.

use super::erreurs::{EvalError, Resultat};
use super::nombre::Number;
use super::precision::Precision;

pub const PRECEDENCE_UNAIRE: u8 = 14;
pub const PRECEDENCE_TERNAIRE: u8 = 2;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Arity {
    UnaryPrefix,
    UnaryPostfix,
    Binary,
    Ternary,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Associativity {
    Left,
    Right,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Operator {
    // unaires
    Identity,
    Inverse,
    LogicalNot,
    ConditionalNot,
    Factorial,

    // binaires
    Exponentiation,
    Multiplication,
    Division,
    Modulus,
    Addition,
    Subtraction,
    ShiftLeft,
    ShiftRight,
    LessThan,
    GreaterThan,
    LessOrEqual,
    GreaterOrEqual,
    Equality,
    Inequality,
    BitAnd,
    BitXor,
    BitOr,
    ConditionalAnd,
    ConditionalOr,

    // ternaire a ? b : c
    Conditional,
    ConditionalElse,
}

/// Toutes les entrées du catalogue (ordre de la table ci-dessus).
pub const CATALOGUE: [Operator; 26] = [
    Operator::Identity,
    Operator::Inverse,
    Operator::LogicalNot,
    Operator::ConditionalNot,
    Operator::Factorial,
    Operator::Exponentiation,
    Operator::Multiplication,
    Operator::Division,
    Operator::Modulus,
    Operator::Addition,
    Operator::Subtraction,
    Operator::ShiftLeft,
    Operator::ShiftRight,
    Operator::LessThan,
    Operator::GreaterThan,
    Operator::LessOrEqual,
    Operator::GreaterOrEqual,
    Operator::Equality,
    Operator::Inequality,
    Operator::BitAnd,
    Operator::BitXor,
    Operator::BitOr,
    Operator::ConditionalAnd,
    Operator::ConditionalOr,
    Operator::Conditional,
    Operator::ConditionalElse,
];

/// Une ligne de la table.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Entree {
    pub symbole: &'static str,
    pub arite: Arity,
    pub precedence: u8,
    pub associativite: Associativity,
}

const fn ligne(symbole: &'static str, arite: Arity, precedence: u8, associativite: Associativity) -> Entree {
    Entree {
        symbole,
        arite,
        precedence,
        associativite,
    }
}

impl Operator {
    pub const fn entree(self) -> Entree {
        use Arity::*;
        use Associativity::*;
        use Operator::*;

        match self {
            Identity => ligne("+", UnaryPrefix, 14, Right),
            Inverse => ligne("-", UnaryPrefix, 14, Right),
            LogicalNot => ligne("~", UnaryPrefix, 14, Right),
            ConditionalNot => ligne("!", UnaryPrefix, 14, Right),
            Factorial => ligne("!", UnaryPostfix, 14, Left),

            Exponentiation => ligne("^^", Binary, 13, Right),
            Multiplication => ligne("*", Binary, 12, Left),
            Division => ligne("/", Binary, 12, Left),
            Modulus => ligne("%", Binary, 12, Left),
            Addition => ligne("+", Binary, 11, Left),
            Subtraction => ligne("-", Binary, 11, Left),
            ShiftLeft => ligne("<<", Binary, 10, Left),
            ShiftRight => ligne(">>", Binary, 10, Left),
            LessThan => ligne("<", Binary, 9, Left),
            GreaterThan => ligne(">", Binary, 9, Left),
            LessOrEqual => ligne("<=", Binary, 9, Left),
            GreaterOrEqual => ligne(">=", Binary, 9, Left),
            Equality => ligne("==", Binary, 8, Left),
            Inequality => ligne("!=", Binary, 8, Left),
            BitAnd => ligne("&", Binary, 7, Left),
            BitXor => ligne("^", Binary, 6, Left),
            BitOr => ligne("|", Binary, 5, Left),
            ConditionalAnd => ligne("&&", Binary, 4, Left),
            ConditionalOr => ligne("||", Binary, 3, Left),

            Conditional => ligne("?", Ternary, 2, Right),
            ConditionalElse => ligne(":", Ternary, 2, Right),
        }
    }

    /// Recherche par (symbole, arité). `+`/`-`/`!` donnent un opérateur
    /// différent selon la position.
    pub fn lookup(symbole: &str, arite: Arity) -> Option<Operator> {
        CATALOGUE.iter().copied().find(|op| {
            let e = op.entree();
            e.symbole == symbole && e.arite == arite
        })
    }

    pub fn symbol(self) -> &'static str {
        self.entree().symbole
    }

    pub fn arity(self) -> Arity {
        self.entree().arite
    }

    pub fn precedence(self) -> u8 {
        self.entree().precedence
    }

    pub fn associativity(self) -> Associativity {
        self.entree().associativite
    }

    /* ------------------------ Évaluation ------------------------ */

    pub fn apply_unary(self, x: &Number) -> Resultat<Number> {
        use Operator::*;

        match self {
            Identity => Ok(x.clone()),
            Inverse => Ok(-x),
            LogicalNot => x.bit_not(),
            ConditionalNot => Ok(Number::from_bool(x.is_zero())),
            Factorial => x.factorial(),
            _ => Err(self.mauvaise_arite()),
        }
    }

    pub fn apply_binary(self, a: &Number, b: &Number, precision: Precision) -> Resultat<Number> {
        use Operator::*;

        let v = match self {
            Exponentiation => a.pow(b, precision),
            Multiplication => Ok(a * b),
            Division => a.div(b, precision),
            Modulus => a.rem(b),
            Addition => a.checked_add(b),
            Subtraction => a.checked_sub(b),
            ShiftLeft => a.shl(b),
            ShiftRight => a.shr(b),
            LessThan => Ok(Number::from_bool(a < b)),
            GreaterThan => Ok(Number::from_bool(a > b)),
            LessOrEqual => Ok(Number::from_bool(a <= b)),
            GreaterOrEqual => Ok(Number::from_bool(a >= b)),
            Equality => Ok(Number::from_bool(a == b)),
            Inequality => Ok(Number::from_bool(a != b)),
            BitAnd => a.bit_and(b),
            BitXor => a.bit_xor(b),
            BitOr => a.bit_or(b),
            ConditionalAnd => Ok(Number::from_bool(!a.is_zero() && !b.is_zero())),
            ConditionalOr => Ok(Number::from_bool(!a.is_zero() || !b.is_zero())),
            _ => Err(self.mauvaise_arite()),
        }?;
        v.borne(self.symbol())
    }

    /// a ? b : c ; condition vraie si non nulle.
    pub fn apply_ternary(condition: &Number, alors: &Number, sinon: &Number) -> Number {
        if condition.is_zero() {
            sinon.clone()
        } else {
            alors.clone()
        }
    }

    fn mauvaise_arite(self) -> EvalError {
        EvalError::MissingOperand(self.symbol().to_string())
    }
}

/// Niveaux à réduire, du plus fort au plus faible (fonctions exclues).
pub fn niveaux() -> impl Iterator<Item = u8> {
    (PRECEDENCE_TERNAIRE..=PRECEDENCE_UNAIRE).rev()
}
