// src/noyau/nombre.rs
//
// Nombre décimal exact : mantisse (BigInt) × 10^exposant.
// -------------------------------------------------------
// - Normalisé à la construction : mantisse nulle => exposant 0,
//   sinon la mantisse n’est pas divisible par 10 (zéros repliés dans l’exposant).
// - Égalité structurelle (valide grâce à la normalisation).
// - + - * exacts ; la division est tronquée à la précision (jamais arrondie).
// - Opérations bit à bit : sur la valeur entière uniquement.

use num_bigint::BigInt;
use num_rational::BigRational;
use num_traits::{One, Signed, ToPrimitive, Zero};
use std::cmp::Ordering;
use std::fmt;
use std::ops::{Add, Mul, Neg, Sub};

use super::erreurs::{EvalError, Resultat};
use super::format::format_nombre;
use super::precision::Precision;

/// Plus grande factorielle qui tient dans un accumulateur i64 signé.
pub const FACTORIELLE_MAX: i64 = 20;

/// Borne des exposants entiers (^^) et des décalages (<< >>).
pub const LIMITE_ENTIERE: u64 = 100_000;

/// Borne de la largeur décimale d’un résultat : chiffres de la mantisse + |exposant|.
pub const LARGEUR_MAX: u64 = 200_000;

/* ------------------------ Bases des littéraux ------------------------ */

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Base {
    Decimal,
    Binary,
    Octal,
    Hexadecimal,
}

impl Base {
    pub fn radix(self) -> u32 {
        match self {
            Base::Decimal => 10,
            Base::Binary => 2,
            Base::Octal => 8,
            Base::Hexadecimal => 16,
        }
    }

    /// Lettre après le '0' : 0b, 0o, 0x (majuscule tolérée).
    pub fn depuis_prefixe(c: char) -> Option<Base> {
        match c.to_ascii_lowercase() {
            'b' => Some(Base::Binary),
            'o' => Some(Base::Octal),
            'x' => Some(Base::Hexadecimal),
            _ => None,
        }
    }
}

/* ------------------------ Puissances de 10 ------------------------ */

fn pow10(n: u64) -> BigInt {
    num_traits::pow(BigInt::from(10u8), n as usize)
}

/// m × 10^n (évite la multiplication inutile pour n = 0).
fn echelle(m: &BigInt, n: u64) -> BigInt {
    if n == 0 {
        m.clone()
    } else {
        m * pow10(n)
    }
}

/// Majorant du nombre de chiffres décimaux de `m` (sans conversion en texte).
fn chiffres_max(m: &BigInt) -> u64 {
    (m.bits() as f64 * std::f64::consts::LOG10_2) as u64 + 1
}

/* ------------------------ Le type ------------------------ */

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Number {
    mantissa: BigInt,
    exponent: i64,
}

impl Number {
    pub fn new(mantissa: BigInt, exponent: i64) -> Self {
        let mut n = Self { mantissa, exponent };
        n.normaliser();
        n
    }

    fn normaliser(&mut self) {
        if self.mantissa.is_zero() {
            self.exponent = 0;
            return;
        }
        let dix = BigInt::from(10u8);
        while (&self.mantissa % &dix).is_zero() {
            self.mantissa /= &dix;
            self.exponent += 1;
        }
    }

    pub fn zero() -> Self {
        Self::new(BigInt::zero(), 0)
    }

    pub fn one() -> Self {
        Self::new(BigInt::one(), 0)
    }

    pub fn from_integer(i: BigInt) -> Self {
        Self::new(i, 0)
    }

    /// Vrai/faux du langage : 1 ou 0.
    pub fn from_bool(b: bool) -> Self {
        if b {
            Self::one()
        } else {
            Self::zero()
        }
    }

    pub fn mantissa(&self) -> &BigInt {
        &self.mantissa
    }

    pub fn exponent(&self) -> i64 {
        self.exponent
    }

    pub fn is_zero(&self) -> bool {
        self.mantissa.is_zero()
    }

    pub fn is_negative(&self) -> bool {
        self.mantissa.is_negative()
    }

    /// Normalisé : exposant négatif <=> partie fractionnaire non nulle.
    pub fn is_integral(&self) -> bool {
        self.exponent >= 0
    }

    /// Nombre de chiffres de la mantisse (signe exclu).
    pub fn significant_digits(&self) -> usize {
        self.mantissa.magnitude().to_str_radix(10).len()
    }

    /// Majorant de la largeur décimale : chiffres + |exposant|.
    pub fn largeur(&self) -> u64 {
        chiffres_max(&self.mantissa).saturating_add(self.exponent.unsigned_abs())
    }

    /// Refuse un résultat plus large que LARGEUR_MAX.
    pub fn borne(self, operateur: &str) -> Resultat<Number> {
        let largeur = self.largeur();
        if largeur > LARGEUR_MAX {
            return Err(EvalError::hors_limites(operateur, format!("{largeur} chiffres")));
        }
        Ok(self)
    }

    /* ------------------------ Lecture des littéraux ------------------------ */

    /// Décimal : chiffres, au plus un '.', '-' initial optionnel.
    pub fn parse_decimal(texte: &str) -> Resultat<Number> {
        let err = || EvalError::MalformedLiteral(texte.to_string());

        let (negatif, corps) = match texte.strip_prefix('-') {
            Some(reste) => (true, reste),
            None => (false, texte),
        };

        let mut chiffres = String::with_capacity(corps.len());
        let mut apres_point: Option<i64> = None;

        for c in corps.chars() {
            match c {
                '0'..='9' => {
                    chiffres.push(c);
                    if let Some(n) = apres_point.as_mut() {
                        *n += 1;
                    }
                }
                '.' if apres_point.is_none() => apres_point = Some(0),
                _ => return Err(err()),
            }
        }

        if chiffres.is_empty() {
            return Err(err());
        }

        let m = BigInt::parse_bytes(chiffres.as_bytes(), 10).ok_or_else(err)?;
        let m = if negatif { -m } else { m };
        Ok(Number::new(m, -apres_point.unwrap_or(0)))
    }

    /// Binaire/octal/hexadécimal, sans préfixe ni signe.
    pub fn parse_radix(texte: &str, radix: u32) -> Resultat<Number> {
        let err = || EvalError::MalformedLiteral(texte.to_string());

        if !matches!(radix, 2 | 8 | 16) {
            return Err(err());
        }
        if texte.is_empty() || !texte.chars().all(|c| c.is_digit(radix)) {
            return Err(err());
        }

        let m = BigInt::parse_bytes(texte.as_bytes(), radix).ok_or_else(err)?;
        Ok(Number::from_integer(m))
    }

    /// Texte complet d’un jeton littéral ("0x1F", "12.5", ...).
    pub fn parse_literal(texte: &str, base: Base) -> Resultat<Number> {
        if base == Base::Decimal {
            return Self::parse_decimal(texte);
        }

        let prefixe_ok = texte
            .get(..2)
            .map(|p| {
                let mut cs = p.chars();
                cs.next() == Some('0') && cs.next().and_then(Base::depuis_prefixe) == Some(base)
            })
            .unwrap_or(false);

        if !prefixe_ok {
            return Err(EvalError::MalformedLiteral(texte.to_string()));
        }

        Self::parse_radix(&texte[2..], base.radix())
            .map_err(|_| EvalError::MalformedLiteral(texte.to_string()))
    }

    /* ------------------------ Troncature / arrondis ------------------------ */

    /// Garde au plus `chiffres` chiffres significatifs (troncature vers zéro).
    pub fn truncate(&self, chiffres: usize) -> Number {
        let n = self.significant_digits();
        if n <= chiffres {
            return self.clone();
        }
        let retrait = (n - chiffres) as u64;
        Number::new(&self.mantissa / pow10(retrait), self.exponent + retrait as i64)
    }

    /// Partie entière (vers zéro).
    pub fn trunc(&self) -> Number {
        if self.exponent >= 0 {
            return self.clone();
        }
        Number::from_integer(&self.mantissa / pow10(self.exponent.unsigned_abs()))
    }

    pub fn floor(&self) -> Number {
        let t = self.trunc();
        if &t != self && self.is_negative() {
            t - Number::one()
        } else {
            t
        }
    }

    pub fn ceil(&self) -> Number {
        let t = self.trunc();
        if &t != self && !self.is_negative() {
            t + Number::one()
        } else {
            t
        }
    }

    pub fn abs(&self) -> Number {
        Number::new(self.mantissa.abs(), self.exponent)
    }

    /* ------------------------ Division, reste, puissance ------------------------ */

    /// Division tronquée : au plus `precision` chiffres significatifs.
    pub fn div(&self, diviseur: &Number, precision: Precision) -> Resultat<Number> {
        if diviseur.is_zero() {
            return Err(EvalError::DivisionByZero);
        }

        let p = precision.chiffres();
        let ecart = self.significant_digits() as i64 - diviseur.significant_digits() as i64;
        let decalage = (p as i64 - ecart).max(0) as u64;

        let q = echelle(&self.mantissa, decalage) / &diviseur.mantissa;
        let e = self.exponent - diviseur.exponent - decalage as i64;
        Ok(Number::new(q, e).truncate(p))
    }

    /// Reste exact, du signe du dividende.
    pub fn rem(&self, diviseur: &Number) -> Resultat<Number> {
        if diviseur.is_zero() {
            return Err(EvalError::DivisionByZero);
        }
        verifier_alignement(self, diviseur, "%")?;
        let (a, b, e) = aligner(self, diviseur);
        Ok(Number::new(a % b, e))
    }

    /// Addition pour l’évaluation : alignement borné par LARGEUR_MAX.
    pub fn checked_add(&self, autre: &Number) -> Resultat<Number> {
        verifier_alignement(self, autre, "+")?;
        Ok(self + autre)
    }

    pub fn checked_sub(&self, autre: &Number) -> Resultat<Number> {
        verifier_alignement(self, autre, "-")?;
        Ok(self - autre)
    }

    /// Puissance entière ; exposant négatif => 1 / x^|n| (division tronquée).
    pub fn pow(&self, exposant: &Number, precision: Precision) -> Resultat<Number> {
        let n = exposant.to_integer("^^")?;

        if self.is_zero() {
            return match n.sign() {
                num_bigint::Sign::Minus => Err(EvalError::DivisionByZero),
                num_bigint::Sign::NoSign => Ok(Number::one()),
                num_bigint::Sign::Plus => Ok(Number::zero()),
            };
        }
        if self == &Number::one() {
            return Ok(Number::one());
        }

        let n_abs = n
            .magnitude()
            .to_u64()
            .filter(|k| *k <= LIMITE_ENTIERE)
            .ok_or_else(|| EvalError::hors_limites("^^", exposant))?;

        // taille du résultat estimée avant de le calculer
        let e = self
            .exponent
            .checked_mul(n_abs as i64)
            .ok_or_else(|| EvalError::hors_limites("^^", exposant))?;
        let chiffres = (self.mantissa.bits() as f64 * std::f64::consts::LOG10_2 * n_abs as f64).ceil() as u64 + 1;
        if chiffres.saturating_add(e.unsigned_abs()) > LARGEUR_MAX {
            return Err(EvalError::hors_limites("^^", exposant));
        }

        let m = num_traits::pow(self.mantissa.clone(), n_abs as usize);
        let p = Number::new(m, e);

        if n.is_negative() {
            Number::one().div(&p, precision)
        } else {
            Ok(p)
        }
    }

    pub fn factorial(&self) -> Resultat<Number> {
        let err = || EvalError::FactorialRangeError(self.to_string());

        let n = self.to_i64().ok_or_else(err)?;
        if !(0..=FACTORIELLE_MAX).contains(&n) {
            return Err(err());
        }

        let mut acc = BigInt::one();
        for k in 2..=n {
            acc *= BigInt::from(k);
        }
        Ok(Number::from_integer(acc))
    }

    /* ------------------------ Vue entière ------------------------ */

    /// Valeur entière ; `operateur` sert au message d’erreur.
    pub fn to_integer(&self, operateur: &str) -> Resultat<BigInt> {
        if self.exponent < 0 {
            return Err(EvalError::non_entier(operateur, self));
        }
        let largeur = self.largeur();
        if largeur > LARGEUR_MAX {
            return Err(EvalError::hors_limites(operateur, format!("{largeur} chiffres")));
        }
        Ok(echelle(&self.mantissa, self.exponent as u64))
    }

    /// None si non entier ou hors i64.
    pub fn to_i64(&self) -> Option<i64> {
        if self.exponent < 0 {
            return None;
        }
        if self.exponent > 19 {
            return None;
        }
        echelle(&self.mantissa, self.exponent as u64).to_i64()
    }

    pub fn bit_and(&self, autre: &Number) -> Resultat<Number> {
        Ok(Number::from_integer(
            self.to_integer("&")? & autre.to_integer("&")?,
        ))
    }

    pub fn bit_or(&self, autre: &Number) -> Resultat<Number> {
        Ok(Number::from_integer(
            self.to_integer("|")? | autre.to_integer("|")?,
        ))
    }

    pub fn bit_xor(&self, autre: &Number) -> Resultat<Number> {
        Ok(Number::from_integer(
            self.to_integer("^")? ^ autre.to_integer("^")?,
        ))
    }

    /// Complément à deux : ~x = -x - 1.
    pub fn bit_not(&self) -> Resultat<Number> {
        Ok(Number::from_integer(!self.to_integer("~")?))
    }

    pub fn shl(&self, decalage: &Number) -> Resultat<Number> {
        self.decaler(decalage, "<<", true)
    }

    pub fn shr(&self, decalage: &Number) -> Resultat<Number> {
        self.decaler(decalage, ">>", false)
    }

    /// Décalage négatif => sens inverse.
    fn decaler(&self, decalage: &Number, operateur: &str, gauche: bool) -> Resultat<Number> {
        let v = self.to_integer(operateur)?;
        let k = decalage.to_integer(operateur)?;

        let n = k
            .magnitude()
            .to_u64()
            .filter(|n| *n <= LIMITE_ENTIERE)
            .ok_or_else(|| EvalError::hors_limites(operateur, decalage))? as usize;

        let vers_gauche = gauche != k.is_negative();
        let r = if vers_gauche { v << n } else { v >> n };
        Ok(Number::from_integer(r))
    }

    /* ------------------------ Flottants (fonctions ln/log) ------------------------ */

    fn to_rational(&self) -> BigRational {
        if self.exponent >= 0 {
            BigRational::from_integer(echelle(&self.mantissa, self.exponent as u64))
        } else {
            BigRational::new(self.mantissa.clone(), pow10(self.exponent.unsigned_abs()))
        }
    }

    pub fn to_f64(&self) -> Option<f64> {
        self.to_rational().to_f64().filter(|x| x.is_finite())
    }

    /// L’affichage de f64 n’utilise jamais la notation scientifique.
    pub fn from_f64(x: f64) -> Option<Number> {
        if !x.is_finite() {
            return None;
        }
        Number::parse_decimal(&format!("{x}")).ok()
    }
}

/* ------------------------ Alignement des exposants ------------------------ */

/// Largeur des mantisses une fois alignées ; refusée au-delà de LARGEUR_MAX.
fn verifier_alignement(a: &Number, b: &Number, operateur: &str) -> Resultat<()> {
    let e = a.exponent.min(b.exponent);
    let largeur = |n: &Number| chiffres_max(&n.mantissa).saturating_add(n.exponent.abs_diff(e));
    let l = largeur(a).max(largeur(b));
    if l > LARGEUR_MAX {
        return Err(EvalError::hors_limites(operateur, format!("{l} chiffres après alignement")));
    }
    Ok(())
}

/// (mantisse_a, mantisse_b, exposant commun) au plus petit exposant.
fn aligner(a: &Number, b: &Number) -> (BigInt, BigInt, i64) {
    let e = a.exponent.min(b.exponent);
    (
        echelle(&a.mantissa, a.exponent.abs_diff(e)),
        echelle(&b.mantissa, b.exponent.abs_diff(e)),
        e,
    )
}

/* ------------------------ Traits ------------------------ */

impl Ord for Number {
    fn cmp(&self, autre: &Self) -> Ordering {
        // signes différents : pas besoin d’aligner
        let sa = self.mantissa.signum();
        let sb = autre.mantissa.signum();
        if sa != sb || sa.is_zero() {
            return sa.cmp(&sb);
        }

        // ordre de grandeur (chiffres + exposant) : l’alignement ne sert
        // qu’à égalité, l’écart d’exposants est alors celui des longueurs
        let grandeur = |n: &Number| (n.significant_digits() as i64).saturating_add(n.exponent);
        let (ga, gb) = (grandeur(self), grandeur(autre));
        if ga != gb {
            return if sa.is_positive() { ga.cmp(&gb) } else { gb.cmp(&ga) };
        }
        let (a, b, _) = aligner(self, autre);
        a.cmp(&b)
    }
}

impl PartialOrd for Number {
    fn partial_cmp(&self, autre: &Self) -> Option<Ordering> {
        Some(self.cmp(autre))
    }
}

impl Add<&Number> for &Number {
    type Output = Number;

    fn add(self, autre: &Number) -> Number {
        let (a, b, e) = aligner(self, autre);
        Number::new(a + b, e)
    }
}

impl Add for Number {
    type Output = Number;

    fn add(self, autre: Number) -> Number {
        &self + &autre
    }
}

impl Sub<&Number> for &Number {
    type Output = Number;

    fn sub(self, autre: &Number) -> Number {
        let (a, b, e) = aligner(self, autre);
        Number::new(a - b, e)
    }
}

impl Sub for Number {
    type Output = Number;

    fn sub(self, autre: Number) -> Number {
        &self - &autre
    }
}

impl Mul<&Number> for &Number {
    type Output = Number;

    fn mul(self, autre: &Number) -> Number {
        Number::new(&self.mantissa * &autre.mantissa, self.exponent + autre.exponent)
    }
}

impl Mul for Number {
    type Output = Number;

    fn mul(self, autre: Number) -> Number {
        &self * &autre
    }
}

impl Neg for &Number {
    type Output = Number;

    fn neg(self) -> Number {
        Number::new(-&self.mantissa, self.exponent)
    }
}

impl Neg for Number {
    type Output = Number;

    fn neg(self) -> Number {
        -&self
    }
}

impl From<i64> for Number {
    fn from(v: i64) -> Self {
        Number::from_integer(BigInt::from(v))
    }
}

impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&format_nombre(self))
    }
}
