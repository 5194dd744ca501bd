// src/noyau/jetons.rs
//
// Tokenisation
// ------------
// Balayage unique gauche -> droite, un caractère de regard arrière (le jeton
// précédent) et un de regard avant. N’échoue jamais : ce qui n’est pas
// reconnu devient un jeton Invalid, et l’évaluateur signalera l’erreur avec
// le texte fautif.
//
// Supporte:
// - décimaux (12, 12.5, .5), préfixés 0b / 0o / 0x
// - opérateurs unaires + - ~ ! (préfixe) et ! (factorielle, suffixe)
// - binaires * / % + - ^^ << >> < > <= >= == != & ^ | && ||
// - ternaire ? :
// - délimiteurs ( ) [ ] { } ,
// - noms de fonctions [a-zA-Z]+ et constantes pi / e

use super::erreurs::Resultat;
use super::nombre::{Base, Number};
use super::operateurs::{Arity, Operator};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TokenKind {
    Number(Base),
    UnaryPrefix,
    UnaryPostfix,
    Binary,
    Ternary,
    Function,
    Constant,
    Delimiter,
    Invalid,
    Empty,
}

impl TokenKind {
    pub fn nom(self) -> &'static str {
        match self {
            TokenKind::Number(Base::Decimal) => "dec",
            TokenKind::Number(Base::Binary) => "bin",
            TokenKind::Number(Base::Octal) => "oct",
            TokenKind::Number(Base::Hexadecimal) => "hex",
            TokenKind::UnaryPrefix => "pre",
            TokenKind::UnaryPostfix => "post",
            TokenKind::Binary => "bin-op",
            TokenKind::Ternary => "tern",
            TokenKind::Function => "fn",
            TokenKind::Constant => "const",
            TokenKind::Delimiter => "delim",
            TokenKind::Invalid => "invalide",
            TokenKind::Empty => "vide",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Token {
    /// Sous-chaîne source exacte.
    pub text: String,
    pub kind: TokenKind,
    /// Renseigné seulement pour les genres opérateurs.
    pub operator: Option<Operator>,
    /// Position (en caractères) dans l’entrée.
    pub position: usize,
}

impl Token {
    fn simple(text: impl Into<String>, kind: TokenKind, position: usize) -> Self {
        Self {
            text: text.into(),
            kind,
            operator: None,
            position,
        }
    }

    fn operateur(text: impl Into<String>, kind: TokenKind, op: Operator, position: usize) -> Self {
        Self {
            text: text.into(),
            kind,
            operator: Some(op),
            position,
        }
    }

    /// Ce jeton termine-t-il une opérande ? (littéral, constante, fermante, x!)
    fn termine_operande(&self) -> bool {
        match self.kind {
            TokenKind::Number(_) | TokenKind::Constant | TokenKind::UnaryPostfix => true,
            TokenKind::Delimiter => is_fermante(&self.text),
            _ => false,
        }
    }
}

/// Noms de constantes reconnus (insensible à la casse).
pub const CONSTANTES: [&str; 2] = ["pi", "e"];

pub fn is_ouvrante(s: &str) -> bool {
    matches!(s, "(" | "[" | "{")
}

pub fn is_fermante(s: &str) -> bool {
    matches!(s, ")" | "]" | "}")
}

/* ------------------------ Classification des caractères ambigus ------------------------ */

/// Ce qui précède le caractère courant.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Precedent {
    /// Début d’entrée.
    Debut,
    /// Fin d’opérande ; `colle` = aucun espace entre elle et le caractère courant.
    Operande { colle: bool },
    /// Opérateur, ouvrante, virgule, nom de fonction.
    Autre,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Classe {
    UnaryPrefix,
    UnaryPostfix,
    Binary,
}

/// Table de décision pour + - ! ~ (None pour tout autre caractère).
///
/// - `+`/`-` : binaire après une opérande, préfixe sinon.
/// - `!`     : factorielle si collé à une opérande, sinon `!=` si suivi
///             de `=`, sinon non conditionnel (préfixe).
/// - `~`     : toujours préfixe.
pub fn classify(precedent: Precedent, courant: char, suivant: Option<char>) -> Option<Classe> {
    match courant {
        '+' | '-' => match precedent {
            Precedent::Operande { .. } => Some(Classe::Binary),
            Precedent::Debut | Precedent::Autre => Some(Classe::UnaryPrefix),
        },
        '!' => {
            if precedent == (Precedent::Operande { colle: true }) {
                Some(Classe::UnaryPostfix)
            } else if suivant == Some('=') {
                Some(Classe::Binary)
            } else {
                Some(Classe::UnaryPrefix)
            }
        }
        '~' => Some(Classe::UnaryPrefix),
        _ => None,
    }
}

/* ------------------------ Lecture des morceaux ------------------------ */

/// Littéral à partir de `debut` : renvoie (fin exclusive, genre).
fn lire_litteral(chars: &[char], debut: usize) -> (usize, TokenKind) {
    // 0b / 0o / 0x : tout le bloc alphanumérique, validé pour la base
    if chars[debut] == '0' {
        if let Some(base) = chars.get(debut + 1).copied().and_then(Base::depuis_prefixe) {
            let mut i = debut + 2;
            while i < chars.len() && chars[i].is_ascii_alphanumeric() {
                i += 1;
            }
            let corps = &chars[debut + 2..i];
            let valide = !corps.is_empty() && corps.iter().all(|c| c.is_digit(base.radix()));
            let kind = if valide {
                TokenKind::Number(base)
            } else {
                TokenKind::Invalid
            };
            return (i, kind);
        }
    }

    let mut i = debut;
    let mut points = 0;
    while i < chars.len() && (chars[i].is_ascii_digit() || chars[i] == '.') {
        if chars[i] == '.' {
            points += 1;
        }
        i += 1;
    }

    let kind = if points > 1 {
        TokenKind::Invalid
    } else {
        TokenKind::Number(Base::Decimal)
    };
    (i, kind)
}

/// Début d’un jeton connu ? (sinon on accumule dans un jeton Invalid)
fn commence_jeton(c: char, suivant: Option<char>) -> bool {
    c.is_ascii_digit()
        || (c == '.' && suivant.is_some_and(|d| d.is_ascii_digit()))
        || c.is_ascii_alphabetic()
        || "()[]{},+-*/%~!?:<>=&|^".contains(c)
}

/// Second caractère possible d’un opérateur à deux caractères.
fn seconds(c: char) -> &'static [char] {
    match c {
        '<' => &['<', '='],
        '>' => &['>', '='],
        '=' => &['='],
        '&' => &['&'],
        '|' => &['|'],
        '^' => &['^'],
        _ => &[],
    }
}

/* ------------------------ Tokenize ------------------------ */

/// Tokenize une chaîne en jetons (ordre source, jamais réordonnés).
/// Entrée vide ou blanche -> un seul jeton Empty.
pub fn tokenize(s: &str) -> Vec<Token> {
    let chars: Vec<char> = s.chars().collect();
    let mut out: Vec<Token> = Vec::new();
    let mut i: usize = 0;

    // aucun espace depuis le dernier jeton émis
    let mut colle = true;

    while i < chars.len() {
        let c = chars[i];
        let suivant = chars.get(i + 1).copied();

        if c.is_whitespace() {
            colle = false;
            i += 1;
            continue;
        }

        let precedent = match out.last() {
            None => Precedent::Debut,
            Some(t) if t.termine_operande() => Precedent::Operande { colle },
            Some(_) => Precedent::Autre,
        };

        let debut = i;
        let jeton = if c.is_ascii_digit() || (c == '.' && suivant.is_some_and(|d| d.is_ascii_digit())) {
            let (fin, kind) = lire_litteral(&chars, i);
            i = fin;
            Token::simple(chars[debut..fin].iter().collect::<String>(), kind, debut)
        } else if c.is_ascii_alphabetic() {
            while i < chars.len() && chars[i].is_ascii_alphabetic() {
                i += 1;
            }
            let texte: String = chars[debut..i].iter().collect();

            // fonction si une ouvrante suit (espaces tolérés)
            let apres = chars[i..].iter().find(|c| !c.is_whitespace()).copied();
            let appel = apres.is_some_and(|c| is_ouvrante(&c.to_string()));
            let constante = CONSTANTES.contains(&texte.to_lowercase().as_str());

            let kind = if constante && !appel {
                TokenKind::Constant
            } else {
                TokenKind::Function
            };
            Token::simple(texte, kind, debut)
        } else if "()[]{},".contains(c) {
            i += 1;
            Token::simple(c, TokenKind::Delimiter, debut)
        } else if let Some(classe) = classify(precedent, c, suivant) {
            match classe {
                Classe::Binary if c == '!' => {
                    // "!="
                    i += 2;
                    Token::operateur("!=", TokenKind::Binary, Operator::Inequality, debut)
                }
                Classe::Binary => {
                    i += 1;
                    jeton_operateur(c.to_string(), Arity::Binary, debut)
                }
                Classe::UnaryPrefix => {
                    i += 1;
                    jeton_operateur(c.to_string(), Arity::UnaryPrefix, debut)
                }
                Classe::UnaryPostfix => {
                    i += 1;
                    jeton_operateur(c.to_string(), Arity::UnaryPostfix, debut)
                }
            }
        } else if c == '?' || c == ':' {
            i += 1;
            jeton_operateur(c.to_string(), Arity::Ternary, debut)
        } else if "*/%<>=&|^".contains(c) {
            // deux caractères d’abord (glouton), sinon un seul
            let symbole = match suivant {
                Some(d) if seconds(c).contains(&d) => {
                    i += 2;
                    format!("{c}{d}")
                }
                _ => {
                    i += 1;
                    c.to_string()
                }
            };
            jeton_operateur(symbole, Arity::Binary, debut)
        } else {
            // suite de caractères non reconnus -> un seul jeton Invalid
            i += 1;
            while i < chars.len()
                && !chars[i].is_whitespace()
                && !commence_jeton(chars[i], chars.get(i + 1).copied())
            {
                i += 1;
            }
            Token::simple(chars[debut..i].iter().collect::<String>(), TokenKind::Invalid, debut)
        };

        out.push(jeton);
        colle = true;
    }

    if out.is_empty() {
        out.push(Token::simple("", TokenKind::Empty, 0));
    }

    out
}

/// Symbole -> jeton opérateur ; symbole absent du catalogue (ex. "=") -> Invalid.
fn jeton_operateur(symbole: String, arite: Arity, position: usize) -> Token {
    let kind = match arite {
        Arity::UnaryPrefix => TokenKind::UnaryPrefix,
        Arity::UnaryPostfix => TokenKind::UnaryPostfix,
        Arity::Binary => TokenKind::Binary,
        Arity::Ternary => TokenKind::Ternary,
    };
    match Operator::lookup(&symbole, arite) {
        Some(op) => Token::operateur(symbole, kind, op, position),
        None => Token::simple(symbole, TokenKind::Invalid, position),
    }
}

/// Valeur d’un jeton littéral.
pub fn valeur_litteral(t: &Token) -> Option<Resultat<Number>> {
    match t.kind {
        TokenKind::Number(base) => Some(Number::parse_literal(&t.text, base)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn genres(s: &str) -> Vec<(String, TokenKind)> {
        tokenize(s).into_iter().map(|t| (t.text, t.kind)).collect()
    }

    fn g(text: &str, kind: TokenKind) -> (String, TokenKind) {
        (text.to_string(), kind)
    }

    const DEC: TokenKind = TokenKind::Number(Base::Decimal);

    #[test]
    fn unaires_colles_au_litteral() {
        assert_eq!(
            genres("~!5!"),
            vec![
                g("~", TokenKind::UnaryPrefix),
                g("!", TokenKind::UnaryPrefix),
                g("5", DEC),
                g("!", TokenKind::UnaryPostfix),
            ]
        );
    }

    #[test]
    fn plus_moins_unaire_ou_binaire() {
        assert_eq!(
            genres("2+-3"),
            vec![
                g("2", DEC),
                g("+", TokenKind::Binary),
                g("-", TokenKind::UnaryPrefix),
                g("3", DEC),
            ]
        );
        assert_eq!(genres("-3")[0], g("-", TokenKind::UnaryPrefix));
        assert_eq!(genres("(1)-2")[3], g("-", TokenKind::Binary));
        assert_eq!(genres("5!-2")[2], g("-", TokenKind::Binary));
        assert_eq!(genres("pi - 1")[1], g("-", TokenKind::Binary));
        assert_eq!(genres("(-1)")[1], g("-", TokenKind::UnaryPrefix));
        assert_eq!(genres("1 ? -1 : 2")[2], g("-", TokenKind::UnaryPrefix));
    }

    #[test]
    fn operateurs_resolus() {
        let t = tokenize("-1 - 1");
        assert_eq!(t[0].operator, Some(Operator::Inverse));
        assert_eq!(t[2].operator, Some(Operator::Subtraction));
        assert_eq!(t[1].operator, None);
    }

    #[test]
    fn point_exclamation() {
        // collé à l’opérande : factorielle, puis '=' seul
        assert_eq!(
            genres("5!=3"),
            vec![
                g("5", DEC),
                g("!", TokenKind::UnaryPostfix),
                g("=", TokenKind::Invalid),
                g("3", DEC)
            ]
        );
        assert_eq!(
            genres("5 != 3"),
            vec![g("5", DEC), g("!=", TokenKind::Binary), g("3", DEC)]
        );
        assert_eq!(genres("(1)!=2")[3], g("!", TokenKind::UnaryPostfix));
        assert_eq!(genres("5 !")[1], g("!", TokenKind::UnaryPrefix));
        assert_eq!(genres("(3)!")[3], g("!", TokenKind::UnaryPostfix));
        assert_eq!(genres("3!!")[2], g("!", TokenKind::UnaryPostfix));
        assert_eq!(genres("!0")[0], g("!", TokenKind::UnaryPrefix));
    }

    #[test]
    fn operateurs_a_deux_caracteres() {
        for op in ["==", "!=", "<=", ">=", "<<", ">>", "&&", "||", "^^"] {
            let t = tokenize(&format!("1{op}2"));
            assert_eq!(t.len(), 3, "{op}");
            assert_eq!(t[1].text, op);
            assert_eq!(t[1].kind, TokenKind::Binary);
            assert!(t[1].operator.is_some());
        }
        for op in ["<", ">", "&", "|", "^", "*", "/", "%"] {
            let t = tokenize(&format!("1 {op} 2"));
            assert_eq!(t[1].text, op);
            assert_eq!(t[1].kind, TokenKind::Binary);
        }
        assert_eq!(genres("1 = 2")[1], g("=", TokenKind::Invalid));
    }

    #[test]
    fn litteraux_prefixes() {
        assert_eq!(
            genres("0x1F 0b102 0o17 0x"),
            vec![
                g("0x1F", TokenKind::Number(Base::Hexadecimal)),
                g("0b102", TokenKind::Invalid),
                g("0o17", TokenKind::Number(Base::Octal)),
                g("0x", TokenKind::Invalid),
            ]
        );
        assert_eq!(genres("1.2.3"), vec![g("1.2.3", TokenKind::Invalid)]);
        assert_eq!(genres(".5"), vec![g(".5", DEC)]);
    }

    #[test]
    fn caracteres_inconnus_regroupes() {
        assert_eq!(
            genres("2 # 3 $$ 4"),
            vec![
                g("2", DEC),
                g("#", TokenKind::Invalid),
                g("3", DEC),
                g("$$", TokenKind::Invalid),
                g("4", DEC),
            ]
        );
        assert_eq!(genres("1+$2")[2], g("$", TokenKind::Invalid));
    }

    #[test]
    fn fonctions_et_constantes() {
        assert_eq!(
            genres("abs(1)"),
            vec![
                g("abs", TokenKind::Function),
                g("(", TokenKind::Delimiter),
                g("1", DEC),
                g(")", TokenKind::Delimiter),
            ]
        );
        assert_eq!(genres("PI")[0], g("PI", TokenKind::Constant));
        assert_eq!(genres("e")[0], g("e", TokenKind::Constant));
        assert_eq!(genres("max (1, 2)")[0], g("max", TokenKind::Function));
        assert_eq!(genres("max (1, 2)")[3], g(",", TokenKind::Delimiter));
    }

    #[test]
    fn entree_vide() {
        assert_eq!(genres(""), vec![g("", TokenKind::Empty)]);
        assert_eq!(genres("   \t"), vec![g("", TokenKind::Empty)]);
    }

    #[test]
    fn table_de_classification() {
        use Classe::*;
        let op = Precedent::Operande { colle: true };
        let op_espace = Precedent::Operande { colle: false };

        assert_eq!(classify(Precedent::Debut, '-', Some('3')), Some(UnaryPrefix));
        assert_eq!(classify(Precedent::Autre, '+', Some('3')), Some(UnaryPrefix));
        assert_eq!(classify(op, '-', Some('3')), Some(Binary));
        assert_eq!(classify(op_espace, '+', Some(' ')), Some(Binary));

        assert_eq!(classify(op, '!', None), Some(UnaryPostfix));
        assert_eq!(classify(op_espace, '!', Some('1')), Some(UnaryPrefix));
        assert_eq!(classify(op, '!', Some('=')), Some(UnaryPostfix));
        assert_eq!(classify(op_espace, '!', Some('=')), Some(Binary));
        assert_eq!(classify(Precedent::Debut, '!', Some('0')), Some(UnaryPrefix));

        assert_eq!(classify(op, '~', Some('1')), Some(UnaryPrefix));
        assert_eq!(classify(op, '*', Some('1')), None);
    }

    mod proptest_jetons {
        use super::super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn chaque_caractere_consomme(s in "[0-9a-fxob.+\\-*/%!~?:<>=&|^()\\[\\]{}, #$]{0,40}") {
                let toks = tokenize(&s);
                let colle: String = toks.iter().map(|t| t.text.as_str()).collect();
                let sans_espaces: String = s.chars().filter(|c| !c.is_whitespace()).collect();
                prop_assert_eq!(colle, sans_espaces);
            }

            #[test]
            fn litteraux_toujours_lisibles(s in "[0-9a-fxob.+\\-*() ]{0,40}") {
                for t in tokenize(&s) {
                    if let Some(v) = valeur_litteral(&t) {
                        prop_assert!(v.is_ok(), "jeton {:?}", t);
                    }
                    if t.kind == TokenKind::Invalid {
                        prop_assert!(t.operator.is_none());
                    }
                }
            }
        }
    }
}
