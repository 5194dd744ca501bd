//! Noyau — évaluation
//!
//! tokenize -> contrôle des jetons invalides -> aplatissement
//!   (littéraux, constantes, groupes et appels évalués récursivement)
//!   -> réduction par niveaux de précédence (14 -> 2) -> un seul nombre.
//!
//! Chaque niveau est réduit complètement avant le suivant ; un niveau réduit
//! n’est jamais revisité.
//!
//! Groupes, arguments et branches ternaires sont évalués récursivement :
//! la profondeur est bornée par `MAX_PROFONDEUR` (erreur, jamais de
//! débordement de pile).

use super::erreurs::{EvalError, Resultat};
use super::fonctions::{self, NOMS_FONCTIONS};
use super::format::format_tokens;
use super::jetons::{is_fermante, is_ouvrante, tokenize, valeur_litteral, Token, TokenKind};
use super::nombre::Number;
use super::operateurs::{
    niveaux, Arity, Associativity, Operator, CATALOGUE, PRECEDENCE_TERNAIRE, PRECEDENCE_UNAIRE,
};
use super::precision::Precision;

/// Imbrication maximale (groupes, appels, ternaires) d’une évaluation.
pub const MAX_PROFONDEUR: usize = 128;

/// Démarche : jetons lus + une ligne par réduction.
#[derive(Default, Clone, Debug, PartialEq, Eq)]
pub struct Demarche {
    pub jetons: String,
    pub etapes: Vec<String>,
}

/* ------------------------ API publique ------------------------ */

/// Évalue avec la précision par défaut ; rendu décimal canonique.
pub fn evaluate(expression: &str) -> Resultat<String> {
    evaluate_with(expression, Precision::default())
}

pub fn evaluate_with(expression: &str, precision: Precision) -> Resultat<String> {
    evaluate_number(expression, precision).map(|n| n.to_string())
}

pub fn evaluate_number(expression: &str, precision: Precision) -> Resultat<Number> {
    let mut ctx = Contexte::new(precision, false);
    evaluer_texte(expression, &mut ctx)
}

/// Évalue et retourne le rendu + la démarche (jetons, étapes de réduction).
pub fn eval_expression(expression: &str, precision: Precision) -> Resultat<(String, Demarche)> {
    let mut ctx = Contexte::new(precision, true);
    let n = evaluer_texte(expression, &mut ctx)?;

    let demarche = Demarche {
        jetons: format_tokens(&tokenize(expression)),
        etapes: ctx.etapes.unwrap_or_default(),
    };
    Ok((n.to_string(), demarche))
}

/* ------------------------ Contexte d’une évaluation ------------------------ */

struct Contexte {
    precision: Precision,
    /// None : démarche non demandée (aucun formatage inutile).
    etapes: Option<Vec<String>>,
    profondeur: usize,
}

impl Contexte {
    fn new(precision: Precision, demarche: bool) -> Self {
        Self {
            precision,
            etapes: demarche.then(Vec::new),
            profondeur: 0,
        }
    }

    /// Un niveau d’imbrication de plus ; refusé au-delà de MAX_PROFONDEUR.
    fn entrer(&mut self) -> Resultat<()> {
        if self.profondeur >= MAX_PROFONDEUR {
            tracing::debug!(profondeur = self.profondeur, "imbrication refusée");
            return Err(EvalError::MalformedExpression(format!(
                "imbrication trop profonde (max {MAX_PROFONDEUR})"
            )));
        }
        self.profondeur += 1;
        Ok(())
    }

    fn sortir(&mut self) {
        self.profondeur = self.profondeur.saturating_sub(1);
    }

    fn noter(&mut self, ligne: impl FnOnce() -> String) {
        if let Some(etapes) = self.etapes.as_mut() {
            let l = ligne();
            tracing::trace!(etape = %l, "réduction");
            etapes.push(l);
        }
    }
}

/* ------------------------ Pipeline ------------------------ */

#[tracing::instrument(level = "debug", skip_all, fields(longueur = expression.len()))]
fn evaluer_texte(expression: &str, ctx: &mut Contexte) -> Resultat<Number> {
    let jetons = tokenize(expression);
    tracing::trace!(
        jetons = ?jetons.iter().map(|t| format!("{}({})", t.kind.nom(), t.text)).collect::<Vec<_>>(),
        "jetons lus"
    );

    // 1) le premier jeton invalide fait échouer toute l’expression
    if let Some(t) = jetons.iter().find(|t| t.kind == TokenKind::Invalid) {
        tracing::debug!(texte = %t.text, position = t.position, "jeton invalide");
        return Err(EvalError::MalformedExpression(format!(
            "jeton invalide '{}' (position {})",
            t.text, t.position
        )));
    }

    let utiles: Vec<Token> = jetons
        .into_iter()
        .filter(|t| t.kind != TokenKind::Empty)
        .collect();

    let r = evaluer_jetons(&utiles, ctx);
    if let Err(e) = &r {
        tracing::debug!(erreur = %e, "évaluation échouée");
    }
    r
}

/// Évaluation d’une suite de jetons (expression entière ou contenu d’un groupe).
fn evaluer_jetons(jetons: &[Token], ctx: &mut Contexte) -> Resultat<Number> {
    if jetons.is_empty() {
        return Err(EvalError::MalformedExpression("expression vide".into()));
    }
    ctx.entrer()?;
    let r = aplatir(jetons, ctx).and_then(|mut elements| reduire(&mut elements, ctx));
    ctx.sortir();
    r
}

/* ------------------------ Éléments vivants ------------------------ */

/// Ce qui reste après l’aplatissement : des valeurs et des opérateurs.
#[derive(Clone, Debug)]
enum Element {
    Valeur(Number),
    Op(Operator),
}

impl Element {
    fn valeur(&self) -> Option<&Number> {
        match self {
            Element::Valeur(n) => Some(n),
            Element::Op(_) => None,
        }
    }

    fn op(&self) -> Option<Operator> {
        match self {
            Element::Op(op) => Some(*op),
            Element::Valeur(_) => None,
        }
    }
}

/* ------------------------ Aplatissement ------------------------ */

fn aplatir(jetons: &[Token], ctx: &mut Contexte) -> Resultat<Vec<Element>> {
    let mut out = Vec::with_capacity(jetons.len());
    let mut i = 0;

    while i < jetons.len() {
        let t = &jetons[i];

        match t.kind {
            TokenKind::Number(_) => {
                let v = valeur_litteral(t)
                    .unwrap_or_else(|| Err(EvalError::MalformedLiteral(t.text.clone())))?;
                out.push(Element::Valeur(v));
                i += 1;
            }

            TokenKind::Constant => {
                let v = fonctions::constante(&t.text, ctx.precision).unwrap_or_else(|| {
                    Err(EvalError::MalformedExpression(format!("constante inconnue '{}'", t.text)))
                })?;
                out.push(Element::Valeur(v));
                i += 1;
            }

            TokenKind::Function => {
                let (v, suite) = appel(jetons, i, ctx)?;
                out.push(Element::Valeur(v));
                i = suite;
            }

            TokenKind::Delimiter if is_ouvrante(&t.text) => {
                let fin = fermante(jetons, i)?;
                let v = evaluer_jetons(&jetons[i + 1..fin], ctx)?;
                ctx.noter(|| format!("({}) = {v}", format_tokens(&jetons[i + 1..fin])));
                out.push(Element::Valeur(v));
                i = fin + 1;
            }

            TokenKind::Delimiter if is_fermante(&t.text) => {
                return Err(EvalError::MalformedExpression(format!(
                    "'{}' sans ouvrante (position {})",
                    t.text, t.position
                )));
            }

            TokenKind::Delimiter => {
                // virgule hors d’un appel
                return Err(EvalError::MalformedExpression(format!(
                    "'{}' hors d’un appel de fonction (position {})",
                    t.text, t.position
                )));
            }

            TokenKind::UnaryPrefix | TokenKind::UnaryPostfix | TokenKind::Binary | TokenKind::Ternary => {
                let op = t
                    .operator
                    .ok_or_else(|| EvalError::MalformedExpression(format!("opérateur inconnu '{}'", t.text)))?;
                out.push(Element::Op(op));
                i += 1;
            }

            TokenKind::Invalid => {
                return Err(EvalError::MalformedExpression(format!("jeton invalide '{}'", t.text)));
            }

            TokenKind::Empty => i += 1,
        }
    }

    Ok(out)
}

/// Indice de la fermante qui correspond à l’ouvrante en `debut`.
/// Les familles ( [ { doivent s’emboîter correctement.
fn fermante(jetons: &[Token], debut: usize) -> Resultat<usize> {
    let mut pile: Vec<&str> = Vec::new();

    for (k, t) in jetons.iter().enumerate().skip(debut) {
        if t.kind != TokenKind::Delimiter {
            continue;
        }
        let s = t.text.as_str();
        if is_ouvrante(s) {
            pile.push(s);
        } else if is_fermante(s) {
            let ouvrante = pile.pop().unwrap_or_default();
            if !meme_famille(ouvrante, s) {
                return Err(EvalError::MalformedExpression(format!(
                    "'{ouvrante}' fermée par '{s}' (position {})",
                    t.position
                )));
            }
            if pile.is_empty() {
                return Ok(k);
            }
        }
    }

    Err(EvalError::MalformedExpression(format!(
        "'{}' non fermée (position {})",
        jetons[debut].text, jetons[debut].position
    )))
}

fn meme_famille(ouvrante: &str, fermante: &str) -> bool {
    matches!((ouvrante, fermante), ("(", ")") | ("[", "]") | ("{", "}"))
}

/// Appel `nom(a, b, ...)` en `i` ; renvoie (valeur, indice après la fermante).
fn appel(jetons: &[Token], i: usize, ctx: &mut Contexte) -> Resultat<(Number, usize)> {
    let nom = &jetons[i].text;

    let ouvrante = i + 1;
    if !jetons.get(ouvrante).is_some_and(|t| is_ouvrante(&t.text)) {
        return Err(EvalError::MalformedExpression(format!(
            "'{nom}' doit être suivi d’arguments entre parenthèses"
        )));
    }
    if !NOMS_FONCTIONS.contains(&nom.to_lowercase().as_str()) {
        return Err(EvalError::UnknownFunction(nom.clone()));
    }

    let fin = fermante(jetons, ouvrante)?;
    let interieur = &jetons[ouvrante + 1..fin];

    let mut args = Vec::new();
    if !interieur.is_empty() {
        for morceau in arguments(interieur) {
            args.push(evaluer_jetons(morceau, ctx)?);
        }
    }

    let v = fonctions::call(nom, &args, ctx.precision)?;
    ctx.noter(|| {
        let liste: Vec<String> = args.iter().map(|a| a.to_string()).collect();
        format!("{nom}({}) = {v}", liste.join(", "))
    });
    Ok((v, fin + 1))
}

/// Découpe aux virgules de premier niveau.
fn arguments(jetons: &[Token]) -> Vec<&[Token]> {
    let mut out = Vec::new();
    let mut profondeur = 0usize;
    let mut debut = 0;

    for (k, t) in jetons.iter().enumerate() {
        if t.kind != TokenKind::Delimiter {
            continue;
        }
        match t.text.as_str() {
            s if is_ouvrante(s) => profondeur += 1,
            s if is_fermante(s) => profondeur = profondeur.saturating_sub(1),
            "," if profondeur == 0 => {
                out.push(&jetons[debut..k]);
                debut = k + 1;
            }
            _ => {}
        }
    }
    out.push(&jetons[debut..]);
    out
}

/* ------------------------ Réduction par niveaux ------------------------ */

fn reduire(elements: &mut Vec<Element>, ctx: &mut Contexte) -> Resultat<Number> {
    for niveau in niveaux() {
        match niveau {
            PRECEDENCE_UNAIRE => {
                reduire_suffixes(elements, ctx)?;
                reduire_prefixes(elements, ctx)?;
            }
            PRECEDENCE_TERNAIRE => {
                let v = ternaire(elements, ctx)?;
                elements.clear();
                elements.push(Element::Valeur(v));
            }
            p => reduire_binaires(elements, p, ctx)?,
        }
    }

    match elements.as_slice() {
        [Element::Valeur(v)] => Ok(v.clone()),
        [] => Err(EvalError::MalformedExpression("expression vide".into())),
        reste => Err(EvalError::MalformedExpression(format!(
            "{} éléments restants au lieu d’un seul nombre",
            reste.len()
        ))),
    }
}

/// x! (gauche -> droite) : l’opérande est l’élément précédent.
fn reduire_suffixes(elements: &mut Vec<Element>, ctx: &mut Contexte) -> Resultat<()> {
    let mut i = 0;
    while i < elements.len() {
        match elements[i].op() {
            Some(op) if op.arity() == Arity::UnaryPostfix => {
                let x = i
                    .checked_sub(1)
                    .and_then(|k| elements[k].valeur())
                    .ok_or_else(|| manque(op))?;
                let v = op.apply_unary(x)?;
                ctx.noter(|| format!("{x}{} = {v}", op.symbol()));
                elements[i - 1] = Element::Valeur(v);
                elements.remove(i);
            }
            _ => i += 1,
        }
    }
    Ok(())
}

/// +x -x ~x !x (droite -> gauche) : l’opérande est l’élément suivant.
fn reduire_prefixes(elements: &mut Vec<Element>, ctx: &mut Contexte) -> Resultat<()> {
    let mut i = elements.len();
    while i > 0 {
        i -= 1;
        if let Some(op) = elements[i].op().filter(|op| op.arity() == Arity::UnaryPrefix) {
            let x = elements
                .get(i + 1)
                .and_then(Element::valeur)
                .ok_or_else(|| manque(op))?;
            let v = op.apply_unary(x)?;
            ctx.noter(|| format!("{}{x} = {v}", op.symbol()));
            elements[i] = Element::Valeur(v);
            elements.remove(i + 1);
        }
    }
    Ok(())
}

/// Un niveau binaire ; `^^` (droite) se lit de droite à gauche.
fn reduire_binaires(elements: &mut Vec<Element>, niveau: u8, ctx: &mut Contexte) -> Resultat<()> {
    let du_niveau = |e: &Element| {
        e.op()
            .filter(|op| op.arity() == Arity::Binary && op.precedence() == niveau)
    };

    let droite = CATALOGUE.iter().any(|op| {
        op.arity() == Arity::Binary && op.precedence() == niveau && op.associativity() == Associativity::Right
    });

    if droite {
        let mut i = elements.len();
        while i > 0 {
            i -= 1;
            if let Some(op) = du_niveau(&elements[i]) {
                appliquer_binaire(elements, i, op, ctx)?;
            }
        }
    } else {
        let mut i = 0;
        while i < elements.len() {
            match du_niveau(&elements[i]) {
                // le résultat prend la place de l’opérande gauche : même i
                Some(op) => appliquer_binaire(elements, i, op, ctx)?,
                None => i += 1,
            }
        }
    }
    Ok(())
}

/// Remplace [a, op, b] (op en `i`) par le résultat, placé en `i - 1`.
fn appliquer_binaire(elements: &mut Vec<Element>, i: usize, op: Operator, ctx: &mut Contexte) -> Resultat<()> {
    let a = i
        .checked_sub(1)
        .and_then(|k| elements[k].valeur())
        .ok_or_else(|| manque(op))?;
    let b = elements
        .get(i + 1)
        .and_then(Element::valeur)
        .ok_or_else(|| manque(op))?;

    let v = op.apply_binary(a, b, ctx.precision)?;
    ctx.noter(|| format!("{a} {} {b} = {v}", op.symbol()));
    elements.drain(i..=i + 1);
    elements[i - 1] = Element::Valeur(v);
    Ok(())
}

/// Niveau ternaire, associatif à droite :
///   a ? b : c ? d : e   == a ? b : (c ? d : e)
///   a ? b ? c : d : e   == a ? (b ? c : d) : e
fn ternaire(elements: &[Element], ctx: &mut Contexte) -> Resultat<Number> {
    ctx.entrer()?;
    let r = ternaire_borne(elements, ctx);
    ctx.sortir();
    r
}

fn ternaire_borne(elements: &[Element], ctx: &mut Contexte) -> Resultat<Number> {
    let question = elements.iter().position(|e| e.op() == Some(Operator::Conditional));
    let deux_points = elements.iter().position(|e| e.op() == Some(Operator::ConditionalElse));

    let q = match (question, deux_points) {
        (None, None) => return une_valeur(elements),
        (None, Some(_)) => return Err(EvalError::MalformedTernary("':' sans '?'".into())),
        (Some(q), Some(d)) if d < q => return Err(EvalError::MalformedTernary("':' avant '?'".into())),
        (Some(q), _) => q,
    };

    // ':' correspondant au même niveau d’imbrication
    let mut profondeur = 0usize;
    let mut correspondant = None;
    for (k, e) in elements.iter().enumerate().skip(q + 1) {
        match e.op() {
            Some(Operator::Conditional) => profondeur += 1,
            Some(Operator::ConditionalElse) if profondeur == 0 => {
                correspondant = Some(k);
                break;
            }
            Some(Operator::ConditionalElse) => profondeur -= 1,
            _ => {}
        }
    }
    let d = correspondant.ok_or_else(|| EvalError::MalformedTernary("'?' sans ':' correspondant".into()))?;

    let branche = |tranche: &[Element], ctx: &mut Contexte| {
        if tranche.is_empty() {
            Err(manque(Operator::Conditional))
        } else {
            ternaire(tranche, ctx)
        }
    };

    let condition = branche(&elements[..q], ctx)?;
    let alors = branche(&elements[q + 1..d], ctx)?;
    let sinon = branche(&elements[d + 1..], ctx)?;

    let v = Operator::apply_ternary(&condition, &alors, &sinon);
    ctx.noter(|| format!("{condition} ? {alors} : {sinon} = {v}"));
    Ok(v)
}

fn une_valeur(elements: &[Element]) -> Resultat<Number> {
    match elements {
        [Element::Valeur(v)] => Ok(v.clone()),
        [] => Err(EvalError::MalformedExpression("expression vide".into())),
        [.., Element::Op(op)] | [Element::Op(op), ..] => Err(manque(*op)),
        reste => Err(EvalError::MalformedExpression(format!(
            "{} valeurs sans opérateur entre elles",
            reste.len()
        ))),
    }
}

fn manque(op: Operator) -> EvalError {
    EvalError::MissingOperand(op.symbol().to_string())
}
