//! Church encodings of booleans, numerals, pairs and lists.
//!
//! Definitions may refer to the ones listed before them; those references are
//! resolved when the table is built, so every definition is a closed term.

use crate::{
    alpha::is_alpha_equivalent,
    parser::parse,
    reduce::Evaluator,
    session::{resolve, Bindings},
    term::{Term, TermRef},
};

const DEFINITIONS: &[(&str, &str)] = &[
    ("TRUE", "λx.λy.x"),
    ("FALSE", "λx.λy.y"),
    ("AND", "λp.λq.p q p"),
    ("OR", "λp.λq.p p q"),
    ("NOT", "λp.λa.λb.p b a"),
    ("IF_THEN_ELSE", "λp.λa.λb.p a b"),
    ("ZERO", "λf.λx.x"),
    ("ONE", "λf.λx.f x"),
    ("TWO", "λf.λx.f (f x)"),
    ("THREE", "λf.λx.f (f (f x))"),
    ("SUCC", "λn.λf.λx.f (n f x)"),
    ("PLUS", "λm.λn.λf.λx.m f (n f x)"),
    ("MULT", "λm.λn.λf.m (n f)"),
    ("POW", "λm.λn.n m"),
    ("PRED", "λn.λf.λx.n (λg.λh.h (g f)) (λu.x) (λu.u)"),
    ("SUB", "λm.λn.n PRED m"),
    ("IS_ZERO", "λn.n (λx.FALSE) TRUE"),
    ("LEQ", "λm.λn.IS_ZERO (SUB m n)"),
    ("EQ", "λm.λn.AND (LEQ m n) (LEQ n m)"),
    ("PAIR", "λx.λy.λf.f x y"),
    ("FIRST", "λp.p (λx.λy.x)"),
    ("SECOND", "λp.p (λx.λy.y)"),
    ("NIL", "λx.TRUE"),
    ("IS_NIL", "λl.l (λh.λt.FALSE)"),
    ("CONS", "λh.λt.λc.c h t"),
    ("HEAD", "λl.l (λh.λt.h)"),
    ("TAIL", "λl.l (λh.λt.t)"),
];

#[derive(Clone, Debug)]
pub struct Encodings {
    bindings: Bindings,
}

impl Default for Encodings {
    fn default() -> Self {
        Self::new()
    }
}

impl Encodings {
    pub fn new() -> Self {
        let bindings = DEFINITIONS
            .iter()
            .fold(Bindings::new(), |bindings, (name, source)| {
                let term = parse(source)
                    .unwrap_or_else(|es| unreachable!("definition of {name} is malformed: {es:?}"));
                let term = resolve(&term, &bindings);
                bindings.insert((*name).into(), term)
            });
        Self { bindings }
    }

    pub fn get(&self, name: &str) -> Option<&TermRef> {
        self.bindings.get(name)
    }

    pub fn bindings(&self) -> &Bindings {
        &self.bindings
    }

    fn definition(&self, name: &str) -> TermRef {
        self.get(name)
            .cloned()
            .unwrap_or_else(|| unreachable!("{name} is a built-in definition"))
    }

    /// `SUCC` applied `n` times to `ZERO`, left unreduced.
    pub fn church_numeral(&self, n: u64) -> TermRef {
        let succ = self.definition("SUCC");
        (0..n).fold(self.definition("ZERO"), |numeral, _| {
            Term::apply(succ.clone(), numeral)
        })
    }

    /// `CONS` cells ending in `NIL`.
    pub fn church_list(&self, items: impl IntoIterator<Item = TermRef>) -> TermRef {
        let cons = self.definition("CONS");
        let items = items.into_iter().collect::<Vec<_>>();
        items
            .into_iter()
            .rev()
            .fold(self.definition("NIL"), |list, item| {
                Term::apply(Term::apply(cons.clone(), item), list)
            })
    }

    /// Reduces `term` and compares the result with `TRUE` and `FALSE`.
    pub fn to_boolean(&self, term: &TermRef, evaluator: &Evaluator) -> Option<bool> {
        let reduced = evaluator.evaluate(term).term;
        if is_alpha_equivalent(&reduced, &self.definition("TRUE")) {
            Some(true)
        } else if is_alpha_equivalent(&reduced, &self.definition("FALSE")) {
            Some(false)
        } else {
            None
        }
    }
}

/// Reads `λf.λx.f (f (... x))` back as the number of `f` applications.
pub fn extract_church_numeral(term: &Term) -> Option<u64> {
    let Term::Abs(f, body) = term else {
        return None;
    };
    let Term::Abs(x, body) = body.as_ref() else {
        return None;
    };
    let mut count = 0;
    let mut current = body.as_ref();
    while let Term::Apply(lhs, rhs) = current {
        if !matches!(lhs.as_ref(), Term::Var(name) if name == f) {
            return None;
        }
        current = rhs.as_ref();
        count += 1;
    }
    matches!(current, Term::Var(name) if name == x).then_some(count)
}
