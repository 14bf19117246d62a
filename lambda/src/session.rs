use rpds::RedBlackTreeMap;

use crate::{
    substitute::{fresh_name, rename},
    term::{Identifier, Term, TermRef, VarSet},
};

pub type Bindings = RedBlackTreeMap<Identifier, TermRef>;

/// Replaces the free names of `term` that have a definition in `bindings`.
///
/// All names are replaced at once, so a definition is never resolved again
/// inside another one. Binders that would capture a free variable of an
/// inserted definition are renamed.
pub fn resolve(term: &TermRef, bindings: &Bindings) -> TermRef {
    fn rec(term: &TermRef, bindings: &Bindings, shadowed: &mut Vec<Identifier>) -> TermRef {
        match term.as_ref() {
            Term::Var(name) if shadowed.contains(name) => term.clone(),
            Term::Var(name) => bindings
                .get(name)
                .cloned()
                .unwrap_or_else(|| term.clone()),
            Term::Abs(param, body) => {
                let inserted: VarSet = body
                    .free_variables()
                    .iter()
                    .filter(|&name| name != param && !shadowed.contains(name))
                    .filter_map(|name| bindings.get(name))
                    .flat_map(|definition| definition.free_variables())
                    .collect();
                let (param, body) = if inserted.contains(param) {
                    let mut used = inserted;
                    used.extend(body.free_variables());
                    let fresh = fresh_name(param, &used);
                    let body = rename(body, param, &fresh);
                    (fresh, body)
                } else {
                    (param.clone(), body.clone())
                };
                shadowed.push(param.clone());
                let body = rec(&body, bindings, shadowed);
                shadowed.pop();
                Term::abs(param, body)
            }
            Term::Apply(lhs, rhs) => Term::apply(
                rec(lhs, bindings, shadowed),
                rec(rhs, bindings, shadowed),
            ),
        }
    }
    rec(term, bindings, &mut vec![])
}

/// Named terms of one shell session, plus the result of the last command as `it`.
#[derive(Default, Clone, Debug)]
pub struct Session {
    bindings: Bindings,
}

impl Session {
    pub const IT: &'static str = "it";

    pub fn new(bindings: Bindings) -> Self {
        Self { bindings }
    }

    pub fn define(&mut self, name: impl Into<Identifier>, term: TermRef) {
        self.bindings = self.bindings.insert(name.into(), term);
    }

    pub fn set_it(&mut self, term: TermRef) {
        self.define(Self::IT, term);
    }

    pub fn get(&self, name: &str) -> Option<&TermRef> {
        self.bindings.get(name)
    }

    /// Sorted by name.
    pub fn iter(&self) -> impl Iterator<Item = (&Identifier, &TermRef)> {
        self.bindings.iter()
    }

    pub fn resolve(&self, term: &TermRef) -> TermRef {
        resolve(term, &self.bindings)
    }
}
