use std::{collections::BTreeSet, rc::Rc};

pub type Identifier = Rc<str>;
pub type TermRef = Rc<Term>;
pub type VarSet = BTreeSet<Identifier>;

#[derive(PartialEq, Eq, Debug)]
pub enum Term {
    /// `x`
    Var(Identifier),
    /// `λx. t`
    Abs(Identifier, TermRef),
    /// `t t`
    Apply(TermRef, TermRef),
}

impl Term {
    pub fn var(name: impl Into<Identifier>) -> TermRef {
        Term::Var(name.into()).into()
    }

    pub fn abs(param: impl Into<Identifier>, body: TermRef) -> TermRef {
        Term::Abs(param.into(), body).into()
    }

    pub fn apply(lhs: TermRef, rhs: TermRef) -> TermRef {
        Term::Apply(lhs, rhs).into()
    }

    /// Names occurring outside of any binder of the same name.
    pub fn free_variables(&self) -> VarSet {
        match self {
            Term::Var(name) => VarSet::from([name.clone()]),
            Term::Abs(param, body) => {
                let mut vars = body.free_variables();
                vars.remove(param);
                vars
            }
            Term::Apply(lhs, rhs) => {
                let mut vars = lhs.free_variables();
                vars.extend(rhs.free_variables());
                vars
            }
        }
    }

    /// Names introduced by some abstraction inside this term.
    pub fn bound_variables(&self) -> VarSet {
        match self {
            Term::Var(_) => VarSet::new(),
            Term::Abs(param, body) => {
                let mut vars = body.bound_variables();
                vars.insert(param.clone());
                vars
            }
            Term::Apply(lhs, rhs) => {
                let mut vars = lhs.bound_variables();
                vars.extend(rhs.bound_variables());
                vars
            }
        }
    }

    /// Number of nodes.
    pub fn size(&self) -> usize {
        match self {
            Term::Var(_) => 1,
            Term::Abs(_, body) => 1 + body.size(),
            Term::Apply(lhs, rhs) => 1 + lhs.size() + rhs.size(),
        }
    }

    /// Longest path from the root to a leaf, counted in nodes.
    pub fn depth(&self) -> usize {
        match self {
            Term::Var(_) => 1,
            Term::Abs(_, body) => 1 + body.depth(),
            Term::Apply(lhs, rhs) => 1 + lhs.depth().max(rhs.depth()),
        }
    }
}

impl std::fmt::Display for Term {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Term::Var(name) => f.write_str(name),
            Term::Abs(param, body) => f.write_fmt(format_args!("λ{param}.{body}")),
            Term::Apply(lhs, rhs) => {
                if let Term::Abs(..) = lhs.as_ref() {
                    f.write_fmt(format_args!("({lhs})"))?;
                } else {
                    f.write_fmt(format_args!("{lhs}"))?;
                }
                f.write_str(" ")?;
                match rhs.as_ref() {
                    Term::Var(_) => f.write_fmt(format_args!("{rhs}")),
                    Term::Abs(..) | Term::Apply(..) => f.write_fmt(format_args!("({rhs})")),
                }
            }
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn names(vars: &VarSet) -> Vec<&str> {
        vars.iter().map(AsRef::as_ref).collect()
    }

    #[test]
    fn test_free_and_bound_variables() {
        // λx.x y
        let term = Term::abs("x", Term::apply(Term::var("x"), Term::var("y")));
        assert_eq!(names(&term.free_variables()), vec!["y"]);
        assert_eq!(names(&term.bound_variables()), vec!["x"]);

        // (λx.x) x: x is both bound and free
        let term = Term::apply(Term::abs("x", Term::var("x")), Term::var("x"));
        assert_eq!(names(&term.free_variables()), vec!["x"]);
        assert_eq!(names(&term.bound_variables()), vec!["x"]);
    }

    #[test]
    fn test_display() {
        let id = Term::abs("x", Term::var("x"));
        assert_eq!(id.to_string(), "λx.x");
        assert_eq!(
            Term::apply(id.clone(), Term::var("y")).to_string(),
            "(λx.x) y"
        );
        assert_eq!(
            Term::apply(Term::var("f"), Term::apply(Term::var("g"), Term::var("x"))).to_string(),
            "f (g x)"
        );
        assert_eq!(
            Term::apply(Term::apply(Term::var("f"), Term::var("g")), Term::var("x")).to_string(),
            "f g x"
        );
        assert_eq!(
            Term::apply(Term::var("f"), id.clone()).to_string(),
            "f (λx.x)"
        );
        assert_eq!(
            Term::abs("f", Term::abs("x", Term::apply(Term::var("f"), Term::var("x")))).to_string(),
            "λf.λx.f x"
        );
    }

    #[test]
    fn test_size_and_depth() {
        let term = Term::abs("x", Term::apply(Term::var("x"), Term::var("y")));
        assert_eq!(term.size(), 4);
        assert_eq!(term.depth(), 3);
    }
}
