use crate::term::{Identifier, Term, TermRef, VarSet};

/// Picks `base`, or `base1`, `base2`, ... whichever comes first outside `used`.
///
/// Only `used` is consulted, so a name like `x1` that exists elsewhere in the
/// surrounding term is not avoided unless the caller includes it.
pub fn fresh_name(base: &str, used: &VarSet) -> Identifier {
    if !used.contains(base) {
        return base.into();
    }
    (1usize..)
        .map(|i| format!("{base}{i}"))
        .find(|name| !used.contains(name.as_str()))
        .map(Identifier::from)
        .unwrap_or_else(|| unreachable!("the suffix space is unbounded"))
}

/// Renames the free occurrences of `from` in `term` to `to`.
pub fn rename(term: &TermRef, from: &str, to: &Identifier) -> TermRef {
    substitute(term, from, &Term::var(to.clone()))
}

/// Replaces every free occurrence of `var` in `term` with `replacement`,
/// renaming binders which would capture a free variable of `replacement`.
pub fn substitute(term: &TermRef, var: &str, replacement: &TermRef) -> TermRef {
    use Term::*;
    match term.as_ref() {
        Var(name) if name.as_ref() == var => replacement.clone(),
        Var(_) => term.clone(),
        Abs(param, _) if param.as_ref() == var => term.clone(),
        Abs(param, body) => {
            let replacement_free = replacement.free_variables();
            if replacement_free.contains(param) {
                let mut used = replacement_free;
                used.extend(body.free_variables());
                used.insert(var.into());
                let fresh = fresh_name(param, &used);
                let body = rename(body, param, &fresh);
                Term::abs(fresh, substitute(&body, var, replacement))
            } else {
                Term::abs(param.clone(), substitute(body, var, replacement))
            }
        }
        Apply(lhs, rhs) => Term::apply(
            substitute(lhs, var, replacement),
            substitute(rhs, var, replacement),
        ),
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn set(names: &[&str]) -> VarSet {
        names.iter().map(|&n| Identifier::from(n)).collect()
    }

    #[test]
    fn test_fresh_name() {
        assert_eq!(fresh_name("x", &set(&[])).as_ref(), "x");
        assert_eq!(fresh_name("x", &set(&["y"])).as_ref(), "x");
        assert_eq!(fresh_name("x", &set(&["x"])).as_ref(), "x1");
        assert_eq!(fresh_name("x", &set(&["x", "x1", "x2"])).as_ref(), "x3");
        assert_eq!(fresh_name("x", &set(&["x", "x2"])).as_ref(), "x1");
    }

    #[test]
    fn test_substitute_variable() {
        let y = Term::var("y");
        assert_eq!(substitute(&Term::var("x"), "x", &y), y);
        assert_eq!(substitute(&Term::var("z"), "x", &y), Term::var("z"));
    }

    #[test]
    fn test_substitute_shadowed() {
        // (λx.x)[x := y] = λx.x
        let term = Term::abs("x", Term::var("x"));
        assert_eq!(substitute(&term, "x", &Term::var("y")), term);
    }

    #[test]
    fn test_substitute_avoids_capture() {
        // (λy.x)[x := y] = λy1.y
        let term = Term::abs("y", Term::var("x"));
        let result = substitute(&term, "x", &Term::var("y"));
        assert_eq!(result, Term::abs("y1", Term::var("y")));
        assert_ne!(result, Term::abs("y", Term::var("y")));
    }

    #[test]
    fn test_substitute_renames_bound_occurrences() {
        // (λy.z x y)[x := y] = λy1.z y y1
        let term = Term::abs(
            "y",
            Term::apply(
                Term::apply(Term::var("z"), Term::var("x")),
                Term::var("y"),
            ),
        );
        let result = substitute(&term, "x", &Term::var("y"));
        assert_eq!(result.to_string(), "λy1.z y y1");
    }

    #[test]
    fn test_substitute_fresh_name_skips_body_names() {
        // (λy.x y1)[x := y] = λy2.y y1
        let term = Term::abs("y", Term::apply(Term::var("x"), Term::var("y1")));
        let result = substitute(&term, "x", &Term::var("y"));
        assert_eq!(result.to_string(), "λy2.y y1");
    }

    #[test]
    fn test_substitute_fresh_name_skips_target() {
        // (λy.y)[y1 := y] = λy2.y2
        let term = Term::abs("y", Term::var("y"));
        let result = substitute(&term, "y1", &Term::var("y"));
        assert_eq!(result.to_string(), "λy2.y2");
    }

    #[test]
    fn test_substitute_no_capture_risk() {
        // (λy.x y)[x := z] = λy.z y
        let term = Term::abs("y", Term::apply(Term::var("x"), Term::var("y")));
        let result = substitute(&term, "x", &Term::var("z"));
        assert_eq!(result.to_string(), "λy.z y");
    }

    #[test]
    fn test_rename() {
        let term = Term::apply(Term::var("x"), Term::abs("x", Term::var("x")));
        assert_eq!(rename(&term, "x", &"w".into()).to_string(), "w (λx.x)");
    }
}
