use crate::{
    substitute::{fresh_name, rename},
    term::{Term, TermRef},
};

/// Structural equality up to a consistent renaming of bound variables.
pub fn is_alpha_equivalent(lhs: &TermRef, rhs: &TermRef) -> bool {
    use Term::*;
    match (lhs.as_ref(), rhs.as_ref()) {
        (Var(x), Var(y)) => x == y,
        (Apply(lhs_fun, lhs_arg), Apply(rhs_fun, rhs_arg)) => {
            is_alpha_equivalent(lhs_fun, rhs_fun) && is_alpha_equivalent(lhs_arg, rhs_arg)
        }
        (Abs(lhs_param, lhs_body), Abs(rhs_param, rhs_body)) => {
            if lhs_param == rhs_param {
                return is_alpha_equivalent(lhs_body, rhs_body);
            }
            let mut used = lhs_body.free_variables();
            used.extend(rhs_body.free_variables());
            let fresh = fresh_name(lhs_param, &used);
            is_alpha_equivalent(
                &rename(lhs_body, lhs_param, &fresh),
                &rename(rhs_body, rhs_param, &fresh),
            )
        }
        _ => false,
    }
}
