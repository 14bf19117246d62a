use thiserror::Error;
use tracing::{debug, trace};

use crate::{
    substitute::substitute,
    term::{Term, TermRef},
};

pub const DEFAULT_MAX_STEPS: usize = 1000;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Unknown evaluation strategy `{0}`, expected `normal` or `applicative`")]
    UnknownStrategy(String),
    #[error("Invalid step budget {0}, at least one step is required")]
    InvalidStepBudget(usize),
}

#[derive(PartialEq, Eq, Clone, Copy, Default, derive_more::Display, Debug)]
pub enum Strategy {
    /// Leftmost-outermost.
    #[default]
    #[display(fmt = "normal")]
    Normal,
    /// Right-to-left innermost.
    #[display(fmt = "applicative")]
    Applicative,
}

impl std::str::FromStr for Strategy {
    type Err = ConfigError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "normal" => Ok(Strategy::Normal),
            "applicative" => Ok(Strategy::Applicative),
            _ => Err(ConfigError::UnknownStrategy(s.to_string())),
        }
    }
}

/// A step from a node to one of its children.
#[derive(PartialEq, Eq, Clone, Copy, derive_more::Display, Debug)]
pub enum Direction {
    #[display(fmt = "left")]
    Left,
    #[display(fmt = "right")]
    Right,
    #[display(fmt = "body")]
    Body,
}

pub type Path = Vec<Direction>;

#[derive(Clone, Debug)]
pub struct Reduction {
    pub term: TermRef,
    pub steps: usize,
    /// `false` when the step budget ran out first.
    pub normal_form: bool,
    /// Rendered term after each step, when tracing is enabled.
    pub trace: Vec<String>,
}

pub fn is_redex(term: &Term) -> bool {
    matches!(term, Term::Apply(lhs, _) if matches!(lhs.as_ref(), Term::Abs(..)))
}

/// Beta-contracts `term`, which has to be a redex.
fn contract(term: &Term) -> Option<TermRef> {
    if let Term::Apply(lhs, arg) = term {
        if let Term::Abs(param, body) = lhs.as_ref() {
            return Some(substitute(body, param, arg));
        }
    }
    None
}

fn reduce_once(term: &TermRef) -> Option<TermRef> {
    use Term::*;
    match term.as_ref() {
        Var(_) => None,
        Abs(param, body) => Some(Term::abs(param.clone(), reduce_once(body)?)),
        Apply(lhs, rhs) => {
            if let Some(reduced) = contract(term) {
                return Some(reduced);
            }
            if let Some(lhs) = reduce_once(lhs) {
                return Some(Term::apply(lhs, rhs.clone()));
            }
            Some(Term::apply(lhs.clone(), reduce_once(rhs)?))
        }
    }
}

/// Performs one leftmost-outermost beta step. The flag tells whether anything changed.
pub fn step_normal_order(term: &TermRef) -> (TermRef, bool) {
    match reduce_once(term) {
        Some(reduced) => (reduced, true),
        None => (term.clone(), false),
    }
}

pub fn is_normal_form(term: &Term) -> bool {
    match term {
        Term::Var(_) => true,
        Term::Abs(_, body) => is_normal_form(body),
        Term::Apply(lhs, rhs) => {
            !matches!(lhs.as_ref(), Term::Abs(..)) && is_normal_form(lhs) && is_normal_form(rhs)
        }
    }
}

/// Locates the redex applicative order reduces next: right child first, then
/// left child, then the node itself.
pub fn find_innermost_redex(term: &Term) -> Option<Path> {
    fn rec(term: &Term, path: &mut Path) -> bool {
        match term {
            Term::Var(_) => false,
            Term::Abs(_, body) => {
                path.push(Direction::Body);
                if rec(body, path) {
                    return true;
                }
                path.pop();
                false
            }
            Term::Apply(lhs, rhs) => {
                path.push(Direction::Right);
                if rec(rhs, path) {
                    return true;
                }
                path.pop();
                path.push(Direction::Left);
                if rec(lhs, path) {
                    return true;
                }
                path.pop();
                is_redex(term)
            }
        }
    }
    let mut path = vec![];
    rec(term, &mut path).then_some(path)
}

pub fn subterm_at<'a>(term: &'a TermRef, path: &[Direction]) -> &'a TermRef {
    path.iter()
        .fold(term, |node, direction| match (node.as_ref(), direction) {
            (Term::Abs(_, body), Direction::Body) => body,
            (Term::Apply(lhs, _), Direction::Left) => lhs,
            (Term::Apply(_, rhs), Direction::Right) => rhs,
            _ => unreachable!("path {path:?} does not address a subterm of {term}"),
        })
}

pub fn replace_at_path(term: &TermRef, path: &[Direction], replacement: TermRef) -> TermRef {
    let Some((direction, rest)) = path.split_first() else {
        return replacement;
    };
    match (term.as_ref(), direction) {
        (Term::Abs(param, body), Direction::Body) => {
            Term::abs(param.clone(), replace_at_path(body, rest, replacement))
        }
        (Term::Apply(lhs, rhs), Direction::Left) => {
            Term::apply(replace_at_path(lhs, rest, replacement), rhs.clone())
        }
        (Term::Apply(lhs, rhs), Direction::Right) => {
            Term::apply(lhs.clone(), replace_at_path(rhs, rest, replacement))
        }
        _ => unreachable!("path {path:?} does not address a subterm of {term}"),
    }
}

fn step_applicative_order(term: &TermRef) -> Option<TermRef> {
    let path = find_innermost_redex(term)?;
    let redex = subterm_at(term, &path);
    let reduced = contract(redex)
        .unwrap_or_else(|| unreachable!("{redex} at {path:?} is not a redex"));
    Some(replace_at_path(term, &path, reduced))
}

/// Strategy, step budget and tracing for a reduction run.
#[derive(PartialEq, Eq, Clone, Copy, Debug)]
pub struct Evaluator {
    strategy: Strategy,
    max_steps: usize,
    record_trace: bool,
}

impl Default for Evaluator {
    fn default() -> Self {
        Self {
            strategy: Strategy::Normal,
            max_steps: DEFAULT_MAX_STEPS,
            record_trace: false,
        }
    }
}

impl Evaluator {
    pub fn new(strategy: Strategy, max_steps: usize) -> Result<Self, ConfigError> {
        if max_steps == 0 {
            return Err(ConfigError::InvalidStepBudget(max_steps));
        }
        Ok(Self {
            strategy,
            max_steps,
            record_trace: false,
        })
    }

    pub fn with_strategy(self, strategy: Strategy) -> Self {
        Self { strategy, ..self }
    }

    pub fn with_trace(self, record_trace: bool) -> Self {
        Self {
            record_trace,
            ..self
        }
    }

    pub fn strategy(&self) -> Strategy {
        self.strategy
    }

    pub fn max_steps(&self) -> usize {
        self.max_steps
    }

    pub fn record_trace(&self) -> bool {
        self.record_trace
    }

    pub fn evaluate(&self, term: &TermRef) -> Reduction {
        debug!(
            strategy = %self.strategy,
            max_steps = self.max_steps,
            size = term.size(),
            depth = term.depth(),
            "reducing {term}"
        );
        let reduction = match self.strategy {
            Strategy::Normal => self.drive(term, reduce_once),
            Strategy::Applicative => self.drive(term, step_applicative_order),
        };
        if reduction.normal_form {
            debug!(steps = reduction.steps, "reached normal form");
        } else {
            debug!(steps = reduction.steps, "step budget exhausted");
        }
        reduction
    }

    fn drive(&self, term: &TermRef, step: impl Fn(&TermRef) -> Option<TermRef>) -> Reduction {
        let mut reduction = Reduction {
            term: term.clone(),
            steps: 0,
            normal_form: false,
            trace: vec![],
        };
        while reduction.steps < self.max_steps {
            let Some(next) = step(&reduction.term) else {
                reduction.normal_form = true;
                return reduction;
            };
            reduction.steps += 1;
            trace!(step = reduction.steps, "{next}");
            if self.record_trace {
                reduction.trace.push(next.to_string());
            }
            reduction.term = next;
        }
        reduction
    }
}

/// Reduces `term` under the strategy named `strategy`.
///
/// Unknown strategy names and a zero budget are rejected before any step is taken.
pub fn reduce_to_normal_form(
    term: &TermRef,
    strategy: &str,
    max_steps: usize,
) -> Result<Reduction, ConfigError> {
    let evaluator = Evaluator::new(strategy.parse()?, max_steps)?;
    Ok(evaluator.evaluate(term))
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::alpha::is_alpha_equivalent;

    fn id(x: &str) -> TermRef {
        Term::abs(x, Term::var(x))
    }

    fn omega() -> TermRef {
        let half = Term::abs("x", Term::apply(Term::var("x"), Term::var("x")));
        Term::apply(half.clone(), half)
    }

    #[test]
    fn test_is_redex() {
        assert!(is_redex(&Term::apply(id("x"), Term::var("y"))));
        assert!(!is_redex(&Term::apply(Term::var("f"), id("x"))));
        assert!(!is_redex(&id("x")));
        assert!(!is_redex(&Term::var("x")));
    }

    #[test]
    fn test_single_beta_step() {
        let term = Term::apply(id("x"), Term::var("y"));
        let (reduced, changed) = step_normal_order(&term);
        assert!(changed);
        assert_eq!(reduced, Term::var("y"));
        assert!(is_normal_form(&reduced));

        let (same, changed) = step_normal_order(&reduced);
        assert!(!changed);
        assert_eq!(same, reduced);

        let reduction = reduce_to_normal_form(&term, "normal", DEFAULT_MAX_STEPS).unwrap();
        assert_eq!(reduction.steps, 1);
        assert!(reduction.normal_form);
        assert_eq!(reduction.term, Term::var("y"));
    }

    #[test]
    fn test_normal_order_is_leftmost_outermost() {
        // (λx.z) ((λy.y) w) -> z in one step
        let term = Term::apply(
            Term::abs("x", Term::var("z")),
            Term::apply(id("y"), Term::var("w")),
        );
        let (reduced, changed) = step_normal_order(&term);
        assert!(changed);
        assert_eq!(reduced, Term::var("z"));

        // f ((λx.x) a) ((λy.y) b) reduces the left argument first
        let term = Term::apply(
            Term::apply(Term::var("f"), Term::apply(id("x"), Term::var("a"))),
            Term::apply(id("y"), Term::var("b")),
        );
        let (reduced, _) = step_normal_order(&term);
        assert_eq!(reduced.to_string(), "f a ((λy.y) b)");
    }

    #[test]
    fn test_normal_order_reduces_under_binders() {
        let term = Term::abs("z", Term::apply(id("x"), Term::var("z")));
        let (reduced, changed) = step_normal_order(&term);
        assert!(changed);
        assert_eq!(reduced.to_string(), "λz.z");
    }

    #[test]
    fn test_find_innermost_redex_prefers_right() {
        // ((λx.x) a) ((λy.y) b)
        let term = Term::apply(
            Term::apply(id("x"), Term::var("a")),
            Term::apply(id("y"), Term::var("b")),
        );
        assert_eq!(find_innermost_redex(&term), Some(vec![Direction::Right]));

        // (λx.x) ((λy.y) b): the argument comes before the node itself
        let term = Term::apply(id("x"), Term::apply(id("y"), Term::var("b")));
        assert_eq!(find_innermost_redex(&term), Some(vec![Direction::Right]));

        let term = Term::abs("z", Term::apply(id("x"), Term::var("z")));
        assert_eq!(find_innermost_redex(&term), Some(vec![Direction::Body]));

        // (λx.(λy.y) x) a: the function's redex comes before the node itself
        let term = Term::apply(
            Term::abs("x", Term::apply(id("y"), Term::var("x"))),
            Term::var("a"),
        );
        assert_eq!(
            find_innermost_redex(&term),
            Some(vec![Direction::Left, Direction::Body])
        );

        assert_eq!(find_innermost_redex(&id("x")), None);
        assert_eq!(
            find_innermost_redex(&Term::apply(id("x"), Term::var("a"))),
            Some(vec![])
        );
    }

    #[test]
    fn test_replace_at_path() {
        let term = Term::abs("z", Term::apply(Term::var("f"), Term::var("z")));
        let replaced = replace_at_path(
            &term,
            &[Direction::Body, Direction::Right],
            Term::var("w"),
        );
        assert_eq!(replaced.to_string(), "λz.f w");
        assert_eq!(
            subterm_at(&term, &[Direction::Body, Direction::Left]),
            &Term::var("f")
        );
    }

    #[test]
    #[should_panic]
    fn test_replace_at_invalid_path() {
        replace_at_path(&Term::var("x"), &[Direction::Left], Term::var("y"));
    }

    #[test]
    #[should_panic]
    fn test_subterm_at_invalid_path() {
        subterm_at(&id("x"), &[Direction::Right]);
    }

    #[test]
    fn test_applicative_order_evaluates_arguments_first() {
        // (λx.z) ((λy.y) w): argument first, then the outer redex
        let term = Term::apply(
            Term::abs("x", Term::var("z")),
            Term::apply(id("y"), Term::var("w")),
        );
        let reduction = reduce_to_normal_form(&term, "applicative", DEFAULT_MAX_STEPS).unwrap();
        assert_eq!(reduction.steps, 2);
        assert!(reduction.normal_form);
        assert_eq!(reduction.term, Term::var("z"));

        let reduction = reduce_to_normal_form(&term, "normal", DEFAULT_MAX_STEPS).unwrap();
        assert_eq!(reduction.steps, 1);
    }

    #[test]
    fn test_applicative_diverges_where_normal_terminates() {
        // (λx.y) Ω
        let term = Term::apply(Term::abs("x", Term::var("y")), omega());
        let normal = reduce_to_normal_form(&term, "normal", 50).unwrap();
        assert!(normal.normal_form);
        assert_eq!(normal.term, Term::var("y"));

        let applicative = reduce_to_normal_form(&term, "applicative", 50).unwrap();
        assert!(!applicative.normal_form);
        assert_eq!(applicative.steps, 50);
    }

    #[test]
    fn test_omega_exhausts_budget() {
        for strategy in ["normal", "applicative"] {
            let reduction = reduce_to_normal_form(&omega(), strategy, DEFAULT_MAX_STEPS).unwrap();
            assert!(!reduction.normal_form);
            assert_eq!(reduction.steps, DEFAULT_MAX_STEPS);
            assert!(!matches!(reduction.term.as_ref(), Term::Var(_)));
            assert!(is_alpha_equivalent(&reduction.term, &omega()));
        }
    }

    #[test]
    fn test_is_normal_form() {
        assert!(is_normal_form(&Term::var("x")));
        assert!(is_normal_form(&id("x")));
        assert!(is_normal_form(&Term::apply(Term::var("f"), id("x"))));
        assert!(!is_normal_form(&Term::apply(id("x"), Term::var("y"))));
        assert!(!is_normal_form(&Term::abs(
            "z",
            Term::apply(Term::var("f"), Term::apply(id("x"), Term::var("y")))
        )));
    }

    #[test]
    fn test_configuration_errors() {
        let term = Term::apply(id("x"), Term::var("y"));
        assert_eq!(
            reduce_to_normal_form(&term, "lazy", 10).unwrap_err(),
            ConfigError::UnknownStrategy("lazy".to_string())
        );
        assert_eq!(
            reduce_to_normal_form(&term, "normal", 0).unwrap_err(),
            ConfigError::InvalidStepBudget(0)
        );
        assert_eq!("applicative".parse::<Strategy>(), Ok(Strategy::Applicative));
    }

    #[test]
    fn test_trace() {
        // (λx.λy.x) a b
        let term = Term::apply(
            Term::apply(Term::abs("x", Term::abs("y", Term::var("x"))), Term::var("a")),
            Term::var("b"),
        );
        let evaluator = Evaluator::default().with_trace(true);
        let reduction = evaluator.evaluate(&term);
        assert_eq!(reduction.trace, vec!["(λy.a) b", "a"]);

        let reduction = Evaluator::default().evaluate(&term);
        assert!(reduction.trace.is_empty());
        assert_eq!(reduction.steps, 2);
    }
}
