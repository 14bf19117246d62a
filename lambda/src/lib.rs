pub mod alpha;
pub mod encodings;
pub mod parser;
pub mod reduce;
pub mod session;
pub mod shell;
pub mod substitute;
pub mod term;

pub use alpha::is_alpha_equivalent;
pub use reduce::{
    is_normal_form, is_redex, reduce_to_normal_form, step_normal_order, ConfigError, Evaluator,
    Reduction, Strategy,
};
pub use substitute::substitute;
pub use term::{Identifier, Term, TermRef, VarSet};
