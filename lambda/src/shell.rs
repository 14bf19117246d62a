//! Line-oriented commands over a [`Session`].
//!
//! The shell never prints; every command returns the lines it produced so the
//! caller decides where they go.

use thiserror::Error;
use tracing::debug;

use crate::{
    alpha::is_alpha_equivalent,
    encodings::{extract_church_numeral, Encodings},
    parser::{parse, tokenize, ParseErrors, Token},
    reduce::{step_normal_order, ConfigError, Evaluator, Reduction, Strategy},
    session::Session,
    term::{TermRef, VarSet},
};

#[derive(Debug, Error)]
pub enum ShellError {
    #[error("Failed to parse `{input}`")]
    Parse { input: String, errors: ParseErrors },
    #[error("Usage: {0}")]
    Usage(&'static str),
    #[error(transparent)]
    Config(#[from] ConfigError),
}

#[derive(PartialEq, Eq, Debug)]
pub enum Response {
    Output(Vec<String>),
    Quit,
}

const HELP: &[&str] = &[
    "Commands:",
    "  help                 Show this help",
    "  quit, exit           Leave the shell",
    "  vars                 List every defined name",
    "  let NAME EXPR        Define NAME as EXPR",
    "  step EXPR            Perform one normal order step",
    "  beta EXPR            Reduce with the configured strategy",
    "  normal EXPR          Reduce in normal order (leftmost outermost)",
    "  app EXPR             Reduce in applicative order (innermost first)",
    "  trace EXPR           Reduce in normal order, showing every step",
    "  church N             Build the Church numeral for N",
    "  extract EXPR         Reduce and read the result as a Church numeral",
    "  bool EXPR            Reduce and read the result as a Church boolean",
    "  free EXPR            Show free and bound variables",
    "  alpha EXPR ; EXPR    Compare two terms up to renaming of bound variables",
    "  set strategy NAME    Use `normal` or `applicative` for `beta`",
    "  set steps N          Limit every reduction to N steps",
    "  set trace on|off     Show every step of every reduction",
    "Syntax:",
    "  x  λx.M  \\x.M  M N  (M)",
    "Any other input is parsed, shown and bound to `it`.",
];

pub struct Shell {
    session: Session,
    encodings: Encodings,
    evaluator: Evaluator,
}

impl Shell {
    /// A shell whose session starts with every Church encoding defined.
    pub fn new(evaluator: Evaluator) -> Self {
        let encodings = Encodings::new();
        let session = Session::new(encodings.bindings().clone());
        Self {
            session,
            encodings,
            evaluator,
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn evaluator(&self) -> &Evaluator {
        &self.evaluator
    }

    pub fn execute(&mut self, input: &str) -> Result<Response, ShellError> {
        let input = input.trim();
        if input.is_empty() {
            return Ok(Response::Output(vec![]));
        }
        let (command, args) = input
            .split_once(char::is_whitespace)
            .map(|(command, args)| (command, args.trim()))
            .unwrap_or((input, ""));
        let command = command.to_lowercase();
        debug!(command = command.as_str(), "executing");
        let lines: Vec<String> = match command.as_str() {
            "help" => HELP.iter().map(|line| line.to_string()).collect(),
            "quit" | "exit" => return Ok(Response::Quit),
            "vars" => self.vars(),
            "let" => self.define(args)?,
            "step" => self.step(args)?,
            "beta" => {
                let evaluator = self.evaluator;
                self.reduce(args, evaluator, "beta EXPR")?
            }
            "normal" => {
                let evaluator = self.evaluator.with_strategy(Strategy::Normal);
                self.reduce(args, evaluator, "normal EXPR")?
            }
            "app" => {
                let evaluator = self.evaluator.with_strategy(Strategy::Applicative);
                self.reduce(args, evaluator, "app EXPR")?
            }
            "trace" => {
                let evaluator = self
                    .evaluator
                    .with_strategy(Strategy::Normal)
                    .with_trace(true);
                self.reduce(args, evaluator, "trace EXPR")?
            }
            "church" => self.church(args)?,
            "extract" => self.extract(args)?,
            "bool" => self.boolean(args)?,
            "free" => self.free(args)?,
            "alpha" => self.alpha(args)?,
            "set" => self.set(args)?,
            _ => {
                let term = self.expression(input, "EXPR")?;
                self.session.set_it(term.clone());
                vec![format!("Parsed: {term}")]
            }
        };
        Ok(Response::Output(lines))
    }

    /// Parses `source` and resolves the session's names in it.
    fn expression(&self, source: &str, usage: &'static str) -> Result<TermRef, ShellError> {
        if source.is_empty() {
            return Err(ShellError::Usage(usage));
        }
        let term = parse(source).map_err(|errors| ShellError::Parse {
            input: source.to_string(),
            errors,
        })?;
        Ok(self.session.resolve(&term))
    }

    fn vars(&self) -> Vec<String> {
        std::iter::once("Defined variables:".to_string())
            .chain(
                self.session
                    .iter()
                    .map(|(name, term)| format!("  {name} = {term}")),
            )
            .collect()
    }

    fn define(&mut self, args: &str) -> Result<Vec<String>, ShellError> {
        const USAGE: &str = "let NAME EXPR";
        let (name, source) = args
            .split_once(char::is_whitespace)
            .ok_or(ShellError::Usage(USAGE))?;
        let is_identifier = matches!(
            tokenize(name).as_deref(),
            Ok([token]) if matches!(token.value(), Token::Ident(_))
        );
        if !is_identifier {
            return Err(ShellError::Usage(USAGE));
        }
        let term = self.expression(source.trim(), USAGE)?;
        self.session.define(name, term.clone());
        Ok(vec![format!("Defined {name} = {term}")])
    }

    fn step(&mut self, args: &str) -> Result<Vec<String>, ShellError> {
        let term = self.expression(args, "step EXPR")?;
        let (reduced, changed) = step_normal_order(&term);
        self.session.set_it(reduced.clone());
        if changed {
            Ok(vec![format!("Result: {reduced}")])
        } else {
            Ok(vec!["Expression is already in normal form.".to_string()])
        }
    }

    fn reduce(
        &mut self,
        args: &str,
        evaluator: Evaluator,
        usage: &'static str,
    ) -> Result<Vec<String>, ShellError> {
        let term = self.expression(args, usage)?;
        let Reduction {
            term,
            steps,
            normal_form,
            trace,
        } = evaluator.evaluate(&term);
        self.session.set_it(term.clone());

        let mut lines = trace
            .iter()
            .enumerate()
            .map(|(i, step)| format!("  {}: {step}", i + 1))
            .collect::<Vec<_>>();
        lines.push(format!("Result: {term}"));
        lines.push(format!("Steps taken: {steps}"));
        if !normal_form {
            lines.push("Warning: May not be in normal form (reached maximum steps)".to_string());
        }
        Ok(lines)
    }

    fn church(&mut self, args: &str) -> Result<Vec<String>, ShellError> {
        let n = args
            .parse::<u64>()
            .map_err(|_| ShellError::Usage("church N, where N is a non-negative integer"))?;
        let numeral = self.encodings.church_numeral(n);
        self.session.set_it(numeral.clone());
        Ok(vec![format!("Church numeral for {n}: {numeral}")])
    }

    fn extract(&self, args: &str) -> Result<Vec<String>, ShellError> {
        let term = self.expression(args, "extract EXPR")?;
        let reduced = self.evaluator.evaluate(&term).term;
        Ok(vec![match extract_church_numeral(&reduced) {
            Some(n) => format!("Extracted value: {n}"),
            None => "Could not extract a Church numeral".to_string(),
        }])
    }

    fn boolean(&self, args: &str) -> Result<Vec<String>, ShellError> {
        let term = self.expression(args, "bool EXPR")?;
        Ok(vec![match self.encodings.to_boolean(&term, &self.evaluator) {
            Some(true) => "Boolean value: TRUE".to_string(),
            Some(false) => "Boolean value: FALSE".to_string(),
            None => "Could not extract a Church boolean".to_string(),
        }])
    }

    fn free(&self, args: &str) -> Result<Vec<String>, ShellError> {
        fn show(vars: VarSet) -> String {
            let names = vars.iter().map(|name| name.as_ref()).collect::<Vec<_>>();
            format!("{{{}}}", names.join(", "))
        }
        let term = self.expression(args, "free EXPR")?;
        Ok(vec![
            format!("Free variables: {}", show(term.free_variables())),
            format!("Bound variables: {}", show(term.bound_variables())),
        ])
    }

    fn alpha(&self, args: &str) -> Result<Vec<String>, ShellError> {
        const USAGE: &str = "alpha EXPR ; EXPR";
        let (lhs, rhs) = args.split_once(';').ok_or(ShellError::Usage(USAGE))?;
        let lhs = self.expression(lhs.trim(), USAGE)?;
        let rhs = self.expression(rhs.trim(), USAGE)?;
        Ok(vec![if is_alpha_equivalent(&lhs, &rhs) {
            format!("{lhs} and {rhs} are alpha equivalent")
        } else {
            format!("{lhs} and {rhs} are not alpha equivalent")
        }])
    }

    fn set(&mut self, args: &str) -> Result<Vec<String>, ShellError> {
        const USAGE: &str = "set strategy NAME | set steps N | set trace on|off";
        let (key, value) = args
            .split_once(char::is_whitespace)
            .map(|(key, value)| (key, value.trim()))
            .ok_or(ShellError::Usage(USAGE))?;
        self.evaluator = match key {
            "strategy" => self.evaluator.with_strategy(value.parse()?),
            "steps" => {
                let max_steps = value.parse().map_err(|_| ShellError::Usage(USAGE))?;
                Evaluator::new(self.evaluator.strategy(), max_steps)?
                    .with_trace(self.evaluator.record_trace())
            }
            "trace" => match value {
                "on" => self.evaluator.with_trace(true),
                "off" => self.evaluator.with_trace(false),
                _ => return Err(ShellError::Usage(USAGE)),
            },
            _ => return Err(ShellError::Usage(USAGE)),
        };
        Ok(vec![format!(
            "strategy = {}, steps = {}, trace = {}",
            self.evaluator.strategy(),
            self.evaluator.max_steps(),
            if self.evaluator.record_trace() { "on" } else { "off" },
        )])
    }
}
