use std::{ops::ControlFlow, path::PathBuf};

use anyhow::Result;
use ariadne::{Color, Fmt, Label, Report, ReportKind, Source};
use clap::Parser;
use lambda::{
    reduce::DEFAULT_MAX_STEPS,
    shell::{Response, Shell, ShellError},
    Evaluator, Strategy,
};
use tracing_subscriber::EnvFilter;
use util::repl;

#[derive(Parser, Debug)]
#[command(name = "lambda")]
#[command(about = "Interactive untyped lambda calculus evaluator", long_about = None)]
struct Cli {
    /// Strategy used by `beta`: normal or applicative
    #[arg(short, long, default_value_t = Strategy::Normal)]
    strategy: Strategy,

    /// Maximum number of reduction steps per evaluation
    #[arg(short, long, default_value_t = DEFAULT_MAX_STEPS)]
    max_steps: usize,

    /// Readline history file
    #[arg(long)]
    history: Option<PathBuf>,

    /// Show every step of every reduction
    #[arg(long)]
    trace: bool,
}

fn build_report(e: chumsky::error::Simple<String>) -> Report {
    use chumsky::error::SimpleReason;
    let report = Report::build(ReportKind::Error, (), e.span().start);
    match e.reason() {
        SimpleReason::Unexpected => {
            let found = e.found().map(String::as_str).unwrap_or("end of the input");
            let expected = e
                .expected()
                .map(|t| t.as_ref().map(String::as_str).unwrap_or("end of the input"))
                .collect::<Vec<_>>()
                .join(", ");
            let expected = if expected.is_empty() {
                "something else"
            } else {
                &expected
            };
            report
                .with_message(format!("Unexpected {found}, expected {expected}"))
                .with_label(
                    Label::new(e.span())
                        .with_message(format!("Unexpected {}", found.fg(Color::Red)))
                        .with_color(Color::Red),
                )
        }
        SimpleReason::Unclosed { span, delimiter } => report
            .with_message(format!("Unclosed delimiter {}", delimiter.fg(Color::Yellow)))
            .with_label(
                Label::new(span.clone())
                    .with_message(format!(
                        "Unclosed delimiter {}",
                        delimiter.fg(Color::Yellow)
                    ))
                    .with_color(Color::Yellow),
            )
            .with_label(
                Label::new(e.span())
                    .with_message(format!(
                        "Must be closed before this {}",
                        e.found()
                            .map(String::as_str)
                            .unwrap_or("end of the input")
                            .fg(Color::Red)
                    ))
                    .with_color(Color::Red),
            ),
        SimpleReason::Custom(msg) => report.with_message(msg).with_label(
            Label::new(e.span())
                .with_message(format!("{}", msg.fg(Color::Red)))
                .with_color(Color::Red),
        ),
    }
    .finish()
}

struct LambdaRepl {
    shell: Shell,
    history: Option<String>,
}

impl repl::Repl for LambdaRepl {
    type Error = anyhow::Error;
    const PROMPT: &'static str = "λ> ";

    fn evaluate(&mut self, input: String) -> Result<ControlFlow<()>, Self::Error> {
        match self.shell.execute(&input) {
            Ok(Response::Output(lines)) => {
                for line in lines {
                    println!("{line}");
                }
            }
            Ok(Response::Quit) => {
                println!("Goodbye!");
                return Ok(ControlFlow::Break(()));
            }
            Err(ShellError::Parse { input, errors }) => {
                for e in errors {
                    build_report(e).eprint(Source::from(&input))?;
                }
            }
            Err(e) => eprintln!("Error: {e}"),
        }
        Ok(ControlFlow::Continue(()))
    }

    fn history(&self) -> Option<&str> {
        self.history.as_deref()
    }

    fn on_interrupt(&mut self) -> ControlFlow<()> {
        println!("Use `quit` or `exit` to leave the shell.");
        ControlFlow::Continue(())
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let evaluator = Evaluator::new(cli.strategy, cli.max_steps)?.with_trace(cli.trace);
    tracing::info!(
        strategy = %evaluator.strategy(),
        max_steps = evaluator.max_steps(),
        "starting shell"
    );

    println!("Lambda calculus shell");
    println!("Type `help` for a list of commands.");
    repl::start_repl(LambdaRepl {
        shell: Shell::new(evaluator),
        history: cli
            .history
            .map(|path| path.to_string_lossy().into_owned()),
    })?;
    Ok(())
}
