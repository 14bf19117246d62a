use chumsky::prelude::*;

use crate::term::{Identifier, Term, TermRef};

pub type Span = std::ops::Range<usize>;
#[derive(derive_more::Deref, Clone, Debug)]
pub struct Spanned<T>(#[deref] T, Span);
impl<T> Spanned<T> {
    pub fn value(&self) -> &T {
        &self.0
    }
}
impl<T> From<Spanned<T>> for (T, Span) {
    fn from(Spanned(value, span): Spanned<T>) -> Self {
        (value, span)
    }
}

pub trait SimpleParser<I: Clone + Eq + std::hash::Hash, O>: Parser<I, O, Error = Simple<I>> {}
impl<I: Clone + Eq + std::hash::Hash, O, T> SimpleParser<I, O> for T where
    T: Parser<I, O, Error = Simple<I>>
{
}

pub type ParseErrors = Vec<Simple<String>>;

#[derive(PartialEq, Eq, Hash, Clone, derive_more::Display, Debug)]
pub enum Token {
    #[display(fmt = "(")]
    LParen,
    #[display(fmt = ")")]
    RParen,
    #[display(fmt = ".")]
    Dot,
    #[display(fmt = "λ")]
    Lambda,
    #[display(fmt = "{}", "_0")]
    Ident(Identifier),
}

pub fn lexer() -> impl SimpleParser<char, Vec<Spanned<Token>>> {
    let ident = filter(|c: &char| c.is_ascii_alphabetic())
        .chain(filter(|c: &char| c.is_ascii_alphanumeric() || *c == '_').repeated())
        .collect::<String>()
        .map(|name| Token::Ident(name.into()));
    let token = choice((
        just('(').to(Token::LParen),
        just(')').to(Token::RParen),
        just('.').to(Token::Dot),
        one_of("λ\\").to(Token::Lambda),
        ident,
    ));
    token
        .map_with_span(Spanned)
        .padded()
        .repeated()
        .then_ignore(end())
}

fn term_parser() -> impl SimpleParser<Token, TermRef> {
    recursive(|term: Recursive<_, TermRef, _>| {
        let var = select! {
            Token::Ident(ident) => ident,
        }
        .labelled("variable");

        let abs = just(Token::Lambda)
            .ignore_then(var.clone())
            .then_ignore(just(Token::Dot))
            .then(term.clone())
            .map(|(param, body)| Term::abs(param, body))
            .labelled("abstraction");

        let atom = choice((
            var.map(Term::Var).map(TermRef::new),
            abs,
            term.delimited_by(just(Token::LParen), just(Token::RParen)),
        ));

        atom.clone()
            .then(atom.repeated())
            .foldl(Term::apply)
            .labelled("term")
    })
    .then_ignore(end())
}

fn stringify<T>(es: Vec<Simple<T>>) -> ParseErrors
where
    T: std::fmt::Display + std::hash::Hash + Eq,
{
    es.into_iter().map(|e| e.map(|e| e.to_string())).collect()
}

pub fn tokenize(s: &str) -> Result<Vec<Spanned<Token>>, ParseErrors> {
    lexer().parse(s).map_err(stringify)
}

pub fn parse(s: &str) -> Result<TermRef, ParseErrors> {
    let len = s.chars().count();
    let eoi = len..len + 1;
    let tokens = tokenize(s)?;
    term_parser()
        .parse(chumsky::Stream::from_iter(
            eoi,
            tokens.into_iter().map(|v| v.into()),
        ))
        .map_err(stringify)
}
