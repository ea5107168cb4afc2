//! Pipeline orchestration: source text → tokens → AST → evaluation.

use ode_ast::{LineMap, Program, Span};
use ode_lexer::{LexError, Lexer};
use ode_parser::{ParseError, Parser};

use crate::error::RuntimeDiagnostic;
use crate::interp::Context;

/// Runs a source text through the whole pipeline against a [`Context`].
pub struct Interpreter {
    source: String,
}

impl Interpreter {
    pub fn new(source: impl Into<String>) -> Self {
        Self { source: source.into() }
    }

    /// Lex and parse without evaluating.
    pub fn parse(&self) -> Result<Program, Error> {
        let tokens = Lexer::new(&self.source).tokenize()?;
        Ok(Parser::new(tokens).parse()?)
    }

    /// Lex, parse, and evaluate against the given context. The context
    /// outlives the run: injected state stays visible, and registered
    /// script functions stay callable.
    pub fn run(&self, context: &mut Context) -> Result<(), Error> {
        let program = self.parse()?;
        context.run(&program)?;
        Ok(())
    }
}

/// Any failure in the pipeline, with its source position.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("{0}")]
    Lex(#[from] LexError),
    #[error("{0}")]
    Parse(#[from] ParseError),
    #[error("{0}")]
    Runtime(#[from] RuntimeDiagnostic),
}

impl Error {
    pub fn span(&self) -> Span {
        match self {
            Error::Lex(e) => e.span,
            Error::Parse(e) => e.span,
            Error::Runtime(e) => e.span,
        }
    }

    /// The host-facing `line:column | message` form.
    pub fn render(&self, source: &str) -> String {
        let (line, col) = LineMap::new(source).line_col(self.span().start);
        format!("{}:{} | {}", line, col, self)
    }
}
