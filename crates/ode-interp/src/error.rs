// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Runtime errors and control-flow signals.

use ode_ast::Span;

use crate::value::Value;

/// A runtime error.
///
/// The `Return`/`Break`/`Continue` variants are not errors: they are the
/// non-local control transfers, carried through the `Err` channel so that
/// every evaluation step propagates them unchanged until the matching
/// construct consumes them. One that escapes to the top of the program is
/// converted to its `...Outside...` counterpart rather than dropped.
#[derive(Debug, thiserror::Error)]
pub enum RuntimeError {
    #[error("undefined variable `{0}`")]
    UndefinedVariable(String),

    #[error("no such function `{0}`")]
    UndefinedFunction(String),

    #[error("function `{0}` is already defined")]
    Redefinition(String),

    #[error("wrong number of arguments: `{name}` takes {expected}, got {got}")]
    ArityMismatch {
        name: String,
        expected: usize,
        got: usize,
    },

    #[error("incorrect argument: `{func}` requires {param}")]
    BadArgument { func: String, param: String },

    #[error("cannot treat {0} as a number")]
    NotNumeric(&'static str),

    #[error("cannot apply `+` to these operands")]
    InvalidAddition,

    #[error("object `{object}` has no function `{method}`")]
    NoSuchMethod { object: String, method: String },

    #[error("index {index} out of bounds (length is {len})")]
    IndexOutOfBounds { index: i64, len: usize },

    #[error("cannot call functions on {0}")]
    NotAnObject(&'static str),

    #[error("cannot index into {0}")]
    NotIndexable(&'static str),

    #[error("cannot iterate over {0}")]
    NotIterable(&'static str),

    #[error("`return` outside of a function")]
    ReturnOutsideFunction,

    #[error("`break` outside of a loop")]
    BreakOutsideLoop,

    #[error("`continue` outside of a loop")]
    ContinueOutsideLoop,

    #[error("loop exceeded {0} iterations")]
    IterationLimit(usize),

    // Control flow (not actual errors)
    #[error("return")]
    Return(Value),

    #[error("break")]
    Break,

    #[error("continue")]
    Continue,
}

/// Runtime error with source location for diagnostic display.
#[derive(Debug)]
pub struct RuntimeDiagnostic {
    pub error: RuntimeError,
    pub span: Span,
}

impl RuntimeDiagnostic {
    pub fn new(error: RuntimeError, span: Span) -> Self {
        Self { error, span }
    }
}

impl std::fmt::Display for RuntimeDiagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.error)
    }
}

impl std::error::Error for RuntimeDiagnostic {}
