//! Statement AST nodes.

use crate::expr::Expr;
use crate::Span;

/// A statement in the AST.
#[derive(Debug, Clone)]
pub struct Stmt {
    pub kind: StmtKind,
    pub span: Span,
}

/// The kind of statement.
#[derive(Debug, Clone)]
pub enum StmtKind {
    /// Bare expression statement
    Expr(Expr),
    /// Variable assignment; compound forms are desugared to `x = x OP rhs`
    /// by the parser
    Assign {
        name: String,
        value: Expr,
    },
    /// Index assignment (`x[i] = v`), sugar for a `set`/`put` method call
    IndexAssign {
        object: Expr,
        index: Expr,
        value: Expr,
    },
    /// `if`/`elif` arms in order, plus an optional trailing `else` body
    If {
        arms: Vec<(Expr, Vec<Stmt>)>,
        else_body: Option<Vec<Stmt>>,
    },
    /// While loop
    While {
        cond: Expr,
        body: Vec<Stmt>,
    },
    /// For-in loop over a collection
    For {
        binding: String,
        iter: Expr,
        body: Vec<Stmt>,
    },
    /// Function definition (top level only)
    FnDef {
        name: String,
        params: Vec<String>,
        body: Vec<Stmt>,
    },
    /// Return statement, with optional value
    Return(Option<Expr>),
    /// Break statement
    Break,
    /// Continue statement
    Continue,
}
