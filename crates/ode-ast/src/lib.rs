// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Abstract Syntax Tree types for the Ode language.
//!
//! This crate defines the tokens and AST nodes shared between the lexer,
//! the parser, and the interpreter.

pub mod expr;
pub mod span;
pub mod stmt;
pub mod token;

pub use span::{LineMap, Span};

/// A whole program: the root compound statement.
pub type Program = Vec<stmt::Stmt>;
