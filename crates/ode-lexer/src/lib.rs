//! Lexer for the Ode language.
//!
//! Tokenizes source code into a stream of tokens for the parser. Leading
//! indentation is significant and is emitted as structural tokens.

mod lexer;

pub use lexer::{LexError, Lexer};
