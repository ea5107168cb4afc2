// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! The parser implementation.
//!
//! Recursive descent over an owned token buffer with an explicit cursor.
//! Each method roughly corresponds to a grammar rule; the whole program is
//! one root compound statement. Nesting is decided by counting the
//! structural `Whitespace` tokens at the start of each line.

use ode_ast::expr::{BinOp, Expr, ExprKind, UnaryOp};
use ode_ast::stmt::{Stmt, StmtKind};
use ode_ast::token::{Token, TokenKind};
use ode_ast::{Program, Span};

/// The parser for Ode source code.
pub struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    pub fn new(tokens: Vec<Token>) -> Self {
        Self { tokens, pos: 0 }
    }

    pub fn parse(mut self) -> Result<Program, ParseError> {
        self.block(0)
    }

    // =========================================================================
    // Token Navigation
    // =========================================================================

    fn current(&self) -> &Token {
        self.tokens
            .get(self.pos)
            .unwrap_or_else(|| self.tokens.last().expect("token stream ends with Eof"))
    }

    fn current_kind(&self) -> &TokenKind {
        &self.current().kind
    }

    fn kind_at(&self, i: usize) -> &TokenKind {
        self.tokens.get(i).map(|t| &t.kind).unwrap_or(&TokenKind::Eof)
    }

    fn peek(&self, n: usize) -> &TokenKind {
        self.kind_at(self.pos + n)
    }

    /// Span of the most recently consumed token.
    fn prev_span(&self) -> Span {
        match self.pos {
            0 => self.current().span,
            n => self.tokens[n - 1].span,
        }
    }

    fn at_end(&self) -> bool {
        matches!(self.current_kind(), TokenKind::Eof)
    }

    fn advance(&mut self) -> &Token {
        if !self.at_end() {
            self.pos += 1;
        }
        &self.tokens[self.pos - 1]
    }

    fn check(&self, kind: &TokenKind) -> bool {
        std::mem::discriminant(self.current_kind()) == std::mem::discriminant(kind)
    }

    fn expect(&mut self, kind: &TokenKind) -> Result<&Token, ParseError> {
        if self.check(kind) {
            Ok(self.advance())
        } else {
            Err(ParseError::expected(
                kind.display_name(),
                self.current_kind(),
                self.current().span,
            ))
        }
    }

    fn expect_ident(&mut self) -> Result<String, ParseError> {
        match self.current_kind().clone() {
            TokenKind::Ident(name) => {
                self.advance();
                Ok(name)
            }
            _ => Err(ParseError::expected(
                "a name",
                self.current_kind(),
                self.current().span,
            )),
        }
    }

    // =========================================================================
    // Indentation
    // =========================================================================

    /// Number of pending Whitespace tokens at the cursor.
    fn indent_width(&self) -> usize {
        let mut i = self.pos;
        while matches!(self.kind_at(i), TokenKind::Whitespace) {
            i += 1;
        }
        i - self.pos
    }

    /// True when only indentation separates the cursor from the next newline.
    fn line_is_blank(&self) -> bool {
        let mut i = self.pos;
        while matches!(self.kind_at(i), TokenKind::Whitespace) {
            i += 1;
        }
        matches!(self.kind_at(i), TokenKind::Newline)
    }

    fn skip_blank_line(&mut self) {
        while self.check(&TokenKind::Whitespace) {
            self.advance();
        }
        if self.check(&TokenKind::Newline) {
            self.advance();
        }
    }

    fn eat_indent(&mut self, level: usize) -> Result<(), ParseError> {
        let width = self.indent_width();
        if width != level {
            return Err(ParseError::new(
                format!("Inconsistent indentation; expected {} units, found {}", level, width),
                self.current().span,
            ));
        }
        for _ in 0..level {
            self.advance();
        }
        Ok(())
    }

    // =========================================================================
    // Statements
    // =========================================================================

    /// A run of statements at exactly `level` indentation units. A shallower
    /// line ends the block; blank lines never affect block boundaries.
    fn block(&mut self, level: usize) -> Result<Vec<Stmt>, ParseError> {
        let mut stmts = Vec::new();
        while !self.at_end() {
            if self.line_is_blank() {
                self.skip_blank_line();
                continue;
            }
            if self.indent_width() < level {
                break;
            }
            stmts.push(self.statement(level)?);
        }
        Ok(stmts)
    }

    fn statement(&mut self, level: usize) -> Result<Stmt, ParseError> {
        self.eat_indent(level)?;

        match self.current_kind() {
            TokenKind::Return => self.return_stmt(),
            TokenKind::Fn => self.function_definition(level),
            TokenKind::If => self.conditional(level),
            TokenKind::While => self.while_loop(level),
            TokenKind::For => self.for_loop(level),
            TokenKind::Break => self.loop_break(),
            TokenKind::Continue => self.loop_continue(),
            TokenKind::Ident(_) => self.assignment_or_expr(),
            _ => Err(ParseError::expected(
                "a statement",
                self.current_kind(),
                self.current().span,
            )),
        }
    }

    fn conditional(&mut self, level: usize) -> Result<Stmt, ParseError> {
        let start = self.current().span;
        self.advance(); // 'if'

        let cond = self.expression()?;
        self.expect(&TokenKind::Newline)?;
        let mut arms = vec![(cond, self.block(level + 1)?)];
        let mut else_body = None;

        loop {
            match self.chain_keyword(level) {
                Some(TokenKind::Elif) => {
                    self.skip_to_chain(level)?;
                    self.advance(); // 'elif'
                    let cond = self.expression()?;
                    self.expect(&TokenKind::Newline)?;
                    arms.push((cond, self.block(level + 1)?));
                }
                Some(TokenKind::Else) => {
                    self.skip_to_chain(level)?;
                    self.advance(); // 'else'
                    self.expect(&TokenKind::Newline)?;
                    else_body = Some(self.block(level + 1)?);
                    break;
                }
                _ => break,
            }
        }

        Ok(Stmt {
            kind: StmtKind::If { arms, else_body },
            span: start,
        })
    }

    /// Peeks past blank lines and pending indentation to see whether the next
    /// meaningful line continues an if-chain at this nesting level.
    fn chain_keyword(&self, level: usize) -> Option<TokenKind> {
        let mut line_start = self.pos;
        loop {
            let mut i = line_start;
            while matches!(self.kind_at(i), TokenKind::Whitespace) {
                i += 1;
            }
            match self.kind_at(i) {
                TokenKind::Newline => line_start = i + 1,
                kind @ (TokenKind::Elif | TokenKind::Else) if i - line_start == level => {
                    return Some(kind.clone());
                }
                _ => return None,
            }
        }
    }

    fn skip_to_chain(&mut self, level: usize) -> Result<(), ParseError> {
        while self.line_is_blank() {
            self.skip_blank_line();
        }
        self.eat_indent(level)
    }

    fn while_loop(&mut self, level: usize) -> Result<Stmt, ParseError> {
        let start = self.current().span;
        self.advance(); // 'while'

        let cond = self.expression()?;
        self.expect(&TokenKind::Newline)?;
        let body = self.block(level + 1)?;

        Ok(Stmt {
            kind: StmtKind::While { cond, body },
            span: start,
        })
    }

    fn for_loop(&mut self, level: usize) -> Result<Stmt, ParseError> {
        let start = self.current().span;
        self.advance(); // 'for'

        let binding = self.expect_ident()?;
        self.expect(&TokenKind::In)?;
        let iter = self.expression()?;
        self.expect(&TokenKind::Newline)?;
        let body = self.block(level + 1)?;

        Ok(Stmt {
            kind: StmtKind::For { binding, iter, body },
            span: start,
        })
    }

    fn function_definition(&mut self, level: usize) -> Result<Stmt, ParseError> {
        let start = self.current().span;
        self.advance(); // 'fn'

        if level > 0 {
            return Err(ParseError::new(
                "Function definitions are only allowed at the top level",
                start,
            ));
        }

        let name = self.expect_ident()?;
        self.expect(&TokenKind::LParen)?;
        let mut params = Vec::new();
        while !self.check(&TokenKind::RParen) {
            params.push(self.expect_ident()?);
            if self.check(&TokenKind::Comma) {
                self.advance();
            }
        }
        self.expect(&TokenKind::RParen)?;
        self.expect(&TokenKind::Newline)?;
        let body = self.block(level + 1)?;

        Ok(Stmt {
            kind: StmtKind::FnDef { name, params, body },
            span: start,
        })
    }

    fn return_stmt(&mut self) -> Result<Stmt, ParseError> {
        let start = self.current().span;
        self.advance(); // 'return'

        // A value-less return is just `return` followed by the line ending.
        let value = if self.line_is_blank() {
            self.skip_blank_line();
            None
        } else {
            let expr = self.expression()?;
            self.expect(&TokenKind::Newline)?;
            Some(expr)
        };

        Ok(Stmt {
            kind: StmtKind::Return(value),
            span: start,
        })
    }

    fn loop_break(&mut self) -> Result<Stmt, ParseError> {
        let start = self.current().span;
        self.advance();
        self.expect(&TokenKind::Newline)?;
        Ok(Stmt { kind: StmtKind::Break, span: start })
    }

    fn loop_continue(&mut self) -> Result<Stmt, ParseError> {
        let start = self.current().span;
        self.advance();
        self.expect(&TokenKind::Newline)?;
        Ok(Stmt { kind: StmtKind::Continue, span: start })
    }

    fn assignment_or_expr(&mut self) -> Result<Stmt, ParseError> {
        if self.peek(1).is_assignment() {
            let start = self.current().span;
            let name = self.expect_ident()?;
            let op = self.advance().kind.clone();
            let rhs = self.expression()?;
            self.expect(&TokenKind::Newline)?;
            let value = match compound_binop(&op) {
                Some(bin) => {
                    let read = Expr { kind: ExprKind::Ident(name.clone()), span: start };
                    binary(bin, read, rhs)
                }
                None => rhs,
            };
            return Ok(Stmt {
                kind: StmtKind::Assign { name, value },
                span: start,
            });
        }

        let expr = self.expression()?;
        if self.current_kind().is_assignment() {
            return self.index_assignment(expr);
        }
        self.expect(&TokenKind::Newline)?;
        let span = expr.span;
        Ok(Stmt { kind: StmtKind::Expr(expr), span })
    }

    /// `x[i] = v` (and the compound forms). Only a variable-rooted index
    /// chain is a legal target; indexing a call result is not assignable.
    fn index_assignment(&mut self, target: Expr) -> Result<Stmt, ParseError> {
        if !is_variable_indexed(&target) {
            return Err(ParseError::new("Invalid assignment target", self.current().span));
        }

        let op = self.advance().kind.clone();
        let rhs = self.expression()?;
        self.expect(&TokenKind::Newline)?;
        let span = target.span;
        let ExprKind::Index { object, index } = target.kind else {
            unreachable!("checked by is_variable_indexed");
        };

        let value = match compound_binop(&op) {
            Some(bin) => {
                let read = Expr {
                    kind: ExprKind::Index { object: object.clone(), index: index.clone() },
                    span,
                };
                binary(bin, read, rhs)
            }
            None => rhs,
        };

        Ok(Stmt {
            kind: StmtKind::IndexAssign { object: *object, index: *index, value },
            span,
        })
    }

    // =========================================================================
    // Expressions
    // =========================================================================

    fn expression(&mut self) -> Result<Expr, ParseError> {
        let mut expr = self.term()?;
        while let Some(op) = match self.current_kind() {
            TokenKind::Plus => Some(BinOp::Add),
            TokenKind::Minus => Some(BinOp::Sub),
            TokenKind::Or => Some(BinOp::Or),
            TokenKind::And => Some(BinOp::And),
            _ => None,
        } {
            self.advance();
            let right = self.term()?;
            expr = binary(op, expr, right);
        }
        Ok(expr)
    }

    fn term(&mut self) -> Result<Expr, ParseError> {
        let mut expr = self.factor()?;
        while let Some(op) = match self.current_kind() {
            TokenKind::Star => Some(BinOp::Mul),
            TokenKind::Slash => Some(BinOp::Div),
            TokenKind::Percent => Some(BinOp::Mod),
            TokenKind::Lt => Some(BinOp::Lt),
            TokenKind::Gt => Some(BinOp::Gt),
            TokenKind::EqEq => Some(BinOp::Eq),
            TokenKind::BangEq => Some(BinOp::Ne),
            _ => None,
        } {
            self.advance();
            let right = self.factor()?;
            expr = binary(op, expr, right);
        }
        Ok(expr)
    }

    /// A value plus any chain of `.method(...)` calls and `[index]` accesses.
    fn factor(&mut self) -> Result<Expr, ParseError> {
        let mut expr = self.value()?;
        loop {
            match self.current_kind() {
                TokenKind::Dot => {
                    self.advance();
                    let method = self.expect_ident()?;
                    let args = self.arguments()?;
                    let span = expr.span.to(self.prev_span());
                    expr = Expr {
                        kind: ExprKind::MethodCall { object: Box::new(expr), method, args },
                        span,
                    };
                }
                TokenKind::LBracket => {
                    self.advance();
                    let index = self.expression()?;
                    self.expect(&TokenKind::RBracket)?;
                    let span = expr.span.to(self.prev_span());
                    expr = Expr {
                        kind: ExprKind::Index { object: Box::new(expr), index: Box::new(index) },
                        span,
                    };
                }
                _ => break,
            }
        }
        Ok(expr)
    }

    fn value(&mut self) -> Result<Expr, ParseError> {
        let start = self.current().span;
        match self.current_kind().clone() {
            TokenKind::Str(s) => {
                self.advance();
                Ok(Expr { kind: ExprKind::Str(s), span: start })
            }
            TokenKind::Bool(b) => {
                self.advance();
                Ok(Expr { kind: ExprKind::Bool(b), span: start })
            }
            TokenKind::Number(n) => {
                self.advance();
                Ok(Expr { kind: ExprKind::Number(n), span: start })
            }
            TokenKind::LParen => {
                self.advance();
                let expr = self.expression()?;
                self.expect(&TokenKind::RParen)?;
                Ok(expr)
            }
            TokenKind::Plus => self.unary(UnaryOp::Pos),
            TokenKind::Minus => self.unary(UnaryOp::Neg),
            TokenKind::Bang => self.unary(UnaryOp::Not),
            TokenKind::LBracket => self.array_literal(),
            TokenKind::LBrace => self.dict_literal(),
            TokenKind::PlusPlus => self.pre_inc_dec(true),
            TokenKind::MinusMinus => self.pre_inc_dec(false),
            TokenKind::Ident(name) => {
                if matches!(self.peek(1), TokenKind::LParen) {
                    self.advance();
                    let args = self.arguments()?;
                    let span = start.to(self.prev_span());
                    return Ok(Expr { kind: ExprKind::Call { name, args }, span });
                }
                self.advance();
                match self.current_kind() {
                    TokenKind::PlusPlus => {
                        self.advance();
                        Ok(Expr {
                            kind: ExprKind::PostIncDec { name, increment: true },
                            span: start.to(self.prev_span()),
                        })
                    }
                    TokenKind::MinusMinus => {
                        self.advance();
                        Ok(Expr {
                            kind: ExprKind::PostIncDec { name, increment: false },
                            span: start.to(self.prev_span()),
                        })
                    }
                    _ => Ok(Expr { kind: ExprKind::Ident(name), span: start }),
                }
            }
            _ => Err(ParseError::expected("a value", self.current_kind(), start)),
        }
    }

    fn unary(&mut self, op: UnaryOp) -> Result<Expr, ParseError> {
        let start = self.current().span;
        self.advance();
        let operand = self.factor()?;
        let span = start.to(operand.span);
        Ok(Expr {
            kind: ExprKind::Unary { op, operand: Box::new(operand) },
            span,
        })
    }

    fn pre_inc_dec(&mut self, increment: bool) -> Result<Expr, ParseError> {
        let start = self.current().span;
        self.advance();
        let name = self.expect_ident()?;
        Ok(Expr {
            kind: ExprKind::PreIncDec { name, increment },
            span: start.to(self.prev_span()),
        })
    }

    fn array_literal(&mut self) -> Result<Expr, ParseError> {
        let start = self.current().span;
        self.advance(); // '['
        self.eat_collection_deadspace();

        let mut values = Vec::new();
        while !self.check(&TokenKind::RBracket) {
            if self.at_end() {
                return Err(ParseError::expected("']'", self.current_kind(), self.current().span));
            }
            values.push(self.expression()?);
            self.eat_collection_deadspace();
        }
        self.advance(); // ']'

        Ok(Expr {
            kind: ExprKind::Array(values),
            span: start.to(self.prev_span()),
        })
    }

    fn dict_literal(&mut self) -> Result<Expr, ParseError> {
        let start = self.current().span;
        self.advance(); // '{'
        self.eat_collection_deadspace();

        let mut pairs = Vec::new();
        while !self.check(&TokenKind::RBrace) {
            if self.at_end() {
                return Err(ParseError::expected("'}'", self.current_kind(), self.current().span));
            }
            let key = self.expression()?;
            self.expect(&TokenKind::Colon)?;
            let value = self.expression()?;
            pairs.push((key, value));
            self.eat_collection_deadspace();
        }
        self.advance(); // '}'

        Ok(Expr {
            kind: ExprKind::Dict(pairs),
            span: start.to(self.prev_span()),
        })
    }

    /// Commas, indentation units, and newlines all separate collection
    /// elements interchangeably.
    fn eat_collection_deadspace(&mut self) {
        while matches!(
            self.current_kind(),
            TokenKind::Comma | TokenKind::Whitespace | TokenKind::Newline
        ) {
            self.advance();
        }
    }

    fn arguments(&mut self) -> Result<Vec<Expr>, ParseError> {
        self.expect(&TokenKind::LParen)?;
        let mut args = Vec::new();
        while !self.check(&TokenKind::RParen) {
            args.push(self.expression()?);
            if self.check(&TokenKind::Comma) {
                self.advance();
            } else {
                break;
            }
        }
        self.expect(&TokenKind::RParen)?;
        Ok(args)
    }
}

fn binary(op: BinOp, left: Expr, right: Expr) -> Expr {
    let span = left.span.to(right.span);
    Expr {
        kind: ExprKind::Binary { op, left: Box::new(left), right: Box::new(right) },
        span,
    }
}

fn compound_binop(kind: &TokenKind) -> Option<BinOp> {
    match kind {
        TokenKind::PlusEq => Some(BinOp::Add),
        TokenKind::MinusEq => Some(BinOp::Sub),
        TokenKind::StarEq => Some(BinOp::Mul),
        TokenKind::SlashEq => Some(BinOp::Div),
        TokenKind::PercentEq => Some(BinOp::Mod),
        _ => None,
    }
}

/// True for index chains rooted in a plain variable: `x[0]`, `x[0][1]`.
fn is_variable_indexed(expr: &Expr) -> bool {
    match &expr.kind {
        ExprKind::Index { object, .. } => {
            matches!(object.kind, ExprKind::Ident(_)) || is_variable_indexed(object)
        }
        _ => false,
    }
}

/// A parser error with location and message.
#[derive(Debug, Clone, thiserror::Error)]
#[error("{message}")]
pub struct ParseError {
    pub span: Span,
    pub message: String,
}

impl ParseError {
    fn new(message: impl Into<String>, span: Span) -> Self {
        Self { span, message: message.into() }
    }

    fn expected(expected: &str, found: &TokenKind, span: Span) -> Self {
        Self::new(
            format!("Expected {}, found {}", expected, found.display_name()),
            span,
        )
    }
}
