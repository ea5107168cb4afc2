// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Binary and unary operator application.

use ode_ast::expr::{BinOp, UnaryOp};

use crate::error::RuntimeError;
use crate::value::Value;

pub(super) fn apply_binary(op: BinOp, left: Value, right: Value) -> Result<Value, RuntimeError> {
    match op {
        BinOp::Add => add(left, right),
        BinOp::Sub => numeric(left, right, |a, b| a - b),
        BinOp::Mul => numeric(left, right, |a, b| a * b),
        // Division and modulo follow IEEE float semantics; a zero divisor
        // yields inf or NaN, not an error.
        BinOp::Div => numeric(left, right, |a, b| a / b),
        BinOp::Mod => numeric(left, right, |a, b| a % b),
        BinOp::Lt => Ok(Value::Bool(left.as_number()? < right.as_number()?)),
        BinOp::Gt => Ok(Value::Bool(left.as_number()? > right.as_number()?)),
        BinOp::Eq => Ok(Value::Bool(left.lang_eq(&right)?)),
        BinOp::Ne => Ok(Value::Bool(!left.lang_eq(&right)?)),
        BinOp::And => Ok(Value::Bool(left.truthy() && right.truthy())),
        BinOp::Or => Ok(Value::Bool(left.truthy() || right.truthy())),
    }
}

pub(super) fn apply_unary(op: UnaryOp, value: Value) -> Result<Value, RuntimeError> {
    match op {
        // Unary `+` is identity, whatever the operand
        UnaryOp::Pos => Ok(value),
        UnaryOp::Neg => Ok(Value::Number(-value.as_number()?)),
        UnaryOp::Not => Ok(Value::Bool(!value.truthy())),
    }
}

/// `+` tries numeric addition first and falls back to string concatenation
/// when either operand cannot coerce to a number. The fallback stringifies
/// whatever it is given, so a mistyped operand silently becomes text.
fn add(left: Value, right: Value) -> Result<Value, RuntimeError> {
    if let (Ok(a), Ok(b)) = (left.as_number(), right.as_number()) {
        return Ok(Value::Number(a + b));
    }
    match (left.render(), right.render()) {
        (Ok(a), Ok(b)) => Ok(Value::Str(a + &b)),
        _ => Err(RuntimeError::InvalidAddition),
    }
}

fn numeric(left: Value, right: Value, f: impl Fn(f32, f32) -> f32) -> Result<Value, RuntimeError> {
    Ok(Value::Number(f(left.as_number()?, right.as_number()?)))
}
