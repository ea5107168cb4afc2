//! Runtime values and their coercions.
//!
//! Every value can be reinterpreted as other kinds depending on context: a
//! boolean joined to a string with `+` renders as text, a boolean in
//! arithmetic counts as 1 or 0. Rendering to text and truthiness are total;
//! numeric coercion is partial and fails loudly.

use std::rc::Rc;

use crate::error::RuntimeError;
use crate::object::Object;

/// A runtime value in the interpreter.
#[derive(Debug, Clone)]
pub enum Value {
    Number(f32),
    Str(String),
    Bool(bool),
    /// Shared reference to an object; lives as long as its longest holder.
    Object(Rc<Object>),
    Null,
}

impl Value {
    /// Returns a human-readable name for this value's kind.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Number(_) => "a number",
            Value::Str(_) => "a string",
            Value::Bool(_) => "a boolean",
            Value::Object(_) => "an object",
            Value::Null => "null",
        }
    }

    /// Numeric coercion: numbers as themselves, booleans as 1/0, everything
    /// else is an error.
    pub fn as_number(&self) -> Result<f32, RuntimeError> {
        match self {
            Value::Number(n) => Ok(*n),
            Value::Bool(true) => Ok(1.0),
            Value::Bool(false) => Ok(0.0),
            other => Err(RuntimeError::NotNumeric(other.type_name())),
        }
    }

    /// String coercion. Total for primitives; objects go through their
    /// mandatory `to_string` function, which can fail for host objects.
    pub fn render(&self) -> Result<String, RuntimeError> {
        match self {
            Value::Number(n) => Ok(n.to_string()),
            Value::Str(s) => Ok(s.clone()),
            Value::Bool(true) => Ok("true".to_string()),
            Value::Bool(false) => Ok("false".to_string()),
            Value::Object(obj) => obj.render(),
            Value::Null => Ok("null".to_string()),
        }
    }

    /// Truthiness: nonzero numbers, nonempty strings, and every object are
    /// true; null is false.
    pub fn truthy(&self) -> bool {
        match self {
            Value::Bool(b) => *b,
            Value::Number(n) => *n != 0.0,
            Value::Str(s) => !s.is_empty(),
            Value::Object(_) => true,
            Value::Null => false,
        }
    }

    /// Language equality.
    ///
    /// Same-kind operands compare raw payloads. Two objects compare their
    /// rendered strings. Mixed kinds fall back to comparing numeric
    /// coercions, which errors when an operand cannot coerce.
    pub fn lang_eq(&self, other: &Value) -> Result<bool, RuntimeError> {
        match (self, other) {
            (Value::Str(a), Value::Str(b)) => Ok(a == b),
            (Value::Number(a), Value::Number(b)) => Ok(a == b),
            (Value::Bool(a), Value::Bool(b)) => Ok(a == b),
            (Value::Object(a), Value::Object(b)) => Ok(a.render()? == b.render()?),
            _ => Ok(self.as_number()? == other.as_number()?),
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Number(a), Value::Number(b)) => a == b,
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Object(a), Value::Object(b)) => Rc::ptr_eq(a, b),
            (Value::Null, Value::Null) => true,
            _ => false,
        }
    }
}
