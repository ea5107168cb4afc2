// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! The native function contract.
//!
//! This is the stable surface hosts program against: a name, a parameter
//! list of named per-argument predicates (or a variadic marker), and a
//! callback over [`Value`]s. Argument count and predicates are validated
//! before the callback runs. Built-in functions and object methods use the
//! same contract.

use crate::error::RuntimeError;
use crate::value::Value;

/// Parameter list: fixed named parameters, or any number of arguments.
pub enum Params {
    Exact(Vec<ParamSpec>),
    Variadic,
}

/// A named predicate over one argument, e.g. "must coerce to a number".
pub struct ParamSpec {
    name: String,
    check: Box<dyn Fn(&Value) -> bool>,
}

impl ParamSpec {
    pub fn new(name: impl Into<String>, check: impl Fn(&Value) -> bool + 'static) -> Self {
        Self { name: name.into(), check: Box::new(check) }
    }

    /// Accepts anything.
    pub fn any() -> Self {
        Self::new("any value", |_| true)
    }

    /// Accepts values that coerce to a number.
    pub fn number() -> Self {
        Self::new("a number", |v| v.as_number().is_ok())
    }

    /// Accepts values that coerce to a string. String coercion is total, so
    /// this documents intent rather than restricting anything.
    pub fn string() -> Self {
        Self::new("a string", |_| true)
    }

    /// Accepts values that coerce to a boolean; truthiness is total too.
    pub fn boolean() -> Self {
        Self::new("a boolean", |_| true)
    }

    /// Accepts object references only.
    pub fn object() -> Self {
        Self::new("an object", |v| matches!(v, Value::Object(_)))
    }
}

/// A host- or runtime-supplied function callable from scripts.
pub struct NativeFunction {
    name: String,
    params: Params,
    callback: Box<dyn Fn(Vec<Value>) -> Result<Value, RuntimeError>>,
}

impl NativeFunction {
    pub fn new(
        name: impl Into<String>,
        params: Vec<ParamSpec>,
        callback: impl Fn(Vec<Value>) -> Result<Value, RuntimeError> + 'static,
    ) -> Self {
        Self {
            name: name.into(),
            params: Params::Exact(params),
            callback: Box::new(callback),
        }
    }

    pub fn variadic(
        name: impl Into<String>,
        callback: impl Fn(Vec<Value>) -> Result<Value, RuntimeError> + 'static,
    ) -> Self {
        Self {
            name: name.into(),
            params: Params::Variadic,
            callback: Box::new(callback),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Validate arguments and invoke the callback.
    pub fn call(&self, args: Vec<Value>) -> Result<Value, RuntimeError> {
        if let Params::Exact(specs) = &self.params {
            if specs.len() != args.len() {
                return Err(RuntimeError::ArityMismatch {
                    name: self.name.clone(),
                    expected: specs.len(),
                    got: args.len(),
                });
            }
            for (spec, arg) in specs.iter().zip(&args) {
                if !(spec.check)(arg) {
                    return Err(RuntimeError::BadArgument {
                        func: self.name.clone(),
                        param: spec.name.clone(),
                    });
                }
            }
        }
        (self.callback)(args)
    }
}
