// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! The execution context.
//!
//! A [`Context`] owns every piece of interpretation state: the scoped
//! variable environment, the built-in and user function registries, and the
//! output buffer. It is created once per run, passed explicitly into every
//! evaluation step, and stays useful after the run — the host can keep
//! calling script-defined functions against it.

use std::cell::RefCell;
use std::rc::Rc;

mod eval_expr;
mod exec_stmt;
mod operators;

use indexmap::IndexMap;

use ode_ast::stmt::Stmt;
use ode_ast::Span;

use crate::builtins;
use crate::env::{Environment, Frame};
use crate::error::{RuntimeDiagnostic, RuntimeError};
use crate::native::NativeFunction;
use crate::object::Object;
use crate::value::Value;

/// A user-defined function: parameter names plus its body subtree, owned by
/// the registry for the context's lifetime.
struct UserFunction {
    params: Vec<String>,
    body: Vec<Stmt>,
}

/// Accumulated script output, with an optional incremental sink.
pub(crate) struct OutputBuffer {
    text: String,
    sink: Option<Box<dyn FnMut(&str)>>,
}

impl OutputBuffer {
    pub(crate) fn write(&mut self, fragment: &str) {
        self.text.push_str(fragment);
        if let Some(sink) = &mut self.sink {
            sink(fragment);
        }
    }
}

/// The interpretation state and host embedding surface.
pub struct Context {
    pub(crate) env: Environment,
    builtins: IndexMap<String, NativeFunction>,
    functions: IndexMap<String, Rc<UserFunction>>,
    output: Rc<RefCell<OutputBuffer>>,
}

impl Context {
    pub fn new() -> Self {
        Self::with_buffer(OutputBuffer { text: String::new(), sink: None })
    }

    /// A context whose sink observes every output fragment as it is
    /// produced, in addition to the accumulated buffer.
    pub fn with_sink(sink: impl FnMut(&str) + 'static) -> Self {
        Self::with_buffer(OutputBuffer {
            text: String::new(),
            sink: Some(Box::new(sink)),
        })
    }

    fn with_buffer(buffer: OutputBuffer) -> Self {
        let output = Rc::new(RefCell::new(buffer));
        let builtins = builtins::seed(&output);
        Self {
            env: Environment::new(),
            builtins,
            functions: IndexMap::new(),
            output,
        }
    }

    /// Everything the script has printed so far.
    pub fn output(&self) -> String {
        self.output.borrow().text.clone()
    }

    /// Bind a host object as a global variable under its own name.
    pub fn inject_object(&mut self, object: Object) {
        let name = object.name().to_string();
        self.env.define_global(name, Value::Object(Rc::new(object)));
    }

    /// Register a host function as a built-in. Replaces any built-in of the
    /// same name.
    pub fn inject_function(&mut self, function: NativeFunction) {
        self.builtins.insert(function.name().to_string(), function);
    }

    /// Evaluate a whole program. A control signal that reaches this boundary
    /// unconsumed is reported as an error, never dropped.
    pub fn run(&mut self, program: &[Stmt]) -> Result<(), RuntimeDiagnostic> {
        self.exec_block(program).map_err(seal_signals)
    }

    /// Call a registered function by name — the host re-entry point, e.g.
    /// invoking a script-defined `main` repeatedly.
    pub fn call_function(&mut self, name: &str, args: Vec<Value>) -> Result<Value, RuntimeDiagnostic> {
        self.dispatch_call(name, args, Span::new(0, 0)).map_err(seal_signals)
    }

    /// Dispatch a global call: user-defined functions take priority over
    /// built-ins.
    pub(crate) fn dispatch_call(
        &mut self,
        name: &str,
        args: Vec<Value>,
        span: Span,
    ) -> Result<Value, RuntimeDiagnostic> {
        if let Some(function) = self.functions.get(name).cloned() {
            if function.params.len() != args.len() {
                return Err(RuntimeDiagnostic::new(
                    RuntimeError::ArityMismatch {
                        name: name.to_string(),
                        expected: function.params.len(),
                        got: args.len(),
                    },
                    span,
                ));
            }

            let mut frame = Frame::new();
            for (param, arg) in function.params.iter().zip(args) {
                frame.insert(param.clone(), arg);
            }

            // The frame is popped on every exit path, including a return
            // signal or an error part-way through the body.
            self.env.push_call_frame(frame);
            let result = self.exec_block(&function.body);
            self.env.pop_call_frame();

            return match result {
                Ok(()) => Ok(Value::Null),
                Err(diag) => match diag.error {
                    RuntimeError::Return(value) => Ok(value),
                    error => Err(RuntimeDiagnostic::new(error, diag.span)),
                },
            };
        }

        if let Some(builtin) = self.builtins.get(name) {
            return builtin
                .call(args)
                .map_err(|error| RuntimeDiagnostic::new(error, span));
        }

        Err(RuntimeDiagnostic::new(
            RuntimeError::UndefinedFunction(name.to_string()),
            span,
        ))
    }

    /// Register a script-defined function. Names are unique across both
    /// registries once declared.
    pub(crate) fn register_function(
        &mut self,
        name: &str,
        params: Vec<String>,
        body: Vec<Stmt>,
        span: Span,
    ) -> Result<(), RuntimeDiagnostic> {
        if self.builtins.contains_key(name) || self.functions.contains_key(name) {
            return Err(RuntimeDiagnostic::new(
                RuntimeError::Redefinition(name.to_string()),
                span,
            ));
        }
        self.functions
            .insert(name.to_string(), Rc::new(UserFunction { params, body }));
        Ok(())
    }
}

impl Default for Context {
    fn default() -> Self {
        Self::new()
    }
}

/// Convert a control signal escaping its consuming construct into the
/// corresponding runtime error.
fn seal_signals(diag: RuntimeDiagnostic) -> RuntimeDiagnostic {
    let error = match diag.error {
        RuntimeError::Break => RuntimeError::BreakOutsideLoop,
        RuntimeError::Continue => RuntimeError::ContinueOutsideLoop,
        RuntimeError::Return(_) => RuntimeError::ReturnOutsideFunction,
        error => error,
    };
    RuntimeDiagnostic::new(error, diag.span)
}
