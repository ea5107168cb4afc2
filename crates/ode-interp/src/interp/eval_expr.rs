// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Expression evaluation.

use std::rc::Rc;

use ode_ast::expr::{Expr, ExprKind};

use crate::error::{RuntimeDiagnostic, RuntimeError};
use crate::object::Object;
use crate::value::Value;

use super::operators;
use super::Context;

impl Context {
    pub(crate) fn eval_expr(&mut self, expr: &Expr) -> Result<Value, RuntimeDiagnostic> {
        match &expr.kind {
            ExprKind::Number(n) => Ok(Value::Number(*n)),
            ExprKind::Str(s) => Ok(Value::Str(s.clone())),
            ExprKind::Bool(b) => Ok(Value::Bool(*b)),

            ExprKind::Ident(name) => self.env.get(name).ok_or_else(|| {
                RuntimeDiagnostic::new(RuntimeError::UndefinedVariable(name.clone()), expr.span)
            }),

            ExprKind::Binary { op, left, right } => {
                // Both operands evaluate before the operator applies; `and`
                // and `or` do not short-circuit.
                let left = self.eval_expr(left)?;
                let right = self.eval_expr(right)?;
                operators::apply_binary(*op, left, right)
                    .map_err(|error| RuntimeDiagnostic::new(error, expr.span))
            }

            ExprKind::Unary { op, operand } => {
                let operand = self.eval_expr(operand)?;
                operators::apply_unary(*op, operand)
                    .map_err(|error| RuntimeDiagnostic::new(error, expr.span))
            }

            ExprKind::Array(elements) => {
                let mut values = Vec::with_capacity(elements.len());
                for element in elements {
                    values.push(self.eval_expr(element)?);
                }
                Ok(Value::Object(Rc::new(Object::array(values))))
            }

            ExprKind::Dict(pairs) => {
                let mut entries = Vec::with_capacity(pairs.len());
                for (key, value) in pairs {
                    let key_text = self
                        .eval_expr(key)?
                        .render()
                        .map_err(|error| RuntimeDiagnostic::new(error, key.span))?;
                    entries.push((key_text, self.eval_expr(value)?));
                }
                Ok(Value::Object(Rc::new(Object::dictionary(entries))))
            }

            ExprKind::Call { name, args } => {
                let args = self.eval_args(args)?;
                self.dispatch_call(name, args, expr.span)
            }

            ExprKind::MethodCall { object, method, args } => {
                let target = self.eval_expr(object)?;
                let args = self.eval_args(args)?;
                match &target {
                    Value::Object(obj) => obj
                        .call_method(method, args)
                        .map_err(|error| RuntimeDiagnostic::new(error, expr.span)),
                    other => Err(RuntimeDiagnostic::new(
                        RuntimeError::NotAnObject(other.type_name()),
                        expr.span,
                    )),
                }
            }

            ExprKind::Index { object, index } => {
                let target = self.eval_expr(object)?;
                let index = self.eval_expr(index)?;
                match &target {
                    Value::Object(obj) => obj
                        .call_method("get", vec![index])
                        .map_err(|error| RuntimeDiagnostic::new(error, expr.span)),
                    other => Err(RuntimeDiagnostic::new(
                        RuntimeError::NotIndexable(other.type_name()),
                        expr.span,
                    )),
                }
            }

            ExprKind::PreIncDec { name, increment } => {
                let updated = self.step_variable(name, *increment, expr)?;
                Ok(Value::Number(updated))
            }

            ExprKind::PostIncDec { name, increment } => {
                let updated = self.step_variable(name, *increment, expr)?;
                let prior = if *increment { updated - 1.0 } else { updated + 1.0 };
                Ok(Value::Number(prior))
            }
        }
    }

    /// Read-modify-write for `++`/`--`; returns the updated value.
    fn step_variable(
        &mut self,
        name: &str,
        increment: bool,
        expr: &Expr,
    ) -> Result<f32, RuntimeDiagnostic> {
        let current = self.env.get(name).ok_or_else(|| {
            RuntimeDiagnostic::new(RuntimeError::UndefinedVariable(name.to_string()), expr.span)
        })?;
        let n = current
            .as_number()
            .map_err(|error| RuntimeDiagnostic::new(error, expr.span))?;
        let updated = if increment { n + 1.0 } else { n - 1.0 };
        self.env.set(name, Value::Number(updated));
        Ok(updated)
    }

    /// Arguments evaluate left to right.
    fn eval_args(&mut self, args: &[Expr]) -> Result<Vec<Value>, RuntimeDiagnostic> {
        let mut values = Vec::with_capacity(args.len());
        for arg in args {
            values.push(self.eval_expr(arg)?);
        }
        Ok(values)
    }
}
