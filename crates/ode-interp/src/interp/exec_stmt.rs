// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Statement execution.

use std::rc::Rc;

use ode_ast::stmt::{Stmt, StmtKind};

use crate::error::{RuntimeDiagnostic, RuntimeError};
use crate::value::Value;

use super::Context;

/// Runaway-loop guard for `while`; `for` is bounded by collection length.
const WHILE_ITERATION_LIMIT: usize = 10_000;

impl Context {
    pub(crate) fn exec_block(&mut self, stmts: &[Stmt]) -> Result<(), RuntimeDiagnostic> {
        for stmt in stmts {
            self.exec_stmt(stmt)?;
        }
        Ok(())
    }

    fn exec_stmt(&mut self, stmt: &Stmt) -> Result<(), RuntimeDiagnostic> {
        match &stmt.kind {
            StmtKind::Expr(expr) => {
                self.eval_expr(expr)?;
                Ok(())
            }

            StmtKind::Assign { name, value } => {
                let value = self.eval_expr(value)?;
                self.env.set(name, value);
                Ok(())
            }

            StmtKind::IndexAssign { object, index, value } => {
                let target = self.eval_expr(object)?;
                let index = self.eval_expr(index)?;
                let value = self.eval_expr(value)?;
                match &target {
                    Value::Object(obj) => {
                        let method = if obj.is_dictionary() { "put" } else { "set" };
                        obj.call_method(method, vec![index, value])
                            .map_err(|error| RuntimeDiagnostic::new(error, stmt.span))?;
                        Ok(())
                    }
                    other => Err(RuntimeDiagnostic::new(
                        RuntimeError::NotIndexable(other.type_name()),
                        stmt.span,
                    )),
                }
            }

            StmtKind::If { arms, else_body } => {
                for (cond, body) in arms {
                    if self.eval_expr(cond)?.truthy() {
                        return self.exec_block(body);
                    }
                }
                match else_body {
                    Some(body) => self.exec_block(body),
                    None => Ok(()),
                }
            }

            StmtKind::While { cond, body } => {
                let mut iterations = 0;
                while self.eval_expr(cond)?.truthy() {
                    iterations += 1;
                    if iterations > WHILE_ITERATION_LIMIT {
                        return Err(RuntimeDiagnostic::new(
                            RuntimeError::IterationLimit(WHILE_ITERATION_LIMIT),
                            stmt.span,
                        ));
                    }
                    match self.exec_block(body) {
                        Ok(()) => {}
                        Err(diag) if matches!(diag.error, RuntimeError::Break) => break,
                        Err(diag) if matches!(diag.error, RuntimeError::Continue) => continue,
                        Err(diag) => return Err(diag),
                    }
                }
                Ok(())
            }

            StmtKind::For { binding, iter, body } => {
                let iterable = self.eval_expr(iter)?;
                let collection = match &iterable {
                    Value::Object(obj) if obj.is_collection() => Rc::clone(obj),
                    other => {
                        return Err(RuntimeDiagnostic::new(
                            RuntimeError::NotIterable(other.type_name()),
                            stmt.span,
                        ))
                    }
                };

                let len = collection.length().unwrap_or(0);
                for index in 0..len {
                    let item = collection.get_at_index(index).ok_or_else(|| {
                        RuntimeDiagnostic::new(
                            RuntimeError::IndexOutOfBounds {
                                index: index as i64,
                                len: collection.length().unwrap_or(0),
                            },
                            stmt.span,
                        )
                    })?;

                    // A fresh iterator frame per iteration; popped before
                    // the signal, if any, is handled.
                    self.env.push_loop_binding(binding.clone(), item);
                    let result = self.exec_block(body);
                    self.env.pop_loop_binding();

                    match result {
                        Ok(()) => {}
                        Err(diag) if matches!(diag.error, RuntimeError::Break) => break,
                        Err(diag) if matches!(diag.error, RuntimeError::Continue) => continue,
                        Err(diag) => return Err(diag),
                    }
                }
                Ok(())
            }

            StmtKind::FnDef { name, params, body } => {
                self.register_function(name, params.clone(), body.clone(), stmt.span)
            }

            StmtKind::Return(value) => {
                if !self.env.in_function() {
                    return Err(RuntimeDiagnostic::new(
                        RuntimeError::ReturnOutsideFunction,
                        stmt.span,
                    ));
                }
                let value = match value {
                    Some(expr) => self.eval_expr(expr)?,
                    None => Value::Null,
                };
                Err(RuntimeDiagnostic::new(RuntimeError::Return(value), stmt.span))
            }

            StmtKind::Break => Err(RuntimeDiagnostic::new(RuntimeError::Break, stmt.span)),

            StmtKind::Continue => Err(RuntimeDiagnostic::new(RuntimeError::Continue, stmt.span)),
        }
    }
}
