//! Variable scoping.
//!
//! Three tiers: global bindings, a stack of function-call frames of which
//! only the top is visible, and a stack of loop-iterator bindings that
//! shadows everything else for the duration of an iteration.

use std::collections::HashMap;

use crate::value::Value;

/// One layer of name-to-value bindings.
pub(crate) type Frame = HashMap<String, Value>;

#[derive(Default)]
pub(crate) struct Environment {
    globals: Frame,
    call_frames: Vec<Frame>,
    loop_frames: Vec<(String, Value)>,
}

impl Environment {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read order: innermost loop iterator first, then the top call frame,
    /// then globals.
    pub fn get(&self, name: &str) -> Option<Value> {
        for (binding, value) in self.loop_frames.iter().rev() {
            if binding == name {
                return Some(value.clone());
            }
        }
        if let Some(frame) = self.call_frames.last() {
            if let Some(value) = frame.get(name) {
                return Some(value.clone());
            }
        }
        self.globals.get(name).cloned()
    }

    /// Writes go to the top call frame, unless the name is already bound
    /// globally (or no call frame is active), in which case they go to the
    /// globals.
    pub fn set(&mut self, name: &str, value: Value) {
        match self.call_frames.last_mut() {
            Some(frame) if !self.globals.contains_key(name) => {
                frame.insert(name.to_string(), value);
            }
            _ => {
                self.globals.insert(name.to_string(), value);
            }
        }
    }

    /// Bind directly in the globals, regardless of active frames. Used for
    /// host injection.
    pub fn define_global(&mut self, name: String, value: Value) {
        self.globals.insert(name, value);
    }

    pub fn in_function(&self) -> bool {
        !self.call_frames.is_empty()
    }

    pub fn push_call_frame(&mut self, frame: Frame) {
        self.call_frames.push(frame);
    }

    pub fn pop_call_frame(&mut self) {
        self.call_frames.pop();
    }

    pub fn push_loop_binding(&mut self, name: String, value: Value) {
        self.loop_frames.push((name, value));
    }

    pub fn pop_loop_binding(&mut self) {
        self.loop_frames.pop();
    }
}
