//! The scope stack: name-to-value bindings with lexical nesting and
//! shadowing, realized as one binding-cell stack per name plus a stack of
//! per-frame name sets (see the spec's Design Notes for why this shape was
//! chosen over nested hashmaps).

use std::collections::HashMap;
use std::collections::HashSet;

use crate::value::{Cell, Value, new_cell};

#[derive(Debug, Default)]
pub(crate) struct Environment {
    variables: HashMap<String, Vec<Cell>>,
    scopes: Vec<HashSet<String>>,
}

impl Environment {
    pub(crate) fn new() -> Self {
        Self {
            variables: HashMap::new(),
            scopes: vec![HashSet::new()],
        }
    }

    #[must_use]
    pub(crate) fn is_defined(&self, name: &str) -> bool {
        self.variables.get(name).is_some_and(|stack| !stack.is_empty())
    }

    /// Returns the cell currently visible for `name`, if any.
    #[must_use]
    pub(crate) fn cell(&self, name: &str) -> Option<Cell> {
        self.variables.get(name).and_then(|stack| stack.last()).cloned()
    }

    #[must_use]
    pub(crate) fn read(&self, name: &str) -> Option<Value> {
        self.cell(name).map(|cell| cell.borrow().clone())
    }

    /// `assign(name, value)`: overwrites the top binding in place if one
    /// exists (so any `refarg` parameter sharing the same cell observes the
    /// update), otherwise creates a brand new binding in the current frame.
    pub(crate) fn assign(&mut self, name: &str, value: Value) {
        if let Some(cell) = self.cell(name) {
            *cell.borrow_mut() = value;
        } else {
            self.push_new_binding(name, value);
        }
    }

    /// Pushes a brand new cell owning `value` and records it in the current
    /// frame (used for `byval` parameters and first-time assignment).
    pub(crate) fn push_new_binding(&mut self, name: &str, value: Value) {
        self.push_cell(name, new_cell(value));
    }

    /// Pushes an existing cell, sharing its storage with whoever else holds
    /// it (used for `refarg` parameters, closure free-variable activation,
    /// and `this` binding).
    pub(crate) fn push_cell(&mut self, name: &str, cell: Cell) {
        self.variables.entry(name.to_owned()).or_default().push(cell);
        self.scopes.last_mut().expect("at least one frame is always active").insert(name.to_owned());
    }

    /// Every name with a currently-visible binding, paired with its top
    /// cell. Used only by lambda capture, which snapshots *all* bound names
    /// rather than just the lambda body's free variables (see
    /// `interpreter::Interpreter::evaluate_lambda`).
    pub(crate) fn current_bindings(&self) -> impl Iterator<Item = (&str, &Cell)> {
        self.variables
            .iter()
            .filter_map(|(name, stack)| stack.last().map(|cell| (name.as_str(), cell)))
    }

    pub(crate) fn push_frame(&mut self) {
        self.scopes.push(HashSet::new());
    }

    pub(crate) fn pop_frame(&mut self) {
        let frame = self.scopes.pop().expect("pop_frame without a matching push_frame");
        for name in frame {
            if let Some(stack) = self.variables.get_mut(&name) {
                stack.pop();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shadowing_restores_outer_binding_on_pop() {
        let mut env = Environment::new();
        env.assign("x", Value::Int(1));
        env.push_frame();
        env.push_new_binding("x", Value::Int(2));
        assert_eq!(env.read("x").unwrap().display_form(), "2");
        env.pop_frame();
        assert_eq!(env.read("x").unwrap().display_form(), "1");
    }

    #[test]
    fn shared_cell_makes_assignment_visible_through_both_bindings() {
        let mut env = Environment::new();
        env.assign("x", Value::Int(1));
        let shared = env.cell("x").unwrap();
        env.push_frame();
        env.push_cell("y", shared);
        env.assign("y", Value::Int(42));
        env.pop_frame();
        assert_eq!(env.read("x").unwrap().display_form(), "42");
    }

    #[test]
    fn pop_frame_removes_every_name_pushed_at_that_frame() {
        let mut env = Environment::new();
        env.push_frame();
        env.push_new_binding("a", Value::Int(1));
        env.push_new_binding("b", Value::Int(2));
        env.pop_frame();
        assert!(!env.is_defined("a"));
        assert!(!env.is_defined("b"));
    }
}
