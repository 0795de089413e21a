//! The runtime value model: the tagged union every expression evaluates to,
//! plus the closure record and the binding-cell/deep-copy machinery the rest
//! of the evaluator builds on.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use crate::ast::FuncDef;
use crate::object::Object;

/// A storage cell for one binding. Environment bindings, `refarg` sharing,
/// and closure free-variable capture are all realized by sharing or not
/// sharing one of these, per the spec's "binding cell" design note.
pub(crate) type Cell = Rc<RefCell<Value>>;

pub(crate) fn new_cell(value: Value) -> Cell {
    Rc::new(RefCell::new(value))
}

/// A callable value: an (immutable, AST-shared) function/lambda definition
/// plus the free variables it captured at creation time.
///
/// `free_vars` cells are **not** re-snapshotted per call: every activation of
/// this closure shares the same cells, so a lambda that mutates a captured
/// free variable observes that mutation on its next call. Only capture
/// itself (`Interpreter::evaluate_lambda`) and explicit deep-copy create new
/// cells.
#[derive(Debug, Clone)]
pub struct Closure {
    pub(crate) definition: Rc<FuncDef>,
    pub(crate) free_vars: HashMap<String, Cell>,
}

/// The tagged value union described in the language's data model.
#[derive(Debug, Clone)]
pub enum Value {
    Nil,
    Int(i64),
    Bool(bool),
    Str(String),
    Func(Closure),
    /// Arises only when multiple top-level functions share a name; never
    /// assignable as a first-class value (attempting to read one as a plain
    /// variable is a name error, enforced in `interpreter::eval_var`).
    OverloadedFunc(Rc<BTreeMap<usize, Rc<FuncDef>>>),
    Object(Object),
}

impl Value {
    #[must_use]
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Nil => "nil",
            Self::Int(_) => "int",
            Self::Bool(_) => "bool",
            Self::Str(_) => "string",
            Self::Func(_) => "func",
            Self::OverloadedFunc(_) => "overloaded_func",
            Self::Object(_) => "object",
        }
    }

    /// `print`/`inputs`-style rendering: booleans as `true`/`false`, `nil` as
    /// `nil`, ints in base 10, strings verbatim.
    #[must_use]
    pub fn display_form(&self) -> String {
        match self {
            Self::Nil => "nil".to_owned(),
            Self::Int(n) => n.to_string(),
            Self::Bool(b) => (if *b { "true" } else { "false" }).to_owned(),
            Self::Str(s) => s.clone(),
            Self::Func(_) | Self::OverloadedFunc(_) => format!("<{}>", self.type_name()),
            Self::Object(obj) => format!("<object@{:p}>", obj.as_ptr()),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display_form())
    }
}

/// Deep-copies a value: used for `return` expressions, `byval` argument
/// binding, and lambda free-variable capture. Objects get a brand new
/// identity with every member recursively deep-copied (matching the
/// reference implementation's use of Python's `copy.deepcopy` on a plain
/// member dict); closures keep their shared AST definition but get fresh
/// cells for every free variable.
#[must_use]
pub(crate) fn deep_copy(value: &Value) -> Value {
    match value {
        Value::Nil => Value::Nil,
        Value::Int(n) => Value::Int(*n),
        Value::Bool(b) => Value::Bool(*b),
        Value::Str(s) => Value::Str(s.clone()),
        Value::OverloadedFunc(map) => Value::OverloadedFunc(Rc::clone(map)),
        Value::Func(closure) => Value::Func(Closure {
            definition: Rc::clone(&closure.definition),
            free_vars: closure
                .free_vars
                .iter()
                .map(|(name, cell)| (name.clone(), new_cell(deep_copy(&cell.borrow()))))
                .collect(),
        }),
        Value::Object(obj) => Value::Object(obj.deep_clone()),
    }
}

/// Structural/identity equality per the language's `==` semantics: objects
/// compare by identity, everything else compares by value, and differing
/// types are unequal (coercion, if any, happens before this is called).
#[must_use]
pub(crate) fn values_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Nil, Value::Nil) => true,
        (Value::Int(x), Value::Int(y)) => x == y,
        (Value::Bool(x), Value::Bool(y)) => x == y,
        (Value::Str(x), Value::Str(y)) => x == y,
        (Value::Object(x), Value::Object(y)) => x.is_same(y),
        (Value::Func(x), Value::Func(y)) => Rc::ptr_eq(&x.definition, &y.definition) && free_vars_same(x, y),
        (Value::OverloadedFunc(x), Value::OverloadedFunc(y)) => Rc::ptr_eq(x, y),
        _ => false,
    }
}

fn free_vars_same(a: &Closure, b: &Closure) -> bool {
    a.free_vars.len() == b.free_vars.len()
        && a.free_vars
            .iter()
            .all(|(name, cell)| b.free_vars.get(name).is_some_and(|other| Rc::ptr_eq(cell, other)))
}
