//! Prototype-less mutable objects with member access and reference identity.

use std::cell::RefCell;
use std::rc::Rc;

use indexmap::IndexMap;

use crate::value::{Value, deep_copy};

/// A mutable, member-keyed record. Cloning an `Object` handle (via
/// `Clone`/`clone_handle`) shares the same underlying storage — this is how
/// `a = @; b = a;` makes `a` and `b` refer to the same object. Use
/// [`Object::deep_clone`] to get a value with a new identity.
#[derive(Debug, Clone)]
pub struct Object(Rc<RefCell<IndexMap<String, Value>>>);

impl Object {
    #[must_use]
    pub fn new() -> Self {
        Self(Rc::new(RefCell::new(IndexMap::new())))
    }

    #[must_use]
    pub(crate) fn clone_handle(&self) -> Self {
        Self(Rc::clone(&self.0))
    }

    /// `true` iff `self` and `other` are the exact same underlying object
    /// (the identity comparison behind `==` on two object values).
    #[must_use]
    pub fn is_same(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    #[must_use]
    pub(crate) fn as_ptr(&self) -> *const RefCell<IndexMap<String, Value>> {
        Rc::as_ptr(&self.0)
    }

    pub fn get(&self, member: &str) -> Option<Value> {
        self.0.borrow().get(member).cloned()
    }

    pub fn set(&self, member: impl Into<String>, value: Value) {
        self.0.borrow_mut().insert(member.into(), value);
    }

    #[must_use]
    pub fn has_member(&self, member: &str) -> bool {
        self.0.borrow().contains_key(member)
    }

    /// Recursively deep-copies this object's members into a brand new
    /// object with a distinct identity, matching `copy.deepcopy` on the
    /// reference implementation's member dict.
    #[must_use]
    pub(crate) fn deep_clone(&self) -> Self {
        let copied: IndexMap<String, Value> = self.0.borrow().iter().map(|(k, v)| (k.clone(), deep_copy(v))).collect();
        Self(Rc::new(RefCell::new(copied)))
    }
}

impl Default for Object {
    fn default() -> Self {
        Self::new()
    }
}
