// ABOUTME: Lexical environments forming parent-linked scope chains

use crate::value::Value;
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

#[derive(Debug, Default)]
pub struct Environment {
    bindings: RefCell<HashMap<String, Value>>,
    outer: Option<Rc<Environment>>,
}

impl Environment {
    /// Creates a root environment with no outer link.
    pub fn new() -> Rc<Self> {
        Rc::new(Environment {
            bindings: RefCell::new(HashMap::new()),
            outer: None,
        })
    }

    /// Creates a child environment with this one as its outer scope.
    pub fn extend(self: &Rc<Self>) -> Rc<Self> {
        Rc::new(Environment {
            bindings: RefCell::new(HashMap::new()),
            outer: Some(Rc::clone(self)),
        })
    }

    /// Binds a name in THIS scope only; never walks the outer chain.
    pub fn set(&self, name: impl Into<String>, value: Value) {
        self.bindings.borrow_mut().insert(name.into(), value);
    }

    /// Looks a name up in this scope, then outward through the chain.
    pub fn get(&self, name: &str) -> Option<Value> {
        if let Some(value) = self.bindings.borrow().get(name) {
            return Some(value.clone());
        }
        if let Some(ref outer) = self.outer {
            return outer.get(name);
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_and_get() {
        let env = Environment::new();
        env.set("x", Value::Integer(42));

        match env.get("x") {
            Some(Value::Integer(n)) => assert_eq!(n, 42),
            other => panic!("expected Integer(42), got {:?}", other),
        }
    }

    #[test]
    fn test_missing_name() {
        let env = Environment::new();
        assert!(env.get("missing").is_none());
    }

    #[test]
    fn test_shadowing() {
        let outer = Environment::new();
        outer.set("x", Value::Integer(42));

        let inner = outer.extend();
        inner.set("x", Value::Integer(100));

        match inner.get("x") {
            Some(Value::Integer(n)) => assert_eq!(n, 100),
            other => panic!("expected Integer(100), got {:?}", other),
        }
        // The outer binding is untouched.
        match outer.get("x") {
            Some(Value::Integer(n)) => assert_eq!(n, 42),
            other => panic!("expected Integer(42), got {:?}", other),
        }
    }

    #[test]
    fn test_outer_lookup() {
        let outer = Environment::new();
        outer.set("x", Value::Integer(42));

        let inner = outer.extend();
        match inner.get("x") {
            Some(Value::Integer(n)) => assert_eq!(n, 42),
            other => panic!("expected Integer(42), got {:?}", other),
        }
    }

    #[test]
    fn test_chain_of_scopes() {
        let root = Environment::new();
        root.set("a", Value::Integer(1));

        let middle = root.extend();
        middle.set("b", Value::Integer(2));

        let leaf = middle.extend();
        leaf.set("c", Value::Integer(3));

        for (name, expected) in [("a", 1), ("b", 2), ("c", 3)] {
            match leaf.get(name) {
                Some(Value::Integer(n)) => assert_eq!(n, expected),
                other => panic!("expected Integer({}), got {:?}", expected, other),
            }
        }
    }

    #[test]
    fn test_bindings_added_after_extend_are_visible() {
        let outer = Environment::new();
        let inner = outer.extend();
        outer.set("late", Value::Integer(7));

        // No snapshot: the chain sees mutations made after the child existed.
        match inner.get("late") {
            Some(Value::Integer(n)) => assert_eq!(n, 7),
            other => panic!("expected Integer(7), got {:?}", other),
        }
    }
}
