use crate::interpreter::{RuntimeError, Value};
use crate::scanner::Token;
use crate::types::{create_shared, Shared};
use log::trace;
use std::collections::HashMap;

/// One scope frame. Frames chain from innermost to the globals and are
/// shared: a closure holds the frame that was current at its definition,
/// so several closures may keep the same frame alive.
pub struct Environment {
    values: HashMap<String, Value>,
    enclosing: Option<Shared<Environment>>,
}

impl Environment {
    pub fn new(enclosing: Option<Shared<Environment>>) -> Shared<Environment> {
        create_shared(Environment {
            values: HashMap::default(),
            enclosing,
        })
    }

    /// Unconditionally (re-)binds a name in this frame. The resolver
    /// rejects redeclaration in non-global scopes statically.
    pub fn define(&mut self, name: &str, value: Value) {
        trace!("define '{}' = {}", name, value);
        self.values.insert(name.to_string(), value);
    }

    pub fn get(&self, name: &Token) -> Result<Value, RuntimeError> {
        if let Some(value) = self.values.get(name.lexeme.as_str()) {
            Ok(value.clone())
        } else if let Some(enclosing) = &self.enclosing {
            enclosing.borrow().get(name)
        } else {
            RuntimeError::new(name, &format!("Undefined variable '{}'.", name.lexeme))
        }
    }

    pub fn assign(&mut self, name: &Token, value: Value) -> Result<(), RuntimeError> {
        if let Some(slot) = self.values.get_mut(name.lexeme.as_str()) {
            *slot = value;
            Ok(())
        } else if let Some(enclosing) = &self.enclosing {
            enclosing.borrow_mut().assign(name, value)
        } else {
            RuntimeError::new(name, &format!("Undefined variable '{}'.", name.lexeme))
        }
    }

    /// Reads a name from the frame `distance` hops up the chain. The
    /// resolver guarantees the frame exists on every path that reaches
    /// a resolved reference.
    pub fn get_at(&self, distance: usize, name: &str) -> Option<Value> {
        if distance == 0 {
            return self.values.get(name).cloned();
        }
        self.ancestor(distance)
            .and_then(|env| env.borrow().values.get(name).cloned())
    }

    pub fn assign_at(
        &mut self,
        distance: usize,
        name: &Token,
        value: Value,
    ) -> Result<(), RuntimeError> {
        if distance == 0 {
            self.assign(name, value)
        } else if let Some(env) = self.ancestor(distance) {
            env.borrow_mut().assign(name, value)
        } else {
            RuntimeError::new(name, &format!("Undefined variable '{}'.", name.lexeme))
        }
    }

    fn ancestor(&self, distance: usize) -> Option<Shared<Environment>> {
        let mut env = self.enclosing.clone();
        for _ in 1..distance {
            match env {
                Some(enclosing) => env = enclosing.borrow().enclosing.clone(),
                None => return None,
            }
        }
        env
    }
}
