//! Lexical scope chain.
//!
//! An [`Environment`] is one scope: a name → value map plus an optional link to
//! the enclosing scope.  Scopes are shared through [`EnvRef`] handles: the
//! interpreter's current-scope pointer, every closure declared while the scope
//! was active, and every bound method all keep it alive.  Parent links only
//! point outward, so chains never loop.

use crate::error::RuntimeError;
use crate::token::Token;
use crate::value::Value;
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

/// Shared, mutable handle to a scope.
pub type EnvRef = Rc<RefCell<Environment>>;

#[derive(Debug, Default)]
pub struct Environment {
    values: HashMap<String, Value>,
    enclosing: Option<EnvRef>,
}

impl Environment {
    pub fn new() -> Self {
        Environment {
            values: HashMap::new(),
            enclosing: None,
        }
    }

    pub fn with_enclosing(enclosing: EnvRef) -> Self {
        Environment {
            values: HashMap::new(),
            enclosing: Some(enclosing),
        }
    }

    /// Fresh child scope of `enclosing`, already wrapped in a handle.
    pub fn child_of(enclosing: &EnvRef) -> EnvRef {
        Rc::new(RefCell::new(Environment::with_enclosing(Rc::clone(enclosing))))
    }

    /// Insert or overwrite `name` in *this* scope only.
    pub fn define(&mut self, name: &str, value: Value) {
        self.values.insert(name.to_string(), value);
    }

    /// Names bound in *this* scope only.
    pub fn names(&self) -> Vec<String> {
        self.values.keys().cloned().collect()
    }

    /// Look `name` up here, then outward through the enclosing scopes.
    pub fn get(&self, name: &Token) -> Result<Value, RuntimeError> {
        if let Some(value) = self.values.get(&name.lexeme) {
            Ok(value.clone())
        } else if let Some(enclosing) = &self.enclosing {
            enclosing.borrow().get(name)
        } else {
            Err(RuntimeError::UndefinedVariable {
                name: name.lexeme.clone(),
                line: name.line,
            })
        }
    }

    /// Overwrite the nearest existing binding of `name`.
    pub fn assign(&mut self, name: &Token, value: Value) -> Result<(), RuntimeError> {
        if let Some(slot) = self.values.get_mut(&name.lexeme) {
            *slot = value;
            Ok(())
        } else if let Some(enclosing) = &self.enclosing {
            enclosing.borrow_mut().assign(name, value)
        } else {
            Err(RuntimeError::UndefinedVariable {
                name: name.lexeme.clone(),
                line: name.line,
            })
        }
    }

    /// The scope exactly `distance` parent hops out from `env`.
    pub fn ancestor(env: &EnvRef, distance: usize) -> Option<EnvRef> {
        let mut current: EnvRef = Rc::clone(env);

        for _ in 0..distance {
            let next: EnvRef = current.borrow().enclosing.clone()?;
            current = next;
        }

        Some(current)
    }

    /// Read `name` from the scope `distance` hops out, without searching.
    pub fn get_at(env: &EnvRef, distance: usize, name: &Token) -> Result<Value, RuntimeError> {
        Environment::ancestor(env, distance)
            .and_then(|scope| scope.borrow().values.get(&name.lexeme).cloned())
            .ok_or_else(|| RuntimeError::UndefinedVariable {
                name: name.lexeme.clone(),
                line: name.line,
            })
    }

    /// Overwrite `name` in the scope `distance` hops out, without searching.
    pub fn assign_at(
        env: &EnvRef,
        distance: usize,
        name: &Token,
        value: Value,
    ) -> Result<(), RuntimeError> {
        let scope: EnvRef =
            Environment::ancestor(env, distance).ok_or_else(|| RuntimeError::UndefinedVariable {
                name: name.lexeme.clone(),
                line: name.line,
            })?;

        scope.borrow_mut().define(&name.lexeme, value);

        Ok(())
    }
}
