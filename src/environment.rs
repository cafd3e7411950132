use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use log::trace;

use crate::error::{Result, ZeError};
use crate::token::Token;
use crate::value::Value;

/// Shared handle to an environment. Closures and active calls each hold one,
/// so a scope lives as long as its longest holder.
pub type EnvRef = Rc<RefCell<Environment>>;

/// One lexical scope: its bindings plus a link to the enclosing scope. The
/// link is set at creation and never changes.
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

    /// Wrap into a shared handle.
    pub fn into_ref(self) -> EnvRef {
        Rc::new(RefCell::new(self))
    }

    pub fn enclosing(&self) -> Option<EnvRef> {
        self.enclosing.clone()
    }

    /// Bind `name` in this scope, replacing any previous binding.
    pub fn define(&mut self, name: &str, value: Value) {
        trace!("define '{}' = {}", name, value);
        self.values.insert(name.to_string(), value);
    }

    /// Binding held directly by this scope, if any.
    pub fn lookup(&self, name: &str) -> Option<Value> {
        self.values.get(name).cloned()
    }

    /// Dynamic lookup through the whole chain.
    pub fn get(&self, name: &Token) -> Result<Value> {
        if let Some(value) = self.values.get(&name.lexeme) {
            Ok(value.clone())
        } else if let Some(enclosing) = &self.enclosing {
            enclosing.borrow().get(name)
        } else {
            Err(ZeError::runtime(
                name,
                format!("Undefined variable '{}'.", name.lexeme),
            ))
        }
    }

    /// Dynamic assignment through the whole chain; the name must exist.
    pub fn assign(&mut self, name: &Token, value: Value) -> Result<()> {
        if let Some(slot) = self.values.get_mut(&name.lexeme) {
            *slot = value;
            Ok(())
        } else if let Some(enclosing) = &self.enclosing {
            enclosing.borrow_mut().assign(name, value)
        } else {
            Err(ZeError::runtime(
                name,
                format!("Undefined variable '{}'.", name.lexeme),
            ))
        }
    }

    /// Names bound directly in this scope.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.values.keys().cloned().collect();
        names.sort();
        names
    }
}

/// Walk `distance` enclosing links up from `env`. `None` when the chain is
/// shorter, which means resolver and interpreter disagree about nesting.
pub fn ancestor(env: &EnvRef, distance: usize) -> Option<EnvRef> {
    let mut current: EnvRef = Rc::clone(env);

    for _ in 0..distance {
        let next = current.borrow().enclosing();
        current = next?;
    }

    Some(current)
}

fn scope_at(env: &EnvRef, distance: usize, name: &Token) -> Result<EnvRef> {
    ancestor(env, distance).ok_or_else(|| {
        ZeError::runtime(
            name,
            format!(
                "Internal error: no scope {} levels up for '{}'.",
                distance, name.lexeme
            ),
        )
    })
}

/// Read a binding the resolver placed `distance` scopes up.
pub fn get_at(env: &EnvRef, distance: usize, name: &Token) -> Result<Value> {
    scope_at(env, distance, name)?
        .borrow()
        .values
        .get(&name.lexeme)
        .cloned()
        .ok_or_else(|| {
            ZeError::runtime(name, format!("Undefined variable '{}'.", name.lexeme))
        })
}

/// Write a binding the resolver placed `distance` scopes up.
pub fn assign_at(env: &EnvRef, distance: usize, name: &Token, value: Value) -> Result<()> {
    scope_at(env, distance, name)?
        .borrow_mut()
        .define(&name.lexeme, value);

    Ok(())
}
