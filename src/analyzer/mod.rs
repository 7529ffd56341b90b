use std::collections::HashSet;

use log::debug;

use crate::errors::ScopeFault;

/// Whether a name-introducing statement creates the binding or reuses it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Binding {
    Declare,
    Assign,
}

/// One lexical frame: the global program or a single function body.
#[derive(Debug, Default)]
pub struct Scope {
    names: HashSet<String>,
    // Declaration order, for hoisting
    declared: Vec<String>,
}

impl Scope {
    fn contains(&self, name: &str) -> bool {
        self.names.contains(name)
    }

    /// Returns false if `name` was already declared here.
    fn insert(&mut self, name: &str) -> bool {
        if !self.names.insert(name.to_string()) {
            return false;
        }
        self.declared.push(name.to_string());
        true
    }
}

/// Stack of scopes, innermost last. The global frame is never popped.
#[derive(Debug)]
pub struct SymbolTable {
    scopes: Vec<Scope>,
}

impl SymbolTable {
    pub fn new() -> Self {
        SymbolTable {
            scopes: vec![Scope::default()],
        }
    }

    fn current(&mut self) -> &mut Scope {
        // The global frame is always present
        let last = self.scopes.len() - 1;
        &mut self.scopes[last]
    }

    pub fn depth(&self) -> usize {
        self.scopes.len()
    }

    pub fn push_scope(&mut self) {
        self.scopes.push(Scope::default());
        debug!("entered scope depth {}", self.scopes.len());
    }

    /// Pops the innermost function scope and returns the names it declared,
    /// in declaration order. Popping the global frame is a no-op.
    pub fn pop_scope(&mut self) -> Vec<String> {
        if self.scopes.len() == 1 {
            return Vec::new();
        }
        let scope = self.scopes.pop().unwrap_or_default();
        debug!("left scope depth {} ({} names)", self.scopes.len() + 1, scope.declared.len());
        scope.declared
    }

    /// Declares `name` in the innermost scope. A second declaration in the
    /// same scope is rejected; shadowing an enclosing scope is allowed.
    pub fn declare(&mut self, name: &str) -> Result<(), ScopeFault> {
        if self.current().insert(name) {
            Ok(())
        } else {
            Err(ScopeFault::Redeclared)
        }
    }

    pub fn is_visible(&self, name: &str) -> bool {
        self.scopes.iter().rev().any(|s| s.contains(name))
    }

    /// Declare-or-assign: a visible name is reassigned, anything else is
    /// declared in the innermost scope.
    pub fn bind(&mut self, name: &str) -> Binding {
        if self.is_visible(name) {
            Binding::Assign
        } else {
            self.current().insert(name);
            Binding::Declare
        }
    }

    pub fn resolve(&self, name: &str) -> Result<(), ScopeFault> {
        if self.is_visible(name) {
            Ok(())
        } else {
            Err(ScopeFault::Undeclared)
        }
    }

    /// Names declared in the global frame, in declaration order.
    pub fn globals(&self) -> &[String] {
        &self.scopes[0].declared
    }
}

impl Default for SymbolTable {
    fn default() -> Self {
        Self::new()
    }
}
