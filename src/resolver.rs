//! Static scope resolver for **glpc**.
//!
//! Unlike a separate AST pass, the resolver here is driven by the parser in
//! lock-step: the parser opens and closes scopes as it enters blocks,
//! functions, loops and classes, declares names as it meets them and asks the
//! resolver to bind every name-bearing expression it builds. The result is a
//! [`Resolutions`] side table mapping [`ExprId`] to the number of enclosing
//! scopes between the reference and its declaration.
//!
//! A name found in no scope gets no entry and is looked up in the top-level
//! environment at runtime.

use std::collections::HashMap;

use log::{debug, trace};

use crate::ast::ExprId;
use crate::error::ParseError;
use crate::token::Token;

/// Side table produced by the resolver and consumed by the interpreter.
#[derive(Debug, Default, Clone)]
pub struct Resolutions {
    distances: HashMap<ExprId, usize>,
}

impl Resolutions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, id: ExprId, distance: usize) {
        self.distances.insert(id, distance);
    }

    /// Scope distance for `id`, or `None` for a global reference.
    pub fn distance(&self, id: ExprId) -> Option<usize> {
        self.distances.get(&id).copied()
    }

    pub fn len(&self) -> usize {
        self.distances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.distances.is_empty()
    }

    /// Merge another program's table; ids never collide because every parse
    /// of one interpreter starts past the previous program's last id.
    pub fn extend(&mut self, other: Resolutions) {
        self.distances.extend(other.distances);
    }
}

/// Stack of lexical scopes; each maps a name to "fully defined yet".
#[derive(Debug, Default)]
pub struct Resolver {
    scopes: Vec<HashMap<String, bool>>, // false=declared, true=defined
    resolutions: Resolutions,
}

impl Resolver {
    pub fn new() -> Self {
        Self::default()
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Scope management
    // ─────────────────────────────────────────────────────────────────────────

    #[inline]
    pub fn begin(&mut self) {
        self.scopes.push(HashMap::new());
    }

    /// Pop the innermost scope. Popping with no scope open is a no-op.
    #[inline]
    pub fn end(&mut self) {
        self.scopes.pop();
    }

    /// Number of open scopes; zero means top level.
    pub fn depth(&self) -> usize {
        self.scopes.len()
    }

    /// State of `name` in the innermost scope: `Some(false)` declared,
    /// `Some(true)` defined, `None` absent (or no scope open).
    pub fn peek(&self, name: &str) -> Option<bool> {
        self.scopes.last().and_then(|scope| scope.get(name).copied())
    }

    /// Mark `name` present-but-uninitialised in the innermost scope.
    pub fn declare(&mut self, name: &Token) -> Result<(), ParseError> {
        let depth = self.scopes.len();
        let Some(scope) = self.scopes.last_mut() else {
            return Ok(());
        };

        if scope.contains_key(&name.lexeme) {
            return Err(ParseError::at(
                name,
                "Variable with this name already declared in this scope.",
            ));
        }

        trace!("Declared '{}' at scope depth {}", name.lexeme, depth);
        scope.insert(name.lexeme.clone(), false);
        Ok(())
    }

    /// Flip `name` to initialised in the innermost scope.
    pub fn define(&mut self, name: &Token) {
        self.define_name(&name.lexeme);
    }

    /// Define an implicit binding such as `this` or `super`.
    pub fn define_name(&mut self, name: &str) {
        if let Some(scope) = self.scopes.last_mut() {
            scope.insert(name.to_string(), true);
        }
    }

    /// Reject reading a local in its own initializer (`var i = i + 1;`).
    pub fn check_initializer(&self, name: &Token) -> Result<(), ParseError> {
        if self.peek(&name.lexeme) == Some(false) {
            return Err(ParseError::at(
                name,
                "Cannot read local variable in its own initializer.",
            ));
        }
        Ok(())
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Binding‑distance helper
    // ─────────────────────────────────────────────────────────────────────────

    /// Record the distance from the innermost scope to the one declaring
    /// `name`. Returns `None` (and records nothing) for a global.
    pub fn local(&mut self, id: ExprId, name: &Token) -> Option<usize> {
        for (index, scope) in self.scopes.iter().enumerate().rev() {
            if scope.contains_key(&name.lexeme) {
                let distance = self.scopes.len() - 1 - index;
                debug!("Resolved '{}' at distance {}", name.lexeme, distance);
                self.resolutions.record(id, distance);
                return Some(distance);
            }
        }

        trace!("Resolved '{}' as global", name.lexeme);
        None
    }

    pub fn into_resolutions(self) -> Resolutions {
        self.resolutions
    }
}
