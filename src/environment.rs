//! Runtime scope frames.
//!
//! Frames are shared as `Rc<RefCell<Environment>>`: the interpreter's current
//! scope, every closure created in it and every bound method may hold the
//! same frame.

use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use log::trace;

use crate::value::Value;

pub struct Environment {
    values: HashMap<String, Value>,
    enclosing: Option<Rc<RefCell<Environment>>>,
}

impl Default for Environment {
    fn default() -> Self {
        Self::new()
    }
}

impl Environment {
    pub fn new() -> Self {
        Environment {
            values: HashMap::new(),
            enclosing: None,
        }
    }

    pub fn with_enclosing(enclosing: Rc<RefCell<Environment>>) -> Self {
        Environment {
            values: HashMap::new(),
            enclosing: Some(enclosing),
        }
    }

    pub fn enclosing(&self) -> Option<Rc<RefCell<Environment>>> {
        self.enclosing.clone()
    }

    /// Declare `name` in this frame. A name may be declared once per frame.
    pub fn define(&mut self, name: &str, value: Value) -> Result<(), String> {
        if self.values.contains_key(name) {
            return Err(format!(
                "Variable '{}' is already declared in this scope.",
                name
            ));
        }

        trace!("define '{}' = {}", name, value);
        self.values.insert(name.to_string(), value);
        Ok(())
    }

    /// Bind `name` unconditionally (built-ins, `this`, `super`, parameters).
    pub fn insert(&mut self, name: &str, value: Value) {
        self.values.insert(name.to_string(), value);
    }

    /// Look `name` up in this frame only.
    pub fn get_local(&self, name: &str) -> Option<Value> {
        self.values.get(name).cloned()
    }

    /// Look `name` up in this frame, then outward.
    pub fn get(&self, name: &str) -> Option<Value> {
        if let Some(value) = self.values.get(name) {
            Some(value.clone())
        } else if let Some(enclosing) = &self.enclosing {
            enclosing.borrow().get(name)
        } else {
            None
        }
    }

    /// Overwrite `name` in this frame only; `false` if it is not declared here.
    pub fn assign_local(&mut self, name: &str, value: Value) -> bool {
        match self.values.get_mut(name) {
            Some(slot) => {
                *slot = value;
                true
            }
            None => false,
        }
    }

    /// Overwrite `name` in the nearest frame declaring it; `false` if none does.
    pub fn assign(&mut self, name: &str, value: Value) -> bool {
        if let Some(slot) = self.values.get_mut(name) {
            *slot = value;
            true
        } else if let Some(enclosing) = &self.enclosing {
            enclosing.borrow_mut().assign(name, value)
        } else {
            false
        }
    }

    /// Copy every binding of `other` whose name this frame lacks. Returns the
    /// number of names added.
    pub fn copy_missing_from(&mut self, other: &Environment) -> usize {
        let mut added = 0;

        for (name, value) in &other.values {
            if !self.values.contains_key(name) {
                self.values.insert(name.clone(), value.clone());
                added += 1;
            }
        }

        added
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// The frame `distance` parent links above `env`.
    pub fn ancestor(
        env: &Rc<RefCell<Environment>>,
        distance: usize,
    ) -> Option<Rc<RefCell<Environment>>> {
        let mut current = Rc::clone(env);

        for _ in 0..distance {
            let parent = current.borrow().enclosing()?;
            current = parent;
        }

        Some(current)
    }

    /// The top-level scope of `env`'s module: the frame directly below the
    /// outermost one, which holds the built-ins. A lone frame is its own root.
    pub fn root(env: &Rc<RefCell<Environment>>) -> Rc<RefCell<Environment>> {
        let mut current = Rc::clone(env);

        loop {
            let parent = current.borrow().enclosing();
            match parent {
                Some(parent) if parent.borrow().enclosing.is_some() => current = parent,
                _ => return current,
            }
        }
    }
}

impl fmt::Debug for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<&String> = self.values.keys().collect();
        names.sort();

        f.debug_struct("Environment")
            .field("names", &names)
            .field("has_enclosing", &self.enclosing.is_some())
            .finish()
    }
}
