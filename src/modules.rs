//! Import registry: canonical file path to that file's top-level environment.
//!
//! Owned by one [`Interpreter`](crate::interpreter::Interpreter) and empty
//! when it is created. Entries live for as long as the cache does.

use std::cell::RefCell;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use log::debug;

use crate::environment::Environment;

#[derive(Debug, Default)]
pub struct ModuleCache {
    modules: HashMap<PathBuf, Rc<RefCell<Environment>>>,
}

impl ModuleCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, path: &Path) -> Option<Rc<RefCell<Environment>>> {
        self.modules.get(path).cloned()
    }

    pub fn insert(&mut self, path: PathBuf, env: Rc<RefCell<Environment>>) {
        debug!("Registering module {}", path.display());
        self.modules.insert(path, env);
    }

    /// Forget a module whose loading failed.
    pub fn remove(&mut self, path: &Path) -> Option<Rc<RefCell<Environment>>> {
        debug!("Unregistering module {}", path.display());
        self.modules.remove(path)
    }

    pub fn len(&self) -> usize {
        self.modules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }

    pub fn paths(&self) -> impl Iterator<Item = &Path> {
        self.modules.keys().map(PathBuf::as_path)
    }
}
