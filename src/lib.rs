//! glpc: a tree-walking interpreter for a small C-like scripting language
//! with closures, single-inheritance classes, lists and an int/float
//! numeric tower.
//!
//! Pipeline: [`scanner`] → [`parser`] (driving the [`resolver`]) →
//! [`interpreter`].

pub mod ast;
pub mod ast_printer;
pub mod builtins;
pub mod environment;
pub mod error;
pub mod interpreter;
pub mod modules;
pub mod parser;
pub mod resolver;
pub mod scanner;
pub mod token;
pub mod value;

pub use error::{GlpcError, Result};
pub use interpreter::Interpreter;
