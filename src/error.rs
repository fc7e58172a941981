//! Centralised error hierarchy for the **glpc interpreter**.
//!
//! Three tiers are kept apart:
//!
//! 1. [`ParseError`] – syntax, resolver and contextual errors. The parser
//!    collects them and hands back a [`SyntaxErrors`] list instead of failing
//!    on the first one.
//! 2. [`RuntimeError`] – fatal to the running program; carries the offending
//!    token and a [`RuntimeErrorKind`].
//! 3. [`GlpcError`] – what the library's entry points return; wraps the two
//!    above plus I/O and `main` lookup failures.
//!
//! The module **does not** print diagnostics itself.

use std::fmt;
use std::io;

use log::info;
use thiserror::Error;

use crate::token::Token;

/// A compile-time problem found while parsing or resolving.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("[line {line}] Error {location}: {message}")]
pub struct ParseError {
    /// 1‑based line of the offending token.
    pub line: usize,

    /// Hint at the offending token: `at 'lexeme'` or `at end`.
    pub location: String,

    /// Human‑readable description.
    pub message: String,
}

impl ParseError {
    /// Helper constructor anchoring the error at `token`.
    pub fn at<S: Into<String>>(token: &Token, msg: S) -> Self {
        let message: String = msg.into();

        let location = if token.is_eof() {
            "at end".to_string()
        } else {
            format!("at '{}'", token.lexeme)
        };

        info!(
            "Creating Parse error: line={}, {}, msg={}",
            token.line, location, message
        );

        ParseError {
            line: token.line,
            location,
            message,
        }
    }
}

/// Every syntax error found in one source file, in source order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyntaxErrors(pub Vec<ParseError>);

impl SyntaxErrors {
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ParseError> {
        self.0.iter()
    }
}

impl fmt::Display for SyntaxErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, error) in self.0.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{}", error)?;
        }
        Ok(())
    }
}

impl std::error::Error for SyntaxErrors {}

/// Category of a [`RuntimeError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuntimeErrorKind {
    UndefinedVariable,
    UndefinedProperty,
    Redeclaration,
    TypeError,
    Arity,
    NotCallable,
    NotAList,
    IndexOutOfRange,
    SuperclassNotClass,
    DivisionByZero,
    BuiltIn,
    Import,
    /// `break`/`continue`/`return` escaped the construct that should have
    /// consumed it.
    ControlFlow,
}

/// Runtime evaluation error. Fatal to the current top-level execution.
#[derive(Debug, Clone, Error)]
#[error("[line {}] Runtime error at '{}': {}", .token.line, .token.lexeme, .message)]
pub struct RuntimeError {
    pub kind: RuntimeErrorKind,

    /// Token whose evaluation failed; gives file, line and lexeme context.
    pub token: Token,

    pub message: String,
}

impl RuntimeError {
    pub fn new<S: Into<String>>(kind: RuntimeErrorKind, token: &Token, msg: S) -> Self {
        let message: String = msg.into();

        info!(
            "Creating Runtime error: kind={:?}, {}:{}, msg={}",
            kind, token.file, token.line, message
        );

        RuntimeError {
            kind,
            token: token.clone(),
            message,
        }
    }
}

/// Canonical error type returned by the library entry points.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum GlpcError {
    /// The program did not parse; evaluation never started.
    #[error(transparent)]
    Syntax(#[from] SyntaxErrors),

    #[error(transparent)]
    Runtime(#[from] RuntimeError),

    /// Wrapper around `std::io::Error` (transparent).  Enables `?` on I/O ops.
    #[error(transparent)]
    Io(#[from] io::Error),

    #[error("Unable to locate main function.")]
    MissingMain,

    #[error("Found main, but it was not a function.")]
    MainNotFunction,
}

/// Crate‑wide `Result` alias.
pub type Result<T> = std::result::Result<T, GlpcError>;
