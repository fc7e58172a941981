#![allow(dead_code)]

use std::cell::RefCell;
use std::io::{self, Write};
use std::rc::Rc;

use glpc::environment::Environment;
use glpc::error::{GlpcError, SyntaxErrors};
use glpc::parser::{parse_source, Program};
use glpc::value::Value;
use glpc::Interpreter;

pub const FILE: &str = "testfile.gpc";

/// A `Write` sink whose contents stay readable after the interpreter that
/// owns a clone of it is gone.
#[derive(Clone, Default)]
pub struct SharedBuffer(Rc<RefCell<Vec<u8>>>);

impl SharedBuffer {
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.borrow()).into_owned()
    }
}

impl Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.borrow_mut().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

pub fn interpreter() -> (Interpreter, SharedBuffer) {
    let buffer = SharedBuffer::default();
    (Interpreter::with_output(buffer.clone()), buffer)
}

pub fn parse(source: &str) -> Result<Program, SyntaxErrors> {
    parse_source(source.as_bytes(), FILE)
}

/// Run `source`, returning the result and everything printed.
pub fn run(source: &str) -> (Result<Rc<RefCell<Environment>>, GlpcError>, String) {
    let (mut interpreter, buffer) = interpreter();
    let result = interpreter.run_source(source.as_bytes(), FILE);
    (result, buffer.contents())
}

/// Run `source` that must succeed; returns its top-level environment and
/// printed output.
pub fn run_ok(source: &str) -> (Rc<RefCell<Environment>>, String) {
    let (result, output) = run(source);
    match result {
        Ok(env) => (env, output),
        Err(e) => panic!("program failed: {}\nsource:\n{}", e, source),
    }
}

pub fn run_err(source: &str) -> GlpcError {
    match run(source).0 {
        Ok(_) => panic!("program unexpectedly succeeded:\n{}", source),
        Err(e) => e,
    }
}

/// Top-level binding `name` of a finished program.
pub fn global(env: &Rc<RefCell<Environment>>, name: &str) -> Value {
    env.borrow()
        .get_local(name)
        .unwrap_or_else(|| panic!("no global named '{}'", name))
}

/// Evaluate `expr` as the initializer of a top-level variable.
pub fn eval(expr: &str) -> Value {
    let (env, _) = run_ok(&format!("var result = {};", expr));
    global(&env, "result")
}
