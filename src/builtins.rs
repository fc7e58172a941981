//! Native functions defined into every top-level environment.

use std::rc::Rc;

use log::debug;

use crate::environment::Environment;
use crate::interpreter::Interpreter;
use crate::value::{Arity, BuiltIn, Value};

/// Install the built-ins into `env`.
pub fn define_globals(env: &mut Environment) {
    debug!("Defining built-in functions");

    env.insert(
        "len",
        Value::BuiltIn(Rc::new(BuiltIn {
            name: "len",
            arity: Arity::Fixed(1),
            func: len,
        })),
    );

    env.insert(
        "print",
        Value::BuiltIn(Rc::new(BuiltIn {
            name: "print",
            arity: Arity::Variadic,
            func: print,
        })),
    );
}

/// `len(x)`: characters in a string, elements in a list.
fn len(_interpreter: &mut Interpreter, args: &[Value]) -> Result<Value, String> {
    let count = match args.first() {
        Some(Value::String(s)) => s.chars().count(),
        Some(Value::List(elements)) => elements.borrow().len(),
        _ => return Err("'len' argument must be of a type STRING or LIST.".to_string()),
    };

    Ok(Value::int(count as i64))
}

/// `print(a, b, ...)`: space-joined arguments and a newline.
fn print(interpreter: &mut Interpreter, args: &[Value]) -> Result<Value, String> {
    let line = args
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<String>>()
        .join(" ");

    interpreter
        .write_line(&line)
        .map_err(|e| format!("'print' failed to write output: {}", e))?;

    Ok(Value::Null)
}
