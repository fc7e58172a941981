//! Runtime values of the glpc language.
//!
//! [`Value`] is a closed sum type; every consumer matches on it exhaustively.
//! Heap-backed variants are reference counted: lists, instances and
//! closures are shared, never uniquely owned.

use std::cell::RefCell;
use std::cmp::Ordering;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use thiserror::Error;

use crate::ast::FunctionDecl;
use crate::environment::Environment;
use crate::interpreter::Interpreter;

// ─────────────────────────────────────────────────────────────────────────────
// Numbers
// ─────────────────────────────────────────────────────────────────────────────

/// Failure of an arithmetic operator on two numbers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ArithmeticError {
    #[error("Division by zero.")]
    DivisionByZero,

    #[error("Operands must both be integer values.")]
    NonInteger,
}

/// A number carrying both representations plus the tag saying which one is
/// authoritative.
#[derive(Debug, Clone, Copy)]
pub struct Number {
    is_int: bool,
    int: i64,
    float: f64,
}

impl Number {
    pub fn int(n: i64) -> Self {
        Self {
            is_int: true,
            int: n,
            float: n as f64,
        }
    }

    pub fn float(f: f64) -> Self {
        Self {
            is_int: false,
            int: f as i64,
            float: f,
        }
    }

    pub fn is_int(&self) -> bool {
        self.is_int
    }

    /// Integer view; floats truncate toward zero.
    pub fn as_i64(&self) -> i64 {
        self.int
    }

    pub fn as_f64(&self) -> f64 {
        self.float
    }

    fn both_int(self, other: Number) -> bool {
        self.is_int && other.is_int
    }

    pub fn add(self, other: Number) -> Number {
        if self.both_int(other) {
            Number::int(self.int.wrapping_add(other.int))
        } else {
            Number::float(self.float + other.float)
        }
    }

    pub fn sub(self, other: Number) -> Number {
        if self.both_int(other) {
            Number::int(self.int.wrapping_sub(other.int))
        } else {
            Number::float(self.float - other.float)
        }
    }

    pub fn mul(self, other: Number) -> Number {
        if self.both_int(other) {
            Number::int(self.int.wrapping_mul(other.int))
        } else {
            Number::float(self.float * other.float)
        }
    }

    /// `/`: stays an integer only when the division is exact.
    pub fn div(self, other: Number) -> Result<Number, ArithmeticError> {
        if !self.both_int(other) {
            return Ok(Number::float(self.float / other.float));
        }

        if other.int == 0 {
            return Err(ArithmeticError::DivisionByZero);
        }

        if self.int.wrapping_rem(other.int) == 0 {
            Ok(Number::int(self.int.wrapping_div(other.int)))
        } else {
            Ok(Number::float(self.float / other.float))
        }
    }

    /// `~/`: always an integer, truncated toward zero.
    pub fn int_div(self, other: Number) -> Result<Number, ArithmeticError> {
        if !self.both_int(other) {
            return Ok(Number::int((self.float / other.float) as i64));
        }

        if other.int == 0 {
            return Err(ArithmeticError::DivisionByZero);
        }

        Ok(Number::int(self.int.wrapping_div(other.int)))
    }

    /// `%`: integers only.
    pub fn rem(self, other: Number) -> Result<Number, ArithmeticError> {
        if !self.both_int(other) {
            return Err(ArithmeticError::NonInteger);
        }

        if other.int == 0 {
            return Err(ArithmeticError::DivisionByZero);
        }

        Ok(Number::int(self.int.wrapping_rem(other.int)))
    }

    pub fn neg(self) -> Number {
        if self.is_int {
            Number::int(self.int.wrapping_neg())
        } else {
            Number::float(-self.float)
        }
    }
}

impl PartialEq for Number {
    fn eq(&self, other: &Self) -> bool {
        if self.both_int(*other) {
            self.int == other.int
        } else {
            self.float == other.float
        }
    }
}

impl PartialOrd for Number {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        if self.both_int(*other) {
            Some(self.int.cmp(&other.int))
        } else {
            self.float.partial_cmp(&other.float)
        }
    }
}

impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_int {
            let mut buffer = itoa::Buffer::new();
            f.write_str(buffer.format(self.int))
        } else {
            write!(f, "{:.2}", self.float)
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Callables
// ─────────────────────────────────────────────────────────────────────────────

/// Number of arguments a callable accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arity {
    Fixed(usize),
    Variadic,
}

impl Arity {
    pub fn accepts(&self, count: usize) -> bool {
        match self {
            Arity::Fixed(n) => *n == count,
            Arity::Variadic => true,
        }
    }
}

/// A user-defined function or method closed over its defining environment.
pub struct Function {
    pub declaration: Rc<FunctionDecl>,
    pub closure: Rc<RefCell<Environment>>,
    pub is_initializer: bool,
}

impl Function {
    pub fn new(
        declaration: Rc<FunctionDecl>,
        closure: Rc<RefCell<Environment>>,
        is_initializer: bool,
    ) -> Self {
        Self {
            declaration,
            closure,
            is_initializer,
        }
    }

    pub fn name(&self) -> &str {
        &self.declaration.name.lexeme
    }

    pub fn arity(&self) -> usize {
        self.declaration.params.len()
    }

    /// Same body and closure, with one extra layer binding `this`.
    pub fn bind(&self, instance: Rc<Instance>) -> Function {
        let mut environment = Environment::with_enclosing(Rc::clone(&self.closure));
        environment.insert("this", Value::Instance(instance));

        Function {
            declaration: Rc::clone(&self.declaration),
            closure: Rc::new(RefCell::new(environment)),
            is_initializer: self.is_initializer,
        }
    }
}

impl fmt::Debug for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Function")
            .field("name", &self.name())
            .field("arity", &self.arity())
            .field("is_initializer", &self.is_initializer)
            .finish()
    }
}

/// Native callable signature. The error string becomes a `BuiltIn` runtime
/// error at the call site.
pub type NativeFn = fn(&mut Interpreter, &[Value]) -> Result<Value, String>;

/// A function implemented in Rust.
pub struct BuiltIn {
    pub name: &'static str,
    pub arity: Arity,
    pub func: NativeFn,
}

impl fmt::Debug for BuiltIn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BuiltIn")
            .field("name", &self.name)
            .field("arity", &self.arity)
            .finish()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Classes and instances
// ─────────────────────────────────────────────────────────────────────────────

pub struct Class {
    pub name: String,
    pub superclass: Option<Rc<Class>>,
    pub methods: HashMap<String, Rc<Function>>,
}

impl Class {
    /// Look `name` up in this class, then up the superclass chain.
    pub fn find_method(&self, name: &str) -> Option<Rc<Function>> {
        self.methods.get(name).cloned().or_else(|| {
            self.superclass
                .as_ref()
                .and_then(|superclass| superclass.find_method(name))
        })
    }

    /// Construction arity: that of `init`, or zero.
    pub fn arity(&self) -> usize {
        self.find_method("init").map_or(0, |init| init.arity())
    }
}

impl fmt::Debug for Class {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut methods: Vec<&String> = self.methods.keys().collect();
        methods.sort();

        f.debug_struct("Class")
            .field("name", &self.name)
            .field("superclass", &self.superclass.as_ref().map(|s| &s.name))
            .field("methods", &methods)
            .finish()
    }
}

pub struct Instance {
    pub class: Rc<Class>,
    fields: RefCell<HashMap<String, Value>>,
}

impl Instance {
    pub fn new(class: Rc<Class>) -> Rc<Self> {
        Rc::new(Self {
            class,
            fields: RefCell::new(HashMap::new()),
        })
    }

    /// Field first, then a method bound to this instance.
    pub fn get(self: &Rc<Self>, name: &str) -> Option<Value> {
        if let Some(value) = self.fields.borrow().get(name) {
            return Some(value.clone());
        }

        self.class
            .find_method(name)
            .map(|method| Value::Function(Rc::new(method.bind(Rc::clone(self)))))
    }

    pub fn set(&self, name: &str, value: Value) {
        self.fields.borrow_mut().insert(name.to_string(), value);
    }
}

impl fmt::Debug for Instance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut fields: Vec<String> = self.fields.borrow().keys().cloned().collect();
        fields.sort();

        f.debug_struct("Instance")
            .field("class", &self.class.name)
            .field("fields", &fields)
            .finish()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Value
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Clone)]
pub enum Value {
    Null,
    Boolean(bool),
    Number(Number),
    String(Rc<str>),
    List(Rc<RefCell<Vec<Value>>>),
    Function(Rc<Function>),
    BuiltIn(Rc<BuiltIn>),
    Class(Rc<Class>),
    Instance(Rc<Instance>),
}

impl Value {
    pub fn int(n: i64) -> Self {
        Value::Number(Number::int(n))
    }

    pub fn float(f: f64) -> Self {
        Value::Number(Number::float(f))
    }

    pub fn string(s: &str) -> Self {
        Value::String(Rc::from(s))
    }

    pub fn list(elements: Vec<Value>) -> Self {
        Value::List(Rc::new(RefCell::new(elements)))
    }

    /// Upper-case type name used in error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "NULL",
            Value::Boolean(_) => "BOOLEAN",
            Value::Number(_) => "NUMBER",
            Value::String(_) => "STRING",
            Value::List(_) => "LIST",
            Value::Function(_) => "FUNCTION",
            Value::BuiltIn(_) => "BUILTIN",
            Value::Class(_) => "CLASS",
            Value::Instance(_) => "INSTANCE",
        }
    }

    /// `null` and `false` are falsy; everything else is truthy.
    pub fn is_truthy(&self) -> bool {
        !matches!(self, Value::Null | Value::Boolean(false))
    }

    pub fn as_number(&self) -> Option<Number> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Boolean(a), Value::Boolean(b)) => a == b,
            (Value::Number(a), Value::Number(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::List(a), Value::List(b)) => Rc::ptr_eq(a, b),
            (Value::Function(a), Value::Function(b)) => Rc::ptr_eq(a, b),
            (Value::BuiltIn(a), Value::BuiltIn(b)) => Rc::ptr_eq(a, b),
            (Value::Class(a), Value::Class(b)) => Rc::ptr_eq(a, b),
            (Value::Instance(a), Value::Instance(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_value(self, f, &mut Vec::new())
    }
}

/// `open` holds the lists currently being written; meeting one of them again
/// prints `[...]` instead of recursing into the cycle.
fn write_value(
    value: &Value,
    f: &mut fmt::Formatter<'_>,
    open: &mut Vec<*const RefCell<Vec<Value>>>,
) -> fmt::Result {
    match value {
        Value::Null => f.write_str("null"),
        Value::Boolean(b) => write!(f, "{}", b),
        Value::Number(n) => write!(f, "{}", n),
        Value::String(s) => f.write_str(s),
        Value::List(elements) => {
            let ptr = Rc::as_ptr(elements);
            if open.contains(&ptr) {
                return f.write_str("[...]");
            }

            open.push(ptr);
            f.write_str("[")?;
            for (i, element) in elements.borrow().iter().enumerate() {
                if i > 0 {
                    f.write_str(", ")?;
                }
                write_value(element, f, open)?;
            }
            open.pop();
            f.write_str("]")
        }
        Value::Function(function) => write!(f, "<fn {}>", function.name()),
        Value::BuiltIn(builtin) => write!(f, "<builtin {}>", builtin.name),
        Value::Class(class) => f.write_str(&class.name),
        Value::Instance(instance) => write!(f, "{} instance", instance.class.name),
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::String(s) => write!(f, "String({:?})", s),
            Value::Function(function) => write!(f, "{:?}", function),
            Value::BuiltIn(builtin) => write!(f, "{:?}", builtin),
            Value::Class(class) => write!(f, "{:?}", class),
            Value::Instance(instance) => write!(f, "{:?}", instance),
            other => write!(f, "{}({})", other.type_name(), other),
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Boolean(b)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::int(n)
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::float(f)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::string(s)
    }
}
