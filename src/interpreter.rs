//! Tree-walking evaluator.
//!
//! Statements return an [`Outcome`] so that `break`, `continue` and `return`
//! travel up the call stack as ordinary values; only genuine failures use the
//! error channel. The current environment is swapped on block, loop and call
//! entry and always restored on exit, whether the body succeeded or not.

use std::cell::RefCell;
use std::fs;
use std::io::{self, Write};
use std::mem;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use log::{debug, info};

use crate::ast::{Expr, ExprId, FunctionDecl, LiteralValue, SetTarget, Stmt};
use crate::builtins;
use crate::environment::Environment;
use crate::error::{GlpcError, Result, RuntimeError, RuntimeErrorKind, SyntaxErrors};
use crate::modules::ModuleCache;
use crate::parser::Parser;
use crate::resolver::Resolutions;
use crate::scanner::Scanner;
use crate::token::{Token, TokenType};
use crate::value::{ArithmeticError, Arity, Class, Function, Instance, Number, Value};

/// How a statement finished.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Normal,
    /// Carries the `break` keyword for error context.
    Break(Token),
    /// Carries the `continue` keyword for error context.
    Continue(Token),
    Return(Value),
}

/// Convenient alias for statement results.
pub type ExecResult = std::result::Result<Outcome, RuntimeError>;

type EvalResult = std::result::Result<Value, RuntimeError>;

pub struct Interpreter {
    environment: Rc<RefCell<Environment>>,
    resolutions: Resolutions,
    next_id: usize,
    modules: ModuleCache,
    output: Box<dyn Write>,
}

impl Default for Interpreter {
    fn default() -> Self {
        Self::new()
    }
}

impl Interpreter {
    /// Interpreter printing to standard output.
    pub fn new() -> Self {
        Self::with_output(io::stdout())
    }

    /// Interpreter printing to `output`.
    pub fn with_output(output: impl Write + 'static) -> Self {
        info!("Initializing Interpreter");

        Self {
            environment: Self::module_environment(),
            resolutions: Resolutions::new(),
            next_id: 0,
            modules: ModuleCache::new(),
            output: Box::new(output),
        }
    }

    /// Replace the (empty) import registry with `modules`.
    pub fn with_module_cache(mut self, modules: ModuleCache) -> Self {
        self.modules = modules;
        self
    }

    pub fn modules(&self) -> &ModuleCache {
        &self.modules
    }

    pub fn into_modules(self) -> ModuleCache {
        self.modules
    }

    /// Write one line to the output sink. Used by the `print` built-in.
    pub fn write_line(&mut self, line: &str) -> io::Result<()> {
        writeln!(self.output, "{}", line)?;
        self.output.flush()
    }

    /// A fresh top-level scope whose parent frame holds the built-ins, so
    /// top-level declarations may shadow them.
    fn module_environment() -> Rc<RefCell<Environment>> {
        let mut natives = Environment::new();
        builtins::define_globals(&mut natives);
        let natives = Rc::new(RefCell::new(natives));
        Rc::new(RefCell::new(Environment::with_enclosing(natives)))
    }

    // ───────────────────────── public API ─────────────────────────

    /// Parse and run `source` as a top-level program in its own environment,
    /// which is returned so callers can look up its bindings.
    pub fn run_source(&mut self, source: &[u8], file: &str) -> Result<Rc<RefCell<Environment>>> {
        info!("Running {}", file);

        let statements = self.parse_program(source, file)?;
        let env = Self::module_environment();
        self.execute_program(&statements, Rc::clone(&env))?;

        info!("Finished running {}", file);
        Ok(env)
    }

    /// Read, parse and run the script at `path`. The script is registered as
    /// a module, so importing it again from itself reuses this run.
    pub fn run_file(&mut self, path: &Path) -> Result<Rc<RefCell<Environment>>> {
        info!("Loading script {}", path.display());

        let source = fs::read(path)?;
        let canonical = fs::canonicalize(path)?;
        let file = path.display().to_string();

        let statements = self.parse_program(&source, &file)?;
        let env = Self::module_environment();
        self.modules.insert(canonical.clone(), Rc::clone(&env));

        if let Err(error) = self.execute_program(&statements, Rc::clone(&env)) {
            self.modules.remove(&canonical);
            return Err(error.into());
        }

        Ok(env)
    }

    /// Call the zero-argument `main` function defined in `env`.
    pub fn run_main(&mut self, env: &Rc<RefCell<Environment>>) -> Result<Value> {
        let main = env.borrow().get_local("main");

        let function = match main {
            Some(Value::Function(function)) => function,
            Some(_) => return Err(GlpcError::MainNotFunction),
            None => return Err(GlpcError::MissingMain),
        };

        info!("Invoking main");

        let paren = Token::synthetic(TokenType::RIGHT_PAREN, ")", &function.declaration.name);
        let value = self.call_value(Value::Function(function), Vec::new(), &paren)?;

        info!("main returned {}", value);
        Ok(value)
    }

    // ───────────────────────── program plumbing ───────────────────

    /// Parse with expression ids continuing from earlier programs and merge
    /// the resulting side table.
    fn parse_program(
        &mut self,
        source: &[u8],
        file: &str,
    ) -> std::result::Result<Vec<Stmt>, SyntaxErrors> {
        let tokens: Vec<Token> = Scanner::new(source, file).collect();
        let program = Parser::with_first_id(tokens, self.next_id).parse()?;

        debug!(
            "Parsed {} with {} resolved reference(s)",
            file,
            program.resolutions.len()
        );

        self.next_id = program.next_id;
        self.resolutions.extend(program.resolutions);
        Ok(program.statements)
    }

    fn execute_program(
        &mut self,
        statements: &[Stmt],
        env: Rc<RefCell<Environment>>,
    ) -> std::result::Result<(), RuntimeError> {
        match self.execute_block(statements, env)? {
            Outcome::Break(keyword) | Outcome::Continue(keyword) => {
                Err(escaped_loop_control(&keyword))
            }
            Outcome::Normal | Outcome::Return(_) => Ok(()),
        }
    }

    /// Run `statements` with `env` as the current environment, restoring the
    /// previous one afterwards on every path.
    pub fn execute_block(&mut self, statements: &[Stmt], env: Rc<RefCell<Environment>>) -> ExecResult {
        self.in_environment(env, |interpreter| {
            for stmt in statements {
                match interpreter.execute(stmt)? {
                    Outcome::Normal => {}
                    other => return Ok(other),
                }
            }
            Ok(Outcome::Normal)
        })
    }

    fn in_environment<T>(
        &mut self,
        env: Rc<RefCell<Environment>>,
        f: impl FnOnce(&mut Self) -> std::result::Result<T, RuntimeError>,
    ) -> std::result::Result<T, RuntimeError> {
        let previous = mem::replace(&mut self.environment, env);
        let result = f(self);
        self.environment = previous;
        result
    }

    fn nested_environment(&self) -> Rc<RefCell<Environment>> {
        Rc::new(RefCell::new(Environment::with_enclosing(Rc::clone(
            &self.environment,
        ))))
    }

    fn define(&mut self, name: &Token, value: Value) -> std::result::Result<(), RuntimeError> {
        self.environment
            .borrow_mut()
            .define(&name.lexeme, value)
            .map_err(|message| RuntimeError::new(RuntimeErrorKind::Redeclaration, name, message))
    }

    // ───────────────────────── statements ─────────────────────────

    /// Executes a single statement.
    pub fn execute(&mut self, stmt: &Stmt) -> ExecResult {
        match stmt {
            Stmt::Block(statements) => {
                debug!("Entering block with {} statements", statements.len());
                let env = self.nested_environment();
                self.execute_block(statements, env)
            }

            Stmt::Break(keyword) => Ok(Outcome::Break(keyword.clone())),

            Stmt::Continue(keyword) => Ok(Outcome::Continue(keyword.clone())),

            Stmt::Class {
                name,
                superclass,
                methods,
            } => self.execute_class(name, superclass.as_ref(), methods),

            Stmt::Expression(expr) => {
                self.evaluate(expr)?;
                Ok(Outcome::Normal)
            }

            Stmt::Function(declaration) => {
                debug!("Defining function '{}'", declaration.name.lexeme);
                let function = Function::new(
                    Rc::clone(declaration),
                    Rc::clone(&self.environment),
                    false,
                );
                self.define(&declaration.name, Value::Function(Rc::new(function)))?;
                Ok(Outcome::Normal)
            }

            Stmt::If {
                condition,
                then_branch,
                else_branch,
            } => {
                if self.evaluate(condition)?.is_truthy() {
                    self.execute(then_branch)
                } else if let Some(else_branch) = else_branch {
                    self.execute(else_branch)
                } else {
                    Ok(Outcome::Normal)
                }
            }

            Stmt::Import { keyword, path } => self.execute_import(keyword, path),

            Stmt::For {
                keyword,
                initializer,
                condition,
                body,
                increment,
            } => {
                debug!("Entering {} loop", keyword.lexeme);
                let env = self.nested_environment();
                self.in_environment(env, |interpreter| {
                    interpreter.run_loop(
                        keyword,
                        initializer.as_deref(),
                        condition.as_ref(),
                        body,
                        increment.as_ref(),
                    )
                })
            }

            Stmt::Return { value, .. } => {
                let value = match value {
                    Some(expr) => self.evaluate(expr)?,
                    None => Value::Null,
                };
                Ok(Outcome::Return(value))
            }

            Stmt::Var { name, initializer } => {
                let value = match initializer {
                    Some(expr) => self.evaluate(expr)?,
                    None => Value::Null,
                };
                debug!("Defining variable '{}'", name.lexeme);
                self.define(name, value)?;
                Ok(Outcome::Normal)
            }
        }
    }

    /// Body of every loop form, run inside the loop's own environment.
    fn run_loop(
        &mut self,
        keyword: &Token,
        initializer: Option<&Stmt>,
        condition: Option<&Expr>,
        body: &Stmt,
        increment: Option<&Expr>,
    ) -> ExecResult {
        if let Some(initializer) = initializer {
            self.execute(initializer)?;
        }

        // `do` runs its body once before the first condition check.
        if keyword.token_type == TokenType::DO {
            match self.execute(body)? {
                Outcome::Break(_) => return Ok(Outcome::Normal),
                Outcome::Return(value) => return Ok(Outcome::Return(value)),
                Outcome::Normal | Outcome::Continue(_) => {}
            }
        }

        loop {
            if let Some(condition) = condition {
                if !self.evaluate(condition)?.is_truthy() {
                    break;
                }
            }

            match self.execute(body)? {
                Outcome::Break(_) => break,
                Outcome::Return(value) => return Ok(Outcome::Return(value)),
                Outcome::Normal | Outcome::Continue(_) => {}
            }

            if let Some(increment) = increment {
                self.evaluate(increment)?;
            }
        }

        Ok(Outcome::Normal)
    }

    fn execute_class(
        &mut self,
        name: &Token,
        superclass: Option<&Expr>,
        methods: &[Rc<FunctionDecl>],
    ) -> ExecResult {
        debug!("Defining class '{}'", name.lexeme);

        let superclass = match superclass {
            Some(expr) => match self.evaluate(expr)? {
                Value::Class(class) => Some(class),
                _ => {
                    let at = match expr {
                        Expr::Variable { name: super_name, .. } => super_name,
                        _ => name,
                    };
                    return Err(RuntimeError::new(
                        RuntimeErrorKind::SuperclassNotClass,
                        at,
                        "Superclass must be a class.",
                    ));
                }
            },
            None => None,
        };

        self.define(name, Value::Null)?;

        // Methods close over a `super` layer when there is a superclass; the
        // `this` layer is added per instance by `Function::bind`.
        let closure = match &superclass {
            Some(superclass) => {
                let mut env = Environment::with_enclosing(Rc::clone(&self.environment));
                env.insert("super", Value::Class(Rc::clone(superclass)));
                Rc::new(RefCell::new(env))
            }
            None => Rc::clone(&self.environment),
        };

        let methods = methods
            .iter()
            .map(|declaration| {
                let is_initializer = declaration.name.lexeme == "init";
                let function = Function::new(Rc::clone(declaration), Rc::clone(&closure), is_initializer);
                (declaration.name.lexeme.clone(), Rc::new(function))
            })
            .collect();

        let class = Class {
            name: name.lexeme.clone(),
            superclass,
            methods,
        };

        self.environment
            .borrow_mut()
            .assign_local(&name.lexeme, Value::Class(Rc::new(class)));

        Ok(Outcome::Normal)
    }

    // ───────────────────────── imports ────────────────────────────

    fn execute_import(&mut self, keyword: &Token, path: &str) -> ExecResult {
        let target = import_target(keyword, path);

        let canonical = fs::canonicalize(&target).map_err(|e| {
            RuntimeError::new(
                RuntimeErrorKind::Import,
                keyword,
                format!("Unable to import '{}': {}.", path, e),
            )
        })?;

        let module = match self.modules.get(&canonical) {
            Some(module) => {
                debug!("Reusing module {}", canonical.display());
                module
            }
            None => self.load_module(keyword, &canonical)?,
        };

        if Rc::ptr_eq(&module, &self.environment) {
            debug!("Ignoring self-import of {}", canonical.display());
            return Ok(Outcome::Normal);
        }

        let added = self
            .environment
            .borrow_mut()
            .copy_missing_from(&module.borrow());

        info!("Imported {} binding(s) from {}", added, canonical.display());
        Ok(Outcome::Normal)
    }

    /// Run a module for the first time. Its environment is registered before
    /// it executes and dropped again if loading fails.
    fn load_module(
        &mut self,
        keyword: &Token,
        canonical: &Path,
    ) -> std::result::Result<Rc<RefCell<Environment>>, RuntimeError> {
        info!("Importing module {}", canonical.display());

        let source = fs::read(canonical).map_err(|e| {
            RuntimeError::new(
                RuntimeErrorKind::Import,
                keyword,
                format!("Unable to import '{}': {}.", canonical.display(), e),
            )
        })?;

        let env = Self::module_environment();
        self.modules.insert(canonical.to_path_buf(), Rc::clone(&env));

        let file = canonical.display().to_string();
        let result = match self.parse_program(&source, &file) {
            Ok(statements) => self.execute_program(&statements, Rc::clone(&env)),
            Err(errors) => Err(RuntimeError::new(
                RuntimeErrorKind::Import,
                keyword,
                format!("Syntax errors in imported module '{}':\n{}", file, errors),
            )),
        };

        match result {
            Ok(()) => Ok(env),
            Err(error) => {
                self.modules.remove(canonical);
                Err(error)
            }
        }
    }

    // ───────────────────────── expressions ────────────────────────

    /// Evaluates an expression and returns a Value.
    pub fn evaluate(&mut self, expr: &Expr) -> EvalResult {
        match expr {
            Expr::Literal(literal) => Ok(literal_value(literal)),

            Expr::Grouping(inner) => self.evaluate(inner),

            Expr::List { elements, .. } => {
                let mut values = Vec::with_capacity(elements.len());
                for element in elements {
                    values.push(self.evaluate(element)?);
                }
                Ok(Value::list(values))
            }

            Expr::Unary { operator, right } => {
                let right = self.evaluate(right)?;
                match operator.token_type {
                    TokenType::BANG => Ok(Value::Boolean(!right.is_truthy())),
                    _ => match right {
                        Value::Number(n) => Ok(Value::Number(n.neg())),
                        _ => Err(RuntimeError::new(
                            RuntimeErrorKind::TypeError,
                            operator,
                            "Operand must be a number.",
                        )),
                    },
                }
            }

            Expr::Binary {
                left,
                operator,
                right,
            } => {
                let left = self.evaluate(left)?;
                let right = self.evaluate(right)?;
                binary(operator, left, right)
            }

            Expr::Logical {
                left,
                operator,
                right,
            } => {
                let left = self.evaluate(left)?;
                let short_circuit = match operator.token_type {
                    TokenType::OR => left.is_truthy(),
                    _ => !left.is_truthy(),
                };

                if short_circuit {
                    Ok(left)
                } else {
                    self.evaluate(right)
                }
            }

            Expr::Variable { id, name } => self.look_up(*id, name),

            Expr::This { id, keyword } => self.look_up(*id, keyword),

            Expr::Assign { id, name, value } => {
                let value = self.evaluate(value)?;
                self.assign(*id, name, value.clone())?;
                Ok(value)
            }

            Expr::Call {
                callee,
                paren,
                arguments,
            } => {
                let callee = self.evaluate(callee)?;

                let mut args = Vec::with_capacity(arguments.len());
                for argument in arguments {
                    args.push(self.evaluate(argument)?);
                }

                self.call_value(callee, args, paren)
            }

            Expr::Get { object, name } => match self.evaluate(object)? {
                Value::Instance(instance) => instance.get(&name.lexeme).ok_or_else(|| {
                    RuntimeError::new(
                        RuntimeErrorKind::UndefinedProperty,
                        name,
                        format!("Undefined property '{}'.", name.lexeme),
                    )
                }),
                _ => Err(RuntimeError::new(
                    RuntimeErrorKind::TypeError,
                    name,
                    "Only instances have properties.",
                )),
            },

            Expr::Set {
                object,
                target,
                value,
            } => self.evaluate_set(object, target, value),

            Expr::Index {
                object,
                bracket,
                index,
            } => {
                let object = self.evaluate(object)?;
                let index = self.evaluate(index)?;

                let Value::List(list) = object else {
                    return Err(not_a_list(bracket));
                };

                let position = list_position(list.borrow().len(), &index, bracket)?;
                let element = list.borrow()[position].clone();
                Ok(element)
            }

            Expr::Super {
                id,
                keyword,
                method,
            } => self.evaluate_super(*id, keyword, method),
        }
    }

    fn evaluate_set(&mut self, object: &Expr, target: &SetTarget, value: &Expr) -> EvalResult {
        let object = self.evaluate(object)?;

        match target {
            SetTarget::Property(name) => {
                let Value::Instance(instance) = object else {
                    return Err(RuntimeError::new(
                        RuntimeErrorKind::TypeError,
                        name,
                        "Only instances have fields.",
                    ));
                };

                let value = self.evaluate(value)?;
                instance.set(&name.lexeme, value.clone());
                Ok(value)
            }

            SetTarget::Index { bracket, index } => {
                let index = self.evaluate(index)?;
                let value = self.evaluate(value)?;

                let Value::List(list) = object else {
                    return Err(not_a_list(bracket));
                };

                let position = list_position(list.borrow().len(), &index, bracket)?;
                list.borrow_mut()[position] = value.clone();
                Ok(value)
            }
        }
    }

    fn evaluate_super(&mut self, id: ExprId, keyword: &Token, method: &Token) -> EvalResult {
        let unbound = || {
            RuntimeError::new(
                RuntimeErrorKind::UndefinedVariable,
                keyword,
                "Can't use 'super' here.",
            )
        };

        let distance = self.resolutions.distance(id).ok_or_else(unbound)?;

        let superclass = self.local_at(distance, "super");
        let instance = match distance.checked_sub(1) {
            Some(this_distance) => self.local_at(this_distance, "this"),
            None => None,
        };

        let (Some(Value::Class(superclass)), Some(Value::Instance(instance))) = (superclass, instance)
        else {
            return Err(unbound());
        };

        let method = superclass.find_method(&method.lexeme).ok_or_else(|| {
            RuntimeError::new(
                RuntimeErrorKind::UndefinedProperty,
                method,
                format!("Undefined property '{}'.", method.lexeme),
            )
        })?;

        Ok(Value::Function(Rc::new(method.bind(instance))))
    }

    // ───────────────────────── variables ──────────────────────────

    /// `name` in the frame `distance` links above the current one.
    fn local_at(&self, distance: usize, name: &str) -> Option<Value> {
        let env = Environment::ancestor(&self.environment, distance)?;
        let value = env.borrow().get_local(name);
        value
    }

    /// Resolved names go straight to their frame; the rest to the top-level
    /// environment of the running module, then its built-ins.
    fn look_up(&self, id: ExprId, name: &Token) -> EvalResult {
        let value = match self.resolutions.distance(id) {
            Some(distance) => self.local_at(distance, &name.lexeme),
            None => {
                let globals = Environment::root(&self.environment);
                let value = globals.borrow().get(&name.lexeme);
                value
            }
        };

        value.ok_or_else(|| undefined_variable(name))
    }

    fn assign(&mut self, id: ExprId, name: &Token, value: Value) -> std::result::Result<(), RuntimeError> {
        let assigned = match self.resolutions.distance(id) {
            Some(distance) => match Environment::ancestor(&self.environment, distance) {
                Some(env) => env.borrow_mut().assign_local(&name.lexeme, value),
                None => false,
            },
            None => self.environment.borrow_mut().assign(&name.lexeme, value),
        };

        if assigned {
            Ok(())
        } else {
            Err(undefined_variable(name))
        }
    }

    // ───────────────────────── calls ──────────────────────────────

    fn call_value(&mut self, callee: Value, args: Vec<Value>, paren: &Token) -> EvalResult {
        match callee {
            Value::Function(function) => {
                check_arity(Arity::Fixed(function.arity()), args.len(), paren)?;
                self.call_function(&function, args)
            }

            Value::BuiltIn(builtin) => {
                check_arity(builtin.arity, args.len(), paren)?;
                debug!("Calling built-in '{}'", builtin.name);
                (builtin.func)(self, &args)
                    .map_err(|message| RuntimeError::new(RuntimeErrorKind::BuiltIn, paren, message))
            }

            Value::Class(class) => {
                check_arity(Arity::Fixed(class.arity()), args.len(), paren)?;
                debug!("Instantiating class '{}'", class.name);

                let instance = Instance::new(Rc::clone(&class));
                if let Some(init) = class.find_method("init") {
                    let bound = Rc::new(init.bind(Rc::clone(&instance)));
                    self.call_function(&bound, args)?;
                }

                Ok(Value::Instance(instance))
            }

            _ => Err(RuntimeError::new(
                RuntimeErrorKind::NotCallable,
                paren,
                "Can only call functions and classes.",
            )),
        }
    }

    fn call_function(&mut self, function: &Function, args: Vec<Value>) -> EvalResult {
        debug!("Calling function '{}'", function.name());

        let mut env = Environment::with_enclosing(Rc::clone(&function.closure));
        for (param, arg) in function.declaration.params.iter().zip(args) {
            env.insert(&param.lexeme, arg);
        }

        let outcome = self.execute_block(&function.declaration.body, Rc::new(RefCell::new(env)))?;

        let value = match outcome {
            Outcome::Normal => Value::Null,
            Outcome::Return(value) => value,
            Outcome::Break(keyword) | Outcome::Continue(keyword) => {
                return Err(escaped_loop_control(&keyword))
            }
        };

        if function.is_initializer {
            if let Some(this) = function.closure.borrow().get_local("this") {
                return Ok(this);
            }
        }

        Ok(value)
    }
}

// ─────────────────────────── helpers ──────────────────────────────

fn literal_value(literal: &LiteralValue) -> Value {
    match literal {
        LiteralValue::Int(n) => Value::int(*n),
        LiteralValue::Float(f) => Value::float(*f),
        LiteralValue::Str(s) => Value::string(s),
        LiteralValue::True => Value::Boolean(true),
        LiteralValue::False => Value::Boolean(false),
        LiteralValue::Null => Value::Null,
    }
}

fn binary(operator: &Token, left: Value, right: Value) -> EvalResult {
    match operator.token_type {
        TokenType::EQUAL_EQUAL => return Ok(Value::Boolean(left == right)),
        TokenType::BANG_EQUAL => return Ok(Value::Boolean(left != right)),
        TokenType::PLUS => {
            if let (Value::String(a), Value::String(b)) = (&left, &right) {
                let joined = format!("{}{}", a, b);
                return Ok(Value::String(Rc::from(joined)));
            }
        }
        _ => {}
    }

    let (Some(a), Some(b)) = (left.as_number(), right.as_number()) else {
        return Err(operand_type_error(operator, &left, &right));
    };

    let arithmetic = |result: std::result::Result<Number, ArithmeticError>| {
        result.map(Value::Number).map_err(|error| {
            let kind = match error {
                ArithmeticError::DivisionByZero => RuntimeErrorKind::DivisionByZero,
                ArithmeticError::NonInteger => RuntimeErrorKind::TypeError,
            };
            RuntimeError::new(kind, operator, error.to_string())
        })
    };

    match operator.token_type {
        TokenType::PLUS => Ok(Value::Number(a.add(b))),
        TokenType::MINUS => Ok(Value::Number(a.sub(b))),
        TokenType::STAR => Ok(Value::Number(a.mul(b))),
        TokenType::SLASH => arithmetic(a.div(b)),
        TokenType::TILDE_SLASH => arithmetic(a.int_div(b)),
        TokenType::PERCENT => arithmetic(a.rem(b)),
        TokenType::GREATER => Ok(Value::Boolean(a > b)),
        TokenType::GREATER_EQUAL => Ok(Value::Boolean(a >= b)),
        TokenType::LESS => Ok(Value::Boolean(a < b)),
        TokenType::LESS_EQUAL => Ok(Value::Boolean(a <= b)),
        _ => Err(operand_type_error(operator, &left, &right)),
    }
}

fn operand_type_error(operator: &Token, left: &Value, right: &Value) -> RuntimeError {
    RuntimeError::new(
        RuntimeErrorKind::TypeError,
        operator,
        format!(
            "Unsupported operand types for '{}': {} and {}.",
            operator.lexeme,
            left.type_name(),
            right.type_name()
        ),
    )
}

fn check_arity(arity: Arity, got: usize, paren: &Token) -> std::result::Result<(), RuntimeError> {
    if arity.accepts(got) {
        return Ok(());
    }

    let expected = match arity {
        Arity::Fixed(n) => n,
        Arity::Variadic => got,
    };

    Err(RuntimeError::new(
        RuntimeErrorKind::Arity,
        paren,
        format!("Expected {} arguments but got {}.", expected, got),
    ))
}

/// Validate `index` against a list of `len` elements. Float indices
/// truncate toward zero.
fn list_position(len: usize, index: &Value, bracket: &Token) -> std::result::Result<usize, RuntimeError> {
    let Value::Number(n) = index else {
        return Err(RuntimeError::new(
            RuntimeErrorKind::TypeError,
            bracket,
            "Index operand must be a number.",
        ));
    };

    match usize::try_from(n.as_i64()) {
        Ok(position) if position < len => Ok(position),
        _ => Err(RuntimeError::new(
            RuntimeErrorKind::IndexOutOfRange,
            bracket,
            "Index out of range.",
        )),
    }
}

fn not_a_list(bracket: &Token) -> RuntimeError {
    RuntimeError::new(
        RuntimeErrorKind::NotAList,
        bracket,
        "Cannot perform index lookup on anything except a list.",
    )
}

fn undefined_variable(name: &Token) -> RuntimeError {
    RuntimeError::new(
        RuntimeErrorKind::UndefinedVariable,
        name,
        format!("Undefined variable '{}'.", name.lexeme),
    )
}

fn escaped_loop_control(keyword: &Token) -> RuntimeError {
    RuntimeError::new(
        RuntimeErrorKind::ControlFlow,
        keyword,
        format!("Can't use '{}' outside of a loop.", keyword.lexeme),
    )
}

/// Where `import "path"` points, relative paths being taken from the
/// importing file's directory.
fn import_target(keyword: &Token, path: &str) -> PathBuf {
    let requested = Path::new(path);
    if requested.is_absolute() {
        return requested.to_path_buf();
    }

    match Path::new(&*keyword.file).parent() {
        Some(directory) => directory.join(requested),
        None => requested.to_path_buf(),
    }
}
