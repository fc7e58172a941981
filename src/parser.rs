/*!
Recursive‑descent parser for **glpc**, with the scope resolver running in
lock‑step.

### Error policy

Parsing never stops at the first problem. Errors that leave the token stream
in a known state (unterminated string, invalid assignment target, too many
parameters, resolver and contextual errors) are *reported* and parsing
carries on. Errors that lose track of the grammar abort the current
declaration; the parser then discards tokens until a statement boundary
(`synchronize`) and resumes, so one defect does not hide the next.

### Logging Policy

| Location                     | Level  | Purpose                                   |
|------------------------------|--------|-------------------------------------------|
| `Parser::new`, `parse`       | `info` | Lifecycle milestones.                     |
| `declaration`, `statement`   | `debug`| High‑level descent into grammar branches. |
| Error paths                  | `debug`| Context before recording the error.       |

--------------------------------------------------------------------------------
Grammar (EBNF, condensed)
--------------------------------------------------------

```text
program        → declaration* EOF ;
declaration    → classDecl | fnDecl | varDecl | importDecl | statement ;
classDecl      → "class" IDENT ( ":" IDENT )? "{" function* "}" ;
fnDecl         → "fn" function ;
function       → IDENT "(" parameters? ")" block ;
varDecl        → "var" IDENT ( "=" expression )? ";" ;
importDecl     → "import" STRING ";" ;            (top level only)
statement      → exprStmt | forStmt | whileStmt | doStmt | ifStmt
               | returnStmt | breakStmt | continueStmt | block ;
forStmt        → "for" "(" ( varDecl | exprStmt | ";" )
                 expression? ";" expression? ")" statement ;
whileStmt      → "while" "(" expression ")" statement ;
doStmt         → "do" statement "while" "(" expression ")" ";" ;
block          → "{" declaration* "}" ;
expression     → assignment ;
assignment     → ( call "." IDENT | call "[" expression "]" | IDENT )
                 ( "=" | "+=" | "-=" | "*=" | "/=" | "%=" | "~/=" ) assignment
               | logic_or ;
logic_or       → logic_and ( "or" logic_and )* ;
logic_and      → equality ( "and" equality )* ;
equality       → comparison ( ( "!=" | "==" ) comparison )* ;
comparison     → term ( ( ">" | ">=" | "<" | "<=" ) term )* ;
term           → factor ( ( "-" | "+" ) factor )* ;
factor         → unary ( ( "/" | "*" | "%" | "~/" ) unary )* ;
unary          → ( "!" | "-" ) unary | call ;
call           → primary ( "(" arguments? ")" | "." IDENT | "[" expression "]" )* ;
primary        → NUMBER | STRING | "true" | "false" | "null" | "this" | "print"
               | IDENT | "super" "." IDENT | "(" expression ")"
               | "[" ( expression ( "," expression )* )? "]" ;
```
*/

use std::mem;
use std::rc::Rc;

use crate::ast::{Expr, ExprId, FunctionDecl, LiteralValue, SetTarget, Stmt};
use crate::error::{ParseError, SyntaxErrors};
use crate::resolver::{Resolutions, Resolver};
use crate::scanner::Scanner;
use crate::token::{Token, TokenType};

use log::{debug, info};

/// Soft limit on parameters and call arguments. Exceeding it is reported but
/// does not stop parsing.
pub const MAX_ARITY: usize = 32;

type ParseResult<T> = std::result::Result<T, ParseError>;

/// A parsed source file together with its resolver side table.
#[derive(Debug)]
pub struct Program {
    pub statements: Vec<Stmt>,
    pub resolutions: Resolutions,

    /// First [`ExprId`] not used by this program.
    pub next_id: usize,
}

/// What kind of body is being parsed, for `return` validation.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum FunctionType {
    None,
    Function,
    Method,
    Initializer,
}

/// Are we inside a class, and does it have a superclass?
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum ClassType {
    None,
    Class,
    Subclass,
}

/// Top‑level parser over an owned token vector ending in `EOF`.
pub struct Parser {
    tokens: Vec<Token>,
    current: usize,
    resolver: Resolver,
    errors: Vec<ParseError>,
    next_id: usize,
    in_loop: bool,
    current_function: FunctionType,
    current_class: ClassType,
}

/// Scan and parse `src` in one go, numbering expressions from zero.
pub fn parse_source(src: &[u8], file: &str) -> Result<Program, SyntaxErrors> {
    Parser::new(Scanner::new(src, file).collect()).parse()
}

impl Parser {
    /// Construct a new parser.
    pub fn new(tokens: Vec<Token>) -> Self {
        Self::with_first_id(tokens, 0)
    }

    /// Construct a parser whose expression ids start at `first_id`, so its
    /// side table can be merged with earlier programs'.
    pub fn with_first_id(mut tokens: Vec<Token>, first_id: usize) -> Self {
        info!("Parser created with {} tokens", tokens.len());

        if !tokens.last().is_some_and(Token::is_eof) {
            let (file, line) = tokens
                .last()
                .map(|t| (Rc::clone(&t.file), t.line))
                .unwrap_or_else(|| (Rc::from("<unknown>"), 1));
            tokens.push(Token::new(TokenType::EOF, "", file, line));
        }

        Self {
            tokens,
            current: 0,
            resolver: Resolver::new(),
            errors: Vec::new(),
            next_id: first_id,
            in_loop: false,
            current_function: FunctionType::None,
            current_class: ClassType::None,
        }
    }

    // ───────────────────────── public API ─────────────────────────

    /// Parse an entire program. Any reported error fails the whole parse.
    pub fn parse(mut self) -> Result<Program, SyntaxErrors> {
        info!("Beginning parse phase");

        let mut statements: Vec<Stmt> = Vec::new();

        while !self.is_at_end() {
            if let Some(stmt) = self.declaration() {
                statements.push(stmt);
            }
        }

        if !self.errors.is_empty() {
            info!("Parse finished with {} error(s)", self.errors.len());
            return Err(SyntaxErrors(self.errors));
        }

        info!("Parsed {} top-level statement(s)", statements.len());

        Ok(Program {
            statements,
            resolutions: self.resolver.into_resolutions(),
            next_id: self.next_id,
        })
    }

    // ──────────────────────── declaration rules ───────────────────

    fn declaration(&mut self) -> Option<Stmt> {
        debug!("Entering declaration at line {}", self.peek().line);

        let result = if self.matches(TokenType::CLASS) {
            self.class_declaration()
        } else if self.matches(TokenType::FN) {
            self.function_declaration()
        } else if self.matches(TokenType::VAR) {
            self.var_declaration()
        } else if self.matches(TokenType::IMPORT) {
            self.import_declaration()
        } else {
            self.statement()
        };

        match result {
            Ok(stmt) => Some(stmt),
            Err(error) => {
                debug!("Declaration failed: {}", error);
                self.errors.push(error);
                self.synchronize();
                None
            }
        }
    }

    fn class_declaration(&mut self) -> ParseResult<Stmt> {
        let name = self.consume(TokenType::IDENTIFIER, "Expect class name.")?;
        self.declare(&name);
        self.resolver.define(&name);

        let superclass = if self.matches(TokenType::COLON) {
            let super_name = self.consume(TokenType::IDENTIFIER, "Expect superclass name.")?;
            if super_name.lexeme == name.lexeme {
                self.report(ParseError::at(&super_name, "A class can't inherit from itself."));
            }
            Some(self.variable(super_name))
        } else {
            None
        };

        let enclosing_class = self.current_class;
        self.current_class = if superclass.is_some() {
            ClassType::Subclass
        } else {
            ClassType::Class
        };

        if superclass.is_some() {
            self.resolver.begin();
            self.resolver.define_name("super");
        }
        self.resolver.begin();
        self.resolver.define_name("this");

        let methods = self.class_body();

        self.resolver.end();
        if superclass.is_some() {
            self.resolver.end();
        }
        self.current_class = enclosing_class;

        Ok(Stmt::Class {
            name,
            superclass,
            methods: methods?,
        })
    }

    fn class_body(&mut self) -> ParseResult<Vec<Rc<FunctionDecl>>> {
        self.consume(TokenType::LEFT_BRACE, "Expect '{' before class body.")?;

        let mut methods: Vec<Rc<FunctionDecl>> = Vec::new();

        while !self.check(TokenType::RIGHT_BRACE) && !self.is_at_end() {
            let method_name = self.consume(TokenType::IDENTIFIER, "Expect method name.")?;
            let kind = if method_name.lexeme == "init" {
                FunctionType::Initializer
            } else {
                FunctionType::Method
            };
            methods.push(self.function(method_name, kind)?);
        }

        self.consume(TokenType::RIGHT_BRACE, "Expect '}' after class body.")?;
        Ok(methods)
    }

    fn function_declaration(&mut self) -> ParseResult<Stmt> {
        let name = self.consume(TokenType::IDENTIFIER, "Expect function name.")?;

        // Visible inside its own body, so recursion resolves locally.
        self.declare(&name);
        self.resolver.define(&name);

        Ok(Stmt::Function(self.function(name, FunctionType::Function)?))
    }

    /// Parameters and body share one fresh scope; `break`/`continue` of an
    /// enclosing loop do not reach into the body.
    fn function(&mut self, name: Token, kind: FunctionType) -> ParseResult<Rc<FunctionDecl>> {
        let enclosing_function = mem::replace(&mut self.current_function, kind);
        let enclosing_loop = mem::replace(&mut self.in_loop, false);

        let result = self.scoped(|p| {
            p.consume(TokenType::LEFT_PAREN, "Expect '(' after function name.")?;
            let params = p.parameters()?;
            p.consume(TokenType::LEFT_BRACE, "Expect '{' before function body.")?;
            let body = p.block()?;
            Ok((params, body))
        });

        self.current_function = enclosing_function;
        self.in_loop = enclosing_loop;

        let (params, body) = result?;
        Ok(Rc::new(FunctionDecl { name, params, body }))
    }

    fn parameters(&mut self) -> ParseResult<Vec<Token>> {
        let mut params: Vec<Token> = Vec::new();

        if !self.check(TokenType::RIGHT_PAREN) {
            loop {
                let param = self.consume(TokenType::IDENTIFIER, "Expect parameter name.")?;

                if params.len() >= MAX_ARITY {
                    self.report(ParseError::at(
                        &param,
                        format!("Can't have more than {} parameters.", MAX_ARITY),
                    ));
                }

                self.declare(&param);
                self.resolver.define(&param);
                params.push(param);

                if !self.matches(TokenType::COMMA) {
                    break;
                }
            }
        }

        self.consume(TokenType::RIGHT_PAREN, "Expect ')' after parameters.")?;
        Ok(params)
    }

    fn var_declaration(&mut self) -> ParseResult<Stmt> {
        let name = self.consume(TokenType::IDENTIFIER, "Expect variable name.")?;
        self.declare(&name);

        let initializer = if self.matches(TokenType::EQUAL) {
            Some(self.expression())
        } else {
            None
        };

        // Define even when the initializer failed, so later reads do not
        // report a bogus self-reference.
        self.resolver.define(&name);
        let initializer = initializer.transpose()?;

        self.consume(
            TokenType::SEMICOLON,
            "Expect ';' after variable declaration.",
        )?;
        Ok(Stmt::Var { name, initializer })
    }

    fn import_declaration(&mut self) -> ParseResult<Stmt> {
        let keyword = self.previous().clone();

        let path = match &self.peek().token_type {
            TokenType::STRING(path) => path.clone(),
            _ => {
                return Err(ParseError::at(
                    self.peek(),
                    "Expect file path string after 'import'.",
                ))
            }
        };
        self.advance();

        self.consume(TokenType::SEMICOLON, "Expect ';' after import path.")?;

        if self.resolver.depth() > 0 {
            self.report(ParseError::at(
                &keyword,
                "Import is only allowed at the top level.",
            ));
        }

        Ok(Stmt::Import { keyword, path })
    }

    // ───────────────────────── statement rules ────────────────────

    fn statement(&mut self) -> ParseResult<Stmt> {
        debug!("Entering statement at line {}", self.peek().line);

        if self.matches(TokenType::LEFT_BRACE) {
            let statements = self.scoped(|p| p.block())?;
            Ok(Stmt::Block(statements))
        } else if self.matches(TokenType::BREAK) {
            self.loop_control("break").map(Stmt::Break)
        } else if self.matches(TokenType::CONTINUE) {
            self.loop_control("continue").map(Stmt::Continue)
        } else if self.matches(TokenType::DO) {
            self.do_while_statement()
        } else if self.matches(TokenType::FOR) {
            self.for_statement()
        } else if self.matches(TokenType::IF) {
            self.if_statement()
        } else if self.matches(TokenType::WHILE) {
            self.while_statement()
        } else if self.matches(TokenType::RETURN) {
            self.return_statement()
        } else {
            self.expression_statement()
        }
    }

    /// Shared by `break` and `continue`; returns the keyword token.
    fn loop_control(&mut self, word: &str) -> ParseResult<Token> {
        let keyword = self.previous().clone();

        if !self.in_loop {
            self.report(ParseError::at(
                &keyword,
                format!("Can't use '{}' outside of a loop.", word),
            ));
        }

        self.consume(TokenType::SEMICOLON, &format!("Expect ';' after '{}'.", word))?;
        Ok(keyword)
    }

    /// Parse a loop body with `break`/`continue` permitted.
    fn loop_body(&mut self) -> ParseResult<Stmt> {
        let enclosing = mem::replace(&mut self.in_loop, true);
        let body = self.statement();
        self.in_loop = enclosing;
        body
    }

    fn do_while_statement(&mut self) -> ParseResult<Stmt> {
        let keyword = self.previous().clone();

        self.scoped(|p| {
            let body = p.loop_body()?;
            p.consume(TokenType::WHILE, "Expect 'while' after do-while body.")?;
            p.consume(TokenType::LEFT_PAREN, "Expect '(' after 'while'.")?;
            let condition = p.expression()?;
            p.consume(TokenType::RIGHT_PAREN, "Expect ')' after while condition.")?;
            p.consume(TokenType::SEMICOLON, "Expect ';' after ')'.")?;

            Ok(Stmt::For {
                keyword,
                initializer: None,
                condition: Some(condition),
                body: Box::new(body),
                increment: None,
            })
        })
    }

    fn for_statement(&mut self) -> ParseResult<Stmt> {
        let keyword = self.previous().clone();

        self.scoped(|p| {
            p.consume(TokenType::LEFT_PAREN, "Expect '(' after 'for'.")?;

            let initializer = if p.matches(TokenType::SEMICOLON) {
                None
            } else if p.matches(TokenType::VAR) {
                Some(Box::new(p.var_declaration()?))
            } else {
                Some(Box::new(p.expression_statement()?))
            };

            let condition = if !p.check(TokenType::SEMICOLON) {
                Some(p.expression()?)
            } else {
                None
            };
            p.consume(TokenType::SEMICOLON, "Expect ';' after loop condition.")?;

            let increment = if !p.check(TokenType::RIGHT_PAREN) {
                Some(p.expression()?)
            } else {
                None
            };
            p.consume(TokenType::RIGHT_PAREN, "Expect ')' after for clauses.")?;

            let body = p.loop_body()?;

            Ok(Stmt::For {
                keyword,
                initializer,
                condition,
                body: Box::new(body),
                increment,
            })
        })
    }

    fn while_statement(&mut self) -> ParseResult<Stmt> {
        let keyword = self.previous().clone();

        self.scoped(|p| {
            p.consume(TokenType::LEFT_PAREN, "Expect '(' after 'while'.")?;
            let condition = p.expression()?;
            p.consume(TokenType::RIGHT_PAREN, "Expect ')' after while condition.")?;
            let body = p.loop_body()?;

            Ok(Stmt::For {
                keyword,
                initializer: None,
                condition: Some(condition),
                body: Box::new(body),
                increment: None,
            })
        })
    }

    fn if_statement(&mut self) -> ParseResult<Stmt> {
        self.consume(TokenType::LEFT_PAREN, "Expect '(' after 'if'.")?;
        let condition: Expr = self.expression()?;
        self.consume(TokenType::RIGHT_PAREN, "Expect ')' after if condition.")?;

        let then_branch: Box<Stmt> = Box::new(self.statement()?);
        let else_branch: Option<Box<Stmt>> = if self.matches(TokenType::ELSE) {
            Some(Box::new(self.statement()?))
        } else {
            None
        };

        Ok(Stmt::If {
            condition,
            then_branch,
            else_branch,
        })
    }

    fn return_statement(&mut self) -> ParseResult<Stmt> {
        let keyword = self.previous().clone();

        if self.current_function == FunctionType::None {
            self.report(ParseError::at(&keyword, "Can't return from top-level code."));
        }

        let value: Option<Expr> = if !self.check(TokenType::SEMICOLON) {
            Some(self.expression()?)
        } else {
            None
        };

        self.consume(TokenType::SEMICOLON, "Expect ';' after return value.")?;
        Ok(Stmt::Return { keyword, value })
    }

    fn expression_statement(&mut self) -> ParseResult<Stmt> {
        let expr: Expr = self.expression()?;
        self.consume(TokenType::SEMICOLON, "Expect ';' after value.")?;
        Ok(Stmt::Expression(expr))
    }

    /// Declarations up to and including the closing `}`. The caller owns the
    /// scope.
    fn block(&mut self) -> ParseResult<Vec<Stmt>> {
        let mut statements: Vec<Stmt> = Vec::new();

        while !self.check(TokenType::RIGHT_BRACE) && !self.is_at_end() {
            if let Some(stmt) = self.declaration() {
                statements.push(stmt);
            }
        }

        self.consume(TokenType::RIGHT_BRACE, "Expect '}' after block.")?;
        Ok(statements)
    }

    // ─────────────────────── expression rules ─────────────────────

    fn expression(&mut self) -> ParseResult<Expr> {
        self.assignment()
    }

    fn assignment(&mut self) -> ParseResult<Expr> {
        let expr: Expr = self.logical_or()?;

        if self.matches(TokenType::EQUAL) {
            let equals = self.previous().clone();
            let value = self.assignment()?;
            return Ok(self.assign_to(expr, &equals, value));
        }

        if let Some((operator_type, lexeme)) = compound_operator(&self.peek().token_type) {
            let equals = self.advance().clone();
            let value = self.assignment()?;

            // `x OP= v` becomes `x = x OP v`.
            let operator = Token::synthetic(operator_type, lexeme, &equals);
            let combined = Expr::Binary {
                left: Box::new(expr.clone()),
                operator,
                right: Box::new(value),
            };
            return Ok(self.assign_to(expr, &equals, combined));
        }

        Ok(expr)
    }

    /// Turn `target = value` into the matching node, or report an invalid
    /// target and keep the left side.
    fn assign_to(&mut self, target: Expr, equals: &Token, value: Expr) -> Expr {
        match target {
            Expr::Variable { name, .. } => {
                let id = self.next_expr_id();
                self.resolver.local(id, &name);
                Expr::Assign {
                    id,
                    name,
                    value: Box::new(value),
                }
            }

            Expr::Get { object, name } => Expr::Set {
                object,
                target: SetTarget::Property(name),
                value: Box::new(value),
            },

            Expr::Index {
                object,
                bracket,
                index,
            } => Expr::Set {
                object,
                target: SetTarget::Index { bracket, index },
                value: Box::new(value),
            },

            other => {
                self.report(ParseError::at(equals, "Invalid assignment target."));
                other
            }
        }
    }

    fn logical_or(&mut self) -> ParseResult<Expr> {
        let mut expr: Expr = self.logical_and()?;

        while self.matches(TokenType::OR) {
            let operator = self.previous().clone();
            let right: Expr = self.logical_and()?;

            expr = Expr::Logical {
                left: Box::new(expr),
                operator,
                right: Box::new(right),
            };
        }

        Ok(expr)
    }

    fn logical_and(&mut self) -> ParseResult<Expr> {
        let mut expr: Expr = self.equality()?;

        while self.matches(TokenType::AND) {
            let operator = self.previous().clone();
            let right: Expr = self.equality()?;

            expr = Expr::Logical {
                left: Box::new(expr),
                operator,
                right: Box::new(right),
            };
        }

        Ok(expr)
    }

    fn equality(&mut self) -> ParseResult<Expr> {
        self.binary_level(
            &[TokenType::BANG_EQUAL, TokenType::EQUAL_EQUAL],
            Self::comparison,
        )
    }

    fn comparison(&mut self) -> ParseResult<Expr> {
        self.binary_level(
            &[
                TokenType::GREATER,
                TokenType::GREATER_EQUAL,
                TokenType::LESS,
                TokenType::LESS_EQUAL,
            ],
            Self::term,
        )
    }

    fn term(&mut self) -> ParseResult<Expr> {
        self.binary_level(&[TokenType::MINUS, TokenType::PLUS], Self::factor)
    }

    fn factor(&mut self) -> ParseResult<Expr> {
        self.binary_level(
            &[
                TokenType::STAR,
                TokenType::SLASH,
                TokenType::PERCENT,
                TokenType::TILDE_SLASH,
            ],
            Self::unary,
        )
    }

    /// One left-associative precedence level: `next ( OP next )*`.
    fn binary_level(
        &mut self,
        operators: &[TokenType],
        next: fn(&mut Self) -> ParseResult<Expr>,
    ) -> ParseResult<Expr> {
        let mut expr: Expr = next(self)?;

        while self.matches_any(operators) {
            let operator = self.previous().clone();
            let right: Expr = next(self)?;
            expr = Expr::Binary {
                left: Box::new(expr),
                operator,
                right: Box::new(right),
            };
        }

        Ok(expr)
    }

    fn unary(&mut self) -> ParseResult<Expr> {
        if self.matches_any(&[TokenType::BANG, TokenType::MINUS]) {
            let operator = self.previous().clone();
            let right: Expr = self.unary()?;
            return Ok(Expr::Unary {
                operator,
                right: Box::new(right),
            });
        }

        self.call()
    }

    fn call(&mut self) -> ParseResult<Expr> {
        let mut expr: Expr = self.primary()?;

        loop {
            if self.matches(TokenType::LEFT_PAREN) {
                expr = self.finish_call(expr)?;
            } else if self.matches(TokenType::DOT) {
                let name = self.consume(TokenType::IDENTIFIER, "Expect property name after '.'.")?;
                expr = Expr::Get {
                    object: Box::new(expr),
                    name,
                };
            } else if self.matches(TokenType::LEFT_BRACKET) {
                let bracket = self.previous().clone();
                let index = self.expression()?;
                self.consume(TokenType::RIGHT_BRACKET, "Expect ']' after index.")?;
                expr = Expr::Index {
                    object: Box::new(expr),
                    bracket,
                    index: Box::new(index),
                };
            } else {
                break;
            }
        }

        Ok(expr)
    }

    fn finish_call(&mut self, callee: Expr) -> ParseResult<Expr> {
        let mut arguments: Vec<Expr> = Vec::new();

        if !self.check(TokenType::RIGHT_PAREN) {
            loop {
                if arguments.len() >= MAX_ARITY {
                    let at = self.peek().clone();
                    self.report(ParseError::at(
                        &at,
                        format!("Can't have more than {} arguments.", MAX_ARITY),
                    ));
                }

                arguments.push(self.expression()?);

                if !self.matches(TokenType::COMMA) {
                    break;
                }
            }
        }

        let paren = self.consume(TokenType::RIGHT_PAREN, "Expect ')' after arguments.")?;

        Ok(Expr::Call {
            callee: Box::new(callee),
            paren,
            arguments,
        })
    }

    fn primary(&mut self) -> ParseResult<Expr> {
        if self.matches(TokenType::FALSE) {
            return Ok(Expr::Literal(LiteralValue::False));
        }
        if self.matches(TokenType::TRUE) {
            return Ok(Expr::Literal(LiteralValue::True));
        }
        if self.matches(TokenType::NULL) {
            return Ok(Expr::Literal(LiteralValue::Null));
        }

        if self.matches(TokenType::NUMBER_INT) {
            let token = self.previous();
            return token
                .lexeme
                .parse::<i64>()
                .map(|n| Expr::Literal(LiteralValue::Int(n)))
                .map_err(|_| ParseError::at(token, format!("Unable to parse value: {}.", token.lexeme)));
        }

        if self.matches(TokenType::NUMBER_FLOAT) {
            let token = self.previous();
            return token
                .lexeme
                .parse::<f64>()
                .map(|n| Expr::Literal(LiteralValue::Float(n)))
                .map_err(|_| ParseError::at(token, format!("Unable to parse value: {}.", token.lexeme)));
        }

        if let TokenType::STRING(ref s) = self.peek().token_type {
            let value = s.clone();
            self.advance();
            return Ok(Expr::Literal(LiteralValue::Str(value)));
        }

        if self.matches(TokenType::UNTERMINATED_STRING) {
            // Reported, then treated as a value so the statement can finish.
            let token = self.previous().clone();
            self.report(ParseError::at(&token, "Unterminated string."));
            return Ok(Expr::Literal(LiteralValue::Null));
        }

        if self.matches(TokenType::IDENTIFIER) {
            let name = self.previous().clone();
            return Ok(self.variable(name));
        }

        if self.matches(TokenType::PRINT) {
            // The built-in print function, reachable only through the keyword.
            let name = self.previous().clone();
            let id = self.next_expr_id();
            self.resolver.local(id, &name);
            return Ok(Expr::Variable { id, name });
        }

        if self.matches(TokenType::THIS) {
            let keyword = self.previous().clone();
            if self.current_class == ClassType::None {
                self.report(ParseError::at(&keyword, "Can't use 'this' outside of a class."));
            }
            let id = self.next_expr_id();
            self.resolver.local(id, &keyword);
            return Ok(Expr::This { id, keyword });
        }

        if self.matches(TokenType::SUPER) {
            return self.super_expression();
        }

        if self.matches(TokenType::LEFT_BRACKET) {
            let bracket = self.previous().clone();
            let mut elements: Vec<Expr> = Vec::new();

            if !self.check(TokenType::RIGHT_BRACKET) {
                loop {
                    elements.push(self.expression()?);
                    if !self.matches(TokenType::COMMA) {
                        break;
                    }
                }
            }

            self.consume(TokenType::RIGHT_BRACKET, "Expect ']' after list values.")?;
            return Ok(Expr::List { bracket, elements });
        }

        if self.matches(TokenType::LEFT_PAREN) {
            let expr: Expr = self.expression()?;
            self.consume(TokenType::RIGHT_PAREN, "Expect ')' after expression.")?;
            return Ok(Expr::Grouping(Box::new(expr)));
        }

        if self.check(TokenType::ILLEGAL) {
            return Err(ParseError::at(self.peek(), "Unexpected character."));
        }

        Err(ParseError::at(self.peek(), "Expect expression."))
    }

    fn super_expression(&mut self) -> ParseResult<Expr> {
        let keyword = self.previous().clone();

        match self.current_class {
            ClassType::None => {
                self.report(ParseError::at(&keyword, "Can't use 'super' outside of a class."))
            }
            ClassType::Class => self.report(ParseError::at(
                &keyword,
                "Can't use 'super' in a class with no superclass.",
            )),
            ClassType::Subclass => {}
        }

        self.consume(TokenType::DOT, "Expect '.' after 'super'.")?;
        let method = self.consume(TokenType::IDENTIFIER, "Expect superclass method name.")?;

        let id = self.next_expr_id();
        self.resolver.local(id, &keyword);

        Ok(Expr::Super {
            id,
            keyword,
            method,
        })
    }

    /// Build a resolved variable read.
    fn variable(&mut self, name: Token) -> Expr {
        if let Err(error) = self.resolver.check_initializer(&name) {
            self.report(error);
        }

        let id = self.next_expr_id();
        self.resolver.local(id, &name);
        Expr::Variable { id, name }
    }

    // ────────────────────── utility helpers ───────────────────────

    fn next_expr_id(&mut self) -> ExprId {
        let id = ExprId(self.next_id);
        self.next_id += 1;
        id
    }

    /// Record an error without abandoning the current declaration.
    fn report(&mut self, error: ParseError) {
        debug!("Reporting error: {}", error);
        self.errors.push(error);
    }

    fn declare(&mut self, name: &Token) {
        if let Err(error) = self.resolver.declare(name) {
            self.report(error);
        }
    }

    /// Run `f` inside a fresh resolver scope, closing it on every path.
    fn scoped<T>(&mut self, f: impl FnOnce(&mut Self) -> ParseResult<T>) -> ParseResult<T> {
        self.resolver.begin();
        let result = f(self);
        self.resolver.end();
        result
    }

    #[inline(always)]
    fn matches(&mut self, ttype: TokenType) -> bool {
        if self.check(ttype) {
            self.advance();

            return true;
        }

        false
    }

    fn matches_any(&mut self, types: &[TokenType]) -> bool {
        for ttype in types {
            if self.check(ttype.clone()) {
                self.advance();
                return true;
            }
        }

        false
    }

    #[inline(always)]
    fn consume(&mut self, ttype: TokenType, message: &str) -> ParseResult<Token> {
        if self.check(ttype) {
            return Ok(self.advance().clone());
        }

        Err(ParseError::at(self.peek(), message))
    }

    #[inline(always)]
    fn check(&self, ttype: TokenType) -> bool {
        if self.is_at_end() {
            return false;
        }

        self.peek().token_type == ttype
    }

    #[inline(always)]
    fn advance(&mut self) -> &Token {
        if !self.is_at_end() {
            self.current += 1;
        }

        self.previous()
    }

    #[inline(always)]
    fn is_at_end(&self) -> bool {
        self.peek().is_eof()
    }

    #[inline(always)]
    fn peek(&self) -> &Token {
        &self.tokens[self.current]
    }

    #[inline(always)]
    fn previous(&self) -> &Token {
        &self.tokens[self.current.saturating_sub(1)]
    }

    /// Discards tokens until it thinks it is at a statement boundary.
    fn synchronize(&mut self) {
        self.advance(); // skip the token that caused the error

        while !self.is_at_end() {
            if matches!(self.previous().token_type, TokenType::SEMICOLON) {
                return;
            }

            match self.peek().token_type {
                TokenType::CLASS
                | TokenType::FN
                | TokenType::VAR
                | TokenType::FOR
                | TokenType::IF
                | TokenType::WHILE
                | TokenType::PRINT
                | TokenType::RETURN => return,
                _ => {}
            }

            self.advance();
        }
    }
}

/// Binary operator a compound assignment token stands for.
fn compound_operator(ttype: &TokenType) -> Option<(TokenType, &'static str)> {
    match ttype {
        TokenType::PLUS_EQUAL => Some((TokenType::PLUS, "+")),
        TokenType::MINUS_EQUAL => Some((TokenType::MINUS, "-")),
        TokenType::STAR_EQUAL => Some((TokenType::STAR, "*")),
        TokenType::SLASH_EQUAL => Some((TokenType::SLASH, "/")),
        TokenType::PERCENT_EQUAL => Some((TokenType::PERCENT, "%")),
        TokenType::TILDE_SLASH_EQUAL => Some((TokenType::TILDE_SLASH, "~/")),
        _ => None,
    }
}
