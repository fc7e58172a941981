//! Syntax tree produced by the [`Parser`](crate::parser::Parser).
//!
//! Nodes are immutable once built. Expressions that read or write a name
//! (`Variable`, `Assign`, `This`, `Super`) carry an [`ExprId`]; the resolver's
//! side table maps those ids to scope distances, so the tree itself never
//! changes after parsing.

use std::rc::Rc;

use crate::token::Token;

/// Identity of a name-bearing expression node, unique per interpreter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ExprId(pub usize);

/// A literal constant that appears directly in the source code.
#[derive(Debug, Clone, PartialEq)]
pub enum LiteralValue {
    Int(i64),
    Float(f64),
    Str(String),
    True,
    False,
    Null,
}

/// What a [`Expr::Set`] writes to.
#[derive(Debug, Clone, PartialEq)]
pub enum SetTarget {
    /// `object.name = value`
    Property(Token),

    /// `object[index] = value`; `bracket` is the `[` token.
    Index { bracket: Token, index: Box<Expr> },
}

#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// `name = value`; compound forms (`+=` …) arrive here already desugared
    /// into `name = name OP value`.
    Assign {
        id: ExprId,
        name: Token,
        value: Box<Expr>,
    },

    Binary {
        left: Box<Expr>,
        operator: Token,
        right: Box<Expr>,
    },

    /// Function‑ or method‑call expression.
    Call {
        callee: Box<Expr>,
        /// The closing `)` token ‑ retained for error reporting.
        paren: Token,
        arguments: Vec<Expr>,
    },

    /// object.property
    Get { object: Box<Expr>, name: Token },

    /// object.property = value, or list[index] = value
    Set {
        object: Box<Expr>,
        target: SetTarget,
        value: Box<Expr>,
    },

    Grouping(Box<Expr>),

    /// list[index]
    Index {
        object: Box<Expr>,
        bracket: Token,
        index: Box<Expr>,
    },

    /// `[a, b, c]`
    List { bracket: Token, elements: Vec<Expr> },

    Literal(LiteralValue),

    /// Short‑circuiting `and` / `or`.
    Logical {
        left: Box<Expr>,
        operator: Token,
        right: Box<Expr>,
    },

    Unary { operator: Token, right: Box<Expr> },

    Variable { id: ExprId, name: Token },

    This { id: ExprId, keyword: Token },

    /// `super.method`
    Super {
        id: ExprId,
        keyword: Token,
        method: Token,
    },
}

/// A named function or method: shared between the syntax tree and every
/// closure created from it.
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionDecl {
    pub name: Token,
    pub params: Vec<Token>,
    pub body: Vec<Stmt>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Stmt {
    /// Braced scope containing zero or more declarations/statements.
    Block(Vec<Stmt>),

    Break(Token),

    Continue(Token),

    Class {
        name: Token,
        /// Always an [`Expr::Variable`] when present.
        superclass: Option<Expr>,
        methods: Vec<Rc<FunctionDecl>>,
    },

    Expression(Expr),

    Function(Rc<FunctionDecl>),

    If {
        condition: Expr,
        then_branch: Box<Stmt>,
        else_branch: Option<Box<Stmt>>,
    },

    /// `import "path";`
    Import { keyword: Token, path: String },

    /// Shared shape of `for`, `while` and `do … while`. `keyword` tells them
    /// apart; a `DO` loop runs its body once before the first condition check.
    For {
        keyword: Token,
        initializer: Option<Box<Stmt>>,
        condition: Option<Expr>,
        body: Box<Stmt>,
        increment: Option<Expr>,
    },

    Return { keyword: Token, value: Option<Expr> },

    Var {
        name: Token,
        initializer: Option<Expr>,
    },
}
