use log::trace;
use serde::Serialize;
use std::fmt;
use std::mem;
use std::rc::Rc;

/// The different kinds of tokens recognized by the glpc scanner.
///
/// Only `STRING(String)` carries data (the literal contents without the
/// delimiters). Numeric lexemes are converted by the parser so that an
/// out-of-range literal can be reported as a syntax error.
#[allow(non_camel_case_types)]
#[derive(Debug, Clone, Serialize)]
pub enum TokenType {
    /// '('
    LEFT_PAREN,

    /// ')'
    RIGHT_PAREN,

    /// '{'
    LEFT_BRACE,

    /// '}'
    RIGHT_BRACE,

    /// '['
    LEFT_BRACKET,

    /// ']'
    RIGHT_BRACKET,

    /// ','
    COMMA,

    /// '.'
    DOT,

    /// ':'
    COLON,

    /// ';'
    SEMICOLON,

    /// '-'
    MINUS,

    /// '-='
    MINUS_EQUAL,

    /// '+'
    PLUS,

    /// '+='
    PLUS_EQUAL,

    /// '/'
    SLASH,

    /// '/='
    SLASH_EQUAL,

    /// '*'
    STAR,

    /// '*='
    STAR_EQUAL,

    /// '%'
    PERCENT,

    /// '%='
    PERCENT_EQUAL,

    /// '~/' (integer division)
    TILDE_SLASH,

    /// '~/='
    TILDE_SLASH_EQUAL,

    /// '!'
    BANG,

    /// '!='
    BANG_EQUAL,

    /// '='
    EQUAL,

    /// '=='
    EQUAL_EQUAL,

    /// '>'
    GREATER,

    /// '>='
    GREATER_EQUAL,

    /// '<'
    LESS,

    /// '<='
    LESS_EQUAL,

    /// A user‑defined identifier
    IDENTIFIER,

    /// A string literal (contents without delimiters)
    STRING(String),

    /// A string whose closing delimiter was never found
    UNTERMINATED_STRING,

    /// An integer literal such as `42`
    NUMBER_INT,

    /// A float literal such as `4.2`
    NUMBER_FLOAT,

    AND,
    BREAK,
    CLASS,
    CONTINUE,
    DO,
    ELSE,
    FALSE,
    FN,
    FOR,
    IF,
    IMPORT,
    NULL,
    OR,
    PRINT,
    RETURN,
    SUPER,
    THIS,
    TRUE,
    VAR,
    WHILE,

    /// A byte the scanner does not understand
    ILLEGAL,

    /// End‑of‑file marker
    EOF,
}

impl PartialEq for TokenType {
    /// Two TokenTypes are equal if they share the same variant
    /// (ignoring any inner data). Uses `mem::discriminant` to compare.
    fn eq(&self, other: &Self) -> bool {
        mem::discriminant(self) == mem::discriminant(other)
    }
}

impl TokenType {
    /// Upper-case variant name without payload, as printed by `Display`.
    pub fn name(&self) -> &'static str {
        match self {
            TokenType::LEFT_PAREN => "LEFT_PAREN",
            TokenType::RIGHT_PAREN => "RIGHT_PAREN",
            TokenType::LEFT_BRACE => "LEFT_BRACE",
            TokenType::RIGHT_BRACE => "RIGHT_BRACE",
            TokenType::LEFT_BRACKET => "LEFT_BRACKET",
            TokenType::RIGHT_BRACKET => "RIGHT_BRACKET",
            TokenType::COMMA => "COMMA",
            TokenType::DOT => "DOT",
            TokenType::COLON => "COLON",
            TokenType::SEMICOLON => "SEMICOLON",
            TokenType::MINUS => "MINUS",
            TokenType::MINUS_EQUAL => "MINUS_EQUAL",
            TokenType::PLUS => "PLUS",
            TokenType::PLUS_EQUAL => "PLUS_EQUAL",
            TokenType::SLASH => "SLASH",
            TokenType::SLASH_EQUAL => "SLASH_EQUAL",
            TokenType::STAR => "STAR",
            TokenType::STAR_EQUAL => "STAR_EQUAL",
            TokenType::PERCENT => "PERCENT",
            TokenType::PERCENT_EQUAL => "PERCENT_EQUAL",
            TokenType::TILDE_SLASH => "TILDE_SLASH",
            TokenType::TILDE_SLASH_EQUAL => "TILDE_SLASH_EQUAL",
            TokenType::BANG => "BANG",
            TokenType::BANG_EQUAL => "BANG_EQUAL",
            TokenType::EQUAL => "EQUAL",
            TokenType::EQUAL_EQUAL => "EQUAL_EQUAL",
            TokenType::GREATER => "GREATER",
            TokenType::GREATER_EQUAL => "GREATER_EQUAL",
            TokenType::LESS => "LESS",
            TokenType::LESS_EQUAL => "LESS_EQUAL",
            TokenType::IDENTIFIER => "IDENTIFIER",
            TokenType::STRING(_) => "STRING",
            TokenType::UNTERMINATED_STRING => "UNTERMINATED_STRING",
            TokenType::NUMBER_INT => "NUMBER_INT",
            TokenType::NUMBER_FLOAT => "NUMBER_FLOAT",
            TokenType::AND => "AND",
            TokenType::BREAK => "BREAK",
            TokenType::CLASS => "CLASS",
            TokenType::CONTINUE => "CONTINUE",
            TokenType::DO => "DO",
            TokenType::ELSE => "ELSE",
            TokenType::FALSE => "FALSE",
            TokenType::FN => "FN",
            TokenType::FOR => "FOR",
            TokenType::IF => "IF",
            TokenType::IMPORT => "IMPORT",
            TokenType::NULL => "NULL",
            TokenType::OR => "OR",
            TokenType::PRINT => "PRINT",
            TokenType::RETURN => "RETURN",
            TokenType::SUPER => "SUPER",
            TokenType::THIS => "THIS",
            TokenType::TRUE => "TRUE",
            TokenType::VAR => "VAR",
            TokenType::WHILE => "WHILE",
            TokenType::ILLEGAL => "ILLEGAL",
            TokenType::EOF => "EOF",
        }
    }
}

/// A scanned token, including its type, the original lexeme, the file it
/// came from and the line number where it was found.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Token {
    /// The category of this token.
    pub token_type: TokenType,

    /// The exact substring from the source that produced this token.
    pub lexeme: String,

    /// Name of the source file, shared by every token of that file.
    #[serde(skip)]
    pub file: Rc<str>,

    /// 1‑based line number in the source.
    pub line: usize,
}

impl Token {
    /// Create a new Token with the given type, lexeme, file, and line.
    pub fn new(token_type: TokenType, lexeme: impl Into<String>, file: Rc<str>, line: usize) -> Self {
        let lexeme: String = lexeme.into();

        trace!(
            "Creating new token: type={:?}, lexeme={}, line={}",
            token_type,
            lexeme,
            line
        );

        Self {
            token_type,
            lexeme,
            file,
            line,
        }
    }

    /// Build a token that never appeared in the source (desugared operators,
    /// implicit names) but reports the position of `origin`.
    pub fn synthetic(token_type: TokenType, lexeme: &str, origin: &Token) -> Self {
        Self::new(token_type, lexeme, Rc::clone(&origin.file), origin.line)
    }

    pub fn is_eof(&self) -> bool {
        matches!(self.token_type, TokenType::EOF)
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.token_type {
            TokenType::STRING(s) => write!(f, "{} {} {}", self.token_type.name(), self.lexeme, s),
            _ => write!(f, "{} {}", self.token_type.name(), self.lexeme),
        }
    }
}
