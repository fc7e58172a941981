//! Module `scanner` implements a one‑pass, streaming lexer for glpc sources.
//!
//! It transforms a byte slice (`&[u8]`) into a sequence of [`Token`]s, skipping
//! whitespace and `//` comments, and emitting exactly one `EOF` token at the end.
//! Designed as a `FusedIterator`, it can be chained safely with other iterator
//! adapters.
//!
//! The scanner never fails. Input it cannot make sense of is turned into
//! tokens the parser reports on:
//!
//! - `ILLEGAL` for unknown bytes (and a lone `~`),
//! - `UNTERMINATED_STRING` when a string hits a newline (`"`/`'` strings) or the
//!   end of input (all strings) before its closing delimiter.
//!
//! # Token Recognition
//!
//! - Single‑character tokens: `( ) { } [ ] , . : ;`.
//! - Operators with an optional `=` suffix: `+ - * / % ~/ ! = < >`.
//! - String literals: `"…"`, `'…'` (single line) and `` `…` `` (raw, multi‑line).
//! - Numeric literals: integers and `digits.digits` floats.
//! - Identifiers/keywords: alphanumeric/_ sequences, resolved via a perfect‑hash
//!   `KEYWORDS` map.
//!
//! # Example
//!
//! ```rust
//! use glpc::scanner::Scanner;
//!
//! let tokens: Vec<_> = Scanner::new(b"var x = 1; // example", "demo.gpc").collect();
//! assert_eq!(tokens.len(), 6);
//! ```

use crate::token::{Token, TokenType};
use log::{debug, info};
use memchr::memchr;
use phf::phf_map;
use std::iter::FusedIterator;
use std::rc::Rc;

// ─────────────────────────────────────────────────────────────────────────────
// Static keyword map (compile‑time perfect hash)
// ─────────────────────────────────────────────────────────────────────────────

static KEYWORDS: phf::Map<&'static [u8], TokenType> = phf_map! {
    b"and"      => TokenType::AND,
    b"break"    => TokenType::BREAK,
    b"class"    => TokenType::CLASS,
    b"continue" => TokenType::CONTINUE,
    b"do"       => TokenType::DO,
    b"else"     => TokenType::ELSE,
    b"false"    => TokenType::FALSE,
    b"fn"       => TokenType::FN,
    b"for"      => TokenType::FOR,
    b"if"       => TokenType::IF,
    b"import"   => TokenType::IMPORT,
    b"null"     => TokenType::NULL,
    b"or"       => TokenType::OR,
    b"print"    => TokenType::PRINT,
    b"return"   => TokenType::RETURN,
    b"super"    => TokenType::SUPER,
    b"this"     => TokenType::THIS,
    b"true"     => TokenType::TRUE,
    b"var"      => TokenType::VAR,
    b"while"    => TokenType::WHILE,
};

/// A single pass **scanner / lexer** that converts raw bytes into a sequence
/// of [`Token`]s.
pub struct Scanner<'a> {
    src: &'a [u8],              // entire source file
    file: Rc<str>,              // shared by every emitted token
    start: usize,               // index of the *first* byte of the current lexeme
    curr: usize,                // index *one past* the last byte examined
    line: usize,                // 1‑based line counter (\n increments)
    start_line: usize,          // line the current lexeme started on
    pending: Option<TokenType>, // recognised token kind waiting to be emitted
}

impl<'a> Scanner<'a> {
    /// Create a new lexer over `src`, attributing tokens to `file`.
    #[inline]
    pub fn new(src: &'a [u8], file: impl Into<Rc<str>>) -> Self {
        let file: Rc<str> = file.into();

        info!("Scanner created over {} bytes of {}", src.len(), file);

        Self {
            src,
            file,
            start: 0,
            curr: 0,
            line: 1,
            start_line: 1,
            pending: None,
        }
    }

    // ───────────────────────────── primitive helpers ────────────────────────

    #[inline(always)]
    const fn len(&self) -> usize {
        self.src.len()
    }

    #[inline(always)]
    fn is_at_end(&self) -> bool {
        self.curr >= self.len()
    }

    /// Advance one byte and return it.  *Panics* if called at EOF – higher‑level
    /// code always guards with [`is_at_end`].
    #[inline(always)]
    fn advance(&mut self) -> u8 {
        let b = self.src[self.curr];
        self.curr += 1;
        b
    }

    /// Peek at the current byte without consuming it.  Returns `0` if past EOF
    /// to avoid branching at call‑site.
    #[inline(always)]
    fn peek(&self) -> u8 {
        if self.is_at_end() {
            0
        } else {
            self.src[self.curr]
        }
    }

    #[inline(always)]
    fn peek_next(&self) -> u8 {
        if self.curr + 1 >= self.len() {
            0
        } else {
            self.src[self.curr + 1]
        }
    }

    #[inline(always)]
    fn match_byte(&mut self, expected: u8) -> bool {
        if !self.is_at_end() && self.peek() == expected {
            self.advance();
            true
        } else {
            false
        }
    }

    /// Pick between the plain operator and its `=`-suffixed compound form.
    #[inline(always)]
    fn with_equal(&mut self, compound: TokenType, plain: TokenType) -> TokenType {
        if self.match_byte(b'=') {
            compound
        } else {
            plain
        }
    }

    fn lexeme(&self) -> String {
        String::from_utf8_lossy(&self.src[self.start..self.curr]).into_owned()
    }

    // ───────────────────────────── core lexing ─────────────────────────────

    /// Scan a *single* lexeme starting at `self.curr`.  If it produces an
    /// actual token the kind is stored in `self.pending`; whitespace and
    /// comments leave `pending = None`.
    fn scan_token(&mut self) {
        let b = self.advance();

        let tt = match b {
            // ── single‑character punctuators ──────────────────────────────
            b'(' => TokenType::LEFT_PAREN,
            b')' => TokenType::RIGHT_PAREN,
            b'{' => TokenType::LEFT_BRACE,
            b'}' => TokenType::RIGHT_BRACE,
            b'[' => TokenType::LEFT_BRACKET,
            b']' => TokenType::RIGHT_BRACKET,
            b',' => TokenType::COMMA,
            b'.' => TokenType::DOT,
            b':' => TokenType::COLON,
            b';' => TokenType::SEMICOLON,

            // ── operators with optional compound form ────────────────────
            b'-' => self.with_equal(TokenType::MINUS_EQUAL, TokenType::MINUS),
            b'+' => self.with_equal(TokenType::PLUS_EQUAL, TokenType::PLUS),
            b'*' => self.with_equal(TokenType::STAR_EQUAL, TokenType::STAR),
            b'%' => self.with_equal(TokenType::PERCENT_EQUAL, TokenType::PERCENT),
            b'!' => self.with_equal(TokenType::BANG_EQUAL, TokenType::BANG),
            b'=' => self.with_equal(TokenType::EQUAL_EQUAL, TokenType::EQUAL),
            b'<' => self.with_equal(TokenType::LESS_EQUAL, TokenType::LESS),
            b'>' => self.with_equal(TokenType::GREATER_EQUAL, TokenType::GREATER),

            b'~' => {
                if self.match_byte(b'/') {
                    self.with_equal(TokenType::TILDE_SLASH_EQUAL, TokenType::TILDE_SLASH)
                } else {
                    TokenType::ILLEGAL
                }
            }

            // ── whitespace / newline ─────────────────────────────────────
            b' ' | b'\r' | b'\t' => return,

            b'\n' => {
                self.line += 1;
                return;
            }

            // ── comments (// … until newline) or slash operators ─────────
            b'/' => {
                if self.match_byte(b'/') {
                    // Jump straight to the next newline; it is consumed by the
                    // next call so the line counter stays correct.
                    match memchr(b'\n', &self.src[self.curr..]) {
                        Some(pos) => self.curr += pos,
                        None => self.curr = self.len(),
                    }
                    return;
                }

                self.with_equal(TokenType::SLASH_EQUAL, TokenType::SLASH)
            }

            b'"' | b'\'' => self.quoted_string(b),
            b'`' => self.raw_string(),

            b'0'..=b'9' => self.number(),

            b'a'..=b'z' | b'A'..=b'Z' | b'_' => self.identifier(),

            _ => {
                debug!("Unexpected byte {:#04x} on line {}", b, self.line);
                TokenType::ILLEGAL
            }
        };

        self.pending = Some(tt);
    }

    /// Single-line string delimited by `delimiter` (`"` or `'`).
    fn quoted_string(&mut self, delimiter: u8) -> TokenType {
        while !self.is_at_end() && self.peek() != delimiter && self.peek() != b'\n' {
            self.advance();
        }

        if self.is_at_end() || self.peek() == b'\n' {
            debug!("Unterminated string on line {}", self.line);
            return TokenType::UNTERMINATED_STRING;
        }

        self.advance(); // closing delimiter

        let slice: &[u8] = &self.src[self.start + 1..self.curr - 1];
        TokenType::STRING(String::from_utf8_lossy(slice).into_owned())
    }

    /// Backtick string: may span lines, no escapes. The token keeps the line
    /// the string started on.
    fn raw_string(&mut self) -> TokenType {
        while !self.is_at_end() && self.peek() != b'`' {
            if self.advance() == b'\n' {
                self.line += 1;
            }
        }

        if self.is_at_end() {
            debug!("Unterminated raw string starting on line {}", self.start_line);
            return TokenType::UNTERMINATED_STRING;
        }

        self.advance(); // closing backtick

        let slice: &[u8] = &self.src[self.start + 1..self.curr - 1];
        TokenType::STRING(String::from_utf8_lossy(slice).into_owned())
    }

    /// Numeric literal (`123`, `3.14`).  The fractional part is optional and
    /// decides between `NUMBER_INT` and `NUMBER_FLOAT`.
    fn number(&mut self) -> TokenType {
        while self.peek().is_ascii_digit() {
            self.advance();
        }

        if self.peek() == b'.' && self.peek_next().is_ascii_digit() {
            self.advance(); // consume "."

            while self.peek().is_ascii_digit() {
                self.advance();
            }

            return TokenType::NUMBER_FLOAT;
        }

        TokenType::NUMBER_INT
    }

    /// Identifier or keyword.
    fn identifier(&mut self) -> TokenType {
        while {
            let c: u8 = self.peek();
            c.is_ascii_alphanumeric() || c == b'_'
        } {
            self.advance();
        }

        let slice: &[u8] = &self.src[self.start..self.curr];

        KEYWORDS
            .get(slice)
            .cloned()
            .unwrap_or(TokenType::IDENTIFIER)
    }
}

// ───────────────────────── Iterator implementation ─────────────────────────

impl<'a> Iterator for Scanner<'a> {
    type Item = Token;

    fn next(&mut self) -> Option<Self::Item> {
        while self.curr <= self.len() {
            // EOF guard – emit exactly one EOF then terminate.
            if self.curr == self.len() {
                self.curr += 1;
                return Some(Token::new(TokenType::EOF, "", Rc::clone(&self.file), self.line));
            }

            self.start = self.curr;
            self.start_line = self.line;
            self.pending = None;

            self.scan_token();

            if let Some(tt) = self.pending.take() {
                let token = Token::new(tt, self.lexeme(), Rc::clone(&self.file), self.start_line);
                return Some(token);
            }
        }

        None // already yielded EOF
    }
}

impl<'a> FusedIterator for Scanner<'a> {}

/// Scan `src` to completion. The returned vector always ends with `EOF`.
pub fn scan_tokens(src: &[u8], file: impl Into<Rc<str>>) -> Vec<Token> {
    Scanner::new(src, file).collect()
}
