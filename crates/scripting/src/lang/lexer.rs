//! Lexer and tokenizer for event scripts

use crate::error::LexError;
use std::fmt;
use std::iter::Peekable;
use std::str::Chars;

/// Token types
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenKind {
    // Literals
    Number(i64),
    String(String),
    Identifier(String),

    // Keywords
    Print,
    If,
    Else,
    EndIf,

    // Operators
    Plus,         // +
    Minus,        // -
    Star,         // *
    Slash,        // /
    Equal,        // ==
    Greater,      // >
    Less,         // <
    GreaterEqual, // >=
    LessEqual,    // <=

    // Punctuation
    Assign,    // =
    LParen,    // (
    RParen,    // )
    LBrace,    // {
    RBrace,    // }
    Semicolon, // ;
    Dot,       // .
    Comma,     // ,

    EOF,
}

impl fmt::Display for TokenKind {
    /// Source text of the token
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenKind::Number(n) => write!(f, "{}", n),
            TokenKind::String(s) => write!(f, "\"{}\"", s),
            TokenKind::Identifier(name) => f.write_str(name),
            TokenKind::Print => f.write_str("print"),
            TokenKind::If => f.write_str("if"),
            TokenKind::Else => f.write_str("else"),
            TokenKind::EndIf => f.write_str("endif"),
            TokenKind::Plus => f.write_str("+"),
            TokenKind::Minus => f.write_str("-"),
            TokenKind::Star => f.write_str("*"),
            TokenKind::Slash => f.write_str("/"),
            TokenKind::Equal => f.write_str("=="),
            TokenKind::Greater => f.write_str(">"),
            TokenKind::Less => f.write_str("<"),
            TokenKind::GreaterEqual => f.write_str(">="),
            TokenKind::LessEqual => f.write_str("<="),
            TokenKind::Assign => f.write_str("="),
            TokenKind::LParen => f.write_str("("),
            TokenKind::RParen => f.write_str(")"),
            TokenKind::LBrace => f.write_str("{"),
            TokenKind::RBrace => f.write_str("}"),
            TokenKind::Semicolon => f.write_str(";"),
            TokenKind::Dot => f.write_str("."),
            TokenKind::Comma => f.write_str(","),
            TokenKind::EOF => f.write_str("end of input"),
        }
    }
}

/// A token and the source line it started on
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub line: usize,
}

/// Script lexer
///
/// Lexing never fails outright: illegal input is recorded in
/// [`Lexer::errors`], logged, and skipped.
pub struct Lexer<'a> {
    input: Peekable<Chars<'a>>,
    line: usize,
    ch: Option<char>,
    errors: Vec<LexError>,
}

impl<'a> Lexer<'a> {
    /// Create a new lexer
    pub fn new(input: &'a str) -> Self {
        let mut chars = input.chars().peekable();
        let ch = chars.next();
        Self {
            input: chars,
            line: 1,
            ch,
            errors: Vec::new(),
        }
    }

    /// Lex errors seen so far
    pub fn errors(&self) -> &[LexError] {
        &self.errors
    }

    /// Lex the whole input; the returned stream always ends with `EOF`
    pub fn tokenize(mut self) -> (Vec<Token>, Vec<LexError>) {
        let mut tokens = Vec::new();
        loop {
            let token = self.next_token();
            let done = token.kind == TokenKind::EOF;
            tokens.push(token);
            if done {
                break;
            }
        }
        (tokens, self.errors)
    }

    /// Get the next token
    pub fn next_token(&mut self) -> Token {
        loop {
            self.skip_whitespace();
            let line = self.line;

            let Some(ch) = self.ch else {
                return Token {
                    kind: TokenKind::EOF,
                    line,
                };
            };

            let kind = match ch {
                '\n' => {
                    self.advance();
                    self.line += 1;
                    continue;
                }

                '#' => {
                    while self.ch.is_some() && self.ch != Some('\n') {
                        self.advance();
                    }
                    continue;
                }

                '0'..='9' => match self.read_number() {
                    Some(kind) => kind,
                    None => continue,
                },

                'a'..='z' | 'A'..='Z' | '_' => self.read_identifier(),

                '"' => match self.read_string() {
                    Some(kind) => kind,
                    None => continue,
                },

                '=' => {
                    self.advance();
                    if self.ch == Some('=') {
                        self.advance();
                        TokenKind::Equal
                    } else {
                        TokenKind::Assign
                    }
                }

                '<' => {
                    self.advance();
                    if self.ch == Some('=') {
                        self.advance();
                        TokenKind::LessEqual
                    } else {
                        TokenKind::Less
                    }
                }

                '>' => {
                    self.advance();
                    if self.ch == Some('=') {
                        self.advance();
                        TokenKind::GreaterEqual
                    } else {
                        TokenKind::Greater
                    }
                }

                '+' => self.single(TokenKind::Plus),
                '-' => self.single(TokenKind::Minus),
                '*' => self.single(TokenKind::Star),
                '/' => self.single(TokenKind::Slash),
                '(' => self.single(TokenKind::LParen),
                ')' => self.single(TokenKind::RParen),
                '{' => self.single(TokenKind::LBrace),
                '}' => self.single(TokenKind::RBrace),
                ';' => self.single(TokenKind::Semicolon),
                '.' => self.single(TokenKind::Dot),
                ',' => self.single(TokenKind::Comma),

                _ => {
                    self.error(LexError::IllegalCharacter { line, ch });
                    self.advance();
                    continue;
                }
            };

            return Token { kind, line };
        }
    }

    fn single(&mut self, kind: TokenKind) -> TokenKind {
        self.advance();
        kind
    }

    /// Read an integer literal
    fn read_number(&mut self) -> Option<TokenKind> {
        let mut digits = String::new();

        while let Some(ch) = self.ch {
            if ch.is_ascii_digit() {
                digits.push(ch);
                self.advance();
            } else {
                break;
            }
        }

        match digits.parse() {
            Ok(value) => Some(TokenKind::Number(value)),
            Err(_) => {
                self.error(LexError::InvalidNumber {
                    line: self.line,
                    text: digits,
                });
                None
            }
        }
    }

    /// Read an identifier or keyword
    fn read_identifier(&mut self) -> TokenKind {
        let mut ident = String::new();

        while let Some(ch) = self.ch {
            if ch.is_ascii_alphanumeric() || ch == '_' {
                ident.push(ch);
                self.advance();
            } else {
                break;
            }
        }

        match ident.as_str() {
            "print" => TokenKind::Print,
            "if" => TokenKind::If,
            "else" => TokenKind::Else,
            "endif" => TokenKind::EndIf,
            _ => TokenKind::Identifier(ident),
        }
    }

    /// Read a string literal, content taken verbatim
    ///
    /// A string must close on the line it opened. Otherwise only the
    /// opening quote is skipped and lexing resumes right after it.
    fn read_string(&mut self) -> Option<TokenKind> {
        let line = self.line;
        let resume = (self.input.clone(), self.ch);
        self.advance(); // Skip opening quote

        let mut s = String::new();

        while let Some(ch) = self.ch {
            match ch {
                '"' => {
                    self.advance();
                    return Some(TokenKind::String(s));
                }
                '\n' => break,
                _ => {
                    s.push(ch);
                    self.advance();
                }
            }
        }

        self.error(LexError::UnterminatedString { line });
        (self.input, self.ch) = resume;
        self.advance();
        None
    }

    fn error(&mut self, err: LexError) {
        tracing::warn!("{}", err);
        self.errors.push(err);
    }

    /// Advance to the next character
    fn advance(&mut self) {
        self.ch = self.input.next();
    }

    /// Skip whitespace other than newlines
    fn skip_whitespace(&mut self) {
        while let Some(ch) = self.ch {
            if ch.is_whitespace() && ch != '\n' {
                self.advance();
            } else {
                break;
            }
        }
    }
}
