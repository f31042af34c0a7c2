//! Recursive descent parser for event scripts

use crate::error::{LexError, Location, Result, ScriptError};
use crate::lang::ast::*;
use crate::lang::lexer::{Lexer, Token, TokenKind};
use crate::script::Origin;
use std::sync::Arc;

/// Script parser
pub struct Parser {
    tokens: Vec<Token>,
    current: usize,
    origin: Arc<Origin>,
    lex_errors: Vec<LexError>,
}

impl Parser {
    /// Lex `input` and prepare to parse it
    pub fn new(input: &str, origin: Arc<Origin>) -> Self {
        let (tokens, lex_errors) = Lexer::new(input).tokenize();
        Self {
            tokens,
            current: 0,
            origin,
            lex_errors,
        }
    }

    /// Errors the lexer recovered from
    pub fn lex_errors(&self) -> &[LexError] {
        &self.lex_errors
    }

    /// Parse a script
    ///
    /// The first syntax error aborts the parse.
    pub fn parse(&mut self) -> Result<Program> {
        let mut statements = Vec::new();

        while !self.check(&TokenKind::EOF) {
            statements.push(self.statement()?);
        }

        if statements.is_empty() {
            return Err(self.error());
        }

        Ok(Program::new(statements))
    }

    /// Parse a statement
    fn statement(&mut self) -> Result<Stmt> {
        let line = self.peek().line;

        match self.peek().kind.clone() {
            TokenKind::If => self.if_statement(),
            TokenKind::Print => {
                self.advance();
                let expr = Arc::new(self.expression()?);
                self.consume(&TokenKind::Semicolon)?;
                Ok(Stmt::Print { expr, line })
            }
            TokenKind::Identifier(_) => {
                let target = self.ident_chain()?;

                if self.check(&TokenKind::LParen) {
                    let command = Arc::new(self.command_call(target)?);
                    self.consume(&TokenKind::Semicolon)?;
                    return Ok(Stmt::Command { command, line });
                }

                self.consume(&TokenKind::Assign)?;
                let target = Arc::new(target);

                let stmt = if self.at_command_call() {
                    let chain = self.ident_chain()?;
                    Stmt::AssignCommand {
                        target,
                        command: Arc::new(self.command_call(chain)?),
                        line,
                    }
                } else {
                    Stmt::Assign {
                        target,
                        value: Arc::new(self.expression()?),
                        line,
                    }
                };

                self.consume(&TokenKind::Semicolon)?;
                Ok(stmt)
            }
            _ => Err(self.error()),
        }
    }

    /// Parse `if E block (else block)? endif`
    fn if_statement(&mut self) -> Result<Stmt> {
        let line = self.peek().line;
        self.consume(&TokenKind::If)?;

        let condition = Arc::new(self.expression()?);
        let then_block = self.block()?;

        let else_block = if self.match_token(&TokenKind::Else) {
            Some(self.block()?)
        } else {
            None
        };

        self.consume(&TokenKind::EndIf)?;

        Ok(Stmt::If {
            condition,
            then_block,
            else_block,
            line,
        })
    }

    /// Parse `{ statement+ }`
    fn block(&mut self) -> Result<Vec<Stmt>> {
        self.consume(&TokenKind::LBrace)?;

        let mut statements = vec![self.statement()?];
        while !self.check(&TokenKind::RBrace) {
            statements.push(self.statement()?);
        }

        self.consume(&TokenKind::RBrace)?;
        Ok(statements)
    }

    /// Parse the argument list of a call on `target`
    fn command_call(&mut self, target: IdentChain) -> Result<CommandCall> {
        let line = target.line();
        self.consume(&TokenKind::LParen)?;

        let mut args = Vec::new();
        if !self.check(&TokenKind::RParen) {
            loop {
                args.push(self.expression()?);
                if !self.match_token(&TokenKind::Comma) {
                    break;
                }
            }
        }

        self.consume(&TokenKind::RParen)?;
        Ok(CommandCall { target, args, line })
    }

    /// Parse `IDENT ('.' IDENT)*`
    fn ident_chain(&mut self) -> Result<IdentChain> {
        let token = self.peek().clone();
        let TokenKind::Identifier(name) = token.kind else {
            return Err(self.error());
        };
        self.advance();

        let chain = IdentChain::new(name, token.line, Arc::clone(&self.origin));
        if self.match_token(&TokenKind::Dot) {
            Ok(chain.with_next(self.ident_chain()?))
        } else {
            Ok(chain)
        }
    }

    /// Whether the upcoming tokens are `IDENT ('.' IDENT)* '('`
    fn at_command_call(&self) -> bool {
        let mut i = self.current;
        loop {
            if !matches!(self.kind_at(i), Some(TokenKind::Identifier(_))) {
                return false;
            }
            match self.kind_at(i + 1) {
                Some(TokenKind::Dot) => i += 2,
                Some(TokenKind::LParen) => return true,
                _ => return false,
            }
        }
    }

    /// Parse an expression, `+ -` bind loosest
    fn expression(&mut self) -> Result<Expr> {
        self.additive()
    }

    fn additive(&mut self) -> Result<Expr> {
        let mut expr = self.multiplicative()?;

        while let Some(op) = self.operator_at(1) {
            let line = self.advance().line;
            let right = self.multiplicative()?;
            expr = binary(op, expr, right, line);
        }

        Ok(expr)
    }

    fn multiplicative(&mut self) -> Result<Expr> {
        let mut expr = self.comparison()?;

        while let Some(op) = self.operator_at(2) {
            let line = self.advance().line;
            let right = self.comparison()?;
            expr = binary(op, expr, right, line);
        }

        Ok(expr)
    }

    fn comparison(&mut self) -> Result<Expr> {
        let mut expr = self.primary()?;

        while let Some(op) = self.operator_at(3) {
            let line = self.advance().line;
            let right = self.primary()?;
            expr = binary(op, expr, right, line);
        }

        Ok(expr)
    }

    fn primary(&mut self) -> Result<Expr> {
        let token = self.peek().clone();

        match token.kind {
            TokenKind::Number(value) => {
                self.advance();
                Ok(Expr::Number {
                    value,
                    line: token.line,
                })
            }
            TokenKind::String(value) => {
                self.advance();
                Ok(Expr::Str {
                    value,
                    line: token.line,
                })
            }
            TokenKind::Identifier(_) => Ok(Expr::Chain(self.ident_chain()?)),
            TokenKind::LParen => {
                self.advance();
                let inner = self.expression()?;
                self.consume(&TokenKind::RParen)?;
                Ok(Expr::Parens {
                    inner: Box::new(inner),
                    line: token.line,
                })
            }
            _ => Err(self.error()),
        }
    }

    /// The current token's operator, if it binds at `tier`
    fn operator_at(&self, tier: u8) -> Option<BinaryOp> {
        BinaryOp::from_token(&self.peek().kind).filter(|op| op.precedence() == tier)
    }

    fn kind_at(&self, index: usize) -> Option<&TokenKind> {
        self.tokens.get(index).map(|t| &t.kind)
    }

    /// Current token; the stream always ends with `EOF`, which is never consumed
    fn peek(&self) -> &Token {
        let last = self.tokens.len().saturating_sub(1);
        &self.tokens[self.current.min(last)]
    }

    /// Check if current token matches
    fn check(&self, kind: &TokenKind) -> bool {
        &self.peek().kind == kind
    }

    /// Match and consume token if it matches
    fn match_token(&mut self, kind: &TokenKind) -> bool {
        if self.check(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    /// Consume the expected token or fail with a syntax error at the current one
    fn consume(&mut self, kind: &TokenKind) -> Result<Token> {
        if self.check(kind) {
            Ok(self.advance())
        } else {
            Err(self.error())
        }
    }

    /// Advance to next token, returning the one passed over
    fn advance(&mut self) -> Token {
        let token = self.peek().clone();
        if token.kind != TokenKind::EOF {
            self.current += 1;
        }
        token
    }

    /// Syntax error at the current token
    fn error(&self) -> ScriptError {
        let token = self.peek();
        ScriptError::Syntax {
            location: Location::new(&self.origin, token.line),
            token: token.kind.to_string(),
        }
    }
}

fn binary(op: BinaryOp, left: Expr, right: Expr, line: usize) -> Expr {
    Expr::Binary {
        op,
        left: Box::new(left),
        right: Box::new(right),
        line,
    }
}
