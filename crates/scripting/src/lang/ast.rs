//! Abstract syntax tree for event scripts
//!
//! Expression, chain and command-call nodes are held behind `Arc` so the
//! compiled command list can share them with the tree it came from.

use crate::error::Location;
use crate::lang::lexer::TokenKind;
use crate::script::Origin;
use std::fmt;
use std::sync::Arc;

/// Binary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Equal,
    Greater,
    Less,
    GreaterEqual,
    LessEqual,
}

impl BinaryOp {
    /// Operator for a token, if the token is one
    pub fn from_token(kind: &TokenKind) -> Option<Self> {
        Some(match kind {
            TokenKind::Plus => BinaryOp::Add,
            TokenKind::Minus => BinaryOp::Sub,
            TokenKind::Star => BinaryOp::Mul,
            TokenKind::Slash => BinaryOp::Div,
            TokenKind::Equal => BinaryOp::Equal,
            TokenKind::Greater => BinaryOp::Greater,
            TokenKind::Less => BinaryOp::Less,
            TokenKind::GreaterEqual => BinaryOp::GreaterEqual,
            TokenKind::LessEqual => BinaryOp::LessEqual,
            _ => return None,
        })
    }

    /// Binding strength; all tiers are left-associative
    pub fn precedence(self) -> u8 {
        match self {
            BinaryOp::Add | BinaryOp::Sub => 1,
            BinaryOp::Mul | BinaryOp::Div => 2,
            BinaryOp::Equal
            | BinaryOp::Greater
            | BinaryOp::Less
            | BinaryOp::GreaterEqual
            | BinaryOp::LessEqual => 3,
        }
    }

    pub fn symbol(self) -> &'static str {
        match self {
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::Equal => "==",
            BinaryOp::Greater => ">",
            BinaryOp::Less => "<",
            BinaryOp::GreaterEqual => ">=",
            BinaryOp::LessEqual => "<=",
        }
    }
}

impl fmt::Display for BinaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// Dotted name path, `A.B.C` is `A` -> `B` -> `C`
#[derive(Debug, Clone)]
pub struct IdentChain {
    name: String,
    line: usize,
    origin: Arc<Origin>,
    next: Option<Box<IdentChain>>,
}

impl IdentChain {
    pub fn new(name: impl Into<String>, line: usize, origin: Arc<Origin>) -> Self {
        Self {
            name: name.into(),
            line,
            origin,
            next: None,
        }
    }

    /// Build a chain from a dotted path such as `PLAYER.lock`
    pub fn from_path(path: &str, line: usize, origin: Arc<Origin>) -> Self {
        let mut segments = path.rsplit('.');
        let last = segments.next().unwrap_or_default();
        let mut chain = IdentChain::new(last, line, Arc::clone(&origin));
        for name in segments {
            chain = IdentChain::new(name, line, Arc::clone(&origin)).with_next(chain);
        }
        chain
    }

    pub fn with_next(mut self, next: IdentChain) -> Self {
        self.next = Some(Box::new(next));
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn line(&self) -> usize {
        self.line
    }

    pub fn origin(&self) -> &Arc<Origin> {
        &self.origin
    }

    /// Remaining path segments, if this is not the leaf
    pub fn next(&self) -> Option<&IdentChain> {
        self.next.as_deref()
    }

    pub fn location(&self) -> Location {
        Location::new(&self.origin, self.line)
    }

    pub fn segments(&self) -> impl Iterator<Item = &IdentChain> {
        std::iter::successors(Some(self), |chain| chain.next())
    }
}

impl fmt::Display for IdentChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, segment) in self.segments().enumerate() {
            if i > 0 {
                f.write_str(".")?;
            }
            f.write_str(segment.name())?;
        }
        Ok(())
    }
}

/// Expressions
#[derive(Debug, Clone)]
pub enum Expr {
    Number { value: i64, line: usize },
    Str { value: String, line: usize },
    Chain(IdentChain),
    Binary {
        op: BinaryOp,
        left: Box<Expr>,
        right: Box<Expr>,
        line: usize,
    },
    Parens { inner: Box<Expr>, line: usize },
}

impl Expr {
    pub fn line(&self) -> usize {
        match self {
            Expr::Number { line, .. }
            | Expr::Str { line, .. }
            | Expr::Binary { line, .. }
            | Expr::Parens { line, .. } => *line,
            Expr::Chain(chain) => chain.line(),
        }
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Number { value, .. } => write!(f, "{}", value),
            Expr::Str { value, .. } => write!(f, "\"{}\"", value),
            Expr::Chain(chain) => write!(f, "{}", chain),
            Expr::Binary { op, left, right, .. } => write!(f, "{} {} {}", left, op, right),
            Expr::Parens { inner, .. } => write!(f, "({})", inner),
        }
    }
}

/// `target(args...)`
#[derive(Debug, Clone)]
pub struct CommandCall {
    pub target: IdentChain,
    pub args: Vec<Expr>,
    pub line: usize,
}

impl fmt::Display for CommandCall {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}(", self.target)?;
        for (i, arg) in self.args.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{}", arg)?;
        }
        f.write_str(")")
    }
}

/// Statements
#[derive(Debug, Clone)]
pub enum Stmt {
    Print {
        expr: Arc<Expr>,
        line: usize,
    },
    Assign {
        target: Arc<IdentChain>,
        value: Arc<Expr>,
        line: usize,
    },
    AssignCommand {
        target: Arc<IdentChain>,
        command: Arc<CommandCall>,
        line: usize,
    },
    Command {
        command: Arc<CommandCall>,
        line: usize,
    },
    If {
        condition: Arc<Expr>,
        then_block: Vec<Stmt>,
        else_block: Option<Vec<Stmt>>,
        line: usize,
    },
}

impl Stmt {
    pub fn line(&self) -> usize {
        match self {
            Stmt::Print { line, .. }
            | Stmt::Assign { line, .. }
            | Stmt::AssignCommand { line, .. }
            | Stmt::Command { line, .. }
            | Stmt::If { line, .. } => *line,
        }
    }
}

/// A parsed script: a non-empty statement list
#[derive(Debug, Clone)]
pub struct Program {
    pub statements: Vec<Stmt>,
}

impl Program {
    pub fn new(statements: Vec<Stmt>) -> Self {
        Self { statements }
    }
}

impl fmt::Display for Program {
    /// Indented tree, one node per line
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_block(f, &self.statements, 0)
    }
}

fn write_node(f: &mut fmt::Formatter<'_>, depth: usize, kind: &str, leaf: Option<&dyn fmt::Display>) -> fmt::Result {
    write!(f, "{:width$}{}", "", kind, width = depth * 2)?;
    if let Some(leaf) = leaf {
        write!(f, ": {}", leaf)?;
    }
    writeln!(f)
}

fn write_block(f: &mut fmt::Formatter<'_>, statements: &[Stmt], depth: usize) -> fmt::Result {
    write_node(f, depth, "STATEMENTLIST", None)?;
    for stmt in statements {
        write_stmt(f, stmt, depth + 1)?;
    }
    Ok(())
}

fn write_stmt(f: &mut fmt::Formatter<'_>, stmt: &Stmt, depth: usize) -> fmt::Result {
    match stmt {
        Stmt::Print { expr, .. } => {
            write_node(f, depth, "PRINT", None)?;
            write_expr(f, expr, depth + 1)
        }
        Stmt::Assign { target, value, .. } => {
            write_node(f, depth, "ASSIGN", None)?;
            write_node(f, depth + 1, "IDENTIFIER", Some(target))?;
            write_expr(f, value, depth + 1)
        }
        Stmt::AssignCommand { target, command, .. } => {
            write_node(f, depth, "ASSIGNCOMMAND", None)?;
            write_node(f, depth + 1, "IDENTIFIER", Some(target))?;
            write_command(f, command, depth + 1)
        }
        Stmt::Command { command, .. } => {
            write_node(f, depth, "COMMANDCALL", None)?;
            write_command(f, command, depth + 1)
        }
        Stmt::If {
            condition,
            then_block,
            else_block,
            ..
        } => {
            write_node(f, depth, "IF", None)?;
            write_expr(f, condition, depth + 1)?;
            write_block(f, then_block, depth + 1)?;
            if let Some(else_block) = else_block {
                write_block(f, else_block, depth + 1)?;
            }
            Ok(())
        }
    }
}

fn write_command(f: &mut fmt::Formatter<'_>, command: &CommandCall, depth: usize) -> fmt::Result {
    write_node(f, depth, "COMMAND", Some(&command.target))?;
    write_node(f, depth + 1, "EXPRESSIONLIST", None)?;
    for arg in &command.args {
        write_expr(f, arg, depth + 2)?;
    }
    Ok(())
}

fn write_expr(f: &mut fmt::Formatter<'_>, expr: &Expr, depth: usize) -> fmt::Result {
    match expr {
        Expr::Number { value, .. } => write_node(f, depth, "NUMBER", Some(value)),
        Expr::Str { value, .. } => write_node(f, depth, "STRING", Some(value)),
        Expr::Chain(chain) => write_node(f, depth, "IDENTIFIER", Some(chain)),
        Expr::Binary { op, left, right, .. } => {
            write_node(f, depth, "BINOP", Some(op))?;
            write_expr(f, left, depth + 1)?;
            write_expr(f, right, depth + 1)
        }
        Expr::Parens { inner, .. } => {
            write_node(f, depth, "PARENS", None)?;
            write_expr(f, inner, depth + 1)
        }
    }
}
