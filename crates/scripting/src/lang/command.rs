//! Flat instruction set produced by the compiler

use crate::lang::ast::{CommandCall, Expr, IdentChain};
use std::fmt;
use std::sync::Arc;

/// A single executable command
///
/// Jump offsets count commands to skip, measured from the command right
/// after the jump.
#[derive(Debug, Clone)]
pub enum Command {
    /// Evaluate and emit to the print sink
    Print(Arc<Expr>),
    /// Evaluate and store into a local or host variable
    Assign(Arc<IdentChain>, Arc<Expr>),
    /// Store a command's return value
    CommandAssign(Arc<IdentChain>, Arc<CommandCall>),
    /// Invoke a command, discarding its return value
    CommandCall(Arc<CommandCall>),
    /// Evaluate into the last-result register
    Eval(Arc<Expr>),
    GotoRelative(isize),
    IfFalseGotoRelative(isize),
}

impl Command {
    /// Source line, for jumps there is none
    pub fn line(&self) -> Option<usize> {
        match self {
            Command::Print(expr) | Command::Eval(expr) | Command::Assign(_, expr) => Some(expr.line()),
            Command::CommandAssign(_, call) | Command::CommandCall(call) => Some(call.line),
            Command::GotoRelative(_) | Command::IfFalseGotoRelative(_) => None,
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Command::Print(expr) => write!(f, "PRINT {}", expr),
            Command::Assign(target, expr) => write!(f, "ASSIGN {} = {}", target, expr),
            Command::CommandAssign(target, call) => write!(f, "COMMANDASSIGN {} = {}", target, call),
            Command::CommandCall(call) => write!(f, "COMMANDCALL {}", call),
            Command::Eval(expr) => write!(f, "EVAL {}", expr),
            Command::GotoRelative(offset) => write!(f, "GOTO-REL {}", offset),
            Command::IfFalseGotoRelative(offset) => write!(f, "IF-FALSE-GOTO-REL {}", offset),
        }
    }
}

/// Numbered listing of a command sequence
pub fn disassemble(name: &str, commands: &[Command]) -> String {
    let mut output = format!("== {} ==\n", name);

    for (index, command) in commands.iter().enumerate() {
        match command.line() {
            Some(line) => output.push_str(&format!("{:04} {:>4} {}\n", index, line, command)),
            None => output.push_str(&format!("{:04}    | {}\n", index, command)),
        }
    }

    output
}
