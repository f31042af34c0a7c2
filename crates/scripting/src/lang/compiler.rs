//! Lowers a parsed program into a flat command sequence

use crate::lang::ast::{Program, Stmt};
use crate::lang::command::Command;
use std::sync::Arc;

/// Script compiler
///
/// Single depth-first pass. Each branch of an `if` is compiled first so
/// its length is known when the jump over it is emitted.
#[derive(Debug, Default)]
pub struct Compiler {
    commands: Vec<Command>,
}

impl Compiler {
    /// Create a new compiler
    pub fn new() -> Self {
        Self::default()
    }

    /// Compile a program into commands
    pub fn compile(mut self, program: &Program) -> Vec<Command> {
        for stmt in &program.statements {
            self.compile_statement(stmt);
        }
        self.commands
    }

    fn compile_block(statements: &[Stmt]) -> Vec<Command> {
        let mut compiler = Compiler::new();
        for stmt in statements {
            compiler.compile_statement(stmt);
        }
        compiler.commands
    }

    /// Compile a statement
    fn compile_statement(&mut self, stmt: &Stmt) {
        match stmt {
            Stmt::Print { expr, .. } => self.commands.push(Command::Print(Arc::clone(expr))),

            Stmt::Assign { target, value, .. } => self
                .commands
                .push(Command::Assign(Arc::clone(target), Arc::clone(value))),

            Stmt::AssignCommand { target, command, .. } => self
                .commands
                .push(Command::CommandAssign(Arc::clone(target), Arc::clone(command))),

            Stmt::Command { command, .. } => self.commands.push(Command::CommandCall(Arc::clone(command))),

            Stmt::If {
                condition,
                then_block,
                else_block,
                ..
            } => {
                let then_commands = Self::compile_block(then_block);
                self.commands.push(Command::Eval(Arc::clone(condition)));

                match else_block {
                    Some(else_block) => {
                        let else_commands = Self::compile_block(else_block);
                        self.commands
                            .push(Command::IfFalseGotoRelative(jump_len(&then_commands) + 1));
                        self.commands.extend(then_commands);
                        self.commands
                            .push(Command::GotoRelative(jump_len(&else_commands)));
                        self.commands.extend(else_commands);
                    }
                    None => {
                        self.commands
                            .push(Command::IfFalseGotoRelative(jump_len(&then_commands)));
                        self.commands.extend(then_commands);
                    }
                }
            }
        }
    }
}

fn jump_len(commands: &[Command]) -> isize {
    isize::try_from(commands.len()).unwrap_or(isize::MAX)
}
