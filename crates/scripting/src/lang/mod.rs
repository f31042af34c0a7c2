//! Script language front end
//!
//! Source text is lexed, parsed into a [`Program`] and lowered to a flat
//! list of [`Command`]s with relative jumps.

pub mod lexer;
pub mod ast;
pub mod parser;
pub mod command;
pub mod compiler;

pub use lexer::{Lexer, Token, TokenKind};
pub use ast::*;
pub use parser::Parser;
pub use command::{disassemble, Command};
pub use compiler::Compiler;
