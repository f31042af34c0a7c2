//! # Ditto Scripting System
//!
//! Event scripts drive dialogs, NPC movement, map transitions and world
//! state changes.
//!
//! ## Pipeline
//! - Lexer and recursive descent parser produce a [`Program`]
//! - The compiler lowers it to a flat [`Command`] list with relative jumps
//! - [`ScriptEngine`] runs one script at a time, suspending while a host
//!   object it waits on is busy
//!
//! ## Host objects
//! Scripts reach game objects through dotted paths starting at `PLAYER`,
//! `CALLER`, `MAP` or `SAVE`. Anything addressable implements
//! [`Scriptable`]; the game provides the top-level registry through
//! [`Host`].

pub mod error;
pub mod lang;
pub mod value;
pub mod scriptable;
pub mod context;
pub mod builtins;
pub mod symbols;
pub mod script;
pub mod behaviours;
pub mod interpreter;

#[cfg(test)]
mod testing;

pub use error::{HostError, LexError, Location, Result, ScriptError};
pub use lang::{Command, Program};
pub use value::Value;
pub use scriptable::{handle, ObjectHandle, Scriptable, Wait};
pub use context::{CommandContext, Host, CALLER, MAP, PLAYER, SAVE};
pub use builtins::{Builtins, CommandFn};
pub use script::{extract_source, NativeAction, Origin, Runnable, Script, ScriptDef, Trigger};
pub use behaviours::BehaviourTable;
pub use interpreter::{ScriptEngine, State};
