//! Name resolution for running scripts
//!
//! A chain with more than one segment starts at a top-level host object
//! (`PLAYER`, `CALLER`, `MAP`, `SAVE`) and is delegated object to object.
//! A single-segment chain is a script local, or for calls a global
//! command. Host failures are given their script location here, once.

use crate::builtins::{Builtins, CommandFn};
use crate::context::{CommandContext, Host};
use crate::error::{HostError, Location, Result, ScriptError};
use crate::lang::ast::{CommandCall, Expr, IdentChain};
use crate::script::Origin;
use crate::scriptable;
use crate::value::Value;
use std::collections::HashMap;

/// Local variables and global commands
pub struct Symbols<H> {
    locals: HashMap<String, Value>,
    commands: Builtins<H>,
}

impl<H: Host> Symbols<H> {
    pub fn new() -> Self {
        Self::with_commands(Builtins::new())
    }

    pub fn with_commands(commands: Builtins<H>) -> Self {
        Self {
            locals: HashMap::new(),
            commands,
        }
    }

    pub fn register_command(&mut self, name: impl Into<String>, command: CommandFn<H>) {
        self.commands.register(name, command);
    }

    pub fn commands(&self) -> &Builtins<H> {
        &self.commands
    }

    pub fn local(&self, name: &str) -> Option<&Value> {
        self.locals.get(name)
    }

    /// Forget every local variable
    pub fn flush_locals(&mut self) {
        self.locals.clear();
    }
}

impl<H: Host> Default for Symbols<H> {
    fn default() -> Self {
        Self::new()
    }
}

/// Resolves names and evaluates expressions for one command
pub struct Resolver<'a, H> {
    symbols: &'a mut Symbols<H>,
    ctx: CommandContext<'a, H>,
    origin: &'a Origin,
}

impl<'a, H: Host> Resolver<'a, H> {
    pub fn new(symbols: &'a mut Symbols<H>, ctx: CommandContext<'a, H>, origin: &'a Origin) -> Self {
        Self { symbols, ctx, origin }
    }

    pub fn host(&mut self) -> &mut H {
        &mut *self.ctx.host
    }

    /// Read the variable a chain names
    pub fn get_variable(&mut self, chain: &IdentChain) -> Result<Value> {
        let found = match chain.next() {
            Some(rest) => self
                .ctx
                .object(chain.name())
                .and_then(|object| scriptable::resolve_var(&object, rest)),
            None => self
                .symbols
                .locals
                .get(chain.name())
                .cloned()
                .ok_or_else(|| HostError::lookup(chain.name())),
        };
        found.map_err(|err| err.at(chain.location()))
    }

    /// Write the variable a chain names
    pub fn set_variable(&mut self, chain: &IdentChain, value: Value) -> Result<()> {
        match chain.next() {
            Some(rest) => self
                .ctx
                .object(chain.name())
                .and_then(|object| scriptable::assign_var(&object, rest, value))
                .map_err(|err| err.at(chain.location())),
            None => {
                self.symbols.locals.insert(chain.name().to_string(), value);
                Ok(())
            }
        }
    }

    /// Invoke the command a chain names with evaluated arguments
    pub fn invoke_command(&mut self, chain: &IdentChain, args: &[Value]) -> Result<Value> {
        let result = match chain.next() {
            Some(rest) => self.ctx.object(chain.name()).and_then(|object| {
                scriptable::invoke(&object, rest, args, self.ctx.wait_slot())
            }),
            None => match self.symbols.commands.get(chain.name()) {
                Some(command) => command(&mut self.ctx, args),
                None => Err(HostError::lookup(chain.name())),
            },
        };
        result.map_err(|err| err.at(chain.location()))
    }

    /// Evaluate arguments left to right, then invoke
    pub fn call(&mut self, call: &CommandCall) -> Result<Value> {
        let args = call
            .args
            .iter()
            .map(|arg| self.evaluate(arg))
            .collect::<Result<Vec<_>>>()?;
        self.invoke_command(&call.target, &args)
    }

    /// Evaluate an expression
    pub fn evaluate(&mut self, expr: &Expr) -> Result<Value> {
        match expr {
            Expr::Number { value, .. } => Ok(Value::Number(*value)),
            Expr::Str { value, .. } => Ok(Value::Str(value.clone())),
            Expr::Chain(chain) => self.get_variable(chain),
            Expr::Parens { inner, .. } => self.evaluate(inner),
            Expr::Binary { op, left, right, line } => {
                let lhs = self.evaluate(left)?;
                let rhs = self.evaluate(right)?;
                op.apply(&lhs, &rhs).ok_or_else(|| ScriptError::Operator {
                    location: Location::new(self.origin, *line),
                    op: op.to_string(),
                    lhs: lhs.to_string(),
                    rhs: rhs.to_string(),
                })
            }
        }
    }
}
