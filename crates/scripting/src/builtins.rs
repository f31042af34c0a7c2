//! Global commands available to every script
//!
//! Hosts extend the table with their own commands through
//! [`Builtins::register`].

use crate::context::{CommandContext, Host, CALLER, PLAYER};
use crate::error::HostError;
use crate::scriptable::{ObjectHandle, Scriptable};
use crate::value::Value;
use ditto_core::Direction;
use std::collections::HashMap;

/// A global command
pub type CommandFn<H> = fn(&mut CommandContext<'_, H>, &[Value]) -> Result<Value, HostError>;

/// Global command registry
pub struct Builtins<H> {
    commands: HashMap<String, CommandFn<H>>,
}

impl<H: Host> Builtins<H> {
    /// Create a registry with the default commands
    pub fn new() -> Self {
        let mut builtins = Self::empty();

        builtins.register("foo", builtin_foo::<H>);
        builtins.register("lock", builtin_lock::<H>);
        builtins.register("unlock", builtin_unlock::<H>);
        builtins.register("facePlayer", builtin_face_player::<H>);
        builtins.register("dialog", builtin_dialog::<H>);

        builtins
    }

    /// Create a registry with no commands
    pub fn empty() -> Self {
        Self {
            commands: HashMap::new(),
        }
    }

    /// Add or replace a command
    pub fn register(&mut self, name: impl Into<String>, command: CommandFn<H>) {
        self.commands.insert(name.into(), command);
    }

    pub fn get(&self, name: &str) -> Option<CommandFn<H>> {
        self.commands.get(name).copied()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.commands.contains_key(name)
    }
}

impl<H: Host> Default for Builtins<H> {
    fn default() -> Self {
        Self::new()
    }
}

/// Text argument at `index`, any value is accepted in display form
pub fn text_arg(command: &str, args: &[Value], index: usize) -> Result<String, HostError> {
    args.get(index)
        .map(Value::to_string)
        .ok_or_else(|| HostError::arguments(command, format!("missing argument {}", index + 1)))
}

/// Number argument at `index`
pub fn number_arg(command: &str, args: &[Value], index: usize) -> Result<i64, HostError> {
    match args.get(index) {
        Some(Value::Number(n)) => Ok(*n),
        Some(other) => Err(HostError::arguments(
            command,
            format!("argument {} must be a number, got {}", index + 1, other.kind_name()),
        )),
        None => Err(HostError::arguments(command, format!("missing argument {}", index + 1))),
    }
}

fn builtin_foo<H: Host>(_ctx: &mut CommandContext<'_, H>, args: &[Value]) -> Result<Value, HostError> {
    match args.first() {
        Some(_) => {
            let args: Vec<String> = args.iter().map(Value::to_string).collect();
            tracing::info!("Called foo with args: {}", args.join(", "));
        }
        None => tracing::info!("Called foo with no args"),
    }
    Ok(Value::None)
}

/// Run `command` on the player, then on the caller if it supports it
fn on_player_and_caller<H: Host>(ctx: &mut CommandContext<'_, H>, command: &str) -> Result<Value, HostError> {
    let player = ctx.object(PLAYER)?;
    ctx.call_object(&player, command, &[])?;

    if let Some(caller) = ctx.caller() {
        match ctx.call_object(caller, command, &[]) {
            Ok(_) | Err(HostError::Lookup { .. }) => {}
            Err(err) => return Err(err),
        }
    }

    Ok(Value::None)
}

fn builtin_lock<H: Host>(ctx: &mut CommandContext<'_, H>, _args: &[Value]) -> Result<Value, HostError> {
    on_player_and_caller(ctx, "lock")
}

fn builtin_unlock<H: Host>(ctx: &mut CommandContext<'_, H>, _args: &[Value]) -> Result<Value, HostError> {
    on_player_and_caller(ctx, "unlock")
}

fn position_of(object: &ObjectHandle) -> Result<(i64, i64), HostError> {
    let object = object.lock();
    let x = number_var(&*object, "x")?;
    let y = number_var(&*object, "y")?;
    Ok((x, y))
}

fn number_var(object: &(dyn Scriptable + Send), name: &str) -> Result<i64, HostError> {
    object
        .get_var(name)?
        .as_number()
        .ok_or_else(|| HostError::arguments("facePlayer", format!("{} of {} is not a number", name, object.type_name())))
}

/// Turn the caller towards the player when they stand next to each other
fn builtin_face_player<H: Host>(ctx: &mut CommandContext<'_, H>, _args: &[Value]) -> Result<Value, HostError> {
    let player = ctx.object(PLAYER)?;
    let caller = ctx.caller().ok_or_else(|| HostError::lookup(CALLER))?;

    let (px, py) = position_of(&player)?;
    let (cx, cy) = position_of(caller)?;

    let facing = i32::try_from(px - cx)
        .ok()
        .zip(i32::try_from(py - cy).ok())
        .and_then(|(dx, dy)| Direction::from_offset(dx, dy));

    if let Some(direction) = facing {
        caller.lock().set_var("direction", Value::from(direction.as_str()))?;
    }

    Ok(Value::None)
}

/// `dialog(text, last?)`: show text and wait until it is dismissed
fn builtin_dialog<H: Host>(ctx: &mut CommandContext<'_, H>, args: &[Value]) -> Result<Value, HostError> {
    let text = text_arg("dialog", args, 0)?;
    let last = args.get(1).map(Value::is_truthy).unwrap_or(false);

    let dialog = ctx.host.open_dialog(&text, last);
    ctx.wait_for(dialog);

    Ok(Value::None)
}
