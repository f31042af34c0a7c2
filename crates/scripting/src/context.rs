//! Host registry and command execution context
//!
//! The host supplies the fixed top-level objects scripts start their
//! paths from. Commands get a [`CommandContext`] with the host, the
//! object that triggered the script and a way to suspend it.

use crate::error::HostError;
use crate::scriptable::{ObjectHandle, Wait};
use crate::value::Value;

/// The active player
pub const PLAYER: &str = "PLAYER";
/// The object that triggered the running script
pub const CALLER: &str = "CALLER";
/// The current map
pub const MAP: &str = "MAP";
/// Persistent save state
pub const SAVE: &str = "SAVE";

/// Game-side services the interpreter relies on
pub trait Host {
    fn player(&self) -> Option<ObjectHandle>;

    fn current_map(&self) -> Option<ObjectHandle>;

    fn save_game(&self) -> Option<ObjectHandle>;

    /// Show a dialog box; the returned object stays busy until it is dismissed
    fn open_dialog(&mut self, text: &str, last: bool) -> ObjectHandle;

    /// Sink for `print` statements
    fn print(&mut self, text: &str) {
        tracing::info!(target: "script", "{}", text);
    }
}

/// What a command can see and do while it runs
pub struct CommandContext<'a, H> {
    pub host: &'a mut H,
    caller: Option<&'a ObjectHandle>,
    waiting_for: &'a mut Option<ObjectHandle>,
}

impl<'a, H: Host> CommandContext<'a, H> {
    pub fn new(
        host: &'a mut H,
        caller: Option<&'a ObjectHandle>,
        waiting_for: &'a mut Option<ObjectHandle>,
    ) -> Self {
        Self {
            host,
            caller,
            waiting_for,
        }
    }

    /// The object that triggered the script, if any
    pub fn caller(&self) -> Option<&'a ObjectHandle> {
        self.caller
    }

    /// Top-level object for a registry name
    pub fn object(&self, name: &str) -> Result<ObjectHandle, HostError> {
        let object = match name {
            PLAYER => self.host.player(),
            CALLER => self.caller.cloned(),
            MAP => self.host.current_map(),
            SAVE => self.host.save_game(),
            _ => None,
        };
        object.ok_or_else(|| HostError::lookup(name))
    }

    /// Suspend the script until `target` is no longer busy
    pub fn wait_for(&mut self, target: ObjectHandle) {
        *self.waiting_for = Some(target);
    }

    /// Mutable access to the suspension slot, for chain helpers
    pub(crate) fn wait_slot(&mut self) -> &mut Option<ObjectHandle> {
        &mut *self.waiting_for
    }

    /// Invoke `command` on `target`
    pub fn call_object(
        &mut self,
        target: &ObjectHandle,
        command: &str,
        args: &[Value],
    ) -> Result<Value, HostError> {
        let mut wait = Wait::new(target, &mut *self.waiting_for);
        target.lock().call(command, args, &mut wait)
    }
}
