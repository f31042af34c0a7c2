//! # Save Game
//!
//! Persistent flags and counters scripts keep under `SAVE`.

use ditto_scripting::{HostError, Scriptable, Value};
use std::collections::HashMap;

/// Save state
///
/// # Purpose
/// A flat variable store. Reading a name that was never written is a
/// lookup error, so scripts should initialise their flags in the
/// new-game script.
#[derive(Debug, Default)]
pub struct SaveGame {
    vars: HashMap<String, Value>,
}

impl SaveGame {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.vars.get(name)
    }

    pub fn set(&mut self, name: impl Into<String>, value: Value) {
        self.vars.insert(name.into(), value);
    }

    pub fn len(&self) -> usize {
        self.vars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }
}

impl Scriptable for SaveGame {
    fn type_name(&self) -> &'static str {
        "save"
    }

    fn get_var(&self, name: &str) -> Result<Value, HostError> {
        self.vars.get(name).cloned().ok_or_else(|| HostError::lookup(name))
    }

    fn set_var(&mut self, name: &str, value: Value) -> Result<(), HostError> {
        self.set(name, value);
        Ok(())
    }
}
