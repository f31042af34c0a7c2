//! # Player
//!
//! The player character as scripts see it through `PLAYER`.

use crate::pokemon::Party;
use crate::sprite::SpriteState;
use ditto_core::TilePosition;
use ditto_scripting::{HostError, ObjectHandle, Scriptable, Value, Wait};
use parking_lot::Mutex;
use std::sync::Arc;

/// The player character
///
/// # Purpose
/// Exposes position, facing, lock state and level as variables, the
/// party as the child object `PARTY`, and the `lock`, `unlock` and
/// `addToParty` commands.
pub struct Player {
    pub sprite: SpriteState,
    party: Arc<Mutex<Party>>,
}

impl Player {
    /// Create a new player
    ///
    /// # Arguments
    /// * `position` - Starting tile
    #[inline]
    pub fn new(position: TilePosition) -> Self {
        tracing::debug!("Creating player at ({}, {})", position.x, position.y);

        Self {
            sprite: SpriteState::new(position),
            party: Arc::new(Mutex::new(Party::new())),
        }
    }

    pub fn party(&self) -> &Arc<Mutex<Party>> {
        &self.party
    }

    /// Whether movement input is accepted
    #[inline]
    pub fn can_move(&self) -> bool {
        !self.sprite.locked
    }
}

impl Scriptable for Player {
    fn type_name(&self) -> &'static str {
        "player"
    }

    fn get_object(&self, name: &str) -> Result<ObjectHandle, HostError> {
        match name {
            "PARTY" => {
                let party: ObjectHandle = self.party.clone();
                Ok(party)
            }
            _ => Err(HostError::lookup(name)),
        }
    }

    fn get_var(&self, name: &str) -> Result<Value, HostError> {
        self.sprite.get_var(name).ok_or_else(|| HostError::lookup(name))
    }

    fn set_var(&mut self, name: &str, value: Value) -> Result<(), HostError> {
        self.sprite.set_var(name, value)
    }

    fn call(&mut self, name: &str, args: &[Value], _wait: &mut Wait<'_>) -> Result<Value, HostError> {
        match name {
            "lock" => {
                self.sprite.locked = true;
                Ok(Value::None)
            }
            "unlock" => {
                self.sprite.locked = false;
                Ok(Value::None)
            }
            "addToParty" => {
                let member = args
                    .first()
                    .and_then(Value::as_host)
                    .cloned()
                    .ok_or_else(|| HostError::arguments(name, "expected a pokemon"))?;
                self.party.lock().add(member)?;
                Ok(Value::None)
            }
            _ => Err(HostError::lookup(name)),
        }
    }
}
