//! # Sprite State
//!
//! Position, facing and lock state shared by the player and NPCs, and
//! the script variables they expose.

use ditto_core::{Direction, TilePosition};
use ditto_scripting::{HostError, Value};

/// State of anything standing on the tile grid
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpriteState {
    pub position: TilePosition,
    pub direction: Direction,

    /// Locked sprites ignore movement input
    pub locked: bool,

    pub level: i64,
}

impl SpriteState {
    #[inline]
    pub fn new(position: TilePosition) -> Self {
        Self {
            position,
            direction: Direction::Down,
            locked: false,
            level: 1,
        }
    }

    /// The tile this sprite is facing
    #[inline]
    pub fn facing(&self) -> TilePosition {
        self.position.step(self.direction)
    }

    /// Read a sprite variable
    ///
    /// # Returns
    /// `None` for names this state does not own
    pub fn get_var(&self, name: &str) -> Option<Value> {
        match name {
            "x" => Some(Value::Number(self.position.x.into())),
            "y" => Some(Value::Number(self.position.y.into())),
            "direction" => Some(Value::from(self.direction.as_str())),
            "locked" => Some(Value::Bool(self.locked)),
            "level" => Some(Value::Number(self.level)),
            _ => None,
        }
    }

    /// Write a sprite variable
    ///
    /// # Returns
    /// A lookup error for names this state does not own
    pub fn set_var(&mut self, name: &str, value: Value) -> Result<(), HostError> {
        match name {
            "x" => self.position.x = coordinate(name, &value)?,
            "y" => self.position.y = coordinate(name, &value)?,
            "direction" => {
                self.direction = value
                    .as_str()
                    .and_then(|text| text.parse().ok())
                    .ok_or_else(|| HostError::arguments(name, format!("not a direction: {}", value)))?;
            }
            "level" => {
                self.level = value
                    .as_number()
                    .ok_or_else(|| HostError::arguments(name, "level must be a number"))?;
            }
            _ => return Err(HostError::lookup(name)),
        }
        Ok(())
    }
}

fn coordinate(name: &str, value: &Value) -> Result<i32, HostError> {
    value
        .as_number()
        .and_then(|n| i32::try_from(n).ok())
        .ok_or_else(|| HostError::arguments(name, format!("not a coordinate: {}", value)))
}
