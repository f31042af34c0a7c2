//! # NPCs
//!
//! Non-player sprites placed on a map, with the scripts they run when
//! the player interacts with them.

use crate::sprite::SpriteState;
use ditto_core::{Direction, TilePosition};
use ditto_scripting::{HostError, Script, Scriptable, Trigger, Value, Wait};
use std::collections::HashMap;
use std::sync::Arc;

/// Frames one tile of walking takes
pub const WALK_TICKS: u32 = 4;

/// A walk in progress
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Walk {
    direction: Direction,
    remaining: u32,
}

/// Non-player sprite
///
/// # Purpose
/// Reachable from scripts as `MAP.<id>`, or as `CALLER` while one of its
/// own scripts runs. `walk` keeps the NPC busy until it reaches the next
/// tile, suspending the script that issued it.
pub struct Npc {
    pub id: String,
    pub sprite: SpriteState,
    walk: Option<Walk>,
    scripts: HashMap<Trigger, Arc<Script>>,
}

impl Npc {
    /// Create a new NPC
    ///
    /// # Arguments
    /// * `id` - Name scripts use to reach it through `MAP`
    /// * `position` - Starting tile
    #[inline]
    pub fn new(id: impl Into<String>, position: TilePosition) -> Self {
        let id = id.into();
        tracing::debug!("Creating NPC {} at ({}, {})", id, position.x, position.y);

        Self {
            id,
            sprite: SpriteState::new(position),
            walk: None,
            scripts: HashMap::new(),
        }
    }

    /// Attach the script run for `trigger`
    pub fn with_script(mut self, trigger: Trigger, script: Arc<Script>) -> Self {
        self.scripts.insert(trigger, script);
        self
    }

    pub fn script(&self, trigger: Trigger) -> Option<&Arc<Script>> {
        self.scripts.get(&trigger)
    }

    #[inline]
    pub fn is_walking(&self) -> bool {
        self.walk.is_some()
    }

    /// Advance a walk in progress by one frame
    pub fn tick(&mut self) {
        let Some(walk) = self.walk.as_mut() else {
            return;
        };

        walk.remaining = walk.remaining.saturating_sub(1);
        if walk.remaining == 0 {
            self.sprite.position = self.sprite.position.step(walk.direction);
            self.walk = None;
            tracing::trace!(
                "NPC {} arrived at ({}, {})",
                self.id,
                self.sprite.position.x,
                self.sprite.position.y
            );
        }
    }

    fn start_walk(&mut self, direction: Direction) {
        self.sprite.direction = direction;
        self.walk = Some(Walk {
            direction,
            remaining: WALK_TICKS,
        });
    }
}

impl Scriptable for Npc {
    fn type_name(&self) -> &'static str {
        "npc"
    }

    fn get_var(&self, name: &str) -> Result<Value, HostError> {
        match name {
            "id" => Ok(Value::from(self.id.as_str())),
            _ => self.sprite.get_var(name).ok_or_else(|| HostError::lookup(name)),
        }
    }

    fn set_var(&mut self, name: &str, value: Value) -> Result<(), HostError> {
        self.sprite.set_var(name, value)
    }

    fn call(&mut self, name: &str, args: &[Value], wait: &mut Wait<'_>) -> Result<Value, HostError> {
        match name {
            "foo" => {
                tracing::info!("NPC {} called foo with {} args", self.id, args.len());
                Ok(Value::from("RETURN"))
            }
            "lock" => {
                self.sprite.locked = true;
                Ok(Value::None)
            }
            "unlock" => {
                self.sprite.locked = false;
                Ok(Value::None)
            }
            "walk" => {
                let direction: Direction = args
                    .first()
                    .and_then(Value::as_str)
                    .and_then(|text| text.parse().ok())
                    .ok_or_else(|| HostError::arguments(name, "expected a direction"))?;
                self.start_walk(direction);
                wait.until_idle();
                Ok(Value::None)
            }
            _ => Err(HostError::lookup(name)),
        }
    }

    fn is_busy(&self) -> bool {
        self.walk.is_some()
    }
}
