//! # Tilemaps
//!
//! A map holds its NPCs, per-tile behaviour codes, warps and script
//! events. Scripts see the current map as `MAP` and reach its NPCs as
//! child objects by id.

use crate::npc::Npc;
use ditto_core::TilePosition;
use ditto_scripting::{HostError, NativeAction, ObjectHandle, Script, Scriptable, Trigger, Value};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;

/// Tile that moves the player to another map
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Warp {
    pub position: TilePosition,
    pub target_map: String,
    pub target: TilePosition,
}

impl Warp {
    pub fn new(position: TilePosition, target_map: impl Into<String>, target: TilePosition) -> Self {
        Self {
            position,
            target_map: target_map.into(),
            target,
        }
    }

    /// The action run when the player steps on this warp
    ///
    /// Locks the player for the transition, moves them, and unlocks.
    pub fn action(&self) -> NativeAction {
        NativeAction::new(format!("warp:{}", self.target_map))
            .step("lock", vec![])
            .step(
                "warp",
                vec![
                    Value::from(self.target_map.as_str()),
                    Value::from(self.target.x),
                    Value::from(self.target.y),
                ],
            )
            .step("unlock", vec![])
    }
}

/// Script bound to a tile rather than a sprite
#[derive(Debug, Clone)]
pub struct ScriptEvent {
    pub position: TilePosition,
    pub trigger: Trigger,
    pub script: Arc<Script>,
}

/// A map
///
/// # Purpose
/// Owns everything placed on one map. NPC handles are shared with the
/// interpreter while their scripts run.
pub struct Tilemap {
    pub name: String,
    sprites: Vec<Arc<Mutex<Npc>>>,
    behaviours: HashMap<TilePosition, i64>,
    warps: Vec<Warp>,
    events: Vec<ScriptEvent>,
    load_script: Option<Arc<Script>>,
}

impl Tilemap {
    /// Create an empty map
    ///
    /// # Arguments
    /// * `name` - Map name, as used by warps
    #[inline]
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        tracing::debug!("Creating map {}", name);

        Self {
            name,
            sprites: Vec::new(),
            behaviours: HashMap::new(),
            warps: Vec::new(),
            events: Vec::new(),
            load_script: None,
        }
    }

    /// Place an NPC, returning its shared handle
    pub fn add_sprite(&mut self, npc: Npc) -> Arc<Mutex<Npc>> {
        let npc = Arc::new(Mutex::new(npc));
        self.sprites.push(Arc::clone(&npc));
        npc
    }

    pub fn sprite(&self, id: &str) -> Option<&Arc<Mutex<Npc>>> {
        self.sprites.iter().find(|npc| npc.lock().id == id)
    }

    pub fn sprite_at(&self, position: TilePosition) -> Option<&Arc<Mutex<Npc>>> {
        self.sprites.iter().find(|npc| npc.lock().sprite.position == position)
    }

    pub fn sprites(&self) -> &[Arc<Mutex<Npc>>] {
        &self.sprites
    }

    pub fn set_behaviour(&mut self, position: TilePosition, code: i64) {
        self.behaviours.insert(position, code);
    }

    pub fn behaviour_at(&self, position: TilePosition) -> Option<i64> {
        self.behaviours.get(&position).copied()
    }

    pub fn add_warp(&mut self, warp: Warp) {
        self.warps.push(warp);
    }

    pub fn warp_at(&self, position: TilePosition) -> Option<&Warp> {
        self.warps.iter().find(|warp| warp.position == position)
    }

    pub fn add_event(&mut self, position: TilePosition, trigger: Trigger, script: Arc<Script>) {
        self.events.push(ScriptEvent {
            position,
            trigger,
            script,
        });
    }

    pub fn event_at(&self, position: TilePosition, trigger: Trigger) -> Option<&Arc<Script>> {
        self.events
            .iter()
            .find(|event| event.position == position && event.trigger == trigger)
            .map(|event| &event.script)
    }

    pub fn set_load_script(&mut self, script: Arc<Script>) {
        self.load_script = Some(script);
    }

    pub fn load_script(&self) -> Option<&Arc<Script>> {
        self.load_script.as_ref()
    }

    /// Advance every NPC by one frame
    pub fn tick(&self) {
        for npc in &self.sprites {
            npc.lock().tick();
        }
    }
}

impl Scriptable for Tilemap {
    fn type_name(&self) -> &'static str {
        "map"
    }

    fn get_object(&self, name: &str) -> Result<ObjectHandle, HostError> {
        let npc = self.sprite(name).ok_or_else(|| HostError::lookup(name))?;
        let npc: ObjectHandle = npc.clone();
        Ok(npc)
    }

    fn get_var(&self, name: &str) -> Result<Value, HostError> {
        match name {
            "name" => Ok(Value::from(self.name.as_str())),
            _ => Err(HostError::lookup(name)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ditto_scripting::{Origin, Runnable};

    #[test]
    fn test_sprites_by_id_and_position() {
        let mut map = Tilemap::new("town");
        map.add_sprite(Npc::new("guard", TilePosition::new(1, 1)));
        map.add_sprite(Npc::new("kid", TilePosition::new(4, 2)));

        assert_eq!(map.sprite_at(TilePosition::new(4, 2)).map(|n| n.lock().id.clone()).as_deref(), Some("kid"));
        assert!(map.sprite_at(TilePosition::new(0, 0)).is_none());

        let guard = map.get_object("guard").unwrap();
        assert_eq!(guard.lock().get_var("x").unwrap(), Value::from(1));
        assert!(matches!(map.get_object("ghost"), Err(HostError::Lookup { .. })));
    }

    #[test]
    fn test_tile_lookups() {
        let mut map = Tilemap::new("route1");
        map.set_behaviour(TilePosition::new(2, 3), 12);
        map.add_warp(Warp::new(TilePosition::new(0, 5), "town", TilePosition::new(9, 9)));
        let sign = Arc::new(Script::compile("print \"Route 1\";", Origin::inline("sign")).unwrap());
        map.add_event(TilePosition::new(1, 1), Trigger::Investigate, sign);

        assert_eq!(map.behaviour_at(TilePosition::new(2, 3)), Some(12));
        assert_eq!(map.behaviour_at(TilePosition::new(3, 2)), None);
        assert_eq!(map.warp_at(TilePosition::new(0, 5)).map(|w| w.target_map.as_str()), Some("town"));
        assert!(map.event_at(TilePosition::new(1, 1), Trigger::Investigate).is_some());
        assert!(map.event_at(TilePosition::new(1, 1), Trigger::WalkOnto).is_none());
    }

    #[test]
    fn test_warp_action() {
        let warp = Warp::new(TilePosition::new(0, 0), "cave", TilePosition::new(3, 4));
        let runnable = Runnable::from(warp.action());
        assert_eq!(runnable.len(), 3);
        assert_eq!(runnable.origin().script_id, "warp:cave");
    }
}
