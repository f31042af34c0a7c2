//! # World
//!
//! Everything scripts can reach: the player, the loaded maps, the save
//! game and the dialog on screen. The world is the interpreter's host.

use crate::dialog::Dialog;
use crate::map::Tilemap;
use crate::player::Player;
use crate::save::SaveGame;
use crate::error::{GameError, Result};
use ditto_core::TilePosition;
use ditto_scripting::{Host, ObjectHandle};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;

/// Game world
///
/// # Purpose
/// Implements [`Host`] for the script engine and keeps a transcript of
/// everything printed or shown in dialogs, which headless runs report.
pub struct World {
    player: Arc<Mutex<Player>>,
    maps: HashMap<String, Arc<Mutex<Tilemap>>>,
    current_map: String,
    save: Arc<Mutex<SaveGame>>,
    dialog: Option<Arc<Mutex<Dialog>>>,
    auto_advance: bool,
    transcript: Vec<String>,
    pending_map_change: Option<String>,
}

impl World {
    /// Create a world
    ///
    /// # Arguments
    /// * `start` - Map the player starts on
    /// * `position` - Player's starting tile
    pub fn new(start: Tilemap, position: TilePosition) -> Self {
        tracing::debug!("Creating world on map {}", start.name);

        let current_map = start.name.clone();
        let mut maps = HashMap::new();
        maps.insert(current_map.clone(), Arc::new(Mutex::new(start)));

        Self {
            player: Arc::new(Mutex::new(Player::new(position))),
            maps,
            current_map,
            save: Arc::new(Mutex::new(SaveGame::new())),
            dialog: None,
            auto_advance: false,
            transcript: Vec::new(),
            pending_map_change: None,
        }
    }

    /// Close dialogs without player input
    pub fn with_auto_advance(mut self, auto_advance: bool) -> Self {
        self.auto_advance = auto_advance;
        self
    }

    pub fn add_map(&mut self, map: Tilemap) {
        self.maps.insert(map.name.clone(), Arc::new(Mutex::new(map)));
    }

    pub fn map(&self, name: &str) -> Option<&Arc<Mutex<Tilemap>>> {
        self.maps.get(name)
    }

    pub fn current_map_name(&self) -> &str {
        &self.current_map
    }

    pub fn tilemap(&self) -> Result<&Arc<Mutex<Tilemap>>> {
        self.maps
            .get(&self.current_map)
            .ok_or_else(|| GameError::MapNotFound(self.current_map.clone()))
    }

    pub fn player(&self) -> &Arc<Mutex<Player>> {
        &self.player
    }

    pub fn save(&self) -> &Arc<Mutex<SaveGame>> {
        &self.save
    }

    /// The dialog on screen, if any
    pub fn dialog(&self) -> Option<&Arc<Mutex<Dialog>>> {
        self.dialog.as_ref()
    }

    /// Player input on the open dialog
    pub fn advance_dialog(&mut self) {
        if let Some(dialog) = &self.dialog {
            dialog.lock().advance();
        }
    }

    /// Lines printed or shown so far
    pub fn transcript(&self) -> &[String] {
        &self.transcript
    }

    /// Move the player to `position` on the map `name`
    ///
    /// The map's load script runs once the caller takes the change with
    /// [`World::take_map_change`].
    pub fn warp_player(&mut self, name: &str, position: TilePosition) -> Result<()> {
        if !self.maps.contains_key(name) {
            return Err(GameError::MapNotFound(name.to_string()));
        }

        tracing::info!("Warping player to {} ({}, {})", name, position.x, position.y);
        self.player.lock().sprite.position = position;

        if self.current_map != name {
            self.current_map = name.to_string();
            self.pending_map_change = Some(self.current_map.clone());
        }
        Ok(())
    }

    /// The map entered since the last call, if any
    pub fn take_map_change(&mut self) -> Option<String> {
        self.pending_map_change.take()
    }

    /// Advance dialogs and sprites by one frame
    pub fn tick(&mut self) {
        let closed = match &self.dialog {
            Some(dialog) => {
                let mut dialog = dialog.lock();
                dialog.tick();
                dialog.is_closed()
            }
            None => false,
        };
        if closed {
            self.dialog = None;
        }

        if let Some(map) = self.maps.get(&self.current_map) {
            map.lock().tick();
        }
    }
}

impl Host for World {
    fn player(&self) -> Option<ObjectHandle> {
        let player: ObjectHandle = self.player.clone();
        Some(player)
    }

    fn current_map(&self) -> Option<ObjectHandle> {
        let map: ObjectHandle = self.maps.get(&self.current_map)?.clone();
        Some(map)
    }

    fn save_game(&self) -> Option<ObjectHandle> {
        let save: ObjectHandle = self.save.clone();
        Some(save)
    }

    fn open_dialog(&mut self, text: &str, last: bool) -> ObjectHandle {
        tracing::info!(target: "dialog", "{}", text);
        self.transcript.push(text.to_string());

        let dialog = Arc::new(Mutex::new(Dialog::new(text, last, self.auto_advance)));
        self.dialog = Some(Arc::clone(&dialog));
        dialog
    }

    fn print(&mut self, text: &str) {
        tracing::info!(target: "script", "{}", text);
        self.transcript.push(text.to_string());
    }
}
