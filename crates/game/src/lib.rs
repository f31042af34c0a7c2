//! # Ditto Game Layer
//!
//! Headless game objects the scripting engine acts on.
//!
//! ## Modules
//!
//! - `error` - Game error type
//! - `sprite` - Position and facing shared by player and NPCs
//! - `player` - The player character and party access
//! - `pokemon` - Pokemon and the party
//! - `npc` - Map sprites and their scripts
//! - `map` - Tilemaps, warps and tile events
//! - `dialog` - Dialog boxes that suspend scripts
//! - `save` - Save game flags
//! - `world` - The script host
//! - `game` - Frame loop and player interaction

pub mod error;
pub mod sprite;
pub mod player;
pub mod pokemon;
pub mod npc;
pub mod map;
pub mod dialog;
pub mod save;
pub mod world;
pub mod game;

// Re-export commonly used types
pub use error::{GameError, Result};
pub use player::Player;
pub use pokemon::{Party, Pokemon};
pub use npc::Npc;
pub use map::{ScriptEvent, Tilemap, Warp};
pub use dialog::Dialog;
pub use save::SaveGame;
pub use world::World;
pub use game::Game;
