//! # Game Loop
//!
//! Ties the world to the script engine: player interaction starts
//! scripts, map changes run load scripts, and each frame advances both.

use crate::error::{GameError, Result};
use crate::map::Warp;
use crate::pokemon::Pokemon;
use crate::world::World;
use ditto_core::{Direction, TilePosition};
use ditto_scripting::builtins::{number_arg, text_arg};
use ditto_scripting::{
    handle, BehaviourTable, CommandContext, HostError, ObjectHandle, Runnable, ScriptEngine, Trigger, Value,
};
use std::sync::Arc;

/// A running game
///
/// # Purpose
/// Owns the world and the interpreter that drives it. Adds the
/// game-specific commands `generatePokemon` and `warp` to the defaults.
pub struct Game {
    world: World,
    engine: ScriptEngine<World>,
}

impl Game {
    /// Create a game without tile behaviours
    pub fn new(world: World) -> Self {
        Self::with_behaviours(world, BehaviourTable::new())
    }

    /// Create a game
    ///
    /// # Arguments
    /// * `world` - World the scripts act on
    /// * `behaviours` - Scripts for tile behaviour codes
    pub fn with_behaviours(world: World, behaviours: BehaviourTable) -> Self {
        let mut engine = ScriptEngine::<World>::new().with_behaviours(behaviours);
        engine.register_command("generatePokemon", command_generate_pokemon);
        engine.register_command("warp", command_warp);

        Self { world, engine }
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }

    pub fn engine(&self) -> &ScriptEngine<World> {
        &self.engine
    }

    /// Run a script or native action, queueing it behind an active one
    pub fn run(&mut self, runnable: impl Into<Runnable>, caller: Option<ObjectHandle>) -> Result<()> {
        self.engine.run(runnable, caller, &mut self.world)?;
        self.sync_map()
    }

    /// Run the new-game script
    pub fn new_game(&mut self, script: impl Into<Runnable>) -> Result<()> {
        tracing::info!("Starting new game on {}", self.world.current_map_name());
        self.run(script, None)
    }

    /// Advance the world and the interpreter by one frame
    pub fn tick(&mut self) -> Result<()> {
        self.world.tick();
        self.engine.tick(&mut self.world)?;
        self.sync_map()
    }

    /// Interact with whatever the player is facing
    ///
    /// NPCs take precedence over tile events. The NPC becomes the
    /// script's caller.
    ///
    /// # Returns
    /// Whether a script was started or queued
    pub fn investigate(&mut self) -> Result<bool> {
        let target = {
            let player = self.world.player().lock();
            if !player.can_move() {
                return Ok(false);
            }
            player.sprite.facing()
        };

        let map = Arc::clone(self.world.tilemap()?);
        let found = {
            let map = map.lock();
            match map.sprite_at(target) {
                Some(npc) => {
                    let script = npc.lock().script(Trigger::Investigate).cloned();
                    let caller: ObjectHandle = npc.clone();
                    script.map(|script| (script, Some(caller)))
                }
                None => map
                    .event_at(target, Trigger::Investigate)
                    .cloned()
                    .map(|script| (script, None)),
            }
        };

        match found {
            Some((script, caller)) => {
                self.run(script, caller)?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Turn the player and step one tile unless something stands there
    ///
    /// # Returns
    /// Whether the player moved
    pub fn step_player(&mut self, direction: Direction) -> Result<bool> {
        let target = {
            let mut player = self.world.player().lock();
            if !player.can_move() {
                return Ok(false);
            }
            player.sprite.direction = direction;
            player.sprite.facing()
        };

        if self.world.tilemap()?.lock().sprite_at(target).is_some() {
            return Ok(false);
        }

        self.walk_onto(target)?;
        Ok(true)
    }

    /// Put the player on `position` and fire what the tile holds
    ///
    /// A warp replaces any other tile effect. Otherwise the walk-onto
    /// event runs first, then the tile's behaviour script.
    pub fn walk_onto(&mut self, position: TilePosition) -> Result<()> {
        self.world.player().lock().sprite.position = position;

        let (warp, event, code) = {
            let map = self.world.tilemap()?.lock();
            (
                map.warp_at(position).cloned(),
                map.event_at(position, Trigger::WalkOnto).cloned(),
                map.behaviour_at(position),
            )
        };

        if let Some(warp) = warp {
            return self.activate_warp(&warp);
        }
        if let Some(script) = event {
            self.run(script, None)?;
        }
        if let Some(code) = code {
            self.engine.process_behaviour(code, &mut self.world)?;
            self.sync_map()?;
        }
        Ok(())
    }

    /// Run a warp's transition
    pub fn activate_warp(&mut self, warp: &Warp) -> Result<()> {
        tracing::debug!("Activating warp to {}", warp.target_map);
        self.run(warp.action(), None)
    }

    /// Run the load script of the map `name`, with the map as caller
    pub fn load_map(&mut self, name: &str) -> Result<()> {
        let map = self
            .world
            .map(name)
            .cloned()
            .ok_or_else(|| GameError::MapNotFound(name.to_string()))?;

        let script = map.lock().load_script().cloned();
        if let Some(script) = script {
            tracing::debug!("Running load script for {}", name);
            let caller: ObjectHandle = map;
            self.engine.run(script, Some(caller), &mut self.world)?;
        }
        Ok(())
    }

    /// Load the map the player just entered, if any
    ///
    /// A map change made by a load script is picked up on the next call.
    fn sync_map(&mut self) -> Result<()> {
        match self.world.take_map_change() {
            Some(name) => self.load_map(&name),
            None => Ok(()),
        }
    }
}

/// `generatePokemon(species, level)`: a new pokemon handle
fn command_generate_pokemon(
    _ctx: &mut CommandContext<'_, World>,
    args: &[Value],
) -> std::result::Result<Value, HostError> {
    let species = text_arg("generatePokemon", args, 0)?;
    let level = number_arg("generatePokemon", args, 1)?;
    Ok(Value::from(handle(Pokemon::new(species, level))))
}

/// `warp(map, x, y)`: move the player to another map
fn command_warp(
    ctx: &mut CommandContext<'_, World>,
    args: &[Value],
) -> std::result::Result<Value, HostError> {
    let map = text_arg("warp", args, 0)?;
    let x = coordinate_arg(args, 1)?;
    let y = coordinate_arg(args, 2)?;

    ctx.host
        .warp_player(&map, TilePosition::new(x, y))
        .map_err(|err| HostError::arguments("warp", err.to_string()))?;
    Ok(Value::None)
}

fn coordinate_arg(args: &[Value], index: usize) -> std::result::Result<i32, HostError> {
    let value = number_arg("warp", args, index)?;
    i32::try_from(value).map_err(|_| HostError::arguments("warp", format!("coordinate out of range: {}", value)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::map::Tilemap;
    use crate::npc::Npc;
    use ditto_scripting::{Origin, Script, ScriptError, State};

    fn script(id: &str, source: &str) -> Arc<Script> {
        Arc::new(Script::compile(source, Origin::inline(id)).unwrap())
    }

    /// Town with a guard below the player's start and a cave to warp to
    fn game() -> Game {
        let mut town = Tilemap::new("town");
        town.add_sprite(Npc::new("guard", TilePosition::new(0, 1)).with_script(
            Trigger::Investigate,
            script("guard", "lock();\nfacePlayer();\ndialog(\"Halt!\", 1);\nunlock();"),
        ));
        town.add_warp(Warp::new(TilePosition::new(2, 0), "cave", TilePosition::new(5, 5)));

        let mut cave = Tilemap::new("cave");
        cave.set_load_script(script("cave", "print \"Entered \" + MAP.name;"));

        let mut world = World::new(town, TilePosition::new(0, 0)).with_auto_advance(true);
        world.add_map(cave);
        Game::new(world)
    }

    fn run_until_idle(game: &mut Game) {
        for _ in 0..32 {
            if !game.engine().is_active() {
                return;
            }
            game.tick().unwrap();
        }
        panic!("script still active");
    }

    fn guard_var(game: &Game, name: &str) -> Value {
        let map = game.world().tilemap().unwrap().lock();
        let guard = map.sprite("guard").unwrap().lock();
        ditto_scripting::Scriptable::get_var(&*guard, name).unwrap()
    }

    #[test]
    fn test_investigate_npc() {
        let mut game = game();
        assert!(game.investigate().unwrap());

        assert_eq!(game.engine().state(), State::Suspended);
        assert!(!game.world().player().lock().can_move());
        assert_eq!(guard_var(&game, "direction"), Value::from("up"));
        assert_eq!(guard_var(&game, "locked"), Value::Bool(true));

        run_until_idle(&mut game);
        assert!(game.world().player().lock().can_move());
        assert_eq!(game.world().transcript(), ["Halt!".to_string()]);
    }

    #[test]
    fn test_investigate_nothing() {
        let mut game = game();
        game.world().player().lock().sprite.direction = Direction::Up;
        assert!(!game.investigate().unwrap());
        assert_eq!(game.engine().state(), State::Idle);
    }

    #[test]
    fn test_generate_pokemon_into_party() {
        let mut game = game();
        let source = "p = generatePokemon(\"pidgey\", 5);\nPLAYER.addToParty(p);\nprint PLAYER.PARTY.size;";
        game.run(script("gift", source), None).unwrap();

        assert_eq!(game.world().transcript(), ["1".to_string()]);
        let party = game.world().player().lock().party().clone();
        assert_eq!(party.lock().len(), 1);
    }

    #[test]
    fn test_warp_runs_load_script() {
        let mut game = game();
        assert!(game.step_player(Direction::Right).unwrap());
        assert!(game.step_player(Direction::Right).unwrap());

        assert_eq!(game.world().current_map_name(), "cave");
        assert_eq!(game.world().player().lock().sprite.position, TilePosition::new(5, 5));
        assert!(game.world().player().lock().can_move());
        assert_eq!(game.world().transcript(), ["Entered cave".to_string()]);
    }

    #[test]
    fn test_load_script_queues_behind_active_script() {
        let mut game = game();
        game.run(script("fall", "warp(\"cave\", 1, 1);\ndialog(\"Watch your step\", 1);"), None)
            .unwrap();
        assert_eq!(game.engine().state(), State::Suspended);
        assert_eq!(game.engine().queued(), 1);

        run_until_idle(&mut game);
        assert_eq!(
            game.world().transcript(),
            ["Watch your step".to_string(), "Entered cave".to_string()]
        );
    }

    #[test]
    fn test_step_blocked_by_npc() {
        let mut game = game();
        assert!(!game.step_player(Direction::Down).unwrap());
        assert_eq!(game.world().player().lock().sprite.position, TilePosition::new(0, 0));
    }

    #[test]
    fn test_behaviour_on_walk_onto() {
        let mut behaviours = BehaviourTable::new();
        behaviours.insert(12, Script::compile("print \"ledge\";", Origin::inline("ledge")).unwrap());

        let mut town = Tilemap::new("town");
        town.set_behaviour(TilePosition::new(0, 2), 12);
        let mut game = Game::with_behaviours(World::new(town, TilePosition::default()), behaviours);

        game.walk_onto(TilePosition::new(0, 2)).unwrap();
        assert_eq!(game.world().transcript(), ["ledge".to_string()]);
        game.walk_onto(TilePosition::new(0, 3)).unwrap();
        assert_eq!(game.world().transcript().len(), 1);
    }

    #[test]
    fn test_npc_walk_suspends_script() {
        let mut game = game();
        game.run(script("patrol", "MAP.guard.walk(\"right\");\nprint MAP.guard.x;"), None)
            .unwrap();
        assert_eq!(game.engine().state(), State::Suspended);
        assert!(game.world().transcript().is_empty());

        run_until_idle(&mut game);
        assert_eq!(game.world().transcript(), ["1".to_string()]);
    }

    #[test]
    fn test_script_error_surfaces() {
        let mut game = game();
        let err = game.run(script("bad", "print PLAYER.PARTY.ghost;"), None).unwrap_err();
        let GameError::Script(script_err) = &err else {
            panic!("expected a script error, got {err:?}");
        };
        assert!(matches!(script_err, ScriptError::Name { name, .. } if name == "ghost"));
        assert_eq!(script_err.location().map(|l| l.script_id.as_str()), Some("bad"));
        assert_eq!(err.describe()[0], "Name error!");
        assert_eq!(game.engine().state(), State::Idle);
    }

    #[test]
    fn test_warp_to_unknown_map() {
        let mut game = game();
        let err = game.run(script("lost", "warp(\"sea\", 0, 0);"), None).unwrap_err();
        assert!(matches!(err, GameError::Script(ScriptError::Command { ref command, .. }) if command == "warp"));
        assert_eq!(game.world().current_map_name(), "town");
    }
}
