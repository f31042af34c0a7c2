//! Ditto - headless script runner
//!
//! Compiles one script from a resource file, runs it against an empty
//! world and ticks the game until the script and everything it queued
//! has finished.
//!
//! Usage: `ditto <script-file> <script-id> [config-file]`

use anyhow::{bail, Context};
use ditto_config::{EngineConfig, DEFAULT_CONFIG_FILE};
use ditto_core::TilePosition;
use ditto_game::{Game, GameError, Tilemap, World};
use ditto_scripting::{BehaviourTable, Script};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

/// Command line arguments
#[derive(Debug, PartialEq, Eq)]
struct Args {
    script_file: PathBuf,
    script_id: String,
    config_file: PathBuf,
}

impl Args {
    fn parse(mut args: impl Iterator<Item = String>) -> anyhow::Result<Self> {
        let (Some(script_file), Some(script_id)) = (args.next(), args.next()) else {
            bail!("usage: ditto <script-file> <script-id> [config-file]");
        };
        let config_file = args.next().unwrap_or_else(|| DEFAULT_CONFIG_FILE.to_string());

        Ok(Self {
            script_file: script_file.into(),
            script_id,
            config_file: config_file.into(),
        })
    }
}

/// Frame period for a tick rate in frames per second
fn frame_period(tick_rate: u32) -> Duration {
    Duration::from_secs(1) / tick_rate.max(1)
}

/// Empty single-map world whose dialogs close on their own
fn headless_world() -> World {
    World::new(Tilemap::new("main"), TilePosition::default()).with_auto_advance(true)
}

fn load_behaviours(config: &EngineConfig) -> BehaviourTable {
    let path = config.behaviours_path();
    if !path.exists() {
        info!("No behaviour table at {}", path.display());
        return BehaviourTable::new();
    }

    match BehaviourTable::load(&path, &config.data_path) {
        Ok(table) => table,
        Err(e) => {
            warn!("Failed to load behaviours: {}", e);
            BehaviourTable::new()
        }
    }
}

/// Write the AST and command listing of every compiled script into `dir`
fn dump_scripts(dir: &Path, entry: &Script, behaviours: &BehaviourTable) -> ditto_scripting::Result<usize> {
    entry.dump(dir)?;
    for script in behaviours.scripts() {
        script.dump(dir)?;
    }
    Ok(1 + behaviours.len())
}

/// Whether anything is running or waiting to run
fn has_work(game: &Game) -> bool {
    game.engine().is_active() || game.engine().queued() > 0
}

/// Log an aborted script for content authors
fn report(err: &GameError) {
    warn!("Script aborted, continuing with queued scripts: {}", err);
    for line in err.describe() {
        warn!("    {}", line);
    }
}

/// Advance one frame, logging a failed script instead of stopping
///
/// # Returns
/// Whether the frame ran without a script error
fn tick_logged(game: &mut Game) -> bool {
    match game.tick() {
        Ok(()) => true,
        Err(err) => {
            report(&err);
            false
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse(std::env::args().skip(1))?;

    // Read options before logging starts so the filter can come from them
    let loaded = EngineConfig::load_from_file(&args.config_file);
    let config = loaded.as_ref().cloned().unwrap_or_default();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level)),
        )
        .init();

    info!("Ditto script runner starting up");
    if let Err(e) = &loaded {
        warn!("Failed to load {}: {}", args.config_file.display(), e);
        warn!("Using default configuration");
    }
    config.display();

    let script = Script::from_file(&args.script_file, &args.script_id)
        .with_context(|| format!("loading script {} from {}", args.script_id, args.script_file.display()))?;

    let behaviours = load_behaviours(&config);

    if let Some(dir) = &config.dump_dir {
        let dumped = dump_scripts(dir, &script, &behaviours).context("dumping compiled scripts")?;
        info!("Dumped {} scripts to {}", dumped, dir.display());
    }

    let mut game = Game::with_behaviours(headless_world(), behaviours);
    let mut failures = 0usize;
    if let Err(err) = game.run(script, None) {
        report(&err);
        failures += 1;
    }

    let mut interval = tokio::time::interval(frame_period(config.tick_rate));
    let mut ticks = 0u64;
    while has_work(&game) {
        if ticks >= config.max_ticks {
            error!("Script still running after {} ticks, giving up", ticks);
            bail!("script did not finish within {} ticks", config.max_ticks);
        }

        interval.tick().await;
        if !tick_logged(&mut game) {
            failures += 1;
        }
        ticks += 1;
    }

    info!(
        "Script {} finished after {} ticks, {} lines of output",
        args.script_id,
        ticks,
        game.world().transcript().len()
    );

    if failures > 0 {
        bail!("{} script(s) aborted with errors", failures);
    }
    Ok(())
}
