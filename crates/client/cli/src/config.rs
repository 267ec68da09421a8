//! Run configuration read from the environment.
use std::env;
use std::path::PathBuf;

use runtime::PathfindingMode;

/// Everything a headless run needs.
#[derive(Clone, Debug)]
pub struct CliConfig {
    pub scenario: PathBuf,
    /// Tuning file; the defaults apply when it does not exist.
    pub config: PathBuf,
    pub ticks: u64,
    pub tick_ms: u64,
    /// Random when unset.
    pub seed: Option<u64>,
    pub log_dir: Option<PathBuf>,
    pub pathfinding: PathfindingMode,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            scenario: PathBuf::from("data/scenarios/arena.ron"),
            config: PathBuf::from("data/game.toml"),
            ticks: 1800,
            tick_ms: 16,
            seed: None,
            log_dir: None,
            pathfinding: PathfindingMode::Async,
        }
    }
}

impl CliConfig {
    /// Construct configuration from process environment variables.
    ///
    /// Environment variables:
    /// - `ARENA_SCENARIO` - Scenario RON file (default: data/scenarios/arena.ron)
    /// - `ARENA_CONFIG` - Tuning TOML file (default: data/game.toml)
    /// - `ARENA_TICKS` - Ticks to run (default: 1800)
    /// - `ARENA_TICK_MS` - Logical tick length (default: 16)
    /// - `ARENA_SEED` - Seed of the arena's random stream (default: random)
    /// - `ARENA_LOG_DIR` - Also write logs to `arena.log` in this directory
    /// - `ARENA_SYNC_PATHS` - Search paths on the simulation task (default: false)
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(path) = env::var("ARENA_SCENARIO") {
            config.scenario = PathBuf::from(path);
        }
        if let Ok(path) = env::var("ARENA_CONFIG") {
            config.config = PathBuf::from(path);
        }
        if let Some(ticks) = read_env::<u64>("ARENA_TICKS") {
            config.ticks = ticks;
        }
        if let Some(tick_ms) = read_env::<u64>("ARENA_TICK_MS") {
            config.tick_ms = tick_ms.max(1);
        }
        config.seed = read_env::<u64>("ARENA_SEED");
        config.log_dir = env::var("ARENA_LOG_DIR").ok().map(PathBuf::from);

        if read_env::<bool>("ARENA_SYNC_PATHS").unwrap_or(false) {
            config.pathfinding = PathfindingMode::Deferred;
        }

        config
    }
}

fn read_env<T>(key: &str) -> Option<T>
where
    T: std::str::FromStr,
{
    env::var(key).ok()?.parse().ok()
}
