//! Content factory for building arenas from data files.

use std::path::{Path, PathBuf};

use game_core::{Arena, GameConfig};

use crate::loaders::{ConfigLoader, LoadResult, Roster, ScenarioLoader, ScenarioSpec};

/// Content factory that loads all arena content from a data directory.
///
/// # Directory Structure
///
/// ```text
/// data_dir/
/// ├── game.toml
/// └── scenarios/
///     ├── arena.ron
///     └── gauntlet.ron
/// ```
pub struct ContentFactory {
    data_dir: PathBuf,
}

impl ContentFactory {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    /// Loads tuning from `game.toml`, falling back to the defaults when the
    /// file does not exist.
    pub fn load_config(&self) -> LoadResult<GameConfig> {
        let path = self.data_dir.join("game.toml");
        if !path.exists() {
            return Ok(GameConfig::default());
        }
        ConfigLoader::load(&path)
    }

    /// Loads `scenarios/{name}.ron`.
    pub fn load_scenario(&self, name: &str) -> LoadResult<ScenarioSpec> {
        let path = self.scenario_path(name);
        ScenarioLoader::load(&path)
    }

    /// Loads a scenario and the tuning, and builds a ready-to-run arena.
    pub fn build_arena(&self, name: &str, seed: u64) -> LoadResult<(Arena, Roster)> {
        let config = self.load_config()?;
        let (world, roster) = self.load_scenario(name)?.build_world()?;
        let arena = Arena::new(world, config, seed)
            .map_err(|e| anyhow::anyhow!("Failed to build arena '{}': {}", name, e))?;
        Ok((arena, roster))
    }

    pub fn scenario_path(&self, name: &str) -> PathBuf {
        self.data_dir.join("scenarios").join(format!("{}.ron", name))
    }

    /// Returns the data directory path.
    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }
}
