//! Game configuration loader.

use std::path::Path;

use game_core::GameConfig;

use crate::loaders::{LoadResult, read_file};

/// Loader for game configuration from TOML files.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Loads a [`GameConfig`] from a TOML file. Missing tables and keys keep
    /// their defaults; the result is validated before it is returned.
    pub fn load(path: &Path) -> LoadResult<GameConfig> {
        let content = read_file(path)?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> LoadResult<GameConfig> {
        let config: GameConfig = toml::from_str(content)
            .map_err(|e| anyhow::anyhow!("Failed to parse config TOML: {}", e))?;
        config
            .validate()
            .map_err(|e| anyhow::anyhow!("Invalid game config: {}", e))?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use game_core::SlowPolicy;
    use tempfile::NamedTempFile;

    use super::*;

    #[test]
    fn partial_tables_keep_defaults() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            "[status]\nslow_policy = \"refresh\"\n\n[ai]\nmax_cover_distance = 200.0"
        )
        .unwrap();

        let config = ConfigLoader::load(file.path()).unwrap();
        assert_eq!(config.status.slow_policy, SlowPolicy::Refresh);
        assert_eq!(config.ai.max_cover_distance, Some(200.0));
        assert_eq!(config.combat, GameConfig::default().combat);
    }

    #[test]
    fn empty_file_is_the_default_config() {
        assert_eq!(ConfigLoader::parse("").unwrap(), GameConfig::default());
    }

    #[test]
    fn invalid_values_are_rejected() {
        let error = ConfigLoader::parse("[status]\nslow_factor = 2.5").unwrap_err();
        assert!(error.to_string().contains("Invalid game config"));
    }

    #[test]
    fn missing_file_names_the_path() {
        let error = ConfigLoader::load(Path::new("/nonexistent/game.toml")).unwrap_err();
        assert!(error.to_string().contains("/nonexistent/game.toml"));
    }
}
