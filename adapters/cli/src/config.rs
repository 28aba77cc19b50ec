//! Layered configuration: defaults, then an optional TOML file, then flags.

use std::{
    fs, io,
    path::{Path, PathBuf},
};

use gem_maze_system_session::GameConfig;
use thiserror::Error;

/// Errors raised while assembling the game configuration.
#[derive(Debug, Error)]
pub(crate) enum ConfigError {
    /// The configuration file could not be read.
    #[error("failed to read {}", path.display())]
    Read {
        /// File that was requested.
        path: PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: io::Error,
    },
    /// The configuration file is not a valid game configuration.
    #[error("failed to parse {}", path.display())]
    Parse {
        /// File that was requested.
        path: PathBuf,
        /// Underlying TOML failure.
        #[source]
        source: toml::de::Error,
    },
    /// A game needs at least one life.
    #[error("lives must be positive")]
    NoLives,
}

/// Values supplied on the command line, applied over the file.
#[derive(Clone, Copy, Debug, Default)]
pub(crate) struct Overrides {
    pub(crate) tick_ms: Option<u64>,
    pub(crate) lives: Option<u32>,
    pub(crate) seed: Option<u64>,
}

/// Reads the optional file and applies the overrides.
pub(crate) fn load(path: Option<&Path>, overrides: Overrides) -> Result<GameConfig, ConfigError> {
    let base = match path {
        Some(path) => {
            let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
                path: path.to_path_buf(),
                source,
            })?;
            parse(&text, path)?
        }
        None => GameConfig::default(),
    };
    apply(base, overrides)
}

fn parse(text: &str, path: &Path) -> Result<GameConfig, ConfigError> {
    toml::from_str(text).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

fn apply(mut config: GameConfig, overrides: Overrides) -> Result<GameConfig, ConfigError> {
    if let Some(tick_ms) = overrides.tick_ms {
        config.tick_delay_ms = tick_ms;
    }
    if let Some(lives) = overrides.lives {
        config.lives = lives;
    }
    if let Some(seed) = overrides.seed {
        config.seed = Some(seed);
    }

    if config.lives == 0 {
        return Err(ConfigError::NoLives);
    }
    Ok(config)
}
