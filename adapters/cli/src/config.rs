//! Run configuration merged from an optional TOML file and command-line flags.

use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

use serde::Deserialize;
use thiserror::Error;
use tunnel_hive_core::{Command, Difficulty, Direction};

const DEFAULT_SEED: u64 = 0;
const DEFAULT_TICKS: u32 = 1200;
const DEFAULT_TICK_MS: u64 = 50;

/// Failures raised while loading or validating the run configuration.
#[derive(Debug, Error)]
pub(crate) enum ConfigError {
    #[error("failed to read config file {}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config file {}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("tick length must be at least one millisecond")]
    ZeroTickLength,
}

/// Scripted player input understood by the headless runner.
#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub(crate) enum Action {
    MoveNorth,
    MoveEast,
    MoveSouth,
    MoveWest,
    Dig,
    Fire,
}

impl Action {
    /// World command issued for this action.
    pub(crate) const fn command(self) -> Command {
        match self {
            Self::MoveNorth => Command::MovePlayer {
                direction: Direction::North,
            },
            Self::MoveEast => Command::MovePlayer {
                direction: Direction::East,
            },
            Self::MoveSouth => Command::MovePlayer {
                direction: Direction::South,
            },
            Self::MoveWest => Command::MovePlayer {
                direction: Direction::West,
            },
            Self::Dig => Command::Dig,
            Self::Fire => Command::FireLaser,
        }
    }
}

/// Action applied before the tick with the given zero-based index.
#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub(crate) struct ScriptEntry {
    pub(crate) tick: u32,
    pub(crate) action: Action,
}

/// Contents of a TOML configuration file. Every field is optional.
#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct FileConfig {
    pub(crate) difficulty: Option<Difficulty>,
    pub(crate) seed: Option<u64>,
    pub(crate) ticks: Option<u32>,
    pub(crate) tick_ms: Option<u64>,
    pub(crate) script: Vec<ScriptEntry>,
}

impl FileConfig {
    /// Reads and parses the file at `path`.
    pub(crate) fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&contents, path)
    }

    fn parse(contents: &str, path: &Path) -> Result<Self, ConfigError> {
        toml::from_str(contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }
}

/// Values supplied on the command line; they win over the file.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub(crate) struct Overrides {
    pub(crate) difficulty: Option<Difficulty>,
    pub(crate) seed: Option<u64>,
    pub(crate) ticks: Option<u32>,
    pub(crate) tick_ms: Option<u64>,
}

/// Fully resolved settings for a headless session.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct RunConfig {
    pub(crate) difficulty: Difficulty,
    pub(crate) seed: u64,
    pub(crate) ticks: u32,
    pub(crate) tick: Duration,
    /// Sorted by tick; entries sharing a tick keep their file order.
    pub(crate) script: Vec<ScriptEntry>,
}

impl RunConfig {
    pub(crate) fn resolve(overrides: Overrides, file: FileConfig) -> Result<Self, ConfigError> {
        let tick_ms = overrides
            .tick_ms
            .or(file.tick_ms)
            .unwrap_or(DEFAULT_TICK_MS);
        if tick_ms == 0 {
            return Err(ConfigError::ZeroTickLength);
        }

        let mut script = file.script;
        script.sort_by_key(|entry| entry.tick);

        Ok(Self {
            difficulty: overrides
                .difficulty
                .or(file.difficulty)
                .unwrap_or_default(),
            seed: overrides.seed.or(file.seed).unwrap_or(DEFAULT_SEED),
            ticks: overrides.ticks.or(file.ticks).unwrap_or(DEFAULT_TICKS),
            tick: Duration::from_millis(tick_ms),
            script,
        })
    }
}
