//! Match configuration loaded from TOML.

use std::{
    fs, io,
    path::{Path, PathBuf},
    time::Duration,
};

use serde::Deserialize;
use skirmish_core::BoardSize;
use skirmish_presentation::Theme;
use thiserror::Error;

const MIN_BOARD_EDGE: u32 = 4;
const MAX_BOARD_EDGE: u32 = 64;

/// Reasons a configuration cannot be loaded.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("failed to read configuration from {path}")]
    Read {
        /// Location of the file.
        path: PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: io::Error,
    },
    /// The contents are not valid configuration TOML.
    #[error("failed to parse configuration toml")]
    Parse(#[from] toml::de::Error),
    /// A value is outside its accepted range.
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Tunables of a match.
///
/// Every field is optional in TOML; missing ones keep their default. Delays
/// are expressed in milliseconds.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MatchConfig {
    /// Number of cells along one edge of the board.
    pub board_size: u32,
    /// Level whose victory completes the match.
    pub max_level: u32,
    /// Theme per level. Levels past the end reuse the last theme.
    pub themes: Vec<Theme>,
    /// Units fielded by each side at the start of a level.
    pub roster_size: usize,
    /// Random cell draws per unit before deployment scans the band.
    pub placement_attempts: u32,
    /// Pause before the computer acts.
    pub thinking_delay_ms: u64,
    /// Pause after the computer moves a unit.
    pub move_delay_ms: u64,
    /// Pause between the final blow of a round and its outcome.
    pub round_end_delay_ms: u64,
    /// Longest wait for a damage effect to finish.
    pub effect_timeout_ms: u64,
    /// Seed for deterministic matches. Entropy is used when absent.
    pub seed: Option<u64>,
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            board_size: 8,
            max_level: 4,
            themes: Theme::ALL.to_vec(),
            roster_size: 2,
            placement_attempts: 50,
            thinking_delay_ms: 1000,
            move_delay_ms: 500,
            round_end_delay_ms: 1500,
            effect_timeout_ms: 3000,
            seed: None,
        }
    }
}

impl MatchConfig {
    /// Parses and validates a configuration from TOML text.
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a configuration file.
    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&contents)
    }

    /// Checks that the values describe a playable match.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(MIN_BOARD_EDGE..=MAX_BOARD_EDGE).contains(&self.board_size) {
            return Err(ConfigError::Invalid(format!(
                "board_size must be between {MIN_BOARD_EDGE} and {MAX_BOARD_EDGE}, got {}",
                self.board_size
            )));
        }
        if self.max_level == 0 {
            return Err(ConfigError::Invalid("max_level must be at least 1".to_owned()));
        }
        if self.themes.is_empty() {
            return Err(ConfigError::Invalid("themes must not be empty".to_owned()));
        }
        let band = 2 * self.board_size as usize;
        if self.roster_size == 0 || self.roster_size > band {
            return Err(ConfigError::Invalid(format!(
                "roster_size must be between 1 and {band}, got {}",
                self.roster_size
            )));
        }
        Ok(())
    }

    /// Board the match is played on.
    #[must_use]
    pub const fn board(&self) -> BoardSize {
        BoardSize::new(self.board_size)
    }

    /// Theme of the provided level.
    #[must_use]
    pub fn theme_for_level(&self, level: u32) -> Theme {
        let index = (level.max(1) - 1) as usize;
        self.themes
            .get(index)
            .or_else(|| self.themes.last())
            .copied()
            .unwrap_or_default()
    }

    /// Pause before the computer acts.
    #[must_use]
    pub const fn thinking_delay(&self) -> Duration {
        Duration::from_millis(self.thinking_delay_ms)
    }

    /// Pause after the computer moves a unit.
    #[must_use]
    pub const fn move_delay(&self) -> Duration {
        Duration::from_millis(self.move_delay_ms)
    }

    /// Pause before a finished round is resolved.
    #[must_use]
    pub const fn round_end_delay(&self) -> Duration {
        Duration::from_millis(self.round_end_delay_ms)
    }

    /// Longest wait for a damage effect.
    #[must_use]
    pub const fn effect_timeout(&self) -> Duration {
        Duration::from_millis(self.effect_timeout_ms)
    }
}
