use std::path::Path;

use crate::ai::QLearningConfig;
use crate::checkpoint::CheckpointManagerConfig;
use crate::error::ConfigError;
use crate::game::GameKind;
use crate::training::trainer::TrainerConfig;

/// Search depth per game. `None` searches to the end of the game.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    pub tic_tac_toe_depth: Option<usize>,
    pub connect_four_depth: Option<usize>,
}

impl Default for SearchConfig {
    fn default() -> Self {
        SearchConfig {
            tic_tac_toe_depth: None,
            connect_four_depth: Some(4),
        }
    }
}

impl SearchConfig {
    pub fn depth_for(&self, game: GameKind) -> Option<usize> {
        match game {
            GameKind::TicTacToe => self.tic_tac_toe_depth,
            GameKind::ConnectFour => self.connect_four_depth,
        }
    }
}

/// Top-level application configuration, loadable from TOML.
#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub qlearning: QLearningConfig,
    pub search: SearchConfig,
    pub training: TrainerConfig,
    pub checkpoint: CheckpointManagerConfig,
}

impl AppConfig {
    /// Load configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::FileRead {
            path: path.to_path_buf(),
            source: e,
        })?;
        let config: AppConfig = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML file, falling back to defaults if the file
    /// does not exist.
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        if path.exists() {
            Self::load(path)
        } else {
            log::warn!("config file '{}' not found, using defaults", path.display());
            Ok(Self::default())
        }
    }

    /// Validate configuration values.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let q = &self.qlearning;
        if !(q.learning_rate > 0.0 && q.learning_rate <= 1.0) {
            return Err(ConfigError::Validation(
                "qlearning.learning_rate must be in (0, 1]".into(),
            ));
        }
        if !(0.0..=1.0).contains(&q.discount_factor) {
            return Err(ConfigError::Validation(
                "qlearning.discount_factor must be in [0, 1]".into(),
            ));
        }
        if !(0.0..=1.0).contains(&q.epsilon) {
            return Err(ConfigError::Validation(
                "qlearning.epsilon must be in [0, 1]".into(),
            ));
        }

        for (name, depth) in [
            ("search.tic_tac_toe_depth", self.search.tic_tac_toe_depth),
            ("search.connect_four_depth", self.search.connect_four_depth),
        ] {
            if depth == Some(0) {
                return Err(ConfigError::Validation(format!("{name} must be >= 1")));
            }
        }

        if self.training.num_episodes == 0 {
            return Err(ConfigError::Validation(
                "training.num_episodes must be > 0".into(),
            ));
        }
        if self.training.log_interval == 0 {
            return Err(ConfigError::Validation(
                "training.log_interval must be > 0".into(),
            ));
        }
        if self.training.eval_interval == 0 {
            return Err(ConfigError::Validation(
                "training.eval_interval must be > 0".into(),
            ));
        }
        if self.training.eval_games == 0 {
            return Err(ConfigError::Validation(
                "training.eval_games must be > 0".into(),
            ));
        }
        self.training
            .exploration
            .validate()
            .map_err(|msg| ConfigError::Validation(format!("training.exploration: {msg}")))?;

        if self.checkpoint.keep_last_n == 0 {
            return Err(ConfigError::Validation(
                "checkpoint.keep_last_n must be >= 1".into(),
            ));
        }

        Ok(())
    }

    /// Generate a TOML string with all default values (useful for creating
    /// example config files).
    pub fn default_toml() -> String {
        toml::to_string_pretty(&AppConfig::default()).unwrap_or_default()
    }
}
