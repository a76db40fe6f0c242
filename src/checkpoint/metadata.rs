use serde::{Deserialize, Serialize};

use crate::game::Mark;
use crate::training::{ExplorationSchedule, RewardConfig};

/// Metrics snapshot at checkpoint time.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CheckpointMetrics {
    /// Greedy win rate against a random opponent; drives best-N retention.
    pub win_rate: f64,
    pub draw_rate: f64,
    pub average_game_length: f64,
    pub average_td_error: f64,
    pub q_table_states: usize,
}

/// Hyperparameters recorded in checkpoint metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckpointHyperparameters {
    pub learning_rate: f64,
    pub discount_factor: f64,
    pub epsilon: f64,
    pub exploration: ExplorationSchedule,
    pub rewards: RewardConfig,
}

/// Top-level checkpoint metadata written to metadata.json.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckpointMetadata {
    pub episode: usize,
    /// Seconds since the Unix epoch; stamped when the checkpoint is saved.
    pub timestamp: u64,
    pub game: String,
    /// Marks with a stored Q-table.
    pub marks: Vec<Mark>,
    /// Opponent the tables were trained against (`self` for self-play).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub opponent: Option<String>,
    pub metrics: CheckpointMetrics,
    pub hyperparameters: CheckpointHyperparameters,
}
