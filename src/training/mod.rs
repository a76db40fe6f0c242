//! Q-learning training: exploration schedules, reward shaping, training
//! episodes, rolling metrics and the trainer loop.

pub mod episode;
pub mod metrics;
pub mod schedule;
pub mod trainer;

pub use episode::{play_training_episode, EpisodeTrace, RewardConfig, Seat};
pub use metrics::{EpisodeResult, TrainingMetrics};
pub use schedule::ExplorationSchedule;
pub use trainer::{Trainer, TrainerConfig, TrainingReport};
