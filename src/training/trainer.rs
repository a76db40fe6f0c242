use std::path::PathBuf;

use crate::ai::{Agent, QLearningAgent, RandomAgent};
use crate::arena::{play_match, MatchSummary};
use crate::checkpoint::{
    CheckpointHyperparameters, CheckpointManager, CheckpointManagerConfig, CheckpointMetadata,
    CheckpointMetrics,
};
use crate::error::{IllegalMoveError, TrainingError};
use crate::game::{BoardState, Mark};
use crate::training::episode::{episode_seed, play_training_episode, RewardConfig, Seat};
use crate::training::metrics::TrainingMetrics;
use crate::training::schedule::ExplorationSchedule;

/// Trainer configuration.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct TrainerConfig {
    pub num_episodes: usize,
    pub log_interval: usize,
    pub eval_interval: usize,
    pub eval_games: usize,
    /// Episodes between checkpoints; 0 disables checkpointing. When enabled
    /// the last episode of a run is always checkpointed.
    pub checkpoint_interval: usize,
    /// Base seed for evaluation opponents; `None` seeds from the OS.
    pub seed: Option<u64>,
    pub exploration: ExplorationSchedule,
    pub rewards: RewardConfig,
}

impl Default for TrainerConfig {
    fn default() -> Self {
        TrainerConfig {
            num_episodes: 50_000,
            log_interval: 1000,
            eval_interval: 5000,
            eval_games: 200,
            checkpoint_interval: 10_000,
            seed: None,
            exploration: ExplorationSchedule::default(),
            rewards: RewardConfig::default(),
        }
    }
}

/// Summary of a finished training run.
#[derive(Debug, Clone)]
pub struct TrainingReport {
    /// Number of episodes played in this run.
    pub episodes: usize,
    /// Index of the last episode played (continues from `start_episode`).
    pub last_episode: usize,
    /// Greedy win rate against a random opponent after training, per learner.
    pub final_win_rates: Vec<(Mark, f64)>,
    pub window_win_rate: f64,
    pub window_draw_rate: f64,
    /// `(episode, greedy win rate vs Random)` for each periodic evaluation,
    /// from X's side in self-play.
    pub evaluations: Vec<(usize, f64)>,
    pub checkpoints: Vec<PathBuf>,
}

/// Tabular Q-learning trainer, either against a fixed opponent or in
/// self-play between two learners.
pub struct Trainer {
    config: TrainerConfig,
    checkpoint_manager: Option<CheckpointManager>,
}

impl Trainer {
    pub fn new(config: TrainerConfig, checkpoint: CheckpointManagerConfig) -> Self {
        let checkpoint_manager =
            (config.checkpoint_interval > 0).then(|| CheckpointManager::new(checkpoint));
        Trainer {
            config,
            checkpoint_manager,
        }
    }

    pub fn config(&self) -> &TrainerConfig {
        &self.config
    }

    /// Train `learner` against a fixed `opponent`, numbering episodes from
    /// `start_episode + 1`.
    pub fn train_against<B: BoardState + Default>(
        &self,
        learner: &mut QLearningAgent<B>,
        opponent: &mut dyn Agent<B>,
        start_episode: usize,
    ) -> Result<TrainingReport, TrainingError> {
        let learner_mark = learner.mark();
        let opponent_name = opponent.name().to_string();
        let mut metrics = TrainingMetrics::new(learner_mark);
        let mut evaluations = Vec::new();
        let mut checkpoints = Vec::new();

        let end_episode = start_episode + self.config.num_episodes;
        log::info!(
            "Starting {} Q-learning as {} vs {} for {} episodes ({}..={})",
            B::NAME,
            learner_mark,
            opponent_name,
            self.config.num_episodes,
            start_episode + 1,
            end_episode
        );

        for episode in start_episode + 1..=end_episode {
            learner.set_epsilon(self.config.exploration.epsilon(episode));

            let (x, o) = match learner_mark {
                Mark::X => (Seat::Learner(&mut *learner), Seat::Fixed(&mut *opponent)),
                Mark::O => (Seat::Fixed(&mut *opponent), Seat::Learner(&mut *learner)),
            };
            let trace = play_training_episode(B::default(), x, o, &self.config.rewards)?;
            for td in trace.td_errors {
                metrics.record_update(td);
            }
            metrics.record_episode(trace.result);

            self.log_progress(episode, end_episode, learner.epsilon(), &metrics);

            let mut eval = None;
            if self.is_due(episode, self.config.eval_interval) {
                let summary = self.evaluate(learner, episode)?;
                let win_rate = summary.win_rate(learner_mark);
                log::info!(
                    "  >> Eval vs Random ({} games): {:.1}% win rate",
                    self.config.eval_games,
                    win_rate * 100.0
                );
                evaluations.push((episode, win_rate));
                eval = Some(summary);
            }

            if let Some(manager) = self.checkpoint_due(episode, end_episode) {
                let eval = match eval {
                    Some(summary) => summary,
                    None => self.evaluate(learner, episode)?,
                };
                let metadata = self.checkpoint_metadata(
                    learner,
                    &eval,
                    &metrics,
                    episode,
                    Some(opponent_name.clone()),
                );
                let path = manager.save_checkpoint(&[(learner_mark, learner.table())], metadata)?;
                checkpoints.push(path);
            }
        }

        let final_eval = self.evaluate(learner, end_episode)?;
        let final_win_rate = final_eval.win_rate(learner_mark);
        log::info!(
            "Training complete: {} episodes, {} states, final eval vs Random {:.1}% win rate",
            metrics.total_episodes(),
            learner.table().len(),
            final_win_rate * 100.0
        );

        let window = self.config.log_interval.max(1);
        Ok(TrainingReport {
            episodes: metrics.total_episodes(),
            last_episode: end_episode,
            final_win_rates: vec![(learner_mark, final_win_rate)],
            window_win_rate: metrics.win_rate(window),
            window_draw_rate: metrics.draw_rate(window),
            evaluations,
            checkpoints,
        })
    }

    /// Train two learners against each other. Metrics are from X's side.
    pub fn train_self_play<B: BoardState + Default>(
        &self,
        x: &mut QLearningAgent<B>,
        o: &mut QLearningAgent<B>,
        start_episode: usize,
    ) -> Result<TrainingReport, TrainingError> {
        let mut metrics = TrainingMetrics::new(Mark::X);
        let mut evaluations = Vec::new();
        let mut checkpoints = Vec::new();

        let end_episode = start_episode + self.config.num_episodes;
        log::info!(
            "Starting {} Q-learning self-play for {} episodes ({}..={})",
            B::NAME,
            self.config.num_episodes,
            start_episode + 1,
            end_episode
        );

        for episode in start_episode + 1..=end_episode {
            let epsilon = self.config.exploration.epsilon(episode);
            x.set_epsilon(epsilon);
            o.set_epsilon(epsilon);

            let trace = play_training_episode(
                B::default(),
                Seat::Learner(&mut *x),
                Seat::Learner(&mut *o),
                &self.config.rewards,
            )?;
            for td in trace.td_errors {
                metrics.record_update(td);
            }
            metrics.record_episode(trace.result);

            self.log_progress(episode, end_episode, epsilon, &metrics);

            let mut eval = None;
            if self.is_due(episode, self.config.eval_interval) {
                let summary = self.evaluate(x, episode)?;
                let x_rate = summary.win_rate(Mark::X);
                let o_rate = self.evaluate(o, episode)?.win_rate(Mark::O);
                log::info!(
                    "  >> Eval vs Random ({} games): X {:.1}% | O {:.1}% win rate",
                    self.config.eval_games,
                    x_rate * 100.0,
                    o_rate * 100.0
                );
                evaluations.push((episode, x_rate));
                eval = Some(summary);
            }

            if let Some(manager) = self.checkpoint_due(episode, end_episode) {
                let eval = match eval {
                    Some(summary) => summary,
                    None => self.evaluate(x, episode)?,
                };
                let metadata =
                    self.checkpoint_metadata(x, &eval, &metrics, episode, Some("self".to_string()));
                let path = manager
                    .save_checkpoint(&[(Mark::X, x.table()), (Mark::O, o.table())], metadata)?;
                checkpoints.push(path);
            }
        }

        let x_rate = self.evaluate(x, end_episode)?.win_rate(Mark::X);
        let o_rate = self.evaluate(o, end_episode)?.win_rate(Mark::O);
        log::info!(
            "Self-play complete: {} episodes, X {:.1}% / O {:.1}% vs Random",
            metrics.total_episodes(),
            x_rate * 100.0,
            o_rate * 100.0
        );

        let window = self.config.log_interval.max(1);
        Ok(TrainingReport {
            episodes: metrics.total_episodes(),
            last_episode: end_episode,
            final_win_rates: vec![(Mark::X, x_rate), (Mark::O, o_rate)],
            window_win_rate: metrics.win_rate(window),
            window_draw_rate: metrics.draw_rate(window),
            evaluations,
            checkpoints,
        })
    }

    /// Play `eval_games` greedy games against a random opponent, with the
    /// learner on its own mark. Exploration is restored afterwards.
    pub fn evaluate<B: BoardState + Default>(
        &self,
        learner: &mut QLearningAgent<B>,
        episode: usize,
    ) -> Result<MatchSummary, IllegalMoveError> {
        let mark = learner.mark();
        let mut random = match self.config.seed {
            Some(seed) => RandomAgent::with_seed(mark.other(), episode_seed(seed, episode)),
            None => RandomAgent::new(mark.other()),
        };

        let saved_epsilon = learner.epsilon();
        learner.set_epsilon(0.0);
        let games = self.config.eval_games;
        let summary = match mark {
            Mark::X => play_match(B::default, learner, &mut random, games),
            Mark::O => play_match(B::default, &mut random, learner, games),
        };
        learner.set_epsilon(saved_epsilon);
        summary
    }

    fn is_due(&self, episode: usize, interval: usize) -> bool {
        interval > 0 && episode % interval == 0
    }

    /// Checkpoints fall on the interval and on the last episode of a run.
    fn checkpoint_due(&self, episode: usize, end_episode: usize) -> Option<&CheckpointManager> {
        self.checkpoint_manager.as_ref().filter(|_| {
            episode == end_episode || self.is_due(episode, self.config.checkpoint_interval)
        })
    }

    fn log_progress(
        &self,
        episode: usize,
        end_episode: usize,
        epsilon: f64,
        metrics: &TrainingMetrics,
    ) {
        if !self.is_due(episode, self.config.log_interval) {
            return;
        }
        let window = self.config.log_interval;
        log::info!(
            "Episode {}/{} | eps: {:.3} | td: {:.4} | win({}): {:.1}% | draw: {:.1}% | loss: {:.1}% | avg_len: {:.1}",
            episode,
            end_episode,
            epsilon,
            metrics.average_td_error(window),
            metrics.perspective(),
            metrics.win_rate(window) * 100.0,
            metrics.draw_rate(window) * 100.0,
            metrics.loss_rate(window) * 100.0,
            metrics.average_game_length(window),
        );
    }

    fn checkpoint_metadata<B: BoardState>(
        &self,
        learner: &QLearningAgent<B>,
        eval: &MatchSummary,
        metrics: &TrainingMetrics,
        episode: usize,
        opponent: Option<String>,
    ) -> CheckpointMetadata {
        let window = self.config.log_interval.max(1);
        let config = learner.config();
        CheckpointMetadata {
            episode,
            timestamp: 0,
            game: B::NAME.to_string(),
            marks: Vec::new(),
            opponent,
            metrics: CheckpointMetrics {
                win_rate: eval.win_rate(learner.mark()),
                draw_rate: metrics.draw_rate(window),
                average_game_length: metrics.average_game_length(window),
                average_td_error: metrics.average_td_error(window),
                q_table_states: learner.table().len(),
            },
            hyperparameters: CheckpointHyperparameters {
                learning_rate: config.learning_rate,
                discount_factor: config.discount_factor,
                epsilon: learner.epsilon(),
                exploration: self.config.exploration.clone(),
                rewards: self.config.rewards.clone(),
            },
        }
    }
}
