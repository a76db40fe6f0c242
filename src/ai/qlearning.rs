use std::marker::PhantomData;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::agent::Agent;
use super::q_table::QTable;
use crate::error::QTableError;
use crate::game::{BoardState, Mark, StateKey};

/// Q-learning hyperparameters.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct QLearningConfig {
    pub learning_rate: f64,
    pub discount_factor: f64,
    /// Initial exploration rate; training loops override it per episode.
    pub epsilon: f64,
}

impl Default for QLearningConfig {
    fn default() -> Self {
        QLearningConfig {
            learning_rate: 0.1,
            discount_factor: 0.9,
            epsilon: 0.1,
        }
    }
}

/// Tabular one-step Q-learning agent.
///
/// Owns its Q-table; load and save go through [`QLearningAgent::with_table`]
/// and [`QLearningAgent::table`].
pub struct QLearningAgent<B: BoardState> {
    mark: Mark,
    table: QTable,
    config: QLearningConfig,
    epsilon: f64,
    last_action: Option<B::Move>,
    rng: StdRng,
    _board: PhantomData<fn() -> B>,
}

impl<B: BoardState> QLearningAgent<B> {
    pub fn new(mark: Mark, config: QLearningConfig) -> Self {
        QLearningAgent {
            mark,
            table: QTable::new(B::ACTIONS),
            epsilon: config.epsilon,
            config,
            last_action: None,
            rng: StdRng::from_os_rng(),
            _board: PhantomData,
        }
    }

    /// Agent starting from an existing table, e.g. one loaded from a checkpoint.
    pub fn with_table(
        mark: Mark,
        table: QTable,
        config: QLearningConfig,
    ) -> Result<Self, QTableError> {
        if table.action_count() != B::ACTIONS {
            return Err(QTableError::WrongActionSpace {
                expected: B::ACTIONS,
                found: table.action_count(),
            });
        }
        let mut agent = Self::new(mark, config);
        agent.table = table;
        Ok(agent)
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self
    }

    pub fn config(&self) -> &QLearningConfig {
        &self.config
    }

    pub fn epsilon(&self) -> f64 {
        self.epsilon
    }

    pub fn set_epsilon(&mut self, epsilon: f64) {
        self.epsilon = epsilon.clamp(0.0, 1.0);
    }

    /// Action chosen by the most recent `choose_action`.
    pub fn last_action(&self) -> Option<B::Move> {
        self.last_action
    }

    pub fn table(&self) -> &QTable {
        &self.table
    }

    pub fn into_table(self) -> QTable {
        self.table
    }

    /// Epsilon-greedy choice among the legal moves of `board`.
    ///
    /// Exploitation breaks ties between equally valued moves uniformly at
    /// random.
    pub fn choose_action(&mut self, board: &B) -> B::Move {
        let legal = board.legal_moves();
        assert!(!legal.is_empty(), "No legal actions");

        let action = if self.rng.random::<f64>() < self.epsilon {
            legal[self.rng.random_range(0..legal.len())]
        } else {
            let values = self.table.values(&board.state_key());
            let best = legal
                .iter()
                .map(|&mv| values[B::action_index(mv)])
                .fold(f64::NEG_INFINITY, f64::max);
            let ties: Vec<B::Move> = legal
                .into_iter()
                .filter(|&mv| values[B::action_index(mv)] == best)
                .collect();
            ties[self.rng.random_range(0..ties.len())]
        };

        self.last_action = Some(action);
        action
    }

    /// One-step TD update of `Q[state][action]` toward
    /// `reward` (terminal) or `reward + γ·max Q[next_state]`.
    ///
    /// Returns the TD error `target - old`.
    pub fn update(
        &mut self,
        state: &StateKey,
        action: B::Move,
        next_state: &StateKey,
        reward: f64,
        done: bool,
    ) -> f64 {
        self.table.row_mut(next_state);
        let target = if done {
            reward
        } else {
            reward + self.config.discount_factor * self.table.max_value(next_state)
        };

        let alpha = self.config.learning_rate;
        let entry = &mut self.table.row_mut(state)[B::action_index(action)];
        let old = *entry;
        *entry = (1.0 - alpha) * old + alpha * target;
        target - old
    }
}

impl<B: BoardState> Agent<B> for QLearningAgent<B> {
    fn select_move(&mut self, board: &mut B) -> B::Move {
        board.clear_first_move();
        self.choose_action(board)
    }

    fn name(&self) -> &str {
        "Q-Learning"
    }

    fn mark(&self) -> Mark {
        self.mark
    }
}
