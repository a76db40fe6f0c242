mod agent;
mod factory;
mod heuristic;
mod q_table;
mod qlearning;
mod random;
mod search;

pub use agent::{Agent, AgentKind, SearchStats};
pub use factory::{build_agent, AgentSettings};
pub use heuristic::{find_winning_move, DefaultAgent};
pub use q_table::{QEntry, QTable, QTableSnapshot};
pub use qlearning::{QLearningAgent, QLearningConfig};
pub use random::RandomAgent;
pub use search::{Pruning, SearchAgent, SearchOutcome};
