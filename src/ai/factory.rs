use super::agent::{Agent, AgentKind};
use super::heuristic::DefaultAgent;
use super::q_table::QTable;
use super::qlearning::{QLearningAgent, QLearningConfig};
use super::random::RandomAgent;
use super::search::SearchAgent;
use crate::error::QTableError;
use crate::game::{BoardState, Mark};

/// Settings shared by every agent built from an [`AgentKind`].
#[derive(Debug, Clone, Default)]
pub struct AgentSettings {
    /// Search depth bound for minimax and alpha-beta.
    pub depth: Option<usize>,
    pub qlearning: QLearningConfig,
    /// Trained table for a Q-learning agent; a fresh table otherwise.
    pub table: Option<QTable>,
    pub seed: Option<u64>,
}

/// Build a boxed agent of the given kind playing `mark`.
pub fn build_agent<B: BoardState + 'static>(
    kind: AgentKind,
    mark: Mark,
    settings: AgentSettings,
) -> Result<Box<dyn Agent<B>>, QTableError> {
    let AgentSettings {
        depth,
        qlearning,
        table,
        seed,
    } = settings;

    let agent: Box<dyn Agent<B>> = match kind {
        AgentKind::Minimax | AgentKind::AlphaBeta => {
            let agent = if kind == AgentKind::Minimax {
                SearchAgent::minimax(mark, depth)
            } else {
                SearchAgent::alpha_beta(mark, depth)
            };
            Box::new(match seed {
                Some(seed) => agent.with_seed(seed),
                None => agent,
            })
        }
        AgentKind::QLearning => {
            let agent = match table {
                Some(table) => QLearningAgent::<B>::with_table(mark, table, qlearning)?,
                None => QLearningAgent::<B>::new(mark, qlearning),
            };
            Box::new(match seed {
                Some(seed) => agent.with_seed(seed),
                None => agent,
            })
        }
        AgentKind::Default => Box::new(match seed {
            Some(seed) => DefaultAgent::with_seed(mark, seed),
            None => DefaultAgent::new(mark),
        }),
        AgentKind::Random => Box::new(match seed {
            Some(seed) => RandomAgent::with_seed(mark, seed),
            None => RandomAgent::new(mark),
        }),
    };
    Ok(agent)
}
