use std::fmt;
use std::str::FromStr;

use crate::game::{BoardState, Mark};

/// Node counts reported by search agents.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SearchStats {
    /// Nodes entered by the most recent search.
    pub last_nodes: u64,
    /// Nodes entered over the agent's lifetime.
    pub total_nodes: u64,
    /// Number of searches run (random openings are not searches).
    pub searches: u64,
}

impl SearchStats {
    pub fn record(&mut self, nodes: u64) {
        self.last_nodes = nodes;
        self.total_nodes += nodes;
        self.searches += 1;
    }
}

/// Universal interface for all agents.
///
/// Agents may mutate the board speculatively while choosing, but must hand
/// it back unchanged apart from clearing the first-move flag.
pub trait Agent<B: BoardState> {
    /// Select a legal move for the current position. Must not be called on a
    /// terminal board.
    fn select_move(&mut self, board: &mut B) -> B::Move;

    /// Return the agent's display name.
    fn name(&self) -> &str;

    /// The mark this agent plays.
    fn mark(&self) -> Mark;

    /// Search diagnostics, for agents that search.
    fn search_stats(&self) -> Option<SearchStats> {
        None
    }
}

/// Agent variants selectable from configuration and the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AgentKind {
    Minimax,
    AlphaBeta,
    QLearning,
    Default,
    Random,
}

impl AgentKind {
    pub fn name(self) -> &'static str {
        match self {
            AgentKind::Minimax => "minimax",
            AgentKind::AlphaBeta => "alpha-beta",
            AgentKind::QLearning => "qlearning",
            AgentKind::Default => "default",
            AgentKind::Random => "random",
        }
    }
}

impl fmt::Display for AgentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for AgentKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "minimax" => Ok(AgentKind::Minimax),
            "alpha-beta" | "alphabeta" | "abp" => Ok(AgentKind::AlphaBeta),
            "qlearning" | "q-learning" => Ok(AgentKind::QLearning),
            "default" | "heuristic" => Ok(AgentKind::Default),
            "random" => Ok(AgentKind::Random),
            other => Err(format!(
                "unknown agent '{other}' (expected minimax, alpha-beta, qlearning, default or random)"
            )),
        }
    }
}
