//! # ML Board Games
//!
//! Tic-tac-toe and Connect Four with interchangeable agents: exhaustive
//! minimax, alpha-beta pruned minimax, tabular Q-learning, and simple
//! heuristic and random baselines.
//!
//! ## Modules
//!
//! - [`game`]: Boards, marks, and the shared `BoardState` interface
//! - [`ai`]: Agent trait, search agents, Q-table and Q-learning agent, baselines
//! - [`training`]: Exploration schedules, training episodes, metrics, trainer
//! - [`arena`]: Game loop and match series between two agents
//! - [`checkpoint`]: Q-table persistence and versioning
//! - [`config`]: TOML configuration loading and validation
//! - [`error`]: Structured error types

pub mod ai;
pub mod arena;
pub mod checkpoint;
pub mod config;
pub mod error;
pub mod game;
pub mod training;
