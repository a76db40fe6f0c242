//! Core board game logic: cells and grids, marks, the shared `BoardState`
//! interface, and the two concrete games (tic-tac-toe and Connect Four).

mod board;
mod connect_four;
mod mark;
mod state;
mod tic_tac_toe;

pub use board::{Cell, Grid, StateKey};
pub use connect_four::ConnectFour;
pub use mark::Mark;
pub use state::{BoardState, GameOutcome};
pub use tic_tac_toe::{Square, TicTacToe};

/// Which game to play, as selected in configuration and on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GameKind {
    TicTacToe,
    ConnectFour,
}

impl GameKind {
    pub fn name(self) -> &'static str {
        match self {
            GameKind::TicTacToe => TicTacToe::NAME,
            GameKind::ConnectFour => ConnectFour::NAME,
        }
    }
}

impl std::str::FromStr for GameKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "ttt" | "tictactoe" | "tic-tac-toe" => Ok(GameKind::TicTacToe),
            "connect4" | "connect-four" | "c4" => Ok(GameKind::ConnectFour),
            other => Err(format!(
                "unknown game '{other}' (expected 'ttt' or 'connect4')"
            )),
        }
    }
}
