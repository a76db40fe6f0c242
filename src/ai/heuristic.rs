use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::agent::Agent;
use crate::game::{BoardState, Mark};

/// One-ply baseline: win if possible, otherwise block, otherwise random.
pub struct DefaultAgent {
    mark: Mark,
    rng: StdRng,
}

impl DefaultAgent {
    pub fn new(mark: Mark) -> Self {
        DefaultAgent {
            mark,
            rng: StdRng::from_os_rng(),
        }
    }

    pub fn with_seed(mark: Mark, seed: u64) -> Self {
        DefaultAgent {
            mark,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    fn random_move<B: BoardState>(&mut self, legal: &[B::Move]) -> B::Move {
        legal[self.rng.random_range(0..legal.len())]
    }
}

/// First legal move (in enumeration order) that completes a line for `mark`.
///
/// Tries each move with apply/undo on the board itself.
pub fn find_winning_move<B: BoardState>(board: &mut B, mark: Mark) -> Option<B::Move> {
    for mv in board.legal_moves() {
        if board.apply(mv, mark).is_err() {
            continue;
        }
        let wins = board.has_won(mark);
        board.undo(mv);
        if wins {
            return Some(mv);
        }
    }
    None
}

impl<B: BoardState> Agent<B> for DefaultAgent {
    fn select_move(&mut self, board: &mut B) -> B::Move {
        let legal = board.legal_moves();
        assert!(!legal.is_empty(), "No legal moves available");

        if board.is_first_move() {
            board.clear_first_move();
            return self.random_move::<B>(&legal);
        }

        if let Some(mv) = find_winning_move(board, self.mark) {
            return mv;
        }
        if let Some(mv) = find_winning_move(board, self.mark.other()) {
            log::trace!("{} blocks at {:?}", self.mark, mv);
            return mv;
        }
        self.random_move::<B>(&legal)
    }

    fn name(&self) -> &str {
        "Default"
    }

    fn mark(&self) -> Mark {
        self.mark
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::{ConnectFour, TicTacToe};

    #[test]
    fn test_takes_win_before_block() {
        // O also threatens on the middle row; winning comes first.
        let mut board = TicTacToe::from_rows(["XX.", "OO.", "..."], Mark::X);
        let before = board.clone();
        let mut agent = DefaultAgent::with_seed(Mark::X, 1);

        assert_eq!(agent.select_move(&mut board), (0, 2));
        assert_eq!(board, before);
    }

    #[test]
    fn test_blocks_opponent_threat() {
        let mut board = TicTacToe::from_rows(["OO.", "X..", "..X"], Mark::X);
        let mut agent = DefaultAgent::with_seed(Mark::X, 2);
        assert_eq!(agent.select_move(&mut board), (0, 2));
    }

    #[test]
    fn test_blocks_connect_four_column() {
        let mut board = ConnectFour::new();
        for col in [0, 3, 1, 3, 6, 3] {
            board.play(col).unwrap();
        }
        // O has three stacked in column 3; X to move.
        let mut agent = DefaultAgent::with_seed(Mark::X, 3);
        assert_eq!(agent.select_move(&mut board), 3);
    }

    #[test]
    fn test_first_move_is_random_and_clears_flag() {
        let mut seen = std::collections::HashSet::new();
        for seed in 0..40 {
            let mut board = TicTacToe::new();
            let mut agent = DefaultAgent::with_seed(Mark::X, seed);
            seen.insert(agent.select_move(&mut board));
            assert!(!board.is_first_move());
        }
        assert!(seen.len() > 1);
    }

    #[test]
    fn test_find_winning_move_none() {
        let mut board = TicTacToe::from_rows(["X..", "...", "..."], Mark::O);
        assert_eq!(find_winning_move(&mut board, Mark::X), None);
        assert_eq!(find_winning_move(&mut board, Mark::O), None);
    }
}
