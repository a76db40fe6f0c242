use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::agent::Agent;
use crate::game::{BoardState, Mark};

/// An agent that selects uniformly at random from legal moves.
pub struct RandomAgent {
    mark: Mark,
    rng: StdRng,
}

impl RandomAgent {
    pub fn new(mark: Mark) -> Self {
        RandomAgent {
            mark,
            rng: StdRng::from_os_rng(),
        }
    }

    pub fn with_seed(mark: Mark, seed: u64) -> Self {
        RandomAgent {
            mark,
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl<B: BoardState> Agent<B> for RandomAgent {
    fn select_move(&mut self, board: &mut B) -> B::Move {
        board.clear_first_move();
        let moves = board.legal_moves();
        assert!(!moves.is_empty(), "No legal moves available");
        moves[self.rng.random_range(0..moves.len())]
    }

    fn name(&self) -> &str {
        "Random"
    }

    fn mark(&self) -> Mark {
        self.mark
    }
}
