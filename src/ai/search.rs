use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::agent::{Agent, SearchStats};
use crate::game::{BoardState, Mark};

pub const WIN_SCORE: i32 = 1;
pub const LOSS_SCORE: i32 = -1;
pub const DRAW_SCORE: i32 = 0;

/// Whether the search prunes with alpha-beta bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pruning {
    None,
    AlphaBeta,
}

/// Result of a full search from the current position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchOutcome<M> {
    /// Score from the searching agent's perspective: +1 win, -1 loss, 0 draw
    /// or beyond the depth bound.
    pub score: i32,
    pub best_move: Option<M>,
    pub nodes: u64,
}

/// Minimax agent, optionally with alpha-beta pruning.
///
/// Explores by applying moves to the shared board and undoing them on the
/// way back up. Ties between equally scored moves keep the first move in
/// `legal_moves()` order; pruning never changes the chosen move or score.
pub struct SearchAgent {
    mark: Mark,
    max_depth: Option<usize>,
    pruning: Pruning,
    nodes: u64,
    stats: SearchStats,
    rng: StdRng,
}

impl SearchAgent {
    pub fn new(mark: Mark, max_depth: Option<usize>, pruning: Pruning) -> Self {
        SearchAgent {
            mark,
            max_depth,
            pruning,
            nodes: 0,
            stats: SearchStats::default(),
            rng: StdRng::from_os_rng(),
        }
    }

    /// Plain minimax. `None` searches to the end of the game.
    pub fn minimax(mark: Mark, max_depth: Option<usize>) -> Self {
        Self::new(mark, max_depth, Pruning::None)
    }

    pub fn alpha_beta(mark: Mark, max_depth: Option<usize>) -> Self {
        Self::new(mark, max_depth, Pruning::AlphaBeta)
    }

    /// Reseed the opening-move generator.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self
    }

    pub fn pruning(&self) -> Pruning {
        self.pruning
    }

    pub fn max_depth(&self) -> Option<usize> {
        self.max_depth
    }

    pub fn stats(&self) -> SearchStats {
        self.stats
    }

    /// Search the current position, returning the score and best move for
    /// this agent's mark. Always searches, even on the opening move.
    pub fn search<B: BoardState>(&mut self, board: &mut B) -> SearchOutcome<B::Move> {
        self.nodes = 0;
        let (score, best_move) = self.minimax_node(board, 0, true, i32::MIN, i32::MAX);
        self.stats.record(self.nodes);
        log::debug!(
            "{} search for {} visited {} nodes (score {score})",
            self.label(),
            self.mark,
            self.nodes
        );
        SearchOutcome {
            score,
            best_move,
            nodes: self.nodes,
        }
    }

    fn minimax_node<B: BoardState>(
        &mut self,
        board: &mut B,
        depth: usize,
        maximizing: bool,
        mut alpha: i32,
        mut beta: i32,
    ) -> (i32, Option<B::Move>) {
        self.nodes += 1;

        let opponent = self.mark.other();
        if board.has_won(self.mark) {
            return (WIN_SCORE, None);
        }
        if board.has_won(opponent) {
            return (LOSS_SCORE, None);
        }
        if board.is_full() {
            return (DRAW_SCORE, None);
        }
        if self.max_depth.is_some_and(|max| depth >= max) {
            return (DRAW_SCORE, None);
        }

        let mover = if maximizing { self.mark } else { opponent };
        let mut best_score = if maximizing { i32::MIN } else { i32::MAX };
        let mut best_move = None;

        for mv in board.legal_moves() {
            board.apply(mv, mover).expect("enumerated move is legal");
            let (score, _) = self.minimax_node(board, depth + 1, !maximizing, alpha, beta);
            board.undo(mv);

            if maximizing {
                if score > best_score {
                    best_score = score;
                    best_move = Some(mv);
                }
                alpha = alpha.max(score);
            } else {
                if score < best_score {
                    best_score = score;
                    best_move = Some(mv);
                }
                beta = beta.min(score);
            }

            if self.pruning == Pruning::AlphaBeta && alpha >= beta {
                break;
            }
        }

        (best_score, best_move)
    }

    fn label(&self) -> &'static str {
        match self.pruning {
            Pruning::None => "Minimax",
            Pruning::AlphaBeta => "AlphaBeta",
        }
    }
}

impl<B: BoardState> Agent<B> for SearchAgent {
    fn select_move(&mut self, board: &mut B) -> B::Move {
        let legal = board.legal_moves();
        assert!(!legal.is_empty(), "No legal moves available");

        if board.is_first_move() {
            board.clear_first_move();
            return legal[self.rng.random_range(0..legal.len())];
        }

        match self.search(board).best_move {
            Some(mv) => mv,
            None => {
                log::warn!(
                    "{} found no move at depth 0, playing first legal move",
                    self.label()
                );
                legal[0]
            }
        }
    }

    fn name(&self) -> &str {
        self.label()
    }

    fn mark(&self) -> Mark {
        self.mark
    }

    fn search_stats(&self) -> Option<SearchStats> {
        Some(self.stats)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::RandomAgent;
    use crate::game::{ConnectFour, GameOutcome, TicTacToe};

    /// Random non-terminal position reached by `plies` random moves.
    fn random_position<B: BoardState>(mut board: B, plies: usize, seed: u64) -> Option<B> {
        let mut rng = StdRng::seed_from_u64(seed);
        for _ in 0..plies {
            if board.is_terminal() {
                return None;
            }
            let legal = board.legal_moves();
            board.play(legal[rng.random_range(0..legal.len())]).ok()?;
        }
        (!board.is_terminal()).then_some(board)
    }

    fn play_out<B: BoardState>(
        mut board: B,
        x: &mut dyn Agent<B>,
        o: &mut dyn Agent<B>,
    ) -> GameOutcome {
        loop {
            let mv = if board.current_mark() == Mark::X {
                x.select_move(&mut board)
            } else {
                o.select_move(&mut board)
            };
            if let Some(outcome) = board.play(mv).unwrap() {
                return outcome;
            }
        }
    }

    // --- Tactical tests ---

    #[test]
    fn test_takes_winning_move_tic_tac_toe() {
        let mut board = TicTacToe::from_rows(["XX.", "OO.", "..."], Mark::X);
        let mut agent = SearchAgent::minimax(Mark::X, None);
        assert_eq!(agent.select_move(&mut board), (0, 2));
    }

    #[test]
    fn test_blocks_opponent_win_tic_tac_toe() {
        let mut board = TicTacToe::from_rows(["X..", "OO.", "X.."], Mark::X);
        let mut agent = SearchAgent::alpha_beta(Mark::X, None);
        assert_eq!(agent.select_move(&mut board), (1, 2));
    }

    #[test]
    fn test_takes_winning_move_connect_four() {
        // X has three on the bottom row, col 3 completes it
        let mut board = ConnectFour::new();
        for col in 0..3 {
            board.play(col).unwrap(); // X
            board.play(col).unwrap(); // O
        }
        let mut agent = SearchAgent::alpha_beta(Mark::X, Some(4));
        assert_eq!(agent.select_move(&mut board), 3);
    }

    #[test]
    fn test_blocks_opponent_win_connect_four() {
        // O has [0,1,2] on the bottom row; X must block col 3.
        let mut board = ConnectFour::new();
        for (x_col, o_col) in [(6, 0), (6, 1), (5, 2)] {
            board.play(x_col).unwrap();
            board.play(o_col).unwrap();
        }
        let mut agent = SearchAgent::minimax(Mark::X, Some(2));
        assert_eq!(agent.select_move(&mut board), 3);
    }

    #[test]
    fn test_depth_bound_scores_unresolved_positions_as_draw() {
        let mut board = ConnectFour::new();
        board.clear_first_move();
        let mut agent = SearchAgent::minimax(Mark::X, Some(2));
        let outcome = agent.search(&mut board);
        assert_eq!(outcome.score, DRAW_SCORE);
        // Nothing is decided within two plies, so the first column wins the tie.
        assert_eq!(outcome.best_move, Some(0));
        assert_eq!(outcome.nodes, 1 + 7 + 49);
    }

    #[test]
    fn test_opening_move_is_random_and_clears_flag() {
        let mut board = TicTacToe::new();
        let mut agent = SearchAgent::minimax(Mark::X, None).with_seed(9);
        let mv = agent.select_move(&mut board);
        assert!(board.is_legal(mv));
        assert!(!board.is_first_move());
        assert_eq!(agent.stats().searches, 0);
    }

    #[test]
    fn test_search_leaves_board_unchanged() {
        for seed in 0..10 {
            let Some(board) = random_position(ConnectFour::new(), 6, seed) else {
                continue;
            };
            let mut scratch = board.clone();
            let mut agent = SearchAgent::alpha_beta(scratch.current_mark(), Some(4));
            agent.search(&mut scratch);
            assert_eq!(scratch, board);
        }
    }

    // --- Cross-check tests ---

    #[test]
    fn test_alpha_beta_matches_minimax_tic_tac_toe() {
        let mut checked = 0;
        for seed in 0..40 {
            let Some(board) = random_position(TicTacToe::new(), 2 + (seed as usize % 4), seed)
            else {
                continue;
            };
            let mark = board.current_mark();
            let plain = SearchAgent::minimax(mark, None).search(&mut board.clone());
            let pruned = SearchAgent::alpha_beta(mark, None).search(&mut board.clone());

            assert_eq!(plain.score, pruned.score, "score mismatch on\n{board}");
            assert_eq!(
                plain.best_move, pruned.best_move,
                "move mismatch on\n{board}"
            );
            assert!(pruned.nodes <= plain.nodes);
            checked += 1;
        }
        assert!(checked > 20);
    }

    #[test]
    fn test_alpha_beta_matches_minimax_connect_four() {
        for seed in 0..15 {
            let Some(board) = random_position(ConnectFour::new(), 4 + (seed as usize % 6), seed)
            else {
                continue;
            };
            let mark = board.current_mark();
            for depth in 1..=4 {
                let plain = SearchAgent::minimax(mark, Some(depth)).search(&mut board.clone());
                let pruned = SearchAgent::alpha_beta(mark, Some(depth)).search(&mut board.clone());
                assert_eq!(plain.score, pruned.score);
                assert_eq!(plain.best_move, pruned.best_move);
                assert!(pruned.nodes <= plain.nodes);
            }
        }
    }

    #[test]
    fn test_alpha_beta_visits_strictly_fewer_nodes() {
        let mut board = TicTacToe::from_rows(["X..", ".O.", "..."], Mark::X);
        let plain = SearchAgent::minimax(Mark::X, None).search(&mut board);
        let pruned = SearchAgent::alpha_beta(Mark::X, None).search(&mut board);
        assert_eq!(plain.score, pruned.score);
        assert!(
            pruned.nodes < plain.nodes,
            "alpha-beta visited {} nodes, minimax {}",
            pruned.nodes,
            plain.nodes
        );
    }

    #[test]
    fn test_node_counter_counts_every_entered_node() {
        // One empty cell: root plus the single child.
        let mut board = TicTacToe::from_rows(["XOX", "XOO", "OX."], Mark::X);
        let mut agent = SearchAgent::minimax(Mark::X, None);
        let outcome = agent.search(&mut board);
        assert_eq!(outcome.nodes, 2);
        assert_eq!(outcome.best_move, Some((2, 2)));
        let stats = Agent::<TicTacToe>::search_stats(&agent).unwrap();
        assert_eq!(stats.last_nodes, 2);
        assert_eq!(stats.searches, 1);
    }

    // --- Integration tests ---

    #[test]
    fn test_minimax_vs_minimax_always_draws() {
        for seed in 0..4 {
            let mut x = SearchAgent::minimax(Mark::X, None).with_seed(seed);
            let mut o = SearchAgent::minimax(Mark::O, None).with_seed(seed + 100);
            let outcome = play_out(TicTacToe::new(), &mut x, &mut o);
            assert_eq!(outcome, GameOutcome::Draw);
        }
    }

    #[test]
    fn test_alpha_beta_never_loses_to_random() {
        for seed in 0..10 {
            let mut search = SearchAgent::alpha_beta(Mark::O, None).with_seed(seed);
            let mut random = RandomAgent::with_seed(Mark::X, seed);
            let outcome = play_out(TicTacToe::new(), &mut random, &mut search);
            assert_ne!(outcome, GameOutcome::Winner(Mark::X));
        }
    }

    #[test]
    fn test_depth_limited_beats_random_connect_four() {
        let games = 20;
        let mut wins = 0;
        for seed in 0..games {
            let mut search = SearchAgent::alpha_beta(Mark::X, Some(4)).with_seed(seed);
            let mut random = RandomAgent::with_seed(Mark::O, seed);
            let outcome = play_out(ConnectFour::new(), &mut search, &mut random);
            if outcome == GameOutcome::Winner(Mark::X) {
                wins += 1;
            }
        }
        assert!(wins * 2 > games, "depth-4 search won {wins}/{games}");
    }

    #[test]
    fn test_names_reflect_pruning() {
        let plain = SearchAgent::minimax(Mark::X, None);
        let pruned = SearchAgent::alpha_beta(Mark::X, Some(3));
        assert_eq!(Agent::<TicTacToe>::name(&plain), "Minimax");
        assert_eq!(Agent::<TicTacToe>::name(&pruned), "AlphaBeta");
        assert_eq!(pruned.max_depth(), Some(3));
        assert_eq!(pruned.pruning(), Pruning::AlphaBeta);
    }
}
