//! Game loop and match series between two agents.

use std::time::{Duration, Instant};

use crate::ai::Agent;
use crate::error::IllegalMoveError;
use crate::game::{BoardState, GameOutcome, Mark};

/// Per-side bookkeeping for one game.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SideStats {
    pub moves: usize,
    /// Nodes searched, summed over the side's searches.
    pub nodes: u64,
    /// Moves that ran a search (random openings do not).
    pub searches: u64,
    pub think_time: Duration,
}

impl SideStats {
    fn add(&mut self, other: &SideStats) {
        self.moves += other.moves;
        self.nodes += other.nodes;
        self.searches += other.searches;
        self.think_time += other.think_time;
    }

    /// Mean nodes per search, or `None` if the side never searched.
    pub fn average_nodes(&self) -> Option<f64> {
        (self.searches > 0).then(|| self.nodes as f64 / self.searches as f64)
    }

    pub fn average_move_time(&self) -> Duration {
        if self.moves == 0 {
            return Duration::ZERO;
        }
        self.think_time.div_f64(self.moves as f64)
    }
}

/// Everything observed in one finished game.
#[derive(Debug, Clone)]
pub struct GameRecord<M> {
    pub outcome: GameOutcome,
    pub moves: Vec<M>,
    pub x: SideStats,
    pub o: SideStats,
}

impl<M> GameRecord<M> {
    pub fn x_nodes(&self) -> u64 {
        self.x.nodes
    }

    pub fn o_nodes(&self) -> u64 {
        self.o.nodes
    }
}

/// Play `board` to the end, X's agent and O's agent alternating.
///
/// Illegal moves are returned to the caller as-is.
///
/// # Panics
///
/// Panics if an agent leaves the board changed (other than clearing the
/// first-move flag) after choosing a move.
pub fn play_game<'a, B: BoardState>(
    mut board: B,
    x: &'a mut dyn Agent<B>,
    o: &'a mut dyn Agent<B>,
) -> Result<GameRecord<B::Move>, IllegalMoveError> {
    let mut moves = Vec::new();
    let mut sides = [SideStats::default(), SideStats::default()];

    let outcome = loop {
        if let Some(outcome) = board.outcome() {
            break outcome;
        }
        let mark = board.current_mark();
        let (agent, side) = match mark {
            Mark::X => (&mut *x, &mut sides[0]),
            Mark::O => (&mut *o, &mut sides[1]),
        };

        let mut expected = board.clone();
        expected.clear_first_move();
        let stats_before = agent.search_stats();

        let started = Instant::now();
        let mv = agent.select_move(&mut board);
        side.think_time += started.elapsed();
        side.moves += 1;

        if let (Some(before), Some(after)) = (stats_before, agent.search_stats()) {
            side.nodes += after.total_nodes - before.total_nodes;
            side.searches += after.searches - before.searches;
        }

        let mut actual = board.clone();
        actual.clear_first_move();
        assert!(
            actual == expected,
            "{} agent '{}' left the board modified",
            mark,
            agent.name()
        );

        board.play(mv)?;
        moves.push(mv);
    };

    log::debug!(
        "{} game over after {} moves: {:?}",
        B::NAME,
        moves.len(),
        outcome
    );
    let [x_stats, o_stats] = sides;
    Ok(GameRecord {
        outcome,
        moves,
        x: x_stats,
        o: o_stats,
    })
}

/// Aggregate over a series of games between the same two agents.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MatchSummary {
    pub games: usize,
    pub x_wins: usize,
    pub o_wins: usize,
    pub draws: usize,
    pub x: SideStats,
    pub o: SideStats,
}

impl MatchSummary {
    /// Add one finished game to the tally.
    pub fn record<M>(&mut self, game: &GameRecord<M>) {
        self.games += 1;
        match game.outcome {
            GameOutcome::Winner(Mark::X) => self.x_wins += 1,
            GameOutcome::Winner(Mark::O) => self.o_wins += 1,
            GameOutcome::Draw => self.draws += 1,
        }
        self.x.add(&game.x);
        self.o.add(&game.o);
    }

    pub fn wins(&self, mark: Mark) -> usize {
        match mark {
            Mark::X => self.x_wins,
            Mark::O => self.o_wins,
        }
    }

    pub fn win_rate(&self, mark: Mark) -> f64 {
        if self.games == 0 {
            return 0.0;
        }
        self.wins(mark) as f64 / self.games as f64
    }

    pub fn draw_rate(&self) -> f64 {
        if self.games == 0 {
            return 0.0;
        }
        self.draws as f64 / self.games as f64
    }
}

/// Play `games` games, each from a fresh board built by `new_board`.
pub fn play_match<B, F>(
    mut new_board: F,
    x: &mut dyn Agent<B>,
    o: &mut dyn Agent<B>,
    games: usize,
) -> Result<MatchSummary, IllegalMoveError>
where
    B: BoardState,
    F: FnMut() -> B,
{
    let mut summary = MatchSummary::default();
    for _ in 0..games {
        let record = play_game(new_board(), x, o)?;
        summary.record(&record);
    }
    log::debug!(
        "{} vs {} over {} games: {}-{}-{}",
        x.name(),
        o.name(),
        summary.games,
        summary.x_wins,
        summary.o_wins,
        summary.draws
    );
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::{DefaultAgent, RandomAgent, SearchAgent};
    use crate::game::{ConnectFour, TicTacToe};

    /// Plays the first legal move but scribbles on the board first.
    struct Vandal;

    impl Agent<TicTacToe> for Vandal {
        fn select_move(&mut self, board: &mut TicTacToe) -> (usize, usize) {
            let mv = board.legal_moves()[0];
            board.apply(mv, Mark::O).unwrap();
            board.legal_moves()[0]
        }

        fn name(&self) -> &str {
            "Vandal"
        }

        fn mark(&self) -> Mark {
            Mark::O
        }
    }

    /// Always answers with the same square.
    struct Stubborn;

    impl Agent<TicTacToe> for Stubborn {
        fn select_move(&mut self, board: &mut TicTacToe) -> (usize, usize) {
            board.clear_first_move();
            (1, 1)
        }

        fn name(&self) -> &str {
            "Stubborn"
        }

        fn mark(&self) -> Mark {
            Mark::O
        }
    }

    #[test]
    fn test_play_game_random_agents() {
        let mut x = RandomAgent::with_seed(Mark::X, 1);
        let mut o = RandomAgent::with_seed(Mark::O, 2);
        let record = play_game(ConnectFour::new(), &mut x, &mut o).unwrap();

        assert!(record.moves.len() >= 7);
        assert_eq!(record.x.moves + record.o.moves, record.moves.len());
        assert_eq!(record.x_nodes(), 0);
        assert_eq!(record.x.average_nodes(), None);
    }

    #[test]
    fn test_search_nodes_are_attributed_per_side() {
        let mut x = SearchAgent::alpha_beta(Mark::X, None).with_seed(3);
        let mut o = RandomAgent::with_seed(Mark::O, 4);
        let record = play_game(TicTacToe::new(), &mut x, &mut o).unwrap();

        assert!(record.x_nodes() > 0);
        assert_eq!(record.o_nodes(), 0);
        // The opening move is random, every later X move searches.
        assert_eq!(record.x.searches as usize, record.x.moves - 1);
        assert_ne!(record.outcome, GameOutcome::Winner(Mark::O));
    }

    #[test]
    fn test_play_game_with_agents_of_different_scopes() {
        let mut x = SearchAgent::alpha_beta(Mark::X, None).with_seed(11);
        for seed in 0..3 {
            let mut o = RandomAgent::with_seed(Mark::O, seed);
            let record = play_game(TicTacToe::new(), &mut x, &mut o).unwrap();
            assert_ne!(record.outcome, GameOutcome::Winner(Mark::O));
        }
    }

    #[test]
    fn test_average_move_time() {
        let stats = SideStats {
            moves: 4,
            think_time: Duration::from_secs(2),
            ..SideStats::default()
        };
        assert_eq!(stats.average_move_time(), Duration::from_millis(500));
        assert_eq!(SideStats::default().average_move_time(), Duration::ZERO);
    }

    #[cfg(target_pointer_width = "64")]
    #[test]
    fn test_average_move_time_beyond_u32_moves() {
        let stats = SideStats {
            moves: 1 << 32,
            think_time: Duration::from_secs(1 << 32),
            ..SideStats::default()
        };
        assert_eq!(stats.average_move_time(), Duration::from_secs(1));
    }

    #[test]
    fn test_illegal_move_is_surfaced() {
        let mut x = DefaultAgent::with_seed(Mark::X, 5);
        let mut o = Stubborn;
        let mut board = TicTacToe::new();
        board.play((1, 1)).unwrap();

        let err = play_game(board, &mut x, &mut o).unwrap_err();
        assert_eq!(err, IllegalMoveError::Occupied { row: 1, col: 1 });
    }

    #[test]
    #[should_panic(expected = "left the board modified")]
    fn test_board_tampering_panics() {
        let mut x = RandomAgent::with_seed(Mark::X, 6);
        let mut o = Vandal;
        let _ = play_game(TicTacToe::new(), &mut x, &mut o);
    }

    #[test]
    fn test_play_match_counts() {
        let mut x = SearchAgent::minimax(Mark::X, None).with_seed(7);
        let mut o = SearchAgent::alpha_beta(Mark::O, None).with_seed(8);
        let summary = play_match(TicTacToe::new, &mut x, &mut o, 3).unwrap();

        assert_eq!(summary.games, 3);
        assert_eq!(summary.draws, 3);
        assert_eq!(summary.draw_rate(), 1.0);
        assert!(summary.x.average_nodes().unwrap() > 0.0);
        assert!(summary.o.average_nodes().unwrap() > 0.0);
        assert_eq!(summary.x.moves, 15);
    }

    #[test]
    fn test_match_summary_rates() {
        let mut x = DefaultAgent::with_seed(Mark::X, 9);
        let mut o = RandomAgent::with_seed(Mark::O, 10);
        let summary = play_match(TicTacToe::new, &mut x, &mut o, 20).unwrap();

        assert_eq!(summary.x_wins + summary.o_wins + summary.draws, 20);
        assert!(summary.win_rate(Mark::X) > summary.win_rate(Mark::O));
        assert_eq!(MatchSummary::default().win_rate(Mark::X), 0.0);
    }
}
