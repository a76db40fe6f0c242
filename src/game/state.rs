use std::fmt;
use std::hash::Hash;

use super::{Mark, StateKey};
use crate::error::IllegalMoveError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameOutcome {
    Winner(Mark),
    Draw,
}

/// Mutable board shared by the two agents of one game.
///
/// `apply` and `undo` are the speculative primitives search uses: `undo` is
/// only valid directly after the matching `apply`, with no other mutation in
/// between. `play` is the turn-advancing move used by game loops.
pub trait BoardState: Clone + PartialEq + fmt::Debug + fmt::Display {
    type Move: Copy + Eq + Hash + fmt::Debug;

    /// Short game name used in logs and checkpoint metadata.
    const NAME: &'static str;
    /// Size of the action space (one Q-value slot per action index).
    const ACTIONS: usize;

    /// All currently legal moves in increasing index order.
    fn legal_moves(&self) -> Vec<Self::Move>;

    fn is_legal(&self, mv: Self::Move) -> bool;

    /// Write `mark` into the cell addressed by `mv`.
    fn apply(&mut self, mv: Self::Move, mark: Mark) -> Result<(), IllegalMoveError>;

    /// Reset the cell written by the immediately preceding `apply(mv, _)`.
    fn undo(&mut self, mv: Self::Move);

    fn has_won(&self, mark: Mark) -> bool;

    fn is_full(&self) -> bool;

    fn current_mark(&self) -> Mark;

    fn switch_turn(&mut self);

    fn is_first_move(&self) -> bool;

    fn clear_first_move(&mut self);

    fn state_key(&self) -> StateKey;

    /// Index of `mv` in `0..ACTIONS`.
    fn action_index(mv: Self::Move) -> usize;

    fn is_draw(&self) -> bool {
        self.is_full() && !self.has_won(Mark::X) && !self.has_won(Mark::O)
    }

    fn outcome(&self) -> Option<GameOutcome> {
        if self.has_won(Mark::X) {
            Some(GameOutcome::Winner(Mark::X))
        } else if self.has_won(Mark::O) {
            Some(GameOutcome::Winner(Mark::O))
        } else if self.is_full() {
            Some(GameOutcome::Draw)
        } else {
            None
        }
    }

    fn is_terminal(&self) -> bool {
        self.outcome().is_some()
    }

    /// Play `mv` for the mark to move. The turn passes to the opponent
    /// unless the move ended the game; the ended game's outcome is returned.
    fn play(&mut self, mv: Self::Move) -> Result<Option<GameOutcome>, IllegalMoveError> {
        if self.is_terminal() {
            return Err(IllegalMoveError::GameOver);
        }
        let mark = self.current_mark();
        self.apply(mv, mark)?;
        self.clear_first_move();

        let outcome = self.outcome();
        if outcome.is_none() {
            self.switch_turn();
        }
        Ok(outcome)
    }
}
