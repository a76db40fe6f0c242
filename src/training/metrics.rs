use std::collections::VecDeque;

use crate::game::{GameOutcome, Mark};

/// Result of a single training episode.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EpisodeResult {
    pub winner: Option<Mark>,
    pub game_length: usize,
}

impl EpisodeResult {
    pub fn from_outcome(outcome: GameOutcome, game_length: usize) -> Self {
        let winner = match outcome {
            GameOutcome::Winner(mark) => Some(mark),
            GameOutcome::Draw => None,
        };
        EpisodeResult {
            winner,
            game_length,
        }
    }
}

/// Training metrics tracker with rolling window computations.
///
/// Rates are reported from the perspective of one mark (the learner's, or
/// X in self-play).
pub struct TrainingMetrics {
    perspective: Mark,
    episode_results: VecDeque<EpisodeResult>,
    td_errors: VecDeque<f64>,
    capacity: usize,
    total_episodes: usize, // lifetime count, never capped
}

impl TrainingMetrics {
    pub fn with_capacity(perspective: Mark, capacity: usize) -> Self {
        TrainingMetrics {
            perspective,
            episode_results: VecDeque::with_capacity(capacity),
            td_errors: VecDeque::with_capacity(capacity),
            capacity,
            total_episodes: 0,
        }
    }

    pub fn new(perspective: Mark) -> Self {
        Self::with_capacity(perspective, 1000)
    }

    pub fn perspective(&self) -> Mark {
        self.perspective
    }

    pub fn record_episode(&mut self, result: EpisodeResult) {
        self.total_episodes += 1;
        self.episode_results.push_back(result);
        if self.episode_results.len() > self.capacity {
            self.episode_results.pop_front();
        }
    }

    /// Record the TD error of one Q update; its magnitude is kept.
    pub fn record_update(&mut self, td_error: f64) {
        self.td_errors.push_back(td_error.abs());
        if self.td_errors.len() > self.capacity {
            self.td_errors.pop_front();
        }
    }

    fn rate(&self, last_n: usize, pred: impl Fn(&EpisodeResult) -> bool) -> f64 {
        let n = self.episode_results.len().min(last_n);
        if n == 0 {
            return 0.0;
        }
        let hits = self
            .episode_results
            .iter()
            .rev()
            .take(n)
            .filter(|r| pred(r))
            .count();
        hits as f64 / n as f64
    }

    /// Win rate for the tracked mark in the last N episodes.
    pub fn win_rate(&self, last_n: usize) -> f64 {
        self.rate(last_n, |r| r.winner == Some(self.perspective))
    }

    pub fn loss_rate(&self, last_n: usize) -> f64 {
        self.rate(last_n, |r| r.winner == Some(self.perspective.other()))
    }

    pub fn draw_rate(&self, last_n: usize) -> f64 {
        self.rate(last_n, |r| r.winner.is_none())
    }

    /// Average absolute TD error over the last N updates.
    pub fn average_td_error(&self, last_n: usize) -> f64 {
        let n = self.td_errors.len().min(last_n);
        if n == 0 {
            return 0.0;
        }
        let sum: f64 = self.td_errors.iter().rev().take(n).sum();
        sum / n as f64
    }

    /// Average game length over the last N episodes.
    pub fn average_game_length(&self, last_n: usize) -> f64 {
        let n = self.episode_results.len().min(last_n);
        if n == 0 {
            return 0.0;
        }
        let total: usize = self
            .episode_results
            .iter()
            .rev()
            .take(n)
            .map(|r| r.game_length)
            .sum();
        total as f64 / n as f64
    }

    pub fn total_episodes(&self) -> usize {
        self.total_episodes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(winner: Option<Mark>, game_length: usize) -> EpisodeResult {
        EpisodeResult {
            winner,
            game_length,
        }
    }

    #[test]
    fn test_win_and_loss_rate() {
        let mut m = TrainingMetrics::new(Mark::O);
        for _ in 0..7 {
            m.record_episode(result(Some(Mark::O), 6));
        }
        for _ in 0..3 {
            m.record_episode(result(Some(Mark::X), 5));
        }
        assert!((m.win_rate(10) - 0.7).abs() < 1e-9);
        assert!((m.loss_rate(10) - 0.3).abs() < 1e-9);
        assert_eq!(m.draw_rate(10), 0.0);
    }

    #[test]
    fn test_draw_rate() {
        let mut m = TrainingMetrics::new(Mark::X);
        m.record_episode(result(None, 9));
        m.record_episode(result(Some(Mark::X), 5));
        assert!((m.draw_rate(10) - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_last_n_window() {
        let mut m = TrainingMetrics::new(Mark::X);
        m.record_episode(result(Some(Mark::O), 5));
        m.record_episode(result(Some(Mark::X), 5));
        assert_eq!(m.win_rate(1), 1.0);
        assert_eq!(m.win_rate(2), 0.5);
    }

    #[test]
    fn test_average_td_error_uses_magnitude() {
        let mut m = TrainingMetrics::new(Mark::X);
        m.record_update(1.0);
        m.record_update(-3.0);
        assert!((m.average_td_error(10) - 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_average_game_length() {
        let mut m = TrainingMetrics::new(Mark::X);
        m.record_episode(result(None, 20));
        m.record_episode(result(None, 30));
        assert!((m.average_game_length(10) - 25.0).abs() < 1e-9);
    }

    #[test]
    fn test_capacity_caps_window_not_total() {
        let mut m = TrainingMetrics::with_capacity(Mark::X, 3);
        for _ in 0..5 {
            m.record_episode(result(Some(Mark::X), 5));
        }
        m.record_episode(result(None, 9));
        assert_eq!(m.total_episodes(), 6);
        assert!((m.draw_rate(100) - 1.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_empty_metrics_are_zero() {
        let m = TrainingMetrics::new(Mark::X);
        assert_eq!(m.win_rate(10), 0.0);
        assert_eq!(m.average_td_error(10), 0.0);
        assert_eq!(m.average_game_length(10), 0.0);
    }
}
