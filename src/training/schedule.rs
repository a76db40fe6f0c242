/// Exploration rate as a function of the episode index.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ExplorationSchedule {
    Constant {
        epsilon: f64,
    },
    /// Straight line from `start` to `end` over `decay_episodes`, then flat.
    Linear {
        start: f64,
        end: f64,
        decay_episodes: usize,
    },
    /// `min + (max - min) * exp(-decay_rate * episode)`.
    Exponential {
        max: f64,
        min: f64,
        decay_rate: f64,
    },
}

impl Default for ExplorationSchedule {
    fn default() -> Self {
        ExplorationSchedule::Exponential {
            max: 1.0,
            min: 0.01,
            decay_rate: 0.0005,
        }
    }
}

impl ExplorationSchedule {
    pub fn epsilon(&self, episode: usize) -> f64 {
        match *self {
            ExplorationSchedule::Constant { epsilon } => epsilon,
            ExplorationSchedule::Linear {
                start,
                end,
                decay_episodes,
            } => {
                if decay_episodes == 0 || episode >= decay_episodes {
                    return end;
                }
                let progress = episode as f64 / decay_episodes as f64;
                start + (end - start) * progress
            }
            ExplorationSchedule::Exponential {
                max,
                min,
                decay_rate,
            } => min + (max - min) * (-decay_rate * episode as f64).exp(),
        }
    }

    /// Check that every epsilon the schedule can produce lies in [0, 1].
    pub fn validate(&self) -> Result<(), String> {
        let in_unit = |name: &str, value: f64| {
            if (0.0..=1.0).contains(&value) {
                Ok(())
            } else {
                Err(format!("{name} must be in [0, 1], got {value}"))
            }
        };
        match *self {
            ExplorationSchedule::Constant { epsilon } => in_unit("epsilon", epsilon),
            ExplorationSchedule::Linear { start, end, .. } => {
                in_unit("start", start)?;
                in_unit("end", end)
            }
            ExplorationSchedule::Exponential {
                max,
                min,
                decay_rate,
            } => {
                in_unit("max", max)?;
                in_unit("min", min)?;
                if min > max {
                    return Err(format!("min ({min}) must not exceed max ({max})"));
                }
                if decay_rate < 0.0 {
                    return Err(format!("decay_rate must be non-negative, got {decay_rate}"));
                }
                Ok(())
            }
        }
    }
}
