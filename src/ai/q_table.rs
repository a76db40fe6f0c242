use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::QTableError;
use crate::game::StateKey;

/// One state's action values in the flat representation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QEntry {
    pub state: String,
    pub values: Vec<f64>,
}

/// Flat, language-neutral form of a Q-table: `(state, values)` pairs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QTableSnapshot {
    pub action_count: usize,
    pub entries: Vec<QEntry>,
}

/// Tabular state → action-value store.
///
/// States that have never been written read as all-zero action values.
/// The table only grows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(into = "QTableSnapshot", try_from = "QTableSnapshot")]
pub struct QTable {
    action_count: usize,
    values: HashMap<StateKey, Vec<f64>>,
    zeros: Vec<f64>,
}

impl QTable {
    pub fn new(action_count: usize) -> Self {
        QTable {
            action_count,
            values: HashMap::new(),
            zeros: vec![0.0; action_count],
        }
    }

    pub fn action_count(&self) -> usize {
        self.action_count
    }

    /// Number of states stored.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn contains(&self, state: &StateKey) -> bool {
        self.values.contains_key(state)
    }

    /// Action values for `state`; zeros if the state is unseen.
    pub fn values(&self, state: &StateKey) -> &[f64] {
        self.values.get(state).unwrap_or(&self.zeros)
    }

    pub fn value(&self, state: &StateKey, action: usize) -> f64 {
        self.values(state)[action]
    }

    /// Largest action value of `state` over all actions (0 if unseen).
    pub fn max_value(&self, state: &StateKey) -> f64 {
        self.values(state)
            .iter()
            .copied()
            .fold(f64::NEG_INFINITY, f64::max)
    }

    /// Mutable action values for `state`, inserting zeros if unseen.
    pub fn row_mut(&mut self, state: &StateKey) -> &mut [f64] {
        let action_count = self.action_count;
        self.values
            .entry(state.clone())
            .or_insert_with(|| vec![0.0; action_count])
    }

    /// Flat representation, sorted by state for stable output.
    pub fn snapshot(&self) -> QTableSnapshot {
        let mut entries: Vec<QEntry> = self
            .values
            .iter()
            .map(|(state, values)| QEntry {
                state: state.as_str().to_string(),
                values: values.clone(),
            })
            .collect();
        entries.sort_by(|a, b| a.state.cmp(&b.state));
        QTableSnapshot {
            action_count: self.action_count,
            entries,
        }
    }
}

impl From<QTable> for QTableSnapshot {
    fn from(table: QTable) -> Self {
        table.snapshot()
    }
}

impl TryFrom<QTableSnapshot> for QTable {
    type Error = QTableError;

    fn try_from(snapshot: QTableSnapshot) -> Result<Self, Self::Error> {
        if snapshot.action_count == 0 {
            return Err(QTableError::NoActions);
        }
        let mut table = QTable::new(snapshot.action_count);
        for entry in snapshot.entries {
            if entry.values.len() != snapshot.action_count {
                return Err(QTableError::ActionCountMismatch {
                    state: entry.state,
                    expected: snapshot.action_count,
                    found: entry.values.len(),
                });
            }
            let key = StateKey::from(entry.state);
            if table.values.contains_key(&key) {
                return Err(QTableError::DuplicateState(key.into()));
            }
            table.values.insert(key, entry.values);
        }
        Ok(table)
    }
}
