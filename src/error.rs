use std::path::PathBuf;

/// A move that violates the board's legality rules. Always surfaced to the
/// caller, never corrected.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IllegalMoveError {
    #[error("cell ({row}, {col}) is out of bounds")]
    OutOfBounds { row: usize, col: usize },

    #[error("cell ({row}, {col}) is already occupied")]
    Occupied { row: usize, col: usize },

    #[error("column {0} does not exist")]
    InvalidColumn(usize),

    #[error("column {0} is full")]
    ColumnFull(usize),

    #[error("the game is already over")]
    GameOver,
}

/// Errors raised while rebuilding a Q-table from its flat representation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum QTableError {
    #[error("q-table must have at least one action")]
    NoActions,

    #[error("state {state:?} has {found} action values, expected {expected}")]
    ActionCountMismatch {
        state: String,
        expected: usize,
        found: usize,
    },

    #[error("state {0:?} appears more than once")]
    DuplicateState(String),

    #[error("q-table has {found} actions but the game has {expected}")]
    WrongActionSpace { expected: usize, found: usize },
}

/// Errors that can occur during checkpoint operations.
#[derive(Debug, thiserror::Error)]
pub enum CheckpointError {
    #[error("no 'latest' symlink found in {0}")]
    NoLatestSymlink(PathBuf),

    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("invalid q-table in {path}: {source}")]
    Table { path: PathBuf, source: QTableError },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Errors that can occur during training.
#[derive(Debug, thiserror::Error)]
pub enum TrainingError {
    #[error("illegal move during training: {0}")]
    IllegalMove(#[from] IllegalMoveError),

    #[error("checkpoint error: {0}")]
    Checkpoint(#[from] CheckpointError),
}

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    FileRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse TOML: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("config validation error: {0}")]
    Validation(String),
}
