use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum SDError {
    #[error("Confirmation code does not match")]
    ChallengeMismatch,

    #[error("Path not found: {}", .0.display())]
    PathNotFound(PathBuf),

    #[error("Failed to remove {}: {source}", path.display())]
    DeletionEntryFailure {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Store command failed: {0}")]
    StoreCommandFailure(String),

    #[error("A destruction is already in progress")]
    DestructionInProgress,

    #[error("Site has already been destroyed")]
    AlreadyDestroyed,

    #[error("Destruction task failed: {0}")]
    TaskFailed(String),

    #[error("Unknown method: {0}")]
    MethodNotFound(String),

    #[error("Unauthorized request")]
    Unauthorized,

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Database error: {0}")]
    SqliteError(#[from] rusqlite::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}

pub type SDResult<T> = Result<T, SDError>;
