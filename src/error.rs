use thiserror::Error;

/// The complete error taxonomy surfaced by every engine and by the codec,
/// visited-set, and generation-store layers beneath them.
#[derive(Error, Debug)]
pub enum SolverError {
    #[error("bad input: {0}")]
    BadInput(String),

    #[error("state space too large: {0}")]
    TooLarge(String),

    #[error("out of memory: {0}")]
    OutOfMemory(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("queue exhausted: {0}")]
    QueueExhausted(String),

    #[error("failed to spawn worker thread: {0}")]
    ThreadSpawn(String),

    #[error("internal error: {0}")]
    Internal(String),
}

pub type Result<T> = std::result::Result<T, SolverError>;
