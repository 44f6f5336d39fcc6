use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("transport {0}")]
    Transport(String),
    #[error("validation {0}")]
    Validation(String),
    #[error("keys {0}")]
    Keys(String),
    #[error("queue closed")]
    QueueClosed,
}
