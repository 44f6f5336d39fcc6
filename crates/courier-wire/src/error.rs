use thiserror::Error;

#[derive(Debug, Error)]
pub enum WireError {
    #[error("invalid field: {0}")]
    InvalidField(&'static str),
    #[error("json error")]
    JsonError,
}

pub type Result<T> = std::result::Result<T, WireError>;

impl From<serde_json::Error> for WireError {
    fn from(_: serde_json::Error) -> Self {
        WireError::JsonError
    }
}
