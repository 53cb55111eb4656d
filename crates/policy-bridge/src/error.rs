use thiserror::Error;

#[derive(Debug, Error)]
pub enum SerializeError {
    #[error("no replacer rule encodes {kind} values")]
    Unsupported { kind: &'static str },
    #[error("iterable nesting exceeds {max_depth} levels")]
    DepthExceeded { max_depth: usize },
    #[error("json encoding failed: {0}")]
    Json(#[from] serde_json::Error),
}

/// Ready-made error type for converters and policies plugged into the
/// wrapper. Any type implementing `From<SerializeError>` works as well.
#[derive(Debug, Error)]
pub enum Error {
    #[error("input conversion failed: {0}")]
    Input(#[from] serde_json::Error),
    #[error("policy failed: {0}")]
    Policy(String),
    #[error(transparent)]
    Serialize(#[from] SerializeError),
}

impl Error {
    pub fn policy(message: impl Into<String>) -> Self {
        Error::Policy(message.into())
    }
}
