use thiserror::Error;

#[derive(Debug, Error)]
pub enum BloomError {
    #[error("IO: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON: {0}")]
    SerdeJson(#[from] serde_json::Error),

    #[error("bit array size must be greater than zero")]
    ZeroBits,

    #[error("at least one hash strategy is required")]
    NoStrategies,

    #[error("double hash modulus must be greater than zero")]
    ZeroModulus,

    #[error("digest backend {name} unavailable: {reason}")]
    Backend { name: &'static str, reason: String },

    #[error("invalid key: {0}")]
    InvalidKey(String),
}

pub type Result<T> = std::result::Result<T, BloomError>;
