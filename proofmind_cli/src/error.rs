use proofmind_core::CoreError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error(transparent)]
    Core(#[from] CoreError),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Invalid key file {path}: {reason}")]
    InvalidKey { path: String, reason: String },
    #[error("No owner address given and no wallet session; run `proofmind connect` or pass --owner")]
    NoOwner,
    #[error("Refusing to overwrite {0}; pass --force")]
    KeyExists(String),
}
