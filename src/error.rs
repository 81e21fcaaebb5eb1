use thiserror::Error;

#[derive(Error, Debug)]
pub enum PlanscopeError {
    #[error("source not found: {0}")]
    SourceNotFound(String),

    #[error("failed to read {path}: {reason}")]
    ReadFailure { path: String, reason: String },

    #[error("invalid input: {0}")]
    Validation(String),

    #[error("project description too short: {chars} characters (minimum {min})")]
    TextTooShort { chars: usize, min: usize },

    #[error("model not found: {0} (run `planscope train` first)")]
    ModelNotFound(String),

    #[error("config parse error: {0}")]
    ConfigParse(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("toml parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    #[error("model artifact encoding error: {0}")]
    Artifact(#[from] bincode::Error),
}

impl PlanscopeError {
    /// Input rejected before any computation ran.
    pub fn is_rejection(&self) -> bool {
        matches!(self, Self::Validation(_) | Self::TextTooShort { .. })
    }
}

pub type Result<T> = std::result::Result<T, PlanscopeError>;
