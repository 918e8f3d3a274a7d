use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Could not retrieve page: {message}")]
    Network { message: String },

    #[error("Could not parse price: {message}")]
    Parse { message: String },

    #[error("Session expired")]
    StaleSession,

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        AppError::Network {
            message: err.to_string(),
        }
    }
}

// Result type alias for convenience
pub type Result<T> = std::result::Result<T, AppError>;
