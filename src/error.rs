use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Authentication failed: {0}")]
    Authentication(String),

    #[error("Failed to list stacks: {0}")]
    Listing(String),

    #[error("Failed to update stack: {0}")]
    Mutation(String),

    #[error("GraphQL error: {0}")]
    GraphQl(String),

    #[error("HTTP error: {status}, body: {body}")]
    Status {
        status: reqwest::StatusCode,
        body: String,
    },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),
}

impl From<config::ConfigError> for AppError {
    fn from(e: config::ConfigError) -> Self {
        AppError::Config(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
