use thiserror::Error;

/// Unified error type for ci-version operations
#[derive(Error, Debug)]
pub enum CiVersionError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Environment error: {0}")]
    Environment(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Ambiguous match: {0}")]
    Ambiguous(String),

    #[error("Tool invocation failed: {0}")]
    Tool(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience type alias for Results in ci-version
pub type Result<T> = std::result::Result<T, CiVersionError>;

impl CiVersionError {
    /// Create a configuration error with context
    pub fn config(msg: impl Into<String>) -> Self {
        CiVersionError::Config(msg.into())
    }

    /// Create an environment error with context
    pub fn environment(msg: impl Into<String>) -> Self {
        CiVersionError::Environment(msg.into())
    }

    /// Create a not-found error with context
    pub fn not_found(msg: impl Into<String>) -> Self {
        CiVersionError::NotFound(msg.into())
    }

    /// Create an ambiguous-match error with context
    pub fn ambiguous(msg: impl Into<String>) -> Self {
        CiVersionError::Ambiguous(msg.into())
    }

    /// Create a tool-invocation error with context
    pub fn tool(msg: impl Into<String>) -> Self {
        CiVersionError::Tool(msg.into())
    }
}
