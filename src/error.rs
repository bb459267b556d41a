//! Error types for recipe-pager
//!
//! This module defines the error hierarchy for the entire crate.
//! Every fallible call in the crate returns [`Result<T>`].
//!
//! The paginator never constructs its own errors for store failures: whatever
//! a [`RecordStore`](crate::store::RecordStore) returns is handed back to the
//! caller untouched.

use thiserror::Error;

/// The main error type for recipe-pager
#[derive(Error, Debug)]
pub enum Error {
    // ============================================================================
    // Configuration Errors
    // ============================================================================
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Invalid config value for '{field}': {message}")]
    InvalidConfigValue { field: String, message: String },

    #[error("Failed to parse YAML: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    #[error("Failed to parse JSON: {0}")]
    JsonParse(#[from] serde_json::Error),

    // ============================================================================
    // Request Errors
    // ============================================================================
    #[error("Invalid request: {message}")]
    InvalidRequest { message: String },

    #[error("{entity} '{id}' not found")]
    NotFound { entity: String, id: String },

    // ============================================================================
    // Storage Errors
    // ============================================================================
    #[error("Record store error: {message}")]
    Store { message: String },

    #[error("Database error: {0}")]
    Database(#[from] duckdb::Error),

    #[error("Unsupported order field '{field}' for {table}")]
    UnsupportedOrder { table: String, field: String },

    #[error("Storage task failed: {0}")]
    Join(#[from] tokio::task::JoinError),

    // ============================================================================
    // Pagination Control
    // ============================================================================
    #[error("Pagination cancelled before the store responded")]
    Cancelled,

    // ============================================================================
    // I/O Errors
    // ============================================================================
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("File not found: {path}")]
    FileNotFound { path: String },

    // ============================================================================
    // Generic Errors
    // ============================================================================
    #[error("{0}")]
    Other(String),

    #[error(transparent)]
    Anyhow(#[from] anyhow::Error),
}

impl Error {
    /// Create a config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create an invalid config value error
    pub fn invalid_config(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidConfigValue {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create an invalid request error
    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::InvalidRequest {
            message: message.into(),
        }
    }

    /// Create a not found error
    pub fn not_found(entity: impl Into<String>, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity: entity.into(),
            id: id.into(),
        }
    }

    /// Create a record store error
    pub fn store(message: impl Into<String>) -> Self {
        Self::Store {
            message: message.into(),
        }
    }

    /// Create an unsupported order error
    pub fn unsupported_order(table: impl Into<String>, field: impl Into<String>) -> Self {
        Self::UnsupportedOrder {
            table: table.into(),
            field: field.into(),
        }
    }

    /// Check if this error came from the storage layer
    pub fn is_store_failure(&self) -> bool {
        matches!(
            self,
            Error::Store { .. } | Error::Database(_) | Error::Join(_) | Error::Anyhow(_)
        )
    }

    /// Check if this error is retryable
    pub fn is_retryable(&self) -> bool {
        match self {
            Error::Store { .. } | Error::Join(_) | Error::Cancelled => true,
            Error::Database(e) => !matches!(e, duckdb::Error::QueryReturnedNoRows),
            _ => false,
        }
    }
}

/// Result type alias for recipe-pager
pub type Result<T> = std::result::Result<T, Error>;

/// Extension trait for adding context to errors
pub trait ResultExt<T> {
    /// Add context to an error
    fn context(self, message: impl Into<String>) -> Result<T>;

    /// Add context with a closure (lazy evaluation)
    fn with_context<F: FnOnce() -> String>(self, f: F) -> Result<T>;
}

impl<T, E: Into<Error>> ResultExt<T> for std::result::Result<T, E> {
    fn context(self, message: impl Into<String>) -> Result<T> {
        self.map_err(|e| {
            let inner = e.into();
            Error::Other(format!("{}: {}", message.into(), inner))
        })
    }

    fn with_context<F: FnOnce() -> String>(self, f: F) -> Result<T> {
        self.map_err(|e| {
            let inner = e.into();
            Error::Other(format!("{}: {}", f(), inner))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::config("test message");
        assert_eq!(err.to_string(), "Configuration error: test message");

        let err = Error::invalid_request("take must be at least 1");
        assert_eq!(err.to_string(), "Invalid request: take must be at least 1");

        let err = Error::not_found("Recipe", "abc");
        assert_eq!(err.to_string(), "Recipe 'abc' not found");

        let err = Error::unsupported_order("recipes", "password");
        assert_eq!(
            err.to_string(),
            "Unsupported order field 'password' for recipes"
        );
    }

    #[test]
    fn test_is_retryable() {
        assert!(Error::store("connection reset").is_retryable());
        assert!(Error::Cancelled.is_retryable());

        assert!(!Error::invalid_request("bad take").is_retryable());
        assert!(!Error::config("test").is_retryable());
        assert!(!Error::unsupported_order("users", "x").is_retryable());
    }

    #[test]
    fn test_is_store_failure() {
        assert!(Error::store("down").is_store_failure());
        assert!(Error::from(anyhow::anyhow!("custom backend")).is_store_failure());
        assert!(!Error::Cancelled.is_store_failure());
        assert!(!Error::invalid_request("x").is_store_failure());
    }

    #[test]
    fn test_result_context() {
        let result: Result<()> = Err(Error::config("inner"));
        let with_context = result.context("outer");
        assert!(with_context
            .unwrap_err()
            .to_string()
            .contains("outer: Configuration error: inner"));
    }
}
