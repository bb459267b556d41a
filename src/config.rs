//! Application configuration
//!
//! Loaded from an optional YAML file, then overridden from the environment
//! (`PORT`, `FRONTEND_URL`, `DATABASE_PATH`), then validated.
//!
//! ```yaml
//! server:
//!   port: 3001
//!   cors_origin: http://localhost:3000
//! database:
//!   path: recipes.duckdb
//!   missing_cursor: restart
//! pagination:
//!   recipes_default_take: 20
//!   users_default_take: 10
//!   max_take: 100
//! ```

use crate::error::{Error, Result};
use crate::store::MissingCursorPolicy;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

// ============================================================================
// Top-Level Config
// ============================================================================

/// Complete application configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppConfig {
    /// HTTP server settings
    #[serde(default)]
    pub server: ServerConfig,

    /// Storage settings
    #[serde(default)]
    pub database: DatabaseConfig,

    /// List endpoint page sizes
    #[serde(default)]
    pub pagination: PaginationConfig,
}

impl AppConfig {
    /// Load configuration from a YAML file, apply environment overrides and validate
    ///
    /// With no path, defaults are used before the overrides.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => {
                let content = fs::read_to_string(path).map_err(|e| {
                    if e.kind() == std::io::ErrorKind::NotFound {
                        Error::FileNotFound {
                            path: path.display().to_string(),
                        }
                    } else {
                        Error::config(format!(
                            "Failed to read config file '{}': {}",
                            path.display(),
                            e
                        ))
                    }
                })?;
                serde_yaml::from_str(&content)?
            }
            None => Self::default(),
        };

        config.apply_overrides(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Parse and validate configuration from a YAML string (no environment overrides)
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Apply `PORT`, `FRONTEND_URL` and `DATABASE_PATH` overrides from `lookup`
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<()> {
        if let Some(port) = lookup("PORT") {
            self.server.port = port
                .trim()
                .parse()
                .map_err(|_| Error::invalid_config("PORT", format!("'{port}' is not a valid port")))?;
        }
        if let Some(origin) = lookup("FRONTEND_URL") {
            self.server.cors_origin = origin;
        }
        if let Some(path) = lookup("DATABASE_PATH") {
            self.database.path = path;
        }
        Ok(())
    }

    /// Check values that serde cannot
    pub fn validate(&self) -> Result<()> {
        if self.server.host.trim().is_empty() {
            return Err(Error::invalid_config("server.host", "cannot be empty"));
        }
        if self.database.path.trim().is_empty() {
            return Err(Error::invalid_config("database.path", "cannot be empty"));
        }
        self.pagination.validate()
    }

    /// Render as YAML
    pub fn to_yaml(&self) -> Result<String> {
        Ok(serde_yaml::to_string(self)?)
    }
}

// ============================================================================
// Server
// ============================================================================

/// HTTP server settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Interface to bind
    #[serde(default = "default_host")]
    pub host: String,

    /// Port to listen on
    #[serde(default = "default_port")]
    pub port: u16,

    /// Allowed CORS origin (the frontend URL)
    #[serde(default = "default_cors_origin")]
    pub cors_origin: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            cors_origin: default_cors_origin(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    3001
}

fn default_cors_origin() -> String {
    "http://localhost:3000".to_string()
}

// ============================================================================
// Database
// ============================================================================

/// Storage settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// DuckDB file, or `:memory:`
    #[serde(default = "default_database_path")]
    pub path: String,

    /// What list endpoints do with a cursor whose record was deleted
    #[serde(default)]
    pub missing_cursor: MissingCursorPolicy,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_database_path(),
            missing_cursor: MissingCursorPolicy::default(),
        }
    }
}

fn default_database_path() -> String {
    ":memory:".to_string()
}

// ============================================================================
// Pagination
// ============================================================================

/// Page sizes for list endpoints
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaginationConfig {
    /// `take` used by `GET /recipes` when none is given
    #[serde(default = "default_recipes_take")]
    pub recipes_default_take: usize,

    /// `take` used by `GET /users` when none is given
    #[serde(default = "default_users_take")]
    pub users_default_take: usize,

    /// Largest `take` a client may request
    #[serde(default = "default_max_take")]
    pub max_take: usize,
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            recipes_default_take: default_recipes_take(),
            users_default_take: default_users_take(),
            max_take: default_max_take(),
        }
    }
}

impl PaginationConfig {
    /// Default takes must lie in `1..=max_take`
    pub fn validate(&self) -> Result<()> {
        if self.max_take == 0 {
            return Err(Error::invalid_config("pagination.max_take", "must be at least 1"));
        }
        for (field, take) in [
            ("pagination.recipes_default_take", self.recipes_default_take),
            ("pagination.users_default_take", self.users_default_take),
        ] {
            if take == 0 || take > self.max_take {
                return Err(Error::invalid_config(
                    field,
                    format!("must be between 1 and {}", self.max_take),
                ));
            }
        }
        Ok(())
    }
}

fn default_recipes_take() -> usize {
    20
}

fn default_users_take() -> usize {
    10
}

fn default_max_take() -> usize {
    100
}
