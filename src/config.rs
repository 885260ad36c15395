//! Configuration management for record-gate.
//!
//! Every option can be given on the command line or through an environment
//! variable with the `RECORD_GATE_` prefix:
//!
//! - `RECORD_GATE_HOST` - Server bind address (default: 0.0.0.0)
//! - `RECORD_GATE_PORT` - Server port (default: 3000)
//! - `RECORD_GATE_AUTH_SECRET` - HMAC secret for bearer tokens
//! - `RECORD_GATE_AUTH_ENABLED` - Enforce bearer tokens (default: true)
//! - `RECORD_GATE_LOGIN_USERNAME` - Username accepted by /login (default: admin)
//! - `RECORD_GATE_LOGIN_PASSWORD` - Password accepted by /login (default: admin)
//! - `RECORD_GATE_STORAGE_DIR` - Directory holding uploaded files (default: file)
//! - `RECORD_GATE_MAX_BODY_BYTES` - Request body limit (default: 64MB)
//!
//! # Example
//!
//! ```ignore
//! use clap::Parser;
//! use record_gate::config::Config;
//!
//! let config = Config::parse();
//! config.validate()?;
//! println!("Listening on {}", config.bind_address());
//! ```

use std::path::PathBuf;

use clap::{ArgAction, Parser};

use crate::server::{RouterConfig, DEFAULT_LOGIN, DEFAULT_MAX_BODY_BYTES};

// =============================================================================
// Default Values
// =============================================================================

/// Default server host.
pub const DEFAULT_HOST: &str = "0.0.0.0";

/// Default server port.
pub const DEFAULT_PORT: u16 = 3000;

/// Default directory for uploaded files.
pub const DEFAULT_STORAGE_DIR: &str = "file";

// =============================================================================
// CLI Arguments
// =============================================================================

/// record-gate - authenticated JSON records and file uploads over HTTP.
#[derive(Parser, Debug, Clone)]
#[command(name = "record-gate")]
#[command(author, version, about, long_about = None)]
pub struct Config {
    // =========================================================================
    // Server Configuration
    // =========================================================================
    /// Host address to bind the server to.
    #[arg(long, default_value = DEFAULT_HOST, env = "RECORD_GATE_HOST")]
    pub host: String,

    /// Port to listen on.
    #[arg(short, long, default_value_t = DEFAULT_PORT, env = "RECORD_GATE_PORT")]
    pub port: u16,

    /// Maximum accepted request body size in bytes.
    ///
    /// Upload bodies are held in memory in full before they are decoded.
    #[arg(long, default_value_t = DEFAULT_MAX_BODY_BYTES, env = "RECORD_GATE_MAX_BODY_BYTES")]
    pub max_body_bytes: usize,

    // =========================================================================
    // Authentication Configuration
    // =========================================================================
    /// Secret key for signing bearer tokens.
    ///
    /// If not provided and auth is enabled, the server will fail to start.
    #[arg(long, env = "RECORD_GATE_AUTH_SECRET", hide_env_values = true)]
    pub auth_secret: Option<String>,

    /// Enforce bearer tokens on every route except /login.
    ///
    /// WARNING: Only disable authentication for local testing.
    #[arg(
        long,
        default_value_t = true,
        action = ArgAction::Set,
        env = "RECORD_GATE_AUTH_ENABLED"
    )]
    pub auth_enabled: bool,

    /// Username accepted by POST /login.
    #[arg(long, default_value = DEFAULT_LOGIN, env = "RECORD_GATE_LOGIN_USERNAME")]
    pub login_username: String,

    /// Password accepted by POST /login.
    #[arg(
        long,
        default_value = DEFAULT_LOGIN,
        env = "RECORD_GATE_LOGIN_PASSWORD",
        hide_env_values = true
    )]
    pub login_password: String,

    // =========================================================================
    // Storage Configuration
    // =========================================================================
    /// Directory holding uploaded files. Must exist at startup.
    #[arg(long, default_value = DEFAULT_STORAGE_DIR, env = "RECORD_GATE_STORAGE_DIR")]
    pub storage_dir: PathBuf,

    // =========================================================================
    // Logging Configuration
    // =========================================================================
    /// Enable verbose logging (debug level).
    #[arg(short, long, default_value_t = false)]
    pub verbose: bool,

    /// Disable request tracing.
    #[arg(long, default_value_t = false)]
    pub no_tracing: bool,
}

impl Config {
    /// Validate the configuration and return an error message if invalid.
    pub fn validate(&self) -> Result<(), String> {
        if self.auth_enabled && self.auth_secret.as_deref().unwrap_or("").is_empty() {
            return Err(
                "Authentication is enabled but no secret provided. \
                 Set --auth-secret or RECORD_GATE_AUTH_SECRET, or disable auth with --auth-enabled=false"
                    .to_string(),
            );
        }

        if self.login_username.is_empty() {
            return Err("login_username must not be empty".to_string());
        }

        if self.max_body_bytes == 0 {
            return Err("max_body_bytes must be greater than 0".to_string());
        }

        if self.storage_dir.as_os_str().is_empty() {
            return Err("storage_dir must not be empty".to_string());
        }

        Ok(())
    }

    /// Get the server bind address as "host:port".
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Get the auth secret, or an empty string when unset (call validate() first).
    pub fn auth_secret_or_empty(&self) -> &str {
        self.auth_secret.as_deref().unwrap_or("")
    }

    /// Build the router configuration from these settings.
    pub fn router_config(&self) -> RouterConfig {
        let router_config = if self.auth_enabled {
            RouterConfig::new(self.auth_secret_or_empty())
        } else {
            RouterConfig::without_auth()
        };

        router_config
            .with_login(&self.login_username, &self.login_password)
            .with_max_body_bytes(self.max_body_bytes)
            .with_tracing(!self.no_tracing)
    }
}

// =============================================================================
// Tests
// =============================================================================
