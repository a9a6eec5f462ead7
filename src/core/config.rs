//! Configuration management for the MCP server.
//!
//! Values come from defaults, overridden by `MCP_*` environment variables
//! (a `.env` file in the working directory is loaded first).

use super::error::{Error, Result};
use super::transport::TransportConfig;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::{info, warn};

/// Main configuration structure for the MCP server.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Server identification and metadata.
    pub server: ServerConfig,

    /// Logging configuration.
    pub logging: LoggingConfig,

    /// Transport configuration.
    pub transport: TransportConfig,

    /// Security and path validation configuration.
    pub security: SecurityConfig,

    /// Multi-turn session configuration.
    pub sessions: SessionsConfig,

    /// Settings used by individual tools.
    pub tools: ToolsConfig,
}

/// Server identification configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// The name of the server as reported to clients.
    pub name: String,

    /// The version of the server.
    pub version: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            name: "stateful-mcp-server".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level filter (e.g., "info", "debug", "trace").
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

/// Configuration for security and path validation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityConfig {
    /// Optional root directory for file writes.
    /// If None, no path restrictions are enforced.
    pub root_path: Option<PathBuf>,

    /// Whether an existing symlink may be written through.
    pub allow_symlinks: bool,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            root_path: None,
            allow_symlinks: true,
        }
    }
}

/// Configuration for the session store.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SessionsConfig {
    /// Sessions idle for longer than this are discarded. `None` keeps
    /// sessions until they complete or the process exits.
    pub idle_timeout_secs: Option<u64>,
}

/// Settings consumed by tool implementations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolsConfig {
    /// Directory where `build_profile` saves profiles.
    pub profile_dir: PathBuf,
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            profile_dir: PathBuf::from("."),
        }
    }
}

impl Config {
    /// Create a new configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Load configuration from environment variables.
    ///
    /// Unparsable values are logged and the default is kept.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        let mut config = Self::default();

        if let Ok(name) = std::env::var("MCP_SERVER_NAME") {
            config.server.name = name;
        }

        if let Ok(level) = std::env::var("MCP_LOG_LEVEL") {
            config.logging.level = level;
        }

        config.transport = TransportConfig::from_env();

        if let Ok(root_path) = std::env::var("MCP_ROOT_PATH") {
            config.security.root_path = Some(PathBuf::from(root_path));
            info!("Path security enabled: root directory set to {:?}", config.security.root_path);
        } else {
            warn!("MCP_ROOT_PATH not set - create_file may write anywhere the process can.");
        }

        if let Ok(allow_symlinks) = std::env::var("MCP_ALLOW_SYMLINKS") {
            config.security.allow_symlinks = allow_symlinks.parse().unwrap_or(true);
            info!("Symlinks allowed: {}", config.security.allow_symlinks);
        }

        if let Ok(timeout) = std::env::var("MCP_SESSION_IDLE_TIMEOUT_SECS") {
            match timeout.parse::<u64>() {
                Ok(0) => config.sessions.idle_timeout_secs = None,
                Ok(secs) => {
                    config.sessions.idle_timeout_secs = Some(secs);
                    info!("Idle sessions expire after {}s", secs);
                }
                Err(_) => warn!("Invalid MCP_SESSION_IDLE_TIMEOUT_SECS '{}', sessions never expire", timeout),
            }
        }

        if let Ok(dir) = std::env::var("MCP_PROFILE_DIR") {
            config.tools.profile_dir = PathBuf::from(dir);
        }

        config
    }

    /// Check values that cannot be caught while parsing.
    pub fn validate(&self) -> Result<()> {
        if self.server.name.trim().is_empty() {
            return Err(Error::config("server name must not be empty"));
        }

        if let Some(root) = &self.security.root_path
            && !root.is_dir()
        {
            return Err(Error::config(format!(
                "MCP_ROOT_PATH {} is not a directory",
                root.display()
            )));
        }

        if self.tools.profile_dir.as_os_str().is_empty() {
            return Err(Error::config("profile directory must not be empty"));
        }

        Ok(())
    }
}
