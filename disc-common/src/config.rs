//! Configuration loading and root folder resolution

use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::{Error, Result};

/// Environment variable naming the root folder
pub const ROOT_FOLDER_ENV: &str = "DISC_ROOT_FOLDER";

/// Directory name used under platform config/data folders
pub const APP_DIR_NAME: &str = "disc-assessment";

pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 5760;
pub const DEFAULT_DATABASE_FILE: &str = "disc.db";
pub const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5000;
pub const DEFAULT_MAX_CONNECTIONS: u32 = 10;

/// Optional TOML configuration file contents
///
/// Every key is optional; absent keys fall back to compiled defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TomlConfig {
    pub root_folder: Option<PathBuf>,
    pub host: Option<String>,
    pub port: Option<u16>,
    pub database_file: Option<String>,
    pub busy_timeout_ms: Option<u64>,
    pub max_connections: Option<u32>,
}

impl TomlConfig {
    /// Parse TOML text
    pub fn parse(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| Error::Config(format!("Invalid config file: {}", e)))
    }

    /// Load a config file
    ///
    /// A missing file is not an error: a warning is logged and defaults are
    /// returned. A file that exists but does not parse is a `Config` error.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            warn!("Config file not found, using defaults: {}", path.display());
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        let config = Self::parse(&content)?;
        info!("Loaded config file: {}", path.display());
        Ok(config)
    }

    /// Load the explicit path if given, else the platform default location if present
    pub fn load_or_default(explicit: Option<&Path>) -> Result<Self> {
        match explicit {
            Some(path) => Self::load(path),
            None => match default_config_path() {
                Some(path) if path.exists() => Self::load(&path),
                _ => Ok(Self::default()),
            },
        }
    }
}

/// Database connection settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatabaseConfig {
    pub path: PathBuf,
    pub busy_timeout_ms: u64,
    pub max_connections: u32,
}

impl DatabaseConfig {
    /// Defaults for a database file at `path`
    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            busy_timeout_ms: DEFAULT_BUSY_TIMEOUT_MS,
            max_connections: DEFAULT_MAX_CONNECTIONS,
        }
    }
}

/// Fully resolved service configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceConfig {
    pub root_folder: PathBuf,
    pub host: String,
    pub port: u16,
    pub database: DatabaseConfig,
}

impl ServiceConfig {
    /// Merge command-line values over the config file over compiled defaults
    pub fn resolve(
        cli_root_folder: Option<&Path>,
        cli_host: Option<&str>,
        cli_port: Option<u16>,
        file: &TomlConfig,
    ) -> Self {
        let root_folder = resolve_root_folder(cli_root_folder, ROOT_FOLDER_ENV, file);
        let database_file = file
            .database_file
            .clone()
            .unwrap_or_else(|| DEFAULT_DATABASE_FILE.to_string());

        Self {
            host: cli_host
                .map(str::to_string)
                .or_else(|| file.host.clone())
                .unwrap_or_else(|| DEFAULT_HOST.to_string()),
            port: cli_port.or(file.port).unwrap_or(DEFAULT_PORT),
            database: DatabaseConfig {
                path: root_folder.join(database_file),
                busy_timeout_ms: file.busy_timeout_ms.unwrap_or(DEFAULT_BUSY_TIMEOUT_MS),
                max_connections: file.max_connections.unwrap_or(DEFAULT_MAX_CONNECTIONS),
            },
            root_folder,
        }
    }

    /// Create the root folder if it does not exist
    pub fn ensure_root_folder(&self) -> Result<()> {
        if !self.root_folder.exists() {
            std::fs::create_dir_all(&self.root_folder)?;
            info!("Created root folder: {}", self.root_folder.display());
        }
        Ok(())
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Root folder resolution priority order:
/// 1. Command-line argument (highest priority)
/// 2. Environment variable
/// 3. TOML config file
/// 4. OS-dependent compiled default (fallback)
pub fn resolve_root_folder(
    cli_arg: Option<&Path>,
    env_var_name: &str,
    file: &TomlConfig,
) -> PathBuf {
    if let Some(path) = cli_arg {
        return path.to_path_buf();
    }

    if let Ok(path) = std::env::var(env_var_name) {
        if !path.trim().is_empty() {
            return PathBuf::from(path);
        }
    }

    if let Some(path) = &file.root_folder {
        return path.clone();
    }

    default_root_folder()
}

/// Platform config file location: `<config dir>/disc-assessment/config.toml`
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join(APP_DIR_NAME).join("config.toml"))
}

/// Get OS-dependent default root folder path
fn default_root_folder() -> PathBuf {
    dirs::data_local_dir()
        .map(|d| d.join(APP_DIR_NAME))
        .unwrap_or_else(|| PathBuf::from("./disc_data"))
}
