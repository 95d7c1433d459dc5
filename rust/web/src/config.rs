//! Server configuration.
//!
//! Values are layered: built-in defaults, then the TOML file named by
//! `HOLDEM_CONFIG`, then `HOLDEM_*` environment variables, then flags given
//! to the server binary.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use holdem_engine::rules::Blinds;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::archiver::RetryPolicy;
use crate::registry::TableRules;

pub const CONFIG_ENV: &str = "HOLDEM_CONFIG";
pub const HOST_ENV: &str = "HOLDEM_HOST";
pub const PORT_ENV: &str = "HOLDEM_PORT";
pub const SEED_ENV: &str = "HOLDEM_SEED";
pub const DATABASE_ENV: &str = "HOLDEM_DATABASE";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableSettings {
    pub small_blind: u32,
    pub big_blind: u32,
    /// Minimum opening bet; larger bets must be multiples of it.
    pub min_bet: u32,
    /// Base seed for reproducible deals.
    pub seed: Option<u64>,
}

impl Default for TableSettings {
    fn default() -> Self {
        Self {
            small_blind: 20,
            big_blind: 40,
            min_bet: 40,
            seed: None,
        }
    }
}

impl TableSettings {
    pub fn rules(&self) -> TableRules {
        TableRules {
            blinds: Blinds::new(self.small_blind, self.big_blind),
            min_bet: self.min_bet,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArchiveSettings {
    /// SQLite file for finished hands; kept in memory when unset.
    pub database: Option<PathBuf>,
    pub retry_interval_ms: u64,
    pub initial_backoff_ms: u64,
    pub max_backoff_ms: u64,
    pub max_attempts: u32,
}

impl Default for ArchiveSettings {
    fn default() -> Self {
        Self {
            database: None,
            retry_interval_ms: 5_000,
            initial_backoff_ms: 500,
            max_backoff_ms: 60_000,
            max_attempts: 8,
        }
    }
}

impl ArchiveSettings {
    pub fn retry_interval(&self) -> Duration {
        Duration::from_millis(self.retry_interval_ms)
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            initial_backoff: Duration::from_millis(self.initial_backoff_ms),
            max_backoff: Duration::from_millis(self.max_backoff_ms),
            max_attempts: self.max_attempts,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppConfig {
    pub server: ServerSettings,
    pub table: TableSettings,
    pub archive: ArchiveSettings,
}

impl AppConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        let table = &self.table;
        if table.small_blind == 0 || table.small_blind > table.big_blind {
            return Err(ConfigError::Invalid(format!(
                "blinds must satisfy 0 < small_blind <= big_blind, got {}/{}",
                table.small_blind, table.big_blind
            )));
        }
        if table.min_bet < table.big_blind {
            return Err(ConfigError::Invalid(format!(
                "min_bet ({}) must be at least the big blind ({})",
                table.min_bet, table.big_blind
            )));
        }
        if self.archive.max_attempts == 0 {
            return Err(ConfigError::Invalid(
                "archive.max_attempts must be >= 1".into(),
            ));
        }
        if self.archive.retry_interval_ms == 0 {
            return Err(ConfigError::Invalid(
                "archive.retry_interval_ms must be > 0".into(),
            ));
        }
        if self.server.host.trim().is_empty() {
            return Err(ConfigError::Invalid("server.host cannot be empty".into()));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueSource {
    Default,
    File,
    Env,
    Cli,
}

/// Where each overridable value came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ConfigSources {
    pub host: ValueSource,
    pub port: ValueSource,
    pub seed: ValueSource,
    pub database: ValueSource,
}

impl Default for ConfigSources {
    fn default() -> Self {
        Self {
            host: ValueSource::Default,
            port: ValueSource::Default,
            seed: ValueSource::Default,
            database: ValueSource::Default,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ConfigResolved {
    pub config: AppConfig,
    pub sources: ConfigSources,
}

/// Values given on the command line; `None` keeps the resolved value.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub seed: Option<u64>,
    pub database: Option<PathBuf>,
}

impl ConfigResolved {
    pub fn apply(mut self, overrides: Overrides) -> Result<Self, ConfigError> {
        if let Some(host) = overrides.host {
            self.config.server.host = host;
            self.sources.host = ValueSource::Cli;
        }
        if let Some(port) = overrides.port {
            self.config.server.port = port;
            self.sources.port = ValueSource::Cli;
        }
        if let Some(seed) = overrides.seed {
            self.config.table.seed = Some(seed);
            self.sources.seed = ValueSource::Cli;
        }
        if let Some(database) = overrides.database {
            self.config.archive.database = Some(database);
            self.sources.database = ValueSource::Cli;
        }
        self.config.validate()?;
        Ok(self)
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

pub fn load() -> Result<AppConfig, ConfigError> {
    load_with_sources().map(|resolved| resolved.config)
}

pub fn load_with_sources() -> Result<ConfigResolved, ConfigError> {
    let mut cfg = AppConfig::default();
    let mut sources = ConfigSources::default();

    if let Some(path) = env_value(CONFIG_ENV) {
        apply_file(&mut cfg, &mut sources, Path::new(&path))?;
    }

    if let Some(host) = env_value(HOST_ENV) {
        cfg.server.host = host;
        sources.host = ValueSource::Env;
    }
    if let Some(port) = env_value(PORT_ENV) {
        cfg.server.port = port
            .parse()
            .map_err(|_| ConfigError::Invalid(format!("Invalid {PORT_ENV}: {port}")))?;
        sources.port = ValueSource::Env;
    }
    if let Some(seed) = env_value(SEED_ENV) {
        cfg.table.seed = Some(
            seed.parse()
                .map_err(|_| ConfigError::Invalid(format!("Invalid {SEED_ENV}: {seed}")))?,
        );
        sources.seed = ValueSource::Env;
    }
    if let Some(database) = env_value(DATABASE_ENV) {
        cfg.archive.database = Some(PathBuf::from(database));
        sources.database = ValueSource::Env;
    }

    cfg.validate()?;
    Ok(ConfigResolved {
        config: cfg,
        sources,
    })
}

fn env_value(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.is_empty())
}

#[derive(Debug, Default, Deserialize)]
struct FileConfig {
    #[serde(default)]
    server: FileServer,
    #[serde(default)]
    table: FileTable,
    #[serde(default)]
    archive: FileArchive,
}

#[derive(Debug, Default, Deserialize)]
struct FileServer {
    host: Option<String>,
    port: Option<u16>,
}

#[derive(Debug, Default, Deserialize)]
struct FileTable {
    small_blind: Option<u32>,
    big_blind: Option<u32>,
    min_bet: Option<u32>,
    seed: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
struct FileArchive {
    database: Option<PathBuf>,
    retry_interval_ms: Option<u64>,
    initial_backoff_ms: Option<u64>,
    max_backoff_ms: Option<u64>,
    max_attempts: Option<u32>,
}

fn apply_file(
    cfg: &mut AppConfig,
    sources: &mut ConfigSources,
    path: &Path,
) -> Result<(), ConfigError> {
    let raw = fs::read_to_string(path)?;
    let file: FileConfig = toml::from_str(&raw)?;

    if let Some(v) = file.server.host {
        cfg.server.host = v;
        sources.host = ValueSource::File;
    }
    if let Some(v) = file.server.port {
        cfg.server.port = v;
        sources.port = ValueSource::File;
    }
    if let Some(v) = file.table.seed {
        cfg.table.seed = Some(v);
        sources.seed = ValueSource::File;
    }
    if let Some(v) = file.archive.database {
        cfg.archive.database = Some(v);
        sources.database = ValueSource::File;
    }

    let table = &mut cfg.table;
    table.small_blind = file.table.small_blind.unwrap_or(table.small_blind);
    table.big_blind = file.table.big_blind.unwrap_or(table.big_blind);
    table.min_bet = file.table.min_bet.unwrap_or(table.min_bet);

    let archive = &mut cfg.archive;
    archive.retry_interval_ms = file
        .archive
        .retry_interval_ms
        .unwrap_or(archive.retry_interval_ms);
    archive.initial_backoff_ms = file
        .archive
        .initial_backoff_ms
        .unwrap_or(archive.initial_backoff_ms);
    archive.max_backoff_ms = file.archive.max_backoff_ms.unwrap_or(archive.max_backoff_ms);
    archive.max_attempts = file.archive.max_attempts.unwrap_or(archive.max_attempts);
    Ok(())
}
