//! # Configuration
//!
//! Centralizes all settings with a clear override hierarchy:
//! defaults → config file → env vars → CLI flags.
//!
//! Config lives at `~/.nativenav/config.toml`. If missing on first run, a
//! commented-out default is generated so users can discover all options.

use clap::ValueEnum;
use log::{LevelFilter, debug, info, warn};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use crate::IdStrategy;
use crate::core::registry::DEFAULT_ID_PREFIX;

// ============================================================================
// Config Structs (all fields Option<T> for sparse TOML)
// ============================================================================

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct NavConfig {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub render: RenderConfig,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct GeneralConfig {
    pub id_strategy: Option<IdStrategy>,
    pub id_prefix: Option<String>,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct LoggingConfig {
    pub file: Option<String>,
    pub level: Option<String>,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct RenderConfig {
    pub echo_events: Option<bool>,
}

// ============================================================================
// Defaults
// ============================================================================

pub const DEFAULT_LOG_FILE: &str = "nativenav.log";
pub const DEFAULT_LOG_LEVEL: LevelFilter = LevelFilter::Debug;

// ============================================================================
// Resolved Config (concrete values, no Options)
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedConfig {
    pub id_strategy: IdStrategy,
    pub id_prefix: String,
    pub log_file: PathBuf,
    pub log_level: LevelFilter,
    pub echo_events: bool,
}

/// Values given on the command line. `None` means "not specified".
#[derive(Debug, Default, Clone)]
pub struct CliOverrides {
    pub id_strategy: Option<IdStrategy>,
    pub log_file: Option<PathBuf>,
    pub quiet: bool,
}

// ============================================================================
// Error Type
// ============================================================================

#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(toml::de::Error),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "config I/O error: {e}"),
            ConfigError::Parse(e) => write!(f, "config parse error: {e}"),
        }
    }
}

impl std::error::Error for ConfigError {}

// ============================================================================
// Loading
// ============================================================================

/// Returns the path to `~/.nativenav/config.toml`.
pub fn config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|h| h.join(".nativenav").join("config.toml"))
}

/// Load config from `~/.nativenav/config.toml`, or from `explicit` when
/// given.
///
/// A missing default file is generated (commented out) and yields
/// `NavConfig::default()`. A missing explicit file is an error. A
/// malformed file is `ConfigError::Parse`.
pub fn load_config(explicit: Option<&Path>) -> Result<NavConfig, ConfigError> {
    if let Some(path) = explicit {
        return read_config(path);
    }

    let path = match config_path() {
        Some(p) => p,
        None => {
            warn!("Could not determine home directory, using default config");
            return Ok(NavConfig::default());
        }
    };

    if !path.exists() {
        info!("No config file found, generating default at {}", path.display());
        generate_default_config(&path);
        return Ok(NavConfig::default());
    }

    read_config(&path)
}

fn read_config(path: &Path) -> Result<NavConfig, ConfigError> {
    let contents = fs::read_to_string(path).map_err(ConfigError::Io)?;
    let config: NavConfig = toml::from_str(&contents).map_err(ConfigError::Parse)?;
    info!("Loaded config from {}", path.display());
    debug!("Config: {:?}", config);
    Ok(config)
}

const DEFAULT_CONFIG: &str = r#"# nativenav Configuration
# All settings are optional. Defaults are used for anything not specified.
# Override hierarchy: defaults → this file → env vars → CLI flags.

# [general]
# id_strategy = "counter"            # "counter" or "uuid"
# id_prefix = "_component"           # Prefix for counter ids

# [logging]
# file = "nativenav.log"             # Or set NATIVENAV_LOG_FILE
# level = "debug"                    # off, error, warn, info, debug, trace

# [render]
# echo_events = true                 # Print render effects as {"event": ...} lines
"#;

/// Generates a commented-out default config file at the given path.
fn generate_default_config(path: &Path) {
    if let Some(parent) = path.parent() {
        if let Err(e) = fs::create_dir_all(parent) {
            warn!("Failed to create config directory: {}", e);
            return;
        }
    }
    if let Err(e) = fs::write(path, DEFAULT_CONFIG) {
        warn!("Failed to write default config: {}", e);
    }
}

// ============================================================================
// Resolution
// ============================================================================

/// Resolve the final config by collapsing: defaults → config file → env vars → CLI.
pub fn resolve(config: &NavConfig, cli: &CliOverrides) -> ResolvedConfig {
    resolve_with(config, cli, |key| std::env::var(key).ok())
}

/// `resolve` with an injectable environment, so tests don't touch the
/// process env.
fn resolve_with(
    config: &NavConfig,
    cli: &CliOverrides,
    env: impl Fn(&str) -> Option<String>,
) -> ResolvedConfig {
    // Id strategy: CLI → env → config → default
    let id_strategy = cli
        .id_strategy
        .or_else(|| env("NATIVENAV_ID_STRATEGY").and_then(|s| parse_strategy(&s)))
        .or(config.general.id_strategy)
        .unwrap_or_default();

    // Id prefix: env → config → default
    let id_prefix = env("NATIVENAV_ID_PREFIX")
        .filter(|p| !p.is_empty())
        .or_else(|| config.general.id_prefix.clone())
        .unwrap_or_else(|| DEFAULT_ID_PREFIX.to_string());

    // Log file: CLI → env → config → default
    let log_file = cli
        .log_file
        .clone()
        .or_else(|| env("NATIVENAV_LOG_FILE").map(PathBuf::from))
        .or_else(|| config.logging.file.as_ref().map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from(DEFAULT_LOG_FILE));

    // Log level: env → config → default
    let log_level = env("NATIVENAV_LOG_LEVEL")
        .or_else(|| config.logging.level.clone())
        .and_then(|level| parse_level(&level))
        .unwrap_or(DEFAULT_LOG_LEVEL);

    let echo_events = !cli.quiet && config.render.echo_events.unwrap_or(true);

    ResolvedConfig {
        id_strategy,
        id_prefix,
        log_file,
        log_level,
        echo_events,
    }
}

fn parse_strategy(value: &str) -> Option<IdStrategy> {
    match <IdStrategy as ValueEnum>::from_str(value, true) {
        Ok(strategy) => Some(strategy),
        Err(e) => {
            warn!("Ignoring NATIVENAV_ID_STRATEGY: {e}");
            None
        }
    }
}

fn parse_level(value: &str) -> Option<LevelFilter> {
    match value.parse::<LevelFilter>() {
        Ok(level) => Some(level),
        Err(_) => {
            warn!("Ignoring unknown log level {value:?}");
            None
        }
    }
}
