//! TOML Configuration File Support
//!
//! Centralized configuration loading for the assistant, with an optional TOML
//! file at `~/.config/orgbot/orgbot.toml`.
//!
//! # Configuration Priority
//!
//! Values are loaded with the following priority (highest first):
//! 1. CLI arguments (applied by the caller through [`ConfigOverrides`])
//! 2. Environment variables
//! 3. TOML configuration file
//! 4. Default values
//!
//! # Example Configuration
//!
//! ```toml
//! [timing]
//! resolution_delay_ms = 1500
//! reveal_tick_ms = 10
//!
//! [dialogue]
//! follow_up_marker = "would you like"
//! generic_title = "Code"
//! catalog = "/etc/orgbot/catalog.toml"
//!
//! [surface]
//! channel_capacity = 256
//! ```

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::catalog::{Catalog, CatalogError};
use crate::resolver::ResolverSettings;

// =============================================================================
// Error Types
// =============================================================================

/// Errors that can occur when loading configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read config file
    #[error("Failed to read config file at {path}: {source}")]
    ReadError {
        /// The path that was attempted
        path: PathBuf,
        /// The underlying IO error
        source: std::io::Error,
    },

    /// Failed to parse TOML
    #[error("Failed to parse TOML config: {0}")]
    ParseError(#[from] toml::de::Error),

    /// Invalid configuration value
    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

// =============================================================================
// Configuration Source Tracking
// =============================================================================

/// Tracks where a configuration value came from
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConfigSource {
    /// Value from command-line argument
    Cli,
    /// Value from environment variable
    Env,
    /// Value from TOML configuration file
    File,
    /// Default value
    Default,
}

impl std::fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Cli => write!(f, "CLI"),
            Self::Env => write!(f, "environment"),
            Self::File => write!(f, "config file"),
            Self::Default => write!(f, "default"),
        }
    }
}

// =============================================================================
// TOML Configuration Structures
// =============================================================================

/// Timing section of the TOML configuration
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TimingToml {
    /// Artificial delay before a submission resolves, in milliseconds
    pub resolution_delay_ms: Option<u64>,

    /// Interval between revealed characters, in milliseconds
    pub reveal_tick_ms: Option<u64>,
}

/// Dialogue section of the TOML configuration
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DialogueToml {
    /// Phrase marking a code offer
    pub follow_up_marker: Option<String>,

    /// Tab title for code without a catalog entry
    pub generic_title: Option<String>,

    /// Catalog file to load instead of the built-in catalog
    pub catalog: Option<PathBuf>,
}

/// Surface section of the TOML configuration
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SurfaceToml {
    /// Capacity of the assistant-to-surface message channel
    ///
    /// Messages beyond it wait in the Assistant's backlog.
    pub channel_capacity: Option<usize>,
}

/// Top-level TOML configuration structure
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AssistantToml {
    /// Timing section
    pub timing: TimingToml,

    /// Dialogue section
    pub dialogue: DialogueToml,

    /// Surface section
    pub surface: SurfaceToml,
}

// =============================================================================
// Main Configuration Struct
// =============================================================================

/// Resolved assistant configuration
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AssistantConfig {
    /// Delay between a submission and its resolution
    pub resolution_delay: Duration,

    /// Interval between revealed characters
    pub reveal_tick: Duration,

    /// Phrase marking a code offer
    pub follow_up_marker: String,

    /// Tab title for code without a catalog entry
    pub generic_title: String,

    /// Catalog file, or `None` for the built-in catalog
    pub catalog_path: Option<PathBuf>,

    /// Capacity of the assistant-to-surface message channel
    ///
    /// Messages beyond it wait in the Assistant's backlog.
    pub channel_capacity: usize,

    /// Path to the config file that was loaded (if any)
    pub config_file_path: Option<PathBuf>,

    /// Source of configuration values
    source: ConfigSource,
}

impl Default for AssistantConfig {
    fn default() -> Self {
        let dialogue = ResolverSettings::default();
        Self {
            resolution_delay: Duration::from_millis(1500),
            reveal_tick: Duration::from_millis(10),
            follow_up_marker: dialogue.follow_up_marker,
            generic_title: dialogue.generic_title,
            catalog_path: None,
            channel_capacity: 256,
            config_file_path: None,
            source: ConfigSource::Default,
        }
    }
}

impl AssistantConfig {
    /// Create a configuration with default values
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the primary source of this configuration
    #[must_use]
    pub fn source(&self) -> ConfigSource {
        self.source
    }

    /// Set the configuration source
    pub fn set_source(&mut self, source: ConfigSource) {
        self.source = source;
    }

    /// Resolver settings derived from this configuration
    #[must_use]
    pub fn resolver_settings(&self) -> ResolverSettings {
        ResolverSettings {
            follow_up_marker: self.follow_up_marker.clone(),
            generic_title: self.generic_title.clone(),
        }
    }

    /// Load the configured catalog (built-in when no path is set)
    ///
    /// # Errors
    ///
    /// Returns an error if the catalog file cannot be read, parsed or validated.
    pub fn load_catalog(&self) -> Result<Catalog, CatalogError> {
        match &self.catalog_path {
            Some(path) => Catalog::load(path),
            None => Ok(Catalog::builtin()),
        }
    }

    /// Check values that would make the assistant misbehave
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError::ValidationError`] naming the bad setting.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.follow_up_marker.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "follow_up_marker must not be blank".to_string(),
            ));
        }
        if self.generic_title.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "generic_title must not be blank".to_string(),
            ));
        }
        if self.channel_capacity == 0 {
            return Err(ConfigError::ValidationError(
                "channel_capacity must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

// =============================================================================
// Configuration Loading
// =============================================================================

/// Get the default configuration file path
///
/// Returns `$XDG_CONFIG_HOME/orgbot/orgbot.toml` or
/// `~/.config/orgbot/orgbot.toml` if `XDG_CONFIG_HOME` is not set.
#[must_use]
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("orgbot").join("orgbot.toml"))
}

/// Load configuration from all sources with proper priority
///
/// # Errors
///
/// Returns an error if the config file exists but cannot be parsed, or if the
/// resulting values fail validation. A missing config file is not an error.
pub fn load_config() -> Result<AssistantConfig, ConfigError> {
    load_config_from_path(default_config_path())
}

/// Load configuration from a specific path, then the process environment
///
/// # Errors
///
/// Returns an error if the specified config file cannot be read or parsed,
/// or if the resulting values fail validation.
pub fn load_config_from_path(path: Option<PathBuf>) -> Result<AssistantConfig, ConfigError> {
    load_config_with_env(path, |key| std::env::var(key).ok())
}

/// Load configuration from a specific path and an environment lookup
///
/// # Errors
///
/// Returns an error if the specified config file cannot be read or parsed,
/// or if the resulting values fail validation.
pub fn load_config_with_env<F>(
    path: Option<PathBuf>,
    env: F,
) -> Result<AssistantConfig, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let mut config = AssistantConfig::default();

    if let Some(ref config_path) = path {
        if config_path.exists() {
            let toml_content =
                std::fs::read_to_string(config_path).map_err(|e| ConfigError::ReadError {
                    path: config_path.clone(),
                    source: e,
                })?;

            let toml_config: AssistantToml = toml::from_str(&toml_content)?;
            apply_toml_config(&mut config, &toml_config);
            config.config_file_path = Some(config_path.clone());
            config.source = ConfigSource::File;

            tracing::info!(
                path = %config_path.display(),
                "Loaded configuration from file"
            );
        } else {
            tracing::debug!(
                path = %config_path.display(),
                "Config file not found, using defaults"
            );
        }
    }

    apply_env_config(&mut config, env);
    config.validate()?;

    Ok(config)
}

fn apply_toml_config(config: &mut AssistantConfig, toml: &AssistantToml) {
    if let Some(ms) = toml.timing.resolution_delay_ms {
        config.resolution_delay = Duration::from_millis(ms);
    }
    if let Some(ms) = toml.timing.reveal_tick_ms {
        config.reveal_tick = Duration::from_millis(ms);
    }

    if let Some(marker) = &toml.dialogue.follow_up_marker {
        config.follow_up_marker.clone_from(marker);
    }
    if let Some(title) = &toml.dialogue.generic_title {
        config.generic_title.clone_from(title);
    }
    if toml.dialogue.catalog.is_some() {
        config.catalog_path.clone_from(&toml.dialogue.catalog);
    }

    if let Some(capacity) = toml.surface.channel_capacity {
        config.channel_capacity = capacity;
    }
}

fn apply_env_config<F>(config: &mut AssistantConfig, env: F)
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(delay) = env("ORGBOT_RESOLUTION_DELAY_MS") {
        if let Ok(ms) = delay.parse::<u64>() {
            config.resolution_delay = Duration::from_millis(ms);
            config.source = ConfigSource::Env;
        } else {
            tracing::warn!(value = %delay, "Ignoring non-numeric ORGBOT_RESOLUTION_DELAY_MS");
        }
    }
    if let Some(tick) = env("ORGBOT_REVEAL_TICK_MS") {
        if let Ok(ms) = tick.parse::<u64>() {
            config.reveal_tick = Duration::from_millis(ms);
            config.source = ConfigSource::Env;
        } else {
            tracing::warn!(value = %tick, "Ignoring non-numeric ORGBOT_REVEAL_TICK_MS");
        }
    }
    if let Some(marker) = env("ORGBOT_FOLLOW_UP_MARKER") {
        config.follow_up_marker = marker;
        config.source = ConfigSource::Env;
    }
    if let Some(path) = env("ORGBOT_CATALOG") {
        config.catalog_path = Some(PathBuf::from(path));
        config.source = ConfigSource::Env;
    }
}

// =============================================================================
// CLI Override Support
// =============================================================================

/// Builder for applying CLI overrides to configuration
///
/// Use this after [`load_config`] to apply command-line argument overrides.
#[derive(Clone, Debug, Default)]
pub struct ConfigOverrides {
    /// Resolution delay override (milliseconds)
    pub resolution_delay_ms: Option<u64>,

    /// Reveal tick override (milliseconds)
    pub reveal_tick_ms: Option<u64>,

    /// Catalog path override
    pub catalog_path: Option<PathBuf>,
}

impl ConfigOverrides {
    /// Create a new empty set of overrides
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set resolution delay override
    #[must_use]
    pub fn with_resolution_delay_ms(mut self, ms: u64) -> Self {
        self.resolution_delay_ms = Some(ms);
        self
    }

    /// Set reveal tick override
    #[must_use]
    pub fn with_reveal_tick_ms(mut self, ms: u64) -> Self {
        self.reveal_tick_ms = Some(ms);
        self
    }

    /// Set catalog path override
    #[must_use]
    pub fn with_catalog_path(mut self, path: PathBuf) -> Self {
        self.catalog_path = Some(path);
        self
    }

    /// Check if any overrides are set
    #[must_use]
    pub fn has_overrides(&self) -> bool {
        self.resolution_delay_ms.is_some()
            || self.reveal_tick_ms.is_some()
            || self.catalog_path.is_some()
    }

    /// Apply overrides to a configuration
    pub fn apply(&self, config: &mut AssistantConfig) {
        if let Some(ms) = self.resolution_delay_ms {
            config.resolution_delay = Duration::from_millis(ms);
        }
        if let Some(ms) = self.reveal_tick_ms {
            config.reveal_tick = Duration::from_millis(ms);
        }
        if self.catalog_path.is_some() {
            config.catalog_path.clone_from(&self.catalog_path);
        }
        if self.has_overrides() {
            config.source = ConfigSource::Cli;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn no_env(_: &str) -> Option<String> {
        None
    }

    #[test]
    fn test_default_config() {
        let config = AssistantConfig::default();
        assert_eq!(config.resolution_delay, Duration::from_millis(1500));
        assert_eq!(config.reveal_tick, Duration::from_millis(10));
        assert_eq!(config.follow_up_marker, "would you like");
        assert_eq!(config.generic_title, "Code");
        assert_eq!(config.channel_capacity, 256);
        assert_eq!(config.source(), ConfigSource::Default);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_default_config_path() {
        if let Some(path) = default_config_path() {
            assert!(path.ends_with("orgbot/orgbot.toml"));
        }
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let config =
            load_config_with_env(Some(PathBuf::from("/nonexistent/orgbot.toml")), no_env).unwrap();
        assert_eq!(config.source(), ConfigSource::Default);
        assert!(config.config_file_path.is_none());
    }

    #[test]
    fn test_load_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
[timing]
resolution_delay_ms = 200
reveal_tick_ms = 5

[dialogue]
generic_title = "Snippet"
catalog = "/tmp/catalog.toml"
"#
        )
        .unwrap();

        let config = load_config_with_env(Some(file.path().to_path_buf()), no_env).unwrap();
        assert_eq!(config.resolution_delay, Duration::from_millis(200));
        assert_eq!(config.reveal_tick, Duration::from_millis(5));
        assert_eq!(config.generic_title, "Snippet");
        assert_eq!(config.follow_up_marker, "would you like");
        assert_eq!(config.catalog_path, Some(PathBuf::from("/tmp/catalog.toml")));
        assert_eq!(config.source(), ConfigSource::File);
    }

    #[test]
    fn test_invalid_toml() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "[timing\nresolution_delay_ms = ").unwrap();

        let err = load_config_with_env(Some(file.path().to_path_buf()), no_env).unwrap_err();
        assert!(matches!(err, ConfigError::ParseError(_)));
    }

    #[test]
    fn test_env_overrides_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "[timing]\nresolution_delay_ms = 200").unwrap();

        let env: HashMap<&str, &str> = [
            ("ORGBOT_RESOLUTION_DELAY_MS", "50"),
            ("ORGBOT_REVEAL_TICK_MS", "not-a-number"),
            ("ORGBOT_FOLLOW_UP_MARKER", "want to see"),
        ]
        .into_iter()
        .collect();

        let config = load_config_with_env(Some(file.path().to_path_buf()), |key| {
            env.get(key).map(ToString::to_string)
        })
        .unwrap();

        assert_eq!(config.resolution_delay, Duration::from_millis(50));
        assert_eq!(config.reveal_tick, Duration::from_millis(10));
        assert_eq!(config.follow_up_marker, "want to see");
        assert_eq!(config.source(), ConfigSource::Env);
    }

    #[test]
    fn test_cli_overrides() {
        let mut config = AssistantConfig::default();
        let overrides = ConfigOverrides::new()
            .with_resolution_delay_ms(0)
            .with_catalog_path(PathBuf::from("custom.toml"));

        assert!(overrides.has_overrides());
        overrides.apply(&mut config);

        assert_eq!(config.resolution_delay, Duration::ZERO);
        assert_eq!(config.catalog_path, Some(PathBuf::from("custom.toml")));
        assert_eq!(config.source(), ConfigSource::Cli);
    }

    #[test]
    fn test_empty_overrides_keep_source() {
        let mut config = AssistantConfig::default();
        ConfigOverrides::new().apply(&mut config);
        assert_eq!(config.source(), ConfigSource::Default);
    }

    #[test]
    fn test_validation() {
        let mut config = AssistantConfig {
            follow_up_marker: "  ".to_string(),
            ..AssistantConfig::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::ValidationError(_))));

        config.follow_up_marker = "would you like".to_string();
        config.channel_capacity = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_load_catalog_defaults_to_builtin() {
        let catalog = AssistantConfig::default().load_catalog().unwrap();
        assert_eq!(catalog.prompts().len(), 5);

        let config = AssistantConfig {
            catalog_path: Some(PathBuf::from("/nonexistent/catalog.toml")),
            ..AssistantConfig::default()
        };
        assert!(matches!(
            config.load_catalog(),
            Err(CatalogError::ReadError { .. })
        ));
    }

    #[test]
    fn test_config_source_display() {
        assert_eq!(ConfigSource::Cli.to_string(), "CLI");
        assert_eq!(ConfigSource::Env.to_string(), "environment");
        assert_eq!(ConfigSource::File.to_string(), "config file");
        assert_eq!(ConfigSource::Default.to_string(), "default");
    }
}
