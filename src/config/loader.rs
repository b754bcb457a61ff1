//! Configuration file loading with precedence handling.

use super::timezone::TimeZoneSetting;
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Environment variable naming an alternative config file.
pub const ENV_CONFIG: &str = "LACK_CONFIG";
/// Environment variable overriding the feed path.
pub const ENV_FEED: &str = "LACK_FEED";
/// Environment variable overriding the access token.
pub const ENV_TOKEN: &str = "LACK_TOKEN";
/// Environment variable overriding the channel name.
pub const ENV_CHANNEL: &str = "LACK_CHANNEL";
/// Environment variable overriding the display username.
pub const ENV_USERNAME: &str = "LACK_USERNAME";
/// Environment variable overriding the display timezone.
pub const ENV_TZ: &str = "LACK_TZ";
/// Environment variable enabling debug logging.
pub const ENV_DEBUG: &str = "LACK_DEBUG";

/// Errors that can occur during config loading.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// Failed to read config file (file may not exist or have permission issues).
    #[error("Failed to read config file at {path}: {reason}")]
    ReadError {
        /// Path that failed to read.
        path: PathBuf,
        /// Reason for failure.
        reason: String,
    },

    /// Config file contains invalid TOML syntax.
    #[error("Invalid TOML in {path}: {reason}")]
    ParseError {
        /// Path with invalid TOML.
        path: PathBuf,
        /// Parse error details.
        reason: String,
    },

    /// A required setting was not provided by any source.
    #[error("Missing required setting `{0}` (set it in the config file, environment, or on the command line)")]
    Missing(&'static str),

    /// The timezone is not `local`, `UTC`, an IANA zone name, or a `±HH:MM` offset.
    #[error(
        "Invalid timezone {0:?}: expected \"local\", \"UTC\", a zone like \"America/New_York\", or an offset like \"+05:30\""
    )]
    InvalidTimezone(String),

    /// A numeric setting is out of range.
    #[error("Invalid value for `{field}`: {reason}")]
    InvalidValue {
        /// Setting name.
        field: &'static str,
        /// What is wrong with it.
        reason: String,
    },
}

/// TOML configuration file structure.
///
/// All fields are optional - if not specified, hardcoded defaults are used.
/// Corresponds to `~/.config/lack/config.toml`.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    /// Path of the JSONL feed acting as the chat service.
    #[serde(default)]
    pub feed: Option<PathBuf>,

    /// Access token presented on connect.
    #[serde(default)]
    pub token: Option<String>,

    /// Channel or private group name to join.
    #[serde(default)]
    pub channel: Option<String>,

    /// Name outgoing messages are posted under.
    #[serde(default)]
    pub username: Option<String>,

    /// Timezone for rendered timestamps.
    #[serde(default)]
    pub timezone: Option<String>,

    /// Verbose logging, including every raw event.
    #[serde(default)]
    pub debug: Option<bool>,

    /// Poll tick period in milliseconds.
    #[serde(default)]
    pub poll_interval_ms: Option<u64>,

    /// Render tick period in milliseconds.
    #[serde(default)]
    pub render_interval_ms: Option<u64>,

    /// Delay between reconnect attempts in seconds.
    #[serde(default)]
    pub reconnect_delay_secs: Option<u64>,

    /// Path to log file for tracing output.
    #[serde(default)]
    pub log_file_path: Option<PathBuf>,
}

/// Resolved configuration after applying precedence rules.
///
/// Created by merging defaults, config file, env vars, and CLI args.
/// Required settings stay optional here; [`ResolvedConfig::validate`]
/// rejects the config if they are still missing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedConfig {
    /// Feed path.
    pub feed: Option<PathBuf>,
    /// Access token.
    pub token: Option<String>,
    /// Channel name.
    pub channel: Option<String>,
    /// Display username.
    pub username: String,
    /// Timezone setting as written.
    pub timezone: String,
    /// Debug logging.
    pub debug: bool,
    /// Poll tick period in milliseconds.
    pub poll_interval_ms: u64,
    /// Render tick period in milliseconds.
    pub render_interval_ms: u64,
    /// Reconnect delay in seconds.
    pub reconnect_delay_secs: u64,
    /// Path to log file for tracing output.
    pub log_file_path: PathBuf,
}

impl Default for ResolvedConfig {
    fn default() -> Self {
        Self {
            feed: None,
            token: None,
            channel: None,
            username: "Anonymous".to_string(),
            timezone: "local".to_string(),
            debug: false,
            poll_interval_ms: 25,
            render_interval_ms: 50,
            reconnect_delay_secs: 5,
            log_file_path: default_log_path(),
        }
    }
}

/// Fully validated settings handed to the session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSettings {
    /// Feed path.
    pub feed: PathBuf,
    /// Access token, if the feed requires one.
    pub token: Option<String>,
    /// Channel name.
    pub channel: String,
    /// Display username for outgoing messages.
    pub username: String,
    /// Timezone for rendered timestamps.
    pub timezone: TimeZoneSetting,
    /// Debug logging.
    pub debug: bool,
    /// Poll tick period.
    pub poll_interval: Duration,
    /// Render tick period.
    pub render_interval: Duration,
    /// Delay between reconnect attempts.
    pub reconnect_delay: Duration,
}

impl ResolvedConfig {
    /// Check required settings and parse typed values.
    ///
    /// # Errors
    ///
    /// [`ConfigError::Missing`] when `feed` or `channel` is absent,
    /// [`ConfigError::InvalidTimezone`] for an unparseable timezone, and
    /// [`ConfigError::InvalidValue`] for zero tick periods.
    pub fn validate(&self) -> Result<SessionSettings, ConfigError> {
        let feed = self.feed.clone().ok_or(ConfigError::Missing("feed"))?;
        let channel = self
            .channel
            .clone()
            .filter(|c| !c.trim().is_empty())
            .ok_or(ConfigError::Missing("channel"))?;
        let timezone: TimeZoneSetting = self.timezone.parse()?;

        if self.poll_interval_ms == 0 {
            return Err(ConfigError::InvalidValue {
                field: "poll_interval_ms",
                reason: "must be greater than zero".to_string(),
            });
        }
        if self.render_interval_ms == 0 {
            return Err(ConfigError::InvalidValue {
                field: "render_interval_ms",
                reason: "must be greater than zero".to_string(),
            });
        }

        Ok(SessionSettings {
            feed,
            token: self.token.clone().filter(|t| !t.is_empty()),
            channel: channel.trim_start_matches('#').to_string(),
            username: self.username.clone(),
            timezone,
            debug: self.debug,
            poll_interval: Duration::from_millis(self.poll_interval_ms),
            render_interval: Duration::from_millis(self.render_interval_ms),
            reconnect_delay: Duration::from_secs(self.reconnect_delay_secs),
        })
    }
}

/// Resolve default log file path.
///
/// Returns `~/.local/state/lack/lack.log` on Unix-like systems,
/// or appropriate platform path on other systems.
///
/// If state directory cannot be determined, falls back to current directory.
pub fn default_log_path() -> PathBuf {
    if let Some(state_dir) = dirs::state_dir() {
        state_dir.join("lack").join("lack.log")
    } else {
        PathBuf::from("lack.log")
    }
}

/// Load configuration file from a specific path.
///
/// Returns `Ok(None)` if file doesn't exist (not an error - use defaults).
///
/// # Errors
///
/// Returns error if file exists but has read or parse errors.
pub fn load_config_file(path: impl Into<PathBuf>) -> Result<Option<ConfigFile>, ConfigError> {
    let path = path.into();

    // Missing file is not an error - use defaults
    if !path.exists() {
        return Ok(None);
    }

    let contents = std::fs::read_to_string(&path).map_err(|e| ConfigError::ReadError {
        path: path.clone(),
        reason: e.to_string(),
    })?;

    let config: ConfigFile = toml::from_str(&contents).map_err(|e| ConfigError::ParseError {
        path: path.clone(),
        reason: e.to_string(),
    })?;

    Ok(Some(config))
}

/// Resolve default config file path.
///
/// Returns `~/.config/lack/config.toml` on Unix, appropriate path on other platforms.
/// Returns `None` if home directory cannot be determined.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("lack").join("config.toml"))
}

/// Load configuration with precedence handling.
///
/// Precedence (highest to lowest):
/// 1. Explicit `config_path` argument (CLI `--config`)
/// 2. `LACK_CONFIG` environment variable
/// 3. Default path `~/.config/lack/config.toml`
///
/// # Errors
///
/// Returns error only if a config file exists but cannot be read or parsed.
pub fn load_config_with_precedence(
    config_path: Option<PathBuf>,
) -> Result<Option<ConfigFile>, ConfigError> {
    if let Some(path) = config_path {
        return load_config_file(path);
    }

    if let Ok(env_path) = std::env::var(ENV_CONFIG) {
        return load_config_file(PathBuf::from(env_path));
    }

    if let Some(default_path) = default_config_path() {
        return load_config_file(default_path);
    }

    Ok(None)
}

/// Merge config file into defaults to create resolved config.
///
/// For each field in `ConfigFile`, if `Some(value)`, use it; otherwise use default.
pub fn merge_config(config_file: Option<ConfigFile>) -> ResolvedConfig {
    let defaults = ResolvedConfig::default();

    let Some(config) = config_file else {
        return defaults;
    };

    ResolvedConfig {
        feed: config.feed.or(defaults.feed),
        token: config.token.or(defaults.token),
        channel: config.channel.or(defaults.channel),
        username: config.username.unwrap_or(defaults.username),
        timezone: config.timezone.unwrap_or(defaults.timezone),
        debug: config.debug.unwrap_or(defaults.debug),
        poll_interval_ms: config.poll_interval_ms.unwrap_or(defaults.poll_interval_ms),
        render_interval_ms: config
            .render_interval_ms
            .unwrap_or(defaults.render_interval_ms),
        reconnect_delay_secs: config
            .reconnect_delay_secs
            .unwrap_or(defaults.reconnect_delay_secs),
        log_file_path: config.log_file_path.unwrap_or(defaults.log_file_path),
    }
}

/// Apply environment variable overrides from the process environment.
///
/// Checks `LACK_FEED`, `LACK_TOKEN`, `LACK_CHANNEL`, `LACK_USERNAME`,
/// `LACK_TZ` and `LACK_DEBUG`.
pub fn apply_env_overrides(config: ResolvedConfig) -> ResolvedConfig {
    apply_env_overrides_from(config, |name| std::env::var(name).ok())
}

/// Apply environment overrides using `lookup` to read variables.
///
/// `LACK_DEBUG` counts as enabled unless it is empty, `0`, `false`, `no`
/// or `off`.
pub fn apply_env_overrides_from(
    mut config: ResolvedConfig,
    lookup: impl Fn(&str) -> Option<String>,
) -> ResolvedConfig {
    if let Some(feed) = lookup(ENV_FEED) {
        config.feed = Some(PathBuf::from(feed));
    }
    if let Some(token) = lookup(ENV_TOKEN) {
        config.token = Some(token);
    }
    if let Some(channel) = lookup(ENV_CHANNEL) {
        config.channel = Some(channel);
    }
    if let Some(username) = lookup(ENV_USERNAME) {
        config.username = username;
    }
    if let Some(tz) = lookup(ENV_TZ) {
        config.timezone = tz;
    }
    if let Some(debug) = lookup(ENV_DEBUG) {
        config.debug = !matches!(
            debug.trim().to_ascii_lowercase().as_str(),
            "" | "0" | "false" | "no" | "off"
        );
    }
    config
}

/// Values given on the command line. `None`/`false` means "not given".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CliOverrides {
    /// `--feed`
    pub feed: Option<PathBuf>,
    /// `--channel`
    pub channel: Option<String>,
    /// `--username`
    pub username: Option<String>,
    /// `--tz`
    pub timezone: Option<String>,
    /// `--debug`
    pub debug: bool,
}

/// Apply CLI argument overrides to resolved config.
///
/// CLI args have the highest precedence and override all other sources.
/// Only applies overrides for flags that were explicitly set by the user.
///
/// Precedence chain: Defaults → Config File → Env Vars → CLI Args (highest)
pub fn apply_cli_overrides(mut config: ResolvedConfig, cli: CliOverrides) -> ResolvedConfig {
    if let Some(feed) = cli.feed {
        config.feed = Some(feed);
    }
    if let Some(channel) = cli.channel {
        config.channel = Some(channel);
    }
    if let Some(username) = cli.username {
        config.username = username;
    }
    if let Some(timezone) = cli.timezone {
        config.timezone = timezone;
    }
    if cli.debug {
        config.debug = true;
    }
    config
}

#[cfg(test)]
#[path = "loader_tests.rs"]
mod tests;
