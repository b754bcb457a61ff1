//! Tests for configuration file loading.

use super::*;
use serial_test::serial;
use std::collections::HashMap;
use std::env;
use std::fs;

fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let map: HashMap<String, String> = pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    move |name| map.get(name).cloned()
}

fn complete_config() -> ResolvedConfig {
    ResolvedConfig {
        feed: Some(PathBuf::from("/tmp/feed.jsonl")),
        channel: Some("general".to_string()),
        ..ResolvedConfig::default()
    }
}

#[test]
fn default_config_path_contains_lack_config_toml() {
    let path = default_config_path().expect("Should have default path");
    let path_str = path.to_string_lossy();
    assert!(
        path_str.contains("lack") && path_str.ends_with("config.toml"),
        "Path should contain 'lack' and end with 'config.toml', got: {}",
        path_str
    );
}

#[test]
fn default_log_path_ends_with_lack_log() {
    assert!(default_log_path().ends_with("lack.log"));
}

#[test]
fn load_config_file_returns_ok_none_for_missing_file() {
    let result = load_config_file("/nonexistent/path/to/lack.toml");
    assert_eq!(
        result,
        Ok(None),
        "Missing config file should return Ok(None), not an error"
    );
}

#[test]
fn load_config_file_parses_valid_toml() {
    let path = env::temp_dir().join("lack_test_valid.toml");
    fs::write(
        &path,
        r#"
feed = "/var/chat/feed.jsonl"
token = "xoxp-123"
channel = "general"
username = "ada"
timezone = "UTC"
debug = true
poll_interval_ms = 10
render_interval_ms = 40
reconnect_delay_secs = 2
log_file_path = "/tmp/lack-test.log"
"#,
    )
    .expect("Failed to write test config");

    let config = load_config_file(&path)
        .expect("Should parse")
        .expect("Should exist");

    assert_eq!(config.feed, Some(PathBuf::from("/var/chat/feed.jsonl")));
    assert_eq!(config.token.as_deref(), Some("xoxp-123"));
    assert_eq!(config.channel.as_deref(), Some("general"));
    assert_eq!(config.username.as_deref(), Some("ada"));
    assert_eq!(config.timezone.as_deref(), Some("UTC"));
    assert_eq!(config.debug, Some(true));
    assert_eq!(config.poll_interval_ms, Some(10));
    assert_eq!(config.render_interval_ms, Some(40));
    assert_eq!(config.reconnect_delay_secs, Some(2));
    assert_eq!(config.log_file_path, Some(PathBuf::from("/tmp/lack-test.log")));

    fs::remove_file(path).ok();
}

#[test]
fn load_config_file_returns_error_for_invalid_toml() {
    let path = env::temp_dir().join("lack_test_invalid.toml");
    fs::write(&path, "channel = [unclosed").expect("Failed to write test config");

    let result = load_config_file(&path);
    assert!(
        matches!(result, Err(ConfigError::ParseError { .. })),
        "Invalid TOML should be a parse error, got {:?}",
        result
    );

    fs::remove_file(path).ok();
}

#[test]
fn config_file_rejects_unknown_fields() {
    let result: Result<ConfigFile, _> = toml::from_str(r#"theme = "dark""#);
    assert!(result.is_err(), "Unknown fields should be rejected");
}

#[test]
fn merge_config_uses_defaults_when_none() {
    assert_eq!(merge_config(None), ResolvedConfig::default());
}

#[test]
fn merge_config_keeps_defaults_for_missing_fields() {
    let file = ConfigFile {
        channel: Some("random".to_string()),
        ..ConfigFile::default()
    };

    let merged = merge_config(Some(file));

    assert_eq!(merged.channel.as_deref(), Some("random"));
    assert_eq!(merged.username, "Anonymous");
    assert_eq!(merged.timezone, "local");
    assert_eq!(merged.poll_interval_ms, 25);
    assert_eq!(merged.render_interval_ms, 50);
    assert_eq!(merged.reconnect_delay_secs, 5);
}

#[test]
fn resolved_config_default_has_expected_values() {
    let config = ResolvedConfig::default();
    assert_eq!(config.feed, None);
    assert_eq!(config.channel, None);
    assert_eq!(config.username, "Anonymous");
    assert!(!config.debug);
}

#[test]
fn env_overrides_apply_each_variable() {
    let lookup = lookup_from(&[
        (ENV_FEED, "/srv/feed.jsonl"),
        (ENV_TOKEN, "secret"),
        (ENV_CHANNEL, "ops"),
        (ENV_USERNAME, "grace"),
        (ENV_TZ, "+01:00"),
        (ENV_DEBUG, "1"),
    ]);

    let config = apply_env_overrides_from(ResolvedConfig::default(), lookup);

    assert_eq!(config.feed, Some(PathBuf::from("/srv/feed.jsonl")));
    assert_eq!(config.token.as_deref(), Some("secret"));
    assert_eq!(config.channel.as_deref(), Some("ops"));
    assert_eq!(config.username, "grace");
    assert_eq!(config.timezone, "+01:00");
    assert!(config.debug);
}

#[test]
fn env_debug_falsy_values_disable_debug() {
    for value in ["", "0", "false", "No", "OFF"] {
        let base = ResolvedConfig {
            debug: true,
            ..ResolvedConfig::default()
        };
        let config = apply_env_overrides_from(base, lookup_from(&[(ENV_DEBUG, value)]));
        assert!(!config.debug, "{value:?} should disable debug");
    }
}

#[test]
fn env_overrides_no_change_when_unset() {
    let base = complete_config();
    let result = apply_env_overrides_from(base.clone(), |_| None);
    assert_eq!(result, base);
}

/// RAII guard to ensure environment variable cleanup even under test parallelism.
struct EnvGuard(&'static str);

impl EnvGuard {
    fn new(name: &'static str) -> Self {
        env::remove_var(name);
        EnvGuard(name)
    }
}

impl Drop for EnvGuard {
    fn drop(&mut self) {
        env::remove_var(self.0);
    }
}

#[test]
#[serial(lack_env)]
fn apply_env_overrides_reads_process_environment() {
    let _guard = EnvGuard::new(ENV_USERNAME);
    env::set_var(ENV_USERNAME, "from-env");

    let result = apply_env_overrides(ResolvedConfig::default());

    assert_eq!(result.username, "from-env");
}

#[test]
#[serial(lack_env)]
fn load_config_with_precedence_prefers_explicit_path() {
    let _guard = EnvGuard::new(ENV_CONFIG);
    let temp_dir = env::temp_dir();

    let explicit_path = temp_dir.join("lack_explicit.toml");
    fs::write(&explicit_path, r#"channel = "explicit""#).expect("Failed to write config");

    let env_path = temp_dir.join("lack_env.toml");
    fs::write(&env_path, r#"channel = "from-env""#).expect("Failed to write config");
    env::set_var(ENV_CONFIG, &env_path);

    let config = load_config_with_precedence(Some(explicit_path.clone()))
        .expect("Should load")
        .expect("Should exist");
    assert_eq!(config.channel.as_deref(), Some("explicit"));

    fs::remove_file(explicit_path).ok();
    fs::remove_file(env_path).ok();
}

#[test]
#[serial(lack_env)]
fn load_config_with_precedence_uses_env_var_when_no_explicit_path() {
    let _guard = EnvGuard::new(ENV_CONFIG);
    let env_path = env::temp_dir().join("lack_env_only.toml");
    fs::write(&env_path, r#"channel = "env-only""#).expect("Failed to write config");
    env::set_var(ENV_CONFIG, &env_path);

    let config = load_config_with_precedence(None)
        .expect("Should load")
        .expect("Should exist");
    assert_eq!(config.channel.as_deref(), Some("env-only"));

    fs::remove_file(env_path).ok();
}

#[test]
fn cli_overrides_win_over_env() {
    let env_applied = apply_env_overrides_from(
        ResolvedConfig::default(),
        lookup_from(&[(ENV_CHANNEL, "from-env"), (ENV_USERNAME, "env-user")]),
    );

    let config = apply_cli_overrides(
        env_applied,
        CliOverrides {
            channel: Some("from-cli".to_string()),
            ..CliOverrides::default()
        },
    );

    assert_eq!(config.channel.as_deref(), Some("from-cli"));
    assert_eq!(config.username, "env-user", "unset CLI flags leave env values");
}

#[test]
fn cli_debug_flag_only_enables() {
    let base = ResolvedConfig {
        debug: true,
        ..ResolvedConfig::default()
    };
    let config = apply_cli_overrides(base, CliOverrides::default());
    assert!(config.debug);
}

#[test]
fn precedence_chain_full_defaults_to_cli() {
    let file = ConfigFile {
        feed: Some(PathBuf::from("/from/file.jsonl")),
        channel: Some("file-channel".to_string()),
        username: Some("file-user".to_string()),
        timezone: Some("UTC".to_string()),
        ..ConfigFile::default()
    };

    let merged = merge_config(Some(file));
    let env_applied = apply_env_overrides_from(merged, lookup_from(&[(ENV_USERNAME, "env-user")]));
    let config = apply_cli_overrides(
        env_applied,
        CliOverrides {
            timezone: Some("+02:00".to_string()),
            ..CliOverrides::default()
        },
    );

    assert_eq!(config.feed, Some(PathBuf::from("/from/file.jsonl")));
    assert_eq!(config.channel.as_deref(), Some("file-channel"));
    assert_eq!(config.username, "env-user");
    assert_eq!(config.timezone, "+02:00");
}

#[test]
fn validate_requires_feed() {
    let config = ResolvedConfig {
        feed: None,
        ..complete_config()
    };
    assert_eq!(config.validate(), Err(ConfigError::Missing("feed")));
}

#[test]
fn validate_requires_non_blank_channel() {
    let config = ResolvedConfig {
        channel: Some("   ".to_string()),
        ..complete_config()
    };
    assert_eq!(config.validate(), Err(ConfigError::Missing("channel")));
}

#[test]
fn validate_rejects_bad_timezone() {
    let config = ResolvedConfig {
        timezone: "Mars/Olympus".to_string(),
        ..complete_config()
    };
    assert_eq!(
        config.validate(),
        Err(ConfigError::InvalidTimezone("Mars/Olympus".to_string()))
    );
}

#[test]
fn validate_rejects_zero_intervals() {
    let config = ResolvedConfig {
        render_interval_ms: 0,
        ..complete_config()
    };
    assert!(matches!(
        config.validate(),
        Err(ConfigError::InvalidValue {
            field: "render_interval_ms",
            ..
        })
    ));
}

#[test]
fn validate_produces_typed_settings() {
    let config = ResolvedConfig {
        channel: Some("#general".to_string()),
        token: Some(String::new()),
        ..complete_config()
    };

    let settings = config.validate().expect("complete config validates");

    assert_eq!(settings.channel, "general", "leading '#' is stripped");
    assert_eq!(settings.token, None, "empty token counts as absent");
    assert_eq!(settings.timezone, TimeZoneSetting::Local);
    assert_eq!(settings.poll_interval, Duration::from_millis(25));
    assert_eq!(settings.render_interval, Duration::from_millis(50));
    assert_eq!(settings.reconnect_delay, Duration::from_secs(5));
}
