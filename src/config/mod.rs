//! Configuration module.
//!
//! Settings resolve through defaults, the TOML config file, `LACK_*`
//! environment variables and command-line flags, in increasing precedence.

pub mod keybindings;
pub mod loader;
pub mod timezone;

pub use keybindings::KeyBindings;
pub use loader::{
    apply_cli_overrides, apply_env_overrides, load_config_with_precedence, merge_config,
    CliOverrides, ConfigError, ConfigFile, ResolvedConfig, SessionSettings,
};
pub use timezone::TimeZoneSetting;
