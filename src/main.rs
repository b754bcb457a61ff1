//! lack - Entry Point

use clap::Parser;
use lack::config::{self, CliOverrides};
use lack::model::AppError;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::info;

/// lack - follow a chat channel in the terminal
#[derive(Parser, Debug)]
#[command(name = "lack")]
#[command(version)]
#[command(about = "Terminal chat client with a scrollable, continuously updated message log")]
pub struct Args {
    /// Path to the JSONL feed acting as the chat service
    #[arg(long)]
    pub feed: Option<PathBuf>,

    /// Channel or private group to join (leading `#` optional)
    #[arg(short, long)]
    pub channel: Option<String>,

    /// Name to post messages under
    #[arg(short, long)]
    pub username: Option<String>,

    /// Timezone for timestamps: `local`, `UTC`, a zone like `Europe/Paris`, or `+05:30`
    #[arg(long = "tz")]
    pub timezone: Option<String>,

    /// Log at debug level
    #[arg(long)]
    pub debug: bool,

    /// Path to configuration file
    #[arg(long)]
    pub config: Option<PathBuf>,
}

fn main() -> ExitCode {
    let args = Args::parse();
    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("lack: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: Args) -> Result<(), AppError> {
    // Defaults → Config File → Env Vars → CLI Args
    let resolved = {
        let config_file = config::load_config_with_precedence(args.config.clone())?;
        let merged = config::merge_config(config_file);
        let with_env = config::apply_env_overrides(merged);
        config::apply_cli_overrides(
            with_env,
            CliOverrides {
                feed: args.feed,
                channel: args.channel,
                username: args.username,
                timezone: args.timezone,
                debug: args.debug,
            },
        )
    };
    let settings = resolved.validate()?;

    lack::logging::init(&resolved.log_file_path, settings.debug)?;
    info!(
        feed = %settings.feed.display(),
        channel = %settings.channel,
        username = %settings.username,
        timezone = %resolved.timezone,
        token = settings.token.is_some(),
        "configuration resolved"
    );

    lack::run(&settings)
}
