//! zSnap CLI
//!
//! Command-line interface for inspecting and editing zSnap settings.

use std::fs::File;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use zsnap_core::{Config, StorageError};

mod commands;
mod output;

use output::{Output, OutputFormat};

#[derive(Parser)]
#[command(name = "zsnap")]
#[command(about = "zSnap - persistent settings store")]
#[command(version)]
#[command(propagate_version = true)]
struct Cli {
    /// Output as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Quiet mode - minimal output
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Use a specific config file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Load settings and show what was resolved
    Status,
    /// Show or change stored settings
    Settings {
        #[command(subcommand)]
        command: Option<SettingsCommands>,
    },
    /// Show or set configuration
    Config {
        #[command(subcommand)]
        command: Option<ConfigCommands>,
    },
}

#[derive(Subcommand)]
enum SettingsCommands {
    /// Show all settings
    #[command(alias = "ls")]
    Show,
    /// Show a single setting
    Get {
        /// Setting key (e.g. CheckUpdates)
        key: String,
    },
    /// Change a setting
    Set {
        /// Setting key (e.g. CheckUpdates)
        key: String,
        /// New value
        value: String,
    },
    /// Remove a setting (settings with defaults are restored on next start)
    #[command(alias = "rm")]
    Unset {
        /// Setting key
        key: String,
    },
}

#[derive(Subcommand)]
enum ConfigCommands {
    /// Show current configuration
    Show,
    /// Set a configuration value
    Set {
        /// Configuration key (data_dir, log_file)
        key: String,
        /// Configuration value
        value: String,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let output = Output::new(OutputFormat::from_flags(cli.json, cli.quiet));

    match run(cli, &output) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            report_error(&e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli, output: &Output) -> Result<()> {
    let config_path = cli.config.as_ref();

    // Config commands don't touch the settings store
    if let Some(Commands::Config { command }) = cli.command {
        return match command {
            Some(ConfigCommands::Show) | None => commands::config::show(config_path, output),
            Some(ConfigCommands::Set { key, value }) => {
                commands::config::set(key, value, config_path, output)
            }
        };
    }

    let config = Config::load_with_cli_override(config_path)?;
    init_logging(&config);

    match cli.command {
        Some(Commands::Status) | None => commands::status::show(&config, output),
        Some(Commands::Settings { command }) => match command {
            Some(SettingsCommands::Show) | None => commands::settings::show(&config, output),
            Some(SettingsCommands::Get { key }) => commands::settings::get(&config, key, output),
            Some(SettingsCommands::Set { key, value }) => {
                commands::settings::set(&config, key, value, output)
            }
            Some(SettingsCommands::Unset { key }) => {
                commands::settings::unset(&config, key, output)
            }
        },
        Some(Commands::Config { .. }) => unreachable!(), // Handled above
    }
}

/// Print an error, with the full startup diagnostic if the store could not be opened
fn report_error(error: &anyhow::Error) {
    if let Some(diagnostic) = startup_diagnostic(error) {
        eprintln!("{}", diagnostic);
        return;
    }

    eprintln!("Error: {:#}", error);
    let suggestion = error
        .downcast_ref::<StorageError>()
        .and_then(StorageError::recovery_suggestion);
    if let Some(suggestion) = suggestion {
        eprintln!("{}", suggestion);
    }
}

/// Diagnostic shown when the settings file exists but cannot be opened
///
/// Returns `None` for every other error.
fn startup_diagnostic(error: &anyhow::Error) -> Option<String> {
    let storage_error = error.downcast_ref::<StorageError>()?;
    let StorageError::Inaccessible { source, .. } = storage_error else {
        return None;
    };

    let mut message = String::from("zSnap could not start.\n\n");
    message.push_str("The file used by zSnap to store settings could not be opened.\n");
    if let Some(suggestion) = storage_error.recovery_suggestion() {
        message.push_str(suggestion);
        message.push('\n');
    }
    message.push_str("\nProvided below is the error message generated:\n\n");
    message.push_str(&format!("\"{}\"", source));
    Some(message)
}

/// Initialize logging
///
/// Only initializes if ZSNAP_LOG environment variable is set.
/// Logs to file (config.log_file or default {data_dir}/debug.log).
fn init_logging(config: &Config) {
    let Ok(log_level) = std::env::var("ZSNAP_LOG") else {
        return;
    };

    let log_path = config.log_path();
    if let Some(parent) = log_path.parent() {
        let _ = std::fs::create_dir_all(parent);
    }

    let log_file = match File::create(&log_path) {
        Ok(f) => f,
        Err(e) => {
            eprintln!("Warning: Could not create log file {:?}: {}", log_path, e);
            return;
        }
    };

    let env_filter = EnvFilter::new(format!("zsnap_core={},zsnap_cli={}", log_level, log_level));

    // Ignore error if already initialized
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_ansi(false)
        .with_writer(log_file)
        .try_init();

    info!("Logging initialized to {:?}", log_path);
}
