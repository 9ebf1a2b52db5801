//! portalradio CLI - find the portal radio controller and talk to it.
//!
//! ## Features
//!
//! - Automatic discovery of the controller's serial port (INIT handshake)
//! - Port cache so later runs skip probing
//! - Interactive command session
//! - JSON output for scripting
//! - Shell completion generation

use anyhow::Result;
use clap::{Parser, Subcommand};
use clap_complete::Shell;
use console::style;
use env_logger::Env;
use log::debug;
use portalradio::{DEFAULT_BAUD_RATE, DEFAULT_CACHE_FILE, PortCache};
use std::env;
use std::path::PathBuf;
use std::process::ExitCode;

mod commands;
mod config;

use config::Config;

/// portalradio - find the portal radio controller and send it commands.
///
/// Environment variables:
///   PORTALRADIO_PORT   - Fixed serial port for run (skips discovery)
///   PORTALRADIO_BAUD   - Baud rate (default: 9600)
///   PORTALRADIO_CACHE  - Port cache file
#[derive(Parser)]
#[command(name = "portalradio")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Serial port for run, skipping discovery (ignored by discover).
    #[arg(short, long, global = true, env = "PORTALRADIO_PORT")]
    port: Option<String>,

    /// Baud rate.
    #[arg(short, long, global = true, env = "PORTALRADIO_BAUD")]
    baud: Option<u32>,

    /// Port cache file.
    #[arg(long, global = true, env = "PORTALRADIO_CACHE", value_name = "PATH")]
    cache: Option<PathBuf>,

    /// Ignore the port cache: always probe, never save.
    #[arg(long, global = true)]
    no_cache: bool,

    /// Verbose output level (-v, -vv for increasing detail).
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Quiet mode (suppress non-essential output).
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Path to a configuration file.
    #[arg(long = "config", global = true, value_name = "PATH")]
    config_path: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available commands.
#[derive(Subcommand)]
enum Commands {
    /// Find the controller and start an interactive session (default).
    Run,

    /// Find the controller and print its port; ignores --port.
    Discover {
        /// Output the result as JSON to stdout.
        #[arg(long)]
        json: bool,
    },

    /// List available serial ports.
    ListPorts {
        /// Output port list as JSON to stdout.
        #[arg(long)]
        json: bool,
    },

    /// Generate shell completion scripts.
    Completions {
        /// Shell type for completions.
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// CLI failures with a dedicated exit code.
#[derive(Debug, thiserror::Error)]
pub(crate) enum CliError {
    /// Bad arguments or configuration (exit code 2).
    #[error("{0}")]
    Usage(String),
}

/// Effective connection settings after merging CLI, environment and config.
#[derive(Debug, Clone)]
pub(crate) struct Settings {
    /// Fixed port; `None` means discover.
    pub port: Option<String>,
    /// Baud rate.
    pub baud: u32,
    /// Port cache, unless disabled.
    pub cache: Option<PortCache>,
    /// Suppress status output.
    pub quiet: bool,
}

impl Settings {
    fn resolve(cli: &Cli, config: &Config) -> Result<Self> {
        let baud = cli
            .baud
            .or(config.connection.baud)
            .unwrap_or(DEFAULT_BAUD_RATE);
        if baud == 0 {
            return Err(CliError::Usage("Baud rate must be greater than 0".to_string()).into());
        }

        let cache = if cli.no_cache || !config.cache.is_enabled() {
            None
        } else {
            let path = cli
                .cache
                .clone()
                .or_else(|| config.cache.file.clone())
                .unwrap_or_else(|| PathBuf::from(DEFAULT_CACHE_FILE));
            Some(PortCache::new(path))
        };

        Ok(Self {
            port: cli
                .port
                .clone()
                .or_else(|| config.connection.serial.clone()),
            baud,
            cache,
            quiet: cli.quiet,
        })
    }
}

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{} {e:#}", style("Error:").red().bold());
            ExitCode::from(exit_code(&e))
        },
    }
}

/// Map an error to the process exit code: 2 usage, 3 no device, 1 otherwise.
fn exit_code(err: &anyhow::Error) -> u8 {
    if err.downcast_ref::<CliError>().is_some() {
        2
    } else if matches!(
        err.downcast_ref::<portalradio::Error>(),
        Some(portalradio::Error::NoDevice)
    ) {
        3
    } else {
        1
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    if env::var("NO_COLOR").is_ok() || !console::Term::stderr().is_term() {
        console::set_colors_enabled(false);
        console::set_colors_enabled_stderr(false);
    }

    // Setup logging based on verbosity
    let log_level = if cli.quiet {
        "warn"
    } else {
        match cli.verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    };
    env_logger::Builder::from_env(Env::default().default_filter_or(log_level))
        .format_target(cli.verbose >= 2)
        .format_timestamp(if cli.verbose >= 2 {
            Some(env_logger::TimestampPrecision::Millis)
        } else {
            None
        })
        .init();

    debug!(
        "portalradio v{} (verbose level: {})",
        env!("CARGO_PKG_VERSION"),
        cli.verbose
    );

    // Load configuration
    let config = if let Some(ref path) = cli.config_path {
        Config::load_from_path(path)
    } else {
        Config::load()
    };

    match cli
        .command
        .as_ref()
        .unwrap_or(&Commands::Run)
    {
        Commands::Run => {
            let settings = Settings::resolve(&cli, &config)?;
            commands::run::cmd_run(&settings)?;
        },
        Commands::Discover { json } => {
            let settings = Settings::resolve(&cli, &config)?;
            commands::discover::cmd_discover(&settings, *json)?;
        },
        Commands::ListPorts { json } => {
            let settings = Settings::resolve(&cli, &config)?;
            commands::list_ports::cmd_list_ports(&settings, *json)?;
        },
        Commands::Completions { shell } => {
            commands::completions::cmd_completions(*shell);
        },
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("portalradio").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn test_cli_flags_win_over_config() {
        let cli = parse(&["--port", "COM7", "--baud", "115200", "--cache", "mine.txt"]);
        let mut config = Config::default();
        config.connection.serial = Some("COM1".to_string());
        config.connection.baud = Some(9600);
        config.cache.file = Some(PathBuf::from("theirs.txt"));

        let settings = Settings::resolve(&cli, &config).unwrap();

        assert_eq!(settings.port.as_deref(), Some("COM7"));
        assert_eq!(settings.baud, 115200);
        assert_eq!(
            settings.cache.unwrap().path(),
            std::path::Path::new("mine.txt")
        );
    }

    #[test]
    fn test_config_fills_missing_flags() {
        let cli = parse(&["discover"]);
        let mut config = Config::default();
        config.connection.baud = Some(57600);

        let settings = Settings::resolve(&cli, &config).unwrap();

        assert_eq!(settings.baud, 57600);
        assert_eq!(
            settings.cache.unwrap().path(),
            std::path::Path::new(DEFAULT_CACHE_FILE)
        );
    }

    #[test]
    fn test_cache_can_be_disabled() {
        let cli = parse(&["--no-cache"]);
        assert!(Settings::resolve(&cli, &Config::default()).unwrap().cache.is_none());

        let cli = parse(&[]);
        let mut config = Config::default();
        config.cache.enabled = Some(false);
        assert!(Settings::resolve(&cli, &config).unwrap().cache.is_none());
    }

    #[test]
    fn test_zero_baud_is_usage_error() {
        let cli = parse(&["--baud", "0"]);
        let err = Settings::resolve(&cli, &Config::default()).unwrap_err();
        assert_eq!(exit_code(&err), 2);
    }

    #[test]
    fn test_exit_code_for_missing_device() {
        let err = anyhow::Error::new(portalradio::Error::NoDevice).context("discovery failed");
        assert_eq!(exit_code(&err), 3);
        assert_eq!(exit_code(&anyhow::anyhow!("boom")), 1);
    }
}
