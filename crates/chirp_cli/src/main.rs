//! Chirp process entry point.
//!
//! # Responsibility
//! - Merge config file, environment and flags into one `ServerConfig`.
//! - Initialize logging before the database is opened.
//! - Keep a `ping` probe that only checks core crate wiring.

use chirp_core::{init_logging, init_stderr_logging};
use chirp_server::config::parse_bind_addr;
use chirp_server::{serve, ServerConfig};
use clap::{Args, Parser, Subcommand};
use log::error;
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Debug, Parser)]
#[command(name = "chirp", version, about = "Chirp social graph server")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Run the HTTP API.
    Serve(ServeArgs),
    /// Print core ping and version.
    Ping,
}

#[derive(Debug, Args)]
struct ServeArgs {
    /// TOML config file.
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,
    #[arg(long, value_name = "ADDR")]
    bind_addr: Option<String>,
    #[arg(long, value_name = "PATH")]
    db_path: Option<PathBuf>,
    /// trace|debug|info|warn|error
    #[arg(long, value_name = "LEVEL")]
    log_level: Option<String>,
    /// Absolute directory for rolling log files.
    #[arg(long, value_name = "DIR")]
    log_dir: Option<PathBuf>,
    #[arg(long, value_name = "ORIGIN")]
    cors_origin: Option<String>,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match cli.command {
        Command::Ping => {
            println!("chirp_core ping={}", chirp_core::ping());
            println!("chirp_core version={}", chirp_core::core_version());
            ExitCode::SUCCESS
        }
        Command::Serve(args) => match run_server(args) {
            Ok(()) => ExitCode::SUCCESS,
            Err(message) => {
                error!("event=app_exit module=cli status=error error={message}");
                eprintln!("chirp: {message}");
                ExitCode::FAILURE
            }
        },
    }
}

fn run_server(args: ServeArgs) -> Result<(), String> {
    let mut config = ServerConfig::load(args.config.as_deref()).map_err(|err| err.to_string())?;
    apply_cli_overrides(&mut config, args)?;

    match &config.log_dir {
        Some(dir) => init_logging(&config.log_level, &dir.to_string_lossy())?,
        None => init_stderr_logging(&config.log_level)?,
    }

    let runtime = tokio::runtime::Runtime::new().map_err(|err| err.to_string())?;
    runtime
        .block_on(serve(&config))
        .map_err(|err| err.to_string())
}

fn apply_cli_overrides(config: &mut ServerConfig, args: ServeArgs) -> Result<(), String> {
    if let Some(addr) = args.bind_addr {
        config.bind_addr = parse_bind_addr(&addr).map_err(|err| err.to_string())?;
    }
    if let Some(path) = args.db_path {
        config.db_path = path;
    }
    if let Some(level) = args.log_level {
        config.log_level = level;
    }
    if let Some(dir) = args.log_dir {
        config.log_dir = Some(dir);
    }
    if let Some(origin) = args.cors_origin {
        config.cors_origin = origin;
    }
    Ok(())
}
