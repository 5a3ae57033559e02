use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing::{debug, Level};

use crate::{config::Config, error::Error, ports};

/// The command line interface.
#[derive(Debug, Parser)]
#[command(author, version, about)]
pub struct Cli {
    /// Path to a configuration file
    pub config: Option<PathBuf>,

    /// Serial port to open, e.g. `/dev/ttyACM0` or `COM3`.
    /// If neither this nor the configuration names one, ports are discovered.
    #[arg(short, long)]
    pub port: Option<String>,

    /// Baud rate, 38400 if not set here or in the configuration.
    #[arg(short, long)]
    pub baud: Option<u32>,

    /// Go back to the prompt after the device has been quiet for this many milliseconds.
    #[arg(long)]
    pub echo_timeout_ms: Option<u64>,

    /// Log level for the log output on stderr.
    #[arg(long, default_value = "warn")]
    pub log_level: Level,

    /// Also log to daily rotated files in this directory.
    #[arg(long)]
    pub log_dir: Option<PathBuf>,

    /// Subcommands
    #[command(subcommand)]
    pub command: Option<Commands>,
}

impl Cli {
    /// The configuration file's contents (or defaults), with command line overrides applied.
    pub fn load_config(&self) -> Result<Config, Error> {
        let mut config = if let Some(config_path) = &self.config {
            debug!(?config_path, "Config from path");
            Config::new_from_path(config_path)?
        } else {
            debug!("Default config");
            Config::default()
        };

        if let Some(port) = &self.port {
            config.port = Some(port.clone());
        }
        if let Some(baud) = self.baud {
            config.baud = baud;
        }
        if let Some(timeout) = self.echo_timeout_ms {
            config.echo_idle_timeout_ms = Some(timeout);
        }

        config.validate()?;

        Ok(config)
    }
}

/// Commands available in the command line interface.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// List the serial ports found on this machine.
    ListPorts,

    /// Show the scripts which would be offered.
    Scripts,

    /// Examples for user convenience.
    #[clap(subcommand)]
    Examples(Examples),
}

/// Helpful examples for users.
#[derive(Debug, Subcommand, Clone)]
pub enum Examples {
    /// Show an example of a configuration file's contents.
    Config,
}

/// Run a subcommand to completion.
pub fn handle_command(command: Commands, config: &Config) -> Result<(), Error> {
    match command {
        Commands::ListPorts => {
            for port in ports::list_ports() {
                println!("{port}");
            }
        }
        Commands::Scripts => print!("{}", config.script_table()),
        Commands::Examples(Examples::Config) => println!("{}", Config::example().serialize_pretty()?),
    }

    Ok(())
}
