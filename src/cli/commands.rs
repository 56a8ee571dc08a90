use anyhow::{Context as _, Result};
use clap::{Args, Parser, Subcommand};
use signal_hook::consts::{SIGINT, SIGTERM};
use signal_hook::iterator::Signals;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use super::app::demo_router;
use crate::env_file::{load_environment, DEFAULT_ENV_FILE};
use crate::logging::init_logging;
use crate::runtime_config::RuntimeConfig;
use crate::server::HttpServer;

/// Command-line interface for gyr
#[derive(Parser, Debug)]
#[command(name = "gyr")]
#[command(about = "gyr request router", long_about = None, version)]
pub struct Cli {
    /// The subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Serve the demo application
    Serve {
        #[command(flatten)]
        config: ConfigArgs,
    },
    /// Print the route table in search order
    Routes {
        #[command(flatten)]
        config: ConfigArgs,
    },
}

/// Options shared by every command.
#[derive(Args, Debug, Clone, Default)]
pub struct ConfigArgs {
    /// TOML configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Address to listen on (e.g. 127.0.0.1:8080)
    #[arg(long)]
    pub addr: Option<String>,

    /// Directory served under the static prefix
    #[arg(long)]
    pub static_dir: Option<PathBuf>,

    /// `.env` file to apply before reading the environment
    #[arg(long)]
    pub env_file: Option<PathBuf>,
}

/// Build the effective configuration: file, then `.env`, then environment, then flags.
///
/// An explicitly named `.env` file must exist; the default `.env` is optional.
pub fn resolve_config(args: &ConfigArgs) -> Result<RuntimeConfig> {
    let mut config = match &args.config {
        Some(path) => RuntimeConfig::from_toml_file(path)?,
        None => RuntimeConfig::default(),
    };

    let explicit_env = args
        .env_file
        .clone()
        .or_else(|| std::env::var_os("GYR_ENV_FILE").map(PathBuf::from))
        .or_else(|| config.env_file.clone());
    match &explicit_env {
        Some(path) => {
            load_environment(path)
                .with_context(|| format!("Failed to load env file {}", path.display()))?;
        }
        None if Path::new(DEFAULT_ENV_FILE).is_file() => {
            load_environment(DEFAULT_ENV_FILE)
                .with_context(|| format!("Failed to load env file {DEFAULT_ENV_FILE}"))?;
        }
        None => debug!("No env file to load"),
    }

    config = config.apply_env();
    if let Some(addr) = &args.addr {
        config.addr = addr.clone();
    }
    if let Some(dir) = &args.static_dir {
        config.static_dir = Some(dir.clone());
    }
    if explicit_env.is_some() {
        config.env_file = explicit_env;
    }
    Ok(config)
}

/// Parse the command line and run the selected command.
///
/// # Errors
///
/// Returns an error if the configuration cannot be loaded, logging cannot be
/// initialised, the static directory cannot be read or the server fails to start.
pub fn run_cli() -> Result<()> {
    let cli = Cli::parse();
    match cli.command {
        Commands::Serve { config } => {
            let config = resolve_config(&config)?;
            init_logging(&config.log)?;
            let router = demo_router(&config)?;
            let dispatcher = router.into_dispatcher();

            let handle = HttpServer::new(dispatcher)
                .with_max_body_bytes(config.max_body_bytes)
                .start(config.addr.as_str())
                .with_context(|| format!("Failed to bind {}", config.addr))?;
            info!(addr = %handle.addr(), "gyr serving; press Ctrl-C to stop");

            let mut signals = Signals::new([SIGINT, SIGTERM])
                .context("Failed to install signal handlers")?;
            if let Some(signal) = signals.forever().next() {
                info!(signal, "Shutdown signal received");
            }
            handle.stop();
            Ok(())
        }
        Commands::Routes { config } => {
            let config = resolve_config(&config)?;
            let router = demo_router(&config)?;
            router.dump_routes();
            Ok(())
        }
    }
}
