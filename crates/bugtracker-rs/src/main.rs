//! `bugtracker` binary: runs the REST API or the terminal client.

use anyhow::Context;
use bugtracker_rs::config::{LayeredConfigOptions, TrackerConfig};
use bugtracker_rs::{ENV_LOG_FILE, LogOutput, init_logging};
use clap::{Parser, Subcommand};
use log::{debug, error, info};
use std::path::PathBuf;

/// Command-line options shared by all subcommands.
#[derive(Parser)]
#[command(name = "bugtracker", version, about = "Bug tracker API server and terminal client")]
struct Cli {
    /// Extra bugtracker.json5 files applied after the default layers
    #[arg(long = "config", global = true)]
    configs: Vec<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the REST API server
    Serve {
        /// Bind host override
        #[arg(long)]
        host: Option<String>,
        /// Bind port override
        #[arg(long)]
        port: Option<u16>,
    },
    /// Run the terminal client against a running API
    Tui {
        /// API base URL override, including the /api prefix
        #[arg(long)]
        api_url: Option<String>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let interactive = matches!(cli.command, Command::Tui { .. });
    let log_file = std::env::var_os(ENV_LOG_FILE).map(PathBuf::from);
    init_logging(LogOutput::for_command(interactive, log_file))
        .context("failed to open log file")?;
    install_panic_hook();

    let mut config = load_config(&cli.configs)?;
    match cli.command {
        Command::Serve { host, port } => {
            if let Some(host) = host {
                config.server.host = host;
            }
            if let Some(port) = port {
                config.server.port = port;
            }
            config.validate().context("invalid config")?;
            info!(
                "starting server (environment={:?}, store={:?})",
                config.server.environment, config.store.backend
            );
            bugtracker_rs::server::serve(config)
                .await
                .context("server failed")?;
        }
        Command::Tui { api_url } => {
            if let Some(api_url) = api_url {
                config.client.base_url = api_url;
            }
            info!("starting tui (base_url={})", config.client.base_url);
            bugtracker_rs::tui::run(config.client)
                .await
                .context("tui failed")?;
        }
    }
    Ok(())
}

fn load_config(runtime_paths: &[PathBuf]) -> anyhow::Result<TrackerConfig> {
    let cwd = std::env::current_dir().context("cwd")?;
    info!("loading layered config from cwd: {}", cwd.display());
    let options = runtime_paths
        .iter()
        .fold(LayeredConfigOptions::new(&cwd), |options, path| {
            options.with_runtime_path(path)
        });
    let layered =
        TrackerConfig::load_layered_with_options(options).context("failed to load config")?;
    debug!("layered config loaded (layers={})", layered.layers.len());
    Ok(layered.config)
}

/// Log panics before the default hook prints them.
fn install_panic_hook() {
    let default_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic| {
        error!("panic: {panic}");
        default_hook(panic);
    }));
}
