pub mod cli;
pub mod clients;
pub mod config;
pub mod constants;
pub mod domain;
pub mod models;
pub mod parser;
pub mod picker;
pub mod report;
pub mod services;

use anyhow::Context;
use clap::Parser;
use cli::{Cli, Commands};
pub use config::Config;
use tracing::info;
use tracing_subscriber::EnvFilter;

pub async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();

    if matches!(cli.command, Some(Commands::Init)) {
        let path = cli.config.unwrap_or_else(Config::default_config_path);
        if Config::create_default_if_missing(&path)? {
            println!("✓ Config file created. Edit {} and run again.", path.display());
        } else {
            println!("Config file already exists: {}", path.display());
        }
        return Ok(());
    }

    let config = match &cli.config {
        Some(path) => Config::load_from_path(path)?,
        None => Config::load()?,
    };
    config.validate().context("Invalid configuration")?;

    init_tracing(&config.general.log_level, cli.json_logs || config.general.json_logs);
    info!(
        event = "startup",
        version = env!("CARGO_PKG_VERSION"),
        "Diorama starting"
    );

    match cli.command.unwrap_or(Commands::Run) {
        Commands::Run => cli::cmd_run(&config).await,
        Commands::Fetch => cli::cmd_fetch(&config).await,
        Commands::Unpack => cli::cmd_unpack(&config).await,
        Commands::Convert {
            source_dir,
            skip_malformed,
        } => cli::cmd_convert(&config, source_dir, skip_malformed).await,
        Commands::Inspect { file } => cli::cmd_inspect(&config, &file).await,
        Commands::Init => Ok(()),
    }
}

fn init_tracing(log_level: &str, json: bool) {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));

    // stdout is reserved for command output such as `inspect`.
    let text_layer = (!json).then(|| tracing_subscriber::fmt::layer().with_writer(std::io::stderr));
    let json_layer = json.then(|| {
        tracing_subscriber::fmt::layer()
            .json()
            .with_writer(std::io::stderr)
    });

    tracing_subscriber::registry()
        .with(env_filter)
        .with(text_layer)
        .with(json_layer)
        .init();
}
