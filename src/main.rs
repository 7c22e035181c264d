//! Walletweb main entry point

use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::runtime::Runtime;
use tokio::sync::RwLock;
use walletweb_api::start_server;
use walletweb_config::{Config, ConfigError};
use walletweb_core::Ledger;
use walletweb_parser::DefaultDatasetParser;

#[derive(Parser, Debug)]
#[command(name = "walletweb")]
#[command(author = "Walletweb Contributors")]
#[command(version = "0.1.0")]
#[command(about = "A lightweight personal-finance dashboard", long_about = None)]
struct Args {
    /// Configuration file path
    #[arg(short, long, default_value = "config.yaml")]
    config: PathBuf,

    /// Print the default configuration and exit
    #[arg(long)]
    print_default_config: bool,
}

/// Load the config file; a missing file means defaults
fn load_config(path: PathBuf) -> anyhow::Result<(Config, bool)> {
    match Config::load(path.clone()) {
        Ok(config) => Ok((config, true)),
        Err(ConfigError::NotFound { .. }) => Ok((Config::default(), false)),
        Err(e) => {
            let hint = e.hint();
            Err(e).with_context(|| format!("Failed to load configuration from {} ({})", path.display(), hint))
        }
    }
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    if args.print_default_config {
        print!("{}", Config::generate_default());
        return Ok(());
    }

    let (config, from_file) = load_config(args.config.clone())?;

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(config.logging.level.as_str())).init();

    if from_file {
        log::info!("Config loaded from {}", args.config.display());
    } else {
        log::warn!("Config file {} not found, using defaults", args.config.display());
    }
    log::info!(
        "Data path={}, dataset={}",
        config.data.path.display(),
        config.data.dataset
    );

    let rt = Runtime::new()?;
    rt.block_on(async {
        let parser = Arc::new(DefaultDatasetParser);
        let mut ledger = Ledger::new(config.clone(), parser);

        match ledger.load_configured(walletweb_core::today()).await {
            Ok(count) => log::info!("Ledger ready with {} transactions", count),
            Err(e) => log::error!("Failed to load transactions, starting empty: {}", e),
        }

        start_server(config, Arc::new(RwLock::new(ledger)))
            .await
            .context("Server error")
    })
}
