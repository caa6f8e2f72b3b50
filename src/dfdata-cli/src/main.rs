mod cli;
mod commands;
mod config;
mod http;

use anyhow::Result;
use clap::Parser;
use config::Config;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use cli::*;

fn main() -> Result<()> {
    // Diagnostics go to stderr so reports on stdout stay clean
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "dfdata=info,dfdata_cli=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let config = Config::load()?;

    match cli.command {
        Commands::Extract { input, output } => commands::extract::run(
            input.as_deref().unwrap_or(&config.input),
            output.as_deref().unwrap_or(&config.output_dir),
        )?,

        Commands::Props { input, output } => commands::props::run(
            input.as_deref().unwrap_or(&config.props_input),
            output.as_deref().unwrap_or(&config.output_dir),
        )?,

        Commands::BackfillPrices { catalog, sources } => {
            let sources = if sources.is_empty() {
                config.price_sources.clone()
            } else {
                sources
            };
            commands::prices::run(
                &catalog.unwrap_or_else(|| config.catalog_path()),
                &sources,
            )?;
        }

        Commands::BaselineSlots { file } => {
            commands::slots::run(&file.unwrap_or_else(|| config.slot_system_path()))?;
        }

        Commands::Analyze { input } => {
            commands::analyze::run(input.as_deref().unwrap_or(&config.input))?;
        }

        Commands::Relations { input } => {
            commands::relations::run(input.as_deref().unwrap_or(&config.input))?;
        }

        Commands::Images {
            catalog,
            output,
            workers,
        } => {
            let mut options = config.fetch_options();
            if let Some(workers) = workers {
                options.workers = workers;
            }
            commands::images::download(
                &catalog.unwrap_or_else(|| config.catalog_path()),
                output.as_deref().unwrap_or(&config.images_dir),
                &options,
                config.timeout(),
            )?;
        }

        Commands::ImageStatus { catalog, output } => {
            commands::images::status(
                &catalog.unwrap_or_else(|| config.catalog_path()),
                output.as_deref().unwrap_or(&config.images_dir),
            )?;
        }

        Commands::Config => {
            println!("Config file: {}", Config::config_path()?.display());
            println!();
            print!("{}", config.to_toml()?);
        }
    }

    Ok(())
}
