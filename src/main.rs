//! Cultura - synthetic engagement simulator CLI
//!
#![doc = "Cultura - synthetic engagement simulator CLI"]
#![doc = "Main entry point for the Cultura application."]

use anyhow::Result;

use cultura::cli::{Cli, Commands};
use cultura::commands;
use cultura::config::Config;
use cultura::logging::init_logging;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command line arguments
    let cli = Cli::parse_args();

    // Load configuration
    let config_path = cli.config.as_deref().unwrap_or("config/config.yaml");
    let config = Config::load(config_path, &cli)?;

    // Validate configuration
    config.validate()?;

    // Initialize tracing
    init_logging(&config.logging)?;

    // Execute command
    match cli.command {
        Commands::Personas { json } => {
            tracing::debug!("Listing persona catalog");
            commands::personas::list_personas(&config, json)?;
            Ok(())
        }
        Commands::Simulate {
            ticks,
            duration_secs,
            activation_probability,
            json,
        } => {
            tracing::info!("Starting headless simulation");
            if let Some(p) = activation_probability {
                tracing::debug!("Using activation probability override: {}", p);
            }

            // Moves `config` into the handler (match arms are exclusive)
            commands::simulate::run_simulate(
                config,
                ticks,
                duration_secs,
                activation_probability,
                json,
            )
            .await?;
            Ok(())
        }
        Commands::Chat { persona } => {
            if let Some(p) = &persona {
                tracing::debug!("Opening thread on start: {}", p);
            }
            commands::chat::run_chat(config, persona).await?;
            Ok(())
        }
    }
}
