//! Command-line interface definition for Cultura
//!
//! This module defines the CLI structure using clap's derive API,
//! providing commands to inspect the persona catalog, run the engagement
//! simulator headless, and chat with simulated personas.

use clap::{Parser, Subcommand};

/// Cultura - synthetic engagement simulator
///
/// Populates a cultural dating front end with simulated personas that
/// come online, send messages, and answer when written to.
#[derive(Parser, Debug, Clone)]
#[command(name = "cultura")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "config/config.yaml")]
    pub config: Option<String>,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Seed for the simulator RNG (reproducible runs)
    #[arg(long)]
    pub seed: Option<u64>,

    /// YAML persona catalog to use instead of the built-in one
    #[arg(long)]
    pub catalog: Option<String>,

    /// Command to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands for Cultura
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// List the personas in the catalog
    Personas {
        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Run the simulator without a UI and print the resulting feed
    Simulate {
        /// Run this many scheduler ticks back to back, without timers
        #[arg(short, long, conflicts_with = "duration_secs")]
        ticks: Option<u64>,

        /// Run the real-time scheduler for this many seconds
        #[arg(short, long)]
        duration_secs: Option<u64>,

        /// Override the activation probability (0.0-1.0)
        #[arg(long)]
        activation_probability: Option<f64>,

        /// Print the feed snapshot as JSON
        #[arg(long)]
        json: bool,
    },

    /// Chat with simulated personas while the scheduler runs
    Chat {
        /// Open this persona's thread on start
        #[arg(short, long)]
        persona: Option<String>,
    },
}

impl Cli {
    /// Parse command line arguments
    ///
    /// # Returns
    ///
    /// Returns the parsed CLI structure
    pub fn parse_args() -> Self {
        Self::parse()
    }
}

impl Default for Cli {
    fn default() -> Self {
        Self {
            config: Some("config/config.yaml".to_string()),
            verbose: false,
            seed: None,
            catalog: None,
            command: Commands::Personas { json: false },
        }
    }
}
