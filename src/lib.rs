//! Cultura - synthetic engagement simulator library
//!
//! This library populates a cultural dating front end with simulated
//! personas: they come online, send unprompted messages in their own voice,
//! and answer when the user writes to them.
//!
//! # Architecture
//!
//! The library is organized into the following modules:
//!
//! - `persona`: Persona catalog and personality-keyed response templates
//! - `store`: Conversation threads, unread counts, and the engagement counter
//! - `simulator`: Timer-driven scheduler and delayed reply tasks
//! - `feed`: Read-only feed, unread, and discovery projection
//! - `config`: Configuration management and validation
//! - `error`: Error types and result aliases
//! - `cli`: Command-line interface definition
//!
//! # Example
//!
//! ```no_run
//! use cultura::{Config, Simulator};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::load("config.yaml", &Default::default())?;
//!     let simulator = Simulator::from_config(&config)?;
//!     simulator.start()?;
//!
//!     let feed = simulator.feed().await;
//!     println!("{} personas active", feed.active.len());
//!
//!     simulator.stop().await;
//!     Ok(())
//! }
//! ```

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod feed;
pub mod logging;
pub mod persona;
pub mod simulator;
pub mod store;

// Re-export commonly used types
pub use config::Config;
pub use error::{CulturaError, Result};
pub use feed::FeedSnapshot;
pub use persona::{Persona, PersonaCatalog, Personality, ResponseSelector};
pub use simulator::Simulator;
pub use store::{ConversationStore, StoreEvent};
