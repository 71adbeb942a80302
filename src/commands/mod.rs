/*!
Command handlers for the CLI

This module provides command handlers invoked by the CLI entrypoint.

It exposes three top-level command modules:

- `personas`: Print the persona catalog
- `simulate`: Run the engagement simulator headless
- `chat`: Interactive chat with simulated personas

These handlers are intentionally small and use the library components:
catalog, simulator, and feed projection.
*/

use crate::config::Config;
use crate::error::{CulturaError, Result};
use crate::feed::FeedSnapshot;
use crate::persona::{Persona, PersonaCatalog};
use colored::Colorize;
use prettytable::{row, Table};

// Special commands parser for the chat REPL
pub mod special_commands;

// Catalog listing
pub mod personas {
    //! Persona catalog listing.

    use super::*;

    /// Print the catalog as a table or JSON
    ///
    /// # Errors
    ///
    /// Returns an error if the configured catalog file cannot be loaded.
    pub fn list_personas(config: &Config, json: bool) -> Result<()> {
        let catalog = PersonaCatalog::load(config.catalog.path.as_deref())?;
        if json {
            let out =
                serde_json::to_string_pretty(catalog.list()).map_err(CulturaError::Serialization)?;
            println!("{}", out);
        } else {
            print_personas_table(catalog.list());
        }
        Ok(())
    }
}

// Headless simulation
pub mod simulate {
    //! Headless simulator run.
    //!
    //! With `--ticks` the scheduler step runs back to back without timers,
    //! which together with `--seed` gives a reproducible run. With
    //! `--duration-secs` the real scheduler runs for that long and persona
    //! messages are printed as they arrive.

    use super::*;
    use crate::simulator::Simulator;
    use crate::store::StoreEvent;
    use std::time::Duration;

    /// Run the simulator and print the resulting feed
    ///
    /// # Arguments
    ///
    /// * `config` - Global configuration (consumed)
    /// * `ticks` - Number of immediate ticks to run
    /// * `duration_secs` - Real-time run length when `ticks` is not given
    /// * `activation_probability` - Override for the configured probability
    /// * `json` - Print the final snapshot as JSON
    pub async fn run_simulate(
        mut config: Config,
        ticks: Option<u64>,
        duration_secs: Option<u64>,
        activation_probability: Option<f64>,
        json: bool,
    ) -> Result<()> {
        if let Some(p) = activation_probability {
            config.simulator.activation_probability = p;
        }

        let simulator = Simulator::from_config(&config)?;

        match (ticks, duration_secs) {
            (Some(n), _) => {
                tracing::info!(ticks = n, "Running immediate ticks");
                for _ in 0..n {
                    let report = simulator.tick().await?;
                    if !json {
                        if let Some(message) = &report.message {
                            println!("[tick {:>3}] {}: {}", report.tick, report.persona_id, message);
                        }
                    }
                }
            }
            (None, secs) => {
                let secs = secs.unwrap_or(30);
                tracing::info!(duration_secs = secs, "Running real-time scheduler");
                let mut events = simulator.subscribe().await;
                simulator.start()?;

                let deadline = tokio::time::sleep(Duration::from_secs(secs));
                tokio::pin!(deadline);
                loop {
                    tokio::select! {
                        _ = &mut deadline => break,
                        event = events.recv() => match event {
                            Ok(StoreEvent::MessageAppended { persona_id, from_persona: true, content, .. }) => {
                                if !json {
                                    println!("{}: {}", persona_id.bold(), content);
                                }
                            }
                            Ok(_) => {}
                            Err(tokio::sync::broadcast::error::RecvError::Lagged(n)) => {
                                tracing::warn!(skipped = n, "Event printer lagged");
                            }
                            Err(tokio::sync::broadcast::error::RecvError::Closed) => break,
                        }
                    }
                }
            }
        }

        simulator.stop().await;
        let feed = simulator.feed().await;
        if json {
            let out = serde_json::to_string_pretty(&feed).map_err(CulturaError::Serialization)?;
            println!("{}", out);
        } else {
            print_feed(&feed);
        }
        Ok(())
    }
}

// Chat command handler
pub mod chat {
    //! Interactive chat mode handler.
    //!
    //! Starts the simulator, prints persona activity as it happens, and runs
    //! a readline loop. Plain text goes to the open thread; `/` commands
    //! drive the store.

    use super::special_commands::{parse_special_command, print_help, SpecialCommand};
    use super::*;
    use crate::simulator::Simulator;
    use crate::store::StoreEvent;
    use rustyline::error::ReadlineError;
    use rustyline::DefaultEditor;
    use std::sync::Arc;

    /// Start interactive chat mode
    ///
    /// # Arguments
    ///
    /// * `config` - Global configuration
    /// * `persona` - Optional persona whose thread opens on start
    pub async fn run_chat(config: Config, persona: Option<String>) -> Result<()> {
        tracing::info!("Starting interactive chat mode");

        let simulator = Arc::new(Simulator::from_config(&config)?);
        let catalog = PersonaCatalog::load(config.catalog.path.as_deref())?;

        let printer = spawn_event_printer(Arc::clone(&simulator), simulator.subscribe().await);
        simulator.start()?;

        let mut focused: Option<String> = None;
        if let Some(id) = persona {
            match simulator.open_thread(&id).await {
                Ok(()) => focused = Some(id),
                Err(e) => eprintln!("{}", e.to_string().red()),
            }
        }

        let mut rl = DefaultEditor::new()?;
        print_welcome_banner(&catalog);

        loop {
            let prompt = match &focused {
                Some(id) => format!("[{}] > ", id.magenta()),
                None => "[feed] > ".to_string(),
            };

            let readline = rl.readline(&prompt);
            match readline {
                Ok(line) => {
                    let trimmed = line.trim();
                    if trimmed.is_empty() {
                        continue;
                    }
                    let _ = rl.add_history_entry(trimmed);

                    let command = match parse_special_command(trimmed) {
                        Ok(command) => command,
                        Err(e) => {
                            eprintln!("{}", e.to_string().red());
                            continue;
                        }
                    };

                    match command {
                        SpecialCommand::Open(id) => match simulator.open_thread(&id).await {
                            Ok(()) => {
                                print_thread(&simulator, &catalog, &id).await;
                                focused = Some(id);
                            }
                            Err(e) => eprintln!("{}", e.to_string().red()),
                        },
                        SpecialCommand::Close => {
                            simulator.close_thread().await;
                            focused = None;
                        }
                        SpecialCommand::Feed => print_feed(&simulator.feed().await),
                        SpecialCommand::Personas => print_personas_table(catalog.list()),
                        SpecialCommand::Tick => {
                            if let Err(e) = simulator.tick().await {
                                eprintln!("{}", e.to_string().red());
                            }
                        }
                        SpecialCommand::Help => print_help(),
                        SpecialCommand::Exit => break,
                        SpecialCommand::None => {
                            let Some(id) = &focused else {
                                println!("Open a thread first with /open <persona_id>");
                                continue;
                            };
                            if let Err(e) = simulator.send_message(id, trimmed).await {
                                eprintln!("{}", e.to_string().red());
                            }
                        }
                    }
                }
                Err(ReadlineError::Interrupted) => {
                    println!("CTRL-C");
                    break;
                }
                Err(ReadlineError::Eof) => {
                    println!("CTRL-D");
                    break;
                }
                Err(err) => {
                    tracing::error!("Readline error: {:?}", err);
                    break;
                }
            }
        }

        simulator.stop().await;
        printer.abort();
        println!(
            "Goodbye! {} simulated messages this session.",
            simulator.engagement().await
        );
        Ok(())
    }

    fn spawn_event_printer(
        simulator: Arc<Simulator>,
        mut events: tokio::sync::broadcast::Receiver<StoreEvent>,
    ) -> tokio::task::JoinHandle<()> {
        tokio::spawn(async move {
            loop {
                match events.recv().await {
                    Ok(StoreEvent::MessageAppended {
                        persona_id,
                        from_persona: true,
                        content,
                        unread,
                    }) => {
                        if unread == 0 {
                            println!("\n{}: {}", persona_id.bold().magenta(), content);
                        } else {
                            println!(
                                "\n{} {} ({} unread)",
                                "new message from".dimmed(),
                                persona_id.bold(),
                                unread
                            );
                        }
                    }
                    Ok(StoreEvent::Typing {
                        persona_id,
                        typing: true,
                    }) => {
                        println!("{}", format!("{} is typing...", persona_id).dimmed());
                    }
                    Ok(_) => {}
                    Err(tokio::sync::broadcast::error::RecvError::Lagged(n)) => {
                        tracing::debug!(skipped = n, "Chat event printer lagged");
                    }
                    Err(tokio::sync::broadcast::error::RecvError::Closed) => break,
                }
                if simulator.is_stopped() {
                    break;
                }
            }
        })
    }

    async fn print_thread(simulator: &Simulator, catalog: &PersonaCatalog, id: &str) {
        let name = catalog
            .get(id)
            .map(|p| format!("{} {} {}", p.avatar, p.display_name, p.personality.colored_tag()))
            .unwrap_or_else(|| id.to_string());
        println!("\n{}", name.bold());

        if let Some(thread) = simulator.thread(id).await {
            for message in thread.messages() {
                let who = if message.sender.is_persona() {
                    id.magenta().to_string()
                } else {
                    "you".cyan().to_string()
                };
                println!(
                    "  {} {}: {}",
                    message.timestamp.format("%H:%M:%S").to_string().dimmed(),
                    who,
                    message.content
                );
            }
        }
        println!();
    }

    fn print_welcome_banner(catalog: &PersonaCatalog) {
        println!(
            "\n{} {} personas are around. Type /help for commands.\n",
            "Cultura chat.".bold(),
            catalog.len()
        );
    }
}

/// Print personas in table format
fn print_personas_table(personas: &[Persona]) {
    let mut table = Table::new();
    table.add_row(row!["Id", "Name", "Personality", "Culture", "Location", "Interests"]);

    for persona in personas {
        table.add_row(row![
            persona.id,
            format!("{} {}", persona.avatar, persona.display_name),
            persona.personality,
            persona.culture,
            persona.location,
            persona.interests.join(", ")
        ]);
    }

    println!();
    table.printstd();
    println!();
}

/// Print a feed snapshot
fn print_feed(feed: &FeedSnapshot) {
    let mut table = Table::new();
    table.add_row(row!["Persona", "Status", "Unread", "Last message"]);

    for active in &feed.active {
        let status = if active.typing {
            "typing"
        } else if active.online {
            "online"
        } else {
            "offline"
        };
        let marker = if active.focused { " *" } else { "" };
        table.add_row(row![
            format!("{}{}", active.persona.display_name, marker),
            status,
            active.unread,
            active.last_message.as_deref().unwrap_or("-")
        ]);
    }

    println!("\nActive personas:\n");
    table.printstd();
    println!(
        "\nEngagement: {}   Unread: {}   Still to discover: {}\n",
        feed.engagement,
        feed.total_unread,
        feed.discovery.len()
    );
}
