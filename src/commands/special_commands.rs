//! Special commands parser for interactive chat mode
//!
//! This module parses special commands that can be entered during an
//! interactive chat session. Special commands allow users to:
//! - Open or close a persona's thread
//! - View the feed and the persona catalog
//! - Force a scheduler tick
//! - Display help information
//! - Exit the session
//!
//! Commands are prefixed with `/` and are case-insensitive; persona ids are
//! passed through as typed.

use colored::Colorize;
use thiserror::Error;

/// Errors that can occur when parsing special commands
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CommandError {
    /// Unknown command was entered
    #[error("Unknown command: {0}\n\nType '/help' to see available commands")]
    UnknownCommand(String),

    /// Command requires an argument but none was provided
    #[error("Command {command} requires an argument\n\nUsage: {usage}")]
    MissingArgument { command: String, usage: String },
}

/// Special commands that can be executed during interactive chat
///
/// These commands drive the conversation store or print information,
/// rather than being sent to the open persona.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpecialCommand {
    /// Open a persona's thread, making it the focused chat
    Open(String),

    /// Close the focused thread
    Close,

    /// Show the feed: active personas, unread badges, engagement
    Feed,

    /// List the persona catalog
    Personas,

    /// Run one scheduler tick now
    Tick,

    /// Display help information
    Help,

    /// Exit the interactive session
    Exit,

    /// Not a special command
    ///
    /// The input should be sent to the focused persona.
    None,
}

/// Parse a user input string into a special command
///
/// # Errors
///
/// Returns `CommandError::UnknownCommand` if input starts with "/" but is not
/// a valid command, and `CommandError::MissingArgument` for `/open` without
/// a persona id.
///
/// # Examples
///
/// ```
/// use cultura::commands::special_commands::{parse_special_command, SpecialCommand};
///
/// let cmd = parse_special_command("/open kenji").unwrap();
/// assert_eq!(cmd, SpecialCommand::Open("kenji".to_string()));
///
/// let cmd = parse_special_command("hello there").unwrap();
/// assert_eq!(cmd, SpecialCommand::None);
///
/// assert!(parse_special_command("/dance").is_err());
/// ```
pub fn parse_special_command(input: &str) -> Result<SpecialCommand, CommandError> {
    let trimmed = input.trim();
    let lower = trimmed.to_lowercase();

    if !trimmed.starts_with('/') && lower != "exit" && lower != "quit" {
        return Ok(SpecialCommand::None);
    }

    match lower.as_str() {
        "/open" => Err(CommandError::MissingArgument {
            command: "/open".to_string(),
            usage: "/open <persona_id>".to_string(),
        }),
        input if input.starts_with("/open ") => {
            let id = trimmed[6..].trim();
            Ok(SpecialCommand::Open(id.to_string()))
        }

        "/close" | "/back" => Ok(SpecialCommand::Close),
        "/feed" | "/inbox" => Ok(SpecialCommand::Feed),
        "/personas" | "/discover" => Ok(SpecialCommand::Personas),
        "/tick" => Ok(SpecialCommand::Tick),
        "/help" | "/?" => Ok(SpecialCommand::Help),
        "/quit" | "/exit" | "exit" | "quit" => Ok(SpecialCommand::Exit),

        _ => Err(CommandError::UnknownCommand(trimmed.to_string())),
    }
}

/// Print the interactive help text
pub fn print_help() {
    println!("\n{}", "Chat commands".bold());
    println!("  /open <persona_id>   Open a persona's thread (resets its unread count)");
    println!("  /close               Close the open thread");
    println!("  /feed                Show active personas, unread badges and engagement");
    println!("  /personas            List every persona in the catalog");
    println!("  /tick                Run one scheduler tick now");
    println!("  /help                Show this help");
    println!("  /quit                Leave the chat");
    println!("\nAnything else is sent to the open persona.\n");
}
