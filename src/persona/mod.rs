//! Personas and personality categories
//!
//! A persona is a synthetic profile used to make the platform look
//! populated. Each persona carries exactly one personality category, which
//! decides the pool of messages it can send.

pub mod catalog;
pub mod responses;

pub use catalog::PersonaCatalog;
pub use responses::ResponseSelector;

use crate::error::CulturaError;
use colored::Colorize;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Conversational style of a persona
///
/// The set is closed. Adding a variant forces the message table in
/// [`responses`] to grow a matching arm.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Personality {
    /// Chatty, quick to reach out
    Outgoing,
    /// Talks about art, music and making things
    Creative,
    /// Books, ideas and long conversations
    Intellectual,
    /// Travel, hiking and spontaneous plans
    Adventurous,
    /// Warm, affectionate openers
    Romantic,
}

impl Personality {
    /// Every personality, in declaration order
    pub const ALL: [Personality; 5] = [
        Self::Outgoing,
        Self::Creative,
        Self::Intellectual,
        Self::Adventurous,
        Self::Romantic,
    ];

    /// Lowercase tag used in config files and logs
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Outgoing => "outgoing",
            Self::Creative => "creative",
            Self::Intellectual => "intellectual",
            Self::Adventurous => "adventurous",
            Self::Romantic => "romantic",
        }
    }

    /// Get a colored tag representation of this personality
    ///
    /// # Examples
    ///
    /// ```ignore
    /// use cultura::persona::Personality;
    ///
    /// println!("{}", Personality::Romantic.colored_tag()); // "[romantic]" in magenta
    /// ```
    pub fn colored_tag(&self) -> String {
        let tag = self.as_str();
        let colored = match self {
            Self::Outgoing => tag.yellow(),
            Self::Creative => tag.cyan(),
            Self::Intellectual => tag.blue(),
            Self::Adventurous => tag.green(),
            Self::Romantic => tag.magenta(),
        };
        format!("[{}]", colored)
    }
}

impl fmt::Display for Personality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Personality {
    type Err = CulturaError;

    /// Parse a personality tag, case-insensitively
    ///
    /// # Errors
    ///
    /// Returns `CulturaError::UnknownPersonality` for any tag outside the
    /// closed set; there is no fallback personality.
    ///
    /// # Examples
    ///
    /// ```
    /// use cultura::persona::Personality;
    ///
    /// let p: Personality = "Creative".parse().unwrap();
    /// assert_eq!(p, Personality::Creative);
    /// assert!("grumpy".parse::<Personality>().is_err());
    /// ```
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "outgoing" => Ok(Self::Outgoing),
            "creative" => Ok(Self::Creative),
            "intellectual" => Ok(Self::Intellectual),
            "adventurous" => Ok(Self::Adventurous),
            "romantic" => Ok(Self::Romantic),
            _ => Err(CulturaError::UnknownPersonality(s.to_string())),
        }
    }
}

/// A synthetic profile
///
/// Immutable for the lifetime of a catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Persona {
    /// Stable identifier, unique within a catalog
    pub id: String,
    /// Name shown on cards and chat headers
    pub display_name: String,
    /// Avatar token (an emoji or asset key)
    pub avatar: String,
    /// Conversational style
    pub personality: Personality,
    /// Short profile text
    #[serde(default)]
    pub bio: String,
    /// Cultural background tag
    #[serde(default)]
    pub culture: String,
    /// Free-form location
    #[serde(default)]
    pub location: String,
    /// Interests shown on discovery cards
    #[serde(default)]
    pub interests: Vec<String>,
}
