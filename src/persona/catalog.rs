//! Persona catalog
//!
//! The catalog is fixed for the life of a simulator: loaded once at start,
//! never mutated. It ships with a built-in seed and can alternatively be
//! read from a YAML file.

use super::{Persona, Personality};
use crate::error::{CulturaError, Result};
use serde::Deserialize;
use std::collections::HashSet;
use std::path::Path;

/// On-disk catalog layout
///
/// ```yaml
/// personas:
///   - id: amara
///     display_name: Amara
///     avatar: "🌺"
///     personality: romantic
///     culture: Nigerian
/// ```
#[derive(Debug, Deserialize)]
struct CatalogFile {
    personas: Vec<Persona>,
}

/// Immutable, ordered set of personas
#[derive(Debug, Clone)]
pub struct PersonaCatalog {
    personas: Vec<Persona>,
}

impl PersonaCatalog {
    /// Builds a catalog from personas
    ///
    /// # Errors
    ///
    /// Returns `CulturaError::Config` if the list is empty, contains a
    /// duplicate or blank id, or uses a personality without templates.
    ///
    /// # Examples
    ///
    /// ```
    /// use cultura::persona::PersonaCatalog;
    ///
    /// let catalog = PersonaCatalog::builtin();
    /// let again = PersonaCatalog::new(catalog.list().to_vec()).unwrap();
    /// assert_eq!(again.len(), catalog.len());
    /// ```
    pub fn new(personas: Vec<Persona>) -> Result<Self> {
        if personas.is_empty() {
            return Err(CulturaError::Config("Persona catalog cannot be empty".to_string()).into());
        }

        let mut seen = HashSet::new();
        for persona in &personas {
            if persona.id.trim().is_empty() {
                return Err(
                    CulturaError::Config("Persona id cannot be empty".to_string()).into(),
                );
            }
            if !seen.insert(persona.id.as_str()) {
                return Err(CulturaError::Config(format!(
                    "Duplicate persona id in catalog: {}",
                    persona.id
                ))
                .into());
            }
        }

        let catalog = Self { personas };
        for personality in catalog.personalities() {
            if super::responses::templates(personality).is_empty() {
                return Err(CulturaError::Config(format!(
                    "No message templates for personality: {}",
                    personality
                ))
                .into());
            }
        }

        Ok(catalog)
    }

    /// Loads a catalog from a YAML file
    ///
    /// # Errors
    ///
    /// Returns `CulturaError::Config` if the file cannot be read, does not
    /// parse (including personality tags outside the closed set), or fails
    /// the checks in [`PersonaCatalog::new`].
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|e| {
            CulturaError::Config(format!(
                "Failed to read persona catalog {}: {}",
                path.display(),
                e
            ))
        })?;
        Self::from_yaml(&contents)
    }

    /// Parses a catalog from YAML text
    pub fn from_yaml(contents: &str) -> Result<Self> {
        let file: CatalogFile = serde_yaml::from_str(contents).map_err(|e| {
            CulturaError::Config(format!("Failed to parse persona catalog: {}", e))
        })?;
        let catalog = Self::new(file.personas)?;
        tracing::debug!(personas = catalog.len(), "Loaded persona catalog from YAML");
        Ok(catalog)
    }

    /// Loads from `path` when given, otherwise the built-in seed
    pub fn load(path: Option<&str>) -> Result<Self> {
        match path {
            Some(p) => Self::from_file(p),
            None => Ok(Self::builtin()),
        }
    }

    /// The built-in seed catalog
    pub fn builtin() -> Self {
        Self {
            personas: builtin_personas(),
        }
    }

    /// All personas, in catalog order
    pub fn list(&self) -> &[Persona] {
        &self.personas
    }

    /// Finds a persona by id
    pub fn get(&self, id: &str) -> Option<&Persona> {
        self.personas.iter().find(|p| p.id == id)
    }

    /// Finds a persona by id, rejecting unknown ids
    ///
    /// # Errors
    ///
    /// Returns `CulturaError::UnknownPersona` if the id is not in the catalog.
    pub fn require(&self, id: &str) -> Result<&Persona> {
        self.get(id)
            .ok_or_else(|| CulturaError::UnknownPersona(id.to_string()).into())
    }

    /// Number of personas
    pub fn len(&self) -> usize {
        self.personas.len()
    }

    /// Always false for a constructed catalog
    pub fn is_empty(&self) -> bool {
        self.personas.is_empty()
    }

    /// Distinct personalities used by this catalog
    pub fn personalities(&self) -> Vec<Personality> {
        let mut out: Vec<Personality> = Vec::new();
        for persona in &self.personas {
            if !out.contains(&persona.personality) {
                out.push(persona.personality);
            }
        }
        out
    }
}

#[allow(clippy::too_many_arguments)]
fn persona(
    id: &str,
    display_name: &str,
    avatar: &str,
    personality: Personality,
    bio: &str,
    culture: &str,
    location: &str,
    interests: &[&str],
) -> Persona {
    Persona {
        id: id.to_string(),
        display_name: display_name.to_string(),
        avatar: avatar.to_string(),
        personality,
        bio: bio.to_string(),
        culture: culture.to_string(),
        location: location.to_string(),
        interests: interests.iter().map(|s| s.to_string()).collect(),
    }
}

fn builtin_personas() -> Vec<Persona> {
    vec![
        persona(
            "amara",
            "Amara",
            "🌺",
            Personality::Romantic,
            "Sunday jollof evangelist and poetry open-mic regular.",
            "Nigerian",
            "London",
            &["poetry", "cooking", "afrobeats"],
        ),
        persona(
            "kenji",
            "Kenji",
            "🎨",
            Personality::Creative,
            "Illustrator by day, amateur potter by night.",
            "Japanese",
            "Osaka",
            &["ceramics", "anime", "jazz"],
        ),
        persona(
            "lucia",
            "Lucía",
            "💃",
            Personality::Outgoing,
            "Salsa teacher who knows every taquería in town.",
            "Mexican",
            "Guadalajara",
            &["dance", "street food", "festivals"],
        ),
        persona(
            "arjun",
            "Arjun",
            "📚",
            Personality::Intellectual,
            "History nerd, chess player, chai perfectionist.",
            "Indian",
            "Bengaluru",
            &["history", "chess", "philosophy"],
        ),
        persona(
            "freya",
            "Freya",
            "🏔️",
            Personality::Adventurous,
            "Planning my next fjord trek, looking for a co-pilot.",
            "Norwegian",
            "Bergen",
            &["hiking", "kayaking", "photography"],
        ),
        persona(
            "layla",
            "Layla",
            "🌙",
            Personality::Romantic,
            "Rooftop sunsets and old Fairuz records.",
            "Lebanese",
            "Beirut",
            &["music", "sunsets", "baking"],
        ),
        persona(
            "mateo",
            "Mateo",
            "🧭",
            Personality::Adventurous,
            "Backpacked across twelve countries and counting.",
            "Argentinian",
            "Buenos Aires",
            &["travel", "tango", "climbing"],
        ),
        persona(
            "soo-ah",
            "Soo-ah",
            "🎤",
            Personality::Outgoing,
            "Karaoke champion, hotpot enthusiast.",
            "Korean",
            "Seoul",
            &["karaoke", "k-drama", "hotpot"],
        ),
    ]
}
