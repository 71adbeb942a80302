//! Synchronous core of the engagement simulator
//!
//! The engine owns the conversation store and the RNG. Every step here is a
//! single, atomic mutation; the timer plumbing lives in the parent module.

use super::metrics::{self, MessageSource};
use crate::config::SimulatorConfig;
use crate::error::{CulturaError, Result};
use crate::persona::{PersonaCatalog, ResponseSelector};
use crate::store::ConversationStore;
use rand::rngs::StdRng;
use rand::seq::IndexedRandom;
use rand::{Rng, SeedableRng};
use serde::Serialize;
use std::ops::RangeInclusive;
use std::sync::Arc;
use std::time::Duration;

/// What a single scheduler tick did
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TickReport {
    /// 1-based tick number
    pub tick: u64,
    /// Persona drawn this tick
    pub persona_id: String,
    /// The persona had no thread before this tick
    pub newly_activated: bool,
    /// Message emitted, if the activation roll succeeded
    pub message: Option<String>,
    /// Persona sent offline by presence churn
    pub went_offline: Option<String>,
}

/// Store, RNG and tuning in one place
#[derive(Debug)]
pub struct Engine {
    store: ConversationStore,
    rng: StdRng,
    selector: ResponseSelector,
    activation_probability: f64,
    presence_churn_probability: f64,
    reply_delay_ms: RangeInclusive<u64>,
    ticks: u64,
}

/// Clamps into [0, 1]; NaN and infinities disable the roll
fn probability(p: f64) -> f64 {
    if p.is_finite() {
        p.clamp(0.0, 1.0)
    } else {
        0.0
    }
}

impl Engine {
    /// Creates an engine over a catalog
    ///
    /// A configured seed makes every draw reproducible; otherwise the RNG
    /// is seeded from the OS.
    pub fn new(catalog: Arc<PersonaCatalog>, config: &SimulatorConfig) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };

        Self {
            store: ConversationStore::with_event_buffer(catalog, config.event_buffer),
            rng,
            selector: ResponseSelector::new(config.avoid_immediate_repeat),
            activation_probability: probability(config.activation_probability),
            presence_churn_probability: probability(config.presence_churn_probability),
            reply_delay_ms: config.reply_delay_min_ms
                ..=config.reply_delay_max_ms.max(config.reply_delay_min_ms),
            ticks: 0,
        }
    }

    /// Read access to the store
    pub fn store(&self) -> &ConversationStore {
        &self.store
    }

    /// Write access to the store, for user-driven operations
    pub fn store_mut(&mut self) -> &mut ConversationStore {
        &mut self.store
    }

    /// Ticks run so far
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Runs one scheduler step
    ///
    /// 1. Draw a persona uniformly, with replacement across ticks.
    /// 2. Activate it (creates the thread on first draw).
    /// 3. With the activation probability, append a personality-matched
    ///    message, which bumps unread (unless focused) and engagement.
    /// 4. With the churn probability, send one other idle persona offline.
    ///
    /// # Errors
    ///
    /// Returns `CulturaError::Config` if the catalog is empty.
    pub fn tick(&mut self) -> Result<TickReport> {
        self.ticks += 1;
        metrics::record_tick();

        let catalog = Arc::clone(self.store.catalog());
        let persona = catalog.list().choose(&mut self.rng).ok_or_else(|| {
            CulturaError::Config("Cannot tick with an empty persona catalog".to_string())
        })?;

        let newly_activated = self.store.activate(&persona.id)?;
        if !newly_activated {
            self.store.touch(&persona.id);
        }

        let message = if self.rng.random_bool(self.activation_probability) {
            let previous = self
                .store
                .thread(&persona.id)
                .and_then(|t| t.last_persona_message())
                .map(str::to_string);
            let content =
                self.selector
                    .select_after(persona.personality, previous.as_deref(), &mut self.rng);
            self.store.append_persona_message(&persona.id, &content)?;
            metrics::record_message(persona.personality, MessageSource::Scheduler);
            Some(content)
        } else {
            None
        };

        let went_offline = self.churn_presence(&persona.id)?;

        tracing::debug!(
            tick = self.ticks,
            persona_id = %persona.id,
            newly_activated,
            emitted = message.is_some(),
            "Scheduler tick"
        );

        Ok(TickReport {
            tick: self.ticks,
            persona_id: persona.id.clone(),
            newly_activated,
            message,
            went_offline,
        })
    }

    fn churn_presence(&mut self, current: &str) -> Result<Option<String>> {
        if !self.rng.random_bool(self.presence_churn_probability) {
            return Ok(None);
        }

        // sorted so a seeded run does not depend on HashMap order
        let mut candidates: Vec<String> = self
            .store
            .threads()
            .filter(|t| {
                t.is_online() && !t.is_focused() && !t.is_typing() && t.persona_id() != current
            })
            .map(|t| t.persona_id().to_string())
            .collect();
        candidates.sort();

        let Some(chosen) = candidates.choose(&mut self.rng).cloned() else {
            return Ok(None);
        };
        self.store.set_online(&chosen, false)?;
        metrics::record_offline();
        Ok(Some(chosen))
    }

    /// Records a user message and marks the persona as typing
    ///
    /// # Errors
    ///
    /// Returns `CulturaError::UnknownPersona` or `CulturaError::EmptyMessage`.
    pub fn accept_user_message(&mut self, persona_id: &str, text: &str) -> Result<()> {
        self.store.append_user_message(persona_id, text)?;
        self.store.reply_pending(persona_id)?;
        Ok(())
    }

    /// Draws the simulated typing delay for a reply
    pub fn reply_delay(&mut self) -> Duration {
        Duration::from_millis(self.rng.random_range(self.reply_delay_ms.clone()))
    }

    /// Appends the persona's reply; typing stops once no reply is pending
    ///
    /// Goes through the same unread and engagement rules as a scheduler
    /// message.
    ///
    /// # Errors
    ///
    /// Returns `CulturaError::UnknownPersona` if the id is not in the catalog.
    pub fn deliver_reply(&mut self, persona_id: &str) -> Result<String> {
        let catalog = Arc::clone(self.store.catalog());
        let persona = catalog.require(persona_id)?;

        let previous = self
            .store
            .thread(persona_id)
            .and_then(|t| t.last_persona_message())
            .map(str::to_string);
        let content = self
            .selector
            .select_after(persona.personality, previous.as_deref(), &mut self.rng);

        self.store.reply_delivered(persona_id)?;
        self.store.append_persona_message(persona_id, &content)?;
        metrics::record_message(persona.personality, MessageSource::Reply);

        tracing::debug!(persona_id, "Persona replied");
        Ok(content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persona::responses::templates;
    use crate::persona::{Persona, Personality};
    use crate::store::Sender;
    use std::collections::HashMap;

    fn catalog() -> Arc<PersonaCatalog> {
        let personas = Personality::ALL
            .iter()
            .enumerate()
            .map(|(i, p)| Persona {
                id: format!("p{}", i),
                display_name: format!("Persona {}", i),
                avatar: "*".to_string(),
                personality: *p,
                bio: String::new(),
                culture: String::new(),
                location: String::new(),
                interests: Vec::new(),
            })
            .collect();
        Arc::new(PersonaCatalog::new(personas).unwrap())
    }

    fn config(activation: f64, churn: f64, seed: u64) -> SimulatorConfig {
        SimulatorConfig {
            activation_probability: activation,
            presence_churn_probability: churn,
            seed: Some(seed),
            ..SimulatorConfig::default()
        }
    }

    #[test]
    fn test_ten_ticks_always_activating() {
        let mut engine = Engine::new(catalog(), &config(1.0, 0.0, 11));
        let mut last_by_persona: HashMap<String, String> = HashMap::new();

        for _ in 0..10 {
            let report = engine.tick().unwrap();
            let message = report.message.expect("activation probability is 1.0");
            last_by_persona.insert(report.persona_id, message);
        }

        assert_eq!(engine.ticks(), 10);
        assert_eq!(engine.store().engagement(), 10);
        let appended: usize = engine.store().threads().map(|t| t.messages().len()).sum();
        assert_eq!(appended, 10);
        assert_eq!(engine.store().thread_count(), last_by_persona.len());

        for (persona_id, last) in &last_by_persona {
            let thread = engine.store().thread(persona_id).unwrap();
            assert_eq!(thread.last_message(), Some(last.as_str()));
            assert!(!thread.messages().is_empty());
        }
    }

    #[test]
    fn test_zero_activation_only_marks_visible() {
        let mut engine = Engine::new(catalog(), &config(0.0, 0.0, 5));
        for _ in 0..8 {
            let report = engine.tick().unwrap();
            assert!(report.message.is_none());
        }
        assert_eq!(engine.store().engagement(), 0);
        assert!(engine.store().thread_count() >= 1);
        assert!(engine.store().threads().all(|t| t.messages().is_empty()));
    }

    #[test]
    fn test_messages_match_personality() {
        let mut engine = Engine::new(catalog(), &config(1.0, 0.0, 3));
        for _ in 0..30 {
            engine.tick().unwrap();
        }
        let catalog = Arc::clone(engine.store().catalog());
        for thread in engine.store().threads() {
            let persona = catalog.get(thread.persona_id()).unwrap();
            for message in thread.messages() {
                assert_eq!(message.sender, Sender::Persona(persona.id.clone()));
                assert!(templates(persona.personality).contains(&message.content.as_str()));
            }
        }
    }

    #[test]
    fn test_seeded_runs_are_reproducible() {
        let mut a = Engine::new(catalog(), &config(0.5, 0.3, 99));
        let mut b = Engine::new(catalog(), &config(0.5, 0.3, 99));
        for _ in 0..25 {
            let left = a.tick().unwrap();
            let right = b.tick().unwrap();
            assert_eq!(left, right);
        }
    }

    #[test]
    fn test_focused_thread_stays_read_during_ticks() {
        let mut engine = Engine::new(catalog(), &config(1.0, 0.0, 21));
        engine.store_mut().open_thread("p0").unwrap();
        for _ in 0..40 {
            engine.tick().unwrap();
            let thread = engine.store().thread("p0").unwrap();
            assert!(thread.is_focused());
            assert_eq!(thread.unread_count(), 0);
        }
        let others: u64 = engine
            .store()
            .threads()
            .filter(|t| t.persona_id() != "p0")
            .map(|t| u64::from(t.unread_count()))
            .sum();
        let p0_messages = engine.store().thread("p0").unwrap().messages().len() as u64;
        assert_eq!(others + p0_messages, 40);
    }

    #[test]
    fn test_presence_churn_never_hits_focused() {
        let mut engine = Engine::new(catalog(), &config(0.0, 1.0, 8));
        engine.store_mut().open_thread("p2").unwrap();
        for _ in 0..50 {
            let report = engine.tick().unwrap();
            if let Some(offline) = report.went_offline {
                assert_ne!(offline, "p2");
                assert_ne!(offline, report.persona_id);
            }
        }
        assert!(engine.store().thread("p2").unwrap().is_online());
    }

    #[test]
    fn test_reply_flow() {
        let mut engine = Engine::new(catalog(), &config(0.0, 0.0, 4));
        engine.accept_user_message("p4", "Hello").unwrap();
        assert!(engine.store().thread("p4").unwrap().is_typing());

        let reply = engine.deliver_reply("p4").unwrap();
        let thread = engine.store().thread("p4").unwrap();
        assert!(!thread.is_typing());
        assert_eq!(thread.messages().len(), 2);
        assert_eq!(thread.last_message(), Some(reply.as_str()));
        assert!(templates(Personality::Romantic).contains(&reply.as_str()));
        assert_eq!(thread.unread_count(), 1);
        assert_eq!(engine.store().engagement(), 1);
    }

    #[test]
    fn test_reply_delay_within_bounds() {
        let mut engine = Engine::new(catalog(), &config(0.0, 0.0, 4));
        for _ in 0..100 {
            let delay = engine.reply_delay();
            assert!(delay >= Duration::from_millis(2_000));
            assert!(delay <= Duration::from_millis(5_000));
        }
    }

    #[test]
    fn test_user_message_rejections() {
        let mut engine = Engine::new(catalog(), &config(0.0, 0.0, 4));
        assert!(engine.accept_user_message("p1", "  ").is_err());
        assert!(engine.accept_user_message("ghost", "hi").is_err());
        assert!(engine.deliver_reply("ghost").is_err());
        assert_eq!(engine.store().thread_count(), 0);
    }

    #[test]
    fn test_non_finite_probabilities_disable_the_roll() {
        for bad in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
            let mut engine = Engine::new(catalog(), &config(bad, bad, 11));
            engine.store_mut().activate("p0").unwrap();
            engine.store_mut().activate("p1").unwrap();
            for _ in 0..20 {
                let report = engine.tick().unwrap();
                assert!(report.message.is_none());
                assert!(report.went_offline.is_none());
            }
            assert_eq!(engine.store().engagement(), 0);
        }
    }

    #[test]
    fn test_out_of_range_probabilities_are_clamped() {
        let mut engine = Engine::new(catalog(), &config(7.5, -1.0, 12));
        for _ in 0..10 {
            let report = engine.tick().unwrap();
            assert!(report.message.is_some());
            assert!(report.went_offline.is_none());
        }
        assert_eq!(engine.store().engagement(), 10);
    }
}
