//! Conversation store
//!
//! Holds every persona thread together with focus, unread counters,
//! presence, and the engagement total. Both the scheduler and the user
//! input path mutate the store; every mutation goes through the methods
//! here so the thread invariants hold after each call.
//!
//! Mutations publish a [`StoreEvent`] on a broadcast channel so views can
//! recompute their projection.

pub mod thread;

pub use thread::{ConversationThread, EngagementCounter, Message, Sender};

use crate::error::{CulturaError, Result};
use crate::persona::{Persona, PersonaCatalog};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::broadcast;

/// Default capacity of the store event channel
pub const DEFAULT_EVENT_BUFFER: usize = 256;

/// Change notification published after each store mutation
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum StoreEvent {
    /// A dormant persona got its first thread
    ThreadActivated { persona_id: String },
    /// A message was appended
    MessageAppended {
        persona_id: String,
        from_persona: bool,
        content: String,
        unread: u32,
    },
    /// A thread became the open chat
    ThreadFocused { persona_id: String },
    /// The open chat was closed
    ThreadClosed { persona_id: String },
    /// A persona went online or offline
    PresenceChanged { persona_id: String, online: bool },
    /// A persona started or stopped typing
    Typing { persona_id: String, typing: bool },
}

/// In-memory, session-scoped conversation state
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use cultura::persona::PersonaCatalog;
/// use cultura::store::ConversationStore;
///
/// let mut store = ConversationStore::new(Arc::new(PersonaCatalog::builtin()));
/// store.append_persona_message("kenji", "Hi!").unwrap();
/// assert_eq!(store.thread("kenji").unwrap().unread_count(), 1);
///
/// store.open_thread("kenji").unwrap();
/// assert_eq!(store.thread("kenji").unwrap().unread_count(), 0);
/// assert_eq!(store.engagement(), 1);
/// ```
#[derive(Debug)]
pub struct ConversationStore {
    catalog: Arc<PersonaCatalog>,
    threads: HashMap<String, ConversationThread>,
    focused: Option<String>,
    engagement: EngagementCounter,
    activity_seq: u64,
    events: broadcast::Sender<StoreEvent>,
}

impl ConversationStore {
    /// Creates an empty store over a catalog
    pub fn new(catalog: Arc<PersonaCatalog>) -> Self {
        Self::with_event_buffer(catalog, DEFAULT_EVENT_BUFFER)
    }

    /// Creates an empty store with a custom event channel capacity
    pub fn with_event_buffer(catalog: Arc<PersonaCatalog>, event_buffer: usize) -> Self {
        let (events, _) = broadcast::channel(event_buffer.max(1));
        Self {
            catalog,
            threads: HashMap::new(),
            focused: None,
            engagement: EngagementCounter::default(),
            activity_seq: 0,
            events,
        }
    }

    /// Subscribes to store change notifications
    pub fn subscribe(&self) -> broadcast::Receiver<StoreEvent> {
        self.events.subscribe()
    }

    /// The catalog backing this store
    pub fn catalog(&self) -> &Arc<PersonaCatalog> {
        &self.catalog
    }

    /// Marks a persona active, creating its thread on first activation
    ///
    /// Returns `true` when the thread was newly created. An existing
    /// offline persona comes back online.
    ///
    /// # Errors
    ///
    /// Returns `CulturaError::UnknownPersona` if the id is not in the catalog.
    pub fn activate(&mut self, persona_id: &str) -> Result<bool> {
        let created = self.ensure_thread(persona_id)?;
        if !created {
            self.set_online(persona_id, true)?;
        }
        Ok(created)
    }

    /// Opens a persona's thread
    ///
    /// Focus is exclusive: every other thread loses focus. The opened
    /// thread's unread counter resets to zero. Opening an already open
    /// thread changes nothing.
    ///
    /// # Errors
    ///
    /// Returns `CulturaError::UnknownPersona` if the id is not in the catalog.
    pub fn open_thread(&mut self, persona_id: &str) -> Result<()> {
        self.ensure_thread(persona_id)?;

        let already_open = self.focused.as_deref() == Some(persona_id)
            && self
                .threads
                .get(persona_id)
                .is_some_and(|t| t.is_focused() && t.unread_count() == 0);
        if already_open {
            return Ok(());
        }

        for (id, thread) in self.threads.iter_mut() {
            thread.set_focused(id == persona_id);
        }
        self.focused = Some(persona_id.to_string());

        tracing::debug!(persona_id, "Thread focused");
        self.publish(StoreEvent::ThreadFocused {
            persona_id: persona_id.to_string(),
        });
        Ok(())
    }

    /// Closes the open thread, if any
    ///
    /// Returns the id of the thread that was open.
    pub fn close_thread(&mut self) -> Option<String> {
        let closed = self.focused.take()?;
        if let Some(thread) = self.threads.get_mut(&closed) {
            thread.set_focused(false);
        }
        tracing::debug!(persona_id = %closed, "Thread closed");
        self.publish(StoreEvent::ThreadClosed {
            persona_id: closed.clone(),
        });
        Some(closed)
    }

    /// Appends a user-authored message
    ///
    /// The text is trimmed before storing. User messages never bump unread
    /// counters and are not counted as engagement.
    ///
    /// # Errors
    ///
    /// Returns `CulturaError::UnknownPersona` for an id outside the catalog
    /// and `CulturaError::EmptyMessage` for empty or whitespace-only text.
    pub fn append_user_message(&mut self, persona_id: &str, text: &str) -> Result<&Message> {
        self.catalog.require(persona_id)?;
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Err(CulturaError::EmptyMessage.into());
        }

        self.ensure_thread(persona_id)?;
        let activity = self.next_activity();
        let thread = self.thread_mut(persona_id)?;
        thread.push(Message::from_user(trimmed), activity);
        let unread = thread.unread_count();

        self.publish(StoreEvent::MessageAppended {
            persona_id: persona_id.to_string(),
            from_persona: false,
            content: trimmed.to_string(),
            unread,
        });

        self.latest_message(persona_id)
    }

    /// Appends a persona-authored message
    ///
    /// Unread grows by one unless the thread is focused, and the engagement
    /// counter grows by exactly one.
    ///
    /// # Errors
    ///
    /// Returns `CulturaError::UnknownPersona` if the id is not in the catalog.
    pub fn append_persona_message(&mut self, persona_id: &str, content: &str) -> Result<&Message> {
        self.ensure_thread(persona_id)?;
        let activity = self.next_activity();
        let thread = self.thread_mut(persona_id)?;
        thread.push(Message::from_persona(persona_id, content), activity);
        thread.bump_unread();
        let unread = thread.unread_count();
        self.engagement.increment();

        tracing::debug!(
            persona_id,
            unread,
            engagement = self.engagement.value(),
            "Persona message appended"
        );
        self.publish(StoreEvent::MessageAppended {
            persona_id: persona_id.to_string(),
            from_persona: true,
            content: content.to_string(),
            unread,
        });

        self.latest_message(persona_id)
    }

    /// Sets a persona's presence flag
    ///
    /// Does nothing for a persona without a thread.
    pub fn set_online(&mut self, persona_id: &str, online: bool) -> Result<()> {
        self.catalog.require(persona_id)?;
        let changed = match self.threads.get_mut(persona_id) {
            Some(thread) => thread.set_online(online),
            None => false,
        };
        if changed {
            self.publish(StoreEvent::PresenceChanged {
                persona_id: persona_id.to_string(),
                online,
            });
        }
        Ok(())
    }

    /// Records a scheduled reply; the persona shows as typing until every
    /// pending reply has landed
    ///
    /// `Typing { typing: true }` is published only on the first pending reply.
    pub fn reply_pending(&mut self, persona_id: &str) -> Result<()> {
        self.catalog.require(persona_id)?;
        let started = match self.threads.get_mut(persona_id) {
            Some(thread) => thread.begin_reply(),
            None => false,
        };
        if started {
            self.publish(StoreEvent::Typing {
                persona_id: persona_id.to_string(),
                typing: true,
            });
        }
        Ok(())
    }

    /// Records a delivered reply
    ///
    /// `Typing { typing: false }` is published once no reply is pending.
    pub fn reply_delivered(&mut self, persona_id: &str) -> Result<()> {
        self.catalog.require(persona_id)?;
        let stopped = match self.threads.get_mut(persona_id) {
            Some(thread) => thread.finish_reply(),
            None => false,
        };
        if stopped {
            self.publish(StoreEvent::Typing {
                persona_id: persona_id.to_string(),
                typing: false,
            });
        }
        Ok(())
    }

    /// Thread for a persona, if it has been activated
    pub fn thread(&self, persona_id: &str) -> Option<&ConversationThread> {
        self.threads.get(persona_id)
    }

    /// All threads, in no particular order
    pub fn threads(&self) -> impl Iterator<Item = &ConversationThread> {
        self.threads.values()
    }

    /// Number of activated personas
    pub fn thread_count(&self) -> usize {
        self.threads.len()
    }

    /// Id of the open thread
    pub fn focused(&self) -> Option<&str> {
        self.focused.as_deref()
    }

    /// Running total of simulated messages
    pub fn engagement(&self) -> u64 {
        self.engagement.value()
    }

    /// Unread messages across all threads
    pub fn total_unread(&self) -> u64 {
        self.threads.values().map(|t| u64::from(t.unread_count())).sum()
    }

    /// Personas that have never been activated, in catalog order
    pub fn dormant_personas(&self) -> Vec<&Persona> {
        self.catalog
            .list()
            .iter()
            .filter(|p| !self.threads.contains_key(&p.id))
            .collect()
    }

    fn ensure_thread(&mut self, persona_id: &str) -> Result<bool> {
        self.catalog.require(persona_id)?;
        if self.threads.contains_key(persona_id) {
            return Ok(false);
        }

        let activity = self.next_activity();
        self.threads.insert(
            persona_id.to_string(),
            ConversationThread::new(persona_id, activity),
        );
        tracing::debug!(persona_id, "Persona activated");
        self.publish(StoreEvent::ThreadActivated {
            persona_id: persona_id.to_string(),
        });
        Ok(true)
    }

    fn thread_mut(&mut self, persona_id: &str) -> Result<&mut ConversationThread> {
        self.threads
            .get_mut(persona_id)
            .ok_or_else(|| CulturaError::UnknownPersona(persona_id.to_string()).into())
    }

    fn latest_message(&self, persona_id: &str) -> Result<&Message> {
        self.threads
            .get(persona_id)
            .and_then(|t| t.messages().last())
            .ok_or_else(|| CulturaError::UnknownPersona(persona_id.to_string()).into())
    }

    fn next_activity(&mut self) -> u64 {
        self.activity_seq += 1;
        self.activity_seq
    }

    /// Marks a thread as recently active without appending a message
    pub(crate) fn touch(&mut self, persona_id: &str) {
        let activity = self.next_activity();
        if let Some(thread) = self.threads.get_mut(persona_id) {
            thread.touch(activity);
        }
    }

    fn publish(&self, event: StoreEvent) {
        // no subscribers is fine
        let _ = self.events.send(event);
    }
}
