//! Conversation threads and messages

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Author of a message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "persona_id", rename_all = "snake_case")]
pub enum Sender {
    /// A simulated persona
    Persona(String),
    /// The human using the app
    User,
}

impl Sender {
    /// True if the message was written by a persona
    pub fn is_persona(&self) -> bool {
        matches!(self, Self::Persona(_))
    }
}

/// A single chat message
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    /// Unique message id
    pub id: Uuid,
    /// Who wrote it
    pub sender: Sender,
    /// Message text
    pub content: String,
    /// When it was appended
    pub timestamp: DateTime<Utc>,
}

impl Message {
    /// Creates a persona-authored message stamped now
    pub fn from_persona(persona_id: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            sender: Sender::Persona(persona_id.into()),
            content: content.into(),
            timestamp: Utc::now(),
        }
    }

    /// Creates a user-authored message stamped now
    pub fn from_user(content: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            sender: Sender::User,
            content: content.into(),
            timestamp: Utc::now(),
        }
    }
}

/// Conversation state for one persona
///
/// Threads are created lazily and live until the store is dropped.
/// The store keeps two invariants on every mutation: a focused thread has
/// no unread messages, and `last_message` is the content of the newest
/// message.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationThread {
    persona_id: String,
    messages: Vec<Message>,
    last_message: Option<String>,
    unread_count: u32,
    is_focused: bool,
    online: bool,
    /// Replies scheduled but not yet delivered
    pending_replies: u32,
    /// Store-wide sequence number of the latest activity on this thread
    last_activity: u64,
}

impl ConversationThread {
    pub(crate) fn new(persona_id: impl Into<String>, activity: u64) -> Self {
        Self {
            persona_id: persona_id.into(),
            messages: Vec::new(),
            last_message: None,
            unread_count: 0,
            is_focused: false,
            online: true,
            pending_replies: 0,
            last_activity: activity,
        }
    }

    pub(crate) fn push(&mut self, message: Message, activity: u64) {
        self.last_message = Some(message.content.clone());
        self.messages.push(message);
        self.last_activity = activity;
    }

    pub(crate) fn set_focused(&mut self, focused: bool) {
        self.is_focused = focused;
        if focused {
            self.unread_count = 0;
        }
    }

    pub(crate) fn bump_unread(&mut self) {
        if !self.is_focused {
            self.unread_count += 1;
        }
    }

    pub(crate) fn set_online(&mut self, online: bool) -> bool {
        let changed = self.online != online;
        self.online = online;
        changed
    }

    /// Returns true when the thread starts typing
    pub(crate) fn begin_reply(&mut self) -> bool {
        self.pending_replies += 1;
        self.pending_replies == 1
    }

    /// Returns true when the last pending reply lands
    pub(crate) fn finish_reply(&mut self) -> bool {
        if self.pending_replies == 0 {
            return false;
        }
        self.pending_replies -= 1;
        self.pending_replies == 0
    }

    pub(crate) fn touch(&mut self, activity: u64) {
        self.last_activity = activity;
    }

    /// Persona that owns this thread
    pub fn persona_id(&self) -> &str {
        &self.persona_id
    }

    /// Messages in append order
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// Content of the newest message
    pub fn last_message(&self) -> Option<&str> {
        self.last_message.as_deref()
    }

    /// The newest message written by the persona
    pub fn last_persona_message(&self) -> Option<&str> {
        self.messages
            .iter()
            .rev()
            .find(|m| m.sender.is_persona())
            .map(|m| m.content.as_str())
    }

    /// Unread persona messages
    pub fn unread_count(&self) -> u32 {
        self.unread_count
    }

    /// True while this is the open chat
    pub fn is_focused(&self) -> bool {
        self.is_focused
    }

    /// Presence flag
    pub fn is_online(&self) -> bool {
        self.online
    }

    /// True while at least one reply is pending
    pub fn is_typing(&self) -> bool {
        self.pending_replies > 0
    }

    /// Replies scheduled but not yet delivered
    pub fn pending_replies(&self) -> u32 {
        self.pending_replies
    }

    /// Sequence number of the latest activity, higher is more recent
    pub fn last_activity(&self) -> u64 {
        self.last_activity
    }
}

/// Running total of simulated messages
///
/// Only ever increases.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngagementCounter(u64);

impl EngagementCounter {
    /// Adds one interaction
    pub fn increment(&mut self) {
        self.0 = self.0.saturating_add(1);
    }

    /// Current total
    pub fn value(&self) -> u64 {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_updates_last_message() {
        let mut thread = ConversationThread::new("kenji", 1);
        thread.push(Message::from_persona("kenji", "first"), 2);
        thread.push(Message::from_user("second"), 3);
        assert_eq!(thread.last_message(), Some("second"));
        assert_eq!(thread.last_persona_message(), Some("first"));
        assert_eq!(thread.last_activity(), 3);
    }

    #[test]
    fn test_focused_thread_does_not_accumulate_unread() {
        let mut thread = ConversationThread::new("kenji", 1);
        thread.bump_unread();
        thread.bump_unread();
        assert_eq!(thread.unread_count(), 2);
        thread.set_focused(true);
        assert_eq!(thread.unread_count(), 0);
        thread.bump_unread();
        assert_eq!(thread.unread_count(), 0);
    }

    #[test]
    fn test_presence_change_reporting() {
        let mut thread = ConversationThread::new("kenji", 1);
        assert!(thread.is_online());
        assert!(!thread.set_online(true));
        assert!(thread.set_online(false));
        assert!(!thread.is_online());
    }

    #[test]
    fn test_engagement_counter() {
        let mut counter = EngagementCounter::default();
        assert_eq!(counter.value(), 0);
        counter.increment();
        counter.increment();
        assert_eq!(counter.value(), 2);
    }

    #[test]
    fn test_sender_serialization() {
        let json = serde_json::to_string(&Sender::Persona("amara".to_string())).unwrap();
        assert_eq!(json, r#"{"kind":"persona","persona_id":"amara"}"#);
        let json = serde_json::to_string(&Sender::User).unwrap();
        assert_eq!(json, r#"{"kind":"user"}"#);
    }
}
