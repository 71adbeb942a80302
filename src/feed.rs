//! Feed and presence projection
//!
//! Read-only views derived from the catalog and the conversation store.
//! Nothing here is cached; callers recompute a snapshot whenever the store
//! publishes a change.

use crate::persona::Persona;
use crate::store::ConversationStore;
use serde::Serialize;

/// An activated persona as shown in the "active now" strip
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActivePersona {
    /// The persona
    pub persona: Persona,
    /// Presence flag
    pub online: bool,
    /// A reply is pending
    pub typing: bool,
    /// Open chat
    pub focused: bool,
    /// Unread persona messages
    pub unread: u32,
    /// Newest message in the thread
    pub last_message: Option<String>,
}

/// Unread badge for one thread
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UnreadBadge {
    /// Thread owner
    pub persona_id: String,
    /// Unread messages, always greater than zero
    pub count: u32,
}

/// Everything a view needs to render the feed
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FeedSnapshot {
    /// Activated personas, most recent activity first
    pub active: Vec<ActivePersona>,
    /// Threads with unread messages, in the same order as `active`
    pub unread: Vec<UnreadBadge>,
    /// Never-activated personas, in catalog order
    pub discovery: Vec<Persona>,
    /// Running total of simulated messages
    pub engagement: u64,
    /// Sum of all unread badges
    pub total_unread: u64,
}

impl FeedSnapshot {
    /// Derives a snapshot from the store
    ///
    /// # Examples
    ///
    /// ```
    /// use std::sync::Arc;
    /// use cultura::feed::FeedSnapshot;
    /// use cultura::persona::PersonaCatalog;
    /// use cultura::store::ConversationStore;
    ///
    /// let mut store = ConversationStore::new(Arc::new(PersonaCatalog::builtin()));
    /// store.append_persona_message("arjun", "Read anything good?").unwrap();
    ///
    /// let feed = FeedSnapshot::project(&store);
    /// assert_eq!(feed.active[0].persona.id, "arjun");
    /// assert_eq!(feed.total_unread, 1);
    /// ```
    pub fn project(store: &ConversationStore) -> Self {
        let catalog = store.catalog();

        let mut threads: Vec<_> = store.threads().collect();
        threads.sort_by(|a, b| b.last_activity().cmp(&a.last_activity()));

        let active: Vec<ActivePersona> = threads
            .iter()
            .filter_map(|thread| {
                let persona = catalog.get(thread.persona_id())?;
                Some(ActivePersona {
                    persona: persona.clone(),
                    online: thread.is_online(),
                    typing: thread.is_typing(),
                    focused: thread.is_focused(),
                    unread: thread.unread_count(),
                    last_message: thread.last_message().map(str::to_string),
                })
            })
            .collect();

        let unread: Vec<UnreadBadge> = active
            .iter()
            .filter(|a| a.unread > 0)
            .map(|a| UnreadBadge {
                persona_id: a.persona.id.clone(),
                count: a.unread,
            })
            .collect();

        let total_unread = unread.iter().map(|b| u64::from(b.count)).sum();

        Self {
            active,
            unread,
            discovery: store.dormant_personas().into_iter().cloned().collect(),
            engagement: store.engagement(),
            total_unread,
        }
    }

    /// Personas currently online, most recent first
    pub fn online(&self) -> impl Iterator<Item = &ActivePersona> {
        self.active.iter().filter(|a| a.online)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persona::PersonaCatalog;
    use std::sync::Arc;

    fn store() -> ConversationStore {
        ConversationStore::new(Arc::new(PersonaCatalog::builtin()))
    }

    #[test]
    fn test_empty_store_projection() {
        let store = store();
        let feed = FeedSnapshot::project(&store);
        assert!(feed.active.is_empty());
        assert!(feed.unread.is_empty());
        assert_eq!(feed.discovery.len(), store.catalog().len());
        assert_eq!(feed.engagement, 0);
        assert_eq!(feed.total_unread, 0);
    }

    #[test]
    fn test_active_ordered_by_recent_activity() {
        let mut store = store();
        store.append_persona_message("kenji", "one").unwrap();
        store.append_persona_message("lucia", "two").unwrap();
        store.activate("freya").unwrap();
        store.append_persona_message("kenji", "three").unwrap();

        let feed = FeedSnapshot::project(&store);
        let order: Vec<&str> = feed.active.iter().map(|a| a.persona.id.as_str()).collect();
        assert_eq!(order, vec!["kenji", "freya", "lucia"]);
        assert_eq!(feed.active[0].last_message.as_deref(), Some("three"));
    }

    #[test]
    fn test_active_iff_activated() {
        let mut store = store();
        store.activate("arjun").unwrap();
        store.open_thread("layla").unwrap();

        let feed = FeedSnapshot::project(&store);
        let mut active: Vec<&str> = feed.active.iter().map(|a| a.persona.id.as_str()).collect();
        active.sort();
        assert_eq!(active, vec!["arjun", "layla"]);
        assert!(feed
            .discovery
            .iter()
            .all(|p| p.id != "arjun" && p.id != "layla"));
        assert_eq!(feed.active.len() + feed.discovery.len(), store.catalog().len());
    }

    #[test]
    fn test_unread_badges_and_totals() {
        let mut store = store();
        store.open_thread("amara").unwrap();
        store.append_persona_message("amara", "hi").unwrap();
        store.append_persona_message("mateo", "hola").unwrap();
        store.append_persona_message("mateo", "¿qué tal?").unwrap();

        let feed = FeedSnapshot::project(&store);
        assert_eq!(
            feed.unread,
            vec![UnreadBadge {
                persona_id: "mateo".to_string(),
                count: 2
            }]
        );
        assert_eq!(feed.total_unread, 2);
        assert_eq!(feed.engagement, 3);
        let amara = feed.active.iter().find(|a| a.persona.id == "amara").unwrap();
        assert!(amara.focused);
        assert_eq!(amara.unread, 0);
    }

    #[test]
    fn test_projection_reflects_later_changes() {
        let mut store = store();
        store.append_persona_message("kenji", "one").unwrap();
        let before = FeedSnapshot::project(&store);
        store.open_thread("kenji").unwrap();
        let after = FeedSnapshot::project(&store);
        assert_eq!(before.total_unread, 1);
        assert_eq!(after.total_unread, 0);
        assert_ne!(before, after);
    }

    #[test]
    fn test_online_filter() {
        let mut store = store();
        store.activate("kenji").unwrap();
        store.activate("freya").unwrap();
        store.set_online("kenji", false).unwrap();
        let feed = FeedSnapshot::project(&store);
        let online: Vec<&str> = feed.online().map(|a| a.persona.id.as_str()).collect();
        assert_eq!(online, vec!["freya"]);
    }
}
