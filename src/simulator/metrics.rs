//! Counters for simulated activity
//!
//! Emitted through the `metrics` facade; they are no-ops until the host
//! installs a recorder.
//!
//! - `cultura_ticks_total`: scheduler ticks
//! - `cultura_messages_emitted_total`: persona messages, labeled by
//!   `personality` and `source` (`scheduler` or `reply`)
//! - `cultura_presence_offline_total`: personas sent offline by churn

use crate::persona::Personality;
use metrics::increment_counter;

/// Where a simulated message came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageSource {
    /// Unprompted, from a scheduler tick
    Scheduler,
    /// Answer to a user message
    Reply,
}

impl MessageSource {
    /// Label value
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Scheduler => "scheduler",
            Self::Reply => "reply",
        }
    }
}

pub(crate) fn record_tick() {
    increment_counter!("cultura_ticks_total");
}

pub(crate) fn record_message(personality: Personality, source: MessageSource) {
    increment_counter!(
        "cultura_messages_emitted_total",
        "personality" => personality.as_str(),
        "source" => source.as_str()
    );
}

pub(crate) fn record_offline() {
    increment_counter!("cultura_presence_offline_total");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_source_labels() {
        assert_eq!(MessageSource::Scheduler.as_str(), "scheduler");
        assert_eq!(MessageSource::Reply.as_str(), "reply");
    }

    #[test]
    fn test_recording_without_recorder_is_noop() {
        record_tick();
        record_message(Personality::Creative, MessageSource::Reply);
        record_offline();
    }
}
