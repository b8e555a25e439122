//! Interaction events recorded by page objects.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// One tracked interaction
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InteractionEvent {
    /// When the event was recorded
    #[serde(rename = "_timestamp")]
    pub timestamp: DateTime<Utc>,
    /// Description, e.g. `clicked element 'Sweets'`
    pub event: String,
    /// Page the event happened on
    #[serde(rename = "on page")]
    pub page: String,
}

/// Append-only event history of one page object
///
/// Timestamps are strictly increasing: two events recorded within the same
/// clock tick are separated by one microsecond.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventLog {
    events: Vec<InteractionEvent>,
}

impl EventLog {
    /// Create an empty log
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an event and return it
    pub fn record(
        &mut self,
        event: impl Into<String>,
        page: impl Into<String>,
    ) -> &InteractionEvent {
        let mut timestamp = Utc::now();
        if let Some(last) = self.events.last() {
            if timestamp <= last.timestamp {
                timestamp = last.timestamp + Duration::microseconds(1);
            }
        }
        self.events.push(InteractionEvent {
            timestamp,
            event: event.into(),
            page: page.into(),
        });
        &self.events[self.events.len() - 1]
    }

    /// All events, oldest first
    #[must_use]
    pub fn events(&self) -> &[InteractionEvent] {
        &self.events
    }

    /// Most recent event
    #[must_use]
    pub fn last(&self) -> Option<&InteractionEvent> {
        self.events.last()
    }

    /// Number of events
    #[must_use]
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Check if nothing was recorded
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_appends_in_order() {
        let mut log = EventLog::new();
        let _ = log.record("clicked element 'Sweets'", "sweetshop home page");
        let _ = log.record("clicked element 'About'", "sweetshop sweets page");
        assert_eq!(log.len(), 2);
        assert_eq!(log.events()[0].event, "clicked element 'Sweets'");
        assert_eq!(log.last().unwrap().page, "sweetshop sweets page");
    }

    #[test]
    fn test_timestamps_strictly_increase() {
        let mut log = EventLog::new();
        for i in 0..100 {
            let _ = log.record(format!("event {i}"), "page");
        }
        for pair in log.events().windows(2) {
            assert!(pair[0].timestamp < pair[1].timestamp);
        }
    }

    #[test]
    fn test_serialized_keys() {
        let mut log = EventLog::new();
        let event = log.record("loaded", "home").clone();
        let json = serde_json::to_value(&event).unwrap();
        assert!(json.get("_timestamp").is_some());
        assert_eq!(json["event"], "loaded");
        assert_eq!(json["on page"], "home");
    }
}
