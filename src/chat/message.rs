//! Chat message types
//!
//! Defines the immutable message entry held by the conversation, plus the
//! id and timestamp helpers used when new entries are created.

use chrono::{Local, NaiveTime, Timelike};

/// Who wrote a message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Author {
    User,
    Assistant,
}

/// A single chat entry. Immutable once created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    id: String,
    content: String,
    author: Author,
    timestamp: String,
    is_error: bool,
}

impl Message {
    pub fn user(id: impl Into<String>, content: impl Into<String>, timestamp: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            content: content.into(),
            author: Author::User,
            timestamp: timestamp.into(),
            is_error: false,
        }
    }

    pub fn assistant(
        id: impl Into<String>,
        content: impl Into<String>,
        timestamp: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            content: content.into(),
            author: Author::Assistant,
            timestamp: timestamp.into(),
            is_error: false,
        }
    }

    /// An assistant entry reporting a failed response generation
    pub fn assistant_error(
        id: impl Into<String>,
        content: impl Into<String>,
        timestamp: impl Into<String>,
    ) -> Self {
        Self {
            is_error: true,
            ..Self::assistant(id, content, timestamp)
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn author(&self) -> Author {
        self.author
    }

    pub fn is_authored_by_user(&self) -> bool {
        self.author == Author::User
    }

    pub fn timestamp(&self) -> &str {
        &self.timestamp
    }

    pub fn is_error(&self) -> bool {
        self.is_error
    }
}

/// Source of the current local time of day.
pub trait Clock: Send + Sync {
    fn now(&self) -> NaiveTime;
}

/// Reads the local wall clock
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> NaiveTime {
        Local::now().time()
    }
}

/// Always reports the same time. Used by tests and demos.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub NaiveTime);

impl Clock for FixedClock {
    fn now(&self) -> NaiveTime {
        self.0
    }
}

/// Format a time of day as a two-digit 12-hour clock, e.g. `03:07 PM`
pub fn format_timestamp(time: NaiveTime) -> String {
    // Drop sub-minute precision so the output only depends on hour:minute
    let time = time.with_second(0).unwrap_or(time);
    time.format("%I:%M %p").to_string()
}

/// Hands out message ids that never repeat within a session.
///
/// Ids are millisecond timestamps, bumped past the previous id whenever two
/// messages are created within the same millisecond.
#[derive(Debug, Default)]
pub struct IdGenerator {
    last: u64,
}

impl IdGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next_id(&mut self) -> String {
        let now = u64::try_from(chrono::Utc::now().timestamp_millis()).unwrap_or(0);
        self.next_after(now)
    }

    fn next_after(&mut self, candidate: u64) -> String {
        let id = candidate.max(self.last + 1);
        self.last = id;
        id.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_user_message_flags() {
        let msg = Message::user("1", "hello", "10:30 AM");
        assert!(msg.is_authored_by_user());
        assert_eq!(msg.author(), Author::User);
        assert!(!msg.is_error());
        assert_eq!(msg.content(), "hello");
        assert_eq!(msg.timestamp(), "10:30 AM");
    }

    #[test]
    fn test_assistant_error_message() {
        let msg = Message::assistant_error("2", "Error: boom", "10:31 AM");
        assert!(!msg.is_authored_by_user());
        assert!(msg.is_error());
        assert_eq!(msg.id(), "2");
    }

    #[test]
    fn test_format_timestamp_afternoon() {
        let time = NaiveTime::from_hms_opt(15, 7, 42).unwrap();
        assert_eq!(format_timestamp(time), "03:07 PM");
    }

    #[test]
    fn test_format_timestamp_midnight_and_noon() {
        assert_eq!(
            format_timestamp(NaiveTime::from_hms_opt(0, 5, 0).unwrap()),
            "12:05 AM"
        );
        assert_eq!(
            format_timestamp(NaiveTime::from_hms_opt(12, 0, 0).unwrap()),
            "12:00 PM"
        );
    }

    #[test]
    fn test_id_generator_bumps_on_same_millisecond() {
        let mut ids = IdGenerator::new();
        assert_eq!(ids.next_after(1000), "1000");
        assert_eq!(ids.next_after(1000), "1001");
        assert_eq!(ids.next_after(999), "1002");
        assert_eq!(ids.next_after(5000), "5000");
    }

    #[test]
    fn test_id_generator_unique_across_many() {
        let mut ids = IdGenerator::new();
        let seen: HashSet<String> = (0..10_000).map(|_| ids.next_id()).collect();
        assert_eq!(seen.len(), 10_000);
    }
}
