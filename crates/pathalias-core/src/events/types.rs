//! Event types for alias changes.

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::record::AliasRecord;

/// Type of alias change event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AliasEventType {
    /// A new alias record was inserted
    Inserted,
    /// An existing alias record was updated
    Updated,
    /// An alias record was deleted
    Deleted,
}

impl AliasEventType {
    /// Returns the string representation of the event type.
    pub fn as_str(&self) -> &'static str {
        match self {
            AliasEventType::Inserted => "inserted",
            AliasEventType::Updated => "updated",
            AliasEventType::Deleted => "deleted",
        }
    }
}

impl std::fmt::Display for AliasEventType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Event representing a change to an alias record.
///
/// Carries the old and new record values: inserts have no `old`, deletes
/// have no `new`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AliasEvent {
    /// Type of change (inserted, updated, deleted)
    pub event_type: AliasEventType,
    /// The record before the change (None for inserts)
    pub old: Option<AliasRecord>,
    /// The record after the change (None for deletes)
    pub new: Option<AliasRecord>,
    /// Timestamp of the event
    #[serde(with = "time::serde::rfc3339")]
    pub timestamp: OffsetDateTime,
}

impl AliasEvent {
    /// Create a new alias event.
    pub fn new(
        event_type: AliasEventType,
        old: Option<AliasRecord>,
        new: Option<AliasRecord>,
    ) -> Self {
        Self {
            event_type,
            old,
            new,
            timestamp: OffsetDateTime::now_utc(),
        }
    }

    /// Create an "inserted" event.
    pub fn inserted(new: AliasRecord) -> Self {
        Self::new(AliasEventType::Inserted, None, Some(new))
    }

    /// Create an "updated" event.
    pub fn updated(old: AliasRecord, new: AliasRecord) -> Self {
        Self::new(AliasEventType::Updated, Some(old), Some(new))
    }

    /// Create a "deleted" event.
    pub fn deleted(old: AliasRecord) -> Self {
        Self::new(AliasEventType::Deleted, Some(old), None)
    }

    /// The system path this event is about, taken from the new record when
    /// present, otherwise the old one.
    pub fn source_path(&self) -> Option<&str> {
        self.new
            .as_ref()
            .or(self.old.as_ref())
            .map(|r| r.source.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::language::Language;

    #[test]
    fn test_event_constructors() {
        let record = AliasRecord::new("user/42", "alice", Language::neutral()).with_id(1);

        let event = AliasEvent::inserted(record.clone());
        assert_eq!(event.event_type, AliasEventType::Inserted);
        assert!(event.old.is_none());
        assert_eq!(event.source_path(), Some("user/42"));

        let event = AliasEvent::deleted(record.clone());
        assert_eq!(event.event_type, AliasEventType::Deleted);
        assert!(event.new.is_none());
        assert_eq!(event.source_path(), Some("user/42"));

        let mut renamed = record.clone();
        renamed.source = "user/43".to_string();
        let event = AliasEvent::updated(record, renamed);
        assert_eq!(event.event_type, AliasEventType::Updated);
        assert_eq!(event.source_path(), Some("user/43"));
    }

    #[test]
    fn test_event_type_display() {
        assert_eq!(AliasEventType::Inserted.to_string(), "inserted");
        assert_eq!(AliasEventType::Updated.as_str(), "updated");
        assert_eq!(AliasEventType::Deleted.as_str(), "deleted");
    }
}
