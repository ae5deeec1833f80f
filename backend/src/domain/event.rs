//! Event aggregate: drafts, stored events, and partial updates.
//!
//! The time-ordering invariant (`end_time` strictly after `start_time`) is
//! enforced both when a draft is accepted and when a patch is merged onto an
//! existing event, so no write path can persist an inverted interval.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error as ThisError;
use utoipa::ToSchema;
use uuid::Uuid;

use super::user::UserId;

/// Validation errors raised when accepting event input.
#[derive(Debug, Clone, PartialEq, Eq, ThisError)]
pub enum EventValidationError {
    /// Title is empty once trimmed.
    #[error("title must not be empty")]
    EmptyTitle,
    /// `end_time` is not strictly after `start_time`.
    #[error("end_time must be after start_time")]
    EndNotAfterStart,
}

/// Stable event identifier stored as a UUID.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, ToSchema,
)]
#[serde(transparent)]
#[schema(value_type = String, format = "uuid")]
pub struct EventId(Uuid);

impl EventId {
    /// Wrap an already-parsed UUID.
    pub const fn from_uuid(id: Uuid) -> Self {
        Self(id)
    }

    /// Generate a new random identifier.
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }

    /// Access the underlying UUID.
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for EventId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A stored event.
///
/// ## Invariants
/// - `end_time > start_time`
/// - `organizer` is immutable after creation
/// - `invited_users` is only consulted by the visibility rule when the event
///   is private; it is persisted regardless of `is_public`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Event {
    /// Stable identifier.
    pub id: EventId,
    /// Short human-readable title.
    pub title: String,
    /// Free-text description.
    pub description: String,
    /// User who created the event; sole holder of mutation rights.
    pub organizer: UserId,
    /// Free-text location.
    pub location: String,
    /// Scheduled start.
    pub start_time: DateTime<Utc>,
    /// Scheduled end; strictly after `start_time`.
    pub end_time: DateTime<Utc>,
    /// Whether the event is visible to everyone.
    pub is_public: bool,
    /// Users granted read access when the event is private.
    pub invited_users: Vec<UserId>,
    /// Record creation timestamp (server-assigned).
    pub created_at: DateTime<Utc>,
    /// Last modification timestamp (server-assigned).
    pub updated_at: DateTime<Utc>,
}

/// Validated payload for creating an event.
///
/// The organizer is deliberately absent: it is always forced to the caller's
/// identity by the service, so a client-supplied organizer can never take
/// effect.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventDraft {
    pub title: String,
    pub description: String,
    pub location: String,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub is_public: bool,
    pub invited_users: Vec<UserId>,
}

impl EventDraft {
    /// Check the field-level invariants of the draft.
    pub fn validate(&self) -> Result<(), EventValidationError> {
        if self.title.trim().is_empty() {
            return Err(EventValidationError::EmptyTitle);
        }
        check_interval(self.start_time, self.end_time)
    }
}

/// Partial update merged onto an existing event.
///
/// Each field is copied explicitly so the merged record can be validated as a
/// whole before anything is persisted. `invited_users` replaces the invite set
/// wholesale when supplied and leaves it untouched otherwise.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub location: Option<String>,
    pub start_time: Option<DateTime<Utc>>,
    pub end_time: Option<DateTime<Utc>>,
    pub is_public: Option<bool>,
    pub invited_users: Option<Vec<UserId>>,
}

impl EventPatch {
    /// Merge the patch onto `current`, re-validating the merged record.
    ///
    /// Returns the event as it should be persisted; `updated_at` is stamped
    /// with `now`. The organizer and `created_at` are never touched.
    pub fn merge_onto(
        &self,
        current: &Event,
        now: DateTime<Utc>,
    ) -> Result<Event, EventValidationError> {
        let merged = Event {
            id: current.id,
            title: self.title.clone().unwrap_or_else(|| current.title.clone()),
            description: self
                .description
                .clone()
                .unwrap_or_else(|| current.description.clone()),
            organizer: current.organizer,
            location: self
                .location
                .clone()
                .unwrap_or_else(|| current.location.clone()),
            start_time: self.start_time.unwrap_or(current.start_time),
            end_time: self.end_time.unwrap_or(current.end_time),
            is_public: self.is_public.unwrap_or(current.is_public),
            invited_users: self
                .invited_users
                .clone()
                .unwrap_or_else(|| current.invited_users.clone()),
            created_at: current.created_at,
            updated_at: now,
        };
        if merged.title.trim().is_empty() {
            return Err(EventValidationError::EmptyTitle);
        }
        check_interval(merged.start_time, merged.end_time)?;
        Ok(merged)
    }
}

fn check_interval(
    start: DateTime<Utc>,
    end: DateTime<Utc>,
) -> Result<(), EventValidationError> {
    if end <= start {
        return Err(EventValidationError::EndNotAfterStart);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rstest::rstest;

    fn at(hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2030, 1, 1, hour, 0, 0).single().expect("valid time")
    }

    fn draft(start_hour: u32, end_hour: u32) -> EventDraft {
        EventDraft {
            title: "Board games".into(),
            description: String::new(),
            location: "Town hall".into(),
            start_time: at(start_hour),
            end_time: at(end_hour),
            is_public: true,
            invited_users: Vec::new(),
        }
    }

    fn stored(start_hour: u32, end_hour: u32) -> Event {
        let d = draft(start_hour, end_hour);
        Event {
            id: EventId::random(),
            title: d.title,
            description: d.description,
            organizer: UserId::random(),
            location: d.location,
            start_time: d.start_time,
            end_time: d.end_time,
            is_public: true,
            invited_users: Vec::new(),
            created_at: at(0),
            updated_at: at(0),
        }
    }

    #[test]
    fn draft_with_ordered_interval_passes() {
        assert!(draft(10, 12).validate().is_ok());
    }

    #[rstest]
    #[case(12, 10)]
    #[case(10, 10)]
    fn draft_rejects_inverted_or_empty_interval(#[case] start: u32, #[case] end: u32) {
        assert_eq!(
            draft(start, end).validate(),
            Err(EventValidationError::EndNotAfterStart)
        );
    }

    #[test]
    fn draft_rejects_blank_title() {
        let mut d = draft(10, 12);
        d.title = "  ".into();
        assert_eq!(d.validate(), Err(EventValidationError::EmptyTitle));
    }

    #[test]
    fn patch_revalidates_against_merged_values() {
        let current = stored(10, 12);
        // Moving only the start past the existing end must fail even though
        // the patch on its own looks harmless.
        let patch = EventPatch {
            start_time: Some(at(13)),
            ..EventPatch::default()
        };
        assert_eq!(
            patch.merge_onto(&current, at(1)),
            Err(EventValidationError::EndNotAfterStart)
        );
    }

    #[test]
    fn patch_merges_field_by_field() {
        let current = stored(10, 12);
        let invitee = UserId::random();
        let patch = EventPatch {
            title: Some("Renamed".into()),
            invited_users: Some(vec![invitee]),
            ..EventPatch::default()
        };
        let merged = patch.merge_onto(&current, at(2)).expect("valid merge");
        assert_eq!(merged.title, "Renamed");
        assert_eq!(merged.invited_users, vec![invitee]);
        assert_eq!(merged.organizer, current.organizer);
        assert_eq!(merged.start_time, current.start_time);
        assert_eq!(merged.created_at, current.created_at);
        assert_eq!(merged.updated_at, at(2));
    }

    #[test]
    fn patch_without_invites_keeps_existing_set() {
        let mut current = stored(10, 12);
        current.invited_users = vec![UserId::random()];
        let patch = EventPatch {
            description: Some("new blurb".into()),
            ..EventPatch::default()
        };
        let merged = patch.merge_onto(&current, at(2)).expect("valid merge");
        assert_eq!(merged.invited_users, current.invited_users);
    }
}
