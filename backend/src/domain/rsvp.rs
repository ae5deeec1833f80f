//! RSVP data model: a user's attendance intention for an event.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error as ThisError;
use utoipa::ToSchema;
use uuid::Uuid;

use super::event::EventId;
use super::user::UserId;

/// Attendance intention. Serialised with the wire strings `"Going"`,
/// `"Maybe"`, and `"Not Going"`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum RsvpStatus {
    #[default]
    Going,
    Maybe,
    #[serde(rename = "Not Going")]
    #[schema(rename = "Not Going")]
    NotGoing,
}

/// Error raised when parsing an unknown RSVP status string.
#[derive(Debug, Clone, PartialEq, Eq, ThisError)]
#[error("status must be one of Going, Maybe, Not Going")]
pub struct InvalidRsvpStatus;

impl RsvpStatus {
    /// Wire representation of the status.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Going => "Going",
            Self::Maybe => "Maybe",
            Self::NotGoing => "Not Going",
        }
    }
}

impl fmt::Display for RsvpStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RsvpStatus {
    type Err = InvalidRsvpStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Going" => Ok(Self::Going),
            "Maybe" => Ok(Self::Maybe),
            "Not Going" => Ok(Self::NotGoing),
            _ => Err(InvalidRsvpStatus),
        }
    }
}

/// A stored RSVP.
///
/// ## Invariants
/// - at most one RSVP per `(event, user)` pair, enforced by the storage layer
/// - only `status` is mutable, and only by the owning user
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rsvp {
    /// Stable identifier.
    pub id: Uuid,
    /// Event the intention refers to.
    pub event: EventId,
    /// Attending user; forced to the caller on creation.
    pub user: UserId,
    /// Current intention.
    pub status: RsvpStatus,
    /// Record creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last modification timestamp.
    pub updated_at: DateTime<Utc>,
}
