//! Review data model: a one-off rating and comment left on an event.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error as ThisError;
use utoipa::ToSchema;
use uuid::Uuid;

use super::event::EventId;
use super::user::UserId;

/// Error raised when a rating falls outside the accepted range.
#[derive(Debug, Clone, PartialEq, Eq, ThisError)]
#[error("rating must be between {min} and {max}", min = Rating::MIN, max = Rating::MAX)]
pub struct RatingOutOfRange;

/// Star rating constrained to `[1, 5]`.
///
/// The storage column is already non-negative; the bound is still enforced
/// here so an out-of-range value is rejected before any write is attempted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, ToSchema)]
#[serde(try_from = "i16", into = "i16")]
#[schema(value_type = i32, example = 4)]
pub struct Rating(i16);

impl Rating {
    /// Lowest accepted rating.
    pub const MIN: i16 = 1;
    /// Highest accepted rating.
    pub const MAX: i16 = 5;

    /// Validate and construct a [`Rating`].
    pub const fn new(value: i16) -> Result<Self, RatingOutOfRange> {
        if value < Self::MIN || value > Self::MAX {
            return Err(RatingOutOfRange);
        }
        Ok(Self(value))
    }

    /// The validated value.
    pub const fn get(self) -> i16 {
        self.0
    }
}

impl fmt::Display for Rating {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<Rating> for i16 {
    fn from(value: Rating) -> Self {
        value.0
    }
}

impl TryFrom<i16> for Rating {
    type Error = RatingOutOfRange;

    fn try_from(value: i16) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// A stored review.
///
/// ## Invariants
/// - at most one review per `(event, user)` pair, enforced by the storage layer
/// - immutable once created; no update path exists
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Review {
    /// Stable identifier.
    pub id: Uuid,
    /// Reviewed event.
    pub event: EventId,
    /// Reviewing user; forced to the caller on creation.
    pub user: UserId,
    /// Star rating in `[1, 5]`.
    pub rating: Rating,
    /// Free-text comment.
    pub comment: String,
    /// Record creation timestamp.
    pub created_at: DateTime<Utc>,
}
