//! Domain ports defining the edges of the hexagon.
//!
//! Driven ports describe how the domain expects to reach storage and the
//! authentication provider; driving ports are the use-case surface consumed
//! by the HTTP adapter. Each driven port exposes strongly typed errors so
//! adapters map their failures into predictable variants instead of
//! returning `anyhow::Result`.

pub mod fixtures;

use std::fmt;
use std::str::FromStr;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error as ThisError;

use super::error::Error;
use super::event::{Event, EventDraft, EventId, EventPatch};
use super::review::{Rating, Review};
use super::rsvp::{Rsvp, RsvpStatus};
use super::user::{User, UserId, UserProfile, Username};

/// Errors surfaced by the storage adapters.
#[derive(Debug, Clone, PartialEq, Eq, ThisError)]
pub enum RepositoryError {
    /// Database connectivity or pool failures.
    #[error("repository connection failed: {message}")]
    Connection { message: String },
    /// Query construction or execution failures.
    #[error("repository query failed: {message}")]
    Query { message: String },
    /// A uniqueness constraint rejected the write.
    ///
    /// Raised by the storage layer itself so the duplicate check cannot race
    /// with a concurrent insert.
    #[error("duplicate record rejected by constraint {constraint}")]
    Duplicate { constraint: String },
}

impl RepositoryError {
    /// Helper for connection-level failures.
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection {
            message: message.into(),
        }
    }

    /// Helper for query failures.
    pub fn query(message: impl Into<String>) -> Self {
        Self::Query {
            message: message.into(),
        }
    }

    /// Helper for uniqueness violations.
    pub fn duplicate(constraint: impl Into<String>) -> Self {
        Self::Duplicate {
            constraint: constraint.into(),
        }
    }
}

/// Errors surfaced by the authentication provider.
#[derive(Debug, Clone, PartialEq, Eq, ThisError)]
pub enum LoginError {
    /// Credentials did not resolve to a known identity.
    #[error("invalid credentials")]
    InvalidCredentials,
    /// The provider could not be reached.
    #[error("login backend unavailable: {message}")]
    Unavailable { message: String },
}

/// Credentials forwarded to the authentication provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginCredentials {
    pub username: Username,
    pub password: String,
}

/// Ordering options for event listings.
///
/// Wire values mirror the query parameter: `start_time`, `-start_time`,
/// `created_at`, `-created_at`. The default matches the model ordering of
/// newest start time first.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum EventOrdering {
    StartTimeAsc,
    #[default]
    StartTimeDesc,
    CreatedAtAsc,
    CreatedAtDesc,
}

/// Error raised when parsing an unknown ordering value.
#[derive(Debug, Clone, PartialEq, Eq, ThisError)]
#[error("ordering must be one of start_time, -start_time, created_at, -created_at")]
pub struct InvalidEventOrdering;

impl EventOrdering {
    /// Wire representation of the ordering.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::StartTimeAsc => "start_time",
            Self::StartTimeDesc => "-start_time",
            Self::CreatedAtAsc => "created_at",
            Self::CreatedAtDesc => "-created_at",
        }
    }
}

impl fmt::Display for EventOrdering {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EventOrdering {
    type Err = InvalidEventOrdering;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "start_time" => Ok(Self::StartTimeAsc),
            "-start_time" => Ok(Self::StartTimeDesc),
            "created_at" => Ok(Self::CreatedAtAsc),
            "-created_at" => Ok(Self::CreatedAtDesc),
            _ => Err(InvalidEventOrdering),
        }
    }
}

/// Filters applied on top of the visibility union when listing events.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventFilter {
    /// Exact match on the free-text location.
    pub location: Option<String>,
    /// Restrict to public or private events.
    pub is_public: Option<bool>,
    /// Restrict to events organised by this user.
    pub organizer: Option<UserId>,
    /// Case-insensitive substring search over title, location, description,
    /// and the organizer's username.
    pub search: Option<String>,
    /// Result ordering.
    pub ordering: EventOrdering,
}

/// An event joined with its organizer's identity for presentation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventDetails {
    pub event: Event,
    pub organizer: User,
    pub organizer_profile: Option<UserProfile>,
}

/// Storage port for events and their invite sets.
///
/// `list` applies the visibility union for the viewer — public events, events
/// they organise, and events they are invited to, de-duplicated; anonymous
/// viewers see public events only. The union lives here so every adapter
/// reproduces the same reachable set (the fixture filters in memory, the
/// Diesel adapter builds one query).
#[async_trait]
pub trait EventRepository: Send + Sync {
    async fn list(
        &self,
        viewer: Option<&UserId>,
        filter: &EventFilter,
    ) -> Result<Vec<EventDetails>, RepositoryError>;

    async fn find(&self, id: EventId) -> Result<Option<EventDetails>, RepositoryError>;

    /// Persist a new event together with its invite set.
    async fn create(&self, event: &Event) -> Result<(), RepositoryError>;

    /// Persist the merged event; the stored invite set is synchronised to
    /// `event.invited_users`.
    async fn update(&self, event: &Event) -> Result<(), RepositoryError>;

    /// Delete the event; RSVPs, reviews, and invites cascade.
    async fn delete(&self, id: EventId) -> Result<(), RepositoryError>;
}

/// Storage port for RSVPs.
#[async_trait]
pub trait RsvpRepository: Send + Sync {
    async fn find(&self, event: EventId, user: UserId) -> Result<Option<Rsvp>, RepositoryError>;

    /// Insert a new RSVP; a `(event, user)` duplicate yields
    /// [`RepositoryError::Duplicate`].
    async fn create(&self, rsvp: &Rsvp) -> Result<(), RepositoryError>;

    /// Update only the status of an existing RSVP; `None` when absent.
    async fn set_status(
        &self,
        event: EventId,
        user: UserId,
        status: RsvpStatus,
        now: DateTime<Utc>,
    ) -> Result<Option<Rsvp>, RepositoryError>;
}

/// Storage port for reviews.
#[async_trait]
pub trait ReviewRepository: Send + Sync {
    /// All reviews for the event, most recent first.
    async fn list_for_event(&self, event: EventId) -> Result<Vec<Review>, RepositoryError>;

    async fn exists(&self, event: EventId, user: UserId) -> Result<bool, RepositoryError>;

    /// Insert a new review; a `(event, user)` duplicate yields
    /// [`RepositoryError::Duplicate`].
    async fn create(&self, review: &Review) -> Result<(), RepositoryError>;
}

/// Storage port for user identities and profiles.
#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn find(&self, id: UserId) -> Result<Option<User>, RepositoryError>;

    /// Create or refresh a user identity record.
    async fn upsert(&self, user: &User) -> Result<(), RepositoryError>;

    async fn find_profile(&self, id: UserId) -> Result<Option<UserProfile>, RepositoryError>;

    /// Create or replace the caller's profile.
    async fn upsert_profile(&self, profile: &UserProfile) -> Result<(), RepositoryError>;
}

/// Authentication provider port.
///
/// Credential storage and verification are external collaborators; this port
/// only resolves credentials to an identity so the session flow is complete.
#[async_trait]
pub trait LoginService: Send + Sync {
    async fn authenticate(&self, credentials: &LoginCredentials) -> Result<User, LoginError>;
}

/// Read side of the events use-cases.
#[async_trait]
pub trait EventsQuery: Send + Sync {
    /// List events reachable by the caller, filtered and ordered.
    async fn list_events(
        &self,
        caller: Option<UserId>,
        filter: EventFilter,
    ) -> Result<Vec<EventDetails>, Error>;

    /// Retrieve one event, subject to the visibility rule.
    async fn get_event(&self, caller: Option<UserId>, id: EventId) -> Result<EventDetails, Error>;
}

/// Write side of the events use-cases.
#[async_trait]
pub trait EventsCommand: Send + Sync {
    /// Create an event; the caller becomes the organizer.
    async fn create_event(&self, caller: UserId, draft: EventDraft)
    -> Result<EventDetails, Error>;

    /// Merge a partial update onto an event, organizer only.
    async fn update_event(
        &self,
        caller: UserId,
        id: EventId,
        patch: EventPatch,
    ) -> Result<EventDetails, Error>;

    /// Delete an event, organizer only.
    async fn delete_event(&self, caller: UserId, id: EventId) -> Result<(), Error>;
}

/// RSVP use-cases.
#[async_trait]
pub trait RsvpCommand: Send + Sync {
    /// Record the caller's attendance intention for an event.
    async fn create_rsvp(
        &self,
        caller: UserId,
        event: EventId,
        status: Option<RsvpStatus>,
    ) -> Result<Rsvp, Error>;

    /// Change the status of an existing RSVP; the caller must be its owner.
    async fn update_rsvp(
        &self,
        caller: UserId,
        event: EventId,
        user: UserId,
        status: RsvpStatus,
    ) -> Result<Rsvp, Error>;
}

/// Review read use-cases.
#[async_trait]
pub trait ReviewsQuery: Send + Sync {
    /// List reviews for an event, subject to the visibility rule.
    async fn list_reviews(
        &self,
        caller: Option<UserId>,
        event: EventId,
    ) -> Result<Vec<Review>, Error>;
}

/// Review write use-cases.
#[async_trait]
pub trait ReviewsCommand: Send + Sync {
    /// Leave a one-off review on an event the caller can see.
    async fn create_review(
        &self,
        caller: UserId,
        event: EventId,
        rating: Rating,
        comment: String,
    ) -> Result<Review, Error>;
}

/// Profile use-cases.
#[async_trait]
pub trait ProfilesPort: Send + Sync {
    /// Fetch a user's profile.
    async fn get_profile(&self, user: UserId) -> Result<UserProfile, Error>;

    /// Create or replace a profile; owner only.
    async fn put_profile(&self, caller: UserId, profile: UserProfile)
    -> Result<UserProfile, Error>;

    /// Resolve the caller's identity record.
    async fn current_user(&self, caller: UserId) -> Result<User, Error>;
}
