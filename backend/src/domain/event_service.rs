//! Event, RSVP, and review use-cases.
//!
//! `EventService` implements the driving ports by composing the permission
//! predicates, entity validation, and the storage ports. All caller identity
//! is threaded through explicitly; the service holds no request state.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use serde_json::json;
use tracing::info;
use uuid::Uuid;

use super::error::Error;
use super::event::{Event, EventDraft, EventId, EventPatch, EventValidationError};
use super::permissions::{can_modify, can_view};
use super::ports::fixtures::FixtureStore;
use super::ports::{
    EventDetails, EventFilter, EventRepository, EventsCommand, EventsQuery, RepositoryError,
    ReviewRepository, ReviewsCommand, ReviewsQuery, RsvpCommand, RsvpRepository, UserRepository,
};
use super::review::{Rating, Review};
use super::rsvp::{Rsvp, RsvpStatus};
use super::user::UserId;

const ALREADY_RSVPED: &str = "You have already RSVPed for this event.";
const ALREADY_REVIEWED: &str = "You have already reviewed this event.";
const NOT_YOUR_RSVP: &str = "You can only update your own RSVP.";
const EVENT_NOT_VISIBLE: &str = "You are not allowed to access this event.";
const NOT_ORGANIZER: &str = "Only the organizer may modify this event.";

/// Service implementing the event, RSVP, and review use-cases.
#[derive(Clone)]
pub struct EventService {
    events: Arc<dyn EventRepository>,
    rsvps: Arc<dyn RsvpRepository>,
    reviews: Arc<dyn ReviewRepository>,
    users: Arc<dyn UserRepository>,
}

impl EventService {
    /// Create a service over the given storage adapters.
    pub fn new(
        events: Arc<dyn EventRepository>,
        rsvps: Arc<dyn RsvpRepository>,
        reviews: Arc<dyn ReviewRepository>,
        users: Arc<dyn UserRepository>,
    ) -> Self {
        Self {
            events,
            rsvps,
            reviews,
            users,
        }
    }

    /// Convenience constructor wiring every port to one fixture store.
    pub fn with_fixture(store: &FixtureStore) -> Self {
        Self::new(
            Arc::new(store.clone()),
            Arc::new(store.clone()),
            Arc::new(store.clone()),
            Arc::new(store.clone()),
        )
    }

    /// Fetch an event or fail with `NotFound`.
    async fn require_event(&self, id: EventId) -> Result<EventDetails, Error> {
        self.events
            .find(id)
            .await
            .map_err(map_repo_error)?
            .ok_or_else(|| Error::not_found("event not found"))
    }

    /// Reject invite lists naming users that do not exist.
    async fn require_invitees(&self, invited: &[UserId]) -> Result<(), Error> {
        for invitee in invited {
            let known = self
                .users
                .find(*invitee)
                .await
                .map_err(map_repo_error)?
                .is_some();
            if !known {
                return Err(Error::invalid_request(format!(
                    "invited user {invitee} does not exist"
                ))
                .with_details(json!({
                    "field": "invitedUsers",
                    "value": invitee.to_string(),
                    "code": "unknown_user",
                })));
            }
        }
        Ok(())
    }
}

/// Map storage failures that carry no duplicate semantics.
fn map_repo_error(error: RepositoryError) -> Error {
    match error {
        RepositoryError::Connection { message } => {
            Error::service_unavailable(format!("event store unavailable: {message}"))
        }
        RepositoryError::Query { message } => {
            Error::internal(format!("event store error: {message}"))
        }
        RepositoryError::Duplicate { constraint } => {
            Error::internal(format!("unexpected duplicate record: {constraint}"))
        }
    }
}

/// Map storage failures on a uniqueness-guarded insert.
///
/// A `Duplicate` here means a concurrent request won the race after the
/// pre-check passed; it must surface exactly like the pre-check hit, never as
/// a raw storage error.
fn map_duplicate_error(error: RepositoryError, reason: &str) -> Error {
    match error {
        RepositoryError::Duplicate { .. } => Error::forbidden(reason),
        other => map_repo_error(other),
    }
}

fn map_validation_error(error: EventValidationError) -> Error {
    let field = match error {
        EventValidationError::EmptyTitle => "title",
        EventValidationError::EndNotAfterStart => "end_time",
    };
    Error::invalid_request(error.to_string()).with_details(json!({ "field": field }))
}

#[async_trait]
impl EventsQuery for EventService {
    async fn list_events(
        &self,
        caller: Option<UserId>,
        filter: EventFilter,
    ) -> Result<Vec<EventDetails>, Error> {
        self.events
            .list(caller.as_ref(), &filter)
            .await
            .map_err(map_repo_error)
    }

    async fn get_event(&self, caller: Option<UserId>, id: EventId) -> Result<EventDetails, Error> {
        let details = self.require_event(id).await?;
        if !can_view(&details.event, caller.as_ref()) {
            return Err(Error::forbidden(EVENT_NOT_VISIBLE));
        }
        Ok(details)
    }
}

#[async_trait]
impl EventsCommand for EventService {
    async fn create_event(
        &self,
        caller: UserId,
        draft: EventDraft,
    ) -> Result<EventDetails, Error> {
        // The session can outlive the account it references.
        let organizer = self
            .users
            .find(caller)
            .await
            .map_err(map_repo_error)?
            .ok_or_else(|| Error::unauthorized("session user no longer exists"))?;

        draft.validate().map_err(map_validation_error)?;
        self.require_invitees(&draft.invited_users).await?;
        let now = Utc::now();
        let event = Event {
            id: EventId::random(),
            title: draft.title,
            description: draft.description,
            organizer: caller,
            location: draft.location,
            start_time: draft.start_time,
            end_time: draft.end_time,
            is_public: draft.is_public,
            invited_users: draft.invited_users,
            created_at: now,
            updated_at: now,
        };
        self.events.create(&event).await.map_err(map_repo_error)?;
        info!(event_id = %event.id, organizer = %caller, "event created");

        let organizer_profile = self
            .users
            .find_profile(caller)
            .await
            .map_err(map_repo_error)?;
        Ok(EventDetails {
            event,
            organizer,
            organizer_profile,
        })
    }

    async fn update_event(
        &self,
        caller: UserId,
        id: EventId,
        patch: EventPatch,
    ) -> Result<EventDetails, Error> {
        let details = self.require_event(id).await?;
        if !can_modify(&details.event, &caller) {
            return Err(Error::forbidden(NOT_ORGANIZER));
        }
        if let Some(invited) = &patch.invited_users {
            self.require_invitees(invited).await?;
        }
        let merged = patch
            .merge_onto(&details.event, Utc::now())
            .map_err(map_validation_error)?;
        self.events.update(&merged).await.map_err(map_repo_error)?;
        Ok(EventDetails {
            event: merged,
            organizer: details.organizer,
            organizer_profile: details.organizer_profile,
        })
    }

    async fn delete_event(&self, caller: UserId, id: EventId) -> Result<(), Error> {
        let details = self.require_event(id).await?;
        if !can_modify(&details.event, &caller) {
            return Err(Error::forbidden(NOT_ORGANIZER));
        }
        self.events.delete(id).await.map_err(map_repo_error)?;
        info!(event_id = %id, organizer = %caller, "event deleted");
        Ok(())
    }
}

#[async_trait]
impl RsvpCommand for EventService {
    async fn create_rsvp(
        &self,
        caller: UserId,
        event: EventId,
        status: Option<RsvpStatus>,
    ) -> Result<Rsvp, Error> {
        self.require_event(event).await?;
        let existing = self
            .rsvps
            .find(event, caller)
            .await
            .map_err(map_repo_error)?;
        if existing.is_some() {
            return Err(Error::forbidden(ALREADY_RSVPED));
        }

        let now = Utc::now();
        let rsvp = Rsvp {
            id: Uuid::new_v4(),
            event,
            user: caller,
            status: status.unwrap_or_default(),
            created_at: now,
            updated_at: now,
        };
        self.rsvps
            .create(&rsvp)
            .await
            .map_err(|error| map_duplicate_error(error, ALREADY_RSVPED))?;
        Ok(rsvp)
    }

    async fn update_rsvp(
        &self,
        caller: UserId,
        event: EventId,
        user: UserId,
        status: RsvpStatus,
    ) -> Result<Rsvp, Error> {
        self.require_event(event).await?;
        self.users
            .find(user)
            .await
            .map_err(map_repo_error)?
            .ok_or_else(|| Error::not_found("user not found"))?;
        self.rsvps
            .find(event, user)
            .await
            .map_err(map_repo_error)?
            .ok_or_else(|| Error::not_found("RSVP not found"))?;
        if caller != user {
            return Err(Error::forbidden(NOT_YOUR_RSVP));
        }
        self.rsvps
            .set_status(event, user, status, Utc::now())
            .await
            .map_err(map_repo_error)?
            .ok_or_else(|| Error::not_found("RSVP not found"))
    }
}

#[async_trait]
impl ReviewsQuery for EventService {
    async fn list_reviews(
        &self,
        caller: Option<UserId>,
        event: EventId,
    ) -> Result<Vec<Review>, Error> {
        let details = self.require_event(event).await?;
        if !can_view(&details.event, caller.as_ref()) {
            return Err(Error::forbidden(EVENT_NOT_VISIBLE));
        }
        self.reviews
            .list_for_event(event)
            .await
            .map_err(map_repo_error)
    }
}

#[async_trait]
impl ReviewsCommand for EventService {
    async fn create_review(
        &self,
        caller: UserId,
        event: EventId,
        rating: Rating,
        comment: String,
    ) -> Result<Review, Error> {
        let details = self.require_event(event).await?;
        if !can_view(&details.event, Some(&caller)) {
            return Err(Error::forbidden(EVENT_NOT_VISIBLE));
        }
        if self
            .reviews
            .exists(event, caller)
            .await
            .map_err(map_repo_error)?
        {
            return Err(Error::forbidden(ALREADY_REVIEWED));
        }

        let review = Review {
            id: Uuid::new_v4(),
            event,
            user: caller,
            rating,
            comment,
            created_at: Utc::now(),
        };
        self.reviews
            .create(&review)
            .await
            .map_err(|error| map_duplicate_error(error, ALREADY_REVIEWED))?;
        Ok(review)
    }
}

#[cfg(test)]
#[path = "event_service_tests.rs"]
mod tests;
