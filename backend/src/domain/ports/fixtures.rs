//! In-memory fixture adapters for the driven ports.
//!
//! The fixture store backs tests and the no-database server mode. It honours
//! the same relational rules as the PostgreSQL adapters: `(event, user)`
//! uniqueness for RSVPs and reviews is enforced at insert time, and deleting
//! an event cascades to its dependants.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::event::{Event, EventId};
use crate::domain::ports::{
    EventDetails, EventFilter, EventOrdering, EventRepository, LoginCredentials, LoginError,
    LoginService, RepositoryError, ReviewRepository, RsvpRepository, UserRepository,
};
use crate::domain::review::Review;
use crate::domain::rsvp::{Rsvp, RsvpStatus};
use crate::domain::user::{User, UserId, UserProfile, Username};

#[derive(Debug, Default)]
struct Inner {
    users: BTreeMap<UserId, User>,
    passwords: BTreeMap<UserId, String>,
    profiles: BTreeMap<UserId, UserProfile>,
    events: BTreeMap<EventId, Event>,
    rsvps: BTreeMap<(EventId, UserId), Rsvp>,
    reviews: BTreeMap<(EventId, UserId), Review>,
}

/// Shared in-memory store implementing every driven port.
#[derive(Debug, Clone, Default)]
pub struct FixtureStore {
    inner: Arc<Mutex<Inner>>,
}

impl FixtureStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, Inner>, RepositoryError> {
        self.inner
            .lock()
            .map_err(|_| RepositoryError::query("fixture store lock poisoned"))
    }

    /// Seed a user with login credentials, returning the stored identity.
    pub fn seed_user(
        &self,
        username: Username,
        email: impl Into<String>,
        password: impl Into<String>,
    ) -> User {
        let user = User::new(UserId::random(), username, email);
        if let Ok(mut inner) = self.inner.lock() {
            inner.users.insert(user.id, user.clone());
            inner.passwords.insert(user.id, password.into());
        }
        user
    }

    /// Remove a user together with their profile, RSVPs, and reviews.
    ///
    /// Mirrors the `ON DELETE CASCADE` behaviour of the SQL schema so fixture
    /// tests can exercise user-removal semantics.
    pub fn remove_user(&self, id: UserId) {
        if let Ok(mut inner) = self.inner.lock() {
            inner.users.remove(&id);
            inner.passwords.remove(&id);
            inner.profiles.remove(&id);
            inner.rsvps.retain(|(_, user), _| *user != id);
            inner.reviews.retain(|(_, user), _| *user != id);
            inner.events.retain(|_, event| event.organizer != id);
            for event in inner.events.values_mut() {
                event.invited_users.retain(|invitee| *invitee != id);
            }
        }
    }

    fn details(inner: &Inner, event: &Event) -> Result<EventDetails, RepositoryError> {
        let organizer = inner
            .users
            .get(&event.organizer)
            .cloned()
            .ok_or_else(|| RepositoryError::query("organizer record missing"))?;
        Ok(EventDetails {
            event: event.clone(),
            organizer_profile: inner.profiles.get(&organizer.id).cloned(),
            organizer,
        })
    }

    fn matches_filter(inner: &Inner, event: &Event, filter: &EventFilter) -> bool {
        if let Some(location) = &filter.location {
            if event.location != *location {
                return false;
            }
        }
        if let Some(is_public) = filter.is_public {
            if event.is_public != is_public {
                return false;
            }
        }
        if let Some(organizer) = filter.organizer {
            if event.organizer != organizer {
                return false;
            }
        }
        if let Some(search) = &filter.search {
            let needle = search.to_lowercase();
            let organizer_name = inner
                .users
                .get(&event.organizer)
                .map(|user| user.username.as_str().to_lowercase())
                .unwrap_or_default();
            let haystacks = [
                event.title.to_lowercase(),
                event.location.to_lowercase(),
                event.description.to_lowercase(),
                organizer_name,
            ];
            if !haystacks.iter().any(|hay| hay.contains(&needle)) {
                return false;
            }
        }
        true
    }

    fn visible_to(event: &Event, viewer: Option<&UserId>) -> bool {
        if event.is_public {
            return true;
        }
        match viewer {
            Some(viewer) => {
                event.organizer == *viewer || event.invited_users.contains(viewer)
            }
            None => false,
        }
    }

    fn sort(details: &mut [EventDetails], ordering: EventOrdering) {
        match ordering {
            EventOrdering::StartTimeAsc => {
                details.sort_by_key(|d| d.event.start_time);
            }
            EventOrdering::StartTimeDesc => {
                details.sort_by_key(|d| std::cmp::Reverse(d.event.start_time));
            }
            EventOrdering::CreatedAtAsc => {
                details.sort_by_key(|d| d.event.created_at);
            }
            EventOrdering::CreatedAtDesc => {
                details.sort_by_key(|d| std::cmp::Reverse(d.event.created_at));
            }
        }
    }
}

#[async_trait]
impl EventRepository for FixtureStore {
    async fn list(
        &self,
        viewer: Option<&UserId>,
        filter: &EventFilter,
    ) -> Result<Vec<EventDetails>, RepositoryError> {
        let inner = self.lock()?;
        let mut results = Vec::new();
        for event in inner.events.values() {
            if !Self::visible_to(event, viewer) {
                continue;
            }
            if !Self::matches_filter(&inner, event, filter) {
                continue;
            }
            results.push(Self::details(&inner, event)?);
        }
        Self::sort(&mut results, filter.ordering);
        Ok(results)
    }

    async fn find(&self, id: EventId) -> Result<Option<EventDetails>, RepositoryError> {
        let inner = self.lock()?;
        inner
            .events
            .get(&id)
            .map(|event| Self::details(&inner, event))
            .transpose()
    }

    async fn create(&self, event: &Event) -> Result<(), RepositoryError> {
        let mut inner = self.lock()?;
        if !inner.users.contains_key(&event.organizer) {
            return Err(RepositoryError::query("organizer record missing"));
        }
        inner.events.insert(event.id, event.clone());
        Ok(())
    }

    async fn update(&self, event: &Event) -> Result<(), RepositoryError> {
        let mut inner = self.lock()?;
        if !inner.events.contains_key(&event.id) {
            return Err(RepositoryError::query("event record missing"));
        }
        inner.events.insert(event.id, event.clone());
        Ok(())
    }

    async fn delete(&self, id: EventId) -> Result<(), RepositoryError> {
        let mut inner = self.lock()?;
        inner.events.remove(&id);
        inner.rsvps.retain(|(event, _), _| *event != id);
        inner.reviews.retain(|(event, _), _| *event != id);
        Ok(())
    }
}

#[async_trait]
impl RsvpRepository for FixtureStore {
    async fn find(&self, event: EventId, user: UserId) -> Result<Option<Rsvp>, RepositoryError> {
        let inner = self.lock()?;
        Ok(inner.rsvps.get(&(event, user)).cloned())
    }

    async fn create(&self, rsvp: &Rsvp) -> Result<(), RepositoryError> {
        let mut inner = self.lock()?;
        let key = (rsvp.event, rsvp.user);
        if inner.rsvps.contains_key(&key) {
            return Err(RepositoryError::duplicate("rsvps_event_id_user_id_key"));
        }
        inner.rsvps.insert(key, rsvp.clone());
        Ok(())
    }

    async fn set_status(
        &self,
        event: EventId,
        user: UserId,
        status: RsvpStatus,
        now: DateTime<Utc>,
    ) -> Result<Option<Rsvp>, RepositoryError> {
        let mut inner = self.lock()?;
        Ok(inner.rsvps.get_mut(&(event, user)).map(|rsvp| {
            rsvp.status = status;
            rsvp.updated_at = now;
            rsvp.clone()
        }))
    }
}

#[async_trait]
impl ReviewRepository for FixtureStore {
    async fn list_for_event(&self, event: EventId) -> Result<Vec<Review>, RepositoryError> {
        let inner = self.lock()?;
        let mut reviews: Vec<Review> = inner
            .reviews
            .values()
            .filter(|review| review.event == event)
            .cloned()
            .collect();
        reviews.sort_by_key(|review| std::cmp::Reverse(review.created_at));
        Ok(reviews)
    }

    async fn exists(&self, event: EventId, user: UserId) -> Result<bool, RepositoryError> {
        let inner = self.lock()?;
        Ok(inner.reviews.contains_key(&(event, user)))
    }

    async fn create(&self, review: &Review) -> Result<(), RepositoryError> {
        let mut inner = self.lock()?;
        let key = (review.event, review.user);
        if inner.reviews.contains_key(&key) {
            return Err(RepositoryError::duplicate("reviews_event_id_user_id_key"));
        }
        inner.reviews.insert(key, review.clone());
        Ok(())
    }
}

#[async_trait]
impl UserRepository for FixtureStore {
    async fn find(&self, id: UserId) -> Result<Option<User>, RepositoryError> {
        let inner = self.lock()?;
        Ok(inner.users.get(&id).cloned())
    }

    async fn upsert(&self, user: &User) -> Result<(), RepositoryError> {
        let mut inner = self.lock()?;
        inner.users.insert(user.id, user.clone());
        Ok(())
    }

    async fn find_profile(&self, id: UserId) -> Result<Option<UserProfile>, RepositoryError> {
        let inner = self.lock()?;
        Ok(inner.profiles.get(&id).cloned())
    }

    async fn upsert_profile(&self, profile: &UserProfile) -> Result<(), RepositoryError> {
        let mut inner = self.lock()?;
        if !inner.users.contains_key(&profile.user_id) {
            return Err(RepositoryError::query("user record missing"));
        }
        inner.profiles.insert(profile.user_id, profile.clone());
        Ok(())
    }
}

#[async_trait]
impl LoginService for FixtureStore {
    async fn authenticate(&self, credentials: &LoginCredentials) -> Result<User, LoginError> {
        let inner = self.inner.lock().map_err(|_| LoginError::Unavailable {
            message: "fixture store lock poisoned".into(),
        })?;
        inner
            .users
            .values()
            .find(|user| user.username == credentials.username)
            .filter(|user| {
                inner
                    .passwords
                    .get(&user.id)
                    .is_some_and(|stored| *stored == credentials.password)
            })
            .cloned()
            .ok_or(LoginError::InvalidCredentials)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn ts(hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2030, 1, 1, hour, 0, 0).single().expect("valid time")
    }

    fn event_for(organizer: UserId, title: &str, is_public: bool) -> Event {
        Event {
            id: EventId::random(),
            title: title.into(),
            description: String::new(),
            organizer,
            location: "Library".into(),
            start_time: ts(10),
            end_time: ts(12),
            is_public,
            invited_users: Vec::new(),
            created_at: ts(1),
            updated_at: ts(1),
        }
    }

    #[tokio::test]
    async fn duplicate_rsvp_is_rejected_by_the_store() {
        let store = FixtureStore::new();
        let user = store.seed_user(Username::new("ada").expect("valid"), "ada@example.com", "pw");
        let event = event_for(user.id, "Reading group", true);
        EventRepository::create(&store, &event).await.expect("event stored");

        let rsvp = Rsvp {
            id: uuid::Uuid::new_v4(),
            event: event.id,
            user: user.id,
            status: RsvpStatus::Going,
            created_at: ts(2),
            updated_at: ts(2),
        };
        RsvpRepository::create(&store, &rsvp).await.expect("first insert");
        let err = RsvpRepository::create(&store, &rsvp)
            .await
            .expect_err("second insert must fail");
        assert!(matches!(err, RepositoryError::Duplicate { .. }));
    }

    #[tokio::test]
    async fn deleting_an_event_cascades() {
        let store = FixtureStore::new();
        let user = store.seed_user(Username::new("ada").expect("valid"), "ada@example.com", "pw");
        let event = event_for(user.id, "Reading group", true);
        EventRepository::create(&store, &event).await.expect("event stored");
        RsvpRepository::create(
            &store,
            &Rsvp {
                id: uuid::Uuid::new_v4(),
                event: event.id,
                user: user.id,
                status: RsvpStatus::Going,
                created_at: ts(2),
                updated_at: ts(2),
            },
        )
        .await
        .expect("rsvp stored");

        EventRepository::delete(&store, event.id).await.expect("deleted");
        assert!(RsvpRepository::find(&store, event.id, user.id)
            .await
            .expect("lookup works")
            .is_none());
    }

    #[tokio::test]
    async fn login_resolves_seeded_credentials() {
        let store = FixtureStore::new();
        let user = store.seed_user(Username::new("ada").expect("valid"), "ada@example.com", "pw");
        let ok = store
            .authenticate(&LoginCredentials {
                username: user.username.clone(),
                password: "pw".into(),
            })
            .await
            .expect("valid credentials");
        assert_eq!(ok.id, user.id);

        let err = store
            .authenticate(&LoginCredentials {
                username: user.username.clone(),
                password: "wrong".into(),
            })
            .await
            .expect_err("wrong password");
        assert_eq!(err, LoginError::InvalidCredentials);
    }
}
