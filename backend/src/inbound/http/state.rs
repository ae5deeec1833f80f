//! Shared HTTP adapter state.
//!
//! Handlers accept this state via `actix_web::web::Data` so they depend only
//! on the driving ports and stay testable without I/O.

use std::sync::Arc;

use crate::domain::ports::fixtures::FixtureStore;
use crate::domain::ports::{
    EventsCommand, EventsQuery, LoginService, ProfilesPort, ReviewsCommand, ReviewsQuery,
    RsvpCommand,
};
use crate::domain::{EventService, ProfileService};

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    pub login: Arc<dyn LoginService>,
    pub events_query: Arc<dyn EventsQuery>,
    pub events_command: Arc<dyn EventsCommand>,
    pub rsvps: Arc<dyn RsvpCommand>,
    pub reviews_query: Arc<dyn ReviewsQuery>,
    pub reviews_command: Arc<dyn ReviewsCommand>,
    pub profiles: Arc<dyn ProfilesPort>,
}

impl HttpState {
    /// Wire every port to one fixture store.
    ///
    /// Backs the no-database server mode and the HTTP test suites.
    pub fn with_fixture(store: &FixtureStore) -> Self {
        let events = Arc::new(EventService::with_fixture(store));
        Self {
            login: Arc::new(store.clone()),
            events_query: events.clone(),
            events_command: events.clone(),
            rsvps: events.clone(),
            reviews_query: events.clone(),
            reviews_command: events,
            profiles: Arc::new(ProfileService::with_fixture(store)),
        }
    }

    /// Wire the ports to the given service implementations.
    pub fn new(
        login: Arc<dyn LoginService>,
        events: Arc<EventService>,
        profiles: Arc<ProfileService>,
    ) -> Self {
        Self {
            login,
            events_query: events.clone(),
            events_command: events.clone(),
            rsvps: events.clone(),
            reviews_query: events.clone(),
            reviews_command: events,
            profiles,
        }
    }
}
