//! HTTP inbound adapter exposing the REST endpoints.

pub mod error;
pub mod events;
pub mod health;
pub mod reviews;
pub mod rsvps;
pub mod schemas;
pub mod session;
pub mod state;
#[cfg(any(test, feature = "test-support"))]
pub mod test_utils;
pub mod users;
pub mod validation;

pub use error::ApiResult;

use actix_web::web;

/// Register every versioned API handler on the given scope.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(users::login)
        .service(users::logout)
        .service(users::current_user)
        .service(users::get_profile)
        .service(users::put_profile)
        .service(events::list_events)
        .service(events::create_event)
        .service(events::get_event)
        .service(events::update_event)
        .service(events::delete_event)
        .service(rsvps::create_rsvp)
        .service(rsvps::update_rsvp)
        .service(reviews::list_reviews)
        .service(reviews::create_review);
}
