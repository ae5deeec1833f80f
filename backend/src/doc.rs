//! OpenAPI documentation configuration.
//!
//! Defines the [`ApiDoc`] struct generating the OpenAPI specification for the
//! REST API: every HTTP endpoint from the inbound layer, the request/response
//! DTOs, and the session cookie security scheme. The generated document backs
//! Swagger UI in debug builds.

use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::inbound::http::events::{EventRequest, EventResponse, OrganizerResponse};
use crate::inbound::http::reviews::{ReviewRequest, ReviewResponse};
use crate::inbound::http::rsvps::{CreateRsvpRequest, RsvpResponse, UpdateRsvpRequest};
use crate::inbound::http::schemas::{ErrorCodeSchema, ErrorSchema};
use crate::inbound::http::users::{
    LoginRequest, ProfileRequest, ProfileResponse, UserResponse,
};

/// Enrich the generated document with the session cookie security scheme.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);

        components.add_security_scheme(
            "SessionCookie",
            SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::with_description(
                "session",
                "Session cookie issued by POST /api/v1/login.",
            ))),
        );
    }
}

/// OpenAPI document for the REST API.
/// Swagger UI is enabled in debug builds only.
#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(
        title = "Event manager backend API",
        description = "HTTP interface for events, invitations, RSVPs, and reviews."
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    security(("SessionCookie" = [])),
    paths(
        crate::inbound::http::users::login,
        crate::inbound::http::users::logout,
        crate::inbound::http::users::current_user,
        crate::inbound::http::users::get_profile,
        crate::inbound::http::users::put_profile,
        crate::inbound::http::events::list_events,
        crate::inbound::http::events::create_event,
        crate::inbound::http::events::get_event,
        crate::inbound::http::events::update_event,
        crate::inbound::http::events::delete_event,
        crate::inbound::http::rsvps::create_rsvp,
        crate::inbound::http::rsvps::update_rsvp,
        crate::inbound::http::reviews::list_reviews,
        crate::inbound::http::reviews::create_review,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(
        ErrorSchema,
        ErrorCodeSchema,
        EventRequest,
        EventResponse,
        OrganizerResponse,
        CreateRsvpRequest,
        UpdateRsvpRequest,
        RsvpResponse,
        ReviewRequest,
        ReviewResponse,
        LoginRequest,
        UserResponse,
        ProfileRequest,
        ProfileResponse,
    )),
    tags(
        (name = "auth", description = "Session management"),
        (name = "profiles", description = "User profiles"),
        (name = "events", description = "Event CRUD and discovery"),
        (name = "rsvps", description = "Attendance intentions"),
        (name = "reviews", description = "Event reviews"),
        (name = "health", description = "Endpoints for health checks")
    )
)]
pub struct ApiDoc;
