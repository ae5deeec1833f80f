//! RSVP HTTP handlers.
//!
//! ```text
//! POST  /api/v1/events/{event_id}/rsvp
//! PATCH /api/v1/events/{event_id}/rsvp/{user_id}
//! ```

use actix_web::{HttpResponse, patch, post, web};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{EventId, Rsvp, RsvpStatus, UserId};
use crate::inbound::http::ApiResult;
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{
    FieldName, missing_field_error, parse_rsvp_status, parse_uuid,
};

/// Request payload for creating an RSVP.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
pub struct CreateRsvpRequest {
    /// One of `Going`, `Maybe`, `Not Going`; defaults to `Going`.
    pub status: Option<String>,
}

/// Request payload for updating an RSVP's status.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct UpdateRsvpRequest {
    /// One of `Going`, `Maybe`, `Not Going`.
    pub status: Option<String>,
}

/// Response payload for an RSVP.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RsvpResponse {
    pub id: String,
    pub event: String,
    pub user: String,
    pub status: String,
    pub created_at: String,
    pub updated_at: String,
}

impl From<Rsvp> for RsvpResponse {
    fn from(value: Rsvp) -> Self {
        Self {
            id: value.id.to_string(),
            event: value.event.to_string(),
            user: value.user.to_string(),
            status: value.status.as_str().to_owned(),
            created_at: value.created_at.to_rfc3339(),
            updated_at: value.updated_at.to_rfc3339(),
        }
    }
}

fn parse_event_id(raw: &str) -> Result<EventId, crate::domain::Error> {
    parse_uuid(raw, FieldName::new("event_id")).map(EventId::from_uuid)
}

/// Record the caller's attendance intention for an event.
///
/// One RSVP per user per event; a second attempt is rejected even when two
/// requests race, because the storage layer enforces the uniqueness.
#[utoipa::path(
    post,
    path = "/api/v1/events/{event_id}/rsvp",
    request_body = CreateRsvpRequest,
    params(("event_id" = String, Path, description = "Event id")),
    responses(
        (status = 201, description = "RSVP recorded", body = RsvpResponse),
        (status = 400, description = "Invalid status", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 403, description = "Already RSVPed", body = ErrorSchema),
        (status = 404, description = "Unknown event", body = ErrorSchema)
    ),
    tags = ["rsvps"],
    operation_id = "createRsvp"
)]
#[post("/events/{event_id}/rsvp")]
pub async fn create_rsvp(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
    payload: web::Json<CreateRsvpRequest>,
) -> ApiResult<HttpResponse> {
    let caller = session.require_user_id()?;
    let event = parse_event_id(&path.into_inner())?;
    let status = payload
        .into_inner()
        .status
        .as_deref()
        .map(|raw| parse_rsvp_status(raw, FieldName::new("status")))
        .transpose()?;
    let rsvp = state.rsvps.create_rsvp(caller, event, status).await?;
    Ok(HttpResponse::Created().json(RsvpResponse::from(rsvp)))
}

/// Change the status of an existing RSVP; owner only.
#[utoipa::path(
    patch,
    path = "/api/v1/events/{event_id}/rsvp/{user_id}",
    request_body = UpdateRsvpRequest,
    params(
        ("event_id" = String, Path, description = "Event id"),
        ("user_id" = String, Path, description = "RSVP owner's user id")
    ),
    responses(
        (status = 200, description = "Updated RSVP", body = RsvpResponse),
        (status = 400, description = "Invalid status", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 403, description = "Caller does not own the RSVP", body = ErrorSchema),
        (status = 404, description = "Unknown event, user, or RSVP", body = ErrorSchema)
    ),
    tags = ["rsvps"],
    operation_id = "updateRsvp"
)]
#[patch("/events/{event_id}/rsvp/{user_id}")]
pub async fn update_rsvp(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<(String, String)>,
    payload: web::Json<UpdateRsvpRequest>,
) -> ApiResult<web::Json<RsvpResponse>> {
    let caller = session.require_user_id()?;
    let (event_raw, user_raw) = path.into_inner();
    let event = parse_event_id(&event_raw)?;
    let user = parse_uuid(&user_raw, FieldName::new("user_id")).map(UserId::from_uuid)?;
    let status: RsvpStatus = payload
        .into_inner()
        .status
        .as_deref()
        .map(|raw| parse_rsvp_status(raw, FieldName::new("status")))
        .transpose()?
        .ok_or_else(|| missing_field_error(FieldName::new("status")))?;
    let rsvp = state.rsvps.update_rsvp(caller, event, user, status).await?;
    Ok(web::Json(rsvp.into()))
}
