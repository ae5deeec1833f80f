//! Event HTTP handlers.
//!
//! ```text
//! GET    /api/v1/events
//! POST   /api/v1/events
//! GET    /api/v1/events/{id}
//! PUT    /api/v1/events/{id}
//! PATCH  /api/v1/events/{id}
//! DELETE /api/v1/events/{id}
//! ```

use actix_web::{HttpResponse, delete, get, post, route, web};
use serde::{Deserialize, Serialize};
use serde_json::json;
use utoipa::{IntoParams, ToSchema};

use crate::domain::ports::{EventDetails, EventFilter};
use crate::domain::{Error, EventDraft, EventId, EventPatch, UserId};
use crate::inbound::http::ApiResult;
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::users::ProfileResponse;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{
    FieldName, missing_field_error, parse_optional_rfc3339_timestamp, parse_ordering,
    parse_rfc3339_timestamp, parse_uuid, parse_uuid_list,
};

/// Request payload for creating or updating an event.
///
/// Every field is optional at the wire level; creation enforces the required
/// subset so that missing-field errors name the field instead of surfacing as
/// a deserialisation failure.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EventRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub location: Option<String>,
    /// RFC 3339 timestamp.
    pub start_time: Option<String>,
    /// RFC 3339 timestamp, strictly after `startTime`.
    pub end_time: Option<String>,
    pub is_public: Option<bool>,
    /// Replaces the invite set wholesale when present.
    pub invited_users: Option<Vec<String>>,
}

/// Organizer identity nested in an event response.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrganizerResponse {
    pub id: String,
    pub username: String,
    pub email: String,
    /// `null` until the organizer stores a profile.
    pub profile: Option<ProfileResponse>,
}

/// Response payload for a single event.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EventResponse {
    pub id: String,
    pub title: String,
    pub description: String,
    pub organizer: OrganizerResponse,
    pub location: String,
    pub start_time: String,
    pub end_time: String,
    pub is_public: bool,
    pub invited_users: Vec<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl From<EventDetails> for EventResponse {
    fn from(value: EventDetails) -> Self {
        let event = value.event;
        let organizer = OrganizerResponse {
            id: value.organizer.id.to_string(),
            username: value.organizer.username.as_str().to_owned(),
            email: value.organizer.email,
            profile: value.organizer_profile.map(Into::into),
        };
        Self {
            id: event.id.to_string(),
            title: event.title,
            description: event.description,
            organizer,
            location: event.location,
            start_time: event.start_time.to_rfc3339(),
            end_time: event.end_time.to_rfc3339(),
            is_public: event.is_public,
            invited_users: event
                .invited_users
                .into_iter()
                .map(|id| id.to_string())
                .collect(),
            created_at: event.created_at.to_rfc3339(),
            updated_at: event.updated_at.to_rfc3339(),
        }
    }
}

/// Query parameters accepted when listing events.
#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct EventListQuery {
    /// Exact match on the event location.
    pub location: Option<String>,
    /// `true` or `false`.
    pub is_public: Option<String>,
    /// Organizer user id.
    pub organizer: Option<String>,
    /// Case-insensitive substring over title, location, description, and
    /// organizer username.
    pub search: Option<String>,
    /// One of `start_time`, `-start_time`, `created_at`, `-created_at`.
    pub ordering: Option<String>,
}

fn parse_is_public(value: &str) -> Result<bool, Error> {
    match value {
        "true" => Ok(true),
        "false" => Ok(false),
        other => Err(
            Error::invalid_request("is_public must be true or false").with_details(json!({
                "field": "is_public",
                "value": other,
                "code": "invalid_choice",
            })),
        ),
    }
}

fn parse_filter(query: EventListQuery) -> Result<EventFilter, Error> {
    Ok(EventFilter {
        location: query.location,
        is_public: query.is_public.as_deref().map(parse_is_public).transpose()?,
        organizer: query
            .organizer
            .as_deref()
            .map(|raw| parse_uuid(raw, FieldName::new("organizer")))
            .transpose()?
            .map(UserId::from_uuid),
        search: query.search,
        ordering: parse_ordering(query.ordering.as_deref(), FieldName::new("ordering"))?,
    })
}

fn parse_draft(payload: EventRequest) -> Result<EventDraft, Error> {
    let title = payload
        .title
        .ok_or_else(|| missing_field_error(FieldName::new("title")))?;
    let start_time = payload
        .start_time
        .ok_or_else(|| missing_field_error(FieldName::new("startTime")))?;
    let end_time = payload
        .end_time
        .ok_or_else(|| missing_field_error(FieldName::new("endTime")))?;
    let invited_users = payload.invited_users.unwrap_or_default();
    Ok(EventDraft {
        title,
        description: payload.description.unwrap_or_default(),
        location: payload.location.unwrap_or_default(),
        start_time: parse_rfc3339_timestamp(&start_time, FieldName::new("startTime"))?,
        end_time: parse_rfc3339_timestamp(&end_time, FieldName::new("endTime"))?,
        is_public: payload.is_public.unwrap_or(true),
        invited_users: parse_uuid_list(&invited_users, FieldName::new("invitedUsers"))?
            .into_iter()
            .map(UserId::from_uuid)
            .collect(),
    })
}

fn parse_patch(payload: EventRequest) -> Result<EventPatch, Error> {
    Ok(EventPatch {
        title: payload.title,
        description: payload.description,
        location: payload.location,
        start_time: parse_optional_rfc3339_timestamp(
            payload.start_time.as_deref(),
            FieldName::new("startTime"),
        )?,
        end_time: parse_optional_rfc3339_timestamp(
            payload.end_time.as_deref(),
            FieldName::new("endTime"),
        )?,
        is_public: payload.is_public,
        invited_users: payload
            .invited_users
            .map(|ids| parse_uuid_list(&ids, FieldName::new("invitedUsers")))
            .transpose()?
            .map(|ids| ids.into_iter().map(UserId::from_uuid).collect()),
    })
}

fn parse_event_id(raw: &str) -> Result<EventId, Error> {
    parse_uuid(raw, FieldName::new("id")).map(EventId::from_uuid)
}

/// List the events visible to the caller.
#[utoipa::path(
    get,
    path = "/api/v1/events",
    params(EventListQuery),
    responses(
        (status = 200, description = "Visible events", body = [EventResponse]),
        (status = 400, description = "Invalid filter", body = ErrorSchema),
        (status = 503, description = "Service unavailable", body = ErrorSchema)
    ),
    tags = ["events"],
    operation_id = "listEvents"
)]
#[get("/events")]
pub async fn list_events(
    state: web::Data<HttpState>,
    session: SessionContext,
    query: web::Query<EventListQuery>,
) -> ApiResult<web::Json<Vec<EventResponse>>> {
    let caller = session.user_id()?;
    let filter = parse_filter(query.into_inner())?;
    let events = state.events_query.list_events(caller, filter).await?;
    Ok(web::Json(events.into_iter().map(Into::into).collect()))
}

/// Create an event; the caller becomes its organizer.
#[utoipa::path(
    post,
    path = "/api/v1/events",
    request_body = EventRequest,
    responses(
        (status = 201, description = "Event created", body = EventResponse),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema)
    ),
    tags = ["events"],
    operation_id = "createEvent"
)]
#[post("/events")]
pub async fn create_event(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<EventRequest>,
) -> ApiResult<HttpResponse> {
    let caller = session.require_user_id()?;
    let draft = parse_draft(payload.into_inner())?;
    let created = state.events_command.create_event(caller, draft).await?;
    Ok(HttpResponse::Created().json(EventResponse::from(created)))
}

/// Retrieve one event, subject to the visibility rule.
#[utoipa::path(
    get,
    path = "/api/v1/events/{id}",
    params(("id" = String, Path, description = "Event id")),
    responses(
        (status = 200, description = "The event", body = EventResponse),
        (status = 403, description = "Not visible to the caller", body = ErrorSchema),
        (status = 404, description = "Unknown event", body = ErrorSchema)
    ),
    tags = ["events"],
    operation_id = "getEvent"
)]
#[get("/events/{id}")]
pub async fn get_event(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<web::Json<EventResponse>> {
    let caller = session.user_id()?;
    let id = parse_event_id(&path.into_inner())?;
    let details = state.events_query.get_event(caller, id).await?;
    Ok(web::Json(details.into()))
}

/// Merge a partial update onto an event; organizer only.
///
/// `PUT` and `PATCH` behave identically: absent fields keep their stored
/// values and the merged record is re-validated before persisting.
#[utoipa::path(
    patch,
    path = "/api/v1/events/{id}",
    request_body = EventRequest,
    params(("id" = String, Path, description = "Event id")),
    responses(
        (status = 200, description = "Updated event", body = EventResponse),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 403, description = "Caller is not the organizer", body = ErrorSchema),
        (status = 404, description = "Unknown event", body = ErrorSchema)
    ),
    tags = ["events"],
    operation_id = "updateEvent"
)]
#[route("/events/{id}", method = "PUT", method = "PATCH")]
pub async fn update_event(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
    payload: web::Json<EventRequest>,
) -> ApiResult<web::Json<EventResponse>> {
    let caller = session.require_user_id()?;
    let id = parse_event_id(&path.into_inner())?;
    let patch = parse_patch(payload.into_inner())?;
    let updated = state.events_command.update_event(caller, id, patch).await?;
    Ok(web::Json(updated.into()))
}

/// Delete an event; organizer only. RSVPs, reviews, and invites cascade.
#[utoipa::path(
    delete,
    path = "/api/v1/events/{id}",
    params(("id" = String, Path, description = "Event id")),
    responses(
        (status = 204, description = "Event deleted"),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 403, description = "Caller is not the organizer", body = ErrorSchema),
        (status = 404, description = "Unknown event", body = ErrorSchema)
    ),
    tags = ["events"],
    operation_id = "deleteEvent"
)]
#[delete("/events/{id}")]
pub async fn delete_event(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let caller = session.require_user_id()?;
    let id = parse_event_id(&path.into_inner())?;
    state.events_command.delete_event(caller, id).await?;
    Ok(HttpResponse::NoContent().finish())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Username;
    use crate::domain::ports::fixtures::FixtureStore;
    use crate::inbound::http::test_utils::{fixture_app, login_cookie};
    use actix_web::http::StatusCode;
    use actix_web::test as actix_test;
    use serde_json::Value;

    fn store_with_user(username: &str) -> FixtureStore {
        let store = FixtureStore::new();
        store.seed_user(
            Username::try_from(username.to_owned()).expect("valid username"),
            format!("{username}@example.net"),
            "password",
        );
        store
    }

    fn event_payload(title: &str) -> Value {
        serde_json::json!({
            "title": title,
            "description": "Bring your own deck",
            "location": "Town hall",
            "startTime": "2030-05-01T18:00:00Z",
            "endTime": "2030-05-01T21:00:00Z",
            "isPublic": true,
        })
    }

    #[actix_web::test]
    async fn create_then_fetch_round_trips() {
        let store = store_with_user("ada");
        let app = actix_test::init_service(fixture_app(&store)).await;
        let cookie = login_cookie(&app, "ada", "password").await;

        let create = actix_test::TestRequest::post()
            .uri("/api/v1/events")
            .cookie(cookie.clone())
            .set_json(event_payload("Board games"))
            .to_request();
        let created = actix_test::call_service(&app, create).await;
        assert_eq!(created.status(), StatusCode::CREATED);
        let created: EventResponse = actix_test::read_body_json(created).await;
        assert_eq!(created.title, "Board games");
        assert_eq!(created.organizer.username, "ada");

        let fetch = actix_test::TestRequest::get()
            .uri(&format!("/api/v1/events/{}", created.id))
            .cookie(cookie)
            .to_request();
        let fetched = actix_test::call_service(&app, fetch).await;
        assert_eq!(fetched.status(), StatusCode::OK);
        let fetched: EventResponse = actix_test::read_body_json(fetched).await;
        assert_eq!(fetched.id, created.id);
    }

    #[actix_web::test]
    async fn event_response_nests_the_organizer_identity() {
        let store = store_with_user("ada");
        let app = actix_test::init_service(fixture_app(&store)).await;
        let cookie = login_cookie(&app, "ada", "password").await;

        let me = actix_test::TestRequest::get()
            .uri("/api/v1/me")
            .cookie(cookie.clone())
            .to_request();
        let me: Value = actix_test::read_body_json(actix_test::call_service(&app, me).await).await;
        let ada_id = me["id"].as_str().expect("user id");

        let put = actix_test::TestRequest::put()
            .uri(&format!("/api/v1/profiles/{ada_id}"))
            .cookie(cookie.clone())
            .set_json(serde_json::json!({ "fullName": "Ada Lovelace" }))
            .to_request();
        assert_eq!(
            actix_test::call_service(&app, put).await.status(),
            StatusCode::OK
        );

        let create = actix_test::TestRequest::post()
            .uri("/api/v1/events")
            .cookie(cookie)
            .set_json(event_payload("Board games"))
            .to_request();
        let created: EventResponse =
            actix_test::read_body_json(actix_test::call_service(&app, create).await).await;
        assert_eq!(created.organizer.id, ada_id);
        assert_eq!(created.organizer.username, "ada");
        assert_eq!(created.organizer.email, "ada@example.net");
        let profile = created.organizer.profile.expect("organizer profile");
        assert_eq!(profile.full_name, "Ada Lovelace");
    }

    #[actix_web::test]
    async fn create_requires_a_session() {
        let store = store_with_user("ada");
        let app = actix_test::init_service(fixture_app(&store)).await;

        let request = actix_test::TestRequest::post()
            .uri("/api/v1/events")
            .set_json(event_payload("Board games"))
            .to_request();
        let response = actix_test::call_service(&app, request).await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[actix_web::test]
    async fn create_reports_missing_fields_by_name() {
        let store = store_with_user("ada");
        let app = actix_test::init_service(fixture_app(&store)).await;
        let cookie = login_cookie(&app, "ada", "password").await;

        let request = actix_test::TestRequest::post()
            .uri("/api/v1/events")
            .cookie(cookie)
            .set_json(serde_json::json!({ "title": "No times" }))
            .to_request();
        let response = actix_test::call_service(&app, request).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body: Value = actix_test::read_body_json(response).await;
        assert_eq!(body["details"]["field"], "startTime");
        assert_eq!(body["details"]["code"], "missing_field");
    }

    #[actix_web::test]
    async fn unknown_invited_user_is_a_bad_request() {
        let store = store_with_user("ada");
        let app = actix_test::init_service(fixture_app(&store)).await;
        let cookie = login_cookie(&app, "ada", "password").await;

        let mut payload = event_payload("Phantom guests");
        payload["invitedUsers"] =
            serde_json::json!([uuid::Uuid::new_v4().to_string()]);
        let request = actix_test::TestRequest::post()
            .uri("/api/v1/events")
            .cookie(cookie)
            .set_json(payload)
            .to_request();
        let response = actix_test::call_service(&app, request).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body: Value = actix_test::read_body_json(response).await;
        assert_eq!(body["code"], "invalid_request");
        assert_eq!(body["details"]["field"], "invitedUsers");
        assert_eq!(body["details"]["code"], "unknown_user");
    }

    #[actix_web::test]
    async fn inverted_interval_is_a_bad_request() {
        let store = store_with_user("ada");
        let app = actix_test::init_service(fixture_app(&store)).await;
        let cookie = login_cookie(&app, "ada", "password").await;

        let mut payload = event_payload("Backwards");
        payload["endTime"] = Value::String("2030-05-01T17:00:00Z".into());
        let request = actix_test::TestRequest::post()
            .uri("/api/v1/events")
            .cookie(cookie)
            .set_json(payload)
            .to_request();
        let response = actix_test::call_service(&app, request).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body: Value = actix_test::read_body_json(response).await;
        assert_eq!(body["code"], "invalid_request");
    }

    #[actix_web::test]
    async fn anonymous_listing_shows_public_events_only() {
        let store = store_with_user("ada");
        let app = actix_test::init_service(fixture_app(&store)).await;
        let cookie = login_cookie(&app, "ada", "password").await;

        for (title, public) in [("Open mic", true), ("Closed door", false)] {
            let mut payload = event_payload(title);
            payload["isPublic"] = Value::Bool(public);
            let request = actix_test::TestRequest::post()
                .uri("/api/v1/events")
                .cookie(cookie.clone())
                .set_json(payload)
                .to_request();
            let response = actix_test::call_service(&app, request).await;
            assert_eq!(response.status(), StatusCode::CREATED);
        }

        let request = actix_test::TestRequest::get()
            .uri("/api/v1/events")
            .to_request();
        let response = actix_test::call_service(&app, request).await;
        assert_eq!(response.status(), StatusCode::OK);
        let events: Vec<EventResponse> = actix_test::read_body_json(response).await;
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].title, "Open mic");
    }

    #[actix_web::test]
    async fn unknown_ordering_is_rejected() {
        let store = store_with_user("ada");
        let app = actix_test::init_service(fixture_app(&store)).await;

        let request = actix_test::TestRequest::get()
            .uri("/api/v1/events?ordering=updated_at")
            .to_request();
        let response = actix_test::call_service(&app, request).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[actix_web::test]
    async fn non_organizer_update_is_forbidden() {
        let store = store_with_user("ada");
        store.seed_user(
            Username::try_from("ben".to_owned()).expect("valid username"),
            "ben@example.net",
            "password",
        );
        let app = actix_test::init_service(fixture_app(&store)).await;
        let ada = login_cookie(&app, "ada", "password").await;
        let ben = login_cookie(&app, "ben", "password").await;

        let create = actix_test::TestRequest::post()
            .uri("/api/v1/events")
            .cookie(ada)
            .set_json(event_payload("Ada's event"))
            .to_request();
        let created: EventResponse =
            actix_test::read_body_json(actix_test::call_service(&app, create).await).await;

        let update = actix_test::TestRequest::patch()
            .uri(&format!("/api/v1/events/{}", created.id))
            .cookie(ben)
            .set_json(serde_json::json!({ "title": "Hijacked" }))
            .to_request();
        let response = actix_test::call_service(&app, update).await;
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[actix_web::test]
    async fn delete_returns_no_content() {
        let store = store_with_user("ada");
        let app = actix_test::init_service(fixture_app(&store)).await;
        let cookie = login_cookie(&app, "ada", "password").await;

        let create = actix_test::TestRequest::post()
            .uri("/api/v1/events")
            .cookie(cookie.clone())
            .set_json(event_payload("Short lived"))
            .to_request();
        let created: EventResponse =
            actix_test::read_body_json(actix_test::call_service(&app, create).await).await;

        let delete = actix_test::TestRequest::delete()
            .uri(&format!("/api/v1/events/{}", created.id))
            .cookie(cookie.clone())
            .to_request();
        let response = actix_test::call_service(&app, delete).await;
        assert_eq!(response.status(), StatusCode::NO_CONTENT);

        let fetch = actix_test::TestRequest::get()
            .uri(&format!("/api/v1/events/{}", created.id))
            .cookie(cookie)
            .to_request();
        let response = actix_test::call_service(&app, fetch).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[actix_web::test]
    async fn malformed_event_id_is_a_bad_request() {
        let store = store_with_user("ada");
        let app = actix_test::init_service(fixture_app(&store)).await;

        let request = actix_test::TestRequest::get()
            .uri("/api/v1/events/not-a-uuid")
            .to_request();
        let response = actix_test::call_service(&app, request).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
