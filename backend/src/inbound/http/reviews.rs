//! Review HTTP handlers.
//!
//! ```text
//! GET  /api/v1/events/{event_id}/reviews
//! POST /api/v1/events/{event_id}/reviews
//! ```

use actix_web::{HttpResponse, get, post, web};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{EventId, Review};
use crate::inbound::http::ApiResult;
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{
    FieldName, missing_field_error, parse_rating, parse_uuid,
};

/// Request payload for leaving a review.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct ReviewRequest {
    /// Integer rating between 1 and 5 inclusive.
    pub rating: Option<i16>,
    pub comment: Option<String>,
}

/// Response payload for a review.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReviewResponse {
    pub id: String,
    pub event: String,
    pub user: String,
    pub rating: i16,
    pub comment: String,
    pub created_at: String,
}

impl From<Review> for ReviewResponse {
    fn from(value: Review) -> Self {
        Self {
            id: value.id.to_string(),
            event: value.event.to_string(),
            user: value.user.to_string(),
            rating: value.rating.get(),
            comment: value.comment,
            created_at: value.created_at.to_rfc3339(),
        }
    }
}

fn parse_event_id(raw: &str) -> Result<EventId, crate::domain::Error> {
    parse_uuid(raw, FieldName::new("event_id")).map(EventId::from_uuid)
}

/// List reviews for an event the caller can see, most recent first.
#[utoipa::path(
    get,
    path = "/api/v1/events/{event_id}/reviews",
    params(("event_id" = String, Path, description = "Event id")),
    responses(
        (status = 200, description = "Reviews, newest first", body = [ReviewResponse]),
        (status = 403, description = "Event not visible to the caller", body = ErrorSchema),
        (status = 404, description = "Unknown event", body = ErrorSchema)
    ),
    tags = ["reviews"],
    operation_id = "listReviews"
)]
#[get("/events/{event_id}/reviews")]
pub async fn list_reviews(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<web::Json<Vec<ReviewResponse>>> {
    let caller = session.user_id()?;
    let event = parse_event_id(&path.into_inner())?;
    let reviews = state.reviews_query.list_reviews(caller, event).await?;
    Ok(web::Json(reviews.into_iter().map(Into::into).collect()))
}

/// Leave a one-off review on an event the caller can see.
#[utoipa::path(
    post,
    path = "/api/v1/events/{event_id}/reviews",
    request_body = ReviewRequest,
    params(("event_id" = String, Path, description = "Event id")),
    responses(
        (status = 201, description = "Review recorded", body = ReviewResponse),
        (status = 400, description = "Invalid rating", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 403, description = "Already reviewed or event not visible", body = ErrorSchema),
        (status = 404, description = "Unknown event", body = ErrorSchema)
    ),
    tags = ["reviews"],
    operation_id = "createReview"
)]
#[post("/events/{event_id}/reviews")]
pub async fn create_review(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
    payload: web::Json<ReviewRequest>,
) -> ApiResult<HttpResponse> {
    let caller = session.require_user_id()?;
    let event = parse_event_id(&path.into_inner())?;
    let payload = payload.into_inner();
    let rating = payload
        .rating
        .ok_or_else(|| missing_field_error(FieldName::new("rating")))?;
    let rating = parse_rating(rating, FieldName::new("rating"))?;
    let review = state
        .reviews_command
        .create_review(caller, event, rating, payload.comment.unwrap_or_default())
        .await?;
    Ok(HttpResponse::Created().json(ReviewResponse::from(review)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Username;
    use crate::domain::ports::fixtures::FixtureStore;
    use crate::inbound::http::events::EventResponse;
    use crate::inbound::http::test_utils::{fixture_app, login_cookie};
    use actix_web::cookie::Cookie;
    use actix_web::http::StatusCode;
    use actix_web::test as actix_test;
    use serde_json::{Value, json};

    struct Setup<S> {
        app: S,
        ada: Cookie<'static>,
        ben: Cookie<'static>,
        event_id: String,
    }

    async fn setup(
        public: bool,
    ) -> Setup<
        impl actix_web::dev::Service<
            actix_http::Request,
            Response = actix_web::dev::ServiceResponse,
            Error = actix_web::Error,
        >,
    > {
        let store = FixtureStore::new();
        store.seed_user(
            Username::try_from("ada".to_owned()).expect("valid username"),
            "ada@example.net",
            "password",
        );
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
            .cookie(ada.clone())
            .set_json(json!({
                "title": "Gallery opening",
                "startTime": "2030-05-01T18:00:00Z",
                "endTime": "2030-05-01T21:00:00Z",
                "isPublic": public,
            }))
            .to_request();
        let event: EventResponse =
            actix_test::read_body_json(actix_test::call_service(&app, create).await).await;
        Setup {
            app,
            ada,
            ben,
            event_id: event.id,
        }
    }

    #[actix_web::test]
    async fn review_round_trips_and_lists_newest_first() {
        let s = setup(true).await;

        for (cookie, rating, comment) in
            [(&s.ada, 4, "Good coffee"), (&s.ben, 5, "Great art")]
        {
            let request = actix_test::TestRequest::post()
                .uri(&format!("/api/v1/events/{}/reviews", s.event_id))
                .cookie((*cookie).clone())
                .set_json(json!({ "rating": rating, "comment": comment }))
                .to_request();
            let response = actix_test::call_service(&s.app, request).await;
            assert_eq!(response.status(), StatusCode::CREATED);
        }

        let request = actix_test::TestRequest::get()
            .uri(&format!("/api/v1/events/{}/reviews", s.event_id))
            .to_request();
        let response = actix_test::call_service(&s.app, request).await;
        assert_eq!(response.status(), StatusCode::OK);
        let reviews: Vec<ReviewResponse> = actix_test::read_body_json(response).await;
        assert_eq!(reviews.len(), 2);
        assert_eq!(reviews[0].comment, "Great art");
        assert_eq!(reviews[1].comment, "Good coffee");
    }

    #[actix_web::test]
    async fn second_review_is_forbidden() {
        let s = setup(true).await;

        for expected in [StatusCode::CREATED, StatusCode::FORBIDDEN] {
            let request = actix_test::TestRequest::post()
                .uri(&format!("/api/v1/events/{}/reviews", s.event_id))
                .cookie(s.ada.clone())
                .set_json(json!({ "rating": 3, "comment": "fine" }))
                .to_request();
            let response = actix_test::call_service(&s.app, request).await;
            assert_eq!(response.status(), expected);
            if expected == StatusCode::FORBIDDEN {
                let body: Value = actix_test::read_body_json(response).await;
                assert_eq!(
                    body["message"],
                    "You have already reviewed this event."
                );
            }
        }
    }

    #[actix_web::test]
    async fn out_of_range_rating_is_a_bad_request() {
        let s = setup(true).await;

        let request = actix_test::TestRequest::post()
            .uri(&format!("/api/v1/events/{}/reviews", s.event_id))
            .cookie(s.ada)
            .set_json(json!({ "rating": 6, "comment": "too good" }))
            .to_request();
        let response = actix_test::call_service(&s.app, request).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body: Value = actix_test::read_body_json(response).await;
        assert_eq!(body["details"]["field"], "rating");
    }

    #[actix_web::test]
    async fn private_event_reviews_are_hidden_from_outsiders() {
        let s = setup(false).await;

        let request = actix_test::TestRequest::get()
            .uri(&format!("/api/v1/events/{}/reviews", s.event_id))
            .cookie(s.ben)
            .to_request();
        let response = actix_test::call_service(&s.app, request).await;
        assert_eq!(response.status(), StatusCode::FORBIDDEN);

        let request = actix_test::TestRequest::get()
            .uri(&format!("/api/v1/events/{}/reviews", s.event_id))
            .cookie(s.ada)
            .to_request();
        let response = actix_test::call_service(&s.app, request).await;
        assert_eq!(response.status(), StatusCode::OK);
    }
}
