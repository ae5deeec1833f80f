//! Session and profile HTTP handlers.
//!
//! ```text
//! POST /api/v1/login
//! POST /api/v1/logout
//! GET  /api/v1/me
//! GET  /api/v1/profiles/{user_id}
//! PUT  /api/v1/profiles/{user_id}
//! ```

use actix_web::{HttpResponse, get, post, put, web};
use serde::{Deserialize, Serialize};
use serde_json::json;
use utoipa::ToSchema;

use crate::domain::ports::{LoginCredentials, LoginError};
use crate::domain::{Error, User, UserId, UserProfile, Username};
use crate::inbound::http::ApiResult;
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{FieldName, parse_uuid};

/// Request payload for logging in.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Response payload describing the authenticated user.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UserResponse {
    pub id: String,
    pub username: String,
    pub email: String,
}

impl From<User> for UserResponse {
    fn from(value: User) -> Self {
        Self {
            id: value.id.to_string(),
            username: value.username.as_str().to_owned(),
            email: value.email,
        }
    }
}

/// Request payload for creating or replacing a profile.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProfileRequest {
    pub full_name: Option<String>,
    pub bio: Option<String>,
    pub location: Option<String>,
    pub profile_picture: Option<String>,
}

/// Response payload for a profile.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProfileResponse {
    pub user_id: String,
    pub full_name: String,
    pub bio: String,
    pub location: String,
    pub profile_picture: Option<String>,
}

impl From<UserProfile> for ProfileResponse {
    fn from(value: UserProfile) -> Self {
        Self {
            user_id: value.user_id.to_string(),
            full_name: value.full_name,
            bio: value.bio,
            location: value.location,
            profile_picture: value.profile_picture,
        }
    }
}

fn empty_credential_error(field: &'static str) -> Error {
    Error::invalid_request(format!("{field} must not be empty")).with_details(json!({
        "field": field,
        "code": format!("empty_{field}"),
    }))
}

fn parse_credentials(payload: LoginRequest) -> Result<LoginCredentials, Error> {
    let username = Username::new(payload.username.trim())
        .map_err(|_| empty_credential_error("username"))?;
    if payload.password.is_empty() {
        return Err(empty_credential_error("password"));
    }
    Ok(LoginCredentials {
        username,
        password: payload.password,
    })
}

fn map_login_error(error: LoginError) -> Error {
    match error {
        LoginError::InvalidCredentials => Error::unauthorized("Invalid credentials."),
        LoginError::Unavailable { message } => {
            Error::service_unavailable(format!("login backend unavailable: {message}"))
        }
    }
}

fn parse_user_id(raw: &str) -> Result<UserId, Error> {
    parse_uuid(raw, FieldName::new("user_id")).map(UserId::from_uuid)
}

/// Resolve credentials and persist the caller's identity in the session.
#[utoipa::path(
    post,
    path = "/api/v1/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Authenticated user", body = UserResponse),
        (status = 400, description = "Malformed credentials", body = ErrorSchema),
        (status = 401, description = "Invalid credentials", body = ErrorSchema),
        (status = 503, description = "Login backend unavailable", body = ErrorSchema)
    ),
    tags = ["auth"],
    operation_id = "login"
)]
#[post("/login")]
pub async fn login(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<LoginRequest>,
) -> ApiResult<web::Json<UserResponse>> {
    let credentials = parse_credentials(payload.into_inner())?;
    let user = state
        .login
        .authenticate(&credentials)
        .await
        .map_err(map_login_error)?;
    session.persist_user(user.id)?;
    Ok(web::Json(user.into()))
}

/// Clear the caller's session.
#[utoipa::path(
    post,
    path = "/api/v1/logout",
    responses((status = 204, description = "Session cleared")),
    tags = ["auth"],
    operation_id = "logout"
)]
#[post("/logout")]
pub async fn logout(session: SessionContext) -> HttpResponse {
    session.clear();
    HttpResponse::NoContent().finish()
}

/// The caller's own identity record.
#[utoipa::path(
    get,
    path = "/api/v1/me",
    responses(
        (status = 200, description = "Current user", body = UserResponse),
        (status = 401, description = "Unauthorised", body = ErrorSchema)
    ),
    tags = ["auth"],
    operation_id = "currentUser"
)]
#[get("/me")]
pub async fn current_user(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<UserResponse>> {
    let caller = session.require_user_id()?;
    let user = state.profiles.current_user(caller).await?;
    Ok(web::Json(user.into()))
}

/// Fetch a user's profile.
#[utoipa::path(
    get,
    path = "/api/v1/profiles/{user_id}",
    params(("user_id" = String, Path, description = "Profile owner's user id")),
    responses(
        (status = 200, description = "The profile", body = ProfileResponse),
        (status = 404, description = "Unknown profile", body = ErrorSchema)
    ),
    tags = ["profiles"],
    operation_id = "getProfile"
)]
#[get("/profiles/{user_id}")]
pub async fn get_profile(
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<web::Json<ProfileResponse>> {
    let user = parse_user_id(&path.into_inner())?;
    let profile = state.profiles.get_profile(user).await?;
    Ok(web::Json(profile.into()))
}

/// Create or replace a profile; owner only.
#[utoipa::path(
    put,
    path = "/api/v1/profiles/{user_id}",
    request_body = ProfileRequest,
    params(("user_id" = String, Path, description = "Profile owner's user id")),
    responses(
        (status = 200, description = "Stored profile", body = ProfileResponse),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 403, description = "Caller does not own the profile", body = ErrorSchema)
    ),
    tags = ["profiles"],
    operation_id = "putProfile"
)]
#[put("/profiles/{user_id}")]
pub async fn put_profile(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
    payload: web::Json<ProfileRequest>,
) -> ApiResult<web::Json<ProfileResponse>> {
    let caller = session.require_user_id()?;
    let user = parse_user_id(&path.into_inner())?;
    let payload = payload.into_inner();
    let profile = UserProfile {
        user_id: user,
        full_name: payload.full_name.unwrap_or_default(),
        bio: payload.bio.unwrap_or_default(),
        location: payload.location.unwrap_or_default(),
        profile_picture: payload.profile_picture,
    };
    let stored = state.profiles.put_profile(caller, profile).await?;
    Ok(web::Json(stored.into()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ports::fixtures::FixtureStore;
    use crate::inbound::http::test_utils::{fixture_app, login_cookie};
    use actix_web::http::StatusCode;
    use actix_web::test as actix_test;
    use rstest::rstest;
    use serde_json::{Value, json};

    fn seeded_store() -> FixtureStore {
        let store = FixtureStore::new();
        store.seed_user(
            Username::new("ada").expect("valid username"),
            "ada@example.net",
            "password",
        );
        store
    }

    #[actix_web::test]
    async fn login_then_me_round_trips() {
        let store = seeded_store();
        let app = actix_test::init_service(fixture_app(&store)).await;
        let cookie = login_cookie(&app, "ada", "password").await;

        let request = actix_test::TestRequest::get()
            .uri("/api/v1/me")
            .cookie(cookie)
            .to_request();
        let response = actix_test::call_service(&app, request).await;
        assert_eq!(response.status(), StatusCode::OK);
        let me: UserResponse = actix_test::read_body_json(response).await;
        assert_eq!(me.username, "ada");
        assert_eq!(me.email, "ada@example.net");
    }

    #[rstest]
    #[case("   ", "password", "username")]
    #[case("ada", "", "password")]
    #[actix_web::test]
    async fn login_rejects_blank_credentials(
        #[case] username: &str,
        #[case] password: &str,
        #[case] field: &str,
    ) {
        let store = seeded_store();
        let app = actix_test::init_service(fixture_app(&store)).await;

        let request = actix_test::TestRequest::post()
            .uri("/api/v1/login")
            .set_json(json!({ "username": username, "password": password }))
            .to_request();
        let response = actix_test::call_service(&app, request).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body: Value = actix_test::read_body_json(response).await;
        assert_eq!(body["details"]["field"], field);
    }

    #[actix_web::test]
    async fn wrong_password_is_unauthorised() {
        let store = seeded_store();
        let app = actix_test::init_service(fixture_app(&store)).await;

        let request = actix_test::TestRequest::post()
            .uri("/api/v1/login")
            .set_json(json!({ "username": "ada", "password": "letmein" }))
            .to_request();
        let response = actix_test::call_service(&app, request).await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[actix_web::test]
    async fn logout_invalidates_the_session() {
        let store = seeded_store();
        let app = actix_test::init_service(fixture_app(&store)).await;
        let cookie = login_cookie(&app, "ada", "password").await;

        let logout_request = actix_test::TestRequest::post()
            .uri("/api/v1/logout")
            .cookie(cookie.clone())
            .to_request();
        let response = actix_test::call_service(&app, logout_request).await;
        assert_eq!(response.status(), StatusCode::NO_CONTENT);

        // The purge response carries a removal cookie; without a valid
        // session the identity endpoint must refuse.
        let request = actix_test::TestRequest::get().uri("/api/v1/me").to_request();
        let response = actix_test::call_service(&app, request).await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[actix_web::test]
    async fn profile_upsert_is_owner_only() {
        let store = seeded_store();
        let ben = store.seed_user(
            Username::new("ben").expect("valid username"),
            "ben@example.net",
            "password",
        );
        let app = actix_test::init_service(fixture_app(&store)).await;
        let ada_cookie = login_cookie(&app, "ada", "password").await;

        let request = actix_test::TestRequest::put()
            .uri(&format!("/api/v1/profiles/{}", ben.id))
            .cookie(ada_cookie)
            .set_json(json!({ "fullName": "Not Ben" }))
            .to_request();
        let response = actix_test::call_service(&app, request).await;
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[actix_web::test]
    async fn profile_round_trips_for_the_owner() {
        let store = seeded_store();
        let app = actix_test::init_service(fixture_app(&store)).await;
        let cookie = login_cookie(&app, "ada", "password").await;

        let me: UserResponse = actix_test::read_body_json(
            actix_test::call_service(
                &app,
                actix_test::TestRequest::get()
                    .uri("/api/v1/me")
                    .cookie(cookie.clone())
                    .to_request(),
            )
            .await,
        )
        .await;

        let put = actix_test::TestRequest::put()
            .uri(&format!("/api/v1/profiles/{}", me.id))
            .cookie(cookie)
            .set_json(json!({
                "fullName": "Ada Lovelace",
                "bio": "Organises things",
                "location": "London",
            }))
            .to_request();
        let response = actix_test::call_service(&app, put).await;
        assert_eq!(response.status(), StatusCode::OK);

        let get = actix_test::TestRequest::get()
            .uri(&format!("/api/v1/profiles/{}", me.id))
            .to_request();
        let response = actix_test::call_service(&app, get).await;
        assert_eq!(response.status(), StatusCode::OK);
        let profile: ProfileResponse = actix_test::read_body_json(response).await;
        assert_eq!(profile.full_name, "Ada Lovelace");
        assert_eq!(profile.location, "London");
    }

    #[actix_web::test]
    async fn missing_profile_is_not_found() {
        let store = seeded_store();
        let app = actix_test::init_service(fixture_app(&store)).await;

        let request = actix_test::TestRequest::get()
            .uri(&format!("/api/v1/profiles/{}", uuid::Uuid::new_v4()))
            .to_request();
        let response = actix_test::call_service(&app, request).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
