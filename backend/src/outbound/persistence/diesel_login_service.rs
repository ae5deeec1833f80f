//! Diesel-backed `LoginService` adapter built on `DieselUserRepository`.
//!
//! Credential verification belongs to an external identity provider; this
//! adapter preserves the fixture login contract (`admin`/`password`) while
//! ensuring the authenticated fixture user exists in PostgreSQL, so the
//! database-backed server keeps a working session flow.

use std::sync::Arc;

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::ports::{
    LoginCredentials, LoginError, LoginService, RepositoryError, UserRepository,
};
use crate::domain::{User, UserId, Username};

use super::diesel_user_repository::DieselUserRepository;

const FIXTURE_USERNAME: &str = "admin";
const FIXTURE_PASSWORD: &str = "password";
const FIXTURE_USER_ID: Uuid = Uuid::from_u128(0x123e_4567_e89b_12d3_a456_4266_1417_4000);
const FIXTURE_EMAIL: &str = "admin@example.net";

/// Diesel-backed `LoginService` that preserves fixture-authentication
/// semantics.
#[derive(Clone)]
pub struct DieselLoginService {
    user_repository: Arc<dyn UserRepository>,
}

impl DieselLoginService {
    /// Create a new service backed by a Diesel user repository.
    pub fn new(user_repository: DieselUserRepository) -> Self {
        Self {
            user_repository: Arc::new(user_repository),
        }
    }

    #[cfg(test)]
    fn from_repository(user_repository: Arc<dyn UserRepository>) -> Self {
        Self { user_repository }
    }

    async fn ensure_fixture_user_exists(&self, user: &User) -> Result<(), LoginError> {
        let existing = self
            .user_repository
            .find(user.id)
            .await
            .map_err(map_repository_error)?;
        if existing.is_some() {
            return Ok(());
        }
        self.user_repository
            .upsert(user)
            .await
            .map_err(map_repository_error)
    }
}

fn map_repository_error(error: RepositoryError) -> LoginError {
    LoginError::Unavailable {
        message: error.to_string(),
    }
}

fn fixture_user() -> Result<User, LoginError> {
    let username = Username::new(FIXTURE_USERNAME).map_err(|err| LoginError::Unavailable {
        message: format!("invalid fixture username: {err}"),
    })?;
    Ok(User::new(
        UserId::from_uuid(FIXTURE_USER_ID),
        username,
        FIXTURE_EMAIL,
    ))
}

#[async_trait]
impl LoginService for DieselLoginService {
    async fn authenticate(&self, credentials: &LoginCredentials) -> Result<User, LoginError> {
        if credentials.username.as_str() != FIXTURE_USERNAME
            || credentials.password != FIXTURE_PASSWORD
        {
            return Err(LoginError::InvalidCredentials);
        }
        let user = fixture_user()?;
        self.ensure_fixture_user_exists(&user).await?;
        Ok(user)
    }
}
