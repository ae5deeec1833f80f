//! Profile use-cases: identity lookup and owner-managed profiles.

use std::sync::Arc;

use async_trait::async_trait;

use super::error::Error;
use super::ports::fixtures::FixtureStore;
use super::ports::{ProfilesPort, RepositoryError, UserRepository};
use super::user::{User, UserId, UserProfile};

/// Service implementing the profile use-cases.
#[derive(Clone)]
pub struct ProfileService {
    users: Arc<dyn UserRepository>,
}

impl ProfileService {
    /// Create a service over the given storage adapter.
    pub fn new(users: Arc<dyn UserRepository>) -> Self {
        Self { users }
    }

    /// Convenience constructor over a fixture store.
    pub fn with_fixture(store: &FixtureStore) -> Self {
        Self::new(Arc::new(store.clone()))
    }
}

fn map_repo_error(error: RepositoryError) -> Error {
    match error {
        RepositoryError::Connection { message } => {
            Error::service_unavailable(format!("user store unavailable: {message}"))
        }
        RepositoryError::Query { message } | RepositoryError::Duplicate { constraint: message } => {
            Error::internal(format!("user store error: {message}"))
        }
    }
}

#[async_trait]
impl ProfilesPort for ProfileService {
    async fn get_profile(&self, user: UserId) -> Result<UserProfile, Error> {
        self.users
            .find_profile(user)
            .await
            .map_err(map_repo_error)?
            .ok_or_else(|| Error::not_found("profile not found"))
    }

    async fn put_profile(
        &self,
        caller: UserId,
        profile: UserProfile,
    ) -> Result<UserProfile, Error> {
        if caller != profile.user_id {
            return Err(Error::forbidden("You can only edit your own profile."));
        }
        self.users
            .upsert_profile(&profile)
            .await
            .map_err(map_repo_error)?;
        Ok(profile)
    }

    async fn current_user(&self, caller: UserId) -> Result<User, Error> {
        self.users
            .find(caller)
            .await
            .map_err(map_repo_error)?
            .ok_or_else(|| Error::unauthorized("session user no longer exists"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::error::ErrorCode;
    use crate::domain::user::Username;

    fn profile_for(user: UserId) -> UserProfile {
        UserProfile {
            user_id: user,
            full_name: "Ada Lovelace".into(),
            bio: "I organise things.".into(),
            location: "London".into(),
            profile_picture: None,
        }
    }

    #[tokio::test]
    async fn owner_may_upsert_and_read_back() {
        let store = FixtureStore::new();
        let ada = store.seed_user(Username::new("ada").expect("valid"), "ada@example.com", "pw");
        let service = ProfileService::with_fixture(&store);

        let saved = service
            .put_profile(ada.id, profile_for(ada.id))
            .await
            .expect("owner upsert");
        assert_eq!(saved.full_name, "Ada Lovelace");

        let fetched = service.get_profile(ada.id).await.expect("profile exists");
        assert_eq!(fetched, saved);
    }

    #[tokio::test]
    async fn non_owner_upsert_is_forbidden() {
        let store = FixtureStore::new();
        let ada = store.seed_user(Username::new("ada").expect("valid"), "ada@example.com", "pw");
        let ben = store.seed_user(Username::new("ben").expect("valid"), "ben@example.com", "pw");
        let service = ProfileService::with_fixture(&store);

        let err = service
            .put_profile(ben.id, profile_for(ada.id))
            .await
            .expect_err("must fail");
        assert_eq!(err.code, ErrorCode::Forbidden);
    }

    #[tokio::test]
    async fn missing_profile_is_not_found() {
        let store = FixtureStore::new();
        let ada = store.seed_user(Username::new("ada").expect("valid"), "ada@example.com", "pw");
        let service = ProfileService::with_fixture(&store);

        let err = service.get_profile(ada.id).await.expect_err("no profile yet");
        assert_eq!(err.code, ErrorCode::NotFound);
    }
}
