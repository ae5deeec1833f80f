//! User identity and profile data model.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error as ThisError;
use utoipa::ToSchema;
use uuid::Uuid;

/// Validation errors raised by the user constructors.
#[derive(Debug, Clone, PartialEq, Eq, ThisError)]
pub enum UserValidationError {
    /// Identifier is not a valid UUID.
    #[error("user id must be a valid UUID")]
    InvalidId,
    /// Username is empty once trimmed.
    #[error("username must not be empty")]
    EmptyUsername,
    /// Username carries surrounding whitespace.
    #[error("username must not contain surrounding whitespace")]
    UntrimmedUsername,
}

/// Stable user identifier stored as a UUID.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, ToSchema,
)]
#[serde(transparent)]
#[schema(value_type = String, format = "uuid")]
pub struct UserId(Uuid);

impl UserId {
    /// Wrap an already-parsed UUID.
    pub const fn from_uuid(id: Uuid) -> Self {
        Self(id)
    }

    /// Generate a new random identifier.
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }

    /// Parse an identifier from its string form.
    pub fn parse(raw: &str) -> Result<Self, UserValidationError> {
        Uuid::parse_str(raw)
            .map(Self)
            .map_err(|_| UserValidationError::InvalidId)
    }

    /// Access the underlying UUID.
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unique login name for a user.
///
/// ## Invariants
/// - non-empty once trimmed of whitespace
/// - stored exactly as entered, without surrounding whitespace
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(try_from = "String", into = "String")]
#[schema(value_type = String, example = "ada")]
pub struct Username(String);

impl Username {
    /// Validate and construct a [`Username`].
    pub fn new(raw: impl Into<String>) -> Result<Self, UserValidationError> {
        let raw = raw.into();
        if raw.trim().is_empty() {
            return Err(UserValidationError::EmptyUsername);
        }
        if raw.trim() != raw {
            return Err(UserValidationError::UntrimmedUsername);
        }
        Ok(Self(raw))
    }

    /// Borrow the underlying name.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl AsRef<str> for Username {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for Username {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<Username> for String {
    fn from(value: Username) -> Self {
        value.0
    }
}

impl TryFrom<String> for Username {
    type Error = UserValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Application user as resolved by the authentication provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Stable identifier.
    pub id: UserId,
    /// Unique login name.
    pub username: Username,
    /// Contact address; owned by the external identity provider.
    pub email: String,
}

impl User {
    /// Build a user from validated components.
    pub fn new(id: UserId, username: Username, email: impl Into<String>) -> Self {
        Self {
            id,
            username,
            email: email.into(),
        }
    }
}

/// Free-form profile attached to exactly one user.
///
/// Created and updated only by the owning user; removed together with the
/// user record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    /// Owning user.
    pub user_id: UserId,
    /// Name shown alongside events and reviews.
    pub full_name: String,
    /// Free-text biography.
    pub bio: String,
    /// Free-text location.
    pub location: String,
    /// Opaque reference into the picture store, when one was uploaded.
    pub profile_picture: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("", UserValidationError::EmptyUsername)]
    #[case("   ", UserValidationError::EmptyUsername)]
    #[case(" ada", UserValidationError::UntrimmedUsername)]
    #[case("ada ", UserValidationError::UntrimmedUsername)]
    fn rejects_invalid_usernames(#[case] raw: &str, #[case] expected: UserValidationError) {
        assert_eq!(Username::new(raw).expect_err("must fail"), expected);
    }

    #[test]
    fn accepts_plain_username() {
        let name = Username::new("ada").expect("valid username");
        assert_eq!(name.as_str(), "ada");
    }

    #[test]
    fn user_id_round_trips_as_string() {
        let id = UserId::random();
        let raw = id.to_string();
        assert_eq!(UserId::parse(&raw).expect("round trip"), id);
        assert!(UserId::parse("not-a-uuid").is_err());
    }
}
