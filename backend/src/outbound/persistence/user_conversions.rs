//! Row-to-domain conversions shared by the user-bearing repositories.

use crate::domain::ports::RepositoryError;
use crate::domain::{User, UserId, UserProfile, Username};

use super::models::{UserProfileRow, UserRow};

/// Convert a users row to the domain identity.
///
/// A username that fails domain validation indicates a corrupt row; it maps
/// to a query error rather than a panic.
pub(crate) fn row_to_user(row: UserRow) -> Result<User, RepositoryError> {
    let username = Username::new(row.username)
        .map_err(|err| RepositoryError::query(format!("invalid stored username: {err}")))?;
    Ok(User::new(UserId::from_uuid(row.id), username, row.email))
}

/// Convert a user_profiles row to the domain profile.
pub(crate) fn row_to_profile(row: UserProfileRow) -> UserProfile {
    UserProfile {
        user_id: UserId::from_uuid(row.user_id),
        full_name: row.full_name,
        bio: row.bio,
        location: row.location,
        profile_picture: row.profile_picture,
    }
}
