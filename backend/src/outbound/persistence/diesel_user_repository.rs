//! PostgreSQL-backed `UserRepository` implementation using Diesel ORM.

use async_trait::async_trait;
use chrono::Utc;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::domain::ports::{RepositoryError, UserRepository};
use crate::domain::{User, UserId, UserProfile};

use super::error_mapping::{map_diesel_error, map_pool_error};
use super::models::{NewUserProfileRow, NewUserRow, UserProfileRow, UserRow, UserUpdate};
use super::pool::DbPool;
use super::schema::{user_profiles, users};
use super::user_conversions::{row_to_profile, row_to_user};

/// Diesel-backed implementation of the `UserRepository` port.
#[derive(Clone)]
pub struct DieselUserRepository {
    pool: DbPool,
}

impl DieselUserRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserRepository for DieselUserRepository {
    async fn find(&self, id: UserId) -> Result<Option<User>, RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: Option<UserRow> = users::table
            .find(*id.as_uuid())
            .select(UserRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        row.map(row_to_user).transpose()
    }

    async fn upsert(&self, user: &User) -> Result<(), RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let now = Utc::now();
        let row = NewUserRow {
            id: *user.id.as_uuid(),
            username: user.username.as_str(),
            email: &user.email,
        };
        diesel::insert_into(users::table)
            .values(&row)
            .on_conflict(users::id)
            .do_update()
            .set((
                UserUpdate {
                    username: user.username.as_str(),
                    email: &user.email,
                },
                users::updated_at.eq(now),
            ))
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(())
    }

    async fn find_profile(&self, id: UserId) -> Result<Option<UserProfile>, RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: Option<UserProfileRow> = user_profiles::table
            .find(*id.as_uuid())
            .select(UserProfileRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        Ok(row.map(row_to_profile))
    }

    async fn upsert_profile(&self, profile: &UserProfile) -> Result<(), RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = NewUserProfileRow {
            user_id: *profile.user_id.as_uuid(),
            full_name: &profile.full_name,
            bio: &profile.bio,
            location: &profile.location,
            profile_picture: profile.profile_picture.as_deref(),
        };
        diesel::insert_into(user_profiles::table)
            .values(&row)
            .on_conflict(user_profiles::user_id)
            .do_update()
            .set(&row)
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(())
    }
}
