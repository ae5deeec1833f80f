//! PostgreSQL-backed `ReviewRepository` implementation using Diesel ORM.
//!
//! Reviews are append-only; the adapter exposes no update path. The
//! `(event_id, user_id)` uniqueness lives in the database and surfaces as
//! [`RepositoryError::Duplicate`].

use async_trait::async_trait;
use diesel::dsl::count_star;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::domain::ports::{RepositoryError, ReviewRepository};
use crate::domain::{EventId, Rating, Review, UserId};

use super::error_mapping::{map_diesel_error, map_pool_error};
use super::models::{NewReviewRow, ReviewRow};
use super::pool::DbPool;
use super::schema::reviews;

/// Diesel-backed implementation of the `ReviewRepository` port.
#[derive(Clone)]
pub struct DieselReviewRepository {
    pool: DbPool,
}

impl DieselReviewRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn row_to_review(row: ReviewRow) -> Result<Review, RepositoryError> {
    let rating = Rating::new(row.rating)
        .map_err(|err| RepositoryError::query(format!("invalid stored rating: {err}")))?;
    Ok(Review {
        id: row.id,
        event: EventId::from_uuid(row.event_id),
        user: UserId::from_uuid(row.user_id),
        rating,
        comment: row.comment,
        created_at: row.created_at,
    })
}

#[async_trait]
impl ReviewRepository for DieselReviewRepository {
    async fn list_for_event(&self, event: EventId) -> Result<Vec<Review>, RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<ReviewRow> = reviews::table
            .filter(reviews::event_id.eq(*event.as_uuid()))
            .order(reviews::created_at.desc())
            .select(ReviewRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        rows.into_iter().map(row_to_review).collect()
    }

    async fn exists(&self, event: EventId, user: UserId) -> Result<bool, RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let count: i64 = reviews::table
            .filter(reviews::event_id.eq(*event.as_uuid()))
            .filter(reviews::user_id.eq(*user.as_uuid()))
            .select(count_star())
            .first(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(count > 0)
    }

    async fn create(&self, review: &Review) -> Result<(), RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = NewReviewRow {
            id: review.id,
            event_id: *review.event.as_uuid(),
            user_id: *review.user.as_uuid(),
            rating: review.rating.get(),
            comment: &review.comment,
            created_at: review.created_at,
        };
        diesel::insert_into(reviews::table)
            .values(&row)
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(())
    }
}
