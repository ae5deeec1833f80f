//! PostgreSQL-backed `RsvpRepository` implementation using Diesel ORM.
//!
//! The `(event_id, user_id)` uniqueness lives in the database; a lost insert
//! race surfaces as [`RepositoryError::Duplicate`] via the shared error
//! mapping rather than a second row.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::domain::ports::{RepositoryError, RsvpRepository};
use crate::domain::{EventId, Rsvp, RsvpStatus, UserId};

use super::error_mapping::{map_diesel_error, map_pool_error};
use super::models::{NewRsvpRow, RsvpRow};
use super::pool::DbPool;
use super::schema::rsvps;

/// Diesel-backed implementation of the `RsvpRepository` port.
#[derive(Clone)]
pub struct DieselRsvpRepository {
    pool: DbPool,
}

impl DieselRsvpRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn row_to_rsvp(row: RsvpRow) -> Result<Rsvp, RepositoryError> {
    let status = row
        .status
        .parse::<RsvpStatus>()
        .map_err(|err| RepositoryError::query(format!("invalid stored rsvp status: {err}")))?;
    Ok(Rsvp {
        id: row.id,
        event: EventId::from_uuid(row.event_id),
        user: UserId::from_uuid(row.user_id),
        status,
        created_at: row.created_at,
        updated_at: row.updated_at,
    })
}

#[async_trait]
impl RsvpRepository for DieselRsvpRepository {
    async fn find(&self, event: EventId, user: UserId) -> Result<Option<Rsvp>, RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: Option<RsvpRow> = rsvps::table
            .filter(rsvps::event_id.eq(*event.as_uuid()))
            .filter(rsvps::user_id.eq(*user.as_uuid()))
            .select(RsvpRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        row.map(row_to_rsvp).transpose()
    }

    async fn create(&self, rsvp: &Rsvp) -> Result<(), RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = NewRsvpRow {
            id: rsvp.id,
            event_id: *rsvp.event.as_uuid(),
            user_id: *rsvp.user.as_uuid(),
            status: rsvp.status.as_str(),
            created_at: rsvp.created_at,
            updated_at: rsvp.updated_at,
        };
        diesel::insert_into(rsvps::table)
            .values(&row)
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(())
    }

    async fn set_status(
        &self,
        event: EventId,
        user: UserId,
        status: RsvpStatus,
        now: DateTime<Utc>,
    ) -> Result<Option<Rsvp>, RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: Option<RsvpRow> = diesel::update(
            rsvps::table
                .filter(rsvps::event_id.eq(*event.as_uuid()))
                .filter(rsvps::user_id.eq(*user.as_uuid())),
        )
        .set((rsvps::status.eq(status.as_str()), rsvps::updated_at.eq(now)))
        .returning(RsvpRow::as_returning())
        .get_result(&mut conn)
        .await
        .optional()
        .map_err(map_diesel_error)?;
        row.map(row_to_rsvp).transpose()
    }
}
