//! PostgreSQL-backed `EventRepository` implementation using Diesel ORM.
//!
//! The visibility union lives in one query: public events, events the viewer
//! organises, and events the viewer is invited to, de-duplicated by the
//! `OR`-combined predicate. Invite sets and organizer profiles are fetched in
//! follow-up batch queries rather than row-multiplying joins.

use std::collections::HashMap;

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::scoped_futures::ScopedFutureExt as _;
use diesel_async::{AsyncConnection as _, AsyncPgConnection, RunQueryDsl};
use uuid::Uuid;

use crate::domain::ports::{
    EventDetails, EventFilter, EventOrdering, EventRepository, RepositoryError,
};
use crate::domain::{Event, EventId, UserId};

use super::error_mapping::{map_diesel_error, map_pool_error};
use super::models::{EventInviteRow, EventRow, EventUpdate, NewEventRow, UserProfileRow, UserRow};
use super::pool::DbPool;
use super::schema::{event_invites, events, user_profiles, users};
use super::user_conversions::{row_to_profile, row_to_user};

/// Diesel-backed implementation of the `EventRepository` port.
#[derive(Clone)]
pub struct DieselEventRepository {
    pool: DbPool,
}

impl DieselEventRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    async fn assemble(
        &self,
        conn: &mut AsyncPgConnection,
        rows: Vec<(EventRow, UserRow)>,
    ) -> Result<Vec<EventDetails>, RepositoryError> {
        if rows.is_empty() {
            return Ok(Vec::new());
        }

        let event_ids: Vec<Uuid> = rows.iter().map(|(event, _)| event.id).collect();
        let organizer_ids: Vec<Uuid> = rows.iter().map(|(_, user)| user.id).collect();

        let invites: Vec<EventInviteRow> = event_invites::table
            .filter(event_invites::event_id.eq_any(&event_ids))
            .select(EventInviteRow::as_select())
            .load(conn)
            .await
            .map_err(map_diesel_error)?;
        let mut invites_by_event: HashMap<Uuid, Vec<UserId>> = HashMap::new();
        for invite in invites {
            invites_by_event
                .entry(invite.event_id)
                .or_default()
                .push(UserId::from_uuid(invite.user_id));
        }

        let profiles: Vec<UserProfileRow> = user_profiles::table
            .filter(user_profiles::user_id.eq_any(&organizer_ids))
            .select(UserProfileRow::as_select())
            .load(conn)
            .await
            .map_err(map_diesel_error)?;
        let mut profiles_by_user: HashMap<Uuid, UserProfileRow> = profiles
            .into_iter()
            .map(|profile| (profile.user_id, profile))
            .collect();

        rows.into_iter()
            .map(|(event, organizer)| {
                let invited_users = invites_by_event.remove(&event.id).unwrap_or_default();
                let organizer_profile = profiles_by_user.remove(&organizer.id).map(row_to_profile);
                Ok(EventDetails {
                    event: row_to_event(event, invited_users),
                    organizer: row_to_user(organizer)?,
                    organizer_profile,
                })
            })
            .collect()
    }
}

fn row_to_event(row: EventRow, invited_users: Vec<UserId>) -> Event {
    Event {
        id: EventId::from_uuid(row.id),
        title: row.title,
        description: row.description,
        organizer: UserId::from_uuid(row.organizer_id),
        location: row.location,
        start_time: row.start_time,
        end_time: row.end_time,
        is_public: row.is_public,
        invited_users,
        created_at: row.created_at,
        updated_at: row.updated_at,
    }
}

/// Build a `LIKE` pattern matching `needle` as a literal substring.
fn like_pattern(needle: &str) -> String {
    let escaped = needle
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{escaped}%")
}

#[async_trait]
impl EventRepository for DieselEventRepository {
    async fn list(
        &self,
        viewer: Option<&UserId>,
        filter: &EventFilter,
    ) -> Result<Vec<EventDetails>, RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let mut query = events::table.inner_join(users::table).into_boxed();
        match viewer {
            Some(viewer) => {
                let viewer_id = *viewer.as_uuid();
                let invited = event_invites::table
                    .filter(event_invites::user_id.eq(viewer_id))
                    .select(event_invites::event_id);
                query = query.filter(
                    events::is_public
                        .eq(true)
                        .or(events::organizer_id.eq(viewer_id))
                        .or(events::id.eq_any(invited)),
                );
            }
            None => query = query.filter(events::is_public.eq(true)),
        }

        if let Some(location) = &filter.location {
            query = query.filter(events::location.eq(location.clone()));
        }
        if let Some(is_public) = filter.is_public {
            query = query.filter(events::is_public.eq(is_public));
        }
        if let Some(organizer) = filter.organizer {
            query = query.filter(events::organizer_id.eq(*organizer.as_uuid()));
        }
        if let Some(search) = &filter.search {
            let pattern = like_pattern(search);
            query = query.filter(
                events::title
                    .ilike(pattern.clone())
                    .or(events::location.ilike(pattern.clone()))
                    .or(events::description.ilike(pattern.clone()))
                    .or(users::username.ilike(pattern)),
            );
        }

        query = match filter.ordering {
            EventOrdering::StartTimeAsc => query.order(events::start_time.asc()),
            EventOrdering::StartTimeDesc => query.order(events::start_time.desc()),
            EventOrdering::CreatedAtAsc => query.order(events::created_at.asc()),
            EventOrdering::CreatedAtDesc => query.order(events::created_at.desc()),
        };

        let rows: Vec<(EventRow, UserRow)> = query
            .select((EventRow::as_select(), UserRow::as_select()))
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        self.assemble(&mut conn, rows).await
    }

    async fn find(&self, id: EventId) -> Result<Option<EventDetails>, RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row: Option<(EventRow, UserRow)> = events::table
            .inner_join(users::table)
            .filter(events::id.eq(*id.as_uuid()))
            .select((EventRow::as_select(), UserRow::as_select()))
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        let Some(row) = row else {
            return Ok(None);
        };
        let mut details = self.assemble(&mut conn, vec![row]).await?;
        Ok(details.pop())
    }

    async fn create(&self, event: &Event) -> Result<(), RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row = NewEventRow {
            id: *event.id.as_uuid(),
            title: &event.title,
            description: &event.description,
            organizer_id: *event.organizer.as_uuid(),
            location: &event.location,
            start_time: event.start_time,
            end_time: event.end_time,
            is_public: event.is_public,
            created_at: event.created_at,
            updated_at: event.updated_at,
        };
        let invites: Vec<EventInviteRow> = event
            .invited_users
            .iter()
            .map(|user| EventInviteRow {
                event_id: *event.id.as_uuid(),
                user_id: *user.as_uuid(),
            })
            .collect();

        conn.transaction(|conn| {
            async move {
                diesel::insert_into(events::table)
                    .values(&row)
                    .execute(conn)
                    .await?;
                if !invites.is_empty() {
                    diesel::insert_into(event_invites::table)
                        .values(&invites)
                        .execute(conn)
                        .await?;
                }
                Ok(())
            }
            .scope_boxed()
        })
        .await
        .map_err(map_diesel_error)
    }

    async fn update(&self, event: &Event) -> Result<(), RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let event_id = *event.id.as_uuid();
        let changes = EventUpdate {
            title: &event.title,
            description: &event.description,
            location: &event.location,
            start_time: event.start_time,
            end_time: event.end_time,
            is_public: event.is_public,
            updated_at: event.updated_at,
        };
        let invites: Vec<EventInviteRow> = event
            .invited_users
            .iter()
            .map(|user| EventInviteRow {
                event_id,
                user_id: *user.as_uuid(),
            })
            .collect();

        conn.transaction(|conn| {
            async move {
                diesel::update(events::table.find(event_id))
                    .set(&changes)
                    .execute(conn)
                    .await?;
                // Synchronise the stored invite set to the merged event.
                diesel::delete(event_invites::table.filter(event_invites::event_id.eq(event_id)))
                    .execute(conn)
                    .await?;
                if !invites.is_empty() {
                    diesel::insert_into(event_invites::table)
                        .values(&invites)
                        .execute(conn)
                        .await?;
                }
                Ok(())
            }
            .scope_boxed()
        })
        .await
        .map_err(map_diesel_error)
    }

    async fn delete(&self, id: EventId) -> Result<(), RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::delete(events::table.find(*id.as_uuid()))
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("board", "%board%")]
    #[case("50% off", "%50\\% off%")]
    #[case("a_b", "%a\\_b%")]
    #[case("back\\slash", "%back\\\\slash%")]
    fn like_patterns_escape_wildcards(#[case] needle: &str, #[case] expected: &str) {
        assert_eq!(like_pattern(needle), expected);
    }
}
