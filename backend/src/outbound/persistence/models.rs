//! Internal Diesel row structs for database operations.
//!
//! These types are implementation details of the persistence layer and must
//! never be exposed to the domain. They exist solely to satisfy Diesel's
//! type requirements for queries and mutations.

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use super::schema::{event_invites, events, reviews, rsvps, user_profiles, users};

/// Row struct for reading from the users table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct UserRow {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    #[expect(dead_code, reason = "schema field for future audit trail support")]
    pub created_at: DateTime<Utc>,
    #[expect(dead_code, reason = "schema field for future audit trail support")]
    pub updated_at: DateTime<Utc>,
}

/// Insertable struct for creating new user records.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = users)]
pub(crate) struct NewUserRow<'a> {
    pub id: Uuid,
    pub username: &'a str,
    pub email: &'a str,
}

/// Changeset struct for refreshing an existing user record.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = users)]
pub(crate) struct UserUpdate<'a> {
    pub username: &'a str,
    pub email: &'a str,
}

/// Row struct for reading from the user_profiles table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = user_profiles)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct UserProfileRow {
    pub user_id: Uuid,
    pub full_name: String,
    pub bio: String,
    pub location: String,
    pub profile_picture: Option<String>,
}

/// Insertable struct for creating or replacing a profile.
#[derive(Debug, Clone, Insertable, AsChangeset)]
#[diesel(table_name = user_profiles)]
pub(crate) struct NewUserProfileRow<'a> {
    pub user_id: Uuid,
    pub full_name: &'a str,
    pub bio: &'a str,
    pub location: &'a str,
    pub profile_picture: Option<&'a str>,
}

/// Row struct for reading from the events table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = events)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct EventRow {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub organizer_id: Uuid,
    pub location: String,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub is_public: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Insertable struct for creating new event records.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = events)]
pub(crate) struct NewEventRow<'a> {
    pub id: Uuid,
    pub title: &'a str,
    pub description: &'a str,
    pub organizer_id: Uuid,
    pub location: &'a str,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub is_public: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Changeset struct for persisting a merged event.
///
/// `organizer_id` and `created_at` are deliberately absent; neither may
/// change after creation.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = events)]
pub(crate) struct EventUpdate<'a> {
    pub title: &'a str,
    pub description: &'a str,
    pub location: &'a str,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub is_public: bool,
    pub updated_at: DateTime<Utc>,
}

/// Row struct for the invite join table.
#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = event_invites)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct EventInviteRow {
    pub event_id: Uuid,
    pub user_id: Uuid,
}

/// Row struct for reading from the rsvps table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = rsvps)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct RsvpRow {
    pub id: Uuid,
    pub event_id: Uuid,
    pub user_id: Uuid,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Insertable struct for creating new RSVP records.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = rsvps)]
pub(crate) struct NewRsvpRow<'a> {
    pub id: Uuid,
    pub event_id: Uuid,
    pub user_id: Uuid,
    pub status: &'a str,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Row struct for reading from the reviews table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = reviews)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct ReviewRow {
    pub id: Uuid,
    pub event_id: Uuid,
    pub user_id: Uuid,
    pub rating: i16,
    pub comment: String,
    pub created_at: DateTime<Utc>,
}

/// Insertable struct for creating new review records.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = reviews)]
pub(crate) struct NewReviewRow<'a> {
    pub id: Uuid,
    pub event_id: Uuid,
    pub user_id: Uuid,
    pub rating: i16,
    pub comment: &'a str,
    pub created_at: DateTime<Utc>,
}
