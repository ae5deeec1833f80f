//! Diesel table definitions for the PostgreSQL schema.
//!
//! These definitions must match the database migrations exactly; Diesel uses
//! them for compile-time query validation and type-safe SQL generation.
//! Regenerate with `diesel print-schema` when migrations change.

diesel::table! {
    /// User accounts.
    users (id) {
        /// Primary key: UUID v4 identifier.
        id -> Uuid,
        /// Unique login name.
        username -> Varchar,
        /// Contact address.
        email -> Varchar,
        /// Record creation timestamp.
        created_at -> Timestamptz,
        /// Last modification timestamp.
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// One optional profile per user; cascades on user delete.
    user_profiles (user_id) {
        /// Primary key and foreign key to `users.id`.
        user_id -> Uuid,
        full_name -> Varchar,
        bio -> Text,
        location -> Varchar,
        profile_picture -> Nullable<Varchar>,
    }
}

diesel::table! {
    /// Events; children cascade on delete.
    events (id) {
        id -> Uuid,
        title -> Varchar,
        description -> Text,
        /// Foreign key to `users.id`; immutable after creation.
        organizer_id -> Uuid,
        location -> Varchar,
        start_time -> Timestamptz,
        /// Strictly after `start_time`, checked by the application.
        end_time -> Timestamptz,
        is_public -> Bool,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Invite join table; composite primary key, cascades both ways.
    event_invites (event_id, user_id) {
        event_id -> Uuid,
        user_id -> Uuid,
    }
}

diesel::table! {
    /// RSVPs; unique on `(event_id, user_id)`.
    rsvps (id) {
        id -> Uuid,
        event_id -> Uuid,
        user_id -> Uuid,
        /// One of `Going`, `Maybe`, `Not Going`.
        status -> Varchar,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Reviews; unique on `(event_id, user_id)`, immutable once written.
    reviews (id) {
        id -> Uuid,
        event_id -> Uuid,
        user_id -> Uuid,
        /// Integer rating in `[1, 5]`, checked by the application.
        rating -> Int2,
        comment -> Text,
        created_at -> Timestamptz,
    }
}

diesel::joinable!(user_profiles -> users (user_id));
diesel::joinable!(events -> users (organizer_id));
diesel::joinable!(event_invites -> events (event_id));
diesel::joinable!(event_invites -> users (user_id));
diesel::joinable!(rsvps -> events (event_id));
diesel::joinable!(rsvps -> users (user_id));
diesel::joinable!(reviews -> events (event_id));
diesel::joinable!(reviews -> users (user_id));

diesel::allow_tables_to_appear_in_same_query!(
    users,
    user_profiles,
    events,
    event_invites,
    rsvps,
    reviews,
);
