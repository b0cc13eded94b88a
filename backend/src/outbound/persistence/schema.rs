//! Diesel table definitions for the PostgreSQL schema.
//!
//! These definitions must match `backend/migrations` exactly. They are used
//! by Diesel for compile-time query validation and type-safe SQL generation.
//!
//! # Maintenance
//!
//! When migrations change the schema, this file should be regenerated or
//! manually updated to reflect those changes. The `diesel print-schema`
//! command can generate these definitions from a live database.

diesel::table! {
    /// Registered accounts.
    users (id) {
        /// Primary key.
        id -> Int8,
        /// Unique public handle used for invitations.
        username -> Varchar,
        /// Unique, lower-cased login email.
        email -> Varchar,
        /// Hex digest of the salted password.
        password_hash -> Varchar,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Companies; `created_by` is the owner.
    companies (id) {
        id -> Int8,
        name -> Varchar,
        description -> Nullable<Text>,
        created_by -> Int8,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Membership rows keyed by `(company_id, user_id)`.
    company_members (company_id, user_id) {
        company_id -> Int8,
        user_id -> Int8,
        /// `owner` or `member`.
        role -> Varchar,
        joined_at -> Timestamptz,
    }
}

diesel::table! {
    /// Invitations; a partial unique index allows one pending row per pair.
    company_invitations (id) {
        id -> Int8,
        company_id -> Int8,
        invited_user_id -> Int8,
        invited_by -> Int8,
        /// `pending`, `accepted` or `declined`.
        status -> Varchar,
        created_at -> Timestamptz,
        responded_at -> Nullable<Timestamptz>,
    }
}

diesel::table! {
    /// Per-user notifications.
    notifications (id) {
        id -> Int8,
        user_id -> Int8,
        kind -> Varchar,
        title -> Varchar,
        message -> Text,
        related_entity_type -> Varchar,
        related_entity_id -> Int8,
        is_read -> Bool,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Events; a null `company_id` marks a personal event.
    events (id) {
        id -> Int8,
        company_id -> Nullable<Int8>,
        created_by -> Int8,
        title -> Varchar,
        description -> Nullable<Text>,
        start_time -> Nullable<Timestamptz>,
        end_time -> Nullable<Timestamptz>,
        place_name -> Nullable<Text>,
        place_link -> Nullable<Text>,
        /// `pending`, `confirmed` or `cancelled`.
        status -> Varchar,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::joinable!(companies -> users (created_by));
diesel::joinable!(company_members -> companies (company_id));
diesel::joinable!(company_members -> users (user_id));
diesel::joinable!(company_invitations -> companies (company_id));
diesel::joinable!(events -> companies (company_id));
diesel::joinable!(notifications -> users (user_id));

diesel::allow_tables_to_appear_in_same_query!(
    users,
    companies,
    company_members,
    company_invitations,
    notifications,
    events,
);
