//! Internal Diesel row structs for database operations.
//!
//! These types are implementation details of the persistence layer and must
//! never be exposed to the domain. They exist solely to satisfy Diesel's
//! type requirements for queries and mutations.

use chrono::{DateTime, Utc};
use diesel::prelude::*;

use super::schema::{
    companies, company_invitations, company_members, events, notifications, users,
};

// ---------------------------------------------------------------------------
// User models
// ---------------------------------------------------------------------------

/// Insertable struct for creating new user records.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = users)]
pub(crate) struct NewUserRow<'a> {
    pub username: &'a str,
    pub email: &'a str,
    pub password_hash: &'a str,
}

// ---------------------------------------------------------------------------
// Company models
// ---------------------------------------------------------------------------

/// Row struct for reading from the companies table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = companies)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct CompanyRow {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub created_by: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Insertable struct for creating companies.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = companies)]
pub(crate) struct NewCompanyRow<'a> {
    pub name: &'a str,
    pub description: Option<&'a str>,
    pub created_by: i64,
}

/// Changeset for partial company updates; `None` leaves a column untouched.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = companies)]
pub(crate) struct CompanyChangeset<'a> {
    pub name: Option<&'a str>,
    pub description: Option<&'a str>,
    pub updated_at: DateTime<Utc>,
}

/// Insertable membership row.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = company_members)]
pub(crate) struct NewMemberRow<'a> {
    pub company_id: i64,
    pub user_id: i64,
    pub role: &'a str,
}

// ---------------------------------------------------------------------------
// Invitation models
// ---------------------------------------------------------------------------

/// Row struct for reading from the company_invitations table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = company_invitations)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct InvitationRow {
    pub id: i64,
    pub company_id: i64,
    pub invited_user_id: i64,
    pub invited_by: i64,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub responded_at: Option<DateTime<Utc>>,
}

/// Insertable invitation row.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = company_invitations)]
pub(crate) struct NewInvitationRow<'a> {
    pub company_id: i64,
    pub invited_user_id: i64,
    pub invited_by: i64,
    pub status: &'a str,
}

/// Insertable notification row.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = notifications)]
pub(crate) struct NewNotificationRow<'a> {
    pub user_id: i64,
    pub kind: &'a str,
    pub title: &'a str,
    pub message: &'a str,
    pub related_entity_type: &'a str,
    pub related_entity_id: i64,
}

// ---------------------------------------------------------------------------
// Event models
// ---------------------------------------------------------------------------

/// Row struct for reading from the events table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = events)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct EventRow {
    pub id: i64,
    pub company_id: Option<i64>,
    pub created_by: i64,
    pub title: String,
    pub description: Option<String>,
    pub start_time: Option<DateTime<Utc>>,
    pub end_time: Option<DateTime<Utc>>,
    pub place_name: Option<String>,
    pub place_link: Option<String>,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Insertable event row.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = events)]
pub(crate) struct NewEventRow<'a> {
    pub company_id: Option<i64>,
    pub created_by: i64,
    pub title: &'a str,
    pub description: Option<&'a str>,
    pub start_time: Option<DateTime<Utc>>,
    pub end_time: Option<DateTime<Utc>>,
    pub place_name: Option<&'a str>,
    pub place_link: Option<&'a str>,
    pub status: &'a str,
}

/// Full rewrite of the mutable event columns after a merged update.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = events)]
#[diesel(treat_none_as_null = true)]
pub(crate) struct EventChangeset<'a> {
    pub company_id: Option<i64>,
    pub title: &'a str,
    pub description: Option<&'a str>,
    pub start_time: Option<DateTime<Utc>>,
    pub end_time: Option<DateTime<Utc>>,
    pub place_name: Option<&'a str>,
    pub place_link: Option<&'a str>,
    pub updated_at: DateTime<Utc>,
}
