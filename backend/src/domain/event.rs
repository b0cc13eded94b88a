//! Events: personal or company scoped.
//!
//! Visibility follows one rule: a personal event is visible only to its
//! creator, a company event to every member of that company. Writes are
//! always restricted to the creator.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::{CompanyId, UserId};

/// Maximum event title length.
pub const EVENT_TITLE_MAX: usize = 200;

/// Validation errors for event input.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EventValidationError {
    #[error("title is required")]
    EmptyTitle,
    #[error("title must be at most {max} characters")]
    TitleTooLong { max: usize },
    #[error("description must not be empty")]
    EmptyDescription,
    #[error("end_time requires start_time")]
    EndWithoutStart,
    #[error("end_time must not be before start_time")]
    EndBeforeStart,
    #[error("no fields to update")]
    EmptyUpdate,
}

impl EventValidationError {
    /// Name of the offending request field.
    pub fn field(&self) -> &'static str {
        match self {
            Self::EmptyTitle | Self::TitleTooLong { .. } => "title",
            Self::EmptyDescription => "description",
            Self::EndWithoutStart | Self::EndBeforeStart => "end_time",
            Self::EmptyUpdate => "body",
        }
    }
}

/// Storage identifier of an event.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, ToSchema,
)]
#[serde(transparent)]
pub struct EventId(i64);

impl EventId {
    pub const fn new(raw: i64) -> Self {
        Self(raw)
    }

    pub const fn get(self) -> i64 {
        self.0
    }
}

impl fmt::Display for EventId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Trimmed, non-empty event title.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(try_from = "String", into = "String")]
pub struct EventTitle(String);

impl EventTitle {
    pub fn new(raw: impl AsRef<str>) -> Result<Self, EventValidationError> {
        let trimmed = raw.as_ref().trim();
        if trimmed.is_empty() {
            return Err(EventValidationError::EmptyTitle);
        }
        if trimmed.chars().count() > EVENT_TITLE_MAX {
            return Err(EventValidationError::TitleTooLong {
                max: EVENT_TITLE_MAX,
            });
        }
        Ok(Self(trimmed.to_owned()))
    }
}

impl AsRef<str> for EventTitle {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<EventTitle> for String {
    fn from(value: EventTitle) -> Self {
        value.0
    }
}

impl TryFrom<String> for EventTitle {
    type Error = EventValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Scheduling state of an event. New events start `pending`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum EventStatus {
    Pending,
    Confirmed,
    Cancelled,
}

impl EventStatus {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Confirmed => "confirmed",
            Self::Cancelled => "cancelled",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "pending" => Some(Self::Pending),
            "confirmed" => Some(Self::Confirmed),
            "cancelled" => Some(Self::Cancelled),
            _ => None,
        }
    }
}

/// Optional start and end of an event.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TimeRange {
    start: Option<DateTime<Utc>>,
    end: Option<DateTime<Utc>>,
}

impl TimeRange {
    /// Validate a range: an end needs a start and must not precede it.
    ///
    /// # Examples
    /// ```
    /// use chrono::{TimeZone, Utc};
    /// use crewplan_backend::domain::TimeRange;
    ///
    /// let start = Utc.with_ymd_and_hms(2025, 5, 1, 18, 0, 0).unwrap();
    /// let end = Utc.with_ymd_and_hms(2025, 5, 1, 17, 0, 0).unwrap();
    /// assert!(TimeRange::new(Some(start), Some(end)).is_err());
    /// assert!(TimeRange::new(Some(start), None).is_ok());
    /// ```
    pub fn new(
        start: Option<DateTime<Utc>>,
        end: Option<DateTime<Utc>>,
    ) -> Result<Self, EventValidationError> {
        match (start, end) {
            (None, Some(_)) => Err(EventValidationError::EndWithoutStart),
            (Some(s), Some(e)) if e < s => Err(EventValidationError::EndBeforeStart),
            _ => Ok(Self { start, end }),
        }
    }

    pub const fn start(&self) -> Option<DateTime<Utc>> {
        self.start
    }

    pub const fn end(&self) -> Option<DateTime<Utc>> {
        self.end
    }
}

/// Stored event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct Event {
    pub id: EventId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company_id: Option<CompanyId>,
    pub created_by: UserId,
    pub title: EventTitle,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_time: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_time: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub place_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub place_link: Option<String>,
    pub status: EventStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Event {
    /// Whether `viewer` may read this event.
    ///
    /// `viewer_is_member` must say whether the viewer belongs to the event's
    /// company; it is ignored for personal events.
    pub fn is_visible_to(&self, viewer: UserId, viewer_is_member: bool) -> bool {
        match self.company_id {
            None => self.created_by == viewer,
            Some(_) => viewer_is_member,
        }
    }

    /// Apply a partial update, revalidating the merged time range.
    pub fn apply(&self, update: &EventUpdate) -> Result<Self, EventValidationError> {
        let range = TimeRange::new(
            update.start_time.or(self.start_time),
            update.end_time.or(self.end_time),
        )?;
        let mut next = self.clone();
        if let Some(title) = &update.title {
            next.title = title.clone();
        }
        if let Some(description) = &update.description {
            next.description = Some(description.clone());
        }
        if let Some(place_name) = &update.place_name {
            next.place_name = Some(place_name.clone());
        }
        if let Some(place_link) = &update.place_link {
            next.place_link = Some(place_link.clone());
        }
        if update.company_id.is_some() {
            next.company_id = update.company_id;
        }
        next.start_time = range.start();
        next.end_time = range.end();
        Ok(next)
    }
}

/// Route family an event operation arrives through.
///
/// Company-scoped operations only see events of that company.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventScope {
    /// `/events`: any event the caller can see.
    Unscoped,
    /// `/companies/{id}/events`.
    Company(CompanyId),
}

impl EventScope {
    /// Whether an event belongs to this scope.
    pub fn contains(self, event: &Event) -> bool {
        match self {
            Self::Unscoped => true,
            Self::Company(company) => event.company_id == Some(company),
        }
    }
}

/// Input for creating an event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewEvent {
    pub company_id: Option<CompanyId>,
    pub created_by: UserId,
    pub title: EventTitle,
    pub description: Option<String>,
    pub time: TimeRange,
    pub place_name: Option<String>,
    pub place_link: Option<String>,
}

/// Partial event update. Absent fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventUpdate {
    pub title: Option<EventTitle>,
    pub description: Option<String>,
    pub start_time: Option<DateTime<Utc>>,
    pub end_time: Option<DateTime<Utc>>,
    pub place_name: Option<String>,
    pub place_link: Option<String>,
    pub company_id: Option<CompanyId>,
}

impl EventUpdate {
    /// Whether the update touches nothing.
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.start_time.is_none()
            && self.end_time.is_none()
            && self.place_name.is_none()
            && self.place_link.is_none()
            && self.company_id.is_none()
    }
}
