//! Driving port for event mutations.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::{CompanyId, Error, EventId, EventScope, UserId};

/// Unvalidated create request as received from an adapter.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventDraft {
    pub title: String,
    pub description: Option<String>,
    pub start_time: Option<DateTime<Utc>>,
    pub end_time: Option<DateTime<Utc>>,
    pub place_name: Option<String>,
    pub place_link: Option<String>,
    pub company_id: Option<CompanyId>,
}

/// Unvalidated partial update as received from an adapter.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub start_time: Option<DateTime<Utc>>,
    pub end_time: Option<DateTime<Utc>>,
    pub place_name: Option<String>,
    pub place_link: Option<String>,
    pub company_id: Option<CompanyId>,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait EventCommand: Send + Sync {
    /// Create an event owned by `caller`.
    async fn create_event(
        &self,
        scope: EventScope,
        caller: UserId,
        draft: EventDraft,
    ) -> Result<EventId, Error>;

    /// Update an event created by `caller`.
    async fn update_event(
        &self,
        scope: EventScope,
        event: EventId,
        caller: UserId,
        patch: EventPatch,
    ) -> Result<(), Error>;

    /// Delete an event created by `caller`.
    async fn delete_event(
        &self,
        scope: EventScope,
        event: EventId,
        caller: UserId,
    ) -> Result<(), Error>;
}
