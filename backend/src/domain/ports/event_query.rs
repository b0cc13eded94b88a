//! Driving port for event reads.

use async_trait::async_trait;

use crate::domain::{CompanyId, Error, Event, EventId, EventScope, UserId};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait EventQuery: Send + Sync {
    /// An event visible to the caller within `scope`.
    async fn get_event(
        &self,
        scope: EventScope,
        event: EventId,
        caller: UserId,
    ) -> Result<Event, Error>;

    /// Every event visible to the caller.
    async fn list_events(&self, caller: UserId) -> Result<Vec<Event>, Error>;

    /// Events of a company the caller belongs to.
    async fn list_company_events(
        &self,
        company: CompanyId,
        caller: UserId,
    ) -> Result<Vec<Event>, Error>;
}
