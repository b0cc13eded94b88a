//! Port for event persistence.
use async_trait::async_trait;

use crate::domain::{
    CompanyId, Event, EventId, EventUpdate, EventValidationError, NewEvent, UserId,
};

use super::define_port_error;

define_port_error! {
    /// Errors raised by event repository adapters.
    pub enum EventRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } => "event repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "event repository query failed: {message}",
        /// Event absent, invisible, or not created by the caller.
        NotFound => "event not found",
        /// Caller is not a member of the target company.
        NotMember => "user is not a member of the company",
        /// Merged event failed validation.
        Invalid { reason: EventValidationError } => "{reason}",
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait EventRepository: Send + Sync {
    /// Insert an event; company events require the creator's membership.
    async fn create_event(&self, event: &NewEvent) -> Result<EventId, EventRepositoryError>;

    /// Fetch an event visible to the viewer.
    async fn get_event(
        &self,
        event: EventId,
        viewer: UserId,
    ) -> Result<Option<Event>, EventRepositoryError>;

    /// Every event visible to the viewer, newest first.
    async fn list_events(&self, viewer: UserId) -> Result<Vec<Event>, EventRepositoryError>;

    /// Events of one company, newest first; the viewer must be a member.
    async fn list_company_events(
        &self,
        company: CompanyId,
        viewer: UserId,
    ) -> Result<Vec<Event>, EventRepositoryError>;

    /// Apply a partial update to an event created by `editor`.
    ///
    /// Moving the event into a company requires the editor's membership.
    async fn update_event(
        &self,
        event: EventId,
        editor: UserId,
        update: &EventUpdate,
    ) -> Result<(), EventRepositoryError>;

    /// Delete an event created by `editor`.
    async fn delete_event(&self, event: EventId, editor: UserId)
    -> Result<(), EventRepositoryError>;
}
