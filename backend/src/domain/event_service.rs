//! Event services.
//!
//! Personal events are reached through `/events`; company events through
//! either route family. A company-scoped call never sees another company's
//! events, so a mismatched path reads as absence.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::json;
use tracing::info;

use crate::domain::ports::{
    EventCommand, EventDraft, EventPatch, EventQuery, EventRepository, EventRepositoryError,
};
use crate::domain::{
    CompanyId, Error, Event, EventId, EventScope, EventTitle, EventUpdate, EventValidationError,
    NewEvent, TimeRange, UserId,
};

fn map_event_error(error: EventRepositoryError) -> Error {
    match error {
        EventRepositoryError::Connection { message } | EventRepositoryError::Query { message } => {
            Error::internal(format!("event repository error: {message}"))
        }
        EventRepositoryError::NotFound => Error::not_found("event not found"),
        EventRepositoryError::NotMember => Error::forbidden("not a member of this company"),
        EventRepositoryError::Invalid { reason } => invalid(&reason),
    }
}

fn invalid(error: &EventValidationError) -> Error {
    Error::invalid_request(error.to_string()).with_details(json!({ "field": error.field() }))
}

fn company_mismatch() -> Error {
    Error::invalid_request("company_id does not match the company in the path")
        .with_details(json!({ "field": "company_id" }))
}

/// Resolve the company an event should land in for this scope.
fn target_company(
    scope: EventScope,
    requested: Option<CompanyId>,
) -> Result<Option<CompanyId>, Error> {
    match (scope, requested) {
        (EventScope::Unscoped, requested) => Ok(requested),
        (EventScope::Company(path), Some(body)) if body != path => Err(company_mismatch()),
        (EventScope::Company(path), _) => Ok(Some(path)),
    }
}

fn validate_patch(scope: EventScope, patch: EventPatch) -> Result<EventUpdate, Error> {
    let EventPatch {
        title,
        description,
        start_time,
        end_time,
        place_name,
        place_link,
        company_id,
    } = patch;
    let title = title
        .map(EventTitle::new)
        .transpose()
        .map_err(|err| invalid(&err))?;
    if description.as_deref().is_some_and(|text| text.trim().is_empty()) {
        return Err(invalid(&EventValidationError::EmptyDescription));
    }
    let company_id = match scope {
        EventScope::Unscoped => company_id,
        EventScope::Company(path) => match company_id {
            Some(body) if body != path => return Err(company_mismatch()),
            _ => None,
        },
    };
    let update = EventUpdate {
        title,
        description,
        start_time,
        end_time,
        place_name,
        place_link,
        company_id,
    };
    if update.is_empty() {
        return Err(invalid(&EventValidationError::EmptyUpdate));
    }
    Ok(update)
}

/// Event service implementing [`EventCommand`] and [`EventQuery`].
pub struct EventService<R: ?Sized> {
    repo: Arc<R>,
}

impl<R: ?Sized> EventService<R> {
    pub fn new(repo: Arc<R>) -> Self {
        Self { repo }
    }
}

impl<R> EventService<R>
where
    R: EventRepository + ?Sized,
{
    async fn visible_in_scope(
        &self,
        scope: EventScope,
        event: EventId,
        caller: UserId,
    ) -> Result<Event, Error> {
        self.repo
            .get_event(event, caller)
            .await
            .map_err(map_event_error)?
            .filter(|found| scope.contains(found))
            .ok_or_else(|| Error::not_found("event not found"))
    }
}

#[async_trait]
impl<R> EventCommand for EventService<R>
where
    R: EventRepository + ?Sized,
{
    async fn create_event(
        &self,
        scope: EventScope,
        caller: UserId,
        draft: EventDraft,
    ) -> Result<EventId, Error> {
        let title = EventTitle::new(&draft.title).map_err(|err| invalid(&err))?;
        let time =
            TimeRange::new(draft.start_time, draft.end_time).map_err(|err| invalid(&err))?;
        let event = NewEvent {
            company_id: target_company(scope, draft.company_id)?,
            created_by: caller,
            title,
            description: draft.description,
            time,
            place_name: draft.place_name,
            place_link: draft.place_link,
        };
        let id = self
            .repo
            .create_event(&event)
            .await
            .map_err(map_event_error)?;
        info!(event_id = %id, creator = %caller, "event created");
        Ok(id)
    }

    async fn update_event(
        &self,
        scope: EventScope,
        event: EventId,
        caller: UserId,
        patch: EventPatch,
    ) -> Result<(), Error> {
        let update = validate_patch(scope, patch)?;
        if let EventScope::Company(_) = scope {
            self.visible_in_scope(scope, event, caller).await?;
        }
        self.repo
            .update_event(event, caller, &update)
            .await
            .map_err(map_event_error)
    }

    async fn delete_event(
        &self,
        scope: EventScope,
        event: EventId,
        caller: UserId,
    ) -> Result<(), Error> {
        if let EventScope::Company(_) = scope {
            self.visible_in_scope(scope, event, caller).await?;
        }
        self.repo
            .delete_event(event, caller)
            .await
            .map_err(map_event_error)?;
        info!(event_id = %event, "event deleted");
        Ok(())
    }
}

#[async_trait]
impl<R> EventQuery for EventService<R>
where
    R: EventRepository + ?Sized,
{
    async fn get_event(
        &self,
        scope: EventScope,
        event: EventId,
        caller: UserId,
    ) -> Result<Event, Error> {
        self.visible_in_scope(scope, event, caller).await
    }

    async fn list_events(&self, caller: UserId) -> Result<Vec<Event>, Error> {
        self.repo
            .list_events(caller)
            .await
            .map_err(map_event_error)
    }

    async fn list_company_events(
        &self,
        company: CompanyId,
        caller: UserId,
    ) -> Result<Vec<Event>, Error> {
        self.repo
            .list_company_events(company, caller)
            .await
            .map_err(map_event_error)
    }
}

#[cfg(test)]
#[path = "event_service_tests.rs"]
mod tests;
