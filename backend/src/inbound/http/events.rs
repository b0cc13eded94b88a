//! Event handlers for personal and company-scoped routes.
//!
//! ```text
//! POST|GET            /events
//! GET|PATCH|DELETE    /events/{id}
//! POST|GET            /companies/{id}/events
//! GET|PATCH|DELETE    /companies/{company_id}/events/{event_id}
//! ```

use actix_web::{HttpResponse, delete, get, patch, post, web};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::ports::{EventDraft, EventPatch};
use crate::domain::{CompanyId, Error, Event, EventId, EventScope};
use crate::inbound::http::ApiResult;
use crate::inbound::http::deadline::within;
use crate::inbound::http::identity::AuthenticatedUser;
use crate::inbound::http::responses::{CreatedResponse, StatusResponse, created, ok};
use crate::inbound::http::state::HttpState;

/// Create body. `company_id` on personal routes files the event under a
/// company the caller belongs to.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
pub struct CreateEventRequest {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub start_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub end_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub place_name: Option<String>,
    #[serde(default)]
    pub place_link: Option<String>,
    #[serde(default)]
    #[schema(value_type = Option<i64>)]
    pub company_id: Option<CompanyId>,
}

impl From<CreateEventRequest> for EventDraft {
    fn from(value: CreateEventRequest) -> Self {
        Self {
            title: value.title,
            description: value.description,
            start_time: value.start_time,
            end_time: value.end_time,
            place_name: value.place_name,
            place_link: value.place_link,
            company_id: value.company_id,
        }
    }
}

/// Partial update body; absent fields are left untouched.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
pub struct UpdateEventRequest {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub start_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub end_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub place_name: Option<String>,
    #[serde(default)]
    pub place_link: Option<String>,
    #[serde(default)]
    #[schema(value_type = Option<i64>)]
    pub company_id: Option<CompanyId>,
}

impl From<UpdateEventRequest> for EventPatch {
    fn from(value: UpdateEventRequest) -> Self {
        Self {
            title: value.title,
            description: value.description,
            start_time: value.start_time,
            end_time: value.end_time,
            place_name: value.place_name,
            place_link: value.place_link,
            company_id: value.company_id,
        }
    }
}

async fn create_in(
    state: &HttpState,
    scope: EventScope,
    caller: AuthenticatedUser,
    body: CreateEventRequest,
) -> ApiResult<HttpResponse> {
    let id = within(
        state.request_timeout,
        state.events.create_event(scope, caller.id(), body.into()),
    )
    .await?;
    Ok(created(id.get()))
}

async fn get_in(
    state: &HttpState,
    scope: EventScope,
    event: EventId,
    caller: AuthenticatedUser,
) -> ApiResult<web::Json<Event>> {
    within(
        state.request_timeout,
        state.events_query.get_event(scope, event, caller.id()),
    )
    .await
    .map(web::Json)
}

async fn update_in(
    state: &HttpState,
    scope: EventScope,
    event: EventId,
    caller: AuthenticatedUser,
    body: UpdateEventRequest,
) -> ApiResult<HttpResponse> {
    within(
        state.request_timeout,
        state
            .events
            .update_event(scope, event, caller.id(), body.into()),
    )
    .await?;
    Ok(ok())
}

async fn delete_in(
    state: &HttpState,
    scope: EventScope,
    event: EventId,
    caller: AuthenticatedUser,
) -> ApiResult<HttpResponse> {
    within(
        state.request_timeout,
        state.events.delete_event(scope, event, caller.id()),
    )
    .await?;
    Ok(ok())
}

/// Create a personal event, or a company event via `company_id`.
#[utoipa::path(
    post,
    path = "/events",
    request_body = CreateEventRequest,
    responses(
        (status = 201, description = "Event created", body = CreatedResponse),
        (status = 400, description = "Invalid request", body = Error),
        (status = 403, description = "Not a member of the target company", body = Error)
    ),
    tags = ["events"],
    operation_id = "createEvent"
)]
#[post("/events")]
pub async fn create_event(
    state: web::Data<HttpState>,
    caller: AuthenticatedUser,
    payload: web::Json<CreateEventRequest>,
) -> ApiResult<HttpResponse> {
    create_in(&state, EventScope::Unscoped, caller, payload.into_inner()).await
}

/// Every event the caller can see, newest first.
#[utoipa::path(
    get,
    path = "/events",
    responses(
        (status = 200, description = "Events", body = [Event]),
        (status = 401, description = "Unauthorised", body = Error)
    ),
    tags = ["events"],
    operation_id = "listEvents"
)]
#[get("/events")]
pub async fn list_events(
    state: web::Data<HttpState>,
    caller: AuthenticatedUser,
) -> ApiResult<web::Json<Vec<Event>>> {
    within(
        state.request_timeout,
        state.events_query.list_events(caller.id()),
    )
    .await
    .map(web::Json)
}

/// An event visible to the caller.
#[utoipa::path(
    get,
    path = "/events/{id}",
    params(("id" = i64, Path, description = "Event id")),
    responses(
        (status = 200, description = "Event", body = Event),
        (status = 404, description = "Not found or not visible", body = Error)
    ),
    tags = ["events"],
    operation_id = "getEvent"
)]
#[get("/events/{id}")]
pub async fn get_event(
    state: web::Data<HttpState>,
    caller: AuthenticatedUser,
    path: web::Path<i64>,
) -> ApiResult<web::Json<Event>> {
    let event = EventId::new(path.into_inner());
    get_in(&state, EventScope::Unscoped, event, caller).await
}

/// Update an event the caller created.
#[utoipa::path(
    patch,
    path = "/events/{id}",
    params(("id" = i64, Path, description = "Event id")),
    request_body = UpdateEventRequest,
    responses(
        (status = 200, description = "Updated", body = StatusResponse),
        (status = 400, description = "Invalid request", body = Error),
        (status = 404, description = "Not found or not the creator", body = Error)
    ),
    tags = ["events"],
    operation_id = "updateEvent"
)]
#[patch("/events/{id}")]
pub async fn update_event(
    state: web::Data<HttpState>,
    caller: AuthenticatedUser,
    path: web::Path<i64>,
    payload: web::Json<UpdateEventRequest>,
) -> ApiResult<HttpResponse> {
    let event = EventId::new(path.into_inner());
    update_in(
        &state,
        EventScope::Unscoped,
        event,
        caller,
        payload.into_inner(),
    )
    .await
}

/// Delete an event the caller created.
#[utoipa::path(
    delete,
    path = "/events/{id}",
    params(("id" = i64, Path, description = "Event id")),
    responses(
        (status = 200, description = "Deleted", body = StatusResponse),
        (status = 404, description = "Not found or not the creator", body = Error)
    ),
    tags = ["events"],
    operation_id = "deleteEvent"
)]
#[delete("/events/{id}")]
pub async fn delete_event(
    state: web::Data<HttpState>,
    caller: AuthenticatedUser,
    path: web::Path<i64>,
) -> ApiResult<HttpResponse> {
    let event = EventId::new(path.into_inner());
    delete_in(&state, EventScope::Unscoped, event, caller).await
}

/// Create an event inside a company the caller belongs to.
#[utoipa::path(
    post,
    path = "/companies/{id}/events",
    params(("id" = i64, Path, description = "Company id")),
    request_body = CreateEventRequest,
    responses(
        (status = 201, description = "Event created", body = CreatedResponse),
        (status = 400, description = "Invalid request or mismatched company", body = Error),
        (status = 403, description = "Not a member", body = Error)
    ),
    tags = ["events"],
    operation_id = "createCompanyEvent"
)]
#[post("/companies/{id}/events")]
pub async fn create_company_event(
    state: web::Data<HttpState>,
    caller: AuthenticatedUser,
    path: web::Path<i64>,
    payload: web::Json<CreateEventRequest>,
) -> ApiResult<HttpResponse> {
    let scope = EventScope::Company(CompanyId::new(path.into_inner()));
    create_in(&state, scope, caller, payload.into_inner()).await
}

/// Events of a company the caller belongs to, newest first.
#[utoipa::path(
    get,
    path = "/companies/{id}/events",
    params(("id" = i64, Path, description = "Company id")),
    responses(
        (status = 200, description = "Events", body = [Event]),
        (status = 403, description = "Not a member", body = Error)
    ),
    tags = ["events"],
    operation_id = "listCompanyEvents"
)]
#[get("/companies/{id}/events")]
pub async fn list_company_events(
    state: web::Data<HttpState>,
    caller: AuthenticatedUser,
    path: web::Path<i64>,
) -> ApiResult<web::Json<Vec<Event>>> {
    let company = CompanyId::new(path.into_inner());
    within(
        state.request_timeout,
        state.events_query.list_company_events(company, caller.id()),
    )
    .await
    .map(web::Json)
}

/// A company event visible to the caller.
#[utoipa::path(
    get,
    path = "/companies/{company_id}/events/{event_id}",
    params(
        ("company_id" = i64, Path, description = "Company id"),
        ("event_id" = i64, Path, description = "Event id")
    ),
    responses(
        (status = 200, description = "Event", body = Event),
        (status = 404, description = "Not found in this company", body = Error)
    ),
    tags = ["events"],
    operation_id = "getCompanyEvent"
)]
#[get("/companies/{company_id}/events/{event_id}")]
pub async fn get_company_event(
    state: web::Data<HttpState>,
    caller: AuthenticatedUser,
    path: web::Path<(i64, i64)>,
) -> ApiResult<web::Json<Event>> {
    let (company, event) = path.into_inner();
    let scope = EventScope::Company(CompanyId::new(company));
    get_in(&state, scope, EventId::new(event), caller).await
}

/// Update a company event the caller created.
#[utoipa::path(
    patch,
    path = "/companies/{company_id}/events/{event_id}",
    params(
        ("company_id" = i64, Path, description = "Company id"),
        ("event_id" = i64, Path, description = "Event id")
    ),
    request_body = UpdateEventRequest,
    responses(
        (status = 200, description = "Updated", body = StatusResponse),
        (status = 400, description = "Invalid request or mismatched company", body = Error),
        (status = 404, description = "Not found in this company", body = Error)
    ),
    tags = ["events"],
    operation_id = "updateCompanyEvent"
)]
#[patch("/companies/{company_id}/events/{event_id}")]
pub async fn update_company_event(
    state: web::Data<HttpState>,
    caller: AuthenticatedUser,
    path: web::Path<(i64, i64)>,
    payload: web::Json<UpdateEventRequest>,
) -> ApiResult<HttpResponse> {
    let (company, event) = path.into_inner();
    let scope = EventScope::Company(CompanyId::new(company));
    update_in(
        &state,
        scope,
        EventId::new(event),
        caller,
        payload.into_inner(),
    )
    .await
}

/// Delete a company event the caller created.
#[utoipa::path(
    delete,
    path = "/companies/{company_id}/events/{event_id}",
    params(
        ("company_id" = i64, Path, description = "Company id"),
        ("event_id" = i64, Path, description = "Event id")
    ),
    responses(
        (status = 200, description = "Deleted", body = StatusResponse),
        (status = 404, description = "Not found in this company", body = Error)
    ),
    tags = ["events"],
    operation_id = "deleteCompanyEvent"
)]
#[delete("/companies/{company_id}/events/{event_id}")]
pub async fn delete_company_event(
    state: web::Data<HttpState>,
    caller: AuthenticatedUser,
    path: web::Path<(i64, i64)>,
) -> ApiResult<HttpResponse> {
    let (company, event) = path.into_inner();
    let scope = EventScope::Company(CompanyId::new(company));
    delete_in(&state, scope, EventId::new(event), caller).await
}
