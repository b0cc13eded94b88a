//! Test helpers for inbound HTTP components.

use actix_web::body::MessageBody;
use actix_web::dev::ServiceResponse;
use actix_web::test;
use std::sync::Arc;
use std::time::Duration;

use crate::domain::Error;
use crate::domain::ports::{
    MockAuthService, MockCompanyCommand, MockCompanyQuery, MockEventCommand, MockEventQuery,
};
use crate::inbound::http::state::{HttpState, HttpStatePorts};

/// Mocked ports; set expectations on the fields, then [`StateBuilder::build`].
#[derive(Default)]
pub struct StateBuilder {
    pub auth: MockAuthService,
    pub companies: MockCompanyCommand,
    pub companies_query: MockCompanyQuery,
    pub events: MockEventCommand,
    pub events_query: MockEventQuery,
    pub timeout: Option<Duration>,
}

impl StateBuilder {
    /// Builder whose token check accepts any bearer token as `caller`.
    pub fn authenticated_as(caller: i64) -> Self {
        let mut builder = Self::default();
        builder
            .auth
            .expect_authenticate()
            .returning(move |_| Ok(crate::domain::UserId::new(caller)));
        builder
    }

    pub fn build(self) -> HttpState {
        let state = HttpState::new(HttpStatePorts {
            auth: Arc::new(self.auth),
            companies: Arc::new(self.companies),
            companies_query: Arc::new(self.companies_query),
            events: Arc::new(self.events),
            events_query: Arc::new(self.events_query),
        });
        match self.timeout {
            Some(timeout) => state.with_request_timeout(timeout),
            None => state,
        }
    }
}

/// Decode an error body.
pub async fn read_error<B>(res: ServiceResponse<B>) -> Error
where
    B: MessageBody,
{
    test::read_body_json(res).await
}
