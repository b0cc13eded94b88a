//! Bearer token extractor.
//!
//! Handlers that take an [`AuthenticatedUser`] only run once the
//! `Authorization: Bearer <token>` header resolves to a user id.

use actix_web::http::header::AUTHORIZATION;
use actix_web::{FromRequest, HttpRequest, dev::Payload, web};
use futures_util::future::{Ready, ready};

use crate::domain::{Error, UserId};
use crate::inbound::http::state::HttpState;

const BEARER_PREFIX: &str = "Bearer ";

/// Caller identity resolved from the bearer token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthenticatedUser(pub UserId);

impl AuthenticatedUser {
    pub fn id(self) -> UserId {
        self.0
    }
}

fn bearer_token(req: &HttpRequest) -> Result<&str, Error> {
    let header = req
        .headers()
        .get(AUTHORIZATION)
        .ok_or_else(|| Error::unauthorized("missing bearer token"))?;
    let value = header
        .to_str()
        .map_err(|_| Error::unauthorized("malformed authorization header"))?;
    value
        .strip_prefix(BEARER_PREFIX)
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .ok_or_else(|| Error::unauthorized("malformed authorization header"))
}

fn resolve(req: &HttpRequest) -> Result<AuthenticatedUser, Error> {
    let token = bearer_token(req)?;
    let state = req
        .app_data::<web::Data<HttpState>>()
        .ok_or_else(|| Error::internal("http state is not registered"))?;
    state.auth.authenticate(token).map(AuthenticatedUser)
}

impl FromRequest for AuthenticatedUser {
    type Error = Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(resolve(req))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inbound::http::test_utils::{StateBuilder, read_error};
    use actix_web::http::StatusCode;
    use actix_web::{App, HttpResponse, get, test};
    use mockall::predicate::eq;
    use rstest::rstest;

    #[get("/whoami")]
    async fn whoami(user: AuthenticatedUser) -> HttpResponse {
        HttpResponse::Ok().body(user.id().to_string())
    }

    #[rstest]
    #[actix_web::test]
    async fn valid_tokens_resolve_the_caller() {
        let mut builder = StateBuilder::default();
        builder
            .auth
            .expect_authenticate()
            .with(eq("good"))
            .return_once(|_| Ok(UserId::new(5)));
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(builder.build()))
                .service(whoami),
        )
        .await;

        let req = test::TestRequest::get()
            .uri("/whoami")
            .insert_header((AUTHORIZATION, "Bearer good"))
            .to_request();
        let body = test::call_and_read_body(&app, req).await;
        assert_eq!(body.as_ref(), b"5");
    }

    #[rstest]
    #[case(None)]
    #[case(Some("Basic abc"))]
    #[case(Some("Bearer "))]
    #[actix_web::test]
    async fn missing_or_malformed_headers_are_unauthorised(#[case] header: Option<&str>) {
        let mut builder = StateBuilder::default();
        builder.auth.expect_authenticate().never();
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(builder.build()))
                .service(whoami),
        )
        .await;

        let mut req = test::TestRequest::get().uri("/whoami");
        if let Some(value) = header {
            req = req.insert_header((AUTHORIZATION, value));
        }
        let res = test::call_service(&app, req.to_request()).await;
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    }

    #[rstest]
    #[actix_web::test]
    async fn rejected_tokens_are_unauthorised() {
        let mut builder = StateBuilder::default();
        builder
            .auth
            .expect_authenticate()
            .return_once(|_| Err(Error::unauthorized("invalid token")));
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(builder.build()))
                .service(whoami),
        )
        .await;

        let req = test::TestRequest::get()
            .uri("/whoami")
            .insert_header((AUTHORIZATION, "Bearer stale"))
            .to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
        let error = read_error(res).await;
        assert_eq!(error.message(), "invalid token");
    }
}
