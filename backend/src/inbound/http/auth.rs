//! Account handlers.
//!
//! ```text
//! POST /auth/sign-up {"email":"ann@example.com","username":"ann","password":"hunter22"}
//! POST /auth/sign-in {"email":"ann@example.com","password":"hunter22"}
//! ```

use actix_web::{HttpResponse, post, web};
use serde::{Deserialize, Serialize};
use serde_json::json;
use utoipa::ToSchema;

use crate::domain::{
    AccessToken, CredentialsValidationError, Error, SignInCredentials, SignUpCredentials,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::deadline::within;
use crate::inbound::http::state::HttpState;

/// Sign-up request body.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct SignUpRequest {
    pub email: String,
    pub username: String,
    pub password: String,
}

/// Sign-in request body.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct SignInRequest {
    pub email: String,
    pub password: String,
}

/// Bearer token issued on success.
#[derive(Debug, Serialize, ToSchema)]
pub struct TokenResponse {
    #[schema(value_type = String)]
    pub token: AccessToken,
}

fn map_credentials_error(err: CredentialsValidationError) -> Error {
    Error::invalid_request(err.to_string()).with_details(json!({ "field": err.field() }))
}

/// Register an account and return its first token.
#[utoipa::path(
    post,
    path = "/auth/sign-up",
    request_body = SignUpRequest,
    responses(
        (status = 200, description = "Account created", body = TokenResponse),
        (status = 400, description = "Invalid request", body = Error),
        (status = 409, description = "Account already exists", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["auth"],
    operation_id = "signUp",
    security([])
)]
#[post("/auth/sign-up")]
pub async fn sign_up(
    state: web::Data<HttpState>,
    payload: web::Json<SignUpRequest>,
) -> ApiResult<HttpResponse> {
    let SignUpRequest {
        email,
        username,
        password,
    } = payload.into_inner();
    let credentials = SignUpCredentials::try_from_parts(&email, &username, &password)
        .map_err(map_credentials_error)?;
    let token = within(state.request_timeout, state.auth.sign_up(&credentials)).await?;
    Ok(HttpResponse::Ok().json(TokenResponse { token }))
}

/// Exchange credentials for a token.
#[utoipa::path(
    post,
    path = "/auth/sign-in",
    request_body = SignInRequest,
    responses(
        (status = 200, description = "Signed in", body = TokenResponse),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Invalid credentials", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["auth"],
    operation_id = "signIn",
    security([])
)]
#[post("/auth/sign-in")]
pub async fn sign_in(
    state: web::Data<HttpState>,
    payload: web::Json<SignInRequest>,
) -> ApiResult<HttpResponse> {
    let SignInRequest { email, password } = payload.into_inner();
    let credentials =
        SignInCredentials::try_from_parts(&email, &password).map_err(map_credentials_error)?;
    let token = within(state.request_timeout, state.auth.sign_in(&credentials)).await?;
    Ok(HttpResponse::Ok().json(TokenResponse { token }))
}
