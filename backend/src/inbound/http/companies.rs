//! Company handlers.
//!
//! ```text
//! POST   /companies        {"name":"Acme","description":"…"}
//! GET    /companies
//! GET    /companies/{id}
//! PATCH  /companies/{id}   {"name":"Acme Ltd"}
//! DELETE /companies/{id}
//! ```

use actix_web::{HttpResponse, delete, get, patch, post, web};
use serde::{Deserialize, Serialize};
use serde_json::json;
use utoipa::ToSchema;

use crate::domain::{
    Company, CompanyId, CompanyName, CompanyUpdate, CompanyValidationError, Error,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::deadline::within;
use crate::inbound::http::identity::AuthenticatedUser;
use crate::inbound::http::responses::{CreatedResponse, StatusResponse, created, ok};
use crate::inbound::http::state::HttpState;

/// Create request body.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct CreateCompanyRequest {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

/// Partial update body; absent fields are left untouched.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
pub struct UpdateCompanyRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

pub(crate) fn map_company_validation(err: CompanyValidationError) -> Error {
    let field = match err {
        CompanyValidationError::EmptyUpdate => return Error::invalid_request(err.to_string()),
        CompanyValidationError::EmptyName | CompanyValidationError::NameTooLong { .. } => "name",
    };
    Error::invalid_request(err.to_string()).with_details(json!({ "field": field }))
}

/// Create a company owned by the caller.
#[utoipa::path(
    post,
    path = "/companies",
    request_body = CreateCompanyRequest,
    responses(
        (status = 201, description = "Company created", body = CreatedResponse),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["companies"],
    operation_id = "createCompany"
)]
#[post("/companies")]
pub async fn create_company(
    state: web::Data<HttpState>,
    caller: AuthenticatedUser,
    payload: web::Json<CreateCompanyRequest>,
) -> ApiResult<HttpResponse> {
    let CreateCompanyRequest { name, description } = payload.into_inner();
    let name = CompanyName::new(name).map_err(map_company_validation)?;
    let id = within(
        state.request_timeout,
        state
            .companies
            .create_company(caller.id(), name, description),
    )
    .await?;
    Ok(created(id.get()))
}

/// Companies the caller belongs to, newest first.
#[utoipa::path(
    get,
    path = "/companies",
    responses(
        (status = 200, description = "Companies", body = [Company]),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["companies"],
    operation_id = "listCompanies"
)]
#[get("/companies")]
pub async fn list_companies(
    state: web::Data<HttpState>,
    caller: AuthenticatedUser,
) -> ApiResult<web::Json<Vec<Company>>> {
    within(
        state.request_timeout,
        state.companies_query.list_companies(caller.id()),
    )
    .await
    .map(web::Json)
}

/// A company the caller belongs to.
#[utoipa::path(
    get,
    path = "/companies/{id}",
    params(("id" = i64, Path, description = "Company id")),
    responses(
        (status = 200, description = "Company", body = Company),
        (status = 400, description = "Invalid id", body = Error),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 404, description = "Not found or not a member", body = Error)
    ),
    tags = ["companies"],
    operation_id = "getCompany"
)]
#[get("/companies/{id}")]
pub async fn get_company(
    state: web::Data<HttpState>,
    caller: AuthenticatedUser,
    path: web::Path<i64>,
) -> ApiResult<web::Json<Company>> {
    let company = CompanyId::new(path.into_inner());
    within(
        state.request_timeout,
        state.companies_query.get_company(company, caller.id()),
    )
    .await
    .map(web::Json)
}

/// Update a company; owner only.
#[utoipa::path(
    patch,
    path = "/companies/{id}",
    params(("id" = i64, Path, description = "Company id")),
    request_body = UpdateCompanyRequest,
    responses(
        (status = 200, description = "Updated", body = StatusResponse),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 404, description = "Not found or not the owner", body = Error)
    ),
    tags = ["companies"],
    operation_id = "updateCompany"
)]
#[patch("/companies/{id}")]
pub async fn update_company(
    state: web::Data<HttpState>,
    caller: AuthenticatedUser,
    path: web::Path<i64>,
    payload: web::Json<UpdateCompanyRequest>,
) -> ApiResult<HttpResponse> {
    let company = CompanyId::new(path.into_inner());
    let UpdateCompanyRequest { name, description } = payload.into_inner();
    let update = CompanyUpdate::try_from_parts(name.as_deref(), description.as_deref())
        .map_err(map_company_validation)?;
    within(
        state.request_timeout,
        state.companies.update_company(company, caller.id(), update),
    )
    .await?;
    Ok(ok())
}

/// Delete a company; owner only.
#[utoipa::path(
    delete,
    path = "/companies/{id}",
    params(("id" = i64, Path, description = "Company id")),
    responses(
        (status = 200, description = "Deleted", body = StatusResponse),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 404, description = "Not found or not the owner", body = Error)
    ),
    tags = ["companies"],
    operation_id = "deleteCompany"
)]
#[delete("/companies/{id}")]
pub async fn delete_company(
    state: web::Data<HttpState>,
    caller: AuthenticatedUser,
    path: web::Path<i64>,
) -> ApiResult<HttpResponse> {
    let company = CompanyId::new(path.into_inner());
    within(
        state.request_timeout,
        state.companies.delete_company(company, caller.id()),
    )
    .await?;
    Ok(ok())
}
