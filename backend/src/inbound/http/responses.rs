//! Small JSON bodies shared by mutation endpoints.

use actix_web::HttpResponse;
use serde::Serialize;
use utoipa::ToSchema;

/// `{"id": …}` returned by create endpoints.
#[derive(Debug, Serialize, ToSchema)]
pub struct CreatedResponse {
    pub id: i64,
}

/// `{"status": "ok"}` returned by updates and deletes.
#[derive(Debug, Serialize, ToSchema)]
pub struct StatusResponse {
    #[schema(example = "ok")]
    pub status: &'static str,
}

pub(crate) fn created(id: i64) -> HttpResponse {
    HttpResponse::Created().json(CreatedResponse { id })
}

pub(crate) fn ok() -> HttpResponse {
    HttpResponse::Ok().json(StatusResponse { status: "ok" })
}
