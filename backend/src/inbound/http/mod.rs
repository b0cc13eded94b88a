//! HTTP inbound adapter exposing REST endpoints.
//!
//! [`configure`] registers every route together with the extractor error
//! handlers, so the server and the integration tests share one route table.

pub mod auth;
pub mod companies;
pub mod deadline;
pub mod error;
pub mod events;
pub mod health;
pub mod identity;
pub mod invitations;
pub mod responses;
pub mod state;
#[cfg(test)]
pub mod test_utils;

use actix_web::web;

pub use error::ApiResult;

/// Register the API routes and request-body/path error handlers.
///
/// The literal `/companies/invitations` routes are registered ahead of the
/// parameterised `/companies/{id}` family.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::JsonConfig::default().error_handler(error::json_error_handler))
        .app_data(web::PathConfig::default().error_handler(error::path_error_handler))
        .service(health::health)
        .service(health::ready)
        .service(health::live)
        .service(auth::sign_up)
        .service(auth::sign_in)
        .service(invitations::list_invitations)
        .service(invitations::accept_invitation)
        .service(invitations::decline_invitation)
        .service(companies::create_company)
        .service(companies::list_companies)
        .service(companies::get_company)
        .service(companies::update_company)
        .service(companies::delete_company)
        .service(invitations::invite_user)
        .service(events::create_company_event)
        .service(events::list_company_events)
        .service(events::get_company_event)
        .service(events::update_company_event)
        .service(events::delete_company_event)
        .service(events::create_event)
        .service(events::list_events)
        .service(events::get_event)
        .service(events::update_event)
        .service(events::delete_event);
}
