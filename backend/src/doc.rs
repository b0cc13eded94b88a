//! OpenAPI documentation configuration.
//!
//! [`ApiDoc`] registers every HTTP endpoint from the inbound layer, the
//! domain payloads they exchange, and the bearer-token security scheme. The
//! document backs Swagger UI in debug builds and is exported via
//! `cargo run --bin openapi-dump` for external tooling.

use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::domain::{
    AccessToken, Company, CompanyInvitation, Error, ErrorCode, Event, EventStatus,
    InvitationStatus, InvitationView, MemberRole,
};
use crate::inbound::http::auth::{SignInRequest, SignUpRequest, TokenResponse};
use crate::inbound::http::companies::{CreateCompanyRequest, UpdateCompanyRequest};
use crate::inbound::http::events::{CreateEventRequest, UpdateEventRequest};
use crate::inbound::http::health::HealthReport;
use crate::inbound::http::invitations::InviteRequest;
use crate::inbound::http::responses::{CreatedResponse, StatusResponse};

/// Name of the bearer security scheme referenced by protected operations.
pub const BEARER_SCHEME: &str = "BearerAuth";

/// Enrich the generated document with the bearer token security scheme.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);

        let mut scheme = Http::new(HttpAuthScheme::Bearer);
        scheme.bearer_format = Some("JWT".to_owned());
        scheme.description = Some("Token issued by POST /auth/sign-up or /auth/sign-in.".to_owned());
        components.add_security_scheme(BEARER_SCHEME, SecurityScheme::Http(scheme));
    }
}

/// OpenAPI document for the REST API.
#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(
        title = "Crewplan backend API",
        description = "Accounts, companies with invitations, and events scheduled by their members."
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    security(("BearerAuth" = [])),
    paths(
        crate::inbound::http::auth::sign_up,
        crate::inbound::http::auth::sign_in,
        crate::inbound::http::companies::create_company,
        crate::inbound::http::companies::list_companies,
        crate::inbound::http::companies::get_company,
        crate::inbound::http::companies::update_company,
        crate::inbound::http::companies::delete_company,
        crate::inbound::http::invitations::invite_user,
        crate::inbound::http::invitations::list_invitations,
        crate::inbound::http::invitations::accept_invitation,
        crate::inbound::http::invitations::decline_invitation,
        crate::inbound::http::events::create_event,
        crate::inbound::http::events::list_events,
        crate::inbound::http::events::get_event,
        crate::inbound::http::events::update_event,
        crate::inbound::http::events::delete_event,
        crate::inbound::http::events::create_company_event,
        crate::inbound::http::events::list_company_events,
        crate::inbound::http::events::get_company_event,
        crate::inbound::http::events::update_company_event,
        crate::inbound::http::events::delete_company_event,
        crate::inbound::http::health::health,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(
        Error,
        ErrorCode,
        AccessToken,
        SignUpRequest,
        SignInRequest,
        TokenResponse,
        CreatedResponse,
        StatusResponse,
        Company,
        MemberRole,
        CreateCompanyRequest,
        UpdateCompanyRequest,
        CompanyInvitation,
        InvitationStatus,
        InvitationView,
        InviteRequest,
        Event,
        EventStatus,
        CreateEventRequest,
        UpdateEventRequest,
        HealthReport,
    )),
    tags(
        (name = "auth", description = "Sign-up and sign-in"),
        (name = "companies", description = "Companies owned or joined by the caller"),
        (name = "invitations", description = "Company membership invitations"),
        (name = "events", description = "Personal and company events"),
        (name = "health", description = "Endpoints for health checks")
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::{fixture, rstest};
    use utoipa::openapi::RefOr;
    use utoipa::openapi::schema::Schema;

    #[fixture]
    fn doc() -> utoipa::openapi::OpenApi {
        ApiDoc::openapi()
    }

    fn schema<'a>(doc: &'a utoipa::openapi::OpenApi, name: &str) -> &'a RefOr<Schema> {
        doc.components
            .as_ref()
            .expect("components")
            .schemas
            .get(name)
            .unwrap_or_else(|| panic!("{name} schema registered"))
    }

    fn assert_has_field(schema: &RefOr<Schema>, field: &str) {
        match schema {
            RefOr::T(Schema::Object(obj)) => assert!(
                obj.properties.contains_key(field),
                "schema should have field '{field}'"
            ),
            _ => panic!("expected Object schema"),
        }
    }

    #[rstest]
    #[case("/auth/sign-up")]
    #[case("/companies/invitations")]
    #[case("/companies/{id}/invitations")]
    #[case("/companies/{company_id}/events/{event_id}")]
    #[case("/events/{id}")]
    #[case("/health")]
    fn documents_route(doc: utoipa::openapi::OpenApi, #[case] path: &str) {
        assert!(doc.paths.paths.contains_key(path), "{path} is documented");
    }

    #[rstest]
    fn error_schema_lists_code_and_message(doc: utoipa::openapi::OpenApi) {
        let error = schema(&doc, "Error");
        assert_has_field(error, "code");
        assert_has_field(error, "message");
    }

    #[rstest]
    fn event_schema_uses_snake_case(doc: utoipa::openapi::OpenApi) {
        let event = schema(&doc, "Event");
        assert_has_field(event, "company_id");
        assert_has_field(event, "place_link");
    }

    #[rstest]
    fn bearer_scheme_is_registered(doc: utoipa::openapi::OpenApi) {
        let components = doc.components.as_ref().expect("components");
        assert!(components.security_schemes.contains_key(BEARER_SCHEME));
    }
}
