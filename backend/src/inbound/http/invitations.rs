//! Invitation handlers.
//!
//! ```text
//! POST /companies/{id}/invitations          {"username":"bob"}
//! GET  /companies/invitations
//! POST /companies/invitations/{id}/accept
//! POST /companies/invitations/{id}/decline
//! ```
//!
//! The `/companies/invitations` routes must be registered before
//! `/companies/{id}` so the literal segment wins.

use actix_web::{HttpResponse, get, post, web};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{CompanyId, CompanyInvitation, Error, InvitationId, InvitationView};
use crate::inbound::http::ApiResult;
use crate::inbound::http::deadline::within;
use crate::inbound::http::identity::AuthenticatedUser;
use crate::inbound::http::responses::{StatusResponse, ok};
use crate::inbound::http::state::HttpState;

/// Invite request body.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct InviteRequest {
    pub username: String,
}

/// Invite a user to a company; owner only.
#[utoipa::path(
    post,
    path = "/companies/{id}/invitations",
    params(("id" = i64, Path, description = "Company id")),
    request_body = InviteRequest,
    responses(
        (status = 201, description = "Invitation issued", body = CompanyInvitation),
        (status = 400, description = "Invalid request or self-invitation", body = Error),
        (status = 403, description = "Caller does not own the company", body = Error),
        (status = 404, description = "Company not found, or no user has that name", body = Error),
        (status = 409, description = "Already a member or already invited", body = Error)
    ),
    tags = ["invitations"],
    operation_id = "inviteUser"
)]
#[post("/companies/{id}/invitations")]
pub async fn invite_user(
    state: web::Data<HttpState>,
    caller: AuthenticatedUser,
    path: web::Path<i64>,
    payload: web::Json<InviteRequest>,
) -> ApiResult<HttpResponse> {
    let company = CompanyId::new(path.into_inner());
    let username = payload.into_inner().username;
    let invitation = within(
        state.request_timeout,
        state.companies.invite(company, caller.id(), username),
    )
    .await?;
    Ok(HttpResponse::Created().json(invitation))
}

/// Pending invitations addressed to the caller, newest first.
#[utoipa::path(
    get,
    path = "/companies/invitations",
    responses(
        (status = 200, description = "Pending invitations", body = [InvitationView]),
        (status = 401, description = "Unauthorised", body = Error)
    ),
    tags = ["invitations"],
    operation_id = "listInvitations"
)]
#[get("/companies/invitations")]
pub async fn list_invitations(
    state: web::Data<HttpState>,
    caller: AuthenticatedUser,
) -> ApiResult<web::Json<Vec<InvitationView>>> {
    within(
        state.request_timeout,
        state.companies_query.list_invitations(caller.id()),
    )
    .await
    .map(web::Json)
}

/// Accept an invitation and join the company.
#[utoipa::path(
    post,
    path = "/companies/invitations/{id}/accept",
    params(("id" = i64, Path, description = "Invitation id")),
    responses(
        (status = 200, description = "Joined", body = StatusResponse),
        (status = 404, description = "Invitation not found", body = Error),
        (status = 409, description = "Invitation already handled", body = Error)
    ),
    tags = ["invitations"],
    operation_id = "acceptInvitation"
)]
#[post("/companies/invitations/{id}/accept")]
pub async fn accept_invitation(
    state: web::Data<HttpState>,
    caller: AuthenticatedUser,
    path: web::Path<i64>,
) -> ApiResult<HttpResponse> {
    let invitation = InvitationId::new(path.into_inner());
    within(
        state.request_timeout,
        state.companies.accept_invitation(invitation, caller.id()),
    )
    .await?;
    Ok(ok())
}

/// Decline a pending invitation.
#[utoipa::path(
    post,
    path = "/companies/invitations/{id}/decline",
    params(("id" = i64, Path, description = "Invitation id")),
    responses(
        (status = 200, description = "Declined", body = StatusResponse),
        (status = 404, description = "No pending invitation for the caller", body = Error)
    ),
    tags = ["invitations"],
    operation_id = "declineInvitation"
)]
#[post("/companies/invitations/{id}/decline")]
pub async fn decline_invitation(
    state: web::Data<HttpState>,
    caller: AuthenticatedUser,
    path: web::Path<i64>,
) -> ApiResult<HttpResponse> {
    let invitation = InvitationId::new(path.into_inner());
    within(
        state.request_timeout,
        state.companies.decline_invitation(invitation, caller.id()),
    )
    .await?;
    Ok(ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{InvitationStatus, UserId};
    use crate::inbound::http::test_utils::{StateBuilder, read_error};
    use actix_web::http::StatusCode;
    use actix_web::http::header::AUTHORIZATION;
    use actix_web::{App, test};
    use chrono::{TimeZone, Utc};
    use mockall::predicate::eq;
    use rstest::rstest;
    use serde_json::{Value, json};

    async fn call(builder: StateBuilder, req: test::TestRequest) -> actix_web::dev::ServiceResponse {
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(builder.build()))
                .service(list_invitations)
                .service(accept_invitation)
                .service(decline_invitation)
                .service(invite_user),
        )
        .await;
        let req = req.insert_header((AUTHORIZATION, "Bearer t")).to_request();
        test::call_service(&app, req).await
    }

    #[rstest]
    #[actix_web::test]
    async fn invite_returns_the_created_invitation() {
        let mut builder = StateBuilder::authenticated_as(1);
        builder
            .companies
            .expect_invite()
            .withf(|company, caller, username| {
                *company == CompanyId::new(4)
                    && *caller == UserId::new(1)
                    && username == "bob"
            })
            .return_once(|company, caller, _| {
                Ok(CompanyInvitation {
                    id: InvitationId::new(10),
                    company_id: company,
                    invited_user_id: UserId::new(2),
                    invited_by: caller,
                    status: InvitationStatus::Pending,
                    created_at: Utc
                        .with_ymd_and_hms(2025, 1, 1, 0, 0, 0)
                        .single()
                        .expect("valid time"),
                    responded_at: None,
                })
            });

        let res = call(
            builder,
            test::TestRequest::post()
                .uri("/companies/4/invitations")
                .set_json(json!({"username": "bob"})),
        )
        .await;
        assert_eq!(res.status(), StatusCode::CREATED);
        let body: Value = test::read_body_json(res).await;
        assert_eq!(body["id"], json!(10));
        assert_eq!(body["status"], json!("pending"));
    }

    #[rstest]
    #[actix_web::test]
    async fn non_owner_invites_are_forbidden() {
        let mut builder = StateBuilder::authenticated_as(2);
        builder
            .companies
            .expect_invite()
            .return_once(|_, _, _| Err(Error::forbidden("only company owner can invite")));

        let res = call(
            builder,
            test::TestRequest::post()
                .uri("/companies/4/invitations")
                .set_json(json!({"username": "carol"})),
        )
        .await;
        assert_eq!(res.status(), StatusCode::FORBIDDEN);
    }

    #[rstest]
    #[actix_web::test]
    async fn literal_invitations_path_is_not_a_company_id() {
        let mut builder = StateBuilder::authenticated_as(2);
        builder
            .companies_query
            .expect_list_invitations()
            .with(eq(UserId::new(2)))
            .return_once(|_| Ok(vec![]));

        let res = call(builder, test::TestRequest::get().uri("/companies/invitations")).await;
        assert_eq!(res.status(), StatusCode::OK);
        let body: Value = test::read_body_json(res).await;
        assert_eq!(body, json!([]));
    }

    #[rstest]
    #[case("accept", StatusCode::CONFLICT, Error::conflict("invitation already handled"))]
    #[case("decline", StatusCode::NOT_FOUND, Error::not_found("invitation not found"))]
    #[actix_web::test]
    async fn resolution_failures_keep_their_status(
        #[case] action: &str,
        #[case] status: StatusCode,
        #[case] failure: Error,
    ) {
        let mut builder = StateBuilder::authenticated_as(2);
        let expected = failure.clone();
        builder
            .companies
            .expect_accept_invitation()
            .return_once(move |_, _| Err(failure.clone()));
        builder
            .companies
            .expect_decline_invitation()
            .return_once(move |_, _| Err(expected));

        let res = call(
            builder,
            test::TestRequest::post().uri(&format!("/companies/invitations/10/{action}")),
        )
        .await;
        assert_eq!(res.status(), status);
        assert!(!read_error(res).await.message().is_empty());
    }
}
