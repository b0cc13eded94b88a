//! Company services: lifecycle, membership and the invitation workflow.
//!
//! The repository does the transactional work; this layer maps its outcomes
//! onto the domain error taxonomy and logs state changes.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::info;

use crate::domain::ports::{
    CompanyCommand, CompanyQuery, CompanyRepository, CompanyRepositoryError,
};
use crate::domain::{
    Company, CompanyId, CompanyInvitation, CompanyName, CompanyUpdate, Error, InvitationId,
    InvitationPreconditions, InvitationRejection, InvitationView, NewCompany, UserId, Username,
};

fn map_company_error(error: CompanyRepositoryError) -> Error {
    match error {
        CompanyRepositoryError::Connection { message }
        | CompanyRepositoryError::Query { message } => {
            Error::internal(format!("company repository error: {message}"))
        }
        CompanyRepositoryError::CompanyNotFound => Error::not_found("company not found"),
        CompanyRepositoryError::UserNotFound => Error::not_found("user not found"),
        CompanyRepositoryError::InvitationNotFound => Error::not_found("invitation not found"),
        CompanyRepositoryError::InvitationAlreadyHandled => {
            Error::conflict("invitation already handled")
        }
        CompanyRepositoryError::Rejected { reason } => map_rejection(reason),
    }
}

fn map_rejection(reason: InvitationRejection) -> Error {
    let message = reason.to_string();
    match reason {
        InvitationRejection::NotOwner => Error::forbidden(message),
        InvitationRejection::SelfInvitation => Error::invalid_request(message),
        InvitationRejection::AlreadyMember | InvitationRejection::AlreadyInvited => {
            Error::conflict(message)
        }
    }
}

/// Company service implementing [`CompanyCommand`] and [`CompanyQuery`].
pub struct CompanyService<R: ?Sized> {
    repo: Arc<R>,
}

impl<R: ?Sized> CompanyService<R> {
    pub fn new(repo: Arc<R>) -> Self {
        Self { repo }
    }
}

impl<R: ?Sized> Clone for CompanyService<R> {
    fn clone(&self) -> Self {
        Self {
            repo: Arc::clone(&self.repo),
        }
    }
}

#[async_trait]
impl<R> CompanyCommand for CompanyService<R>
where
    R: CompanyRepository + ?Sized,
{
    async fn create_company(
        &self,
        owner: UserId,
        name: CompanyName,
        description: Option<String>,
    ) -> Result<CompanyId, Error> {
        let company = NewCompany {
            name,
            description,
            created_by: owner,
        };
        let id = self
            .repo
            .create_company(&company)
            .await
            .map_err(map_company_error)?;
        info!(company_id = %id, owner = %owner, "company created");
        Ok(id)
    }

    async fn update_company(
        &self,
        company: CompanyId,
        caller: UserId,
        update: CompanyUpdate,
    ) -> Result<(), Error> {
        if update.is_empty() {
            return Err(Error::invalid_request("no fields to update"));
        }
        self.repo
            .update_company(company, caller, &update)
            .await
            .map_err(map_company_error)
    }

    async fn delete_company(&self, company: CompanyId, caller: UserId) -> Result<(), Error> {
        self.repo
            .delete_company(company, caller)
            .await
            .map_err(map_company_error)?;
        info!(company_id = %company, "company deleted");
        Ok(())
    }

    async fn invite(
        &self,
        company: CompanyId,
        caller: UserId,
        username: String,
    ) -> Result<CompanyInvitation, Error> {
        let Ok(username) = Username::new(username) else {
            // No account can hold a name that fails validation.
            let owner = self
                .repo
                .company_owner(company)
                .await
                .map_err(map_company_error)?
                .ok_or_else(|| Error::not_found("company not found"))?;
            InvitationPreconditions::check_owner(owner, caller).map_err(map_rejection)?;
            return Err(Error::not_found("user not found"));
        };
        let invitation = self
            .repo
            .create_invitation(company, caller, &username)
            .await
            .map_err(map_company_error)?;
        info!(
            invitation_id = %invitation.id,
            company_id = %company,
            invitee = %invitation.invited_user_id,
            "invitation issued"
        );
        Ok(invitation)
    }

    async fn accept_invitation(
        &self,
        invitation: InvitationId,
        caller: UserId,
    ) -> Result<(), Error> {
        self.repo
            .accept_invitation(invitation, caller)
            .await
            .map_err(map_company_error)?;
        info!(invitation_id = %invitation, user_id = %caller, "invitation accepted");
        Ok(())
    }

    async fn decline_invitation(
        &self,
        invitation: InvitationId,
        caller: UserId,
    ) -> Result<(), Error> {
        self.repo
            .decline_invitation(invitation, caller)
            .await
            .map_err(map_company_error)?;
        info!(invitation_id = %invitation, user_id = %caller, "invitation declined");
        Ok(())
    }
}

#[async_trait]
impl<R> CompanyQuery for CompanyService<R>
where
    R: CompanyRepository + ?Sized,
{
    async fn get_company(&self, company: CompanyId, caller: UserId) -> Result<Company, Error> {
        self.repo
            .get_company(company, caller)
            .await
            .map_err(map_company_error)?
            .ok_or_else(|| Error::not_found("company not found"))
    }

    async fn list_companies(&self, caller: UserId) -> Result<Vec<Company>, Error> {
        self.repo
            .list_companies(caller)
            .await
            .map_err(map_company_error)
    }

    async fn list_invitations(&self, caller: UserId) -> Result<Vec<InvitationView>, Error> {
        self.repo
            .list_invitations(caller)
            .await
            .map_err(map_company_error)
    }
}

#[cfg(test)]
#[path = "company_service_tests.rs"]
mod tests;
