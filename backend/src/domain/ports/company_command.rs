//! Driving port for company and invitation mutations.

use async_trait::async_trait;

use crate::domain::{
    CompanyId, CompanyInvitation, CompanyName, CompanyUpdate, Error, InvitationId, UserId,
};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CompanyCommand: Send + Sync {
    /// Create a company owned by `owner`.
    async fn create_company(
        &self,
        owner: UserId,
        name: CompanyName,
        description: Option<String>,
    ) -> Result<CompanyId, Error>;

    /// Apply a partial update; only the owner may.
    async fn update_company(
        &self,
        company: CompanyId,
        caller: UserId,
        update: CompanyUpdate,
    ) -> Result<(), Error>;

    /// Delete a company; only the owner may.
    async fn delete_company(&self, company: CompanyId, caller: UserId) -> Result<(), Error>;

    /// Invite a user by username; only the owner may.
    ///
    /// The username is taken as received. Ownership is settled before the
    /// name is looked at, so a malformed name reads as an unknown user.
    async fn invite(
        &self,
        company: CompanyId,
        caller: UserId,
        username: String,
    ) -> Result<CompanyInvitation, Error>;

    /// Accept an invitation addressed to the caller.
    async fn accept_invitation(&self, invitation: InvitationId, caller: UserId)
    -> Result<(), Error>;

    /// Decline an invitation addressed to the caller.
    async fn decline_invitation(
        &self,
        invitation: InvitationId,
        caller: UserId,
    ) -> Result<(), Error>;
}
