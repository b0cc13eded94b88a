//! Port for companies, memberships and invitations.
//!
//! Adapters run every multi-step operation as one unit of work: a failure at
//! any step leaves no partial rows behind.
use async_trait::async_trait;

use crate::domain::{
    Company, CompanyId, CompanyInvitation, CompanyUpdate, InvitationId, InvitationRejection,
    InvitationView, NewCompany, UserId, Username,
};

use super::define_port_error;

define_port_error! {
    /// Errors raised by company repository adapters.
    pub enum CompanyRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } => "company repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "company repository query failed: {message}",
        /// Company absent, or the caller's predicate matched no row.
        CompanyNotFound => "company not found",
        /// No user has the requested username.
        UserNotFound => "user not found",
        /// Invitation absent or addressed to someone else.
        InvitationNotFound => "invitation not found",
        /// Invitation already accepted or declined.
        InvitationAlreadyHandled => "invitation already handled",
        /// An invitation rule was violated.
        Rejected { reason: InvitationRejection } => "{reason}",
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CompanyRepository: Send + Sync {
    /// Insert the company and its owner membership together.
    async fn create_company(&self, company: &NewCompany)
    -> Result<CompanyId, CompanyRepositoryError>;

    /// Fetch a company the viewer belongs to.
    async fn get_company(
        &self,
        company: CompanyId,
        viewer: UserId,
    ) -> Result<Option<Company>, CompanyRepositoryError>;

    /// Companies the user belongs to, newest first.
    async fn list_companies(&self, member: UserId) -> Result<Vec<Company>, CompanyRepositoryError>;

    /// Update a company owned by `owner`; no match yields `CompanyNotFound`.
    async fn update_company(
        &self,
        company: CompanyId,
        owner: UserId,
        update: &CompanyUpdate,
    ) -> Result<(), CompanyRepositoryError>;

    /// Delete a company owned by `owner`; no match yields `CompanyNotFound`.
    async fn delete_company(
        &self,
        company: CompanyId,
        owner: UserId,
    ) -> Result<(), CompanyRepositoryError>;

    /// Owner of the company, if it exists.
    async fn company_owner(&self, company: CompanyId)
    -> Result<Option<UserId>, CompanyRepositoryError>;

    /// Issue an invitation and its notification atomically.
    async fn create_invitation(
        &self,
        company: CompanyId,
        invited_by: UserId,
        username: &Username,
    ) -> Result<CompanyInvitation, CompanyRepositoryError>;

    /// Pending invitations addressed to the user, newest first.
    async fn list_invitations(
        &self,
        invitee: UserId,
    ) -> Result<Vec<InvitationView>, CompanyRepositoryError>;

    /// Grant membership and mark the invitation accepted atomically.
    async fn accept_invitation(
        &self,
        invitation: InvitationId,
        invitee: UserId,
    ) -> Result<(), CompanyRepositoryError>;

    /// Mark a pending invitation declined; anything else yields `InvitationNotFound`.
    async fn decline_invitation(
        &self,
        invitation: InvitationId,
        invitee: UserId,
    ) -> Result<(), CompanyRepositoryError>;

    /// Whether the user belongs to the company.
    async fn is_member(
        &self,
        company: CompanyId,
        user: UserId,
    ) -> Result<bool, CompanyRepositoryError>;
}
