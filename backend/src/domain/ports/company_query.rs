//! Driving port for company reads.

use async_trait::async_trait;

use crate::domain::{Company, CompanyId, Error, InvitationView, UserId};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CompanyQuery: Send + Sync {
    /// A company the caller belongs to.
    async fn get_company(&self, company: CompanyId, caller: UserId) -> Result<Company, Error>;

    /// Companies the caller belongs to.
    async fn list_companies(&self, caller: UserId) -> Result<Vec<Company>, Error>;

    /// Pending invitations addressed to the caller.
    async fn list_invitations(&self, caller: UserId) -> Result<Vec<InvitationView>, Error>;
}
