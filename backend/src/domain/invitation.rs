//! Company invitations and the notifications they emit.
//!
//! An invitation starts `pending` and moves once, to `accepted` or
//! `declined`. The checks that gate issuing one are gathered into
//! [`InvitationPreconditions`] so every store applies them in the same order.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::{CompanyId, CompanyName, UserId, Username};

/// Storage identifier of an invitation.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, ToSchema,
)]
#[serde(transparent)]
pub struct InvitationId(i64);

impl InvitationId {
    pub const fn new(raw: i64) -> Self {
        Self(raw)
    }

    pub const fn get(self) -> i64 {
        self.0
    }
}

impl fmt::Display for InvitationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Lifecycle state of an invitation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum InvitationStatus {
    Pending,
    Accepted,
    Declined,
}

/// Raised when a response targets an invitation that is no longer pending.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("invitation already handled")]
pub struct InvitationAlreadyHandled;

impl InvitationStatus {
    /// Storage spelling.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Accepted => "accepted",
            Self::Declined => "declined",
        }
    }

    /// Parse the storage spelling.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "pending" => Some(Self::Pending),
            "accepted" => Some(Self::Accepted),
            "declined" => Some(Self::Declined),
            _ => None,
        }
    }

    /// Move to a terminal state.
    ///
    /// Only `pending` may transition, and never back to `pending`.
    ///
    /// # Examples
    /// ```
    /// use crewplan_backend::domain::InvitationStatus;
    ///
    /// let next = InvitationStatus::Pending.respond(InvitationStatus::Accepted);
    /// assert_eq!(next, Ok(InvitationStatus::Accepted));
    /// assert!(InvitationStatus::Accepted.respond(InvitationStatus::Declined).is_err());
    /// ```
    pub fn respond(self, outcome: Self) -> Result<Self, InvitationAlreadyHandled> {
        match (self, outcome) {
            (Self::Pending, Self::Accepted | Self::Declined) => Ok(outcome),
            _ => Err(InvitationAlreadyHandled),
        }
    }
}

/// Invitation row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct CompanyInvitation {
    pub id: InvitationId,
    pub company_id: CompanyId,
    pub invited_user_id: UserId,
    pub invited_by: UserId,
    pub status: InvitationStatus,
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub responded_at: Option<DateTime<Utc>>,
}

/// Pending invitation as shown to its addressee.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct InvitationView {
    pub id: InvitationId,
    pub company_id: CompanyId,
    pub company_name: CompanyName,
    pub invited_by: UserId,
    pub invited_by_username: Username,
    pub status: InvitationStatus,
    pub created_at: DateTime<Utc>,
}

/// Why an invitation cannot be issued.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum InvitationRejection {
    #[error("only company owner can invite")]
    NotOwner,
    #[error("cannot invite yourself")]
    SelfInvitation,
    #[error("user already in company")]
    AlreadyMember,
    #[error("invitation already sent")]
    AlreadyInvited,
}

/// Facts gathered inside the invitation transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvitationPreconditions {
    pub owner: UserId,
    pub inviter: UserId,
    pub invitee: UserId,
    pub invitee_is_member: bool,
    pub pending_exists: bool,
}

impl InvitationPreconditions {
    /// Ownership rule on its own.
    ///
    /// Stores run this before resolving the invitee, so a non-owner is
    /// rejected even when the username is unknown.
    pub fn check_owner(owner: UserId, inviter: UserId) -> Result<(), InvitationRejection> {
        if inviter == owner {
            Ok(())
        } else {
            Err(InvitationRejection::NotOwner)
        }
    }

    /// First violated rule, checked in a fixed order.
    pub fn evaluate(&self) -> Result<(), InvitationRejection> {
        Self::check_owner(self.owner, self.inviter)?;
        if self.invitee == self.inviter {
            return Err(InvitationRejection::SelfInvitation);
        }
        if self.invitee_is_member {
            return Err(InvitationRejection::AlreadyMember);
        }
        if self.pending_exists {
            return Err(InvitationRejection::AlreadyInvited);
        }
        Ok(())
    }
}

/// Notification kind for invitations.
pub const COMPANY_INVITE_KIND: &str = "company_invite";
/// Related entity type recorded on invitation notifications.
pub const INVITATION_ENTITY_TYPE: &str = "company_invitation";

/// Notification row written alongside an invitation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewNotification {
    pub user_id: UserId,
    pub kind: &'static str,
    pub title: String,
    pub message: String,
    pub related_entity_type: &'static str,
    pub related_entity_id: i64,
}

impl NewNotification {
    /// Notification telling `invitee` about a fresh invitation.
    ///
    /// # Examples
    /// ```
    /// use crewplan_backend::domain::{
    ///     CompanyName, InvitationId, NewNotification, UserId, Username,
    /// };
    ///
    /// let note = NewNotification::company_invite(
    ///     UserId::new(2),
    ///     InvitationId::new(10),
    ///     &CompanyName::new("Acme").unwrap(),
    ///     &Username::new("alice").unwrap(),
    /// );
    /// assert_eq!(note.message, "You were invited to Acme by alice");
    /// ```
    pub fn company_invite(
        invitee: UserId,
        invitation: InvitationId,
        company: &CompanyName,
        inviter: &Username,
    ) -> Self {
        Self {
            user_id: invitee,
            kind: COMPANY_INVITE_KIND,
            title: "Company invitation".to_owned(),
            message: format!("You were invited to {company} by {inviter}"),
            related_entity_type: INVITATION_ENTITY_TYPE,
            related_entity_id: invitation.get(),
        }
    }
}
