//! Domain primitives, services and ports.
//!
//! Purpose: define strongly typed entities for users, companies, invitations
//! and events, plus the services that enforce their rules. Adapters depend on
//! this module; it depends on no adapter.
//!
//! Public surface:
//! - Error / ErrorCode: transport-agnostic failure payload.
//! - Email, Username, UserId: identity primitives.
//! - Company, CompanyInvitation, Event: aggregates returned by the services.
//! - AccountService, CompanyService, EventService: driving port implementations.

pub mod auth;
pub mod auth_service;
pub mod company;
pub mod company_service;
pub mod error;
pub mod event;
pub mod event_service;
pub mod invitation;
pub mod ports;
pub mod trace_id;
pub mod user;

pub use self::auth::{
    AccessToken, CredentialsValidationError, PASSWORD_MIN, Password, SignInCredentials,
    SignUpCredentials,
};
pub use self::auth_service::AccountService;
pub use self::company::{
    COMPANY_NAME_MAX, Company, CompanyId, CompanyName, CompanyUpdate, CompanyValidationError,
    MemberRole, NewCompany,
};
pub use self::company_service::CompanyService;
pub use self::error::{Error, ErrorCode, ErrorValidationError};
pub use self::event::{
    EVENT_TITLE_MAX, Event, EventId, EventScope, EventStatus, EventTitle, EventUpdate,
    EventValidationError, NewEvent, TimeRange,
};
pub use self::event_service::EventService;
pub use self::invitation::{
    COMPANY_INVITE_KIND, CompanyInvitation, INVITATION_ENTITY_TYPE, InvitationAlreadyHandled,
    InvitationId, InvitationPreconditions, InvitationRejection, InvitationStatus, InvitationView,
    NewNotification,
};
pub use self::trace_id::{TRACE_ID_HEADER, TraceId};
pub use self::user::{Email, NewUser, PasswordHash, UserId, UserValidationError, Username};
