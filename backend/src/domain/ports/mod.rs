//! Domain ports and supporting types for the hexagonal boundary.

mod macros;
pub(crate) use macros::define_port_error;

mod auth_service;
mod cache_key;
mod company_command;
mod company_query;
mod company_repository;
mod event_command;
mod event_query;
mod event_repository;
mod health_probe;
mod key_value_cache;
mod password_hasher;
mod token_service;
mod user_repository;

#[cfg(test)]
pub use auth_service::MockAuthService;
pub use auth_service::AuthService;
pub use cache_key::{CacheKey, CacheKeyValidationError};
#[cfg(test)]
pub use company_command::MockCompanyCommand;
pub use company_command::CompanyCommand;
#[cfg(test)]
pub use company_query::MockCompanyQuery;
pub use company_query::CompanyQuery;
#[cfg(test)]
pub use company_repository::MockCompanyRepository;
pub use company_repository::{CompanyRepository, CompanyRepositoryError};
#[cfg(test)]
pub use event_command::MockEventCommand;
pub use event_command::{EventCommand, EventDraft, EventPatch};
#[cfg(test)]
pub use event_query::MockEventQuery;
pub use event_query::EventQuery;
#[cfg(test)]
pub use event_repository::MockEventRepository;
pub use event_repository::{EventRepository, EventRepositoryError};
#[cfg(test)]
pub use health_probe::MockHealthProbe;
pub use health_probe::{CompositeHealthProbe, HealthError, HealthProbe};
#[cfg(test)]
pub use key_value_cache::MockKeyValueCache;
pub use key_value_cache::{CacheError, KeyValueCache};
#[cfg(test)]
pub use password_hasher::MockPasswordHasher;
pub use password_hasher::{PasswordHashError, PasswordHasher};
#[cfg(test)]
pub use token_service::MockTokenService;
pub use token_service::{TokenError, TokenService};
#[cfg(test)]
pub use user_repository::MockUserRepository;
pub use user_repository::{UserPersistenceError, UserRepository};
