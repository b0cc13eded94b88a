//! Credential adapters: password digests and bearer tokens.

mod jwt_token_service;
mod sha256_password_hasher;

pub use jwt_token_service::{DEFAULT_TOKEN_TTL, JwtTokenService};
pub use sha256_password_hasher::Sha256PasswordHasher;
