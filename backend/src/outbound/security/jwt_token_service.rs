//! HS256 JSON Web Token implementation of the `TokenService` port.

use std::sync::Arc;
use std::time::Duration;

use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use mockable::Clock;
use serde::{Deserialize, Serialize};

use crate::domain::ports::{TokenError, TokenService};
use crate::domain::{AccessToken, UserId};

/// Token lifetime unless configured otherwise: thirty days.
pub const DEFAULT_TOKEN_TTL: Duration = Duration::from_secs(720 * 60 * 60);

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    user_id: i64,
    iat: i64,
    exp: i64,
}

/// Issues and verifies tokens signed with a shared secret.
///
/// Expiry is checked against the injected clock rather than the system time.
pub struct JwtTokenService {
    encoding: EncodingKey,
    decoding: DecodingKey,
    configured: bool,
    ttl: Duration,
    clock: Arc<dyn Clock>,
}

impl JwtTokenService {
    pub fn new(secret: &[u8], clock: Arc<dyn Clock>) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            configured: !secret.is_empty(),
            ttl: DEFAULT_TOKEN_TTL,
            clock,
        }
    }

    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    fn validation() -> Validation {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.set_required_spec_claims(&["exp"]);
        validation
    }
}

impl TokenService for JwtTokenService {
    fn issue(&self, user: UserId) -> Result<AccessToken, TokenError> {
        if !self.configured {
            return Err(TokenError::signing("jwt secret is not set"));
        }
        let ttl = i64::try_from(self.ttl.as_secs())
            .map_err(|_| TokenError::signing("token lifetime out of range"))?;
        let iat = self.clock.utc().timestamp();
        let claims = Claims {
            user_id: user.get(),
            iat,
            exp: iat.saturating_add(ttl),
        };
        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map(AccessToken::new)
            .map_err(|err| TokenError::signing(err.to_string()))
    }

    fn verify(&self, token: &str) -> Result<UserId, TokenError> {
        if !self.configured {
            return Err(TokenError::invalid("jwt secret is not set"));
        }
        let data = decode::<Claims>(token, &self.decoding, &Self::validation())
            .map_err(|err| TokenError::invalid(err.to_string()))?;
        if data.claims.exp <= self.clock.utc().timestamp() {
            return Err(TokenError::invalid("token expired"));
        }
        Ok(UserId::new(data.claims.user_id))
    }
}
