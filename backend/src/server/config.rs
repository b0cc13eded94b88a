//! Server settings loaded via OrthoConfig.
//!
//! Every value may come from the command line, a configuration file or a
//! `CREWPLAN_*` environment variable. Only secrets lack defaults; debug builds
//! substitute throwaway values so a local server starts without any setup.

use std::net::SocketAddr;
use std::time::Duration;

use ortho_config::OrthoConfig;
use serde::Deserialize;
use tracing::warn;
use uuid::Uuid;
use zeroize::Zeroizing;

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
const DEFAULT_TOKEN_TTL_HOURS: u64 = 720;
const DEFAULT_CACHE_TTL_SECS: u64 = 600;
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
const DEFAULT_DB_POOL_MAX_SIZE: u32 = 10;
const SECS_PER_HOUR: u64 = 3600;

/// Raised when the settings cannot produce a runnable server.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SettingsError {
    #[error("invalid bind address {value}: {message}")]
    BindAddr { value: String, message: String },
    #[error("{name} must be configured outside debug builds")]
    MissingSecret { name: &'static str },
}

impl From<SettingsError> for std::io::Error {
    fn from(error: SettingsError) -> Self {
        Self::other(error.to_string())
    }
}

/// Configuration values for the HTTP server and its backing stores.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "CREWPLAN")]
pub struct ServerSettings {
    /// Socket address to listen on.
    #[ortho_config(default = String::from(DEFAULT_BIND_ADDR))]
    pub bind_addr: String,
    /// PostgreSQL connection string. The in-memory store is used when unset.
    pub database_url: Option<String>,
    /// Redis connection string. The in-process cache is used when unset.
    pub redis_url: Option<String>,
    /// HS256 signing secret for access tokens.
    pub jwt_secret: Option<String>,
    /// Salt mixed into password digests.
    pub password_salt: Option<String>,
    /// Access token lifetime in hours.
    #[ortho_config(default = DEFAULT_TOKEN_TTL_HOURS)]
    pub token_ttl_hours: u64,
    /// Lifetime of cached user lookups in seconds.
    #[ortho_config(default = DEFAULT_CACHE_TTL_SECS)]
    pub cache_ttl_secs: u64,
    /// Per-request deadline in seconds.
    #[ortho_config(default = DEFAULT_REQUEST_TIMEOUT_SECS)]
    pub request_timeout_secs: u64,
    /// Maximum number of pooled database connections.
    #[ortho_config(default = DEFAULT_DB_POOL_MAX_SIZE)]
    pub db_pool_max_size: u32,
}

impl ServerSettings {
    /// Parse the configured listen address.
    pub fn bind_addr(&self) -> Result<SocketAddr, SettingsError> {
        self.bind_addr
            .parse()
            .map_err(|err: std::net::AddrParseError| SettingsError::BindAddr {
                value: self.bind_addr.clone(),
                message: err.to_string(),
            })
    }

    /// Token lifetime; absurdly large hour counts saturate.
    pub fn token_ttl(&self) -> Duration {
        Duration::from_secs(self.token_ttl_hours.saturating_mul(SECS_PER_HOUR))
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Token signing secret, or a per-process value in debug builds.
    pub fn jwt_secret(&self) -> Result<Zeroizing<String>, SettingsError> {
        resolve_secret("jwt_secret", self.jwt_secret.as_deref(), cfg!(debug_assertions))
    }

    /// Password salt, or a per-process value in debug builds.
    pub fn password_salt(&self) -> Result<Zeroizing<String>, SettingsError> {
        resolve_secret(
            "password_salt",
            self.password_salt.as_deref(),
            cfg!(debug_assertions),
        )
    }
}

fn resolve_secret(
    name: &'static str,
    configured: Option<&str>,
    allow_ephemeral: bool,
) -> Result<Zeroizing<String>, SettingsError> {
    match configured.filter(|value| !value.is_empty()) {
        Some(value) => Ok(Zeroizing::new(value.to_owned())),
        None if allow_ephemeral => {
            warn!(setting = name, "using temporary secret (dev only)");
            Ok(Zeroizing::new(Uuid::new_v4().simple().to_string()))
        }
        None => Err(SettingsError::MissingSecret { name }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::ffi::OsString;

    use env_lock::lock_env;
    use rstest::rstest;

    const VARS: [&str; 9] = [
        "CREWPLAN_BIND_ADDR",
        "CREWPLAN_DATABASE_URL",
        "CREWPLAN_REDIS_URL",
        "CREWPLAN_JWT_SECRET",
        "CREWPLAN_PASSWORD_SALT",
        "CREWPLAN_TOKEN_TTL_HOURS",
        "CREWPLAN_CACHE_TTL_SECS",
        "CREWPLAN_REQUEST_TIMEOUT_SECS",
        "CREWPLAN_DB_POOL_MAX_SIZE",
    ];

    fn load() -> ServerSettings {
        ServerSettings::load_from_iter([OsString::from("crewplan-backend")])
            .expect("config should load")
    }

    #[rstest]
    fn defaults_apply_when_nothing_is_set() {
        let _guard = lock_env(VARS.map(|name| (name, None::<String>)));

        let settings = load();
        assert_eq!(
            settings.bind_addr(),
            Ok(SocketAddr::from(([0, 0, 0, 0], 8080)))
        );
        assert!(settings.database_url.is_none());
        assert!(settings.redis_url.is_none());
        assert_eq!(settings.token_ttl(), Duration::from_secs(720 * 3600));
        assert_eq!(settings.cache_ttl(), Duration::from_secs(600));
        assert_eq!(settings.request_timeout(), Duration::from_secs(30));
        assert_eq!(settings.db_pool_max_size, 10);
        assert!(settings.jwt_secret.is_none());
        assert!(settings.password_salt.is_none());
    }

    #[rstest]
    fn environment_overrides_are_respected() {
        let _guard = lock_env([
            ("CREWPLAN_BIND_ADDR", Some("127.0.0.1:9000".to_owned())),
            (
                "CREWPLAN_DATABASE_URL",
                Some("postgres://localhost/crewplan".to_owned()),
            ),
            ("CREWPLAN_REDIS_URL", Some("redis://localhost".to_owned())),
            ("CREWPLAN_JWT_SECRET", Some("s3cret".to_owned())),
            ("CREWPLAN_PASSWORD_SALT", Some("pepper".to_owned())),
            ("CREWPLAN_TOKEN_TTL_HOURS", Some("2".to_owned())),
            ("CREWPLAN_CACHE_TTL_SECS", Some("5".to_owned())),
            ("CREWPLAN_REQUEST_TIMEOUT_SECS", Some("3".to_owned())),
            ("CREWPLAN_DB_POOL_MAX_SIZE", Some("4".to_owned())),
        ]);

        let settings = load();
        assert_eq!(
            settings.bind_addr(),
            Ok(SocketAddr::from(([127, 0, 0, 1], 9000)))
        );
        assert_eq!(
            settings.database_url.as_deref(),
            Some("postgres://localhost/crewplan")
        );
        assert_eq!(settings.redis_url.as_deref(), Some("redis://localhost"));
        assert_eq!(settings.jwt_secret().expect("secret").as_str(), "s3cret");
        assert_eq!(settings.password_salt().expect("salt").as_str(), "pepper");
        assert_eq!(settings.token_ttl(), Duration::from_secs(2 * 3600));
        assert_eq!(settings.cache_ttl(), Duration::from_secs(5));
        assert_eq!(settings.request_timeout(), Duration::from_secs(3));
        assert_eq!(settings.db_pool_max_size, 4);
    }

    #[rstest]
    fn malformed_bind_address_is_reported() {
        let _guard = lock_env([("CREWPLAN_BIND_ADDR", Some("nowhere".to_owned()))]);

        assert!(matches!(
            load().bind_addr(),
            Err(SettingsError::BindAddr { .. })
        ));
    }

    #[rstest]
    fn huge_token_lifetimes_saturate() {
        // Fits an i64 but overflows once converted to seconds.
        let _guard = lock_env([(
            "CREWPLAN_TOKEN_TTL_HOURS",
            Some((u64::MAX / 1000).to_string()),
        )]);

        assert_eq!(load().token_ttl(), Duration::from_secs(u64::MAX));
    }

    #[rstest]
    #[case(None)]
    #[case(Some(""))]
    fn missing_secrets_fail_when_ephemeral_values_are_forbidden(#[case] configured: Option<&str>) {
        assert_eq!(
            resolve_secret("jwt_secret", configured, false),
            Err(SettingsError::MissingSecret { name: "jwt_secret" })
        );
    }

    #[rstest]
    fn ephemeral_secrets_differ_between_calls() {
        let first = resolve_secret("jwt_secret", None, true).expect("ephemeral");
        let second = resolve_secret("jwt_secret", None, true).expect("ephemeral");
        assert!(!first.is_empty());
        assert_ne!(first, second);
    }
}
