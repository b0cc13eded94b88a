//! Builders wiring adapters into the HTTP state and health probe.
//!
//! PostgreSQL backs the repositories when a database URL is configured and
//! the in-memory store otherwise; Redis backs the user lookup cache when a
//! Redis URL is configured and the in-process cache otherwise.

use std::sync::Arc;
use std::time::Duration;

use mockable::{Clock, DefaultClock};
use tracing::{info, warn};

use crewplan_backend::domain::ports::{
    CompanyRepository, CompositeHealthProbe, EventRepository, HealthProbe, KeyValueCache,
    UserRepository,
};
use crewplan_backend::domain::{AccountService, CompanyService, EventService};
use crewplan_backend::inbound::http::state::{HttpState, HttpStatePorts};
use crewplan_backend::outbound::cache::{CachedUserRepository, MemoryCache, RedisCache};
use crewplan_backend::outbound::memory::MemoryStore;
use crewplan_backend::outbound::persistence::{
    DbPool, DieselCompanyRepository, DieselEventRepository, DieselUserRepository, PoolConfig,
    PostgresHealthProbe, run_pending_migrations,
};
use crewplan_backend::outbound::security::{JwtTokenService, Sha256PasswordHasher};

use super::ServerSettings;

const REDIS_CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// Fully wired application state.
pub struct AppState {
    pub http: HttpState,
    pub probe: Arc<dyn HealthProbe>,
}

struct Repositories {
    users: Arc<dyn UserRepository>,
    companies: Arc<dyn CompanyRepository>,
    events: Arc<dyn EventRepository>,
    probes: Vec<Arc<dyn HealthProbe>>,
}

fn io_error(context: &str, error: impl std::fmt::Display) -> std::io::Error {
    std::io::Error::other(format!("{context}: {error}"))
}

async fn build_repositories(
    settings: &ServerSettings,
    clock: Arc<dyn Clock>,
) -> std::io::Result<Repositories> {
    match settings.database_url.as_deref() {
        Some(url) => {
            run_pending_migrations(url)
                .await
                .map_err(|err| io_error("database migrations failed", err))?;
            let pool = DbPool::new(PoolConfig::new(url).with_max_size(settings.db_pool_max_size))
                .await
                .map_err(|err| io_error("database pool failed", err))?;
            info!(max_size = settings.db_pool_max_size, "using PostgreSQL store");
            Ok(Repositories {
                users: Arc::new(DieselUserRepository::new(pool.clone())),
                companies: Arc::new(DieselCompanyRepository::new(pool.clone())),
                events: Arc::new(DieselEventRepository::new(pool.clone())),
                probes: vec![Arc::new(PostgresHealthProbe::new(pool))],
            })
        }
        None => {
            warn!("no database configured; data lives in memory and is lost on exit");
            let store = MemoryStore::new(clock);
            Ok(Repositories {
                users: Arc::new(store.clone()),
                companies: Arc::new(store.clone()),
                events: Arc::new(store),
                probes: Vec::new(),
            })
        }
    }
}

async fn build_cache(
    settings: &ServerSettings,
    clock: Arc<dyn Clock>,
    probes: &mut Vec<Arc<dyn HealthProbe>>,
) -> std::io::Result<Arc<dyn KeyValueCache>> {
    match settings.redis_url.as_deref() {
        Some(url) => {
            let cache = RedisCache::connect(url, REDIS_CONNECT_TIMEOUT)
                .await
                .map_err(|err| io_error("redis connection failed", err))?;
            info!("using Redis cache");
            probes.push(Arc::new(cache.health_probe()));
            Ok(Arc::new(cache))
        }
        None => {
            info!("using in-process cache");
            Ok(Arc::new(MemoryCache::new(clock)))
        }
    }
}

/// Build the HTTP state and the dependency probe from `settings`.
///
/// # Errors
/// Fails when a configured backing store cannot be reached or when a secret
/// is missing from a release build.
pub async fn build_app_state(settings: &ServerSettings) -> std::io::Result<AppState> {
    let clock: Arc<dyn Clock> = Arc::new(DefaultClock);
    let Repositories {
        users,
        companies,
        events,
        mut probes,
    } = build_repositories(settings, clock.clone()).await?;
    let cache = build_cache(settings, clock.clone(), &mut probes).await?;

    let users = Arc::new(CachedUserRepository::new(users, cache).with_ttl(settings.cache_ttl()));
    let hasher = Arc::new(Sha256PasswordHasher::new(settings.password_salt()?.as_str()));
    let tokens = Arc::new(
        JwtTokenService::new(settings.jwt_secret()?.as_bytes(), clock)
            .with_ttl(settings.token_ttl()),
    );

    let auth = Arc::new(AccountService::new(users, hasher, tokens));
    let company_service = Arc::new(CompanyService::new(companies));
    let event_service = Arc::new(EventService::new(events));

    let http = HttpState::from(HttpStatePorts {
        auth,
        companies: company_service.clone(),
        companies_query: company_service,
        events: event_service.clone(),
        events_query: event_service,
    })
    .with_request_timeout(settings.request_timeout());

    Ok(AppState {
        http,
        probe: Arc::new(CompositeHealthProbe::new(probes)),
    })
}
