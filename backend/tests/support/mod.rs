//! Shared wiring for integration tests: every port backed by in-process adapters.

use std::sync::Arc;

use mockable::DefaultClock;

use crewplan_backend::domain::ports::KeyValueCache;
use crewplan_backend::domain::{AccountService, CompanyService, EventService};
use crewplan_backend::inbound::http::state::{HttpState, HttpStatePorts};
use crewplan_backend::outbound::cache::{CachedUserRepository, MemoryCache};
use crewplan_backend::outbound::memory::MemoryStore;
use crewplan_backend::outbound::security::{JwtTokenService, Sha256PasswordHasher};

/// In-memory application: the store for assertions plus the HTTP state.
pub struct Harness {
    pub store: MemoryStore,
    pub companies: Arc<CompanyService<MemoryStore>>,
    pub events: Arc<EventService<MemoryStore>>,
    pub state: HttpState,
}

pub fn harness() -> Harness {
    let clock = Arc::new(DefaultClock);
    let store = MemoryStore::new(clock.clone());
    let cache: Arc<dyn KeyValueCache> = Arc::new(MemoryCache::new(clock.clone()));
    let users = Arc::new(CachedUserRepository::new(Arc::new(store.clone()), cache));
    let auth = Arc::new(AccountService::new(
        users,
        Arc::new(Sha256PasswordHasher::new("integration-salt")),
        Arc::new(JwtTokenService::new(b"integration-secret", clock)),
    ));
    let companies = Arc::new(CompanyService::new(Arc::new(store.clone())));
    let events = Arc::new(EventService::new(Arc::new(store.clone())));

    let state = HttpState::from(HttpStatePorts {
        auth,
        companies: companies.clone(),
        companies_query: companies.clone(),
        events: events.clone(),
        events_query: events.clone(),
    });

    Harness {
        store,
        companies,
        events,
        state,
    }
}
