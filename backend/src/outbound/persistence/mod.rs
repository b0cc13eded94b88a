//! PostgreSQL persistence adapters using Diesel ORM.
//!
//! Concrete implementations of the user, company and event repository ports
//! backed by PostgreSQL via Diesel, with async support through `diesel-async`
//! and `bb8` connection pooling.
//!
//! # Architecture
//!
//! - **Thin adapters**: repositories translate between Diesel rows and domain
//!   types. Business rules such as invitation preconditions live in the
//!   domain and are only evaluated here, inside the transaction.
//! - **Internal models**: row structs (`models.rs`) and table definitions
//!   (`schema.rs`) never leave this module.
//! - **Strongly typed errors**: every Diesel and pool failure is mapped to the
//!   port's error enum.
//!
//! # Example
//!
//! ```ignore
//! use crewplan_backend::outbound::persistence::{DbPool, DieselUserRepository, PoolConfig};
//!
//! let pool = DbPool::new(PoolConfig::new("postgres://localhost/crewplan")).await?;
//! let repo = DieselUserRepository::new(pool);
//! ```

mod diesel_basic_error_mapping;
mod diesel_company_repository;
mod diesel_event_repository;
mod diesel_user_repository;
mod migrations;
mod models;
mod pool;
mod postgres_health_probe;
mod schema;

pub use diesel_company_repository::DieselCompanyRepository;
pub use diesel_event_repository::DieselEventRepository;
pub use diesel_user_repository::DieselUserRepository;
pub use migrations::{MigrationError, run_pending_migrations};
pub use pool::{DbPool, PoolConfig, PoolError};
pub use postgres_health_probe::PostgresHealthProbe;
