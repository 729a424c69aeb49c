//! `storefront-infra` — data access and application wiring.
//!
//! The domain and query crates stay pure; everything that touches a store
//! (or pretends to, for tests) lives here:
//! - `repository`: async repository traits + error model
//! - `in_memory`: `RwLock`-backed store for tests/dev
//! - `postgres`: sqlx-backed store (the external relational store reached
//!   through the repository abstraction)
//! - `service`: the catalog application service (condition building,
//!   category reconciliation, owner scoping)

pub mod in_memory;
pub mod postgres;
pub mod repository;
pub mod service;

pub use in_memory::InMemoryStore;
pub use postgres::PostgresStore;
pub use repository::{CategoryRepository, ProductRepository, RepositoryError, RepositoryResult};
pub use service::CatalogService;
