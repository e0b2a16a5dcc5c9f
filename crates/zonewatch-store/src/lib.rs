//! # zonewatch-store
//!
//! `SQLite` persistence for residency records.
//!
//! - **[`sqlite`]**: connection pool, embedded migrations, stateless repositories
//! - **[`store`]**: [`ResidencyStore`], the transactional API the engine uses
//! - **[`errors`]**: [`StoreError`]
//!
//! ## Crate Position
//!
//! Depends on `zonewatch-core`. Depended on by `zonewatch-engine` and the agent.

#![deny(unsafe_code)]

pub mod errors;
pub mod sqlite;
pub mod store;

pub use errors::{Result, StoreError};
pub use sqlite::{ConnectionConfig, ConnectionPool, PooledConnection};
pub use store::{CommitOutcome, ResidencyStore};
