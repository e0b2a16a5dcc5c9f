//! Implementations of [`PositionSource`](crate::traits::PositionSource) and
//! [`ResidencyPersistence`](crate::traits::ResidencyPersistence).

pub mod memory;
pub mod sqlite;

pub use memory::{InMemoryResidencies, ScriptedSource};
pub use sqlite::SqlitePositionSource;
