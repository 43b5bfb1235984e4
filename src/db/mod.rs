//! Database layer (PostgreSQL via sqlx).

pub mod postgres;

pub use postgres::{Db, StationSyncCounts};
