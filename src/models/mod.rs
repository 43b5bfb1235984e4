// SPDX-License-Identifier: MIT

//! Data models for the application.

pub mod receipt;
pub mod station;
pub mod sync;
pub mod user;
pub mod vehicle;

pub use receipt::Receipt;
pub use station::Station;
pub use sync::{SyncRun, SyncStatus};
pub use user::User;
pub use vehicle::Vehicle;
