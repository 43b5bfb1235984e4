// SPDX-License-Identifier: MIT

pub mod consumption;
pub mod fuel_feed;
pub mod maintenance;
pub mod stats;
pub mod sync;

pub use fuel_feed::FuelFeedClient;
pub use sync::StationSyncService;
