#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Local cache of normalized parking areas.
//!
//! The cache is an opaque JSON array of
//! [`ParkingArea`](parking_stats_parking_models::ParkingArea) values. The
//! ingest pipeline consults it once on entry and offers it the fresh result
//! once at the end.

pub mod cache;
pub mod paths;

/// Errors that can occur during cache operations.
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    /// Reading or writing the cache file failed.
    #[error("Cache I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The cache contents could not be (de)serialized.
    #[error("Cache JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
