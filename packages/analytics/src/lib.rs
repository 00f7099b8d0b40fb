#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Aggregate statistics over normalized parking areas.
//!
//! Runs as a second-stage query over entities the ingest pipeline already
//! produced; nothing here touches the network or the cache.

pub mod location_cost;

pub use location_cost::location_cost_data;
