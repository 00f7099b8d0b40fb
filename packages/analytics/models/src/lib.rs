#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Input and output types for the per-area cost aggregation.

use parking_stats_parking_models::ParkingArea;
use serde::{Deserialize, Serialize};

/// Maximum number of areas returned by a cost aggregation.
pub const MAX_AREAS: usize = 20;

/// Parameters for aggregating parking costs per area.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocationCostParams {
    /// Normalized parking areas to aggregate.
    pub data: Vec<ParkingArea>,
    /// Sort the result by ascending average hourly cost.
    #[serde(default)]
    pub is_sorted: bool,
}

/// Average cost and charging capacity of one coarse area.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AreaStat {
    /// Area label. `None` is the bucket of unclassified parking areas.
    pub area: Option<String>,
    /// Mean hourly cost across the area's parking areas.
    pub average_hourly_cost: f64,
    /// Mean number of charging points, rounded to the nearest integer.
    pub average_charging_points: i64,
}
