#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Dataset descriptors and raw record types for the RDW parking datasets.
//!
//! Upstream rows are kept as untyped JSON objects ([`RawRecord`]) so that
//! fields the pipeline does not know about still flow through the merge
//! verbatim. The [`fields`] module names the keys the pipeline does read.

use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// One upstream row, exactly as decoded from the Socrata JSON payload.
pub type RawRecord = serde_json::Map<String, serde_json::Value>;

/// Field names used by the join and normalization stages.
///
/// Socrata lowercases column names, so these are the wire names rather than
/// the camel-cased names shown on the RDW portal.
pub mod fields {
    /// Parking area identifier. Joins geo to specification records.
    pub const AREA_ID: &str = "areaid";
    /// Area manager identifier. Joins merged records to tariff records.
    pub const AREA_MANAGER_ID: &str = "areamanagerid";
    /// Free-text description of the area.
    pub const AREA_DESC: &str = "areadesc";
    /// Numeric-ish flag for disabled access.
    pub const DISABLED_ACCESS: &str = "disabledaccess";
    /// Number of parking spots.
    pub const CAPACITY: &str = "capacity";
    /// Number of charging points.
    pub const CHARGING_POINT_CAPACITY: &str = "chargingpointcapacity";
    /// Price of one tariff step.
    pub const AMOUNT_FARE_PART: &str = "amountfarepart";
    /// Length of one tariff step in minutes.
    pub const STEP_SIZE_FARE_PART: &str = "stepsizefarepart";
    /// Nested location object.
    pub const LOCATION: &str = "location";
    /// Latitude inside [`LOCATION`].
    pub const LATITUDE: &str = "latitude";
    /// Longitude inside [`LOCATION`].
    pub const LONGITUDE: &str = "longitude";
    /// JSON-encoded address string inside [`LOCATION`].
    pub const HUMAN_ADDRESS: &str = "human_address";
}

/// Which of the three parking datasets a descriptor points at.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum DatasetKind {
    /// Tariff parts, keyed by area manager.
    Tariff,
    /// Garage geolocation, one row per parking area.
    Geo,
    /// Parking area specifications, keyed by area.
    Specification,
}

/// Configuration for a single upstream dataset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct DatasetDescriptor {
    /// Unique identifier (e.g., `"geo_parkeergarages"`).
    pub id: String,
    /// Human-readable name for log messages.
    pub name: String,
    /// Which role this dataset plays in the join.
    pub kind: DatasetKind,
    /// Socrata resource URL (e.g.,
    /// `"https://opendata.rdw.nl/resource/t5pc-eb34.json"`).
    pub api_url: String,
    /// Records per page.
    #[serde(default = "default_page_size")]
    pub page_size: u64,
}

const fn default_page_size() -> u64 {
    50_000
}

/// A geo record merged with its first matching specification and tariff
/// records.
///
/// Fields from later merges overwrite earlier ones on key collision. When no
/// match was found, the corresponding fields are simply absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JoinedRecord(RawRecord);

impl JoinedRecord {
    /// Wraps an already-merged field map.
    #[must_use]
    pub const fn new(fields: RawRecord) -> Self {
        Self(fields)
    }

    /// Returns a field value, or `None` when the field is absent.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&serde_json::Value> {
        self.0.get(key)
    }

    /// Returns a field nested one level inside an object field (e.g.
    /// `location.latitude`).
    #[must_use]
    pub fn get_nested(&self, outer: &str, inner: &str) -> Option<&serde_json::Value> {
        self.0.get(outer)?.as_object()?.get(inner)
    }

    /// Shallow-merges `other` into this record, overwriting on collision.
    pub fn merge(&mut self, other: &RawRecord) {
        self.0
            .extend(other.iter().map(|(k, v)| (k.clone(), v.clone())));
    }

    /// Returns the underlying field map.
    #[must_use]
    pub const fn fields(&self) -> &RawRecord {
        &self.0
    }
}
