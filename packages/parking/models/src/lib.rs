#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! The canonical normalized parking area entity.
//!
//! Every joined geo/specification/tariff record is normalized into a
//! [`ParkingArea`]. This is the pipeline's durable output: it is what gets
//! cached, and what the area aggregation runs over.

use serde::{Deserialize, Serialize};

/// A parking area normalized from the joined RDW open-data records.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParkingArea {
    /// Whether the area has disabled access.
    pub wheelchair_accessible: bool,
    /// Number of parking spots. Unparseable input is coerced to 0.
    pub parking_capacity: f64,
    /// Number of charging points. Unparseable input is coerced to 0.
    pub charging_point_capacity: f64,
    /// Cost of parking for one hour.
    ///
    /// Not guarded against a zero or missing tariff step, so this may be
    /// infinite or NaN. Non-finite values serialize as `null`.
    #[serde(with = "non_finite")]
    pub hourly_cost: f64,
    /// Identifier of the area manager (tariff-scheme owner).
    pub area_manager_id: f64,
    /// Identifier of the parking area.
    pub area_id: String,
    /// Raw free-text description of the area.
    pub description: String,
    /// Coarse area label. `None` when the description could not be
    /// classified.
    #[serde(default)]
    pub area: Option<String>,
    /// Geographic location of the area.
    pub location: ParkingLocation,
}

/// Coordinates plus the structured address of a parking area.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParkingLocation {
    /// Latitude (WGS84).
    pub latitude: f64,
    /// Longitude (WGS84).
    pub longitude: f64,
    /// Decoded `human_address` object (empty object when absent).
    #[serde(default = "empty_object")]
    pub human_readable_address: serde_json::Value,
}

impl Default for ParkingLocation {
    fn default() -> Self {
        Self {
            latitude: 0.0,
            longitude: 0.0,
            human_readable_address: empty_object(),
        }
    }
}

fn empty_object() -> serde_json::Value {
    serde_json::Value::Object(serde_json::Map::new())
}

/// Serde helper for floats that may be NaN or infinite.
///
/// JSON has no representation for non-finite numbers, so they are written
/// as `null` and read back as NaN.
pub mod non_finite {
    use serde::{Deserialize, Deserializer, Serializer};

    /// Writes finite values as numbers and everything else as `null`.
    ///
    /// # Errors
    ///
    /// Propagates serializer errors.
    #[allow(clippy::trivially_copy_pass_by_ref)]
    pub fn serialize<S: Serializer>(value: &f64, serializer: S) -> Result<S::Ok, S::Error> {
        if value.is_finite() {
            serializer.serialize_f64(*value)
        } else {
            serializer.serialize_none()
        }
    }

    /// Reads a number, mapping `null` to NaN.
    ///
    /// # Errors
    ///
    /// Propagates deserializer errors for values that are neither numbers
    /// nor `null`.
    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
        Ok(Option::<f64>::deserialize(deserializer)?.unwrap_or(f64::NAN))
    }
}
