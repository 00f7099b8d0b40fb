//! Derives the canonical [`ParkingArea`] from a joined record.

use parking_stats_parking_models::{ParkingArea, ParkingLocation};
use parking_stats_source::area_mapping::AreaClassifier;
use parking_stats_source::parsing::{to_number, to_safe_number, to_text};
use parking_stats_source_models::{JoinedRecord, fields};
use serde_json::Value;

/// Minutes per hour; tariff steps are expressed in minutes.
const MINUTES_PER_HOUR: f64 = 60.0;

/// Errors raised while normalizing a joined record.
#[derive(Debug, thiserror::Error)]
pub enum NormalizeError {
    /// `location.human_address` is present but is not valid JSON.
    #[error("Malformed human_address for area {area_id:?}: {source}")]
    MalformedAddress {
        /// Area the record belongs to.
        area_id: String,
        /// Underlying decode error.
        source: serde_json::Error,
    },

    /// `location.human_address` has a type that cannot hold an address.
    #[error("Unexpected human_address type for area {area_id:?}: {value}")]
    UnexpectedAddress {
        /// Area the record belongs to.
        area_id: String,
        /// The offending value.
        value: Value,
    },
}

/// Normalizes one joined record.
///
/// Numeric fields are coerced with a zero fallback, except the hourly cost,
/// which is computed from the raw tariff fields and may therefore be
/// infinite or NaN when the tariff step is zero or missing.
///
/// # Errors
///
/// Returns [`NormalizeError`] if `location.human_address` is present but
/// cannot be decoded.
pub fn normalize(
    record: &JoinedRecord,
    classifier: &dyn AreaClassifier,
) -> Result<ParkingArea, NormalizeError> {
    let area_id = to_text(record.get(fields::AREA_ID));
    let description = to_text(record.get(fields::AREA_DESC));

    let hourly_cost = hourly_cost(
        to_number(record.get(fields::AMOUNT_FARE_PART)),
        to_number(record.get(fields::STEP_SIZE_FARE_PART)),
    );

    let human_readable_address = decode_human_address(
        &area_id,
        record.get_nested(fields::LOCATION, fields::HUMAN_ADDRESS),
    )?;

    let area = classifier.classify(&description);
    if area.is_none() {
        log::debug!("Unclassified parking area {area_id}: {description:?}");
    }

    Ok(ParkingArea {
        wheelchair_accessible: to_safe_number(record.get(fields::DISABLED_ACCESS)) != 0.0,
        parking_capacity: to_safe_number(record.get(fields::CAPACITY)),
        charging_point_capacity: to_safe_number(record.get(fields::CHARGING_POINT_CAPACITY)),
        hourly_cost,
        area_manager_id: to_safe_number(record.get(fields::AREA_MANAGER_ID)),
        area_id,
        description,
        area,
        location: ParkingLocation {
            latitude: to_safe_number(record.get_nested(fields::LOCATION, fields::LATITUDE)),
            longitude: to_safe_number(record.get_nested(fields::LOCATION, fields::LONGITUDE)),
            human_readable_address,
        },
    })
}

/// Cost of one hour given the price and length (in minutes) of one tariff
/// step.
#[must_use]
pub fn hourly_cost(amount_fare_part: f64, step_size_fare_part: f64) -> f64 {
    (amount_fare_part / step_size_fare_part) * MINUTES_PER_HOUR
}

fn decode_human_address(area_id: &str, value: Option<&Value>) -> Result<Value, NormalizeError> {
    match value {
        None | Some(Value::Null) => Ok(empty_address()),
        Some(Value::String(text)) if text.is_empty() => Ok(empty_address()),
        Some(Value::String(text)) => {
            serde_json::from_str(text).map_err(|source| NormalizeError::MalformedAddress {
                area_id: area_id.to_string(),
                source,
            })
        }
        Some(Value::Object(address)) => Ok(Value::Object(address.clone())),
        Some(other) => Err(NormalizeError::UnexpectedAddress {
            area_id: area_id.to_string(),
            value: other.clone(),
        }),
    }
}

fn empty_address() -> Value {
    Value::Object(serde_json::Map::new())
}
