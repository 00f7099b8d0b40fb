//! Left outer join of the geo, specification and tariff datasets.
//!
//! Every geo record yields exactly one [`JoinedRecord`], in input order. The
//! specification and tariff sides are indexed once up front, each key
//! pointing at the first record seen with it, so duplicate keys resolve to
//! the earliest row.

use std::collections::HashMap;

use parking_stats_source_models::{JoinedRecord, RawRecord, fields};
use serde_json::Value;

/// A hashable join key.
///
/// Values compare strictly: the string `"1"` never matches the number `1`,
/// while `1` and `1.0` are the same number. A missing field is a key of its
/// own, so rows lacking the field on both sides join each other.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum JoinKey {
    Absent,
    Null,
    Bool(bool),
    Number(u64),
    Text(String),
}

impl JoinKey {
    /// Builds a key from a field value. Structured values never join.
    fn from_field(value: Option<&Value>) -> Option<Self> {
        let Some(value) = value else {
            return Some(Self::Absent);
        };
        match value {
            Value::Null => Some(Self::Null),
            Value::Bool(b) => Some(Self::Bool(*b)),
            Value::Number(n) => {
                let number = n.as_f64()?;
                // -0.0 and 0.0 are the same key.
                let number = if number == 0.0 { 0.0 } else { number };
                Some(Self::Number(number.to_bits()))
            }
            Value::String(s) => Some(Self::Text(s.clone())),
            Value::Array(_) | Value::Object(_) => None,
        }
    }
}

/// Maps each join key to the first record carrying it.
struct FirstMatchIndex<'a> {
    by_key: HashMap<JoinKey, &'a RawRecord>,
}

impl<'a> FirstMatchIndex<'a> {
    fn build(records: &'a [RawRecord], key_field: &str) -> Self {
        let mut by_key = HashMap::with_capacity(records.len());
        for record in records {
            if let Some(key) = JoinKey::from_field(record.get(key_field)) {
                by_key.entry(key).or_insert(record);
            }
        }
        Self { by_key }
    }

    fn find(&self, value: Option<&Value>) -> Option<&'a RawRecord> {
        let key = JoinKey::from_field(value)?;
        self.by_key.get(&key).copied()
    }
}

/// Joins geo records with their specification (by area id) and tariff (by
/// area manager id) records.
///
/// The tariff lookup uses the area manager id of the already-merged record,
/// so a specification row that carries its own `areamanagerid` decides the
/// tariff match.
#[must_use]
pub fn join(
    geo: &[RawRecord],
    specifications: &[RawRecord],
    tariffs: &[RawRecord],
) -> Vec<JoinedRecord> {
    let spec_index = FirstMatchIndex::build(specifications, fields::AREA_ID);
    let tariff_index = FirstMatchIndex::build(tariffs, fields::AREA_MANAGER_ID);

    let mut spec_misses = 0usize;
    let mut tariff_misses = 0usize;

    let joined: Vec<JoinedRecord> = geo
        .iter()
        .map(|location| {
            let mut entry = JoinedRecord::new(location.clone());

            match spec_index.find(location.get(fields::AREA_ID)) {
                Some(spec) => entry.merge(spec),
                None => spec_misses += 1,
            }

            match tariff_index.find(entry.get(fields::AREA_MANAGER_ID)) {
                Some(tariff) => entry.merge(tariff),
                None => tariff_misses += 1,
            }

            entry
        })
        .collect();

    log::info!(
        "Joined {} geo records ({spec_misses} without specification, \
         {tariff_misses} without tariff)",
        joined.len()
    );

    joined
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn records(value: Value) -> Vec<RawRecord> {
        value
            .as_array()
            .unwrap()
            .iter()
            .map(|v| v.as_object().cloned().unwrap())
            .collect()
    }

    #[test]
    fn unmatched_geo_record_keeps_only_geo_fields() {
        let geo = records(json!([{"areaid": "A", "areamanagerid": "1", "capacity": "10"}]));
        let joined = join(&geo, &[], &[]);

        assert_eq!(joined.len(), 1);
        assert_eq!(joined[0].fields(), &geo[0]);
    }

    #[test]
    fn output_count_equals_geo_count() {
        let geo = records(json!([
            {"areaid": "A", "areamanagerid": "1"},
            {"areaid": "B", "areamanagerid": "2"},
            {"areaid": "A", "areamanagerid": "1"},
            {"areamanagerid": "3"}
        ]));
        let specs = records(json!([{"areaid": "A", "chargingpointcapacity": "4"}]));
        let tariffs = records(json!([{"areamanagerid": "2", "amountfarepart": "1"}]));

        let joined = join(&geo, &specs, &tariffs);

        assert_eq!(joined.len(), geo.len());
        assert_eq!(joined[0].get("chargingpointcapacity"), Some(&json!("4")));
        assert_eq!(joined[1].get("amountfarepart"), Some(&json!("1")));
        assert_eq!(joined[2].get("chargingpointcapacity"), Some(&json!("4")));
        assert_eq!(joined[3].get("chargingpointcapacity"), None);
    }

    #[test]
    fn first_matching_record_wins() {
        let geo = records(json!([{"areaid": "A", "areamanagerid": "1"}]));
        let specs = records(json!([
            {"areaid": "A", "chargingpointcapacity": "first"},
            {"areaid": "A", "chargingpointcapacity": "second"}
        ]));
        let tariffs = records(json!([
            {"areamanagerid": "1", "amountfarepart": "0.5"},
            {"areamanagerid": "1", "amountfarepart": "9.9"}
        ]));

        let joined = join(&geo, &specs, &tariffs);

        assert_eq!(joined[0].get("chargingpointcapacity"), Some(&json!("first")));
        assert_eq!(joined[0].get("amountfarepart"), Some(&json!("0.5")));
    }

    #[test]
    fn later_sources_overwrite_on_collision() {
        let geo = records(json!([{"areaid": "A", "areamanagerid": "1", "startdate": "geo"}]));
        let specs = records(json!([{"areaid": "A", "startdate": "spec"}]));
        let tariffs = records(json!([{"areamanagerid": "1", "startdate": "tariff"}]));

        let joined = join(&geo, &specs, &tariffs);

        assert_eq!(joined[0].get("startdate"), Some(&json!("tariff")));
    }

    #[test]
    fn tariff_lookup_uses_merged_area_manager_id() {
        let geo = records(json!([{"areaid": "A", "areamanagerid": "1"}]));
        let specs = records(json!([{"areaid": "A", "areamanagerid": "2"}]));
        let tariffs = records(json!([
            {"areamanagerid": "1", "amountfarepart": "one"},
            {"areamanagerid": "2", "amountfarepart": "two"}
        ]));

        let joined = join(&geo, &specs, &tariffs);

        assert_eq!(joined[0].get("amountfarepart"), Some(&json!("two")));
    }

    #[test]
    fn keys_compare_strictly_by_type() {
        let geo = records(json!([
            {"areaid": "A", "areamanagerid": 7},
            {"areaid": "B", "areamanagerid": "7"},
            {"areaid": "C", "areamanagerid": 7.0}
        ]));
        let tariffs = records(json!([{"areamanagerid": 7, "amountfarepart": "1"}]));

        let joined = join(&geo, &[], &tariffs);

        assert!(joined[0].get("amountfarepart").is_some());
        assert!(joined[1].get("amountfarepart").is_none());
        assert!(joined[2].get("amountfarepart").is_some());
    }

    #[test]
    fn missing_keys_join_rows_missing_the_same_key() {
        let geo = records(json!([{"capacity": "5"}]));
        let specs = records(json!([
            {"areaid": "A", "chargingpointcapacity": "1"},
            {"chargingpointcapacity": "3"},
            {"chargingpointcapacity": "4"}
        ]));
        let tariffs = records(json!([
            {"areamanagerid": "1", "amountfarepart": "9"},
            {"amountfarepart": "1", "stepsizefarepart": "30"}
        ]));

        let joined = join(&geo, &specs, &tariffs);

        assert_eq!(joined[0].get("chargingpointcapacity"), Some(&json!("3")));
        assert_eq!(joined[0].get("amountfarepart"), Some(&json!("1")));
        assert_eq!(joined[0].get("capacity"), Some(&json!("5")));
    }

    #[test]
    fn missing_key_does_not_match_null_key() {
        let geo = records(json!([{"capacity": "5"}]));
        let specs = records(json!([{"areaid": null, "chargingpointcapacity": "1"}]));

        let joined = join(&geo, &specs, &[]);

        assert_eq!(joined[0].get("chargingpointcapacity"), None);
    }

    #[test]
    fn structured_keys_never_join() {
        let geo = records(json!([{"areaid": ["A"]}, {"areaid": {"id": "A"}}]));
        let specs = records(json!([
            {"areaid": ["A"], "chargingpointcapacity": "1"},
            {"areaid": {"id": "A"}, "chargingpointcapacity": "2"}
        ]));

        let joined = join(&geo, &specs, &[]);

        assert!(joined.iter().all(|r| r.get("chargingpointcapacity").is_none()));
    }
}
