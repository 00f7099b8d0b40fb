//! Dataset registry — loads the RDW dataset descriptors from embedded TOML.
//!
//! Each `.toml` file in `packages/source/datasets/` is baked into the binary
//! at compile time via [`include_str!`].

use parking_stats_source_models::{DatasetDescriptor, DatasetKind};

/// TOML configs embedded at compile time.
const DATASET_TOMLS: &[(&str, &str)] = &[
    ("tariefdeel", include_str!("../datasets/tariefdeel.toml")),
    (
        "geo_parkeergarages",
        include_str!("../datasets/geo_parkeergarages.toml"),
    ),
    (
        "specificaties_parkeergebied",
        include_str!("../datasets/specificaties_parkeergebied.toml"),
    ),
];

/// The three datasets the parking pipeline joins, by role.
#[derive(Debug, Clone)]
pub struct ParkingDatasets {
    /// Tariff parts, joined by area manager.
    pub tariff: DatasetDescriptor,
    /// Garage geolocation, the left side of the join.
    pub geo: DatasetDescriptor,
    /// Area specifications, joined by area.
    pub specification: DatasetDescriptor,
}

impl ParkingDatasets {
    /// Descriptors in fetch order: tariff, geo, specification.
    #[must_use]
    pub fn in_fetch_order(&self) -> [DatasetDescriptor; 3] {
        [
            self.tariff.clone(),
            self.geo.clone(),
            self.specification.clone(),
        ]
    }
}

/// Parses a single dataset descriptor from TOML.
///
/// # Errors
///
/// Returns the TOML error message if the descriptor is malformed.
pub fn parse_dataset_toml(toml_str: &str) -> Result<DatasetDescriptor, String> {
    toml::de::from_str(toml_str).map_err(|e| e.to_string())
}

/// Returns all configured dataset descriptors, parsed from embedded TOML.
///
/// # Panics
///
/// Panics if any embedded TOML config is malformed.
#[must_use]
pub fn all_datasets() -> Vec<DatasetDescriptor> {
    DATASET_TOMLS
        .iter()
        .map(|(name, toml)| {
            parse_dataset_toml(toml).unwrap_or_else(|e| panic!("Failed to parse {name}.toml: {e}"))
        })
        .collect()
}

/// Returns the embedded datasets grouped by role.
///
/// # Panics
///
/// Panics if the embedded configs do not contain exactly one dataset of
/// each kind.
#[must_use]
pub fn parking_datasets() -> ParkingDatasets {
    let datasets = all_datasets();
    let take = |kind: DatasetKind| {
        let mut matching = datasets.iter().filter(|d| d.kind == kind);
        let found = matching
            .next()
            .unwrap_or_else(|| panic!("No embedded dataset of kind {kind}"))
            .clone();
        assert!(
            matching.next().is_none(),
            "More than one embedded dataset of kind {kind}"
        );
        found
    };

    ParkingDatasets {
        tariff: take(DatasetKind::Tariff),
        geo: take(DatasetKind::Geo),
        specification: take(DatasetKind::Specification),
    }
}
