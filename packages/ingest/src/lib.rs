#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Fetches, joins and normalizes the RDW parking datasets.
//!
//! [`clean_data`] is the pipeline entry point: it either serves the cached
//! result or fetches the three datasets, joins them with [`join::join`] and
//! normalizes every joined record with [`normalize::normalize`].

pub mod join;
pub mod normalize;

use std::time::Instant;

use parking_stats_database::CacheError;
use parking_stats_database::cache::CacheStore;
use parking_stats_parking_models::ParkingArea;
use parking_stats_source::area_mapping::AreaClassifier;
use parking_stats_source::registry::ParkingDatasets;
use parking_stats_source::{DataSource, SourceError};

pub use normalize::NormalizeError;

/// Environment variable naming the runtime environment.
pub const ENV_VAR: &str = "PARKING_STATS_ENV";

/// Errors that can occur during a pipeline run.
#[derive(Debug, thiserror::Error)]
pub enum IngestError {
    /// Retrieving one of the datasets failed.
    #[error("Source error: {0}")]
    Source(#[from] SourceError),

    /// A joined record could not be normalized.
    #[error("Normalize error: {0}")]
    Normalize(#[from] NormalizeError),

    /// The cache was selected but could not be read.
    #[error("Cache error: {0}")]
    Cache(#[from] CacheError),

    /// The data source returned the wrong number of datasets.
    #[error("Expected {expected} datasets, data source returned {actual}")]
    DatasetCount {
        /// Number of datasets requested.
        expected: usize,
        /// Number of datasets returned.
        actual: usize,
    },
}

/// Whether a pipeline run may be served from the cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheGate {
    /// Serve cached entities when the cache has data.
    UseCache,
    /// Always fetch fresh data.
    Refresh,
}

impl CacheGate {
    /// Derives the gate from the caller's refresh flag and the runtime
    /// environment. Development environments always refresh.
    #[must_use]
    pub fn from_env(refresh: bool) -> Self {
        let development = std::env::var(ENV_VAR).is_ok_and(|env| is_development(&env));
        if refresh || development {
            Self::Refresh
        } else {
            Self::UseCache
        }
    }
}

fn is_development(env: &str) -> bool {
    env.trim().eq_ignore_ascii_case("development")
}

/// Collaborators of one pipeline run.
pub struct Pipeline<'a> {
    /// Where the raw datasets come from.
    pub source: &'a dyn DataSource,
    /// Where normalized entities are cached.
    pub cache: &'a dyn CacheStore,
    /// Maps descriptions to coarse areas.
    pub classifier: &'a dyn AreaClassifier,
    /// The three datasets to fetch.
    pub datasets: &'a ParkingDatasets,
}

/// Produces the normalized parking areas.
///
/// With [`CacheGate::UseCache`] and a cache that has data, the cached
/// entities are returned as-is. Otherwise the three datasets are fetched
/// (all or nothing), joined, and normalized in geo-record order. The fresh
/// result is offered to the cache; a failing cache write is logged and does
/// not fail the run.
///
/// # Errors
///
/// Returns [`IngestError`] if any dataset retrieval fails, a record has a
/// malformed address, or the selected cache cannot be read.
pub async fn clean_data(
    pipeline: &Pipeline<'_>,
    gate: CacheGate,
) -> Result<Vec<ParkingArea>, IngestError> {
    if gate == CacheGate::UseCache && pipeline.cache.has() {
        log::info!("Serving parking areas from cache");
        return Ok(pipeline.cache.read()?);
    }

    let start = Instant::now();
    let requested = pipeline.datasets.in_fetch_order();
    let datasets = pipeline.source.fetch_many(&requested).await?;

    let [tariffs, geo, specifications] = match <[_; 3]>::try_from(datasets) {
        Ok(datasets) => datasets,
        Err(datasets) => {
            return Err(IngestError::DatasetCount {
                expected: requested.len(),
                actual: datasets.len(),
            });
        }
    };

    let entities = join::join(&geo, &specifications, &tariffs)
        .iter()
        .map(|record| normalize::normalize(record, pipeline.classifier))
        .collect::<Result<Vec<_>, _>>()?;

    log::info!(
        "Normalized {} parking areas in {:.1}s",
        entities.len(),
        start.elapsed().as_secs_f64()
    );

    if let Err(e) = pipeline.cache.write(&entities) {
        log::warn!("Failed to write parking area cache: {e}");
    }

    Ok(entities)
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;
    use parking_stats_database::cache::MemoryCache;
    use parking_stats_parking_models::ParkingLocation;
    use parking_stats_source::area_mapping::KeywordAreaClassifier;
    use parking_stats_source::registry::parking_datasets;
    use parking_stats_source_models::{DatasetDescriptor, DatasetKind, RawRecord};
    use serde_json::json;

    /// Serves fixed datasets keyed by kind, counting calls.
    struct StaticSource {
        tariffs: Vec<RawRecord>,
        geo: Vec<RawRecord>,
        specifications: Vec<RawRecord>,
        calls: AtomicUsize,
    }

    impl StaticSource {
        fn new(tariffs: serde_json::Value, geo: serde_json::Value, specs: serde_json::Value) -> Self {
            Self {
                tariffs: records(tariffs),
                geo: records(geo),
                specifications: records(specs),
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl DataSource for StaticSource {
        async fn fetch_many(
            &self,
            datasets: &[DatasetDescriptor],
        ) -> Result<Vec<Vec<RawRecord>>, SourceError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(datasets
                .iter()
                .map(|d| match d.kind {
                    DatasetKind::Tariff => self.tariffs.clone(),
                    DatasetKind::Geo => self.geo.clone(),
                    DatasetKind::Specification => self.specifications.clone(),
                })
                .collect())
        }
    }

    struct FailingSource;

    #[async_trait]
    impl DataSource for FailingSource {
        async fn fetch_many(
            &self,
            _datasets: &[DatasetDescriptor],
        ) -> Result<Vec<Vec<RawRecord>>, SourceError> {
            Err(SourceError::HttpStatus {
                status: 503,
                url: "https://opendata.rdw.nl/resource/534e-5vdg.json".to_string(),
            })
        }
    }

    fn records(value: serde_json::Value) -> Vec<RawRecord> {
        value
            .as_array()
            .unwrap()
            .iter()
            .map(|v| v.as_object().cloned().unwrap())
            .collect()
    }

    fn single_area_source() -> StaticSource {
        StaticSource::new(
            json!([{"areamanagerid": "363", "amountfarepart": "0.6", "stepsizefarepart": "12"}]),
            json!([{
                "areaid": "363_GARAGE",
                "areamanagerid": "363",
                "areadesc": "Parkeergarage Oosterdok Amsterdam",
                "disabledaccess": "1",
                "capacity": "1800",
                "location": {
                    "latitude": "52.3752",
                    "longitude": "4.9075",
                    "human_address": "{\"address\": \"Oosterdokskade\", \"city\": \"Amsterdam\"}"
                }
            }]),
            json!([{"areaid": "363_GARAGE", "chargingpointcapacity": "12"}]),
        )
    }

    fn cached_area() -> ParkingArea {
        ParkingArea {
            wheelchair_accessible: false,
            parking_capacity: 1.0,
            charging_point_capacity: 0.0,
            hourly_cost: 1.0,
            area_manager_id: 1.0,
            area_id: "cached".to_string(),
            description: String::new(),
            area: None,
            location: ParkingLocation::default(),
        }
    }

    #[tokio::test]
    async fn joins_and_normalizes_a_single_area() {
        let source = single_area_source();
        let cache = MemoryCache::new();
        let classifier = KeywordAreaClassifier::embedded();
        let datasets = parking_datasets();
        let pipeline = Pipeline {
            source: &source,
            cache: &cache,
            classifier: &classifier,
            datasets: &datasets,
        };

        let areas = clean_data(&pipeline, CacheGate::Refresh).await.unwrap();

        assert_eq!(areas.len(), 1);
        let area = &areas[0];
        assert!(area.wheelchair_accessible);
        assert!((area.parking_capacity - 1800.0).abs() < f64::EPSILON);
        assert!((area.charging_point_capacity - 12.0).abs() < f64::EPSILON);
        assert!((area.hourly_cost - 3.0).abs() < 1e-9);
        assert!((area.area_manager_id - 363.0).abs() < f64::EPSILON);
        assert_eq!(area.area_id, "363_GARAGE");
        assert_eq!(area.area.as_deref(), Some("Amsterdam"));
        assert!((area.location.latitude - 52.3752).abs() < f64::EPSILON);
        assert_eq!(
            area.location.human_readable_address["address"],
            "Oosterdokskade"
        );
        assert_eq!(source.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn fresh_result_is_offered_to_the_cache() {
        let source = single_area_source();
        let cache = MemoryCache::new();
        let classifier = KeywordAreaClassifier::embedded();
        let datasets = parking_datasets();
        let pipeline = Pipeline {
            source: &source,
            cache: &cache,
            classifier: &classifier,
            datasets: &datasets,
        };

        let areas = clean_data(&pipeline, CacheGate::UseCache).await.unwrap();

        assert!(cache.has());
        assert_eq!(cache.read().unwrap(), areas);
    }

    #[tokio::test]
    async fn cached_entities_skip_the_data_source() {
        let source = single_area_source();
        let cache = MemoryCache::with_entities(vec![cached_area()]);
        let classifier = KeywordAreaClassifier::embedded();
        let datasets = parking_datasets();
        let pipeline = Pipeline {
            source: &source,
            cache: &cache,
            classifier: &classifier,
            datasets: &datasets,
        };

        let areas = clean_data(&pipeline, CacheGate::UseCache).await.unwrap();

        assert_eq!(areas, vec![cached_area()]);
        assert_eq!(source.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn refresh_ignores_a_populated_cache() {
        let source = single_area_source();
        let cache = MemoryCache::with_entities(vec![cached_area()]);
        let classifier = KeywordAreaClassifier::embedded();
        let datasets = parking_datasets();
        let pipeline = Pipeline {
            source: &source,
            cache: &cache,
            classifier: &classifier,
            datasets: &datasets,
        };

        let areas = clean_data(&pipeline, CacheGate::Refresh).await.unwrap();

        assert_eq!(areas[0].area_id, "363_GARAGE");
        assert_eq!(source.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn retrieval_failure_fails_the_run() {
        let cache = MemoryCache::new();
        let classifier = KeywordAreaClassifier::embedded();
        let datasets = parking_datasets();
        let pipeline = Pipeline {
            source: &FailingSource,
            cache: &cache,
            classifier: &classifier,
            datasets: &datasets,
        };

        let err = clean_data(&pipeline, CacheGate::Refresh).await.unwrap_err();

        assert!(matches!(err, IngestError::Source(SourceError::HttpStatus { status: 503, .. })));
        assert!(!cache.has());
    }

    #[tokio::test]
    async fn malformed_address_fails_the_run() {
        let source = StaticSource::new(
            json!([]),
            json!([{"areaid": "A", "location": {"human_address": "{"}}]),
            json!([]),
        );
        let cache = MemoryCache::new();
        let classifier = KeywordAreaClassifier::embedded();
        let datasets = parking_datasets();
        let pipeline = Pipeline {
            source: &source,
            cache: &cache,
            classifier: &classifier,
            datasets: &datasets,
        };

        let err = clean_data(&pipeline, CacheGate::Refresh).await.unwrap_err();

        assert!(matches!(
            err,
            IngestError::Normalize(NormalizeError::MalformedAddress { .. })
        ));
    }

    #[tokio::test]
    async fn output_follows_geo_order() {
        let source = StaticSource::new(
            json!([]),
            json!([{"areaid": "C"}, {"areaid": "A"}, {"areaid": "B"}]),
            json!([{"areaid": "A"}, {"areaid": "B"}, {"areaid": "C"}]),
        );
        let cache = MemoryCache::new();
        let classifier = KeywordAreaClassifier::embedded();
        let datasets = parking_datasets();
        let pipeline = Pipeline {
            source: &source,
            cache: &cache,
            classifier: &classifier,
            datasets: &datasets,
        };

        let areas = clean_data(&pipeline, CacheGate::Refresh).await.unwrap();

        let ids: Vec<&str> = areas.iter().map(|a| a.area_id.as_str()).collect();
        assert_eq!(ids, vec!["C", "A", "B"]);
    }

    #[test]
    fn development_environment_is_case_insensitive() {
        assert!(is_development("development"));
        assert!(is_development(" Development "));
        assert!(!is_development("production"));
    }
}
