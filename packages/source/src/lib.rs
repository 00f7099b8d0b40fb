#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Retrieval and field-level parsing for the RDW parking datasets.
//!
//! The [`DataSource`] trait is the seam between the ingest pipeline and the
//! network: [`SocrataDataSource`] implements it against the RDW Socrata
//! portal, and tests implement it with in-memory fixtures.

pub mod area_mapping;
pub mod parsing;
pub mod progress;
pub mod registry;
pub mod retry;
pub mod socrata;

use std::sync::Arc;

use async_trait::async_trait;
use parking_stats_source_models::{DatasetDescriptor, RawRecord};

use crate::progress::{ProgressCallback, null_progress};
use crate::retry::RetryPolicy;
use crate::socrata::{SocrataFetch, fetch_socrata};

/// Errors that can occur during data source operations.
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    /// HTTP request failed.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The server answered with a non-success status.
    #[error("HTTP {status} from {url}")]
    HttpStatus {
        /// Response status code.
        status: u16,
        /// Requested URL.
        url: String,
    },

    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    /// I/O error (file read/write).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The payload did not have the expected shape.
    #[error("Normalization error: {message}")]
    Normalization {
        /// Description of what went wrong.
        message: String,
    },
}

/// Retrieves raw datasets.
///
/// Implementations resolve to one dataset per descriptor, in the order the
/// descriptors were given, and fail as a whole if any retrieval fails.
#[async_trait]
pub trait DataSource: Send + Sync {
    /// Fetches every dataset in `datasets`.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError`] if any of the retrievals fails.
    async fn fetch_many(
        &self,
        datasets: &[DatasetDescriptor],
    ) -> Result<Vec<Vec<RawRecord>>, SourceError>;
}

/// [`DataSource`] backed by the Socrata SODA API.
pub struct SocrataDataSource {
    client: reqwest::Client,
    retry: RetryPolicy,
    limit: Option<u64>,
    progress: Arc<dyn ProgressCallback>,
}

impl SocrataDataSource {
    /// Creates a data source with the default retry policy and no record
    /// limit.
    #[must_use]
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
            retry: RetryPolicy::default(),
            limit: None,
            progress: null_progress(),
        }
    }

    /// Caps the number of records fetched per dataset.
    #[must_use]
    pub const fn with_limit(mut self, limit: Option<u64>) -> Self {
        self.limit = limit;
        self
    }

    /// Reports download progress to `progress`.
    #[must_use]
    pub fn with_progress(mut self, progress: Arc<dyn ProgressCallback>) -> Self {
        self.progress = progress;
        self
    }
}

impl Default for SocrataDataSource {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DataSource for SocrataDataSource {
    async fn fetch_many(
        &self,
        datasets: &[DatasetDescriptor],
    ) -> Result<Vec<Vec<RawRecord>>, SourceError> {
        let fetch = SocrataFetch {
            client: &self.client,
            retry: &self.retry,
            limit: self.limit,
            progress: Arc::clone(&self.progress),
        };

        // try_join_all keeps input order and drops the remaining
        // futures as soon as one fails.
        let results = futures::future::try_join_all(
            datasets.iter().map(|dataset| fetch_socrata(dataset, &fetch)),
        )
        .await?;

        let total: usize = results.iter().map(Vec::len).sum();
        self.progress
            .finish(format!("Fetched {total} records from {} datasets", datasets.len()));

        Ok(results)
    }
}
