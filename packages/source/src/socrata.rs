//! Socrata SODA API fetcher.
//!
//! Handles paginated fetching from a Socrata dataset using the `$limit`,
//! `$offset` and `$order` query parameters. The RDW parking datasets have no
//! date column, so pages are ordered by the system `:id` column to keep
//! offsets stable between requests.

use std::sync::Arc;

use parking_stats_source_models::{DatasetDescriptor, RawRecord};

use crate::SourceError;
use crate::progress::ProgressCallback;
use crate::retry::{self, RetryPolicy};

/// Column used to give pages a stable order.
const ORDER_COLUMN: &str = ":id";

/// Options shared by all page requests of one fetch.
#[derive(Clone)]
pub struct SocrataFetch<'a> {
    /// HTTP client to issue requests with.
    pub client: &'a reqwest::Client,
    /// Retry behaviour for each page.
    pub retry: &'a RetryPolicy,
    /// Maximum number of records to fetch (`None` for all).
    pub limit: Option<u64>,
    /// Receives record counts as pages arrive.
    pub progress: Arc<dyn ProgressCallback>,
}

/// Fetches all records of a Socrata dataset, page by page.
///
/// # Errors
///
/// Returns [`SourceError`] if a page request fails after retries, or a page
/// is not a JSON array.
pub async fn fetch_socrata(
    dataset: &DatasetDescriptor,
    fetch: &SocrataFetch<'_>,
) -> Result<Vec<RawRecord>, SourceError> {
    let mut records: Vec<RawRecord> = Vec::new();
    let mut offset: u64 = 0;
    let fetch_limit = fetch.limit.unwrap_or(u64::MAX);
    let page_size = dataset.page_size.max(1);
    fetch.progress.set_message(format!("Fetching {}", dataset.name));

    loop {
        let remaining = fetch_limit.saturating_sub(offset);
        if remaining == 0 {
            break;
        }
        let page_limit = remaining.min(page_size);
        fetch.progress.add_total(page_limit);

        log::info!(
            "Fetching {} data: offset={offset}, limit={page_limit}",
            dataset.name
        );
        let page = retry::send_json(fetch.retry, || {
            fetch.client.get(&dataset.api_url).query(&[
                ("$limit", page_limit.to_string()),
                ("$offset", offset.to_string()),
                ("$order", ORDER_COLUMN.to_string()),
            ])
        })
        .await?;

        let Page { rows, row_count } = page_records(dataset, page)?;
        let count = row_count as u64;
        fetch.progress.inc(count);

        records.extend(rows);
        offset += count;

        if count < page_limit {
            break;
        }
    }

    log::info!("Downloaded {} {} records total", records.len(), dataset.name);
    Ok(records)
}

/// One decoded page.
#[derive(Debug)]
struct Page {
    /// The object rows.
    rows: Vec<RawRecord>,
    /// Rows the server returned, skipped ones included. Offsets advance by
    /// this count.
    row_count: usize,
}

/// Splits a page payload into object rows. Rows that are not JSON objects
/// are skipped with a warning.
fn page_records(
    dataset: &DatasetDescriptor,
    page: serde_json::Value,
) -> Result<Page, SourceError> {
    let serde_json::Value::Array(rows) = page else {
        return Err(SourceError::Normalization {
            message: format!("{}: expected a JSON array page", dataset.id),
        });
    };

    let total = rows.len();
    let records: Vec<RawRecord> = rows
        .into_iter()
        .filter_map(|row| match row {
            serde_json::Value::Object(record) => Some(record),
            _ => None,
        })
        .collect();

    if records.len() < total {
        log::warn!(
            "{}: skipped {} non-object rows",
            dataset.id,
            total - records.len()
        );
    }

    Ok(Page {
        rows: records,
        row_count: total,
    })
}
