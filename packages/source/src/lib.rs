#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! WFPS call log data source.
//!
//! Fetches the Winnipeg Fire & Paramedic Service call log from the city's
//! Socrata open-data portal and parses the raw rows into
//! [`IncidentRecord`]s. Rows missing required fields are reported and
//! skipped rather than failing the fetch.

pub mod parsing;
pub mod socrata;

use wfps_map_incident_models::IncidentRecord;

use crate::socrata::SocrataConfig;

/// The WFPS call log dataset on the Winnipeg open-data portal.
pub const WFPS_CALL_LOG_URL: &str = "https://data.winnipeg.ca/resource/yg42-q284.json";

/// Errors that can occur during data source operations.
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    /// HTTP request failed.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Configuration for fetching call logs.
#[derive(Debug, Clone, Default)]
pub struct FetchOptions {
    /// Only fetch records with a call time after this timestamp.
    pub since: Option<chrono::DateTime<chrono::Utc>>,
    /// Maximum number of records to fetch.
    pub limit: Option<u64>,
}

/// A raw row that failed validation, reported alongside the parsed records.
#[derive(Debug, Clone)]
pub struct MalformedRow {
    /// Incident number if the row carried one, for log correlation.
    pub incident_number: Option<String>,
    /// What was missing or unparseable.
    pub message: String,
}

/// The result of one call log fetch: valid records plus per-row rejects.
#[derive(Debug, Clone)]
pub struct CallLogBatch {
    /// Records that passed validation, in source order (most-recent-first).
    pub records: Vec<IncidentRecord>,
    /// Rows skipped because required fields were missing or unparseable.
    pub malformed: Vec<MalformedRow>,
}

/// Fetches the current WFPS call log and parses it into incident records.
///
/// Malformed rows are logged at warn level and returned in the batch for
/// the caller to report; they never abort the fetch.
///
/// # Errors
///
/// Returns [`SourceError`] if the HTTP request or response decoding fails.
pub async fn fetch_call_logs(
    client: &reqwest::Client,
    options: &FetchOptions,
) -> Result<CallLogBatch, SourceError> {
    let config = SocrataConfig {
        api_url: WFPS_CALL_LOG_URL,
        date_column: "call_time",
        label: "WFPS call log",
        page_size: 1000,
    };

    let rows = socrata::fetch_rows(client, &config, options).await?;

    let mut records = Vec::with_capacity(rows.len());
    let mut malformed = Vec::new();

    for row in &rows {
        match parsing::parse_call_log_row(row) {
            Ok(record) => records.push(record),
            Err(reject) => {
                log::warn!(
                    "Skipping malformed call log row (incident {}): {}",
                    reject.incident_number.as_deref().unwrap_or("unknown"),
                    reject.message
                );
                malformed.push(reject);
            }
        }
    }

    Ok(CallLogBatch { records, malformed })
}
