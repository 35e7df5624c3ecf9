//! Shared Socrata SODA API fetcher.
//!
//! Handles paginated fetching from a Socrata dataset using the `$limit`,
//! `$offset`, `$order`, and `$where` query parameters. The WFPS call log
//! lives on Winnipeg's Socrata portal; any other SODA dataset works the
//! same way.

use std::fmt::Write as _;

use crate::{FetchOptions, SourceError};

/// Configuration for a Socrata fetch operation.
pub struct SocrataConfig<'a> {
    /// Base API URL (e.g., `"https://data.winnipeg.ca/resource/yg42-q284.json"`).
    pub api_url: &'a str,
    /// The date column name for ordering and `$where` filtering (e.g.,
    /// `"call_time"`).
    pub date_column: &'a str,
    /// Label for log messages (e.g., `"WFPS call log"`).
    pub label: &'a str,
    /// Page size for pagination.
    pub page_size: u64,
}

/// Fetches all rows from a Socrata dataset with pagination, newest first.
///
/// # Errors
///
/// Returns [`SourceError`] if an HTTP request or response decoding fails.
pub async fn fetch_rows(
    client: &reqwest::Client,
    config: &SocrataConfig<'_>,
    options: &FetchOptions,
) -> Result<Vec<serde_json::Value>, SourceError> {
    let mut all_rows: Vec<serde_json::Value> = Vec::new();
    let mut offset: u64 = 0;
    let fetch_limit = options.limit.unwrap_or(u64::MAX);

    loop {
        let remaining = fetch_limit.saturating_sub(offset);
        if remaining == 0 {
            break;
        }
        let page_limit = remaining.min(config.page_size);

        let mut url = format!(
            "{}?$limit={}&$offset={}&$order={} DESC",
            config.api_url, page_limit, offset, config.date_column
        );

        if let Some(since) = &options.since {
            let since_str = since.format("%Y-%m-%dT%H:%M:%S%.3f").to_string();
            write!(url, "&$where={} > '{since_str}'", config.date_column).unwrap();
        }

        log::info!(
            "Fetching {}: offset={offset}, limit={page_limit}",
            config.label
        );
        let response = client.get(&url).send().await?;
        let rows: Vec<serde_json::Value> = response.json().await?;

        let count = rows.len() as u64;
        if count == 0 {
            break;
        }

        all_rows.extend(rows);
        offset += count;

        if count < page_limit {
            break;
        }
    }

    log::info!("Downloaded {} {} rows total", all_rows.len(), config.label);

    Ok(all_rows)
}
