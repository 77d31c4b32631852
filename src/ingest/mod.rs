//! Data ingestion clients for the upstream open-data platforms.
//!
//! Two providers, two conventions: MOENV (環境部, data.moenv.gov.tw) serves
//! flat record arrays with every value as a string, while CWA (中央氣象署,
//! opendata.cwa.gov.tw) serves deeply nested per-location trees. Each
//! client exposes pure `parse_*` functions over response bodies so decoding
//! is testable without network access.

pub mod cwa;
pub mod moenv;

use std::time::Duration;

use crate::model::IngestError;

/// Per-request timeout applied to every provider call.
pub const HTTP_TIMEOUT: Duration = Duration::from_secs(30);

/// Builds the blocking HTTP client shared by all fetchers.
pub fn build_client() -> Result<reqwest::blocking::Client, IngestError> {
    reqwest::blocking::Client::builder()
        .timeout(HTTP_TIMEOUT)
        .build()
        .map_err(|e| IngestError::RequestError(e.to_string()))
}

/// Parses a numeric field served as text.
///
/// MOENV publishes numbers as strings and marks missing values with an
/// empty string, `"-"`, or `"ND"` (below detection limit); all of those
/// come back as `None`, as does any other unparseable content.
pub fn parse_numeric(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed == "-" || trimmed.eq_ignore_ascii_case("nd") {
        return None;
    }
    trimmed.parse().ok()
}
