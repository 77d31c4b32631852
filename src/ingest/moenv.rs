//! MOENV (Ministry of Environment) open-data client.
//!
//! Retrieves station-level air quality, acid rain, and ultraviolet index
//! records from the MOENV open-data platform. All three datasets share the
//! same envelope: a flat `records` array in which every value, numeric or
//! not, is a JSON string.
//!
//! API documentation: https://data.moenv.gov.tw/en/paradigm

use serde::Deserialize;

use crate::ingest::parse_numeric;
use crate::model::{
    AcidRainReading, AirQualityReading, IngestError, UvReading, DATASET_ACID_RAIN,
    DATASET_AIR_QUALITY, DATASET_UV,
};

const MOENV_BASE_URL: &str = "https://data.moenv.gov.tw/api/v2";

/// Builds the request URL for a MOENV dataset.
///
/// The platform authenticates with an `api_key` query parameter; there is
/// no header-based scheme.
pub fn build_dataset_url(dataset: &str, api_key: &str) -> String {
    format!("{}/{}?api_key={}", MOENV_BASE_URL, dataset, api_key)
}

// ============================================================================
// MOENV API Response Structures
// ============================================================================

#[derive(Debug, Deserialize)]
struct AirQualityResponse {
    #[serde(default)]
    records: Vec<AirQualityRecord>,
}

/// One station row from `aqx_p_432`. Numeric fields arrive as strings and
/// may be empty when an instrument is offline.
#[derive(Debug, Deserialize)]
struct AirQualityRecord {
    #[serde(default)]
    sitename: String,
    #[serde(default)]
    county: String,
    #[serde(default)]
    aqi: String,
    #[serde(rename = "pm2.5_avg", default)]
    pm25_avg: String,
    #[serde(default)]
    publishtime: String,
}

#[derive(Debug, Deserialize)]
struct AcidRainResponse {
    #[serde(default)]
    records: Vec<AcidRainRecord>,
}

/// One station row from `acidr_p_04`. Field casing has varied between
/// dataset revisions (`sitename` vs `SiteName`, `ph` vs `pH`), so aliases
/// accept both.
#[derive(Debug, Deserialize)]
struct AcidRainRecord {
    #[serde(default, alias = "SiteName")]
    sitename: String,
    #[serde(default, alias = "County")]
    county: String,
    #[serde(default)]
    mon_date: String,
    #[serde(default, alias = "pH")]
    ph: String,
    #[serde(rename = "RainFall", default)]
    rainfall: String,
}

#[derive(Debug, Deserialize)]
struct UvResponse {
    #[serde(default)]
    records: Vec<UvRecord>,
}

/// One station row from `uv_s_01`.
#[derive(Debug, Deserialize)]
struct UvRecord {
    #[serde(default)]
    sitename: String,
    #[serde(default)]
    county: String,
    #[serde(default)]
    uvi: String,
    #[serde(default)]
    publishtime: String,
}

// ============================================================================
// Fetch Functions
// ============================================================================

/// Fetches the latest hourly air quality records for all stations.
pub fn fetch_air_quality(
    client: &reqwest::blocking::Client,
    api_key: &str,
) -> Result<Vec<AirQualityReading>, IngestError> {
    let body = fetch_dataset(client, DATASET_AIR_QUALITY, api_key)?;
    parse_air_quality(&body)
}

/// Fetches the latest daily acid rain analysis for all stations.
pub fn fetch_acid_rain(
    client: &reqwest::blocking::Client,
    api_key: &str,
) -> Result<Vec<AcidRainReading>, IngestError> {
    let body = fetch_dataset(client, DATASET_ACID_RAIN, api_key)?;
    parse_acid_rain(&body)
}

/// Fetches the latest hourly UV index records for all stations.
pub fn fetch_uv(
    client: &reqwest::blocking::Client,
    api_key: &str,
) -> Result<Vec<UvReading>, IngestError> {
    let body = fetch_dataset(client, DATASET_UV, api_key)?;
    parse_uv(&body)
}

fn fetch_dataset(
    client: &reqwest::blocking::Client,
    dataset: &str,
    api_key: &str,
) -> Result<String, IngestError> {
    let url = build_dataset_url(dataset, api_key);
    let response = client
        .get(&url)
        .header("Accept", "application/json")
        .send()
        .map_err(|e| IngestError::RequestError(e.to_string()))?;

    if !response.status().is_success() {
        return Err(IngestError::HttpError(response.status().as_u16()));
    }

    response
        .text()
        .map_err(|e| IngestError::RequestError(e.to_string()))
}

// ============================================================================
// Parse Functions
// ============================================================================

/// Parses an `aqx_p_432` response body into readings.
///
/// A response that decodes but contains no records at all is reported as
/// [`IngestError::EmptyResponse`]; per-field gaps become `None` instead.
pub fn parse_air_quality(body: &str) -> Result<Vec<AirQualityReading>, IngestError> {
    let response: AirQualityResponse =
        serde_json::from_str(body).map_err(|e| IngestError::ParseError(e.to_string()))?;

    if response.records.is_empty() {
        return Err(IngestError::EmptyResponse(DATASET_AIR_QUALITY));
    }

    Ok(response
        .records
        .into_iter()
        .map(|r| AirQualityReading {
            site_name: r.sitename,
            county: r.county,
            aqi: parse_numeric(&r.aqi),
            pm25: parse_numeric(&r.pm25_avg),
            publish_time: r.publishtime,
        })
        .collect())
}

/// Parses an `acidr_p_04` response body into readings.
pub fn parse_acid_rain(body: &str) -> Result<Vec<AcidRainReading>, IngestError> {
    let response: AcidRainResponse =
        serde_json::from_str(body).map_err(|e| IngestError::ParseError(e.to_string()))?;

    if response.records.is_empty() {
        return Err(IngestError::EmptyResponse(DATASET_ACID_RAIN));
    }

    Ok(response
        .records
        .into_iter()
        .map(|r| AcidRainReading {
            site_name: r.sitename,
            county: r.county,
            ph: parse_numeric(&r.ph),
            rainfall_mm: parse_numeric(&r.rainfall),
            monitor_date: r.mon_date,
        })
        .collect())
}

/// Parses a `uv_s_01` response body into readings.
pub fn parse_uv(body: &str) -> Result<Vec<UvReading>, IngestError> {
    let response: UvResponse =
        serde_json::from_str(body).map_err(|e| IngestError::ParseError(e.to_string()))?;

    if response.records.is_empty() {
        return Err(IngestError::EmptyResponse(DATASET_UV));
    }

    Ok(response
        .records
        .into_iter()
        .map(|r| UvReading {
            site_name: r.sitename,
            county: r.county,
            uvi: parse_numeric(&r.uvi),
            publish_time: r.publishtime,
        })
        .collect())
}

// ============================================================================
// Tests
// ============================================================================
