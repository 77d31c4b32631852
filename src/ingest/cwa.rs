//! CWA (Central Weather Administration) open-data client.
//!
//! Retrieves the 36-hour county forecast, the latest significant earthquake
//! report, and daily sunrise/sunset times. Unlike MOENV, every CWA dataset
//! nests its payload differently, so decoding navigates `serde_json::Value`
//! trees instead of deriving one struct per response.
//!
//! API documentation: https://opendata.cwa.gov.tw/dist/opendata-swagger.html

use chrono::NaiveDate;
use serde_json::Value;

use crate::model::{
    CountyForecast, IngestError, QuakeReport, RiseSetReading, DATASET_FORECAST, DATASET_QUAKE,
    DATASET_RISE_SET,
};

const CWA_BASE_URL: &str = "https://opendata.cwa.gov.tw/api/v1/rest/datastore";

// ============================================================================
// Fetch Functions
// ============================================================================

/// Fetches the first 12-hour forecast window for one county.
pub fn fetch_forecast(
    client: &reqwest::blocking::Client,
    api_key: &str,
    county: &str,
) -> Result<CountyForecast, IngestError> {
    let body = fetch_datastore(
        client,
        DATASET_FORECAST,
        &[("Authorization", api_key), ("locationName", county)],
    )?;
    parse_forecast(&body, county)
}

/// Fetches the latest significant earthquake report.
///
/// Returns `Ok(None)` when no report is currently published; that is the
/// normal quiet state, not a failure.
pub fn fetch_quake(
    client: &reqwest::blocking::Client,
    api_key: &str,
) -> Result<Option<QuakeReport>, IngestError> {
    let body = fetch_datastore(client, DATASET_QUAKE, &[("Authorization", api_key)])?;
    parse_quake(&body)
}

/// Fetches sunrise/sunset times for one county on one date.
pub fn fetch_rise_set(
    client: &reqwest::blocking::Client,
    api_key: &str,
    county: &str,
    date: NaiveDate,
) -> Result<RiseSetReading, IngestError> {
    let date_str = date.format("%Y-%m-%d").to_string();
    let body = fetch_datastore(
        client,
        DATASET_RISE_SET,
        &[
            ("Authorization", api_key),
            ("locationName", county),
            ("timeFrom", &date_str),
            ("timeTo", &date_str),
        ],
    )?;
    parse_rise_set(&body, county, &date_str)
}

fn fetch_datastore(
    client: &reqwest::blocking::Client,
    dataset: &str,
    params: &[(&str, &str)],
) -> Result<String, IngestError> {
    let url = format!("{}/{}", CWA_BASE_URL, dataset);
    // .query() percent-encodes the Chinese location names for us.
    let response = client
        .get(&url)
        .query(params)
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

/// Parses an `F-C0032-001` response body for the named county.
///
/// The forecast carries five weather elements (Wx, PoP, MinT, MaxT, CI);
/// any element absent from the response renders as `"-"` rather than
/// failing the whole forecast. An empty `location` array means the county
/// name was not accepted upstream.
pub fn parse_forecast(body: &str, county: &str) -> Result<CountyForecast, IngestError> {
    let json: Value =
        serde_json::from_str(body).map_err(|e| IngestError::ParseError(e.to_string()))?;

    let location = json
        .get("records")
        .and_then(|r| r.get("location"))
        .and_then(|l| l.as_array())
        .and_then(|arr| arr.first())
        .ok_or_else(|| IngestError::MissingLocation(county.to_string()))?;

    let name = location
        .get("locationName")
        .and_then(|v| v.as_str())
        .unwrap_or(county);

    let elements = location.get("weatherElement").and_then(|v| v.as_array());

    let find_element = |element_name: &str| -> Option<&Value> {
        elements?.iter().find(|el| {
            el.get("elementName").and_then(|n| n.as_str()) == Some(element_name)
        })
    };

    let element_value = |element_name: &str| -> String {
        find_element(element_name)
            .and_then(|el| el.get("time"))
            .and_then(|t| t.as_array())
            .and_then(|t| t.first())
            .and_then(|t| t.get("parameter"))
            .and_then(|p| p.get("parameterName"))
            .and_then(|v| v.as_str())
            .unwrap_or("-")
            .to_string()
    };

    // The forecast window boundaries live on each element; Wx is always
    // published first, so read them from there.
    let window = find_element("Wx")
        .and_then(|el| el.get("time"))
        .and_then(|t| t.as_array())
        .and_then(|t| t.first());
    let window_field = |field: &str| -> String {
        window
            .and_then(|w| w.get(field))
            .and_then(|v| v.as_str())
            .unwrap_or("-")
            .to_string()
    };

    Ok(CountyForecast {
        county: name.to_string(),
        start_time: window_field("startTime"),
        end_time: window_field("endTime"),
        weather: element_value("Wx"),
        rain_chance: element_value("PoP"),
        min_temp: element_value("MinT"),
        max_temp: element_value("MaxT"),
        comfort: element_value("CI"),
    })
}

/// Parses an `E-A0015-001` response body.
///
/// `MagnitudeValue` and `FocalDepth` have been served both as JSON numbers
/// and as strings across dataset revisions; both are accepted.
pub fn parse_quake(body: &str) -> Result<Option<QuakeReport>, IngestError> {
    let json: Value =
        serde_json::from_str(body).map_err(|e| IngestError::ParseError(e.to_string()))?;

    let record = json
        .get("records")
        .and_then(|r| r.get("Earthquake"))
        .and_then(|e| e.as_array())
        .and_then(|arr| arr.first());

    let Some(record) = record else {
        return Ok(None);
    };

    let info = record.get("EarthquakeInfo");

    Ok(Some(QuakeReport {
        summary: record
            .get("ReportContent")
            .and_then(|v| v.as_str())
            .unwrap_or("")
            .to_string(),
        origin_time: info
            .and_then(|i| i.get("OriginTime"))
            .and_then(|v| v.as_str())
            .unwrap_or("-")
            .to_string(),
        epicenter: info
            .and_then(|i| i.get("Epicenter"))
            .and_then(|e| e.get("Location"))
            .and_then(|v| v.as_str())
            .unwrap_or("-")
            .to_string(),
        magnitude: value_as_f64(info.and_then(|i| i.get("Magnitude")).and_then(|m| m.get("MagnitudeValue"))),
        depth_km: value_as_f64(info.and_then(|i| i.get("FocalDepth"))),
    }))
}

/// Parses an `A-B0062-001` response body for the named county and date.
pub fn parse_rise_set(
    body: &str,
    county: &str,
    date: &str,
) -> Result<RiseSetReading, IngestError> {
    let json: Value =
        serde_json::from_str(body).map_err(|e| IngestError::ParseError(e.to_string()))?;

    let location = json
        .get("records")
        .and_then(|r| r.get("locations"))
        .and_then(|l| l.get("location"))
        .and_then(|l| l.as_array())
        .and_then(|arr| arr.first())
        .ok_or_else(|| IngestError::MissingLocation(county.to_string()))?;

    let entry = location
        .get("time")
        .and_then(|t| t.as_array())
        .and_then(|t| t.first())
        .ok_or_else(|| {
            IngestError::ParseError(format!("no almanac entry for {} on {}", county, date))
        })?;

    let info = entry.get("sunRiseSetInfo").ok_or_else(|| {
        IngestError::ParseError(format!("no sunRiseSetInfo for {} on {}", county, date))
    })?;

    let field = |name: &str| -> String {
        info.get(name)
            .and_then(|v| v.as_str())
            .unwrap_or("-")
            .to_string()
    };

    let location_name = entry
        .get("locationName")
        .and_then(|v| v.as_str())
        .or_else(|| location.get("locationName").and_then(|v| v.as_str()))
        .unwrap_or(county);

    Ok(RiseSetReading {
        location: location_name.to_string(),
        date: date.to_string(),
        sunrise: field("sunrise"),
        sunset: field("sunset"),
        daylight: field("daylight"),
        twilight_begin: field("twilight_begin"),
        twilight_end: field("twilight_end"),
    })
}

/// Reads a JSON field that may be a number or a numeric string.
fn value_as_f64(value: Option<&Value>) -> Option<f64> {
    match value? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

// ============================================================================
// Tests
// ============================================================================
