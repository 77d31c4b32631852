//! Core data types for the Taiwan environmental monitoring service.
//!
//! This module defines the shared domain model imported by all other modules.
//! It contains no logic, no I/O, and no external dependencies — only types.

// ---------------------------------------------------------------------------
// Dataset identifiers
// ---------------------------------------------------------------------------

/// MOENV dataset id for hourly air quality (AQI and PM2.5 per station).
pub const DATASET_AIR_QUALITY: &str = "aqx_p_432";

/// MOENV dataset id for the daily acid rain analysis (pH per station).
pub const DATASET_ACID_RAIN: &str = "acidr_p_04";

/// MOENV dataset id for the hourly ultraviolet index.
pub const DATASET_UV: &str = "uv_s_01";

/// CWA dataset id for the 36-hour county weather forecast.
pub const DATASET_FORECAST: &str = "F-C0032-001";

/// CWA dataset id for the latest significant earthquake report.
pub const DATASET_QUAKE: &str = "E-A0015-001";

/// CWA dataset id for daily sunrise/sunset times.
pub const DATASET_RISE_SET: &str = "A-B0062-001";

// ---------------------------------------------------------------------------
// Reading types
// ---------------------------------------------------------------------------

/// One air quality monitoring station's latest hourly report.
///
/// Corresponds to one entry in the `records[]` array of an `aqx_p_432`
/// response. The upstream API serves every numeric field as a string and
/// leaves it empty when the instrument did not report, so both measurements
/// are optional.
#[derive(Debug, Clone, PartialEq)]
pub struct AirQualityReading {
    pub site_name: String,
    pub county: String,
    pub aqi: Option<f64>,
    pub pm25: Option<f64>,       // µg/m³, field "pm2.5_avg"
    pub publish_time: String,    // "2024-05-01 14:00"
}

/// One acid rain monitoring station's most recent daily analysis.
#[derive(Debug, Clone, PartialEq)]
pub struct AcidRainReading {
    pub site_name: String,
    pub county: String,
    pub ph: Option<f64>,
    pub rainfall_mm: Option<f64>,
    pub monitor_date: String,
}

/// One station's latest hourly ultraviolet index reading.
#[derive(Debug, Clone, PartialEq)]
pub struct UvReading {
    pub site_name: String,
    pub county: String,
    pub uvi: Option<f64>,
    pub publish_time: String,
}

/// The first 12-hour window of a county's 36-hour forecast.
///
/// All five element values are kept verbatim as the API's display strings;
/// an element absent from the response is represented as `"-"` rather than
/// failing the whole forecast.
#[derive(Debug, Clone, PartialEq)]
pub struct CountyForecast {
    pub county: String,
    pub start_time: String,
    pub end_time: String,
    pub weather: String,       // element "Wx",  e.g. "多雲時晴"
    pub rain_chance: String,   // element "PoP", percent
    pub min_temp: String,      // element "MinT", °C
    pub max_temp: String,      // element "MaxT", °C
    pub comfort: String,       // element "CI",  e.g. "舒適"
}

/// The latest significant earthquake report, if one is currently published.
///
/// An empty `Earthquake` array upstream is the normal quiet state, not an
/// error; fetchers surface it as `Ok(None)`.
#[derive(Debug, Clone, PartialEq)]
pub struct QuakeReport {
    pub summary: String,       // full ReportContent text
    pub origin_time: String,
    pub epicenter: String,
    pub magnitude: Option<f64>,
    pub depth_km: Option<f64>,
}

/// Sunrise/sunset almanac for one county on one date.
#[derive(Debug, Clone, PartialEq)]
pub struct RiseSetReading {
    pub location: String,
    pub date: String,          // "2024-05-01"
    pub sunrise: String,       // "05:14"
    pub sunset: String,
    pub daylight: String,      // total daylight duration
    pub twilight_begin: String,
    pub twilight_end: String,
}

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Errors that can arise when fetching or decoding provider data.
#[derive(Debug, PartialEq)]
pub enum IngestError {
    /// Non-2xx HTTP response from the provider.
    HttpError(u16),
    /// The request could not be sent or the body could not be read.
    RequestError(String),
    /// The response body could not be deserialized into the expected shape.
    ParseError(String),
    /// The dataset responded but contained no records at all.
    EmptyResponse(&'static str),
    /// The requested county/location was not present in the response.
    MissingLocation(String),
}

impl std::fmt::Display for IngestError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            IngestError::HttpError(code) => write!(f, "HTTP error: {}", code),
            IngestError::RequestError(msg) => write!(f, "Request failed: {}", msg),
            IngestError::ParseError(msg) => write!(f, "Parse error: {}", msg),
            IngestError::EmptyResponse(dataset) => {
                write!(f, "No records in response from dataset {}", dataset)
            }
            IngestError::MissingLocation(loc) => write!(f, "Location not found: {}", loc),
        }
    }
}

impl std::error::Error for IngestError {}
