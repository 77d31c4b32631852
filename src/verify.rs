//! Data Source Verification Module
//!
//! Probes every configured dataset against the live MOENV and CWA APIs to
//! determine which ones are reachable, decodable, and returning usable
//! values. Run this after changing API keys or when a dashboard suddenly
//! goes empty: it separates "wrong key" from "provider is republishing"
//! in one pass.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::path::Path;

use crate::config::Config;
use crate::ingest;
use crate::model;

// ============================================================================
// Verification Results
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerificationReport {
    pub timestamp: String,
    pub moenv_results: Vec<DatasetVerification>,
    pub cwa_results: Vec<DatasetVerification>,
    pub summary: VerificationSummary,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VerificationSummary {
    pub moenv_total: usize,
    pub moenv_working: usize,
    pub moenv_failed: usize,
    pub cwa_total: usize,
    pub cwa_working: usize,
    pub cwa_failed: usize,
}

/// Outcome of probing one dataset.
///
/// `record_count` is how many records the response decoded to and
/// `parsed_count` how many of those carried a usable primary value; the
/// gap between them is ND/empty measurement fields, which is normal in
/// small numbers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatasetVerification {
    pub dataset: String,
    pub name: String,
    pub status: VerificationStatus,
    pub record_count: usize,
    pub parsed_count: usize,
    pub sample_site: Option<String>,
    pub note: Option<String>,
    pub error_message: Option<String>,
}

impl DatasetVerification {
    fn new(dataset: &str, name: &str) -> DatasetVerification {
        DatasetVerification {
            dataset: dataset.to_string(),
            name: name.to_string(),
            status: VerificationStatus::Failed,
            record_count: 0,
            parsed_count: 0,
            sample_site: None,
            note: None,
            error_message: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum VerificationStatus {
    Success,
    PartialSuccess,
    Failed,
}

/// Grades a probe from its counts: records that decoded *and* yielded
/// values is a pass, records without a single usable value is partial,
/// nothing at all is a failure.
fn grade(record_count: usize, parsed_count: usize) -> VerificationStatus {
    if record_count > 0 && parsed_count > 0 {
        VerificationStatus::Success
    } else if record_count > 0 {
        VerificationStatus::PartialSuccess
    } else {
        VerificationStatus::Failed
    }
}

// ============================================================================
// MOENV Verification
// ============================================================================

pub fn verify_air_quality(
    client: &reqwest::blocking::Client,
    api_key: &str,
) -> DatasetVerification {
    let mut result = DatasetVerification::new(model::DATASET_AIR_QUALITY, "air quality (AQI + PM2.5)");

    match ingest::moenv::fetch_air_quality(client, api_key) {
        Ok(readings) => {
            result.record_count = readings.len();
            result.parsed_count = readings.iter().filter(|r| r.aqi.is_some()).count();
            result.sample_site = readings
                .first()
                .map(|r| format!("{} ({})", r.site_name, r.county));
        }
        Err(e) => {
            result.error_message = Some(e.to_string());
        }
    }

    result.status = grade(result.record_count, result.parsed_count);
    result
}

pub fn verify_acid_rain(
    client: &reqwest::blocking::Client,
    api_key: &str,
) -> DatasetVerification {
    let mut result = DatasetVerification::new(model::DATASET_ACID_RAIN, "acid rain (rainwater pH)");

    match ingest::moenv::fetch_acid_rain(client, api_key) {
        Ok(readings) => {
            result.record_count = readings.len();
            result.parsed_count = readings.iter().filter(|r| r.ph.is_some()).count();
            result.sample_site = readings
                .first()
                .map(|r| format!("{} ({})", r.site_name, r.county));
        }
        Err(e) => {
            result.error_message = Some(e.to_string());
        }
    }

    result.status = grade(result.record_count, result.parsed_count);
    result
}

pub fn verify_uv(client: &reqwest::blocking::Client, api_key: &str) -> DatasetVerification {
    let mut result = DatasetVerification::new(model::DATASET_UV, "UV index");

    match ingest::moenv::fetch_uv(client, api_key) {
        Ok(readings) => {
            result.record_count = readings.len();
            result.parsed_count = readings.iter().filter(|r| r.uvi.is_some()).count();
            result.sample_site = readings
                .first()
                .map(|r| format!("{} ({})", r.site_name, r.county));
        }
        Err(e) => {
            result.error_message = Some(e.to_string());
        }
    }

    result.status = grade(result.record_count, result.parsed_count);
    result
}

// ============================================================================
// CWA Verification
// ============================================================================

pub fn verify_forecast(
    client: &reqwest::blocking::Client,
    api_key: &str,
    county: &str,
) -> DatasetVerification {
    let mut result = DatasetVerification::new(model::DATASET_FORECAST, "36-hour forecast");

    match ingest::cwa::fetch_forecast(client, api_key, county) {
        Ok(forecast) => {
            result.record_count = 1;
            result.parsed_count = if forecast.weather != "-" { 1 } else { 0 };
            result.sample_site = Some(forecast.county);
        }
        Err(e) => {
            result.error_message = Some(e.to_string());
        }
    }

    result.status = grade(result.record_count, result.parsed_count);
    result
}

pub fn verify_quake(client: &reqwest::blocking::Client, api_key: &str) -> DatasetVerification {
    let mut result = DatasetVerification::new(model::DATASET_QUAKE, "significant earthquake report");

    match ingest::cwa::fetch_quake(client, api_key) {
        Ok(Some(report)) => {
            result.record_count = 1;
            result.parsed_count = if report.magnitude.is_some() { 1 } else { 0 };
            result.sample_site = Some(report.epicenter);
            result.status = grade(result.record_count, result.parsed_count);
        }
        Ok(None) => {
            // Empty Earthquake array: the dataset is reachable and decoded,
            // there is just no current bulletin.
            result.status = VerificationStatus::Success;
            result.note = Some("no current bulletin".to_string());
        }
        Err(e) => {
            result.error_message = Some(e.to_string());
            result.status = VerificationStatus::Failed;
        }
    }

    result
}

pub fn verify_rise_set(
    client: &reqwest::blocking::Client,
    api_key: &str,
    county: &str,
    date: chrono::NaiveDate,
) -> DatasetVerification {
    let mut result = DatasetVerification::new(model::DATASET_RISE_SET, "sunrise/sunset almanac");

    match ingest::cwa::fetch_rise_set(client, api_key, county, date) {
        Ok(reading) => {
            result.record_count = 1;
            result.parsed_count = if reading.sunrise != "-" && reading.sunset != "-" {
                1
            } else {
                0
            };
            result.sample_site = Some(reading.location);
        }
        Err(e) => {
            result.error_message = Some(e.to_string());
        }
    }

    result.status = grade(result.record_count, result.parsed_count);
    result
}

// ============================================================================
// Full Verification Runner
// ============================================================================

pub fn run_full_verification(config: &Config) -> Result<VerificationReport, model::IngestError> {
    let client = ingest::build_client()?;

    let mut report = VerificationReport {
        timestamp: Utc::now().to_rfc3339(),
        moenv_results: Vec::new(),
        cwa_results: Vec::new(),
        summary: VerificationSummary::default(),
    };

    println!("🔍 Verifying MOENV datasets...");
    match config.require_moenv_key() {
        Ok(api_key) => {
            record(
                verify_air_quality(&client, api_key),
                &mut report.moenv_results,
                &mut report.summary.moenv_working,
                &mut report.summary.moenv_failed,
            );
            record(
                verify_acid_rain(&client, api_key),
                &mut report.moenv_results,
                &mut report.summary.moenv_working,
                &mut report.summary.moenv_failed,
            );
            record(
                verify_uv(&client, api_key),
                &mut report.moenv_results,
                &mut report.summary.moenv_working,
                &mut report.summary.moenv_failed,
            );
        }
        Err(e) => {
            println!("⚠ Warning: skipping MOENV datasets: {}", e);
        }
    }
    report.summary.moenv_total = report.moenv_results.len();

    println!("\n🔍 Verifying CWA datasets...");
    match config.require_cwa_key() {
        Ok(api_key) => {
            let county = crate::counties::DEFAULT_COUNTY;
            // The almanac date follows the provider's UTC calendar day, the
            // same way the dashboards query it.
            let today = Utc::now().date_naive();
            record(
                verify_forecast(&client, api_key, county),
                &mut report.cwa_results,
                &mut report.summary.cwa_working,
                &mut report.summary.cwa_failed,
            );
            record(
                verify_quake(&client, api_key),
                &mut report.cwa_results,
                &mut report.summary.cwa_working,
                &mut report.summary.cwa_failed,
            );
            record(
                verify_rise_set(&client, api_key, county, today),
                &mut report.cwa_results,
                &mut report.summary.cwa_working,
                &mut report.summary.cwa_failed,
            );
        }
        Err(e) => {
            println!("⚠ Warning: skipping CWA datasets: {}", e);
        }
    }
    report.summary.cwa_total = report.cwa_results.len();

    Ok(report)
}

/// Prints one probe's outcome, tallies it, and files it in the report.
fn record(
    result: DatasetVerification,
    results: &mut Vec<DatasetVerification>,
    working: &mut usize,
    failed: &mut usize,
) {
    match result.status {
        VerificationStatus::Success => {
            match &result.note {
                Some(note) => println!("  {} ✓ OK ({})", result.dataset, note),
                None => println!(
                    "  {} ✓ OK ({} records, {} with values)",
                    result.dataset, result.record_count, result.parsed_count
                ),
            }
            *working += 1;
        }
        VerificationStatus::PartialSuccess => {
            println!(
                "  {} ⚠ Partial ({} records, none with values)",
                result.dataset, result.record_count
            );
            *working += 1;
        }
        VerificationStatus::Failed => {
            println!(
                "  {} ✗ FAILED: {}",
                result.dataset,
                result.error_message.as_deref().unwrap_or("Unknown")
            );
            *failed += 1;
        }
    }
    results.push(result);
}

pub fn print_summary(report: &VerificationReport) {
    let rule = "═".repeat(60);
    println!("\n{}", rule);
    println!("📊 VERIFICATION SUMMARY");
    println!("{}", rule);
    println!();
    println!(
        "MOENV datasets:  {}/{} working  ({} failed)",
        report.summary.moenv_working, report.summary.moenv_total, report.summary.moenv_failed
    );
    println!(
        "CWA datasets:    {}/{} working  ({} failed)",
        report.summary.cwa_working, report.summary.cwa_total, report.summary.cwa_failed
    );
    println!();

    let total_working = report.summary.moenv_working + report.summary.cwa_working;
    let total = report.summary.moenv_total + report.summary.cwa_total;
    let success_rate = if total > 0 {
        (total_working as f64 / total as f64) * 100.0
    } else {
        0.0
    };

    println!(
        "Overall Success Rate: {:.1}% ({}/{})",
        success_rate, total_working, total
    );
    println!("{}", rule);
}

/// Writes the report as pretty-printed JSON, for diffing across runs.
pub fn write_json_report(report: &VerificationReport, path: &Path) -> Result<(), Box<dyn Error>> {
    let json = serde_json::to_string_pretty(report)?;
    std::fs::write(path, json)?;
    Ok(())
}

// ============================================================================
// Tests
// ============================================================================
