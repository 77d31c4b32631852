//! Terminal rendering for the dashboards.
//!
//! Every renderer is a pure function from readings to a finished text
//! block; `main` decides where the text goes. Output is plain UTF-8 with
//! colored-circle glyphs carrying the tier colors, no ANSI escapes, so
//! dashboards stay readable through pipes and in log files.
//!
//! Display strings (titles, field labels, guidance text) match the wording
//! published on the Taiwanese dashboards they mirror.

use crate::counties;
use crate::model::{
    AcidRainReading, AirQualityReading, CountyForecast, IngestError, QuakeReport, RiseSetReading,
    UvReading,
};
use crate::status::{self, PH_TIERS, StatusTier, UVI_TIERS};

const RULE_WIDTH: usize = 60;
const CWA_ATTRIBUTION: &str = "資料來源：中央氣象署開放資料平臺";

// ---------------------------------------------------------------------------
// Air quality
// ---------------------------------------------------------------------------

/// Which `aqx_p_432` metric an air quality dashboard shows.
///
/// AQI and PM2.5 come from the same records and render through the same
/// code path; only the value column, classifier, and legend differ.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AirMetric {
    Aqi,
    Pm25,
}

impl AirMetric {
    pub fn title(&self) -> &'static str {
        match self {
            AirMetric::Aqi => "台灣空氣品質指標 (AQI)",
            AirMetric::Pm25 => "台灣 PM2.5 細懸浮微粒",
        }
    }

    fn value_label(&self) -> &'static str {
        match self {
            AirMetric::Aqi => "AQI",
            AirMetric::Pm25 => "PM2.5",
        }
    }

    fn unit(&self) -> &'static str {
        match self {
            AirMetric::Aqi => "",
            AirMetric::Pm25 => " µg/m³",
        }
    }

    fn value(&self, reading: &AirQualityReading) -> Option<f64> {
        match self {
            AirMetric::Aqi => reading.aqi,
            AirMetric::Pm25 => reading.pm25,
        }
    }

    fn classifier(&self) -> fn(f64) -> &'static StatusTier {
        match self {
            AirMetric::Aqi => status::aqi_status,
            AirMetric::Pm25 => status::pm25_status,
        }
    }

    fn tiers(&self) -> &'static [&'static StatusTier] {
        match self {
            AirMetric::Aqi => status::AQI_TIERS,
            AirMetric::Pm25 => status::PM25_TIERS,
        }
    }
}

/// Renders the air quality board for one metric, optionally filtered down
/// to a single county.
///
/// Stations whose metric did not parse render with the unavailable tier
/// and a `-` value; they are left out of the best/worst summary.
pub fn air_quality_dashboard(
    readings: &[AirQualityReading],
    metric: AirMetric,
    county: Option<&str>,
) -> String {
    let wanted = canonical_filter(county);
    let rows: Vec<&AirQualityReading> = readings
        .iter()
        .filter(|r| matches_county(&wanted, &r.county))
        .collect();
    if rows.is_empty() {
        return no_stations_block(county, readings.iter().map(|r| r.county.as_str()));
    }

    let mut out = String::new();
    push_header(&mut out, metric.title(), &format!("資料發布時間：{}", rows[0].publish_time));

    for reading in &rows {
        let value = metric.value(reading);
        let tier = status::tier_for(value, metric.classifier());
        out.push_str(&station_line(
            &reading.site_name,
            &reading.county,
            metric.value_label(),
            value,
            metric.unit(),
            tier,
        ));
    }

    if let Some((best, worst)) = best_and_worst(&rows, metric) {
        out.push('\n');
        out.push_str(&summary_line("最佳測站", best, metric));
        out.push_str(&summary_line("最差測站", worst, metric));
    }

    out.push('\n');
    out.push_str(&legend(metric.tiers(), "狀態說明"));
    out
}

/// Best and worst stations by metric value; lower is better for both air
/// metrics. Unclassifiable stations are excluded.
fn best_and_worst<'a>(
    rows: &[&'a AirQualityReading],
    metric: AirMetric,
) -> Option<(&'a AirQualityReading, &'a AirQualityReading)> {
    let mut classified: Vec<(&AirQualityReading, f64)> = rows
        .iter()
        .filter_map(|r| metric.value(r).filter(|v| !v.is_nan()).map(|v| (*r, v)))
        .collect();
    if classified.is_empty() {
        return None;
    }
    classified.sort_by(|a, b| a.1.total_cmp(&b.1));
    Some((classified[0].0, classified[classified.len() - 1].0))
}

fn summary_line(heading: &str, reading: &AirQualityReading, metric: AirMetric) -> String {
    let value = metric.value(reading);
    let tier = status::tier_for(value, metric.classifier());
    format!(
        "{}: {} ({})  {} {}{}  {}\n",
        heading,
        reading.site_name,
        reading.county,
        metric.value_label(),
        value.map(fmt_value).unwrap_or_else(|| "-".to_string()),
        metric.unit(),
        tier.label_zh
    )
}

// ---------------------------------------------------------------------------
// Acid rain
// ---------------------------------------------------------------------------

pub fn acid_rain_dashboard(readings: &[AcidRainReading], county: Option<&str>) -> String {
    let wanted = canonical_filter(county);
    let rows: Vec<&AcidRainReading> = readings
        .iter()
        .filter(|r| matches_county(&wanted, &r.county))
        .collect();
    if rows.is_empty() {
        return no_stations_block(county, readings.iter().map(|r| r.county.as_str()));
    }

    let mut out = String::new();
    push_header(&mut out, "台灣酸雨成份分析", &format!("監測日期：{}", rows[0].monitor_date));

    for reading in &rows {
        let tier = status::tier_for(reading.ph, status::ph_status);
        let ph = match reading.ph {
            Some(v) if !v.is_nan() => fmt_value(v),
            _ => "-".to_string(),
        };
        let rainfall = match reading.rainfall_mm {
            Some(v) => fmt_value(v),
            None => "-".to_string(),
        };
        out.push_str(&format!(
            "{} {} ({})  pH 值: {} - {}  降雨量: {} mm\n",
            tier.color.glyph(),
            reading.site_name,
            reading.county,
            ph,
            tier.label_zh,
            rainfall
        ));
    }

    out.push('\n');
    out.push_str(&legend(PH_TIERS, ""));
    out
}

// ---------------------------------------------------------------------------
// UV index
// ---------------------------------------------------------------------------

pub fn uv_dashboard(readings: &[UvReading], county: Option<&str>) -> String {
    let wanted = canonical_filter(county);
    let rows: Vec<&UvReading> = readings
        .iter()
        .filter(|r| matches_county(&wanted, &r.county))
        .collect();
    if rows.is_empty() {
        return no_stations_block(county, readings.iter().map(|r| r.county.as_str()));
    }

    let mut out = String::new();
    push_header(&mut out, "台灣紫外線指數 (UVI)", &format!("資料發布時間：{}", rows[0].publish_time));

    for reading in &rows {
        let tier = status::tier_for(reading.uvi, status::uvi_status);
        out.push_str(&station_line(
            &reading.site_name,
            &reading.county,
            "UVI",
            reading.uvi,
            "",
            tier,
        ));
    }

    out.push('\n');
    out.push_str(&legend(UVI_TIERS, "防護建議"));
    out
}

// ---------------------------------------------------------------------------
// CWA cards
// ---------------------------------------------------------------------------

pub fn forecast_card(forecast: &CountyForecast) -> String {
    let mut out = String::new();
    push_header(
        &mut out,
        &format!("{} 36 小時天氣預報", forecast.county),
        &format!("{} ~ {}", forecast.start_time, forecast.end_time),
    );
    out.push_str(&format!("{}\n", forecast.weather));
    out.push_str(&format!(
        "最高/最低溫度: {}° / {}° C\n",
        forecast.min_temp, forecast.max_temp
    ));
    out.push_str(&format!("降雨機率: {} %\n", forecast.rain_chance));
    out.push_str(&format!("舒適度: {}\n", forecast.comfort));
    out.push('\n');
    out.push_str(CWA_ATTRIBUTION);
    out.push('\n');
    out
}

pub fn quake_card(report: Option<&QuakeReport>) -> String {
    let Some(report) = report else {
        // No current bulletin is the normal quiet state, not a failure.
        return format!("目前沒有最新的顯著有感地震報告。\n\n{}\n", CWA_ATTRIBUTION);
    };

    let magnitude = report
        .magnitude
        .map(fmt_value)
        .unwrap_or_else(|| "-".to_string());
    let depth = report
        .depth_km
        .map(fmt_value)
        .unwrap_or_else(|| "-".to_string());

    let mut out = String::new();
    push_header(&mut out, "近期地震報告", "");
    out.push_str(&format!("規模 {} 地震\n", magnitude));
    out.push_str(&format!("震央位置: {}\n", report.epicenter));
    out.push_str(&format!("發生時間: {}\n", report.origin_time));
    out.push_str(&format!("地震深度: {} 公里\n", depth));
    if !report.summary.is_empty() {
        out.push_str(&format!("報告內容: {}\n", report.summary));
    }
    out.push('\n');
    out.push_str(CWA_ATTRIBUTION);
    out.push('\n');
    out
}

pub fn rise_set_card(reading: &RiseSetReading) -> String {
    let mut out = String::new();
    push_header(
        &mut out,
        "日出日落資訊",
        &format!("{} {}", reading.location, reading.date),
    );
    out.push_str(&format!("日出時間: {}\n", reading.sunrise));
    out.push_str(&format!("日落時間: {}\n", reading.sunset));
    out.push_str(&format!("晝長: {}\n", reading.daylight));
    out.push_str(&format!("開始黃昏: {}\n", reading.twilight_begin));
    out.push_str(&format!("結束黃昏: {}\n", reading.twilight_end));
    out.push('\n');
    out.push_str(CWA_ATTRIBUTION);
    out.push('\n');
    out
}

// ---------------------------------------------------------------------------
// Banners and listings
// ---------------------------------------------------------------------------

/// Failure banner with the dashboards' remediation hint.
pub fn fetch_failure_banner(what: &str, error: &IngestError) -> String {
    format!(
        "✗ 載入{}資料失敗: 請檢查您的網路連線或 API Key 是否正確。\n  ({})\n",
        what, error
    )
}

/// Banner shown when a refresh fails but an earlier snapshot exists.
pub fn cached_banner(age_secs: u64, stale: bool) -> String {
    let mut out = format!("⚠ 更新失敗，以下為 {} 前的快取資料。", fmt_age(age_secs));
    if stale {
        out.push_str("（資料已過期）");
    }
    out.push('\n');
    out
}

/// Registry listing for the `counties` subcommand.
pub fn county_listing() -> String {
    let mut out = String::from("可查詢的縣市：\n");
    for county in counties::COUNTY_REGISTRY {
        if *county == counties::DEFAULT_COUNTY {
            out.push_str(&format!("  {} (預設)\n", county));
        } else {
            out.push_str(&format!("  {}\n", county));
        }
    }
    out
}

// ---------------------------------------------------------------------------
// Shared helpers
// ---------------------------------------------------------------------------

fn push_header(out: &mut String, title: &str, subtitle: &str) {
    let rule = "═".repeat(RULE_WIDTH);
    out.push_str(&rule);
    out.push('\n');
    out.push_str(&format!("  {}\n", title));
    if !subtitle.is_empty() {
        out.push_str(&format!("  {}\n", subtitle));
    }
    out.push_str(&rule);
    out.push('\n');
}

fn station_line(
    site: &str,
    county: &str,
    value_label: &str,
    value: Option<f64>,
    unit: &str,
    tier: &'static StatusTier,
) -> String {
    let shown = match value {
        Some(v) if !v.is_nan() => fmt_value(v),
        _ => "-".to_string(),
    };
    format!(
        "{} {} ({})  {} {}{}  {}\n",
        tier.color.glyph(),
        site,
        county,
        value_label,
        shown,
        unit,
        tier.label_zh
    )
}

/// Tier legend. Domains that publish guidance get one line per tier with
/// the guidance text; the others get a single compact line.
fn legend(tiers: &[&'static StatusTier], advice_heading: &str) -> String {
    let mut out = String::new();
    if tiers.iter().any(|t| t.advice.is_some()) {
        out.push_str(&format!("── {} ──\n", advice_heading));
        for tier in tiers {
            match tier.advice {
                Some(advice) => out.push_str(&format!(
                    "{} {}: {}\n",
                    tier.color.glyph(),
                    tier.label_zh,
                    advice
                )),
                None => out.push_str(&format!("{} {}\n", tier.color.glyph(), tier.label_zh)),
            }
        }
    } else {
        let items: Vec<String> = tiers
            .iter()
            .map(|t| format!("{} {}", t.color.glyph(), t.label_zh))
            .collect();
        out.push_str(&format!("圖例: {}\n", items.join("  ")));
    }
    out
}

/// Canonicalizes a county filter: registry names resolve to their official
/// spelling, anything else keeps the 台→臺 normalization so it compares
/// the way station records are published.
fn canonical_filter(county: Option<&str>) -> Option<String> {
    county.map(|name| match counties::find_county(name) {
        Some(canonical) => canonical.to_string(),
        None => name.replace('台', "臺"),
    })
}

fn matches_county(wanted: &Option<String>, county: &str) -> bool {
    match wanted {
        Some(w) => county == w,
        None => true,
    }
}

/// The no-data block, listing what counties the response did contain when
/// a requested county matched nothing.
fn no_stations_block<'a>(
    requested: Option<&str>,
    available: impl Iterator<Item = &'a str>,
) -> String {
    let mut out = String::new();
    match requested {
        Some(name) => out.push_str(&format!("沒有符合「{}」的測站資料。\n", name)),
        None => out.push_str("沒有資料。\n"),
    }
    let counties = counties::counties_in(available);
    if !counties.is_empty() {
        out.push_str(&format!("可用縣市: {}\n", counties.join("、")));
    }
    out
}

fn fmt_value(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{:.0}", value)
    } else {
        format!("{:.1}", value)
    }
}

/// Formats a snapshot age for the cache banner.
fn fmt_age(age_secs: u64) -> String {
    if age_secs < 60 {
        format!("{} 秒", age_secs)
    } else if age_secs < 3600 {
        format!("{} 分鐘", age_secs / 60)
    } else {
        format!("{} 小時 {} 分鐘", age_secs / 3600, (age_secs % 3600) / 60)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
