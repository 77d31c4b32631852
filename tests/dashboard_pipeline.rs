/// End-to-end dashboard pipeline tests (no network required)
///
/// These tests verify:
/// 1. Raw provider JSON parses into readings and renders as a dashboard
/// 2. Classification tiers show up in the rendered output
/// 3. County filtering works across the whole pipeline
/// 4. A failed refresh falls back to the cached snapshot with a banner
///
/// Fixture bodies are trimmed copies of real provider responses.
///
/// Run with: cargo test --test dashboard_pipeline

use envmon_service::ingest::{cwa, moenv};
use envmon_service::model::IngestError;
use envmon_service::poll::{PollOutcome, Poller};
use envmon_service::render::{self, AirMetric};

use chrono::{DateTime, TimeZone, Utc};

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

const AIR_QUALITY_BODY: &str = r#"{
    "fields": [{"id": "sitename", "type": "text"}],
    "records": [
        {
            "sitename": "古亭",
            "county": "臺北市",
            "aqi": "42",
            "pm2.5_avg": "12",
            "publishtime": "2024/05/01 14:00:00"
        },
        {
            "sitename": "左營",
            "county": "高雄市",
            "aqi": "152",
            "pm2.5_avg": "40.5",
            "publishtime": "2024/05/01 14:00:00"
        },
        {
            "sitename": "二林",
            "county": "彰化縣",
            "aqi": "",
            "pm2.5_avg": "",
            "publishtime": "2024/05/01 14:00:00"
        }
    ]
}"#;

const ACID_RAIN_BODY: &str = r#"{
    "records": [
        {
            "sitename": "鞍部",
            "county": "臺北市",
            "mon_date": "2024-04-30",
            "ph": "4.5",
            "RainFall": "12.5"
        },
        {
            "SiteName": "中壢",
            "County": "桃園市",
            "mon_date": "2024-04-30",
            "pH": "6.2",
            "RainFall": "3.0"
        }
    ]
}"#;

const UV_BODY: &str = r#"{
    "records": [
        {
            "sitename": "成功",
            "county": "臺東縣",
            "uvi": "8.2",
            "publishtime": "2024-05-01 13:00"
        },
        {
            "sitename": "淡水",
            "county": "新北市",
            "uvi": "2",
            "publishtime": "2024-05-01 13:00"
        }
    ]
}"#;

const QUAKE_BODY: &str = r#"{
    "records": {
        "Earthquake": [
            {
                "ReportContent": "05/01-12:34 花蓮縣近海發生規模5.2有感地震",
                "EarthquakeInfo": {
                    "OriginTime": "2024-05-01 12:34:56",
                    "FocalDepth": 23.7,
                    "Epicenter": {"Location": "花蓮縣近海"},
                    "Magnitude": {"MagnitudeValue": 5.2}
                }
            }
        ]
    }
}"#;

fn fixed_now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 5, 1, 14, 30, 0).unwrap()
}

// ---------------------------------------------------------------------------
// MOENV pipelines
// ---------------------------------------------------------------------------

#[test]
fn test_air_quality_body_renders_as_aqi_dashboard() {
    let readings = moenv::parse_air_quality(AIR_QUALITY_BODY).expect("fixture should parse");
    assert_eq!(readings.len(), 3);

    let text = render::air_quality_dashboard(&readings, AirMetric::Aqi, None);

    assert!(text.contains("台灣空氣品質指標 (AQI)"));
    assert!(text.contains("資料發布時間：2024/05/01 14:00:00"));
    assert!(text.contains("🟢 古亭 (臺北市)  AQI 42  良好"));
    assert!(text.contains("🟠 左營 (高雄市)  AQI 152  對敏感族群不健康"));
    // The offline station renders as unavailable instead of vanishing.
    assert!(text.contains("⚪ 二林 (彰化縣)  AQI -  資料缺失"));
    assert!(text.contains("最佳測站: 古亭 (臺北市)"));
    assert!(text.contains("最差測站: 左營 (高雄市)"));

    println!("✓ AQI pipeline rendered {} stations", readings.len());
}

#[test]
fn test_same_records_render_as_pm25_dashboard_with_its_own_tiers() {
    let readings = moenv::parse_air_quality(AIR_QUALITY_BODY).expect("fixture should parse");
    let text = render::air_quality_dashboard(&readings, AirMetric::Pm25, None);

    assert!(text.contains("台灣 PM2.5 細懸浮微粒"));
    // 40.5 µg/m³ classifies as unhealthy even though its AQI tier was orange.
    assert!(text.contains("🔴 左營 (高雄市)  PM2.5 40.5 µg/m³  不健康"));
    assert!(text.contains("🟢 古亭 (臺北市)  PM2.5 12 µg/m³  良好"));
}

#[test]
fn test_county_filter_accepts_colloquial_spelling_end_to_end() {
    let readings = moenv::parse_air_quality(AIR_QUALITY_BODY).expect("fixture should parse");

    // 台北市 is typed, 臺北市 is published; the filter bridges the two.
    let text = render::air_quality_dashboard(&readings, AirMetric::Aqi, Some("台北市"));
    assert!(text.contains("古亭"));
    assert!(!text.contains("左營"));
}

#[test]
fn test_unmatched_county_reports_what_is_available() {
    let readings = moenv::parse_air_quality(AIR_QUALITY_BODY).expect("fixture should parse");
    let text = render::air_quality_dashboard(&readings, AirMetric::Aqi, Some("東京都"));

    assert!(text.contains("沒有符合「東京都」的測站資料。"));
    assert!(text.contains("可用縣市: 臺北市、高雄市、彰化縣"));
}

#[test]
fn test_acid_rain_body_with_mixed_field_casing_renders() {
    let readings = moenv::parse_acid_rain(ACID_RAIN_BODY).expect("fixture should parse");
    assert_eq!(readings.len(), 2);

    let text = render::acid_rain_dashboard(&readings, None);

    assert!(text.contains("台灣酸雨成份分析"));
    assert!(text.contains("監測日期：2024-04-30"));
    assert!(text.contains("🔴 鞍部 (臺北市)  pH 值: 4.5 - 強酸性  降雨量: 12.5 mm"));
    // The capitalized-field revision row lands in the same dashboard.
    assert!(text.contains("🟢 中壢 (桃園市)  pH 值: 6.2 - 正常  降雨量: 3 mm"));
    assert!(text.contains("圖例: 🔴 強酸性  🟡 弱酸性  🟢 正常"));
}

#[test]
fn test_uv_body_renders_with_protection_guidance() {
    let readings = moenv::parse_uv(UV_BODY).expect("fixture should parse");
    let text = render::uv_dashboard(&readings, None);

    assert!(text.contains("台灣紫外線指數 (UVI)"));
    assert!(text.contains("🔴 成功 (臺東縣)  UVI 8.2  過量級"));
    assert!(text.contains("🟢 淡水 (新北市)  UVI 2  低量級"));
    assert!(text.contains("── 防護建議 ──"));
}

// ---------------------------------------------------------------------------
// CWA pipelines
// ---------------------------------------------------------------------------

#[test]
fn test_quake_body_renders_as_bulletin_card() {
    let report = cwa::parse_quake(QUAKE_BODY)
        .expect("fixture should parse")
        .expect("fixture carries a bulletin");

    let text = render::quake_card(Some(&report));

    assert!(text.contains("近期地震報告"));
    assert!(text.contains("規模 5.2 地震"));
    assert!(text.contains("震央位置: 花蓮縣近海"));
    assert!(text.contains("地震深度: 23.7 公里"));
    assert!(text.contains("資料來源：中央氣象署開放資料平臺"));
}

#[test]
fn test_empty_quake_body_renders_the_quiet_card() {
    let report = cwa::parse_quake(r#"{"records": {"Earthquake": []}}"#)
        .expect("empty bulletin list should parse");
    assert!(report.is_none());

    let text = render::quake_card(report.as_ref());
    assert!(text.contains("目前沒有最新的顯著有感地震報告。"));
}

// ---------------------------------------------------------------------------
// Cached fallback
// ---------------------------------------------------------------------------

#[test]
fn test_failed_refresh_falls_back_to_cached_dashboard_with_banner() {
    let mut poller = Poller::new(60);
    let t0 = fixed_now();

    // First slot succeeds and seeds the snapshot from the fixture.
    let outcome = poller.tick_at(t0, || moenv::parse_air_quality(AIR_QUALITY_BODY));
    assert!(matches!(outcome, PollOutcome::Fresh(_)));

    // Next slot fails; the dashboard must come from the cached snapshot.
    let outcome = poller.tick_at(t0 + chrono::Duration::seconds(60), || {
        Err(IngestError::HttpError(503))
    });

    match outcome {
        PollOutcome::Cached {
            snapshot,
            age_secs,
            stale,
            error,
        } => {
            let banner = render::cached_banner(age_secs, stale);
            let text = render::air_quality_dashboard(snapshot, AirMetric::Aqi, None);

            assert!(banner.contains("更新失敗，以下為 1 分鐘 前的快取資料。"));
            assert!(!banner.contains("資料已過期"), "one missed cycle is not stale yet");
            assert!(text.contains("古亭"), "cached data must still render fully");
            assert_eq!(error, Some(IngestError::HttpError(503)));

            println!("✓ Cached fallback rendered with banner: {}", banner.trim());
        }
        other => panic!("expected Cached, got {:?}", other),
    }
}
