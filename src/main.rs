//! envmon CLI: Taiwan environmental dashboards in the terminal.
//!
//! MOENV datasets (air quality, acid rain, UV) need `MOENV_API_KEY`; CWA
//! datasets (forecast, earthquake, sunrise/sunset) need `CWA_API_KEY`. Keys
//! come from `envmon.toml`, the environment, or a `.env` file.

use std::error::Error;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process;

use chrono::Utc;
use clap::{Parser, Subcommand};
use dotenv::dotenv;

use envmon_service::config::{self, Config};
use envmon_service::counties::{self, DEFAULT_COUNTY};
use envmon_service::ingest::{self, cwa, moenv};
use envmon_service::logging::{self, DataSource};
use envmon_service::model::{self, IngestError};
use envmon_service::poll::{self, PollOutcome, Poller};
use envmon_service::render::{self, AirMetric};
use envmon_service::verify;

#[derive(Parser)]
#[command(name = "envmon")]
#[command(about = "Taiwan environmental dashboards: MOENV air, rain and UV plus CWA weather, in the terminal.")]
struct Cli {
    /// Path to the TOML config file (default: ./envmon.toml).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Air quality index for every monitoring station.
    Aqi {
        /// Show one county only (e.g. 臺北市; the 台 spelling is accepted).
        #[arg(long, visible_alias = "city")]
        county: Option<String>,

        /// Keep the dashboard open and refresh it on the poll period.
        #[arg(long)]
        watch: bool,
    },
    /// Fine particulate matter (PM2.5) for every monitoring station.
    Pm25 {
        /// Show one county only (e.g. 臺北市; the 台 spelling is accepted).
        #[arg(long, visible_alias = "city")]
        county: Option<String>,

        /// Keep the dashboard open and refresh it on the poll period.
        #[arg(long)]
        watch: bool,
    },
    /// Acid rain composition analysis (pH and rainfall per station).
    AcidRain {
        /// Show one county only (e.g. 臺北市; the 台 spelling is accepted).
        #[arg(long, visible_alias = "city")]
        county: Option<String>,

        /// Keep the dashboard open and refresh it on the poll period.
        #[arg(long)]
        watch: bool,
    },
    /// Ultraviolet index for every monitoring station.
    Uvi {
        /// Show one county only (e.g. 臺北市; the 台 spelling is accepted).
        #[arg(long, visible_alias = "city")]
        county: Option<String>,

        /// Keep the dashboard open and refresh it on the poll period.
        #[arg(long)]
        watch: bool,
    },
    /// 36-hour weather forecast for one county.
    Forecast {
        /// County to forecast (default: 臺北市).
        #[arg(long, visible_alias = "city")]
        county: Option<String>,

        /// Keep the card open and refresh it on the poll period.
        #[arg(long)]
        watch: bool,
    },
    /// Most recent significant earthquake bulletin.
    Quake {
        /// Keep the card open and refresh it on the poll period.
        #[arg(long)]
        watch: bool,
    },
    /// Sunrise and sunset times for one county today.
    Riseset {
        /// County to look up (default: 臺北市).
        #[arg(long, visible_alias = "city")]
        county: Option<String>,

        /// Keep the card open and refresh it on the poll period.
        #[arg(long)]
        watch: bool,
    },
    /// Probe every dataset once and print a reachability report.
    Verify {
        /// Also write the report as JSON to this path.
        #[arg(long)]
        json: Option<PathBuf>,
    },
    /// List the counties accepted by --county.
    Counties,
}

fn main() {
    dotenv().ok();
    let cli = Cli::parse();

    let loaded = match &cli.config {
        Some(path) => Config::load(path),
        None => Config::load_or_default(Path::new(config::DEFAULT_CONFIG_PATH)),
    };
    let mut config = match loaded {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            process::exit(1);
        }
    };
    config.apply_env_overrides();

    logging::init_logger(
        config.log.min_level(),
        config.log.file.as_deref(),
        config.log.timestamps,
    );
    logging::debug(
        DataSource::System,
        None,
        &format!("envmon {} starting", env!("CARGO_PKG_VERSION")),
    );

    if let Err(e) = run(cli.command, &config) {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

fn run(command: Command, config: &Config) -> Result<(), Box<dyn Error>> {
    match command {
        Command::Aqi { county, watch } => {
            run_air(config, AirMetric::Aqi, county.as_deref(), watch)
        }
        Command::Pm25 { county, watch } => {
            run_air(config, AirMetric::Pm25, county.as_deref(), watch)
        }
        Command::AcidRain { county, watch } => run_acid_rain(config, county.as_deref(), watch),
        Command::Uvi { county, watch } => run_uv(config, county.as_deref(), watch),
        Command::Forecast { county, watch } => run_forecast(config, county.as_deref(), watch),
        Command::Quake { watch } => run_quake(config, watch),
        Command::Riseset { county, watch } => run_rise_set(config, county.as_deref(), watch),
        Command::Verify { json } => run_verify(config, json.as_deref()),
        Command::Counties => {
            print!("{}", render::county_listing());
            Ok(())
        }
    }
}

fn run_air(
    config: &Config,
    metric: AirMetric,
    county: Option<&str>,
    watch: bool,
) -> Result<(), Box<dyn Error>> {
    let api_key = config.require_moenv_key()?;
    let client = ingest::build_client()?;
    let county = county.map(str::to_owned);
    run_dashboard(
        watch,
        config.poll.air_quality_secs,
        DataSource::Moenv,
        model::DATASET_AIR_QUALITY,
        "空氣品質",
        move || moenv::fetch_air_quality(&client, api_key),
        move |readings| render::air_quality_dashboard(readings, metric, county.as_deref()),
    )
}

fn run_acid_rain(config: &Config, county: Option<&str>, watch: bool) -> Result<(), Box<dyn Error>> {
    let api_key = config.require_moenv_key()?;
    let client = ingest::build_client()?;
    let county = county.map(str::to_owned);
    run_dashboard(
        watch,
        config.poll.acid_rain_secs,
        DataSource::Moenv,
        model::DATASET_ACID_RAIN,
        "酸雨",
        move || moenv::fetch_acid_rain(&client, api_key),
        move |readings| render::acid_rain_dashboard(readings, county.as_deref()),
    )
}

fn run_uv(config: &Config, county: Option<&str>, watch: bool) -> Result<(), Box<dyn Error>> {
    let api_key = config.require_moenv_key()?;
    let client = ingest::build_client()?;
    let county = county.map(str::to_owned);
    run_dashboard(
        watch,
        config.poll.uv_secs,
        DataSource::Moenv,
        model::DATASET_UV,
        "紫外線",
        move || moenv::fetch_uv(&client, api_key),
        move |readings| render::uv_dashboard(readings, county.as_deref()),
    )
}

fn run_forecast(config: &Config, county: Option<&str>, watch: bool) -> Result<(), Box<dyn Error>> {
    let api_key = config.require_cwa_key()?;
    let county = resolve_county(county)?;
    let client = ingest::build_client()?;
    run_dashboard(
        watch,
        config.poll.forecast_secs,
        DataSource::Cwa,
        model::DATASET_FORECAST,
        "天氣預報",
        move || cwa::fetch_forecast(&client, api_key, county),
        render::forecast_card,
    )
}

fn run_quake(config: &Config, watch: bool) -> Result<(), Box<dyn Error>> {
    let api_key = config.require_cwa_key()?;
    let client = ingest::build_client()?;
    run_dashboard(
        watch,
        config.poll.quake_secs,
        DataSource::Cwa,
        model::DATASET_QUAKE,
        "地震報告",
        move || cwa::fetch_quake(&client, api_key),
        |report| render::quake_card(report.as_ref()),
    )
}

fn run_rise_set(config: &Config, county: Option<&str>, watch: bool) -> Result<(), Box<dyn Error>> {
    let api_key = config.require_cwa_key()?;
    let county = resolve_county(county)?;
    let client = ingest::build_client()?;
    run_dashboard(
        watch,
        config.poll.rise_set_secs,
        DataSource::Cwa,
        model::DATASET_RISE_SET,
        "日出日落",
        // The date is taken per fetch so a long-lived watch rolls over at
        // midnight instead of pinning the start date.
        move || cwa::fetch_rise_set(&client, api_key, county, Utc::now().date_naive()),
        render::rise_set_card,
    )
}

fn run_verify(config: &Config, json: Option<&Path>) -> Result<(), Box<dyn Error>> {
    let report = verify::run_full_verification(config)?;
    verify::print_summary(&report);
    if let Some(path) = json {
        verify::write_json_report(&report, path)?;
        println!("Report written to {}", path.display());
    }
    let failed = report.summary.moenv_failed + report.summary.cwa_failed;
    if failed > 0 {
        return Err(format!("{} dataset(s) failed verification", failed).into());
    }
    Ok(())
}

/// Runs one dashboard either once or in watch mode.
///
/// One-shot mode prints the rendered output or a failure banner and exits
/// non-zero on failure. Watch mode never returns: each refresh prints the
/// latest snapshot, falling back to the cached one with an age banner when a
/// refresh fails.
fn run_dashboard<T, FetchF, RenderF>(
    watch: bool,
    period_secs: u64,
    source: DataSource,
    dataset: &'static str,
    what: &'static str,
    mut fetch: FetchF,
    render_one: RenderF,
) -> Result<(), Box<dyn Error>>
where
    FetchF: FnMut() -> Result<T, IngestError>,
    RenderF: Fn(&T) -> String,
{
    if !watch {
        match fetch() {
            Ok(value) => {
                print!("{}", render_one(&value));
                return Ok(());
            }
            Err(e) => {
                log_refresh_failure(source, dataset, &e);
                print!("{}", render::fetch_failure_banner(what, &e));
                process::exit(1);
            }
        }
    }

    poll::watch(Poller::new(period_secs), fetch, move |outcome| {
        match outcome {
            PollOutcome::Fresh(value) => print!("{}", render_one(value)),
            PollOutcome::Cached {
                snapshot,
                age_secs,
                stale,
                error,
            } => {
                if let Some(e) = error {
                    log_refresh_failure(source, dataset, e);
                    println!("{}", render::cached_banner(*age_secs, *stale));
                }
                print!("{}", render_one(snapshot));
            }
            PollOutcome::Unavailable {
                error: Some(e),
                consecutive_failures,
            } => {
                log_refresh_failure(source, dataset, e);
                if *consecutive_failures > 1 {
                    logging::warn(
                        source,
                        Some(dataset),
                        &format!("{} refreshes failed in a row", consecutive_failures),
                    );
                }
                print!("{}", render::fetch_failure_banner(what, e));
            }
            PollOutcome::Unavailable { error: None, .. } => {}
        }
        println!();
        let _ = io::stdout().flush();
    })
}

fn log_refresh_failure(source: DataSource, dataset: &str, err: &IngestError) {
    match source {
        DataSource::Moenv => logging::log_moenv_failure(dataset, "refresh", err),
        DataSource::Cwa => logging::log_cwa_failure(dataset, "refresh", err),
        DataSource::System => logging::error(DataSource::System, Some(dataset), &err.to_string()),
    }
}

/// Maps an optional `--county` argument onto the canonical registry name.
///
/// CWA datasets are queried by county, so an unknown name would only surface
/// as an empty response; rejecting it up front gives a usable error instead.
fn resolve_county(county: Option<&str>) -> Result<&'static str, Box<dyn Error>> {
    let name = county.unwrap_or(DEFAULT_COUNTY);
    counties::find_county(name)
        .ok_or_else(|| format!("unknown county '{}'; run `envmon counties` for the list", name).into())
}
