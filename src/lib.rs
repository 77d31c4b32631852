//! Environmental monitoring dashboards for Taiwan government open data.
//!
//! Fetches station measurements from the MOENV open-data platform (air
//! quality, acid rain, UV index) and the CWA open-data platform (36-hour
//! forecast, earthquake reports, sunrise/sunset), classifies the
//! threshold-bearing domains into status tiers, and renders terminal
//! dashboards, once or on a fixed refresh period.

pub mod config;
pub mod counties;
pub mod ingest;
pub mod logging;
pub mod model;
pub mod poll;
pub mod render;
pub mod status;
pub mod verify;
