//! Nowcaster - Weather nowcasts from radar tile colors
//!
//! Radar services publish their products as slippy-map raster tiles whose
//! colors follow a legend. This library turns a geographic point into those
//! tiles, reads the legend colors back out of them and composites radar
//! over a base map for previews.
//!
//! # High-Level API
//!
//! The [`radar`] module provides the facade:
//!
//! ```ignore
//! use std::sync::Arc;
//! use nowcaster::config::ConfigFile;
//! use nowcaster::coord::GeoPoint;
//! use nowcaster::provider::{ReqwestClient, TileServerFetcher};
//! use nowcaster::radar::RadarService;
//!
//! let config = ConfigFile::load()?;
//! let fetcher = TileServerFetcher::from_config(
//!     ReqwestClient::with_timeout(config.http.timeout)?,
//!     &config.radar,
//! );
//! let service = RadarService::new(Arc::new(config.radar), fetcher);
//!
//! let nowcast = service.match_weather(GeoPoint::new(45.07, 7.69)?, &["rain"], 5)?;
//! ```

pub mod composite;
pub mod config;
pub mod coord;
pub mod legend;
pub mod logging;
pub mod provider;
pub mod radar;
pub mod raster;

/// Version of the nowcaster library and CLI.
///
/// The version is defined in `Cargo.toml` and injected at compile time.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
