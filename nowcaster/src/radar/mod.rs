//! Radar orchestration.
//!
//! [`RadarService`] answers the questions a client asks about a point:
//!
//! - [`sample_area`](RadarService::sample_area): how much of each legend
//!   condition surrounds the point, per layer
//! - [`sample_point`](RadarService::sample_point): which condition is
//!   exactly at the point, per layer
//! - [`nowcast`](RadarService::nowcast) and
//!   [`match_weather`](RadarService::match_weather): both at once, grouped
//!   by source, optionally reduced to "is it raining here"
//! - [`render_preview`](RadarService::render_preview): a base-map tile with
//!   the radar overlaid and the point marked
//!
//! Each request projects the point, fetches the needed tiles in parallel
//! and works on its own rasters. Nothing is cached between requests.

mod error;
mod service;
mod types;

pub use error::{ErrorKind, RadarError};
pub use service::RadarService;
pub use types::{Nowcast, NowcastMatch, NowcastSource, RawNowcast, WeatherMatchedNowcast};
