//! CLI command implementations.
//!
//! # Command Modules
//!
//! - [`config`] - Configuration inspection (path, check)
//! - [`layers`] - List configured radar layers
//! - [`preview`] - Render a radar preview over the base map
//! - [`weather`] - Area, point, nowcast and weather-match queries

pub mod config;
pub mod layers;
pub mod preview;
pub mod weather;
