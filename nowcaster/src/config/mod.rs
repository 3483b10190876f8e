//! Configuration loading for Nowcaster.
//!
//! The configuration lives in an INI file (default `~/.nowcaster/config.ini`)
//! and is read once at startup. The radar part is then frozen into an
//! `Arc<RadarConfig>` and shared read-only by all requests.
//!
//! # Example
//!
//! ```
//! use nowcaster::config::ConfigFile;
//!
//! let config = ConfigFile::load_from_str(r#"
//! [source.radar]
//! zoom = 7
//!
//! [source.radar.legend]
//! rain = #0000FF
//!
//! [source.radar.layer.now]
//! url = https://tiles.example.com/{z}/{x}/{y}.png
//! "#).unwrap();
//!
//! let radar = config.radar.source("radar").unwrap();
//! assert_eq!(radar.qualified_name(&radar.layers[0]), "radar - now");
//! ```

mod file;
mod parser;
mod settings;

pub use file::{config_directory, config_file_path, ConfigFileError};
pub use settings::{
    qualified_name, BaseMapConfig, ConfigFile, HttpSettings, ImageryLayer, LoggingSettings,
    RadarConfig, RadarSource, DEFAULT_HTTP_TIMEOUT_SECS, DEFAULT_MARKER_RADIUS, DEFAULT_METHOD,
    DEFAULT_SEARCH_RADIUS,
};
