//! CLI runner for common setup and operations.
//!
//! Encapsulates configuration loading, logging initialization, service
//! creation and output handling so command handlers stay small.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::Serialize;
use tracing::info;

use nowcaster::config::{config_file_path, ConfigFile};
use nowcaster::coord::GeoPoint;
use nowcaster::logging::{default_log_file, init_logging, LoggingGuard};
use nowcaster::provider::{ReqwestClient, TileServerFetcher};
use nowcaster::radar::RadarService;
use nowcaster::raster::{encode_png, RasterImage};

use crate::error::CliError;

/// Radar service as wired by the CLI.
pub type CliService = RadarService<TileServerFetcher<ReqwestClient>>;

/// Runner that manages CLI lifecycle and common operations.
pub struct CliRunner {
    /// Logging guard - keeps logging active while runner exists
    #[allow(dead_code)]
    logging_guard: LoggingGuard,
    /// Loaded configuration file
    config: ConfigFile,
    /// Path the configuration was read from
    config_path: PathBuf,
}

impl CliRunner {
    /// Create a runner, loading config and initializing logging.
    ///
    /// # Arguments
    ///
    /// * `config_path` - Configuration file; defaults to `~/.nowcaster/config.ini`
    /// * `debug_mode` - Enables debug-level logging regardless of RUST_LOG
    pub fn new(config_path: Option<PathBuf>, debug_mode: bool) -> Result<Self, CliError> {
        let config_path = config_path.unwrap_or_else(config_file_path);
        let config = ConfigFile::load_from(&config_path).map_err(|error| CliError::Config {
            path: config_path.clone(),
            error,
        })?;

        let log_path = &config.logging.file;
        let log_dir = log_path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));
        let log_file = log_path
            .file_name()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_else(|| default_log_file().to_string());

        // Results go to stdout as JSON; only mirror logs there on an
        // interactive terminal in debug mode
        let stdout_enabled = debug_mode && atty::is(atty::Stream::Stdout);

        let logging_guard = init_logging(&log_dir, &log_file, stdout_enabled, debug_mode)
            .map_err(|e| CliError::LoggingInit(e.to_string()))?;

        Ok(Self {
            logging_guard,
            config,
            config_path,
        })
    }

    /// Get the loaded configuration.
    pub fn config(&self) -> &ConfigFile {
        &self.config
    }

    /// Path the configuration was read from.
    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    /// Log startup information for a command.
    pub fn log_startup(&self, command: &str) {
        info!("Nowcaster v{}", nowcaster::VERSION);
        info!(
            config = %self.config_path.display(),
            sources = self.config.radar.sources.len(),
            "Nowcaster CLI: {} command",
            command
        );
    }

    /// Create the radar service over HTTP tile servers.
    pub fn create_service(&self) -> Result<CliService, CliError> {
        let client =
            ReqwestClient::with_timeout(self.config.http.timeout).map_err(CliError::HttpClient)?;
        let fetcher = TileServerFetcher::from_config(client, &self.config.radar);
        Ok(RadarService::new(Arc::new(self.config.radar.clone()), fetcher))
    }

    /// Search radius from the CLI, falling back to the configured one.
    pub fn search_radius(&self, cli_radius: Option<u32>) -> u32 {
        cli_radius.unwrap_or(self.config.radar.search_radius)
    }

    /// Print a result as pretty JSON on stdout.
    pub fn print_json<T: Serialize>(&self, value: &T) -> Result<(), CliError> {
        println!("{}", serde_json::to_string_pretty(value)?);
        Ok(())
    }

    /// Encode a preview as PNG and write it to `path`.
    pub fn save_png(&self, path: &Path, image: &RasterImage) -> Result<(), CliError> {
        let data = encode_png(image).map_err(|e| CliError::Encode(e.to_string()))?;

        std::fs::write(path, &data).map_err(|e| CliError::FileWrite {
            path: path.display().to_string(),
            error: e,
        })?;

        info!(
            path = %path.display(),
            width = image.width(),
            height = image.height(),
            bytes = data.len(),
            "Preview saved"
        );
        println!(
            "Saved {}x{} preview to {}",
            image.width(),
            image.height(),
            path.display()
        );
        Ok(())
    }
}

/// Parse CLI latitude/longitude into a point.
pub fn geo_point(lat: f64, lon: f64) -> Result<GeoPoint, CliError> {
    Ok(GeoPoint::new(lat, lon)?)
}
