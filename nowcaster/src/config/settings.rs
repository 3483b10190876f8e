//! Settings structs for all configuration sections.
//!
//! These are pure data types with no parsing logic. The radar part is frozen
//! into an `Arc<RadarConfig>` once loaded and shared read-only by every
//! request.

use std::path::PathBuf;

use crate::coord::DEFAULT_TILE_SIZE;
use crate::legend::Legend;

/// Default half-width, in pixels, of the area search window.
///
/// A radius of 5 gives a 10×10 window, so area counts read as percentages.
pub const DEFAULT_SEARCH_RADIUS: u32 = 5;

/// Default half-width, in pixels, of the preview locator marker.
pub const DEFAULT_MARKER_RADIUS: u32 = 4;

/// Default HTTP timeout in seconds.
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 30;

/// Default request method for imagery layers.
pub const DEFAULT_METHOD: &str = "GET";

/// Complete application configuration loaded from config.ini.
#[derive(Debug, Clone, Default)]
pub struct ConfigFile {
    /// Radar engine settings: sources, base map, radii
    pub radar: RadarConfig,
    /// HTTP client settings
    pub http: HttpSettings,
    /// Logging settings
    pub logging: LoggingSettings,
}

/// HTTP client configuration.
#[derive(Debug, Clone)]
pub struct HttpSettings {
    /// Request timeout in seconds
    pub timeout: u64,
}

impl Default for HttpSettings {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_HTTP_TIMEOUT_SECS,
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone)]
pub struct LoggingSettings {
    /// Log file path
    pub file: PathBuf,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            file: crate::logging::default_log_dir().join(crate::logging::default_log_file()),
        }
    }
}

/// Immutable configuration of the radar engine.
#[derive(Debug, Clone)]
pub struct RadarConfig {
    /// Radar sources in configuration order
    pub sources: Vec<RadarSource>,
    /// Background tiles for previews; previews are unavailable without it
    pub base_map: Option<BaseMapConfig>,
    /// Default area search radius in pixels
    pub search_radius: u32,
    /// Preview marker radius in pixels, before zoom scaling
    pub marker_radius: u32,
}

impl Default for RadarConfig {
    fn default() -> Self {
        Self {
            sources: Vec::new(),
            base_map: None,
            search_radius: DEFAULT_SEARCH_RADIUS,
            marker_radius: DEFAULT_MARKER_RADIUS,
        }
    }
}

impl RadarConfig {
    /// Looks up a source by name.
    pub fn source(&self, name: &str) -> Option<&RadarSource> {
        self.sources.iter().find(|s| s.name == name)
    }

    /// All `(source, layer)` pairs of enabled sources, in configuration order.
    pub fn enabled_layers(&self) -> impl Iterator<Item = (&RadarSource, &ImageryLayer)> {
        self.sources
            .iter()
            .filter(|s| s.enabled)
            .flat_map(|s| s.layers.iter().map(move |l| (s, l)))
    }
}

/// A radar tile provider.
#[derive(Debug, Clone)]
pub struct RadarSource {
    /// Source name, unique across the configuration
    pub name: String,
    /// Zoom level at which every layer of this source is fetched
    pub zoom: u8,
    /// Tile edge in pixels
    pub tile_size: u32,
    /// Opacity used when the source is overlaid on the base map
    pub opacity: f32,
    /// Whether exact-pixel classification is meaningful for this source
    pub point_sampling: bool,
    /// Disabled sources are never queried
    pub enabled: bool,
    /// Color legend shared by all layers of the source
    pub legend: Legend,
    /// Extra request headers sent with every layer request
    pub headers: Vec<(String, String)>,
    /// Imagery layers in configuration order
    pub layers: Vec<ImageryLayer>,
}

impl RadarSource {
    /// Creates an enabled source with defaults and no layers.
    pub fn new(name: impl Into<String>, zoom: u8, legend: Legend) -> Self {
        Self {
            name: name.into(),
            zoom,
            tile_size: DEFAULT_TILE_SIZE,
            opacity: 1.0,
            point_sampling: true,
            enabled: true,
            legend,
            headers: Vec::new(),
            layers: Vec::new(),
        }
    }

    /// Adds a layer (builder style).
    pub fn with_layer(mut self, layer: ImageryLayer) -> Self {
        self.layers.push(layer);
        self
    }

    /// Sets the overlay opacity (builder style).
    pub fn with_opacity(mut self, opacity: f32) -> Self {
        self.opacity = opacity;
        self
    }

    /// Sets the tile size (builder style).
    pub fn with_tile_size(mut self, tile_size: u32) -> Self {
        self.tile_size = tile_size;
        self
    }

    /// Enables or disables point sampling (builder style).
    pub fn with_point_sampling(mut self, enabled: bool) -> Self {
        self.point_sampling = enabled;
        self
    }

    /// Enables or disables the source (builder style).
    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    /// Identity of a layer of this source: `"<source> - <layer>"`.
    pub fn qualified_name(&self, layer: &ImageryLayer) -> String {
        qualified_name(&self.name, &layer.name)
    }
}

/// Builds the `"<source> - <layer>"` identity used for results and fetches.
pub fn qualified_name(source: &str, layer: &str) -> String {
    format!("{} - {}", source, layer)
}

/// One radar product of a source, fetched through a URL template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageryLayer {
    /// Layer name, unique within its source
    pub name: String,
    /// URL template with `{x}`, `{y}`, `{z}` placeholders
    pub url: String,
    /// HTTP method, upper case
    pub method: String,
    /// Optional request body template, same placeholders as the URL
    pub body: Option<String>,
    /// Content type of the body
    pub content_type: Option<String>,
}

impl ImageryLayer {
    /// Creates a `GET` layer without body.
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
            method: DEFAULT_METHOD.to_string(),
            body: None,
            content_type: None,
        }
    }
}

/// Base map used as preview background.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BaseMapConfig {
    /// URL template with `{x}`, `{y}`, `{z}` placeholders
    pub url: String,
    /// Zoom level of the base map; must not be coarser than any previewed source
    pub zoom: u8,
    /// Tile edge in pixels
    pub tile_size: u32,
    /// Extra request headers
    pub headers: Vec<(String, String)>,
}

impl BaseMapConfig {
    pub fn new(url: impl Into<String>, zoom: u8) -> Self {
        Self {
            url: url.into(),
            zoom,
            tile_size: DEFAULT_TILE_SIZE,
            headers: Vec::new(),
        }
    }
}
