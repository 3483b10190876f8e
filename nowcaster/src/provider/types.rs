//! Raster fetch capability and its error type.

use std::sync::Arc;

use thiserror::Error;

use crate::coord::TileAddress;
use crate::raster::RasterImage;

/// Layer id under which base-map tiles are fetched.
pub const BASE_MAP_LAYER: &str = "basemap";

/// Errors that can occur while fetching a raster tile.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    /// Transport-level failure (connection, timeout, TLS, ...)
    #[error("HTTP request failed: {0}")]
    Http(String),

    /// Server answered with a non-success status
    #[error("HTTP {status} from {url}")]
    Status { status: u16, url: String },

    /// Server answered with an empty body
    #[error("Empty response body from {url}")]
    EmptyBody { url: String },

    /// Response came from a different endpoint than requested (redirect)
    #[error("Response from unexpected endpoint: requested {requested}, got {responded}")]
    UnexpectedEndpoint { requested: String, responded: String },

    /// Request could not be built (bad method, header or URL)
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Body is not a decodable image
    #[error("Failed to decode raster from {url}: {reason}")]
    Decode { url: String, reason: String },

    /// No endpoint is registered under this layer id
    #[error("No endpoint configured for layer '{0}'")]
    UnknownLayer(String),
}

/// Obtains decoded rasters for tile addresses.
///
/// `layer` is an opaque key: a qualified layer name (`"<source> - <layer>"`)
/// or [`BASE_MAP_LAYER`]. Implementations must be shareable across the
/// threads that fetch layers in parallel.
pub trait RasterFetcher: Send + Sync {
    /// Fetches and decodes the tile at `tile` for `layer`.
    fn fetch(&self, layer: &str, tile: &TileAddress) -> Result<RasterImage, FetchError>;
}

impl<F: RasterFetcher + ?Sized> RasterFetcher for Arc<F> {
    fn fetch(&self, layer: &str, tile: &TileAddress) -> Result<RasterImage, FetchError> {
        (**self).fetch(layer, tile)
    }
}

impl<F: RasterFetcher + ?Sized> RasterFetcher for &F {
    fn fetch(&self, layer: &str, tile: &TileAddress) -> Result<RasterImage, FetchError> {
        (**self).fetch(layer, tile)
    }
}
