//! Coordinate type definitions

use serde::Serialize;
use thiserror::Error;

/// Web Mercator valid latitude range
pub const MIN_LAT: f64 = -85.05112878;
pub const MAX_LAT: f64 = 85.05112878;

/// Valid longitude range
pub const MIN_LON: f64 = -180.0;
pub const MAX_LON: f64 = 180.0;

/// Zoom levels accepted by slippy-map tile servers
pub const MIN_ZOOM: u8 = 0;
pub const MAX_ZOOM: u8 = 22;

/// Default raster tile edge in pixels.
pub const DEFAULT_TILE_SIZE: u32 = 256;

/// A geographic point in decimal degrees (WGS84).
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GeoPoint {
    /// Latitude, positive north
    pub latitude: f64,
    /// Longitude, positive east
    pub longitude: f64,
}

impl GeoPoint {
    /// Creates a point after checking it lies on the globe.
    ///
    /// Only the geographic range is checked here. Whether the point can be
    /// projected onto Web Mercator tiles is decided by
    /// [`to_tile_address`](super::to_tile_address).
    pub fn new(latitude: f64, longitude: f64) -> Result<Self, CoordError> {
        if !latitude.is_finite() || !(-90.0..=90.0).contains(&latitude) {
            return Err(CoordError::InvalidLatitude(latitude));
        }
        if !longitude.is_finite() || !(MIN_LON..=MAX_LON).contains(&longitude) {
            return Err(CoordError::InvalidLongitude(longitude));
        }
        Ok(Self {
            latitude,
            longitude,
        })
    }
}

/// A pixel inside one raster tile of a slippy-map pyramid.
///
/// `x`/`y` are tile indices at zoom `z` (both `< 2^z`), `pixel_x`/`pixel_y`
/// the offset inside that tile (both `< tile_size`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct TileAddress {
    /// Tile column, 0 at the antimeridian, increasing east
    pub x: u32,
    /// Tile row, 0 at the north edge, increasing south
    pub y: u32,
    /// Zoom level
    pub z: u8,
    /// Pixel column inside the tile
    pub pixel_x: u32,
    /// Pixel row inside the tile
    pub pixel_y: u32,
}

impl TileAddress {
    /// Geographic bounds of the tile (not of the pixel).
    ///
    /// Returns `(top_left, bottom_right)`.
    pub fn corners(&self) -> (GeoPoint, GeoPoint) {
        super::tile_corners(self.x, self.y, self.z)
    }
}

/// Errors that can occur during coordinate conversion.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CoordError {
    /// Latitude is not a finite value within [-90, 90]
    #[error("Invalid latitude: {0} (must be between -90 and 90)")]
    InvalidLatitude(f64),

    /// Longitude is not a finite value within [-180, 180]
    #[error("Invalid longitude: {0} (must be between -180 and 180)")]
    InvalidLongitude(f64),

    /// Latitude cannot be projected: the Mercator terms diverge towards the poles
    #[error("Latitude {0} is outside the Web Mercator domain (must be within ±85.05112878)")]
    OutsideProjection(f64),

    /// Zoom level is outside valid range
    #[error("Invalid zoom level: {0} (must be between 0 and 22)")]
    InvalidZoom(u8),

    /// Tile size must be at least one pixel
    #[error("Invalid tile size: {0}")]
    InvalidTileSize(u32),
}
