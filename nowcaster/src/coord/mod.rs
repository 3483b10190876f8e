//! Coordinate conversion module
//!
//! Provides conversions between geographic coordinates (latitude/longitude)
//! and Web Mercator tile/pixel addresses used by slippy-map tile servers.

mod types;

pub use types::{
    CoordError, GeoPoint, TileAddress, DEFAULT_TILE_SIZE, MAX_LAT, MAX_LON, MAX_ZOOM, MIN_LAT,
    MIN_LON, MIN_ZOOM,
};

use std::f64::consts::PI;

/// Converts a geographic point to the tile and pixel that contain it.
///
/// # Arguments
///
/// * `point` - Geographic point (latitude within ±85.05112878)
/// * `zoom` - Zoom level (0 to 22)
/// * `tile_size` - Edge of a raster tile in pixels (usually 256)
///
/// # Returns
///
/// The tile address, or an error if the point cannot be projected.
/// Pixel offsets are always `< tile_size` and tile indices `< 2^zoom`.
pub fn to_tile_address(
    point: GeoPoint,
    zoom: u8,
    tile_size: u32,
) -> Result<TileAddress, CoordError> {
    let GeoPoint {
        latitude,
        longitude,
    } = point;

    if !latitude.is_finite() {
        return Err(CoordError::InvalidLatitude(latitude));
    }
    // Covers the poles, where tan/sec diverge and the tile row becomes infinite
    if !(MIN_LAT..=MAX_LAT).contains(&latitude) {
        return Err(CoordError::OutsideProjection(latitude));
    }
    if !longitude.is_finite() || !(MIN_LON..=MAX_LON).contains(&longitude) {
        return Err(CoordError::InvalidLongitude(longitude));
    }
    if zoom > MAX_ZOOM {
        return Err(CoordError::InvalidZoom(zoom));
    }
    if tile_size == 0 {
        return Err(CoordError::InvalidTileSize(tile_size));
    }

    let tiles = 1u32 << zoom;
    let (x, y) = fractional_tile(latitude, longitude, tiles);

    let (tile_x, pixel_x) = split_axis(x, tiles, tile_size);
    let (tile_y, pixel_y) = split_axis(y, tiles, tile_size);

    Ok(TileAddress {
        x: tile_x,
        y: tile_y,
        z: zoom,
        pixel_x,
        pixel_y,
    })
}

/// Projects the footprint of tile `(x, y, z)` onto the pixel grid of
/// another zoom level.
///
/// Returns the `(top_left, bottom_right)` corners as addresses at `zoom`,
/// the same corners [`tile_corners`] gives geographically. Both pyramids
/// share the Web Mercator plane, so the projection is done on integer pixel
/// edges instead of through latitude/longitude: no rounding error can move
/// a corner across a pixel edge.
///
/// The footprint is rounded outwards (top-left down, bottom-right up), so it
/// always covers at least one pixel per axis, even when the tile is much
/// smaller than a pixel at `zoom`. The bottom-right corner is exclusive; on
/// a tile edge it lies on pixel 0 of the next tile, and the far edge of the
/// pyramid is reported as index `2^zoom`, pixel 0. [`boundary_for`] snaps
/// such neighbours to the raster edge.
///
/// [`boundary_for`]: crate::composite::boundary_for
pub fn tile_footprint(
    x: u32,
    y: u32,
    z: u8,
    zoom: u8,
    tile_size: u32,
) -> (TileAddress, TileAddress) {
    let z = z.min(MAX_ZOOM);
    let zoom = zoom.min(MAX_ZOOM);
    let tile_size = tile_size.max(1);

    let corner = |x: u64, y: u64, round_up: bool| {
        let edge = |index| project_edge(index, z, zoom, tile_size, round_up);
        let (tile_x, pixel_x) = split_edge(edge(x), tile_size);
        let (tile_y, pixel_y) = split_edge(edge(y), tile_size);
        TileAddress {
            x: tile_x,
            y: tile_y,
            z: zoom,
            pixel_x,
            pixel_y,
        }
    };

    let (x, y) = (u64::from(x), u64::from(y));
    (corner(x, y, false), corner(x + 1, y + 1, true))
}

/// Global pixel edge at `zoom` of tile edge `index` at zoom `z`.
fn project_edge(index: u64, z: u8, zoom: u8, tile_size: u32, round_up: bool) -> u64 {
    // index * tile_size * 2^zoom / 2^z, at most 2^23 * 2^32 * 2^22
    let scaled = (u128::from(index) * u128::from(tile_size)) << zoom;
    let divisor = 1u128 << z;
    let edge = if round_up {
        scaled.div_ceil(divisor)
    } else {
        scaled / divisor
    };
    let max = (u128::from(tile_size)) << zoom;
    edge.min(max) as u64
}

/// Splits a global pixel edge into tile index and pixel offset.
fn split_edge(edge: u64, tile_size: u32) -> (u32, u32) {
    let tile_size = u64::from(tile_size);
    ((edge / tile_size) as u32, (edge % tile_size) as u32)
}

/// Fractional tile coordinates of a point on a `tiles × tiles` grid.
fn fractional_tile(latitude: f64, longitude: f64, tiles: u32) -> (f64, f64) {
    let scale = f64::from(tiles);

    let x = scale * (longitude + 180.0) / 360.0;

    let lat_rad = latitude * PI / 180.0;
    let y = scale * (1.0 - (lat_rad.tan() + 1.0 / lat_rad.cos()).ln() / PI) / 2.0;

    (x, y)
}

/// Splits a fractional tile coordinate into tile index and pixel offset.
///
/// The far edge (longitude 180, southern Mercator limit) maps onto the last
/// pixel of the last tile.
fn split_axis(value: f64, tiles: u32, tile_size: u32) -> (u32, u32) {
    let value = value.max(0.0);
    let index = value.floor();

    if index >= f64::from(tiles) {
        return (tiles - 1, tile_size - 1);
    }

    let pixel = ((value - index) * f64::from(tile_size)) as u32;
    (index as u32, pixel.min(tile_size - 1))
}

/// Computes the geographic corners of a tile.
///
/// Returns `(top_left, bottom_right)`: the north-west corner of tile
/// `(x, y)` and the north-west corner of tile `(x + 1, y + 1)`.
pub fn tile_corners(x: u32, y: u32, z: u8) -> (GeoPoint, GeoPoint) {
    let top_left = tile_edge_to_point(f64::from(x), f64::from(y), z);
    let bottom_right = tile_edge_to_point(f64::from(x) + 1.0, f64::from(y) + 1.0, z);
    (top_left, bottom_right)
}

/// Inverse Web Mercator for a tile grid position.
fn tile_edge_to_point(x: f64, y: f64, z: u8) -> GeoPoint {
    let n = 2.0_f64.powi(i32::from(z));

    let longitude = x / n * 360.0 - 180.0;
    let lat_rad = (PI * (1.0 - 2.0 * y / n)).sinh().atan();

    GeoPoint {
        latitude: lat_rad * 180.0 / PI,
        longitude,
    }
}
