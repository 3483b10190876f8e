//! Crop rectangles for cross-zoom compositing.

use std::cmp::Ordering;
use std::fmt;

use serde::Serialize;

use crate::coord::TileAddress;

/// Pixel-space crop rectangle within a source raster.
///
/// Half-open on the bottom/right edge: `bottom_right_x` and `bottom_right_y`
/// are one past the last included pixel. Values built by [`boundary_for`]
/// are ordered and lie within `[0, width] × [0, height]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct TileBoundary {
    pub top_left_x: u32,
    pub top_left_y: u32,
    pub bottom_right_x: u32,
    pub bottom_right_y: u32,
}

impl TileBoundary {
    /// Boundary covering a whole `width × height` raster.
    pub fn full(width: u32, height: u32) -> Self {
        Self {
            top_left_x: 0,
            top_left_y: 0,
            bottom_right_x: width,
            bottom_right_y: height,
        }
    }

    pub fn width(&self) -> u32 {
        self.bottom_right_x.saturating_sub(self.top_left_x)
    }

    pub fn height(&self) -> u32 {
        self.bottom_right_y.saturating_sub(self.top_left_y)
    }

    pub fn is_empty(&self) -> bool {
        self.width() == 0 || self.height() == 0
    }
}

impl fmt::Display for TileBoundary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "({}, {})-({}, {})",
            self.top_left_x, self.top_left_y, self.bottom_right_x, self.bottom_right_y
        )
    }
}

/// Computes the crop rectangle inside `source`'s raster for two corner
/// addresses expressed at the source's zoom level.
///
/// A corner whose tile index differs from the source tile on an axis lies in
/// a neighbouring tile that was never fetched. Its pixel offset is then
/// meaningless for this raster and the boundary snaps to the raster edge on
/// that axis: `0` when the corner's index is lower, the full `width` or
/// `height` when it is higher.
///
/// The result is clamped to the raster and ordered so that the top-left
/// values never exceed the bottom-right ones.
pub fn boundary_for(
    width: u32,
    height: u32,
    source: &TileAddress,
    top_left: &TileAddress,
    bottom_right: &TileAddress,
) -> TileBoundary {
    let left = snap(source.x, top_left.x, top_left.pixel_x, width);
    let top = snap(source.y, top_left.y, top_left.pixel_y, height);
    let right = snap(source.x, bottom_right.x, bottom_right.pixel_x, width);
    let bottom = snap(source.y, bottom_right.y, bottom_right.pixel_y, height);

    TileBoundary {
        top_left_x: left.min(right),
        top_left_y: top.min(bottom),
        bottom_right_x: left.max(right),
        bottom_right_y: top.max(bottom),
    }
}

fn snap(source_index: u32, corner_index: u32, corner_pixel: u32, extent: u32) -> u32 {
    match corner_index.cmp(&source_index) {
        Ordering::Less => 0,
        Ordering::Greater => extent,
        Ordering::Equal => corner_pixel.min(extent),
    }
}
