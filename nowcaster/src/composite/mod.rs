//! Cross-zoom compositing of radar tiles onto base-map tiles.
//!
//! A radar layer is usually rendered at a coarser zoom level than the base
//! map it is previewed on. One radar tile then covers `4^d` base tiles, where
//! `d` is the zoom difference, so the radar raster has to be cut down to the
//! footprint of the single base tile and resampled to the base tile's size
//! before the two can be blended pixel for pixel. Past a difference of
//! `log2(tile_size)` the footprint is smaller than one radar pixel and the
//! crop degenerates to that single pixel.
//!
//! The pipeline, as driven by the radar service:
//!
//! 1. [`boundary_for`] turns the corner addresses of the base tile (projected
//!    at radar zoom) into a crop rectangle inside the radar raster
//! 2. [`crop_and_resize`] cuts and bilinearly resamples that rectangle to
//!    the base tile's dimensions ([`crop_and_scale`] does the same by a
//!    factor)
//! 3. [`overlay`] blends the result onto the base map at constant opacity
//! 4. [`draw_marker`] annotates the composite with a locator square
//!
//! Steps 1 to 3 never mutate their inputs. Step 4 consumes the composite it
//! draws on.

mod blend;
mod boundary;

pub use blend::{crop_and_resize, crop_and_scale, draw_marker, overlay, MARKER_COLOR};
pub use boundary::{boundary_for, TileBoundary};

use thiserror::Error;

/// Errors raised by the compositing operations.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CompositeError {
    /// Crop rectangle has no area
    #[error("Crop boundary {0} is empty")]
    EmptyCrop(TileBoundary),

    /// Crop rectangle reaches past the source raster
    #[error("Crop boundary {boundary} exceeds source raster {width}×{height}")]
    BoundaryOutOfBounds {
        boundary: TileBoundary,
        width: u32,
        height: u32,
    },

    /// Scale factor is zero, negative or not finite
    #[error("Invalid scale factor: {0}")]
    InvalidScale(f64),

    /// Resample target has no area
    #[error("Invalid target size {width}×{height}")]
    InvalidTargetSize { width: u32, height: u32 },
}
