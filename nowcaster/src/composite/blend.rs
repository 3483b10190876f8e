//! Crop, rescale, blend and annotate operations.

use image::imageops::{self, FilterType};
use image::{Rgba, RgbaImage};
use imageproc::drawing::draw_hollow_rect_mut;
use imageproc::rect::Rect;

use super::{CompositeError, TileBoundary};

/// Default locator marker color (opaque red).
pub const MARKER_COLOR: Rgba<u8> = Rgba([255, 0, 0, 255]);

/// Crops `source` to `boundary` and resamples the crop bilinearly by `scale`.
///
/// The output measures `round(width * scale) × round(height * scale)`, at
/// least one pixel per axis. A scale of exactly `1.0` returns the crop
/// without resampling. `source` is never modified.
pub fn crop_and_scale(
    source: &RgbaImage,
    boundary: &TileBoundary,
    scale: f64,
) -> Result<RgbaImage, CompositeError> {
    if !scale.is_finite() || scale <= 0.0 {
        return Err(CompositeError::InvalidScale(scale));
    }
    check_boundary(source, boundary)?;

    crop_and_resize(
        source,
        boundary,
        scaled_extent(boundary.width(), scale),
        scaled_extent(boundary.height(), scale),
    )
}

/// Crops `source` to `boundary` and resamples the crop bilinearly to exactly
/// `width × height`.
///
/// Used when the target raster is known up front, such as a base-map tile:
/// the crop may be a single pixel and the output still fills the target.
/// A crop that already has the target dimensions is returned as is.
pub fn crop_and_resize(
    source: &RgbaImage,
    boundary: &TileBoundary,
    width: u32,
    height: u32,
) -> Result<RgbaImage, CompositeError> {
    if width == 0 || height == 0 {
        return Err(CompositeError::InvalidTargetSize { width, height });
    }
    check_boundary(source, boundary)?;

    let crop = imageops::crop_imm(
        source,
        boundary.top_left_x,
        boundary.top_left_y,
        boundary.width(),
        boundary.height(),
    )
    .to_image();

    if crop.dimensions() == (width, height) {
        return Ok(crop);
    }
    Ok(imageops::resize(&crop, width, height, FilterType::Triangle))
}

fn check_boundary(source: &RgbaImage, boundary: &TileBoundary) -> Result<(), CompositeError> {
    let (width, height) = source.dimensions();
    if boundary.bottom_right_x > width || boundary.bottom_right_y > height {
        return Err(CompositeError::BoundaryOutOfBounds {
            boundary: *boundary,
            width,
            height,
        });
    }
    if boundary.is_empty() {
        return Err(CompositeError::EmptyCrop(*boundary));
    }
    Ok(())
}

fn scaled_extent(extent: u32, scale: f64) -> u32 {
    let scaled = (f64::from(extent) * scale).round();
    if scaled >= f64::from(u32::MAX) {
        u32::MAX
    } else {
        (scaled as u32).max(1)
    }
}

/// Blends `top` onto a copy of `base` with source-over compositing.
///
/// `top` is placed at the origin; pixels outside `base` are dropped. Each
/// overlay pixel's alpha is multiplied by `opacity`, which is clamped to
/// `[0, 1]` (non-finite values count as 0). The result always has the
/// dimensions of `base`.
pub fn overlay(base: &RgbaImage, top: &RgbaImage, opacity: f32) -> RgbaImage {
    let opacity = if opacity.is_finite() {
        opacity.clamp(0.0, 1.0)
    } else {
        0.0
    };

    let mut out = base.clone();
    if opacity == 0.0 {
        return out;
    }
    if opacity == 1.0 {
        imageops::overlay(&mut out, top, 0, 0);
        return out;
    }

    let mut faded = top.clone();
    for pixel in faded.pixels_mut() {
        pixel[3] = (f32::from(pixel[3]) * opacity).round() as u8;
    }
    imageops::overlay(&mut out, &faded, 0, 0);
    out
}

/// Draws an unfilled square outline of half-width `radius` centred on
/// `(cx, cy)`.
///
/// The image is taken by value: the marker is only ever drawn on a
/// composite the caller owns exclusively. Parts of the outline outside the
/// image are clipped; the centre may itself lie outside.
pub fn draw_marker(
    mut image: RgbaImage,
    cx: i64,
    cy: i64,
    radius: u32,
    color: Rgba<u8>,
) -> RgbaImage {
    let (width, height) = (i64::from(image.width()), i64::from(image.height()));
    let r = i64::from(radius);
    let (left, right, top, bottom) = (cx - r, cx + r, cy - r, cy + r);

    if right < 0 || bottom < 0 || left >= width || top >= height {
        return image;
    }

    // Edges beyond the image stay invisible when pulled in to one pixel
    // outside it, which keeps the outline no longer than the image.
    let (left, right) = (left.max(-1), right.min(width));
    let (top, bottom) = (top.max(-1), bottom.min(height));

    let rect = match (
        i32::try_from(left),
        i32::try_from(top),
        u32::try_from(right - left + 1),
        u32::try_from(bottom - top + 1),
    ) {
        (Ok(x), Ok(y), Ok(w), Ok(h)) => Rect::at(x, y).of_size(w, h),
        _ => return image,
    };
    draw_hollow_rect_mut(&mut image, rect, color);

    image
}
