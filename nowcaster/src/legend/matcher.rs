//! Point and area classification of raster pixels against a legend.

use std::collections::{BTreeMap, HashMap};
use std::fmt;

use serde::Serialize;

use super::{Legend, LegendError};
use crate::raster::{argb, RasterImage};

/// Label reported when no legend color matches a pixel.
pub const CLEAR: &str = "clear";

/// Per-label pixel counts over a search window.
///
/// Holds exactly one entry per legend label; labels without matches are
/// present with a count of zero.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct AreaMatch {
    counts: BTreeMap<String, u32>,
}

impl AreaMatch {
    /// Match count for a label.
    pub fn get(&self, label: &str) -> Option<u32> {
        self.counts.get(label).copied()
    }

    /// `(label, count)` pairs, ordered by label.
    pub fn iter(&self) -> impl Iterator<Item = (&str, u32)> {
        self.counts.iter().map(|(label, count)| (label.as_str(), *count))
    }

    /// Total matched pixels across labels.
    pub fn total(&self) -> u64 {
        self.counts.values().map(|&c| u64::from(c)).sum()
    }

    /// Number of labels (equals the legend length).
    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Whether any label containing `term` has at least one matching pixel.
    pub fn contains_like(&self, term: &str) -> bool {
        self.counts
            .iter()
            .any(|(label, &count)| count > 0 && label.contains(term))
    }
}

/// Classification of a single pixel.
///
/// Serializes as `{"label": "<label>"}` or the string `"clear"`, so a legend
/// label that is itself named `clear` stays distinguishable from no match.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PointMatch {
    /// First legend label whose color equals the pixel
    Label(String),
    /// No legend color matched
    Clear,
}

impl PointMatch {
    /// Label text, `"clear"` for [`PointMatch::Clear`].
    pub fn as_str(&self) -> &str {
        match self {
            PointMatch::Label(label) => label,
            PointMatch::Clear => CLEAR,
        }
    }

    pub fn is_clear(&self) -> bool {
        matches!(self, PointMatch::Clear)
    }
}

impl fmt::Display for PointMatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Counts, for every legend entry, the pixels of a square window whose ARGB
/// value equals the entry color.
///
/// The window has side `2 * radius` and its origin at
/// `(x - radius, y - radius)`. With a radius of 5 the window holds 100
/// pixels, so counts read directly as coverage percentages.
///
/// # Errors
///
/// [`LegendError::WindowOutOfBounds`] if the window does not fit inside the
/// raster. Nothing is read in that case.
pub fn classify_area(
    image: &RasterImage,
    legend: &Legend,
    x: u32,
    y: u32,
    radius: u32,
) -> Result<AreaMatch, LegendError> {
    let (width, height) = image.dimensions();
    let out_of_bounds = || LegendError::WindowOutOfBounds {
        x,
        y,
        radius,
        width,
        height,
    };

    let start_x = x.checked_sub(radius).ok_or_else(out_of_bounds)?;
    let start_y = y.checked_sub(radius).ok_or_else(out_of_bounds)?;
    let end_x = x.checked_add(radius).ok_or_else(out_of_bounds)?;
    let end_y = y.checked_add(radius).ok_or_else(out_of_bounds)?;
    if end_x > width || end_y > height {
        return Err(out_of_bounds());
    }

    let mut histogram: HashMap<u32, u32> = HashMap::new();
    for py in start_y..end_y {
        for px in start_x..end_x {
            *histogram.entry(argb(image.get_pixel(px, py))).or_insert(0) += 1;
        }
    }

    let counts = legend
        .entries()
        .iter()
        .map(|entry| {
            let count = histogram.get(&entry.color()).copied().unwrap_or(0);
            (entry.label().to_string(), count)
        })
        .collect();

    Ok(AreaMatch { counts })
}

/// Returns the first legend label whose color equals the pixel at `(x, y)`,
/// or [`PointMatch::Clear`].
///
/// # Errors
///
/// [`LegendError::PixelOutOfBounds`] if the pixel lies outside the raster.
pub fn classify_point(
    image: &RasterImage,
    legend: &Legend,
    x: u32,
    y: u32,
) -> Result<PointMatch, LegendError> {
    let (width, height) = image.dimensions();
    if x >= width || y >= height {
        return Err(LegendError::PixelOutOfBounds {
            x,
            y,
            width,
            height,
        });
    }

    let color = argb(image.get_pixel(x, y));
    Ok(legend
        .entries()
        .iter()
        .find(|entry| entry.color() == color)
        .map_or(PointMatch::Clear, |entry| {
            PointMatch::Label(entry.label().to_string())
        }))
}
