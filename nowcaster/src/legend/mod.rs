//! Radar color legends and pixel classification.
//!
//! A [`Legend`] maps exact ARGB colors, as rendered by a radar tile server,
//! to weather labels such as `rain` or `hail`. The matcher functions compare
//! raster pixels against the legend:
//!
//! - [`classify_point`] answers "what is exactly here" for a single pixel
//! - [`classify_area`] answers "how much of each condition surrounds here"
//!   with a per-label pixel histogram over a square window
//!
//! Matching is bit-for-bit: anti-aliased or recompressed tiles only match
//! where their pixels still carry the palette colors verbatim.
//!
//! # Example
//!
//! ```
//! use image::{Rgba, RgbaImage};
//! use nowcaster::legend::{classify_area, classify_point, Legend, PointMatch};
//!
//! let legend = Legend::from_hex([("rain", "#FF0000"), ("snow", "#FFFFFF")]).unwrap();
//! let tile = RgbaImage::from_pixel(11, 11, Rgba([255, 0, 0, 255]));
//!
//! let area = classify_area(&tile, &legend, 5, 5, 5).unwrap();
//! assert_eq!(area.get("rain"), Some(100));
//! assert_eq!(area.get("snow"), Some(0));
//!
//! let point = classify_point(&tile, &legend, 5, 5).unwrap();
//! assert_eq!(point, PointMatch::Label("rain".to_string()));
//! ```

mod matcher;

pub use matcher::{classify_area, classify_point, AreaMatch, PointMatch, CLEAR};

use thiserror::Error;

/// Errors raised while building a legend or classifying pixels.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LegendError {
    /// Color string is not `#RRGGBB` or `#AARRGGBB`
    #[error("Invalid legend color '{color}' for '{label}': expected #RRGGBB or #AARRGGBB")]
    InvalidColor { label: String, color: String },

    /// The same label appears twice
    #[error("Duplicate legend label '{0}'")]
    DuplicateLabel(String),

    /// Search window does not fit inside the raster
    #[error(
        "Search window of radius {radius} around ({x}, {y}) exceeds raster bounds {width}×{height}"
    )]
    WindowOutOfBounds {
        x: u32,
        y: u32,
        radius: u32,
        width: u32,
        height: u32,
    },

    /// Pixel lies outside the raster
    #[error("Pixel ({x}, {y}) is outside raster bounds {width}×{height}")]
    PixelOutOfBounds {
        x: u32,
        y: u32,
        width: u32,
        height: u32,
    },
}

/// One legend entry: a label and its packed ARGB color.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LegendEntry {
    label: String,
    color: u32,
}

impl LegendEntry {
    /// Weather label.
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Packed `0xAARRGGBB` color.
    pub fn color(&self) -> u32 {
        self.color
    }
}

/// Ordered color-to-label legend.
///
/// Entry order is the configuration order; point classification returns the
/// first entry whose color matches. Immutable once built.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Legend {
    entries: Vec<LegendEntry>,
}

impl Legend {
    /// Builds a legend from `(label, hex color)` pairs.
    ///
    /// Colors without an alpha channel are treated as fully opaque.
    pub fn from_hex<I, L, C>(entries: I) -> Result<Self, LegendError>
    where
        I: IntoIterator<Item = (L, C)>,
        L: Into<String>,
        C: AsRef<str>,
    {
        let mut legend = Legend::default();
        for (label, hex) in entries {
            let label = label.into();
            let color = parse_hex_color(hex.as_ref()).ok_or_else(|| LegendError::InvalidColor {
                label: label.clone(),
                color: hex.as_ref().to_string(),
            })?;
            legend.push(label, color)?;
        }
        Ok(legend)
    }

    /// Builds a legend from already packed ARGB colors.
    pub fn from_argb<I, L>(entries: I) -> Result<Self, LegendError>
    where
        I: IntoIterator<Item = (L, u32)>,
        L: Into<String>,
    {
        let mut legend = Legend::default();
        for (label, color) in entries {
            legend.push(label.into(), color)?;
        }
        Ok(legend)
    }

    fn push(&mut self, label: String, color: u32) -> Result<(), LegendError> {
        if self.entries.iter().any(|e| e.label == label) {
            return Err(LegendError::DuplicateLabel(label));
        }
        self.entries.push(LegendEntry { label, color });
        Ok(())
    }

    /// Entries in configuration order.
    pub fn entries(&self) -> &[LegendEntry] {
        &self.entries
    }

    /// Labels in configuration order.
    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.label.as_str())
    }

    /// Color of a label, if present.
    pub fn color_of(&self, label: &str) -> Option<u32> {
        self.entries
            .iter()
            .find(|e| e.label == label)
            .map(|e| e.color)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Parses `#RRGGBB` or `#AARRGGBB` (leading `#` optional) into packed ARGB.
///
/// Six-digit colors get an `FF` alpha.
pub fn parse_hex_color(hex: &str) -> Option<u32> {
    let digits = hex.trim();
    let digits = digits.strip_prefix('#').unwrap_or(digits);

    if !digits.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }

    match digits.len() {
        6 => u32::from_str_radix(digits, 16).ok().map(|rgb| 0xFF00_0000 | rgb),
        8 => u32::from_str_radix(digits, 16).ok(),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_rgb_pads_opaque_alpha() {
        assert_eq!(parse_hex_color("#FF0000"), Some(0xFFFF0000));
        assert_eq!(parse_hex_color("00ff00"), Some(0xFF00FF00));
    }

    #[test]
    fn test_parse_argb_keeps_alpha() {
        assert_eq!(parse_hex_color("#80FF0000"), Some(0x80FF0000));
        assert_eq!(parse_hex_color("#00000000"), Some(0));
    }

    #[test]
    fn test_parse_rejects_malformed() {
        assert_eq!(parse_hex_color("#FFF"), None);
        assert_eq!(parse_hex_color("#GG0000"), None);
        assert_eq!(parse_hex_color("#+F0000"), None);
        assert_eq!(parse_hex_color(""), None);
        assert_eq!(parse_hex_color("#FF00000000"), None);
    }

    #[test]
    fn test_legend_preserves_order() {
        let legend =
            Legend::from_hex([("storm", "#FF00FF"), ("rain", "#0000FF"), ("drizzle", "#00FFFF")])
                .unwrap();

        let labels: Vec<_> = legend.labels().collect();
        assert_eq!(labels, vec!["storm", "rain", "drizzle"]);
        assert_eq!(legend.color_of("rain"), Some(0xFF0000FF));
        assert_eq!(legend.len(), 3);
    }

    #[test]
    fn test_legend_rejects_bad_color_with_label() {
        let err = Legend::from_hex([("rain", "#12345")]).unwrap_err();
        assert_eq!(
            err,
            LegendError::InvalidColor {
                label: "rain".to_string(),
                color: "#12345".to_string(),
            }
        );
        assert!(err.to_string().contains("rain"));
    }

    #[test]
    fn test_legend_rejects_duplicate_labels() {
        let err = Legend::from_hex([("rain", "#0000FF"), ("rain", "#0000AA")]).unwrap_err();
        assert_eq!(err, LegendError::DuplicateLabel("rain".to_string()));
    }

    #[test]
    fn test_legend_allows_shared_colors() {
        let legend = Legend::from_argb([("rain", 0xFF0000FF), ("showers", 0xFF0000FF)]).unwrap();
        assert_eq!(legend.len(), 2);
    }
}
