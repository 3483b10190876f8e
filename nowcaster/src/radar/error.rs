//! Radar service errors.

use thiserror::Error;

use crate::composite::CompositeError;
use crate::coord::CoordError;
use crate::legend::LegendError;
use crate::provider::FetchError;

/// Coarse classification of a [`RadarError`].
///
/// Lets an outer boundary (CLI, HTTP layer) choose between reporting a bad
/// request, a bad configuration, or an upstream failure without matching on
/// every variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Unknown or disabled layer, zoom invariant violated, no base map
    Configuration,
    /// Raster could not be fetched, decoded or composited
    DataRetrieval,
    /// Caller input cannot be served (projection domain, search window)
    Validation,
}

/// Errors that can occur while serving a radar request.
#[derive(Debug, Error)]
pub enum RadarError {
    /// No configured layer matches the requested name
    #[error("Unknown layer '{0}'")]
    UnknownLayer(String),

    /// Requested layer belongs to a disabled source
    #[error("Layer '{0}' belongs to a disabled source")]
    LayerDisabled(String),

    /// Point sampling requested on a source that does not support it
    #[error("Layer '{0}' does not support point sampling")]
    PointSamplingUnsupported(String),

    /// Preview requested without a base map
    #[error("No base map configured")]
    NoBaseMap,

    /// Radar layer is rendered at a finer zoom than the base map
    #[error(
        "Layer '{layer}' is configured at zoom {radar_zoom}, finer than the base map zoom {base_zoom}"
    )]
    ZoomMismatch {
        layer: String,
        radar_zoom: u8,
        base_zoom: u8,
    },

    /// Point cannot be projected at the layer's zoom
    #[error("Cannot locate ({latitude}, {longitude}) at zoom {zoom} for '{layer}': {source}")]
    Projection {
        layer: String,
        latitude: f64,
        longitude: f64,
        zoom: u8,
        #[source]
        source: CoordError,
    },

    /// Tile fetch or decode failed
    #[error("Failed to fetch '{layer}' tile {z}/{x}/{y}: {source}")]
    Fetch {
        layer: String,
        x: u32,
        y: u32,
        z: u8,
        #[source]
        source: FetchError,
    },

    /// Pixel classification failed
    #[error("Failed to classify '{layer}' tile {z}/{x}/{y}: {source}")]
    Classify {
        layer: String,
        x: u32,
        y: u32,
        z: u8,
        #[source]
        source: LegendError,
    },

    /// Cross-zoom compositing failed
    #[error("Failed to composite '{layer}' onto the base map: {source}")]
    Composite {
        layer: String,
        #[source]
        source: CompositeError,
    },
}

impl RadarError {
    /// Classification of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            RadarError::UnknownLayer(_)
            | RadarError::LayerDisabled(_)
            | RadarError::NoBaseMap
            | RadarError::ZoomMismatch { .. } => ErrorKind::Configuration,
            RadarError::PointSamplingUnsupported(_)
            | RadarError::Projection { .. }
            | RadarError::Classify { .. } => ErrorKind::Validation,
            RadarError::Fetch { .. } | RadarError::Composite { .. } => ErrorKind::DataRetrieval,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kinds() {
        assert_eq!(
            RadarError::UnknownLayer("x".into()).kind(),
            ErrorKind::Configuration
        );
        assert_eq!(
            RadarError::ZoomMismatch {
                layer: "radar - now".into(),
                radar_zoom: 10,
                base_zoom: 6,
            }
            .kind(),
            ErrorKind::Configuration
        );
        assert_eq!(
            RadarError::Fetch {
                layer: "radar - now".into(),
                x: 1,
                y: 2,
                z: 3,
                source: FetchError::Http("timeout".into()),
            }
            .kind(),
            ErrorKind::DataRetrieval
        );
        assert_eq!(
            RadarError::Projection {
                layer: "radar - now".into(),
                latitude: 89.0,
                longitude: 0.0,
                zoom: 5,
                source: CoordError::OutsideProjection(89.0),
            }
            .kind(),
            ErrorKind::Validation
        );
    }

    #[test]
    fn test_messages_carry_context() {
        let err = RadarError::Fetch {
            layer: "radar - now".into(),
            x: 132,
            y: 92,
            z: 8,
            source: FetchError::Status {
                status: 503,
                url: "https://radar.example.com/8/132/92.png".into(),
            },
        };
        let message = err.to_string();
        assert!(message.contains("radar - now"));
        assert!(message.contains("8/132/92"));
        assert!(message.contains("503"));

        let err = RadarError::ZoomMismatch {
            layer: "radar - now".into(),
            radar_zoom: 10,
            base_zoom: 6,
        };
        assert!(err.to_string().contains("zoom 10"));
    }
}
