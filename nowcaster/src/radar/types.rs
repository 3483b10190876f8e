//! Radar result types.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::legend::{AreaMatch, PointMatch};

/// Point and area conditions of one imagery layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Nowcast {
    /// Layer name within its source
    pub imagery_name: String,
    /// Condition at the exact pixel; `None` when the source has point
    /// sampling disabled
    pub point: Option<PointMatch>,
    /// Per-label pixel counts around the point
    pub area: AreaMatch,
}

/// Nowcasts of all layers of one source, in configuration order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NowcastSource {
    pub source_name: String,
    pub nowcasts: Vec<Nowcast>,
}

/// Nowcasts of every enabled source.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RawNowcast {
    pub sources: Vec<NowcastSource>,
}

impl RawNowcast {
    /// Iterates `(qualified layer name, nowcast)` pairs.
    pub fn layers(&self) -> impl Iterator<Item = (String, &Nowcast)> {
        self.sources.iter().flat_map(|source| {
            source.nowcasts.iter().map(move |nowcast| {
                (
                    crate::config::qualified_name(&source.source_name, &nowcast.imagery_name),
                    nowcast,
                )
            })
        })
    }
}

/// Match result for one weather type.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct NowcastMatch {
    /// Some layer's point label contains the weather type
    pub point_matched: bool,
    /// Some layer has pixels of a label containing the weather type
    pub area_matched: bool,
    /// Qualified names of the layers that matched, in configuration order
    pub matched_layers: Vec<String>,
}

impl NowcastMatch {
    pub fn matched(&self) -> bool {
        self.point_matched || self.area_matched
    }
}

/// Match results keyed by requested weather type.
///
/// Every requested type has an entry, matched or not.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct WeatherMatchedNowcast {
    pub matches: BTreeMap<String, NowcastMatch>,
}

impl WeatherMatchedNowcast {
    /// Matches `nowcast` against `weather_types` by substring on labels.
    pub fn from_nowcast<S: AsRef<str>>(nowcast: &RawNowcast, weather_types: &[S]) -> Self {
        let mut matches: BTreeMap<String, NowcastMatch> = weather_types
            .iter()
            .map(|t| (t.as_ref().to_string(), NowcastMatch::default()))
            .collect();

        for (layer, layer_nowcast) in nowcast.layers() {
            for (weather_type, entry) in matches.iter_mut() {
                let point = layer_nowcast
                    .point
                    .as_ref()
                    .is_some_and(|p| !p.is_clear() && p.as_str().contains(weather_type.as_str()));
                let area = layer_nowcast.area.contains_like(weather_type);

                entry.point_matched |= point;
                entry.area_matched |= area;
                if point || area {
                    entry.matched_layers.push(layer.clone());
                }
            }
        }

        Self { matches }
    }

    /// Match for a weather type.
    pub fn get(&self, weather_type: &str) -> Option<&NowcastMatch> {
        self.matches.get(weather_type)
    }
}
