//! Radar service: per-request orchestration of projection, fetch,
//! classification and compositing.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Instant;

use rayon::prelude::*;
use tracing::{debug, info, warn};

use crate::composite::{boundary_for, crop_and_resize, draw_marker, overlay, MARKER_COLOR};
use crate::config::{BaseMapConfig, ImageryLayer, RadarConfig, RadarSource};
use crate::coord::{tile_footprint, to_tile_address, GeoPoint, TileAddress};
use crate::legend::{classify_area, classify_point, AreaMatch, PointMatch};
use crate::provider::{RasterFetcher, BASE_MAP_LAYER};
use crate::raster::RasterImage;

use super::error::RadarError;
use super::types::{Nowcast, NowcastSource, RawNowcast, WeatherMatchedNowcast};

/// A configured layer selected for a request.
struct LayerRef<'a> {
    source: &'a RadarSource,
    layer: &'a ImageryLayer,
    id: String,
}

impl<'a> LayerRef<'a> {
    fn new(source: &'a RadarSource, layer: &'a ImageryLayer) -> Self {
        Self {
            id: source.qualified_name(layer),
            source,
            layer,
        }
    }
}

/// A fetched tile together with the address it was fetched for.
struct FetchedTile {
    address: TileAddress,
    image: RasterImage,
}

/// Answers weather questions for geographic points from radar tiles.
///
/// Holds the immutable configuration and the fetch capability; every call
/// works on its own freshly fetched rasters, so one service can serve
/// concurrent requests. Layers are identified by their qualified name,
/// `"<source> - <layer>"`.
///
/// # Example
///
/// ```ignore
/// use std::sync::Arc;
/// use nowcaster::config::ConfigFile;
/// use nowcaster::coord::GeoPoint;
/// use nowcaster::provider::{ReqwestClient, TileServerFetcher};
/// use nowcaster::radar::RadarService;
///
/// let config = ConfigFile::load()?;
/// let client = ReqwestClient::with_timeout(config.http.timeout)?;
/// let fetcher = TileServerFetcher::from_config(client, &config.radar);
/// let service = RadarService::new(Arc::new(config.radar), fetcher);
///
/// let point = GeoPoint::new(45.0, 7.0)?;
/// let areas = service.sample_area(point, &[], 5)?;
/// ```
pub struct RadarService<F: RasterFetcher> {
    config: Arc<RadarConfig>,
    fetcher: F,
}

impl<F: RasterFetcher> RadarService<F> {
    /// Creates a service over `config`, fetching rasters with `fetcher`.
    pub fn new(config: Arc<RadarConfig>, fetcher: F) -> Self {
        Self { config, fetcher }
    }

    /// The engine configuration.
    pub fn config(&self) -> &RadarConfig {
        &self.config
    }

    /// Qualified names of all enabled layers, in configuration order.
    pub fn layer_names(&self) -> Vec<String> {
        self.config
            .enabled_layers()
            .map(|(source, layer)| source.qualified_name(layer))
            .collect()
    }

    /// Resolves a requested layer name to its qualified name.
    ///
    /// An exact qualified name wins. Otherwise the first enabled layer, in
    /// configuration order, whose name is contained in `requested` is used.
    pub fn resolve_layer(&self, requested: &str) -> Result<String, RadarError> {
        self.find_layer(requested).map(|l| l.id)
    }

    /// Counts legend colors around `point` in each selected layer.
    ///
    /// An empty `layers` slice selects every enabled layer. The window is
    /// `2 * search_radius` pixels wide, centred on the point's pixel.
    pub fn sample_area(
        &self,
        point: GeoPoint,
        layers: &[String],
        search_radius: u32,
    ) -> Result<BTreeMap<String, AreaMatch>, RadarError> {
        let selected = self.select_layers(layers)?;
        info!(
            latitude = point.latitude,
            longitude = point.longitude,
            layers = selected.len(),
            search_radius,
            "Sampling area"
        );

        selected
            .par_iter()
            .map(|layer| {
                let tile = self.fetch_layer(layer, point)?;
                let area = self.classify_area(layer, &tile, search_radius)?;
                Ok((layer.id.clone(), area))
            })
            .collect()
    }

    /// Classifies the exact pixel under `point` in each selected layer.
    ///
    /// An empty `layers` slice selects every enabled layer whose source
    /// supports point sampling. Explicitly requesting a layer without point
    /// support is an error.
    pub fn sample_point(
        &self,
        point: GeoPoint,
        layers: &[String],
    ) -> Result<BTreeMap<String, PointMatch>, RadarError> {
        let selected: Vec<LayerRef<'_>> = if layers.is_empty() {
            self.enabled_layers()
                .filter(|l| l.source.point_sampling)
                .collect()
        } else {
            let selected = self.select_layers(layers)?;
            if let Some(unsupported) = selected.iter().find(|l| !l.source.point_sampling) {
                warn!(layer = %unsupported.id, "Point sampling requested on unsupported layer");
                return Err(RadarError::PointSamplingUnsupported(unsupported.id.clone()));
            }
            selected
        };
        info!(
            latitude = point.latitude,
            longitude = point.longitude,
            layers = selected.len(),
            "Sampling point"
        );

        selected
            .par_iter()
            .map(|layer| {
                let tile = self.fetch_layer(layer, point)?;
                let label = self.classify_point(layer, &tile)?;
                Ok((layer.id.clone(), label))
            })
            .collect()
    }

    /// Point and area conditions of every enabled layer, grouped by source.
    ///
    /// Each layer is fetched once; the point condition is only computed for
    /// sources with point sampling.
    pub fn nowcast(&self, point: GeoPoint, search_radius: u32) -> Result<RawNowcast, RadarError> {
        let selected: Vec<LayerRef<'_>> = self.enabled_layers().collect();
        info!(
            latitude = point.latitude,
            longitude = point.longitude,
            layers = selected.len(),
            search_radius,
            "Computing nowcast"
        );

        let nowcasts: Vec<(&str, Nowcast)> = selected
            .par_iter()
            .map(|layer| {
                let tile = self.fetch_layer(layer, point)?;
                let area = self.classify_area(layer, &tile, search_radius)?;
                let label = if layer.source.point_sampling {
                    Some(self.classify_point(layer, &tile)?)
                } else {
                    None
                };
                let nowcast = Nowcast {
                    imagery_name: layer.layer.name.clone(),
                    point: label,
                    area,
                };
                Ok((layer.source.name.as_str(), nowcast))
            })
            .collect::<Result<_, RadarError>>()?;

        // Layers arrive in configuration order, so sources are contiguous
        let mut sources: Vec<NowcastSource> = Vec::new();
        for (source_name, nowcast) in nowcasts {
            match sources.last_mut() {
                Some(last) if last.source_name == source_name => last.nowcasts.push(nowcast),
                _ => sources.push(NowcastSource {
                    source_name: source_name.to_string(),
                    nowcasts: vec![nowcast],
                }),
            }
        }

        Ok(RawNowcast { sources })
    }

    /// Checks which of `weather_types` occur at or around `point`.
    ///
    /// A type matches a layer when it is a substring of the layer's point
    /// label or of a legend label with a non-zero area count.
    pub fn match_weather<S: AsRef<str>>(
        &self,
        point: GeoPoint,
        weather_types: &[S],
        search_radius: u32,
    ) -> Result<WeatherMatchedNowcast, RadarError> {
        let nowcast = self.nowcast(point, search_radius)?;
        let matched = WeatherMatchedNowcast::from_nowcast(&nowcast, weather_types);

        debug!(
            requested = weather_types.len(),
            matched = matched.matches.values().filter(|m| m.matched()).count(),
            "Weather match complete"
        );
        Ok(matched)
    }

    /// Renders the radar layer over the base map around `point`.
    ///
    /// The result is one base-map tile with the radar overlaid at the
    /// source's opacity and a locator marker on the point. The radar tile
    /// is cropped to the base tile's footprint (at least one radar pixel)
    /// and resampled to the base tile's dimensions, so differing zoom
    /// levels and tile sizes both line up. The marker radius grows by
    /// `2^(base_zoom - radar_zoom)`.
    ///
    /// A radar zoom finer than the base map zoom is rejected before any
    /// tile is fetched.
    pub fn render_preview(&self, point: GeoPoint, layer: &str) -> Result<RasterImage, RadarError> {
        let started = Instant::now();
        let layer = self.find_layer(layer)?;
        let base_map = self.config.base_map.as_ref().ok_or(RadarError::NoBaseMap)?;

        let radar_zoom = layer.source.zoom;
        let base_zoom = base_map.zoom;
        if radar_zoom > base_zoom {
            warn!(
                layer = %layer.id,
                radar_zoom,
                base_zoom,
                "Radar layer is finer than the base map, refusing preview"
            );
            return Err(RadarError::ZoomMismatch {
                layer: layer.id.clone(),
                radar_zoom,
                base_zoom,
            });
        }

        let (radar, base) = rayon::join(
            || self.fetch_layer(&layer, point),
            || self.fetch_base_map(base_map, point),
        );
        let (radar, base) = (radar?, base?);

        let zoom_difference = base_zoom - radar_zoom;
        let factor = 1u32 << zoom_difference;

        let (crop_top_left, crop_bottom_right) = tile_footprint(
            base.address.x,
            base.address.y,
            base_zoom,
            radar_zoom,
            layer.source.tile_size,
        );
        let boundary = boundary_for(
            radar.image.width(),
            radar.image.height(),
            &radar.address,
            &crop_top_left,
            &crop_bottom_right,
        );
        debug!(
            layer = %layer.id,
            boundary = %boundary,
            width = base.image.width(),
            height = base.image.height(),
            "Cropping radar tile to base map footprint"
        );

        let radar_image = crop_and_resize(
            &radar.image,
            &boundary,
            base.image.width(),
            base.image.height(),
        )
        .map_err(|source| RadarError::Composite {
            layer: layer.id.clone(),
            source,
        })?;

        let composite = overlay(&base.image, &radar_image, layer.source.opacity);
        let marker_radius = self.config.marker_radius.saturating_mul(factor);
        let preview = draw_marker(
            composite,
            i64::from(base.address.pixel_x),
            i64::from(base.address.pixel_y),
            marker_radius,
            MARKER_COLOR,
        );

        info!(
            layer = %layer.id,
            latitude = point.latitude,
            longitude = point.longitude,
            radar_zoom,
            base_zoom,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Rendered preview"
        );
        Ok(preview)
    }

    fn enabled_layers(&self) -> impl Iterator<Item = LayerRef<'_>> {
        self.config
            .enabled_layers()
            .map(|(source, layer)| LayerRef::new(source, layer))
    }

    fn find_layer(&self, requested: &str) -> Result<LayerRef<'_>, RadarError> {
        let exact = self.config.sources.iter().find_map(|source| {
            source
                .layers
                .iter()
                .find(|layer| source.qualified_name(layer) == requested)
                .map(|layer| LayerRef::new(source, layer))
        });
        if let Some(layer) = exact {
            if !layer.source.enabled {
                return Err(RadarError::LayerDisabled(layer.id));
            }
            return Ok(layer);
        }

        self.enabled_layers()
            .find(|l| requested.contains(l.layer.name.as_str()))
            .ok_or_else(|| RadarError::UnknownLayer(requested.to_string()))
    }

    fn select_layers(&self, requested: &[String]) -> Result<Vec<LayerRef<'_>>, RadarError> {
        if requested.is_empty() {
            return Ok(self.enabled_layers().collect());
        }

        let mut selected: Vec<LayerRef<'_>> = Vec::with_capacity(requested.len());
        for name in requested {
            let layer = self.find_layer(name)?;
            if !selected.iter().any(|l| l.id == layer.id) {
                selected.push(layer);
            }
        }
        Ok(selected)
    }

    fn fetch_layer(
        &self,
        layer: &LayerRef<'_>,
        point: GeoPoint,
    ) -> Result<FetchedTile, RadarError> {
        self.fetch_tile(&layer.id, point, layer.source.zoom, layer.source.tile_size)
    }

    fn fetch_base_map(
        &self,
        base_map: &BaseMapConfig,
        point: GeoPoint,
    ) -> Result<FetchedTile, RadarError> {
        self.fetch_tile(BASE_MAP_LAYER, point, base_map.zoom, base_map.tile_size)
    }

    fn fetch_tile(
        &self,
        layer: &str,
        point: GeoPoint,
        zoom: u8,
        tile_size: u32,
    ) -> Result<FetchedTile, RadarError> {
        let address =
            to_tile_address(point, zoom, tile_size).map_err(|source| RadarError::Projection {
                layer: layer.to_string(),
                latitude: point.latitude,
                longitude: point.longitude,
                zoom,
                source,
            })?;

        let image = self
            .fetcher
            .fetch(layer, &address)
            .map_err(|source| RadarError::Fetch {
                layer: layer.to_string(),
                x: address.x,
                y: address.y,
                z: address.z,
                source,
            })?;

        debug!(
            layer,
            x = address.x,
            y = address.y,
            z = address.z,
            pixel_x = address.pixel_x,
            pixel_y = address.pixel_y,
            "Fetched tile"
        );
        Ok(FetchedTile { address, image })
    }

    fn classify_area(
        &self,
        layer: &LayerRef<'_>,
        tile: &FetchedTile,
        search_radius: u32,
    ) -> Result<AreaMatch, RadarError> {
        let address = &tile.address;
        let area = classify_area(
            &tile.image,
            &layer.source.legend,
            address.pixel_x,
            address.pixel_y,
            search_radius,
        )
        .map_err(|source| RadarError::Classify {
            layer: layer.id.clone(),
            x: address.x,
            y: address.y,
            z: address.z,
            source,
        })?;

        debug!(layer = %layer.id, matched_pixels = area.total(), "Classified area");
        Ok(area)
    }

    fn classify_point(
        &self,
        layer: &LayerRef<'_>,
        tile: &FetchedTile,
    ) -> Result<PointMatch, RadarError> {
        let address = &tile.address;
        let label = classify_point(
            &tile.image,
            &layer.source.legend,
            address.pixel_x,
            address.pixel_y,
        )
        .map_err(|source| RadarError::Classify {
            layer: layer.id.clone(),
            x: address.x,
            y: address.y,
            z: address.z,
            source,
        })?;

        debug!(layer = %layer.id, label = %label, "Classified point");
        Ok(label)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::composite::MARKER_COLOR;
    use crate::config::{BaseMapConfig, ImageryLayer, RadarSource};
    use crate::legend::Legend;
    use crate::provider::FetchError;
    use crate::radar::ErrorKind;
    use image::{Rgba, RgbaImage};
    use std::collections::HashMap;
    use std::sync::Mutex;

    const RED: Rgba<u8> = Rgba([255, 0, 0, 255]);
    const BLUE: Rgba<u8> = Rgba([0, 0, 255, 255]);
    const WHITE: Rgba<u8> = Rgba([255, 255, 255, 255]);

    /// Serves fixed rasters per layer id and records every call.
    struct MockFetcher {
        tiles: HashMap<String, Result<RgbaImage, FetchError>>,
        calls: Mutex<Vec<(String, TileAddress)>>,
    }

    impl MockFetcher {
        fn new() -> Self {
            Self {
                tiles: HashMap::new(),
                calls: Mutex::new(Vec::new()),
            }
        }

        fn with(mut self, layer: &str, image: RgbaImage) -> Self {
            self.tiles.insert(layer.to_string(), Ok(image));
            self
        }

        fn failing(mut self, layer: &str, error: FetchError) -> Self {
            self.tiles.insert(layer.to_string(), Err(error));
            self
        }

        fn calls(&self) -> Vec<(String, TileAddress)> {
            self.calls.lock().unwrap().clone()
        }
    }

    impl RasterFetcher for MockFetcher {
        fn fetch(&self, layer: &str, tile: &TileAddress) -> Result<RasterImage, FetchError> {
            self.calls.lock().unwrap().push((layer.to_string(), *tile));
            self.tiles
                .get(layer)
                .cloned()
                .unwrap_or_else(|| Err(FetchError::UnknownLayer(layer.to_string())))
        }
    }

    fn legend() -> Legend {
        Legend::from_hex([("rain", "#0000FF"), ("storm", "#FF0000")]).unwrap()
    }

    fn config() -> RadarConfig {
        let radar = RadarSource::new("radar", 8, legend())
            .with_layer(ImageryLayer::new("now", "https://radar/{z}/{x}/{y}"))
            .with_layer(ImageryLayer::new("+30m", "https://radar/30/{z}/{x}/{y}"));
        let storms = RadarSource::new("storms", 8, legend())
            .with_point_sampling(false)
            .with_opacity(0.5)
            .with_layer(ImageryLayer::new("cells", "https://storms/{z}/{x}/{y}"));
        let archive = RadarSource::new("archive", 8, legend())
            .with_enabled(false)
            .with_layer(ImageryLayer::new("old", "https://archive/{z}/{x}/{y}"));

        RadarConfig {
            sources: vec![radar, storms, archive],
            base_map: Some(BaseMapConfig::new("https://osm/{z}/{x}/{y}", 10)),
            ..RadarConfig::default()
        }
    }

    fn service(fetcher: MockFetcher) -> RadarService<MockFetcher> {
        RadarService::new(Arc::new(config()), fetcher)
    }

    fn turin() -> GeoPoint {
        GeoPoint::new(45.0, 7.0).unwrap()
    }

    fn all_layers() -> MockFetcher {
        MockFetcher::new()
            .with("radar - now", RgbaImage::from_pixel(256, 256, BLUE))
            .with("radar - +30m", RgbaImage::from_pixel(256, 256, RED))
            .with("storms - cells", RgbaImage::from_pixel(256, 256, WHITE))
            .with(BASE_MAP_LAYER, RgbaImage::from_pixel(256, 256, WHITE))
    }

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    // Layer resolution

    #[test]
    fn test_layer_names_skip_disabled_sources() {
        let service = service(MockFetcher::new());
        assert_eq!(
            service.layer_names(),
            vec!["radar - now", "radar - +30m", "storms - cells"]
        );
    }

    #[test]
    fn test_resolve_exact_then_substring() {
        let service = service(MockFetcher::new());

        assert_eq!(service.resolve_layer("radar - +30m").unwrap(), "radar - +30m");
        // First configured layer whose name occurs in the request
        assert_eq!(
            service.resolve_layer("european radar - now").unwrap(),
            "radar - now"
        );
        assert_eq!(service.resolve_layer("cells").unwrap(), "storms - cells");
        assert!(matches!(
            service.resolve_layer("lightning"),
            Err(RadarError::UnknownLayer(_))
        ));
    }

    #[test]
    fn test_disabled_layer_is_rejected() {
        let service = service(MockFetcher::new());
        let err = service.resolve_layer("archive - old").unwrap_err();
        assert!(matches!(err, RadarError::LayerDisabled(ref id) if id == "archive - old"));
        assert_eq!(err.kind(), ErrorKind::Configuration);
    }

    // sample_area

    #[test]
    fn test_sample_area_all_layers() {
        let service = service(all_layers());

        let result = service.sample_area(turin(), &[], 5).unwrap();
        assert_eq!(result.len(), 3);
        assert_eq!(result["radar - now"].get("rain"), Some(100));
        assert_eq!(result["radar - now"].get("storm"), Some(0));
        assert_eq!(result["radar - +30m"].get("storm"), Some(100));
        assert_eq!(result["storms - cells"].total(), 0);
    }

    #[test]
    fn test_sample_area_fetches_at_layer_zoom() {
        let fetcher = all_layers();
        let service = RadarService::new(Arc::new(config()), &fetcher);

        service.sample_area(turin(), &names(&["radar - now"]), 5).unwrap();

        let calls = fetcher.calls();
        assert_eq!(calls.len(), 1);
        let (layer, tile) = &calls[0];
        assert_eq!(layer, "radar - now");
        assert_eq!((tile.x, tile.y, tile.z), (132, 92, 8));
    }

    #[test]
    fn test_sample_area_unknown_layer_fetches_nothing() {
        let fetcher = all_layers();
        let service = RadarService::new(Arc::new(config()), &fetcher);

        let err = service
            .sample_area(turin(), &names(&["radar - now", "lightning"]), 5)
            .unwrap_err();
        assert!(matches!(err, RadarError::UnknownLayer(ref name) if name == "lightning"));
        assert!(fetcher.calls().is_empty());
    }

    #[test]
    fn test_sample_area_duplicate_requests_fetch_once() {
        let fetcher = all_layers();
        let service = RadarService::new(Arc::new(config()), &fetcher);

        let result = service
            .sample_area(turin(), &names(&["radar - now", "radar - now"]), 5)
            .unwrap();
        assert_eq!(result.len(), 1);
        assert_eq!(fetcher.calls().len(), 1);
    }

    #[test]
    fn test_fetch_failure_is_data_retrieval_error() {
        let fetcher = all_layers().failing(
            "radar - +30m",
            FetchError::Status {
                status: 502,
                url: "https://radar/30/8/132/92".to_string(),
            },
        );
        let service = service(fetcher);

        let err = service.sample_area(turin(), &[], 5).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::DataRetrieval);
        assert!(err.to_string().contains("radar - +30m"));
    }

    #[test]
    fn test_raster_smaller_than_window_is_classify_error() {
        let fetcher = MockFetcher::new().with("radar - now", RgbaImage::from_pixel(4, 4, BLUE));
        let service = service(fetcher);

        let err = service
            .sample_area(turin(), &names(&["radar - now"]), 5)
            .unwrap_err();
        assert!(matches!(err, RadarError::Classify { .. }));
        assert_eq!(err.kind(), ErrorKind::Validation);
    }

    #[test]
    fn test_unprojectable_point() {
        let service = service(all_layers());
        let err = service
            .sample_area(GeoPoint::new(89.0, 0.0).unwrap(), &[], 5)
            .unwrap_err();
        assert!(matches!(err, RadarError::Projection { zoom: 8, .. }));
        assert_eq!(err.kind(), ErrorKind::Validation);
    }

    // sample_point

    #[test]
    fn test_sample_point_skips_unsupported_sources() {
        let service = service(all_layers());

        let result = service.sample_point(turin(), &[]).unwrap();
        assert_eq!(result.len(), 2);
        assert_eq!(result["radar - now"], PointMatch::Label("rain".to_string()));
        assert_eq!(result["radar - +30m"], PointMatch::Label("storm".to_string()));
    }

    #[test]
    fn test_sample_point_explicit_unsupported_layer() {
        let fetcher = all_layers();
        let service = RadarService::new(Arc::new(config()), &fetcher);

        let err = service
            .sample_point(turin(), &names(&["storms - cells"]))
            .unwrap_err();
        assert!(matches!(err, RadarError::PointSamplingUnsupported(_)));
        assert!(fetcher.calls().is_empty());
    }

    #[test]
    fn test_sample_point_clear() {
        let fetcher = all_layers().with("radar - now", RgbaImage::from_pixel(256, 256, WHITE));
        let service = service(fetcher);

        let result = service.sample_point(turin(), &names(&["radar - now"])).unwrap();
        assert_eq!(result["radar - now"], PointMatch::Clear);
    }

    // nowcast and match_weather

    #[test]
    fn test_nowcast_groups_by_source() {
        let service = service(all_layers());

        let nowcast = service.nowcast(turin(), 5).unwrap();
        assert_eq!(nowcast.sources.len(), 2);

        let radar = &nowcast.sources[0];
        assert_eq!(radar.source_name, "radar");
        assert_eq!(radar.nowcasts.len(), 2);
        assert_eq!(radar.nowcasts[0].imagery_name, "now");
        assert_eq!(radar.nowcasts[0].point, Some(PointMatch::Label("rain".into())));
        assert_eq!(radar.nowcasts[1].area.get("storm"), Some(100));

        let storms = &nowcast.sources[1];
        assert_eq!(storms.source_name, "storms");
        assert_eq!(storms.nowcasts[0].point, None);
    }

    #[test]
    fn test_match_weather() {
        let service = service(all_layers());

        let matched = service
            .match_weather(turin(), &["rain", "storm", "hail"], 5)
            .unwrap();

        let rain = matched.get("rain").unwrap();
        assert!(rain.point_matched && rain.area_matched);
        assert_eq!(rain.matched_layers, vec!["radar - now"]);

        let storm = matched.get("storm").unwrap();
        assert_eq!(storm.matched_layers, vec!["radar - +30m"]);

        assert!(!matched.get("hail").unwrap().matched());
    }

    // render_preview

    #[test]
    fn test_preview_zoom_mismatch_fetches_nothing() {
        let mut config = config();
        config.sources[0].zoom = 10;
        config.base_map = Some(BaseMapConfig::new("https://osm/{z}/{x}/{y}", 6));
        let fetcher = all_layers();
        let service = RadarService::new(Arc::new(config), &fetcher);

        let err = service.render_preview(turin(), "radar - now").unwrap_err();
        assert!(matches!(
            err,
            RadarError::ZoomMismatch {
                radar_zoom: 10,
                base_zoom: 6,
                ..
            }
        ));
        assert_eq!(err.kind(), ErrorKind::Configuration);
        assert!(fetcher.calls().is_empty());
    }

    #[test]
    fn test_preview_without_base_map() {
        let mut config = config();
        config.base_map = None;
        let service = RadarService::new(Arc::new(config), all_layers());

        let err = service.render_preview(turin(), "radar - now").unwrap_err();
        assert!(matches!(err, RadarError::NoBaseMap));
    }

    #[test]
    fn test_preview_same_zoom_overlays_whole_tile() {
        let mut config = config();
        config.base_map = Some(BaseMapConfig::new("https://osm/{z}/{x}/{y}", 8));
        let service = RadarService::new(Arc::new(config), all_layers());

        let preview = service.render_preview(turin(), "radar - now").unwrap();
        assert_eq!(preview.dimensions(), (256, 256));

        let base = to_tile_address(turin(), 8, 256).unwrap();
        let (cx, cy) = (base.pixel_x, base.pixel_y);
        // Marker radius is unscaled at equal zoom
        assert_eq!(preview.get_pixel(cx - 4, cy), &MARKER_COLOR);
        assert_eq!(preview.get_pixel(cx, cy), &BLUE);
        assert_eq!(preview.get_pixel(0, 255), &BLUE);
    }

    #[test]
    fn test_preview_crops_and_scales_coarser_radar() {
        // At zoom 8 Turin lies in radar tile (132, 92); base tile (531, 368)
        // at zoom 10 covers radar pixels x 192..256, y 0..64 of that tile.
        let radar = RgbaImage::from_fn(256, 256, |x, y| if x >= 192 && y < 64 { BLUE } else { RED });
        let fetcher = all_layers().with("radar - now", radar);
        let service = RadarService::new(Arc::new(config()), &fetcher);

        let preview = service.render_preview(turin(), "radar - now").unwrap();
        assert_eq!(preview.dimensions(), (256, 256));

        let base = to_tile_address(turin(), 10, 256).unwrap();
        assert_eq!((base.x, base.y), (531, 368));
        let (cx, cy) = (base.pixel_x, base.pixel_y);
        let radius = 4 * 4;

        // Only the footprint was kept, stretched over the whole base tile
        for (x, y) in [(0, 0), (255, 0), (0, 255), (255, 255), (cx, cy)] {
            assert_eq!(preview.get_pixel(x, y), &BLUE, "({}, {})", x, y);
        }
        // Marker radius scaled by 2^(10 - 8)
        assert_eq!(preview.get_pixel(cx - radius, cy), &MARKER_COLOR);
        assert_eq!(preview.get_pixel(cx, cy - radius), &MARKER_COLOR);
        assert_eq!(preview.get_pixel(cx - 4, cy), &BLUE);

        let calls = fetcher.calls();
        assert_eq!(calls.len(), 2);
        assert!(calls.iter().any(|(l, t)| l == BASE_MAP_LAYER && t.z == 10));
        assert!(calls.iter().any(|(l, t)| l == "radar - now" && t.z == 8));
    }

    #[test]
    fn test_preview_base_tile_smaller_than_radar_pixel() {
        // From a zoom gap of 8 on, the base tile falls inside one 256 px
        // radar pixel: that pixel alone is stretched over the base tile.
        for (radar_zoom, base_zoom) in [(6, 14), (4, 13), (2, 12), (0, 14), (0, 22)] {
            let mut config = config();
            config.sources[0].zoom = radar_zoom;
            config.base_map = Some(BaseMapConfig::new("https://osm/{z}/{x}/{y}", base_zoom));

            let under = to_tile_address(turin(), radar_zoom, 256).unwrap();
            let radar = RgbaImage::from_fn(256, 256, |x, y| {
                if (x, y) == (under.pixel_x, under.pixel_y) {
                    BLUE
                } else {
                    RED
                }
            });
            let service = RadarService::new(
                Arc::new(config),
                all_layers().with("radar - now", radar),
            );

            let preview = service.render_preview(turin(), "radar - now").unwrap();
            assert_eq!(preview.dimensions(), (256, 256), "z{}/z{}", radar_zoom, base_zoom);
            // The scaled marker lies outside the tile at these gaps
            assert!(
                preview.pixels().all(|p| *p == BLUE),
                "z{}/z{}",
                radar_zoom,
                base_zoom
            );
        }
    }

    #[test]
    fn test_preview_resizes_larger_radar_tiles_at_same_zoom() {
        let mut config = config();
        config.sources[0].tile_size = 512;
        config.base_map = Some(BaseMapConfig::new("https://osm/{z}/{x}/{y}", 8));
        let radar = RgbaImage::from_fn(512, 512, |x, _| if x < 256 { BLUE } else { RED });
        let service = RadarService::new(
            Arc::new(config),
            all_layers().with("radar - now", radar),
        );

        let preview = service.render_preview(turin(), "radar - now").unwrap();

        // 512 px radar halved onto the 256 px base tile
        assert_eq!(preview.dimensions(), (256, 256));
        assert_eq!(preview.get_pixel(5, 10), &BLUE);
        assert_eq!(preview.get_pixel(120, 200), &BLUE);
        assert_eq!(preview.get_pixel(140, 200), &RED);
        assert_eq!(preview.get_pixel(250, 10), &RED);
    }

    #[test]
    fn test_preview_crops_larger_radar_tiles_across_zoom() {
        // Base tile (531, 368) at zoom 10 covers pixels x 384..512, y 0..128
        // of the 512 px radar tile (132, 92) at zoom 8.
        let mut config = config();
        config.sources[0].tile_size = 512;
        let radar =
            RgbaImage::from_fn(512, 512, |x, y| if x >= 384 && y < 128 { BLUE } else { RED });
        let service = RadarService::new(
            Arc::new(config),
            all_layers().with("radar - now", radar),
        );

        let preview = service.render_preview(turin(), "radar - now").unwrap();

        assert_eq!(preview.dimensions(), (256, 256));
        for (x, y) in [(0, 0), (255, 0), (0, 255), (255, 255), (128, 128)] {
            assert_eq!(preview.get_pixel(x, y), &BLUE, "({}, {})", x, y);
        }
    }

    #[test]
    fn test_preview_uses_source_opacity() {
        let mut config = config();
        config.sources[1].zoom = 10;
        let service = RadarService::new(
            Arc::new(config),
            all_layers().with("storms - cells", RgbaImage::from_pixel(256, 256, BLUE)),
        );

        let preview = service.render_preview(turin(), "storms - cells").unwrap();
        let pixel = preview.get_pixel(0, 0);
        // Half-transparent blue over white
        assert!((126..=128).contains(&pixel[0]));
        assert!(pixel[2] >= 254);
        assert!(pixel[3] >= 254);
    }

    #[test]
    fn test_preview_does_not_mutate_fetched_tiles() {
        let fetcher = all_layers();
        let service = RadarService::new(Arc::new(config()), &fetcher);

        service.render_preview(turin(), "radar - now").unwrap();

        let base = fetcher.tiles[BASE_MAP_LAYER].as_ref().unwrap();
        assert!(base.pixels().all(|p| *p == WHITE));
    }
}
