//! Raster fetcher backed by slippy-map tile servers.

use std::collections::HashMap;

use tracing::debug;

use crate::config::RadarConfig;
use crate::coord::TileAddress;
use crate::raster::{self, RasterImage};

use super::http::HttpClient;
use super::template::EndpointTemplate;
use super::types::{FetchError, RasterFetcher, BASE_MAP_LAYER};

/// Fetches tiles over HTTP and decodes them.
///
/// Each layer id maps to an [`EndpointTemplate`]; the tile address fills its
/// placeholders.
///
/// # Example
///
/// ```no_run
/// use nowcaster::config::ConfigFile;
/// use nowcaster::provider::{ReqwestClient, TileServerFetcher};
///
/// let config = ConfigFile::load().unwrap();
/// let client = ReqwestClient::with_timeout(config.http.timeout).unwrap();
/// let fetcher = TileServerFetcher::from_config(client, &config.radar);
/// ```
pub struct TileServerFetcher<C: HttpClient> {
    http_client: C,
    endpoints: HashMap<String, EndpointTemplate>,
}

impl<C: HttpClient> TileServerFetcher<C> {
    /// Creates a fetcher without endpoints.
    pub fn new(http_client: C) -> Self {
        Self {
            http_client,
            endpoints: HashMap::new(),
        }
    }

    /// Registers an endpoint for every layer of every source, plus the base
    /// map under [`BASE_MAP_LAYER`].
    ///
    /// Disabled sources are registered too; the radar service never asks
    /// for them.
    pub fn from_config(http_client: C, config: &RadarConfig) -> Self {
        let mut fetcher = Self::new(http_client);
        for source in &config.sources {
            for layer in &source.layers {
                fetcher = fetcher.with_endpoint(
                    source.qualified_name(layer),
                    EndpointTemplate::for_layer(source, layer),
                );
            }
        }
        if let Some(base_map) = &config.base_map {
            fetcher = fetcher.with_endpoint(BASE_MAP_LAYER, EndpointTemplate::for_base_map(base_map));
        }
        fetcher
    }

    /// Registers or replaces the endpoint of a layer (builder style).
    pub fn with_endpoint(mut self, layer: impl Into<String>, endpoint: EndpointTemplate) -> Self {
        self.endpoints.insert(layer.into(), endpoint);
        self
    }

    /// Whether an endpoint is registered for `layer`.
    pub fn has_endpoint(&self, layer: &str) -> bool {
        self.endpoints.contains_key(layer)
    }
}

impl<C: HttpClient> RasterFetcher for TileServerFetcher<C> {
    fn fetch(&self, layer: &str, tile: &TileAddress) -> Result<RasterImage, FetchError> {
        let endpoint = self
            .endpoints
            .get(layer)
            .ok_or_else(|| FetchError::UnknownLayer(layer.to_string()))?;

        let request = endpoint.render(tile);
        debug!(
            layer = layer,
            url = %request.url,
            method = %request.method,
            x = tile.x,
            y = tile.y,
            z = tile.z,
            "Fetching raster tile"
        );

        let bytes = self.http_client.execute(&request)?;
        let image = raster::decode(&bytes).map_err(|e| FetchError::Decode {
            url: request.url.clone(),
            reason: e.to_string(),
        })?;

        debug!(
            layer = layer,
            width = image.width(),
            height = image.height(),
            bytes = bytes.len(),
            "Decoded raster tile"
        );
        Ok(image)
    }
}
