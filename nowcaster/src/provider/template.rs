//! Request templates with `{x}`, `{y}`, `{z}` tile placeholders.

use crate::config::{BaseMapConfig, ImageryLayer, RadarSource};
use crate::coord::TileAddress;

use super::http::TileRequest;

/// Substitutes the tile placeholders of `template`.
///
/// `{x}` is the tile column, `{y}` the tile row and `{z}` the zoom level.
/// Any other text, including unknown placeholders, is left untouched.
pub fn render_template(template: &str, tile: &TileAddress) -> String {
    template
        .replace("{x}", &tile.x.to_string())
        .replace("{y}", &tile.y.to_string())
        .replace("{z}", &tile.z.to_string())
}

/// Everything needed to request one layer's tiles.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EndpointTemplate {
    url: String,
    method: String,
    headers: Vec<(String, String)>,
    body: Option<String>,
    content_type: Option<String>,
}

impl EndpointTemplate {
    /// Creates a `GET` endpoint.
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            method: "GET".to_string(),
            headers: Vec::new(),
            body: None,
            content_type: None,
        }
    }

    /// Endpoint of one imagery layer, carrying its source's headers.
    pub fn for_layer(source: &RadarSource, layer: &ImageryLayer) -> Self {
        Self {
            url: layer.url.clone(),
            method: layer.method.clone(),
            headers: source.headers.clone(),
            body: layer.body.clone(),
            content_type: layer.content_type.clone(),
        }
    }

    /// Endpoint of the base map.
    pub fn for_base_map(base_map: &BaseMapConfig) -> Self {
        Self::get(base_map.url.clone()).with_headers(base_map.headers.clone())
    }

    /// Replaces the request headers (builder style).
    pub fn with_headers(mut self, headers: Vec<(String, String)>) -> Self {
        self.headers = headers;
        self
    }

    /// URL template.
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Renders the request for a tile.
    pub fn render(&self, tile: &TileAddress) -> TileRequest {
        TileRequest {
            url: render_template(&self.url, tile),
            method: self.method.clone(),
            headers: self.headers.clone(),
            body: self.body.as_ref().map(|b| render_template(b, tile)),
            content_type: self.content_type.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::legend::Legend;

    fn tile() -> TileAddress {
        TileAddress {
            x: 132,
            y: 92,
            z: 8,
            pixel_x: 12,
            pixel_y: 200,
        }
    }

    #[test]
    fn test_render_template() {
        assert_eq!(
            render_template("https://tiles.example.com/{z}/{x}/{y}.png", &tile()),
            "https://tiles.example.com/8/132/92.png"
        );
    }

    #[test]
    fn test_render_template_repeated_and_unknown_placeholders() {
        assert_eq!(
            render_template("{x}-{x}/{q}?zoom={z}", &tile()),
            "132-132/{q}?zoom=8"
        );
        assert_eq!(render_template("static.png", &tile()), "static.png");
    }

    #[test]
    fn test_layer_endpoint_renders_body_and_headers() {
        let mut source = RadarSource::new("radar", 8, Legend::default());
        source.headers = vec![("Referer".to_string(), "https://example.com".to_string())];
        let layer = ImageryLayer {
            name: "now".to_string(),
            url: "https://radar.example.com/tiles".to_string(),
            method: "POST".to_string(),
            body: Some("tile={z}/{x}/{y}".to_string()),
            content_type: Some("application/x-www-form-urlencoded".to_string()),
        };

        let request = EndpointTemplate::for_layer(&source, &layer).render(&tile());
        assert_eq!(request.url, "https://radar.example.com/tiles");
        assert_eq!(request.method, "POST");
        assert_eq!(request.body.as_deref(), Some("tile=8/132/92"));
        assert_eq!(request.headers, source.headers);
        assert_eq!(
            request.content_type.as_deref(),
            Some("application/x-www-form-urlencoded")
        );
    }

    #[test]
    fn test_base_map_endpoint() {
        let base_map = BaseMapConfig::new("https://osm.example.org/{z}/{x}/{y}.png", 10);
        let request = EndpointTemplate::for_base_map(&base_map).render(&tile());
        assert_eq!(request, TileRequest::get("https://osm.example.org/8/132/92.png"));
    }
}
