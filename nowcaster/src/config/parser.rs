//! INI parsing logic for converting `Ini` → `ConfigFile`.
//!
//! This is the single place where INI section and key names are mapped to
//! struct fields. Radar sources are spread over several sections sharing the
//! `source.<name>` prefix:
//!
//! ```ini
//! [source.radar]              ; zoom, tile_size, opacity, point_sampling, enabled
//! [source.radar.headers]      ; header = value
//! [source.radar.legend]       ; label = #RRGGBB or #AARRGGBB
//! [source.radar.layer.now]    ; url, method, body, content_type
//! ```

use std::path::PathBuf;
use std::str::FromStr;

use ini::{Ini, Properties};

use super::file::ConfigFileError;
use super::settings::{BaseMapConfig, ConfigFile, ImageryLayer, RadarSource, DEFAULT_METHOD};
use crate::coord::{DEFAULT_TILE_SIZE, MAX_ZOOM};
use crate::legend::{Legend, LegendError};

const SOURCE_PREFIX: &str = "source.";
const LAYER_PREFIX: &str = "layer.";
const KNOWN_SECTIONS: &[&str] = &["engine", "http", "logging", "basemap", "basemap.headers"];

/// Parse an `Ini` object into a `ConfigFile`.
///
/// Starts from `ConfigFile::default()` and overlays any values found in the INI.
pub(super) fn parse_ini(ini: &Ini) -> Result<ConfigFile, ConfigFileError> {
    let mut config = ConfigFile::default();

    // [engine] section
    if let Some(section) = ini.section(Some("engine")) {
        if let Some(v) = section.get("search_radius") {
            config.radar.search_radius =
                parse_value(v, "engine", "search_radius", "must be a non-negative integer (pixels)")?;
        }
        if let Some(v) = section.get("marker_radius") {
            config.radar.marker_radius =
                parse_value(v, "engine", "marker_radius", "must be a non-negative integer (pixels)")?;
        }
    }

    // [http] section
    if let Some(section) = ini.section(Some("http")) {
        if let Some(v) = section.get("timeout") {
            let timeout: u64 =
                parse_value(v, "http", "timeout", "must be a positive integer (seconds)")?;
            if timeout == 0 {
                return Err(invalid("http", "timeout", v, "must be a positive integer (seconds)"));
            }
            config.http.timeout = timeout;
        }
    }

    // [logging] section
    if let Some(section) = ini.section(Some("logging")) {
        if let Some(v) = section.get("file") {
            let v = v.trim();
            if !v.is_empty() {
                config.logging.file = expand_tilde(v);
            }
        }
    }

    // [basemap] section
    if let Some(section) = ini.section(Some("basemap")) {
        let mut base_map = parse_base_map(section)?;
        if let Some(headers) = ini.section(Some("basemap.headers")) {
            base_map.headers = collect_pairs(headers);
        }
        config.radar.base_map = Some(base_map);
    }

    // [source.*] sections
    config.radar.sources = parse_sources(ini)?;

    Ok(config)
}

fn parse_base_map(section: &Properties) -> Result<BaseMapConfig, ConfigFileError> {
    let url = required(section, "basemap", "url")?;
    let zoom = parse_zoom(required(section, "basemap", "zoom")?, "basemap", "zoom")?;

    let mut base_map = BaseMapConfig::new(url, zoom);
    if let Some(v) = section.get("tile_size") {
        base_map.tile_size = parse_tile_size(v, "basemap")?;
    }
    Ok(base_map)
}

/// Sections collected for one source before validation.
struct SourceDraft<'a> {
    name: String,
    settings: Option<&'a Properties>,
    headers: Vec<(String, String)>,
    legend: Vec<(String, String)>,
    layers: Vec<ImageryLayer>,
}

impl<'a> SourceDraft<'a> {
    fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            settings: None,
            headers: Vec::new(),
            legend: Vec::new(),
            layers: Vec::new(),
        }
    }

    fn section_name(&self) -> String {
        format!("{}{}", SOURCE_PREFIX, self.name)
    }

    fn build(self) -> Result<RadarSource, ConfigFileError> {
        let section_name = self.section_name();
        let settings = self.settings.ok_or_else(|| ConfigFileError::MissingValue {
            section: section_name.clone(),
            key: "zoom".to_string(),
        })?;

        let zoom = parse_zoom(required(settings, &section_name, "zoom")?, &section_name, "zoom")?;
        let legend = build_legend(&section_name, self.legend)?;

        let mut source = RadarSource::new(self.name, zoom, legend);
        source.headers = self.headers;
        source.layers = self.layers;

        if let Some(v) = settings.get("tile_size") {
            source.tile_size = parse_tile_size(v, &section_name)?;
        }
        if let Some(v) = settings.get("opacity") {
            source.opacity = parse_opacity(v, &section_name)?;
        }
        if let Some(v) = settings.get("point_sampling") {
            source.point_sampling = parse_bool(v, &section_name, "point_sampling")?;
        }
        if let Some(v) = settings.get("enabled") {
            source.enabled = parse_bool(v, &section_name, "enabled")?;
        }

        if source.layers.is_empty() {
            tracing::warn!(source = %source.name, "Radar source has no imagery layers");
        }
        if source.legend.is_empty() {
            tracing::warn!(source = %source.name, "Radar source has an empty legend");
        }

        Ok(source)
    }
}

fn parse_sources(ini: &Ini) -> Result<Vec<RadarSource>, ConfigFileError> {
    let mut drafts: Vec<SourceDraft<'_>> = Vec::new();

    for (name, section) in ini.iter() {
        let Some(name) = name else {
            continue;
        };
        let Some(rest) = name.strip_prefix(SOURCE_PREFIX) else {
            if !KNOWN_SECTIONS.contains(&name) {
                return Err(ConfigFileError::UnknownSection(name.to_string()));
            }
            continue;
        };

        let (source_name, part) = match rest.split_once('.') {
            Some((source_name, part)) => (source_name, Some(part)),
            None => (rest, None),
        };
        if source_name.is_empty() {
            return Err(ConfigFileError::UnknownSection(name.to_string()));
        }

        let index = match drafts.iter().position(|d| d.name == source_name) {
            Some(index) => index,
            None => {
                drafts.push(SourceDraft::new(source_name));
                drafts.len() - 1
            }
        };
        let draft = &mut drafts[index];

        match part {
            None => draft.settings = Some(section),
            Some("headers") => draft.headers.extend(collect_pairs(section)),
            Some("legend") => draft.legend.extend(collect_pairs(section)),
            Some(part) => {
                let layer_name = part
                    .strip_prefix(LAYER_PREFIX)
                    .filter(|l| !l.is_empty())
                    .ok_or_else(|| ConfigFileError::UnknownSection(name.to_string()))?;
                if draft.layers.iter().any(|l| l.name == layer_name) {
                    return Err(invalid(name, "name", layer_name, "duplicate layer name"));
                }
                draft.layers.push(parse_layer(name, layer_name, section)?);
            }
        }
    }

    drafts.into_iter().map(SourceDraft::build).collect()
}

fn parse_layer(
    section_name: &str,
    layer_name: &str,
    section: &Properties,
) -> Result<ImageryLayer, ConfigFileError> {
    let url = required(section, section_name, "url")?;
    let mut layer = ImageryLayer::new(layer_name, url);

    if let Some(v) = section.get("method") {
        let method = v.trim().to_uppercase();
        if method.is_empty() || !method.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(invalid(
                section_name,
                "method",
                v,
                "must be an HTTP method such as GET or POST",
            ));
        }
        layer.method = method;
    } else {
        layer.method = DEFAULT_METHOD.to_string();
    }

    layer.body = non_empty(section.get("body"));
    layer.content_type = non_empty(section.get("content_type"));
    Ok(layer)
}

fn build_legend(
    section_name: &str,
    entries: Vec<(String, String)>,
) -> Result<Legend, ConfigFileError> {
    let legend_section = format!("{}.legend", section_name);
    Legend::from_hex(entries).map_err(|e| match e {
        LegendError::InvalidColor { label, color } => ConfigFileError::InvalidValue {
            section: legend_section,
            key: label,
            value: color,
            reason: "expected #RRGGBB or #AARRGGBB".to_string(),
        },
        LegendError::DuplicateLabel(label) => ConfigFileError::InvalidValue {
            section: legend_section,
            key: label.clone(),
            value: label,
            reason: "duplicate legend label".to_string(),
        },
        other => ConfigFileError::InvalidValue {
            section: legend_section,
            key: String::new(),
            value: String::new(),
            reason: other.to_string(),
        },
    })
}

fn collect_pairs(section: &Properties) -> Vec<(String, String)> {
    section
        .iter()
        .map(|(k, v)| (k.trim().to_string(), v.trim().to_string()))
        .collect()
}

fn required<'a>(
    section: &'a Properties,
    name: &str,
    key: &str,
) -> Result<&'a str, ConfigFileError> {
    section
        .get(key)
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .ok_or_else(|| ConfigFileError::MissingValue {
            section: name.to_string(),
            key: key.to_string(),
        })
}

fn non_empty(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

fn invalid(section: &str, key: &str, value: &str, reason: &str) -> ConfigFileError {
    ConfigFileError::InvalidValue {
        section: section.to_string(),
        key: key.to_string(),
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

fn parse_value<T: FromStr>(
    value: &str,
    section: &str,
    key: &str,
    reason: &str,
) -> Result<T, ConfigFileError> {
    value
        .trim()
        .parse()
        .map_err(|_| invalid(section, key, value, reason))
}

fn parse_zoom(value: &str, section: &str, key: &str) -> Result<u8, ConfigFileError> {
    let reason = "must be an integer between 0 and 22";
    let zoom: u8 = parse_value(value, section, key, reason)?;
    if zoom > MAX_ZOOM {
        return Err(invalid(section, key, value, reason));
    }
    Ok(zoom)
}

fn parse_tile_size(value: &str, section: &str) -> Result<u32, ConfigFileError> {
    let reason = "must be a positive integer (pixels)";
    let size: u32 = parse_value(value, section, "tile_size", reason)?;
    if size == 0 {
        return Err(invalid(section, "tile_size", value, reason));
    }
    Ok(size)
}

fn parse_opacity(value: &str, section: &str) -> Result<f32, ConfigFileError> {
    let reason = "must be a number between 0.0 and 1.0";
    let opacity: f32 = parse_value(value, section, "opacity", reason)?;
    if !opacity.is_finite() || !(0.0..=1.0).contains(&opacity) {
        return Err(invalid(section, "opacity", value, reason));
    }
    Ok(opacity)
}

fn parse_bool(value: &str, section: &str, key: &str) -> Result<bool, ConfigFileError> {
    match value.trim().to_lowercase().as_str() {
        "true" | "yes" | "on" | "1" => Ok(true),
        "false" | "no" | "off" | "0" => Ok(false),
        _ => Err(invalid(section, key, value, "must be true or false")),
    }
}

/// Expands a leading `~/` to the user's home directory.
pub(super) fn expand_tilde(path: &str) -> PathBuf {
    if let Some(stripped) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(stripped);
        }
    }
    PathBuf::from(path)
}
