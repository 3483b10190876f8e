//! Layers command - list configured radar sources and their layers.

use nowcaster::config::RadarConfig;

use crate::error::CliError;
use crate::runner::CliRunner;

/// Run the layers command.
pub fn run(runner: &CliRunner) -> Result<(), CliError> {
    let radar = &runner.config().radar;

    if radar.sources.is_empty() {
        println!("No radar sources configured in {}", runner.config_path().display());
        return Ok(());
    }

    for line in describe(radar) {
        println!("{}", line);
    }
    Ok(())
}

/// One line per source followed by its indented layers.
fn describe(radar: &RadarConfig) -> Vec<String> {
    let mut lines = Vec::new();

    for source in &radar.sources {
        let mut flags = Vec::new();
        if !source.enabled {
            flags.push("disabled");
        }
        if !source.point_sampling {
            flags.push("no point sampling");
        }
        let flags = if flags.is_empty() {
            String::new()
        } else {
            format!(" [{}]", flags.join(", "))
        };

        lines.push(format!(
            "{} (zoom {}, {} px, opacity {}){}",
            source.name, source.zoom, source.tile_size, source.opacity, flags
        ));
        for layer in &source.layers {
            lines.push(format!("  {}", source.qualified_name(layer)));
        }
    }

    match &radar.base_map {
        Some(base_map) => lines.push(format!("base map (zoom {})", base_map.zoom)),
        None => lines.push("base map: not configured".to_string()),
    }
    lines
}
