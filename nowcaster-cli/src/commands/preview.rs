//! Preview command - render a radar layer over the base map to a PNG file.

use std::path::PathBuf;
use std::time::Instant;

use crate::error::CliError;
use crate::runner::{geo_point, CliRunner};

/// Arguments for the preview command.
pub struct PreviewArgs {
    pub lat: f64,
    pub lon: f64,
    pub layer: String,
    pub output: PathBuf,
}

/// Run the preview command.
pub fn run(runner: &CliRunner, args: PreviewArgs) -> Result<(), CliError> {
    runner.log_startup("preview");
    let point = geo_point(args.lat, args.lon)?;
    let service = runner.create_service()?;

    let layer = service.resolve_layer(&args.layer)?;
    println!("Rendering '{}' at {}, {}", layer, args.lat, args.lon);

    let start = Instant::now();
    let preview = service.render_preview(point, &layer)?;
    println!("Rendered in {:.2}s", start.elapsed().as_secs_f64());

    runner.save_png(&args.output, &preview)
}
