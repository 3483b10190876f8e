//! Weather query commands: `sample`, `point`, `nowcast` and `match`.
//!
//! All of them print their result as JSON on stdout.

use crate::error::CliError;
use crate::runner::{geo_point, CliRunner};

/// Arguments shared by the weather queries.
pub struct QueryArgs {
    pub lat: f64,
    pub lon: f64,
    /// Layers to query; empty means every enabled layer
    pub layers: Vec<String>,
    /// Area search radius override
    pub radius: Option<u32>,
}

/// Run the `sample` command: legend histogram around the point per layer.
pub fn run_sample(runner: &CliRunner, args: QueryArgs) -> Result<(), CliError> {
    runner.log_startup("sample");
    let point = geo_point(args.lat, args.lon)?;
    let service = runner.create_service()?;

    let areas = service.sample_area(point, &args.layers, runner.search_radius(args.radius))?;
    runner.print_json(&areas)
}

/// Run the `point` command: legend label at the exact point per layer.
pub fn run_point(runner: &CliRunner, args: QueryArgs) -> Result<(), CliError> {
    runner.log_startup("point");
    let point = geo_point(args.lat, args.lon)?;
    let service = runner.create_service()?;

    let labels = service.sample_point(point, &args.layers)?;
    runner.print_json(&labels)
}

/// Run the `nowcast` command: point and area results grouped by source.
pub fn run_nowcast(runner: &CliRunner, args: QueryArgs) -> Result<(), CliError> {
    runner.log_startup("nowcast");
    let point = geo_point(args.lat, args.lon)?;
    let service = runner.create_service()?;

    let nowcast = service.nowcast(point, runner.search_radius(args.radius))?;
    runner.print_json(&nowcast)
}

/// Run the `match` command: which weather types occur at the point.
pub fn run_match(
    runner: &CliRunner,
    args: QueryArgs,
    weather_types: &[String],
) -> Result<(), CliError> {
    runner.log_startup("match");
    let point = geo_point(args.lat, args.lon)?;
    let service = runner.create_service()?;

    let matched =
        service.match_weather(point, weather_types, runner.search_radius(args.radius))?;
    runner.print_json(&matched)
}
