//! Configuration CLI commands.
//!
//! Provides `config path` and `config check`.

use std::path::Path;

use clap::Subcommand;
use nowcaster::config::ConfigFile;

use crate::error::CliError;
use crate::runner::CliRunner;

/// Config subcommands.
#[derive(Debug, Subcommand)]
pub enum ConfigCommands {
    /// Show the configuration file path
    Path,

    /// Validate the configuration file and summarize it
    Check,
}

/// Show the configuration file path.
///
/// Works without a readable configuration, so it does not need a runner.
pub fn run_path(path: &Path) -> Result<(), CliError> {
    println!("{}", path.display());
    Ok(())
}

/// Validate the configuration and print a summary.
pub fn run_check(runner: &CliRunner) -> Result<(), CliError> {
    // The runner only exists if loading succeeded
    for line in summary(runner.config()) {
        println!("{}", line);
    }
    Ok(())
}

fn summary(config: &ConfigFile) -> Vec<String> {
    let radar = &config.radar;
    let layers: usize = radar.sources.iter().map(|s| s.layers.len()).sum();

    vec![
        "Configuration OK".to_string(),
        format!("  sources:       {}", radar.sources.len()),
        format!("  layers:        {}", layers),
        format!("  enabled:       {}", radar.enabled_layers().count()),
        format!("  search radius: {} px", radar.search_radius),
        format!("  marker radius: {} px", radar.marker_radius),
        format!("  http timeout:  {} s", config.http.timeout),
        format!("  log file:      {}", config.logging.file.display()),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary_of_defaults() {
        let lines = summary(&ConfigFile::default());
        assert_eq!(lines[0], "Configuration OK");
        assert_eq!(lines[1], "  sources:       0");
        assert_eq!(lines[5], "  marker radius: 4 px");
    }
}
