//! CLI error handling with user-friendly messages.
//!
//! Centralizes error handling for the CLI, providing consistent formatting
//! and a non-zero exit code.

use std::fmt;
use std::path::PathBuf;
use std::process;

use nowcaster::config::ConfigFileError;
use nowcaster::coord::CoordError;
use nowcaster::provider::FetchError;
use nowcaster::radar::{ErrorKind, RadarError};

/// CLI-specific errors with user-friendly messages.
#[derive(Debug)]
pub enum CliError {
    /// Failed to initialize logging
    LoggingInit(String),
    /// Configuration file could not be loaded
    Config {
        path: PathBuf,
        error: ConfigFileError,
    },
    /// Latitude/longitude arguments are not a valid point
    Coordinate(CoordError),
    /// Failed to create the HTTP client
    HttpClient(FetchError),
    /// Radar request failed
    Radar(RadarError),
    /// Failed to serialize results
    Output(serde_json::Error),
    /// Failed to encode the preview image
    Encode(String),
    /// Failed to write output file
    FileWrite { path: String, error: std::io::Error },
}

impl CliError {
    /// Exit the process with an appropriate error message and code.
    pub fn exit(&self) -> ! {
        eprintln!("Error: {}", self);

        if let Some(hint) = self.hint() {
            eprintln!();
            eprintln!("{}", hint);
        }

        process::exit(1)
    }

    /// Follow-up advice printed after the error message, if any.
    pub fn hint(&self) -> Option<String> {
        match self {
            CliError::Config { path, .. } => Some(format!(
                "Check the configuration file at: {}",
                path.display()
            )),
            CliError::Radar(e) if e.kind() == ErrorKind::Configuration => {
                Some("Use 'nowcaster layers' to list the configured layers.".to_string())
            }
            _ => None,
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::LoggingInit(msg) => write!(f, "Failed to initialize logging: {}", msg),
            CliError::Config { error, .. } => write!(f, "Configuration error: {}", error),
            CliError::Coordinate(e) => write!(f, "Invalid coordinates: {}", e),
            CliError::HttpClient(e) => write!(f, "Failed to create HTTP client: {}", e),
            CliError::Radar(e) => write!(f, "{}", e),
            CliError::Output(e) => write!(f, "Failed to format results: {}", e),
            CliError::Encode(msg) => write!(f, "Failed to encode preview: {}", msg),
            CliError::FileWrite { path, error } => {
                write!(f, "Failed to write file '{}': {}", path, error)
            }
        }
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CliError::Config { error, .. } => Some(error),
            CliError::Coordinate(e) => Some(e),
            CliError::HttpClient(e) => Some(e),
            CliError::Radar(e) => Some(e),
            CliError::Output(e) => Some(e),
            CliError::FileWrite { error, .. } => Some(error),
            _ => None,
        }
    }
}

impl From<CoordError> for CliError {
    fn from(e: CoordError) -> Self {
        CliError::Coordinate(e)
    }
}

impl From<RadarError> for CliError {
    fn from(e: RadarError) -> Self {
        CliError::Radar(e)
    }
}

impl From<serde_json::Error> for CliError {
    fn from(e: serde_json::Error) -> Self {
        CliError::Output(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_radar_error_message_is_passed_through() {
        let err = CliError::from(RadarError::UnknownLayer("lightning".to_string()));
        assert_eq!(err.to_string(), "Unknown layer 'lightning'");
    }

    #[test]
    fn test_config_hint_names_the_loaded_file() {
        let err = CliError::Config {
            path: PathBuf::from("/srv/radar/custom.ini"),
            error: ConfigFileError::UnknownSection("radr".to_string()),
        };
        let hint = err.hint().unwrap();
        assert!(hint.contains("/srv/radar/custom.ini"), "{}", hint);
        assert!(err.to_string().contains("[radr]"));
    }

    #[test]
    fn test_layer_configuration_errors_hint_at_layers_command() {
        let err = CliError::from(RadarError::UnknownLayer("lightning".to_string()));
        assert!(err.hint().unwrap().contains("nowcaster layers"));
        assert!(CliError::Encode("png".to_string()).hint().is_none());
    }

    #[test]
    fn test_file_write_message() {
        let err = CliError::FileWrite {
            path: "/tmp/preview.png".to_string(),
            error: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        };
        assert!(err.to_string().contains("/tmp/preview.png"));
        assert!(std::error::Error::source(&err).is_some());
    }
}
