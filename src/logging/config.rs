//! Logging configuration
//!
//! Per-component log levels and output destinations for the converter.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

const VALID_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Global log level (trace, debug, info, warn, error)
    pub global_level: String,

    /// Enable console output
    pub console_output: bool,

    /// Directory for JSON log files (None = no file logging)
    pub log_directory: Option<PathBuf>,

    /// Include file location in logs
    pub include_file_location: bool,

    /// Level for the input readers
    pub reader_level: String,

    /// Level for the output writers
    pub writer_level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            global_level: "info".to_string(),
            console_output: true,
            log_directory: None,
            include_file_location: false,
            reader_level: "info".to_string(),
            writer_level: "info".to_string(),
        }
    }
}

impl LoggingConfig {
    /// Validate the configuration and provide helpful error messages
    pub fn validate(&self) -> Result<(), String> {
        for (name, level) in [
            ("global_level", &self.global_level),
            ("reader_level", &self.reader_level),
            ("writer_level", &self.writer_level),
        ] {
            if !VALID_LEVELS.contains(&level.as_str()) {
                return Err(format!(
                    "Invalid {}: {}. Must be one of: {:?}",
                    name, level, VALID_LEVELS
                ));
            }
        }

        if let Some(ref log_dir) = self.log_directory {
            if let Some(parent) = log_dir.parent() {
                if !parent.as_os_str().is_empty() && !parent.exists() {
                    return Err(format!("Log directory parent does not exist: {:?}", parent));
                }
            }
        }

        Ok(())
    }

    /// Get the effective log level for a specific component
    pub fn get_component_level(&self, component: &str) -> &str {
        match component {
            "reader" | "readers" => &self.reader_level,
            "writer" | "writers" => &self.writer_level,
            _ => &self.global_level,
        }
    }

    /// `EnvFilter` directives: the global level plus overrides for the library's components
    pub fn filter_directives(&self, crate_name: &str) -> String {
        format!(
            "{},{crate_name}::readers={},{crate_name}::data={},{crate_name}::writers={}",
            self.global_level,
            self.get_component_level("readers"),
            self.get_component_level("readers"),
            self.get_component_level("writers"),
        )
    }
}
