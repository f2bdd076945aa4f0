use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use crate::logging::LoggingConfig;

/// Environment variable naming an optional configuration file.
pub const CONFIG_ENV_VAR: &str = "LMKCONV_CONFIG";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub conversion: ConversionConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ConversionConfig {
    /// Fail on the first structural problem instead of warning and continuing.
    pub strict_format: bool,
    /// Fail when an input, header or output document cannot be opened.
    pub strict_io: bool,
    /// Extension of the image header document next to each image.
    pub header_extension: String,
    /// Windows drive letter to local root, applied to image paths in point-pair files.
    pub drive_map: BTreeMap<String, String>,
}

impl Default for ConversionConfig {
    fn default() -> Self {
        Self {
            strict_format: false,
            strict_io: false,
            header_extension: "mhd".to_string(),
            drive_map: BTreeMap::new(),
        }
    }
}

impl Config {
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, Box<dyn std::error::Error>> {
        let content = fs::read_to_string(path)?;

        if content.trim_start().starts_with('{') {
            Ok(serde_json::from_str(&content)?)
        } else {
            Ok(toml::from_str(&content)?)
        }
    }

    pub fn validate(&self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();

        let extension = &self.conversion.header_extension;
        if extension.is_empty() || extension.contains(['.', '/', '\\']) {
            errors.push(format!(
                "header_extension must be a bare extension such as \"mhd\", got {:?}",
                extension
            ));
        }

        for drive in self.conversion.drive_map.keys() {
            let mut chars = drive.chars();
            let valid = matches!((chars.next(), chars.next()), (Some(c), None) if c.is_ascii_alphabetic());
            if !valid {
                errors.push(format!("drive_map key {:?} is not a single drive letter", drive));
            }
        }

        if let Err(e) = self.logging.validate() {
            errors.push(e);
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

/// Load the configuration at `config_path`, falling back to defaults on any problem.
///
/// Logging is not up yet when this runs, so problems go to stderr.
pub fn load_config_or_default(config_path: Option<&str>) -> Config {
    match config_path {
        Some(path) => {
            match Config::load_from_file(path) {
                Ok(config) => {
                    if let Err(errors) = config.validate() {
                        eprintln!("Configuration validation errors:");
                        for error in errors {
                            eprintln!("  - {}", error);
                        }
                        eprintln!("Using default configuration instead.");
                        Config::default()
                    } else {
                        config
                    }
                }
                Err(e) => {
                    eprintln!("Failed to load config from '{}': {}", path, e);
                    eprintln!("Using default configuration.");
                    Config::default()
                }
            }
        }
        None => Config::default(),
    }
}
