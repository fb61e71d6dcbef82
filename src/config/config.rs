//! Config file handling
//!
//! `<config dir>/config.toml`:
//!
//! ```toml
//! [defaults]
//! options = ["--no-color"]
//!
//! [parsing]
//! max_upload_files = 20
//!
//! [output]
//! json = false
//! ```

use std::path::{Path, PathBuf};

use crate::context::Environment;
use crate::errors::CurlsharpError;
use crate::parser::{ParsingOptions, DEFAULT_MAX_UPLOAD_FILES};

/// curlsharp configuration
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub config_dir: PathBuf,
    /// Flags prepended to every invocation
    pub default_options: Vec<String>,
    pub max_upload_files: usize,
    /// Print the JSON response shape by default
    pub json_output: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            config_dir: crate::context::environment::default_config_dir(),
            default_options: Vec::new(),
            max_upload_files: DEFAULT_MAX_UPLOAD_FILES,
            json_output: false,
        }
    }
}

impl Config {
    /// Load configuration from the config file (TOML format)
    ///
    /// A missing file gives the defaults.
    pub fn load(env: &Environment) -> Result<Self, CurlsharpError> {
        Self::load_from(&env.config_dir)
    }

    pub fn load_from(config_dir: &Path) -> Result<Self, CurlsharpError> {
        let config_file = config_dir.join("config.toml");
        let defaults = Self {
            config_dir: config_dir.to_path_buf(),
            ..Self::default()
        };

        if !config_file.exists() {
            return Ok(defaults);
        }

        let content = std::fs::read_to_string(&config_file)
            .map_err(|e| CurlsharpError::Config(format!("Failed to read config: {}", e)))?;

        let toml_value: toml::Value = toml::from_str(&content)
            .map_err(|e| CurlsharpError::Config(format!("Invalid config TOML: {}", e)))?;

        let default_options = toml_value
            .get("defaults")
            .and_then(|d| d.get("options"))
            .and_then(|v| v.as_array())
            .map(|arr| {
                arr.iter()
                    .filter_map(|v| v.as_str().map(String::from))
                    .collect()
            })
            .unwrap_or_default();

        let max_upload_files = match toml_value
            .get("parsing")
            .and_then(|p| p.get("max_upload_files"))
        {
            None => defaults.max_upload_files,
            Some(value) => value
                .as_integer()
                .and_then(|n| usize::try_from(n).ok())
                .filter(|n| *n > 0)
                .ok_or_else(|| {
                    CurlsharpError::Config(
                        "parsing.max_upload_files must be a positive integer".to_string(),
                    )
                })?,
        };

        let json_output = toml_value
            .get("output")
            .and_then(|o| o.get("json"))
            .and_then(|v| v.as_bool())
            .unwrap_or(false);

        Ok(Self {
            default_options,
            max_upload_files,
            json_output,
            ..defaults
        })
    }

    pub fn parsing_options(&self) -> ParsingOptions {
        ParsingOptions {
            max_upload_files: self.max_upload_files,
        }
    }
}
