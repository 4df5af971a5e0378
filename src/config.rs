//! Configuration for parsing and reporting
//!
//! Loaded from TOML; every key is optional:
//!
//! ```toml
//! [parser]
//! template_directory = "src/main/java"
//! default_content_type = "raw"
//!
//! [report]
//! excerpt_max_chars = 120
//! ```

use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

use crate::model::{ContentType, DEFAULT_EXCERPT_MAX_CHARS};

/// Errors that can occur when loading or parsing configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Failed to parse config TOML: {0}")]
    ParseError(#[from] toml::de::Error),
}

/// Settings shared by the template parser and the report renderer
#[derive(Debug, Clone, PartialEq)]
pub struct InspectConfig {
    /// Base directory relative template paths resolve against; also the
    /// root the package name is derived from
    pub template_directory: PathBuf,
    /// Content type for templates whose file name carries no extension
    pub default_content_type: ContentType,
    /// Cap for excerpts and payload text in report lines
    pub excerpt_max_chars: usize,
}

impl Default for InspectConfig {
    fn default() -> Self {
        Self {
            template_directory: PathBuf::from("."),
            default_content_type: ContentType::Html,
            excerpt_max_chars: DEFAULT_EXCERPT_MAX_CHARS,
        }
    }
}

/// TOML structure for deserializing configuration
#[derive(Deserialize, Default)]
#[serde(deny_unknown_fields)]
struct TomlConfig {
    #[serde(default)]
    parser: TomlParser,
    #[serde(default)]
    report: TomlReport,
}

#[derive(Deserialize, Default)]
#[serde(deny_unknown_fields)]
struct TomlParser {
    template_directory: Option<PathBuf>,
    default_content_type: Option<ContentType>,
}

#[derive(Deserialize, Default)]
#[serde(deny_unknown_fields)]
struct TomlReport {
    excerpt_max_chars: Option<usize>,
}

impl InspectConfig {
    /// Create a new configuration with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Load configuration from a TOML file
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Load configuration from a TOML string
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let parsed: TomlConfig = toml::from_str(content)?;
        let defaults = Self::default();

        Ok(InspectConfig {
            template_directory: parsed
                .parser
                .template_directory
                .unwrap_or(defaults.template_directory),
            default_content_type: parsed
                .parser
                .default_content_type
                .unwrap_or(defaults.default_content_type),
            excerpt_max_chars: parsed
                .report
                .excerpt_max_chars
                .unwrap_or(defaults.excerpt_max_chars),
        })
    }

    /// Set the template directory
    pub fn with_template_directory(mut self, dir: impl Into<PathBuf>) -> Self {
        self.template_directory = dir.into();
        self
    }

    /// Set the fallback content type
    pub fn with_default_content_type(mut self, content_type: ContentType) -> Self {
        self.default_content_type = content_type;
        self
    }

    /// Set the excerpt cap
    pub fn with_excerpt_max_chars(mut self, max: usize) -> Self {
        self.excerpt_max_chars = max;
        self
    }
}
