//! Rocker Inspect - diagnostic dumps of parsed Rocker-style templates
//!
//! This library provides a template parser, the parsed template model, and
//! a renderer that prints every syntax unit with its source location.
//!
//! # Example
//!
//! ```rust
//! use rocker_inspect::inspect_str;
//!
//! let report = inspect_str("Hello @name!", "views/hello.rocker.html").unwrap();
//! assert!(report.contains("value: name"));
//! assert!(report.contains(" src (@ [1,7]): [@name]"));
//! ```

pub mod config;
pub mod error;
pub mod model;
pub mod parser;
pub mod report;

use std::path::Path;

pub use config::{ConfigError, InspectConfig};
pub use error::{InspectError, ParseError, RenderError};
pub use model::{ContentType, SourceRef, TemplateModel, TemplateUnit, UnitKind};
pub use parser::TemplateParser;
pub use report::{DiagnosticSink, Renderer, TracingSink};

/// Parse and report an in-memory template with default configuration
pub fn inspect_str(source: &str, template_path: &str) -> Result<String, InspectError> {
    inspect_str_with_config(source, template_path, &InspectConfig::default())
}

/// Parse and report an in-memory template
pub fn inspect_str_with_config(
    source: &str,
    template_path: &str,
    config: &InspectConfig,
) -> Result<String, InspectError> {
    let model = TemplateParser::new(config.clone()).parse_str(source, template_path)?;
    Ok(Renderer::new(config).render_to_string(&model)?)
}

/// Read, parse and report a template file
///
/// Relative paths resolve against [`InspectConfig::template_directory`].
///
/// # Example
///
/// ```rust
/// use rocker_inspect::{inspect_file, InspectConfig, InspectError, ParseError};
///
/// let err = inspect_file("does/not/exist.rocker.html", &InspectConfig::default()).unwrap_err();
/// assert!(matches!(err, InspectError::Parse(ParseError::SourceUnavailable { .. })));
/// ```
pub fn inspect_file(
    path: impl AsRef<Path>,
    config: &InspectConfig,
) -> Result<String, InspectError> {
    let model = TemplateParser::new(config.clone()).parse_file(path.as_ref())?;
    Ok(Renderer::new(config).render_to_string(&model)?)
}
