//! Parser for Rocker-style templates
//!
//! The [`scanner`] splits template text into header directives and body
//! units; Java fragments inside directives go through the [`lexer`] and
//! [`grammar`].

mod grammar;
pub mod lexer;
mod scanner;

use std::path::{Component, Path, PathBuf};

use crate::config::InspectConfig;
use crate::error::ParseError;
use crate::model::{ContentType, TemplateModel};

use scanner::Scanner;

/// Turns template files or buffers into [`TemplateModel`]s
#[derive(Debug, Clone, Default)]
pub struct TemplateParser {
    config: InspectConfig,
}

/// Names derived from a template's path
#[derive(Debug, Clone, PartialEq)]
struct Identity {
    template_name: String,
    name: String,
    package_name: String,
    /// From the file extension; `None` when there is none
    content_type: Option<ContentType>,
}

impl Identity {
    fn from_path(template_path: &Path) -> Self {
        let template_name = template_path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        let name = template_name
            .split('.')
            .next()
            .unwrap_or_default()
            .to_string();

        let content_type = template_name
            .rsplit_once('.')
            .map(|(_, ext)| match ext.to_ascii_lowercase().as_str() {
                "html" | "htm" => ContentType::Html,
                _ => ContentType::Raw,
            });

        let package_name = template_path
            .parent()
            .map(|dir| {
                dir.components()
                    .filter_map(|c| match c {
                        Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
                        _ => None,
                    })
                    .collect::<Vec<_>>()
                    .join(".")
            })
            .unwrap_or_default();

        Identity {
            template_name,
            name,
            package_name,
            content_type,
        }
    }
}

impl TemplateParser {
    pub fn new(config: InspectConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &InspectConfig {
        &self.config
    }

    /// Read and parse a template file
    ///
    /// Relative paths resolve against the configured template directory.
    /// The package name is derived from the path below that directory.
    pub fn parse_file(&self, path: &Path) -> Result<TemplateModel, ParseError> {
        let source = self.read_template(path)?;
        self.parse_source(path, &source)
    }

    /// Read a template file without parsing it
    ///
    /// Errors carry `path` as given, like those of [`parse_file`](Self::parse_file).
    pub fn read_template(&self, path: &Path) -> Result<String, ParseError> {
        let full_path = self.config.template_directory.join(path);
        tracing::debug!(path = %full_path.display(), "reading template");
        std::fs::read_to_string(&full_path).map_err(|cause| ParseError::SourceUnavailable {
            source_id: path.display().to_string(),
            cause,
        })
    }

    /// Parse `source` as the contents of the template file at `path`
    ///
    /// Identity and error locations are those [`parse_file`](Self::parse_file)
    /// would produce; the file itself is not read.
    pub fn parse_source(&self, path: &Path, source: &str) -> Result<TemplateModel, ParseError> {
        let relative: PathBuf = if path.is_relative() {
            path.to_path_buf()
        } else {
            match path.strip_prefix(&self.config.template_directory) {
                Ok(rel) => rel.to_path_buf(),
                // Outside the template directory: no package
                Err(_) => path.file_name().map(PathBuf::from).unwrap_or_default(),
            }
        };

        let source_id = path.display().to_string();
        self.parse_with_identity(source, &source_id, Identity::from_path(&relative))
    }

    /// Parse an in-memory template
    ///
    /// `template_path` is relative to the template directory; it names
    /// the template in the model and in error messages.
    pub fn parse_str(
        &self,
        source: &str,
        template_path: &str,
    ) -> Result<TemplateModel, ParseError> {
        let identity = Identity::from_path(Path::new(template_path));
        self.parse_with_identity(source, template_path, identity)
    }

    fn parse_with_identity(
        &self,
        source: &str,
        source_id: &str,
        identity: Identity,
    ) -> Result<TemplateModel, ParseError> {
        let scanned = Scanner::new(source, source_id).scan()?;

        // @option wins over the extension, which wins over the default
        let content_type = scanned
            .content_type
            .or(identity.content_type)
            .unwrap_or(self.config.default_content_type);

        tracing::debug!(
            template = %identity.template_name,
            package = %identity.package_name,
            %content_type,
            "parsed template"
        );

        Ok(TemplateModel::new(
            identity.template_name,
            identity.name,
            identity.package_name,
            content_type,
            scanned.imports,
            scanned.arguments,
            scanned.units,
        ))
    }
}
