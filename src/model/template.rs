//! The parsed template aggregate

use std::fmt;

use serde::Deserialize;

use super::source_ref::SourceRef;
use super::unit::TemplateUnit;

/// Declared content type of a template
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentType {
    #[default]
    Html,
    Raw,
}

impl ContentType {
    /// Parse an `@option contentType=` value or a file extension
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "html" | "htm" => Some(ContentType::Html),
            "raw" => Some(ContentType::Raw),
            _ => None,
        }
    }
}

impl fmt::Display for ContentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ContentType::Html => f.write_str("HTML"),
            ContentType::Raw => f.write_str("RAW"),
        }
    }
}

/// `@import <statement>`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JavaImport {
    pub statement: String,
    pub source_ref: SourceRef,
}

/// One declared template argument from `@args (...)`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Argument {
    pub type_name: String,
    pub name: String,
    pub source_ref: SourceRef,
}

/// Complete parsed representation of one template
///
/// Built once by the parser; the sequences are in document order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateModel {
    template_name: String,
    name: String,
    package_name: String,
    content_type: ContentType,
    imports: Vec<JavaImport>,
    arguments: Vec<Argument>,
    units: Vec<TemplateUnit>,
}

impl TemplateModel {
    pub fn new(
        template_name: impl Into<String>,
        name: impl Into<String>,
        package_name: impl Into<String>,
        content_type: ContentType,
        imports: Vec<JavaImport>,
        arguments: Vec<Argument>,
        units: Vec<TemplateUnit>,
    ) -> Self {
        Self {
            template_name: template_name.into(),
            name: name.into(),
            package_name: package_name.into(),
            content_type,
            imports,
            arguments,
            units,
        }
    }

    /// File name of the template, e.g. `index.rocker.html`
    pub fn template_name(&self) -> &str {
        &self.template_name
    }

    /// Display name, e.g. `index`
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn package_name(&self) -> &str {
        &self.package_name
    }

    pub fn content_type(&self) -> ContentType {
        self.content_type
    }

    pub fn imports(&self) -> &[JavaImport] {
        &self.imports
    }

    pub fn arguments(&self) -> &[Argument] {
        &self.arguments
    }

    pub fn units(&self) -> &[TemplateUnit] {
        &self.units
    }
}
