//! Parsed template model: source references, syntax units and the aggregate

pub mod source_ref;
pub mod template;
pub mod unit;

pub use source_ref::{console_friendly_text, LineIndex, SourceRef, Span, DEFAULT_EXCERPT_MAX_CHARS};
pub use template::{Argument, ContentType, JavaImport, TemplateModel};
pub use unit::*;
