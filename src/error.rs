//! Error types for parsing and rendering

use ariadne::{Color, Label, Report, ReportKind, Source};
use thiserror::Error;

use crate::model::{SourceRef, Span, UnitKind};

/// Failure to turn a template source into a model
#[derive(Error, Debug)]
pub enum ParseError {
    /// The template could not be read
    #[error("{source_id}: unable to read template: {cause}")]
    SourceUnavailable {
        source_id: String,
        #[source]
        cause: std::io::Error,
    },

    /// The template was read but rejected by the grammar
    #[error("{source_id}:[{line},{column}] {message}")]
    Syntax {
        source_id: String,
        line: usize,
        column: usize,
        message: String,
        span: Span,
        expected: Vec<String>,
    },
}

impl ParseError {
    /// Identifier of the template the error belongs to
    pub fn source_id(&self) -> &str {
        match self {
            ParseError::SourceUnavailable { source_id, .. } => source_id,
            ParseError::Syntax { source_id, .. } => source_id,
        }
    }

    /// 1-based `(line, column)` of a syntax error
    pub fn location(&self) -> Option<(usize, usize)> {
        match self {
            ParseError::SourceUnavailable { .. } => None,
            ParseError::Syntax { line, column, .. } => Some((*line, *column)),
        }
    }

    /// Format the error with source context using ariadne
    ///
    /// Falls back to the plain message for I/O failures or when the report
    /// cannot be written.
    pub fn format(&self, source: &str) -> String {
        let ParseError::Syntax {
            source_id,
            message,
            span,
            expected,
            ..
        } = self
        else {
            return self.to_string();
        };

        let expected_str = if expected.is_empty() {
            String::new()
        } else {
            format!("\nExpected: {}", expected.join(", "))
        };

        // ariadne counts characters, the parser counts bytes
        let span = char_span(source, span);
        let filename = source_id.as_str();

        let mut buf = Vec::new();
        let written = Report::build(ReportKind::Error, filename, span.start)
            .with_message(message)
            .with_label(
                Label::new((filename, span))
                    .with_message(format!("{}{}", message, expected_str))
                    .with_color(Color::Red),
            )
            .finish()
            .write((filename, Source::from(source)), &mut buf);

        match written {
            Ok(()) => String::from_utf8_lossy(&buf).into_owned(),
            Err(_) => self.to_string(),
        }
    }
}

fn char_span(source: &str, span: &Span) -> Span {
    let to_char = |byte: usize| {
        let byte = byte.min(source.len());
        source
            .char_indices()
            .take_while(|(i, _)| *i < byte)
            .count()
    };
    let start = to_char(span.start);
    let end = to_char(span.end).max(start);
    start..end
}

/// Failure while producing a diagnostic report
#[derive(Error, Debug)]
pub enum RenderError {
    /// The renderer has no case for a unit kind present in the model
    #[error(
        "no report case for unit kind {kind} (unit #{index} at {source_ref}); \
         the unit taxonomy and the renderer are out of sync"
    )]
    TaxonomyDispatchMiss {
        kind: UnitKind,
        index: usize,
        source_ref: SourceRef,
    },
}

/// Errors that can occur during the inspect pipeline
#[derive(Error, Debug)]
pub enum InspectError {
    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Render(#[from] RenderError),
}
