//! Source locations attached to every model entity

use std::fmt;

/// Byte range in source text
pub type Span = std::ops::Range<usize>;

/// Default cap for excerpts printed on a single console line
pub const DEFAULT_EXCERPT_MAX_CHARS: usize = 80;

/// Marker appended to excerpts that were cut at the cap
const TRUNCATION_MARKER: &str = "...";

/// Location of a model entity in the original template text
///
/// Carries its own copy of the denoted substring, so an excerpt can be
/// produced after the source buffer is gone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceRef {
    source: String,
    line: usize,
    column: usize,
    span: Span,
    text: String,
}

impl SourceRef {
    pub fn new(
        source: impl Into<String>,
        line: usize,
        column: usize,
        span: Span,
        text: impl Into<String>,
    ) -> Self {
        Self {
            source: source.into(),
            line,
            column,
            span,
            text: text.into(),
        }
    }

    /// Identifier of the template the reference points into
    pub fn source(&self) -> &str {
        &self.source
    }

    /// 1-based line of the first character
    pub fn line(&self) -> usize {
        self.line
    }

    /// 1-based column (in characters) of the first character
    pub fn column(&self) -> usize {
        self.column
    }

    pub fn span(&self) -> Span {
        self.span.clone()
    }

    /// Exact substring of the template this reference denotes
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Excerpt safe for single-line output, capped at [`DEFAULT_EXCERPT_MAX_CHARS`]
    pub fn console_friendly_text(&self) -> String {
        console_friendly_text(&self.text, DEFAULT_EXCERPT_MAX_CHARS)
    }

    /// Excerpt safe for single-line output with an explicit cap
    pub fn console_friendly_text_max(&self, max_chars: usize) -> String {
        console_friendly_text(&self.text, max_chars)
    }
}

impl fmt::Display for SourceRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{},{}]", self.line, self.column)
    }
}

/// Escape control characters and cap the result at `max_chars` characters
///
/// The cap counts characters of the escaped output, excluding the
/// truncation marker. An escape sequence is never split.
pub fn console_friendly_text(text: &str, max_chars: usize) -> String {
    let mut out = String::with_capacity(text.len().min(max_chars + TRUNCATION_MARKER.len()));
    let mut written = 0;

    for ch in text.chars() {
        let escaped = match ch {
            '\n' => "\\n".to_string(),
            '\r' => "\\r".to_string(),
            '\t' => "\\t".to_string(),
            c if c.is_control() => format!("\\u{{{:02x}}}", c as u32),
            c => c.to_string(),
        };
        let width = escaped.chars().count();
        if written + width > max_chars {
            out.push_str(TRUNCATION_MARKER);
            return out;
        }
        out.push_str(&escaped);
        written += width;
    }

    out
}

/// Maps byte offsets of a template buffer to 1-based line/column pairs
#[derive(Debug, Clone)]
pub struct LineIndex {
    line_starts: Vec<usize>,
}

impl LineIndex {
    pub fn new(text: &str) -> Self {
        let mut line_starts = vec![0];
        line_starts.extend(text.match_indices('\n').map(|(i, _)| i + 1));
        Self { line_starts }
    }

    /// Resolve `offset` against `text`; offsets past the end clamp to the end
    pub fn location(&self, text: &str, offset: usize) -> (usize, usize) {
        let mut offset = offset.min(text.len());
        while !text.is_char_boundary(offset) {
            offset -= 1;
        }
        let line = match self.line_starts.binary_search(&offset) {
            Ok(i) => i,
            Err(i) => i - 1,
        };
        let column = text[self.line_starts[line]..offset].chars().count() + 1;
        (line + 1, column)
    }
}
