//! Diagnostic report for a parsed template
//!
//! Walks a [`TemplateModel`] in document order and produces one description
//! line plus one source excerpt line per import, argument and unit.

use crate::config::InspectConfig;
use crate::error::RenderError;
use crate::model::{
    console_friendly_text, SourceRef, TemplateModel, TemplateUnit, DEFAULT_EXCERPT_MAX_CHARS,
};

use super::sink::DiagnosticSink;

/// Produces the kind-specific description line of a unit
///
/// Returning `None` means the describer has no case for the unit's kind,
/// which the renderer reports as [`RenderError::TaxonomyDispatchMiss`].
pub trait UnitDescriber {
    fn describe(&self, unit: &TemplateUnit) -> Option<String>;
}

/// Describer covering every unit kind
#[derive(Debug, Clone)]
pub struct StandardDescriber {
    max_chars: usize,
}

impl StandardDescriber {
    pub fn new(max_chars: usize) -> Self {
        Self { max_chars }
    }

    fn text(&self, s: &str) -> String {
        console_friendly_text(s, self.max_chars)
    }
}

impl Default for StandardDescriber {
    fn default() -> Self {
        Self::new(DEFAULT_EXCERPT_MAX_CHARS)
    }
}

impl UnitDescriber for StandardDescriber {
    fn describe(&self, unit: &TemplateUnit) -> Option<String> {
        let line = match unit {
            TemplateUnit::PlainText(u) => format!("plain: {}", self.text(&u.text)),
            TemplateUnit::Comment(u) => format!("comment: {}", self.text(&u.text)),
            TemplateUnit::ValueExpression(u) => format!("value: {}", self.text(&u.expression)),
            TemplateUnit::NullTernaryExpression(u) => format!(
                "nullTernary: {} ?: {}",
                self.text(&u.left_expression),
                self.text(&u.right_expression)
            ),
            TemplateUnit::BreakStatement(_) => "break".to_string(),
            TemplateUnit::ContinueStatement(_) => "continue".to_string(),
            TemplateUnit::ForBlockBegin(u) => format!("for begin: {}", self.text(&u.expression)),
            TemplateUnit::ForBlockEnd(_) => "for end".to_string(),
            TemplateUnit::WithBlockBegin(u) => format!(
                "with begin: isNullSafe={} ({})",
                u.statement.null_safe,
                self.text(&u.statement.to_string())
            ),
            TemplateUnit::WithBlockEnd(_) => "with end".to_string(),
            TemplateUnit::IfBlockBegin(u) => format!("if begin: {}", self.text(&u.expression)),
            TemplateUnit::IfBlockElseIf(u) => {
                format!("else if begin: {}", self.text(&u.expression))
            }
            TemplateUnit::IfBlockElse(_) => "else begin".to_string(),
            TemplateUnit::IfBlockEnd(_) => "if end".to_string(),
        };
        Some(line)
    }
}

/// Renders template models into report lines
#[derive(Debug, Clone)]
pub struct Renderer<D = StandardDescriber> {
    describer: D,
    excerpt_max_chars: usize,
}

impl Renderer<StandardDescriber> {
    pub fn new(config: &InspectConfig) -> Self {
        Self::with_describer(
            StandardDescriber::new(config.excerpt_max_chars),
            config.excerpt_max_chars,
        )
    }
}

impl Default for Renderer<StandardDescriber> {
    fn default() -> Self {
        Self::new(&InspectConfig::default())
    }
}

impl<D: UnitDescriber> Renderer<D> {
    pub fn with_describer(describer: D, excerpt_max_chars: usize) -> Self {
        Self {
            describer,
            excerpt_max_chars,
        }
    }

    /// Render `model` into `sink`
    ///
    /// The whole report is built before the first line is emitted, so on
    /// error the sink receives nothing.
    pub fn render(
        &self,
        model: &TemplateModel,
        sink: &mut dyn DiagnosticSink,
    ) -> Result<(), RenderError> {
        let lines = self.report_lines(model)?;
        for line in &lines {
            sink.emit(line);
        }
        Ok(())
    }

    /// Render `model` into a newline-terminated string
    pub fn render_to_string(&self, model: &TemplateModel) -> Result<String, RenderError> {
        let mut out = String::new();
        self.render(model, &mut out)?;
        Ok(out)
    }

    fn report_lines(&self, model: &TemplateModel) -> Result<Vec<String>, RenderError> {
        let mut lines = vec![
            "--- template model ---".to_string(),
            format!("template: {}", self.text(model.template_name())),
            format!("name: {}", self.text(model.name())),
            format!("package: {}", self.text(model.package_name())),
            format!("content type: {}", model.content_type()),
            String::new(),
        ];

        for import in model.imports() {
            lines.push(format!("import: {}", self.text(&import.statement)));
            lines.push(self.source_line(&import.source_ref));
        }

        for arg in model.arguments() {
            let declaration = format!("{} {}", arg.type_name, arg.name);
            lines.push(format!("arg: {}", self.text(&declaration)));
            lines.push(self.source_line(&arg.source_ref));
        }

        for (index, unit) in model.units().iter().enumerate() {
            let description = self.describer.describe(unit).ok_or_else(|| {
                RenderError::TaxonomyDispatchMiss {
                    kind: unit.kind(),
                    index,
                    source_ref: unit.source_ref().clone(),
                }
            })?;
            tracing::trace!(index, kind = %unit.kind(), "described unit");
            lines.push(description);
            lines.push(self.source_line(unit.source_ref()));
        }

        Ok(lines)
    }

    /// Escaped and capped, so every report entry stays on one line
    fn text(&self, s: &str) -> String {
        console_friendly_text(s, self.excerpt_max_chars)
    }

    fn source_line(&self, source_ref: &SourceRef) -> String {
        format!(
            " src (@ {}): [{}]",
            source_ref,
            source_ref.console_friendly_text_max(self.excerpt_max_chars)
        )
    }
}
