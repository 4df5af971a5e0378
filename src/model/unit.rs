//! Syntax units making up a parsed template body

use std::fmt;

use super::source_ref::SourceRef;

/// Raw text emitted as-is
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlainText {
    pub text: String,
    pub source_ref: SourceRef,
}

/// `@* ... *@`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Comment {
    pub text: String,
    pub source_ref: SourceRef,
}

/// `@expr` or `@(expr)`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValueExpression {
    pub expression: String,
    pub source_ref: SourceRef,
}

/// `@(left ?: right)`: renders `right` when `left` is null
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NullTernaryExpression {
    pub left_expression: String,
    pub right_expression: String,
    pub source_ref: SourceRef,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BreakStatement {
    pub source_ref: SourceRef,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContinueStatement {
    pub source_ref: SourceRef,
}

/// `@for (expression) {`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForBlockBegin {
    pub expression: String,
    pub source_ref: SourceRef,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForBlockEnd {
    pub source_ref: SourceRef,
}

/// One binding of a with block: `[Type] name = value`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WithVariable {
    /// Declared type, absent when the type is inferred
    pub type_name: Option<String>,
    pub name: String,
    pub value_expression: String,
}

impl fmt::Display for WithVariable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.type_name {
            Some(t) => write!(f, "{} {} = {}", t, self.name, self.value_expression),
            None => write!(f, "{} = {}", self.name, self.value_expression),
        }
    }
}

/// Bindings of `@with (...)` or `@with? (...)`; never empty
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WithStatement {
    pub null_safe: bool,
    pub variables: Vec<WithVariable>,
}

impl fmt::Display for WithStatement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, var) in self.variables.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", var)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WithBlockBegin {
    pub statement: WithStatement,
    pub source_ref: SourceRef,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WithBlockEnd {
    pub source_ref: SourceRef,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IfBlockBegin {
    pub expression: String,
    pub source_ref: SourceRef,
}

/// `} else if (expression) {`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IfBlockElseIf {
    pub expression: String,
    pub source_ref: SourceRef,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IfBlockElse {
    pub source_ref: SourceRef,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IfBlockEnd {
    pub source_ref: SourceRef,
}

/// One structural element of a template body, in document order
///
/// The set is closed: every consumer matches on it without a wildcard arm,
/// so a new kind does not build until every consumer handles it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TemplateUnit {
    PlainText(PlainText),
    Comment(Comment),
    ValueExpression(ValueExpression),
    NullTernaryExpression(NullTernaryExpression),
    BreakStatement(BreakStatement),
    ContinueStatement(ContinueStatement),
    ForBlockBegin(ForBlockBegin),
    ForBlockEnd(ForBlockEnd),
    WithBlockBegin(WithBlockBegin),
    WithBlockEnd(WithBlockEnd),
    IfBlockBegin(IfBlockBegin),
    IfBlockElseIf(IfBlockElseIf),
    IfBlockElse(IfBlockElse),
    IfBlockEnd(IfBlockEnd),
}

/// Payload-free discriminant of [`TemplateUnit`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnitKind {
    PlainText,
    Comment,
    ValueExpression,
    NullTernaryExpression,
    BreakStatement,
    ContinueStatement,
    ForBlockBegin,
    ForBlockEnd,
    WithBlockBegin,
    WithBlockEnd,
    IfBlockBegin,
    IfBlockElseIf,
    IfBlockElse,
    IfBlockEnd,
}

impl UnitKind {
    /// Every kind, in declaration order
    pub const ALL: [UnitKind; 14] = [
        UnitKind::PlainText,
        UnitKind::Comment,
        UnitKind::ValueExpression,
        UnitKind::NullTernaryExpression,
        UnitKind::BreakStatement,
        UnitKind::ContinueStatement,
        UnitKind::ForBlockBegin,
        UnitKind::ForBlockEnd,
        UnitKind::WithBlockBegin,
        UnitKind::WithBlockEnd,
        UnitKind::IfBlockBegin,
        UnitKind::IfBlockElseIf,
        UnitKind::IfBlockElse,
        UnitKind::IfBlockEnd,
    ];

    pub fn name(self) -> &'static str {
        match self {
            UnitKind::PlainText => "PlainText",
            UnitKind::Comment => "Comment",
            UnitKind::ValueExpression => "ValueExpression",
            UnitKind::NullTernaryExpression => "NullTernaryExpression",
            UnitKind::BreakStatement => "BreakStatement",
            UnitKind::ContinueStatement => "ContinueStatement",
            UnitKind::ForBlockBegin => "ForBlockBegin",
            UnitKind::ForBlockEnd => "ForBlockEnd",
            UnitKind::WithBlockBegin => "WithBlockBegin",
            UnitKind::WithBlockEnd => "WithBlockEnd",
            UnitKind::IfBlockBegin => "IfBlockBegin",
            UnitKind::IfBlockElseIf => "IfBlockElseIf",
            UnitKind::IfBlockElse => "IfBlockElse",
            UnitKind::IfBlockEnd => "IfBlockEnd",
        }
    }
}

impl fmt::Display for UnitKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl TemplateUnit {
    pub fn kind(&self) -> UnitKind {
        match self {
            TemplateUnit::PlainText(_) => UnitKind::PlainText,
            TemplateUnit::Comment(_) => UnitKind::Comment,
            TemplateUnit::ValueExpression(_) => UnitKind::ValueExpression,
            TemplateUnit::NullTernaryExpression(_) => UnitKind::NullTernaryExpression,
            TemplateUnit::BreakStatement(_) => UnitKind::BreakStatement,
            TemplateUnit::ContinueStatement(_) => UnitKind::ContinueStatement,
            TemplateUnit::ForBlockBegin(_) => UnitKind::ForBlockBegin,
            TemplateUnit::ForBlockEnd(_) => UnitKind::ForBlockEnd,
            TemplateUnit::WithBlockBegin(_) => UnitKind::WithBlockBegin,
            TemplateUnit::WithBlockEnd(_) => UnitKind::WithBlockEnd,
            TemplateUnit::IfBlockBegin(_) => UnitKind::IfBlockBegin,
            TemplateUnit::IfBlockElseIf(_) => UnitKind::IfBlockElseIf,
            TemplateUnit::IfBlockElse(_) => UnitKind::IfBlockElse,
            TemplateUnit::IfBlockEnd(_) => UnitKind::IfBlockEnd,
        }
    }

    pub fn source_ref(&self) -> &SourceRef {
        match self {
            TemplateUnit::PlainText(u) => &u.source_ref,
            TemplateUnit::Comment(u) => &u.source_ref,
            TemplateUnit::ValueExpression(u) => &u.source_ref,
            TemplateUnit::NullTernaryExpression(u) => &u.source_ref,
            TemplateUnit::BreakStatement(u) => &u.source_ref,
            TemplateUnit::ContinueStatement(u) => &u.source_ref,
            TemplateUnit::ForBlockBegin(u) => &u.source_ref,
            TemplateUnit::ForBlockEnd(u) => &u.source_ref,
            TemplateUnit::WithBlockBegin(u) => &u.source_ref,
            TemplateUnit::WithBlockEnd(u) => &u.source_ref,
            TemplateUnit::IfBlockBegin(u) => &u.source_ref,
            TemplateUnit::IfBlockElseIf(u) => &u.source_ref,
            TemplateUnit::IfBlockElse(u) => &u.source_ref,
            TemplateUnit::IfBlockEnd(u) => &u.source_ref,
        }
    }
}
