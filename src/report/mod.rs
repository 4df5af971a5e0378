//! Diagnostic report generation
//!
//! This module takes a parsed TemplateModel and produces an ordered,
//! line-oriented trace of every import, argument and syntax unit.

pub mod renderer;
pub mod sink;

pub use renderer::{Renderer, StandardDescriber, UnitDescriber};
pub use sink::{DiagnosticSink, TracingSink, REPORT_TARGET};
