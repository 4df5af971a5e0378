//! Destinations for report lines

/// Receives report lines, one call per line
///
/// Passed explicitly to each render call; the renderer keeps no sink of
/// its own between calls.
pub trait DiagnosticSink {
    fn emit(&mut self, line: &str);
}

impl DiagnosticSink for Vec<String> {
    fn emit(&mut self, line: &str) {
        self.push(line.to_string());
    }
}

/// Appends each line followed by `\n`
impl DiagnosticSink for String {
    fn emit(&mut self, line: &str) {
        self.push_str(line);
        self.push('\n');
    }
}

/// Target of the events [`TracingSink`] emits
pub const REPORT_TARGET: &str = "rocker_inspect::report";

/// Forwards each line to `tracing` at INFO level under [`REPORT_TARGET`]
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl DiagnosticSink for TracingSink {
    fn emit(&mut self, line: &str) {
        tracing::info!(target: REPORT_TARGET, "{}", line);
    }
}
