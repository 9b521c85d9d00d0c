//! Findings and the reporting contract.

use serde::Serialize;
use std::path::PathBuf;

/// One reported match. Findings are handed to the sink as they are found
/// and counted by the scanner; the core never accumulates them.
#[derive(Debug, Clone, Serialize)]
pub struct Finding {
    /// File the match was found in.
    pub file: PathBuf,
    /// First line of the matched node.
    pub line_start: usize,
    /// Last line of the matched node.
    pub line_end: usize,
    /// Pattern message (usually the matched name or a fixed description).
    pub message: String,
    /// Enclosing function/class labels, outermost first.
    pub function_chain: Vec<String>,
    /// Enclosing control-flow labels, outermost first.
    pub control_flow_chain: Vec<String>,
    /// Whether reporters should show a source excerpt for this finding.
    #[serde(skip)]
    pub show_source: bool,
}

/// Reporting sink the scanner emits findings into. Formatting, coloring
/// and source-excerpt extraction are reporter concerns, not core ones.
pub trait ReportSink {
    /// Accepts one finding.
    fn report(&mut self, finding: &Finding);
}

/// Sink that collects findings in memory (tests, JSON output).
#[derive(Debug, Default)]
pub struct CollectSink {
    /// Findings in report order.
    pub findings: Vec<Finding>,
}

impl ReportSink for CollectSink {
    fn report(&mut self, finding: &Finding) {
        self.findings.push(finding.clone());
    }
}
