//! Depth-first traversal engine.
//!
//! The scoped walk pushes a scope frame before visiting a node's subtree
//! and pops it right after, so stack depth at exit always equals stack
//! depth at entry. Handler dispatch is pre-order; recursion into children
//! is a property of the engine, not of the handlers. A flat work-list mode
//! serves previsitors that only need to observe every node once without
//! scope context.

use crate::constants::MAX_RECURSION_DEPTH;
use crate::errors::ScanError;
use crate::facts::FactStore;
use crate::patterns::{Dispatch, Pattern, Previsitor};
use crate::report::{Finding, ReportSink};
use crate::scope::{Chain, ScopeTracker};
use crate::tree::Node;
use std::path::Path;

/// Per-file scan wiring shared by every node visit.
pub struct FileScan<'a> {
    /// Identifier of the file being walked.
    pub file: &'a Path,
    /// Read-only shared facts (fully populated before the match phase).
    pub facts: &'a FactStore,
    /// Where findings go.
    pub sink: &'a mut dyn ReportSink,
    /// Running finding counter, owned by the scanner.
    pub findings: &'a mut u64,
}

/// What a pattern handler sees for one node.
pub struct NodeCtx<'a> {
    /// Identifier of the file being walked.
    pub file: &'a Path,
    /// Current line range start.
    pub line_start: usize,
    /// Current line range end.
    pub line_end: usize,
    /// Scope state, including tracked facts.
    pub scopes: &'a mut ScopeTracker,
    /// Read-only shared facts.
    pub facts: &'a FactStore,
    sink: &'a mut dyn ReportSink,
    findings: &'a mut u64,
}

impl NodeCtx<'_> {
    /// Emits a finding at the current location with a source excerpt.
    pub fn report(&mut self, message: impl Into<String>) {
        self.report_with(message, true);
    }

    /// Emits a finding, controlling whether reporters show the source.
    pub fn report_with(&mut self, message: impl Into<String>, show_source: bool) {
        let finding = Finding {
            file: self.file.to_path_buf(),
            line_start: self.line_start,
            line_end: self.line_end,
            message: message.into(),
            function_chain: self.scopes.labels(Chain::Function),
            control_flow_chain: self.scopes.labels(Chain::ControlFlow),
            show_source,
        };
        *self.findings += 1;
        self.sink.report(&finding);
    }
}

/// Scoped depth-first walker; one instance per file per phase.
#[derive(Default)]
pub struct Engine {
    scopes: ScopeTracker,
    line_start: usize,
    line_end: usize,
    depth: usize,
    /// Set when the walk stopped descending because the tree nesting
    /// exceeded [`MAX_RECURSION_DEPTH`].
    pub recursion_limit_hit: bool,
}

impl Engine {
    /// Creates a fresh engine with empty scope state.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Scope state, exposed for invariant checks.
    #[must_use]
    pub fn scopes(&self) -> &ScopeTracker {
        &self.scopes
    }

    /// Current (start, end) line range.
    #[must_use]
    pub fn line_range(&self) -> (usize, usize) {
        (self.line_start, self.line_end)
    }

    /// Visits a node and its subtree with every configured pattern.
    pub fn visit(
        &mut self,
        node: &Node,
        patterns: &mut [Box<dyn Pattern>],
        scan: &mut FileScan<'_>,
    ) -> Result<(), ScanError> {
        if self.depth >= MAX_RECURSION_DEPTH {
            self.recursion_limit_hit = true;
            return Ok(());
        }
        self.depth += 1;

        // Frame push wraps the entire subtree visit, not just the handler.
        let pushed = if node.kind.is_function_scope() {
            let label = node.str_field("name").unwrap_or("<anonymous>");
            self.scopes.push(Chain::Function, label);
            Some(Chain::Function)
        } else if node.kind.is_control_flow_scope() {
            self.scopes.push(Chain::ControlFlow, node.kind.name());
            Some(Chain::ControlFlow)
        } else {
            None
        };

        // Nodes without positions keep the previously recorded range.
        if let Some((start, end)) = node.lines {
            self.line_start = start;
            self.line_end = end;
        }

        let walked = self.dispatch_and_recurse(node, patterns, scan);

        if let Some(chain) = pushed {
            self.scopes.pop(chain);
        }
        self.depth -= 1;
        walked
    }

    fn dispatch_and_recurse(
        &mut self,
        node: &Node,
        patterns: &mut [Box<dyn Pattern>],
        scan: &mut FileScan<'_>,
    ) -> Result<(), ScanError> {
        for pattern in patterns.iter_mut() {
            let wanted = match pattern.dispatch() {
                Dispatch::AllNodes => true,
                Dispatch::Kind(kind) => kind == node.kind,
                Dispatch::Kinds(kinds) => kinds.contains(&node.kind),
            };
            if !wanted {
                continue;
            }
            let mut ctx = NodeCtx {
                file: scan.file,
                line_start: self.line_start,
                line_end: self.line_end,
                scopes: &mut self.scopes,
                facts: scan.facts,
                sink: &mut *scan.sink,
                findings: &mut *scan.findings,
            };
            pattern.on_node(node, &mut ctx)?;
        }

        for child in node.children() {
            self.visit(child, patterns, scan)?;
        }
        Ok(())
    }

    /// Flat traversal: dispatches every node of the subtree to each
    /// previsitor for side effects only. No scope frames, no line
    /// bookkeeping, work-list based (no recursion).
    pub fn visit_flat(node: &Node, previsitors: &mut [Box<dyn Previsitor>], facts: &mut FactStore) {
        let mut stack = vec![node];
        while let Some(current) = stack.pop() {
            for previsitor in previsitors.iter_mut() {
                previsitor.observe(current, facts);
            }
            stack.extend(current.children());
        }
    }
}
