//! Two-phase scan orchestration.
//!
//! The scanner resolves the configured patterns up front (all
//! configuration errors surface before any file is read), then runs at
//! most two strictly sequenced passes over the corpus: a previsit pass
//! populating the shared fact store — only when some pattern requires one
//! — and the matching pass. Each file gets a fresh engine and scope
//! tracker per pass; the fact store is fully built before the first
//! pattern reads it.

use crate::corpus::Corpus;
use crate::engine::{Engine, FileScan};
use crate::errors::{ConfigError, ScanError};
use crate::facts::FactStore;
use crate::patterns::{registry, Pattern, PatternConfig, PatternInfo, Previsitor, PrevisitorKind};
use crate::report::ReportSink;
use crate::scope::Chain;
use crate::tree::{self, Node};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// What to do when a file fails to read or parse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ParseErrorMode {
    /// Skip the file, record a diagnostic, continue with the next file.
    #[default]
    Skip,
    /// Abort the whole run on the first failure.
    Abort,
}

/// A skipped file and the reason it was skipped.
#[derive(Debug, Clone)]
pub struct ParseFailure {
    /// The file that failed to read or parse.
    pub file: PathBuf,
    /// Parser or I/O diagnostic.
    pub message: String,
}

/// Shared cancellation flag, checked between files. Aborting mid-file is
/// never done, so a cancelled previsit pass leaves no partial facts
/// visible to matching (the run stops before the match phase).
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    /// Creates a flag in the not-cancelled state.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests cancellation.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    /// Whether cancellation was requested.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// End-of-run totals.
#[derive(Debug, Default)]
pub struct ScanSummary {
    /// Files processed in the matching phase.
    pub files_scanned: usize,
    /// Findings emitted across all patterns.
    pub findings: u64,
    /// Files skipped because they failed to read or parse.
    pub parse_failures: Vec<ParseFailure>,
    /// Files whose tree nesting exceeded the engine's depth bound.
    pub depth_limited: usize,
    /// Whether the run stopped early on a cancellation request.
    pub interrupted: bool,
}

/// Two-phase orchestrator. One instance per run.
pub struct Scanner {
    patterns: Vec<Box<dyn Pattern>>,
    previsitors: Vec<Box<dyn Previsitor>>,
    facts: FactStore,
    parse_error_mode: ParseErrorMode,
    cancel: CancelFlag,
}

impl Scanner {
    /// Resolves all configurations against the registry. Every
    /// configuration error surfaces here, before any scanning starts.
    /// Previsitors required by several patterns are instantiated once.
    pub fn new(configs: &[PatternConfig]) -> Result<Self, ConfigError> {
        let mut patterns = Vec::with_capacity(configs.len());
        let mut kinds: Vec<PrevisitorKind> = Vec::new();
        for config in configs {
            let pattern = registry::build(config)?;
            for kind in pattern.info().previsitors {
                if !kinds.contains(kind) {
                    kinds.push(*kind);
                }
            }
            patterns.push(pattern);
        }

        let mut facts = FactStore::new();
        let previsitors: Vec<Box<dyn Previsitor>> = kinds
            .into_iter()
            .map(PrevisitorKind::instantiate)
            .collect();
        for previsitor in &previsitors {
            previsitor.register(&mut facts);
        }

        Ok(Self {
            patterns,
            previsitors,
            facts,
            parse_error_mode: ParseErrorMode::default(),
            cancel: CancelFlag::new(),
        })
    }

    /// Sets the parse failure policy.
    #[must_use]
    pub fn with_parse_error_mode(mut self, mode: ParseErrorMode) -> Self {
        self.parse_error_mode = mode;
        self
    }

    /// Wires an external cancellation flag (e.g. a Ctrl-C handler).
    #[must_use]
    pub fn with_cancel_flag(mut self, cancel: CancelFlag) -> Self {
        self.cancel = cancel;
        self
    }

    /// Descriptors of the configured patterns, in configuration order.
    pub fn pattern_infos(&self) -> impl Iterator<Item = &'static PatternInfo> + '_ {
        self.patterns.iter().map(|pattern| pattern.info())
    }

    /// Whether this run needs a previsit pass.
    #[must_use]
    pub fn has_previsitors(&self) -> bool {
        !self.previsitors.is_empty()
    }

    /// Runs the scan: previsit pass (if needed), then the matching pass.
    pub fn scan(
        &mut self,
        corpus: &dyn Corpus,
        sink: &mut dyn ReportSink,
    ) -> Result<ScanSummary, ScanError> {
        let mut summary = ScanSummary::default();

        if !self.previsitors.is_empty() {
            for path in corpus.paths() {
                if self.cancel.is_cancelled() {
                    summary.interrupted = true;
                    return Ok(summary);
                }
                let Some(node) = self.load_tree(corpus, path, &mut summary)? else {
                    continue;
                };
                Engine::visit_flat(&node, &mut self.previsitors, &mut self.facts);
            }
        }

        for path in corpus.paths() {
            if self.cancel.is_cancelled() {
                summary.interrupted = true;
                break;
            }
            summary.files_scanned += 1;
            let Some(node) = self.load_tree(corpus, path, &mut summary)? else {
                continue;
            };

            let mut engine = Engine::new();
            let mut scan = FileScan {
                file: path,
                facts: &self.facts,
                sink,
                findings: &mut summary.findings,
            };
            engine.visit(&node, &mut self.patterns, &mut scan)?;
            if engine.recursion_limit_hit {
                summary.depth_limited += 1;
            }
            debug_assert_eq!(engine.scopes().depth(Chain::Function), 0);
            debug_assert_eq!(engine.scopes().depth(Chain::ControlFlow), 0);
        }

        Ok(summary)
    }

    fn load_tree(
        &self,
        corpus: &dyn Corpus,
        path: &Path,
        summary: &mut ScanSummary,
    ) -> Result<Option<Node>, ScanError> {
        let source = match corpus.load(path) {
            Ok(source) => source,
            Err(err) => return self.parse_failed(path, err.to_string(), summary),
        };
        match tree::parse(&source) {
            Ok(node) => Ok(Some(node)),
            Err(err) => self.parse_failed(path, err.0, summary),
        }
    }

    fn parse_failed(
        &self,
        path: &Path,
        message: String,
        summary: &mut ScanSummary,
    ) -> Result<Option<Node>, ScanError> {
        match self.parse_error_mode {
            ParseErrorMode::Skip => {
                // Both phases see the same corpus; record each file once.
                if !summary.parse_failures.iter().any(|f| f.file == path) {
                    summary.parse_failures.push(ParseFailure {
                        file: path.to_path_buf(),
                        message,
                    });
                }
                Ok(None)
            }
            ParseErrorMode::Abort => Err(ScanError::ParseAborted {
                file: path.to_path_buf(),
                message,
            }),
        }
    }
}
