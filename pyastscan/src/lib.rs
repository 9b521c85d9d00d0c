//! pyastscan — structural AST pattern search for Python codebases.
//!
//! The crate parses every file of a corpus into a generic syntax tree and
//! runs a configured set of pattern matchers over each node, reporting
//! matches with their source location and lexical context (the enclosing
//! function/class chain and the enclosing control-flow chain).
//!
//! Scanning is two-phased: patterns may declare prerequisite *previsitors*
//! which run over the whole corpus first and aggregate shared facts (for
//! example the set of all referenced identifiers); the matching pass then
//! reads those facts while walking each file once with all patterns.
//!
//! The library is an in-process engine: directory walking, CLI parsing and
//! result formatting live in the embedding application modules (`cli`,
//! `corpus`, `output`, `entry_point`), which the `pyastscan-cli` binary
//! wires together.

/// Shared limits and defaults.
pub mod constants;
/// Error taxonomy (configuration, parse and scan errors).
pub mod errors;
/// Line-number mapping helpers.
pub mod utils;
/// Generic syntax tree and the parser lowering.
pub mod tree;
/// Scope tracking (function/class and control-flow chains, tracked facts).
pub mod scope;
/// Shared fact store populated by previsitors.
pub mod facts;
/// Findings and the reporting sink contract.
pub mod report;
/// Depth-first traversal engine (scoped and flat modes).
pub mod engine;
/// Pattern framework, matcher primitives and the built-in pattern library.
pub mod patterns;
/// Two-phase scan orchestration.
pub mod scanner;
/// Corpus sources (disk walker, in-memory fixture corpus).
pub mod corpus;
/// Terminal and JSON reporters, banner and summary printing.
pub mod output;
/// Command line definition.
pub mod cli;
/// Shared application entry point used by the CLI binary.
pub mod entry_point;
