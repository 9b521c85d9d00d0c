//! Shared application entry point.
//!
//! The binary delegates here so behavior stays identical however the tool
//! is launched. Exit codes: 0 on success (findings are not failures),
//! 1 on fatal scan errors, 2 on configuration errors.

use crate::cli::{parse_list, parse_pattern_args, Cli};
use crate::corpus::{Corpus, DiskCorpus};
use crate::output::{self, JsonReporter, TerminalReporter};
use crate::patterns::PatternConfig;
use crate::scanner::{CancelFlag, ParseErrorMode, Scanner};
use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;
use std::io::Write;
use std::path::Path;
use std::time::Instant;

/// Runs the scanner with the given arguments, writing to stdout.
pub fn run_with_args(args: Vec<String>) -> Result<i32> {
    run_with_args_to(args, &mut std::io::stdout())
}

/// Runs the scanner with the given arguments, writing to `writer`.
/// This is the testable variant of [`run_with_args`].
pub fn run_with_args_to<W: Write>(args: Vec<String>, writer: &mut W) -> Result<i32> {
    let mut program_args = vec!["pyastscan".to_owned()];
    program_args.extend(args);
    let cli = match Cli::try_parse_from(program_args) {
        Ok(cli) => cli,
        Err(err) => match err.kind() {
            clap::error::ErrorKind::DisplayHelp | clap::error::ErrorKind::DisplayVersion => {
                write!(writer, "{err}")?;
                writer.flush()?;
                return Ok(0);
            }
            _ => {
                eprint!("{err}");
                return Ok(2);
            }
        },
    };

    if cli.no_colors {
        colored::control::set_override(false);
    }

    if cli.list {
        output::print_pattern_list(writer)?;
        return Ok(0);
    }
    let Some(pattern) = cli.pattern.clone() else {
        output::print_pattern_list(writer)?;
        writeln!(writer, "Pick a pattern to run; see --help for options.")?;
        return Ok(2);
    };

    let configs = if pattern == "file" {
        match load_pattern_file(Path::new(&cli.pattern_args)) {
            Ok(configs) => configs,
            Err(err) => {
                eprintln!("{}", format!("{err:#}").red());
                return Ok(2);
            }
        }
    } else {
        let (positional, named) = parse_pattern_args(&cli.pattern_args);
        vec![PatternConfig {
            name: pattern,
            positional,
            named,
        }]
    };

    let cancel = CancelFlag::new();
    {
        let cancel = cancel.clone();
        // Fails when a handler is already installed (repeated calls in
        // one process, e.g. under test); scanning works without one.
        let _ = ctrlc::set_handler(move || cancel.cancel());
    }

    let mut scanner = match Scanner::new(&configs) {
        Ok(scanner) => scanner,
        Err(err) => {
            eprintln!("{}", err.to_string().red());
            return Ok(2);
        }
    };
    scanner = scanner
        .with_parse_error_mode(if cli.strict_parse {
            ParseErrorMode::Abort
        } else {
            ParseErrorMode::Skip
        })
        .with_cancel_flag(cancel);

    let extensions = parse_list(&cli.extensions);
    let skip = parse_list(&cli.skip);
    let corpus = DiskCorpus::collect(&cli.paths, &extensions, &skip);

    if cli.verbose {
        eprintln!("[VERBOSE] pyastscan v{}", env!("CARGO_PKG_VERSION"));
        eprintln!("[VERBOSE] {} file(s) in corpus", corpus.paths().len());
        eprintln!(
            "[VERBOSE] previsit pass needed: {}",
            scanner.has_previsitors()
        );
    }

    let mut flags: Vec<&str> = Vec::new();
    if cli.grepable {
        flags.push("grepable");
    }
    if cli.no_colors {
        flags.push("no colors");
    }
    if cli.strict_parse {
        flags.push("strict parse");
    }

    let start = Instant::now();
    let summary = if cli.json {
        let mut reporter = JsonReporter::new();
        let summary = scanner.scan(&corpus, &mut reporter);
        reporter.finish(writer)?;
        summary
    } else {
        output::print_greeting(writer, &cli.paths, &extensions, &skip, &flags, &configs)?;
        let mut reporter = TerminalReporter::new(writer, cli.grepable, !cli.no_source);
        scanner.scan(&corpus, &mut reporter)
    };

    let summary = match summary {
        Ok(summary) => summary,
        Err(err) => {
            eprintln!("{}", err.to_string().red());
            return Ok(1);
        }
    };

    if cli.json {
        // Keep stdout machine-readable; totals go to stderr.
        eprintln!(
            "Files: {}  Findings: {}  Skipped: {}",
            summary.files_scanned,
            summary.findings,
            summary.parse_failures.len()
        );
    } else {
        output::print_summary(writer, &summary, start.elapsed())?;
    }
    Ok(0)
}

/// Reads pattern configurations from a file: one `name:args` line per
/// pattern, `#` comments and blank lines ignored.
fn load_pattern_file(path: &Path) -> Result<Vec<PatternConfig>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("error reading \"{}\"", path.display()))?;
    let mut configs = Vec::new();
    for line in content.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let (name, arg_string) = match line.split_once(':') {
            Some((name, args)) => (name.trim(), args.trim()),
            None => (line, ""),
        };
        let (positional, named) = parse_pattern_args(arg_string);
        configs.push(PatternConfig {
            name: name.to_owned(),
            positional,
            named,
        });
    }
    Ok(configs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn pattern_file_parses_lines_and_comments() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("patterns.txt");
        fs::write(&file, "# comment\n\ncall:name=eval\nforelse\n").unwrap();

        let configs = load_pattern_file(&file).unwrap();
        assert_eq!(configs.len(), 2);
        assert_eq!(configs[0].name, "call");
        assert_eq!(configs[0].named, [("name".to_owned(), "eval".to_owned())]);
        assert_eq!(configs[1].name, "forelse");
    }

    #[test]
    fn missing_pattern_file_is_an_error() {
        assert!(load_pattern_file(Path::new("/no/such/file.txt")).is_err());
    }
}
