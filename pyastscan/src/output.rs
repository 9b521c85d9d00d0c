//! Terminal and JSON reporters plus the banner, pattern listing and
//! end-of-run summary printing.

use crate::patterns::{registry, PatternConfig};
use crate::report::{CollectSink, Finding, ReportSink};
use crate::scanner::ScanSummary;
use colored::Colorize;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Colored terminal reporter. Findings stream out as they are reported:
/// a heading per file (unless grepable), one line per finding with the
/// lexical context chains, and optionally the matched source lines.
pub struct TerminalReporter<'w, W: Write> {
    writer: &'w mut W,
    grepable: bool,
    show_source: bool,
    current_file: Option<PathBuf>,
    cache: Option<(PathBuf, Vec<String>)>,
}

impl<'w, W: Write> TerminalReporter<'w, W> {
    /// Creates a reporter writing to `writer`.
    pub fn new(writer: &'w mut W, grepable: bool, show_source: bool) -> Self {
        Self {
            writer,
            grepable,
            show_source,
            current_file: None,
            cache: None,
        }
    }

    fn emit(&mut self, finding: &Finding) -> std::io::Result<()> {
        if !self.grepable && self.current_file.as_deref() != Some(finding.file.as_path()) {
            writeln!(
                self.writer,
                "{}",
                normalize_display_path(&finding.file).magenta()
            )?;
            self.current_file = Some(finding.file.clone());
        }

        let mut parts = String::new();
        if self.grepable {
            parts.push_str(&format!(
                "{}:",
                normalize_display_path(&finding.file).magenta()
            ));
        } else {
            parts.push_str("    ");
        }
        parts.push_str(&finding.line_start.to_string().green().to_string());

        if !finding.function_chain.is_empty() {
            let chain: Vec<String> = finding
                .function_chain
                .iter()
                .map(|label| label.bright_red().to_string())
                .collect();
            parts.push(' ');
            parts.push_str(&chain.join("."));
        }
        if !finding.control_flow_chain.is_empty() {
            let chain: Vec<String> = finding
                .control_flow_chain
                .iter()
                .map(|label| label.yellow().to_string())
                .collect();
            parts.push(' ');
            parts.push_str(&chain.join("->"));
        }

        writeln!(self.writer, "{parts}: {}", finding.message.cyan())?;

        if self.show_source && finding.show_source {
            self.emit_source(finding)?;
        }
        Ok(())
    }

    fn emit_source(&mut self, finding: &Finding) -> std::io::Result<()> {
        if self.cache.as_ref().is_none_or(|(path, _)| path != &finding.file) {
            let Ok(source) = std::fs::read_to_string(&finding.file) else {
                return Ok(());
            };
            self.cache = Some((
                finding.file.clone(),
                source.lines().map(str::to_owned).collect(),
            ));
        }
        let Some((_, lines)) = &self.cache else {
            return Ok(());
        };
        for n in finding.line_start.max(1)..=finding.line_end {
            let Some(line) = lines.get(n - 1) else {
                break;
            };
            writeln!(self.writer, "{}:{line}", format!("{n:4}").green())?;
        }
        Ok(())
    }
}

impl<W: Write> ReportSink for TerminalReporter<'_, W> {
    fn report(&mut self, finding: &Finding) {
        // Terminal write failures are not scan failures.
        let _ = self.emit(finding);
    }
}

/// Collects findings and serializes them as a JSON array at the end of
/// the run.
#[derive(Default)]
pub struct JsonReporter {
    sink: CollectSink,
}

impl JsonReporter {
    /// Creates an empty reporter.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Writes the collected findings as pretty-printed JSON.
    pub fn finish(&self, writer: &mut impl Write) -> anyhow::Result<()> {
        serde_json::to_writer_pretty(&mut *writer, &self.sink.findings)?;
        writeln!(writer)?;
        Ok(())
    }
}

impl ReportSink for JsonReporter {
    fn report(&mut self, finding: &Finding) {
        self.sink.report(finding);
    }
}

fn fit(value: &str, width: usize) -> String {
    if value.len() > width {
        format!("{}...", &value[..width - 3])
    } else {
        format!("{value}{}", " ".repeat(width - value.len()))
    }
}

/// Prints the run banner: scan settings plus every configured pattern.
pub fn print_greeting(
    writer: &mut impl Write,
    paths: &[PathBuf],
    extensions: &[String],
    skip: &[String],
    flags: &[&str],
    configs: &[PatternConfig],
) -> std::io::Result<()> {
    let paths = paths
        .iter()
        .map(|path| path.display().to_string())
        .collect::<Vec<_>>()
        .join(", ");
    let rule = "+-----------------------------------------------------------------------------+";
    let mut lines = vec![
        "+--------------------------------[ pyastscan ]--------------------------------+".to_owned(),
        format!("| Path:       {} |", fit(&paths, 63)),
        format!("| Extensions: {} |", fit(&extensions.join(", "), 63)),
        format!("| Skip:       {} |", fit(&skip.join(", "), 63)),
        format!("| Flags:      {} |", fit(&flags.join(", "), 63)),
        rule.to_owned(),
    ];
    for config in configs {
        let Some(info) = registry::find(&config.name) else {
            continue;
        };
        let params: Vec<&str> = info.params.iter().map(|param| param.name).collect();
        let named: Vec<String> = config
            .named
            .iter()
            .map(|(key, value)| format!("{key}={value}"))
            .collect();
        lines.push(format!("| Pattern:    {} |", fit(info.name, 63)));
        lines.push(format!("|             {} |", fit(info.help, 63)));
        lines.push(format!("| Params:     {} |", fit(&params.join(", "), 63)));
        lines.push(format!(
            "| Args:       {} |",
            fit(&config.positional.join(", "), 63)
        ));
        lines.push(format!("| Kwargs:     {} |", fit(&named.join(", "), 63)));
        lines.push(rule.to_owned());
    }
    for line in lines {
        writeln!(writer, "{}", line.cyan())?;
    }
    writeln!(writer)
}

/// Prints the registry, common patterns first, with parameter lists.
pub fn print_pattern_list(writer: &mut impl Write) -> std::io::Result<()> {
    let group = |writer: &mut dyn Write, title: &str, common: bool| -> std::io::Result<()> {
        writeln!(writer, "{}", title.bold())?;
        for info in registry::PATTERNS.iter().filter(|info| info.common == common) {
            let params: Vec<&str> = info.params.iter().map(|param| param.name).collect();
            let suffix = if params.is_empty() {
                String::new()
            } else {
                format!(" ({})", params.join(", "))
            };
            writeln!(writer, "    {:25} {}{suffix}", info.name, info.help)?;
        }
        writeln!(writer)
    };
    group(writer, "Common patterns:", true)?;
    group(writer, "Custom patterns:", false)
}

/// Prints end-of-run totals: files, findings, skipped files, duration.
pub fn print_summary(
    writer: &mut impl Write,
    summary: &ScanSummary,
    duration: Duration,
) -> std::io::Result<()> {
    for failure in &summary.parse_failures {
        writeln!(
            writer,
            "{}",
            format!("skipped {}: {}", failure.file.display(), failure.message).yellow()
        )?;
    }
    if summary.depth_limited > 0 {
        writeln!(
            writer,
            "{}",
            format!(
                "{} file(s) exceeded the traversal depth bound; deepest nodes were not visited",
                summary.depth_limited
            )
            .yellow()
        )?;
    }
    if summary.interrupted {
        writeln!(writer, "{}", "Interrupted, exiting".yellow())?;
    }

    let findings = if summary.findings == 0 {
        summary.findings.to_string().green().to_string()
    } else {
        summary.findings.to_string().red().bold().to_string()
    };
    writeln!(
        writer,
        "Files: {}  Findings: {}  Skipped: {}  ({:.2?})",
        summary.files_scanned.to_string().cyan(),
        findings,
        summary.parse_failures.len().to_string().cyan(),
        duration
    )
}

/// Path rendering helper shared by reporters: forward slashes, no
/// leading `./`.
#[must_use]
pub fn normalize_display_path(path: &Path) -> String {
    let s = path.to_string_lossy();
    let normalized = s.replace('\\', "/");
    normalized
        .strip_prefix("./")
        .unwrap_or(&normalized)
        .to_owned()
}
