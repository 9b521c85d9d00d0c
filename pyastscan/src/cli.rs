//! Command line definition.

use clap::Parser;
use std::path::PathBuf;

/// Help text appendix describing pattern files.
const PATTERN_FILE_HELP: &str = "\
PATTERN FILES:
  Run the pattern \"file\" and pass a filename in --args to run several
  patterns in one scan. One pattern per line, colon-separated from its
  arguments; blank lines and '#' comments are ignored.

      # example patterns file
      call:name=eval
      unused_classes:ignore=Test.*

EXAMPLES:
    pyastscan --list                 # List available patterns
    pyastscan print -c               # Run pattern `print` without colors
    pyastscan dump -p dir            # Run pattern `dump` on directory `dir`
    pyastscan call -a bytes          # Find calls to `bytes`
    pyastscan assign -a 'secret.*'   # Find assignments to secret-ish names
    pyastscan file -a patterns.txt   # Run patterns listed in a file
";

/// Search Python code for AST patterns.
#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Search Python code for AST patterns",
    long_about = None,
    after_help = PATTERN_FILE_HELP
)]
pub struct Cli {
    /// Pattern to run (see --list), or "file" to read patterns from the
    /// file named by --args.
    pub pattern: Option<String>,

    /// Comma-separated pattern arguments: positional values and
    /// key=value pairs.
    #[arg(short = 'a', long = "args", default_value = "")]
    pub pattern_args: String,

    /// Starting files or directories.
    #[arg(short = 'p', long = "path", default_value = ".")]
    pub paths: Vec<PathBuf>,

    /// Comma-separated file extensions to process.
    #[arg(short, long, default_value = "py")]
    pub extensions: String,

    /// Comma-separated directory names to skip.
    #[arg(short, long, default_value = "tests")]
    pub skip: String,

    /// Make results easier to grep (one file-prefixed line per finding).
    #[arg(short, long)]
    pub grepable: bool,

    /// Don't print source code excerpts.
    #[arg(short = 'n', long)]
    pub no_source: bool,

    /// Don't print colors.
    #[arg(short = 'c', long)]
    pub no_colors: bool,

    /// Output findings as a JSON array instead of formatted text.
    #[arg(long)]
    pub json: bool,

    /// Abort the whole run on the first file that fails to parse,
    /// instead of skipping it.
    #[arg(long)]
    pub strict_parse: bool,

    /// List available patterns and exit.
    #[arg(long)]
    pub list: bool,

    /// Enable verbose diagnostics on stderr.
    #[arg(long)]
    pub verbose: bool,
}

/// Splits a comma-separated argument string into positional values and
/// key=value pairs. Empty segments are dropped.
#[must_use]
pub fn parse_pattern_args(arg_string: &str) -> (Vec<String>, Vec<(String, String)>) {
    let mut positional = Vec::new();
    let mut named = Vec::new();
    for arg in arg_string.split(',') {
        let arg = arg.trim();
        if arg.is_empty() {
            continue;
        }
        match arg.split_once('=') {
            Some((key, value)) => named.push((key.trim().to_owned(), value.trim().to_owned())),
            None => positional.push(arg.to_owned()),
        }
    }
    (positional, named)
}

/// Splits a comma-separated list option, dropping empty segments.
#[must_use]
pub fn parse_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|segment| !segment.is_empty())
        .map(str::to_owned)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_positional_and_named_args() {
        let (positional, named) = parse_pattern_args("foo, bar ,a=1, b = 2 ,");
        assert_eq!(positional, ["foo", "bar"]);
        assert_eq!(
            named,
            [
                ("a".to_owned(), "1".to_owned()),
                ("b".to_owned(), "2".to_owned())
            ]
        );
    }

    #[test]
    fn empty_arg_string_yields_nothing() {
        let (positional, named) = parse_pattern_args("");
        assert!(positional.is_empty());
        assert!(named.is_empty());
    }

    #[test]
    fn cli_parses_defaults() {
        let cli = Cli::try_parse_from(["pyastscan", "call", "-a", "eval"]).unwrap();
        assert_eq!(cli.pattern.as_deref(), Some("call"));
        assert_eq!(cli.pattern_args, "eval");
        assert_eq!(cli.extensions, "py");
        assert_eq!(cli.skip, "tests");
        assert!(!cli.grepable);
    }
}
