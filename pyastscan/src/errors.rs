use std::path::PathBuf;
use thiserror::Error;

/// Configuration errors, surfaced before any scanning starts.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The requested pattern name is not in the registry.
    #[error("unknown pattern \"{0}\"")]
    UnknownPattern(String),

    /// A named argument does not match any declared parameter.
    #[error("pattern \"{pattern}\" has no parameter \"{name}\"")]
    UnknownParameter {
        /// Pattern the argument was given for.
        pattern: &'static str,
        /// The unrecognized parameter name.
        name: String,
    },

    /// More positional arguments than declared parameters.
    #[error("too many arguments for pattern \"{pattern}\" (expected at most {expected})")]
    TooManyArguments {
        /// Pattern the arguments were given for.
        pattern: &'static str,
        /// Number of declared parameters.
        expected: usize,
    },

    /// A value could not be parsed as the parameter's declared type, or a
    /// regex-valued parameter failed to compile.
    #[error("invalid value for parameter \"{name}\" of pattern \"{pattern}\": {message}")]
    InvalidValue {
        /// Pattern the value was given for.
        pattern: &'static str,
        /// The parameter that rejected the value.
        name: &'static str,
        /// Parser or regex compiler diagnostic.
        message: String,
    },
}

/// A single file failed to parse (or read).
#[derive(Debug, Error)]
#[error("{0}")]
pub struct ParseDiagnostic(pub String);

/// Fatal errors raised while a scan is running.
#[derive(Debug, Error)]
pub enum ScanError {
    /// A pattern read a shared fact that no registered previsitor
    /// populated. This is a programming/configuration error, not a
    /// per-file condition.
    #[error("pattern \"{pattern}\" requires shared fact \"{fact}\" which no previsitor populated")]
    MissingFacts {
        /// The pattern that performed the read.
        pattern: &'static str,
        /// The fact key that was missing.
        fact: &'static str,
    },

    /// A file failed to parse while strict parse handling was requested.
    #[error("failed to parse {}: {message}", file.display())]
    ParseAborted {
        /// The offending file.
        file: PathBuf,
        /// Parser diagnostic.
        message: String,
    },
}
