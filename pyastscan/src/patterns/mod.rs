//! Pattern framework: configuration, parameter typing, the `Pattern` and
//! `Previsitor` traits, matcher primitives and the built-in library.
//!
//! A pattern is described by a static [`PatternInfo`] entry (name, help,
//! classification, declared parameters, prerequisite previsitors, factory)
//! and instantiated per run from a [`PatternConfig`]. Behavior is composed
//! from matcher values rather than inherited: most built-ins hold a
//! [`matcher::TypedMatcher`] and differ only in configuration.

pub mod builtin;
pub mod custom;
pub mod matcher;
pub mod previsit;
pub mod registry;

pub use previsit::{Previsitor, PrevisitorKind};

use crate::engine::NodeCtx;
use crate::errors::{ConfigError, ScanError};
use crate::tree::{Node, NodeKind};

/// Declared type of a pattern parameter. Values are parsed by the typed
/// function table in [`resolve_args`]; there is no heuristic coercion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamType {
    /// Plain string (most regex-valued parameters).
    Str,
    /// Integer.
    Int,
    /// Boolean; accepts `true`/`false` case-insensitively.
    Bool,
}

/// One declared parameter of a pattern.
#[derive(Debug, Clone, Copy)]
pub struct ParamSpec {
    /// Parameter name, used for `key=value` arguments.
    pub name: &'static str,
    /// Declared type.
    pub ty: ParamType,
    /// Default raw value; `None` leaves the parameter absent.
    pub default: Option<&'static str>,
}

impl ParamSpec {
    /// Shorthand for an optional string parameter with no default.
    #[must_use]
    pub const fn str(name: &'static str) -> Self {
        Self {
            name,
            ty: ParamType::Str,
            default: None,
        }
    }

    /// Shorthand for an optional integer parameter with no default.
    #[must_use]
    pub const fn int(name: &'static str) -> Self {
        Self {
            name,
            ty: ParamType::Int,
            default: None,
        }
    }
}

/// A resolved parameter value.
#[derive(Debug, Clone, PartialEq)]
pub enum ParamValue {
    /// String value.
    Str(String),
    /// Integer value.
    Int(i64),
    /// Boolean value.
    Bool(bool),
    /// No value given and no default declared.
    Absent,
}

impl ParamValue {
    /// String content, if this is a string value.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            ParamValue::Str(value) => Some(value),
            _ => None,
        }
    }

    /// Integer content, if this is an integer value.
    #[must_use]
    pub fn as_int(&self) -> Option<i64> {
        match self {
            ParamValue::Int(value) => Some(*value),
            _ => None,
        }
    }

    /// Boolean content, if this is a boolean value.
    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            ParamValue::Bool(value) => Some(*value),
            _ => None,
        }
    }
}

/// Parses a raw value as the given declared type.
fn parse_value(ty: ParamType, raw: &str) -> Result<ParamValue, String> {
    match ty {
        ParamType::Str => Ok(ParamValue::Str(raw.to_owned())),
        ParamType::Int => raw
            .parse::<i64>()
            .map(ParamValue::Int)
            .map_err(|err| err.to_string()),
        ParamType::Bool => match raw.to_ascii_lowercase().as_str() {
            "true" => Ok(ParamValue::Bool(true)),
            "false" => Ok(ParamValue::Bool(false)),
            _ => Err(format!("expected true or false, got \"{raw}\"")),
        },
    }
}

/// One configured pattern as requested by the embedding application.
#[derive(Debug, Clone)]
pub struct PatternConfig {
    /// Registry name of the pattern.
    pub name: String,
    /// Positional argument values, matched to parameters in declaration
    /// order.
    pub positional: Vec<String>,
    /// Named argument values.
    pub named: Vec<(String, String)>,
}

impl PatternConfig {
    /// Config with no arguments.
    #[must_use]
    pub fn bare(name: &str) -> Self {
        Self {
            name: name.to_owned(),
            positional: Vec::new(),
            named: Vec::new(),
        }
    }

    /// Config with positional arguments only.
    #[must_use]
    pub fn with_args(name: &str, positional: &[&str]) -> Self {
        Self {
            name: name.to_owned(),
            positional: positional.iter().map(|&arg| arg.to_owned()).collect(),
            named: Vec::new(),
        }
    }
}

/// Parameter values resolved against a pattern's declared parameter list.
#[derive(Debug)]
pub struct ResolvedArgs {
    values: Vec<(&'static str, ParamValue)>,
}

impl ResolvedArgs {
    /// Returns a parameter's resolved value.
    #[must_use]
    pub fn get(&self, name: &str) -> &ParamValue {
        self.values
            .iter()
            .find(|(param, _)| *param == name)
            .map_or(&ParamValue::Absent, |(_, value)| value)
    }

    /// String content of a parameter, `None` when absent.
    #[must_use]
    pub fn str(&self, name: &str) -> Option<&str> {
        self.get(name).as_str()
    }

    /// Integer content of a parameter, `None` when absent.
    #[must_use]
    pub fn int(&self, name: &str) -> Option<i64> {
        self.get(name).as_int()
    }
}

/// Resolves a configuration's arguments against the declared parameters:
/// defaults first, then positional values in declaration order, then named
/// values. Unknown names, excess positionals and type mismatches are
/// configuration errors.
pub fn resolve_args(
    info: &'static PatternInfo,
    config: &PatternConfig,
) -> Result<ResolvedArgs, ConfigError> {
    let mut values: Vec<(&'static str, ParamValue)> = info
        .params
        .iter()
        .map(|spec| {
            let value = match spec.default {
                Some(default) => parse_value(spec.ty, default).map_err(|message| {
                    ConfigError::InvalidValue {
                        pattern: info.name,
                        name: spec.name,
                        message,
                    }
                })?,
                None => ParamValue::Absent,
            };
            Ok((spec.name, value))
        })
        .collect::<Result<_, ConfigError>>()?;

    if config.positional.len() > info.params.len() {
        return Err(ConfigError::TooManyArguments {
            pattern: info.name,
            expected: info.params.len(),
        });
    }
    for (spec, raw) in info.params.iter().zip(&config.positional) {
        let value =
            parse_value(spec.ty, raw).map_err(|message| ConfigError::InvalidValue {
                pattern: info.name,
                name: spec.name,
                message,
            })?;
        if let Some(slot) = values.iter_mut().find(|(name, _)| *name == spec.name) {
            slot.1 = value;
        }
    }

    for (name, raw) in &config.named {
        let spec = info
            .params
            .iter()
            .find(|spec| spec.name == name)
            .ok_or_else(|| ConfigError::UnknownParameter {
                pattern: info.name,
                name: name.clone(),
            })?;
        let value =
            parse_value(spec.ty, raw).map_err(|message| ConfigError::InvalidValue {
                pattern: info.name,
                name: spec.name,
                message,
            })?;
        if let Some(slot) = values.iter_mut().find(|(param, _)| *param == spec.name) {
            slot.1 = value;
        }
    }

    Ok(ResolvedArgs { values })
}

/// Static descriptor of a registered pattern.
pub struct PatternInfo {
    /// Stable registry name.
    pub name: &'static str,
    /// One-line help text.
    pub help: &'static str,
    /// Whether the pattern belongs to the common group (generic node
    /// matchers and debug helpers) or the custom group (curated checks).
    pub common: bool,
    /// Declared parameters in order.
    pub params: &'static [ParamSpec],
    /// Previsitors that must run over the corpus before this pattern.
    pub previsitors: &'static [PrevisitorKind],
    /// Factory producing a configured instance.
    pub build: fn(&ResolvedArgs) -> Result<Box<dyn Pattern>, ConfigError>,
}

/// Node-kind dispatch table of a pattern, resolved once at construction.
#[derive(Debug, Clone, Copy)]
pub enum Dispatch {
    /// The pattern's handler runs for every node.
    AllNodes,
    /// The handler runs only for one node kind.
    Kind(NodeKind),
    /// The handler runs for the listed node kinds.
    Kinds(&'static [NodeKind]),
}

/// A configured, stateful matcher unit bound to one traversal at a time.
///
/// Handlers must not fail on malformed or absent fields; missing data
/// resolves to an absent value and simply fails the match. The only error
/// a handler may raise is [`ScanError::MissingFacts`].
pub trait Pattern {
    /// The pattern's static descriptor.
    fn info(&self) -> &'static PatternInfo;

    /// Dispatch table; defaults to visiting every node.
    fn dispatch(&self) -> Dispatch {
        Dispatch::AllNodes
    }

    /// Handles one node.
    fn on_node(&mut self, node: &Node, ctx: &mut NodeCtx<'_>) -> Result<(), ScanError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    static COERCION: PatternInfo = PatternInfo {
        name: "coercion",
        help: "",
        common: true,
        params: &[
            ParamSpec {
                name: "count",
                ty: ParamType::Int,
                default: None,
            },
            ParamSpec {
                name: "enabled",
                ty: ParamType::Bool,
                default: None,
            },
            ParamSpec {
                name: "label",
                ty: ParamType::Str,
                default: Some("abc"),
            },
        ],
        previsitors: &[],
        build: |_| unreachable!(),
    };

    #[test]
    fn typed_coercion() {
        let config = PatternConfig::with_args("coercion", &["42", "TRUE"]);
        let args = resolve_args(&COERCION, &config).unwrap();
        assert_eq!(args.int("count"), Some(42));
        assert_eq!(args.get("enabled").as_bool(), Some(true));
        assert_eq!(args.str("label"), Some("abc"));
    }

    #[test]
    fn named_arguments_override_defaults() {
        let config = PatternConfig {
            name: "coercion".to_owned(),
            positional: Vec::new(),
            named: vec![("label".to_owned(), "xyz".to_owned())],
        };
        let args = resolve_args(&COERCION, &config).unwrap();
        assert_eq!(args.str("label"), Some("xyz"));
        assert_eq!(args.get("count"), &ParamValue::Absent);
    }

    #[test]
    fn bad_values_are_config_errors() {
        let config = PatternConfig::with_args("coercion", &["not-a-number"]);
        assert!(matches!(
            resolve_args(&COERCION, &config),
            Err(ConfigError::InvalidValue { name: "count", .. })
        ));

        let config = PatternConfig {
            name: "coercion".to_owned(),
            positional: Vec::new(),
            named: vec![("bogus".to_owned(), "1".to_owned())],
        };
        assert!(matches!(
            resolve_args(&COERCION, &config),
            Err(ConfigError::UnknownParameter { .. })
        ));

        let config = PatternConfig::with_args("coercion", &["1", "true", "x", "extra"]);
        assert!(matches!(
            resolve_args(&COERCION, &config),
            Err(ConfigError::TooManyArguments { .. })
        ));
    }
}
