//! Curated custom patterns: checks with fixed semantics rather than
//! user-supplied match configuration.

use super::previsit::FACT_NAMES;
use super::{Dispatch, ParamSpec, Pattern, PatternInfo, PrevisitorKind};
use crate::engine::NodeCtx;
use crate::errors::{ConfigError, ScanError};
use crate::tree::{FieldValue, Node, NodeKind};
use regex::Regex;

/// Loops with an `else` clause that always runs: without a `break` (or
/// `return`) anywhere in the loop, the `else` is unconditional and almost
/// certainly not what the author meant.
pub static FORELSE: PatternInfo = PatternInfo {
    name: "forelse",
    help: "Find for/while loops whose else clause always triggers",
    common: false,
    params: &[],
    previsitors: &[],
    build: |_| Ok(Box::new(ForElsePattern)),
};

struct ForElsePattern;

impl Pattern for ForElsePattern {
    fn info(&self) -> &'static PatternInfo {
        &FORELSE
    }

    fn dispatch(&self) -> Dispatch {
        Dispatch::Kinds(&[NodeKind::For, NodeKind::While])
    }

    fn on_node(&mut self, node: &Node, ctx: &mut NodeCtx<'_>) -> Result<(), ScanError> {
        if node.list("orelse").is_empty() {
            return Ok(());
        }
        let has_exit = node
            .descendants()
            .any(|descendant| matches!(descendant.kind, NodeKind::Break | NodeKind::Return));
        if !has_exit {
            ctx.report(format!("{} with else", node.kind.name()));
        }
        Ok(())
    }
}

/// `s.replace(a, b)` (or `re.sub`) where both literals are strings and the
/// replacement is contained in the original: the call replaces a string
/// with its own substring, which is usually a typo.
pub static REPLACE_WITH_SUBSTRING: PatternInfo = PatternInfo {
    name: "replace_with_substring",
    help: "Find replace of a string with a substring or an empty string",
    common: false,
    params: &[],
    previsitors: &[],
    build: |_| Ok(Box::new(ReplaceWithSubstringPattern)),
};

struct ReplaceWithSubstringPattern;

impl Pattern for ReplaceWithSubstringPattern {
    fn info(&self) -> &'static PatternInfo {
        &REPLACE_WITH_SUBSTRING
    }

    fn dispatch(&self) -> Dispatch {
        Dispatch::Kind(NodeKind::Call)
    }

    fn on_node(&mut self, node: &Node, ctx: &mut NodeCtx<'_>) -> Result<(), ScanError> {
        let Some(func) = node.child("func") else {
            return Ok(());
        };
        if func.kind != NodeKind::Attribute
            || !matches!(func.str_field("attr"), Some("replace" | "sub"))
        {
            return Ok(());
        }
        let args = node.list("args");
        let (Some(original), Some(replacement)) = (args.first(), args.get(1)) else {
            return Ok(());
        };
        let (Some(original), Some(replacement)) = (
            string_constant(original),
            string_constant(replacement),
        ) else {
            return Ok(());
        };
        if !original.is_empty() && original.contains(replacement) {
            ctx.report("Replace with substring");
        }
        Ok(())
    }
}

fn string_constant(node: &Node) -> Option<&str> {
    if node.kind != NodeKind::Constant {
        return None;
    }
    node.str_field("value")
}

/// Classes whose name is never referenced anywhere in the corpus. Needs
/// the referenced-identifier facts gathered by the `names` previsitor.
pub static UNUSED_CLASSES: PatternInfo = PatternInfo {
    name: "unused_classes",
    help: "Find classes which are never directly referenced by name",
    common: false,
    params: &[ParamSpec::str("ignore")],
    previsitors: &[PrevisitorKind::Names],
    build: |args| {
        let ignore = args
            .str("ignore")
            .map(|value| {
                Regex::new(&format!("^(?:{value})$")).map_err(|err| {
                    ConfigError::InvalidValue {
                        pattern: UNUSED_CLASSES.name,
                        name: "ignore",
                        message: err.to_string(),
                    }
                })
            })
            .transpose()?;
        Ok(Box::new(UnusedClassesPattern { ignore }))
    },
};

struct UnusedClassesPattern {
    ignore: Option<Regex>,
}

impl Pattern for UnusedClassesPattern {
    fn info(&self) -> &'static PatternInfo {
        &UNUSED_CLASSES
    }

    fn dispatch(&self) -> Dispatch {
        Dispatch::Kind(NodeKind::ClassDef)
    }

    fn on_node(&mut self, node: &Node, ctx: &mut NodeCtx<'_>) -> Result<(), ScanError> {
        let names = ctx.facts.get(FACT_NAMES).ok_or(ScanError::MissingFacts {
            pattern: UNUSED_CLASSES.name,
            fact: FACT_NAMES,
        })?;
        let Some(name) = node.str_field("name") else {
            return Ok(());
        };
        if names.contains(name) {
            return Ok(());
        }
        if self.ignore.as_ref().is_some_and(|regex| regex.is_match(name)) {
            return Ok(());
        }
        ctx.report_with("Potentially unused class", false);
        Ok(())
    }
}

/// Function definitions with a mutable literal as a parameter default.
/// The default is evaluated once and shared between calls.
pub static MUTABLE_DEFAULT: PatternInfo = PatternInfo {
    name: "mutable_default",
    help: "Find function parameters with mutable default values",
    common: false,
    params: &[],
    previsitors: &[],
    build: |_| Ok(Box::new(MutableDefaultPattern)),
};

struct MutableDefaultPattern;

impl Pattern for MutableDefaultPattern {
    fn info(&self) -> &'static PatternInfo {
        &MUTABLE_DEFAULT
    }

    fn dispatch(&self) -> Dispatch {
        Dispatch::Kind(NodeKind::FunctionDef)
    }

    fn on_node(&mut self, node: &Node, ctx: &mut NodeCtx<'_>) -> Result<(), ScanError> {
        let Some(args) = node.child("args") else {
            return Ok(());
        };
        let mutable = args
            .fields
            .iter()
            .filter(|(name, _)| matches!(*name, "defaults" | "kw_defaults"))
            .filter_map(|(_, value)| match value {
                FieldValue::Nodes(nodes) => Some(nodes.iter()),
                _ => None,
            })
            .flatten()
            .find(|default| {
                matches!(default.kind, NodeKind::Dict | NodeKind::List | NodeKind::Set)
            });
        if let Some(default) = mutable {
            ctx.report(format!("Mutable default argument ({})", default.kind.name()));
        }
        Ok(())
    }
}
