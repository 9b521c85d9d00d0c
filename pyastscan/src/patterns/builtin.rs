//! Built-in common patterns: generic typed-node matchers plus the debug
//! helpers (`dump`, `print`, `test`).

use super::matcher::{dotted_name, ParamMatcher, TypedMatcher, ValueSource};
use super::{Dispatch, ParamSpec, Pattern, PatternInfo, ResolvedArgs};
use crate::engine::NodeCtx;
use crate::errors::{ConfigError, ScanError};
use crate::tree::{Node, NodeKind};
use regex::Regex;

/// Generic pattern driven entirely by a [`TypedMatcher`].
struct TypedPattern {
    info: &'static PatternInfo,
    matcher: TypedMatcher,
}

impl Pattern for TypedPattern {
    fn info(&self) -> &'static PatternInfo {
        self.info
    }

    fn dispatch(&self) -> Dispatch {
        Dispatch::Kind(self.matcher.kind())
    }

    fn on_node(&mut self, node: &Node, ctx: &mut NodeCtx<'_>) -> Result<(), ScanError> {
        if let Some(label) = self.matcher.is_match(node) {
            ctx.report(label);
        }
        Ok(())
    }
}

fn single_param_matcher(
    info: &'static PatternInfo,
    kind: NodeKind,
    path: &'static [&'static str],
    args: &ResolvedArgs,
) -> Result<TypedMatcher, ConfigError> {
    Ok(TypedMatcher::new(
        kind,
        vec![ParamMatcher::new(
            info.name,
            "name",
            ValueSource::Path(path),
            args.str("name"),
        )?],
    ))
}

fn build_typed(
    info: &'static PatternInfo,
    kind: NodeKind,
    path: &'static [&'static str],
    args: &ResolvedArgs,
) -> Result<Box<dyn Pattern>, ConfigError> {
    Ok(Box::new(TypedPattern {
        info,
        matcher: single_param_matcher(info, kind, path, args)?,
    }))
}

/// Find all classes with matching name.
pub static CLASS: PatternInfo = PatternInfo {
    name: "class",
    help: "Find all classes with matching name",
    common: true,
    params: &[ParamSpec::str("name")],
    previsitors: &[],
    build: |args| build_typed(&CLASS, NodeKind::ClassDef, &["name"], args),
};

/// Find all functions and methods with matching name.
pub static FUNCTION: PatternInfo = PatternInfo {
    name: "function",
    help: "Find all functions and methods with matching name",
    common: true,
    params: &[ParamSpec::str("name")],
    previsitors: &[],
    build: |args| build_typed(&FUNCTION, NodeKind::FunctionDef, &["name"], args),
};

/// Find all matching names.
pub static NAME: PatternInfo = PatternInfo {
    name: "name",
    help: "Find all matching names",
    common: true,
    params: &[ParamSpec::str("name")],
    previsitors: &[],
    build: |args| build_typed(&NAME, NodeKind::Name, &["id"], args),
};

/// Find all constants with matching value.
pub static CONSTANT: PatternInfo = PatternInfo {
    name: "constant",
    help: "Find all constants with matching value",
    common: true,
    params: &[ParamSpec::str("name")],
    previsitors: &[],
    build: |args| build_typed(&CONSTANT, NodeKind::Constant, &["value"], args),
};

/// Find all function calls with matching name and qualifier path.
pub static CALL: PatternInfo = PatternInfo {
    name: "call",
    help: "Find all function calls with matching name",
    common: true,
    params: &[ParamSpec::str("name"), ParamSpec::str("path")],
    previsitors: &[],
    build: |args| {
        let matcher = TypedMatcher::new(
            NodeKind::Call,
            vec![
                ParamMatcher::new(CALL.name, "name", ValueSource::CallName, args.str("name"))?,
                ParamMatcher::new(CALL.name, "path", ValueSource::CallPath, args.str("path"))?,
            ],
        );
        Ok(Box::new(TypedPattern {
            info: &CALL,
            matcher,
        }))
    },
};

/// Find attribute accesses whose dotted path matches.
pub static ATTR: PatternInfo = PatternInfo {
    name: "attr",
    help: "Find attribute accesses with matching dotted path",
    common: true,
    params: &[ParamSpec::str("name")],
    previsitors: &[],
    build: |args| {
        let regex = args
            .str("name")
            .map(|value| {
                Regex::new(&format!("^(?:{value})$")).map_err(|err| ConfigError::InvalidValue {
                    pattern: ATTR.name,
                    name: "name",
                    message: err.to_string(),
                })
            })
            .transpose()?;
        Ok(Box::new(AttrPattern { regex }))
    },
};

struct AttrPattern {
    regex: Option<Regex>,
}

impl Pattern for AttrPattern {
    fn info(&self) -> &'static PatternInfo {
        &ATTR
    }

    fn dispatch(&self) -> Dispatch {
        Dispatch::Kind(NodeKind::Attribute)
    }

    fn on_node(&mut self, node: &Node, ctx: &mut NodeCtx<'_>) -> Result<(), ScanError> {
        if let Some(dotted) = dotted_name(node) {
            if self.regex.as_ref().is_none_or(|regex| regex.is_match(&dotted)) {
                ctx.report(dotted);
            }
        }
        Ok(())
    }
}

/// Find assignments with matching target names, flagging tuple-unpacking
/// targets at most once.
pub static ASSIGN: PatternInfo = PatternInfo {
    name: "assign",
    help: "Find assignments with matching names",
    common: true,
    params: &[ParamSpec::str("name")],
    previsitors: &[],
    build: |args| {
        Ok(Box::new(AssignPattern {
            matcher: single_param_matcher(&ASSIGN, NodeKind::Name, &["id"], args)?,
        }))
    },
};

struct AssignPattern {
    matcher: TypedMatcher,
}

impl Pattern for AssignPattern {
    fn info(&self) -> &'static PatternInfo {
        &ASSIGN
    }

    fn dispatch(&self) -> Dispatch {
        Dispatch::Kind(NodeKind::Assign)
    }

    fn on_node(&mut self, node: &Node, ctx: &mut NodeCtx<'_>) -> Result<(), ScanError> {
        for target in node.list("targets") {
            if target.kind == NodeKind::Tuple {
                if let Some(label) = self.matcher.match_first(target.list("elts")) {
                    ctx.report(label);
                    return Ok(());
                }
            }
            if let Some(label) = self.matcher.is_match(target) {
                ctx.report(label);
                return Ok(());
            }
        }
        Ok(())
    }
}

/// Find dicts containing a matching constant key or value.
pub static DICT: PatternInfo = PatternInfo {
    name: "dict",
    help: "Find all dicts with matching item constant value",
    common: true,
    params: &[ParamSpec::str("name")],
    previsitors: &[],
    build: |args| {
        Ok(Box::new(DictPattern {
            matcher: single_param_matcher(&DICT, NodeKind::Constant, &["value"], args)?,
        }))
    },
};

struct DictPattern {
    matcher: TypedMatcher,
}

impl Pattern for DictPattern {
    fn info(&self) -> &'static PatternInfo {
        &DICT
    }

    fn dispatch(&self) -> Dispatch {
        Dispatch::Kind(NodeKind::Dict)
    }

    fn on_node(&mut self, node: &Node, ctx: &mut NodeCtx<'_>) -> Result<(), ScanError> {
        // Keys take precedence; one finding per dict at most.
        let label = self
            .matcher
            .match_first(node.list("keys"))
            .or_else(|| self.matcher.match_first(node.list("values")));
        if let Some(label) = label {
            ctx.report(label);
        }
        Ok(())
    }
}

/// Find lists containing a matching constant element.
pub static LIST: PatternInfo = PatternInfo {
    name: "list",
    help: "Find all lists with matching constant value",
    common: true,
    params: &[ParamSpec::str("name")],
    previsitors: &[],
    build: |args| {
        Ok(Box::new(ListPattern {
            matcher: single_param_matcher(&LIST, NodeKind::Constant, &["value"], args)?,
        }))
    },
};

struct ListPattern {
    matcher: TypedMatcher,
}

impl Pattern for ListPattern {
    fn info(&self) -> &'static PatternInfo {
        &LIST
    }

    fn dispatch(&self) -> Dispatch {
        Dispatch::Kind(NodeKind::List)
    }

    fn on_node(&mut self, node: &Node, ctx: &mut NodeCtx<'_>) -> Result<(), ScanError> {
        if let Some(label) = self.matcher.match_first(node.list("elts")) {
            ctx.report(label);
        }
        Ok(())
    }
}

/// Dump every visited node's subtree.
pub static DUMP: PatternInfo = PatternInfo {
    name: "dump",
    help: "Dump the syntax tree",
    common: true,
    params: &[ParamSpec::int("depth")],
    previsitors: &[],
    build: |args| {
        Ok(Box::new(DumpPattern {
            depth: args.int("depth").and_then(|depth| usize::try_from(depth).ok()),
        }))
    },
};

struct DumpPattern {
    depth: Option<usize>,
}

impl Pattern for DumpPattern {
    fn info(&self) -> &'static PatternInfo {
        &DUMP
    }

    fn on_node(&mut self, node: &Node, ctx: &mut NodeCtx<'_>) -> Result<(), ScanError> {
        ctx.report_with(node.dump(self.depth), false);
        Ok(())
    }
}

/// Print every visited node's kind name.
pub static PRINT: PatternInfo = PatternInfo {
    name: "print",
    help: "Print node names",
    common: true,
    params: &[],
    previsitors: &[],
    build: |_| Ok(Box::new(PrintPattern)),
};

struct PrintPattern;

impl Pattern for PrintPattern {
    fn info(&self) -> &'static PatternInfo {
        &PRINT
    }

    fn on_node(&mut self, node: &Node, ctx: &mut NodeCtx<'_>) -> Result<(), ScanError> {
        ctx.report_with(node.kind.name(), false);
        Ok(())
    }
}

/// Visit everything, report nothing. Useful for timing traversals.
pub static TEST: PatternInfo = PatternInfo {
    name: "test",
    help: "Do nothing",
    common: true,
    params: &[],
    previsitors: &[],
    build: |_| Ok(Box::new(TestPattern)),
};

struct TestPattern;

impl Pattern for TestPattern {
    fn info(&self) -> &'static PatternInfo {
        &TEST
    }

    fn on_node(&mut self, _node: &Node, _ctx: &mut NodeCtx<'_>) -> Result<(), ScanError> {
        Ok(())
    }
}
