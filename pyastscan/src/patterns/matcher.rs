//! Reusable matching strategies layered under the built-in patterns.

use crate::errors::ConfigError;
use crate::tree::{FieldValue, Node, NodeKind};
use regex::Regex;

/// Where a parameter's value comes from when matching a node.
#[derive(Debug, Clone, Copy)]
pub enum ValueSource {
    /// A sequence of attribute hops into the node's fields.
    Path(&'static [&'static str]),
    /// The decomposed call target's root name (`join` in `os.path.join`).
    CallName,
    /// The decomposed call target's qualifier path, innermost first
    /// (`["path", "os"]` in `os.path.join`).
    CallPath,
}

/// Value computed for one parameter at match time.
#[derive(Debug, Clone, PartialEq)]
pub enum PathValue {
    /// The field (or call target) does not exist; always fails the match.
    Absent,
    /// A string value.
    Str(String),
    /// A list of strings; a regex matches if any element matches.
    List(Vec<String>),
    /// An integer; never regex-matched.
    Int(i64),
    /// A float; never regex-matched.
    Float(f64),
    /// A boolean; never regex-matched.
    Bool(bool),
    /// Python `None`; never regex-matched.
    Null,
}

impl PathValue {
    fn matches(&self, regex: &Regex) -> bool {
        match self {
            PathValue::Str(value) => regex.is_match(value),
            PathValue::List(values) => values.iter().any(|value| regex.is_match(value)),
            _ => false,
        }
    }

    /// Display form used as a finding's label.
    #[must_use]
    pub fn label(&self) -> String {
        match self {
            PathValue::Absent => String::new(),
            PathValue::Str(value) => value.clone(),
            PathValue::List(values) => values.join("."),
            PathValue::Int(value) => value.to_string(),
            PathValue::Float(value) => value.to_string(),
            PathValue::Bool(value) => if *value { "True" } else { "False" }.to_owned(),
            PathValue::Null => "None".to_owned(),
        }
    }
}

/// One parameter of a typed matcher: a value source plus an optional
/// anchored regex filter.
#[derive(Debug)]
pub struct ParamMatcher {
    name: &'static str,
    source: ValueSource,
    regex: Option<Regex>,
}

impl ParamMatcher {
    /// Builds a parameter matcher, compiling the filter regex if a value
    /// was configured. The regex is anchored as `^(?:value)$` so matching
    /// is always full-match, alternation included.
    pub fn new(
        pattern: &'static str,
        name: &'static str,
        source: ValueSource,
        value: Option<&str>,
    ) -> Result<Self, ConfigError> {
        let regex = value
            .map(|value| {
                Regex::new(&format!("^(?:{value})$")).map_err(|err| ConfigError::InvalidValue {
                    pattern,
                    name,
                    message: err.to_string(),
                })
            })
            .transpose()?;
        Ok(Self {
            name,
            source,
            regex,
        })
    }

    /// Parameter name, for diagnostics.
    #[must_use]
    pub fn name(&self) -> &'static str {
        self.name
    }

    fn resolve(&self, node: &Node) -> PathValue {
        match self.source {
            ValueSource::Path(path) => resolve_path(node, path),
            ValueSource::CallName => call_target(node)
                .map_or(PathValue::Absent, |(name, _)| PathValue::Str(name)),
            ValueSource::CallPath => call_target(node)
                .map_or(PathValue::Absent, |(_, path)| PathValue::List(path)),
        }
    }
}

/// Typed-attribute-path matching against one node kind.
///
/// Parameters are evaluated in reverse declaration order; the value
/// produced by the last evaluation (the first-declared parameter) is the
/// match's display label, so the primary identifying parameter always
/// labels the finding no matter how many secondary filters exist.
#[derive(Debug)]
pub struct TypedMatcher {
    kind: NodeKind,
    params: Vec<ParamMatcher>,
}

impl TypedMatcher {
    /// Creates a matcher for one node kind.
    #[must_use]
    pub fn new(kind: NodeKind, params: Vec<ParamMatcher>) -> Self {
        Self { kind, params }
    }

    /// The node kind this matcher applies to.
    #[must_use]
    pub fn kind(&self) -> NodeKind {
        self.kind
    }

    /// Tests one node; `Some(label)` on a match.
    #[must_use]
    pub fn is_match(&self, node: &Node) -> Option<String> {
        if node.kind != self.kind {
            return None;
        }
        let mut label = String::new();
        for param in self.params.iter().rev() {
            let value = param.resolve(node);
            if value == PathValue::Absent {
                return None;
            }
            if let Some(regex) = &param.regex {
                if !value.matches(regex) {
                    return None;
                }
            }
            label = value.label();
        }
        Some(label)
    }

    /// Nested-element matching: tests candidates in order and stops at the
    /// first match, so a container is flagged at most once.
    #[must_use]
    pub fn match_first<'n>(
        &self,
        elements: impl IntoIterator<Item = &'n Node>,
    ) -> Option<String> {
        elements
            .into_iter()
            .find_map(|element| self.is_match(element))
    }
}

fn field_value(value: &FieldValue) -> PathValue {
    match value {
        FieldValue::Str(value) => PathValue::Str(value.to_string()),
        FieldValue::StrList(values) => {
            PathValue::List(values.iter().map(ToString::to_string).collect())
        }
        FieldValue::Int(value) => PathValue::Int(*value),
        FieldValue::Float(value) => PathValue::Float(*value),
        FieldValue::Bool(value) => PathValue::Bool(*value),
        FieldValue::Null => PathValue::Null,
        FieldValue::Node(_) | FieldValue::Nodes(_) => PathValue::Absent,
    }
}

/// Walks an attribute path. Intermediate hops must be single-node fields;
/// the final hop yields the primitive value. Anything else is absent.
fn resolve_path(node: &Node, path: &[&str]) -> PathValue {
    let mut current = node;
    for (i, hop) in path.iter().enumerate() {
        match current.field(hop) {
            Some(FieldValue::Node(child)) if i + 1 < path.len() => current = child,
            Some(value) if i + 1 == path.len() => return field_value(value),
            _ => return PathValue::Absent,
        }
    }
    PathValue::Absent
}

/// Call-target decomposition: walks a call's target expression from the
/// outermost attribute access inward, collecting each hop's attribute name
/// until a root identifier is reached. Returns the root segment (the
/// call's name) and the remaining hops, qualifiers closest to the call
/// first. Non-resolvable targets (computed expressions) yield `None`.
#[must_use]
pub fn call_target(node: &Node) -> Option<(String, Vec<String>)> {
    let mut elements: Vec<String> = Vec::new();
    let mut current = node.child("func")?;
    loop {
        match current.kind {
            NodeKind::Name => {
                elements.push(current.str_field("id")?.to_owned());
                break;
            }
            NodeKind::Attribute => {
                elements.push(current.str_field("attr")?.to_owned());
                current = current.child("value")?;
            }
            _ => break,
        }
    }
    let (name, path) = elements.split_first()?;
    Some((name.clone(), path.to_vec()))
}

/// Dotted-path reconstruction for chained attribute access: resolves the
/// base (name or literal) and appends each attribute hop, producing a
/// single dotted string (`a.b.c`).
#[must_use]
pub fn dotted_name(node: &Node) -> Option<String> {
    match node.kind {
        NodeKind::Name => node.str_field("id").map(str::to_owned),
        NodeKind::Constant => node.field("value").map(|value| field_value(value).label()),
        NodeKind::Attribute => {
            let base = dotted_name(node.child("value")?)?;
            let attr = node.str_field("attr")?;
            Some(format!("{base}.{attr}"))
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::parse;

    fn first_call(source: &str) -> Node {
        let tree = parse(source).unwrap();
        tree.descendants()
            .find(|node| node.kind == NodeKind::Call)
            .cloned()
            .unwrap()
    }

    #[test]
    fn decomposes_qualified_calls() {
        let call = first_call("os.path.join(x)\n");
        let (name, path) = call_target(&call).unwrap();
        assert_eq!(name, "join");
        assert_eq!(path, ["path", "os"]);
    }

    #[test]
    fn plain_calls_have_empty_paths() {
        let call = first_call("f(x)\n");
        let (name, path) = call_target(&call).unwrap();
        assert_eq!(name, "f");
        assert!(path.is_empty());
    }

    #[test]
    fn computed_call_targets_do_not_resolve() {
        let call = first_call("funcs[0](x)\n");
        assert!(call_target(&call).is_none());
    }

    #[test]
    fn reconstructs_dotted_paths() {
        let tree = parse("a.b.c\n").unwrap();
        let attr = tree.list("body")[0].child("value").unwrap();
        assert_eq!(dotted_name(attr), Some("a.b.c".to_owned()));
    }

    #[test]
    fn label_comes_from_first_declared_parameter() {
        let call = first_call("os.path.join(x)\n");
        let matcher = TypedMatcher::new(
            NodeKind::Call,
            vec![
                ParamMatcher::new("call", "name", ValueSource::CallName, None).unwrap(),
                ParamMatcher::new("call", "path", ValueSource::CallPath, Some("path|os"))
                    .unwrap(),
            ],
        );
        assert_eq!(matcher.is_match(&call), Some("join".to_owned()));
    }

    #[test]
    fn regex_is_full_match() {
        let tree = parse("foobar = 1\n").unwrap();
        let name = &tree.list("body")[0].list("targets")[0];

        let matches = |value: &str| {
            TypedMatcher::new(
                NodeKind::Name,
                vec![ParamMatcher::new("name", "name", ValueSource::Path(&["id"]), Some(value))
                    .unwrap()],
            )
            .is_match(name)
            .is_some()
        };
        assert!(matches("foobar"));
        assert!(matches("foo.*"));
        assert!(!matches("foo"));
        // Alternation stays inside the anchors.
        assert!(!matches("foo|barbaz"));
    }

    #[test]
    fn absent_paths_fail_the_match() {
        let tree = parse("x = 1\n").unwrap();
        let name = &tree.list("body")[0].list("targets")[0];
        let matcher = TypedMatcher::new(
            NodeKind::Name,
            vec![ParamMatcher::new("name", "name", ValueSource::Path(&["missing"]), None)
                .unwrap()],
        );
        assert_eq!(matcher.is_match(name), None);
    }

    #[test]
    fn nested_match_short_circuits() {
        let tree = parse("[1, 'tmp', 'tmp']\n").unwrap();
        let list = tree.list("body")[0].child("value").unwrap();
        let matcher = TypedMatcher::new(
            NodeKind::Constant,
            vec![ParamMatcher::new(
                "list",
                "name",
                ValueSource::Path(&["value"]),
                Some("tmp"),
            )
            .unwrap()],
        );
        let labels: Vec<_> = matcher.match_first(list.list("elts")).into_iter().collect();
        assert_eq!(labels, ["tmp"]);
    }

    #[test]
    fn non_string_values_fail_regex_filters() {
        let tree = parse("42\n").unwrap();
        let constant = tree.list("body")[0].child("value").unwrap();
        let filtered = TypedMatcher::new(
            NodeKind::Constant,
            vec![ParamMatcher::new("constant", "name", ValueSource::Path(&["value"]), Some("42"))
                .unwrap()],
        );
        assert_eq!(filtered.is_match(constant), None);

        let unfiltered = TypedMatcher::new(
            NodeKind::Constant,
            vec![ParamMatcher::new("constant", "name", ValueSource::Path(&["value"]), None)
                .unwrap()],
        );
        assert_eq!(unfiltered.is_match(constant), Some("42".to_owned()));
    }
}
