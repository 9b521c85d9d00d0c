//! Generic syntax tree consumed by the traversal engine.
//!
//! The external parser produces a typed AST; `lower` converts it into this
//! uniform representation: every node carries a kind tag, ordered named
//! fields (child node, child list, or primitive value) and an optional
//! 1-indexed line range. Nodes are immutable once built and owned by the
//! tree for the duration of one file's scan.

mod lower;

pub use lower::parse;

use compact_str::CompactString;
use std::fmt::Write as _;

/// Syntactic category of a tree node. Kind names follow the Python AST
/// node class names since they surface in user-facing output (control-flow
/// context chains and the `print` debug pattern).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[allow(missing_docs)]
pub enum NodeKind {
    Module,
    FunctionDef,
    ClassDef,
    Return,
    Delete,
    Assign,
    AugAssign,
    AnnAssign,
    TypeAlias,
    For,
    While,
    If,
    With,
    Match,
    Raise,
    Try,
    Assert,
    Import,
    ImportFrom,
    Global,
    Nonlocal,
    Expr,
    Pass,
    Break,
    Continue,
    BoolOp,
    NamedExpr,
    BinOp,
    UnaryOp,
    Lambda,
    IfExp,
    Dict,
    Set,
    ListComp,
    SetComp,
    DictComp,
    GeneratorExp,
    Await,
    Yield,
    YieldFrom,
    Compare,
    Call,
    JoinedStr,
    FormattedValue,
    Constant,
    Attribute,
    Subscript,
    Starred,
    Name,
    List,
    Tuple,
    Slice,
    ExceptHandler,
    Arguments,
    Arg,
    Keyword,
    Alias,
    Withitem,
    Comprehension,
    MatchCase,
    MatchValue,
    MatchSingleton,
    MatchSequence,
    MatchMapping,
    MatchClass,
    MatchStar,
    MatchAs,
    MatchOr,
    /// Anything the lowering does not model; carries no children.
    Unknown,
}

impl NodeKind {
    /// Display name of the kind, matching the Python AST class name.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            NodeKind::Module => "Module",
            NodeKind::FunctionDef => "FunctionDef",
            NodeKind::ClassDef => "ClassDef",
            NodeKind::Return => "Return",
            NodeKind::Delete => "Delete",
            NodeKind::Assign => "Assign",
            NodeKind::AugAssign => "AugAssign",
            NodeKind::AnnAssign => "AnnAssign",
            NodeKind::TypeAlias => "TypeAlias",
            NodeKind::For => "For",
            NodeKind::While => "While",
            NodeKind::If => "If",
            NodeKind::With => "With",
            NodeKind::Match => "Match",
            NodeKind::Raise => "Raise",
            NodeKind::Try => "Try",
            NodeKind::Assert => "Assert",
            NodeKind::Import => "Import",
            NodeKind::ImportFrom => "ImportFrom",
            NodeKind::Global => "Global",
            NodeKind::Nonlocal => "Nonlocal",
            NodeKind::Expr => "Expr",
            NodeKind::Pass => "Pass",
            NodeKind::Break => "Break",
            NodeKind::Continue => "Continue",
            NodeKind::BoolOp => "BoolOp",
            NodeKind::NamedExpr => "NamedExpr",
            NodeKind::BinOp => "BinOp",
            NodeKind::UnaryOp => "UnaryOp",
            NodeKind::Lambda => "Lambda",
            NodeKind::IfExp => "IfExp",
            NodeKind::Dict => "Dict",
            NodeKind::Set => "Set",
            NodeKind::ListComp => "ListComp",
            NodeKind::SetComp => "SetComp",
            NodeKind::DictComp => "DictComp",
            NodeKind::GeneratorExp => "GeneratorExp",
            NodeKind::Await => "Await",
            NodeKind::Yield => "Yield",
            NodeKind::YieldFrom => "YieldFrom",
            NodeKind::Compare => "Compare",
            NodeKind::Call => "Call",
            NodeKind::JoinedStr => "JoinedStr",
            NodeKind::FormattedValue => "FormattedValue",
            NodeKind::Constant => "Constant",
            NodeKind::Attribute => "Attribute",
            NodeKind::Subscript => "Subscript",
            NodeKind::Starred => "Starred",
            NodeKind::Name => "Name",
            NodeKind::List => "List",
            NodeKind::Tuple => "Tuple",
            NodeKind::Slice => "Slice",
            NodeKind::ExceptHandler => "ExceptHandler",
            NodeKind::Arguments => "Arguments",
            NodeKind::Arg => "Arg",
            NodeKind::Keyword => "Keyword",
            NodeKind::Alias => "Alias",
            NodeKind::Withitem => "Withitem",
            NodeKind::Comprehension => "Comprehension",
            NodeKind::MatchCase => "MatchCase",
            NodeKind::MatchValue => "MatchValue",
            NodeKind::MatchSingleton => "MatchSingleton",
            NodeKind::MatchSequence => "MatchSequence",
            NodeKind::MatchMapping => "MatchMapping",
            NodeKind::MatchClass => "MatchClass",
            NodeKind::MatchStar => "MatchStar",
            NodeKind::MatchAs => "MatchAs",
            NodeKind::MatchOr => "MatchOr",
            NodeKind::Unknown => "Unknown",
        }
    }

    /// Kinds that open a function/class scope frame.
    #[must_use]
    pub fn is_function_scope(self) -> bool {
        matches!(self, NodeKind::ClassDef | NodeKind::FunctionDef)
    }

    /// Kinds that open a control-flow scope frame.
    #[must_use]
    pub fn is_control_flow_scope(self) -> bool {
        matches!(
            self,
            NodeKind::For
                | NodeKind::While
                | NodeKind::If
                | NodeKind::Try
                | NodeKind::With
                | NodeKind::ExceptHandler
        )
    }
}

/// One named field of a node.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    /// A single child node.
    Node(Box<Node>),
    /// An ordered list of child nodes.
    Nodes(Vec<Node>),
    /// An identifier or string value.
    Str(CompactString),
    /// A list of identifiers (e.g. `global a, b`).
    StrList(Vec<CompactString>),
    /// An integer value.
    Int(i64),
    /// A floating point value.
    Float(f64),
    /// A boolean value.
    Bool(bool),
    /// Python `None`.
    Null,
}

/// A single syntax tree node.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    /// Syntactic category.
    pub kind: NodeKind,
    /// Named fields in declaration order.
    pub fields: Vec<(&'static str, FieldValue)>,
    /// 1-indexed (start, end) line range; `None` for synthetic nodes.
    pub lines: Option<(usize, usize)>,
}

impl Node {
    /// Creates a node with no fields.
    #[must_use]
    pub fn new(kind: NodeKind, lines: Option<(usize, usize)>) -> Self {
        Self {
            kind,
            fields: Vec::new(),
            lines,
        }
    }

    /// Appends a single-node field.
    pub fn add_node(&mut self, name: &'static str, node: Node) {
        self.fields.push((name, FieldValue::Node(Box::new(node))));
    }

    /// Appends a node-list field.
    pub fn add_nodes(&mut self, name: &'static str, nodes: Vec<Node>) {
        self.fields.push((name, FieldValue::Nodes(nodes)));
    }

    /// Appends a string field.
    pub fn add_str(&mut self, name: &'static str, value: &str) {
        self.fields
            .push((name, FieldValue::Str(CompactString::from(value))));
    }

    /// Appends an arbitrary primitive field.
    pub fn add_value(&mut self, name: &'static str, value: FieldValue) {
        self.fields.push((name, value));
    }

    /// Looks up a field by name.
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&FieldValue> {
        self.fields
            .iter()
            .find(|(field, _)| *field == name)
            .map(|(_, value)| value)
    }

    /// Returns the node stored in a single-node field.
    #[must_use]
    pub fn child(&self, name: &str) -> Option<&Node> {
        match self.field(name) {
            Some(FieldValue::Node(node)) => Some(node),
            _ => None,
        }
    }

    /// Returns the nodes of a list field, or an empty slice.
    #[must_use]
    pub fn list(&self, name: &str) -> &[Node] {
        match self.field(name) {
            Some(FieldValue::Nodes(nodes)) => nodes,
            _ => &[],
        }
    }

    /// Returns a string field's value.
    #[must_use]
    pub fn str_field(&self, name: &str) -> Option<&str> {
        match self.field(name) {
            Some(FieldValue::Str(value)) => Some(value),
            _ => None,
        }
    }

    /// All node-valued children in field declaration order, list fields
    /// expanded element by element. Primitive fields are not yielded.
    pub fn children(&self) -> impl Iterator<Item = &Node> {
        self.fields.iter().flat_map(|(_, value)| match value {
            FieldValue::Node(node) => std::slice::from_ref(node.as_ref()).iter(),
            FieldValue::Nodes(nodes) => nodes.iter(),
            _ => [].iter(),
        })
    }

    /// Iterates the node and every descendant (work-list based; traversal
    /// order is unspecified).
    #[must_use]
    pub fn descendants(&self) -> Descendants<'_> {
        Descendants { stack: vec![self] }
    }

    /// Indented textual dump of the subtree, cut off below `max_depth`.
    #[must_use]
    pub fn dump(&self, max_depth: Option<usize>) -> String {
        let mut out = String::new();
        self.dump_into(&mut out, 0, max_depth);
        out
    }

    fn dump_into(&self, out: &mut String, depth: usize, max_depth: Option<usize>) {
        let pad = "  ".repeat(depth);
        let _ = write!(out, "{pad}{}", self.kind.name());
        if let Some((start, end)) = self.lines {
            let _ = write!(out, " [{start}..{end}]");
        }
        out.push('\n');
        if max_depth.is_some_and(|limit| depth >= limit) {
            return;
        }
        for (name, value) in &self.fields {
            match value {
                FieldValue::Node(node) => {
                    let _ = writeln!(out, "{pad}  {name}:");
                    node.dump_into(out, depth + 2, max_depth);
                }
                FieldValue::Nodes(nodes) => {
                    if nodes.is_empty() {
                        continue;
                    }
                    let _ = writeln!(out, "{pad}  {name}:");
                    for node in nodes {
                        node.dump_into(out, depth + 2, max_depth);
                    }
                }
                FieldValue::Str(value) => {
                    let _ = writeln!(out, "{pad}  {name}: {value:?}");
                }
                FieldValue::StrList(values) => {
                    let _ = writeln!(out, "{pad}  {name}: {values:?}");
                }
                FieldValue::Int(value) => {
                    let _ = writeln!(out, "{pad}  {name}: {value}");
                }
                FieldValue::Float(value) => {
                    let _ = writeln!(out, "{pad}  {name}: {value}");
                }
                FieldValue::Bool(value) => {
                    let _ = writeln!(out, "{pad}  {name}: {}", if *value { "True" } else { "False" });
                }
                FieldValue::Null => {
                    let _ = writeln!(out, "{pad}  {name}: None");
                }
            }
        }
    }
}

/// Iterator over a subtree, produced by [`Node::descendants`].
pub struct Descendants<'a> {
    stack: Vec<&'a Node>,
}

impl<'a> Iterator for Descendants<'a> {
    type Item = &'a Node;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        self.stack.extend(node.children());
        Some(node)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn name_node(id: &str) -> Node {
        let mut node = Node::new(NodeKind::Name, Some((1, 1)));
        node.add_str("id", id);
        node
    }

    #[test]
    fn field_lookup_and_children_order() {
        let mut call = Node::new(NodeKind::Call, Some((1, 1)));
        call.add_node("func", name_node("f"));
        call.add_nodes("args", vec![name_node("a"), name_node("b")]);
        call.add_value("level", FieldValue::Int(0));

        assert!(call.child("func").is_some());
        assert_eq!(call.list("args").len(), 2);
        assert!(call.field("level").is_some());
        assert!(call.field("missing").is_none());

        let ids: Vec<_> = call
            .children()
            .filter_map(|child| child.str_field("id"))
            .collect();
        assert_eq!(ids, ["f", "a", "b"]);
    }

    #[test]
    fn descendants_cover_nested_nodes() {
        let mut inner = Node::new(NodeKind::List, None);
        inner.add_nodes("elts", vec![name_node("x")]);
        let mut outer = Node::new(NodeKind::Assign, None);
        outer.add_nodes("targets", vec![name_node("y")]);
        outer.add_node("value", inner);

        assert_eq!(outer.descendants().count(), 4);
        assert!(outer
            .descendants()
            .any(|node| node.str_field("id") == Some("x")));
    }

    #[test]
    fn dump_respects_depth_limit() {
        let mut outer = Node::new(NodeKind::Expr, Some((1, 2)));
        outer.add_node("value", name_node("deep"));

        let full = outer.dump(None);
        assert!(full.contains("Name"));
        assert!(full.contains("\"deep\""));

        let shallow = outer.dump(Some(0));
        assert!(shallow.contains("Expr"));
        assert!(!shallow.contains("Name"));
    }
}
