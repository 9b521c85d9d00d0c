//! Lowering from the external parser's typed AST into the generic tree.
//!
//! Field names mirror the Python AST field names so that attribute paths
//! configured on patterns read the same as they would against the Python
//! `ast` module. Identifier-valued fields stay primitives (a function's
//! `name` is a string field, not a `Name` child), which keeps definition
//! sites out of the referenced-identifier facts.

use super::{FieldValue, Node, NodeKind};
use crate::errors::ParseDiagnostic;
use crate::utils::LineIndex;
use compact_str::CompactString;
use ruff_python_ast::{self as ast, Expr, Stmt};
use ruff_text_size::Ranged;

/// Parses one file's source into a generic tree rooted at a `Module` node.
pub fn parse(source: &str) -> Result<Node, ParseDiagnostic> {
    let parsed = ruff_python_parser::parse_module(source)
        .map_err(|err| ParseDiagnostic(err.to_string()))?;
    let module = parsed.into_syntax();
    let index = LineIndex::new(source);
    let lowerer = Lowerer { index: &index };

    let mut root = Node::new(NodeKind::Module, None);
    root.add_nodes("body", lowerer.stmts(&module.body));
    Ok(root)
}

struct Lowerer<'a> {
    index: &'a LineIndex,
}

impl Lowerer<'_> {
    fn lines(&self, ranged: &impl Ranged) -> Option<(usize, usize)> {
        let range = ranged.range();
        Some((self.index.line_of(range.start()), self.index.line_of(range.end())))
    }

    fn node(&self, kind: NodeKind, ranged: &impl Ranged) -> Node {
        Node::new(kind, self.lines(ranged))
    }

    fn stmts(&self, body: &[Stmt]) -> Vec<Node> {
        body.iter().map(|stmt| self.stmt(stmt)).collect()
    }

    fn exprs(&self, exprs: &[Expr]) -> Vec<Node> {
        exprs.iter().map(|expr| self.expr(expr)).collect()
    }

    fn stmt(&self, stmt: &Stmt) -> Node {
        match stmt {
            Stmt::FunctionDef(node) => {
                let mut out = self.node(NodeKind::FunctionDef, node);
                out.add_str("name", node.name.as_str());
                out.add_node("args", self.parameters(&node.parameters));
                out.add_nodes("body", self.stmts(&node.body));
                out.add_nodes(
                    "decorator_list",
                    node.decorator_list
                        .iter()
                        .map(|decorator| self.expr(&decorator.expression))
                        .collect(),
                );
                if let Some(returns) = &node.returns {
                    out.add_node("returns", self.expr(returns));
                }
                out
            }
            Stmt::ClassDef(node) => {
                let mut out = self.node(NodeKind::ClassDef, node);
                out.add_str("name", node.name.as_str());
                if let Some(arguments) = &node.arguments {
                    out.add_nodes("bases", self.exprs(&arguments.args));
                    out.add_nodes(
                        "keywords",
                        arguments
                            .keywords
                            .iter()
                            .map(|keyword| self.keyword(keyword))
                            .collect(),
                    );
                }
                out.add_nodes("body", self.stmts(&node.body));
                out.add_nodes(
                    "decorator_list",
                    node.decorator_list
                        .iter()
                        .map(|decorator| self.expr(&decorator.expression))
                        .collect(),
                );
                out
            }
            Stmt::Return(node) => {
                let mut out = self.node(NodeKind::Return, node);
                if let Some(value) = &node.value {
                    out.add_node("value", self.expr(value));
                }
                out
            }
            Stmt::Delete(node) => {
                let mut out = self.node(NodeKind::Delete, node);
                out.add_nodes("targets", self.exprs(&node.targets));
                out
            }
            Stmt::Assign(node) => {
                let mut out = self.node(NodeKind::Assign, node);
                out.add_nodes("targets", self.exprs(&node.targets));
                out.add_node("value", self.expr(&node.value));
                out
            }
            Stmt::AugAssign(node) => {
                let mut out = self.node(NodeKind::AugAssign, node);
                out.add_node("target", self.expr(&node.target));
                out.add_str("op", &format!("{:?}", node.op));
                out.add_node("value", self.expr(&node.value));
                out
            }
            Stmt::AnnAssign(node) => {
                let mut out = self.node(NodeKind::AnnAssign, node);
                out.add_node("target", self.expr(&node.target));
                out.add_node("annotation", self.expr(&node.annotation));
                if let Some(value) = &node.value {
                    out.add_node("value", self.expr(value));
                }
                out
            }
            Stmt::TypeAlias(node) => {
                let mut out = self.node(NodeKind::TypeAlias, node);
                out.add_node("name", self.expr(&node.name));
                out.add_node("value", self.expr(&node.value));
                out
            }
            Stmt::For(node) => {
                let mut out = self.node(NodeKind::For, node);
                out.add_node("target", self.expr(&node.target));
                out.add_node("iter", self.expr(&node.iter));
                out.add_nodes("body", self.stmts(&node.body));
                out.add_nodes("orelse", self.stmts(&node.orelse));
                out
            }
            Stmt::While(node) => {
                let mut out = self.node(NodeKind::While, node);
                out.add_node("test", self.expr(&node.test));
                out.add_nodes("body", self.stmts(&node.body));
                out.add_nodes("orelse", self.stmts(&node.orelse));
                out
            }
            Stmt::If(node) => {
                let mut out = self.node(NodeKind::If, node);
                out.add_node("test", self.expr(&node.test));
                out.add_nodes("body", self.stmts(&node.body));
                out.add_nodes("orelse", self.elif_chain(&node.elif_else_clauses));
                out
            }
            Stmt::With(node) => {
                let mut out = self.node(NodeKind::With, node);
                out.add_nodes(
                    "items",
                    node.items.iter().map(|item| self.with_item(item)).collect(),
                );
                out.add_nodes("body", self.stmts(&node.body));
                out
            }
            Stmt::Match(node) => {
                let mut out = self.node(NodeKind::Match, node);
                out.add_node("subject", self.expr(&node.subject));
                out.add_nodes(
                    "cases",
                    node.cases.iter().map(|case| self.match_case(case)).collect(),
                );
                out
            }
            Stmt::Raise(node) => {
                let mut out = self.node(NodeKind::Raise, node);
                if let Some(exc) = &node.exc {
                    out.add_node("exc", self.expr(exc));
                }
                if let Some(cause) = &node.cause {
                    out.add_node("cause", self.expr(cause));
                }
                out
            }
            Stmt::Try(node) => {
                let mut out = self.node(NodeKind::Try, node);
                out.add_nodes("body", self.stmts(&node.body));
                out.add_nodes(
                    "handlers",
                    node.handlers
                        .iter()
                        .map(|handler| self.except_handler(handler))
                        .collect(),
                );
                out.add_nodes("orelse", self.stmts(&node.orelse));
                out.add_nodes("finalbody", self.stmts(&node.finalbody));
                out
            }
            Stmt::Assert(node) => {
                let mut out = self.node(NodeKind::Assert, node);
                out.add_node("test", self.expr(&node.test));
                if let Some(msg) = &node.msg {
                    out.add_node("msg", self.expr(msg));
                }
                out
            }
            Stmt::Import(node) => {
                let mut out = self.node(NodeKind::Import, node);
                out.add_nodes(
                    "names",
                    node.names.iter().map(|alias| self.alias(alias)).collect(),
                );
                out
            }
            Stmt::ImportFrom(node) => {
                let mut out = self.node(NodeKind::ImportFrom, node);
                if let Some(module) = &node.module {
                    out.add_str("module", module.as_str());
                }
                out.add_nodes(
                    "names",
                    node.names.iter().map(|alias| self.alias(alias)).collect(),
                );
                out.add_value("level", FieldValue::Int(i64::from(node.level)));
                out
            }
            Stmt::Global(node) => {
                let mut out = self.node(NodeKind::Global, node);
                out.add_value(
                    "names",
                    FieldValue::StrList(
                        node.names
                            .iter()
                            .map(|name| CompactString::from(name.as_str()))
                            .collect(),
                    ),
                );
                out
            }
            Stmt::Nonlocal(node) => {
                let mut out = self.node(NodeKind::Nonlocal, node);
                out.add_value(
                    "names",
                    FieldValue::StrList(
                        node.names
                            .iter()
                            .map(|name| CompactString::from(name.as_str()))
                            .collect(),
                    ),
                );
                out
            }
            Stmt::Expr(node) => {
                let mut out = self.node(NodeKind::Expr, node);
                out.add_node("value", self.expr(&node.value));
                out
            }
            Stmt::Pass(node) => self.node(NodeKind::Pass, node),
            Stmt::Break(node) => self.node(NodeKind::Break, node),
            Stmt::Continue(node) => self.node(NodeKind::Continue, node),
            _ => Node::new(NodeKind::Unknown, None),
        }
    }

    /// Rebuilds the `elif`/`else` clause list as nested `If` nodes in the
    /// `orelse` field, the shape the Python AST exposes.
    fn elif_chain(&self, clauses: &[ast::ElifElseClause]) -> Vec<Node> {
        let Some((first, rest)) = clauses.split_first() else {
            return Vec::new();
        };
        match &first.test {
            Some(test) => {
                let mut out = self.node(NodeKind::If, first);
                out.add_node("test", self.expr(test));
                out.add_nodes("body", self.stmts(&first.body));
                out.add_nodes("orelse", self.elif_chain(rest));
                vec![out]
            }
            None => self.stmts(&first.body),
        }
    }

    fn with_item(&self, item: &ast::WithItem) -> Node {
        let mut out = self.node(NodeKind::Withitem, item);
        out.add_node("context_expr", self.expr(&item.context_expr));
        if let Some(vars) = &item.optional_vars {
            out.add_node("optional_vars", self.expr(vars));
        }
        out
    }

    fn except_handler(&self, handler: &ast::ExceptHandler) -> Node {
        let ast::ExceptHandler::ExceptHandler(node) = handler;
        let mut out = self.node(NodeKind::ExceptHandler, node);
        if let Some(type_) = &node.type_ {
            out.add_node("type", self.expr(type_));
        }
        if let Some(name) = &node.name {
            out.add_str("name", name.as_str());
        }
        out.add_nodes("body", self.stmts(&node.body));
        out
    }

    fn alias(&self, alias: &ast::Alias) -> Node {
        let mut out = self.node(NodeKind::Alias, alias);
        out.add_str("name", alias.name.as_str());
        if let Some(asname) = &alias.asname {
            out.add_str("asname", asname.as_str());
        }
        out
    }

    fn keyword(&self, keyword: &ast::Keyword) -> Node {
        let mut out = self.node(NodeKind::Keyword, keyword);
        if let Some(arg) = &keyword.arg {
            out.add_str("arg", arg.as_str());
        }
        out.add_node("value", self.expr(&keyword.value));
        out
    }

    fn parameter(&self, parameter: &ast::Parameter) -> Node {
        let mut out = self.node(NodeKind::Arg, parameter);
        out.add_str("arg", parameter.name.as_str());
        if let Some(annotation) = &parameter.annotation {
            out.add_node("annotation", self.expr(annotation));
        }
        out
    }

    fn parameters(&self, parameters: &ast::Parameters) -> Node {
        let mut out = self.node(NodeKind::Arguments, parameters);
        let mut defaults = Vec::new();
        let mut kw_defaults = Vec::new();

        out.add_nodes(
            "posonlyargs",
            parameters
                .posonlyargs
                .iter()
                .map(|arg| {
                    if let Some(default) = &arg.default {
                        defaults.push(self.expr(default));
                    }
                    self.parameter(&arg.parameter)
                })
                .collect(),
        );
        out.add_nodes(
            "args",
            parameters
                .args
                .iter()
                .map(|arg| {
                    if let Some(default) = &arg.default {
                        defaults.push(self.expr(default));
                    }
                    self.parameter(&arg.parameter)
                })
                .collect(),
        );
        if let Some(vararg) = &parameters.vararg {
            out.add_node("vararg", self.parameter(vararg));
        }
        out.add_nodes(
            "kwonlyargs",
            parameters
                .kwonlyargs
                .iter()
                .map(|arg| {
                    if let Some(default) = &arg.default {
                        kw_defaults.push(self.expr(default));
                    }
                    self.parameter(&arg.parameter)
                })
                .collect(),
        );
        if let Some(kwarg) = &parameters.kwarg {
            out.add_node("kwarg", self.parameter(kwarg));
        }
        out.add_nodes("kw_defaults", kw_defaults);
        out.add_nodes("defaults", defaults);
        out
    }

    fn comprehension(&self, comprehension: &ast::Comprehension) -> Node {
        let mut out = self.node(NodeKind::Comprehension, comprehension);
        out.add_node("target", self.expr(&comprehension.target));
        out.add_node("iter", self.expr(&comprehension.iter));
        out.add_nodes("ifs", self.exprs(&comprehension.ifs));
        out
    }

    fn match_case(&self, case: &ast::MatchCase) -> Node {
        let mut out = self.node(NodeKind::MatchCase, case);
        out.add_node("pattern", self.match_pattern(&case.pattern));
        if let Some(guard) = &case.guard {
            out.add_node("guard", self.expr(guard));
        }
        out.add_nodes("body", self.stmts(&case.body));
        out
    }

    fn match_pattern(&self, pattern: &ast::Pattern) -> Node {
        match pattern {
            ast::Pattern::MatchValue(node) => {
                let mut out = self.node(NodeKind::MatchValue, node);
                out.add_node("value", self.expr(&node.value));
                out
            }
            ast::Pattern::MatchSingleton(node) => {
                let mut out = self.node(NodeKind::MatchSingleton, node);
                out.add_value(
                    "value",
                    match node.value {
                        ast::Singleton::None => FieldValue::Null,
                        ast::Singleton::True => FieldValue::Bool(true),
                        ast::Singleton::False => FieldValue::Bool(false),
                    },
                );
                out
            }
            ast::Pattern::MatchSequence(node) => {
                let mut out = self.node(NodeKind::MatchSequence, node);
                out.add_nodes(
                    "patterns",
                    node.patterns
                        .iter()
                        .map(|pattern| self.match_pattern(pattern))
                        .collect(),
                );
                out
            }
            ast::Pattern::MatchMapping(node) => {
                let mut out = self.node(NodeKind::MatchMapping, node);
                out.add_nodes("keys", self.exprs(&node.keys));
                out.add_nodes(
                    "patterns",
                    node.patterns
                        .iter()
                        .map(|pattern| self.match_pattern(pattern))
                        .collect(),
                );
                if let Some(rest) = &node.rest {
                    out.add_str("rest", rest.as_str());
                }
                out
            }
            ast::Pattern::MatchClass(node) => {
                let mut out = self.node(NodeKind::MatchClass, node);
                out.add_node("cls", self.expr(&node.cls));
                out.add_nodes(
                    "patterns",
                    node.arguments
                        .patterns
                        .iter()
                        .map(|pattern| self.match_pattern(pattern))
                        .collect(),
                );
                out.add_value(
                    "kwd_attrs",
                    FieldValue::StrList(
                        node.arguments
                            .keywords
                            .iter()
                            .map(|keyword| CompactString::from(keyword.attr.as_str()))
                            .collect(),
                    ),
                );
                out.add_nodes(
                    "kwd_patterns",
                    node.arguments
                        .keywords
                        .iter()
                        .map(|keyword| self.match_pattern(&keyword.pattern))
                        .collect(),
                );
                out
            }
            ast::Pattern::MatchStar(node) => {
                let mut out = self.node(NodeKind::MatchStar, node);
                if let Some(name) = &node.name {
                    out.add_str("name", name.as_str());
                }
                out
            }
            ast::Pattern::MatchAs(node) => {
                let mut out = self.node(NodeKind::MatchAs, node);
                if let Some(pattern) = &node.pattern {
                    out.add_node("pattern", self.match_pattern(pattern));
                }
                if let Some(name) = &node.name {
                    out.add_str("name", name.as_str());
                }
                out
            }
            ast::Pattern::MatchOr(node) => {
                let mut out = self.node(NodeKind::MatchOr, node);
                out.add_nodes(
                    "patterns",
                    node.patterns
                        .iter()
                        .map(|pattern| self.match_pattern(pattern))
                        .collect(),
                );
                out
            }
        }
    }

    fn expr(&self, expr: &Expr) -> Node {
        match expr {
            Expr::BoolOp(node) => {
                let mut out = self.node(NodeKind::BoolOp, node);
                out.add_str("op", &format!("{:?}", node.op));
                out.add_nodes("values", self.exprs(&node.values));
                out
            }
            Expr::Named(node) => {
                let mut out = self.node(NodeKind::NamedExpr, node);
                out.add_node("target", self.expr(&node.target));
                out.add_node("value", self.expr(&node.value));
                out
            }
            Expr::BinOp(node) => {
                let mut out = self.node(NodeKind::BinOp, node);
                out.add_node("left", self.expr(&node.left));
                out.add_str("op", &format!("{:?}", node.op));
                out.add_node("right", self.expr(&node.right));
                out
            }
            Expr::UnaryOp(node) => {
                let mut out = self.node(NodeKind::UnaryOp, node);
                out.add_str("op", &format!("{:?}", node.op));
                out.add_node("operand", self.expr(&node.operand));
                out
            }
            Expr::Lambda(node) => {
                let mut out = self.node(NodeKind::Lambda, node);
                if let Some(parameters) = &node.parameters {
                    out.add_node("args", self.parameters(parameters));
                }
                out.add_node("body", self.expr(&node.body));
                out
            }
            Expr::If(node) => {
                let mut out = self.node(NodeKind::IfExp, node);
                out.add_node("test", self.expr(&node.test));
                out.add_node("body", self.expr(&node.body));
                out.add_node("orelse", self.expr(&node.orelse));
                out
            }
            Expr::Dict(node) => {
                let mut out = self.node(NodeKind::Dict, node);
                let keys: Vec<Node> = node
                    .items
                    .iter()
                    .filter_map(|item| item.key.as_ref())
                    .map(|key| self.expr(key))
                    .collect();
                let values: Vec<Node> =
                    node.items.iter().map(|item| self.expr(&item.value)).collect();
                out.add_nodes("keys", keys);
                out.add_nodes("values", values);
                out
            }
            Expr::Set(node) => {
                let mut out = self.node(NodeKind::Set, node);
                out.add_nodes("elts", self.exprs(&node.elts));
                out
            }
            Expr::ListComp(node) => {
                let mut out = self.node(NodeKind::ListComp, node);
                out.add_node("elt", self.expr(&node.elt));
                out.add_nodes(
                    "generators",
                    node.generators
                        .iter()
                        .map(|generator| self.comprehension(generator))
                        .collect(),
                );
                out
            }
            Expr::SetComp(node) => {
                let mut out = self.node(NodeKind::SetComp, node);
                out.add_node("elt", self.expr(&node.elt));
                out.add_nodes(
                    "generators",
                    node.generators
                        .iter()
                        .map(|generator| self.comprehension(generator))
                        .collect(),
                );
                out
            }
            Expr::DictComp(node) => {
                let mut out = self.node(NodeKind::DictComp, node);
                if let Some(key) = node.key.as_deref() {
                    out.add_node("key", self.expr(key));
                }
                out.add_node("value", self.expr(&node.value));
                out.add_nodes(
                    "generators",
                    node.generators
                        .iter()
                        .map(|generator| self.comprehension(generator))
                        .collect(),
                );
                out
            }
            Expr::Generator(node) => {
                let mut out = self.node(NodeKind::GeneratorExp, node);
                out.add_node("elt", self.expr(&node.elt));
                out.add_nodes(
                    "generators",
                    node.generators
                        .iter()
                        .map(|generator| self.comprehension(generator))
                        .collect(),
                );
                out
            }
            Expr::Await(node) => {
                let mut out = self.node(NodeKind::Await, node);
                out.add_node("value", self.expr(&node.value));
                out
            }
            Expr::Yield(node) => {
                let mut out = self.node(NodeKind::Yield, node);
                if let Some(value) = &node.value {
                    out.add_node("value", self.expr(value));
                }
                out
            }
            Expr::YieldFrom(node) => {
                let mut out = self.node(NodeKind::YieldFrom, node);
                out.add_node("value", self.expr(&node.value));
                out
            }
            Expr::Compare(node) => {
                let mut out = self.node(NodeKind::Compare, node);
                out.add_node("left", self.expr(&node.left));
                out.add_value(
                    "ops",
                    FieldValue::StrList(
                        node.ops
                            .iter()
                            .map(|op| CompactString::from(format!("{op:?}")))
                            .collect(),
                    ),
                );
                out.add_nodes("comparators", self.exprs(&node.comparators));
                out
            }
            Expr::Call(node) => {
                let mut out = self.node(NodeKind::Call, node);
                out.add_node("func", self.expr(&node.func));
                out.add_nodes("args", self.exprs(&node.arguments.args));
                out.add_nodes(
                    "keywords",
                    node.arguments
                        .keywords
                        .iter()
                        .map(|keyword| self.keyword(keyword))
                        .collect(),
                );
                out
            }
            Expr::FString(node) => {
                let mut out = self.node(NodeKind::JoinedStr, node);
                let mut values = Vec::new();
                for part in &node.value {
                    match part {
                        ast::FStringPart::Literal(literal) => {
                            let mut constant = self.node(NodeKind::Constant, literal);
                            constant.add_str("value", literal);
                            values.push(constant);
                        }
                        ast::FStringPart::FString(fstring) => {
                            for element in &fstring.elements {
                                if let ast::InterpolatedStringElement::Interpolation(interp) =
                                    element
                                {
                                    let mut formatted =
                                        self.node(NodeKind::FormattedValue, interp);
                                    formatted.add_node("value", self.expr(&interp.expression));
                                    values.push(formatted);
                                }
                            }
                        }
                    }
                }
                out.add_nodes("values", values);
                out
            }
            Expr::StringLiteral(node) => {
                let mut out = self.node(NodeKind::Constant, node);
                out.add_str("value", node.value.to_str());
                out
            }
            Expr::BytesLiteral(node) => {
                let mut out = self.node(NodeKind::Constant, node);
                let bytes: Vec<u8> = node.value.bytes().collect();
                out.add_str("value", &String::from_utf8_lossy(&bytes));
                out
            }
            Expr::NumberLiteral(node) => {
                let mut out = self.node(NodeKind::Constant, node);
                out.add_value(
                    "value",
                    match &node.value {
                        ast::Number::Int(int) => int.to_string().parse::<i64>().map_or_else(
                            |_| FieldValue::Str(CompactString::from(int.to_string())),
                            FieldValue::Int,
                        ),
                        ast::Number::Float(float) => FieldValue::Float(*float),
                        ast::Number::Complex { real, imag } => FieldValue::Str(
                            CompactString::from(format!("complex({real}, {imag})")),
                        ),
                    },
                );
                out
            }
            Expr::BooleanLiteral(node) => {
                let mut out = self.node(NodeKind::Constant, node);
                out.add_value("value", FieldValue::Bool(node.value));
                out
            }
            Expr::NoneLiteral(node) => {
                let mut out = self.node(NodeKind::Constant, node);
                out.add_value("value", FieldValue::Null);
                out
            }
            Expr::EllipsisLiteral(node) => {
                let mut out = self.node(NodeKind::Constant, node);
                out.add_str("value", "...");
                out
            }
            Expr::Attribute(node) => {
                let mut out = self.node(NodeKind::Attribute, node);
                out.add_node("value", self.expr(&node.value));
                out.add_str("attr", node.attr.as_str());
                out
            }
            Expr::Subscript(node) => {
                let mut out = self.node(NodeKind::Subscript, node);
                out.add_node("value", self.expr(&node.value));
                out.add_node("slice", self.expr(&node.slice));
                out
            }
            Expr::Starred(node) => {
                let mut out = self.node(NodeKind::Starred, node);
                out.add_node("value", self.expr(&node.value));
                out
            }
            Expr::Name(node) => {
                let mut out = self.node(NodeKind::Name, node);
                out.add_str("id", node.id.as_str());
                out
            }
            Expr::List(node) => {
                let mut out = self.node(NodeKind::List, node);
                out.add_nodes("elts", self.exprs(&node.elts));
                out
            }
            Expr::Tuple(node) => {
                let mut out = self.node(NodeKind::Tuple, node);
                out.add_nodes("elts", self.exprs(&node.elts));
                out
            }
            Expr::Slice(node) => {
                let mut out = self.node(NodeKind::Slice, node);
                if let Some(lower) = &node.lower {
                    out.add_node("lower", self.expr(lower));
                }
                if let Some(upper) = &node.upper {
                    out.add_node("upper", self.expr(upper));
                }
                if let Some(step) = &node.step {
                    out.add_node("step", self.expr(step));
                }
                out
            }
            _ => Node::new(NodeKind::Unknown, None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lowers_class_and_function_defs() {
        let tree = parse("class Foo:\n    def bar(self):\n        pass\n").unwrap();
        let class = &tree.list("body")[0];
        assert_eq!(class.kind, NodeKind::ClassDef);
        assert_eq!(class.str_field("name"), Some("Foo"));
        assert_eq!(class.lines, Some((1, 3)));

        let method = &class.list("body")[0];
        assert_eq!(method.kind, NodeKind::FunctionDef);
        assert_eq!(method.str_field("name"), Some("bar"));
    }

    #[test]
    fn lowers_attribute_calls() {
        let tree = parse("os.path.join(a)\n").unwrap();
        let call = tree.list("body")[0].child("value").unwrap();
        assert_eq!(call.kind, NodeKind::Call);
        let func = call.child("func").unwrap();
        assert_eq!(func.kind, NodeKind::Attribute);
        assert_eq!(func.str_field("attr"), Some("join"));
        assert_eq!(
            func.child("value").unwrap().str_field("attr"),
            Some("path")
        );
    }

    #[test]
    fn elif_becomes_nested_if() {
        let tree = parse("if a:\n    pass\nelif b:\n    pass\nelse:\n    pass\n").unwrap();
        let outer = &tree.list("body")[0];
        assert_eq!(outer.kind, NodeKind::If);
        let nested = &outer.list("orelse")[0];
        assert_eq!(nested.kind, NodeKind::If);
        assert_eq!(nested.list("orelse")[0].kind, NodeKind::Pass);
    }

    #[test]
    fn dict_fields_separate_keys_and_values() {
        let tree = parse("{'a': 1, 'b': 2}\n").unwrap();
        let dict = tree.list("body")[0].child("value").unwrap();
        assert_eq!(dict.kind, NodeKind::Dict);
        assert_eq!(dict.list("keys").len(), 2);
        assert_eq!(dict.list("values").len(), 2);
        assert_eq!(dict.list("keys")[0].str_field("value"), Some("a"));
    }

    #[test]
    fn function_defaults_are_lowered() {
        let tree = parse("def f(a, b=[]):\n    pass\n").unwrap();
        let func = &tree.list("body")[0];
        let args = func.child("args").unwrap();
        assert_eq!(args.list("args").len(), 2);
        assert_eq!(args.list("defaults").len(), 1);
        assert_eq!(args.list("defaults")[0].kind, NodeKind::List);
    }

    #[test]
    fn syntax_error_is_reported() {
        assert!(parse("def broken(:\n").is_err());
    }

    #[test]
    fn identifier_definitions_stay_primitive() {
        let tree = parse("class Foo:\n    pass\n").unwrap();
        let names: Vec<_> = tree
            .descendants()
            .filter(|node| node.kind == NodeKind::Name)
            .collect();
        assert!(names.is_empty());
    }
}
