//! Previsitors: corpus-wide fact gathering passes that run before the
//! matching phase.

use crate::facts::FactStore;
use crate::tree::{Node, NodeKind};

/// Fact key holding every identifier referenced anywhere in the corpus.
pub const FACT_NAMES: &str = "names";

/// Identifier of a previsitor pass. Patterns declare the previsitors they
/// need; the scanner instantiates each one exactly once per run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrevisitorKind {
    /// Collects every referenced identifier into [`FACT_NAMES`].
    Names,
}

impl PrevisitorKind {
    /// Instantiates the pass.
    #[must_use]
    pub fn instantiate(self) -> Box<dyn Previsitor> {
        match self {
            PrevisitorKind::Names => Box::new(NamesPrevisitor),
        }
    }
}

/// A fact-gathering pass dispatched in flat traversal mode.
pub trait Previsitor {
    /// Registers the fact keys this pass populates, so an empty corpus
    /// still leaves the keys present (empty) rather than missing.
    fn register(&self, facts: &mut FactStore);

    /// Observes one node.
    fn observe(&mut self, node: &Node, facts: &mut FactStore);
}

/// Collects every `Name` id and `Attribute` attr seen in the corpus.
/// Definition names (class/function names, parameter names) are primitive
/// fields, not `Name` nodes, so definitions do not count as references.
struct NamesPrevisitor;

impl Previsitor for NamesPrevisitor {
    fn register(&self, facts: &mut FactStore) {
        facts.ensure(FACT_NAMES);
    }

    fn observe(&mut self, node: &Node, facts: &mut FactStore) {
        match node.kind {
            NodeKind::Name => {
                if let Some(id) = node.str_field("id") {
                    facts.insert(FACT_NAMES, id.to_owned());
                }
            }
            NodeKind::Attribute => {
                if let Some(attr) = node.str_field("attr") {
                    facts.insert(FACT_NAMES, attr.to_owned());
                }
            }
            _ => {}
        }
    }
}
