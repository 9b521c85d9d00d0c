//! Scope tracking for the traversal engine.
//!
//! Two parallel stacks of scope frames are maintained while walking a tree:
//! the function/class chain (pushed on `ClassDef`/`FunctionDef`, labeled by
//! the definition's name) and the control-flow chain (pushed on
//! `For`/`While`/`If`/`Try`/`With`/`ExceptHandler`, labeled by the kind
//! name). Each frame carries its own fact map; a global map sits below
//! both chains. Lookups shadow innermost-first.

use compact_str::CompactString;
use rustc_hash::FxHashMap;
use smallvec::SmallVec;

/// Which of the two parallel scope chains an operation targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Chain {
    /// Function/class definition chain.
    Function,
    /// Control-flow statement chain.
    ControlFlow,
}

/// A value stored as a tracked fact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TrackedValue {
    /// String value.
    Str(CompactString),
    /// Integer value.
    Int(i64),
    /// Boolean value.
    Bool(bool),
}

impl From<&str> for TrackedValue {
    fn from(value: &str) -> Self {
        TrackedValue::Str(CompactString::from(value))
    }
}

impl From<i64> for TrackedValue {
    fn from(value: i64) -> Self {
        TrackedValue::Int(value)
    }
}

impl From<bool> for TrackedValue {
    fn from(value: bool) -> Self {
        TrackedValue::Bool(value)
    }
}

type FactMap = FxHashMap<CompactString, TrackedValue>;

#[derive(Debug, Default)]
struct Frame {
    label: CompactString,
    facts: FactMap,
}

/// Flattened view of all tracked facts, one bucket per storage level.
/// Chain buckets are the union of every frame on that chain, inner frames
/// overriding outer ones.
#[derive(Debug, Default)]
pub struct TrackedView {
    /// Global facts.
    pub global: FactMap,
    /// Function-chain facts.
    pub function: FactMap,
    /// Control-flow-chain facts.
    pub control_flow: FactMap,
}

/// Scope state for one file's traversal.
#[derive(Debug, Default)]
pub struct ScopeTracker {
    global: FactMap,
    function: SmallVec<[Frame; 4]>,
    control_flow: SmallVec<[Frame; 4]>,
}

impl ScopeTracker {
    /// Creates an empty tracker.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn chain(&self, chain: Chain) -> &SmallVec<[Frame; 4]> {
        match chain {
            Chain::Function => &self.function,
            Chain::ControlFlow => &self.control_flow,
        }
    }

    fn chain_mut(&mut self, chain: Chain) -> &mut SmallVec<[Frame; 4]> {
        match chain {
            Chain::Function => &mut self.function,
            Chain::ControlFlow => &mut self.control_flow,
        }
    }

    /// Pushes a new empty-facts frame onto the named chain.
    pub fn push(&mut self, chain: Chain, label: &str) {
        self.chain_mut(chain).push(Frame {
            label: CompactString::from(label),
            facts: FactMap::default(),
        });
    }

    /// Removes and discards the top frame of the named chain.
    pub fn pop(&mut self, chain: Chain) {
        self.chain_mut(chain).pop();
    }

    /// Number of frames currently on the named chain.
    #[must_use]
    pub fn depth(&self, chain: Chain) -> usize {
        self.chain(chain).len()
    }

    /// Frame labels of the named chain, outermost first.
    #[must_use]
    pub fn labels(&self, chain: Chain) -> Vec<String> {
        self.chain(chain)
            .iter()
            .map(|frame| frame.label.to_string())
            .collect()
    }

    /// Writes a fact into the global map and into the top frame of each
    /// non-empty chain. A fact set inside a loop inside a function thus
    /// stays visible at function scope after the loop's frame pops.
    pub fn set(&mut self, key: &str, value: impl Into<TrackedValue>) {
        let value = value.into();
        if let Some(frame) = self.function.last_mut() {
            frame
                .facts
                .insert(CompactString::from(key), value.clone());
        }
        if let Some(frame) = self.control_flow.last_mut() {
            frame
                .facts
                .insert(CompactString::from(key), value.clone());
        }
        self.global.insert(CompactString::from(key), value);
    }

    /// Innermost-wins lookup: control-flow top frame, then function top
    /// frame, then global. `None` when the fact is absent everywhere.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&TrackedValue> {
        if let Some(value) = self
            .control_flow
            .last()
            .and_then(|frame| frame.facts.get(key))
        {
            return Some(value);
        }
        if let Some(value) = self.function.last().and_then(|frame| frame.facts.get(key)) {
            return Some(value);
        }
        self.global.get(key)
    }

    /// Flattened three-bucket view of all facts.
    #[must_use]
    pub fn get_all(&self) -> TrackedView {
        let mut view = TrackedView {
            global: self.global.clone(),
            ..TrackedView::default()
        };
        for frame in &self.function {
            view.function
                .extend(frame.facts.iter().map(|(k, v)| (k.clone(), v.clone())));
        }
        for frame in &self.control_flow {
            view.control_flow
                .extend(frame.facts.iter().map(|(k, v)| (k.clone(), v.clone())));
        }
        view
    }

    /// Purges the key from the global map and from every frame currently
    /// on either chain.
    pub fn delete(&mut self, key: &str) {
        self.global.remove(key);
        for frame in &mut self.function {
            frame.facts.remove(key);
        }
        for frame in &mut self.control_flow {
            frame.facts.remove(key);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_prefers_inner_chain_tops() {
        let mut scopes = ScopeTracker::new();
        scopes.set("k", "global");

        scopes.push(Chain::Function, "f");
        scopes.set("k", "function");
        assert_eq!(scopes.get("k"), Some(&TrackedValue::from("function")));

        // An empty control-flow frame does not hide the function value.
        scopes.push(Chain::ControlFlow, "If");
        assert_eq!(scopes.get("k"), Some(&TrackedValue::from("function")));
        scopes.pop(Chain::ControlFlow);

        scopes.push(Chain::ControlFlow, "For");
        scopes.set("k", "loop");
        assert_eq!(scopes.get("k"), Some(&TrackedValue::from("loop")));

        // A set propagates to the top frame of each chain, so the value
        // survives the loop at function scope and globally.
        scopes.pop(Chain::ControlFlow);
        assert_eq!(scopes.get("k"), Some(&TrackedValue::from("loop")));
        scopes.pop(Chain::Function);
        assert_eq!(scopes.get("k"), Some(&TrackedValue::from("loop")));
    }

    #[test]
    fn set_skips_frames_below_the_top() {
        let mut scopes = ScopeTracker::new();
        scopes.push(Chain::Function, "outer");
        scopes.push(Chain::Function, "inner");
        scopes.set("k", 1);

        scopes.pop(Chain::Function);
        // The outer frame never held the fact; lookup falls through to
        // the global copy.
        assert_eq!(scopes.get("k"), Some(&TrackedValue::Int(1)));
        let view = scopes.get_all();
        assert!(view.function.is_empty());
        assert_eq!(view.global.len(), 1);
    }

    #[test]
    fn delete_purges_every_level() {
        let mut scopes = ScopeTracker::new();
        scopes.set("k", "global");
        scopes.push(Chain::Function, "f");
        scopes.set("k", "function");
        scopes.push(Chain::ControlFlow, "While");
        scopes.set("k", "loop");

        scopes.delete("k");
        assert_eq!(scopes.get("k"), None);
        scopes.pop(Chain::ControlFlow);
        assert_eq!(scopes.get("k"), None);
        scopes.pop(Chain::Function);
        assert_eq!(scopes.get("k"), None);
    }

    #[test]
    fn get_all_merges_inner_over_outer() {
        let mut scopes = ScopeTracker::new();
        scopes.push(Chain::Function, "outer");
        scopes.set("a", 1);
        scopes.set("b", 1);
        scopes.push(Chain::Function, "inner");
        scopes.set("b", 2);

        let view = scopes.get_all();
        assert_eq!(view.function.get("a"), Some(&TrackedValue::Int(1)));
        assert_eq!(view.function.get("b"), Some(&TrackedValue::Int(2)));
    }

    #[test]
    fn operations_are_total_on_empty_stacks() {
        let mut scopes = ScopeTracker::new();
        scopes.pop(Chain::Function);
        scopes.pop(Chain::ControlFlow);
        scopes.delete("missing");
        assert_eq!(scopes.get("missing"), None);
        assert_eq!(scopes.depth(Chain::Function), 0);
        assert!(scopes.labels(Chain::ControlFlow).is_empty());
    }
}
