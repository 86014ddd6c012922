use std::collections::BTreeMap;

use crate::value::Value;

/// Key for a scope binding: `(block_level, function_level, identifier)`.
/// Ordering is lexicographic over the three fields in that order, so a
/// reverse iteration over the map yields innermost (highest
/// `block_level`) bindings first.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct ScopeKey {
    pub block_level: i64,
    pub function_level: i64,
    pub identifier: String,
}

impl ScopeKey {
    pub fn new(block_level: i64, function_level: i64, identifier: impl Into<String>) -> Self {
        ScopeKey {
            block_level,
            function_level,
            identifier: identifier.into(),
        }
    }
}

/// An ordered map of bindings plus the two depth counters that govern
/// binding lifetime (`block_level`) and closure visibility
/// (`function_level`).
#[derive(Debug, Clone, Default)]
pub struct Scope {
    bindings: BTreeMap<ScopeKey, Value>,
    block_level: i64,
    function_level: i64,
}

impl Scope {
    pub fn new() -> Self {
        Scope::default()
    }

    pub fn block_level(&self) -> i64 {
        self.block_level
    }

    pub fn function_level(&self) -> i64 {
        self.function_level
    }

    pub fn enter_block(&mut self) {
        self.block_level += 1;
    }

    /// Tear down every binding introduced at the current block level,
    /// then decrement it.
    pub fn exit_block(&mut self) {
        let level = self.block_level;
        self.bindings.retain(|k, _| k.block_level != level);
        self.block_level -= 1;
    }

    pub fn enter_function(&mut self) {
        self.function_level += 1;
    }

    pub fn exit_function(&mut self) {
        self.function_level -= 1;
    }

    /// Insert a fresh binding at the current levels, returning its key.
    pub fn declare(&mut self, identifier: impl Into<String>, value: Value) -> ScopeKey {
        let key = ScopeKey::new(self.block_level, self.function_level, identifier);
        self.bindings.insert(key.clone(), value);
        key
    }

    pub fn insert_at(&mut self, key: ScopeKey, value: Value) {
        self.bindings.insert(key, value);
    }

    /// Innermost-wins lookup by identifier: the highest `block_level`
    /// binding with a matching name.
    pub fn resolve(&self, identifier: &str) -> Option<ScopeKey> {
        self.bindings
            .keys()
            .rev()
            .find(|k| k.identifier == identifier)
            .cloned()
    }

    pub fn contains(&self, identifier: &str) -> bool {
        self.resolve(identifier).is_some()
    }

    pub fn get(&self, key: &ScopeKey) -> Option<&Value> {
        self.bindings.get(key)
    }

    pub fn get_mut(&mut self, key: &ScopeKey) -> Option<&mut Value> {
        self.bindings.get_mut(key)
    }

    /// The subset of bindings visible to a function defined at
    /// `threshold`: every binding whose `function_level` does not
    /// exceed it. This is the closure-capture coordinate (§4.6).
    pub fn restricted_snapshot(&self, threshold: i64) -> BTreeMap<ScopeKey, Value> {
        self.bindings
            .iter()
            .filter(|(k, _)| k.function_level <= threshold)
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }

    pub fn from_bindings(bindings: BTreeMap<ScopeKey, Value>, block_level: i64, function_level: i64) -> Self {
        Scope {
            bindings,
            block_level,
            function_level,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Value;

    #[test]
    fn inner_binding_shadows_outer() {
        let mut scope = Scope::new();
        scope.declare("x", Value::int(1));
        scope.enter_block();
        scope.declare("x", Value::int(2));
        let key = scope.resolve("x").unwrap();
        assert_eq!(key.block_level, 1);
    }

    #[test]
    fn exit_block_tears_down_its_bindings() {
        let mut scope = Scope::new();
        scope.declare("outer", Value::int(1));
        scope.enter_block();
        scope.declare("inner", Value::int(2));
        scope.exit_block();
        assert!(scope.resolve("inner").is_none());
        assert!(scope.resolve("outer").is_some());
    }

    #[test]
    fn restricted_snapshot_excludes_deeper_function_levels() {
        let mut scope = Scope::new();
        scope.declare("a", Value::int(1));
        scope.enter_function();
        scope.declare("b", Value::int(2));
        let snap = scope.restricted_snapshot(0);
        assert!(snap.keys().any(|k| k.identifier == "a"));
        assert!(!snap.keys().any(|k| k.identifier == "b"));
    }
}
