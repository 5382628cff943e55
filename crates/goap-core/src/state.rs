use std::collections::BTreeMap;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::fact::{Fact, FactKey, FactValue};

/// A point-in-time set of facts, queried and transformed by the planner.
///
/// Conceptually this is a set of `(key, value)` pairs: membership and subset
/// tests match on both components. At most one value is live per key:
/// [`FactSet::apply`] replaces whatever the key previously held, which is
/// what keeps the pair-set behaving as a key-to-value map under effect
/// application. Iteration order is the key order, so identical sets always
/// enumerate identically.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct FactSet {
    facts: BTreeMap<FactKey, FactValue>,
}

impl FactSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.facts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.facts.is_empty()
    }

    /// Pair membership: the key must be present AND hold exactly this value.
    pub fn contains(&self, fact: &Fact) -> bool {
        self.facts.get(fact.key()) == Some(&fact.value())
    }

    pub fn value_of(&self, key: &FactKey) -> Option<FactValue> {
        self.facts.get(key).copied()
    }

    /// Subset test: every fact in `required` is literally present here.
    pub fn satisfies(&self, required: &FactSet) -> bool {
        required
            .facts
            .iter()
            .all(|(key, value)| self.facts.get(key) == Some(value))
    }

    /// Insert a fact, purging any fact that shares its key first.
    pub fn apply(&mut self, fact: Fact) {
        let (key, value) = fact.into_parts();
        self.facts.insert(key, value);
    }

    pub fn apply_all(&mut self, effects: &FactSet) {
        for fact in effects.iter() {
            self.apply(fact);
        }
    }

    /// Derive the state reached by applying `effects` to a copy of this set.
    pub fn applying(&self, effects: &FactSet) -> FactSet {
        let mut next = self.clone();
        next.apply_all(effects);
        next
    }

    /// Union with `overlay`, the overlay winning on shared keys.
    pub fn merged_with(&self, overlay: &FactSet) -> FactSet {
        self.applying(overlay)
    }

    pub fn iter(&self) -> impl Iterator<Item = Fact> + '_ {
        self.facts
            .iter()
            .map(|(key, value)| Fact::new(key.clone(), *value))
    }
}

impl FromIterator<Fact> for FactSet {
    fn from_iter<I: IntoIterator<Item = Fact>>(iter: I) -> Self {
        let mut set = FactSet::new();
        for fact in iter {
            set.apply(fact);
        }
        set
    }
}

/// Mutable key-to-value store backing one fact scope: the shared world, or a
/// single agent's private overlay.
///
/// Writers go through [`FactStore::set`] / [`FactStore::increment`], both of
/// which retire any stale value for the key. Readers working from a
/// consistent view take a [`FactStore::snapshot`] once and query that.
#[derive(Debug, Clone, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct FactStore {
    facts: BTreeMap<FactKey, FactValue>,
}

impl FactStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// `None` if the key was never set.
    pub fn get(&self, key: &FactKey) -> Option<FactValue> {
        self.facts.get(key).copied()
    }

    /// True only for a live `Bool(true)` fact.
    pub fn is_true(&self, key: &FactKey) -> bool {
        self.get(key).is_some_and(FactValue::is_true)
    }

    /// Counter read: unset and non-integer keys count as zero.
    pub fn int(&self, key: &FactKey) -> i64 {
        self.get(key).and_then(FactValue::as_int).unwrap_or(0)
    }

    /// Unconditional overwrite.
    pub fn set(&mut self, key: impl Into<FactKey>, value: impl Into<FactValue>) {
        self.facts.insert(key.into(), value.into());
    }

    /// Add `delta` to an integer fact. A missing or non-integer value is
    /// overwritten with `delta` instead; the type mismatch is absorbed, not
    /// reported.
    pub fn increment(&mut self, key: impl Into<FactKey>, delta: i64) {
        let key = key.into();
        let next = match self.facts.get(&key) {
            Some(FactValue::Int(current)) => current + delta,
            _ => delta,
        };
        self.facts.insert(key, FactValue::Int(next));
    }

    /// Point-in-time copy for a planning attempt. The search must never
    /// observe the store mutating mid-search; it works only on this copy and
    /// states derived from it.
    pub fn snapshot(&self) -> FactSet {
        self.facts
            .iter()
            .map(|(key, value)| Fact::new(key.clone(), *value))
            .collect()
    }
}
