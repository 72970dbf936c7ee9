//! Dense variable indexing
//!
//! Invariants produced by two tools may be stated over disjoint or partially
//! overlapping variable vocabularies. Before two sets can be projected to
//! vectors or handed to a solver they need one shared numbering; that is what
//! a [`VariableIndex`] provides.
//!
//! An index's numbering is only meaningful relative to that index. Positions
//! are reassigned from scratch by [`VariableIndex::fuse`] and
//! [`VariableIndex::restrict`], so raw positions must never be compared across
//! two distinct indexes.

use std::collections::BTreeSet;
use std::sync::Arc;

use rustc_hash::FxHashMap;

use crate::error::{Error, Result};
use crate::invariant::Invariant;

/// Shared name table of a [`VariableIndex`]
#[derive(Debug, Default)]
struct VariableIndexInner {
    /// Place or transition name at each position
    names: Vec<Arc<str>>,
    /// Position of each name; the inverse of `names`
    positions: FxHashMap<Arc<str>, usize>,
}

/// Bijection between variable names and the positions `0..n`.
///
/// Clones share one name table, so an index can be handed to every
/// encoder of a comparison without copying the names.
#[derive(Clone, Debug, Default)]
pub struct VariableIndex {
    inner: Arc<VariableIndexInner>,
}

impl VariableIndex {
    /// Create an empty index
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an index from a list of names.
    ///
    /// Positions follow the order of the input as given; a name seen twice
    /// keeps its first position. Callers that need the canonical numbering
    /// must pass the names sorted.
    pub fn from_names<S: Into<Arc<str>>>(names: impl IntoIterator<Item = S>) -> Self {
        let mut inner = VariableIndexInner::default();
        for name in names {
            let name: Arc<str> = name.into();
            if inner.positions.contains_key(&name) {
                continue;
            }
            inner.positions.insert(name.clone(), inner.names.len());
            inner.names.push(name);
        }
        VariableIndex {
            inner: Arc::new(inner),
        }
    }

    /// Sorted index over every variable used by the given invariants
    pub fn from_invariants<'a>(invariants: impl IntoIterator<Item = &'a Invariant>) -> Self {
        let names: BTreeSet<&str> = invariants
            .into_iter()
            .flat_map(|inv| inv.used_variables())
            .collect();
        Self::from_names(names)
    }

    /// Number of indexed names
    #[inline]
    pub fn size(&self) -> usize {
        self.inner.names.len()
    }

    /// Check if the index is empty
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.inner.names.is_empty()
    }

    /// Position of `name`
    #[inline]
    pub fn index_of(&self, name: &str) -> Result<usize> {
        self.inner
            .positions
            .get(name)
            .copied()
            .ok_or_else(|| Error::UnknownVariable(name.to_string()))
    }

    /// Name at `index`
    #[inline]
    pub fn name_of(&self, index: usize) -> Result<&str> {
        self.inner
            .names
            .get(index)
            .map(|name| name.as_ref())
            .ok_or(Error::IndexOutOfRange {
                index,
                size: self.size(),
            })
    }

    /// Whether `name` is indexed
    #[inline]
    pub fn contains(&self, name: &str) -> bool {
        self.inner.positions.contains_key(name)
    }

    /// All names in index order
    pub fn names(&self) -> &[Arc<str>] {
        &self.inner.names
    }

    /// Iterator over (position, name) pairs
    pub fn iter(&self) -> impl Iterator<Item = (usize, &str)> {
        self.inner
            .names
            .iter()
            .enumerate()
            .map(|(i, name)| (i, name.as_ref()))
    }

    /// New index over the sorted union of both name sets.
    ///
    /// Positions are reassigned and need not match either input.
    pub fn fuse(&self, other: &VariableIndex) -> VariableIndex {
        let union: BTreeSet<Arc<str>> = self.names().iter().chain(other.names()).cloned().collect();
        Self::from_names(union)
    }

    /// New index over the sorted intersection of this index's names with `keep`.
    pub fn restrict<S: AsRef<str>>(&self, keep: impl IntoIterator<Item = S>) -> VariableIndex {
        let kept: BTreeSet<Arc<str>> = keep
            .into_iter()
            .filter_map(|name| {
                let name = name.as_ref();
                self.inner
                    .positions
                    .get_key_value(name)
                    .map(|(stored, _)| stored.clone())
            })
            .collect();
        Self::from_names(kept)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_index_basic() {
        let index = VariableIndex::from_names(["x", "y", "z"]);

        assert_eq!(index.size(), 3);
        assert_eq!(index.index_of("x"), Ok(0));
        assert_eq!(index.index_of("y"), Ok(1));
        assert_eq!(index.index_of("z"), Ok(2));
        assert_eq!(index.name_of(2), Ok("z"));
        assert!(index.contains("y"));
        assert!(!index.contains("w"));
    }

    #[test]
    fn test_input_order_is_kept() {
        let index = VariableIndex::from_names(["p2", "p10", "p1"]);
        assert_eq!(index.index_of("p2"), Ok(0));
        assert_eq!(index.index_of("p10"), Ok(1));
        assert_eq!(index.index_of("p1"), Ok(2));
    }

    #[test]
    fn test_duplicate_names_keep_first_position() {
        let index = VariableIndex::from_names(["a", "b", "a"]);
        assert_eq!(index.size(), 2);
        assert_eq!(index.index_of("a"), Ok(0));
        assert_eq!(index.index_of("b"), Ok(1));
    }

    #[test]
    fn test_lookup_failures() {
        let index = VariableIndex::from_names(["x"]);
        assert_eq!(
            index.index_of("y"),
            Err(Error::UnknownVariable("y".to_string()))
        );
        assert_eq!(
            index.name_of(1),
            Err(Error::IndexOutOfRange { index: 1, size: 1 })
        );
    }

    #[test]
    fn test_fuse_sorts_union() {
        let a = VariableIndex::from_names(["z", "b"]);
        let b = VariableIndex::from_names(["a", "b"]);
        let fused = a.fuse(&b);

        let names: Vec<&str> = fused.iter().map(|(_, n)| n).collect();
        assert_eq!(names, vec!["a", "b", "z"]);
        // Receivers are untouched
        assert_eq!(a.index_of("z"), Ok(0));
        assert_eq!(b.size(), 2);
    }

    #[test]
    fn test_restrict_sorts_intersection() {
        let index = VariableIndex::from_names(["d", "c", "b", "a"]);
        let restricted = index.restrict(["c", "a", "missing"]);

        let names: Vec<&str> = restricted.iter().map(|(_, n)| n).collect();
        assert_eq!(names, vec!["a", "c"]);
        assert_eq!(index.size(), 4);
    }

    #[test]
    fn test_from_invariants() {
        let a = Invariant::new([("y", 1), ("x", 2)], crate::Constant::Known(1));
        let b = Invariant::new([("w", 1), ("x", 0)], crate::Constant::Unknown);
        let index = VariableIndex::from_invariants([&a, &b]);

        let names: Vec<&str> = index.iter().map(|(_, n)| n).collect();
        assert_eq!(names, vec!["w", "x", "y"]);
    }
}
