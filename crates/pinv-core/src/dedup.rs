//! Removal of invariants shared by both sides of a comparison
//!
//! Equations reported identically by two tools say nothing about whether the
//! tools disagree, so they are cancelled before the solver sees either set.
//! Matching is by dense [`Signature`] under one fused index.

use indexmap::IndexMap;
use rustc_hash::FxHashSet;
use tracing::debug;

use crate::error::Result;
use crate::invariant::{Invariant, Signature};
use crate::var_index::VariableIndex;

/// Remove the invariants present in both `set_a` and `set_b`.
///
/// Returns `(unique_a, unique_b)`. `fused` must cover every variable used on
/// either side, otherwise `UnknownVariable` is returned.
///
/// `set_a` is keyed by signature, so two members of `set_a` with the same
/// signature collapse into one entry: the later one replaces the earlier
/// while keeping the earlier one's position. `unique_a` follows that
/// first-insertion order; `unique_b` keeps the input order of `set_b`,
/// duplicates included.
pub fn deduplicate(
    set_a: &[Invariant],
    set_b: &[Invariant],
    fused: &VariableIndex,
) -> Result<(Vec<Invariant>, Vec<Invariant>)> {
    let mut by_signature: IndexMap<Signature, &Invariant> = IndexMap::with_capacity(set_a.len());
    for inv in set_a {
        by_signature.insert(inv.coefficient_vector(fused)?, inv);
    }

    let mut matched: FxHashSet<Signature> = FxHashSet::default();
    let mut unique_b = Vec::new();
    for inv in set_b {
        let signature = inv.coefficient_vector(fused)?;
        if by_signature.contains_key(&signature) {
            matched.insert(signature);
        } else {
            unique_b.push(inv.clone());
        }
    }

    let unique_a: Vec<Invariant> = by_signature
        .into_iter()
        .filter(|(signature, _)| !matched.contains(signature))
        .map(|(_, inv)| inv.clone())
        .collect();

    debug!(
        a = set_a.len(),
        b = set_b.len(),
        shared = matched.len(),
        unique_a = unique_a.len(),
        unique_b = unique_b.len(),
        "deduplicated invariant sets"
    );
    Ok((unique_a, unique_b))
}
