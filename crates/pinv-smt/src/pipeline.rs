//! End-to-end comparison of two invariant sets

use std::collections::BTreeSet;

use pinv_core::{deduplicate, Error as CoreError, Invariant, VariableIndex};
use tracing::debug;

use crate::consistency::{ConsistencyChecker, Verdict};
use crate::error::CheckResult;
use crate::solver::LiaBackend;

/// Options for [`compare`]
#[derive(Debug, Clone)]
pub struct CompareOptions {
    /// Cancel invariants present on both sides before the solver query
    pub dedup: bool,
}

impl Default for CompareOptions {
    fn default() -> Self {
        Self { dedup: true }
    }
}

impl CompareOptions {
    pub fn with_dedup(mut self, dedup: bool) -> Self {
        self.dedup = dedup;
        self
    }
}

/// Outcome of [`compare`]
#[derive(Debug, Clone)]
pub struct Comparison {
    /// Invariants of A left after deduplication
    pub unique_a: Vec<Invariant>,
    /// Invariants of B left after deduplication
    pub unique_b: Vec<Invariant>,
    /// Index the residual sets were checked under
    pub index: VariableIndex,
    pub verdict: Verdict,
    /// Number of solver queries issued (0 or 1)
    pub queries: usize,
}

/// Compare two invariant sets for logical equivalence.
///
/// Builds a sorted index per side and fuses them, cancels shared invariants
/// (unless disabled), restricts the index to the variables the residual
/// sets still use and checks the residuals for equivalence. Residual
/// invariants with an unknown constant fail with `UnknownConstant` before
/// the solver is called; when both residuals are empty no query is issued.
pub fn compare<B: LiaBackend>(
    backend: &B,
    set_a: &[Invariant],
    set_b: &[Invariant],
    options: &CompareOptions,
) -> CheckResult<Comparison> {
    let index_a = VariableIndex::from_invariants(set_a);
    let index_b = VariableIndex::from_invariants(set_b);
    let fused = index_a.fuse(&index_b);
    debug!(
        vars_a = index_a.size(),
        vars_b = index_b.size(),
        fused = fused.size(),
        "fused variable indexes"
    );

    let (unique_a, unique_b) = if options.dedup {
        deduplicate(set_a, set_b, &fused)?
    } else {
        (set_a.to_vec(), set_b.to_vec())
    };

    if let Some(inv) = unique_a
        .iter()
        .chain(&unique_b)
        .find(|inv| !inv.constant().is_known())
    {
        return Err(CoreError::UnknownConstant(inv.to_string()).into());
    }

    let used: BTreeSet<&str> = unique_a
        .iter()
        .chain(&unique_b)
        .flat_map(|inv| inv.used_variables())
        .collect();
    let index = fused.restrict(used);
    debug!(vars = index.size(), "restricted index to residual variables");

    if unique_a.is_empty() && unique_b.is_empty() {
        return Ok(Comparison {
            unique_a,
            unique_b,
            index,
            verdict: Verdict::Equivalent,
            queries: 0,
        });
    }

    let verdict = ConsistencyChecker::new(backend).check_equivalence(&unique_a, &unique_b, &index)?;
    Ok(Comparison {
        unique_a,
        unique_b,
        index,
        verdict,
        queries: 1,
    })
}
