//! Logical equivalence of two invariant sets
//!
//! Both sets are encoded over one shared integer vector. The query
//! `domain ∧ (A xor B)` is unsatisfiable exactly when the two conjunctions
//! agree on every nonnegative integer point. A model of the query is a
//! point where one side holds and the other fails.

use pinv_core::{violations, Assignment, Invariant, VariableIndex};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::encoder::ConstraintEncoder;
use crate::error::{CheckError, CheckResult};
use crate::solver::{LiaBackend, LiaSession, SatOutcome, SessionTask};

/// Which side a discrepancy witness satisfies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    /// Every invariant of A holds, at least one of B fails
    SatisfiesAViolatesB,
    /// Every invariant of B holds, at least one of A fails
    SatisfiesBViolatesA,
    /// The witness satisfies both sides or neither
    Ambiguous,
}

impl Direction {
    fn classify(violated_a: &[usize], violated_b: &[usize]) -> Self {
        match (violated_a.is_empty(), violated_b.is_empty()) {
            (true, false) => Direction::SatisfiesAViolatesB,
            (false, true) => Direction::SatisfiesBViolatesA,
            _ => Direction::Ambiguous,
        }
    }
}

/// A point on which the two sets disagree
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Discrepancy {
    /// Value of every indexed variable
    pub witness: Assignment,
    /// Indices into set A of the invariants the witness violates
    pub violated_a: Vec<usize>,
    /// Indices into set B of the invariants the witness violates
    pub violated_b: Vec<usize>,
    pub direction: Direction,
}

/// Outcome of an equivalence check
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "verdict", rename_all = "snake_case")]
pub enum Verdict {
    Equivalent,
    Discrepant(Discrepancy),
}

impl Verdict {
    pub fn is_equivalent(&self) -> bool {
        matches!(self, Verdict::Equivalent)
    }
}

/// Equivalence checker over a solver backend
#[derive(Debug, Clone, Copy)]
pub struct ConsistencyChecker<'b, B> {
    backend: &'b B,
}

impl<'b, B: LiaBackend> ConsistencyChecker<'b, B> {
    pub fn new(backend: &'b B) -> Self {
        Self { backend }
    }

    /// Decide whether `set_a` and `set_b` hold on the same nonnegative
    /// integer points of `index`.
    ///
    /// `index` must cover every variable of both sets. One solver query.
    pub fn check_equivalence(
        &self,
        set_a: &[Invariant],
        set_b: &[Invariant],
        index: &VariableIndex,
    ) -> CheckResult<Verdict> {
        debug!(
            a = set_a.len(),
            b = set_b.len(),
            vars = index.size(),
            "checking equivalence"
        );
        let query = XorQuery {
            index,
            set_a,
            set_b,
        };

        let values = match self.backend.solve(index.size(), query)? {
            SatOutcome::Unsat => {
                info!("invariant sets are equivalent");
                return Ok(Verdict::Equivalent);
            }
            SatOutcome::Unknown(reason) => return Err(CheckError::inconclusive(reason)),
            SatOutcome::Sat(values) => values,
        };

        if values.len() != index.size() {
            return Err(CheckError::ModelError(format!(
                "model has {} values for {} variables",
                values.len(),
                index.size()
            )));
        }
        let witness: Assignment = index
            .iter()
            .map(|(_, name)| name)
            .zip(values)
            .collect();

        let violated_a = violations(set_a, &witness)?;
        let violated_b = violations(set_b, &witness)?;
        let direction = Direction::classify(&violated_a, &violated_b);
        if direction == Direction::Ambiguous {
            warn!(
                %witness,
                violated_a = violated_a.len(),
                violated_b = violated_b.len(),
                "witness does not separate the two sets"
            );
        } else {
            info!(%witness, ?direction, "invariant sets differ");
        }

        Ok(Verdict::Discrepant(Discrepancy {
            witness,
            violated_a,
            violated_b,
            direction,
        }))
    }
}

struct XorQuery<'a> {
    index: &'a VariableIndex,
    set_a: &'a [Invariant],
    set_b: &'a [Invariant],
}

impl SessionTask for XorQuery<'_> {
    type Output = SatOutcome;

    fn run<S: LiaSession>(self, session: &mut S) -> CheckResult<SatOutcome> {
        let encoder = ConstraintEncoder::new(self.index);
        let domain = encoder.domain(session)?;
        let a = encoder.encode(session, self.set_a)?;
        let b = encoder.encode(session, self.set_b)?;
        let differ = session.xor(&a, &b);
        session.assert(&domain);
        session.assert(&differ);
        session.check(&[])
    }
}
