//! Redundancy detection within one invariant set
//!
//! Every invariant `i` gets a guard literal `g_i` asserted equivalent to its
//! equation. Invariant `i` is redundant when `domain ∧ ⋀ g_j ∧ ¬g_i` is
//! unsatisfiable for the chosen set of `j ≠ i`: whenever the others hold,
//! `i` holds too. One solver query per invariant.

use pinv_core::{Invariant, VariableIndex};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::encoder::ConstraintEncoder;
use crate::error::{CheckError, CheckResult};
use crate::solver::{LiaBackend, LiaSession, SatOutcome, SessionTask};

/// How the "others" of each query are chosen
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RedundancyMode {
    /// Invariants are examined in order and an invariant found redundant
    /// is left out of every later query. The reported set can be removed
    /// as a whole and the remainder is equivalent to the input.
    #[default]
    Greedy,
    /// Each invariant is tested against all the others. Every member of a
    /// group of mutually implying invariants is reported. Queries are
    /// independent and run on a rayon pool.
    Independent,
}

/// Configuration for [`MinimalityChecker`]
#[derive(Debug, Clone, Default)]
pub struct MinimalityConfig {
    pub mode: RedundancyMode,

    /// Maximum number of worker threads in [`RedundancyMode::Independent`].
    /// None means use rayon's default (typically number of cores).
    pub max_threads: Option<usize>,
}

impl MinimalityConfig {
    pub fn with_mode(mut self, mode: RedundancyMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_max_threads(mut self, max_threads: usize) -> Self {
        self.max_threads = Some(max_threads);
        self
    }
}

/// Result of a redundancy check
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RedundancyReport {
    /// Positions of the redundant invariants, ascending
    pub redundant: Vec<usize>,
    /// Number of solver queries issued
    pub queries: usize,
}

/// Redundancy checker over a solver backend
#[derive(Debug, Clone)]
pub struct MinimalityChecker<'b, B> {
    backend: &'b B,
    config: MinimalityConfig,
}

impl<'b, B: LiaBackend> MinimalityChecker<'b, B> {
    pub fn new(backend: &'b B) -> Self {
        Self::with_config(backend, MinimalityConfig::default())
    }

    pub fn with_config(backend: &'b B, config: MinimalityConfig) -> Self {
        Self { backend, config }
    }

    /// Find the invariants of `invariants` implied by the others.
    ///
    /// `index` must cover every variable used. Sets of at most one
    /// invariant are never redundant and issue no query.
    pub fn find_redundant(
        &self,
        invariants: &[Invariant],
        index: &VariableIndex,
    ) -> CheckResult<RedundancyReport> {
        if invariants.len() <= 1 {
            return Ok(RedundancyReport::default());
        }
        debug!(
            invariants = invariants.len(),
            vars = index.size(),
            mode = ?self.config.mode,
            "checking redundancy"
        );

        let report = match self.config.mode {
            RedundancyMode::Greedy => {
                let targets: Vec<usize> = (0..invariants.len()).collect();
                self.backend.solve(
                    index.size(),
                    RedundancyQueries {
                        index,
                        invariants,
                        targets: &targets,
                        greedy: true,
                    },
                )?
            }
            RedundancyMode::Independent => self.find_independent(invariants, index)?,
        };

        info!(
            redundant = report.redundant.len(),
            queries = report.queries,
            "redundancy check finished"
        );
        Ok(report)
    }

    fn find_independent(
        &self,
        invariants: &[Invariant],
        index: &VariableIndex,
    ) -> CheckResult<RedundancyReport> {
        // Build the thread pool with optional thread limit
        let pool = match self.config.max_threads {
            Some(max_threads) => Some(
                rayon::ThreadPoolBuilder::new()
                    .num_threads(max_threads)
                    .build()
                    .map_err(|e| {
                        CheckError::InvalidConfig(format!("Failed to create thread pool: {}", e))
                    })?,
            ),
            None => None,
        };
        let workers = pool
            .as_ref()
            .map_or_else(rayon::current_num_threads, |p| p.current_num_threads())
            .max(1);

        let targets: Vec<usize> = (0..invariants.len()).collect();
        let chunk_size = targets.len().div_ceil(workers);

        // One session per chunk, each seeded with the full guard set
        let run = || {
            targets
                .par_chunks(chunk_size)
                .map(|chunk| {
                    self.backend.solve(
                        index.size(),
                        RedundancyQueries {
                            index,
                            invariants,
                            targets: chunk,
                            greedy: false,
                        },
                    )
                })
                .collect::<CheckResult<Vec<RedundancyReport>>>()
        };
        let parts = match pool {
            Some(pool) => pool.install(run)?,
            None => run()?,
        };

        let mut report = RedundancyReport::default();
        for part in parts {
            report.redundant.extend(part.redundant);
            report.queries += part.queries;
        }
        report.redundant.sort_unstable();
        Ok(report)
    }
}

/// Redundancy queries for `targets` within one session
struct RedundancyQueries<'a> {
    index: &'a VariableIndex,
    invariants: &'a [Invariant],
    targets: &'a [usize],
    greedy: bool,
}

impl SessionTask for RedundancyQueries<'_> {
    type Output = RedundancyReport;

    fn run<S: LiaSession>(self, session: &mut S) -> CheckResult<RedundancyReport> {
        let encoder = ConstraintEncoder::new(self.index);
        let domain = encoder.domain(session)?;
        session.assert(&domain);

        let mut guards = Vec::with_capacity(self.invariants.len());
        for (i, inv) in self.invariants.iter().enumerate() {
            let equation = encoder.equation(session, inv)?;
            guards.push(session.guard(&format!("inv{}", i), &equation));
        }

        let mut dropped = vec![false; self.invariants.len()];
        let mut report = RedundancyReport::default();
        for &i in self.targets {
            let mut assumptions: Vec<S::Formula> = guards
                .iter()
                .enumerate()
                .filter(|(j, _)| *j != i && !dropped[*j])
                .map(|(_, g)| g.clone())
                .collect();
            assumptions.push(session.not(&guards[i]));

            report.queries += 1;
            match session.check(&assumptions)? {
                SatOutcome::Unsat => {
                    debug!(invariant = i, "redundant");
                    report.redundant.push(i);
                    if self.greedy {
                        dropped[i] = true;
                    }
                }
                SatOutcome::Sat(_) => {}
                SatOutcome::Unknown(reason) => return Err(CheckError::inconclusive(reason)),
            }
        }
        Ok(report)
    }
}
