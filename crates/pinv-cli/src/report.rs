//! Text and JSON reports

use std::fmt;

use pinv_core::{Assignment, Invariant};
use pinv_parse::FlowKind;
use pinv_smt::{Comparison, Direction, RedundancyReport, Verdict};
use serde::Serialize;

/// Exit status of a command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    /// Everything compared equivalent, or only checks were run
    Clean,
    /// At least one comparison found a discrepancy
    Discrepant,
}

impl Status {
    pub fn and(self, other: Status) -> Status {
        if self == Status::Clean && other == Status::Clean {
            Status::Clean
        } else {
            Status::Discrepant
        }
    }
}

/// A violated invariant and its value at the witness
#[derive(Debug, Clone, Serialize)]
pub struct Violation {
    pub index: usize,
    pub equation: String,
    /// Left-hand side value
    pub evaluation: i128,
    /// Left-hand side minus constant
    pub delta: i128,
}

impl Violation {
    fn collect(
        invariants: &[Invariant],
        indices: &[usize],
        witness: &Assignment,
    ) -> pinv_core::Result<Vec<Violation>> {
        indices
            .iter()
            .map(|&index| {
                let inv = &invariants[index];
                Ok(Violation {
                    index,
                    equation: inv.to_string(),
                    evaluation: inv.lhs_value(witness),
                    delta: inv.evaluate(witness)?,
                })
            })
            .collect()
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Invariant : \"{}\" is contradicted, evaluation is {} (delta {}).",
            self.equation, self.evaluation, self.delta
        )
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "verdict", rename_all = "snake_case")]
pub enum PairOutcome {
    Equivalent,
    Discrepant {
        /// Non-zero variables of the witness
        witness: Assignment,
        direction: Direction,
        violated_a: Vec<Violation>,
        violated_b: Vec<Violation>,
    },
}

/// Comparison of two invariant sets
#[derive(Debug, Clone, Serialize)]
pub struct PairReport {
    pub a: String,
    pub b: String,
    pub unique_a: Vec<String>,
    pub unique_b: Vec<String>,
    pub queries: usize,
    #[serde(flatten)]
    pub outcome: PairOutcome,
}

impl PairReport {
    pub fn new(a: impl Into<String>, b: impl Into<String>, cmp: &Comparison) -> pinv_core::Result<Self> {
        let outcome = match &cmp.verdict {
            Verdict::Equivalent => PairOutcome::Equivalent,
            Verdict::Discrepant(d) => PairOutcome::Discrepant {
                witness: d.witness.sparse(),
                direction: d.direction,
                violated_a: Violation::collect(&cmp.unique_a, &d.violated_a, &d.witness)?,
                violated_b: Violation::collect(&cmp.unique_b, &d.violated_b, &d.witness)?,
            },
        };
        Ok(Self {
            a: a.into(),
            b: b.into(),
            unique_a: cmp.unique_a.iter().map(ToString::to_string).collect(),
            unique_b: cmp.unique_b.iter().map(ToString::to_string).collect(),
            queries: cmp.queries,
            outcome,
        })
    }

    pub fn status(&self) -> Status {
        match self.outcome {
            PairOutcome::Equivalent => Status::Clean,
            PairOutcome::Discrepant { .. } => Status::Discrepant,
        }
    }
}

fn write_violations(f: &mut fmt::Formatter<'_>, label: &str, violations: &[Violation]) -> fmt::Result {
    if violations.is_empty() {
        return writeln!(f, "{}: No violations.", label);
    }
    writeln!(f, "{}: The following invariants are violated:", label)?;
    for v in violations {
        writeln!(f, "  - {}", v)?;
    }
    Ok(())
}

impl fmt::Display for PairReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "After deduplication, A has {} invariants, B has {} invariants.",
            self.unique_a.len(),
            self.unique_b.len()
        )?;
        match &self.outcome {
            PairOutcome::Equivalent => writeln!(
                f,
                "No discrepancy found (UNSAT). The sets of invariants appear consistent."
            ),
            PairOutcome::Discrepant {
                witness,
                direction,
                violated_a,
                violated_b,
            } => {
                writeln!(f, "DISCREPANCY FOUND: XOR is satisfiable.")?;
                if witness.is_empty() {
                    writeln!(f, "All variables are 0 in this solution.")?;
                } else {
                    writeln!(f, "Sparse solution (non-zero variables): {}", witness)?;
                }
                match direction {
                    Direction::SatisfiesAViolatesB => {
                        writeln!(f, "=> Satisfies invariants of set A, violates set B.")?;
                        write_violations(f, "Set B", violated_b)
                    }
                    Direction::SatisfiesBViolatesA => {
                        writeln!(f, "=> Satisfies invariants of set B, violates set A.")?;
                        write_violations(f, "Set A", violated_a)
                    }
                    Direction::Ambiguous => {
                        writeln!(f, "=> Unexpected: Possibly both sets are partially satisfied.")?;
                        write_violations(f, "Set A", violated_a)?;
                        write_violations(f, "Set B", violated_b)
                    }
                }
            }
        }
    }
}

/// Pairwise comparison of several files
#[derive(Debug, Clone, Serialize)]
pub struct ConsistencyReport {
    pub pairs: Vec<PairReport>,
    /// Files linked by equivalent comparisons
    pub groups: Vec<Vec<String>>,
}

impl ConsistencyReport {
    pub fn status(&self) -> Status {
        self.pairs
            .iter()
            .fold(Status::Clean, |acc, pair| acc.and(pair.status()))
    }
}

impl fmt::Display for ConsistencyReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for pair in &self.pairs {
            writeln!(f, "=== {} vs {} ===", pair.a, pair.b)?;
            writeln!(f, "{}", pair)?;
        }
        writeln!(f, "Consistent groups:")?;
        for group in &self.groups {
            writeln!(f, "  {{{}}}", group.join(", "))?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct RedundantInvariant {
    pub index: usize,
    pub equation: String,
}

/// Redundancy check of one file
#[derive(Debug, Clone, Serialize)]
pub struct MinimalityReport {
    pub file: String,
    pub invariants: usize,
    pub redundant: Vec<RedundantInvariant>,
    pub queries: usize,
}

impl MinimalityReport {
    pub fn new(file: impl Into<String>, invariants: &[Invariant], report: &RedundancyReport) -> Self {
        Self {
            file: file.into(),
            invariants: invariants.len(),
            redundant: report
                .redundant
                .iter()
                .map(|&index| RedundantInvariant {
                    index,
                    equation: invariants[index].to_string(),
                })
                .collect(),
            queries: report.queries,
        }
    }
}

impl fmt::Display for MinimalityReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "=== {} ===", self.file)?;
        writeln!(
            f,
            "{} invariants, {} redundant, {} solver queries.",
            self.invariants,
            self.redundant.len(),
            self.queries
        )?;
        for r in &self.redundant {
            writeln!(f, "  #{}: {}", r.index, r.equation)?;
        }
        Ok(())
    }
}

/// One flow kind of a log comparison
#[derive(Debug, Clone, Serialize)]
pub struct FlowReport {
    pub flow: FlowKind,
    #[serde(flatten)]
    pub pair: PairReport,
}

impl fmt::Display for FlowReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self.flow {
            FlowKind::Place => "Place Flows",
            FlowKind::Transition => "Transition Flows",
        };
        writeln!(f, "=== Comparing {} ===", label)?;
        write!(f, "{}", self.pair)
    }
}
