//! pinv-smt - solver-backed checks over linear invariant sets
//!
//! This crate decides, with an exact linear-integer-arithmetic solver,
//! whether two invariant sets are logically equivalent over the nonnegative
//! integers, and which members of a single set are implied by the rest.
//!
//! # Features
//!
//! - A backend contract ([`LiaSession`], [`LiaBackend`]) with a Z3
//!   implementation ([`Z3Backend`])
//! - Encoding of invariants into guarded linear equalities
//!   ([`ConstraintEncoder`])
//! - Equivalence checking with discrepancy witnesses ([`ConsistencyChecker`])
//! - Redundancy detection, one solver query per invariant
//!   ([`MinimalityChecker`])
//! - The full comparison pipeline: index fusion, deduplication, restriction,
//!   equivalence check ([`compare`])
//!
//! # Example
//!
//! ```rust,ignore
//! use pinv_core::Invariant;
//! use pinv_smt::{compare, CompareOptions, Verdict, Z3Backend};
//!
//! let a: Vec<Invariant> = vec!["x + y = 3".parse()?];
//! let b: Vec<Invariant> = vec!["x + y = 3".parse()?, "x - y = 1".parse()?];
//!
//! let backend = Z3Backend::default();
//! let comparison = compare(&backend, &a, &b, &CompareOptions::default())?;
//! match comparison.verdict {
//!     Verdict::Equivalent => println!("consistent"),
//!     Verdict::Discrepant(d) => println!("witness: {}", d.witness),
//! }
//! ```

mod consistency;
mod encoder;
mod error;
mod minimality;
mod pipeline;
mod solver;
#[cfg(test)]
mod testing;

pub use consistency::{ConsistencyChecker, Direction, Discrepancy, Verdict};
pub use encoder::ConstraintEncoder;
pub use error::{CheckError, CheckResult as Result};
pub use minimality::{MinimalityChecker, MinimalityConfig, RedundancyMode, RedundancyReport};
pub use pipeline::{compare, CompareOptions, Comparison};
pub use solver::{LiaBackend, LiaSession, SatOutcome, SessionTask, SolverConfig, Z3Backend, Z3Session};
