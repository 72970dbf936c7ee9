//! pinv-parse - readers for Petri net invariant tool outputs
//!
//! Each supported tool gets a [`LogParser`] implementation that extracts
//! either the place flows or the transition flows ([`FlowKind`]) of a net
//! from the tool's output:
//!
//! - [`Tina`]: `struct` flow sections
//! - [`PetriSpot`]: `inv :` blocks of `petri32/64/128`
//! - [`GreatSpn`]: index-based `.pba` / `.tba` files, with names from a
//!   `.net` description ([`NetNames`])
//! - [`SolutionFile`]: persisted `.sol` equation files
//!
//! [`ToolKind`] maps a tool name or file extension to its [`Parser`].
//! [`split_log_and_invariants`] separates a raw log into residual text and
//! the invariants it lists.
//!
//! # Example
//!
//! ```rust
//! use pinv_parse::{FlowKind, LogParser, ToolKind};
//!
//! let log = "Computed 1 P semiflows in 0 ms.\ninv : p0 + p1 = 1\n";
//! let parser = "petrispot".parse::<ToolKind>().unwrap().parser();
//! let invariants = parser.parse(log, FlowKind::Place).unwrap();
//! assert_eq!(invariants[0].to_string(), "p0 + p1 = 1");
//! ```

mod error;
mod greatspn;
mod petrispot;
mod solution;
mod split;
mod tina;
mod tool;

pub use error::{ParseError, Result};
pub use greatspn::{GreatSpn, NetNames};
pub use petrispot::PetriSpot;
pub use solution::SolutionFile;
pub use split::split_log_and_invariants;
pub use tina::Tina;
pub use tool::{FlowKind, LogParser, Parser, ToolKind};
