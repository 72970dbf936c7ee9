//! pinv-core - linear flow invariants of Petri nets
//!
//! This crate holds the data model shared by every stage of an invariant
//! comparison run:
//!
//! - [`VariableIndex`]: a dense bijection between variable names and positions,
//!   with union ([`VariableIndex::fuse`]) and intersection
//!   ([`VariableIndex::restrict`]) derivation
//! - [`Invariant`]: a canonical sparse equation `sum(coeff * var) = const`
//! - [`deduplicate`]: removal of equations present on both sides of a comparison
//! - the persisted equation text form (`Display` / `FromStr` on [`Invariant`])
//!
//! # Example
//!
//! ```rust
//! use pinv_core::{deduplicate, Invariant, VariableIndex};
//!
//! let a: Invariant = "x + y = 3".parse().unwrap();
//! let b: Invariant = "x - y = 1".parse().unwrap();
//!
//! let index = VariableIndex::from_invariants([&a, &b]);
//! let (only_a, only_b) = deduplicate(&[a.clone()], &[a, b.clone()], &index).unwrap();
//! assert!(only_a.is_empty());
//! assert_eq!(only_b, vec![b]);
//! ```

mod dedup;
mod error;
mod invariant;
mod text;
mod var_index;

pub use dedup::deduplicate;
pub use error::{Error, Result};
pub use invariant::{violations, Assignment, Constant, Invariant, Signature};
pub use var_index::VariableIndex;
