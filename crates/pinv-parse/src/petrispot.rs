//! PetriSpot (`petri32` / `petri64` / `petri128`) output
//!
//! Each computation prints a block
//!
//! ```text
//! Computed 2 P semiflows in 0 ms.
//! inv : capacity_c0 + capacity_c1 + 4*resource_c0 + resource_c1 = 10
//! inv : p1 - p3 = 0
//! Total of 2 invariants.
//! ```
//!
//! whose `inv :` lines carry equations in the persisted text form.

use std::sync::LazyLock;

use pinv_core::Invariant;
use regex::Regex;
use tracing::debug;

use crate::error::{ParseError, Result};
use crate::tool::{FlowKind, LogParser};

/// `Computed <n> P|T flows|semiflows in`
static BLOCK_START_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^Computed\s+\d+\s+([PT])\s+(?:flows|semiflows)\s+in\b").unwrap()
});

/// `inv : <equation>`
static INV_LINE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*inv\s*:\s*(.*)$").unwrap());

/// Parser for PetriSpot logs
#[derive(Debug, Clone, Copy, Default)]
pub struct PetriSpot;

impl PetriSpot {
    /// The equation text of an `inv : ...` line
    pub fn invariant_text(line: &str) -> Option<&str> {
        INV_LINE_RE
            .captures(line)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str())
    }

    /// Decode the equation of an `inv : ...` line found at `line_no`
    pub fn decode(line_no: usize, text: &str) -> Result<Invariant> {
        text.parse()
            .map_err(|source| ParseError::Equation { line: line_no, source })
    }
}

impl LogParser for PetriSpot {
    fn parse(&self, source: &str, kind: FlowKind) -> Result<Vec<Invariant>> {
        let wanted = match kind {
            FlowKind::Place => "P",
            FlowKind::Transition => "T",
        };

        let mut invariants = Vec::new();
        let mut in_block = false;
        for (i, line) in source.lines().enumerate() {
            let line = line.trim();
            if let Some(caps) = BLOCK_START_RE.captures(line) {
                in_block = &caps[1] == wanted;
                continue;
            }
            if !in_block {
                continue;
            }
            if line.is_empty() || line.starts_with("Computed ") || line.starts_with("Total of ") {
                in_block = false;
                continue;
            }
            if let Some(text) = Self::invariant_text(line) {
                invariants.push(Self::decode(i + 1, text)?);
            }
        }

        debug!(%kind, invariants = invariants.len(), "parsed petrispot log");
        Ok(invariants)
    }
}
