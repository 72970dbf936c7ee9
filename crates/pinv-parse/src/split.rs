//! Separation of a raw tool log into residual text and invariants
//!
//! Tool logs are archived without their (potentially huge) invariant
//! listings, which move to a `.sol` file instead. This module only computes
//! the two parts; writing them back is left to the caller.

use pinv_core::Invariant;
use tracing::debug;

use crate::error::{ParseError, Result};
use crate::petrispot::PetriSpot;
use crate::tina::Tina;
use crate::tool::{FlowKind, LogParser, ToolKind};

/// Split `raw` into the log without its invariant lines and the invariants.
///
/// - Tina: the invariants of `kind` are parsed from the flow sections, and
///   every line ending with a parenthesized integer is removed.
/// - PetriSpot: every `inv : ...` line is removed and decoded, whatever
///   block it belongs to.
///
/// Line endings of the kept lines are preserved. Other tools do not print
/// invariants inline and fail with `UnsupportedConfiguration`.
pub fn split_log_and_invariants(
    raw: &str,
    tool: ToolKind,
    kind: FlowKind,
) -> Result<(String, Vec<Invariant>)> {
    let (residual, invariants) = match tool {
        ToolKind::Tina => {
            let invariants = Tina.parse(raw, kind)?;
            let residual: String = raw
                .split_inclusive('\n')
                .filter(|line| !Tina::is_flow_line(line))
                .collect();
            (residual, invariants)
        }
        ToolKind::PetriSpot => {
            let mut residual = String::with_capacity(raw.len());
            let mut invariants = Vec::new();
            for (i, line) in raw.split_inclusive('\n').enumerate() {
                match PetriSpot::invariant_text(line.trim_end()) {
                    Some(text) => invariants.push(PetriSpot::decode(i + 1, text)?),
                    None => residual.push_str(line),
                }
            }
            (residual, invariants)
        }
        other => {
            return Err(ParseError::unsupported(format!(
                "{} output has no inline invariants to split",
                other
            )))
        }
    };

    debug!(
        %tool,
        removed = raw.len() - residual.len(),
        invariants = invariants.len(),
        "split log"
    );
    Ok((residual, invariants))
}
