//! GreatSPN and PetriSage invariant files
//!
//! The invariant files (`.pba`, `.tba`, `.pin`, `.tin`) are index based:
//!
//! ```text
//! 2
//! 2 1 1 1 2
//! 1 3 4
//! 0
//! ```
//!
//! The first line is the number of invariants. Each following line is
//! `k c1 i1 ... ck ik`: `k` terms of coefficient `c` on the 1-based place or
//! transition `i`. A final `0` line may close the list. Names come from the
//! GreatSPN `.net` description; without one, names are generated as
//! `p<i-1>` / `t<i-1>`.
//!
//! Neither format carries the constant of a place flow, so place flows get
//! an unknown right-hand side. Transition flows get 0.

use pinv_core::{Constant, Invariant};
use tracing::{debug, warn};

use crate::error::{ParseError, Result};
use crate::tool::{FlowKind, LogParser};

/// Place and transition names of a GreatSPN net, in file order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NetNames {
    pub places: Vec<String>,
    pub transitions: Vec<String>,
}

impl NetNames {
    /// Read names out of a GreatSPN `.net` file.
    ///
    /// The first two lines are skipped, the third is the `f` line whose
    /// fields 2 and 4 give the place and transition counts. Then come one
    /// line per place, then the transitions: every remaining line that does
    /// not start with whitespace.
    pub fn parse(source: &str) -> Result<Self> {
        let mut lines = source.lines().enumerate().skip(2);

        let (f_line_no, f_line) = lines
            .next()
            .ok_or_else(|| ParseError::malformed(3, "missing 'f' line"))?;
        let fields: Vec<&str> = f_line.split_whitespace().collect();
        if fields.first() != Some(&"f") {
            return Err(ParseError::malformed(f_line_no + 1, "expected 'f' line"));
        }
        let count = |pos: usize, what: &str| -> Result<usize> {
            fields
                .get(pos)
                .and_then(|s| s.parse().ok())
                .ok_or_else(|| ParseError::malformed(f_line_no + 1, format!("bad {} count", what)))
        };
        let num_places = count(2, "place")?;
        let num_transitions = count(4, "transition")?;

        let mut places = Vec::with_capacity(num_places);
        for (_, line) in lines.by_ref().take(num_places) {
            if let Some(name) = line.split_whitespace().next() {
                places.push(name.to_string());
            }
        }
        if places.len() != num_places {
            return Err(ParseError::CountMismatch {
                what: "places",
                expected: num_places,
                actual: places.len(),
            });
        }

        let transitions: Vec<String> = lines
            .filter(|(_, line)| !line.starts_with(char::is_whitespace))
            .filter_map(|(_, line)| line.split_whitespace().next())
            .map(str::to_string)
            .collect();
        if transitions.len() != num_transitions {
            return Err(ParseError::CountMismatch {
                what: "transitions",
                expected: num_transitions,
                actual: transitions.len(),
            });
        }

        debug!(places = places.len(), transitions = transitions.len(), "parsed net names");
        Ok(Self {
            places,
            transitions,
        })
    }

    fn for_kind(&self, kind: FlowKind) -> &[String] {
        match kind {
            FlowKind::Place => &self.places,
            FlowKind::Transition => &self.transitions,
        }
    }
}

/// Parser for GreatSPN / PetriSage invariant files
#[derive(Debug, Clone, Default)]
pub struct GreatSpn {
    names: Option<NetNames>,
}

impl GreatSpn {
    /// Resolve indices against the names of a parsed `.net` file
    pub fn with_net(names: NetNames) -> Self {
        Self { names: Some(names) }
    }

    fn name_of(&self, index: usize, kind: FlowKind) -> String {
        match &self.names {
            Some(names) => match index.checked_sub(1).and_then(|i| names.for_kind(kind).get(i)) {
                Some(name) => name.clone(),
                None => {
                    warn!(index, %kind, "index out of range of net names");
                    format!("unknown_{}", index)
                }
            },
            None => {
                let prefix = if kind.is_place() { 'p' } else { 't' };
                format!("{}{}", prefix, index.saturating_sub(1))
            }
        }
    }
}

impl LogParser for GreatSpn {
    fn parse(&self, source: &str, kind: FlowKind) -> Result<Vec<Invariant>> {
        let mut lines = source.lines().enumerate();
        let expected = loop {
            match lines.next() {
                Some((_, line)) if line.trim().is_empty() => continue,
                Some((i, line)) => {
                    break line.trim().parse::<usize>().map_err(|_| {
                        ParseError::malformed(i + 1, "invalid invariant count")
                    })?
                }
                None => return Err(ParseError::malformed(1, "missing invariant count")),
            }
        };

        let constant = match kind {
            FlowKind::Place => Constant::Unknown,
            FlowKind::Transition => Constant::Known(0),
        };

        let mut invariants = Vec::with_capacity(expected);
        for (i, line) in lines {
            let line_no = i + 1;
            let fields: Vec<&str> = line.split_whitespace().collect();
            if fields.is_empty() {
                continue;
            }
            if fields == ["0"] && invariants.len() == expected {
                break;
            }

            let numbers = fields
                .iter()
                .map(|f| f.parse::<i64>())
                .collect::<std::result::Result<Vec<i64>, _>>()
                .map_err(|_| ParseError::malformed(line_no, "non-integer field"))?;
            let num_terms = usize::try_from(numbers[0])
                .map_err(|_| ParseError::malformed(line_no, "negative term count"))?;
            if numbers.len() != 1 + 2 * num_terms {
                return Err(ParseError::malformed(
                    line_no,
                    format!("expected {} terms, found {} fields", num_terms, numbers.len() - 1),
                ));
            }

            let mut terms = Vec::with_capacity(num_terms);
            for pair in numbers[1..].chunks_exact(2) {
                let index = usize::try_from(pair[1])
                    .map_err(|_| ParseError::malformed(line_no, "negative index"))?;
                terms.push((self.name_of(index, kind), pair[0]));
            }
            invariants.push(
                Invariant::try_new(terms, constant).map_err(|source| ParseError::Equation {
                    line: line_no,
                    source,
                })?,
            );
        }

        if invariants.len() != expected {
            return Err(ParseError::CountMismatch {
                what: "invariants",
                expected,
                actual: invariants.len(),
            });
        }
        debug!(%kind, invariants = invariants.len(), "parsed greatspn invariants");
        Ok(invariants)
    }
}
