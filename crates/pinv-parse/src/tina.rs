//! Tina (`struct`) flow and semiflow output
//!
//! Flows are printed inside sections introduced by a header such as
//! `P-SEMI-FLOWS GENERATING SET`, one flow per line:
//!
//! ```text
//! p0 p72 p73 p74 (1)
//! capacity_c0*-1 resource_c0*-4 (10)
//! ```
//!
//! Every term is a name with an optional `*coefficient` suffix and the
//! parenthesized integer is the weighted token count. Lines of a section
//! that do not have this shape (timings, blank lines, banners) are skipped.

use std::sync::LazyLock;

use pinv_core::Invariant;
use regex::Regex;
use tracing::debug;

use crate::error::{ParseError, Result};
use crate::tool::{FlowKind, LogParser};

/// `<terms> (<integer>)`
static FLOW_LINE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(.*?)\s*\((-?\d+)\)\s*$").unwrap());

/// `name` or `name*coeff`
static TERM_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([^()]+?)(?:\*(-?\d+))?$").unwrap());

const PLACE_HEADERS: [&str; 2] = ["P-FLOWS BASIS", "P-SEMI-FLOWS GENERATING SET"];
const TRANSITION_HEADERS: [&str; 2] = ["T-FLOWS BASIS", "T-SEMI-FLOWS GENERATING SET"];

/// Parser for Tina logs
#[derive(Debug, Clone, Copy, Default)]
pub struct Tina;

impl Tina {
    /// Whether `line` has the shape of a printed flow, i.e. ends with a
    /// parenthesized integer
    pub fn is_flow_line(line: &str) -> bool {
        FLOW_LINE_RE.is_match(line.trim())
    }
}

fn ends_section(line: &str) -> bool {
    line.starts_with("0.000s")
        || line.starts_with("not invariant")
        || line.starts_with("not consistent")
        || line.contains("FLOWS BASIS")
        || line.contains("SEMI-FLOWS")
        || line.contains("ANALYSIS COMPLETED")
}

impl LogParser for Tina {
    fn parse(&self, source: &str, kind: FlowKind) -> Result<Vec<Invariant>> {
        let headers = match kind {
            FlowKind::Place => PLACE_HEADERS,
            FlowKind::Transition => TRANSITION_HEADERS,
        };

        let mut invariants = Vec::new();
        let mut in_section = false;
        let mut sections = 0;
        for (i, line) in source.lines().enumerate() {
            let line = line.trim();
            if headers.iter().any(|h| line.contains(h)) {
                in_section = true;
                sections += 1;
                continue;
            }
            if !in_section {
                continue;
            }
            if ends_section(line) {
                in_section = false;
                continue;
            }
            if let Some(inv) = parse_flow_line(i + 1, line, kind)? {
                invariants.push(inv);
            }
        }

        debug!(%kind, sections, invariants = invariants.len(), "parsed tina log");
        Ok(invariants)
    }
}

/// Decode one line of a flow section; `None` for noise lines
fn parse_flow_line(line_no: usize, line: &str, kind: FlowKind) -> Result<Option<Invariant>> {
    let Some(caps) = FLOW_LINE_RE.captures(line) else {
        return Ok(None);
    };

    let constant: i64 = caps[2]
        .parse()
        .map_err(|_| ParseError::malformed(line_no, format!("constant out of range: {}", line)))?;
    // Transition flows have no weighted count
    let constant = match kind {
        FlowKind::Place => constant,
        FlowKind::Transition => 0,
    };

    let mut terms = Vec::new();
    for chunk in caps[1].split_whitespace() {
        let Some(term) = TERM_RE.captures(chunk) else {
            continue;
        };
        let coeff = match term.get(2) {
            Some(c) => c.as_str().parse::<i64>().map_err(|_| {
                ParseError::malformed(line_no, format!("coefficient out of range: {}", chunk))
            })?,
            None => 1,
        };
        terms.push((term[1].trim().to_string(), coeff));
    }
    Invariant::try_new(terms, constant)
        .map(Some)
        .map_err(|source| ParseError::Equation {
            line: line_no,
            source,
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    const LOG: &str = "\
# net model, 4 places, 3 transitions

P-SEMI-FLOWS GENERATING SET -------------------------------------

invariant

p0 p1 (1)
p2*2 p3 (4)
capacity_c0*-1 resource_c0*-4 (-10)

0.001s

T-SEMI-FLOWS GENERATING SET -------------------------------------

consistent

t0 t1 t2 (3)

0.000s

ANALYSIS COMPLETED
";

    fn eq(text: &str) -> Invariant {
        text.parse().unwrap()
    }

    #[test]
    fn test_place_flows() {
        let invs = Tina.parse(LOG, FlowKind::Place).unwrap();
        assert_eq!(
            invs,
            vec![
                eq("p0 + p1 = 1"),
                eq("2*p2 + p3 = 4"),
                eq("-capacity_c0 - 4*resource_c0 = -10"),
            ]
        );
    }

    #[test]
    fn test_transition_flows_have_zero_constant() {
        let invs = Tina.parse(LOG, FlowKind::Transition).unwrap();
        assert_eq!(invs, vec![eq("t0 + t1 + t2 = 0")]);
    }

    #[test]
    fn test_flows_basis_header() {
        let log = "P-FLOWS BASIS\np0 p1*-1 (0)\nnot invariant\np5 (1)\n";
        let invs = Tina.parse(log, FlowKind::Place).unwrap();
        assert_eq!(invs, vec![eq("p0 - p1 = 0")]);
    }

    #[test]
    fn test_section_runs_to_end_of_input() {
        let log = "T-FLOWS BASIS\nt0 t1 (0)\nt2 t3 (0)";
        let invs = Tina.parse(log, FlowKind::Transition).unwrap();
        assert_eq!(invs.len(), 2);
    }

    #[test]
    fn test_no_section_is_empty() {
        assert!(Tina.parse(LOG, FlowKind::Place).is_ok());
        let invs = Tina.parse("net model\n0.000s\n", FlowKind::Place).unwrap();
        assert!(invs.is_empty());
    }

    #[test]
    fn test_overflowing_repeated_term() {
        let log = "P-FLOWS BASIS\np0*9223372036854775807 p0 (0)\n";
        let err = Tina.parse(log, FlowKind::Place).unwrap_err();
        assert!(matches!(err, ParseError::Equation { line: 2, .. }));
    }

    #[test]
    fn test_overflowing_constant_is_malformed() {
        let log = "P-FLOWS BASIS\np0 (99999999999999999999)\n";
        let err = Tina.parse(log, FlowKind::Place).unwrap_err();
        assert!(matches!(err, ParseError::Malformed { line: 2, .. }));
    }

    #[test]
    fn test_is_flow_line() {
        assert!(Tina::is_flow_line("p0 p72 p73 p74 (1)"));
        assert!(Tina::is_flow_line("  capacity_c0*-1 (-3)  "));
        assert!(!Tina::is_flow_line("0.073s"));
        assert!(!Tina::is_flow_line("P-SEMI-FLOWS GENERATING SET"));
    }
}
