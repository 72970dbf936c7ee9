//! Persisted solution files (`.sol`)
//!
//! One equation per line in the text form of [`pinv_core::Invariant`];
//! blank lines are ignored. The flow kind is implied by how the file was
//! produced, so it is not consulted.

use pinv_core::Invariant;
use tracing::debug;

use crate::error::{ParseError, Result};
use crate::tool::{FlowKind, LogParser};

/// Parser for `.sol` files
#[derive(Debug, Clone, Copy, Default)]
pub struct SolutionFile;

impl SolutionFile {
    /// Render invariants in the persisted form, one per line
    pub fn render(invariants: &[Invariant]) -> String {
        let mut out = String::new();
        for inv in invariants {
            out.push_str(&inv.to_string());
            out.push('\n');
        }
        out
    }
}

impl LogParser for SolutionFile {
    fn parse(&self, source: &str, _kind: FlowKind) -> Result<Vec<Invariant>> {
        let mut invariants = Vec::new();
        for (i, line) in source.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            let inv = line
                .parse()
                .map_err(|source| ParseError::Equation { line: i + 1, source })?;
            invariants.push(inv);
        }
        debug!(invariants = invariants.len(), "parsed solution file");
        Ok(invariants)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pinv_core::Constant;

    #[test]
    fn test_parse_lines() {
        let src = "p1 + 2*p2 - p3 = 1\n\n  -q = ?  \n0 = 0\n";
        let invs = SolutionFile.parse(src, FlowKind::Place).unwrap();
        assert_eq!(invs.len(), 3);
        assert_eq!(invs[0].coefficient("p2"), 2);
        assert_eq!(invs[1].constant(), Constant::Unknown);
        assert!(invs[2].is_empty());
    }

    #[test]
    fn test_bad_line_fails_whole_file() {
        let src = "x = 1\ny = 2\nz ==\n";
        let err = SolutionFile.parse(src, FlowKind::Place).unwrap_err();
        assert!(matches!(err, ParseError::Equation { line: 3, .. }));
    }

    #[test]
    fn test_render_then_parse() {
        let invs = vec![
            Invariant::new([("a", 1), ("b", -3)], 2),
            Invariant::new([("c", 1)], Constant::Unknown),
        ];
        let text = SolutionFile::render(&invs);
        assert_eq!(text, "a - 3*b = 2\nc = ?\n");
        assert_eq!(SolutionFile.parse(&text, FlowKind::Place).unwrap(), invs);
    }

    #[test]
    fn test_empty_file() {
        assert!(SolutionFile.parse("", FlowKind::Transition).unwrap().is_empty());
    }
}
