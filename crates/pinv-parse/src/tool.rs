//! Tool identification and parser dispatch

use std::fmt;
use std::fs;
use std::path::Path;
use std::str::FromStr;

use pinv_core::Invariant;
use serde::{Deserialize, Serialize};

use crate::error::{ParseError, Result};
use crate::greatspn::GreatSpn;
use crate::petrispot::PetriSpot;
use crate::solution::SolutionFile;
use crate::tina::Tina;

/// Which flows to extract from a tool output
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FlowKind {
    /// Place flows and semiflows (weighted token conservation)
    Place,
    /// Transition flows and semiflows (firing vectors returning to the
    /// initial marking)
    Transition,
}

impl FlowKind {
    pub fn is_place(self) -> bool {
        self == FlowKind::Place
    }
}

impl fmt::Display for FlowKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FlowKind::Place => f.write_str("place"),
            FlowKind::Transition => f.write_str("transition"),
        }
    }
}

/// Accepts the computation modes tools are run with (`pflows`,
/// `tsemiflows`, ...) as well as `place` / `transition`.
impl FromStr for FlowKind {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "pflows" | "psemiflows" | "flows" | "semiflows" | "place" => Ok(FlowKind::Place),
            "tflows" | "tsemiflows" | "transition" => Ok(FlowKind::Transition),
            other => Err(ParseError::unsupported(format!("unknown flow mode '{}'", other))),
        }
    }
}

/// A source of flow invariants
pub trait LogParser {
    /// Extract the invariants of `kind` from `source`.
    ///
    /// An output without any invariant of that kind yields an empty list.
    fn parse(&self, source: &str, kind: FlowKind) -> Result<Vec<Invariant>>;

    /// Read `path` and [`parse`](LogParser::parse) its contents
    fn parse_file(&self, path: &Path, kind: FlowKind) -> Result<Vec<Invariant>> {
        let source = fs::read_to_string(path)?;
        self.parse(&source, kind)
    }
}

/// Tool that produced an output file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToolKind {
    Tina,
    PetriSpot,
    GreatSpn,
    SolutionFile,
}

impl ToolKind {
    pub const ALL: [ToolKind; 4] = [
        ToolKind::Tina,
        ToolKind::PetriSpot,
        ToolKind::GreatSpn,
        ToolKind::SolutionFile,
    ];

    pub fn name(self) -> &'static str {
        match self {
            ToolKind::Tina => "tina",
            ToolKind::PetriSpot => "petrispot",
            ToolKind::GreatSpn => "greatspn",
            ToolKind::SolutionFile => "sol",
        }
    }

    /// Whether a single output of this tool lists both place and
    /// transition flows. GreatSPN invariant files and solution files hold
    /// one set each.
    pub fn lists_both_flows(self) -> bool {
        matches!(self, ToolKind::Tina | ToolKind::PetriSpot)
    }

    /// Infer the tool from a file extension
    pub fn from_path(path: &Path) -> Result<Self> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();
        match ext.as_str() {
            "tina" => Ok(ToolKind::Tina),
            "petri32" | "petri64" | "petri128" => Ok(ToolKind::PetriSpot),
            "pba" | "tba" | "pin" | "tin" => Ok(ToolKind::GreatSpn),
            "sol" => Ok(ToolKind::SolutionFile),
            _ => Err(ParseError::unsupported(format!(
                "cannot infer tool from '{}'",
                path.display()
            ))),
        }
    }

    /// Parser for this tool, with default settings
    pub fn parser(self) -> Parser {
        match self {
            ToolKind::Tina => Parser::Tina(Tina),
            ToolKind::PetriSpot => Parser::PetriSpot(PetriSpot),
            ToolKind::GreatSpn => Parser::GreatSpn(GreatSpn::default()),
            ToolKind::SolutionFile => Parser::SolutionFile(SolutionFile),
        }
    }
}

impl fmt::Display for ToolKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ToolKind {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "tina" => Ok(ToolKind::Tina),
            "petrispot" | "petri32" | "petri64" | "petri128" => Ok(ToolKind::PetriSpot),
            "greatspn" | "petrisage" => Ok(ToolKind::GreatSpn),
            "sol" | "solution" => Ok(ToolKind::SolutionFile),
            other => Err(ParseError::unsupported(format!("unknown tool '{}'", other))),
        }
    }
}

/// One parser per supported tool
#[derive(Debug, Clone)]
pub enum Parser {
    Tina(Tina),
    PetriSpot(PetriSpot),
    GreatSpn(GreatSpn),
    SolutionFile(SolutionFile),
}

impl LogParser for Parser {
    fn parse(&self, source: &str, kind: FlowKind) -> Result<Vec<Invariant>> {
        match self {
            Parser::Tina(p) => p.parse(source, kind),
            Parser::PetriSpot(p) => p.parse(source, kind),
            Parser::GreatSpn(p) => p.parse(source, kind),
            Parser::SolutionFile(p) => p.parse(source, kind),
        }
    }
}
