//! Command implementations

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use pinv_core::{Invariant, VariableIndex};
use pinv_parse::{
    split_log_and_invariants, FlowKind, GreatSpn, LogParser, NetNames, ParseError, SolutionFile,
    ToolKind,
};
use pinv_smt::{compare, MinimalityChecker, MinimalityConfig, RedundancyMode};
use serde::Serialize;
use tracing::info;

use crate::groups::FileGroups;
use crate::report::{ConsistencyReport, FlowReport, MinimalityReport, PairReport, Status};
use crate::SolverArgs;

fn display_name(path: &Path) -> String {
    path.display().to_string()
}

fn load_solution(path: &Path) -> Result<Vec<Invariant>> {
    SolutionFile
        .parse_file(path, FlowKind::Place)
        .with_context(|| format!("failed to read solution file {}", path.display()))
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Compare every pair of solution files
pub fn check_consistency(files: &[PathBuf], solver: &SolverArgs) -> Result<Status> {
    let sets = files
        .iter()
        .map(|path| load_solution(path))
        .collect::<Result<Vec<_>>>()?;
    let names: Vec<String> = files.iter().map(|p| display_name(p)).collect();

    let backend = solver.backend();
    let options = solver.compare_options();
    let mut classes = FileGroups::new(files.len());
    let mut pairs = Vec::new();
    for i in 0..sets.len() {
        for j in (i + 1)..sets.len() {
            let cmp = compare(&backend, &sets[i], &sets[j], &options)
                .with_context(|| format!("failed to compare {} and {}", names[i], names[j]))?;
            if cmp.verdict.is_equivalent() {
                classes.link(i, j);
            }
            pairs.push(PairReport::new(&names[i], &names[j], &cmp)?);
        }
    }

    let groups = classes
        .into_groups()
        .into_iter()
        .map(|group| group.into_iter().map(|i| names[i].clone()).collect())
        .collect();
    let report = ConsistencyReport { pairs, groups };
    info!(pairs = report.pairs.len(), groups = report.groups.len(), "consistency check finished");

    if solver.json {
        print_json(&report)?;
    } else {
        print!("{}", report);
    }
    Ok(report.status())
}

/// Report the redundant invariants of each solution file
pub fn check_minimality(
    files: &[PathBuf],
    solver: &SolverArgs,
    independent: bool,
    workers: Option<usize>,
) -> Result<Status> {
    let backend = solver.backend();
    let mut config = MinimalityConfig::default();
    if independent {
        config = config.with_mode(RedundancyMode::Independent);
    }
    if let Some(workers) = workers {
        config = config.with_max_threads(workers);
    }
    let checker = MinimalityChecker::with_config(&backend, config);

    let mut reports = Vec::with_capacity(files.len());
    for path in files {
        let invariants = load_solution(path)?;
        let index = VariableIndex::from_invariants(&invariants);
        let redundancy = checker
            .find_redundant(&invariants, &index)
            .with_context(|| format!("failed to check {}", path.display()))?;
        reports.push(MinimalityReport::new(display_name(path), &invariants, &redundancy));
    }

    if solver.json {
        print_json(&reports)?;
    } else {
        for report in &reports {
            println!("{}", report);
        }
    }
    Ok(Status::Clean)
}

/// Compare the place flows, then the transition flows, of two tool logs.
///
/// Only Tina and PetriSpot logs carry both flow kinds; other tools are
/// rejected before either file is read.
pub fn compare_logs(
    log_a: &Path,
    log_b: &Path,
    tool: Option<ToolKind>,
    solver: &SolverArgs,
) -> Result<Status> {
    let tool_a = match tool {
        Some(tool) => tool,
        None => ToolKind::from_path(log_a)?,
    };
    let tool_b = match tool {
        Some(tool) => tool,
        None => ToolKind::from_path(log_b)?,
    };
    for (path, tool) in [(log_a, tool_a), (log_b, tool_b)] {
        if !tool.lists_both_flows() {
            return Err(ParseError::unsupported(format!(
                "{} output {} holds a single set of flows; compare it with `pinv check`",
                tool,
                path.display()
            ))
            .into());
        }
    }
    let (parser_a, parser_b) = (tool_a.parser(), tool_b.parser());

    let backend = solver.backend();
    let options = solver.compare_options();
    let mut reports = Vec::with_capacity(2);
    for flow in [FlowKind::Place, FlowKind::Transition] {
        let set_a = parser_a
            .parse_file(log_a, flow)
            .with_context(|| format!("failed to parse {}", log_a.display()))?;
        let set_b = parser_b
            .parse_file(log_b, flow)
            .with_context(|| format!("failed to parse {}", log_b.display()))?;
        let cmp = compare(&backend, &set_a, &set_b, &options)
            .with_context(|| format!("failed to compare {} flows", flow))?;
        reports.push(FlowReport {
            flow,
            pair: PairReport::new(display_name(log_a), display_name(log_b), &cmp)?,
        });
    }

    if solver.json {
        print_json(&reports)?;
    } else {
        for report in &reports {
            println!("{}", report);
        }
    }
    Ok(reports
        .iter()
        .fold(Status::Clean, |acc, r| acc.and(r.pair.status())))
}

fn sol_path(log: &Path) -> PathBuf {
    let mut name = log.as_os_str().to_owned();
    name.push(".sol");
    PathBuf::from(name)
}

/// Write the invariants of a tool log to `<log>.sol`.
///
/// Tina and PetriSpot logs are rewritten without their invariant lines once
/// the `.sol` file is written. GreatSPN invariant files are left untouched.
pub fn collect(tool: ToolKind, log: &Path, mode: FlowKind, net: Option<&Path>) -> Result<Status> {
    if net.is_some() && tool != ToolKind::GreatSpn {
        bail!("--net only applies to greatspn");
    }
    let sol = sol_path(log);

    let invariants = match tool {
        ToolKind::Tina | ToolKind::PetriSpot => {
            let raw = fs::read_to_string(log)
                .with_context(|| format!("failed to read {}", log.display()))?;
            let (residual, invariants) = split_log_and_invariants(&raw, tool, mode)?;
            fs::write(&sol, SolutionFile::render(&invariants))
                .with_context(|| format!("failed to write {}", sol.display()))?;

            let mut tmp = log.as_os_str().to_owned();
            tmp.push(".tmp");
            let tmp = PathBuf::from(tmp);
            fs::write(&tmp, residual)
                .with_context(|| format!("failed to write {}", tmp.display()))?;
            fs::rename(&tmp, log)
                .with_context(|| format!("failed to replace {}", log.display()))?;
            invariants
        }
        ToolKind::GreatSpn => {
            let parser = match net {
                Some(net) => {
                    let source = fs::read_to_string(net)
                        .with_context(|| format!("failed to read {}", net.display()))?;
                    GreatSpn::with_net(
                        NetNames::parse(&source)
                            .with_context(|| format!("failed to parse {}", net.display()))?,
                    )
                }
                None => GreatSpn::default(),
            };
            let invariants = parser
                .parse_file(log, mode)
                .with_context(|| format!("failed to parse {}", log.display()))?;
            fs::write(&sol, SolutionFile::render(&invariants))
                .with_context(|| format!("failed to write {}", sol.display()))?;
            invariants
        }
        ToolKind::SolutionFile => bail!("nothing to collect from a solution file"),
    };

    println!("Wrote {} invariants to {}", invariants.len(), sol.display());
    Ok(Status::Clean)
}
