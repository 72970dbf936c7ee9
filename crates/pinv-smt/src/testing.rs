//! Scripted solver double for unit tests
//!
//! Formulas are kept as plain syntax trees, every assertion and every check
//! is recorded, and `check` answers from a pre-loaded script so that paths
//! a real solver rarely takes (unknown answers, ambiguous witnesses) can be
//! exercised deterministically.

use std::collections::VecDeque;
use std::sync::Mutex;

use crate::error::CheckResult;
use crate::solver::{LiaBackend, LiaSession, SatOutcome, SessionTask};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Formula {
    True,
    Eq(Vec<(usize, i64)>, i64),
    AtLeast(usize, i64),
    And(Vec<Formula>),
    Not(Box<Formula>),
    Xor(Box<Formula>, Box<Formula>),
    Guard(String),
    Iff(Box<Formula>, Box<Formula>),
}

#[derive(Debug, Default)]
struct Log {
    sessions: usize,
    asserted: Vec<Formula>,
    checks: Vec<Vec<Formula>>,
}

/// Backend answering checks from a script; `Unsat` once the script runs out
#[derive(Debug, Default)]
pub struct ScriptedBackend {
    script: Mutex<VecDeque<SatOutcome>>,
    log: Mutex<Log>,
}

impl ScriptedBackend {
    pub fn new(script: Vec<SatOutcome>) -> Self {
        Self {
            script: Mutex::new(script.into()),
            log: Mutex::new(Log::default()),
        }
    }

    /// Every formula asserted, across all sessions, in order
    pub fn asserted(&self) -> Vec<Formula> {
        self.log.lock().unwrap().asserted.clone()
    }

    /// Assumption lists of every check, across all sessions, in order
    pub fn checks(&self) -> Vec<Vec<Formula>> {
        self.log.lock().unwrap().checks.clone()
    }

    pub fn sessions(&self) -> usize {
        self.log.lock().unwrap().sessions
    }
}

impl LiaBackend for ScriptedBackend {
    fn solve<T: SessionTask>(&self, num_vars: usize, task: T) -> CheckResult<T::Output> {
        self.log.lock().unwrap().sessions += 1;
        let mut session = ScriptedSession {
            backend: self,
            num_vars,
        };
        task.run(&mut session)
    }
}

pub struct ScriptedSession<'a> {
    backend: &'a ScriptedBackend,
    num_vars: usize,
}

impl LiaSession for ScriptedSession<'_> {
    type Formula = Formula;

    fn num_vars(&self) -> usize {
        self.num_vars
    }

    fn linear_eq(&self, terms: &[(usize, i64)], rhs: i64) -> CheckResult<Formula> {
        Ok(Formula::Eq(terms.to_vec(), rhs))
    }

    fn at_least(&self, var: usize, bound: i64) -> CheckResult<Formula> {
        Ok(Formula::AtLeast(var, bound))
    }

    fn truth(&self) -> Formula {
        Formula::True
    }

    fn and(&self, parts: &[Formula]) -> Formula {
        if parts.is_empty() {
            Formula::True
        } else {
            Formula::And(parts.to_vec())
        }
    }

    fn not(&self, formula: &Formula) -> Formula {
        Formula::Not(Box::new(formula.clone()))
    }

    fn xor(&self, a: &Formula, b: &Formula) -> Formula {
        Formula::Xor(Box::new(a.clone()), Box::new(b.clone()))
    }

    fn guard(&mut self, name: &str, formula: &Formula) -> Formula {
        let literal = Formula::Guard(name.to_string());
        self.assert(&Formula::Iff(
            Box::new(literal.clone()),
            Box::new(formula.clone()),
        ));
        literal
    }

    fn assert(&mut self, formula: &Formula) {
        self.backend.log.lock().unwrap().asserted.push(formula.clone());
    }

    fn check(&mut self, assumptions: &[Formula]) -> CheckResult<SatOutcome> {
        self.backend
            .log
            .lock()
            .unwrap()
            .checks
            .push(assumptions.to_vec());
        Ok(self
            .backend
            .script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(SatOutcome::Unsat))
    }
}
