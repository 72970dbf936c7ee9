//! Solver backend contract and its Z3 implementation
//!
//! The checks in this crate need very little from a solver: a fixed vector
//! of integer variables, linear equalities and lower bounds over them,
//! boolean AND / NOT / XOR, named guards asserted equivalent to a formula,
//! and satisfiability checks under a list of assumed literals. [`LiaSession`]
//! is that contract. Any exact linear-integer-arithmetic solver can implement
//! it; [`Z3Session`] does so on top of the `z3` crate.
//!
//! Sessions borrow solver-owned state, so they are handed out through
//! [`LiaBackend::solve`], which builds a fresh session, runs a
//! [`SessionTask`] against it and drops it. Nothing is shared between two
//! `solve` calls.

use std::time::Duration;

use pinv_core::Error as CoreError;
use tracing::trace;
use z3::ast::{Ast, Bool, Int};
use z3::{Config, Context, Model, Params, SatResult, Solver};

use crate::error::{CheckError, CheckResult};

/// Answer of one satisfiability check
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SatOutcome {
    /// Satisfiable, with one value per declared integer variable
    Sat(Vec<i64>),
    /// Unsatisfiable
    Unsat,
    /// The solver could not decide (timeout, resource limit, incompleteness)
    Unknown(String),
}

/// One solver session over a fixed vector of integer variables `v0..vn`.
pub trait LiaSession {
    /// Boolean formula handle
    type Formula: Clone;

    /// Number of integer variables declared by the session
    fn num_vars(&self) -> usize;

    /// `sum(coeff * v[var]) = rhs`
    fn linear_eq(&self, terms: &[(usize, i64)], rhs: i64) -> CheckResult<Self::Formula>;

    /// `v[var] >= bound`
    fn at_least(&self, var: usize, bound: i64) -> CheckResult<Self::Formula>;

    /// The constant `true`
    fn truth(&self) -> Self::Formula;

    /// Conjunction; `truth()` for an empty slice
    fn and(&self, parts: &[Self::Formula]) -> Self::Formula;

    fn not(&self, formula: &Self::Formula) -> Self::Formula;

    fn xor(&self, a: &Self::Formula, b: &Self::Formula) -> Self::Formula;

    /// Declare a fresh boolean literal, assert it equivalent to `formula`
    /// and return the literal.
    fn guard(&mut self, name: &str, formula: &Self::Formula) -> Self::Formula;

    /// Add a permanent assertion
    fn assert(&mut self, formula: &Self::Formula);

    /// Check satisfiability of the assertions under `assumptions`
    fn check(&mut self, assumptions: &[Self::Formula]) -> CheckResult<SatOutcome>;
}

/// Work to run against a freshly created session
pub trait SessionTask {
    type Output;

    fn run<S: LiaSession>(self, session: &mut S) -> CheckResult<Self::Output>;
}

/// Factory of solver sessions
pub trait LiaBackend: Sync {
    /// Build a session with `num_vars` integer variables and run `task` on it
    fn solve<T: SessionTask>(&self, num_vars: usize, task: T) -> CheckResult<T::Output>;
}

/// Solver settings shared by every session a backend creates
#[derive(Debug, Clone, Default)]
pub struct SolverConfig {
    /// Per-query timeout; `None` lets the solver run to completion
    pub timeout: Option<Duration>,
}

impl SolverConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the timeout for solver queries
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

/// Z3-backed session factory
#[derive(Debug, Clone, Default)]
pub struct Z3Backend {
    config: SolverConfig,
}

impl Z3Backend {
    pub fn new(config: SolverConfig) -> Self {
        Self { config }
    }
}

impl LiaBackend for Z3Backend {
    fn solve<T: SessionTask>(&self, num_vars: usize, task: T) -> CheckResult<T::Output> {
        let cfg = Config::new();
        let ctx = Context::new(&cfg);
        let solver = Solver::new(&ctx);

        if let Some(timeout) = self.config.timeout {
            let ms = u32::try_from(timeout.as_millis()).unwrap_or(u32::MAX);
            let mut params = Params::new(&ctx);
            params.set_u32("timeout", ms);
            solver.set_params(&params);
        }

        let vars = (0..num_vars)
            .map(|i| Int::new_const(&ctx, format!("v{}", i)))
            .collect();
        let mut session = Z3Session {
            ctx: &ctx,
            solver,
            vars,
            guards: 0,
        };
        task.run(&mut session)
    }
}

/// [`LiaSession`] over one Z3 context and solver
pub struct Z3Session<'ctx> {
    ctx: &'ctx Context,
    solver: Solver<'ctx>,
    vars: Vec<Int<'ctx>>,
    guards: usize,
}

impl<'ctx> Z3Session<'ctx> {
    fn var(&self, var: usize) -> CheckResult<&Int<'ctx>> {
        self.vars.get(var).ok_or_else(|| {
            CheckError::Core(CoreError::IndexOutOfRange {
                index: var,
                size: self.vars.len(),
            })
        })
    }

    fn extract_model(&self, model: &Model<'ctx>) -> CheckResult<Vec<i64>> {
        self.vars
            .iter()
            .map(|var| {
                model
                    .eval(var, true)
                    .and_then(|value| value.as_i64())
                    .ok_or_else(|| {
                        CheckError::ModelError(format!("no 64-bit integer value for {}", var))
                    })
            })
            .collect()
    }
}

impl<'ctx> LiaSession for Z3Session<'ctx> {
    type Formula = Bool<'ctx>;

    fn num_vars(&self) -> usize {
        self.vars.len()
    }

    fn linear_eq(&self, terms: &[(usize, i64)], rhs: i64) -> CheckResult<Bool<'ctx>> {
        let mut products = Vec::with_capacity(terms.len());
        for &(var, coeff) in terms {
            let coeff = Int::from_i64(self.ctx, coeff);
            products.push(Int::mul(self.ctx, &[&coeff, self.var(var)?]));
        }
        let lhs = if products.is_empty() {
            Int::from_i64(self.ctx, 0)
        } else {
            Int::add(self.ctx, &products.iter().collect::<Vec<_>>())
        };
        Ok(lhs._eq(&Int::from_i64(self.ctx, rhs)))
    }

    fn at_least(&self, var: usize, bound: i64) -> CheckResult<Bool<'ctx>> {
        Ok(self.var(var)?.ge(&Int::from_i64(self.ctx, bound)))
    }

    fn truth(&self) -> Bool<'ctx> {
        Bool::from_bool(self.ctx, true)
    }

    fn and(&self, parts: &[Bool<'ctx>]) -> Bool<'ctx> {
        if parts.is_empty() {
            return self.truth();
        }
        Bool::and(self.ctx, &parts.iter().collect::<Vec<_>>())
    }

    fn not(&self, formula: &Bool<'ctx>) -> Bool<'ctx> {
        formula.not()
    }

    fn xor(&self, a: &Bool<'ctx>, b: &Bool<'ctx>) -> Bool<'ctx> {
        a.xor(b)
    }

    fn guard(&mut self, name: &str, formula: &Bool<'ctx>) -> Bool<'ctx> {
        // The counter keeps literals distinct even if callers reuse names
        let literal = Bool::new_const(self.ctx, format!("g{}_{}", self.guards, name));
        self.guards += 1;
        self.solver.assert(&literal.iff(formula));
        literal
    }

    fn assert(&mut self, formula: &Bool<'ctx>) {
        self.solver.assert(formula);
    }

    fn check(&mut self, assumptions: &[Bool<'ctx>]) -> CheckResult<SatOutcome> {
        let result = if assumptions.is_empty() {
            self.solver.check()
        } else {
            self.solver.check_assumptions(assumptions)
        };
        trace!(assumptions = assumptions.len(), ?result, "z3 check");

        match result {
            SatResult::Sat => {
                let model = self
                    .solver
                    .get_model()
                    .ok_or_else(|| CheckError::ModelError("no model available".to_string()))?;
                Ok(SatOutcome::Sat(self.extract_model(&model)?))
            }
            SatResult::Unsat => Ok(SatOutcome::Unsat),
            SatResult::Unknown => {
                let reason = self
                    .solver
                    .get_reason_unknown()
                    .unwrap_or_else(|| "unknown".to_string());
                Ok(SatOutcome::Unknown(reason))
            }
        }
    }
}
