//! Invariant to solver formula encoder
//!
//! Each invariant becomes the linear equality
//! `sum(coeff[v] * x[index_of(v)]) = const` over the session's integer
//! vector. Nonnegativity of the vector is a separate [`domain`] formula so
//! it can be asserted once and shared by both sides of a comparison.
//!
//! [`domain`]: ConstraintEncoder::domain

use pinv_core::{Error as CoreError, Invariant, VariableIndex};

use crate::error::CheckResult;
use crate::solver::LiaSession;

/// Encoder of invariants against one [`VariableIndex`]
#[derive(Debug, Clone, Copy)]
pub struct ConstraintEncoder<'a> {
    index: &'a VariableIndex,
}

impl<'a> ConstraintEncoder<'a> {
    pub fn new(index: &'a VariableIndex) -> Self {
        Self { index }
    }

    /// Sparse `(position, coefficient)` terms and constant of `inv`.
    ///
    /// Fails with `UnknownConstant` if the right-hand side is unknown and
    /// with `UnknownVariable` if `inv` uses a name outside the index.
    pub fn linear_terms(&self, inv: &Invariant) -> CheckResult<(Vec<(usize, i64)>, i64)> {
        let constant = inv
            .constant()
            .known()
            .ok_or_else(|| CoreError::UnknownConstant(inv.to_string()))?;
        let mut terms = Vec::with_capacity(inv.len());
        for (name, coeff) in inv.coefficients() {
            terms.push((self.index.index_of(name)?, coeff));
        }
        Ok((terms, constant))
    }

    /// Equality formula of a single invariant
    pub fn equation<S: LiaSession>(&self, session: &S, inv: &Invariant) -> CheckResult<S::Formula> {
        let (terms, constant) = self.linear_terms(inv)?;
        session.linear_eq(&terms, constant)
    }

    /// Conjunction of the equations of `invariants`; `true` when empty
    pub fn encode<S: LiaSession>(
        &self,
        session: &S,
        invariants: &[Invariant],
    ) -> CheckResult<S::Formula> {
        let parts = invariants
            .iter()
            .map(|inv| self.equation(session, inv))
            .collect::<CheckResult<Vec<_>>>()?;
        Ok(session.and(&parts))
    }

    /// `x[i] >= 0` for every variable of the session
    pub fn domain<S: LiaSession>(&self, session: &S) -> CheckResult<S::Formula> {
        let bounds = (0..session.num_vars())
            .map(|i| session.at_least(i, 0))
            .collect::<CheckResult<Vec<_>>>()?;
        Ok(session.and(&bounds))
    }
}
