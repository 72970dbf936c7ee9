//! Canonical sparse linear invariants
//!
//! An [`Invariant`] is the equation `sum(coeff[v] * v) = const` over variable
//! names. Zero coefficients are filtered at construction so that two
//! invariants compare equal exactly when they denote the same equation,
//! regardless of the order terms were supplied in.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::var_index::VariableIndex;

/// Right-hand side of an invariant.
///
/// Some tools do not report the constant of place flows; that case is a
/// distinct `Unknown` tag and is never coerced to an integer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Constant {
    Known(i64),
    Unknown,
}

impl Constant {
    /// Textual marker of an unknown right-hand side
    pub const UNKNOWN_MARKER: &'static str = "?";

    pub fn is_known(&self) -> bool {
        matches!(self, Constant::Known(_))
    }

    /// The known value, if any
    pub fn known(&self) -> Option<i64> {
        match self {
            Constant::Known(value) => Some(*value),
            Constant::Unknown => None,
        }
    }
}

impl fmt::Display for Constant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Constant::Known(value) => write!(f, "{}", value),
            Constant::Unknown => f.write_str(Self::UNKNOWN_MARKER),
        }
    }
}

impl From<i64> for Constant {
    fn from(value: i64) -> Self {
        Constant::Known(value)
    }
}

impl From<i32> for Constant {
    fn from(value: i32) -> Self {
        Constant::Known(i64::from(value))
    }
}

/// Dense projection of an invariant against a [`VariableIndex`]:
/// one coefficient per indexed variable, followed by the constant.
///
/// Two invariants with equal signatures under the same index are the same
/// equation. Signatures from different indexes are not comparable.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Signature {
    pub coefficients: Vec<i64>,
    pub constant: Constant,
}

/// Integer valuation of variables, ordered by name.
///
/// Missing variables read as 0.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Assignment {
    values: BTreeMap<String, i64>,
}

impl Assignment {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, value: i64) {
        self.values.insert(name.into(), value);
    }

    /// Value of `name`, 0 if unassigned
    pub fn get(&self, name: &str) -> i64 {
        self.values.get(name).copied().unwrap_or(0)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, i64)> {
        self.values.iter().map(|(name, value)| (name.as_str(), *value))
    }

    /// The non-zero entries only
    pub fn sparse(&self) -> Assignment {
        Assignment {
            values: self
                .values
                .iter()
                .filter(|(_, value)| **value != 0)
                .map(|(name, value)| (name.clone(), *value))
                .collect(),
        }
    }
}

impl<K: Into<String>> FromIterator<(K, i64)> for Assignment {
    fn from_iter<T: IntoIterator<Item = (K, i64)>>(iter: T) -> Self {
        Assignment {
            values: iter.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }
}

impl fmt::Display for Assignment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("{")?;
        for (i, (name, value)) in self.values.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{}: {}", name, value)?;
        }
        f.write_str("}")
    }
}

/// A linear equation `sum(coeff[v] * v) = const`.
///
/// Immutable after construction. The coefficient map is ordered by name, so
/// the derived equality and hash are both computed over the sorted items.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Invariant {
    coefficients: BTreeMap<String, i64>,
    constant: Constant,
}

impl Invariant {
    /// Build an invariant from `(name, coefficient)` pairs.
    ///
    /// Repeated names are summed, then zero coefficients are dropped.
    ///
    /// # Panics
    ///
    /// Panics if the summed coefficient of a repeated name overflows `i64`.
    /// Use [`Invariant::try_new`] for terms read from input.
    pub fn new<K, I>(terms: I, constant: impl Into<Constant>) -> Self
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, i64)>,
    {
        match Self::try_new(terms, constant) {
            Ok(inv) => inv,
            Err(e) => panic!("{}", e),
        }
    }

    /// Fallible [`Invariant::new`]: an overflowing coefficient sum is an
    /// `InvalidEquation` naming the variable.
    pub fn try_new<K, I>(terms: I, constant: impl Into<Constant>) -> Result<Self>
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, i64)>,
    {
        let mut coefficients: BTreeMap<String, i64> = BTreeMap::new();
        for (name, coeff) in terms {
            let name = name.into();
            let sum = coefficients
                .get(&name)
                .copied()
                .unwrap_or(0)
                .checked_add(coeff)
                .ok_or_else(|| {
                    Error::invalid_equation(
                        name.as_str(),
                        format!("coefficient of '{}' overflows i64", name),
                    )
                })?;
            coefficients.insert(name, sum);
        }
        coefficients.retain(|_, coeff| *coeff != 0);
        Ok(Self {
            coefficients,
            constant: constant.into(),
        })
    }

    pub fn constant(&self) -> Constant {
        self.constant
    }

    /// Non-zero coefficients ordered by variable name
    pub fn coefficients(&self) -> impl Iterator<Item = (&str, i64)> {
        self.coefficients
            .iter()
            .map(|(name, coeff)| (name.as_str(), *coeff))
    }

    /// Coefficient of `name`, 0 if the variable does not occur
    pub fn coefficient(&self, name: &str) -> i64 {
        self.coefficients.get(name).copied().unwrap_or(0)
    }

    /// Number of non-zero terms
    pub fn len(&self) -> usize {
        self.coefficients.len()
    }

    pub fn is_empty(&self) -> bool {
        self.coefficients.is_empty()
    }

    /// Names with a non-zero coefficient
    pub fn used_variables(&self) -> BTreeSet<&str> {
        self.coefficients.keys().map(String::as_str).collect()
    }

    /// Dense signature of this invariant under `index`.
    ///
    /// Fails with `UnknownVariable` if the invariant uses a name the index
    /// does not cover.
    pub fn coefficient_vector(&self, index: &VariableIndex) -> Result<Signature> {
        let mut coefficients = vec![0; index.size()];
        for (name, coeff) in &self.coefficients {
            coefficients[index.index_of(name)?] = *coeff;
        }
        Ok(Signature {
            coefficients,
            constant: self.constant,
        })
    }

    /// `sum(coeff[v] * assignment[v]) - const`; zero iff the equation holds.
    pub fn evaluate(&self, assignment: &Assignment) -> Result<i128> {
        let constant = self
            .constant
            .known()
            .ok_or_else(|| Error::UnknownConstant(self.to_string()))?;
        Ok(self.lhs_value(assignment) - i128::from(constant))
    }

    /// Value of the left-hand side under `assignment`
    pub fn lhs_value(&self, assignment: &Assignment) -> i128 {
        self.coefficients
            .iter()
            .map(|(name, coeff)| i128::from(*coeff) * i128::from(assignment.get(name)))
            .sum()
    }
}

/// Indices of the invariants that `assignment` violates
pub fn violations(invariants: &[Invariant], assignment: &Assignment) -> Result<Vec<usize>> {
    let mut violated = Vec::new();
    for (i, inv) in invariants.iter().enumerate() {
        if inv.evaluate(assignment)? != 0 {
            violated.push(i);
        }
    }
    Ok(violated)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_coefficients_filtered() {
        let inv = Invariant::new([("a", 0), ("b", 3), ("c", 0)], 4);
        assert_eq!(inv.len(), 1);
        assert_eq!(inv.used_variables(), BTreeSet::from(["b"]));
        assert_eq!(inv.coefficient("a"), 0);
    }

    #[test]
    fn test_repeated_terms_are_summed() {
        let inv = Invariant::new([("p", 1), ("q", 2), ("p", 1), ("q", -2)], 2);
        assert_eq!(inv, Invariant::new([("p", 2)], 2));
    }

    #[test]
    fn test_overflowing_sum_is_rejected() {
        let err = Invariant::try_new([("x", i64::MAX), ("y", 1), ("x", 1)], 0).unwrap_err();
        assert!(matches!(err, Error::InvalidEquation { ref text, .. } if text == "x"));

        // Cancelling extremes stay in range
        let inv = Invariant::try_new([("x", i64::MIN), ("x", i64::MAX)], 0).unwrap();
        assert_eq!(inv.coefficient("x"), -1);
    }

    #[test]
    fn test_equality_ignores_order() {
        let a = Invariant::new([("x", 1), ("y", -1)], 1);
        let b = Invariant::new([("y", -1), ("z", 0), ("x", 1)], 1);
        assert_eq!(a, b);

        let c = Invariant::new([("x", 1), ("y", -1)], 2);
        assert_ne!(a, c);
        let d = Invariant::new([("x", 1), ("y", -1)], Constant::Unknown);
        assert_ne!(a, d);
        assert_eq!(d, Invariant::new([("y", -1), ("x", 1)], Constant::Unknown));
    }

    #[test]
    fn test_coefficient_vector() {
        let index = VariableIndex::from_names(["a", "b", "c"]);
        let inv = Invariant::new([("c", 2), ("a", -1)], 5);

        let sig = inv.coefficient_vector(&index).unwrap();
        assert_eq!(sig.coefficients, vec![-1, 0, 2]);
        assert_eq!(sig.constant, Constant::Known(5));
    }

    #[test]
    fn test_coefficient_vector_unknown_variable() {
        let index = VariableIndex::from_names(["a"]);
        let inv = Invariant::new([("b", 1)], 0);
        assert_eq!(
            inv.coefficient_vector(&index),
            Err(Error::UnknownVariable("b".to_string()))
        );
    }

    #[test]
    fn test_evaluate() {
        let inv = Invariant::new([("x", 1), ("y", 2)], 3);
        let assignment: Assignment = [("x", 1), ("y", 1)].into_iter().collect();
        assert_eq!(inv.evaluate(&assignment), Ok(0));

        // Missing variables read as 0
        let partial: Assignment = [("x", 5)].into_iter().collect();
        assert_eq!(inv.evaluate(&partial), Ok(2));
    }

    #[test]
    fn test_evaluate_rejects_unknown_constant() {
        let inv = Invariant::new([("x", 1)], Constant::Unknown);
        assert!(matches!(
            inv.evaluate(&Assignment::new()),
            Err(Error::UnknownConstant(_))
        ));
    }

    #[test]
    fn test_violations() {
        let invs = vec![
            Invariant::new([("x", 1)], 1),
            Invariant::new([("y", 1)], 1),
            Invariant::new([("x", 1), ("y", 1)], 2),
        ];
        let assignment: Assignment = [("x", 1), ("y", 0)].into_iter().collect();
        assert_eq!(violations(&invs, &assignment), Ok(vec![1, 2]));
    }

    #[test]
    fn test_sparse_assignment() {
        let assignment: Assignment = [("a", 0), ("b", 2), ("c", 0)].into_iter().collect();
        let sparse = assignment.sparse();
        assert_eq!(sparse.len(), 1);
        assert_eq!(sparse.get("b"), 2);
        assert_eq!(sparse.to_string(), "{b: 2}");
    }
}
