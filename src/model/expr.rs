// Linear expressions over model variables

use std::iter::Sum;
use std::ops::{Add, AddAssign, Mul, Neg, Sub};

use indexmap::IndexMap;

use crate::domain::value_objects::ConstraintType;

/// Handle to one declared variable entry (one column of the lowered program),
/// stamped with the id of the model that issued it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct VarRef {
    model: u64,
    column: usize,
}

impl VarRef {
    pub(crate) const fn new(model: u64, column: usize) -> Self {
        Self { model, column }
    }

    pub fn column(self) -> usize {
        self.column
    }

    pub(crate) fn model(self) -> u64 {
        self.model
    }
}

/// `Σ coeff·var + constant`
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LinearExpr {
    terms: Vec<(VarRef, f64)>,
    constant: f64,
}

impl LinearExpr {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn constant(value: f64) -> Self {
        Self {
            terms: Vec::new(),
            constant: value,
        }
    }

    pub fn term(var: VarRef, coefficient: f64) -> Self {
        Self {
            terms: vec![(var, coefficient)],
            constant: 0.0,
        }
    }

    pub fn add_term(&mut self, var: VarRef, coefficient: f64) {
        self.terms.push((var, coefficient));
    }

    pub fn terms(&self) -> &[(VarRef, f64)] {
        &self.terms
    }

    pub fn constant_value(&self) -> f64 {
        self.constant
    }

    /// Terms merged per column with zero coefficients dropped, in first-seen order
    pub fn collapsed(&self) -> Vec<(usize, f64)> {
        let mut merged: IndexMap<usize, f64> = IndexMap::new();
        for &(var, coeff) in &self.terms {
            *merged.entry(var.column()).or_insert(0.0) += coeff;
        }
        merged.into_iter().filter(|&(_, c)| c != 0.0).collect()
    }

    pub fn leq(self, rhs: impl Into<LinearExpr>) -> LinearConstraint {
        LinearConstraint::normalize(self - rhs.into(), ConstraintType::LessThanOrEqual)
    }

    pub fn geq(self, rhs: impl Into<LinearExpr>) -> LinearConstraint {
        LinearConstraint::normalize(self - rhs.into(), ConstraintType::GreaterThanOrEqual)
    }

    pub fn equals(self, rhs: impl Into<LinearExpr>) -> LinearConstraint {
        LinearConstraint::normalize(self - rhs.into(), ConstraintType::Equal)
    }
}

impl From<VarRef> for LinearExpr {
    fn from(var: VarRef) -> Self {
        LinearExpr::term(var, 1.0)
    }
}

impl From<f64> for LinearExpr {
    fn from(value: f64) -> Self {
        LinearExpr::constant(value)
    }
}

impl<T: Into<LinearExpr>> AddAssign<T> for LinearExpr {
    fn add_assign(&mut self, rhs: T) {
        let rhs = rhs.into();
        self.terms.extend(rhs.terms);
        self.constant += rhs.constant;
    }
}

impl<T: Into<LinearExpr>> Add<T> for LinearExpr {
    type Output = LinearExpr;

    fn add(mut self, rhs: T) -> LinearExpr {
        self += rhs;
        self
    }
}

impl<T: Into<LinearExpr>> Sub<T> for LinearExpr {
    type Output = LinearExpr;

    fn sub(self, rhs: T) -> LinearExpr {
        let rhs: LinearExpr = rhs.into();
        self + (-rhs)
    }
}

impl Neg for LinearExpr {
    type Output = LinearExpr;

    fn neg(self) -> LinearExpr {
        self * -1.0
    }
}

impl Mul<f64> for LinearExpr {
    type Output = LinearExpr;

    fn mul(mut self, rhs: f64) -> LinearExpr {
        for (_, coeff) in &mut self.terms {
            *coeff *= rhs;
        }
        self.constant *= rhs;
        self
    }
}

impl Mul<LinearExpr> for f64 {
    type Output = LinearExpr;

    fn mul(self, rhs: LinearExpr) -> LinearExpr {
        rhs * self
    }
}

impl<T: Into<LinearExpr>> Add<T> for VarRef {
    type Output = LinearExpr;

    fn add(self, rhs: T) -> LinearExpr {
        LinearExpr::from(self) + rhs
    }
}

impl<T: Into<LinearExpr>> Sub<T> for VarRef {
    type Output = LinearExpr;

    fn sub(self, rhs: T) -> LinearExpr {
        LinearExpr::from(self) - rhs
    }
}

impl Mul<f64> for VarRef {
    type Output = LinearExpr;

    fn mul(self, rhs: f64) -> LinearExpr {
        LinearExpr::term(self, rhs)
    }
}

impl Mul<VarRef> for f64 {
    type Output = LinearExpr;

    fn mul(self, rhs: VarRef) -> LinearExpr {
        LinearExpr::term(rhs, self)
    }
}

impl Sum<LinearExpr> for LinearExpr {
    fn sum<I: Iterator<Item = LinearExpr>>(iter: I) -> Self {
        iter.fold(LinearExpr::new(), |acc, e| acc + e)
    }
}

impl Sum<VarRef> for LinearExpr {
    fn sum<I: Iterator<Item = VarRef>>(iter: I) -> Self {
        iter.fold(LinearExpr::new(), |acc, v| acc + v)
    }
}

/// `expr REL rhs` with every variable on the left and the constant on the right
#[derive(Debug, Clone, PartialEq)]
pub struct LinearConstraint {
    expr: LinearExpr,
    relation: ConstraintType,
    rhs: f64,
}

impl LinearConstraint {
    fn normalize(mut difference: LinearExpr, relation: ConstraintType) -> Self {
        let rhs = -difference.constant;
        difference.constant = 0.0;
        Self {
            expr: difference,
            relation,
            rhs,
        }
    }

    pub fn expr(&self) -> &LinearExpr {
        &self.expr
    }

    pub fn relation(&self) -> ConstraintType {
        self.relation
    }

    pub fn rhs(&self) -> f64 {
        self.rhs
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const X: VarRef = VarRef::new(0, 0);
    const Y: VarRef = VarRef::new(0, 1);

    #[test]
    fn operators_build_expected_terms() {
        let expr = 3.0 * X + Y * 2.0 - 4.0;
        assert_eq!(expr.terms(), &[(X, 3.0), (Y, 2.0)]);
        assert_eq!(expr.constant_value(), -4.0);
    }

    #[test]
    fn collapsed_merges_columns_and_drops_zeros() {
        let expr = X + Y + 2.0 * X - Y;
        assert_eq!(expr.collapsed(), vec![(0, 3.0)]);
    }

    #[test]
    fn comparisons_move_everything_but_constants_left() {
        // x <= 5y + 2  ->  x - 5y <= 2
        let c = LinearExpr::from(X).leq(5.0 * Y + 2.0);
        assert_eq!(c.relation(), ConstraintType::LessThanOrEqual);
        assert_eq!(c.rhs(), 2.0);
        assert_eq!(c.expr().collapsed(), vec![(0, 1.0), (1, -5.0)]);

        let total: LinearExpr = [X, Y].into_iter().sum();
        let demand = total.equals(80.0);
        assert_eq!(demand.relation(), ConstraintType::Equal);
        assert_eq!(demand.rhs(), 80.0);
    }
}
