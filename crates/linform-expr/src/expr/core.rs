//! Core expression type: terms by degree + tagged nonlinear terms + constant.
//!
//! Stores terms in separate Vecs per degree:
//! - linear:    (VariableId, f64)
//! - quadratic: (VariableId, VariableId, f64) — bilinear products
//! - cubic:     (VariableId, VariableId, VariableId, f64) — recognized but
//!   carrying no linearization technique (reported as unrecognized)
//!
//! Shapes that are not plain products (absolute value, min/max, piecewise
//! targets) ride in the `nonlinear` vector as [`NonlinearTerm`]s. Indicator
//! terms never appear inside an expression; they attach to constraints.

use crate::expr::constraint::{ComparisonSense, ConstraintExpr};
use crate::expr::error::ExprError;
use crate::expr::nonlinear::NonlinearTerm;
use crate::ids::VariableId;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Default)]
pub struct Expr {
    constant: f64,
    linear: Vec<(VariableId, f64)>,
    quadratic: Vec<(VariableId, VariableId, f64)>,
    cubic: Vec<(VariableId, VariableId, VariableId, f64)>,
    nonlinear: Vec<NonlinearTerm>,
}

impl Expr {
    // ── Constructors ────────────────────────────────────────

    /// Empty expression (all zeros).
    pub fn new_empty() -> Self {
        Self::default()
    }

    /// Expression from linear terms and constant.
    pub fn new(linear: Vec<(VariableId, f64)>, constant: f64) -> Self {
        Self {
            constant,
            linear,
            ..Default::default()
        }
    }

    /// Just a constant, no variable terms.
    pub fn from_constant(constant: f64) -> Self {
        Self {
            constant,
            ..Default::default()
        }
    }

    /// Single linear term: coeff * var.
    pub fn term(var_id: VariableId, coeff: f64) -> Self {
        if coeff == 0.0 {
            return Self::default();
        }
        Self {
            linear: vec![(var_id, coeff)],
            ..Default::default()
        }
    }

    /// Single variable with coefficient 1.0.
    pub fn var(var_id: VariableId) -> Self {
        Self {
            linear: vec![(var_id, 1.0)],
            ..Default::default()
        }
    }

    /// From raw linear terms, no constant.
    pub fn from_linear(linear: Vec<(VariableId, f64)>) -> Self {
        Self {
            linear,
            ..Default::default()
        }
    }

    /// Single bilinear product: coeff * a * b.
    pub fn bilinear(a: VariableId, b: VariableId, coeff: f64) -> Self {
        if coeff == 0.0 {
            return Self::default();
        }
        Self {
            quadratic: vec![(a, b, coeff)],
            ..Default::default()
        }
    }

    /// Single trilinear product: coeff * a * b * c.
    ///
    /// No linearization technique exists for this shape; the scanner reports
    /// it so the caller gets a diagnostic instead of a silent drop.
    pub fn trilinear(a: VariableId, b: VariableId, c: VariableId, coeff: f64) -> Self {
        if coeff == 0.0 {
            return Self::default();
        }
        Self {
            cubic: vec![(a, b, c, coeff)],
            ..Default::default()
        }
    }

    /// Expression holding one tagged nonlinear term.
    ///
    /// Bilinear terms are routed to the quadratic store; indicator terms are
    /// rejected because they are constraint-shaped, not value-shaped.
    pub fn from_nonlinear(term: NonlinearTerm) -> Result<Self, ExprError> {
        match term {
            NonlinearTerm::Bilinear { a, b, coeff } => Ok(Self::bilinear(a, b, coeff)),
            NonlinearTerm::Indicator { .. } => Err(ExprError::IndicatorInExpression),
            NonlinearTerm::MinMax { ref operands, .. } if operands.is_empty() => {
                Err(ExprError::EmptyOperands)
            }
            other => Ok(Self {
                nonlinear: vec![other],
                ..Default::default()
            }),
        }
    }

    // ── Accessors ───────────────────────────────────────────

    pub fn constant(&self) -> f64 {
        self.constant
    }

    pub fn linear_terms(&self) -> &[(VariableId, f64)] {
        &self.linear
    }

    pub fn quadratic_terms(&self) -> &[(VariableId, VariableId, f64)] {
        &self.quadratic
    }

    pub fn cubic_terms(&self) -> &[(VariableId, VariableId, VariableId, f64)] {
        &self.cubic
    }

    pub fn nonlinear_terms(&self) -> &[NonlinearTerm] {
        &self.nonlinear
    }

    /// Consume and return linear terms.
    pub fn into_linear_terms(self) -> Vec<(VariableId, f64)> {
        self.linear
    }

    /// Consume and return (linear_terms, constant).
    pub fn into_parts(self) -> (Vec<(VariableId, f64)>, f64) {
        (self.linear, self.constant)
    }

    /// Max degree of any product term (0 = constant only).
    pub fn degree(&self) -> usize {
        if !self.cubic.is_empty() {
            3
        } else if !self.quadratic.is_empty() {
            2
        } else {
            usize::from(!self.linear.is_empty())
        }
    }

    /// True when the expression has no product or tagged nonlinear terms.
    pub fn is_linear(&self) -> bool {
        self.quadratic.is_empty() && self.cubic.is_empty() && self.nonlinear.is_empty()
    }

    /// Every variable referenced anywhere in the expression, deduplicated.
    pub fn referenced_variables(&self) -> Vec<VariableId> {
        let mut seen: std::collections::BTreeSet<VariableId> = std::collections::BTreeSet::new();
        for (v, _) in &self.linear {
            seen.insert(*v);
        }
        for (a, b, _) in &self.quadratic {
            seen.insert(*a);
            seen.insert(*b);
        }
        for (a, b, c, _) in &self.cubic {
            seen.insert(*a);
            seen.insert(*b);
            seen.insert(*c);
        }
        for term in &self.nonlinear {
            match term {
                NonlinearTerm::Bilinear { a, b, .. } => {
                    seen.insert(*a);
                    seen.insert(*b);
                }
                NonlinearTerm::AbsoluteValue { x, .. } => {
                    seen.insert(*x);
                }
                NonlinearTerm::MinMax { operands, .. } => {
                    seen.extend(operands.iter().copied());
                }
                NonlinearTerm::PiecewiseLinear { x, .. } => {
                    seen.insert(*x);
                }
                NonlinearTerm::Indicator { trigger, body, .. } => {
                    seen.insert(*trigger);
                    seen.extend(body.referenced_variables());
                }
            }
        }
        seen.into_iter().collect()
    }

    // ── Operations ──────────────────────────────────────────

    /// Scale all terms and constant by a factor.
    pub fn scale(&self, by: f64) -> Self {
        Self {
            constant: self.constant * by,
            linear: self
                .linear
                .iter()
                .map(|(v, c)| (*v, *c * by))
                .filter(|(_, c)| *c != 0.0)
                .collect(),
            quadratic: self
                .quadratic
                .iter()
                .map(|(a, b, c)| (*a, *b, *c * by))
                .filter(|(_, _, c)| *c != 0.0)
                .collect(),
            cubic: self
                .cubic
                .iter()
                .map(|(a, b, c, d)| (*a, *b, *c, *d * by))
                .filter(|(_, _, _, d)| *d != 0.0)
                .collect(),
            nonlinear: self
                .nonlinear
                .iter()
                .map(|term| scale_nonlinear(term, by))
                .collect(),
        }
    }

    /// Add another expression (merges all term stores + constants).
    pub fn add(&self, other: &Expr) -> Self {
        let mut linear = Vec::with_capacity(self.linear.len() + other.linear.len());
        linear.extend_from_slice(&self.linear);
        linear.extend_from_slice(&other.linear);

        let mut quadratic = Vec::with_capacity(self.quadratic.len() + other.quadratic.len());
        quadratic.extend_from_slice(&self.quadratic);
        quadratic.extend_from_slice(&other.quadratic);

        let mut cubic = Vec::with_capacity(self.cubic.len() + other.cubic.len());
        cubic.extend_from_slice(&self.cubic);
        cubic.extend_from_slice(&other.cubic);

        let mut nonlinear = Vec::with_capacity(self.nonlinear.len() + other.nonlinear.len());
        nonlinear.extend(self.nonlinear.iter().cloned());
        nonlinear.extend(other.nonlinear.iter().cloned());

        Self {
            constant: self.constant + other.constant,
            linear,
            quadratic,
            cubic,
            nonlinear,
        }
    }

    /// Add a constant offset.
    pub fn add_constant(&self, value: f64) -> Self {
        let mut out = self.clone();
        out.constant += value;
        out
    }

    /// Copy with constant set to zero.
    pub fn without_constant(&self) -> Self {
        let mut out = self.clone();
        out.constant = 0.0;
        out
    }

    /// Merged linear terms with duplicates combined.
    pub fn normalized_terms(&self) -> Vec<(VariableId, f64)> {
        let mut merged: BTreeMap<VariableId, f64> = BTreeMap::new();
        for (var_id, coeff) in &self.linear {
            if *coeff == 0.0 {
                continue;
            }
            *merged.entry(*var_id).or_insert(0.0) += *coeff;
        }
        merged.into_iter().filter(|(_, c)| *c != 0.0).collect()
    }

    // ── Rewriting (used by the linearization engine) ────────

    /// Remove and return the quadratic term at `index`.
    pub fn take_quadratic(&mut self, index: usize) -> Option<(VariableId, VariableId, f64)> {
        (index < self.quadratic.len()).then(|| self.quadratic.remove(index))
    }

    /// Remove and return the tagged nonlinear term at `index`.
    pub fn take_nonlinear(&mut self, index: usize) -> Option<NonlinearTerm> {
        (index < self.nonlinear.len()).then(|| self.nonlinear.remove(index))
    }

    /// Append a linear term in place.
    pub fn push_linear(&mut self, var_id: VariableId, coeff: f64) {
        if coeff != 0.0 {
            self.linear.push((var_id, coeff));
        }
    }

    // ── Comparison methods (produce ConstraintExpr) ─────────

    pub fn compare_scalar(&self, rhs: f64, sense: ComparisonSense) -> ConstraintExpr {
        ConstraintExpr::new(self.without_constant(), sense, rhs - self.constant)
    }

    pub fn compare_expr(&self, other: &Expr, sense: ComparisonSense) -> ConstraintExpr {
        let combined = self.add(&other.scale(-1.0));
        ConstraintExpr::new(combined.without_constant(), sense, -combined.constant)
    }

    pub fn le_scalar(&self, rhs: f64) -> ConstraintExpr {
        self.compare_scalar(rhs, ComparisonSense::LessEqual)
    }

    pub fn ge_scalar(&self, rhs: f64) -> ConstraintExpr {
        self.compare_scalar(rhs, ComparisonSense::GreaterEqual)
    }

    pub fn eq_scalar(&self, rhs: f64) -> ConstraintExpr {
        self.compare_scalar(rhs, ComparisonSense::Equal)
    }

    pub fn le_expr(&self, rhs: &Expr) -> ConstraintExpr {
        self.compare_expr(rhs, ComparisonSense::LessEqual)
    }

    pub fn ge_expr(&self, rhs: &Expr) -> ConstraintExpr {
        self.compare_expr(rhs, ComparisonSense::GreaterEqual)
    }

    pub fn eq_expr(&self, rhs: &Expr) -> ConstraintExpr {
        self.compare_expr(rhs, ComparisonSense::Equal)
    }
}

fn scale_nonlinear(term: &NonlinearTerm, by: f64) -> NonlinearTerm {
    match term.clone() {
        NonlinearTerm::Bilinear { a, b, coeff } => NonlinearTerm::Bilinear {
            a,
            b,
            coeff: coeff * by,
        },
        NonlinearTerm::AbsoluteValue { x, coeff } => NonlinearTerm::AbsoluteValue {
            x,
            coeff: coeff * by,
        },
        NonlinearTerm::MinMax {
            operands,
            kind,
            exact,
            coeff,
        } => NonlinearTerm::MinMax {
            operands,
            kind,
            exact,
            coeff: coeff * by,
        },
        NonlinearTerm::PiecewiseLinear {
            x,
            sample,
            domain,
            method,
            segments,
            coeff,
        } => NonlinearTerm::PiecewiseLinear {
            x,
            sample,
            domain,
            method,
            segments,
            coeff: coeff * by,
        },
        // Indicator terms are never stored in expressions; scaling one is a
        // no-op rather than a panic so `scale` stays total.
        other @ NonlinearTerm::Indicator { .. } => other,
    }
}

// ── Operator overloads ──────────────────────────────────────

impl std::ops::Add for Expr {
    type Output = Expr;

    fn add(self, rhs: Expr) -> Self::Output {
        Expr::add(&self, &rhs)
    }
}

impl std::ops::Sub for Expr {
    type Output = Expr;

    fn sub(self, rhs: Expr) -> Self::Output {
        Expr::add(&self, &rhs.scale(-1.0))
    }
}

impl std::ops::Mul<f64> for Expr {
    type Output = Expr;

    fn mul(self, rhs: f64) -> Self::Output {
        self.scale(rhs)
    }
}

impl std::ops::Neg for Expr {
    type Output = Expr;

    fn neg(self) -> Self::Output {
        self.scale(-1.0)
    }
}
