//! Tagged nonlinear term shapes recognized by the linearization engine.
//!
//! Bilinear products are stored degree-partitioned on [`Expr`] and indicator
//! conditions live on constraints; both are still *reported* as
//! [`NonlinearTerm`] variants so downstream code matches one closed union.

use std::sync::Arc;

use crate::expr::constraint::ComparisonSense;
use crate::expr::core::Expr;
use crate::ids::VariableId;

/// Min or max over a set of operands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MinMaxKind {
    Min,
    Max,
}

impl MinMaxKind {
    pub fn as_str(self) -> &'static str {
        match self {
            MinMaxKind::Min => "min",
            MinMaxKind::Max => "max",
        }
    }
}

/// Breakpoint placement strategy for piecewise-linear approximation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BreakpointMethod {
    /// Equally spaced points across the domain.
    Uniform,
    /// Curvature-weighted deterministic quantile placement.
    Adaptive,
    /// Curvature-weighted sampling from a seeded PRNG stream.
    Seeded(u64),
}

impl BreakpointMethod {
    pub fn as_str(self) -> &'static str {
        match self {
            BreakpointMethod::Uniform => "uniform",
            BreakpointMethod::Adaptive => "adaptive",
            BreakpointMethod::Seeded(_) => "seeded",
        }
    }
}

/// A cloneable univariate sample function for piecewise-linear targets.
///
/// Wraps an `Arc<dyn Fn>` so expressions holding one stay cheaply cloneable.
#[derive(Clone)]
pub struct SampleFn(Arc<dyn Fn(f64) -> f64 + Send + Sync>);

impl SampleFn {
    pub fn new(f: impl Fn(f64) -> f64 + Send + Sync + 'static) -> Self {
        Self(Arc::new(f))
    }

    /// Evaluate the function at `x`.
    pub fn eval(&self, x: f64) -> f64 {
        (self.0)(x)
    }
}

impl std::fmt::Debug for SampleFn {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("SampleFn(..)")
    }
}

/// A nonlinear term the scanner can recognize.
#[derive(Debug, Clone)]
pub enum NonlinearTerm {
    /// Product of two decision variables, scaled by `coeff`.
    Bilinear {
        a: VariableId,
        b: VariableId,
        coeff: f64,
    },
    /// `coeff * |x|`.
    AbsoluteValue { x: VariableId, coeff: f64 },
    /// `coeff * min(...)` or `coeff * max(...)` over the operands.
    ///
    /// `exact` marks terms whose value must equal the true min/max (not just
    /// bound it); the selector then uses the Big-M selector formulation.
    MinMax {
        operands: Vec<VariableId>,
        kind: MinMaxKind,
        exact: bool,
        coeff: f64,
    },
    /// `coeff * f(x)` approximated piecewise-linearly over `domain`.
    ///
    /// `domain`, `method`, and `segments` override the engine config when
    /// present; a missing domain falls back to the bounds of `x`.
    PiecewiseLinear {
        x: VariableId,
        sample: SampleFn,
        domain: Option<(f64, f64)>,
        method: Option<BreakpointMethod>,
        segments: Option<usize>,
        coeff: f64,
    },
    /// `trigger = when  =>  body <sense> rhs`, with a linear body.
    Indicator {
        trigger: VariableId,
        when: bool,
        body: Expr,
        sense: ComparisonSense,
        rhs: f64,
    },
}

impl NonlinearTerm {
    /// Short shape name used in diagnostics and derived variable names.
    pub fn shape(&self) -> &'static str {
        match self {
            NonlinearTerm::Bilinear { .. } => "bilinear",
            NonlinearTerm::AbsoluteValue { .. } => "abs",
            NonlinearTerm::MinMax {
                kind: MinMaxKind::Min,
                ..
            } => "min",
            NonlinearTerm::MinMax {
                kind: MinMaxKind::Max,
                ..
            } => "max",
            NonlinearTerm::PiecewiseLinear { .. } => "pwl",
            NonlinearTerm::Indicator { .. } => "indicator",
        }
    }

    /// Scalar coefficient applied to the term's output on substitution.
    ///
    /// Indicator terms are constraint-shaped and carry no coefficient.
    pub fn coeff(&self) -> f64 {
        match self {
            NonlinearTerm::Bilinear { coeff, .. }
            | NonlinearTerm::AbsoluteValue { coeff, .. }
            | NonlinearTerm::MinMax { coeff, .. }
            | NonlinearTerm::PiecewiseLinear { coeff, .. } => *coeff,
            NonlinearTerm::Indicator { .. } => 1.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sample_fn_evaluates() {
        let f = SampleFn::new(|x| x * x);
        assert_eq!(f.eval(3.0), 9.0);
        let g = f.clone();
        assert_eq!(g.eval(-2.0), 4.0);
    }

    #[test]
    fn shape_names() {
        let term = NonlinearTerm::AbsoluteValue {
            x: VariableId::new(0),
            coeff: 2.0,
        };
        assert_eq!(term.shape(), "abs");
        assert_eq!(term.coeff(), 2.0);

        let term = NonlinearTerm::MinMax {
            operands: vec![VariableId::new(0), VariableId::new(1)],
            kind: MinMaxKind::Max,
            exact: false,
            coeff: 1.0,
        };
        assert_eq!(term.shape(), "max");
    }
}
