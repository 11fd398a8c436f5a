use linform_expr::{Expr, VariableId};

/// Optimization sense
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sense {
    Minimize,
    Maximize,
}

impl Sense {
    pub fn as_str(self) -> &'static str {
        match self {
            Sense::Minimize => "minimize",
            Sense::Maximize => "maximize",
        }
    }
}

/// Bounds for a variable or constraint row.
///
/// Unbounded sides are represented as `±f64::INFINITY`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub lower: f64,
    pub upper: f64,
}

impl Bounds {
    pub fn new(lower: f64, upper: f64) -> Self {
        Self { lower, upper }
    }

    /// Fully unbounded interval.
    pub fn free() -> Self {
        Self {
            lower: f64::NEG_INFINITY,
            upper: f64::INFINITY,
        }
    }

    /// True when both ends are finite.
    pub fn is_finite(self) -> bool {
        self.lower.is_finite() && self.upper.is_finite()
    }

    /// Interval width; infinite when either end is unbounded.
    pub fn width(self) -> f64 {
        self.upper - self.lower
    }
}

/// Integrality class of a decision variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum VarKind {
    Continuous,
    Integer,
    Binary,
}

impl VarKind {
    pub fn as_str(self) -> &'static str {
        match self {
            VarKind::Continuous => "continuous",
            VarKind::Integer => "integer",
            VarKind::Binary => "binary",
        }
    }
}

/// A decision variable with a kind and bounds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Variable {
    pub kind: VarKind,
    pub bounds: Bounds,
}

impl Variable {
    /// Create a binary variable. Bounds are pinned to [0, 1].
    pub fn binary() -> Self {
        Self {
            kind: VarKind::Binary,
            bounds: Bounds::new(0.0, 1.0),
        }
    }

    /// Create a continuous variable with specified bounds.
    pub fn continuous(bounds: Bounds) -> Self {
        Self {
            kind: VarKind::Continuous,
            bounds,
        }
    }

    /// Create an integer variable with specified bounds.
    pub fn integer(bounds: Bounds) -> Self {
        Self {
            kind: VarKind::Integer,
            bounds,
        }
    }

    /// Create an unbounded continuous variable.
    pub fn free() -> Self {
        Self::continuous(Bounds::free())
    }
}

/// Binary trigger condition attached to an indicator constraint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndicatorCondition {
    pub trigger: VariableId,
    /// The constraint applies while `trigger` equals this state.
    pub armed_when: bool,
}

/// A constraint row: expression with lower/upper bounds and an optional
/// indicator condition gating it.
#[derive(Debug, Clone)]
pub struct Constraint {
    pub expr: Expr,
    pub bounds: Bounds,
    pub indicator: Option<IndicatorCondition>,
}

/// Objective function with a sense and an expression.
///
/// The expression may carry nonlinear terms; the linearization engine
/// rewrites them before any solver sees the model.
#[derive(Debug, Clone)]
pub struct Objective {
    pub sense: Option<Sense>,
    pub expr: Expr,
}

impl Objective {
    /// Create a new empty objective
    pub fn new() -> Self {
        Self {
            sense: None,
            expr: Expr::new_empty(),
        }
    }
}

impl Default for Objective {
    fn default() -> Self {
        Self::new()
    }
}

/// A special-ordered-set-of-type-2 declaration: at most two, adjacent,
/// members may be nonzero. Weights define adjacency order.
#[derive(Debug, Clone, PartialEq)]
pub struct Sos2Group {
    pub members: Vec<VariableId>,
    pub weights: Vec<f64>,
    pub name: Option<String>,
}

#[cfg(test)]
#[allow(clippy::float_cmp)]
mod tests {
    use super::*;

    #[test]
    fn binary_variable_is_pinned_to_unit_interval() {
        let v = Variable::binary();
        assert_eq!(v.kind, VarKind::Binary);
        assert_eq!(v.bounds, Bounds::new(0.0, 1.0));
    }

    #[test]
    fn free_bounds_are_not_finite() {
        assert!(!Bounds::free().is_finite());
        assert!(Bounds::new(-1.0, 2.0).is_finite());
        assert_eq!(Bounds::new(-1.0, 2.0).width(), 3.0);
    }

    #[test]
    fn objective_starts_empty() {
        let o = Objective::new();
        assert!(o.sense.is_none());
        assert!(o.expr.linear_terms().is_empty());
    }
}
