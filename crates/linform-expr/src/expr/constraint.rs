//! Constraint expressions: expression with comparison sense and RHS,
//! plus the indicator-gated form.

use crate::expr::core::Expr;
use crate::ids::VariableId;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComparisonSense {
    LessEqual,
    GreaterEqual,
    Equal,
}

impl ComparisonSense {
    pub fn as_str(self) -> &'static str {
        match self {
            ComparisonSense::LessEqual => "le",
            ComparisonSense::GreaterEqual => "ge",
            ComparisonSense::Equal => "eq",
        }
    }
}

#[derive(Debug, Clone)]
pub struct ConstraintExpr {
    expr: Expr,
    sense: ComparisonSense,
    rhs: f64,
}

impl ConstraintExpr {
    pub fn new(expr: Expr, sense: ComparisonSense, rhs: f64) -> Self {
        Self { expr, sense, rhs }
    }

    pub fn expr(&self) -> &Expr {
        &self.expr
    }

    pub fn sense(&self) -> ComparisonSense {
        self.sense
    }

    pub fn rhs(&self) -> f64 {
        self.rhs
    }

    pub fn into_parts(self) -> (Expr, ComparisonSense, f64) {
        (self.expr, self.sense, self.rhs)
    }
}

/// A constraint that only applies while a binary trigger holds a given state.
///
/// `trigger = armed_when  =>  body`. The body must be purely linear; the
/// model builder rejects indicator bodies carrying nonlinear terms.
#[derive(Debug, Clone)]
pub struct IndicatorExpr {
    trigger: VariableId,
    armed_when: bool,
    body: ConstraintExpr,
}

impl IndicatorExpr {
    pub fn new(trigger: VariableId, armed_when: bool, body: ConstraintExpr) -> Self {
        Self {
            trigger,
            armed_when,
            body,
        }
    }

    pub fn trigger(&self) -> VariableId {
        self.trigger
    }

    pub fn armed_when(&self) -> bool {
        self.armed_when
    }

    pub fn body(&self) -> &ConstraintExpr {
        &self.body
    }

    pub fn into_parts(self) -> (VariableId, bool, ConstraintExpr) {
        (self.trigger, self.armed_when, self.body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constraint_expr_exposes_parts() {
        let expr = Expr::term(VariableId::new(1), 1.0);
        let constraint = ConstraintExpr::new(expr, ComparisonSense::LessEqual, 10.0);

        assert_eq!(constraint.sense(), ComparisonSense::LessEqual);
        assert_eq!(constraint.rhs(), 10.0);

        let (inner, sense, rhs) = constraint.into_parts();
        assert_eq!(sense, ComparisonSense::LessEqual);
        assert_eq!(rhs, 10.0);
        assert_eq!(inner.linear_terms().len(), 1);
    }

    #[test]
    fn indicator_expr_carries_trigger_state() {
        let body = Expr::term(VariableId::new(2), 1.0).le_scalar(5.0);
        let gated = IndicatorExpr::new(VariableId::new(0), true, body);

        assert_eq!(gated.trigger(), VariableId::new(0));
        assert!(gated.armed_when());
        assert_eq!(gated.body().rhs(), 5.0);
    }
}
