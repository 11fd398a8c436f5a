//! Model builder methods for adding variables, constraints, and objectives.

use crate::types::{Bounds, Constraint, IndicatorCondition, Objective, Sense, Sos2Group, VarKind};
use linform_expr::expr::{ComparisonSense, ConstraintExpr, IndicatorExpr};
use linform_expr::ids::{ConstraintId, VariableId};
use linform_expr::Expr;

use crate::model::error::ModelError;
use crate::model::Model;
use crate::types::Variable;

impl Model {
    /// Add a variable to the model.
    pub fn add_variable(&mut self, variable: Variable) -> Result<VariableId, ModelError> {
        if variable.bounds.lower.is_nan()
            || variable.bounds.upper.is_nan()
            || variable.bounds.lower > variable.bounds.upper
        {
            return Err(ModelError::InvalidVariableBounds {
                lower: variable.bounds.lower,
                upper: variable.bounds.upper,
            });
        }
        if variable.kind == VarKind::Binary
            && (variable.bounds.lower != 0.0 || variable.bounds.upper != 1.0)
        {
            return Err(ModelError::InvalidBinaryBounds {
                lower: variable.bounds.lower,
                upper: variable.bounds.upper,
            });
        }

        let id = VariableId::new(self.next_variable_id);
        self.next_variable_id += 1;
        self.variables.insert(id, variable);

        Ok(id)
    }

    /// Add a constraint row from an expression and explicit bounds.
    pub fn add_row(&mut self, expr: Expr, bounds: Bounds) -> Result<ConstraintId, ModelError> {
        self.add_row_inner(expr, bounds, None)
    }

    /// Add a constraint from a comparison expression (e.g., `x + y <= 10`).
    pub fn add_constraint_expr(
        &mut self,
        constraint: ConstraintExpr,
    ) -> Result<ConstraintId, ModelError> {
        let (expr, sense, rhs) = constraint.into_parts();
        self.add_row_inner(expr, comparison_bounds(sense, rhs), None)
    }

    /// Add an indicator constraint: `trigger = armed_when  =>  body`.
    ///
    /// The trigger must be binary and the body purely linear; the
    /// linearization engine (or a natively capable solver) handles the rest.
    pub fn add_indicator_constraint(
        &mut self,
        gated: IndicatorExpr,
    ) -> Result<ConstraintId, ModelError> {
        let (trigger, armed_when, body) = gated.into_parts();
        self.ensure_variable_exists(trigger)?;
        let trigger_kind = self.variables[&trigger].kind;
        if trigger_kind != VarKind::Binary {
            return Err(ModelError::TriggerNotBinary(trigger));
        }
        if !body.expr().is_linear() {
            return Err(ModelError::NonlinearIndicatorBody);
        }

        let (expr, sense, rhs) = body.into_parts();
        self.add_row_inner(
            expr,
            comparison_bounds(sense, rhs),
            Some(IndicatorCondition {
                trigger,
                armed_when,
            }),
        )
    }

    fn add_row_inner(
        &mut self,
        expr: Expr,
        bounds: Bounds,
        indicator: Option<IndicatorCondition>,
    ) -> Result<ConstraintId, ModelError> {
        if bounds.lower.is_nan() || bounds.upper.is_nan() || bounds.lower > bounds.upper {
            return Err(ModelError::InvalidConstraintBounds {
                lower: bounds.lower,
                upper: bounds.upper,
            });
        }
        self.ensure_expr_resolves(&expr)?;

        let id = ConstraintId::new(self.next_constraint_id);
        self.next_constraint_id += 1;
        self.constraints.insert(
            id,
            Constraint {
                expr,
                bounds,
                indicator,
            },
        );

        tracing::debug!(
            component = "model",
            operation = "add_row",
            status = "success",
            constraint_id = id.inner(),
            indicator = indicator.is_some(),
            "Added constraint row"
        );

        Ok(id)
    }

    /// Replace an existing constraint row in place, keeping its ID.
    ///
    /// Used by the linearization engine to rewrite indicator rows into their
    /// Big-M form without renumbering.
    pub fn replace_row(
        &mut self,
        id: ConstraintId,
        expr: Expr,
        bounds: Bounds,
        indicator: Option<IndicatorCondition>,
    ) -> Result<(), ModelError> {
        self.ensure_constraint_exists(id)?;
        self.ensure_expr_resolves(&expr)?;
        self.constraints.insert(
            id,
            Constraint {
                expr,
                bounds,
                indicator,
            },
        );
        Ok(())
    }

    /// Set the objective function.
    pub fn set_objective(&mut self, objective: Objective) -> Result<(), ModelError> {
        let sense = objective.sense.ok_or(ModelError::NoObjective)?;
        self.ensure_expr_resolves(&objective.expr)?;

        self.objective = Objective {
            sense: Some(sense),
            expr: objective.expr,
        };
        self.objective_name = None;
        tracing::debug!(
            component = "model",
            operation = "set_objective",
            status = "success",
            sense = sense.as_str(),
            terms = self.objective.expr.linear_terms().len(),
            "Set objective function"
        );
        Ok(())
    }

    /// Minimize an expression.
    ///
    /// Returns an error if the model already has an objective.
    pub fn minimize(&mut self, expr: Expr) -> Result<(), ModelError> {
        if self.objective.sense.is_some() {
            return Err(ModelError::MultipleObjectives);
        }
        self.set_objective(Objective {
            sense: Some(Sense::Minimize),
            expr,
        })
    }

    /// Maximize an expression.
    ///
    /// Returns an error if the model already has an objective.
    pub fn maximize(&mut self, expr: Expr) -> Result<(), ModelError> {
        if self.objective.sense.is_some() {
            return Err(ModelError::MultipleObjectives);
        }
        self.set_objective(Objective {
            sense: Some(Sense::Maximize),
            expr,
        })
    }

    /// Declare an SOS2 group over existing variables.
    pub fn add_sos2_group(
        &mut self,
        members: Vec<VariableId>,
        weights: Vec<f64>,
        name: Option<String>,
    ) -> Result<usize, ModelError> {
        if members.len() < 2 {
            return Err(ModelError::InvalidSos2Group {
                reason: "fewer than two members".to_string(),
            });
        }
        if members.len() != weights.len() {
            return Err(ModelError::InvalidSos2Group {
                reason: "member/weight length mismatch".to_string(),
            });
        }
        for member in &members {
            self.ensure_variable_exists(*member)?;
        }

        self.sos2_groups.push(Sos2Group {
            members,
            weights,
            name,
        });
        Ok(self.sos2_groups.len() - 1)
    }
}

pub(crate) fn comparison_bounds(sense: ComparisonSense, rhs: f64) -> Bounds {
    match sense {
        ComparisonSense::LessEqual => Bounds::new(f64::NEG_INFINITY, rhs),
        ComparisonSense::GreaterEqual => Bounds::new(rhs, f64::INFINITY),
        ComparisonSense::Equal => Bounds::new(rhs, rhs),
    }
}
