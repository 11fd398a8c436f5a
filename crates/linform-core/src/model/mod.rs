//! Model module for building optimization models.
//!
//! # Module Organization
//!
//! - [`error`]: Model error types
//! - [`builder`]: Methods for adding variables, constraints, and objectives
//! - [`storage`]: Access to variables, rows, and SOS2 groups
//! - [`metadata`]: Variable and constraint naming and metadata
//! - [`pretty`]: Deterministic ASCII rendering

mod builder;
mod error;
mod metadata;
mod pretty;
mod storage;

use crate::types::{Objective, Sos2Group, Variable};
use linform_expr::ids::{ConstraintId, VariableId};
use linform_expr::Expr;
use std::collections::BTreeMap;

use crate::types::Constraint;
pub use error::ModelError;

/// A model builder for linear and mixed-integer programs, with constraint
/// rows stored as expressions so nonlinear sub-terms stay taggable until the
/// linearization engine rewrites them.
#[derive(Debug, Clone, Default)]
pub struct Model {
    pub(crate) variables: BTreeMap<VariableId, Variable>,
    pub(crate) constraints: BTreeMap<ConstraintId, Constraint>,
    pub(crate) objective: Objective,
    pub(crate) objective_name: Option<String>,
    pub(crate) next_variable_id: u32,
    pub(crate) next_constraint_id: u32,
    pub(crate) sos2_groups: Vec<Sos2Group>,
    // Lazy-allocated metadata storage
    pub(crate) variable_names: Option<BTreeMap<VariableId, String>>,
    pub(crate) constraint_names: Option<BTreeMap<ConstraintId, String>>,
    pub(crate) variable_metadata: Option<BTreeMap<VariableId, serde_json::Value>>,
    pub(crate) constraint_metadata: Option<BTreeMap<ConstraintId, serde_json::Value>>,
}

impl Model {
    /// Create a new empty model.
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the objective
    pub fn objective(&self) -> &Objective {
        &self.objective
    }

    pub(crate) fn ensure_variable_exists(&self, id: VariableId) -> Result<(), ModelError> {
        if self.variables.contains_key(&id) {
            Ok(())
        } else {
            Err(ModelError::InvalidVariableId(id))
        }
    }

    pub(crate) fn ensure_constraint_exists(&self, id: ConstraintId) -> Result<(), ModelError> {
        if self.constraints.contains_key(&id) {
            Ok(())
        } else {
            Err(ModelError::InvalidConstraintId(id))
        }
    }

    pub(crate) fn ensure_expr_resolves(&self, expr: &Expr) -> Result<(), ModelError> {
        for var_id in expr.referenced_variables() {
            self.ensure_variable_exists(var_id)?;
        }
        for (_, coeff) in expr.linear_terms() {
            if !coeff.is_finite() {
                return Err(ModelError::InvalidCoefficient {
                    coefficient: *coeff,
                });
            }
        }
        Ok(())
    }

    /// Check internal consistency: every expression, indicator trigger, and
    /// SOS2 member must reference an existing variable, and binary variables
    /// must keep [0, 1] bounds.
    pub fn validate(&self) -> Result<(), ModelError> {
        for variable in self.variables.values() {
            if variable.kind == crate::types::VarKind::Binary
                && (variable.bounds.lower != 0.0 || variable.bounds.upper != 1.0)
            {
                return Err(ModelError::InvalidBinaryBounds {
                    lower: variable.bounds.lower,
                    upper: variable.bounds.upper,
                });
            }
        }
        self.ensure_expr_resolves(&self.objective.expr)?;
        for constraint in self.constraints.values() {
            self.ensure_expr_resolves(&constraint.expr)?;
            if let Some(indicator) = constraint.indicator {
                self.ensure_variable_exists(indicator.trigger)?;
            }
        }
        for group in &self.sos2_groups {
            if group.members.len() < 2 {
                return Err(ModelError::InvalidSos2Group {
                    reason: "fewer than two members".to_string(),
                });
            }
            if group.members.len() != group.weights.len() {
                return Err(ModelError::InvalidSos2Group {
                    reason: "member/weight length mismatch".to_string(),
                });
            }
            for member in &group.members {
                self.ensure_variable_exists(*member)?;
            }
        }
        Ok(())
    }

}

#[cfg(test)]
mod tests;
