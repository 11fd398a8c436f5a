//! Storage access methods for the model.

use crate::types::{Constraint, Sos2Group, Variable};
use linform_expr::ids::{ConstraintId, VariableId};

use super::error::ModelError;
use super::Model;

impl Model {
    /// Get the number of variables
    pub fn num_variables(&self) -> usize {
        self.variables.len()
    }

    /// Get the number of constraints
    pub fn num_constraints(&self) -> usize {
        self.constraints.len()
    }

    /// Get a variable by ID.
    pub fn get_variable(&self, id: VariableId) -> Result<&Variable, ModelError> {
        self.variables
            .get(&id)
            .ok_or(ModelError::InvalidVariableId(id))
    }

    /// Get a constraint by ID.
    pub fn get_constraint(&self, id: ConstraintId) -> Result<&Constraint, ModelError> {
        self.constraints
            .get(&id)
            .ok_or(ModelError::InvalidConstraintId(id))
    }

    /// Iterate variables in ascending ID order.
    pub fn variables(&self) -> impl Iterator<Item = (VariableId, &Variable)> {
        self.variables.iter().map(|(&id, var)| (id, var))
    }

    /// Iterate constraints in ascending ID order.
    pub fn constraints(&self) -> impl Iterator<Item = (ConstraintId, &Constraint)> {
        self.constraints.iter().map(|(&id, row)| (id, row))
    }

    /// Declared SOS2 groups in declaration order.
    pub fn sos2_groups(&self) -> &[Sos2Group] {
        &self.sos2_groups
    }
}
