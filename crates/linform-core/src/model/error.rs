//! Model error types.

use linform_expr::ids::{ConstraintId, VariableId};

/// Errors that can occur during model operations
#[derive(Debug, Clone, PartialEq)]
pub enum ModelError {
    /// Invalid variable ID
    InvalidVariableId(VariableId),
    /// Invalid variable bounds
    InvalidVariableBounds { lower: f64, upper: f64 },
    /// Binary variable with bounds other than [0, 1]
    InvalidBinaryBounds { lower: f64, upper: f64 },
    /// Invalid constraint ID
    InvalidConstraintId(ConstraintId),
    /// Invalid constraint bounds
    InvalidConstraintBounds { lower: f64, upper: f64 },
    /// Non-finite coefficient
    InvalidCoefficient { coefficient: f64 },
    /// No objective set
    NoObjective,
    /// Objective already set
    MultipleObjectives,
    /// Indicator trigger is not a binary variable
    TriggerNotBinary(VariableId),
    /// Indicator body carries nonlinear terms
    NonlinearIndicatorBody,
    /// SOS2 group is malformed (too few members, or member/weight mismatch)
    InvalidSos2Group { reason: String },
}

impl ModelError {
    /// Returns a semantic error code for programmatic handling.
    pub fn code(&self) -> &'static str {
        match self {
            ModelError::InvalidVariableId(_) => "VARIABLE_INVALID_ID",
            ModelError::InvalidVariableBounds { .. } => "VARIABLE_INVALID_BOUNDS",
            ModelError::InvalidBinaryBounds { .. } => "VARIABLE_INVALID_BINARY_BOUNDS",
            ModelError::InvalidConstraintId(_) => "CONSTRAINT_INVALID_ID",
            ModelError::InvalidConstraintBounds { .. } => "CONSTRAINT_INVALID_BOUNDS",
            ModelError::InvalidCoefficient { .. } => "COEFFICIENT_INVALID",
            ModelError::NoObjective => "OBJECTIVE_MISSING",
            ModelError::MultipleObjectives => "OBJECTIVE_ALREADY_SET",
            ModelError::TriggerNotBinary(_) => "INDICATOR_TRIGGER_NOT_BINARY",
            ModelError::NonlinearIndicatorBody => "INDICATOR_BODY_NONLINEAR",
            ModelError::InvalidSos2Group { .. } => "SOS2_INVALID_GROUP",
        }
    }
}

impl std::fmt::Display for ModelError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ModelError::InvalidVariableId(id) => {
                write!(f, "[{}] Variable {} does not exist", self.code(), id)
            }
            ModelError::InvalidVariableBounds { lower, upper } => write!(
                f,
                "[{}] Invalid variable bounds [{lower}, {upper}]",
                self.code()
            ),
            ModelError::InvalidBinaryBounds { lower, upper } => write!(
                f,
                "[{}] Binary variable bounds must be [0, 1], got [{lower}, {upper}]",
                self.code()
            ),
            ModelError::InvalidConstraintId(id) => {
                write!(f, "[{}] Constraint {} does not exist", self.code(), id)
            }
            ModelError::InvalidConstraintBounds { lower, upper } => write!(
                f,
                "[{}] Invalid constraint bounds [{lower}, {upper}]",
                self.code()
            ),
            ModelError::InvalidCoefficient { coefficient } => write!(
                f,
                "[{}] Coefficient must be finite, got {coefficient}",
                self.code()
            ),
            ModelError::NoObjective => write!(f, "[{}] Model has no objective", self.code()),
            ModelError::MultipleObjectives => {
                write!(f, "[{}] Model already has an objective", self.code())
            }
            ModelError::TriggerNotBinary(id) => write!(
                f,
                "[{}] Indicator trigger {} must be a binary variable",
                self.code(),
                id
            ),
            ModelError::NonlinearIndicatorBody => write!(
                f,
                "[{}] Indicator bodies must be purely linear",
                self.code()
            ),
            ModelError::InvalidSos2Group { reason } => {
                write!(f, "[{}] Invalid SOS2 group: {reason}", self.code())
            }
        }
    }
}

impl std::error::Error for ModelError {}
