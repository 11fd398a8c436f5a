//! Linearization error types.
//!
//! Per-term failures are collected, never thrown eagerly mid-scan; the
//! engine's top-level result is either a fully assembled model or a
//! [`LinearizationErrors`] report listing every failing term.

use linform_core::ModelError;
use linform_expr::ids::VariableId;

use crate::scan::TermLocation;

/// Failure linearizing one term.
#[derive(Debug, Clone, PartialEq)]
pub enum LinearizeError {
    /// An operand needed finite bounds for the chosen technique.
    BoundsRequired {
        variable: VariableId,
        technique: &'static str,
    },
    /// A piecewise-linear target has no usable domain.
    DomainRequired { variable: VariableId },
    /// A piecewise-linear term requests zero segments.
    InvalidSegments { variable: VariableId },
    /// A nonlinear shape with no known technique.
    UnrecognizedTerm { detail: String },
    /// The auxiliary-structure ceiling was breached.
    ConfigLimitExceeded {
        resource: &'static str,
        limit: usize,
        required: usize,
    },
    /// A model operation failed while assembling the output.
    Model(ModelError),
}

impl LinearizeError {
    /// Returns a semantic error code for programmatic handling.
    pub fn code(&self) -> &'static str {
        match self {
            LinearizeError::BoundsRequired { .. } => "LINEARIZE_BOUNDS_REQUIRED",
            LinearizeError::DomainRequired { .. } => "LINEARIZE_DOMAIN_REQUIRED",
            LinearizeError::InvalidSegments { .. } => "LINEARIZE_SEGMENTS_INVALID",
            LinearizeError::UnrecognizedTerm { .. } => "LINEARIZE_UNRECOGNIZED_TERM",
            LinearizeError::ConfigLimitExceeded { .. } => "LINEARIZE_LIMIT_EXCEEDED",
            LinearizeError::Model(_) => "LINEARIZE_MODEL_ERROR",
        }
    }
}

impl std::fmt::Display for LinearizeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LinearizeError::BoundsRequired {
                variable,
                technique,
            } => write!(
                f,
                "[{}] Variable x{variable} needs finite bounds for {technique}",
                self.code()
            ),
            LinearizeError::DomainRequired { variable } => write!(
                f,
                "[{}] No usable approximation domain for variable x{variable}",
                self.code()
            ),
            LinearizeError::InvalidSegments { variable } => write!(
                f,
                "[{}] Piecewise term on variable x{variable} requests zero segments",
                self.code()
            ),
            LinearizeError::UnrecognizedTerm { detail } => {
                write!(f, "[{}] No technique for {detail}", self.code())
            }
            LinearizeError::ConfigLimitExceeded {
                resource,
                limit,
                required,
            } => write!(
                f,
                "[{}] Auxiliary {resource} ceiling {limit} exceeded (needs {required})",
                self.code()
            ),
            LinearizeError::Model(err) => {
                write!(f, "[{}] {err}", self.code())
            }
        }
    }
}

impl std::error::Error for LinearizeError {}

impl From<ModelError> for LinearizeError {
    fn from(err: ModelError) -> Self {
        LinearizeError::Model(err)
    }
}

/// A per-term failure with the originating location.
#[derive(Debug, Clone, PartialEq)]
pub struct TermFailure {
    pub location: TermLocation,
    pub error: LinearizeError,
}

/// Aggregated report of every term that failed to linearize.
#[derive(Debug, Clone, PartialEq)]
pub struct LinearizationErrors {
    pub failures: Vec<TermFailure>,
}

impl LinearizationErrors {
    pub fn new(failures: Vec<TermFailure>) -> Self {
        Self { failures }
    }

    pub fn is_empty(&self) -> bool {
        self.failures.is_empty()
    }

    pub fn len(&self) -> usize {
        self.failures.len()
    }
}

impl std::fmt::Display for LinearizationErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(
            f,
            "[LINEARIZE_FAILED] {} term(s) could not be linearized:",
            self.failures.len()
        )?;
        for failure in &self.failures {
            writeln!(f, "  {}: {}", failure.location, failure.error)?;
        }
        Ok(())
    }
}

impl std::error::Error for LinearizationErrors {}
