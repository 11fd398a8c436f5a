//! Declared feature set of a target solver.
//!
//! The linearization engine consumes this read-only to decide whether a
//! nonlinear shape needs rewriting at all (pass-through when the solver
//! covers it natively).

/// Native feature flags of a target solver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub struct SolverCapability {
    /// Solver accepts quadratic (bilinear) terms natively.
    pub supports_quadratic: bool,
    /// Solver accepts SOS2 group declarations natively.
    pub supports_sos2: bool,
    /// Solver accepts indicator constraints natively.
    pub supports_indicator: bool,
    /// Solver accepts integer/binary variables.
    pub supports_integer: bool,
}

impl SolverCapability {
    /// Pure LP solver: no nonlinear shape passes through natively.
    ///
    /// The flags gate pass-through only; rewrites for this target may still
    /// emit binary auxiliaries (AND logic, exact min/max, SOS2 emulation),
    /// which remain in the output model for the caller to handle.
    pub fn lp_only() -> Self {
        Self {
            supports_quadratic: false,
            supports_sos2: false,
            supports_indicator: false,
            supports_integer: false,
        }
    }

    /// Typical MILP solver (CBC/HiGHS class): integers and SOS2, no native
    /// quadratics or indicators.
    pub fn milp() -> Self {
        Self {
            supports_quadratic: false,
            supports_sos2: true,
            supports_indicator: false,
            supports_integer: true,
        }
    }

    /// Commercial MIQP-class solver: everything native.
    pub fn miqp() -> Self {
        Self {
            supports_quadratic: true,
            supports_sos2: true,
            supports_indicator: true,
            supports_integer: true,
        }
    }
}

impl Default for SolverCapability {
    /// Defaults to the most conservative target (pure LP).
    fn default() -> Self {
        Self::lp_only()
    }
}
