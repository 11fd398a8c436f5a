//! Auxiliary artifacts: the self-contained output of linearizing one term.
//!
//! Formulations are model-unaware, so an artifact describes its new
//! variables by local index and its rows over a mix of model variables and
//! those local indices. The engine later commits the artifact: it allocates
//! real IDs, derives deterministic names, and substitutes the output
//! variable back at the term's location.

use linform_core::{Bounds, VarKind};
use linform_expr::ids::{ConstraintId, VariableId};

use crate::scan::TermLocation;

/// Reference to either an existing model variable or a local auxiliary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VarRef {
    Model(VariableId),
    Aux(usize),
}

/// Spec for one auxiliary variable, before allocation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AuxVarSpec {
    /// Role suffix used in the derived variable name (e.g. "z", "lam3").
    pub role: &'static str,
    pub kind: VarKind,
    pub bounds: Bounds,
}

/// One auxiliary constraint row over model and local variables.
#[derive(Debug, Clone, PartialEq)]
pub struct AuxRow {
    /// Role suffix used in the derived constraint name.
    pub role: &'static str,
    pub terms: Vec<(VarRef, f64)>,
    pub bounds: Bounds,
}

/// SOS2 declaration over artifact members.
#[derive(Debug, Clone, PartialEq)]
pub struct Sos2Spec {
    pub members: Vec<VarRef>,
    pub weights: Vec<f64>,
}

/// Self-contained result of linearizing exactly one nonlinear term.
///
/// Created fresh per formulation call and owned exclusively by the
/// linearized model that embeds it.
#[derive(Debug, Clone, PartialEq)]
pub struct AuxiliaryArtifact {
    /// Technique label recorded on the committed artifact.
    pub technique: &'static str,
    pub variables: Vec<AuxVarSpec>,
    pub rows: Vec<AuxRow>,
    pub sos2: Vec<Sos2Spec>,
    /// Local index of the variable that replaces the term, if the term is
    /// value-shaped. Constraint-shaped terms (indicator) have none.
    pub output: Option<usize>,
    /// When set, the first row overwrites the originating constraint row
    /// instead of being appended (indicator Big-M rewrites in place).
    pub rewrites_source_row: bool,
}

impl AuxiliaryArtifact {
    pub fn new(technique: &'static str) -> Self {
        Self {
            technique,
            variables: Vec::new(),
            rows: Vec::new(),
            sos2: Vec::new(),
            output: None,
            rewrites_source_row: false,
        }
    }

    /// Add an auxiliary variable spec; returns its local index.
    pub fn push_variable(&mut self, role: &'static str, kind: VarKind, bounds: Bounds) -> usize {
        self.variables.push(AuxVarSpec { role, kind, bounds });
        self.variables.len() - 1
    }

    /// Add an auxiliary row.
    pub fn push_row(&mut self, role: &'static str, terms: Vec<(VarRef, f64)>, bounds: Bounds) {
        self.rows.push(AuxRow {
            role,
            terms,
            bounds,
        });
    }

    /// Number of auxiliary variables this artifact will allocate.
    pub fn num_variables(&self) -> usize {
        self.variables.len()
    }

    /// Number of constraint rows this artifact will add (the in-place
    /// rewrite row does not count as an addition).
    pub fn num_new_rows(&self) -> usize {
        if self.rewrites_source_row {
            self.rows.len().saturating_sub(1)
        } else {
            self.rows.len()
        }
    }
}

/// Arena entry recording what one committed artifact produced.
///
/// Append-only and indexed by position, with the originating location stored
/// alongside, so the whole structure stays trivially clonable and
/// comparison-friendly.
#[derive(Debug, Clone, PartialEq)]
pub struct CommittedArtifact {
    pub location: TermLocation,
    pub technique: &'static str,
    /// The variable substituted at the term's location, if value-shaped.
    pub output: Option<VariableId>,
    pub variables: Vec<VariableId>,
    pub constraints: Vec<ConstraintId>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn push_variable_returns_sequential_indices() {
        let mut artifact = AuxiliaryArtifact::new("test");
        let z = artifact.push_variable("z", VarKind::Continuous, Bounds::free());
        let s = artifact.push_variable("s", VarKind::Binary, Bounds::new(0.0, 1.0));
        assert_eq!((z, s), (0, 1));
        assert_eq!(artifact.num_variables(), 2);
    }

    #[test]
    fn rewrite_row_does_not_count_as_new() {
        let mut artifact = AuxiliaryArtifact::new("test");
        artifact.rewrites_source_row = true;
        artifact.push_row("a", vec![], Bounds::free());
        artifact.push_row("b", vec![], Bounds::free());
        assert_eq!(artifact.num_new_rows(), 1);
    }
}
