//! Technique selection: maps a scanned shape to the formulation that will
//! handle it, given what the target solver supports natively.
//!
//! Selection is classification only. Bounds sufficiency is checked by the
//! formulations themselves, so each requirement is enforced in one place.

use linform_core::{Model, SolverCapability, VarKind};
use linform_expr::ids::VariableId;
use linform_expr::NonlinearTerm;

use crate::config::LinearizerConfig;
use crate::error::LinearizeError;
use crate::scan::ScannedShape;
use crate::PwlMethod;

/// The formulation chosen for a term.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Technique {
    AndLogic,
    BigMProduct,
    McCormick,
    AbsEnvelope,
    MinMaxEnvelope,
    MinMaxBigM,
    IndicatorBigM,
    Piecewise(PwlMethod),
}

impl Technique {
    pub fn as_str(self) -> &'static str {
        match self {
            Technique::AndLogic => "and_logic",
            Technique::BigMProduct => "big_m_product",
            Technique::McCormick => "mccormick",
            Technique::AbsEnvelope => "abs_envelope",
            Technique::MinMaxEnvelope => "min_max_envelope",
            Technique::MinMaxBigM => "min_max_big_m",
            Technique::IndicatorBigM => "indicator_big_m",
            Technique::Piecewise(PwlMethod::Sos2) => "pwl_sos2",
            Technique::Piecewise(PwlMethod::Incremental) => "pwl_incremental",
        }
    }
}

/// Outcome of selection for one term.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Selection {
    /// The solver handles this shape natively; leave the term in place.
    PassThrough,
    Apply(Technique),
}

/// Choose how to handle one scanned shape.
pub fn select(
    shape: &ScannedShape,
    model: &Model,
    capability: &SolverCapability,
    config: &LinearizerConfig,
) -> Result<Selection, LinearizeError> {
    let term = match shape {
        ScannedShape::Term(term) => term,
        ScannedShape::Unrecognized { detail } => {
            return Err(LinearizeError::UnrecognizedTerm {
                detail: detail.clone(),
            });
        }
    };

    let selection = match term {
        NonlinearTerm::Bilinear { a, b, .. } => {
            if capability.supports_quadratic {
                Selection::PassThrough
            } else {
                let a_binary = model.get_variable(*a)?.kind == VarKind::Binary;
                let b_binary = model.get_variable(*b)?.kind == VarKind::Binary;
                match (a_binary, b_binary) {
                    (true, true) => Selection::Apply(Technique::AndLogic),
                    (true, false) | (false, true) => Selection::Apply(Technique::BigMProduct),
                    // Integer operands take the continuous envelope; their
                    // bounds participate like any box.
                    (false, false) => Selection::Apply(Technique::McCormick),
                }
            }
        }
        NonlinearTerm::AbsoluteValue { .. } => Selection::Apply(Technique::AbsEnvelope),
        NonlinearTerm::MinMax {
            operands, exact, ..
        } => {
            if operands.is_empty() {
                return Err(LinearizeError::UnrecognizedTerm {
                    detail: "min/max over an empty operand set".to_string(),
                });
            }
            if *exact {
                Selection::Apply(Technique::MinMaxBigM)
            } else {
                Selection::Apply(Technique::MinMaxEnvelope)
            }
        }
        NonlinearTerm::PiecewiseLinear {
            x,
            domain,
            segments,
            ..
        } => {
            // Fail at selection so a missing domain or degenerate segment
            // count is reported even before formulation.
            if matches!(segments, Some(0)) {
                return Err(LinearizeError::InvalidSegments { variable: *x });
            }
            pwl_domain(*x, *domain, model, config)?;
            Selection::Apply(Technique::Piecewise(config.pwl_method()))
        }
        NonlinearTerm::Indicator { .. } => {
            if capability.supports_indicator {
                Selection::PassThrough
            } else {
                Selection::Apply(Technique::IndicatorBigM)
            }
        }
    };
    Ok(selection)
}

/// Resolve the approximation domain for a piecewise-linear target: explicit
/// override first, then the variable's bounds. A domain narrower than the
/// configured tolerance is rejected as degenerate.
pub(crate) fn pwl_domain(
    x: VariableId,
    domain: Option<(f64, f64)>,
    model: &Model,
    config: &LinearizerConfig,
) -> Result<(f64, f64), LinearizeError> {
    let (lo, hi) = match domain {
        Some(d) => d,
        None => {
            let bounds = model.get_variable(x)?.bounds;
            (bounds.lower, bounds.upper)
        }
    };
    if !lo.is_finite() || !hi.is_finite() || hi - lo <= config.tolerance() {
        return Err(LinearizeError::DomainRequired { variable: x });
    }
    Ok((lo, hi))
}

#[cfg(test)]
mod tests {
    use super::*;
    use linform_core::{Bounds, Model, Variable};
    use linform_expr::{MinMaxKind, SampleFn};

    fn model_with(vars: &[Variable]) -> (Model, Vec<VariableId>) {
        let mut model = Model::new();
        let ids = vars
            .iter()
            .map(|v| model.add_variable(v.clone()).unwrap())
            .collect();
        (model, ids)
    }

    fn bilinear(a: VariableId, b: VariableId) -> ScannedShape {
        ScannedShape::Term(NonlinearTerm::Bilinear { a, b, coeff: 1.0 })
    }

    #[test]
    fn bilinear_classifies_by_operand_kinds() {
        let (model, ids) = model_with(&[
            Variable::binary(),
            Variable::binary(),
            Variable::continuous(Bounds::new(0.0, 1.0)),
            Variable::integer(Bounds::new(0.0, 5.0)),
        ]);
        let caps = SolverCapability::lp_only();
        let config = LinearizerConfig::default();

        let cases = [
            (ids[0], ids[1], Technique::AndLogic),
            (ids[0], ids[2], Technique::BigMProduct),
            (ids[2], ids[0], Technique::BigMProduct),
            (ids[2], ids[3], Technique::McCormick),
        ];
        for (a, b, expected) in cases {
            let selection = select(&bilinear(a, b), &model, &caps, &config).unwrap();
            assert_eq!(selection, Selection::Apply(expected), "{a} * {b}");
        }
    }

    #[test]
    fn quadratic_capability_passes_bilinear_through() {
        let (model, ids) = model_with(&[Variable::free(), Variable::free()]);
        let selection = select(
            &bilinear(ids[0], ids[1]),
            &model,
            &SolverCapability::miqp(),
            &LinearizerConfig::default(),
        )
        .unwrap();
        assert_eq!(selection, Selection::PassThrough);
    }

    #[test]
    fn exact_flag_switches_min_max_formulation() {
        let (model, ids) = model_with(&[
            Variable::continuous(Bounds::new(0.0, 1.0)),
            Variable::continuous(Bounds::new(0.0, 1.0)),
        ]);
        let caps = SolverCapability::milp();
        let config = LinearizerConfig::default();

        for (exact, expected) in [
            (false, Technique::MinMaxEnvelope),
            (true, Technique::MinMaxBigM),
        ] {
            let shape = ScannedShape::Term(NonlinearTerm::MinMax {
                operands: vec![ids[0], ids[1]],
                kind: MinMaxKind::Min,
                exact,
                coeff: 1.0,
            });
            let selection = select(&shape, &model, &caps, &config).unwrap();
            assert_eq!(selection, Selection::Apply(expected));
        }
    }

    #[test]
    fn pwl_without_domain_or_bounds_is_rejected() {
        let (model, ids) = model_with(&[Variable::free()]);
        let shape = ScannedShape::Term(NonlinearTerm::PiecewiseLinear {
            x: ids[0],
            sample: SampleFn::new(f64::exp),
            domain: None,
            method: None,
            segments: None,
            coeff: 1.0,
        });
        let err = select(
            &shape,
            &model,
            &SolverCapability::milp(),
            &LinearizerConfig::default(),
        )
        .unwrap_err();
        assert_eq!(err, LinearizeError::DomainRequired { variable: ids[0] });
    }

    #[test]
    fn pwl_domain_prefers_the_override() {
        let (model, ids) = model_with(&[Variable::continuous(Bounds::new(0.0, 100.0))]);
        let config = LinearizerConfig::default();
        let domain = pwl_domain(ids[0], Some((1.0, 2.0)), &model, &config).unwrap();
        assert_eq!(domain, (1.0, 2.0));
        let fallback = pwl_domain(ids[0], None, &model, &config).unwrap();
        assert_eq!(fallback, (0.0, 100.0));
    }

    #[test]
    fn pwl_domain_narrower_than_tolerance_is_degenerate() {
        let (model, ids) = model_with(&[Variable::free()]);
        let config = LinearizerConfig::default();
        let err = pwl_domain(ids[0], Some((1.0, 1.0 + 1e-9)), &model, &config).unwrap_err();
        assert_eq!(err, LinearizeError::DomainRequired { variable: ids[0] });
        assert!(pwl_domain(ids[0], Some((1.0, 2.0)), &model, &config).is_ok());
    }

    #[test]
    fn pwl_with_zero_segments_is_rejected() {
        let (model, ids) = model_with(&[Variable::continuous(Bounds::new(0.0, 1.0))]);
        let shape = ScannedShape::Term(NonlinearTerm::PiecewiseLinear {
            x: ids[0],
            sample: SampleFn::new(f64::exp),
            domain: None,
            method: None,
            segments: Some(0),
            coeff: 1.0,
        });
        let err = select(
            &shape,
            &model,
            &SolverCapability::milp(),
            &LinearizerConfig::default(),
        )
        .unwrap_err();
        assert_eq!(err, LinearizeError::InvalidSegments { variable: ids[0] });
    }

    #[test]
    fn indicator_respects_native_support() {
        let (mut model, _) = model_with(&[Variable::continuous(Bounds::new(0.0, 1.0))]);
        let trigger = model.add_variable(Variable::binary()).unwrap();
        let shape = ScannedShape::Term(NonlinearTerm::Indicator {
            trigger,
            when: true,
            body: linform_expr::Expr::new_empty(),
            sense: linform_expr::ComparisonSense::LessEqual,
            rhs: 0.0,
        });
        let config = LinearizerConfig::default();

        let mut caps = SolverCapability::milp();
        caps.supports_indicator = true;
        assert_eq!(
            select(&shape, &model, &caps, &config).unwrap(),
            Selection::PassThrough
        );

        caps.supports_indicator = false;
        assert_eq!(
            select(&shape, &model, &caps, &config).unwrap(),
            Selection::Apply(Technique::IndicatorBigM)
        );
    }

    #[test]
    fn unrecognized_shapes_carry_their_detail() {
        let (model, _) = model_with(&[]);
        let shape = ScannedShape::Unrecognized {
            detail: "trilinear product x0*x1*x2".to_string(),
        };
        let err = select(
            &shape,
            &model,
            &SolverCapability::milp(),
            &LinearizerConfig::default(),
        )
        .unwrap_err();
        assert!(matches!(
            err,
            LinearizeError::UnrecognizedTerm { detail } if detail.contains("trilinear")
        ));
    }
}
