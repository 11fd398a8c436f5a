//! Numeric formulation library: the closed-form transformation for each
//! nonlinear term shape.
//!
//! Every function here is stateless: it takes operands, their bounds, and
//! scalar tunables, and returns an [`AuxiliaryArtifact`] or a typed failure.
//! No model access, no I/O.

use linform_core::{Bounds, VarKind};
use linform_expr::ids::VariableId;
use linform_expr::{ComparisonSense, MinMaxKind};

use crate::artifact::{AuxiliaryArtifact, VarRef};
use crate::error::LinearizeError;

fn le(rhs: f64) -> Bounds {
    Bounds::new(f64::NEG_INFINITY, rhs)
}

fn ge(rhs: f64) -> Bounds {
    Bounds::new(rhs, f64::INFINITY)
}

fn eq(rhs: f64) -> Bounds {
    Bounds::new(rhs, rhs)
}

/// Binary x binary product via AND logic: three constraints, no extra
/// continuous variables. Exact for all four operand combinations.
pub fn and_logic(a: VariableId, b: VariableId) -> AuxiliaryArtifact {
    let mut artifact = AuxiliaryArtifact::new("and_logic");
    let z = artifact.push_variable("z", VarKind::Binary, Bounds::new(0.0, 1.0));
    artifact.output = Some(z);

    // z <= a, z <= b, z >= a + b - 1
    artifact.push_row(
        "le_a",
        vec![(VarRef::Aux(z), 1.0), (VarRef::Model(a), -1.0)],
        le(0.0),
    );
    artifact.push_row(
        "le_b",
        vec![(VarRef::Aux(z), 1.0), (VarRef::Model(b), -1.0)],
        le(0.0),
    );
    artifact.push_row(
        "ge_sum",
        vec![
            (VarRef::Aux(z), 1.0),
            (VarRef::Model(a), -1.0),
            (VarRef::Model(b), -1.0),
        ],
        ge(-1.0),
    );
    artifact
}

/// Binary x continuous product via Big-M switching: four constraints.
/// Requires finite bounds on the continuous operand.
pub fn big_m_product(
    switch: VariableId,
    x: VariableId,
    x_bounds: Bounds,
) -> Result<AuxiliaryArtifact, LinearizeError> {
    if !x_bounds.is_finite() {
        return Err(LinearizeError::BoundsRequired {
            variable: x,
            technique: "big_m_product",
        });
    }
    let (xl, xu) = (x_bounds.lower, x_bounds.upper);

    let mut artifact = AuxiliaryArtifact::new("big_m_product");
    let z = artifact.push_variable(
        "z",
        VarKind::Continuous,
        Bounds::new(xl.min(0.0), xu.max(0.0)),
    );
    artifact.output = Some(z);

    // z <= xU*b ; z >= xL*b ; z <= x - xL*(1-b) ; z >= x - xU*(1-b)
    artifact.push_row(
        "cap_upper",
        vec![(VarRef::Aux(z), 1.0), (VarRef::Model(switch), -xu)],
        le(0.0),
    );
    artifact.push_row(
        "cap_lower",
        vec![(VarRef::Aux(z), 1.0), (VarRef::Model(switch), -xl)],
        ge(0.0),
    );
    artifact.push_row(
        "track_upper",
        vec![
            (VarRef::Aux(z), 1.0),
            (VarRef::Model(x), -1.0),
            (VarRef::Model(switch), -xl),
        ],
        le(-xl),
    );
    artifact.push_row(
        "track_lower",
        vec![
            (VarRef::Aux(z), 1.0),
            (VarRef::Model(x), -1.0),
            (VarRef::Model(switch), -xu),
        ],
        ge(-xu),
    );
    Ok(artifact)
}

/// Continuous x continuous product via the McCormick envelope: four
/// inequalities bounding `z = x*y` over the operand box. Requires finite
/// bounds on both operands. A relaxation, tight at the box corners.
pub fn mccormick(
    x: VariableId,
    y: VariableId,
    x_bounds: Bounds,
    y_bounds: Bounds,
    tighten_output_bounds: bool,
) -> Result<AuxiliaryArtifact, LinearizeError> {
    if !x_bounds.is_finite() {
        return Err(LinearizeError::BoundsRequired {
            variable: x,
            technique: "mccormick",
        });
    }
    if !y_bounds.is_finite() {
        return Err(LinearizeError::BoundsRequired {
            variable: y,
            technique: "mccormick",
        });
    }
    let (xl, xu) = (x_bounds.lower, x_bounds.upper);
    let (yl, yu) = (y_bounds.lower, y_bounds.upper);

    let z_bounds = if tighten_output_bounds {
        let corners = [xl * yl, xl * yu, xu * yl, xu * yu];
        let lower = corners.iter().copied().fold(f64::INFINITY, f64::min);
        let upper = corners.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        Bounds::new(lower, upper)
    } else {
        Bounds::free()
    };

    let mut artifact = AuxiliaryArtifact::new("mccormick");
    let z = artifact.push_variable("z", VarKind::Continuous, z_bounds);
    artifact.output = Some(z);

    // z >= xL*y + yL*x - xL*yL
    artifact.push_row(
        "under_ll",
        vec![
            (VarRef::Aux(z), 1.0),
            (VarRef::Model(y), -xl),
            (VarRef::Model(x), -yl),
        ],
        ge(-xl * yl),
    );
    // z >= xU*y + yU*x - xU*yU
    artifact.push_row(
        "under_uu",
        vec![
            (VarRef::Aux(z), 1.0),
            (VarRef::Model(y), -xu),
            (VarRef::Model(x), -yu),
        ],
        ge(-xu * yu),
    );
    // z <= xU*y + yL*x - xU*yL
    artifact.push_row(
        "over_ul",
        vec![
            (VarRef::Aux(z), 1.0),
            (VarRef::Model(y), -xu),
            (VarRef::Model(x), -yl),
        ],
        le(-xu * yl),
    );
    // z <= xL*y + yU*x - xL*yU
    artifact.push_row(
        "over_lu",
        vec![
            (VarRef::Aux(z), 1.0),
            (VarRef::Model(y), -xl),
            (VarRef::Model(x), -yu),
        ],
        le(-xl * yu),
    );
    Ok(artifact)
}

/// Absolute value via the two-constraint lower envelope `z >= x`, `z >= -x`.
///
/// Exact only when `z` is pressured toward its lower bound by the objective
/// or an enclosing constraint; otherwise `z` may exceed `|x|`. This is a
/// documented limitation of the envelope, not a silent one.
pub fn absolute_value(x: VariableId, x_bounds: Bounds) -> AuxiliaryArtifact {
    let upper = if x_bounds.is_finite() {
        x_bounds.lower.abs().max(x_bounds.upper.abs())
    } else {
        f64::INFINITY
    };

    let mut artifact = AuxiliaryArtifact::new("abs_envelope");
    let z = artifact.push_variable("z", VarKind::Continuous, Bounds::new(0.0, upper));
    artifact.output = Some(z);

    artifact.push_row(
        "ge_pos",
        vec![(VarRef::Aux(z), 1.0), (VarRef::Model(x), -1.0)],
        ge(0.0),
    );
    artifact.push_row(
        "ge_neg",
        vec![(VarRef::Aux(z), 1.0), (VarRef::Model(x), 1.0)],
        ge(0.0),
    );
    artifact
}

/// Min/max envelope: `z` bounded by every operand on the binding side.
///
/// Sound only under objective pressure in the binding direction (minimized
/// for max-envelope, maximized for min-envelope); use
/// [`min_max_exact`] when downstream equality is required.
pub fn min_max_envelope(operands: &[(VariableId, Bounds)], kind: MinMaxKind) -> AuxiliaryArtifact {
    let mut artifact = AuxiliaryArtifact::new(match kind {
        MinMaxKind::Min => "min_envelope",
        MinMaxKind::Max => "max_envelope",
    });
    let z = artifact.push_variable("z", VarKind::Continuous, operand_hull(operands, kind));
    artifact.output = Some(z);

    for (operand, _) in operands {
        let (coeff, bounds) = match kind {
            // z <= x_i
            MinMaxKind::Min => (-1.0, le(0.0)),
            // z >= x_i
            MinMaxKind::Max => (-1.0, ge(0.0)),
        };
        artifact.push_row(
            "env",
            vec![(VarRef::Aux(z), 1.0), (VarRef::Model(*operand), coeff)],
            bounds,
        );
    }
    artifact
}

/// Exact min/max via Big-M selector binaries: the envelope rows plus
/// `z >= x_i - M(1-s_i)` (min) or `z <= x_i + M(1-s_i)` (max) with
/// `sum s_i = 1`, guaranteeing `z` equals one operand.
pub fn min_max_exact(
    operands: &[(VariableId, Bounds)],
    kind: MinMaxKind,
    big_m: f64,
) -> AuxiliaryArtifact {
    let m = derive_min_max_m(operands, big_m);

    let mut artifact = AuxiliaryArtifact::new(match kind {
        MinMaxKind::Min => "min_big_m",
        MinMaxKind::Max => "max_big_m",
    });
    let z = artifact.push_variable("z", VarKind::Continuous, operand_hull(operands, kind));
    artifact.output = Some(z);

    let selectors: Vec<usize> = operands
        .iter()
        .map(|_| artifact.push_variable("sel", VarKind::Binary, Bounds::new(0.0, 1.0)))
        .collect();

    let pick_one = selectors.iter().map(|s| (VarRef::Aux(*s), 1.0)).collect();
    artifact.push_row("pick_one", pick_one, eq(1.0));

    for ((operand, _), selector) in operands.iter().zip(&selectors) {
        match kind {
            MinMaxKind::Min => {
                // z <= x_i
                artifact.push_row(
                    "env",
                    vec![(VarRef::Aux(z), 1.0), (VarRef::Model(*operand), -1.0)],
                    le(0.0),
                );
                // z >= x_i - M(1-s_i)
                artifact.push_row(
                    "force",
                    vec![
                        (VarRef::Aux(z), 1.0),
                        (VarRef::Model(*operand), -1.0),
                        (VarRef::Aux(*selector), -m),
                    ],
                    ge(-m),
                );
            }
            MinMaxKind::Max => {
                artifact.push_row(
                    "env",
                    vec![(VarRef::Aux(z), 1.0), (VarRef::Model(*operand), -1.0)],
                    ge(0.0),
                );
                // z <= x_i + M(1-s_i)
                artifact.push_row(
                    "force",
                    vec![
                        (VarRef::Aux(z), 1.0),
                        (VarRef::Model(*operand), -1.0),
                        (VarRef::Aux(*selector), m),
                    ],
                    le(m),
                );
            }
        }
    }
    artifact
}

/// Indicator constraint via Big-M: deactivates the row when the trigger is
/// in the disarmed state. The first artifact row rewrites the source row in
/// place; equality bodies need a second, appended row.
pub fn indicator_big_m(
    body_terms: &[(VariableId, f64)],
    sense: ComparisonSense,
    rhs: f64,
    trigger: VariableId,
    when: bool,
    big_m: f64,
) -> AuxiliaryArtifact {
    let mut artifact = AuxiliaryArtifact::new("indicator_big_m");
    artifact.rewrites_source_row = true;

    let body: Vec<(VarRef, f64)> = body_terms
        .iter()
        .map(|(v, c)| (VarRef::Model(*v), *c))
        .collect();

    let with_trigger = |trigger_coeff: f64| -> Vec<(VarRef, f64)> {
        let mut terms = body.clone();
        terms.push((VarRef::Model(trigger), trigger_coeff));
        terms
    };

    // Armed at t=1: expr <= rhs + M(1-t)  ->  expr + M*t <= rhs + M
    // Armed at t=0: expr <= rhs + M*t     ->  expr - M*t <= rhs
    // (and mirrored for >=; equality emits both sides).
    match sense {
        ComparisonSense::LessEqual => {
            if when {
                artifact.push_row("relax_le", with_trigger(big_m), le(rhs + big_m));
            } else {
                artifact.push_row("relax_le", with_trigger(-big_m), le(rhs));
            }
        }
        ComparisonSense::GreaterEqual => {
            if when {
                artifact.push_row("relax_ge", with_trigger(-big_m), ge(rhs - big_m));
            } else {
                artifact.push_row("relax_ge", with_trigger(big_m), ge(rhs));
            }
        }
        ComparisonSense::Equal => {
            if when {
                artifact.push_row("relax_le", with_trigger(big_m), le(rhs + big_m));
                artifact.push_row("relax_ge", with_trigger(-big_m), ge(rhs - big_m));
            } else {
                artifact.push_row("relax_le", with_trigger(-big_m), le(rhs));
                artifact.push_row("relax_ge", with_trigger(big_m), ge(rhs));
            }
        }
    }
    artifact
}

/// Hull of the operand intervals on the side the min/max can reach.
fn operand_hull(operands: &[(VariableId, Bounds)], kind: MinMaxKind) -> Bounds {
    let mut lower = match kind {
        MinMaxKind::Min => f64::INFINITY,
        MinMaxKind::Max => f64::NEG_INFINITY,
    };
    let mut upper = lower;
    for (_, bounds) in operands {
        match kind {
            MinMaxKind::Min => {
                lower = lower.min(bounds.lower);
                upper = upper.min(bounds.upper);
            }
            MinMaxKind::Max => {
                lower = lower.max(bounds.lower);
                upper = upper.max(bounds.upper);
            }
        }
    }
    if operands.is_empty() {
        return Bounds::free();
    }
    Bounds::new(lower, upper)
}

/// Tighter M from the operand spread when every bound is finite.
fn derive_min_max_m(operands: &[(VariableId, Bounds)], big_m: f64) -> f64 {
    let mut lo = f64::INFINITY;
    let mut hi = f64::NEG_INFINITY;
    for (_, bounds) in operands {
        lo = lo.min(bounds.lower);
        hi = hi.max(bounds.upper);
    }
    let spread = hi - lo;
    if spread.is_finite() && spread > 0.0 {
        big_m.min(spread)
    } else {
        big_m
    }
}
