//! Piecewise-linear encodings over a fixed breakpoint grid.
//!
//! Both encoders take breakpoints and the sampled function values at those
//! breakpoints, and return an artifact whose output variable tracks the
//! interpolant of the function at `x`.

use linform_core::{Bounds, VarKind};
use linform_expr::ids::VariableId;

use crate::artifact::{AuxiliaryArtifact, Sos2Spec, VarRef};

/// Lambda (convex-combination) encoding.
///
/// One weight per breakpoint, summing to one, with `x` and the output bound
/// to the weighted breakpoints and values. With native SOS2 support the
/// weights are declared as an SOS2 set; otherwise adjacency is emulated with
/// one segment binary per interval.
pub fn encode_sos2(
    x: VariableId,
    breakpoints: &[f64],
    values: &[f64],
    native_sos2: bool,
) -> AuxiliaryArtifact {
    let num_points = breakpoints.len();
    let num_segments = num_points - 1;

    let mut artifact = AuxiliaryArtifact::new(if native_sos2 {
        "pwl_sos2"
    } else {
        "pwl_sos2_binary"
    });

    let lambdas: Vec<usize> = (0..num_points)
        .map(|_| artifact.push_variable("lam", VarKind::Continuous, Bounds::new(0.0, 1.0)))
        .collect();
    let y = artifact.push_variable("y", VarKind::Continuous, value_hull(values));
    artifact.output = Some(y);

    let convexity = lambdas.iter().map(|l| (VarRef::Aux(*l), 1.0)).collect();
    artifact.push_row("convexity", convexity, Bounds::new(1.0, 1.0));

    let mut bind_x = vec![(VarRef::Model(x), 1.0)];
    for (lambda, bp) in lambdas.iter().zip(breakpoints) {
        bind_x.push((VarRef::Aux(*lambda), -bp));
    }
    artifact.push_row("bind_x", bind_x, Bounds::new(0.0, 0.0));

    let mut bind_y = vec![(VarRef::Aux(y), 1.0)];
    for (lambda, value) in lambdas.iter().zip(values) {
        bind_y.push((VarRef::Aux(*lambda), -value));
    }
    artifact.push_row("bind_y", bind_y, Bounds::new(0.0, 0.0));

    if native_sos2 {
        artifact.sos2.push(Sos2Spec {
            members: lambdas.iter().map(|l| VarRef::Aux(*l)).collect(),
            weights: breakpoints.to_vec(),
        });
    } else {
        // Emulated adjacency: one binary per segment, and each lambda may
        // be nonzero only when an adjacent segment is active.
        let segments: Vec<usize> = (0..num_segments)
            .map(|_| artifact.push_variable("seg", VarKind::Binary, Bounds::new(0.0, 1.0)))
            .collect();

        let pick = segments.iter().map(|s| (VarRef::Aux(*s), 1.0)).collect();
        artifact.push_row("pick_segment", pick, Bounds::new(1.0, 1.0));

        for (i, lambda) in lambdas.iter().enumerate() {
            let mut adjacency = vec![(VarRef::Aux(*lambda), 1.0)];
            if i > 0 {
                adjacency.push((VarRef::Aux(segments[i - 1]), -1.0));
            }
            if i < num_segments {
                adjacency.push((VarRef::Aux(segments[i]), -1.0));
            }
            artifact.push_row("adjacency", adjacency, Bounds::new(f64::NEG_INFINITY, 0.0));
        }
    }
    artifact
}

/// Incremental (delta) encoding.
///
/// One delta per segment filling left to right, with fill order enforced by
/// binaries: a segment may take value only when the previous one is full.
pub fn encode_incremental(
    x: VariableId,
    breakpoints: &[f64],
    values: &[f64],
) -> AuxiliaryArtifact {
    let num_segments = breakpoints.len() - 1;

    let mut artifact = AuxiliaryArtifact::new("pwl_incremental");
    let y = artifact.push_variable("y", VarKind::Continuous, value_hull(values));
    artifact.output = Some(y);

    let widths: Vec<f64> = breakpoints.windows(2).map(|w| w[1] - w[0]).collect();
    let slopes: Vec<f64> = values
        .windows(2)
        .zip(&widths)
        .map(|(v, w)| (v[1] - v[0]) / w)
        .collect();

    let deltas: Vec<usize> = widths
        .iter()
        .map(|w| artifact.push_variable("delta", VarKind::Continuous, Bounds::new(0.0, *w)))
        .collect();
    let fills: Vec<usize> = (0..num_segments.saturating_sub(1))
        .map(|_| artifact.push_variable("fill", VarKind::Binary, Bounds::new(0.0, 1.0)))
        .collect();

    // x = bp_0 + sum(delta_i)
    let mut bind_x = vec![(VarRef::Model(x), 1.0)];
    for delta in &deltas {
        bind_x.push((VarRef::Aux(*delta), -1.0));
    }
    artifact.push_row("bind_x", bind_x, Bounds::new(breakpoints[0], breakpoints[0]));

    // y = v_0 + sum(slope_i * delta_i)
    let mut bind_y = vec![(VarRef::Aux(y), 1.0)];
    for (delta, slope) in deltas.iter().zip(&slopes) {
        bind_y.push((VarRef::Aux(*delta), -slope));
    }
    artifact.push_row("bind_y", bind_y, Bounds::new(values[0], values[0]));

    // delta_{i+1} <= w_{i+1} * s_i  and  delta_i >= w_i * s_i
    for (i, fill) in fills.iter().enumerate() {
        artifact.push_row(
            "fill_next",
            vec![
                (VarRef::Aux(deltas[i + 1]), 1.0),
                (VarRef::Aux(*fill), -widths[i + 1]),
            ],
            Bounds::new(f64::NEG_INFINITY, 0.0),
        );
        artifact.push_row(
            "fill_prev",
            vec![
                (VarRef::Aux(deltas[i]), 1.0),
                (VarRef::Aux(*fill), -widths[i]),
            ],
            Bounds::new(0.0, f64::INFINITY),
        );
    }
    artifact
}

fn value_hull(values: &[f64]) -> Bounds {
    let lower = values.iter().copied().fold(f64::INFINITY, f64::min);
    let upper = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    Bounds::new(lower, upper)
}
