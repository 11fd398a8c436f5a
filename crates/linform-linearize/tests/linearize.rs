//! End-to-end linearization tests over whole models.

#![allow(clippy::float_cmp)]

use linform_core::{Bounds, Model, SolverCapability, Variable};
use linform_expr::expr::IndicatorExpr;
use linform_expr::{Expr, MinMaxKind, NonlinearTerm, SampleFn};
use linform_linearize::{
    linearize, LinearizeError, LinearizerConfig, LinearizerOptions, TermSite,
};

fn boxed(lo: f64, hi: f64) -> Variable {
    Variable::continuous(Bounds::new(lo, hi))
}

#[test]
fn mccormick_rewrites_a_continuous_product() {
    let mut model = Model::new();
    let x = model.add_variable(boxed(0.0, 4.0)).unwrap();
    let y = model.add_variable(boxed(1.0, 3.0)).unwrap();
    model.minimize(Expr::bilinear(x, y, 2.0)).unwrap();
    model.set_objective_name(Some("profit".to_string()));

    let out = linearize(
        &model,
        &SolverCapability::lp_only(),
        &LinearizerConfig::default(),
    )
    .unwrap();

    // One aux variable, four envelope rows, objective now linear in z.
    assert_eq!(out.stats.aux_variables, 1);
    assert_eq!(out.stats.aux_constraints, 4);
    assert_eq!(out.model.num_variables(), 3);
    assert_eq!(out.model.num_constraints(), 4);

    let objective = out.model.objective();
    assert!(objective.expr.is_linear());
    let z = out.artifacts[0].output.unwrap();
    assert_eq!(objective.expr.linear_terms(), &[(z, 2.0)]);
    assert_eq!(out.model.get_objective_name(), Some("profit"));

    // Tightened output bounds from the corner products of [0,4] x [1,3].
    let z_var = out.model.get_variable(z).unwrap();
    assert_eq!(z_var.bounds.lower, 0.0);
    assert_eq!(z_var.bounds.upper, 12.0);

    // Deterministic provenance naming and metadata.
    assert_eq!(
        out.model.get_variable_name(z),
        Some("obj[0]:mccormick:z0")
    );
    let meta = out.model.get_variable_metadata(z).unwrap();
    assert_eq!(meta["technique"], "mccormick");

    out.model.validate().unwrap();
}

#[test]
fn binary_product_uses_and_logic() {
    let mut model = Model::new();
    let a = model.add_variable(Variable::binary()).unwrap();
    let b = model.add_variable(Variable::binary()).unwrap();
    model.minimize(Expr::bilinear(a, b, 1.0)).unwrap();

    let out = linearize(
        &model,
        &SolverCapability::lp_only(),
        &LinearizerConfig::default(),
    )
    .unwrap();

    assert_eq!(out.stats.aux_variables, 1);
    assert_eq!(out.stats.aux_constraints, 3);
    assert_eq!(out.artifacts[0].technique, "and_logic");

    let z = out.artifacts[0].output.unwrap();
    assert_eq!(
        out.model.get_variable(z).unwrap().kind,
        linform_core::VarKind::Binary
    );
}

#[test]
fn quadratic_capability_passes_products_through() {
    let mut model = Model::new();
    let x = model.add_variable(Variable::free()).unwrap();
    let y = model.add_variable(Variable::free()).unwrap();
    model.minimize(Expr::bilinear(x, y, 1.0)).unwrap();

    let out = linearize(
        &model,
        &SolverCapability::miqp(),
        &LinearizerConfig::default(),
    )
    .unwrap();

    assert_eq!(out.stats.passed_through, 1);
    assert_eq!(out.stats.aux_variables, 0);
    assert!(out.artifacts.is_empty());
    assert_eq!(out.model.objective().expr.quadratic_terms().len(), 1);
}

#[test]
fn failures_are_aggregated_and_input_is_untouched() {
    let mut model = Model::new();
    let x = model.add_variable(Variable::free()).unwrap();
    let y = model.add_variable(Variable::free()).unwrap();
    // Unbounded continuous product (no McCormick box) in the objective,
    // plus an unhandled trilinear term in a constraint.
    model.minimize(Expr::bilinear(x, y, 1.0)).unwrap();
    model
        .add_row(Expr::trilinear(x, y, x, 1.0), Bounds::new(0.0, 1.0))
        .unwrap();

    let before = model.format_ascii();
    let errors = linearize(
        &model,
        &SolverCapability::lp_only(),
        &LinearizerConfig::default(),
    )
    .unwrap_err();

    assert_eq!(errors.len(), 2);
    assert_eq!(errors.failures[0].location.site, TermSite::Objective);
    assert!(matches!(
        errors.failures[0].error,
        LinearizeError::BoundsRequired { .. }
    ));
    assert!(matches!(
        &errors.failures[1].error,
        LinearizeError::UnrecognizedTerm { detail } if detail.contains("trilinear")
    ));

    let report = errors.to_string();
    assert!(report.contains("2 term(s)"));
    assert!(report.contains("obj[0]"));
    assert!(report.contains("c0[0]"));

    assert_eq!(model.format_ascii(), before);
}

#[test]
fn indicator_rewrites_in_place_with_configured_big_m() {
    let mut model = Model::new();
    let b = model.add_variable(Variable::binary()).unwrap();
    let x = model.add_variable(boxed(0.0, 100.0)).unwrap();
    // b = 1  =>  x <= 10
    let row = model
        .add_indicator_constraint(IndicatorExpr::new(b, true, Expr::var(x).le_scalar(10.0)))
        .unwrap();

    let config = LinearizerConfig::new(LinearizerOptions {
        big_m_value: 1000.0,
        ..Default::default()
    })
    .unwrap();
    let out = linearize(&model, &SolverCapability::milp(), &config).unwrap();

    // No new variables or constraints: the row is rewritten in place as
    // x + 1000*b <= 1010, equivalent to x <= 10 + 1000*(1 - b).
    assert_eq!(out.model.num_variables(), 2);
    assert_eq!(out.model.num_constraints(), 1);
    assert_eq!(out.stats.aux_variables, 0);
    assert_eq!(out.stats.aux_constraints, 0);

    let rewritten = out.model.get_constraint(row).unwrap();
    assert!(rewritten.indicator.is_none());
    assert_eq!(rewritten.bounds.upper, 1010.0);
    assert!(rewritten.bounds.lower.is_infinite());
    assert_eq!(rewritten.expr.linear_terms(), &[(x, 1.0), (b, 1000.0)]);

    // Natively capable solvers keep the indicator row untouched.
    let mut caps = SolverCapability::milp();
    caps.supports_indicator = true;
    let native = linearize(&model, &caps, &config).unwrap();
    assert!(native
        .model
        .get_constraint(row)
        .unwrap()
        .indicator
        .is_some());
    assert_eq!(native.stats.passed_through, 1);
}

#[test]
fn exact_min_uses_selector_binaries() {
    let mut model = Model::new();
    let x = model.add_variable(boxed(0.0, 10.0)).unwrap();
    let y = model.add_variable(boxed(0.0, 10.0)).unwrap();
    let term = NonlinearTerm::MinMax {
        operands: vec![x, y],
        kind: MinMaxKind::Min,
        exact: true,
        coeff: 1.0,
    };
    model.minimize(Expr::from_nonlinear(term).unwrap()).unwrap();

    let out = linearize(
        &model,
        &SolverCapability::milp(),
        &LinearizerConfig::default(),
    )
    .unwrap();

    // z + one selector per operand; pick-one + (envelope, force) per operand.
    assert_eq!(out.stats.aux_variables, 3);
    assert_eq!(out.stats.aux_constraints, 5);
    assert_eq!(out.artifacts[0].technique, "min_big_m");
    assert!(out.model.objective().expr.is_linear());
}

#[test]
fn envelope_min_adds_one_row_per_operand() {
    let mut model = Model::new();
    let x = model.add_variable(boxed(0.0, 10.0)).unwrap();
    let y = model.add_variable(boxed(2.0, 6.0)).unwrap();
    let term = NonlinearTerm::MinMax {
        operands: vec![x, y],
        kind: MinMaxKind::Min,
        exact: false,
        coeff: 1.0,
    };
    model.maximize(Expr::from_nonlinear(term).unwrap()).unwrap();

    let out = linearize(
        &model,
        &SolverCapability::lp_only(),
        &LinearizerConfig::default(),
    )
    .unwrap();

    assert_eq!(out.stats.aux_variables, 1);
    assert_eq!(out.stats.aux_constraints, 2);
    assert_eq!(out.artifacts[0].technique, "min_envelope");
}

#[test]
fn absolute_value_lower_envelope() {
    let mut model = Model::new();
    let x = model.add_variable(boxed(-5.0, 3.0)).unwrap();
    let term = NonlinearTerm::AbsoluteValue { x, coeff: 1.0 };
    model.minimize(Expr::from_nonlinear(term).unwrap()).unwrap();

    let out = linearize(
        &model,
        &SolverCapability::lp_only(),
        &LinearizerConfig::default(),
    )
    .unwrap();

    assert_eq!(out.stats.aux_variables, 1);
    assert_eq!(out.stats.aux_constraints, 2);
    let z = out.artifacts[0].output.unwrap();
    let z_var = out.model.get_variable(z).unwrap();
    assert_eq!(z_var.bounds.lower, 0.0);
    assert_eq!(z_var.bounds.upper, 5.0);
}

#[test]
fn piecewise_term_becomes_an_sos2_block() {
    let mut model = Model::new();
    let x = model.add_variable(boxed(0.0, 2.0)).unwrap();
    let term = NonlinearTerm::PiecewiseLinear {
        x,
        sample: SampleFn::new(|v| v * v),
        domain: None,
        method: None,
        segments: Some(4),
        coeff: 3.0,
    };
    model.minimize(Expr::from_nonlinear(term).unwrap()).unwrap();

    let out = linearize(
        &model,
        &SolverCapability::milp(),
        &LinearizerConfig::default(),
    )
    .unwrap();

    // 5 lambdas + output, 3 rows, one native SOS2 group.
    assert_eq!(out.stats.aux_variables, 6);
    assert_eq!(out.stats.aux_constraints, 3);
    assert_eq!(out.model.sos2_groups().len(), 1);
    assert_eq!(out.model.sos2_groups()[0].members.len(), 5);

    let z = out.artifacts[0].output.unwrap();
    assert_eq!(out.model.objective().expr.linear_terms(), &[(z, 3.0)]);
}

#[test]
fn aux_variable_ceiling_fails_the_crossing_term() {
    let mut model = Model::new();
    let x = model.add_variable(boxed(0.0, 1.0)).unwrap();
    let y = model.add_variable(boxed(0.0, 1.0)).unwrap();
    let expr = Expr::bilinear(x, y, 1.0).add(&Expr::bilinear(y, x, 1.0));
    model.minimize(expr).unwrap();

    let config = LinearizerConfig::new(LinearizerOptions {
        max_aux_variables: 1,
        ..Default::default()
    })
    .unwrap();
    let errors = linearize(&model, &SolverCapability::lp_only(), &config).unwrap_err();

    assert_eq!(errors.len(), 1);
    assert_eq!(errors.failures[0].location.slot, 1);
    assert_eq!(
        errors.failures[0].error,
        LinearizeError::ConfigLimitExceeded {
            resource: "variables",
            limit: 1,
            required: 2,
        }
    );
}

#[test]
fn linearization_is_deterministic() {
    let build = || {
        let mut model = Model::new();
        let x = model.add_variable(boxed(0.0, 4.0)).unwrap();
        let y = model.add_variable(boxed(1.0, 3.0)).unwrap();
        let b = model.add_variable(Variable::binary()).unwrap();
        let objective = Expr::bilinear(x, y, 1.0)
            .add(&Expr::from_nonlinear(NonlinearTerm::AbsoluteValue { x, coeff: 2.0 }).unwrap());
        model.minimize(objective).unwrap();
        model
            .add_indicator_constraint(IndicatorExpr::new(
                b,
                false,
                Expr::var(y).ge_scalar(2.0),
            ))
            .unwrap();
        model
            .add_row(Expr::bilinear(x, b, 1.0), Bounds::new(0.0, 2.0))
            .unwrap();
        model
    };

    let config = LinearizerConfig::default();
    let caps = SolverCapability::milp();
    let first = linearize(&build(), &caps, &config).unwrap();
    let second = linearize(&build(), &caps, &config).unwrap();

    assert_eq!(first.model.format_ascii(), second.model.format_ascii());
    assert_eq!(first.artifacts, second.artifacts);
    assert_eq!(first.stats, second.stats);

    // Re-linearizing an already linear model is a no-op.
    let again = linearize(&first.model, &caps, &config).unwrap();
    assert_eq!(again.stats.terms_scanned, 0);
    assert_eq!(again.model.format_ascii(), first.model.format_ascii());
}

#[test]
fn mixed_model_end_to_end() {
    let mut model = Model::new();
    let x = model.add_variable(boxed(0.0, 4.0)).unwrap();
    let y = model.add_variable(boxed(0.0, 4.0)).unwrap();
    let b = model.add_variable(Variable::binary()).unwrap();

    let objective = Expr::bilinear(x, y, 1.0).add(&Expr::term(x, 0.5));
    model.minimize(objective).unwrap();
    model
        .add_row(Expr::bilinear(b, x, 1.0), Bounds::new(0.0, 3.0))
        .unwrap();
    model
        .add_indicator_constraint(IndicatorExpr::new(
            b,
            true,
            Expr::var(y).le_scalar(1.0),
        ))
        .unwrap();

    let out = linearize(
        &model,
        &SolverCapability::milp(),
        &LinearizerConfig::default(),
    )
    .unwrap();

    assert_eq!(out.stats.terms_scanned, 3);
    // McCormick z + Big-M product z.
    assert_eq!(out.stats.aux_variables, 2);
    // 4 envelope + 4 product rows; the indicator rewrites in place.
    assert_eq!(out.stats.aux_constraints, 8);

    for (_, row) in out.model.constraints() {
        assert!(row.expr.is_linear());
        assert!(row.indicator.is_none());
    }
    assert!(out.model.objective().expr.is_linear());
    out.model.validate().unwrap();
}
