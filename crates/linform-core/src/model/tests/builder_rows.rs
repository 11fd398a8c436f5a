use super::support::{bounded_continuous, unbounded_continuous};
use crate::model::ModelError;
use crate::types::{Bounds, Sense, VarKind, Variable};
use crate::Model;
use linform_expr::{Expr, VariableId};

#[test]
fn test_add_variable_assigns_sequential_ids() {
    let mut model = Model::new();
    let a = model.add_variable(bounded_continuous(0.0, 1.0)).unwrap();
    let b = model.add_variable(unbounded_continuous()).unwrap();
    assert_eq!(a.inner(), 0);
    assert_eq!(b.inner(), 1);
}

#[test]
fn test_add_variable_rejects_inverted_bounds() {
    let mut model = Model::new();
    let err = model.add_variable(bounded_continuous(2.0, 1.0)).unwrap_err();
    assert_eq!(err.code(), "VARIABLE_INVALID_BOUNDS");
}

#[test]
fn test_add_variable_rejects_binary_with_wide_bounds() {
    let mut model = Model::new();
    let err = model
        .add_variable(Variable {
            kind: VarKind::Binary,
            bounds: Bounds::new(0.0, 2.0),
        })
        .unwrap_err();
    assert_eq!(err.code(), "VARIABLE_INVALID_BINARY_BOUNDS");
}

#[test]
fn test_add_row_rejects_unknown_variable() {
    let mut model = Model::new();
    let err = model
        .add_row(Expr::var(VariableId::new(42)), Bounds::new(0.0, 1.0))
        .unwrap_err();
    assert_eq!(err, ModelError::InvalidVariableId(VariableId::new(42)));
}

#[test]
fn test_constraint_expr_folds_into_row_bounds() {
    let mut model = Model::new();
    let x = model.add_variable(bounded_continuous(0.0, 10.0)).unwrap();
    let id = model
        .add_constraint_expr(Expr::var(x).add_constant(3.0).le_scalar(10.0))
        .unwrap();

    let row = model.get_constraint(id).unwrap();
    assert!(row.bounds.lower.is_infinite());
    assert_eq!(row.bounds.upper, 7.0); // 10 - 3
    assert_eq!(row.expr.constant(), 0.0);
}

#[test]
fn test_single_objective_enforced() {
    let mut model = Model::new();
    let x = model.add_variable(bounded_continuous(0.0, 1.0)).unwrap();
    model.minimize(Expr::var(x)).unwrap();
    assert_eq!(model.objective().sense, Some(Sense::Minimize));

    let err = model.maximize(Expr::var(x)).unwrap_err();
    assert_eq!(err, ModelError::MultipleObjectives);
}

#[test]
fn test_validate_accepts_consistent_model() {
    let mut model = Model::new();
    let x = model.add_variable(bounded_continuous(0.0, 5.0)).unwrap();
    let y = model.add_variable(bounded_continuous(0.0, 5.0)).unwrap();
    model
        .add_row(Expr::bilinear(x, y, 1.0), Bounds::new(0.0, 4.0))
        .unwrap();
    model.minimize(Expr::var(x)).unwrap();
    assert!(model.validate().is_ok());
}

#[test]
fn test_sos2_group_requires_matching_weights() {
    let mut model = Model::new();
    let a = model.add_variable(bounded_continuous(0.0, 1.0)).unwrap();
    let b = model.add_variable(bounded_continuous(0.0, 1.0)).unwrap();

    let err = model
        .add_sos2_group(vec![a, b], vec![0.0], None)
        .unwrap_err();
    assert_eq!(err.code(), "SOS2_INVALID_GROUP");

    let index = model
        .add_sos2_group(vec![a, b], vec![0.0, 1.0], Some("grp".into()))
        .unwrap();
    assert_eq!(index, 0);
    assert_eq!(model.sos2_groups().len(), 1);
}
