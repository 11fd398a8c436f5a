//! Linearization orchestrator.
//!
//! The pipeline is scan, select, formulate, commit, substitute, validate.
//! Formulation is planned for every term before anything touches the model:
//! if any term fails, the whole run fails with every failure reported and
//! the input model is returned untouched. Commitment then works on a clone,
//! so a failing run never leaves a half-rewritten model behind.

use std::collections::BTreeMap;

use linform_core::{Model, Objective, SolverCapability, Variable};
use linform_expr::ids::{ConstraintId, VariableId};
use linform_expr::{BreakpointMethod, Expr, NonlinearTerm, SampleFn};
use serde::Serialize;

use crate::artifact::{AuxiliaryArtifact, CommittedArtifact, VarRef};
use crate::breakpoints;
use crate::config::{LinearizerConfig, PwlMethod};
use crate::error::{LinearizationErrors, LinearizeError, TermFailure};
use crate::formulations;
use crate::pwl;
use crate::scan::{self, ScannedShape, TermLocation, TermSite, TermStore};
use crate::select::{self, Selection, Technique};

/// Counters describing one linearization run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct LinearizeStats {
    pub terms_scanned: usize,
    pub passed_through: usize,
    pub aux_variables: usize,
    pub aux_constraints: usize,
}

/// Output of a successful linearization run.
#[derive(Debug, Clone)]
pub struct LinearizedModel {
    pub model: Model,
    /// One entry per rewritten term, in scan order.
    pub artifacts: Vec<CommittedArtifact>,
    pub stats: LinearizeStats,
}

enum PlannedAction {
    Pass,
    Artifact(AuxiliaryArtifact),
}

struct PlannedTerm {
    location: TermLocation,
    store: TermStore,
    coeff: f64,
    action: PlannedAction,
}

/// Rewrite every nonlinear term the target solver cannot handle natively.
///
/// Either every term linearizes and the returned model validates, or the
/// aggregated failure report lists each term that could not be handled; the
/// input model is never modified.
pub fn linearize(
    model: &Model,
    capability: &SolverCapability,
    config: &LinearizerConfig,
) -> Result<LinearizedModel, LinearizationErrors> {
    if let Err(err) = model.validate() {
        return Err(input_failure(err));
    }

    let scanned = scan::scan(model);
    let terms_scanned = scanned.len();

    let mut failures: Vec<TermFailure> = Vec::new();
    let mut plan: Vec<PlannedTerm> = Vec::new();
    let mut passed_through = 0;
    let mut aux_variables = 0;
    let mut aux_constraints = 0;

    for scanned_term in scanned {
        let location = scanned_term.location;
        let selection = match select::select(&scanned_term.shape, model, capability, config) {
            Ok(selection) => selection,
            Err(error) => {
                failures.push(TermFailure { location, error });
                continue;
            }
        };

        let term = match scanned_term.shape {
            ScannedShape::Term(term) => term,
            // select() already rejected unrecognized shapes.
            ScannedShape::Unrecognized { .. } => continue,
        };

        match selection {
            Selection::PassThrough => {
                passed_through += 1;
                plan.push(PlannedTerm {
                    location,
                    store: scanned_term.store,
                    coeff: term.coeff(),
                    action: PlannedAction::Pass,
                });
            }
            Selection::Apply(technique) => {
                let artifact = match formulate(&term, technique, model, capability, config) {
                    Ok(artifact) => artifact,
                    Err(error) => {
                        failures.push(TermFailure { location, error });
                        continue;
                    }
                };

                let variables_after = aux_variables + artifact.num_variables();
                let constraints_after = aux_constraints + artifact.num_new_rows();
                if variables_after > config.max_aux_variables() {
                    failures.push(TermFailure {
                        location,
                        error: LinearizeError::ConfigLimitExceeded {
                            resource: "variables",
                            limit: config.max_aux_variables(),
                            required: variables_after,
                        },
                    });
                    continue;
                }
                if constraints_after > config.max_aux_constraints() {
                    failures.push(TermFailure {
                        location,
                        error: LinearizeError::ConfigLimitExceeded {
                            resource: "constraints",
                            limit: config.max_aux_constraints(),
                            required: constraints_after,
                        },
                    });
                    continue;
                }
                aux_variables = variables_after;
                aux_constraints = constraints_after;

                plan.push(PlannedTerm {
                    location,
                    store: scanned_term.store,
                    coeff: term.coeff(),
                    action: PlannedAction::Artifact(artifact),
                });
            }
        }
    }

    if !failures.is_empty() {
        return Err(LinearizationErrors::new(failures));
    }

    let mut out = model.clone();
    let mut committed: Vec<CommittedArtifact> = Vec::new();
    let mut substitutions: Vec<(TermSite, TermStore, VariableId, f64)> = Vec::new();

    for planned in &plan {
        let artifact = match &planned.action {
            PlannedAction::Pass => continue,
            PlannedAction::Artifact(artifact) => artifact,
        };
        let source_row = match planned.location.site {
            TermSite::Constraint(id) if artifact.rewrites_source_row => Some(id),
            _ => None,
        };
        let label = planned.location.to_string();
        let parts = match commit(&mut out, &label, artifact, source_row) {
            Ok(parts) => parts,
            Err(error) => {
                return Err(LinearizationErrors::new(vec![TermFailure {
                    location: planned.location,
                    error,
                }]));
            }
        };
        if let Some(output) = parts.output {
            substitutions.push((
                planned.location.site,
                planned.store,
                output,
                planned.coeff,
            ));
        }
        committed.push(CommittedArtifact {
            location: planned.location,
            technique: artifact.technique,
            output: parts.output,
            variables: parts.variables,
            constraints: parts.constraints,
        });
    }

    if let Err(err) = substitute(&mut out, substitutions) {
        return Err(input_failure(err));
    }
    if let Err(err) = out.validate() {
        return Err(input_failure(err));
    }

    let stats = LinearizeStats {
        terms_scanned,
        passed_through,
        aux_variables,
        aux_constraints,
    };
    tracing::debug!(
        component = "linearize",
        operation = "linearize",
        status = "success",
        terms = stats.terms_scanned,
        passed_through = stats.passed_through,
        aux_variables = stats.aux_variables,
        aux_constraints = stats.aux_constraints,
        "Linearized model"
    );

    Ok(LinearizedModel {
        model: out,
        artifacts: committed,
        stats,
    })
}

fn input_failure(error: impl Into<LinearizeError>) -> LinearizationErrors {
    LinearizationErrors::new(vec![TermFailure {
        location: TermLocation {
            site: TermSite::Objective,
            slot: 0,
        },
        error: error.into(),
    }])
}

/// Build the artifact for one term under the chosen technique.
fn formulate(
    term: &NonlinearTerm,
    technique: Technique,
    model: &Model,
    capability: &SolverCapability,
    config: &LinearizerConfig,
) -> Result<AuxiliaryArtifact, LinearizeError> {
    match (technique, term) {
        (Technique::AndLogic, NonlinearTerm::Bilinear { a, b, .. }) => {
            Ok(formulations::and_logic(*a, *b))
        }
        (Technique::BigMProduct, NonlinearTerm::Bilinear { a, b, .. }) => {
            let a_var = model.get_variable(*a)?;
            let (switch, x) = if a_var.kind == linform_core::VarKind::Binary {
                (*a, *b)
            } else {
                (*b, *a)
            };
            let x_bounds = model.get_variable(x)?.bounds;
            formulations::big_m_product(switch, x, x_bounds)
        }
        (Technique::McCormick, NonlinearTerm::Bilinear { a, b, .. }) => {
            let a_bounds = model.get_variable(*a)?.bounds;
            let b_bounds = model.get_variable(*b)?.bounds;
            formulations::mccormick(
                *a,
                *b,
                a_bounds,
                b_bounds,
                config.mccormick_tighten_bounds(),
            )
        }
        (Technique::AbsEnvelope, NonlinearTerm::AbsoluteValue { x, .. }) => {
            let x_bounds = model.get_variable(*x)?.bounds;
            Ok(formulations::absolute_value(*x, x_bounds))
        }
        (Technique::MinMaxEnvelope, NonlinearTerm::MinMax { operands, kind, .. }) => {
            let boxed = operand_bounds(operands, model)?;
            Ok(formulations::min_max_envelope(&boxed, *kind))
        }
        (Technique::MinMaxBigM, NonlinearTerm::MinMax { operands, kind, .. }) => {
            let boxed = operand_bounds(operands, model)?;
            Ok(formulations::min_max_exact(
                &boxed,
                *kind,
                config.big_m_value(),
            ))
        }
        (
            Technique::IndicatorBigM,
            NonlinearTerm::Indicator {
                trigger,
                when,
                body,
                sense,
                rhs,
            },
        ) => {
            let terms = body.normalized_terms();
            Ok(formulations::indicator_big_m(
                &terms,
                *sense,
                rhs - body.constant(),
                *trigger,
                *when,
                config.big_m_value(),
            ))
        }
        (
            Technique::Piecewise(encoding),
            NonlinearTerm::PiecewiseLinear {
                x,
                sample,
                domain,
                method,
                segments,
                ..
            },
        ) => {
            let domain = select::pwl_domain(*x, *domain, model, config)?;
            let segments = segments.unwrap_or_else(|| config.pwl_num_segments());
            let method = method.unwrap_or_else(|| config.breakpoint_method());
            build_pwl(*x, sample, domain, segments, method, encoding, capability)
        }
        (technique, term) => Err(LinearizeError::UnrecognizedTerm {
            detail: format!(
                "{} term routed to incompatible technique {}",
                term.shape(),
                technique.as_str()
            ),
        }),
    }
}

fn operand_bounds(
    operands: &[VariableId],
    model: &Model,
) -> Result<Vec<(VariableId, linform_core::Bounds)>, LinearizeError> {
    operands
        .iter()
        .map(|id| Ok((*id, model.get_variable(*id)?.bounds)))
        .collect()
}

fn build_pwl(
    x: VariableId,
    sample: &SampleFn,
    domain: (f64, f64),
    segments: usize,
    method: BreakpointMethod,
    encoding: PwlMethod,
    capability: &SolverCapability,
) -> Result<AuxiliaryArtifact, LinearizeError> {
    let grid = breakpoints::generate(domain, sample, segments, method);
    encode_grid(x, sample, &grid, encoding, capability)
}

fn encode_grid(
    x: VariableId,
    sample: &SampleFn,
    grid: &[f64],
    encoding: PwlMethod,
    capability: &SolverCapability,
) -> Result<AuxiliaryArtifact, LinearizeError> {
    let values: Vec<f64> = grid.iter().map(|p| sample.eval(*p)).collect();
    if values.iter().any(|v| !v.is_finite()) {
        return Err(LinearizeError::DomainRequired { variable: x });
    }
    Ok(match encoding {
        PwlMethod::Sos2 => pwl::encode_sos2(x, grid, &values, capability.supports_sos2),
        PwlMethod::Incremental => pwl::encode_incremental(x, grid, &values),
    })
}

/// Approximate `f(x)` directly into a model, returning the output variable.
/// Backs the nonlinear function library.
pub(crate) fn approximate_function(
    model: &mut Model,
    x: VariableId,
    sample: &SampleFn,
    domain: (f64, f64),
    segments: usize,
    method: BreakpointMethod,
    capability: &SolverCapability,
    config: &LinearizerConfig,
) -> Result<VariableId, LinearizeError> {
    let grid = breakpoints::generate(domain, sample, segments, method);
    approximate_on_grid(model, x, sample, &grid, capability, config)
}

/// Like [`approximate_function`], but over caller-chosen breakpoints, so
/// library functions can pin a breakpoint on a known kink.
pub(crate) fn approximate_on_grid(
    model: &mut Model,
    x: VariableId,
    sample: &SampleFn,
    grid: &[f64],
    capability: &SolverCapability,
    config: &LinearizerConfig,
) -> Result<VariableId, LinearizeError> {
    let artifact = encode_grid(x, sample, grid, config.pwl_method(), capability)?;
    // The current variable count keeps repeated approximations of the same
    // variable from sharing auxiliary names.
    let label = format!("x{x}_{}", model.num_variables());
    let parts = commit(model, &label, &artifact, None)?;
    match parts.output {
        Some(output) => Ok(output),
        None => Err(LinearizeError::UnrecognizedTerm {
            detail: "piecewise approximation produced no output variable".to_string(),
        }),
    }
}

struct CommittedParts {
    variables: Vec<VariableId>,
    constraints: Vec<ConstraintId>,
    output: Option<VariableId>,
}

/// Allocate an artifact's variables and rows in the model, with
/// deterministic names and provenance metadata.
fn commit(
    model: &mut Model,
    label: &str,
    artifact: &AuxiliaryArtifact,
    source_row: Option<ConstraintId>,
) -> Result<CommittedParts, LinearizeError> {
    let technique = artifact.technique;
    let provenance = serde_json::json!({
        "linearized_from": label,
        "technique": technique,
    });

    let mut variables = Vec::with_capacity(artifact.variables.len());
    for (index, spec) in artifact.variables.iter().enumerate() {
        let id = model.add_variable(Variable {
            kind: spec.kind,
            bounds: spec.bounds,
        })?;
        model.annotate_variable(
            id,
            format!("{label}:{technique}:{}{index}", spec.role),
            provenance.clone(),
        )?;
        variables.push(id);
    }

    let resolve = |var_ref: VarRef| match var_ref {
        VarRef::Model(id) => id,
        VarRef::Aux(index) => variables[index],
    };

    let mut constraints = Vec::with_capacity(artifact.rows.len());
    for (index, row) in artifact.rows.iter().enumerate() {
        let terms: Vec<(VariableId, f64)> =
            row.terms.iter().map(|(r, c)| (resolve(*r), *c)).collect();
        let expr = Expr::from_linear(terms);

        if index == 0 && artifact.rewrites_source_row {
            if let Some(id) = source_row {
                // Rewriting strips the indicator condition; the Big-M terms
                // now encode it. The row keeps its ID and name.
                model.replace_row(id, expr, row.bounds, None)?;
                model.set_constraint_metadata(id, provenance.clone())?;
                constraints.push(id);
                continue;
            }
        }

        let id = model.add_row(expr, row.bounds)?;
        model.annotate_constraint(
            id,
            format!("{label}:{technique}:{}{index}", row.role),
            provenance.clone(),
        )?;
        constraints.push(id);
    }

    for (index, spec) in artifact.sos2.iter().enumerate() {
        let members = spec.members.iter().map(|r| resolve(*r)).collect();
        model.add_sos2_group(
            members,
            spec.weights.clone(),
            Some(format!("{label}:{technique}:sos2_{index}")),
        )?;
    }

    let output = artifact.output.map(|index| variables[index]);
    Ok(CommittedParts {
        variables,
        constraints,
        output,
    })
}

/// Replace each rewritten term with its output variable, scaled by the
/// term's coefficient.
///
/// Removals happen per expression in descending store order so earlier
/// indices stay valid; the linear pushes land afterwards.
fn substitute(
    model: &mut Model,
    substitutions: Vec<(TermSite, TermStore, VariableId, f64)>,
) -> Result<(), linform_core::ModelError> {
    let mut by_site: BTreeMap<Option<ConstraintId>, Vec<(TermStore, VariableId, f64)>> =
        BTreeMap::new();
    for (site, store, output, coeff) in substitutions {
        let key = match site {
            TermSite::Objective => None,
            TermSite::Constraint(id) => Some(id),
        };
        by_site.entry(key).or_default().push((store, output, coeff));
    }

    for (key, mut entries) in by_site {
        entries.sort_by(|a, b| store_order(b.0).cmp(&store_order(a.0)));

        match key {
            None => {
                let objective = model.objective().clone();
                let mut expr = objective.expr;
                apply_substitutions(&mut expr, &entries);
                let name = model.get_objective_name().map(String::from);
                model.set_objective(Objective {
                    sense: objective.sense,
                    expr,
                })?;
                model.set_objective_name(name);
            }
            Some(id) => {
                let row = model.get_constraint(id)?.clone();
                let mut expr = row.expr;
                apply_substitutions(&mut expr, &entries);
                model.replace_row(id, expr, row.bounds, row.indicator)?;
            }
        }
    }
    Ok(())
}

/// Total order over stores: nonlinear entries first (highest index first),
/// then quadratic. Row-store entries never carry an output.
fn store_order(store: TermStore) -> (u8, usize) {
    match store {
        TermStore::Quadratic(index) => (0, index),
        TermStore::Nonlinear(index) => (1, index),
        TermStore::Row => (2, 0),
    }
}

fn apply_substitutions(expr: &mut Expr, entries: &[(TermStore, VariableId, f64)]) {
    for (store, output, coeff) in entries {
        let removed = match store {
            TermStore::Quadratic(index) => expr.take_quadratic(*index).is_some(),
            TermStore::Nonlinear(index) => expr.take_nonlinear(*index).is_some(),
            TermStore::Row => false,
        };
        if removed {
            expr.push_linear(*output, *coeff);
        }
    }
}
