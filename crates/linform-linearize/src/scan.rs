//! Term scanner: walks a model's objective and constraint rows and produces
//! an ordered worklist of every recognized (and unrecognized) nonlinear shape.
//!
//! The scanner is purely structural. It never decides whether linearization
//! is needed; the technique selector does that against the solver capability.

use linform_core::Model;
use linform_expr::ids::ConstraintId;
use linform_expr::{Expr, NonlinearTerm};

/// Where in the model a term was found.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TermSite {
    Objective,
    Constraint(ConstraintId),
}

impl TermSite {
    /// Short site label used in derived names and diagnostics.
    pub fn label(self) -> String {
        match self {
            TermSite::Objective => "obj".to_string(),
            TermSite::Constraint(id) => format!("c{id}"),
        }
    }
}

/// Exact position of a term: site plus slot within the site's expression.
///
/// Slots number quadratic terms first, then cubic, then tagged nonlinear
/// terms; a constraint-level indicator takes the slot after all of them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TermLocation {
    pub site: TermSite,
    pub slot: usize,
}

impl std::fmt::Display for TermLocation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}[{}]", self.site.label(), self.slot)
    }
}

/// Which underlying store the term came from, so the engine can remove it
/// without disturbing slots that come before it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum TermStore {
    Quadratic(usize),
    Nonlinear(usize),
    /// The term is the constraint row itself (indicator).
    Row,
}

/// A nonlinear shape found by the scanner.
#[derive(Debug, Clone)]
pub enum ScannedShape {
    Term(NonlinearTerm),
    /// Recognized as nonlinear but carrying no known technique
    /// (e.g. trilinear products).
    Unrecognized { detail: String },
}

/// One worklist entry: a shape and exactly where it occurs.
#[derive(Debug, Clone)]
pub struct ScannedTerm {
    pub location: TermLocation,
    pub shape: ScannedShape,
    pub(crate) store: TermStore,
}

/// Scan a model and return every nonlinear shape in deterministic order:
/// objective first, then constraints by ascending ID.
pub fn scan(model: &Model) -> Vec<ScannedTerm> {
    let mut found = Vec::new();

    scan_expr(&model.objective().expr, TermSite::Objective, &mut found);

    for (id, row) in model.constraints() {
        let site = TermSite::Constraint(id);
        let next_slot = scan_expr(&row.expr, site, &mut found);

        if let Some(cond) = row.indicator {
            let body = row.expr.clone();
            // The row's bounds encode sense and RHS; normalize to the
            // single-sided indicator shape the formulations consume.
            let (sense, rhs) = row_comparison(row.bounds);
            found.push(ScannedTerm {
                location: TermLocation {
                    site,
                    slot: next_slot,
                },
                shape: ScannedShape::Term(NonlinearTerm::Indicator {
                    trigger: cond.trigger,
                    when: cond.armed_when,
                    body,
                    sense,
                    rhs,
                }),
                store: TermStore::Row,
            });
        }
    }

    tracing::debug!(
        component = "linearize",
        operation = "scan",
        status = "success",
        terms = found.len(),
        "Scanned model for nonlinear terms"
    );

    found
}

/// Recover (sense, rhs) from row bounds. Indicator rows are single-sided or
/// equality by construction, so both-finite unequal bounds cannot occur here.
fn row_comparison(bounds: linform_core::Bounds) -> (linform_expr::ComparisonSense, f64) {
    use linform_expr::ComparisonSense;
    if bounds.lower == bounds.upper {
        (ComparisonSense::Equal, bounds.lower)
    } else if bounds.lower.is_finite() {
        (ComparisonSense::GreaterEqual, bounds.lower)
    } else {
        (ComparisonSense::LessEqual, bounds.upper)
    }
}

/// Scan one expression; returns the next free slot index.
fn scan_expr(expr: &Expr, site: TermSite, found: &mut Vec<ScannedTerm>) -> usize {
    let mut slot = 0;

    for (index, (a, b, coeff)) in expr.quadratic_terms().iter().enumerate() {
        found.push(ScannedTerm {
            location: TermLocation { site, slot },
            shape: ScannedShape::Term(NonlinearTerm::Bilinear {
                a: *a,
                b: *b,
                coeff: *coeff,
            }),
            store: TermStore::Quadratic(index),
        });
        slot += 1;
    }

    for (a, b, c, _) in expr.cubic_terms() {
        found.push(ScannedTerm {
            location: TermLocation { site, slot },
            shape: ScannedShape::Unrecognized {
                detail: format!("trilinear product x{a}*x{b}*x{c}"),
            },
            store: TermStore::Row,
        });
        slot += 1;
    }

    for (index, term) in expr.nonlinear_terms().iter().enumerate() {
        found.push(ScannedTerm {
            location: TermLocation { site, slot },
            shape: ScannedShape::Term(term.clone()),
            store: TermStore::Nonlinear(index),
        });
        slot += 1;
    }

    slot
}
