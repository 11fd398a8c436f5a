//! Human-readable ASCII model formatting.
//!
//! Rendering is fully deterministic: maps iterate in ID order and floats use
//! the default `Display`. Two structurally identical models therefore render
//! to byte-identical text, which is what the engine's determinism tests diff.

use std::fmt::Write as _;

use linform_expr::{Expr, MinMaxKind, NonlinearTerm};

use crate::model::Model;
use crate::types::Bounds;

impl Model {
    /// Render the model to ASCII.
    pub fn format_ascii(&self) -> String {
        let mut out = String::new();

        match self.objective.sense {
            Some(sense) => {
                let _ = write!(out, "{}: ", sense.as_str());
                let _ = writeln!(out, "{}", render_expr(&self.objective.expr));
            }
            None => {
                let _ = writeln!(out, "(no objective)");
            }
        }

        let _ = writeln!(out, "s.t.");
        for (id, row) in self.constraints() {
            let label = match self.get_constraint_name(id) {
                Some(name) => format!("c{id} ({name})"),
                None => format!("c{id}"),
            };
            let gate = match row.indicator {
                Some(cond) => format!(
                    "x{} = {} -> ",
                    cond.trigger,
                    if cond.armed_when { 1 } else { 0 }
                ),
                None => String::new(),
            };
            let _ = writeln!(
                out,
                "  {label}: {gate}{}",
                render_row(&row.expr, row.bounds)
            );
        }

        let _ = writeln!(out, "vars:");
        for (id, var) in self.variables() {
            let name = match self.get_variable_name(id) {
                Some(name) => format!(" ({name})"),
                None => String::new(),
            };
            let _ = writeln!(
                out,
                "  x{id}: {} [{}, {}]{name}",
                var.kind.as_str(),
                var.bounds.lower,
                var.bounds.upper
            );
        }

        if !self.sos2_groups.is_empty() {
            let _ = writeln!(out, "sos2:");
            for (index, group) in self.sos2_groups.iter().enumerate() {
                let members = group
                    .members
                    .iter()
                    .map(|m| format!("x{m}"))
                    .collect::<Vec<_>>()
                    .join(" ");
                let label = match &group.name {
                    Some(name) => format!("s{index} ({name})"),
                    None => format!("s{index}"),
                };
                let _ = writeln!(out, "  {label}: {members}");
            }
        }

        out
    }
}

fn render_row(expr: &Expr, bounds: Bounds) -> String {
    let body = render_expr(expr);
    let lower_finite = bounds.lower.is_finite();
    let upper_finite = bounds.upper.is_finite();
    match (lower_finite, upper_finite) {
        (true, true) if bounds.lower == bounds.upper => format!("{body} = {}", bounds.lower),
        (true, true) => format!("{} <= {body} <= {}", bounds.lower, bounds.upper),
        (false, true) => format!("{body} <= {}", bounds.upper),
        (true, false) => format!("{body} >= {}", bounds.lower),
        (false, false) => format!("{body} free"),
    }
}

fn render_expr(expr: &Expr) -> String {
    let mut parts: Vec<String> = Vec::new();

    for (var_id, coeff) in expr.linear_terms() {
        parts.push(format!("{coeff} x{var_id}"));
    }
    for (a, b, coeff) in expr.quadratic_terms() {
        parts.push(format!("{coeff} x{a}*x{b}"));
    }
    for (a, b, c, coeff) in expr.cubic_terms() {
        parts.push(format!("{coeff} x{a}*x{b}*x{c}"));
    }
    for term in expr.nonlinear_terms() {
        parts.push(render_nonlinear(term));
    }
    if expr.constant() != 0.0 || parts.is_empty() {
        parts.push(format!("{}", expr.constant()));
    }

    parts.join(" + ")
}

fn render_nonlinear(term: &NonlinearTerm) -> String {
    match term {
        NonlinearTerm::Bilinear { a, b, coeff } => format!("{coeff} x{a}*x{b}"),
        NonlinearTerm::AbsoluteValue { x, coeff } => format!("{coeff} |x{x}|"),
        NonlinearTerm::MinMax {
            operands,
            kind,
            coeff,
            ..
        } => {
            let inner = operands
                .iter()
                .map(|v| format!("x{v}"))
                .collect::<Vec<_>>()
                .join(", ");
            let name = match kind {
                MinMaxKind::Min => "min",
                MinMaxKind::Max => "max",
            };
            format!("{coeff} {name}({inner})")
        }
        NonlinearTerm::PiecewiseLinear { x, coeff, .. } => format!("{coeff} pwl(x{x})"),
        NonlinearTerm::Indicator { trigger, .. } => format!("indicator(x{trigger})"),
    }
}
