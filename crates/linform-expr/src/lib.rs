//! Expression layer for linform optimization models.
//!
//! - `ids`  — newtype identifiers for variables and constraints
//! - `expr` — linear/bilinear expressions, tagged nonlinear terms,
//!   constraint and indicator expressions

pub mod expr;
pub mod ids;

pub use expr::{
    BreakpointMethod, ComparisonSense, ConstraintExpr, Expr, ExprError, IndicatorExpr, MinMaxKind,
    NonlinearTerm, SampleFn,
};
pub use ids::{ConstraintId, VariableId};
