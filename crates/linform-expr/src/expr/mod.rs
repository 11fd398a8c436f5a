//! Expression types for optimization modeling.
//!
//! - `core`       — Expr: terms by degree + tagged nonlinear terms + constant
//! - `nonlinear`  — NonlinearTerm: the recognized nonlinear shapes
//! - `constraint` — ConstraintExpr / IndicatorExpr: expressions with a
//!   comparison sense and RHS, optionally gated by a binary trigger
//! - `error`      — Expression construction errors

pub mod constraint;
pub mod core;
pub mod error;
pub mod nonlinear;

pub use constraint::{ComparisonSense, ConstraintExpr, IndicatorExpr};
pub use core::Expr;
pub use error::ExprError;
pub use nonlinear::{BreakpointMethod, MinMaxKind, NonlinearTerm, SampleFn};
