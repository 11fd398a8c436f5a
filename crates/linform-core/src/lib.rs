//! Model layer for linform: variables, expression-row constraints, and the
//! solver-capability boundary consumed by the linearization engine.

pub mod capability;
pub mod model;
pub mod types;

pub use capability::SolverCapability;
pub use model::{Model, ModelError};
pub use types::{
    Bounds, Constraint, IndicatorCondition, Objective, Sense, Sos2Group, VarKind, Variable,
};
