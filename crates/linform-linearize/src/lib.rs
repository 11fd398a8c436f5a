//! Linearization engine: rewrites the nonlinear terms of a model into
//! mixed-integer-linear structure, driven by what the target solver
//! supports natively.
//!
//! The entry point is [`linearize`]: scan the model for nonlinear shapes,
//! select a technique per term against the [`SolverCapability`], formulate
//! auxiliary variables and rows, then commit everything onto a copy of the
//! model with deterministic names and provenance metadata. Failures are
//! aggregated across all terms; a failing run never returns a partially
//! rewritten model.
//!
//! # Module Organization
//!
//! - [`scan`](fn@scan): term discovery in deterministic order
//! - [`select`](fn@select): technique selection per shape
//! - [`formulations`]: closed-form rewrites (McCormick, Big-M, envelopes)
//! - [`breakpoints`]: uniform, adaptive, and seeded breakpoint placement
//! - [`pwl`]: SOS2 and incremental piecewise-linear encodings
//! - [`NonlinearFunctions`]: piecewise library of common functions
//!
//! [`SolverCapability`]: linform_core::SolverCapability

mod artifact;
pub mod breakpoints;
mod config;
mod engine;
mod error;
pub mod formulations;
mod functions;
pub mod pwl;
mod scan;
mod select;

pub use artifact::{AuxRow, AuxVarSpec, AuxiliaryArtifact, CommittedArtifact, Sos2Spec, VarRef};
pub use config::{BilinearMethod, ConfigError, LinearizerConfig, LinearizerOptions, PwlMethod};
pub use engine::{linearize, LinearizeStats, LinearizedModel};
pub use error::{LinearizationErrors, LinearizeError, TermFailure};
pub use functions::{FunctionOptions, NonlinearFunctions};
pub use scan::{scan, ScannedShape, ScannedTerm, TermLocation, TermSite};
pub use select::{select, Selection, Technique};
