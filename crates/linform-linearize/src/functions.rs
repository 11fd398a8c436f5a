//! Library of common nonlinear functions, applied to a model as piecewise
//! approximations.
//!
//! Each function carries a builtin approximation domain and segment count
//! tuned to its shape. The domain is resolved in precedence order: an
//! explicit option, then the variable's finite bounds, then the builtin
//! default.

use std::f64::consts::PI;

use linform_core::{Model, SolverCapability};
use linform_expr::ids::VariableId;
use linform_expr::{BreakpointMethod, SampleFn};

use crate::config::LinearizerConfig;
use crate::engine;
use crate::error::LinearizeError;

/// Per-call overrides for the function library.
#[derive(Debug, Clone, Copy, Default)]
pub struct FunctionOptions {
    /// Approximation interval; falls back to the variable's bounds, then
    /// the function's builtin default.
    pub domain: Option<(f64, f64)>,
    /// Segment count; falls back to the function's builtin default.
    pub segments: Option<usize>,
    /// Breakpoint placement; falls back to the function's builtin default.
    pub method: Option<BreakpointMethod>,
}

/// Builtin shape profile for one library function.
struct Profile {
    domain: (f64, f64),
    segments: usize,
    method: BreakpointMethod,
}

/// Piecewise approximations of common univariate functions.
///
/// Every method adds the encoding to the model and returns the output
/// variable tracking `f(x)`.
pub struct NonlinearFunctions;

impl NonlinearFunctions {
    pub fn exp(
        model: &mut Model,
        x: VariableId,
        capability: &SolverCapability,
        config: &LinearizerConfig,
        options: FunctionOptions,
    ) -> Result<VariableId, LinearizeError> {
        let profile = Profile {
            domain: (-5.0, 5.0),
            segments: 24,
            method: BreakpointMethod::Adaptive,
        };
        approximate(
            model,
            x,
            SampleFn::new(f64::exp),
            Some(profile),
            capability,
            config,
            options,
        )
    }

    /// Natural log; the builtin domain stays clear of the singularity at 0.
    pub fn log(
        model: &mut Model,
        x: VariableId,
        capability: &SolverCapability,
        config: &LinearizerConfig,
        options: FunctionOptions,
    ) -> Result<VariableId, LinearizeError> {
        let profile = Profile {
            domain: (0.01, 10.0),
            segments: 24,
            method: BreakpointMethod::Adaptive,
        };
        approximate(
            model,
            x,
            SampleFn::new(f64::ln),
            Some(profile),
            capability,
            config,
            options,
        )
    }

    pub fn sin(
        model: &mut Model,
        x: VariableId,
        capability: &SolverCapability,
        config: &LinearizerConfig,
        options: FunctionOptions,
    ) -> Result<VariableId, LinearizeError> {
        let profile = Profile {
            domain: (-PI, PI),
            segments: 16,
            method: BreakpointMethod::Uniform,
        };
        approximate(
            model,
            x,
            SampleFn::new(f64::sin),
            Some(profile),
            capability,
            config,
            options,
        )
    }

    pub fn cos(
        model: &mut Model,
        x: VariableId,
        capability: &SolverCapability,
        config: &LinearizerConfig,
        options: FunctionOptions,
    ) -> Result<VariableId, LinearizeError> {
        let profile = Profile {
            domain: (-PI, PI),
            segments: 16,
            method: BreakpointMethod::Uniform,
        };
        approximate(
            model,
            x,
            SampleFn::new(f64::cos),
            Some(profile),
            capability,
            config,
            options,
        )
    }

    pub fn sqrt(
        model: &mut Model,
        x: VariableId,
        capability: &SolverCapability,
        config: &LinearizerConfig,
        options: FunctionOptions,
    ) -> Result<VariableId, LinearizeError> {
        let profile = Profile {
            domain: (0.0, 10.0),
            segments: 20,
            method: BreakpointMethod::Adaptive,
        };
        approximate(
            model,
            x,
            SampleFn::new(f64::sqrt),
            Some(profile),
            capability,
            config,
            options,
        )
    }

    pub fn power(
        model: &mut Model,
        x: VariableId,
        exponent: f64,
        capability: &SolverCapability,
        config: &LinearizerConfig,
        options: FunctionOptions,
    ) -> Result<VariableId, LinearizeError> {
        let profile = Profile {
            domain: (0.0, 10.0),
            segments: 20,
            method: BreakpointMethod::Adaptive,
        };
        approximate(
            model,
            x,
            SampleFn::new(move |v: f64| v.powf(exponent)),
            Some(profile),
            capability,
            config,
            options,
        )
    }

    pub fn sigmoid(
        model: &mut Model,
        x: VariableId,
        capability: &SolverCapability,
        config: &LinearizerConfig,
        options: FunctionOptions,
    ) -> Result<VariableId, LinearizeError> {
        let profile = Profile {
            domain: (-8.0, 8.0),
            segments: 20,
            method: BreakpointMethod::Adaptive,
        };
        approximate(
            model,
            x,
            SampleFn::new(|v: f64| 1.0 / (1.0 + (-v).exp())),
            Some(profile),
            capability,
            config,
            options,
        )
    }

    pub fn tanh(
        model: &mut Model,
        x: VariableId,
        capability: &SolverCapability,
        config: &LinearizerConfig,
        options: FunctionOptions,
    ) -> Result<VariableId, LinearizeError> {
        let profile = Profile {
            domain: (-4.0, 4.0),
            segments: 16,
            method: BreakpointMethod::Adaptive,
        };
        approximate(
            model,
            x,
            SampleFn::new(f64::tanh),
            Some(profile),
            capability,
            config,
            options,
        )
    }

    /// Rectifier. When the resolved domain straddles zero the kink itself
    /// becomes a breakpoint, so the two-piece encoding reproduces the
    /// function exactly; off-zero domains fall back to the generic path.
    pub fn relu(
        model: &mut Model,
        x: VariableId,
        capability: &SolverCapability,
        config: &LinearizerConfig,
        options: FunctionOptions,
    ) -> Result<VariableId, LinearizeError> {
        let profile = Some(Profile {
            domain: (-10.0, 10.0),
            segments: 2,
            method: BreakpointMethod::Uniform,
        });
        let sample = SampleFn::new(|v: f64| v.max(0.0));
        let (lo, hi) = resolve_domain(model, x, options.domain, &profile)?;
        if lo < 0.0 && hi > 0.0 {
            return engine::approximate_on_grid(
                model,
                x,
                &sample,
                &[lo, 0.0, hi],
                capability,
                config,
            );
        }
        approximate(model, x, sample, profile, capability, config, options)
    }

    /// Caller-supplied function. There is no builtin domain, so either an
    /// explicit option or finite variable bounds are required.
    pub fn custom(
        model: &mut Model,
        x: VariableId,
        sample: SampleFn,
        capability: &SolverCapability,
        config: &LinearizerConfig,
        options: FunctionOptions,
    ) -> Result<VariableId, LinearizeError> {
        approximate(model, x, sample, None, capability, config, options)
    }
}

fn approximate(
    model: &mut Model,
    x: VariableId,
    sample: SampleFn,
    profile: Option<Profile>,
    capability: &SolverCapability,
    config: &LinearizerConfig,
    options: FunctionOptions,
) -> Result<VariableId, LinearizeError> {
    let domain = resolve_domain(model, x, options.domain, &profile)?;
    let segments = options
        .segments
        .or_else(|| profile.as_ref().map(|p| p.segments))
        .unwrap_or_else(|| config.pwl_num_segments());
    let method = options
        .method
        .or_else(|| profile.as_ref().map(|p| p.method))
        .unwrap_or_else(|| config.breakpoint_method());

    engine::approximate_function(model, x, &sample, domain, segments, method, capability, config)
}

fn resolve_domain(
    model: &Model,
    x: VariableId,
    explicit: Option<(f64, f64)>,
    profile: &Option<Profile>,
) -> Result<(f64, f64), LinearizeError> {
    if let Some((lo, hi)) = explicit {
        if lo.is_finite() && hi.is_finite() && lo < hi {
            return Ok((lo, hi));
        }
        return Err(LinearizeError::DomainRequired { variable: x });
    }
    let bounds = model.get_variable(x)?.bounds;
    if bounds.is_finite() && bounds.lower < bounds.upper {
        return Ok((bounds.lower, bounds.upper));
    }
    match profile {
        Some(p) => Ok(p.domain),
        None => Err(LinearizeError::DomainRequired { variable: x }),
    }
}

#[cfg(test)]
#[allow(clippy::float_cmp)]
mod tests {
    use super::*;
    use linform_core::{Bounds, Variable};

    fn free_var_model() -> (Model, VariableId) {
        let mut model = Model::new();
        let x = model.add_variable(Variable::free()).unwrap();
        (model, x)
    }

    #[test]
    fn exp_builds_an_approximation_with_builtin_defaults() {
        let (mut model, x) = free_var_model();
        let caps = SolverCapability::milp();
        let config = LinearizerConfig::default();

        let y = NonlinearFunctions::exp(
            &mut model,
            x,
            &caps,
            &config,
            FunctionOptions::default(),
        )
        .unwrap();

        // 24 segments: 25 lambdas + output, convexity/bind rows, and a
        // native SOS2 group under MILP capability.
        assert!(model.num_variables() > 25);
        assert!(model.num_constraints() >= 3);
        assert_eq!(model.sos2_groups().len(), 1);
        assert!(model.get_variable(y).is_ok());
        assert!(model.get_variable_name(y).unwrap().contains("pwl_sos2"));
        model.validate().unwrap();
    }

    #[test]
    fn variable_bounds_override_builtin_domain() {
        let mut model = Model::new();
        let x = model
            .add_variable(Variable::continuous(Bounds::new(1.0, 2.0)))
            .unwrap();
        let profile = Some(Profile {
            domain: (-5.0, 5.0),
            segments: 8,
            method: BreakpointMethod::Uniform,
        });
        assert_eq!(resolve_domain(&model, x, None, &profile).unwrap(), (1.0, 2.0));
        assert_eq!(
            resolve_domain(&model, x, Some((0.5, 0.75)), &profile).unwrap(),
            (0.5, 0.75)
        );
    }

    #[test]
    fn invalid_explicit_domain_is_rejected() {
        let (model, x) = free_var_model();
        let err = resolve_domain(&model, x, Some((2.0, 2.0)), &None).unwrap_err();
        assert_eq!(err, LinearizeError::DomainRequired { variable: x });
    }

    #[test]
    fn custom_without_any_domain_is_rejected() {
        let (mut model, x) = free_var_model();
        let err = NonlinearFunctions::custom(
            &mut model,
            x,
            SampleFn::new(|v| v * v),
            &SolverCapability::milp(),
            &LinearizerConfig::default(),
            FunctionOptions::default(),
        )
        .unwrap_err();
        assert_eq!(err, LinearizeError::DomainRequired { variable: x });
    }

    #[test]
    fn relu_breakpoints_hit_the_kink() {
        let (mut model, x) = free_var_model();
        let caps = SolverCapability::milp();
        let config = LinearizerConfig::default();

        let y = NonlinearFunctions::relu(
            &mut model,
            x,
            &caps,
            &config,
            FunctionOptions::default(),
        )
        .unwrap();

        // Output hull of max(0, x) over [-10, 10] is [0, 10].
        let out = model.get_variable(y).unwrap();
        assert_eq!(out.bounds.lower, 0.0);
        assert_eq!(out.bounds.upper, 10.0);
    }

    #[test]
    fn relu_pins_the_kink_for_asymmetric_bounds() {
        let mut model = Model::new();
        let x = model
            .add_variable(Variable::continuous(Bounds::new(-3.0, 7.0)))
            .unwrap();
        let y = NonlinearFunctions::relu(
            &mut model,
            x,
            &SolverCapability::milp(),
            &LinearizerConfig::default(),
            FunctionOptions::default(),
        )
        .unwrap();

        // With the kink pinned the breakpoints are [-3, 0, 7], so the
        // bind_y row carries the sampled value 7 and never the midpoint
        // value max(0, 2) = 2 that an unpinned grid would sample.
        let bind_y = model
            .constraints()
            .find_map(|(id, row)| {
                model
                    .get_constraint_name(id)
                    .filter(|name| name.contains("bind_y"))
                    .map(|_| row.expr.clone())
            })
            .unwrap();
        let coeffs: Vec<f64> = bind_y.linear_terms().iter().map(|(_, c)| *c).collect();
        assert!(coeffs.contains(&-7.0));
        assert!(!coeffs.contains(&-2.0));

        let out = model.get_variable(y).unwrap();
        assert_eq!(out.bounds.lower, 0.0);
        assert_eq!(out.bounds.upper, 7.0);
    }

    #[test]
    fn repeated_approximations_get_distinct_names() {
        let (mut model, x) = free_var_model();
        let caps = SolverCapability::milp();
        let config = LinearizerConfig::default();

        let y1 =
            NonlinearFunctions::exp(&mut model, x, &caps, &config, FunctionOptions::default())
                .unwrap();
        let y2 =
            NonlinearFunctions::exp(&mut model, x, &caps, &config, FunctionOptions::default())
                .unwrap();
        assert_ne!(model.get_variable_name(y1), model.get_variable_name(y2));

        let mut names: Vec<&str> = model
            .variables()
            .filter_map(|(id, _)| model.get_variable_name(id))
            .collect();
        let total = names.len();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), total);
    }

    #[test]
    fn log_avoids_the_singularity_by_default() {
        let (mut model, x) = free_var_model();
        let y = NonlinearFunctions::log(
            &mut model,
            x,
            &SolverCapability::milp(),
            &LinearizerConfig::default(),
            FunctionOptions::default(),
        )
        .unwrap();
        assert!(model.get_variable(y).is_ok());
        model.validate().unwrap();
    }
}
