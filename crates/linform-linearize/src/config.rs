//! Linearizer configuration: tunables validated once at construction.

use linform_expr::BreakpointMethod;

/// Technique used for continuous x continuous bilinear products.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BilinearMethod {
    /// McCormick envelope relaxation.
    #[default]
    McCormick,
}

impl BilinearMethod {
    pub fn as_str(self) -> &'static str {
        match self {
            BilinearMethod::McCormick => "mccormick",
        }
    }
}

/// Encoding used for piecewise-linear approximations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PwlMethod {
    /// Lambda weights marked as an SOS2 set (native or emulated).
    #[default]
    Sos2,
    /// Segment deltas with monotonic binary activation.
    Incremental,
}

impl PwlMethod {
    pub fn as_str(self) -> &'static str {
        match self {
            PwlMethod::Sos2 => "sos2",
            PwlMethod::Incremental => "incremental",
        }
    }
}

/// Raw linearizer options; validated into a [`LinearizerConfig`].
#[derive(Debug, Clone, Copy)]
pub struct LinearizerOptions {
    /// Technique for continuous x continuous bilinear products.
    pub default_bilinear_method: BilinearMethod,
    /// Big-M constant for indicator and exact min/max formulations.
    pub big_m_value: f64,
    /// Numeric tolerance used in exactness checks.
    pub tolerance: f64,
    /// Default segment count for piecewise-linear approximations.
    pub pwl_num_segments: usize,
    /// Default piecewise-linear encoding.
    pub pwl_method: PwlMethod,
    /// Place breakpoints by curvature instead of uniformly.
    pub adaptive_breakpoints: bool,
    /// Tighten McCormick output-variable bounds from the operand boxes.
    pub mccormick_tighten_bounds: bool,
    /// Ceiling on auxiliary variables added per linearization run.
    pub max_aux_variables: usize,
    /// Ceiling on auxiliary constraints added per linearization run.
    pub max_aux_constraints: usize,
}

impl Default for LinearizerOptions {
    fn default() -> Self {
        Self {
            default_bilinear_method: BilinearMethod::McCormick,
            big_m_value: 1e6,
            tolerance: 1e-6,
            pwl_num_segments: 16,
            pwl_method: PwlMethod::Sos2,
            adaptive_breakpoints: false,
            mccormick_tighten_bounds: true,
            max_aux_variables: 100_000,
            max_aux_constraints: 200_000,
        }
    }
}

/// Immutable, validated linearizer configuration.
///
/// Constructed once via [`LinearizerConfig::new`] and passed by reference
/// through the whole pipeline.
#[derive(Debug, Clone, Copy)]
pub struct LinearizerConfig {
    options: LinearizerOptions,
}

impl LinearizerConfig {
    /// Validate options into a config.
    pub fn new(options: LinearizerOptions) -> Result<Self, ConfigError> {
        if !options.big_m_value.is_finite() || options.big_m_value <= 0.0 {
            return Err(ConfigError::InvalidBigM {
                value: options.big_m_value,
            });
        }
        if !options.tolerance.is_finite() || options.tolerance < 0.0 {
            return Err(ConfigError::InvalidTolerance {
                value: options.tolerance,
            });
        }
        if options.pwl_num_segments == 0 {
            return Err(ConfigError::ZeroSegments);
        }
        if options.max_aux_variables == 0 || options.max_aux_constraints == 0 {
            return Err(ConfigError::ZeroCeiling);
        }
        Ok(Self { options })
    }

    pub fn default_bilinear_method(&self) -> BilinearMethod {
        self.options.default_bilinear_method
    }

    pub fn big_m_value(&self) -> f64 {
        self.options.big_m_value
    }

    pub fn tolerance(&self) -> f64 {
        self.options.tolerance
    }

    pub fn pwl_num_segments(&self) -> usize {
        self.options.pwl_num_segments
    }

    pub fn pwl_method(&self) -> PwlMethod {
        self.options.pwl_method
    }

    pub fn adaptive_breakpoints(&self) -> bool {
        self.options.adaptive_breakpoints
    }

    pub fn mccormick_tighten_bounds(&self) -> bool {
        self.options.mccormick_tighten_bounds
    }

    pub fn max_aux_variables(&self) -> usize {
        self.options.max_aux_variables
    }

    pub fn max_aux_constraints(&self) -> usize {
        self.options.max_aux_constraints
    }

    /// Breakpoint method implied by the config when a term does not pin one.
    pub fn breakpoint_method(&self) -> BreakpointMethod {
        if self.options.adaptive_breakpoints {
            BreakpointMethod::Adaptive
        } else {
            BreakpointMethod::Uniform
        }
    }
}

impl Default for LinearizerConfig {
    fn default() -> Self {
        // Default options satisfy every validation rule.
        Self {
            options: LinearizerOptions::default(),
        }
    }
}

/// Errors rejected at config construction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ConfigError {
    /// Big-M must be finite and strictly positive.
    InvalidBigM { value: f64 },
    /// Tolerance must be finite and non-negative.
    InvalidTolerance { value: f64 },
    /// Segment count must be at least one.
    ZeroSegments,
    /// Auxiliary-structure ceilings must be at least one.
    ZeroCeiling,
}

impl ConfigError {
    /// Returns a semantic error code for programmatic handling.
    pub fn code(&self) -> &'static str {
        match self {
            ConfigError::InvalidBigM { .. } => "CONFIG_BIG_M_INVALID",
            ConfigError::InvalidTolerance { .. } => "CONFIG_TOLERANCE_INVALID",
            ConfigError::ZeroSegments => "CONFIG_SEGMENTS_ZERO",
            ConfigError::ZeroCeiling => "CONFIG_CEILING_ZERO",
        }
    }
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::InvalidBigM { value } => write!(
                f,
                "[{}] big_m_value must be finite and positive, got {value}",
                self.code()
            ),
            ConfigError::InvalidTolerance { value } => write!(
                f,
                "[{}] tolerance must be finite and non-negative, got {value}",
                self.code()
            ),
            ConfigError::ZeroSegments => write!(
                f,
                "[{}] pwl_num_segments must be at least 1",
                self.code()
            ),
            ConfigError::ZeroCeiling => write!(
                f,
                "[{}] auxiliary-structure ceilings must be at least 1",
                self.code()
            ),
        }
    }
}

impl std::error::Error for ConfigError {}
