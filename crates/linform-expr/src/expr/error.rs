//! Expression construction errors.

/// Errors raised while building expressions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExprError {
    /// Indicator terms attach to constraints, never to expressions.
    IndicatorInExpression,
    /// A min/max term needs at least one operand.
    EmptyOperands,
    /// A term coefficient was NaN or infinite.
    NonFiniteCoefficient,
}

impl ExprError {
    /// Returns a semantic error code for programmatic handling.
    pub fn code(&self) -> &'static str {
        match self {
            ExprError::IndicatorInExpression => "EXPR_INDICATOR_MISPLACED",
            ExprError::EmptyOperands => "EXPR_EMPTY_OPERANDS",
            ExprError::NonFiniteCoefficient => "EXPR_NONFINITE_COEFF",
        }
    }
}

impl std::fmt::Display for ExprError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExprError::IndicatorInExpression => write!(
                f,
                "[{}] Indicator terms belong on constraints, not inside expressions",
                self.code()
            ),
            ExprError::EmptyOperands => {
                write!(f, "[{}] min/max requires at least one operand", self.code())
            }
            ExprError::NonFiniteCoefficient => {
                write!(f, "[{}] Term coefficient must be finite", self.code())
            }
        }
    }
}

impl std::error::Error for ExprError {}

#[cfg(test)]
mod tests {
    use super::ExprError;

    #[test]
    fn codes_are_stable() {
        assert_eq!(
            ExprError::IndicatorInExpression.code(),
            "EXPR_INDICATOR_MISPLACED"
        );
        assert_eq!(ExprError::EmptyOperands.code(), "EXPR_EMPTY_OPERANDS");
    }

    #[test]
    fn display_includes_code() {
        let rendered = ExprError::EmptyOperands.to_string();
        assert!(rendered.starts_with("[EXPR_EMPTY_OPERANDS]"));
    }
}
