//! Error types for expression compilation and binding.

use thiserror::Error;

/// Errors that can occur while building or binding an expression tree.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ExpressionError {
    /// Input text that no grammar symbol matches
    #[error("No symbol matches '{text}'")]
    NoSymbolMatch { text: String },

    /// Integer literal that does not fit in 64 bits
    #[error("Integer literal '{text}' is out of range")]
    IntegerOverflow { text: String },

    /// Blank input
    #[error("Expression is empty")]
    EmptyExpression,

    /// Operands must be separated by an operator
    #[error("Operand '{text}' has no operator to bind to")]
    UnexpectedOperand { text: String },

    /// Too many operators to walk safely
    #[error("Expression has more than {limit} operators")]
    ExpressionTooDeep { limit: usize },

    /// Operator missing an operand in a truncated expression
    #[error("Operator '{operator}' is missing its {side} operand")]
    UnboundOperatorSlot {
        operator: String,
        side: &'static str,
    },

    /// Operator token absent from the mapper registry
    #[error("No mapper registered for operator '{operator}'")]
    UnknownOperatorMapping { operator: String },

    /// Field the backend cannot resolve
    #[error("Unknown field: {name}")]
    UnknownField { name: String },

    /// Transform operator whose factories all reject the operands
    #[error("No factory of operator '{operator}' accepts '{left}' and '{right}'")]
    NoFactoryMatched {
        operator: String,
        left: String,
        right: String,
    },

    /// Backend cannot combine the operand types
    #[error("Invalid operands for operator {operator}: left={left}, right={right}")]
    InvalidOperands {
        operator: String,
        left: &'static str,
        right: &'static str,
    },

    /// Whole expression bound to something other than a predicate
    #[error("Expression evaluates to a {found}, not a predicate")]
    ResultNotPredicate { found: &'static str },
}

/// Result type for expression operations
pub type ExpressionResult<T> = Result<T, ExpressionError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ExpressionError::NoSymbolMatch {
            text: "@@".to_string(),
        };
        assert_eq!(err.to_string(), "No symbol matches '@@'");

        let err = ExpressionError::IntegerOverflow {
            text: "12345678901234567890".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Integer literal '12345678901234567890' is out of range"
        );

        let err = ExpressionError::UnboundOperatorSlot {
            operator: "=".to_string(),
            side: "right",
        };
        assert_eq!(err.to_string(), "Operator '=' is missing its right operand");

        let err = ExpressionError::UnknownOperatorMapping {
            operator: "or".to_string(),
        };
        assert_eq!(err.to_string(), "No mapper registered for operator 'or'");

        let err = ExpressionError::NoFactoryMatched {
            operator: ".".to_string(),
            left: "1".to_string(),
            right: "'a'".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "No factory of operator '.' accepts '1' and ''a''"
        );

        let err = ExpressionError::InvalidOperands {
            operator: "and".to_string(),
            left: "integer",
            right: "predicate",
        };
        assert_eq!(
            err.to_string(),
            "Invalid operands for operator and: left=integer, right=predicate"
        );
    }
}
