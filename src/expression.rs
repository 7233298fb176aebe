//! Filter expression compiler.
//!
//! This module provides:
//! - The symbol model of the expression tree
//! - The configurable grammar of matchable symbols
//! - The longest-match tree builder
//! - Operand factories for transform operators

pub mod error;
pub mod factory;
pub mod grammar;
pub mod symbol;
pub mod tree;

pub use error::{ExpressionError, ExpressionResult};
pub use factory::{DecimalFactory, OperandFactory};
pub use grammar::{Grammar, GrammarConfig, OperatorConfig, SymbolSpec};
pub use symbol::{Literal, Operand, Operator, OperatorKind, Symbol, SymbolKind, Visitor};
pub use tree::{ExpressionTree, MAX_OPERATORS};

/// Build an expression tree with the given grammar
pub fn compile(expression: &str, grammar: &Grammar) -> ExpressionResult<ExpressionTree> {
    ExpressionTree::build(expression, grammar)
}
