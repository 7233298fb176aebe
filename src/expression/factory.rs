//! Operand factories used by transform operators.

use crate::expression::symbol::{Literal, Operand, Symbol};
use rust_decimal::Decimal;
use std::fmt;
use std::str::FromStr;

/// Derives a single operand from the two operands of a transform operator
pub trait OperandFactory: fmt::Debug + Send + Sync {
    /// Return the derived operand, or `None` if this factory does not
    /// accept the pair
    fn create(&self, left: &Symbol, right: &Symbol) -> Option<Operand>;
}

/// Joins two integer literals into a decimal literal: `1` `.` `05` -> `1.05`
#[derive(Debug, Default, Clone, Copy)]
pub struct DecimalFactory;

impl OperandFactory for DecimalFactory {
    fn create(&self, left: &Symbol, right: &Symbol) -> Option<Operand> {
        let whole = integer_text(left)?;
        let fraction = integer_text(right)?;
        let text = format!("{}.{}", whole, fraction);
        let value = Decimal::from_str(&text).ok()?;
        Some(Operand::literal(text, Literal::Decimal(value)))
    }
}

fn integer_text(symbol: &Symbol) -> Option<&str> {
    match symbol {
        Symbol::Operand(Operand::Literal {
            text,
            value: Literal::Integer(_),
        }) => Some(text),
        _ => None,
    }
}
