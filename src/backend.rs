//! Backend capabilities the binder depends on.
//!
//! A backend turns field names into addressable locations and, through the
//! mappers, combines bound values into its own predicate type. The binder
//! never looks inside either.

use crate::expression::{ExpressionResult, Literal};
use std::fmt;

pub mod memory;

pub use memory::MemoryTable;

/// Field resolution against a query backend
pub trait Backend {
    /// Addressable location of a field, e.g. a column
    type Path: Clone + fmt::Debug;
    /// Backend-native predicate
    type Predicate: fmt::Debug;

    /// Resolve a field name, failing with `UnknownField` if it does not exist
    fn resolve(&self, field: &str) -> ExpressionResult<Self::Path>;
}

/// Predicate constructors used by the standard mappers
pub trait CriteriaBackend: Backend + Sized {
    fn equal(
        &self,
        left: BoundValue<Self>,
        right: BoundValue<Self>,
    ) -> ExpressionResult<Self::Predicate>;

    fn and(
        &self,
        left: BoundValue<Self>,
        right: BoundValue<Self>,
    ) -> ExpressionResult<Self::Predicate>;

    fn or(
        &self,
        left: BoundValue<Self>,
        right: BoundValue<Self>,
    ) -> ExpressionResult<Self::Predicate>;
}

/// Value on the binder's evaluation stack
pub enum BoundValue<B: Backend> {
    Literal(Literal),
    Path(B::Path),
    Predicate(B::Predicate),
}

impl<B: Backend> BoundValue<B> {
    /// Get the display name of this value's type
    pub fn type_name(&self) -> &'static str {
        match self {
            BoundValue::Literal(literal) => literal.type_name(),
            BoundValue::Path(_) => "field",
            BoundValue::Predicate(_) => "predicate",
        }
    }
}

impl<B: Backend> fmt::Debug for BoundValue<B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BoundValue::Literal(literal) => f.debug_tuple("Literal").field(literal).finish(),
            BoundValue::Path(path) => f.debug_tuple("Path").field(path).finish(),
            BoundValue::Predicate(predicate) => {
                f.debug_tuple("Predicate").field(predicate).finish()
            }
        }
    }
}

impl<B: Backend> Clone for BoundValue<B>
where
    B::Predicate: Clone,
{
    fn clone(&self) -> Self {
        match self {
            BoundValue::Literal(literal) => BoundValue::Literal(literal.clone()),
            BoundValue::Path(path) => BoundValue::Path(path.clone()),
            BoundValue::Predicate(predicate) => BoundValue::Predicate(predicate.clone()),
        }
    }
}

impl<B: Backend> PartialEq for BoundValue<B>
where
    B::Path: PartialEq,
    B::Predicate: PartialEq,
{
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (BoundValue::Literal(a), BoundValue::Literal(b)) => a == b,
            (BoundValue::Path(a), BoundValue::Path(b)) => a == b,
            (BoundValue::Predicate(a), BoundValue::Predicate(b)) => a == b,
            _ => false,
        }
    }
}
