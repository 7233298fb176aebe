pub mod backend;
pub mod binder;
pub mod expression;

pub use backend::{Backend, BoundValue, CriteriaBackend, MemoryTable};
pub use binder::{Binder, MapperRegistry};
pub use expression::{compile, ExpressionError, ExpressionResult, ExpressionTree, Grammar};
