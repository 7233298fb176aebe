//! Operator-to-predicate mapper registry.

use crate::backend::{Backend, BoundValue, CriteriaBackend};
use crate::expression::ExpressionResult;
use std::collections::HashMap;
use std::fmt;

/// Builds a predicate from the two operands of an operator
pub type Mapper<B> = Box<
    dyn Fn(BoundValue<B>, BoundValue<B>, &B) -> ExpressionResult<<B as Backend>::Predicate>
        + Send
        + Sync,
>;

/// Table from operator token to mapper, assembled by the caller.
///
/// Only operators registered here can be bound. The registry is read-only
/// while a tree is bound, so one registry can serve many binders.
pub struct MapperRegistry<B: Backend> {
    mappers: HashMap<String, Mapper<B>>,
}

impl<B: Backend> MapperRegistry<B> {
    pub fn new() -> Self {
        Self {
            mappers: HashMap::new(),
        }
    }

    /// Register a mapper, returning the one it replaces
    pub fn register<F>(&mut self, token: impl Into<String>, mapper: F) -> Option<Mapper<B>>
    where
        F: Fn(BoundValue<B>, BoundValue<B>, &B) -> ExpressionResult<B::Predicate>
            + Send
            + Sync
            + 'static,
    {
        self.mappers.insert(token.into(), Box::new(mapper))
    }

    /// Builder-style `register`
    pub fn with<F>(mut self, token: impl Into<String>, mapper: F) -> Self
    where
        F: Fn(BoundValue<B>, BoundValue<B>, &B) -> ExpressionResult<B::Predicate>
            + Send
            + Sync
            + 'static,
    {
        self.register(token, mapper);
        self
    }

    pub fn get(&self, token: &str) -> Option<&Mapper<B>> {
        self.mappers.get(token)
    }

    pub fn contains(&self, token: &str) -> bool {
        self.mappers.contains_key(token)
    }

    pub fn len(&self) -> usize {
        self.mappers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mappers.is_empty()
    }
}

impl<B: CriteriaBackend + 'static> MapperRegistry<B> {
    /// Registry with `=`, `and` and `or`
    pub fn standard() -> Self {
        Self::new()
            .with("=", equal_to::<B>())
            .with("and", and::<B>())
            .with("or", or::<B>())
    }
}

impl<B: Backend> Default for MapperRegistry<B> {
    fn default() -> Self {
        Self::new()
    }
}

impl<B: Backend> fmt::Debug for MapperRegistry<B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut tokens: Vec<_> = self.mappers.keys().collect();
        tokens.sort();
        f.debug_struct("MapperRegistry")
            .field("tokens", &tokens)
            .finish()
    }
}

/// Equality of two operands
pub fn equal_to<B: CriteriaBackend>(
) -> impl Fn(BoundValue<B>, BoundValue<B>, &B) -> ExpressionResult<B::Predicate> + Send + Sync {
    |left: BoundValue<B>, right: BoundValue<B>, backend: &B| backend.equal(left, right)
}

/// Conjunction of two conditions
pub fn and<B: CriteriaBackend>(
) -> impl Fn(BoundValue<B>, BoundValue<B>, &B) -> ExpressionResult<B::Predicate> + Send + Sync {
    |left: BoundValue<B>, right: BoundValue<B>, backend: &B| backend.and(left, right)
}

/// Disjunction of two conditions
pub fn or<B: CriteriaBackend>(
) -> impl Fn(BoundValue<B>, BoundValue<B>, &B) -> ExpressionResult<B::Predicate> + Send + Sync {
    |left: BoundValue<B>, right: BoundValue<B>, backend: &B| backend.or(left, right)
}
