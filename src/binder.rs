//! Binding of expression trees to backend predicates.
//!
//! The binder walks a finished tree in post-order. Operands push their bound
//! value on an evaluation stack: literals push themselves, fields push the
//! location the backend resolves them to. Operators pop their two operands
//! and push whatever their mapper builds from them. When the walk ends the
//! only value left on the stack is the predicate for the whole expression.

use crate::backend::{Backend, BoundValue};
use crate::expression::{
    ExpressionError, ExpressionResult, ExpressionTree, Operand, Operator, OperatorKind, Visitor,
};
use log::{debug, trace};

pub mod mapper;

pub use mapper::{Mapper, MapperRegistry};

/// Stack-based visitor producing a backend predicate.
///
/// A binder serves exactly one traversal: `bind` consumes it.
pub struct Binder<'a, B: Backend> {
    backend: &'a B,
    mappers: &'a MapperRegistry<B>,
    stack: Vec<BoundValue<B>>,
}

impl<'a, B: Backend> Binder<'a, B> {
    pub fn new(backend: &'a B, mappers: &'a MapperRegistry<B>) -> Self {
        Self {
            backend,
            mappers,
            stack: Vec::new(),
        }
    }

    /// Walk `tree` and return the predicate it evaluates to
    pub fn bind(mut self, tree: &ExpressionTree) -> ExpressionResult<B::Predicate> {
        tree.root().accept(&mut self)?;
        let Some(value) = self.stack.pop() else {
            unreachable!("traversal of a non-empty tree leaves a value on the stack");
        };
        debug_assert!(self.stack.is_empty(), "evaluation stack not drained");

        match value {
            BoundValue::Predicate(predicate) => {
                debug!("Bound expression {} to {:?}", tree, predicate);
                Ok(predicate)
            }
            other => Err(ExpressionError::ResultNotPredicate {
                found: other.type_name(),
            }),
        }
    }

    fn pop(&mut self) -> BoundValue<B> {
        match self.stack.pop() {
            Some(value) => value,
            None => unreachable!("operator popped an empty evaluation stack"),
        }
    }
}

impl<B: Backend> Visitor for Binder<'_, B> {
    type Error = ExpressionError;

    fn visit_operand(&mut self, operand: &Operand) -> ExpressionResult<()> {
        let value = match operand {
            Operand::Literal { value, .. } => BoundValue::Literal(value.clone()),
            Operand::Field { name, .. } => BoundValue::Path(self.backend.resolve(name)?),
        };
        self.stack.push(value);
        Ok(())
    }

    fn visit_operator(&mut self, operator: &Operator) -> ExpressionResult<()> {
        let unbound = |side| ExpressionError::UnboundOperatorSlot {
            operator: operator.token().to_string(),
            side,
        };
        // A transform left in the tree never got both operands
        if let OperatorKind::Transform(_) = operator.kind() {
            return Err(unbound(if operator.left().is_none() {
                "left"
            } else {
                "right"
            }));
        }

        let mappers = self.mappers;
        let mapper = mappers.get(operator.token()).ok_or_else(|| {
            ExpressionError::UnknownOperatorMapping {
                operator: operator.token().to_string(),
            }
        })?;
        let left = operator.left().ok_or_else(|| unbound("left"))?;
        let right = operator.right().ok_or_else(|| unbound("right"))?;

        left.accept(self)?;
        right.accept(self)?;
        let right = self.pop();
        let left = self.pop();

        trace!("Mapping {:?} {} {:?}", left, operator.token(), right);
        let predicate = mapper(left, right, self.backend)?;
        self.stack.push(BoundValue::Predicate(predicate));
        Ok(())
    }
}

impl ExpressionTree {
    /// Bind this tree against `backend` using `mappers`
    pub fn bind<B: Backend>(
        &self,
        backend: &B,
        mappers: &MapperRegistry<B>,
    ) -> ExpressionResult<B::Predicate> {
        Binder::new(backend, mappers).bind(self)
    }
}
