//! Expression tree nodes and the merge rules that shape the tree.

use crate::expression::factory::OperandFactory;
use crate::expression::{ExpressionError, ExpressionResult};
use rust_decimal::Decimal;
use std::fmt;
use std::sync::Arc;

/// Kind of a symbol in the expression tree
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SymbolKind {
    IntegerLiteral,
    DecimalLiteral,
    StringLiteral,
    BooleanLiteral,
    FieldReference,
    BinaryOperator,
    TransformOperator,
}

/// Constant value carried by a literal operand
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    Integer(i64),
    Decimal(Decimal),
    String(String),
    Boolean(bool),
}

impl Literal {
    /// Get the display name of this literal's type
    pub fn type_name(&self) -> &'static str {
        match self {
            Literal::Integer(_) => "integer",
            Literal::Decimal(_) => "decimal",
            Literal::String(_) => "string",
            Literal::Boolean(_) => "boolean",
        }
    }
}

/// Leaf of the expression tree
#[derive(Debug, Clone, PartialEq)]
pub enum Operand {
    /// Literal constant, with the text it was matched from
    Literal { text: String, value: Literal },

    /// Field reference such as `{title}`
    Field { text: String, name: String },
}

impl Operand {
    pub fn literal(text: impl Into<String>, value: Literal) -> Self {
        Operand::Literal {
            text: text.into(),
            value,
        }
    }

    pub fn field(name: impl Into<String>) -> Self {
        let name = name.into();
        Operand::Field {
            text: format!("{{{}}}", name),
            name,
        }
    }

    /// The text this operand was matched from
    pub fn text(&self) -> &str {
        match self {
            Operand::Literal { text, .. } | Operand::Field { text, .. } => text,
        }
    }

    pub fn kind(&self) -> SymbolKind {
        match self {
            Operand::Literal { value, .. } => match value {
                Literal::Integer(_) => SymbolKind::IntegerLiteral,
                Literal::Decimal(_) => SymbolKind::DecimalLiteral,
                Literal::String(_) => SymbolKind::StringLiteral,
                Literal::Boolean(_) => SymbolKind::BooleanLiteral,
            },
            Operand::Field { .. } => SymbolKind::FieldReference,
        }
    }
}

/// How an operator behaves once both of its operands are bound
#[derive(Debug, Clone)]
pub enum OperatorKind {
    /// Stays in the tree and is handed to a mapper by the binder
    Binary,

    /// Replaces itself with the first operand its factories derive
    Transform(Vec<Arc<dyn OperandFactory>>),
}

/// Infix operator node. Owns its children.
#[derive(Debug, Clone)]
pub struct Operator {
    token: String,
    weight: u32,
    kind: OperatorKind,
    left: Option<Box<Symbol>>,
    right: Option<Box<Symbol>>,
}

impl Operator {
    /// Create a binary operator with no operands bound yet
    pub fn binary(token: impl Into<String>, weight: u32) -> Self {
        Self {
            token: token.into(),
            weight,
            kind: OperatorKind::Binary,
            left: None,
            right: None,
        }
    }

    /// Create a transform operator with no operands bound yet
    pub fn transform(
        token: impl Into<String>,
        weight: u32,
        factories: Vec<Arc<dyn OperandFactory>>,
    ) -> Self {
        Self {
            token: token.into(),
            weight,
            kind: OperatorKind::Transform(factories),
            left: None,
            right: None,
        }
    }

    pub fn token(&self) -> &str {
        &self.token
    }

    pub fn weight(&self) -> u32 {
        self.weight
    }

    pub fn kind(&self) -> &OperatorKind {
        &self.kind
    }

    pub fn left(&self) -> Option<&Symbol> {
        self.left.as_deref()
    }

    pub fn right(&self) -> Option<&Symbol> {
        self.right.as_deref()
    }

    /// Whether this operator, or an operator on its right spine, still
    /// waits for an operand
    pub fn has_pending_slot(&self) -> bool {
        self.left.is_none()
            || self
                .right
                .as_deref()
                .map_or(true, |right| right.has_pending_slot())
    }

    /// Merge `incoming` into the tree rooted at this operator and return the
    /// new root.
    ///
    /// Operands fill the first free slot on the right spine. An operator that
    /// weighs strictly more than this one sinks into the right subtree;
    /// otherwise it takes the whole tree as its left operand and becomes the
    /// root, so equal weights associate to the left.
    pub fn merge(mut self, incoming: Symbol) -> ExpressionResult<Symbol> {
        match incoming {
            Symbol::Operand(_) => {
                if self.left.is_none() {
                    self.left = Some(Box::new(incoming));
                    return self.complete();
                }
                match self.right.take() {
                    None => {
                        self.right = Some(Box::new(incoming));
                        self.complete()
                    }
                    Some(right) if right.has_pending_slot() => {
                        self.right = Some(Box::new(right.merge(incoming)?));
                        self.complete()
                    }
                    Some(_) => Err(ExpressionError::UnexpectedOperand {
                        text: incoming.text().to_string(),
                    }),
                }
            }
            Symbol::Operator(mut operator) => {
                if operator.weight > self.weight {
                    let nested = match self.right.take() {
                        Some(right) => right.merge(Symbol::Operator(operator))?,
                        None => Symbol::Operator(operator),
                    };
                    self.right = Some(Box::new(nested));
                    Ok(Symbol::Operator(self))
                } else {
                    debug_assert!(operator.left.is_none(), "merged operator must be fresh");
                    operator.left = Some(Box::new(Symbol::Operator(self)));
                    Ok(Symbol::Operator(operator))
                }
            }
        }
    }

    /// Collapse a fully bound transform into its derived operand
    fn complete(self) -> ExpressionResult<Symbol> {
        if let (OperatorKind::Transform(factories), Some(left), Some(right)) =
            (&self.kind, self.left.as_deref(), self.right.as_deref())
        {
            return factories
                .iter()
                .find_map(|factory| factory.create(left, right))
                .map(Symbol::Operand)
                .ok_or_else(|| ExpressionError::NoFactoryMatched {
                    operator: self.token.clone(),
                    left: left.text().to_string(),
                    right: right.text().to_string(),
                });
        }
        Ok(Symbol::Operator(self))
    }
}

/// Node of the expression tree
#[derive(Debug, Clone)]
pub enum Symbol {
    Operand(Operand),
    Operator(Operator),
}

impl Symbol {
    pub fn kind(&self) -> SymbolKind {
        match self {
            Symbol::Operand(operand) => operand.kind(),
            Symbol::Operator(operator) => match operator.kind {
                OperatorKind::Binary => SymbolKind::BinaryOperator,
                OperatorKind::Transform(_) => SymbolKind::TransformOperator,
            },
        }
    }

    /// Matched text for operands, the token for operators
    pub fn text(&self) -> &str {
        match self {
            Symbol::Operand(operand) => operand.text(),
            Symbol::Operator(operator) => &operator.token,
        }
    }

    /// Precedence weight; operands have none
    pub fn weight(&self) -> Option<u32> {
        match self {
            Symbol::Operand(_) => None,
            Symbol::Operator(operator) => Some(operator.weight),
        }
    }

    pub fn has_pending_slot(&self) -> bool {
        match self {
            Symbol::Operand(_) => false,
            Symbol::Operator(operator) => operator.has_pending_slot(),
        }
    }

    /// Merge `incoming` into the tree rooted at this symbol and return the
    /// new root.
    pub fn merge(self, incoming: Symbol) -> ExpressionResult<Symbol> {
        match self {
            Symbol::Operator(operator) => operator.merge(incoming),
            Symbol::Operand(operand) => match incoming {
                Symbol::Operator(operator) => operator.merge(Symbol::Operand(operand)),
                Symbol::Operand(other) => Err(ExpressionError::UnexpectedOperand {
                    text: other.text().to_string(),
                }),
            },
        }
    }

    /// Dispatch this node to a visitor
    pub fn accept<V: Visitor>(&self, visitor: &mut V) -> Result<(), V::Error> {
        match self {
            Symbol::Operand(operand) => visitor.visit_operand(operand),
            Symbol::Operator(operator) => visitor.visit_operator(operator),
        }
    }
}

impl From<Operand> for Symbol {
    fn from(operand: Operand) -> Self {
        Symbol::Operand(operand)
    }
}

impl From<Operator> for Symbol {
    fn from(operator: Operator) -> Self {
        Symbol::Operator(operator)
    }
}

/// Canonical bracketed form: `[left<op>right]` for operators, `[text]` for
/// operands and `null` for an unbound slot.
impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Symbol::Operand(operand) => write!(f, "[{}]", operand.text()),
            Symbol::Operator(operator) => {
                f.write_str("[")?;
                write_slot(f, operator.left())?;
                f.write_str(&operator.token)?;
                write_slot(f, operator.right())?;
                f.write_str("]")
            }
        }
    }
}

fn write_slot(f: &mut fmt::Formatter<'_>, slot: Option<&Symbol>) -> fmt::Result {
    match slot {
        Some(symbol) => write!(f, "{}", symbol),
        None => f.write_str("null"),
    }
}

/// Visitor over expression tree nodes.
///
/// Operators are handed over whole; the visitor decides when to descend
/// into the children.
pub trait Visitor {
    type Error;

    fn visit_operand(&mut self, operand: &Operand) -> Result<(), Self::Error>;

    fn visit_operator(&mut self, operator: &Operator) -> Result<(), Self::Error>;
}
