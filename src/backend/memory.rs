//! In-memory table backend.
//!
//! Rows are plain value vectors; predicates are `RowFilter` trees evaluated
//! row by row. Used as the reference dataset for bound expressions and by
//! the command line tool.

use crate::backend::{Backend, BoundValue, CriteriaBackend};
use crate::expression::{ExpressionError, ExpressionResult, Literal};
use anyhow::{bail, Context, Result};
use rust_decimal::Decimal;
use std::path::Path;
use std::str::FromStr;

/// Values that can be stored in a table
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Boolean(bool),
    Integer(i64),
    Decimal(Decimal),
    String(String),
}

impl Value {
    /// Equality as seen by a filter: NULL equals nothing, integers and
    /// decimals compare by value
    pub fn filter_eq(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Null, _) | (_, Value::Null) => false,
            (Value::Integer(a), Value::Decimal(b)) | (Value::Decimal(b), Value::Integer(a)) => {
                Decimal::from(*a) == *b
            }
            _ => self == other,
        }
    }

    pub fn from_json(value: serde_json::Value) -> Result<Self> {
        Ok(match value {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Boolean(b),
            serde_json::Value::Number(n) => match n.as_i64() {
                Some(i) => Value::Integer(i),
                None => {
                    let text = n.to_string();
                    // serde_json prints small and large floats in exponent form
                    let decimal = Decimal::from_str(&text)
                        .or_else(|_| Decimal::from_scientific(&text))
                        .with_context(|| format!("Invalid decimal: {}", n))?;
                    Value::Decimal(decimal)
                }
            },
            serde_json::Value::String(s) => Value::String(s),
            other => bail!("Unsupported value: {}", other),
        })
    }

    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Value::Null => serde_json::Value::Null,
            Value::Boolean(b) => serde_json::Value::Bool(*b),
            Value::Integer(i) => serde_json::Value::from(*i),
            Value::Decimal(d) => serde_json::Number::from_str(&d.to_string())
                .map(serde_json::Value::Number)
                .unwrap_or_else(|_| serde_json::Value::String(d.to_string())),
            Value::String(s) => serde_json::Value::String(s.clone()),
        }
    }
}

impl From<Literal> for Value {
    fn from(literal: Literal) -> Self {
        match literal {
            Literal::Integer(i) => Value::Integer(i),
            Literal::Decimal(d) => Value::Decimal(d),
            Literal::String(s) => Value::String(s),
            Literal::Boolean(b) => Value::Boolean(b),
        }
    }
}

/// Column reference in a filter
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ColumnRef {
    /// Column index in the row (0-based)
    pub index: usize,
    pub name: String,
}

static NULL: Value = Value::Null;

/// Side of a comparison
#[derive(Debug, Clone, PartialEq)]
pub enum Term {
    Column(ColumnRef),
    Constant(Value),
}

impl Term {
    fn evaluate<'a>(&'a self, row: &'a [Value]) -> &'a Value {
        match self {
            Term::Column(column) => row.get(column.index).unwrap_or(&NULL),
            Term::Constant(value) => value,
        }
    }
}

/// Predicate over table rows
#[derive(Debug, Clone, PartialEq)]
pub enum RowFilter {
    Equal(Term, Term),
    /// Holds when the term is boolean `true`
    IsTrue(Term),
    And(Box<RowFilter>, Box<RowFilter>),
    Or(Box<RowFilter>, Box<RowFilter>),
}

impl RowFilter {
    pub fn matches(&self, row: &[Value]) -> bool {
        match self {
            RowFilter::Equal(left, right) => left.evaluate(row).filter_eq(right.evaluate(row)),
            RowFilter::IsTrue(term) => matches!(term.evaluate(row), Value::Boolean(true)),
            RowFilter::And(left, right) => left.matches(row) && right.matches(row),
            RowFilter::Or(left, right) => left.matches(row) || right.matches(row),
        }
    }
}

/// Table held entirely in memory
#[derive(Debug, Clone, Default)]
pub struct MemoryTable {
    columns: Vec<String>,
    rows: Vec<Vec<Value>>,
}

impl MemoryTable {
    pub fn new<S: Into<String>>(columns: impl IntoIterator<Item = S>) -> Self {
        Self {
            columns: columns.into_iter().map(Into::into).collect(),
            rows: Vec::new(),
        }
    }

    /// Load a table from a JSON array of objects. Every key seen in any
    /// record becomes a column; missing keys become NULL.
    pub fn from_json(json: &str) -> Result<Self> {
        let records: Vec<serde_json::Map<String, serde_json::Value>> =
            serde_json::from_str(json).context("Dataset must be a JSON array of objects")?;

        let mut table = MemoryTable::default();
        for record in &records {
            for key in record.keys() {
                if !table.columns.contains(key) {
                    table.columns.push(key.clone());
                }
            }
        }
        for record in records {
            let mut row = vec![Value::Null; table.columns.len()];
            for (key, value) in record {
                if let Some(index) = table.column_index(&key) {
                    row[index] = Value::from_json(value)
                        .with_context(|| format!("Invalid value for column {}", key))?;
                }
            }
            table.rows.push(row);
        }
        Ok(table)
    }

    /// Load a table from a JSON file, see `from_json`
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read dataset {}", path.display()))?;
        Self::from_json(&json).with_context(|| format!("Invalid dataset {}", path.display()))
    }

    pub fn insert(&mut self, row: Vec<Value>) -> Result<()> {
        if row.len() != self.columns.len() {
            bail!(
                "Value count {} doesn't match column count {}",
                row.len(),
                self.columns.len()
            );
        }
        self.rows.push(row);
        Ok(())
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<Value>] {
        &self.rows
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|column| column == name)
    }

    /// Rows matching `filter`, in insertion order
    pub fn select<'a>(
        &'a self,
        filter: &'a RowFilter,
    ) -> impl Iterator<Item = &'a [Value]> + 'a {
        self.rows
            .iter()
            .map(Vec::as_slice)
            .filter(move |row| filter.matches(row))
    }

    /// Render a row as a JSON object
    pub fn row_to_json(&self, row: &[Value]) -> serde_json::Value {
        let record = self
            .columns
            .iter()
            .zip(row)
            .map(|(column, value)| (column.clone(), value.to_json()))
            .collect();
        serde_json::Value::Object(record)
    }
}

fn invalid_operands(
    operator: &str,
    left: &BoundValue<MemoryTable>,
    right: &BoundValue<MemoryTable>,
) -> ExpressionError {
    ExpressionError::InvalidOperands {
        operator: operator.to_string(),
        left: left.type_name(),
        right: right.type_name(),
    }
}

fn term(value: BoundValue<MemoryTable>) -> Option<Term> {
    match value {
        BoundValue::Literal(literal) => Some(Term::Constant(literal.into())),
        BoundValue::Path(column) => Some(Term::Column(column)),
        BoundValue::Predicate(_) => None,
    }
}

fn condition(value: BoundValue<MemoryTable>) -> Option<RowFilter> {
    match value {
        BoundValue::Predicate(filter) => Some(filter),
        BoundValue::Path(column) => Some(RowFilter::IsTrue(Term::Column(column))),
        BoundValue::Literal(Literal::Boolean(b)) => {
            Some(RowFilter::IsTrue(Term::Constant(Value::Boolean(b))))
        }
        BoundValue::Literal(_) => None,
    }
}

impl MemoryTable {
    fn conditions(
        operator: &str,
        left: BoundValue<Self>,
        right: BoundValue<Self>,
    ) -> ExpressionResult<(Box<RowFilter>, Box<RowFilter>)> {
        let err = invalid_operands(operator, &left, &right);
        match (condition(left), condition(right)) {
            (Some(left), Some(right)) => Ok((Box::new(left), Box::new(right))),
            _ => Err(err),
        }
    }
}

impl Backend for MemoryTable {
    type Path = ColumnRef;
    type Predicate = RowFilter;

    fn resolve(&self, field: &str) -> ExpressionResult<ColumnRef> {
        self.column_index(field)
            .map(|index| ColumnRef {
                index,
                name: field.to_string(),
            })
            .ok_or_else(|| ExpressionError::UnknownField {
                name: field.to_string(),
            })
    }
}

impl CriteriaBackend for MemoryTable {
    fn equal(
        &self,
        left: BoundValue<Self>,
        right: BoundValue<Self>,
    ) -> ExpressionResult<RowFilter> {
        let err = invalid_operands("=", &left, &right);
        match (term(left), term(right)) {
            (Some(left), Some(right)) => Ok(RowFilter::Equal(left, right)),
            _ => Err(err),
        }
    }

    fn and(
        &self,
        left: BoundValue<Self>,
        right: BoundValue<Self>,
    ) -> ExpressionResult<RowFilter> {
        let (left, right) = Self::conditions("and", left, right)?;
        Ok(RowFilter::And(left, right))
    }

    fn or(
        &self,
        left: BoundValue<Self>,
        right: BoundValue<Self>,
    ) -> ExpressionResult<RowFilter> {
        let (left, right) = Self::conditions("or", left, right)?;
        Ok(RowFilter::Or(left, right))
    }
}
