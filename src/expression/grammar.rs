//! Symbol grammar: the ordered list of symbols the tree builder can match.

use crate::expression::factory::{DecimalFactory, OperandFactory};
use crate::expression::symbol::{Literal, Operand, Operator, Symbol, SymbolKind};
use crate::expression::{ExpressionError, ExpressionResult};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;

/// One matchable symbol of the grammar
#[derive(Debug, Clone)]
pub enum SymbolSpec {
    /// Unsigned decimal digits with nothing around them
    Integer,

    /// `true` or `false` with nothing around them
    Boolean,

    /// Text between two quote characters; the quote cannot be escaped
    String { quote: char },

    /// `{identifier}`
    Field,

    /// Infix operator
    Binary { token: String, weight: u32 },

    /// Infix operator that turns its two operands into one
    Transform {
        token: String,
        weight: u32,
        factories: Vec<Arc<dyn OperandFactory>>,
    },
}

impl SymbolSpec {
    pub fn binary(token: impl Into<String>, weight: u32) -> Self {
        SymbolSpec::Binary {
            token: token.into(),
            weight,
        }
    }

    pub fn transform(
        token: impl Into<String>,
        weight: u32,
        factories: Vec<Arc<dyn OperandFactory>>,
    ) -> Self {
        SymbolSpec::Transform {
            token: token.into(),
            weight,
            factories,
        }
    }

    pub fn kind(&self) -> SymbolKind {
        match self {
            SymbolSpec::Integer => SymbolKind::IntegerLiteral,
            SymbolSpec::Boolean => SymbolKind::BooleanLiteral,
            SymbolSpec::String { .. } => SymbolKind::StringLiteral,
            SymbolSpec::Field => SymbolKind::FieldReference,
            SymbolSpec::Binary { .. } => SymbolKind::BinaryOperator,
            SymbolSpec::Transform { .. } => SymbolKind::TransformOperator,
        }
    }

    /// Return a fresh symbol for `text` if it matches this spec as a whole.
    ///
    /// A text that has the shape of the symbol but carries an unusable value,
    /// such as an integer too large for `i64`, still counts as matched and
    /// yields the error.
    pub fn try_match(&self, text: &str) -> ExpressionResult<Option<Symbol>> {
        let symbol = match self {
            SymbolSpec::Integer => {
                if text.is_empty() || !text.bytes().all(|b| b.is_ascii_digit()) {
                    return Ok(None);
                }
                let value = text
                    .parse::<i64>()
                    .map_err(|_| ExpressionError::IntegerOverflow {
                        text: text.to_string(),
                    })?;
                Operand::literal(text, Literal::Integer(value)).into()
            }
            SymbolSpec::Boolean => {
                let value = match text {
                    "true" => true,
                    "false" => false,
                    _ => return Ok(None),
                };
                Operand::literal(text, Literal::Boolean(value)).into()
            }
            SymbolSpec::String { quote } => {
                let trimmed = text.trim();
                let Some(inner) = trimmed
                    .strip_prefix(*quote)
                    .and_then(|rest| rest.strip_suffix(*quote))
                else {
                    return Ok(None);
                };
                if inner.contains(*quote) {
                    return Ok(None);
                }
                Operand::literal(trimmed, Literal::String(inner.to_string())).into()
            }
            SymbolSpec::Field => {
                let Some(name) = text
                    .trim()
                    .strip_prefix('{')
                    .and_then(|rest| rest.strip_suffix('}'))
                else {
                    return Ok(None);
                };
                if name.is_empty() || !name.chars().all(|c| c.is_alphanumeric() || c == '_') {
                    return Ok(None);
                }
                Operand::field(name).into()
            }
            SymbolSpec::Binary { token, weight } => {
                if text.trim() != token.as_str() {
                    return Ok(None);
                }
                Operator::binary(token.clone(), *weight).into()
            }
            SymbolSpec::Transform {
                token,
                weight,
                factories,
            } => {
                if text.trim() != token.as_str() {
                    return Ok(None);
                }
                Operator::transform(token.clone(), *weight, factories.clone()).into()
            }
        };
        Ok(Some(symbol))
    }
}

/// Operator token and weight as written in a grammar configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperatorConfig {
    pub token: String,
    pub weight: u32,
}

impl OperatorConfig {
    pub fn new(token: impl Into<String>, weight: u32) -> Self {
        Self {
            token: token.into(),
            weight,
        }
    }
}

/// Serializable grammar settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GrammarConfig {
    /// Quote character delimiting string literals
    pub quote: char,
    /// Whether `true` / `false` are literals
    pub booleans: bool,
    /// Transform operator joining two integers into a decimal
    pub decimal: Option<OperatorConfig>,
    /// Binary operators
    pub operators: Vec<OperatorConfig>,
}

impl GrammarConfig {
    /// Read a grammar configuration from a JSON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read grammar file {}", path.display()))?;
        serde_json::from_str(&json)
            .with_context(|| format!("Invalid grammar file {}", path.display()))
    }
}

impl Default for GrammarConfig {
    fn default() -> Self {
        Self {
            quote: '\'',
            booleans: true,
            decimal: Some(OperatorConfig::new(".", 30)),
            operators: vec![
                OperatorConfig::new("=", 20),
                OperatorConfig::new("and", 10),
                OperatorConfig::new("or", 10),
            ],
        }
    }
}

/// Ordered list of symbol specs. The first spec accepting a text wins.
#[derive(Debug, Clone)]
pub struct Grammar {
    specs: Vec<SymbolSpec>,
}

impl Grammar {
    pub fn new(specs: Vec<SymbolSpec>) -> Self {
        Self { specs }
    }

    /// Build the spec list from configuration: literals and the decimal
    /// transform first, then fields, strings and binary operators
    pub fn from_config(config: &GrammarConfig) -> Self {
        let mut specs = vec![SymbolSpec::Integer];
        if config.booleans {
            specs.push(SymbolSpec::Boolean);
        }
        if let Some(decimal) = &config.decimal {
            specs.push(SymbolSpec::transform(
                decimal.token.clone(),
                decimal.weight,
                vec![Arc::new(DecimalFactory)],
            ));
        }
        specs.push(SymbolSpec::Field);
        specs.push(SymbolSpec::String {
            quote: config.quote,
        });
        specs.extend(
            config
                .operators
                .iter()
                .map(|op| SymbolSpec::binary(op.token.clone(), op.weight)),
        );
        Self { specs }
    }

    pub fn specs(&self) -> &[SymbolSpec] {
        &self.specs
    }

    /// Match `text` against the specs in order
    pub fn find_match(&self, text: &str) -> ExpressionResult<Option<Symbol>> {
        self.specs
            .iter()
            .find_map(|spec| spec.try_match(text).transpose())
            .transpose()
    }

    /// Whether some spec matches `text`, even if only with an error
    pub fn accepts(&self, text: &str) -> bool {
        !matches!(self.find_match(text), Ok(None))
    }
}

impl Default for Grammar {
    fn default() -> Self {
        Self::from_config(&GrammarConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn is_match(spec: &SymbolSpec, text: &str) -> bool {
        spec.try_match(text).unwrap().is_some()
    }

    #[test]
    fn test_integer_match() {
        let symbol = SymbolSpec::Integer.try_match("234").unwrap().unwrap();
        assert_eq!(symbol.kind(), SymbolKind::IntegerLiteral);
        assert_eq!(symbol.to_string(), "[234]");

        assert!(!is_match(&SymbolSpec::Integer, "234.33"));
        assert!(!is_match(&SymbolSpec::Integer, "a"));
        assert!(!is_match(&SymbolSpec::Integer, " 12 "));
        assert!(!is_match(&SymbolSpec::Integer, ""));
        assert!(!is_match(&SymbolSpec::Integer, "-3"));
    }

    #[test]
    fn test_integer_overflow_is_matched_as_error() {
        let err = SymbolSpec::Integer
            .try_match("99999999999999999999999")
            .unwrap_err();
        assert_eq!(
            err,
            ExpressionError::IntegerOverflow {
                text: "99999999999999999999999".to_string()
            }
        );
        assert!(Grammar::default().accepts("12345678901234567890"));
        assert!(!Grammar::default().accepts("12345678901234567890 "));
    }

    #[test]
    fn test_boolean_match() {
        assert!(is_match(&SymbolSpec::Boolean, "true"));
        assert!(is_match(&SymbolSpec::Boolean, "false"));
        assert!(!is_match(&SymbolSpec::Boolean, "true "));
        assert!(!is_match(&SymbolSpec::Boolean, "True"));
    }

    #[test]
    fn test_string_match() {
        let spec = SymbolSpec::String { quote: '\'' };
        let symbol = spec.try_match(" 'Article 2' ").unwrap().unwrap();
        assert_eq!(symbol.text(), "'Article 2'");
        assert!(is_match(&spec, "''"));

        assert!(!is_match(&spec, "'"));
        assert!(!is_match(&spec, "'open"));
        assert!(!is_match(&spec, "'a' = 'b'"));
        assert!(!is_match(&spec, "\"a\""));
    }

    #[test]
    fn test_field_match() {
        let symbol = SymbolSpec::Field.try_match("{title} ").unwrap().unwrap();
        assert_eq!(symbol.kind(), SymbolKind::FieldReference);
        assert_eq!(symbol.text(), "{title}");

        assert!(!is_match(&SymbolSpec::Field, "{}"));
        assert!(!is_match(&SymbolSpec::Field, "{a b}"));
        assert!(!is_match(&SymbolSpec::Field, "{a"));
        assert!(!is_match(&SymbolSpec::Field, "title"));
    }

    #[test]
    fn test_operator_match() {
        let spec = SymbolSpec::binary("+", 10);
        for text in ["+", " +", "    + \t\t "] {
            let symbol = spec.try_match(text).unwrap().unwrap();
            assert_eq!(symbol.kind(), SymbolKind::BinaryOperator);
            assert_eq!(symbol.to_string(), "[null+null]");
        }
        assert!(!is_match(&spec, "a"));
        assert!(!is_match(&spec, "2"));
        assert!(!is_match(&spec, "++"));
    }

    #[test]
    fn test_default_grammar_order() {
        let kinds: Vec<_> = Grammar::default().specs().iter().map(|s| s.kind()).collect();
        assert_eq!(
            kinds,
            vec![
                SymbolKind::IntegerLiteral,
                SymbolKind::BooleanLiteral,
                SymbolKind::TransformOperator,
                SymbolKind::FieldReference,
                SymbolKind::StringLiteral,
                SymbolKind::BinaryOperator,
                SymbolKind::BinaryOperator,
                SymbolKind::BinaryOperator,
            ]
        );
    }

    #[test]
    fn test_config_from_json() {
        let config: GrammarConfig =
            serde_json::from_str(r#"{"quote": "\"", "booleans": false, "decimal": null}"#)
                .unwrap();
        assert_eq!(config.quote, '"');
        assert_eq!(config.operators, GrammarConfig::default().operators);

        let grammar = Grammar::from_config(&config);
        assert!(grammar.accepts("\"a\""));
        assert!(!grammar.accepts("'a'"));
        assert!(!grammar.accepts("true"));
        assert!(!grammar.accepts("."));
    }
}
