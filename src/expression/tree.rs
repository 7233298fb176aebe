//! Expression tree construction.
//!
//! The builder scans the raw expression one character at a time and keeps
//! growing a buffer while some grammar symbol would still match it. Once the
//! buffer matches but the buffer plus the next character does not, the match
//! is the longest possible one and is merged straight into the tree. There is
//! no separate token stream.

use crate::expression::grammar::Grammar;
use crate::expression::symbol::Symbol;
use crate::expression::{ExpressionError, ExpressionResult};
use log::{debug, trace};
use std::fmt;

/// Compiled filter expression. Immutable once built and safe to bind from
/// several threads at once.
#[derive(Debug, Clone)]
pub struct ExpressionTree {
    root: Symbol,
}

/// Most operators one expression may hold. Trees are walked recursively, so
/// this bounds their depth.
pub const MAX_OPERATORS: usize = 256;

impl ExpressionTree {
    /// Build the tree for `expression` using the symbols of `grammar`
    pub fn build(expression: &str, grammar: &Grammar) -> ExpressionResult<Self> {
        let mut root: Option<Symbol> = None;
        let mut operators = 0;
        let mut buffer = String::new();
        let mut chars = expression.char_indices().peekable();

        while let Some((offset, c)) = chars.next() {
            if buffer.is_empty() && c.is_whitespace() {
                continue;
            }
            buffer.push(c);

            let Some(&(_, next)) = chars.peek() else {
                break;
            };
            if !grammar.accepts(&buffer) {
                continue;
            }
            buffer.push(next);
            let extends = grammar.accepts(&buffer);
            buffer.pop();
            if !extends {
                trace!("Matched {:?} ending at offset {}", buffer, offset);
                root = Some(push(root, grammar, &buffer, &mut operators)?);
                buffer.clear();
            }
        }

        if !buffer.trim().is_empty() {
            trace!("Matched {:?} at end of input", buffer);
            root = Some(push(root, grammar, &buffer, &mut operators)?);
        }

        let root = root.ok_or(ExpressionError::EmptyExpression)?;
        debug!("Built expression tree {} from {:?}", root, expression);
        Ok(Self { root })
    }

    pub fn root(&self) -> &Symbol {
        &self.root
    }
}

/// Create the symbol for a maximal match and merge it into the tree built so
/// far; an absent tree takes the symbol as is
fn push(
    root: Option<Symbol>,
    grammar: &Grammar,
    text: &str,
    operators: &mut usize,
) -> ExpressionResult<Symbol> {
    let symbol = grammar
        .find_match(text)?
        .ok_or_else(|| ExpressionError::NoSymbolMatch {
            text: text.to_string(),
        })?;
    if symbol.weight().is_some() {
        *operators += 1;
        if *operators > MAX_OPERATORS {
            return Err(ExpressionError::ExpressionTooDeep {
                limit: MAX_OPERATORS,
            });
        }
    }
    match root {
        None => Ok(symbol),
        Some(root) => root.merge(symbol),
    }
}

impl fmt::Display for ExpressionTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.root)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expression::grammar::SymbolSpec;
    use crate::expression::symbol::SymbolKind;

    fn build(expression: &str) -> ExpressionResult<String> {
        ExpressionTree::build(expression, &Grammar::default()).map(|tree| tree.to_string())
    }

    fn arithmetic() -> Grammar {
        Grammar::new(vec![
            SymbolSpec::Integer,
            SymbolSpec::binary("+", 10),
            SymbolSpec::binary("-", 10),
            SymbolSpec::binary("*", 20),
        ])
    }

    #[test]
    fn test_single_operator() {
        assert_eq!(build("{title}='Title1'").unwrap(), "[[{title}]=['Title1']]");
        assert_eq!(build("{title}={other}").unwrap(), "[[{title}]=[{other}]]");
        assert_eq!(
            build("{active1}and{active2}").unwrap(),
            "[[{active1}]and[{active2}]]"
        );
        assert_eq!(
            build("  {active1}   or   {active2}  ").unwrap(),
            "[[{active1}]or[{active2}]]"
        );
    }

    #[test]
    fn test_operators_with_different_weight() {
        assert_eq!(
            build("{title} = 'Article 2' or {title} = 'Article 3'").unwrap(),
            "[[[{title}]=['Article 2']]or[[{title}]=['Article 3']]]"
        );
        assert_eq!(
            build("{prop}='something' and {name}='me'").unwrap(),
            "[[[{prop}]=['something']]and[[{name}]=['me']]]"
        );
    }

    #[test]
    fn test_equal_weight_associates_left() {
        assert_eq!(
            build("{a} and {b} or {c}").unwrap(),
            "[[[{a}]and[{b}]]or[{c}]]"
        );
        let tree = ExpressionTree::build("1-2-3", &arithmetic()).unwrap();
        assert_eq!(tree.to_string(), "[[[1]-[2]]-[3]]");
    }

    #[test]
    fn test_heavier_operator_nests_deeper() {
        let tree = ExpressionTree::build("12+38*9", &arithmetic()).unwrap();
        assert_eq!(tree.to_string(), "[[12]+[[38]*[9]]]");

        let tree = ExpressionTree::build("12*38+9", &arithmetic()).unwrap();
        assert_eq!(tree.to_string(), "[[[12]*[38]]+[9]]");

        let tree = ExpressionTree::build("1+2*3*4+5", &arithmetic()).unwrap();
        assert_eq!(tree.to_string(), "[[[1]+[[[2]*[3]]*[4]]]+[5]]");
    }

    #[test]
    fn test_decimal_literal() {
        let tree = ExpressionTree::build("{price} = 12.05", &Grammar::default()).unwrap();
        assert_eq!(tree.to_string(), "[[{price}]=[12.05]]");
        let Symbol::Operator(root) = tree.root() else {
            panic!("expected operator root");
        };
        assert_eq!(
            root.right().map(|s| s.kind()),
            Some(SymbolKind::DecimalLiteral)
        );

        assert_eq!(
            build("{a} = 1.5 and {b} = 2").unwrap(),
            "[[[{a}]=[1.5]]and[[{b}]=[2]]]"
        );
    }

    #[test]
    fn test_boolean_literal() {
        assert_eq!(
            build("{title} = 'x' and {active} = true").unwrap(),
            "[[[{title}]=['x']]and[[{active}]=[true]]]"
        );
    }

    #[test]
    fn test_truncated_expression_keeps_open_slot() {
        let tree = ExpressionTree::build("{a} = ", &Grammar::default()).unwrap();
        assert_eq!(tree.to_string(), "[[{a}]=null]");
        assert!(tree.root().has_pending_slot());
    }

    #[test]
    fn test_malformed_expressions() {
        assert_eq!(
            build("{a} = @@"),
            Err(ExpressionError::NoSymbolMatch {
                text: "@@".to_string()
            })
        );
        assert_eq!(
            build("{a} = 'open"),
            Err(ExpressionError::NoSymbolMatch {
                text: "'open".to_string()
            })
        );
        assert_eq!(
            build("{a} 'x'"),
            Err(ExpressionError::UnexpectedOperand {
                text: "'x'".to_string()
            })
        );
        assert!(matches!(
            build("{a} = 1.'x'"),
            Err(ExpressionError::NoFactoryMatched { .. })
        ));
        assert_eq!(build(""), Err(ExpressionError::EmptyExpression));
        assert_eq!(build("   "), Err(ExpressionError::EmptyExpression));
    }

    #[test]
    fn test_long_integer_is_one_token() {
        assert_eq!(
            build("{a} = 12345678901234567890"),
            Err(ExpressionError::IntegerOverflow {
                text: "12345678901234567890".to_string()
            })
        );
        assert_eq!(
            build("{a} = 12345678901234567890 and {b} = 1"),
            Err(ExpressionError::IntegerOverflow {
                text: "12345678901234567890".to_string()
            })
        );
        assert_eq!(
            build("{a} = 9223372036854775807").unwrap(),
            "[[{a}]=[9223372036854775807]]"
        );
    }

    #[test]
    fn test_operator_limit() {
        let chain = |terms: usize| vec!["{a}"; terms].join(" or ");

        let tree =
            ExpressionTree::build(&chain(MAX_OPERATORS + 1), &Grammar::default()).unwrap();
        assert_eq!(tree.root().weight(), Some(10));
        assert_eq!(
            build(&chain(MAX_OPERATORS + 2)),
            Err(ExpressionError::ExpressionTooDeep {
                limit: MAX_OPERATORS
            })
        );
    }

    #[test]
    fn test_build_is_deterministic() {
        let expression = "{a} = 1 or {b} = 'two' and {c} = 3.25";
        let first = build(expression).unwrap();
        for _ in 0..10 {
            assert_eq!(build(expression).unwrap(), first);
        }
    }
}
