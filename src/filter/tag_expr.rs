//! Cucumber tag expressions.
//!
//! A tag expression is a boolean expression over Gherkin tags, e.g.
//! `@smoke and not (@slow or @wip)`. Operators by increasing precedence are
//! `or`, `and` and the unary `not`; parentheses group. Any other
//! whitespace-delimited token is a tag literal. A backslash escapes `(`,
//! `)`, `\` or whitespace inside a literal.
//!
//! Expressions are parsed once with [`parse`] (a shunting-yard parser) into
//! an immutable [`TagExpression`] that can be evaluated against any number
//! of tag sets.
//!
//! ```
//! use saucectl::filter::tag_expr;
//!
//! let expr = tag_expr::parse("@act3 and not @credits")?;
//! assert!(expr.evaluate(&["@act3"]));
//! assert!(!expr.evaluate(&["@act3", "@credits"]));
//! # Ok::<(), saucectl::filter::tag_expr::TagExpressionError>(())
//! ```

use std::fmt;
use std::str::FromStr;

/// Errors produced while parsing a tag expression.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TagExpressionError {
    #[error(
        "Tag expression \"{expr}\" could not be parsed because of syntax error: Illegal escape before \"{ch}\"."
    )]
    IllegalEscape { expr: String, ch: char },

    #[error(
        "Tag expression \"{expr}\" could not be parsed because of syntax error: Expected escaped character."
    )]
    TrailingEscape { expr: String },

    #[error("Tag expression \"{expr}\" could not be parsed because of syntax error: Expected {expected}.")]
    Expected {
        expr: String,
        expected: &'static str,
    },

    #[error("Tag expression \"{expr}\" could not be parsed because of syntax error: Unmatched (.")]
    UnmatchedOpen { expr: String },

    #[error("Tag expression \"{expr}\" could not be parsed because of syntax error: Unmatched ).")]
    UnmatchedClose { expr: String },

    #[error("Tag expression \"{expr}\" could not be parsed because of an empty operand.")]
    EmptyOperand { expr: String },
}

/// A parsed tag expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TagExpression {
    /// The empty expression; matches every tag set.
    True,
    Literal(String),
    And(Box<TagExpression>, Box<TagExpression>),
    Or(Box<TagExpression>, Box<TagExpression>),
    Not(Box<TagExpression>),
}

impl TagExpression {
    /// Returns true if `tags` satisfies the expression.
    pub fn evaluate<S: AsRef<str>>(&self, tags: &[S]) -> bool {
        match self {
            TagExpression::True => true,
            TagExpression::Literal(name) => tags.iter().any(|t| t.as_ref() == name),
            TagExpression::And(left, right) => left.evaluate(tags) && right.evaluate(tags),
            TagExpression::Or(left, right) => left.evaluate(tags) || right.evaluate(tags),
            TagExpression::Not(inner) => !inner.evaluate(tags),
        }
    }
}

impl fmt::Display for TagExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TagExpression::True => write!(f, "true"),
            TagExpression::Literal(name) => {
                for c in name.chars() {
                    if c == '\\' || c == '(' || c == ')' || c.is_whitespace() {
                        write!(f, "\\")?;
                    }
                    write!(f, "{c}")?;
                }
                Ok(())
            }
            TagExpression::And(left, right) => write!(f, "( {left} and {right} )"),
            TagExpression::Or(left, right) => write!(f, "( {left} or {right} )"),
            TagExpression::Not(inner) => match inner.as_ref() {
                TagExpression::And(..) | TagExpression::Or(..) => write!(f, "not {inner}"),
                _ => write!(f, "not ( {inner} )"),
            },
        }
    }
}

impl FromStr for TagExpression {
    type Err = TagExpressionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse(s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Operator {
    Or,
    And,
    Not,
    OpenParen,
}

impl Operator {
    fn precedence(self) -> u8 {
        match self {
            Operator::OpenParen => 0,
            Operator::Or => 0,
            Operator::And => 1,
            Operator::Not => 2,
        }
    }

    fn is_left_assoc(self) -> bool {
        !matches!(self, Operator::Not)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Token {
    Op(Operator),
    CloseParen,
    Literal(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Expect {
    Operand,
    Operator,
}

/// Parses a Cucumber tag expression.
pub fn parse(expr: &str) -> Result<TagExpression, TagExpressionError> {
    let tokens = tokenize(expr)?;

    let mut operators: Vec<Operator> = Vec::new();
    let mut operands: Vec<TagExpression> = Vec::new();
    let mut expected = Expect::Operand;

    for token in tokens {
        match token {
            Token::Op(Operator::Not) => {
                check(expr, expected, Expect::Operand)?;
                operators.push(Operator::Not);
                expected = Expect::Operand;
            }
            Token::Op(op @ (Operator::And | Operator::Or)) => {
                check(expr, expected, Expect::Operator)?;
                while let Some(&top) = operators.last() {
                    if top == Operator::OpenParen {
                        break;
                    }
                    let reduce = if op.is_left_assoc() {
                        op.precedence() <= top.precedence()
                    } else {
                        op.precedence() < top.precedence()
                    };
                    if !reduce {
                        break;
                    }
                    operators.pop();
                    reduce_into(expr, top, &mut operands)?;
                }
                operators.push(op);
                expected = Expect::Operand;
            }
            Token::Op(Operator::OpenParen) => {
                check(expr, expected, Expect::Operand)?;
                operators.push(Operator::OpenParen);
                expected = Expect::Operand;
            }
            Token::CloseParen => {
                check(expr, expected, Expect::Operator)?;
                loop {
                    match operators.pop() {
                        Some(Operator::OpenParen) => break,
                        Some(op) => reduce_into(expr, op, &mut operands)?,
                        None => {
                            return Err(TagExpressionError::UnmatchedClose {
                                expr: expr.to_string(),
                            });
                        }
                    }
                }
                expected = Expect::Operator;
            }
            Token::Literal(name) => {
                check(expr, expected, Expect::Operand)?;
                operands.push(TagExpression::Literal(name));
                expected = Expect::Operator;
            }
        }
    }

    while let Some(op) = operators.pop() {
        if op == Operator::OpenParen {
            return Err(TagExpressionError::UnmatchedOpen {
                expr: expr.to_string(),
            });
        }
        reduce_into(expr, op, &mut operands)?;
    }

    let result = operands.pop().unwrap_or(TagExpression::True);
    if !operands.is_empty() {
        return Err(TagExpressionError::Expected {
            expr: expr.to_string(),
            expected: "operator",
        });
    }
    Ok(result)
}

fn tokenize(expr: &str) -> Result<Vec<Token>, TagExpressionError> {
    let mut tokens = Vec::new();
    let mut literal = String::new();
    let mut escaped = false;

    let flush = |literal: &mut String, tokens: &mut Vec<Token>| {
        if !literal.is_empty() {
            let word = std::mem::take(literal);
            tokens.push(match word.as_str() {
                "and" => Token::Op(Operator::And),
                "or" => Token::Op(Operator::Or),
                "not" => Token::Op(Operator::Not),
                _ => Token::Literal(word),
            });
        }
    };

    for c in expr.chars() {
        if escaped {
            if c == '(' || c == ')' || c == '\\' || c.is_whitespace() {
                literal.push(c);
                escaped = false;
            } else {
                return Err(TagExpressionError::IllegalEscape {
                    expr: expr.to_string(),
                    ch: c,
                });
            }
        } else if c == '\\' {
            escaped = true;
        } else if c == '(' || c == ')' || c.is_whitespace() {
            flush(&mut literal, &mut tokens);
            match c {
                '(' => tokens.push(Token::Op(Operator::OpenParen)),
                ')' => tokens.push(Token::CloseParen),
                _ => {}
            }
        } else {
            literal.push(c);
        }
    }

    if escaped {
        return Err(TagExpressionError::TrailingEscape {
            expr: expr.to_string(),
        });
    }
    flush(&mut literal, &mut tokens);

    Ok(tokens)
}

fn check(expr: &str, actual: Expect, wanted: Expect) -> Result<(), TagExpressionError> {
    if actual == wanted {
        return Ok(());
    }
    Err(TagExpressionError::Expected {
        expr: expr.to_string(),
        expected: match actual {
            Expect::Operand => "operand",
            Expect::Operator => "operator",
        },
    })
}

fn reduce_into(
    expr: &str,
    op: Operator,
    operands: &mut Vec<TagExpression>,
) -> Result<(), TagExpressionError> {
    let empty = || TagExpressionError::EmptyOperand {
        expr: expr.to_string(),
    };

    let node = match op {
        Operator::Not => {
            let inner = operands.pop().ok_or_else(empty)?;
            TagExpression::Not(Box::new(inner))
        }
        Operator::And | Operator::Or => {
            let right = operands.pop().ok_or_else(empty)?;
            let left = operands.pop().ok_or_else(empty)?;
            if op == Operator::And {
                TagExpression::And(Box::new(left), Box::new(right))
            } else {
                TagExpression::Or(Box::new(left), Box::new(right))
            }
        }
        Operator::OpenParen => return Err(empty()),
    };
    operands.push(node);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn eval(expr: &str, tags: &[&str]) -> bool {
        parse(expr).unwrap().evaluate(tags)
    }

    #[test]
    fn test_and_not() {
        assert!(eval("@act3 and not @credits", &["@act3"]));
        assert!(!eval("@act3 and not @credits", &["@act3", "@credits"]));
        assert!(!eval("@act3 and not @credits", &[]));
    }

    #[test]
    fn test_precedence() {
        // and binds tighter than or
        assert!(eval("@a or @b and @c", &["@a"]));
        assert!(!eval("@a or @b and @c", &["@b"]));
        assert!(eval("(@a or @b) and @c", &["@b", "@c"]));
        assert!(!eval("(@a or @b) and @c", &["@a"]));
        // not binds tighter than and
        assert!(eval("not @a and @b", &["@b"]));
        assert!(!eval("not @a and @b", &["@a", "@b"]));
        assert!(eval("not not @a", &["@a"]));
    }

    #[test]
    fn test_empty_expression_matches_everything() {
        assert_eq!(parse("").unwrap(), TagExpression::True);
        assert!(eval("   ", &[]));
        assert!(eval("", &["@anything"]));
    }

    #[test]
    fn test_display() {
        assert_eq!(
            parse("not @a or @b and @c").unwrap().to_string(),
            "( not ( @a ) or ( @b and @c ) )"
        );
        assert_eq!(
            parse("not (@a or @b)").unwrap().to_string(),
            "not ( @a or @b )"
        );
        assert_eq!(parse(r"@a\ b").unwrap().to_string(), r"@a\ b");
    }

    #[test]
    fn test_escapes() {
        assert!(eval(r"@with\(paren\)", &["@with(paren)"]));
        assert!(eval(r"@back\\slash", &[r"@back\slash"]));
        assert!(eval(r"@with\ space", &["@with space"]));
    }

    #[test]
    fn test_parse_errors() {
        assert!(matches!(
            parse("@a and"),
            Err(TagExpressionError::EmptyOperand { .. })
        ));
        assert!(matches!(
            parse("@a @b"),
            Err(TagExpressionError::Expected {
                expected: "operator",
                ..
            })
        ));
        assert!(matches!(
            parse("and @a"),
            Err(TagExpressionError::Expected {
                expected: "operand",
                ..
            })
        ));
        assert!(matches!(
            parse("(@a or @b"),
            Err(TagExpressionError::UnmatchedOpen { .. })
        ));
        assert!(matches!(
            parse("@a or @b)"),
            Err(TagExpressionError::UnmatchedClose { .. })
        ));
        assert!(matches!(
            parse(r"@a\b"),
            Err(TagExpressionError::IllegalEscape { ch: 'b', .. })
        ));
        assert!(matches!(
            parse(r"@a\"),
            Err(TagExpressionError::TrailingEscape { .. })
        ));
    }

    #[test]
    fn test_error_message() {
        let err = parse("(@a").unwrap_err();
        assert_eq!(
            err.to_string(),
            "Tag expression \"(@a\" could not be parsed because of syntax error: Unmatched (."
        );
    }

    #[test]
    fn test_from_str() {
        let expr: TagExpression = "@smoke and not @slow".parse().unwrap();
        assert!(expr.evaluate(&["@smoke".to_string()]));
    }
}
