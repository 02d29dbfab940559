// crates/accolade-relation/src/parser.rs
// ============================================================================
// Module: Relation Expression Parser
// Description: Compiles dependency expressions such as `(A & B) | C`.
// Purpose: Turn catalog rule strings into `Relation<T>` trees with validation
//          and pluggable token resolution.
// Dependencies: crate::{error, relation, validator}
// ============================================================================

//! ## Overview
//! Expressions combine tokens with `&` (AND) and `|` (OR); parentheses group
//! sub-expressions. Each group uses exactly one operator, so precedence never
//! matters and mixing `&` and `|` in one unparenthesized group is rejected.
//! `&&` and `||` are accepted as spellings of the same operators. Whitespace
//! is insignificant.
//!
//! Parsing runs in three steps:
//! 1. The configured [`ExpressionValidator`] rejects obviously invalid input.
//! 2. The lexer splits the input into tokens with byte positions.
//! 3. Each parenthesis group is parsed innermost-first into a child node that
//!    takes the group's place in the enclosing operand stream.
//!
//! A group with a single operand yields a one-child AND node so the evaluator
//! always sees an operator at the root.
//!
//! ```
//! use std::collections::HashMap;
//!
//! use accolade_relation::Relation;
//! use accolade_relation::parse_relation;
//!
//! let mut symbols = HashMap::new();
//! symbols.insert("A".to_string(), 1u8);
//! symbols.insert("B".to_string(), 2u8);
//! symbols.insert("C".to_string(), 3u8);
//!
//! let relation = parse_relation("combo", "(A & B) | C", &symbols)?;
//! assert_eq!(
//!     relation,
//!     Relation::or(vec![Relation::and(vec![Relation::leaf(1), Relation::leaf(2)]), Relation::leaf(3)])
//! );
//! # Ok::<(), accolade_relation::RelationError>(())
//! ```

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::collections::HashMap;
use std::hash::BuildHasher;

use crate::error::RelationError;
use crate::error::RelationErrorKind;
use crate::relation::Relation;
use crate::relation::RelationOperator;
use crate::validator::DefaultExpressionValidator;
use crate::validator::ExpressionValidator;
use crate::validator::MAX_EXPRESSION_BYTES;
use crate::validator::MAX_EXPRESSION_NESTING;

// ============================================================================
// SECTION: Token Resolution
// ============================================================================

/// Resolves expression tokens to dependency targets.
///
/// The resolution rule is deliberately pluggable: a catalog may match tokens
/// against identifiers, symbolic names, or type labels.
pub trait TokenResolver<T> {
    /// Returns the target for `token`, or `None` when it is unknown.
    fn resolve(&self, token: &str) -> Option<T>;
}

impl<T: Clone, S: BuildHasher> TokenResolver<T> for HashMap<String, T, S> {
    fn resolve(&self, token: &str) -> Option<T> {
        self.get(token).cloned()
    }
}

impl<T: Clone> TokenResolver<T> for BTreeMap<String, T> {
    fn resolve(&self, token: &str) -> Option<T> {
        self.get(token).cloned()
    }
}

impl<T, F> TokenResolver<T> for F
where
    F: Fn(&str) -> Option<T>,
{
    fn resolve(&self, token: &str) -> Option<T> {
        (self)(token)
    }
}

// ============================================================================
// SECTION: Public API
// ============================================================================

/// Parses an expression with the default validator.
///
/// # Arguments
/// * `owner` - Identifier of the composite achievement declaring the rule.
/// * `expression` - Rule text, e.g. `"(A & B) | C"`.
/// * `resolver` - Maps tokens to targets.
///
/// # Errors
/// Returns [`RelationError`] when brackets are unbalanced, an operator is
/// missing, operators are mixed, or a token does not resolve.
pub fn parse_relation<T, R>(
    owner: &str,
    expression: &str,
    resolver: &R,
) -> Result<Relation<T>, RelationError>
where
    R: TokenResolver<T> + ?Sized,
{
    RelationParser::new().parse(owner, expression, resolver)
}

/// Expression parser with a configurable validator.
#[derive(Debug, Clone, Default)]
pub struct RelationParser<V = DefaultExpressionValidator> {
    /// Early syntactic validator.
    validator: V,
}

impl RelationParser {
    /// Creates a parser using [`DefaultExpressionValidator`].
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl<V: ExpressionValidator> RelationParser<V> {
    /// Creates a parser using the given validator.
    #[must_use]
    pub const fn with_validator(validator: V) -> Self {
        Self {
            validator,
        }
    }

    /// Returns the configured validator.
    #[must_use]
    pub const fn validator(&self) -> &V {
        &self.validator
    }

    /// Parses `expression` into a relation tree owned by `owner`.
    ///
    /// # Errors
    /// Returns [`RelationError`] when validation, lexing, or structural
    /// parsing fails.
    pub fn parse<T, R>(
        &self,
        owner: &str,
        expression: &str,
        resolver: &R,
    ) -> Result<Relation<T>, RelationError>
    where
        R: TokenResolver<T> + ?Sized,
    {
        let fail = |kind: RelationErrorKind| RelationError::new(owner, kind);
        self.validator.validate(expression).map_err(fail)?;
        if expression.len() > MAX_EXPRESSION_BYTES {
            return Err(fail(RelationErrorKind::InputTooLarge {
                max_bytes: MAX_EXPRESSION_BYTES,
                actual_bytes: expression.len(),
            }));
        }
        let tokens = Lexer::new(expression).lex();
        if tokens.is_empty() {
            return Err(fail(RelationErrorKind::Empty));
        }
        let mut parser = GroupParser {
            resolver,
            nesting: 0,
            _marker: std::marker::PhantomData,
        };
        parser.parse_group(&tokens, 0).map_err(fail)
    }
}

// ============================================================================
// SECTION: Lexer
// ============================================================================

/// Lexer token produced from an expression.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Token<'a> {
    /// Operand text.
    Ident(&'a str),
    /// AND operator.
    And,
    /// OR operator.
    Or,
    /// Left parenthesis.
    LParen,
    /// Right parenthesis.
    RParen,
}

/// Token paired with its byte offset.
#[derive(Debug, Clone, Copy)]
struct SpannedToken<'a> {
    /// Token value.
    token: Token<'a>,
    /// Byte offset into the expression.
    position: usize,
}

impl SpannedToken<'_> {
    /// Formats the token for diagnostics.
    fn describe(&self) -> String {
        match self.token {
            Token::Ident(text) => text.to_string(),
            Token::And => "&".to_string(),
            Token::Or => "|".to_string(),
            Token::LParen => "(".to_string(),
            Token::RParen => ")".to_string(),
        }
    }
}

/// Returns true for bytes that end an operand.
const fn is_delimiter(byte: u8) -> bool {
    matches!(byte, b'&' | b'|' | b'(' | b')') || byte.is_ascii_whitespace()
}

/// Lexer for dependency expressions.
struct Lexer<'a> {
    /// Source expression.
    input: &'a str,
    /// Current byte offset.
    offset: usize,
}

impl<'a> Lexer<'a> {
    /// Creates a lexer over the expression.
    const fn new(input: &'a str) -> Self {
        Self {
            input,
            offset: 0,
        }
    }

    /// Splits the expression into tokens.
    fn lex(&mut self) -> Vec<SpannedToken<'a>> {
        let mut tokens = Vec::new();
        let bytes = self.input.as_bytes();

        while let Some(&byte) = bytes.get(self.offset) {
            let position = self.offset;
            let token = match byte {
                b if b.is_ascii_whitespace() => {
                    self.offset += 1;
                    continue;
                }
                b'(' => Token::LParen,
                b')' => Token::RParen,
                b'&' => Token::And,
                b'|' => Token::Or,
                _ => {
                    // Operands are delimited by ASCII bytes only, so slicing
                    // at these offsets stays on char boundaries.
                    while bytes.get(self.offset).is_some_and(|&b| !is_delimiter(b)) {
                        self.offset += 1;
                    }
                    tokens.push(SpannedToken {
                        token: Token::Ident(&self.input[position .. self.offset]),
                        position,
                    });
                    continue;
                }
            };
            self.offset += 1;
            if matches!(token, Token::And | Token::Or) && bytes.get(self.offset) == Some(&byte) {
                self.offset += 1;
            }
            tokens.push(SpannedToken {
                token,
                position,
            });
        }
        tokens
    }
}

// ============================================================================
// SECTION: Group Parser
// ============================================================================

/// Parses token slices group by group.
struct GroupParser<'r, T, R: ?Sized> {
    /// Token resolver.
    resolver: &'r R,
    /// Current group nesting depth.
    nesting: usize,
    /// Marker for the target type.
    _marker: std::marker::PhantomData<T>,
}

impl<T, R> GroupParser<'_, T, R>
where
    R: TokenResolver<T> + ?Sized,
{
    /// Parses one group's token stream into an operator node.
    ///
    /// `open` is the byte offset of the group's opening bracket and is only
    /// used for empty-group diagnostics.
    fn parse_group(
        &mut self,
        tokens: &[SpannedToken<'_>],
        open: usize,
    ) -> Result<Relation<T>, RelationErrorKind> {
        let mut children: Vec<Relation<T>> = Vec::new();
        let mut operator: Option<RelationOperator> = None;
        let mut last_operator_at: Option<usize> = None;
        let mut expect_operand = true;
        let mut index = 0;

        while let Some(current) = tokens.get(index) {
            match current.token {
                Token::LParen => {
                    if !expect_operand {
                        return Err(RelationErrorKind::MissingOperator {
                            found: current.describe(),
                            position: current.position,
                        });
                    }
                    let close = matching_close(tokens, index)?;
                    let inner = &tokens[index + 1 .. close];
                    let child = self.with_nesting(current.position, |parser| {
                        parser.parse_group(inner, current.position)
                    })?;
                    children.push(child);
                    expect_operand = false;
                    index = close + 1;
                }
                Token::RParen => {
                    return Err(RelationErrorKind::UnbalancedBrackets {
                        position: current.position,
                    });
                }
                Token::Ident(text) => {
                    if !expect_operand {
                        return Err(RelationErrorKind::MissingOperator {
                            found: current.describe(),
                            position: current.position,
                        });
                    }
                    let target = self.resolver.resolve(text).ok_or_else(|| {
                        RelationErrorKind::UnresolvedToken {
                            token: text.to_string(),
                            position: current.position,
                        }
                    })?;
                    children.push(Relation::leaf(target));
                    expect_operand = false;
                    index += 1;
                }
                Token::And | Token::Or => {
                    if expect_operand {
                        return Err(RelationErrorKind::UnexpectedOperator {
                            found: current.describe(),
                            position: current.position,
                        });
                    }
                    let next = if matches!(current.token, Token::And) {
                        RelationOperator::And
                    } else {
                        RelationOperator::Or
                    };
                    match operator {
                        Some(existing) if existing != next => {
                            return Err(RelationErrorKind::MixedOperators {
                                position: current.position,
                            });
                        }
                        _ => operator = Some(next),
                    }
                    last_operator_at = Some(current.position);
                    expect_operand = true;
                    index += 1;
                }
            }
        }

        if expect_operand {
            return Err(match last_operator_at {
                Some(position) => RelationErrorKind::DanglingOperator {
                    position,
                },
                None if self.nesting == 0 => RelationErrorKind::Empty,
                None => RelationErrorKind::EmptyGroup {
                    position: open,
                },
            });
        }
        Ok(Relation::node(operator.unwrap_or(RelationOperator::And), children))
    }

    /// Runs a parser step while enforcing the nesting limit.
    fn with_nesting<O>(
        &mut self,
        position: usize,
        f: impl FnOnce(&mut Self) -> Result<O, RelationErrorKind>,
    ) -> Result<O, RelationErrorKind> {
        let next_depth = self.nesting + 1;
        if next_depth > MAX_EXPRESSION_NESTING {
            return Err(RelationErrorKind::NestingTooDeep {
                max_depth: MAX_EXPRESSION_NESTING,
                actual_depth: next_depth,
                position,
            });
        }
        self.nesting = next_depth;
        let result = f(self);
        self.nesting = self.nesting.saturating_sub(1);
        result
    }
}

/// Finds the index of the bracket closing the group opened at `open`.
fn matching_close(tokens: &[SpannedToken<'_>], open: usize) -> Result<usize, RelationErrorKind> {
    let mut depth = 0usize;
    for (index, spanned) in tokens.iter().enumerate().skip(open) {
        match spanned.token {
            Token::LParen => depth += 1,
            Token::RParen => {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    return Ok(index);
                }
            }
            _ => {}
        }
    }
    let position = tokens.get(open).map_or(0, |spanned| spanned.position);
    Err(RelationErrorKind::UnbalancedBrackets {
        position,
    })
}
