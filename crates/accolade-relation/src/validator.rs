// crates/accolade-relation/src/validator.rs
// ============================================================================
// Module: Expression Validation
// Description: Pre-parse expression checks and post-build tree checks.
// Purpose: Reject syntactically invalid input before structural parsing and
//          bound the shape of relation trees.
// Dependencies: crate::{error, relation}
// ============================================================================

//! ## Overview
//! The parser consults an [`ExpressionValidator`] before tokenizing. The rule
//! set is a configuration surface: [`DefaultExpressionValidator`] rejects empty
//! or oversized input, unbalanced brackets, unmatched quotes, and excessive
//! nesting, while [`PermissiveValidator`] leaves everything to the parser.
//! [`validate_tree`] applies the same limits to trees built in code.
//! Security posture: expressions come from catalog files and are untrusted.

// ============================================================================
// SECTION: Imports
// ============================================================================

use crate::error::RelationErrorKind;
use crate::relation::Relation;

// ============================================================================
// SECTION: Limits
// ============================================================================

/// Maximum allowed expression size in bytes.
pub const MAX_EXPRESSION_BYTES: usize = 1024 * 1024;
/// Maximum supported parenthesis nesting depth.
pub const MAX_EXPRESSION_NESTING: usize = 32;

/// Limits applied to expressions and relation trees.
///
/// # Invariants
/// - No invariants are enforced; callers should choose safe bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValidationLimits {
    /// Maximum expression length in bytes.
    pub max_bytes: usize,
    /// Maximum nesting depth of parenthesis groups.
    pub max_nesting: usize,
}

impl Default for ValidationLimits {
    fn default() -> Self {
        Self {
            max_bytes: MAX_EXPRESSION_BYTES,
            max_nesting: MAX_EXPRESSION_NESTING,
        }
    }
}

// ============================================================================
// SECTION: Validator Trait
// ============================================================================

/// Early syntactic check run before structural parsing.
pub trait ExpressionValidator {
    /// Validates the raw expression.
    ///
    /// # Errors
    /// Returns [`RelationErrorKind`] describing the first problem found.
    fn validate(&self, expression: &str) -> Result<(), RelationErrorKind>;
}

impl<F> ExpressionValidator for F
where
    F: Fn(&str) -> Result<(), RelationErrorKind>,
{
    fn validate(&self, expression: &str) -> Result<(), RelationErrorKind> {
        (self)(expression)
    }
}

/// Validator that accepts every expression.
#[derive(Debug, Clone, Copy, Default)]
pub struct PermissiveValidator;

impl ExpressionValidator for PermissiveValidator {
    fn validate(&self, _expression: &str) -> Result<(), RelationErrorKind> {
        Ok(())
    }
}

// ============================================================================
// SECTION: Default Validator
// ============================================================================

/// Validator enforcing size, bracket, quote, and nesting rules.
///
/// # Invariants
/// - Uses the stored [`ValidationLimits`] for every decision.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultExpressionValidator {
    /// Limits to enforce.
    limits: ValidationLimits,
}

impl DefaultExpressionValidator {
    /// Creates a validator with explicit limits.
    #[must_use]
    pub const fn new(limits: ValidationLimits) -> Self {
        Self {
            limits,
        }
    }

    /// Returns the configured limits.
    #[must_use]
    pub const fn limits(&self) -> ValidationLimits {
        self.limits
    }
}

impl ExpressionValidator for DefaultExpressionValidator {
    fn validate(&self, expression: &str) -> Result<(), RelationErrorKind> {
        if expression.len() > self.limits.max_bytes {
            return Err(RelationErrorKind::InputTooLarge {
                max_bytes: self.limits.max_bytes,
                actual_bytes: expression.len(),
            });
        }
        if expression.trim().is_empty() {
            return Err(RelationErrorKind::Empty);
        }
        check_quotes(expression)?;
        check_brackets(expression, self.limits.max_nesting)
    }
}

/// Rejects any quote character without a partner of the same kind.
fn check_quotes(expression: &str) -> Result<(), RelationErrorKind> {
    let mut open: Option<(char, usize)> = None;
    for (position, ch) in expression.char_indices() {
        if ch != '"' && ch != '\'' {
            continue;
        }
        match open {
            Some((quote, _)) if quote == ch => open = None,
            Some(_) => {}
            None => open = Some((ch, position)),
        }
    }
    match open {
        Some((quote, position)) => Err(RelationErrorKind::UnmatchedQuote {
            quote,
            position,
        }),
        None => Ok(()),
    }
}

/// Checks bracket balance and nesting depth.
fn check_brackets(expression: &str, max_nesting: usize) -> Result<(), RelationErrorKind> {
    let mut stack: Vec<usize> = Vec::new();
    for (position, ch) in expression.char_indices() {
        match ch {
            '(' => {
                stack.push(position);
                if stack.len() > max_nesting {
                    return Err(RelationErrorKind::NestingTooDeep {
                        max_depth: max_nesting,
                        actual_depth: stack.len(),
                        position,
                    });
                }
            }
            ')' => {
                if stack.pop().is_none() {
                    return Err(RelationErrorKind::UnbalancedBrackets {
                        position,
                    });
                }
            }
            _ => {}
        }
    }
    match stack.last() {
        Some(&position) => Err(RelationErrorKind::UnbalancedBrackets {
            position,
        }),
        None => Ok(()),
    }
}

// ============================================================================
// SECTION: Tree Validation
// ============================================================================

/// Validates a relation tree built outside the parser.
///
/// # Errors
/// Returns [`RelationErrorKind::EmptyNode`] for childless operator nodes and
/// [`RelationErrorKind::NestingTooDeep`] when the tree is deeper than the
/// nesting limit allows.
pub fn validate_tree<T>(relation: &Relation<T>, limits: ValidationLimits) -> Result<(), RelationErrorKind> {
    validate_node(relation, 0, limits)
}

/// Recursive worker for [`validate_tree`].
fn validate_node<T>(
    relation: &Relation<T>,
    depth: usize,
    limits: ValidationLimits,
) -> Result<(), RelationErrorKind> {
    // The root node and its immediate leaves sit outside any group.
    if depth > limits.max_nesting + 1 {
        return Err(RelationErrorKind::NestingTooDeep {
            max_depth: limits.max_nesting,
            actual_depth: depth.saturating_sub(1),
            position: 0,
        });
    }
    if relation.operator().is_some() && relation.children().is_empty() {
        return Err(RelationErrorKind::EmptyNode);
    }
    for child in relation.children() {
        validate_node(child, depth + 1, limits)?;
    }
    Ok(())
}
