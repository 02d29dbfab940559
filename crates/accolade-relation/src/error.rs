// crates/accolade-relation/src/error.rs
// ============================================================================
// Module: Relation Errors
// Description: Error model for expression validation and relation parsing.
// Purpose: Report malformed dependency expressions with stable variants and
//          byte positions.
// Dependencies: thiserror
// ============================================================================

//! ## Overview
//! Every failure raised while turning an expression into a relation tree is a
//! malformed-expression error. [`RelationError`] names the composite
//! achievement that declared the expression and carries a
//! [`RelationErrorKind`] describing what went wrong.

// ============================================================================
// SECTION: Imports
// ============================================================================

use thiserror::Error;

// ============================================================================
// SECTION: Error Kinds
// ============================================================================

/// Structured reasons an expression is malformed.
///
/// # Invariants
/// - `position` fields are byte offsets into the original expression.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RelationErrorKind {
    /// Expression was empty or whitespace only.
    #[error("expression is empty")]
    Empty,
    /// Expression exceeded the configured size limit.
    #[error("expression exceeds size limit: {actual_bytes} bytes (max {max_bytes})")]
    InputTooLarge {
        /// Maximum allowed bytes.
        max_bytes: usize,
        /// Actual expression length in bytes.
        actual_bytes: usize,
    },
    /// Parenthesis groups nest deeper than allowed.
    #[error("expression nesting exceeds limit: depth {actual_depth} (max {max_depth}) at {position}")]
    NestingTooDeep {
        /// Maximum allowed nesting depth.
        max_depth: usize,
        /// Depth reached when the limit tripped.
        actual_depth: usize,
        /// Byte offset of the offending bracket.
        position: usize,
    },
    /// A bracket has no partner.
    #[error("unbalanced bracket at {position}")]
    UnbalancedBrackets {
        /// Byte offset of the unmatched bracket.
        position: usize,
    },
    /// A quote character has no partner.
    #[error("unmatched quote `{quote}` at {position}")]
    UnmatchedQuote {
        /// The quote character.
        quote: char,
        /// Byte offset of the unmatched quote.
        position: usize,
    },
    /// Two operands follow each other without an operator.
    #[error("missing operator before `{found}` at {position}")]
    MissingOperator {
        /// The operand that appeared where an operator was expected.
        found: String,
        /// Byte offset of the operand.
        position: usize,
    },
    /// An operator appeared where an operand was expected.
    #[error("unexpected operator `{found}` at {position}")]
    UnexpectedOperator {
        /// The operator text.
        found: String,
        /// Byte offset of the operator.
        position: usize,
    },
    /// An operator ends a group with no right-hand operand.
    #[error("operator at {position} has no right-hand operand")]
    DanglingOperator {
        /// Byte offset of the trailing operator.
        position: usize,
    },
    /// `&` and `|` were mixed within one unparenthesized group.
    #[error("mixed `&` and `|` without parentheses at {position}")]
    MixedOperators {
        /// Byte offset of the first conflicting operator.
        position: usize,
    },
    /// A parenthesis group contains nothing.
    #[error("empty group at {position}")]
    EmptyGroup {
        /// Byte offset of the opening bracket.
        position: usize,
    },
    /// A token did not resolve to a known achievement.
    #[error("unresolved token `{token}` at {position}")]
    UnresolvedToken {
        /// The unresolved token.
        token: String,
        /// Byte offset of the token.
        position: usize,
    },
    /// A programmatically built tree contains an operator node with no children.
    #[error("operator node has no children")]
    EmptyNode,
    /// A custom validator rejected the expression.
    #[error("{0}")]
    Rejected(String),
}

// ============================================================================
// SECTION: Relation Error
// ============================================================================

/// Malformed-expression error raised while building a composite relation.
///
/// # Invariants
/// - `owner` is the identifier of the achievement that declared the expression.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("malformed relation for `{owner}`: {kind}")]
pub struct RelationError {
    /// Achievement that declared the expression.
    pub owner: String,
    /// Failure detail.
    pub kind: RelationErrorKind,
}

impl RelationError {
    /// Creates a relation error for the given owner.
    #[must_use]
    pub fn new(owner: impl Into<String>, kind: RelationErrorKind) -> Self {
        Self {
            owner: owner.into(),
            kind,
        }
    }
}
