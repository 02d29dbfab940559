// crates/accolade-relation/src/relation.rs
// ============================================================================
// Module: Relation Tree
// Description: Boolean dependency tree over achievements.
// Purpose: Define `Relation`, its leaves, and short-circuit evaluation through
//          a read-only satisfaction view.
// Dependencies: serde::{Deserialize, Serialize}, smallvec::SmallVec
// ============================================================================

//! ## Overview
//! A [`Relation`] is either an operator node (AND or OR over an ordered list of
//! children) or a leaf naming one dependency. Leaves never read achievement
//! state directly; evaluation asks a [`SatisfactionView`] whether the target is
//! satisfied, so composite rules may reference other composite rules.
//!
//! Evaluation is a pure query. AND stops at the first unsatisfied child and OR
//! stops at the first satisfied child.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

use serde::Deserialize;
use serde::Serialize;
use smallvec::SmallVec;

// ============================================================================
// SECTION: Operators
// ============================================================================

/// Operator applied uniformly to every child of a relation node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RelationOperator {
    /// Every child must be satisfied.
    And,
    /// At least one child must be satisfied.
    Or,
}

impl RelationOperator {
    /// Returns the expression symbol for the operator.
    #[must_use]
    pub const fn symbol(self) -> char {
        match self {
            Self::And => '&',
            Self::Or => '|',
        }
    }
}

// ============================================================================
// SECTION: Relation Definition
// ============================================================================

/// Dependency on a single achievement inside a relation tree.
///
/// # Invariants
/// - `value` of `None` defers to the dependency's own stored score.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RelationLeaf<T> {
    /// Referenced achievement.
    pub target: T,
    /// Explicit comparison value, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<u64>,
}

/// Boolean tree over achievement dependencies.
///
/// # Invariants
/// - Trees produced by the parser never contain an operator node without
///   children.
/// - Trees are immutable once built and acyclic by construction.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Relation<T> {
    /// Operator node over ordered children.
    Node {
        /// Operator shared by every child.
        operator: RelationOperator,
        /// Ordered children.
        children: SmallVec<[Box<Self>; 4]>,
    },
    /// Single dependency.
    Leaf(RelationLeaf<T>),
}

impl<T> Relation<T> {
    /// Builds an operator node from the given children.
    #[must_use]
    pub fn node(operator: RelationOperator, children: Vec<Self>) -> Self {
        Self::Node {
            operator,
            children: children.into_iter().map(Box::new).collect(),
        }
    }

    /// Builds an AND node.
    #[must_use]
    pub fn and(children: Vec<Self>) -> Self {
        Self::node(RelationOperator::And, children)
    }

    /// Builds an OR node.
    #[must_use]
    pub fn or(children: Vec<Self>) -> Self {
        Self::node(RelationOperator::Or, children)
    }

    /// Builds a leaf with no explicit comparison value.
    #[must_use]
    pub const fn leaf(target: T) -> Self {
        Self::Leaf(RelationLeaf {
            target,
            value: None,
        })
    }

    /// Builds a leaf compared against an explicit value.
    #[must_use]
    pub const fn leaf_with_value(target: T, value: u64) -> Self {
        Self::Leaf(RelationLeaf {
            target,
            value: Some(value),
        })
    }

    /// Returns the node operator, or `None` for a leaf.
    #[must_use]
    pub const fn operator(&self) -> Option<RelationOperator> {
        match self {
            Self::Node {
                operator, ..
            } => Some(*operator),
            Self::Leaf(_) => None,
        }
    }

    /// Returns the node children; leaves have none.
    #[must_use]
    pub fn children(&self) -> &[Box<Self>] {
        match self {
            Self::Node {
                children, ..
            } => children.as_slice(),
            Self::Leaf(_) => &[],
        }
    }

    /// Returns the leaf payload when this is a leaf.
    #[must_use]
    pub const fn as_leaf(&self) -> Option<&RelationLeaf<T>> {
        match self {
            Self::Leaf(leaf) => Some(leaf),
            Self::Node {
                ..
            } => None,
        }
    }

    /// Returns the depth of the tree; a lone leaf has depth 1.
    #[must_use]
    pub fn depth(&self) -> usize {
        match self {
            Self::Leaf(_) => 1,
            Self::Node {
                children, ..
            } => 1 + children.iter().map(|child| child.depth()).max().unwrap_or(0),
        }
    }

    /// Returns every leaf target in left-to-right order.
    #[must_use]
    pub fn targets(&self) -> Vec<&T> {
        let mut out = Vec::new();
        self.collect_targets(&mut out);
        out
    }

    /// Appends leaf targets to `out`.
    fn collect_targets<'a>(&'a self, out: &mut Vec<&'a T>) {
        match self {
            Self::Leaf(leaf) => out.push(&leaf.target),
            Self::Node {
                children, ..
            } => {
                for child in children {
                    child.collect_targets(out);
                }
            }
        }
    }

    /// Evaluates the tree against a satisfaction view.
    ///
    /// An empty AND node is satisfied and an empty OR node is not.
    ///
    /// # Errors
    /// Returns the view's error when a leaf query fails; evaluation stops at
    /// the first failure.
    pub fn evaluate<V>(&self, view: &V) -> Result<bool, V::Error>
    where
        V: SatisfactionView<T> + ?Sized,
    {
        match self {
            Self::Leaf(leaf) => view.is_satisfied(&leaf.target, leaf.value),
            Self::Node {
                operator: RelationOperator::And,
                children,
            } => {
                for child in children {
                    if !child.evaluate(view)? {
                        return Ok(false);
                    }
                }
                Ok(true)
            }
            Self::Node {
                operator: RelationOperator::Or,
                children,
            } => {
                for child in children {
                    if child.evaluate(view)? {
                        return Ok(true);
                    }
                }
                Ok(false)
            }
        }
    }
}

impl<T: fmt::Display> fmt::Display for Relation<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Leaf(leaf) => write!(f, "{}", leaf.target),
            Self::Node {
                operator,
                children,
            } => {
                write!(f, "(")?;
                for (index, child) in children.iter().enumerate() {
                    if index > 0 {
                        write!(f, " {} ", operator.symbol())?;
                    }
                    write!(f, "{child}")?;
                }
                write!(f, ")")
            }
        }
    }
}

// ============================================================================
// SECTION: Satisfaction View
// ============================================================================

/// Read-only capability answering whether a dependency is satisfied.
///
/// Implementations must not mutate achievement state; evaluation may call
/// them repeatedly and concurrently.
pub trait SatisfactionView<T: ?Sized> {
    /// Error raised when the underlying state cannot be read.
    type Error;

    /// Returns true when `target` is unlocked or its own condition holds at
    /// `value`.
    ///
    /// # Errors
    /// Returns an implementation-defined error when state cannot be read.
    fn is_satisfied(&self, target: &T, value: Option<u64>) -> Result<bool, Self::Error>;
}

impl<T, E, F> SatisfactionView<T> for F
where
    T: ?Sized,
    F: Fn(&T, Option<u64>) -> Result<bool, E>,
{
    type Error = E;

    fn is_satisfied(&self, target: &T, value: Option<u64>) -> Result<bool, Self::Error> {
        (self)(target, value)
    }
}
