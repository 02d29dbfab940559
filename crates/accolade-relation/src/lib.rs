// crates/accolade-relation/src/lib.rs
// ============================================================================
// Module: Accolade Relation
// Description: Dependency rules for composite achievements.
// Purpose: Wire together the expression validator, parser, and relation tree.
// Dependencies: crate::{error, parser, relation, validator}
// ============================================================================

//! ## Overview
//! Composite achievements unlock when a boolean rule over other achievements
//! holds. This crate compiles rule strings such as `(A & B) | C` into
//! [`Relation`] trees and evaluates them through a [`SatisfactionView`]. It
//! knows nothing about achievements themselves; targets are generic.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod error;
pub mod parser;
pub mod relation;
pub mod validator;


// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use error::RelationError;
pub use error::RelationErrorKind;
pub use parser::RelationParser;
pub use parser::TokenResolver;
pub use parser::parse_relation;
pub use relation::Relation;
pub use relation::RelationLeaf;
pub use relation::RelationOperator;
pub use relation::SatisfactionView;
pub use validator::DefaultExpressionValidator;
pub use validator::ExpressionValidator;
pub use validator::PermissiveValidator;
pub use validator::ValidationLimits;
pub use validator::validate_tree;
