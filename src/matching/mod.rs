//! Query matching policies.
//!
//! Two policies decide whether a rule applies to the caller's selection:
//!
//! - **[`MatchMode::AnyValue`]**: the rule's condition values intersect a
//!   flat list of selected values. Permissive; entity names are ignored.
//! - **[`MatchMode::ExactEntity`]**: every condition the rule declares is
//!   bound to exactly that value in an entity-keyed query.
//!
//! Each policy consumes its own [`QueryContext`] shape. A [`QueryMatcher`]
//! pairs a policy with a query and rejects mismatched shapes up front.

mod matcher;
mod types;

pub use matcher::QueryMatcher;
pub use types::{MatchMode, QueryContext};
