//! Error types shared by every stage of the pipeline.
//!
//! Two failure scopes exist:
//!
//! - **Rule-scoped**: a [`MalformedCondition`] belongs to one rule. The
//!   ranking pipeline collects these and keeps evaluating the other rules.
//! - **Call-scoped**: [`Error::InvalidConfiguration`] invalidates the shared
//!   inputs (weights, query, config) and aborts before any rule is processed.

use thiserror::Error;

/// A condition token inside a rule that has no `:` separator.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[error("rule #{rule}: condition {token:?} is missing the ':' separator")]
pub struct MalformedCondition {
    /// Position of the offending rule in the input rule list.
    pub rule: usize,

    /// The raw token as supplied.
    pub token: String,
}

/// Errors returned by the ranking engine.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// A rule carries a condition that cannot be split into entity and value.
    ///
    /// Only surfaced as an `Err` under [`ErrorPolicy::Strict`]; the lenient
    /// policy reports it through [`RankOutcome::skipped`] instead.
    ///
    /// [`ErrorPolicy::Strict`]: crate::ranking::ErrorPolicy::Strict
    /// [`RankOutcome::skipped`]: crate::ranking::RankOutcome::skipped
    #[error("malformed condition: {0}")]
    MalformedCondition(#[from] MalformedCondition),

    /// The weight table, query context, or engine configuration is unusable.
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),
}

impl Error {
    pub(crate) fn config(msg: impl Into<String>) -> Self {
        Error::InvalidConfiguration(msg.into())
    }
}

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, Error>;
