//! Ranking configuration.
//!
//! [`RankConfig`] holds every knob of the pipeline. The engine never
//! hard-codes a match policy; it always comes from here.

use std::str::FromStr;

use crate::condition::DEFAULT_REQUIRED_ENTITIES;
use crate::error::{Error, Result};
use crate::matching::MatchMode;

/// Ordering among matches with equal score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "snake_case")
)]
pub enum TieBreaker {
    /// Keep the input order (stable sort).
    #[default]
    PreserveOrder,

    /// Order by strategy label, then by input index.
    ByStrategy,
}

impl FromStr for TieBreaker {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "preserve_order" | "input" => Ok(TieBreaker::PreserveOrder),
            "by_strategy" | "strategy" => Ok(TieBreaker::ByStrategy),
            other => Err(Error::config(format!(
                "unknown tie breaker {other:?} (expected preserve_order or by_strategy)"
            ))),
        }
    }
}

/// What to do with rules whose conditions fail to parse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "snake_case")
)]
pub enum ErrorPolicy {
    /// Skip malformed rules, rank the rest, and report the skipped
    /// conditions in [`RankOutcome::skipped`](super::RankOutcome::skipped).
    #[default]
    Lenient,

    /// Fail the whole call with the first malformed condition.
    Strict,
}

/// Configuration for [`RuleEngine`](super::RuleEngine).
///
/// # Defaults
///
/// ```
/// use u_rulematch::matching::MatchMode;
/// use u_rulematch::ranking::{ErrorPolicy, RankConfig, TieBreaker};
///
/// let config = RankConfig::default();
/// assert_eq!(config.match_mode, MatchMode::AnyValue);
/// assert_eq!(config.required_entities, vec!["Brand", "Sport"]);
/// assert_eq!(config.tie_breaker, TieBreaker::PreserveOrder);
/// assert_eq!(config.error_policy, ErrorPolicy::Lenient);
/// assert_eq!(config.limit, None);
/// ```
///
/// # Builder Pattern
///
/// ```
/// use u_rulematch::matching::MatchMode;
/// use u_rulematch::ranking::{ErrorPolicy, RankConfig};
///
/// let config = RankConfig::default()
///     .with_match_mode(MatchMode::ExactEntity)
///     .with_error_policy(ErrorPolicy::Strict)
///     .with_limit(3);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RankConfig {
    /// Query match policy.
    pub match_mode: MatchMode,

    /// Entity names every rule must constrain to be eligible.
    ///
    /// Checked on entity names only, independent of the query. Empty
    /// disables the gate.
    pub required_entities: Vec<String>,

    /// Ordering among equal scores.
    pub tie_breaker: TieBreaker,

    /// Handling of malformed rules.
    pub error_policy: ErrorPolicy,

    /// Keep only the top `n` matches. `None` keeps all.
    pub limit: Option<usize>,

    /// Whether to evaluate rules in parallel using rayon.
    ///
    /// Only takes effect with the `parallel` feature. Output is identical
    /// either way.
    pub parallel: bool,
}

impl Default for RankConfig {
    fn default() -> Self {
        Self {
            match_mode: MatchMode::default(),
            required_entities: DEFAULT_REQUIRED_ENTITIES.iter().map(|s| s.to_string()).collect(),
            tie_breaker: TieBreaker::default(),
            error_policy: ErrorPolicy::default(),
            limit: None,
            parallel: false,
        }
    }
}

impl RankConfig {
    /// Sets the match policy.
    pub fn with_match_mode(mut self, mode: MatchMode) -> Self {
        self.match_mode = mode;
        self
    }

    /// Replaces the required entity set.
    pub fn with_required_entities<I, S>(mut self, entities: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.required_entities = entities.into_iter().map(Into::into).collect();
        self
    }

    /// Sets the tie-breaking strategy.
    pub fn with_tie_breaker(mut self, tb: TieBreaker) -> Self {
        self.tie_breaker = tb;
        self
    }

    /// Sets the malformed-rule policy.
    pub fn with_error_policy(mut self, policy: ErrorPolicy) -> Self {
        self.error_policy = policy;
        self
    }

    /// Keeps only the top `n` matches.
    pub fn with_limit(mut self, n: usize) -> Self {
        self.limit = Some(n);
        self
    }

    /// Enables or disables parallel rule evaluation.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Validates the configuration.
    ///
    /// Returns [`Error::InvalidConfiguration`] describing the first invalid
    /// parameter.
    pub fn validate(&self) -> Result<()> {
        if let Some(pos) = self.required_entities.iter().position(|e| e.trim().is_empty()) {
            return Err(Error::config(format!(
                "required entity #{pos} is empty"
            )));
        }
        if self.limit == Some(0) {
            return Err(Error::config("limit must be positive or None"));
        }
        Ok(())
    }
}
