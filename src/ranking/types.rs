//! Rule records at the input boundary and in the ranked output.

use crate::condition::{parse_condition, EntityValue};
use crate::error::MalformedCondition;

/// A rule as supplied by the caller: raw `Entity:Value` tokens plus an
/// optional strategy label.
///
/// With the `serde` feature a missing `permutation` key reads as an empty
/// list and a missing `strategy` as `null`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RawRule {
    /// Condition tokens, each expected to be `"<entity>:<value>"`.
    #[cfg_attr(feature = "serde", serde(default))]
    pub permutation: Vec<String>,

    /// Strategy label. `None` marks the rule inert.
    #[cfg_attr(feature = "serde", serde(default))]
    pub strategy: Option<String>,
}

impl RawRule {
    /// Creates an active rule resolving to `strategy`.
    pub fn new<I, S>(permutation: I, strategy: impl Into<String>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            permutation: permutation.into_iter().map(Into::into).collect(),
            strategy: Some(strategy.into()),
        }
    }

    /// Creates an inert rule (no strategy).
    pub fn inert<I, S>(permutation: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            permutation: permutation.into_iter().map(Into::into).collect(),
            strategy: None,
        }
    }
}

/// A rule whose conditions have been parsed.
///
/// Built once at the input boundary by [`Rule::parse`]; the pipeline works
/// on these and never touches raw tokens again.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rule {
    /// Position of the rule in the caller's input.
    pub index: usize,

    /// Parsed conditions in input order.
    pub conditions: Vec<EntityValue>,

    /// Strategy label. `None` marks the rule inert.
    pub strategy: Option<String>,
}

impl Rule {
    /// Creates a rule from already-structured conditions.
    pub fn new(index: usize, conditions: Vec<EntityValue>, strategy: Option<String>) -> Self {
        Self {
            index,
            conditions,
            strategy,
        }
    }

    /// Parses every token of `raw`.
    ///
    /// On failure returns one [`MalformedCondition`] per offending token, in
    /// token order, so callers can report all of them at once.
    pub fn parse(index: usize, raw: &RawRule) -> Result<Self, Vec<MalformedCondition>> {
        let mut conditions = Vec::with_capacity(raw.permutation.len());
        let mut malformed = Vec::new();

        for token in &raw.permutation {
            match parse_condition(token) {
                Ok(ev) => conditions.push(ev),
                Err(e) => malformed.push(MalformedCondition {
                    rule: index,
                    token: e.token,
                }),
            }
        }

        if malformed.is_empty() {
            Ok(Self::new(index, conditions, raw.strategy.clone()))
        } else {
            Err(malformed)
        }
    }

    /// Returns `true` if the rule has no strategy and can never match.
    pub fn is_inert(&self) -> bool {
        self.strategy.is_none()
    }
}

/// One entry of the ranked output.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MatchedRule {
    /// Position of the source rule in the caller's input.
    pub index: usize,

    /// Strategy the rule resolves to.
    pub strategy: String,

    /// Sum of the weights of the rule's condition entities.
    pub score: u64,

    /// The rule's conditions, for display.
    #[cfg_attr(feature = "serde", serde(rename = "permutation"))]
    pub conditions: Vec<EntityValue>,
}

/// Result of a ranking call.
///
/// `skipped` is non-empty only under the lenient error policy; an empty
/// `matches` with an empty `skipped` means no rule applied.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RankOutcome {
    /// Applicable rules, highest score first.
    pub matches: Vec<MatchedRule>,

    /// Condition tokens that could not be parsed. Their rules were not
    /// evaluated.
    pub skipped: Vec<MalformedCondition>,
}

impl RankOutcome {
    /// Returns `true` if every rule parsed cleanly.
    pub fn is_clean(&self) -> bool {
        self.skipped.is_empty()
    }

    /// The highest-ranked match, if any.
    pub fn best(&self) -> Option<&MatchedRule> {
        self.matches.first()
    }

    /// Strategy labels in ranked order.
    pub fn strategies(&self) -> Vec<&str> {
        self.matches.iter().map(|m| m.strategy.as_str()).collect()
    }

    /// Distinct indices of rules that were skipped, ascending.
    pub fn skipped_rules(&self) -> Vec<usize> {
        let mut rules: Vec<usize> = self.skipped.iter().map(|s| s.rule).collect();
        rules.dedup();
        rules
    }
}
