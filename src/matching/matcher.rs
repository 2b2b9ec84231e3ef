//! Query match predicate.

use std::collections::{BTreeMap, HashSet};

use super::types::{MatchMode, QueryContext};
use crate::condition::EntityValue;
use crate::error::{Error, Result};

/// Lookup structure prepared from the query for one policy.
#[derive(Debug)]
enum Prepared<'q> {
    AnyValue(HashSet<&'q str>),
    ExactEntity(&'q BTreeMap<String, String>),
}

/// Decides whether a rule's conditions satisfy a query context.
///
/// Built once per ranking call; construction checks that the query has the
/// shape the mode consumes so [`matches`](Self::matches) itself cannot fail.
///
/// # Examples
///
/// ```
/// use u_rulematch::condition::EntityValue;
/// use u_rulematch::matching::{MatchMode, QueryContext, QueryMatcher};
///
/// let query = QueryContext::entities([("Brand", "Brand 1"), ("Sport", "Basketball")]);
/// let matcher = QueryMatcher::new(MatchMode::ExactEntity, &query).unwrap();
///
/// assert!(matcher.matches(&[EntityValue::new("Brand", "Brand 1")]));
/// assert!(!matcher.matches(&[EntityValue::new("Brand", "Brand 2")]));
/// ```
#[derive(Debug)]
pub struct QueryMatcher<'q> {
    mode: MatchMode,
    prepared: Prepared<'q>,
}

impl<'q> QueryMatcher<'q> {
    /// Prepares `query` for matching under `mode`.
    ///
    /// Returns [`Error::InvalidConfiguration`] if the query shape does not
    /// correspond to the mode.
    pub fn new(mode: MatchMode, query: &'q QueryContext) -> Result<Self> {
        let prepared = match (mode, query) {
            (MatchMode::AnyValue, QueryContext::Values(values)) => {
                Prepared::AnyValue(values.iter().map(String::as_str).collect())
            }
            (MatchMode::ExactEntity, QueryContext::Entities(bindings)) => {
                Prepared::ExactEntity(bindings)
            }
            _ => {
                return Err(Error::config(format!(
                    "match mode {mode}: expected {} query, got {}",
                    mode.expected_shape(),
                    query.shape()
                )))
            }
        };
        Ok(Self { mode, prepared })
    }

    /// The policy this matcher applies.
    pub fn mode(&self) -> MatchMode {
        self.mode
    }

    /// Returns `true` if `conditions` satisfy the query under this policy.
    pub fn matches(&self, conditions: &[EntityValue]) -> bool {
        match &self.prepared {
            Prepared::AnyValue(selected) => conditions
                .iter()
                .any(|c| selected.contains(c.value.as_str())),
            Prepared::ExactEntity(bindings) => conditions
                .iter()
                .all(|c| bindings.get(&c.entity).is_some_and(|v| *v == c.value)),
        }
    }
}
