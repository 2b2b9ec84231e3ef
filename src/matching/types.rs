//! Match policy and query context types.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::error::Error;

/// How a rule's conditions are compared against the query context.
///
/// The two policies give materially different result sets for the same
/// inputs, so the choice is always explicit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "snake_case")
)]
pub enum MatchMode {
    /// A rule matches if any of its condition values equals any selected
    /// query value. Entity names are ignored.
    ///
    /// Expects [`QueryContext::Values`].
    #[default]
    AnyValue,

    /// A rule matches if every `(entity, value)` it declares is bound to
    /// exactly that value in the query. Query entities the rule does not
    /// mention are unconstrained.
    ///
    /// Expects [`QueryContext::Entities`].
    ExactEntity,
}

impl MatchMode {
    /// Name of the query shape this mode consumes.
    pub fn expected_shape(self) -> &'static str {
        match self {
            MatchMode::AnyValue => QueryContext::VALUES_SHAPE,
            MatchMode::ExactEntity => QueryContext::ENTITIES_SHAPE,
        }
    }
}

impl fmt::Display for MatchMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            MatchMode::AnyValue => "any_value",
            MatchMode::ExactEntity => "exact_entity",
        })
    }
}

impl FromStr for MatchMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "any" | "any_value" => Ok(MatchMode::AnyValue),
            "exact" | "exact_entity" => Ok(MatchMode::ExactEntity),
            other => Err(Error::config(format!(
                "unknown match mode {other:?} (expected any_value or exact_entity)"
            ))),
        }
    }
}

/// The caller's current selection.
///
/// The two shapes correspond one-to-one with the two [`MatchMode`]s. With the
/// `serde` feature a JSON array deserializes as [`Values`](Self::Values) and
/// a JSON object as [`Entities`](Self::Entities).
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(untagged)
)]
pub enum QueryContext {
    /// Flat list of selected values, entity unspecified.
    Values(Vec<String>),

    /// One selected value per entity name.
    Entities(BTreeMap<String, String>),
}

impl QueryContext {
    pub(crate) const VALUES_SHAPE: &'static str = "value list";
    pub(crate) const ENTITIES_SHAPE: &'static str = "entity map";

    /// Builds a value-list query.
    pub fn values<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        QueryContext::Values(values.into_iter().map(Into::into).collect())
    }

    /// Builds an entity-map query. A later binding for the same entity
    /// replaces an earlier one.
    pub fn entities<I, K, V>(bindings: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        QueryContext::Entities(
            bindings
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }

    /// Parses a comma-separated value list such as
    /// `"Brand 1, Basketball, NBA"`.
    ///
    /// Each part is trimmed and empty parts are dropped.
    ///
    /// # Examples
    ///
    /// ```
    /// use u_rulematch::matching::QueryContext;
    ///
    /// let q = QueryContext::from_csv(" Brand 1, Basketball,, ");
    /// assert_eq!(q, QueryContext::values(["Brand 1", "Basketball"]));
    /// ```
    pub fn from_csv(input: &str) -> Self {
        Self::values(input.split(',').map(str::trim).filter(|s| !s.is_empty()))
    }

    /// Name of this query's shape, for diagnostics.
    pub fn shape(&self) -> &'static str {
        match self {
            QueryContext::Values(_) => Self::VALUES_SHAPE,
            QueryContext::Entities(_) => Self::ENTITIES_SHAPE,
        }
    }

    /// Number of selected values.
    pub fn len(&self) -> usize {
        match self {
            QueryContext::Values(v) => v.len(),
            QueryContext::Entities(m) => m.len(),
        }
    }

    /// Returns `true` if nothing is selected.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
