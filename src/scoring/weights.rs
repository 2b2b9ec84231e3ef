//! Per-entity weight table and the scorer.

use std::collections::{BTreeMap, HashMap};

use crate::condition::EntityValue;
use crate::error::{Error, Result};

/// Maps entity names to non-negative integer weights.
///
/// Lookups for unknown entities yield 0, never an error. Tables built from
/// signed input ([`try_from_signed`](Self::try_from_signed), or JSON with the
/// `serde` feature) reject negative weights as
/// [`Error::InvalidConfiguration`].
///
/// # Examples
///
/// ```
/// use u_rulematch::condition::EntityValue;
/// use u_rulematch::scoring::WeightTable;
///
/// let weights = WeightTable::new()
///     .with_weight("Brand", 1)
///     .with_weight("Market", 4);
///
/// let perm = [
///     EntityValue::new("Brand", "Brand 1"),
///     EntityValue::new("Market", "Market 3"),
///     EntityValue::new("Unknown", "x"),
/// ];
/// assert_eq!(weights.score(&perm), 5);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(
        try_from = "BTreeMap<String, i64>",
        into = "BTreeMap<String, u64>"
    )
)]
pub struct WeightTable {
    weights: HashMap<String, u64>,
}

impl WeightTable {
    /// Creates an empty table. Every entity weighs 0.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a table from signed weights, rejecting negative entries.
    ///
    /// The first negative weight encountered is reported. A later entry for
    /// the same entity replaces an earlier one.
    pub fn try_from_signed<I, K>(weights: I) -> Result<Self>
    where
        I: IntoIterator<Item = (K, i64)>,
        K: Into<String>,
    {
        let mut table = Self::new();
        for (entity, weight) in weights {
            let entity = entity.into();
            let weight = u64::try_from(weight).map_err(|_| {
                Error::config(format!(
                    "weight for entity {entity:?} is negative ({weight})"
                ))
            })?;
            table.weights.insert(entity, weight);
        }
        Ok(table)
    }

    /// Sets the weight for `entity`, returning the previous one.
    pub fn insert(&mut self, entity: impl Into<String>, weight: u64) -> Option<u64> {
        self.weights.insert(entity.into(), weight)
    }

    /// Builder form of [`insert`](Self::insert).
    pub fn with_weight(mut self, entity: impl Into<String>, weight: u64) -> Self {
        self.insert(entity, weight);
        self
    }

    /// Weight of `entity`, or 0 if the table has no entry for it.
    pub fn weight(&self, entity: &str) -> u64 {
        self.weights.get(entity).copied().unwrap_or(0)
    }

    /// Sums the weights of every condition's entity.
    ///
    /// Duplicate entities count once per occurrence. Saturates at
    /// `u64::MAX`.
    pub fn score(&self, conditions: &[EntityValue]) -> u64 {
        conditions
            .iter()
            .fold(0u64, |acc, c| acc.saturating_add(self.weight(&c.entity)))
    }

    /// Number of entities with an explicit weight.
    pub fn len(&self) -> usize {
        self.weights.len()
    }

    /// Returns `true` if no entity has an explicit weight.
    pub fn is_empty(&self) -> bool {
        self.weights.is_empty()
    }

    /// Iterates over explicit `(entity, weight)` entries in arbitrary order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, u64)> {
        self.weights.iter().map(|(k, v)| (k.as_str(), *v))
    }
}

impl<K: Into<String>> FromIterator<(K, u64)> for WeightTable {
    fn from_iter<T: IntoIterator<Item = (K, u64)>>(iter: T) -> Self {
        Self {
            weights: iter.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }
}

impl TryFrom<BTreeMap<String, i64>> for WeightTable {
    type Error = Error;

    fn try_from(weights: BTreeMap<String, i64>) -> Result<Self> {
        Self::try_from_signed(weights)
    }
}

impl From<WeightTable> for BTreeMap<String, u64> {
    fn from(table: WeightTable) -> Self {
        table.weights.into_iter().collect()
    }
}
