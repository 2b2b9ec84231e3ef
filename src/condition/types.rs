//! The structured form of a single condition.

use std::fmt;
use std::str::FromStr;

use super::parser::{parse_condition, ParseConditionError, SEPARATOR};

/// One `(entity, value)` requirement inside a rule.
///
/// Both parts are free-form and compared as exact, case-sensitive strings.
/// Displays (and, with the `serde` feature, serializes) as `entity:value`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntityValue {
    /// Axis of classification, e.g. `"Brand"`.
    pub entity: String,

    /// Selected value on that axis, e.g. `"Brand 1"`.
    pub value: String,
}

impl EntityValue {
    /// Creates a pair without any trimming or validation.
    pub fn new(entity: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            entity: entity.into(),
            value: value.into(),
        }
    }
}

impl fmt::Display for EntityValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}{}", self.entity, SEPARATOR, self.value)
    }
}

impl FromStr for EntityValue {
    type Err = ParseConditionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_condition(s)
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for EntityValue {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for EntityValue {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}
