//! `Entity:Value` token parsing.

use thiserror::Error;

use super::types::EntityValue;

/// Separator between entity name and value in a raw condition token.
pub const SEPARATOR: char = ':';

/// A raw token that does not contain [`SEPARATOR`].
///
/// Carries no rule position; the ranking pipeline attaches one when it
/// turns this into a [`MalformedCondition`](crate::MalformedCondition).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("condition {token:?} is missing the ':' separator")]
pub struct ParseConditionError {
    /// The offending token, untrimmed.
    pub token: String,
}

/// Parses a raw `"<entity>:<value>"` token.
///
/// Splits on the first colon only and trims surrounding whitespace from both
/// halves. An empty entity or value is syntactically valid; no semantic
/// checks happen here.
///
/// # Examples
///
/// ```
/// use u_rulematch::condition::parse_condition;
///
/// let ev = parse_condition("TimeBased: 12:00-14:00").unwrap();
/// assert_eq!(ev.entity, "TimeBased");
/// assert_eq!(ev.value, "12:00-14:00");
///
/// assert!(parse_condition("BrandBrand 1").is_err());
/// ```
pub fn parse_condition(token: &str) -> Result<EntityValue, ParseConditionError> {
    let (entity, value) = token
        .split_once(SEPARATOR)
        .ok_or_else(|| ParseConditionError {
            token: token.to_string(),
        })?;
    Ok(EntityValue::new(entity.trim(), value.trim()))
}
