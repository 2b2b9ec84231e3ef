//! Structural gate on a rule's condition set.

use super::types::EntityValue;

/// Entities every rule must constrain unless configured otherwise.
pub const DEFAULT_REQUIRED_ENTITIES: [&str; 2] = ["Brand", "Sport"];

/// Returns `true` if every entity in `required` appears as an entity name in
/// `conditions`.
///
/// Matching is exact and case-sensitive on the entity name; values are
/// ignored. An empty `required` list always passes.
///
/// # Examples
///
/// ```
/// use u_rulematch::condition::{has_required_entities, EntityValue};
///
/// let perm = vec![
///     EntityValue::new("Brand", "Brand 1"),
///     EntityValue::new("Sport", "Basketball"),
/// ];
/// assert!(has_required_entities(&perm, &["Brand", "Sport"]));
/// assert!(!has_required_entities(&perm[..1], &["Brand", "Sport"]));
/// ```
pub fn has_required_entities<S: AsRef<str>>(conditions: &[EntityValue], required: &[S]) -> bool {
    required
        .iter()
        .all(|name| conditions.iter().any(|c| c.entity == name.as_ref()))
}

/// Lists the entries of `required` that `conditions` does not name, in
/// `required` order.
pub fn missing_entities<'r, S: AsRef<str>>(
    conditions: &[EntityValue],
    required: &'r [S],
) -> Vec<&'r str> {
    required
        .iter()
        .map(AsRef::as_ref)
        .filter(|name| !conditions.iter().any(|c| c.entity == *name))
        .collect()
}
