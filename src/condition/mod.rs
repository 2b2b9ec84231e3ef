//! Rule conditions: parsing and structural validation.
//!
//! A rule's *permutation* is an ordered list of `Entity:Value` tokens.
//! This module turns each token into an [`EntityValue`] and checks that a
//! parsed permutation names the entities a rule must constrain before it
//! can be ranked at all.
//!
//! - [`parse_condition`] splits a token on its **first** colon, so values
//!   may contain colons themselves.
//! - [`has_required_entities`] is the structural gate. It looks at entity
//!   names only and never at the query.

mod parser;
mod types;
mod validator;

pub use parser::{parse_condition, ParseConditionError, SEPARATOR};
pub use types::EntityValue;
pub use validator::{has_required_entities, missing_entities, DEFAULT_REQUIRED_ENTITIES};
