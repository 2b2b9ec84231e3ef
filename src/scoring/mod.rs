//! Weighted specificity scoring.
//!
//! A rule's score is the sum of the weights of the entities its conditions
//! name. Entities missing from the [`WeightTable`] weigh 0, so a table only
//! needs entries for the axes that should make a rule rank higher.

mod weights;

pub use weights::WeightTable;
