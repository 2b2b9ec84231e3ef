//! Weighted strategy rule matching.
//!
//! Evaluates declarative rules, each a conjunction of `Entity:Value`
//! conditions with an optional strategy label, against a query context and a
//! per-entity weight table, and returns the applicable rules ranked by
//! weighted specificity.
//!
//! - **Condition**: parsing of `Entity:Value` tokens and the structural
//!   gate requiring certain entities (by default `Brand` and `Sport`).
//! - **Matching**: two explicit query policies, any-value and
//!   exact-entity.
//! - **Scoring**: sum of per-entity weights; unknown entities weigh 0.
//! - **Ranking**: filter → score → stable sort, with per-rule error
//!   reporting.
//!
//! # Quick start
//!
//! ```
//! use u_rulematch::matching::{MatchMode, QueryContext};
//! use u_rulematch::ranking::{rank, RawRule};
//! use u_rulematch::scoring::WeightTable;
//!
//! let rules = vec![
//!     RawRule::new(["Brand:Brand 1", "Sport:Basketball"], "strategy_01"),
//!     RawRule::new(["Brand:Brand 1", "Sport:Basketball", "Competition:NBA"], "strategy_04"),
//! ];
//! let weights = WeightTable::new()
//!     .with_weight("Brand", 1)
//!     .with_weight("Sport", 1)
//!     .with_weight("Competition", 1);
//! let query = QueryContext::from_csv("Brand 1, Basketball, NBA");
//!
//! let outcome = rank(&rules, &weights, &query, MatchMode::AnyValue).unwrap();
//! assert_eq!(outcome.strategies(), vec!["strategy_04", "strategy_01"]);
//! ```
//!
//! # Features
//!
//! - `serde`: (de)serialization of inputs and outputs.
//! - `parallel`: rayon-backed per-rule evaluation.
//! - `cli` (default): the `u-rulematch` binary.

pub mod condition;
pub mod error;
pub mod matching;
pub mod ranking;
pub mod scoring;

pub use error::{Error, MalformedCondition, Result};
