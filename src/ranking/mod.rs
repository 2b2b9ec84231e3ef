//! Rule ranking pipeline.
//!
//! Composes parsing, the structural gate, query matching, and scoring into
//! a single deterministic call:
//!
//! ```text
//! raw rules ─▶ parse ─▶ drop inert ─▶ required-entity gate ─▶ query match ─▶ score ─▶ sort
//! ```
//!
//! - **Stateless**: a [`RuleEngine`] holds configuration only. Identical
//!   inputs always give identical, identically ordered output.
//! - **Error scoping**: configuration problems abort the call; a malformed
//!   rule affects only that rule (see [`ErrorPolicy`]).
//! - **Ordering**: descending score, ties in input order unless
//!   [`TieBreaker::ByStrategy`] is selected.

mod config;
mod engine;
mod types;

pub use config::{ErrorPolicy, RankConfig, TieBreaker};
pub use engine::{parse_rules, rank, RuleEngine};
pub use types::{MatchedRule, RankOutcome, RawRule, Rule};
