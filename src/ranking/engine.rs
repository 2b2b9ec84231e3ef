//! Rule ranking engine.

use tracing::{debug, trace};

use super::config::{ErrorPolicy, RankConfig, TieBreaker};
use super::types::{MatchedRule, RankOutcome, RawRule, Rule};
use crate::condition::{has_required_entities, missing_entities};
use crate::error::{MalformedCondition, Result};
use crate::matching::{MatchMode, QueryContext, QueryMatcher};
use crate::scoring::WeightTable;

/// Parses raw rules at the input boundary.
///
/// Returns the rules that parsed cleanly, in input order, and every
/// malformed token ordered by rule index then token position.
pub fn parse_rules(raw: &[RawRule]) -> (Vec<Rule>, Vec<MalformedCondition>) {
    let mut rules = Vec::with_capacity(raw.len());
    let mut skipped = Vec::new();

    for (index, r) in raw.iter().enumerate() {
        match Rule::parse(index, r) {
            Ok(rule) => rules.push(rule),
            Err(mut errs) => {
                for e in &errs {
                    debug!(rule = index, token = %e.token, "skipping rule with malformed condition");
                }
                skipped.append(&mut errs);
            }
        }
    }

    (rules, skipped)
}

/// Filters, scores, and orders rules against a query.
///
/// The engine holds only configuration; every call builds its working state
/// from the arguments and drops it afterwards, so one engine can be shared
/// across threads.
///
/// # Pipeline
///
/// 1. Validate the configuration and query shape (abort on failure).
/// 2. Parse raw rules; malformed ones are skipped or abort the call,
///    depending on [`ErrorPolicy`].
/// 3. Drop inert rules (no strategy).
/// 4. Drop rules missing a required entity.
/// 5. Drop rules that do not match the query.
/// 6. Score, sort descending, apply the tie-breaker and limit.
///
/// # Examples
///
/// ```
/// use u_rulematch::matching::{MatchMode, QueryContext};
/// use u_rulematch::ranking::{RankConfig, RawRule, RuleEngine};
/// use u_rulematch::scoring::WeightTable;
///
/// let rules = vec![
///     RawRule::new(["Brand:Brand 1", "Sport:Basketball"], "S1"),
///     RawRule::new(["Grade:A", "Market:M3"], "S2"),
/// ];
/// let weights: WeightTable = [("Brand", 1), ("Sport", 1), ("Grade", 3), ("Market", 4)]
///     .into_iter()
///     .collect();
/// let query = QueryContext::values(["Brand 1", "Basketball"]);
///
/// let engine = RuleEngine::new(RankConfig::default().with_match_mode(MatchMode::AnyValue));
/// let outcome = engine.rank(&rules, &weights, &query).unwrap();
///
/// assert_eq!(outcome.strategies(), vec!["S1"]);
/// assert_eq!(outcome.matches[0].score, 2);
/// ```
#[derive(Debug, Clone, Default)]
pub struct RuleEngine {
    config: RankConfig,
}

impl RuleEngine {
    /// Creates an engine with the given configuration.
    pub fn new(config: RankConfig) -> Self {
        Self { config }
    }

    /// The engine's configuration.
    pub fn config(&self) -> &RankConfig {
        &self.config
    }

    /// Ranks raw rules.
    ///
    /// Configuration errors (invalid [`RankConfig`], query shape not
    /// matching the mode) abort before any rule is looked at. Under
    /// [`ErrorPolicy::Strict`] the first malformed condition of a rule with
    /// a strategy is returned as an error; under [`ErrorPolicy::Lenient`] it
    /// is reported in [`RankOutcome::skipped`] and the remaining rules are
    /// ranked. Malformed conditions in inert rules are only ever reported.
    pub fn rank(
        &self,
        rules: &[RawRule],
        weights: &WeightTable,
        query: &QueryContext,
    ) -> Result<RankOutcome> {
        let matcher = self.prepare(query)?;

        let (parsed, skipped) = parse_rules(rules);
        if self.config.error_policy == ErrorPolicy::Strict {
            // Inert rules never take part, so their tokens cannot abort.
            if let Some(first) = skipped.iter().find(|s| rules[s.rule].strategy.is_some()) {
                return Err(first.clone().into());
            }
        }

        let matches = self.rank_with(&parsed, weights, &matcher);
        debug!(
            rules = rules.len(),
            matched = matches.len(),
            skipped = skipped.len(),
            mode = %self.config.match_mode,
            "ranking complete"
        );
        Ok(RankOutcome { matches, skipped })
    }

    /// Ranks rules that were already parsed.
    ///
    /// Ties under [`TieBreaker::PreserveOrder`] keep the order of `rules`.
    pub fn rank_parsed(
        &self,
        rules: &[Rule],
        weights: &WeightTable,
        query: &QueryContext,
    ) -> Result<Vec<MatchedRule>> {
        let matcher = self.prepare(query)?;
        Ok(self.rank_with(rules, weights, &matcher))
    }

    /// Evaluates a single parsed rule: `Some` with its score if it is
    /// active, structurally eligible, and matches.
    pub fn evaluate(
        &self,
        rule: &Rule,
        weights: &WeightTable,
        query: &QueryContext,
    ) -> Result<Option<MatchedRule>> {
        let matcher = self.prepare(query)?;
        Ok(self.evaluate_with(rule, weights, &matcher))
    }

    fn prepare<'q>(&self, query: &'q QueryContext) -> Result<QueryMatcher<'q>> {
        self.config.validate()?;
        QueryMatcher::new(self.config.match_mode, query)
    }

    fn rank_with(
        &self,
        rules: &[Rule],
        weights: &WeightTable,
        matcher: &QueryMatcher<'_>,
    ) -> Vec<MatchedRule> {
        let mut matches = self.filter_and_score(rules, weights, matcher);

        // `sort_by` is stable, which is what PreserveOrder relies on.
        match self.config.tie_breaker {
            TieBreaker::PreserveOrder => matches.sort_by(|a, b| b.score.cmp(&a.score)),
            TieBreaker::ByStrategy => matches.sort_by(|a, b| {
                b.score
                    .cmp(&a.score)
                    .then_with(|| a.strategy.cmp(&b.strategy))
                    .then_with(|| a.index.cmp(&b.index))
            }),
        }

        if let Some(limit) = self.config.limit {
            matches.truncate(limit);
        }
        matches
    }

    #[cfg(feature = "parallel")]
    fn filter_and_score(
        &self,
        rules: &[Rule],
        weights: &WeightTable,
        matcher: &QueryMatcher<'_>,
    ) -> Vec<MatchedRule> {
        use rayon::prelude::*;

        if self.config.parallel {
            rules
                .par_iter()
                .filter_map(|rule| self.evaluate_with(rule, weights, matcher))
                .collect()
        } else {
            rules
                .iter()
                .filter_map(|rule| self.evaluate_with(rule, weights, matcher))
                .collect()
        }
    }

    #[cfg(not(feature = "parallel"))]
    fn filter_and_score(
        &self,
        rules: &[Rule],
        weights: &WeightTable,
        matcher: &QueryMatcher<'_>,
    ) -> Vec<MatchedRule> {
        rules
            .iter()
            .filter_map(|rule| self.evaluate_with(rule, weights, matcher))
            .collect()
    }

    fn evaluate_with(
        &self,
        rule: &Rule,
        weights: &WeightTable,
        matcher: &QueryMatcher<'_>,
    ) -> Option<MatchedRule> {
        let Some(strategy) = rule.strategy.as_ref() else {
            trace!(rule = rule.index, "inert rule");
            return None;
        };

        if !has_required_entities(&rule.conditions, &self.config.required_entities) {
            debug!(
                rule = rule.index,
                missing = ?missing_entities(&rule.conditions, &self.config.required_entities),
                "rule lacks required entities"
            );
            return None;
        }

        if !matcher.matches(&rule.conditions) {
            trace!(rule = rule.index, "rule does not match query");
            return None;
        }

        let score = weights.score(&rule.conditions);
        trace!(rule = rule.index, score, "rule matched");

        Some(MatchedRule {
            index: rule.index,
            strategy: strategy.clone(),
            score,
            conditions: rule.conditions.clone(),
        })
    }
}

/// Ranks `rules` with the default configuration and the given match mode.
///
/// Shorthand for `RuleEngine::new(RankConfig::default().with_match_mode(mode)).rank(..)`.
pub fn rank(
    rules: &[RawRule],
    weights: &WeightTable,
    query: &QueryContext,
    mode: MatchMode,
) -> Result<RankOutcome> {
    RuleEngine::new(RankConfig::default().with_match_mode(mode)).rank(rules, weights, query)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::condition::EntityValue;
    use crate::error::Error;

    fn weights() -> WeightTable {
        [
            ("Brand", 1),
            ("Sport", 1),
            ("Competition", 1),
            ("Grade", 3),
            ("Market", 4),
            ("TimeBased", 5),
            ("Cohort", 6),
        ]
        .into_iter()
        .collect()
    }

    fn default_rules() -> Vec<RawRule> {
        vec![
            RawRule::new(["Brand:Brand 1", "Sport:Basketball"], "strategy_01"),
            RawRule::new(["Grade:A", "Market:Market 3"], "strategy_02"),
            RawRule::inert(["TimeBased:24 hours", "Sport:Football", "Competition:NFL"]),
            RawRule::new(["Brand:Brand 2", "Grade:C", "Cohort:Cohort A"], "strategy_03"),
            RawRule::new(
                ["Brand:Brand 1", "Sport:Basketball", "Competition:NBA"],
                "strategy_04",
            ),
            RawRule::new(["Brand:Brand 1", "Competition:NBA"], "strategy_05"),
        ]
    }

    #[test]
    fn test_default_form_values() {
        let query = QueryContext::from_csv("Brand 1, Basketball, NBA, A, 24 hours, Cohort B");
        let outcome = rank(&default_rules(), &weights(), &query, MatchMode::AnyValue).unwrap();

        assert!(outcome.is_clean());
        assert_eq!(outcome.strategies(), vec!["strategy_04", "strategy_01"]);
        assert_eq!(outcome.matches[0].score, 3);
        assert_eq!(outcome.matches[1].score, 2);
        assert_eq!(outcome.matches[0].index, 4);
    }

    #[test]
    fn test_inert_rule_never_ranks() {
        let rules = vec![RawRule::inert(["Brand:Brand 1", "Sport:Basketball"])];
        let query = QueryContext::values(["Brand 1"]);
        let outcome = rank(&rules, &weights(), &query, MatchMode::AnyValue).unwrap();
        assert!(outcome.matches.is_empty());
        assert!(outcome.is_clean());
    }

    #[test]
    fn test_exact_entity_mode() {
        let query = QueryContext::entities([
            ("Brand", "Brand 1"),
            ("Sport", "Basketball"),
            ("Competition", "NBA"),
        ]);
        let outcome = rank(&default_rules(), &weights(), &query, MatchMode::ExactEntity).unwrap();
        assert_eq!(outcome.strategies(), vec!["strategy_04", "strategy_01"]);
    }

    #[test]
    fn test_stable_ties() {
        let rules = vec![
            RawRule::new(["Brand:B", "Sport:X"], "zeta"),
            RawRule::new(["Brand:B", "Sport:Y"], "alpha"),
            RawRule::new(["Brand:B", "Sport:Z"], "mid"),
        ];
        let query = QueryContext::values(["B"]);
        let outcome = rank(&rules, &weights(), &query, MatchMode::AnyValue).unwrap();
        assert_eq!(outcome.strategies(), vec!["zeta", "alpha", "mid"]);
    }

    #[test]
    fn test_by_strategy_tie_breaker() {
        let rules = vec![
            RawRule::new(["Brand:B", "Sport:X"], "zeta"),
            RawRule::new(["Brand:B", "Sport:Y", "Grade:A"], "top"),
            RawRule::new(["Brand:B", "Sport:Y"], "alpha"),
        ];
        let query = QueryContext::values(["B"]);
        let engine = RuleEngine::new(RankConfig::default().with_tie_breaker(TieBreaker::ByStrategy));
        let outcome = engine.rank(&rules, &weights(), &query).unwrap();
        assert_eq!(outcome.strategies(), vec!["top", "alpha", "zeta"]);
    }

    #[test]
    fn test_limit_truncates_after_sort() {
        let query = QueryContext::from_csv("Brand 1, Basketball, NBA");
        let engine = RuleEngine::new(RankConfig::default().with_limit(1));
        let outcome = engine.rank(&default_rules(), &weights(), &query).unwrap();
        assert_eq!(outcome.strategies(), vec!["strategy_04"]);
    }

    #[test]
    fn test_lenient_skips_malformed_rule() {
        let mut rules = default_rules();
        rules[0] = RawRule::new(["BrandBrand 1", "Sport:Basketball"], "strategy_01");
        let query = QueryContext::from_csv("Brand 1, Basketball, NBA");

        let outcome = rank(&rules, &weights(), &query, MatchMode::AnyValue).unwrap();
        assert_eq!(outcome.strategies(), vec!["strategy_04"]);
        assert_eq!(
            outcome.skipped,
            vec![MalformedCondition {
                rule: 0,
                token: "BrandBrand 1".into()
            }]
        );
    }

    #[test]
    fn test_strict_aborts_on_first_malformed() {
        let rules = vec![
            RawRule::new(["Brand:Brand 1", "Sport:Basketball"], "ok"),
            RawRule::new(["Sport:Basketball", "oops"], "bad"),
            RawRule::new(["worse"], "bad2"),
        ];
        let engine = RuleEngine::new(RankConfig::default().with_error_policy(ErrorPolicy::Strict));
        let err = engine
            .rank(&rules, &weights(), &QueryContext::values(["Brand 1"]))
            .unwrap_err();
        assert_eq!(
            err,
            Error::MalformedCondition(MalformedCondition {
                rule: 1,
                token: "oops".into()
            })
        );
    }

    #[test]
    fn test_strict_ignores_malformed_inert_rule() {
        let rules = vec![
            RawRule::new(["Brand:Brand 1", "Sport:Basketball"], "S1"),
            RawRule::inert(["NoColonHere"]),
        ];
        let engine = RuleEngine::new(RankConfig::default().with_error_policy(ErrorPolicy::Strict));
        let outcome = engine
            .rank(&rules, &weights(), &QueryContext::values(["Brand 1"]))
            .unwrap();
        assert_eq!(outcome.strategies(), vec!["S1"]);
        assert_eq!(
            outcome.skipped,
            vec![MalformedCondition {
                rule: 1,
                token: "NoColonHere".into()
            }]
        );
    }

    #[test]
    fn test_strict_skips_inert_before_reporting_active() {
        let rules = vec![
            RawRule::inert(["first"]),
            RawRule::new(["Brand:Brand 1", "second"], "bad"),
        ];
        let engine = RuleEngine::new(RankConfig::default().with_error_policy(ErrorPolicy::Strict));
        let err = engine
            .rank(&rules, &weights(), &QueryContext::values(["Brand 1"]))
            .unwrap_err();
        assert_eq!(
            err,
            Error::MalformedCondition(MalformedCondition {
                rule: 1,
                token: "second".into()
            })
        );
    }

    #[test]
    fn test_strict_clean_input() {
        let engine = RuleEngine::new(RankConfig::default().with_error_policy(ErrorPolicy::Strict));
        let query = QueryContext::from_csv("Brand 1");
        let outcome = engine.rank(&default_rules(), &weights(), &query).unwrap();
        assert!(outcome.is_clean());
        assert_eq!(outcome.strategies(), vec!["strategy_04", "strategy_01"]);
    }

    #[test]
    fn test_malformed_inert_rule_is_reported() {
        let rules = vec![RawRule::inert(["no separator"])];
        let outcome = rank(&rules, &weights(), &QueryContext::values(["x"]), MatchMode::AnyValue)
            .unwrap();
        assert_eq!(outcome.skipped_rules(), vec![0]);
    }

    #[test]
    fn test_shape_mismatch_aborts() {
        let query = QueryContext::values(["Brand 1"]);
        let err = rank(&default_rules(), &weights(), &query, MatchMode::ExactEntity).unwrap_err();
        assert!(matches!(err, Error::InvalidConfiguration(_)));
    }

    #[test]
    fn test_invalid_config_aborts_before_parsing() {
        // Malformed rules would be skipped, but the config error wins.
        let rules = vec![RawRule::new(["bad"], "s")];
        let engine = RuleEngine::new(RankConfig::default().with_limit(0));
        let err = engine
            .rank(&rules, &weights(), &QueryContext::values(["x"]))
            .unwrap_err();
        assert!(matches!(err, Error::InvalidConfiguration(_)));
    }

    #[test]
    fn test_custom_required_entities() {
        let rules = vec![RawRule::new(["Grade:A", "Market:Market 3"], "strategy_02")];
        let query = QueryContext::values(["A"]);

        let default_engine = RuleEngine::default();
        assert!(default_engine
            .rank(&rules, &weights(), &query)
            .unwrap()
            .matches
            .is_empty());

        let engine = RuleEngine::new(RankConfig::default().with_required_entities(["Market"]));
        let outcome = engine.rank(&rules, &weights(), &query).unwrap();
        assert_eq!(outcome.matches[0].score, 7);
    }

    #[test]
    fn test_rank_parsed_keeps_slice_order_on_ties() {
        let rules = vec![
            Rule::new(
                7,
                vec![EntityValue::new("Brand", "B"), EntityValue::new("Sport", "S")],
                Some("later".into()),
            ),
            Rule::new(
                2,
                vec![EntityValue::new("Brand", "B"), EntityValue::new("Sport", "S")],
                Some("earlier".into()),
            ),
        ];
        let matches = RuleEngine::default()
            .rank_parsed(&rules, &weights(), &QueryContext::values(["B"]))
            .unwrap();
        assert_eq!(matches[0].strategy, "later");
        assert_eq!(matches[1].strategy, "earlier");
    }

    #[test]
    fn test_evaluate_single_rule() {
        let engine = RuleEngine::default();
        let query = QueryContext::values(["Brand 1"]);
        let rule = Rule::parse(0, &RawRule::new(["Brand:Brand 1", "Sport:Tennis"], "s")).unwrap();

        let m = engine.evaluate(&rule, &weights(), &query).unwrap().unwrap();
        assert_eq!(m.score, 2);

        let gated = Rule::parse(1, &RawRule::new(["Brand:Brand 1"], "s")).unwrap();
        assert_eq!(engine.evaluate(&gated, &weights(), &query).unwrap(), None);
    }

    #[test]
    fn test_parse_rules_partitions() {
        let (rules, skipped) = parse_rules(&default_rules());
        assert_eq!(rules.len(), 6);
        assert!(skipped.is_empty());
        assert_eq!(rules[2].index, 2);
        assert!(rules[2].is_inert());
    }

    #[test]
    fn test_input_not_mutated_and_deterministic() {
        let rules = default_rules();
        let before = rules.clone();
        let query = QueryContext::from_csv("Brand 1, Basketball, NBA");
        let a = rank(&rules, &weights(), &query, MatchMode::AnyValue).unwrap();
        let b = rank(&rules, &weights(), &query, MatchMode::AnyValue).unwrap();
        assert_eq!(a, b);
        assert_eq!(rules, before);
    }

    #[cfg(feature = "parallel")]
    #[test]
    fn test_parallel_matches_sequential() {
        let rules: Vec<RawRule> = (0..500)
            .map(|i| {
                RawRule::new(
                    [
                        format!("Brand:Brand {}", i % 3),
                        format!("Sport:Sport {}", i % 5),
                        format!("Grade:{}", i % 4),
                    ],
                    format!("s{i}"),
                )
            })
            .collect();
        let query = QueryContext::values(["Brand 1", "Sport 2", "3"]);

        let seq = RuleEngine::default().rank(&rules, &weights(), &query).unwrap();
        let par = RuleEngine::new(RankConfig::default().with_parallel(true))
            .rank(&rules, &weights(), &query)
            .unwrap();
        assert_eq!(seq, par);
    }
}
