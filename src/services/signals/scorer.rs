//! Signal scorer.
//!
//! Evaluates the role's rule set against an indicator snapshot, applies the
//! market-context adjustment and maps the total onto a confidence tier and
//! an action. The score is exactly the sum of fired points plus the
//! adjustment; it is never clamped.

use super::rules::{RuleInput, RuleSet};
use crate::error::{AppError, Result};
use crate::types::{
    ConfidenceTier, IndicatorSnapshot, InstrumentRole, MarketContext, SignalAction, SignalResult,
    TrendDirection,
};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Score cut-offs for one role.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TierThresholds {
    pub high: f64,
    pub medium: f64,
}

impl Default for TierThresholds {
    fn default() -> Self {
        Self {
            high: 70.0,
            medium: 50.0,
        }
    }
}

impl TierThresholds {
    pub fn tier(&self, score: f64) -> ConfidenceTier {
        if score >= self.high {
            ConfidenceTier::High
        } else if score >= self.medium {
            ConfidenceTier::Medium
        } else {
            ConfidenceTier::Low
        }
    }
}

/// How the broad market biases a score.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ContextPolicy {
    pub bonus: f64,
    pub penalty: f64,
    /// Volatility below this counts as calm.
    pub calm_volatility: f64,
    /// Volatility above this counts as stressed.
    pub stressed_volatility: f64,
}

impl Default for ContextPolicy {
    fn default() -> Self {
        Self {
            bonus: 10.0,
            penalty: 10.0,
            calm_volatility: 17.0,
            stressed_volatility: 20.0,
        }
    }
}

impl ContextPolicy {
    /// Signed points added after rule summation.
    pub fn adjustment(&self, role: InstrumentRole, context: Option<&MarketContext>) -> f64 {
        let Some(ctx) = context else {
            return 0.0;
        };
        let calm = ctx.volatility < self.calm_volatility;
        let stressed = ctx.volatility > self.stressed_volatility;
        match (role, ctx.trend) {
            (InstrumentRole::LongBiased, TrendDirection::Up) if calm => self.bonus,
            (InstrumentRole::LongBiased, TrendDirection::Down) if stressed => -self.penalty,
            (InstrumentRole::ShortBiased, TrendDirection::Down) if stressed => self.bonus,
            (InstrumentRole::ShortBiased, TrendDirection::Up) if calm => -self.penalty,
            _ => 0.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScorerConfig {
    pub long_thresholds: TierThresholds,
    pub short_thresholds: TierThresholds,
    pub context: ContextPolicy,
    /// Reasons kept on the result for display.
    pub max_reasons: usize,
}

impl Default for ScorerConfig {
    fn default() -> Self {
        Self {
            long_thresholds: TierThresholds::default(),
            short_thresholds: TierThresholds::default(),
            context: ContextPolicy::default(),
            max_reasons: 3,
        }
    }
}

impl ScorerConfig {
    pub fn thresholds(&self, role: InstrumentRole) -> &TierThresholds {
        match role {
            InstrumentRole::LongBiased => &self.long_thresholds,
            InstrumentRole::ShortBiased => &self.short_thresholds,
        }
    }
}

#[derive(Debug, Clone)]
pub struct SignalScorer {
    config: ScorerConfig,
    long_rules: RuleSet,
    short_rules: RuleSet,
}

impl Default for SignalScorer {
    fn default() -> Self {
        Self::new(ScorerConfig::default())
    }
}

impl SignalScorer {
    pub fn new(config: ScorerConfig) -> Self {
        Self {
            config,
            long_rules: RuleSet::for_role(InstrumentRole::LongBiased),
            short_rules: RuleSet::for_role(InstrumentRole::ShortBiased),
        }
    }

    /// Replace the rule set used for its role.
    pub fn with_rules(mut self, rules: RuleSet) -> Self {
        match rules.role() {
            InstrumentRole::LongBiased => self.long_rules = rules,
            InstrumentRole::ShortBiased => self.short_rules = rules,
        }
        self
    }

    pub fn config(&self) -> &ScorerConfig {
        &self.config
    }

    pub fn rules(&self, role: InstrumentRole) -> &RuleSet {
        match role {
            InstrumentRole::LongBiased => &self.long_rules,
            InstrumentRole::ShortBiased => &self.short_rules,
        }
    }

    pub fn score(
        &self,
        snapshot: &IndicatorSnapshot,
        role: InstrumentRole,
        context: Option<&MarketContext>,
    ) -> Result<SignalResult> {
        if !snapshot.latest.close.is_finite() {
            return Err(AppError::Computation(format!(
                "{}: latest close is not finite",
                snapshot.symbol
            )));
        }

        let input = RuleInput::new(&snapshot.latest, &snapshot.previous);
        let contributions = self.rules(role).evaluate(&input);
        let rule_points: f64 = contributions.iter().map(|c| c.points).sum();
        let context_adjustment = self.config.context.adjustment(role, context);
        let score = rule_points + context_adjustment;
        if !score.is_finite() {
            return Err(AppError::Computation(format!(
                "{}: score is not finite",
                snapshot.symbol
            )));
        }

        let tier = self.config.thresholds(role).tier(score);
        let action = SignalAction::from_tier(tier, role);
        let reasons = contributions
            .iter()
            .take(self.config.max_reasons)
            .map(|c| c.reason.clone())
            .collect();

        debug!(
            "{} ({}): {} rules fired, points={} adjustment={} tier={}",
            snapshot.symbol,
            role.label(),
            contributions.len(),
            rule_points,
            context_adjustment,
            tier.label()
        );

        Ok(SignalResult {
            symbol: snapshot.symbol.clone(),
            role,
            score,
            contributions,
            context_adjustment,
            reasons,
            tier,
            action,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{BarInterval, IndicatorRow};

    fn snapshot(latest: IndicatorRow, previous: IndicatorRow) -> IndicatorSnapshot {
        IndicatorSnapshot {
            symbol: "TQQQ".to_string(),
            interval: BarInterval::FifteenMinutes,
            latest,
            previous,
        }
    }

    fn base() -> IndicatorRow {
        IndicatorRow {
            close: 100.0,
            volume: 1000.0,
            ..Default::default()
        }
    }

    fn ctx(trend: TrendDirection, volatility: f64) -> MarketContext {
        MarketContext {
            index_symbol: "SPY".to_string(),
            volatility_symbol: "^VIX".to_string(),
            trend,
            volatility,
        }
    }

    #[test]
    fn test_empty_snapshot_scores_zero() {
        let scorer = SignalScorer::default();
        let result = scorer
            .score(&snapshot(base(), base()), InstrumentRole::LongBiased, None)
            .unwrap();
        assert_eq!(result.score, 0.0);
        assert_eq!(result.tier, ConfidenceTier::Low);
        assert_eq!(result.action, SignalAction::Wait);
        assert!(result.reasons.is_empty());
    }

    #[test]
    fn test_tier_boundaries() {
        let t = TierThresholds::default();
        assert_eq!(t.tier(70.0), ConfidenceTier::High);
        assert_eq!(t.tier(69.9), ConfidenceTier::Medium);
        assert_eq!(t.tier(50.0), ConfidenceTier::Medium);
        assert_eq!(t.tier(49.9), ConfidenceTier::Low);
    }

    #[test]
    fn test_context_adjustment_table() {
        let p = ContextPolicy::default();
        let long = InstrumentRole::LongBiased;
        let short = InstrumentRole::ShortBiased;
        assert_eq!(p.adjustment(long, Some(&ctx(TrendDirection::Up, 15.0))), 10.0);
        assert_eq!(p.adjustment(long, Some(&ctx(TrendDirection::Down, 25.0))), -10.0);
        assert_eq!(p.adjustment(long, Some(&ctx(TrendDirection::Up, 18.0))), 0.0);
        assert_eq!(p.adjustment(short, Some(&ctx(TrendDirection::Down, 25.0))), 10.0);
        assert_eq!(p.adjustment(short, Some(&ctx(TrendDirection::Up, 15.0))), -10.0);
        assert_eq!(p.adjustment(short, Some(&ctx(TrendDirection::Down, 19.0))), 0.0);
        assert_eq!(p.adjustment(long, None), 0.0);
    }

    #[test]
    fn test_score_is_points_plus_adjustment() {
        let scorer = SignalScorer::default();
        let latest = IndicatorRow {
            momentum: Some(3.0),
            volume_ratio: Some(2.0),
            ..base()
        };
        let result = scorer
            .score(
                &snapshot(latest, base()),
                InstrumentRole::LongBiased,
                Some(&ctx(TrendDirection::Up, 12.0)),
            )
            .unwrap();
        assert_eq!(result.rule_points(), 35.0);
        assert_eq!(result.context_adjustment, 10.0);
        assert_eq!(result.score, 45.0);
        assert!(result.fired("momentum_strong"));
        assert!(result.fired("volume_confirmation"));
    }

    #[test]
    fn test_negative_score_not_clamped() {
        let scorer = SignalScorer::default();
        let result = scorer
            .score(
                &snapshot(base(), base()),
                InstrumentRole::LongBiased,
                Some(&ctx(TrendDirection::Down, 30.0)),
            )
            .unwrap();
        assert_eq!(result.score, -10.0);
    }

    #[test]
    fn test_reasons_truncated_in_order() {
        let scorer = SignalScorer::default();
        let latest = IndicatorRow {
            momentum: Some(3.0),
            macd_histogram: Some(0.5),
            volume_ratio: Some(2.0),
            williams_r: Some(-90.0),
            ..base()
        };
        let previous = IndicatorRow {
            macd_histogram: Some(-0.5),
            ..base()
        };
        let result = scorer
            .score(&snapshot(latest, previous), InstrumentRole::LongBiased, None)
            .unwrap();
        assert_eq!(result.contributions.len(), 5);
        assert_eq!(result.reasons.len(), 3);
        assert_eq!(result.reasons[0], result.contributions[0].reason);
        assert_eq!(result.contributions[0].rule_id, "momentum_strong");
        assert_eq!(result.contributions[1].rule_id, "macd_bullish_cross");
        assert_eq!(result.score, 25.0 + 15.0 + 10.0 + 10.0 + 5.0);
        assert_eq!(result.tier, ConfidenceTier::High);
        assert_eq!(result.action, SignalAction::StrongBuy);
    }

    #[test]
    fn test_nan_close_is_computation_error() {
        let scorer = SignalScorer::default();
        let latest = IndicatorRow {
            close: f64::NAN,
            ..base()
        };
        let result = scorer.score(&snapshot(latest, base()), InstrumentRole::ShortBiased, None);
        assert!(matches!(result, Err(AppError::Computation(_))));
    }

    #[test]
    fn test_custom_rules_replace_role() {
        let scorer = SignalScorer::default()
            .with_rules(RuleSet::short_biased().with_points("momentum_strong", 60.0));
        let latest = IndicatorRow {
            momentum: Some(-4.0),
            ..base()
        };
        let result = scorer
            .score(&snapshot(latest, base()), InstrumentRole::ShortBiased, None)
            .unwrap();
        assert_eq!(result.score, 60.0);
        assert_eq!(result.action, SignalAction::Sell);
    }
}
