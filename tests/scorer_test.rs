//! Signal scoring tests
//!
//! Tests cover:
//! - Score composition from fired rules and context
//! - Long/short mirroring
//! - Tier and action mapping
//! - Reason ordering and truncation
//! - Rule recalibration
//! - Engine output scored for both roles

use pulse::services::signals::{
    IndicatorEngine, RuleSet, ScorerConfig, SignalScorer, TierThresholds,
};
use pulse::types::*;

fn snapshot(symbol: &str, latest: IndicatorRow, previous: IndicatorRow) -> IndicatorSnapshot {
    IndicatorSnapshot {
        symbol: symbol.to_string(),
        interval: BarInterval::FifteenMinutes,
        latest,
        previous,
    }
}

/// Every long rule that does not depend on levels or range oscillators fires.
fn bullish() -> (IndicatorRow, IndicatorRow) {
    let latest = IndicatorRow {
        close: 105.0,
        volume: 2_000.0,
        momentum: Some(3.0),
        rsi: Some(60.0),
        macd_histogram: Some(0.5),
        ema_fast: Some(104.0),
        ema_medium: Some(102.0),
        ema_slow: Some(100.0),
        vwap: Some(103.0),
        volume_ratio: Some(2.0),
        ..Default::default()
    };
    let previous = IndicatorRow {
        close: 104.0,
        rsi: Some(55.0),
        macd_histogram: Some(-0.2),
        ema_fast: Some(103.0),
        ..Default::default()
    };
    (latest, previous)
}

/// Mirror image of `bullish`.
fn bearish() -> (IndicatorRow, IndicatorRow) {
    let latest = IndicatorRow {
        close: 95.0,
        volume: 2_000.0,
        momentum: Some(-3.0),
        rsi: Some(40.0),
        macd_histogram: Some(-0.5),
        ema_fast: Some(96.0),
        ema_medium: Some(98.0),
        ema_slow: Some(100.0),
        vwap: Some(97.0),
        volume_ratio: Some(2.0),
        ..Default::default()
    };
    let previous = IndicatorRow {
        close: 96.0,
        rsi: Some(45.0),
        macd_histogram: Some(0.2),
        ema_fast: Some(97.0),
        ..Default::default()
    };
    (latest, previous)
}

fn context(trend: TrendDirection, volatility: f64) -> MarketContext {
    MarketContext {
        index_symbol: "SPY".to_string(),
        volatility_symbol: "^VIX".to_string(),
        trend,
        volatility,
    }
}

// =============================================================================
// Score Composition
// =============================================================================

mod composition_tests {
    use super::*;

    #[test]
    fn test_bullish_long_score() {
        let (latest, previous) = bullish();
        let result = SignalScorer::default()
            .score(&snapshot("TQQQ", latest, previous), InstrumentRole::LongBiased, None)
            .unwrap();

        assert_eq!(result.rule_points(), 95.0);
        assert_eq!(result.score, 95.0);
        assert_eq!(result.tier, ConfidenceTier::High);
        assert_eq!(result.action, SignalAction::StrongBuy);
        assert!(!result.fired("near_support"));
        assert!(!result.fired("momentum_moderate"));
    }

    #[test]
    fn test_score_equals_points_plus_adjustment() {
        let (latest, previous) = bullish();
        let scorer = SignalScorer::default();
        let snap = snapshot("TQQQ", latest, previous);

        for ctx in [
            context(TrendDirection::Up, 12.0),
            context(TrendDirection::Up, 18.0),
            context(TrendDirection::Down, 28.0),
        ] {
            let result = scorer
                .score(&snap, InstrumentRole::LongBiased, Some(&ctx))
                .unwrap();
            let sum: f64 = result.contributions.iter().map(|c| c.points).sum();
            assert_eq!(result.score, sum + result.context_adjustment);
        }
    }

    #[test]
    fn test_score_can_exceed_one_hundred() {
        let (latest, previous) = bullish();
        let result = SignalScorer::default()
            .score(
                &snapshot("TQQQ", latest, previous),
                InstrumentRole::LongBiased,
                Some(&context(TrendDirection::Up, 12.0)),
            )
            .unwrap();
        assert_eq!(result.score, 105.0);
    }

    #[test]
    fn test_bullish_row_is_weak_for_short_role() {
        let (latest, previous) = bullish();
        let result = SignalScorer::default()
            .score(&snapshot("SQQQ", latest, previous), InstrumentRole::ShortBiased, None)
            .unwrap();

        // Only the side-agnostic volume rule fires
        assert_eq!(result.contributions.len(), 1);
        assert!(result.fired("volume_confirmation"));
        assert_eq!(result.tier, ConfidenceTier::Low);
        assert_eq!(result.action, SignalAction::Wait);
    }

    #[test]
    fn test_non_finite_close_rejected() {
        let (mut latest, previous) = bullish();
        latest.close = f64::NAN;
        let result = SignalScorer::default().score(
            &snapshot("TQQQ", latest, previous),
            InstrumentRole::LongBiased,
            None,
        );
        assert!(result.is_err());
    }
}

// =============================================================================
// Mirroring
// =============================================================================

mod mirror_tests {
    use super::*;

    #[test]
    fn test_mirrored_inputs_score_equally() {
        let scorer = SignalScorer::default();
        let (bl, bp) = bullish();
        let (sl, sp) = bearish();

        let long = scorer
            .score(&snapshot("TQQQ", bl, bp), InstrumentRole::LongBiased, None)
            .unwrap();
        let short = scorer
            .score(&snapshot("SQQQ", sl, sp), InstrumentRole::ShortBiased, None)
            .unwrap();

        assert_eq!(long.score, short.score);
        assert_eq!(long.contributions.len(), short.contributions.len());
        assert_eq!(short.action, SignalAction::StrongSell);
    }

    #[test]
    fn test_mirrored_context_adjustment() {
        let scorer = SignalScorer::default();
        let (bl, bp) = bullish();
        let (sl, sp) = bearish();

        let long = scorer
            .score(
                &snapshot("TQQQ", bl, bp),
                InstrumentRole::LongBiased,
                Some(&context(TrendDirection::Up, 14.0)),
            )
            .unwrap();
        let short = scorer
            .score(
                &snapshot("SQQQ", sl, sp),
                InstrumentRole::ShortBiased,
                Some(&context(TrendDirection::Down, 24.0)),
            )
            .unwrap();
        assert_eq!(long.context_adjustment, 10.0);
        assert_eq!(short.context_adjustment, 10.0);

        let against = scorer
            .score(
                &snapshot("SQQQ", sl, sp),
                InstrumentRole::ShortBiased,
                Some(&context(TrendDirection::Up, 14.0)),
            )
            .unwrap();
        assert_eq!(against.context_adjustment, -10.0);
        assert_eq!(against.score, 85.0);
    }

    #[test]
    fn test_rule_sets_share_ids_where_mirrored() {
        let long = RuleSet::long_biased();
        let short = RuleSet::short_biased();
        assert_eq!(long.rules().len(), short.rules().len());
        for id in ["momentum_strong", "momentum_moderate", "volume_confirmation"] {
            assert_eq!(long.get(id).unwrap().points, short.get(id).unwrap().points);
        }
    }
}

// =============================================================================
// Reasons and Tiers
// =============================================================================

mod reason_tests {
    use super::*;

    #[test]
    fn test_reasons_follow_rule_order() {
        let (latest, previous) = bullish();
        let result = SignalScorer::default()
            .score(&snapshot("TQQQ", latest, previous), InstrumentRole::LongBiased, None)
            .unwrap();

        assert_eq!(result.contributions.len(), 8);
        assert_eq!(
            result.reasons,
            vec![
                "Strong momentum +3.00%".to_string(),
                "RSI 60.0 rising in bullish zone".to_string(),
                "MACD crossed above signal".to_string(),
            ]
        );
    }

    #[test]
    fn test_reason_limit_is_configurable() {
        let (latest, previous) = bullish();
        let scorer = SignalScorer::new(ScorerConfig {
            max_reasons: 10,
            ..Default::default()
        });
        let result = scorer
            .score(&snapshot("TQQQ", latest, previous), InstrumentRole::LongBiased, None)
            .unwrap();
        assert_eq!(result.reasons.len(), result.contributions.len());
        assert_eq!(result.reasons[7], "Short EMA sloping up");
    }

    #[test]
    fn test_custom_thresholds() {
        let (latest, previous) = bullish();
        let scorer = SignalScorer::new(ScorerConfig {
            long_thresholds: TierThresholds {
                high: 100.0,
                medium: 90.0,
            },
            ..Default::default()
        });
        let result = scorer
            .score(&snapshot("TQQQ", latest, previous), InstrumentRole::LongBiased, None)
            .unwrap();
        assert_eq!(result.tier, ConfidenceTier::Medium);
        assert_eq!(result.action, SignalAction::Buy);
    }

    #[test]
    fn test_recalibrated_rule_points() {
        let (latest, previous) = bullish();
        let scorer = SignalScorer::default().with_rules(
            RuleSet::long_biased()
                .with_points("momentum_strong", 40.0)
                .with_points("volume_confirmation", 0.0),
        );
        let result = scorer
            .score(&snapshot("TQQQ", latest, previous), InstrumentRole::LongBiased, None)
            .unwrap();

        assert_eq!(result.score, 100.0);
        assert!(!result.fired("volume_confirmation"));
    }
}

// =============================================================================
// Engine to Scorer
// =============================================================================

mod engine_tests {
    use super::*;

    /// Strictly increasing closes that accelerate, so oscillators do not tie.
    fn accelerating_series(count: usize) -> PriceSeries {
        let bars = (0..count)
            .map(|i| {
                let close = 100.0 + i as f64 + 0.05 * i as f64 * i as f64;
                PriceBar {
                    time: 1_714_521_600_000 + i as i64 * 900_000,
                    open: close,
                    high: close + 1.0,
                    low: close - 1.0,
                    close,
                    volume: 1_000.0,
                }
            })
            .collect();
        PriceSeries::new("TQQQ", BarInterval::FifteenMinutes, bars).unwrap()
    }

    fn fired(result: &SignalResult) -> Vec<&str> {
        result.contributions.iter().map(|c| c.rule_id.as_str()).collect()
    }

    #[test]
    fn test_rising_thirty_bars_indicators() {
        let computed = IndicatorEngine::default()
            .compute(&accelerating_series(30))
            .unwrap();

        for rsi in computed.rsi.iter().flatten() {
            assert!(*rsi <= 100.0);
        }
        assert_eq!(computed.rsi[29], Some(100.0));
        assert!(computed.macd_histogram[29].unwrap() > 0.0);
        assert!(computed.macd_histogram[1..].iter().all(|h| h.unwrap() > 0.0));
    }

    #[test]
    fn test_rising_thirty_bars_long_role() {
        let snap = IndicatorEngine::default()
            .snapshot(&accelerating_series(30))
            .unwrap();
        let result = SignalScorer::default()
            .score(&snap, InstrumentRole::LongBiased, None)
            .unwrap();

        assert_eq!(
            fired(&result),
            vec![
                "momentum_strong",
                "macd_histogram_rising",
                "price_above_ema_vwap",
                "ema_stack_bullish",
                "ema_slope_up",
            ]
        );
        assert_eq!(result.score, 60.0);
        assert_eq!(result.tier, ConfidenceTier::Medium);
        assert_eq!(result.action, SignalAction::Buy);
    }

    #[test]
    fn test_rising_thirty_bars_short_role() {
        let snap = IndicatorEngine::default()
            .snapshot(&accelerating_series(30))
            .unwrap();
        let result = SignalScorer::default()
            .score(&snap, InstrumentRole::ShortBiased, None)
            .unwrap();

        assert_eq!(
            fired(&result),
            vec!["near_resistance", "williams_overbought", "bollinger_upper_zone"]
        );
        assert_eq!(result.score, 20.0);
        assert_eq!(result.tier, ConfidenceTier::Low);
        assert_eq!(result.action, SignalAction::Wait);
    }
}
