//! Indicator engine tests over whole price series
//!
//! Tests cover:
//! - Flat series edge cases
//! - Monotonic trends
//! - Output alignment and warm-up
//! - Determinism

use pulse::error::AppError;
use pulse::services::signals::{IndicatorEngine, IndicatorParams};
use pulse::types::*;

fn series(symbol: &str, closes: &[f64]) -> PriceSeries {
    let bars = closes
        .iter()
        .enumerate()
        .map(|(i, c)| PriceBar {
            time: 1_714_521_600_000 + i as i64 * 900_000,
            open: *c,
            high: c + 1.0,
            low: c - 1.0,
            close: *c,
            volume: 1_000.0,
        })
        .collect();
    PriceSeries::new(symbol, BarInterval::FifteenMinutes, bars).unwrap()
}

fn approx(actual: Option<f64>, expected: f64) {
    let value = actual.expect("value should be defined");
    assert!(
        (value - expected).abs() < 1e-9,
        "expected {}, got {}",
        expected,
        value
    );
}

// =============================================================================
// Flat Series
// =============================================================================

mod flat_series_tests {
    use super::*;

    #[test]
    fn test_flat_series_neutral_oscillators() {
        let engine = IndicatorEngine::default();
        let snap = engine.snapshot(&series("TQQQ", &[100.0; 30])).unwrap();
        let row = snap.latest;

        approx(row.rsi, 50.0);
        approx(row.rsi_short, 50.0);
        approx(row.momentum, 0.0);
        approx(row.macd, 0.0);
        approx(row.macd_histogram, 0.0);
        approx(row.vwap, 100.0);
        approx(row.volume_ratio, 1.0);
    }

    #[test]
    fn test_flat_series_collapsed_bands() {
        let engine = IndicatorEngine::default();
        let snap = engine.snapshot(&series("TQQQ", &[100.0; 30])).unwrap();

        approx(snap.latest.bb_width, 0.0);
        approx(snap.latest.bb_upper, 100.0);
        approx(snap.latest.bb_lower, 100.0);
        assert_eq!(snap.latest.bb_position, None);
    }

    #[test]
    fn test_flat_series_collapsed_bands_at_inexact_prices() {
        let engine = IndicatorEngine::default();
        for price in [101.37, 52.33, 47.91, 13.07] {
            let snap = engine.snapshot(&series("TQQQ", &[price; 30])).unwrap();

            assert_eq!(snap.latest.bb_width, Some(0.0), "price {}", price);
            assert_eq!(snap.latest.bb_position, None, "price {}", price);
        }
    }

    #[test]
    fn test_flat_series_range_indicators() {
        let engine = IndicatorEngine::default();
        let snap = engine.snapshot(&series("TQQQ", &[100.0; 30])).unwrap();

        // Close sits in the middle of the high/low range
        approx(snap.latest.stoch_k, 50.0);
        approx(snap.latest.stoch_d, 50.0);
        approx(snap.latest.williams_r, -50.0);
        approx(snap.latest.support, 99.0);
        approx(snap.latest.resistance, 101.0);
    }
}

// =============================================================================
// Trending Series
// =============================================================================

mod trend_tests {
    use super::*;

    #[test]
    fn test_rising_series() {
        let closes: Vec<f64> = (0..60).map(|i| 100.0 + i as f64).collect();
        let snap = IndicatorEngine::default()
            .snapshot(&series("TQQQ", &closes))
            .unwrap();
        let row = snap.latest;

        approx(row.rsi, 100.0);
        assert!(row.momentum.unwrap() > 0.0);
        assert!(row.macd.unwrap() > 0.0);
        assert!(row.ema_fast.unwrap() > row.ema_medium.unwrap());
        assert!(row.ema_medium.unwrap() > row.ema_slow.unwrap());
        assert!(row.close > row.vwap.unwrap());
    }

    #[test]
    fn test_falling_series() {
        let closes: Vec<f64> = (0..60).map(|i| 200.0 - i as f64).collect();
        let snap = IndicatorEngine::default()
            .snapshot(&series("SQQQ", &closes))
            .unwrap();
        let row = snap.latest;

        approx(row.rsi, 0.0);
        assert!(row.momentum.unwrap() < 0.0);
        assert!(row.macd.unwrap() < 0.0);
        assert!(row.ema_fast.unwrap() < row.ema_slow.unwrap());
    }

    #[test]
    fn test_momentum_is_percent_change() {
        let mut closes = vec![100.0; 20];
        closes.push(110.0);
        let snap = IndicatorEngine::default()
            .snapshot(&series("TQQQ", &closes))
            .unwrap();
        approx(snap.latest.momentum, 10.0);
        approx(snap.previous.momentum, 0.0);
    }
}

// =============================================================================
// Alignment and Determinism
// =============================================================================

mod alignment_tests {
    use super::*;

    #[test]
    fn test_short_series_leaves_warmup_undefined() {
        let closes: Vec<f64> = (0..10).map(|i| 50.0 + i as f64 * 0.5).collect();
        let out = IndicatorEngine::default()
            .compute(&series("TQQQ", &closes))
            .unwrap();

        assert_eq!(out.len(), 10);
        assert_eq!(out.rsi.len(), 10);
        assert_eq!(out.bb_middle.len(), 10);
        assert!(out.rsi.iter().all(|v| v.is_none()));
        assert!(out.sma.iter().all(|v| v.is_none()));
        // EMA and VWAP are defined from the first bar
        assert!(out.ema_fast.iter().all(|v| v.is_some()));
        assert!(out.vwap.iter().all(|v| v.is_some()));
    }

    #[test]
    fn test_first_defined_rsi_index() {
        let closes: Vec<f64> = (0..20).map(|i| 10.0 + (i % 3) as f64).collect();
        let out = IndicatorEngine::default()
            .compute(&series("TQQQ", &closes))
            .unwrap();
        assert_eq!(out.rsi[13], None);
        assert!(out.rsi[14].is_some());
    }

    #[test]
    fn test_compute_is_deterministic() {
        let closes: Vec<f64> = (0..80)
            .map(|i| 100.0 + (i as f64 * 0.7).sin() * 5.0)
            .collect();
        let engine = IndicatorEngine::default();
        let s = series("TQQQ", &closes);
        assert_eq!(engine.compute(&s).unwrap(), engine.compute(&s).unwrap());
    }

    #[test]
    fn test_oscillators_stay_in_range() {
        let closes: Vec<f64> = (0..120)
            .map(|i| 100.0 + (i as f64 * 0.3).sin() * 8.0 + i as f64 * 0.05)
            .collect();
        let out = IndicatorEngine::default()
            .compute(&series("TQQQ", &closes))
            .unwrap();

        for v in out.rsi.iter().flatten() {
            assert!((0.0..=100.0).contains(v));
        }
        for v in out.stoch_k.iter().flatten() {
            assert!((0.0..=100.0).contains(v));
        }
        for v in out.williams_r.iter().flatten() {
            assert!((-100.0..=0.0).contains(v));
        }
    }

    #[test]
    fn test_custom_params() {
        let params = IndicatorParams {
            rsi_period: 3,
            momentum_lookback: 2,
            ..Default::default()
        };
        let engine = IndicatorEngine::new(params);
        let out = engine
            .compute(&series("TQQQ", &[1.0, 2.0, 3.0, 4.0, 5.0]))
            .unwrap();
        assert!(out.rsi[3].is_some());
        assert_eq!(out.momentum[1], None);
        approx(out.momentum[2], 200.0);
    }

    #[test]
    fn test_too_few_bars() {
        let result = IndicatorEngine::default().snapshot(&series("TQQQ", &[1.0]));
        assert!(matches!(result, Err(AppError::DataUnavailable(_))));
    }
}
