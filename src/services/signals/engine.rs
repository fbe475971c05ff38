//! Indicator engine: turns a price series into the full indicator set.

use crate::error::{AppError, Result};
use crate::services::signals::indicators::{
    BollingerBands, Ema, Levels, Macd, Momentum, Rsi, Sma, Stochastic, VolumeProfile, Vwap,
    WilliamsR,
};
use crate::types::{IndicatorSeries, IndicatorSnapshot, PriceSeries};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Lookback windows and spans for every indicator the engine computes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndicatorParams {
    pub ema_fast: usize,
    pub ema_medium: usize,
    pub ema_slow: usize,
    pub sma_period: usize,
    pub rsi_period: usize,
    pub rsi_short_period: usize,
    pub macd_fast: usize,
    pub macd_slow: usize,
    pub macd_signal: usize,
    pub volume_period: usize,
    pub bollinger_period: usize,
    pub bollinger_k: f64,
    pub stoch_k: usize,
    pub stoch_d: usize,
    pub williams_period: usize,
    pub momentum_lookback: usize,
    pub levels_window: usize,
    pub recent_levels_window: usize,
}

impl Default for IndicatorParams {
    fn default() -> Self {
        Self {
            ema_fast: 9,
            ema_medium: 21,
            ema_slow: 50,
            sma_period: 20,
            rsi_period: 14,
            rsi_short_period: 7,
            macd_fast: 12,
            macd_slow: 26,
            macd_signal: 9,
            volume_period: 20,
            bollinger_period: 20,
            bollinger_k: 2.0,
            stoch_k: 14,
            stoch_d: 3,
            williams_period: 14,
            momentum_lookback: 10,
            levels_window: 20,
            recent_levels_window: 5,
        }
    }
}

impl IndicatorParams {
    /// Longest rolling window; bars before it carry `None` somewhere.
    pub fn longest_lookback(&self) -> usize {
        [
            self.sma_period,
            self.rsi_period + 1,
            self.volume_period,
            self.bollinger_period,
            self.stoch_k + self.stoch_d - 1,
            self.williams_period,
            self.momentum_lookback + 1,
            self.levels_window,
        ]
        .into_iter()
        .max()
        .unwrap_or(0)
    }
}

/// Pure indicator computation over a price series.
#[derive(Debug, Clone, Default)]
pub struct IndicatorEngine {
    params: IndicatorParams,
}

impl IndicatorEngine {
    /// Smallest series the engine accepts.
    pub const MIN_BARS: usize = 2;

    pub fn new(params: IndicatorParams) -> Self {
        Self { params }
    }

    pub fn params(&self) -> &IndicatorParams {
        &self.params
    }

    /// Compute every indicator for every bar.
    pub fn compute(&self, series: &PriceSeries) -> Result<IndicatorSeries> {
        series.require(Self::MIN_BARS)?;
        if let Some(pos) = series.bars().iter().position(|b| !b.is_finite()) {
            return Err(AppError::Computation(format!(
                "{} has a non-finite value at bar {}",
                series.symbol(),
                pos
            )));
        }
        if series.len() < self.params.longest_lookback() {
            debug!(
                "{}: {} bars is shorter than the {}-bar lookback, some indicators stay undefined",
                series.symbol(),
                series.len(),
                self.params.longest_lookback()
            );
        }

        let p = &self.params;
        let closes = series.closes();
        let highs = series.highs();
        let lows = series.lows();
        let volumes = series.volumes();

        let macd = Macd::new(p.macd_fast, p.macd_slow, p.macd_signal).compute(&closes);
        let volume = VolumeProfile::new(p.volume_period).compute(&volumes);
        let bands = BollingerBands::new(p.bollinger_period, p.bollinger_k).compute(&closes);
        let stoch = Stochastic::new(p.stoch_k, p.stoch_d).compute(&highs, &lows, &closes);
        let levels = Levels::new(p.levels_window, p.recent_levels_window).compute(&highs, &lows);

        Ok(IndicatorSeries {
            time: series.bars().iter().map(|b| b.time).collect(),
            ema_fast: Ema::new(p.ema_fast).compute_opt(&closes),
            ema_medium: Ema::new(p.ema_medium).compute_opt(&closes),
            ema_slow: Ema::new(p.ema_slow).compute_opt(&closes),
            sma: Sma::new(p.sma_period).compute(&closes),
            rsi: Rsi::new(p.rsi_period).compute(&closes),
            rsi_short: Rsi::new(p.rsi_short_period).compute(&closes),
            macd: macd.line,
            macd_signal: macd.signal,
            macd_histogram: macd.histogram,
            vwap: Vwap.compute(&closes, &volumes),
            avg_volume: volume.average,
            volume_ratio: volume.ratio,
            bb_upper: bands.upper,
            bb_middle: bands.middle,
            bb_lower: bands.lower,
            bb_width: bands.width,
            bb_position: bands.position,
            stoch_k: stoch.k,
            stoch_d: stoch.d,
            williams_r: WilliamsR::new(p.williams_period).compute(&highs, &lows, &closes),
            momentum: Momentum::new(p.momentum_lookback).compute(&closes),
            support: levels.support,
            resistance: levels.resistance,
            recent_support: levels.recent_support,
            recent_resistance: levels.recent_resistance,
            close: closes,
            volume: volumes,
        })
    }

    /// Compute and keep only the latest and previous rows.
    pub fn snapshot(&self, series: &PriceSeries) -> Result<IndicatorSnapshot> {
        let computed = self.compute(series)?;
        let last = computed.len() - 1;
        let (Some(latest), Some(previous)) = (computed.row(last), computed.row(last - 1)) else {
            return Err(AppError::DataUnavailable(format!(
                "{} has no previous bar",
                series.symbol()
            )));
        };

        debug!(
            "{} snapshot: close={:.2} rsi={:?} macd_hist={:?}",
            series.symbol(),
            latest.close,
            latest.rsi,
            latest.macd_histogram
        );

        Ok(IndicatorSnapshot {
            symbol: series.symbol().to_string(),
            interval: series.interval(),
            latest,
            previous,
        })
    }
}
