//! Broad-market context: index trend and volatility level.

use crate::error::{AppError, Result};
use crate::sources::SeriesSource;
use crate::types::{BarInterval, LookbackPeriod, MarketContext, PriceSeries, TrendDirection};
use std::sync::Arc;
use tracing::info;

#[derive(Debug, Clone, PartialEq)]
pub struct ContextConfig {
    pub index_symbol: String,
    pub volatility_symbol: String,
    pub interval: BarInterval,
    pub lookback: LookbackPeriod,
    /// Trend compares the latest close with the close this many bars back.
    pub trend_lookback: usize,
}

impl Default for ContextConfig {
    fn default() -> Self {
        Self {
            index_symbol: "SPY".to_string(),
            volatility_symbol: "^VIX".to_string(),
            interval: BarInterval::FifteenMinutes,
            lookback: LookbackPeriod::new("2d"),
            trend_lookback: 9,
        }
    }
}

/// Trend is Up iff the latest index close is strictly above the close
/// `trend_lookback` bars back. Volatility is the latest close of the
/// volatility series.
pub fn derive_context(
    index: &PriceSeries,
    volatility: &PriceSeries,
    trend_lookback: usize,
) -> Result<MarketContext> {
    index.require(trend_lookback + 1)?;
    volatility.require(trend_lookback + 1)?;

    let (Some(latest), Some(base)) = (index.close_back(0), index.close_back(trend_lookback)) else {
        return Err(AppError::DataUnavailable(format!(
            "{} is too short for a {}-bar trend",
            index.symbol(),
            trend_lookback
        )));
    };
    let level = volatility
        .last()
        .map(|b| b.close)
        .ok_or_else(|| AppError::DataUnavailable(format!("{} is empty", volatility.symbol())))?;
    if !latest.is_finite() || !base.is_finite() || !level.is_finite() {
        return Err(AppError::Computation(
            "market context inputs are not finite".to_string(),
        ));
    }

    let trend = if latest > base {
        TrendDirection::Up
    } else {
        TrendDirection::Down
    };

    Ok(MarketContext {
        index_symbol: index.symbol().to_string(),
        volatility_symbol: volatility.symbol().to_string(),
        trend,
        volatility: level,
    })
}

pub struct MarketContextProvider {
    source: Arc<dyn SeriesSource>,
    config: ContextConfig,
}

impl MarketContextProvider {
    pub fn new(source: Arc<dyn SeriesSource>, config: ContextConfig) -> Self {
        Self { source, config }
    }

    pub fn config(&self) -> &ContextConfig {
        &self.config
    }

    pub async fn context(&self) -> Result<MarketContext> {
        let cfg = &self.config;
        let index = self
            .source
            .fetch_series(&cfg.index_symbol, cfg.interval, &cfg.lookback)
            .await?;
        let volatility = self
            .source
            .fetch_series(&cfg.volatility_symbol, cfg.interval, &cfg.lookback)
            .await?;

        let context = derive_context(&index, &volatility, cfg.trend_lookback)?;
        info!(
            "Market context: {} trend {}, {} {:.2}",
            context.index_symbol,
            context.trend.label(),
            context.volatility_symbol,
            context.volatility
        );
        Ok(context)
    }
}
