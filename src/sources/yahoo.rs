//! Yahoo Finance chart API client.
//!
//! Provides intraday and daily OHLCV bars for stocks, ETFs and indices
//! (`^VIX`, `^TNX`, `DX-Y.NYB`). Uses the unofficial chart endpoint, which
//! needs no API key.

use super::{BoxFuture, SeriesSource};
use crate::error::{AppError, Result};
use crate::types::{BarInterval, LookbackPeriod, PriceBar, PriceSeries};
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

const CHART_URL: &str = "https://query1.finance.yahoo.com/v8/finance/chart";

/// Yahoo Finance chart response.
#[derive(Debug, Deserialize)]
struct YahooChartResponse {
    chart: YahooChart,
}

#[derive(Debug, Deserialize)]
struct YahooChart {
    result: Option<Vec<YahooResult>>,
    error: Option<YahooError>,
}

#[derive(Debug, Deserialize)]
struct YahooError {
    code: String,
    description: String,
}

#[derive(Debug, Deserialize)]
struct YahooResult {
    meta: YahooMeta,
    timestamp: Option<Vec<i64>>,
    indicators: YahooIndicators,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct YahooMeta {
    symbol: String,
}

#[derive(Debug, Deserialize)]
struct YahooIndicators {
    quote: Vec<YahooQuote>,
}

#[derive(Debug, Deserialize)]
struct YahooQuote {
    open: Option<Vec<Option<f64>>>,
    high: Option<Vec<Option<f64>>>,
    low: Option<Vec<Option<f64>>>,
    close: Option<Vec<Option<f64>>>,
    volume: Option<Vec<Option<u64>>>,
}

/// Normalize symbol for Yahoo Finance API.
/// Yahoo uses hyphens instead of dots for share classes (e.g., BRK-B not BRK.B).
/// Index and currency symbols (`^VIX`, `DX-Y.NYB`) are passed through.
fn normalize_yahoo_symbol(symbol: &str) -> String {
    let upper = symbol.to_uppercase();
    if upper.starts_with('^') || upper.contains('=') || upper.contains('-') {
        upper
    } else {
        upper.replace('.', "-")
    }
}

/// Turn a decoded chart response into bars.
///
/// Bars with a missing or non-positive close are skipped, as are bars whose
/// timestamp does not advance (Yahoo repeats the live bar at the end of
/// intraday ranges).
fn parse_chart(response: YahooChartResponse) -> Result<(String, Vec<PriceBar>)> {
    if let Some(error) = response.chart.error {
        return Err(AppError::ExternalApi(format!(
            "Yahoo API error: {} - {}",
            error.code, error.description
        )));
    }

    let result = response
        .chart
        .result
        .and_then(|r| r.into_iter().next())
        .ok_or_else(|| AppError::DataUnavailable("No results in response".to_string()))?;

    let timestamps = result
        .timestamp
        .ok_or_else(|| AppError::DataUnavailable("No timestamps in response".to_string()))?;

    let quote = result
        .indicators
        .quote
        .into_iter()
        .next()
        .ok_or_else(|| AppError::DataUnavailable("No quote data in response".to_string()))?;

    let opens = quote.open.unwrap_or_default();
    let highs = quote.high.unwrap_or_default();
    let lows = quote.low.unwrap_or_default();
    let closes = quote.close.unwrap_or_default();
    let volumes = quote.volume.unwrap_or_default();

    let mut bars: Vec<PriceBar> = Vec::with_capacity(timestamps.len());
    for (i, &timestamp) in timestamps.iter().enumerate() {
        let Some(close) = closes.get(i).copied().flatten() else {
            continue;
        };
        if close <= 0.0 {
            continue;
        }
        let time = timestamp * 1000;
        if bars.last().is_some_and(|b| b.time >= time) {
            continue;
        }
        bars.push(PriceBar {
            time,
            open: opens.get(i).copied().flatten().unwrap_or(close),
            high: highs.get(i).copied().flatten().unwrap_or(close),
            low: lows.get(i).copied().flatten().unwrap_or(close),
            close,
            volume: volumes.get(i).copied().flatten().unwrap_or(0) as f64,
        });
    }

    Ok((result.meta.symbol, bars))
}

/// Yahoo Finance API client.
pub struct YahooFinanceClient {
    client: Client,
}

impl YahooFinanceClient {
    /// Create a new Yahoo Finance client.
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent("Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36")
            .build()?;

        Ok(Self { client })
    }

    /// Fetch bars for a symbol.
    ///
    /// Arguments:
    /// - symbol: Stock/ETF/index symbol (e.g., "SPY", "^VIX")
    /// - interval: Bar interval ("15m", "1d", ...)
    /// - lookback: Time range ("2d", "5d", "30d", ...)
    pub async fn get_series(
        &self,
        symbol: &str,
        interval: BarInterval,
        lookback: &LookbackPeriod,
    ) -> Result<PriceSeries> {
        let yahoo_symbol = normalize_yahoo_symbol(symbol);
        let url = format!("{}/{}", CHART_URL, yahoo_symbol);

        debug!("Fetching Yahoo Finance data: {} {} {}", yahoo_symbol, interval, lookback);

        let response = self
            .client
            .get(&url)
            .query(&[
                ("range", lookback.as_str()),
                ("interval", interval.as_str()),
                ("includePrePost", "false"),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(AppError::ExternalApi(format!(
                "Yahoo API error for {}: {}",
                symbol,
                response.status()
            )));
        }

        let data: YahooChartResponse = response.json().await?;
        let (reported, bars) = parse_chart(data)?;
        debug!("Yahoo returned {} bars for {}", bars.len(), reported);

        let series = PriceSeries::new(symbol, interval, bars)?;
        series.require(2)?;
        Ok(series)
    }
}

impl SeriesSource for YahooFinanceClient {
    fn name(&self) -> &str {
        "yahoo"
    }

    fn fetch_series<'a>(
        &'a self,
        symbol: &'a str,
        interval: BarInterval,
        lookback: &'a LookbackPeriod,
    ) -> BoxFuture<'a, PriceSeries> {
        Box::pin(self.get_series(symbol, interval, lookback))
    }
}
