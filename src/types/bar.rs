use crate::error::{AppError, Result};
use serde::{Deserialize, Serialize};

/// Bar sampling interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BarInterval {
    #[serde(rename = "1m")]
    OneMinute,
    #[serde(rename = "5m")]
    FiveMinutes,
    #[serde(rename = "15m")]
    FifteenMinutes,
    #[serde(rename = "30m")]
    ThirtyMinutes,
    #[serde(rename = "1h")]
    OneHour,
    #[serde(rename = "1d")]
    OneDay,
}

impl BarInterval {
    /// Parse an interval from its provider string.
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "1m" => Some(BarInterval::OneMinute),
            "5m" => Some(BarInterval::FiveMinutes),
            "15m" => Some(BarInterval::FifteenMinutes),
            "30m" => Some(BarInterval::ThirtyMinutes),
            "1h" | "60m" => Some(BarInterval::OneHour),
            "1d" => Some(BarInterval::OneDay),
            _ => None,
        }
    }

    /// Provider interval string.
    pub fn as_str(&self) -> &'static str {
        match self {
            BarInterval::OneMinute => "1m",
            BarInterval::FiveMinutes => "5m",
            BarInterval::FifteenMinutes => "15m",
            BarInterval::ThirtyMinutes => "30m",
            BarInterval::OneHour => "1h",
            BarInterval::OneDay => "1d",
        }
    }

    /// Bar length in seconds.
    pub fn seconds(&self) -> i64 {
        match self {
            BarInterval::OneMinute => 60,
            BarInterval::FiveMinutes => 300,
            BarInterval::FifteenMinutes => 900,
            BarInterval::ThirtyMinutes => 1800,
            BarInterval::OneHour => 3600,
            BarInterval::OneDay => 86400,
        }
    }
}

impl std::fmt::Display for BarInterval {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How far back to fetch, as a provider range string ("2d", "7d", "30d", ...).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LookbackPeriod(String);

impl LookbackPeriod {
    pub fn new(range: impl Into<String>) -> Self {
        Self(range.into())
    }

    pub fn days(days: u32) -> Self {
        Self(format!("{}d", days))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for LookbackPeriod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// One sampled interval of OHLCV data.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriceBar {
    /// Unix timestamp (milliseconds) of the bar open.
    pub time: i64,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

impl PriceBar {
    /// True when every price and volume field is a finite number.
    pub fn is_finite(&self) -> bool {
        self.open.is_finite()
            && self.high.is_finite()
            && self.low.is_finite()
            && self.close.is_finite()
            && self.volume.is_finite()
    }
}

/// Ordered bars for one instrument at one interval.
///
/// Timestamps are strictly increasing. The series cannot be modified after
/// construction, and deserializing goes through the same ordering check.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "SeriesParts")]
pub struct PriceSeries {
    symbol: String,
    interval: BarInterval,
    bars: Vec<PriceBar>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SeriesParts {
    symbol: String,
    interval: BarInterval,
    bars: Vec<PriceBar>,
}

impl TryFrom<SeriesParts> for PriceSeries {
    type Error = AppError;

    fn try_from(parts: SeriesParts) -> Result<Self> {
        Self::new(parts.symbol, parts.interval, parts.bars)
    }
}

impl PriceSeries {
    /// Build a series, rejecting out-of-order or duplicate timestamps.
    pub fn new(
        symbol: impl Into<String>,
        interval: BarInterval,
        bars: Vec<PriceBar>,
    ) -> Result<Self> {
        let symbol = symbol.into();
        if let Some(pos) = bars.windows(2).position(|w| w[1].time <= w[0].time) {
            return Err(AppError::DataUnavailable(format!(
                "{} bars are not strictly increasing at index {}",
                symbol,
                pos + 1
            )));
        }
        Ok(Self {
            symbol,
            interval,
            bars,
        })
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn interval(&self) -> BarInterval {
        self.interval
    }

    pub fn bars(&self) -> &[PriceBar] {
        &self.bars
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn last(&self) -> Option<&PriceBar> {
        self.bars.last()
    }

    /// Close `n` bars before the latest one.
    pub fn close_back(&self, n: usize) -> Option<f64> {
        let idx = self.bars.len().checked_sub(n + 1)?;
        Some(self.bars[idx].close)
    }

    pub fn closes(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.close).collect()
    }

    pub fn highs(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.high).collect()
    }

    pub fn lows(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.low).collect()
    }

    pub fn volumes(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.volume).collect()
    }

    /// Fail with `DataUnavailable` unless the series has at least `min` bars.
    pub fn require(&self, min: usize) -> Result<()> {
        if self.bars.len() < min {
            return Err(AppError::DataUnavailable(format!(
                "{} has {} bars, need at least {}",
                self.symbol,
                self.bars.len(),
                min
            )));
        }
        Ok(())
    }
}
