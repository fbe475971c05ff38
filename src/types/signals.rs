use super::BarInterval;
use serde::{Deserialize, Serialize};

/// Full indicator output, one entry per bar.
///
/// Every vector has the same length as the source series. `None` marks a
/// warm-up position or a value that is undefined at that bar (for example a
/// zero high-low range).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndicatorSeries {
    pub time: Vec<i64>,
    pub close: Vec<f64>,
    pub volume: Vec<f64>,
    pub ema_fast: Vec<Option<f64>>,
    pub ema_medium: Vec<Option<f64>>,
    pub ema_slow: Vec<Option<f64>>,
    pub sma: Vec<Option<f64>>,
    pub rsi: Vec<Option<f64>>,
    pub rsi_short: Vec<Option<f64>>,
    pub macd: Vec<Option<f64>>,
    pub macd_signal: Vec<Option<f64>>,
    pub macd_histogram: Vec<Option<f64>>,
    pub vwap: Vec<Option<f64>>,
    pub avg_volume: Vec<Option<f64>>,
    pub volume_ratio: Vec<Option<f64>>,
    pub bb_upper: Vec<Option<f64>>,
    pub bb_middle: Vec<Option<f64>>,
    pub bb_lower: Vec<Option<f64>>,
    pub bb_width: Vec<Option<f64>>,
    pub bb_position: Vec<Option<f64>>,
    pub stoch_k: Vec<Option<f64>>,
    pub stoch_d: Vec<Option<f64>>,
    pub williams_r: Vec<Option<f64>>,
    pub momentum: Vec<Option<f64>>,
    pub support: Vec<Option<f64>>,
    pub resistance: Vec<Option<f64>>,
    pub recent_support: Vec<Option<f64>>,
    pub recent_resistance: Vec<Option<f64>>,
}

impl IndicatorSeries {
    pub fn len(&self) -> usize {
        self.close.len()
    }

    pub fn is_empty(&self) -> bool {
        self.close.is_empty()
    }

    /// Extract the values at bar `i`.
    pub fn row(&self, i: usize) -> Option<IndicatorRow> {
        if i >= self.len() {
            return None;
        }
        Some(IndicatorRow {
            time: self.time[i],
            close: self.close[i],
            volume: self.volume[i],
            ema_fast: self.ema_fast[i],
            ema_medium: self.ema_medium[i],
            ema_slow: self.ema_slow[i],
            sma: self.sma[i],
            rsi: self.rsi[i],
            rsi_short: self.rsi_short[i],
            macd: self.macd[i],
            macd_signal: self.macd_signal[i],
            macd_histogram: self.macd_histogram[i],
            vwap: self.vwap[i],
            avg_volume: self.avg_volume[i],
            volume_ratio: self.volume_ratio[i],
            bb_upper: self.bb_upper[i],
            bb_middle: self.bb_middle[i],
            bb_lower: self.bb_lower[i],
            bb_width: self.bb_width[i],
            bb_position: self.bb_position[i],
            stoch_k: self.stoch_k[i],
            stoch_d: self.stoch_d[i],
            williams_r: self.williams_r[i],
            momentum: self.momentum[i],
            support: self.support[i],
            resistance: self.resistance[i],
            recent_support: self.recent_support[i],
            recent_resistance: self.recent_resistance[i],
        })
    }

    pub fn latest(&self) -> Option<IndicatorRow> {
        self.row(self.len().checked_sub(1)?)
    }
}

/// Indicator values at a single bar.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndicatorRow {
    pub time: i64,
    pub close: f64,
    pub volume: f64,
    pub ema_fast: Option<f64>,
    pub ema_medium: Option<f64>,
    pub ema_slow: Option<f64>,
    pub sma: Option<f64>,
    pub rsi: Option<f64>,
    pub rsi_short: Option<f64>,
    pub macd: Option<f64>,
    pub macd_signal: Option<f64>,
    pub macd_histogram: Option<f64>,
    pub vwap: Option<f64>,
    pub avg_volume: Option<f64>,
    pub volume_ratio: Option<f64>,
    pub bb_upper: Option<f64>,
    pub bb_middle: Option<f64>,
    pub bb_lower: Option<f64>,
    pub bb_width: Option<f64>,
    pub bb_position: Option<f64>,
    pub stoch_k: Option<f64>,
    pub stoch_d: Option<f64>,
    pub williams_r: Option<f64>,
    pub momentum: Option<f64>,
    pub support: Option<f64>,
    pub resistance: Option<f64>,
    pub recent_support: Option<f64>,
    pub recent_resistance: Option<f64>,
}

/// Latest and previous indicator rows of one series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndicatorSnapshot {
    pub symbol: String,
    pub interval: BarInterval,
    pub latest: IndicatorRow,
    pub previous: IndicatorRow,
}

/// Which side of the market an instrument expresses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InstrumentRole {
    /// Gains when the market rises (e.g. a leveraged long ETF).
    LongBiased,
    /// Gains when the market falls (e.g. an inverse ETF).
    ShortBiased,
}

impl InstrumentRole {
    pub fn label(&self) -> &'static str {
        match self {
            InstrumentRole::LongBiased => "long-biased",
            InstrumentRole::ShortBiased => "short-biased",
        }
    }
}

/// Broad-market trend direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrendDirection {
    Up,
    Down,
}

impl TrendDirection {
    pub fn label(&self) -> &'static str {
        match self {
            TrendDirection::Up => "Up",
            TrendDirection::Down => "Down",
        }
    }
}

/// Coarse market backdrop used to bias the scorer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketContext {
    pub index_symbol: String,
    pub volatility_symbol: String,
    pub trend: TrendDirection,
    /// Latest close of the volatility index.
    pub volatility: f64,
}

/// Confidence bucket derived from the score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConfidenceTier {
    High,
    Medium,
    Low,
}

impl ConfidenceTier {
    pub fn label(&self) -> &'static str {
        match self {
            ConfidenceTier::High => "High",
            ConfidenceTier::Medium => "Medium",
            ConfidenceTier::Low => "Low",
        }
    }
}

/// Discrete action for an instrument.
///
/// Long-biased instruments get buy actions; short-biased instruments get
/// sell actions (a bearish call on the market, acted on through the
/// inverse instrument).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SignalAction {
    StrongBuy,
    Buy,
    Wait,
    Sell,
    StrongSell,
}

impl SignalAction {
    /// Combine a tier with the instrument role.
    pub fn from_tier(tier: ConfidenceTier, role: InstrumentRole) -> Self {
        match (tier, role) {
            (ConfidenceTier::High, InstrumentRole::LongBiased) => SignalAction::StrongBuy,
            (ConfidenceTier::Medium, InstrumentRole::LongBiased) => SignalAction::Buy,
            (ConfidenceTier::High, InstrumentRole::ShortBiased) => SignalAction::StrongSell,
            (ConfidenceTier::Medium, InstrumentRole::ShortBiased) => SignalAction::Sell,
            (ConfidenceTier::Low, _) => SignalAction::Wait,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            SignalAction::StrongBuy => "Strong Buy",
            SignalAction::Buy => "Buy",
            SignalAction::Wait => "Wait",
            SignalAction::Sell => "Sell",
            SignalAction::StrongSell => "Strong Sell",
        }
    }

    pub fn is_actionable(&self) -> bool {
        !matches!(self, SignalAction::Wait)
    }
}

/// Grouping of scoring rules, mirrors the usual indicator families.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleCategory {
    Momentum,
    Oscillator,
    Trend,
    Volume,
    Volatility,
    Levels,
}

/// Points attributed to one fired rule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RuleContribution {
    pub rule_id: String,
    pub category: RuleCategory,
    pub points: f64,
    pub reason: String,
}

/// Scored signal for one instrument.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignalResult {
    pub symbol: String,
    pub role: InstrumentRole,
    /// Sum of contributions plus the context adjustment. Not clamped.
    pub score: f64,
    /// Every fired rule, in evaluation order.
    pub contributions: Vec<RuleContribution>,
    pub context_adjustment: f64,
    /// Reasons of the first fired rules, truncated for display.
    pub reasons: Vec<String>,
    pub tier: ConfidenceTier,
    pub action: SignalAction,
}

impl SignalResult {
    /// Points from fired rules, excluding the context adjustment.
    pub fn rule_points(&self) -> f64 {
        self.contributions.iter().map(|c| c.points).sum()
    }

    pub fn fired(&self, rule_id: &str) -> bool {
        self.contributions.iter().any(|c| c.rule_id == rule_id)
    }
}
