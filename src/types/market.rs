use super::NewsArticle;
use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

/// Daily overview of one ticker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketQuote {
    pub symbol: String,
    /// Display name, e.g. "S&P 500".
    pub name: String,
    pub price: f64,
    /// Absolute change vs the previous close.
    pub change: f64,
    /// Percentage change vs the previous close.
    pub pct_change: f64,
    pub sma_20: Option<f64>,
    pub sma_50: Option<f64>,
    pub rsi: f64,
    pub volume_ratio: f64,
    pub support: Option<f64>,
    pub resistance: Option<f64>,
}

/// Rates and dollar strength.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EconomicIndicators {
    pub ten_year_yield: Option<f64>,
    pub ten_year_change: Option<f64>,
    pub dollar_index: Option<f64>,
    pub dollar_change: Option<f64>,
}

/// Volatility-index read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VixSignal {
    Complacent,
    Neutral,
    Fearful,
}

impl VixSignal {
    pub fn classify(vix: f64) -> Self {
        if vix < 20.0 {
            VixSignal::Complacent
        } else if vix > 30.0 {
            VixSignal::Fearful
        } else {
            VixSignal::Neutral
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            VixSignal::Complacent => "Complacent",
            VixSignal::Neutral => "Neutral",
            VixSignal::Fearful => "Fearful",
        }
    }
}

/// Combined RSI/volatility regime of the broad market.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MarketRegime {
    Euphoric,
    Oversold,
    Normal,
}

impl MarketRegime {
    pub fn classify(index_rsi: f64, vix: f64) -> Self {
        if index_rsi > 70.0 && vix < 20.0 {
            MarketRegime::Euphoric
        } else if index_rsi < 30.0 && vix > 30.0 {
            MarketRegime::Oversold
        } else {
            MarketRegime::Normal
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            MarketRegime::Euphoric => "Euphoric - Caution Warranted",
            MarketRegime::Oversold => "Oversold - Opportunity Zone",
            MarketRegime::Normal => "Normal Trading Range",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SentimentSnapshot {
    pub vix_signal: Option<VixSignal>,
    pub regime: Option<MarketRegime>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskLevel {
    Elevated,
    Complacent,
    Normal,
}

impl RiskLevel {
    pub fn classify(vix: f64, index_rsi: f64) -> Self {
        if vix > 25.0 || index_rsi < 35.0 {
            RiskLevel::Elevated
        } else if vix < 15.0 && index_rsi > 65.0 {
            RiskLevel::Complacent
        } else {
            RiskLevel::Normal
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            RiskLevel::Elevated => "Elevated",
            RiskLevel::Complacent => "Complacent",
            RiskLevel::Normal => "Normal",
        }
    }

    pub fn position_sizing(&self) -> &'static str {
        match self {
            RiskLevel::Elevated => "Reduce position sizes, increase cash",
            RiskLevel::Complacent => "Consider hedging, avoid FOMO",
            RiskLevel::Normal => "Standard allocation appropriate",
        }
    }
}

/// One sector's daily move.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SectorPerformance {
    pub sector: String,
    pub pct_change: f64,
}

/// Swing-trade action on the leveraged long instrument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SwingAction {
    Enter,
    Wait,
    Hold,
    Sell,
}

impl SwingAction {
    pub fn label(&self) -> &'static str {
        match self {
            SwingAction::Enter => "Enter",
            SwingAction::Wait => "Wait",
            SwingAction::Hold => "Hold",
            SwingAction::Sell => "Sell",
        }
    }
}

/// Entry zone, stop and target levels for a pullback swing trade.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SwingSetup {
    pub symbol: String,
    pub price: f64,
    /// Recent swing high the entry zone, stop and target are measured from.
    pub reference: f64,
    pub buy_low: f64,
    pub buy_high: f64,
    pub stop_loss: f64,
    pub target: f64,
    pub action: SwingAction,
}

/// Everything the daily brief is built from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketBrief {
    pub generated_at: DateTime<FixedOffset>,
    /// Broad index the snapshot, regime and levels are read from.
    pub index_symbol: String,
    pub volatility_symbol: String,
    /// Watchlist quotes in watchlist order; failed tickers are absent.
    pub quotes: Vec<MarketQuote>,
    pub economic: EconomicIndicators,
    pub sentiment: SentimentSnapshot,
    pub risk: Option<RiskLevel>,
    /// Best performer first.
    pub sectors: Vec<SectorPerformance>,
    pub top_stories: Vec<NewsArticle>,
}

impl MarketBrief {
    pub fn quote(&self, symbol: &str) -> Option<&MarketQuote> {
        self.quotes.iter().find(|q| q.symbol == symbol)
    }

    pub fn index(&self) -> Option<&MarketQuote> {
        self.quote(&self.index_symbol)
    }

    pub fn volatility(&self) -> Option<&MarketQuote> {
        self.quote(&self.volatility_symbol)
    }

    /// Volatility symbol without the Yahoo index caret, for display.
    pub fn volatility_label(&self) -> &str {
        self.volatility_symbol.trim_start_matches('^')
    }
}
