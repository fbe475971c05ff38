//! Daily market brief: watchlist overview, rates, sector rotation,
//! sentiment, risk, top stories and the swing-trade module.
//!
//! The async `MarketBriefService` gathers data through the collaborator
//! traits; everything it derives from that data is a plain function so it
//! can be tested without a network.

use crate::error::{AppError, Result};
use crate::services::report::format_simple_summary;
use crate::services::signals::indicators::{Levels, Rsi, Sma, VolumeProfile};
use crate::sources::{NewsSource, SeriesSource, Summarizer};
use crate::types::{
    BarInterval, EconomicIndicators, LookbackPeriod, MarketBrief, MarketQuote, MarketRegime,
    NewsArticle, NewsCategory, PriceSeries, RiskLevel, SectorPerformance, SentimentSnapshot,
    SwingAction, SwingSetup, VixSignal,
};
use chrono::{DateTime, FixedOffset};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{info, warn};

/// Tickers in the daily overview, with display names.
pub const DEFAULT_WATCHLIST: [(&str, &str); 11] = [
    ("SPY", "S&P 500"),
    ("QQQ", "Nasdaq-100"),
    ("IWM", "Russell 2000"),
    ("^VIX", "Volatility Index"),
    ("UUP", "Dollar Index"),
    ("TLT", "20Y Treasury"),
    ("GLD", "Gold"),
    ("XLF", "Financials"),
    ("XLK", "Technology"),
    ("XLE", "Energy"),
    ("XLI", "Industrials"),
];

/// Sector ETFs recognised for rotation, whether or not they are watched.
pub const SECTOR_ETFS: [(&str, &str); 9] = [
    ("XLF", "Financials"),
    ("XLK", "Technology"),
    ("XLE", "Energy"),
    ("XLI", "Industrials"),
    ("XLY", "Consumer Discretionary"),
    ("XLP", "Consumer Staples"),
    ("XLV", "Healthcare"),
    ("XLU", "Utilities"),
    ("XLRE", "Real Estate"),
];

/// Swing-zone multipliers applied to the reference price.
pub const BUY_ZONE_LOW: f64 = 0.9625;
pub const BUY_ZONE_HIGH: f64 = 0.984;
pub const STOP_LOSS: f64 = 0.923;
pub const TARGET: f64 = 1.043;

/// Summaries shorter than this are treated as failures.
pub const MIN_SUMMARY_CHARS: usize = 100;

#[derive(Debug, Clone, PartialEq)]
pub struct BriefConfig {
    pub watchlist: Vec<(String, String)>,
    pub index_symbol: String,
    pub volatility_symbol: String,
    pub ten_year_symbol: String,
    pub dollar_symbol: String,
    pub swing_symbol: String,
    pub interval: BarInterval,
    pub lookback: LookbackPeriod,
    pub economic_lookback: LookbackPeriod,
    pub story_limit: usize,
}

impl Default for BriefConfig {
    fn default() -> Self {
        Self {
            watchlist: DEFAULT_WATCHLIST
                .iter()
                .map(|(s, n)| (s.to_string(), n.to_string()))
                .collect(),
            index_symbol: "SPY".to_string(),
            volatility_symbol: "^VIX".to_string(),
            ten_year_symbol: "^TNX".to_string(),
            dollar_symbol: "DX-Y.NYB".to_string(),
            swing_symbol: "TQQQ".to_string(),
            interval: BarInterval::OneDay,
            lookback: LookbackPeriod::days(30),
            economic_lookback: LookbackPeriod::days(5),
            story_limit: 3,
        }
    }
}

fn last_defined(values: &[Option<f64>]) -> Option<f64> {
    values.last().copied().flatten()
}

impl MarketQuote {
    /// Overview row for one ticker from daily bars.
    pub fn from_series(name: impl Into<String>, series: &PriceSeries) -> Result<Self> {
        series.require(2)?;
        let closes = series.closes();
        let (Some(price), Some(previous)) = (series.close_back(0), series.close_back(1)) else {
            return Err(AppError::DataUnavailable(format!(
                "{} has no previous close",
                series.symbol()
            )));
        };
        if previous == 0.0 || !price.is_finite() || !previous.is_finite() {
            return Err(AppError::Computation(format!(
                "{}: cannot compute change from {} to {}",
                series.symbol(),
                previous,
                price
            )));
        }
        let change = price - previous;
        let levels = Levels::default().compute(&series.highs(), &series.lows());

        Ok(Self {
            symbol: series.symbol().to_string(),
            name: name.into(),
            price,
            change,
            pct_change: change / previous * 100.0,
            sma_20: last_defined(&Sma::new(20).compute(&closes)),
            sma_50: last_defined(&Sma::new(closes.len().min(50)).compute(&closes)),
            rsi: last_defined(&Rsi::default().compute(&closes)).unwrap_or(50.0),
            volume_ratio: last_defined(&VolumeProfile::default().compute(&series.volumes()).ratio)
                .unwrap_or(1.0),
            support: last_defined(&levels.support),
            resistance: last_defined(&levels.resistance),
        })
    }
}

/// Latest value and one-bar change of a rate or index series.
fn latest_and_change(series: Option<&PriceSeries>) -> (Option<f64>, Option<f64>) {
    let Some(series) = series else {
        return (None, None);
    };
    let latest = series.close_back(0);
    let change = match (latest, series.close_back(1)) {
        (Some(l), Some(p)) => Some(l - p),
        _ => None,
    };
    (latest, change)
}

pub fn economic_indicators(
    ten_year: Option<&PriceSeries>,
    dollar: Option<&PriceSeries>,
) -> EconomicIndicators {
    let (ten_year_yield, ten_year_change) = latest_and_change(ten_year);
    let (dollar_index, dollar_change) = latest_and_change(dollar);
    EconomicIndicators {
        ten_year_yield,
        ten_year_change,
        dollar_index,
        dollar_change,
    }
}

/// Sectors present in the overview, best performer first.
pub fn sector_rotation(quotes: &[MarketQuote]) -> Vec<SectorPerformance> {
    let mut sectors: Vec<SectorPerformance> = SECTOR_ETFS
        .iter()
        .filter_map(|(symbol, name)| {
            let quote = quotes.iter().find(|q| q.symbol == *symbol)?;
            Some(SectorPerformance {
                sector: name.to_string(),
                pct_change: quote.pct_change,
            })
        })
        .collect();
    sectors.sort_by(|a, b| b.pct_change.total_cmp(&a.pct_change));
    sectors
}

fn find<'a>(quotes: &'a [MarketQuote], symbol: &str) -> Option<&'a MarketQuote> {
    quotes.iter().find(|q| q.symbol == symbol)
}

pub fn sentiment(
    quotes: &[MarketQuote],
    index_symbol: &str,
    volatility_symbol: &str,
) -> SentimentSnapshot {
    let index = find(quotes, index_symbol);
    let vix = find(quotes, volatility_symbol);
    SentimentSnapshot {
        vix_signal: vix.map(|v| VixSignal::classify(v.price)),
        regime: match (index, vix) {
            (Some(i), Some(v)) => Some(MarketRegime::classify(i.rsi, v.price)),
            _ => None,
        },
    }
}

pub fn risk_level(
    quotes: &[MarketQuote],
    index_symbol: &str,
    volatility_symbol: &str,
) -> Option<RiskLevel> {
    let index = find(quotes, index_symbol)?;
    let vix = find(quotes, volatility_symbol)?;
    Some(RiskLevel::classify(vix.price, index.rsi))
}

/// Category priority for the top stories. A volatile tape (index move over
/// 1% or VIX over 25) puts breaking and Fed news first.
pub fn story_priority(index_pct_change: f64, vix: f64) -> [NewsCategory; 4] {
    if index_pct_change.abs() > 1.0 || vix > 25.0 {
        [
            NewsCategory::Breaking,
            NewsCategory::Fed,
            NewsCategory::Macro,
            NewsCategory::Earnings,
        ]
    } else {
        [
            NewsCategory::Earnings,
            NewsCategory::Tech,
            NewsCategory::Fed,
            NewsCategory::Breaking,
        ]
    }
}

/// Pick the most relevant stories: priority categories only, one story per
/// URL, newest first.
pub fn select_top_stories(
    articles: &[NewsArticle],
    index_pct_change: f64,
    vix: f64,
    limit: usize,
) -> Vec<NewsArticle> {
    let mut seen = HashSet::new();
    let mut stories: Vec<NewsArticle> = story_priority(index_pct_change, vix)
        .iter()
        .flat_map(|category| articles.iter().filter(move |a| a.category == *category))
        .filter(|a| seen.insert(a.url.clone()))
        .cloned()
        .collect();
    stories.sort_by(|a, b| b.published_at.cmp(&a.published_at));
    stories.truncate(limit);
    stories
}

fn round_cents(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Swing levels for the leveraged long instrument.
///
/// Out of a trade the action is Enter only when the price sits inside the
/// buy zone, the index is at or below support and the index RSI is under
/// 60. In a trade it is Sell once the index loses support, otherwise Hold.
pub fn swing_setup(
    symbol: &str,
    price: f64,
    reference: f64,
    index: Option<&MarketQuote>,
    in_trade: bool,
) -> SwingSetup {
    let buy_low = round_cents(reference * BUY_ZONE_LOW);
    let buy_high = round_cents(reference * BUY_ZONE_HIGH);
    let index_price = index.map(|q| q.price).unwrap_or(0.0);
    let index_support = index.and_then(|q| q.support).unwrap_or(0.0);
    let index_rsi = index.map(|q| q.rsi).unwrap_or(50.0);

    let action = if in_trade {
        if index_price < index_support {
            SwingAction::Sell
        } else {
            SwingAction::Hold
        }
    } else if (buy_low..=buy_high).contains(&price)
        && index_price <= index_support
        && index_rsi < 60.0
    {
        SwingAction::Enter
    } else {
        SwingAction::Wait
    };

    SwingSetup {
        symbol: symbol.to_string(),
        price,
        reference,
        buy_low,
        buy_high,
        stop_loss: round_cents(reference * STOP_LOSS),
        target: round_cents(reference * TARGET),
        action,
    }
}

/// Ask the summarizer, falling back to the plain summary when it is absent,
/// fails, or returns too little text.
pub async fn summarize(brief: &MarketBrief, summarizer: Option<&dyn Summarizer>) -> Result<String> {
    let generated = match summarizer {
        Some(s) => match s.summarize(brief).await {
            Ok(text) if text.chars().count() >= MIN_SUMMARY_CHARS => Some(text),
            Ok(text) => {
                warn!("Summarizer returned {} chars, using simple summary", text.chars().count());
                None
            }
            Err(e) => {
                warn!("Summarizer failed, using simple summary: {}", e);
                None
            }
        },
        None => None,
    };

    let summary = generated.unwrap_or_else(|| format_simple_summary(brief));
    if summary.chars().count() < MIN_SUMMARY_CHARS {
        return Err(AppError::Computation(
            "Generated summary is too short or empty".to_string(),
        ));
    }
    Ok(summary)
}

/// Gathers the inputs of the daily brief.
pub struct MarketBriefService {
    source: Arc<dyn SeriesSource>,
    news: Option<Arc<dyn NewsSource>>,
    config: BriefConfig,
}

impl MarketBriefService {
    pub fn new(
        source: Arc<dyn SeriesSource>,
        news: Option<Arc<dyn NewsSource>>,
        config: BriefConfig,
    ) -> Self {
        Self {
            source,
            news,
            config,
        }
    }

    pub fn config(&self) -> &BriefConfig {
        &self.config
    }

    /// Quotes for the watchlist. Failed tickers are logged and skipped; an
    /// empty overview is an error.
    pub async fn overview(&self) -> Result<Vec<MarketQuote>> {
        let cfg = &self.config;
        let mut quotes = Vec::with_capacity(cfg.watchlist.len());
        for (symbol, name) in &cfg.watchlist {
            let quote = match self.source.fetch_series(symbol, cfg.interval, &cfg.lookback).await {
                Ok(series) => MarketQuote::from_series(name.as_str(), &series),
                Err(e) => Err(e),
            };
            match quote {
                Ok(q) => quotes.push(q),
                Err(e) => warn!("Error fetching {}: {}", symbol, e),
            }
        }
        if quotes.is_empty() {
            return Err(AppError::DataUnavailable("No market data retrieved".to_string()));
        }
        info!("Overview: {}/{} tickers", quotes.len(), cfg.watchlist.len());
        Ok(quotes)
    }

    async fn optional_series(
        &self,
        symbol: &str,
        lookback: &LookbackPeriod,
    ) -> Option<PriceSeries> {
        match self
            .source
            .fetch_series(symbol, self.config.interval, lookback)
            .await
        {
            Ok(series) => Some(series),
            Err(e) => {
                warn!("Error fetching {}: {}", symbol, e);
                None
            }
        }
    }

    pub async fn economic(&self) -> EconomicIndicators {
        let cfg = &self.config;
        let ten_year = self
            .optional_series(&cfg.ten_year_symbol, &cfg.economic_lookback)
            .await;
        let dollar = self
            .optional_series(&cfg.dollar_symbol, &cfg.economic_lookback)
            .await;
        economic_indicators(ten_year.as_ref(), dollar.as_ref())
    }

    /// Market stories from every category. Category failures are logged
    /// and contribute nothing.
    pub async fn news(&self) -> Vec<NewsArticle> {
        let Some(news) = &self.news else {
            info!("No news source configured");
            return Vec::new();
        };
        let mut articles = Vec::new();
        for category in NewsCategory::ALL {
            match news.fetch_category(category).await {
                Ok(mut found) => articles.append(&mut found),
                Err(e) => warn!("Error fetching {} news: {}", category.name(), e),
            }
        }
        articles
    }

    /// Swing setup for the configured instrument, measured from its recent
    /// swing high.
    pub async fn swing(&self, index: Option<&MarketQuote>, in_trade: bool) -> Result<SwingSetup> {
        let cfg = &self.config;
        let series = self
            .source
            .fetch_series(&cfg.swing_symbol, cfg.interval, &cfg.lookback)
            .await?;
        let quote = MarketQuote::from_series(cfg.swing_symbol.as_str(), &series)?;
        let reference = quote.resistance.unwrap_or(quote.price);
        Ok(swing_setup(&cfg.swing_symbol, quote.price, reference, index, in_trade))
    }

    /// Everything except the summary text.
    pub async fn compose(&self, now: DateTime<FixedOffset>) -> Result<MarketBrief> {
        let cfg = &self.config;
        let quotes = self.overview().await?;
        let economic = self.economic().await;
        let articles = self.news().await;

        let sentiment = sentiment(&quotes, &cfg.index_symbol, &cfg.volatility_symbol);
        let risk = risk_level(&quotes, &cfg.index_symbol, &cfg.volatility_symbol);
        let sectors = sector_rotation(&quotes);

        let index_change = find(&quotes, &cfg.index_symbol)
            .map(|q| q.pct_change)
            .unwrap_or(0.0);
        let vix = find(&quotes, &cfg.volatility_symbol)
            .map(|q| q.price)
            .unwrap_or(20.0);
        let top_stories = select_top_stories(&articles, index_change, vix, cfg.story_limit);

        Ok(MarketBrief {
            generated_at: now,
            index_symbol: cfg.index_symbol.clone(),
            volatility_symbol: cfg.volatility_symbol.clone(),
            quotes,
            economic,
            sentiment,
            risk,
            sectors,
            top_stories,
        })
    }
}
