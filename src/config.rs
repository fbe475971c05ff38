use crate::error::{AppError, Result};
use crate::services::brief::BriefConfig;
use crate::services::context::ContextConfig;
use crate::services::delivery::DEFAULT_MAX_MESSAGE_CHARS;
use crate::services::runner::{IntradayConfig, TradingHours};
use crate::services::signals::{IndicatorParams, ScorerConfig};
use crate::types::{BarInterval, InstrumentRole, LookbackPeriod};
use std::env;
use std::str::FromStr;
use std::time::Duration;

/// Telegram bot credentials.
#[derive(Debug, Clone, PartialEq)]
pub struct TelegramConfig {
    pub bot_token: String,
    pub chat_id: String,
}

/// Application configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Telegram bot token and chat id. Both are needed to deliver anything.
    pub telegram: Option<TelegramConfig>,
    /// NewsAPI key; without it the brief has no stories.
    pub news_api_key: Option<String>,
    /// OpenAI key; without it the brief uses the simple summary.
    pub openai_api_key: Option<String>,
    pub openai_model: String,
    /// Timeout for every outbound HTTP call.
    pub http_timeout_secs: u64,
    /// Longest single chat message.
    pub max_message_chars: usize,
    pub intraday: IntradayConfig,
    pub context: ContextConfig,
    pub brief: BriefConfig,
    pub indicators: IndicatorParams,
    pub scorer: ScorerConfig,
}

/// Parse an hour list such as `9-23,0-1` (ranges inclusive).
pub fn parse_hours(list: &str) -> Option<Vec<u32>> {
    let mut hours = Vec::new();
    for part in list.split(',').map(str::trim).filter(|p| !p.is_empty()) {
        let (start, end) = match part.split_once('-') {
            Some((a, b)) => (a.trim().parse::<u32>().ok()?, b.trim().parse::<u32>().ok()?),
            None => {
                let h = part.parse::<u32>().ok()?;
                (h, h)
            }
        };
        if start > end || end > 23 {
            return None;
        }
        hours.extend(start..=end);
    }
    if hours.is_empty() {
        None
    } else {
        Some(hours)
    }
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build configuration from any key lookup. Unset or unparsable values
    /// fall back to defaults.
    pub fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Self {
        fn parse<T: FromStr>(value: Option<String>) -> Option<T> {
            value.and_then(|v| v.trim().parse().ok())
        }

        let non_empty = |key: &str| get(key).filter(|v| !v.trim().is_empty());

        let telegram = match (non_empty("TELEGRAM_BOT_TOKEN"), non_empty("CHAT_ID")) {
            (Some(bot_token), Some(chat_id)) => Some(TelegramConfig { bot_token, chat_id }),
            _ => None,
        };

        let interval = non_empty("INTRADAY_INTERVAL")
            .and_then(|v| BarInterval::from_str(v.trim()))
            .unwrap_or(BarInterval::FifteenMinutes);
        let lookback = non_empty("INTRADAY_PERIOD")
            .map(LookbackPeriod::new)
            .unwrap_or_else(|| LookbackPeriod::days(2));

        let hours = TradingHours {
            utc_offset_hours: parse(non_empty("UTC_OFFSET_HOURS")).unwrap_or(8),
            allowed_hours: non_empty("ALLOWED_HOURS")
                .and_then(|v| parse_hours(&v))
                .unwrap_or_else(|| TradingHours::default().allowed_hours),
        };

        let intraday = IntradayConfig {
            instruments: vec![
                (
                    non_empty("LONG_SYMBOL").unwrap_or_else(|| "TQQQ".to_string()),
                    InstrumentRole::LongBiased,
                ),
                (
                    non_empty("SHORT_SYMBOL").unwrap_or_else(|| "SQQQ".to_string()),
                    InstrumentRole::ShortBiased,
                ),
            ],
            interval,
            lookback: lookback.clone(),
            hours,
        };

        let index_symbol = non_empty("INDEX_SYMBOL").unwrap_or_else(|| "SPY".to_string());
        let volatility_symbol =
            non_empty("VOLATILITY_SYMBOL").unwrap_or_else(|| "^VIX".to_string());

        let context = ContextConfig {
            index_symbol: index_symbol.clone(),
            volatility_symbol: volatility_symbol.clone(),
            interval,
            lookback,
            trend_lookback: parse(non_empty("TREND_LOOKBACK_BARS")).unwrap_or(9),
        };

        let brief = BriefConfig {
            index_symbol,
            volatility_symbol,
            swing_symbol: non_empty("SWING_SYMBOL").unwrap_or_else(|| "TQQQ".to_string()),
            ..BriefConfig::default()
        };

        let mut scorer = ScorerConfig::default();
        if let Some(max) = parse(non_empty("MAX_REASONS")) {
            scorer.max_reasons = max;
        }

        Self {
            telegram,
            news_api_key: non_empty("NEWS_API_KEY"),
            openai_api_key: non_empty("OPENAI_API_KEY"),
            openai_model: non_empty("OPENAI_MODEL").unwrap_or_else(|| "gpt-4o".to_string()),
            http_timeout_secs: parse(non_empty("HTTP_TIMEOUT_SECS")).unwrap_or(30),
            max_message_chars: parse(non_empty("MAX_MESSAGE_CHARS"))
                .unwrap_or(DEFAULT_MAX_MESSAGE_CHARS),
            intraday,
            context,
            brief,
            indicators: IndicatorParams::default(),
            scorer,
        }
    }

    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs)
    }

    /// Telegram credentials, or a configuration error naming what is missing.
    pub fn require_telegram(&self) -> Result<&TelegramConfig> {
        self.telegram.as_ref().ok_or_else(|| {
            AppError::Config("TELEGRAM_BOT_TOKEN and CHAT_ID must be set".to_string())
        })
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}
