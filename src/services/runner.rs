//! Batch runs: the intraday signal report and the daily market brief.
//!
//! Each run is a stateless pull → compute → render → deliver pass. A failed
//! run is logged and an error notice is delivered in place of the report.

use crate::error::{AppError, Result};
use crate::services::brief::{summarize, MarketBriefService};
use crate::services::context::MarketContextProvider;
use crate::services::delivery::Dispatcher;
use crate::services::report::{
    format_error_notice, format_intraday_report, format_news_digest, format_signal_section,
    format_swing_module,
};
use crate::services::signals::{IndicatorEngine, SignalScorer};
use crate::sources::{SeriesSource, Summarizer};
use crate::types::{BarInterval, InstrumentRole, LookbackPeriod, SignalResult};
use chrono::{DateTime, FixedOffset, Timelike, Utc};
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// Local hours during which intraday reports go out.
#[derive(Debug, Clone, PartialEq)]
pub struct TradingHours {
    pub utc_offset_hours: i32,
    pub allowed_hours: Vec<u32>,
}

impl Default for TradingHours {
    fn default() -> Self {
        Self {
            utc_offset_hours: 8,
            allowed_hours: (9..24).chain(0..2).collect(),
        }
    }
}

impl TradingHours {
    pub fn offset(&self) -> Result<FixedOffset> {
        FixedOffset::east_opt(self.utc_offset_hours * 3600).ok_or_else(|| {
            AppError::Config(format!("invalid UTC offset {}h", self.utc_offset_hours))
        })
    }

    pub fn local(&self, now: DateTime<Utc>) -> Result<DateTime<FixedOffset>> {
        Ok(now.with_timezone(&self.offset()?))
    }

    pub fn allows(&self, local: &DateTime<FixedOffset>) -> bool {
        self.allowed_hours.contains(&local.hour())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct IntradayConfig {
    /// Instruments in report order.
    pub instruments: Vec<(String, InstrumentRole)>,
    pub interval: BarInterval,
    pub lookback: LookbackPeriod,
    pub hours: TradingHours,
}

impl Default for IntradayConfig {
    fn default() -> Self {
        Self {
            instruments: vec![
                ("TQQQ".to_string(), InstrumentRole::LongBiased),
                ("SQQQ".to_string(), InstrumentRole::ShortBiased),
            ],
            interval: BarInterval::FifteenMinutes,
            lookback: LookbackPeriod::days(2),
            hours: TradingHours::default(),
        }
    }
}

/// What a run ended with.
#[derive(Debug, Clone, PartialEq)]
pub enum RunOutcome {
    Delivered { messages: usize },
    Skipped(String),
}

pub struct Runner {
    source: Arc<dyn SeriesSource>,
    dispatcher: Dispatcher,
    engine: IndicatorEngine,
    scorer: SignalScorer,
    context: MarketContextProvider,
    intraday: IntradayConfig,
    brief: MarketBriefService,
    summarizer: Option<Arc<dyn Summarizer>>,
}

impl Runner {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        source: Arc<dyn SeriesSource>,
        dispatcher: Dispatcher,
        engine: IndicatorEngine,
        scorer: SignalScorer,
        context: MarketContextProvider,
        intraday: IntradayConfig,
        brief: MarketBriefService,
        summarizer: Option<Arc<dyn Summarizer>>,
    ) -> Self {
        Self {
            source,
            dispatcher,
            engine,
            scorer,
            context,
            intraday,
            brief,
            summarizer,
        }
    }

    /// Score every configured instrument and render the report.
    ///
    /// A context failure degrades to scoring without context. Any
    /// instrument failure fails the whole report.
    pub async fn intraday_report(
        &self,
        local: &DateTime<FixedOffset>,
    ) -> Result<(String, Vec<SignalResult>)> {
        let context = match self.context.context().await {
            Ok(ctx) => Some(ctx),
            Err(e) => {
                warn!("Market context unavailable, scoring without it: {}", e);
                None
            }
        };

        let cfg = &self.intraday;
        let mut sections = Vec::with_capacity(cfg.instruments.len());
        let mut results = Vec::with_capacity(cfg.instruments.len());
        for (symbol, role) in &cfg.instruments {
            debug!("Fetching {} from {}", symbol, self.source.name());
            let series = self
                .source
                .fetch_series(symbol, cfg.interval, &cfg.lookback)
                .await?;
            let snapshot = self.engine.snapshot(&series)?;
            let result = self.scorer.score(&snapshot, *role, context.as_ref())?;
            info!(
                "{}: score {:.0} ({}) -> {}",
                symbol,
                result.score,
                result.tier.label(),
                result.action.label()
            );
            sections.push(format_signal_section(symbol, &snapshot, &result, context.as_ref()));
            results.push(result);
        }

        Ok((format_intraday_report(local, &sections), results))
    }

    pub async fn run_intraday(&self, now: DateTime<Utc>) -> Result<RunOutcome> {
        let local = self.intraday.hours.local(now)?;
        if !self.intraday.hours.allows(&local) {
            let reason = format!("outside trading hours ({:02}:00 local)", local.hour());
            info!("Intraday run skipped: {}", reason);
            return Ok(RunOutcome::Skipped(reason));
        }

        let outcome = async {
            let (report, _) = self.intraday_report(&local).await?;
            let messages = self.dispatcher.send(&report).await?;
            Ok::<_, AppError>(RunOutcome::Delivered { messages })
        }
        .await;
        self.report_failure("Intraday signal run", outcome).await
    }

    /// Summary, swing module and news digest, in delivery order.
    pub async fn brief_messages(&self, local: DateTime<FixedOffset>) -> Result<Vec<String>> {
        let brief = self.brief.compose(local).await?;
        let summary = summarize(&brief, self.summarizer.as_deref()).await?;

        let mut messages = vec![summary];
        match self.brief.swing(brief.index(), false).await {
            Ok(setup) => messages.push(format_swing_module(&setup, &brief, &local)),
            Err(e) => warn!("Swing module skipped: {}", e),
        }
        if !brief.top_stories.is_empty() {
            messages.push(format_news_digest(&brief.top_stories, &local));
        }
        Ok(messages)
    }

    pub async fn run_brief(&self, now: DateTime<Utc>) -> Result<RunOutcome> {
        let outcome = async {
            let local = self.intraday.hours.local(now)?;
            let mut sent = 0;
            for message in &self.brief_messages(local).await? {
                sent += self.dispatcher.send(message).await?;
            }
            info!("Market brief delivered ({} messages)", sent);
            Ok::<_, AppError>(RunOutcome::Delivered { messages: sent })
        }
        .await;
        self.report_failure("Market brief", outcome).await
    }

    /// Log a failed run and try to deliver a notice. The run error is
    /// returned either way.
    async fn report_failure(&self, run: &str, outcome: Result<RunOutcome>) -> Result<RunOutcome> {
        let err = match outcome {
            Ok(outcome) => return Ok(outcome),
            Err(e) => e,
        };
        error!("{} failed: {}", run, err);
        let notice = format_error_notice(run, &err);
        if let Err(send_err) = self.dispatcher.send(&notice).await {
            error!("Could not deliver error notice: {}", send_err);
        }
        Err(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_default_hours_window() {
        let hours = TradingHours::default();
        let at = |h: u32| {
            let utc = Utc.with_ymd_and_hms(2024, 5, 1, h, 0, 0).unwrap();
            hours.allows(&hours.local(utc).unwrap())
        };
        // 01:00 UTC is 09:00 at UTC+8
        assert!(at(1));
        // 17:00 UTC is 01:00 local
        assert!(at(17));
        // 18:00 UTC is 02:00 local
        assert!(!at(18));
        assert!(!at(0));
    }

    #[test]
    fn test_invalid_offset() {
        let hours = TradingHours {
            utc_offset_hours: 30,
            allowed_hours: vec![],
        };
        assert!(matches!(hours.offset(), Err(AppError::Config(_))));
    }
}
