//! Text rendering for chat delivery.
//!
//! Everything here is a pure function of its inputs. Output uses Telegram's
//! legacy Markdown (`*bold*`, `[text](url)`). Missing values render as
//! `N/A`.

use crate::error::AppError;
use crate::types::{
    IndicatorSnapshot, MarketBrief, MarketContext, MarketQuote, NewsArticle, SignalAction,
    SignalResult, SwingSetup,
};
use chrono::{DateTime, FixedOffset};
use std::fmt::Write;

const NA: &str = "N/A";

fn fmt_opt(value: Option<f64>, decimals: usize) -> String {
    match value {
        Some(v) if v.is_finite() => format!("{:.*}", decimals, v),
        _ => NA.to_string(),
    }
}

fn fmt_signed(value: Option<f64>, decimals: usize) -> String {
    match value {
        Some(v) if v.is_finite() => format!("{:+.*}", decimals, v),
        _ => NA.to_string(),
    }
}

fn fmt_price(value: Option<f64>) -> String {
    match value {
        Some(v) if v.is_finite() => format!("${:.2}", v),
        _ => NA.to_string(),
    }
}

fn action_line(result: &SignalResult, price: f64) -> String {
    match result.action {
        SignalAction::Wait => format!("⏳ *WAIT for {}*", result.symbol),
        SignalAction::StrongBuy | SignalAction::StrongSell => format!(
            "🚀 *{} {}* @ ${:.2}",
            result.action.label().to_uppercase(),
            result.symbol,
            price
        ),
        SignalAction::Buy | SignalAction::Sell => format!(
            "✅ *{} {}* @ ${:.2}",
            result.action.label().to_uppercase(),
            result.symbol,
            price
        ),
    }
}

/// One instrument's block of the intraday report.
pub fn format_signal_section(
    symbol: &str,
    snapshot: &IndicatorSnapshot,
    result: &SignalResult,
    context: Option<&MarketContext>,
) -> String {
    let row = &snapshot.latest;
    let mut out = String::new();

    let _ = writeln!(out, "🎯 Analyzing: *{}* ({})\n", symbol, result.role.label());
    let _ = writeln!(
        out,
        "• RSI: {} | RSI(7): {}",
        fmt_opt(row.rsi, 1),
        fmt_opt(row.rsi_short, 1)
    );
    let _ = writeln!(
        out,
        "• MACD Hist: {} (prev {})",
        fmt_signed(row.macd_histogram, 4),
        fmt_signed(snapshot.previous.macd_histogram, 4)
    );
    let _ = writeln!(
        out,
        "• Trend: ${:.2} vs EMA9 {}, VWAP {}",
        row.close,
        fmt_price(row.ema_fast),
        fmt_price(row.vwap)
    );
    let _ = writeln!(
        out,
        "• Volume: {}x avg | Momentum: {}%",
        fmt_opt(row.volume_ratio, 1),
        fmt_signed(row.momentum, 2)
    );
    let _ = writeln!(
        out,
        "• Stoch %K/%D: {}/{} | Williams %R: {}",
        fmt_opt(row.stoch_k, 1),
        fmt_opt(row.stoch_d, 1),
        fmt_opt(row.williams_r, 1)
    );
    let _ = writeln!(
        out,
        "• Support {} | Resistance {}",
        fmt_price(row.support),
        fmt_price(row.resistance)
    );
    match context {
        Some(ctx) => {
            let _ = writeln!(
                out,
                "• {} Trend: {}, {}: {:.1}",
                ctx.index_symbol,
                ctx.trend.label(),
                ctx.volatility_symbol.trim_start_matches('^'),
                ctx.volatility
            );
        }
        None => {
            let _ = writeln!(out, "• Market context: {}", NA);
        }
    }

    if !result.reasons.is_empty() {
        out.push_str("\n*Why:*\n");
        for reason in &result.reasons {
            let _ = writeln!(out, "• {}", reason);
        }
    }

    let _ = writeln!(
        out,
        "\n📊 *Confidence Score:* {:.0} ({})",
        result.score,
        result.tier.label()
    );
    if result.context_adjustment != 0.0 {
        let _ = writeln!(out, "Context adjustment: {:+.0}", result.context_adjustment);
    }
    let _ = writeln!(out, "{}", action_line(result, row.close));
    out
}

/// Header plus the per-instrument sections.
pub fn format_intraday_report(timestamp: &DateTime<FixedOffset>, sections: &[String]) -> String {
    let mut out = format!(
        "📈 *Intraday Signal Report* - {}\n\n",
        timestamp.format("%Y-%m-%d %H:%M")
    );
    out.push_str(&sections.join("\n"));
    out
}

fn quote_price(quote: Option<&MarketQuote>) -> Option<f64> {
    quote.map(|q| q.price)
}

/// Plain daily brief used when no summarizer is available.
pub fn format_simple_summary(brief: &MarketBrief) -> String {
    let spy = brief.index();
    let vix = brief.volatility();
    let mut out = String::new();

    let _ = writeln!(
        out,
        "📊 MARKET BRIEF - {}\n",
        brief.generated_at.format("%B %d, %Y")
    );
    out.push_str("🎯 MARKET SNAPSHOT:\n");
    let _ = writeln!(
        out,
        "• {}: {} ({}%)",
        brief.index_symbol,
        fmt_price(quote_price(spy)),
        fmt_signed(spy.map(|q| q.pct_change), 2)
    );
    let _ = writeln!(
        out,
        "• {}: {} ({}%)",
        brief.volatility_label(),
        fmt_opt(quote_price(vix), 2),
        fmt_signed(vix.map(|q| q.pct_change), 2)
    );
    let _ = writeln!(out, "• RSI: {}", fmt_opt(spy.map(|q| q.rsi), 1));
    let _ = writeln!(
        out,
        "• Market Regime: {}",
        brief.sentiment.regime.map(|r| r.label()).unwrap_or("Normal")
    );
    let _ = writeln!(
        out,
        "• 10Y Yield: {}% ({})",
        fmt_opt(brief.economic.ten_year_yield, 2),
        fmt_signed(brief.economic.ten_year_change, 2)
    );
    let _ = writeln!(
        out,
        "• Dollar Index: {} ({})\n",
        fmt_opt(brief.economic.dollar_index, 2),
        fmt_signed(brief.economic.dollar_change, 2)
    );

    out.push_str("📈 TECHNICAL LEVELS:\n");
    let _ = writeln!(out, "• Support: {}", fmt_price(spy.and_then(|q| q.support)));
    let _ = writeln!(out, "• Resistance: {}", fmt_price(spy.and_then(|q| q.resistance)));
    let _ = writeln!(
        out,
        "• Volume: {}x avg\n",
        fmt_opt(spy.map(|q| q.volume_ratio), 1)
    );

    out.push_str("⚠️ RISK ASSESSMENT:\n");
    let _ = writeln!(
        out,
        "• Risk Level: {}",
        brief.risk.map(|r| r.label()).unwrap_or("Normal")
    );
    let _ = writeln!(
        out,
        "• Position Sizing: {}\n",
        brief
            .risk
            .map(|r| r.position_sizing())
            .unwrap_or("Standard allocation appropriate")
    );

    out.push_str("🔄 TOP SECTORS TODAY:");
    for sector in brief.sectors.iter().take(5) {
        let _ = write!(out, "\n• {}: {:+.2}%", sector.sector, sector.pct_change);
    }

    if !brief.top_stories.is_empty() {
        out.push_str("\n\n📰 KEY MARKET DRIVERS:");
        for (i, story) in brief.top_stories.iter().take(3).enumerate() {
            let _ = write!(out, "\n{}. {} ({})", i + 1, story.title, story.source);
        }
    }

    let _ = write!(
        out,
        "\n\n🤖 Auto-generated at {}",
        brief.generated_at.format("%H:%M:%S UTC%:z")
    );
    out
}

/// Prompt sent to the summarizer.
pub fn format_summary_prompt(brief: &MarketBrief) -> String {
    let spy = brief.index();
    let vix = brief.volatility();
    let mut out = String::new();

    let _ = writeln!(
        out,
        "🧠 MARKET SNAPSHOT - {}\n",
        brief.generated_at.format("%b %d, %Y")
    );
    let _ = writeln!(
        out,
        "{}: {} ({}%) | RSI: {}",
        brief.index_symbol,
        fmt_opt(quote_price(spy), 2),
        fmt_signed(spy.map(|q| q.pct_change), 2),
        fmt_opt(spy.map(|q| q.rsi), 1)
    );
    let _ = writeln!(
        out,
        "{}: {} | Regime: {}",
        brief.volatility_label(),
        fmt_opt(quote_price(vix), 2),
        brief.sentiment.regime.map(|r| r.label()).unwrap_or("Normal")
    );
    let _ = writeln!(
        out,
        "10Y Yield: {}% ({})",
        fmt_opt(brief.economic.ten_year_yield, 2),
        fmt_signed(brief.economic.ten_year_change, 2)
    );
    let _ = writeln!(
        out,
        "Key Levels: Support={}, Resistance={}",
        fmt_opt(spy.and_then(|q| q.support), 2),
        fmt_opt(spy.and_then(|q| q.resistance), 2)
    );
    let _ = writeln!(out, "Volume: {}x avg", fmt_opt(spy.map(|q| q.volume_ratio), 1));
    let _ = writeln!(
        out,
        "Risk: {}",
        brief.risk.map(|r| r.label()).unwrap_or("Normal")
    );

    if !brief.sectors.is_empty() {
        out.push_str("\nSector Rotation:\n");
        for sector in brief.sectors.iter().take(5) {
            let _ = writeln!(out, "• {}: {:+.2}%", sector.sector, sector.pct_change);
        }
    }

    if !brief.top_stories.is_empty() {
        out.push_str("\nTop Headlines:\n");
        for (i, story) in brief.top_stories.iter().enumerate() {
            let _ = writeln!(out, "{}. {} ({})", i + 1, story.title, story.source);
            if !story.description.is_empty() {
                let _ = writeln!(out, "   {}", story.description);
            }
        }
    }

    out.push_str(
        "\nSummarize what happened, the impact on markets, and what it means to investors.",
    );
    out
}

/// Headlines with links, sent after the summary.
pub fn format_news_digest(stories: &[NewsArticle], at: &DateTime<FixedOffset>) -> String {
    let mut out = format!(
        "📰 *KEY MARKET DRIVERS* - {}\n\n",
        at.format("%B %d, %Y")
    );
    for (i, story) in stories.iter().enumerate() {
        let _ = writeln!(out, "*{}. {}*", i + 1, story.title);
        let _ = writeln!(out, "🔗 Source: {}", story.source);
        if !story.description.is_empty() {
            let _ = writeln!(out, "📝 {}", story.description);
        }
        let _ = writeln!(out, "🔗 [Read More]({})\n", story.url);
    }
    let _ = write!(out, "🤖 Curated at {}", at.format("%H:%M:%S UTC%:z"));
    out
}

/// Swing-trade levels for the leveraged long instrument.
pub fn format_swing_module(
    setup: &SwingSetup,
    brief: &MarketBrief,
    date: &DateTime<FixedOffset>,
) -> String {
    let index = brief.index();
    let volatility = brief.volatility();
    let mut out = String::new();
    let _ = writeln!(
        out,
        "🎯 {} Trading Module – {}",
        setup.symbol,
        date.format("%B %d, %Y")
    );
    out.push_str("✅ *Swing Setup*\n\n");

    let index_name = brief.index_symbol.as_str();
    let _ = writeln!(out, "📌 {} Context:", index_name);
    let _ = writeln!(
        out,
        "• {} Price: {} | RSI: {}",
        index_name,
        fmt_price(quote_price(index)),
        fmt_opt(index.map(|q| q.rsi), 1)
    );
    let _ = writeln!(
        out,
        "• Support: {} | Resistance: {}",
        fmt_price(index.and_then(|q| q.support)),
        fmt_price(index.and_then(|q| q.resistance))
    );
    let _ = writeln!(
        out,
        "• {}: {}\n",
        brief.volatility_label(),
        fmt_opt(quote_price(volatility), 2)
    );

    let _ = writeln!(out, "📈 {} Levels:", setup.symbol);
    let _ = writeln!(out, "• Current: ${:.2}", setup.price);
    let _ = writeln!(out, "• Swing High: ${:.2}", setup.reference);
    let _ = writeln!(out, "• Buy Zone: ${:.2} – ${:.2}", setup.buy_low, setup.buy_high);
    let _ = writeln!(out, "• Stop Loss: ${:.2}", setup.stop_loss);
    let _ = writeln!(out, "• Target: ${:.2}\n", setup.target);

    let _ = writeln!(
        out,
        "💡 Strategy: Buy near entry zone only if {} pulls back to support with RSI < 60. \
         Exit at target or if {} fails support.",
        index_name, index_name
    );
    let _ = write!(out, "🛠️ Actionable: {}", setup.action.label());
    out
}

/// Notice sent when a run fails.
pub fn format_error_notice(run: &str, error: &AppError) -> String {
    format!(
        "⚠️ SYSTEM ERROR: {} failed ({}) - {}",
        run,
        error.kind(),
        error
    )
}
