use anyhow::Context;
use chrono::Utc;
use clap::{Parser, Subcommand};
use pulse::config::Config;
use pulse::services::{
    Dispatcher, IndicatorEngine, MarketBriefService, MarketContextProvider, RunOutcome, Runner,
    SignalScorer,
};
use pulse::sources::{
    Messenger, NewsApiClient, NewsSource, OpenAiSummarizer, SeriesSource, Summarizer,
    TelegramMessenger, YahooFinanceClient,
};
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "pulse", version, about = "Intraday signals and daily market brief")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Score the configured instruments and deliver the signal report
    Intraday,
    /// Compose and deliver the daily market brief
    Brief,
}

fn build_runner(config: &Config) -> anyhow::Result<Runner> {
    let timeout = config.http_timeout();
    let telegram = config.require_telegram()?;

    let source: Arc<dyn SeriesSource> = Arc::new(YahooFinanceClient::new(timeout)?);
    let messenger: Arc<dyn Messenger> = Arc::new(TelegramMessenger::new(
        telegram.bot_token.clone(),
        telegram.chat_id.clone(),
        timeout,
    )?);

    let news: Option<Arc<dyn NewsSource>> = match &config.news_api_key {
        Some(key) => Some(Arc::new(NewsApiClient::new(key.clone(), timeout)?)),
        None => {
            warn!("NEWS_API_KEY not set, brief will carry no stories");
            None
        }
    };
    let summarizer: Option<Arc<dyn Summarizer>> = match &config.openai_api_key {
        Some(key) => Some(Arc::new(OpenAiSummarizer::new(
            key.clone(),
            config.openai_model.clone(),
            timeout,
        )?)),
        None => {
            warn!("OPENAI_API_KEY not set, using the simple summary");
            None
        }
    };

    Ok(Runner::new(
        source.clone(),
        Dispatcher::new(messenger, config.max_message_chars),
        IndicatorEngine::new(config.indicators.clone()),
        SignalScorer::new(config.scorer.clone()),
        MarketContextProvider::new(source.clone(), config.context.clone()),
        config.intraday.clone(),
        MarketBriefService::new(source, news, config.brief.clone()),
        summarizer,
    ))
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "pulse=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();
    let config = Config::from_env();
    let runner = build_runner(&config).context("failed to set up collaborators")?;

    let outcome = match cli.command {
        Command::Intraday => runner.run_intraday(Utc::now()).await,
        Command::Brief => runner.run_brief(Utc::now()).await,
    }?;

    match outcome {
        RunOutcome::Delivered { messages } => info!("Run complete, {} message(s) sent", messages),
        RunOutcome::Skipped(reason) => info!("Run skipped: {}", reason),
    }
    Ok(())
}
