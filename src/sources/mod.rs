//! External collaborators: price data, chat delivery, news and summaries.
//!
//! The pipeline only sees the traits below. The concrete HTTP clients live
//! in the submodules and can be swapped for in-memory fakes in tests.

pub mod newsapi;
pub mod openai;
pub mod telegram;
pub mod yahoo;

pub use newsapi::NewsApiClient;
pub use openai::OpenAiSummarizer;
pub use telegram::TelegramMessenger;
pub use yahoo::YahooFinanceClient;

use crate::error::Result;
use crate::types::{
    BarInterval, LookbackPeriod, MarketBrief, NewsArticle, NewsCategory, PriceSeries,
};
use std::future::Future;
use std::pin::Pin;

/// Boxed future returned by collaborator methods.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T>> + Send + 'a>>;

/// Source of OHLCV series.
pub trait SeriesSource: Send + Sync {
    /// Provider name for logs.
    fn name(&self) -> &str;

    /// Fetch bars for `symbol`. Fewer than two usable bars is
    /// `DataUnavailable`.
    fn fetch_series<'a>(
        &'a self,
        symbol: &'a str,
        interval: BarInterval,
        lookback: &'a LookbackPeriod,
    ) -> BoxFuture<'a, PriceSeries>;
}

/// Chat delivery.
pub trait Messenger: Send + Sync {
    /// Send one text message. Callers split long text first, see
    /// `services::delivery`.
    fn send_text<'a>(&'a self, text: &'a str) -> BoxFuture<'a, ()>;

    /// Send a PNG image with a caption.
    fn send_image<'a>(&'a self, image: &'a [u8], caption: &'a str) -> BoxFuture<'a, ()>;
}

/// Market news search.
pub trait NewsSource: Send + Sync {
    fn fetch_category(&self, category: NewsCategory) -> BoxFuture<'_, Vec<NewsArticle>>;
}

/// Natural-language summary of the daily brief.
pub trait Summarizer: Send + Sync {
    fn summarize<'a>(&'a self, brief: &'a MarketBrief) -> BoxFuture<'a, String>;
}
