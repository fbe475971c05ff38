pub mod brief;
pub mod context;
pub mod delivery;
pub mod report;
pub mod runner;
pub mod signals;

pub use brief::{BriefConfig, MarketBriefService};
pub use context::{derive_context, ContextConfig, MarketContextProvider};
pub use delivery::{chunk_message, Dispatcher};
pub use runner::{IntradayConfig, RunOutcome, Runner, TradingHours};
pub use signals::{IndicatorEngine, IndicatorParams, ScorerConfig, SignalScorer};
