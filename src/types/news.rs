use serde::{Deserialize, Serialize};

/// Topic bucket used for news queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NewsCategory {
    Fed,
    Earnings,
    Geopolitical,
    Tech,
    Macro,
    Breaking,
}

impl NewsCategory {
    pub const ALL: [NewsCategory; 6] = [
        NewsCategory::Fed,
        NewsCategory::Earnings,
        NewsCategory::Geopolitical,
        NewsCategory::Tech,
        NewsCategory::Macro,
        NewsCategory::Breaking,
    ];

    /// Search query sent to the news provider.
    pub fn query(&self) -> &'static str {
        match self {
            NewsCategory::Fed => {
                "Federal Reserve OR interest rates OR monetary policy OR Jerome Powell"
            }
            NewsCategory::Earnings => "earnings OR quarterly results OR guidance OR revenue",
            NewsCategory::Geopolitical => {
                "geopolitical OR China OR Russia OR trade war OR inflation"
            }
            NewsCategory::Tech => "AI OR semiconductor OR tech stocks OR NVDA OR AAPL OR Microsoft",
            NewsCategory::Macro => "GDP OR unemployment OR economic data OR recession OR inflation",
            NewsCategory::Breaking => "stock market OR S&P 500 OR Nasdaq OR market news",
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            NewsCategory::Fed => "fed",
            NewsCategory::Earnings => "earnings",
            NewsCategory::Geopolitical => "geopolitical",
            NewsCategory::Tech => "tech",
            NewsCategory::Macro => "macro",
            NewsCategory::Breaking => "breaking",
        }
    }
}

/// A news article relevant to the market brief.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewsArticle {
    pub title: String,
    pub source: String,
    pub url: String,
    /// RFC 3339 publish time as reported by the provider.
    pub published_at: String,
    /// Truncated description, empty when the provider has none.
    pub description: String,
    pub category: NewsCategory,
}

impl NewsArticle {
    /// Only stories whose headline is about stocks or markets make the brief.
    pub fn is_market_story(&self) -> bool {
        let title = self.title.to_lowercase();
        title.contains("stock") || title.contains("market")
    }
}
