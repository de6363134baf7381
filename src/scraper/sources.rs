//! One `RatingSource` per site.
//!
//! Zacks, SwingTradeBot and WSJ serve their ratings in the initial HTML and go
//! through the plain HTTP client. TradingView and TheStreet render theirs with
//! client-side scripts and need a browser session.

use crate::models::{SourceName, SourceRating, Ticker};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::debug;

use super::browser::Browser;
use super::cleaner::{capitalize_signal, letter_grade, normalize, zacks_rank_words};
use super::http_client::HttpClient;
use super::parsers::{parse_swingtradebot_cell, parse_wsj_counts, parse_zacks_rank};
use super::{ExtractionFault, RatingSource};

const TRADINGVIEW_SIGNAL_CLASS: &str = "speedometerSignal-pyzN--tL";
const THESTREET_GRADE_CLASS: &str = "m-market-data-quant--grade";

fn base(url: &str) -> String {
    url.trim_end_matches('/').to_string()
}

// ── Zacks ─────────────────────────────────────────────────────────────────────

/// Zacks Rank, e.g. "3-Hold of 5".
pub struct ZacksSource {
    client: HttpClient,
    base_url: String,
}

impl ZacksSource {
    pub fn new(client: HttpClient, base_url: &str) -> Self {
        Self {
            client,
            base_url: base(base_url),
        }
    }

    fn quote_url(&self, symbol: &str) -> String {
        format!("{}/stock/quote/{}?q={}", self.base_url, symbol, symbol)
    }
}

#[async_trait]
impl RatingSource for ZacksSource {
    fn name(&self) -> SourceName {
        SourceName::Zacks
    }

    async fn extract(&self, ticker: &Ticker) -> Result<SourceRating, ExtractionFault> {
        let html = self.client.get_text(&self.quote_url(ticker.symbol())).await?;
        let rank = parse_zacks_rank(&html)?;
        debug!("Zacks rank text: {:?}", rank);

        let words = zacks_rank_words(&rank)
            .ok_or_else(|| ExtractionFault::Layout(format!("no rating words in {:?}", rank)))?;
        Ok(SourceRating::Single(normalize(&words)?))
    }
}

// ── SwingTradeBot ─────────────────────────────────────────────────────────────

/// Letter grade from the equity summary table.
pub struct SwingTradeBotSource {
    client: HttpClient,
    base_url: String,
}

impl SwingTradeBotSource {
    pub fn new(client: HttpClient, base_url: &str) -> Self {
        Self {
            client,
            base_url: base(base_url),
        }
    }

    fn equity_url(&self, symbol: &str) -> String {
        format!("{}/equities/{}", self.base_url, symbol)
    }
}

#[async_trait]
impl RatingSource for SwingTradeBotSource {
    fn name(&self) -> SourceName {
        SourceName::SwingTradeBot
    }

    async fn extract(&self, ticker: &Ticker) -> Result<SourceRating, ExtractionFault> {
        let html = self.client.get_text(&self.equity_url(ticker.symbol())).await?;
        let cell = parse_swingtradebot_cell(&html)?;

        let grade = letter_grade(&cell)
            .ok_or_else(|| ExtractionFault::Layout(format!("no letter grade in {:?}", cell)))?;
        Ok(SourceRating::Single(normalize(&grade)?))
    }
}

// ── TradingView ───────────────────────────────────────────────────────────────

/// Technical-analysis gauge. The only source whose URL needs the exchange.
pub struct TradingViewSource {
    browser: Arc<dyn Browser>,
    base_url: String,
}

impl TradingViewSource {
    pub fn new(browser: Arc<dyn Browser>, base_url: &str) -> Self {
        Self {
            browser,
            base_url: base(base_url),
        }
    }

    fn technicals_url(&self, ticker: &Ticker) -> String {
        format!(
            "{}/symbols/{}-{}/technicals/",
            self.base_url,
            ticker.exchange(),
            ticker.symbol().to_uppercase()
        )
    }
}

#[async_trait]
impl RatingSource for TradingViewSource {
    fn name(&self) -> SourceName {
        SourceName::TradingView
    }

    async fn extract(&self, ticker: &Ticker) -> Result<SourceRating, ExtractionFault> {
        let url = self.technicals_url(ticker);
        let signal = self.browser.text_by_class(&url, TRADINGVIEW_SIGNAL_CLASS).await?;

        // Gauge text is upper case ("STRONG BUY", "NEUTRAL")
        Ok(SourceRating::Single(normalize(&capitalize_signal(&signal))?))
    }
}

// ── TheStreet ─────────────────────────────────────────────────────────────────

/// Quant letter grade (A+ .. F).
pub struct TheStreetSource {
    browser: Arc<dyn Browser>,
    base_url: String,
}

impl TheStreetSource {
    pub fn new(browser: Arc<dyn Browser>, base_url: &str) -> Self {
        Self {
            browser,
            base_url: base(base_url),
        }
    }

    fn quote_url(&self, symbol: &str) -> String {
        format!("{}/quote/{}", self.base_url, symbol)
    }
}

#[async_trait]
impl RatingSource for TheStreetSource {
    fn name(&self) -> SourceName {
        SourceName::TheStreet
    }

    async fn extract(&self, ticker: &Ticker) -> Result<SourceRating, ExtractionFault> {
        let url = self.quote_url(ticker.symbol());
        let grade = self.browser.text_by_class(&url, THESTREET_GRADE_CLASS).await?;
        Ok(SourceRating::Single(normalize(&grade)?))
    }
}

// ── WSJ ───────────────────────────────────────────────────────────────────────

/// Wall Street analyst counts from the research-ratings page.
pub struct WsjSource {
    client: HttpClient,
    base_url: String,
}

impl WsjSource {
    pub fn new(client: HttpClient, base_url: &str) -> Self {
        Self {
            client,
            base_url: base(base_url),
        }
    }

    fn ratings_url(&self, symbol: &str) -> String {
        format!(
            "{}/market-data/quotes/{}/research-ratings",
            self.base_url, symbol
        )
    }
}

#[async_trait]
impl RatingSource for WsjSource {
    fn name(&self) -> SourceName {
        SourceName::WsjAnalysts
    }

    async fn extract(&self, ticker: &Ticker) -> Result<SourceRating, ExtractionFault> {
        let html = self.client.get_text(&self.ratings_url(ticker.symbol())).await?;
        let counts = parse_wsj_counts(&html)?;
        debug!("WSJ counts (strong sell → strong buy): {:?}", counts);
        Ok(SourceRating::distribution(counts))
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
