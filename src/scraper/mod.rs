pub mod browser;
pub mod cleaner;
pub mod http_client;
pub mod parsers;
pub mod sources;

use crate::config::AppConfig;
use crate::models::{SourceName, SourceRating, Ticker};
use anyhow::{Context, Result};
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

use self::browser::{Browser, WebDriverBrowser};
use self::http_client::HttpClient;
use self::sources::{
    SwingTradeBotSource, TheStreetSource, TradingViewSource, WsjSource, ZacksSource,
};

// ── Faults ────────────────────────────────────────────────────────────────────

/// Why a source produced no data. Every variant renders as an absent table row.
#[derive(Debug, Error)]
pub enum ExtractionFault {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("HTTP {status} from {url}")]
    Status { status: u16, url: String },

    #[error("anchor {anchor:?} not found")]
    MissingElement { anchor: String },

    #[error("unexpected page layout: {0}")]
    Layout(String),

    #[error("browser session not created: {0}")]
    Session(String),

    #[error("browser command failed: {0}")]
    Browser(String),

    #[error(transparent)]
    Unrecognized(#[from] cleaner::UnrecognizedRating),
}

// ── Source trait ──────────────────────────────────────────────────────────────

/// Swappable rating source abstraction.
#[async_trait]
pub trait RatingSource: Send + Sync {
    fn name(&self) -> SourceName;
    async fn extract(&self, ticker: &Ticker) -> Result<SourceRating, ExtractionFault>;
}

/// Build the five production sources in table row order.
pub fn default_sources(config: &AppConfig) -> Result<Vec<Arc<dyn RatingSource>>> {
    let client = HttpClient::new(&config.http).context("Failed to build HTTP client")?;
    let browser: Arc<dyn Browser> = Arc::new(WebDriverBrowser::new(&config.browser));
    let urls = &config.sources;

    Ok(vec![
        Arc::new(ZacksSource::new(client.clone(), &urls.zacks_url)),
        Arc::new(SwingTradeBotSource::new(client.clone(), &urls.swingtradebot_url)),
        Arc::new(TradingViewSource::new(Arc::clone(&browser), &urls.tradingview_url)),
        Arc::new(TheStreetSource::new(browser, &urls.thestreet_url)),
        Arc::new(WsjSource::new(client, &urls.wsj_url)),
    ])
}
