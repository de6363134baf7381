//! Ticker validation against Yahoo Finance symbol search.
//!
//! `resolve` makes one attempt and reports why it failed; re-prompting is the
//! caller's business.

use crate::models::{Exchange, Ticker};
use anyhow::Context;
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;
use tracing::debug;
use yahoo_finance_api as yahoo;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ResolveError {
    #[error("no ticker entered")]
    Empty,

    #[error("unknown ticker: {0}")]
    NotFound(String),

    #[error("ticker lookup failed: {0}")]
    Lookup(String),
}

// ── Lookup trait ──────────────────────────────────────────────────────────────

/// Ticker metadata reference.
#[async_trait]
pub trait TickerLookup: Send + Sync {
    /// Raw exchange code for `symbol` ("NMS", "NYQ", ...), `None` if unknown.
    async fn exchange_code(&self, symbol: &str) -> Result<Option<String>, ResolveError>;
}

pub struct YahooLookup {
    connector: yahoo::YahooConnector,
}

impl YahooLookup {
    pub fn new() -> anyhow::Result<Self> {
        let connector = yahoo::YahooConnector::new()
            .map_err(|e| anyhow::anyhow!("{}", e))
            .context("Failed to create Yahoo connector")?;
        Ok(Self { connector })
    }
}

#[async_trait]
impl TickerLookup for YahooLookup {
    async fn exchange_code(&self, symbol: &str) -> Result<Option<String>, ResolveError> {
        let found = self
            .connector
            .search_ticker(symbol)
            .await
            .map_err(|e| ResolveError::Lookup(e.to_string()))?;

        Ok(found
            .quotes
            .into_iter()
            .find(|q| q.symbol.eq_ignore_ascii_case(symbol))
            .map(|q| q.exchange))
    }
}

// ── Resolver ──────────────────────────────────────────────────────────────────

pub struct TickerResolver {
    lookup: Arc<dyn TickerLookup>,
}

impl TickerResolver {
    pub fn new(lookup: Arc<dyn TickerLookup>) -> Self {
        Self { lookup }
    }

    pub async fn resolve(&self, input: &str) -> Result<Ticker, ResolveError> {
        let symbol = clean_symbol(input);
        if symbol.is_empty() {
            return Err(ResolveError::Empty);
        }

        let code = self
            .lookup
            .exchange_code(&symbol)
            .await?
            .filter(|code| !code.trim().is_empty())
            .ok_or_else(|| ResolveError::NotFound(symbol.clone()))?;

        let exchange = Exchange::from_code(code.trim());
        debug!("{}: exchange code {} → {}", symbol, code, exchange);
        Ok(Ticker::new(symbol, exchange))
    }
}

/// "  aa pl " → "AAPL"
pub fn clean_symbol(s: &str) -> String {
    s.chars()
        .filter(|c| !c.is_whitespace())
        .collect::<String>()
        .to_uppercase()
}
