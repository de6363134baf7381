//! Aggregator: runs every rating source for one ticker and builds the table.
//!
//! Sources are independent. A source that fails leaves its row empty and its
//! reason in the table's fault list; the remaining sources still run.
//!
//! Every source runs in its own task, so a panicking source becomes a fault
//! like any other. By default each task is awaited before the next starts;
//! with `aggregator.parallel` all are spawned up front. Results are folded in
//! source order, so the table is the same in both modes.

use crate::config::AggregatorConfig;
use crate::models::{SourceName, SourceRating, Ticker};
use crate::scraper::{ExtractionFault, RatingSource};
use crate::table::RatingTable;
use crate::utils::Timer;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

pub struct RatingAggregator {
    sources: Vec<Arc<dyn RatingSource>>,
    parallel: bool,
}

impl RatingAggregator {
    pub fn new(sources: Vec<Arc<dyn RatingSource>>, config: &AggregatorConfig) -> Self {
        Self {
            sources,
            parallel: config.parallel,
        }
    }

    pub async fn aggregate(&self, ticker: &Ticker) -> RatingTable {
        let _t = Timer::start(format!("Ratings for {}", ticker.symbol()));

        let results = if self.parallel {
            self.run_parallel(ticker).await
        } else {
            self.run_sequential(ticker).await
        };

        let mut table = RatingTable::new(ticker.clone());
        for (source, result) in results {
            match result {
                Ok(rating) => {
                    table.insert(source, &rating);
                    info!("{}: {:?} ({} in row)", source, rating, table.row(source).total());
                }
                Err(reason) => {
                    warn!("{}: no data ({})", source, reason);
                    table.record_fault(source, reason);
                }
            }
        }

        info!(
            "=== {}: {} sources rated | {} without data ===",
            ticker.symbol(),
            self.sources.len() - table.faults().len(),
            table.faults().len(),
        );
        table
    }

    async fn run_sequential(&self, ticker: &Ticker) -> Vec<(SourceName, Result<SourceRating, String>)> {
        let mut results = Vec::with_capacity(self.sources.len());
        for source in &self.sources {
            let name = source.name();
            let handle = spawn_extract(source, ticker);
            results.push((name, join_extract(name, handle).await));
        }
        results
    }

    async fn run_parallel(&self, ticker: &Ticker) -> Vec<(SourceName, Result<SourceRating, String>)> {
        let handles: Vec<_> = self
            .sources
            .iter()
            .map(|source| (source.name(), spawn_extract(source, ticker)))
            .collect();

        let mut results = Vec::with_capacity(handles.len());
        for (name, handle) in handles {
            results.push((name, join_extract(name, handle).await));
        }
        results
    }
}

type ExtractHandle = JoinHandle<Result<SourceRating, ExtractionFault>>;

/// Each source runs in its own task so a panic stays inside it.
fn spawn_extract(source: &Arc<dyn RatingSource>, ticker: &Ticker) -> ExtractHandle {
    let source = Arc::clone(source);
    let ticker = ticker.clone();
    tokio::spawn(async move { timed_extract(source.as_ref(), &ticker).await })
}

async fn join_extract(source: SourceName, handle: ExtractHandle) -> Result<SourceRating, String> {
    match handle.await {
        Ok(result) => result.map_err(|e| e.to_string()),
        Err(e) => {
            error!("Task panic for {}: {}", source, e);
            Err(format!("task failed: {}", e))
        }
    }
}

async fn timed_extract(
    source: &dyn RatingSource,
    ticker: &Ticker,
) -> Result<SourceRating, ExtractionFault> {
    let _t = Timer::start(format!("{} extraction", source.name()));
    source.extract(ticker).await
}
