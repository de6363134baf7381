mod config;
mod models;
mod pipeline;
mod resolver;
mod scraper;
mod table;
mod utils;

use anyhow::{Context, Result, bail};
use clap::{Parser, ValueEnum};
use std::io::{self, Write};
use std::sync::Arc;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader, Lines};
use tracing::warn;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{EnvFilter, fmt};

use crate::config::AppConfig;
use crate::models::Ticker;
use crate::pipeline::RatingAggregator;
use crate::resolver::{TickerResolver, YahooLookup};

#[derive(Parser)]
#[command(
    name = "analyst-ratings",
    about = "Analyst consensus ratings from five public sources",
    version
)]
struct Cli {
    /// Ticker symbol (prompted for when omitted)
    ticker: Option<String>,

    /// How to print the rating table
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Table)]
    format: OutputFormat,

    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormat {
    Table,
    Csv,
    Json,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => "analyst_ratings=info,warn",
        1 => "analyst_ratings=debug,info",
        _ => "trace",
    };

    // Logs go to stderr; stdout carries the table.
    tracing_subscriber::registry()
        .with(fmt::layer().compact().with_target(false).with_writer(io::stderr))
        .with(EnvFilter::new(filter))
        .init();

    let config = AppConfig::load()?;

    let lookup = YahooLookup::new()?;
    let resolver = TickerResolver::new(Arc::new(lookup));
    let mut stdin = BufReader::new(tokio::io::stdin()).lines();
    let ticker = resolve_interactively(&resolver, cli.ticker, &mut stdin).await?;

    let sources = scraper::default_sources(&config).context("Failed to set up rating sources")?;
    let table = RatingAggregator::new(sources, &config.aggregator)
        .aggregate(&ticker)
        .await;

    match cli.format {
        OutputFormat::Table => print!("{}", table),
        OutputFormat::Csv => table.write_csv(io::stdout().lock())?,
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&table.to_json())?),
    }

    Ok(())
}

/// Keep asking until the lookup accepts a symbol. End of input aborts.
async fn resolve_interactively<R: AsyncBufRead + Unpin>(
    resolver: &TickerResolver,
    first: Option<String>,
    input: &mut Lines<R>,
) -> Result<Ticker> {
    let mut symbol = match first {
        Some(t) => t,
        None => prompt(input).await?,
    };

    loop {
        let resolved = {
            let _t = utils::Timer::start("Ticker verification");
            resolver.resolve(&symbol).await
        };
        match resolved {
            Ok(ticker) => return Ok(ticker),
            Err(e) => {
                warn!("{}", e);
                symbol = prompt(input).await?;
            }
        }
    }
}

async fn prompt<R: AsyncBufRead + Unpin>(input: &mut Lines<R>) -> Result<String> {
    eprint!("Ticker: ");
    io::stderr().flush()?;

    match input.next_line().await? {
        Some(line) => Ok(line),
        None => bail!("No ticker entered"),
    }
}
