use std::fmt;

// ── Rating class ──────────────────────────────────────────────────────────────

/// Canonical five-point analyst scale, ordered from most bearish to most bullish.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum RatingClass {
    StrongSell,
    Sell,
    Hold,
    Buy,
    StrongBuy,
}

impl RatingClass {
    /// Column order of every rating table.
    pub const ALL: [RatingClass; 5] = [
        RatingClass::StrongSell,
        RatingClass::Sell,
        RatingClass::Hold,
        RatingClass::Buy,
        RatingClass::StrongBuy,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Self::StrongSell => "Strong Sell",
            Self::Sell => "Sell",
            Self::Hold => "Hold",
            Self::Buy => "Buy",
            Self::StrongBuy => "Strong Buy",
        }
    }

    /// Pie slice colour used by the chart renderer.
    pub fn colour(self) -> &'static str {
        match self {
            Self::StrongSell => "darkred",
            Self::Sell => "red",
            Self::Hold => "yellow",
            Self::Buy => "lightgreen",
            Self::StrongBuy => "darkgreen",
        }
    }

    pub fn index(self) -> usize {
        self as usize
    }

    /// Match a canonical label, ignoring case and whitespace.
    /// "Strong Buy" | "StrongBuy" | "strong buy" → StrongBuy
    pub fn from_label(s: &str) -> Option<Self> {
        let squashed: String = s
            .chars()
            .filter(|c| !c.is_whitespace())
            .collect::<String>()
            .to_lowercase();

        Self::ALL
            .into_iter()
            .find(|class| class.label().replace(' ', "").to_lowercase() == squashed)
    }
}

impl fmt::Display for RatingClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// ── Source name ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SourceName {
    Zacks,
    SwingTradeBot,
    TradingView,
    TheStreet,
    WsjAnalysts,
}

impl SourceName {
    /// Row order of every rating table.
    pub const ALL: [SourceName; 5] = [
        SourceName::Zacks,
        SourceName::SwingTradeBot,
        SourceName::TradingView,
        SourceName::TheStreet,
        SourceName::WsjAnalysts,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Self::Zacks => "Zacks",
            Self::SwingTradeBot => "SwingTradeBot",
            Self::TradingView => "TradingView",
            Self::TheStreet => "TheStreet",
            Self::WsjAnalysts => "Wall St. Analysts (WSJ)",
        }
    }
}

impl fmt::Display for SourceName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// ── Exchange ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Exchange {
    Nasdaq,
    Amex,
    Nyse,
    /// Any lookup code without a canonical name, kept verbatim.
    Other(String),
}

impl Exchange {
    /// Map a Yahoo exchange code to its canonical exchange.
    /// "NMS" → NASDAQ | "ASE" → AMEX | "NYQ" → NYSE | anything else unchanged
    pub fn from_code(code: &str) -> Self {
        match code {
            "NMS" => Self::Nasdaq,
            "ASE" => Self::Amex,
            "NYQ" => Self::Nyse,
            other => Self::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Nasdaq => "NASDAQ",
            Self::Amex => "AMEX",
            Self::Nyse => "NYSE",
            Self::Other(code) => code,
        }
    }
}

impl fmt::Display for Exchange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ── Ticker ────────────────────────────────────────────────────────────────────

/// A symbol that passed metadata lookup. Only the resolver builds these.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ticker {
    symbol: String,
    exchange: Exchange,
}

impl Ticker {
    pub(crate) fn new(symbol: impl Into<String>, exchange: Exchange) -> Self {
        Self {
            symbol: symbol.into(),
            exchange,
        }
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn exchange(&self) -> &Exchange {
        &self.exchange
    }
}

// ── Source rating ─────────────────────────────────────────────────────────────

/// What one source said about a ticker. "No data" is the `Err` side of extraction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceRating {
    /// One consensus signal.
    Single(RatingClass),
    /// Analyst counts per class; zero classes are never present.
    Distribution(Vec<(RatingClass, u32)>),
}

impl SourceRating {
    /// Build a distribution from counts in canonical order, dropping zero classes.
    pub fn distribution(counts: [u32; 5]) -> Self {
        Self::Distribution(
            RatingClass::ALL
                .into_iter()
                .zip(counts)
                .filter(|(_, n)| *n != 0)
                .collect(),
        )
    }
}
