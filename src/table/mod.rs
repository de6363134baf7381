//! Source × rating-class matrix handed to the chart renderer.
//!
//! Rows follow `SourceName::ALL`, columns follow `RatingClass::ALL`. A cell is
//! `None` when the source said nothing about that class; a source that failed
//! has every cell `None`. Totals treat `None` as zero. The compacted totals
//! ("MTotals") keep only non-zero columns so pie charts get no empty slices.

use crate::models::{RatingClass, SourceName, SourceRating, Ticker};
use anyhow::Result;
use chrono::{DateTime, Utc};
use serde_json::{Value, json};
use std::fmt;
use std::io::Write;

pub const TOTALS_LABEL: &str = "Totals";
pub const COMPACTED_LABEL: &str = "MTotals";

// ── Row ───────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RatingRow {
    cells: [Option<u32>; 5],
}

impl RatingRow {
    pub fn from_rating(rating: &SourceRating) -> Self {
        let mut row = Self::default();
        match rating {
            SourceRating::Single(class) => row.cells[class.index()] = Some(1),
            SourceRating::Distribution(pairs) => {
                for &(class, n) in pairs {
                    row.cells[class.index()] = Some(n);
                }
            }
        }
        row
    }

    pub fn get(&self, class: RatingClass) -> Option<u32> {
        self.cells[class.index()]
    }

    pub fn is_empty(&self) -> bool {
        self.cells.iter().all(Option::is_none)
    }

    /// Sum of populated cells.
    pub fn total(&self) -> u32 {
        self.cells.iter().flatten().sum()
    }

    pub fn populated(&self) -> impl Iterator<Item = (RatingClass, u32)> + '_ {
        RatingClass::ALL
            .into_iter()
            .filter_map(|class| self.get(class).map(|n| (class, n)))
    }
}

// ── Table ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct RatingTable {
    ticker: Ticker,
    generated_at: DateTime<Utc>,
    rows: [RatingRow; 5],
    faults: Vec<(SourceName, String)>,
}

impl RatingTable {
    pub fn new(ticker: Ticker) -> Self {
        Self {
            ticker,
            generated_at: Utc::now(),
            rows: [RatingRow::default(); 5],
            faults: Vec::new(),
        }
    }

    /// Record what a source returned. Replaces any earlier result for it.
    pub fn insert(&mut self, source: SourceName, rating: &SourceRating) {
        self.rows[source as usize] = RatingRow::from_rating(rating);
    }

    /// Record why a source has no row. The row stays empty.
    pub fn record_fault(&mut self, source: SourceName, reason: impl Into<String>) {
        self.rows[source as usize] = RatingRow::default();
        self.faults.push((source, reason.into()));
    }

    pub fn row(&self, source: SourceName) -> &RatingRow {
        &self.rows[source as usize]
    }

    pub fn cell(&self, source: SourceName, class: RatingClass) -> Option<u32> {
        self.row(source).get(class)
    }

    pub fn faults(&self) -> &[(SourceName, String)] {
        &self.faults
    }

    /// Column-wise sum over all source rows, absent cells counted as zero.
    pub fn totals(&self) -> [u32; 5] {
        let mut totals = [0u32; 5];
        for row in &self.rows {
            for (sum, cell) in totals.iter_mut().zip(row.cells) {
                *sum += cell.unwrap_or(0);
            }
        }
        totals
    }

    /// Non-zero totals in canonical column order.
    pub fn compacted_totals(&self) -> Vec<(RatingClass, u32)> {
        RatingClass::ALL
            .into_iter()
            .zip(self.totals())
            .filter(|(_, n)| *n != 0)
            .collect()
    }

    // ── Export ────────────────────────────────────────────────────────────────

    /// One record per row: label, then one field per class (empty = absent).
    pub fn write_csv<W: Write>(&self, out: W) -> Result<()> {
        let mut wtr = csv::Writer::from_writer(out);

        let mut header = vec![String::new()];
        header.extend(RatingClass::ALL.iter().map(|c| c.label().to_string()));
        wtr.write_record(&header)?;

        for (label, cells) in self.display_rows() {
            let mut record = vec![label];
            record.extend(cells.iter().map(|c| c.map(|n| n.to_string()).unwrap_or_default()));
            wtr.write_record(&record)?;
        }

        wtr.flush()?;
        Ok(())
    }

    /// JSON for the chart renderer. Everything ordered is an array: row cells
    /// line up with `columns`, and `mtotals` keeps canonical class order.
    pub fn to_json(&self) -> Value {
        let cells = |cells: [Option<u32>; 5]| -> Vec<Value> {
            cells.iter().map(|c| json!(c)).collect()
        };

        let rows: Vec<Value> = self
            .display_rows()
            .into_iter()
            .filter(|(label, _)| label != COMPACTED_LABEL)
            .map(|(label, row)| json!({ "source": label, "cells": cells(row) }))
            .collect();

        let mtotals: Vec<Value> = self
            .compacted_totals()
            .into_iter()
            .map(|(class, n)| json!({ "class": class.label(), "count": n, "colour": class.colour() }))
            .collect();

        let faults: Vec<Value> = self
            .faults
            .iter()
            .map(|(s, reason)| json!({ "source": s.label(), "reason": reason }))
            .collect();

        json!({
            "ticker": self.ticker.symbol(),
            "exchange": self.ticker.exchange().as_str(),
            "generated_at": self.generated_at,
            "columns": RatingClass::ALL.iter().map(|c| c.label()).collect::<Vec<_>>(),
            "colours": RatingClass::ALL.iter().map(|c| c.colour()).collect::<Vec<_>>(),
            "rows": rows,
            "mtotals": mtotals,
            "faults": faults,
        })
    }

    /// Rows as printed/exported: sources, Totals, MTotals.
    fn display_rows(&self) -> Vec<(String, [Option<u32>; 5])> {
        let mut out: Vec<(String, [Option<u32>; 5])> = SourceName::ALL
            .iter()
            .map(|s| (s.label().to_string(), self.row(*s).cells))
            .collect();

        out.push((TOTALS_LABEL.to_string(), self.totals().map(Some)));

        let mut compacted = [None; 5];
        for (class, n) in self.compacted_totals() {
            compacted[class.index()] = Some(n);
        }
        out.push((COMPACTED_LABEL.to_string(), compacted));
        out
    }
}

impl fmt::Display for RatingTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label_width = SourceName::ALL
            .iter()
            .map(|s| s.label().len())
            .max()
            .unwrap_or(0);

        writeln!(
            f,
            "{} ({})",
            self.ticker.symbol(),
            self.ticker.exchange()
        )?;
        write!(f, "{:label_width$}", "")?;
        for class in RatingClass::ALL {
            write!(f, "  {:>11}", class.label())?;
        }
        writeln!(f)?;

        for (label, cells) in self.display_rows() {
            write!(f, "{:label_width$}", label)?;
            for cell in cells {
                match cell {
                    Some(n) => write!(f, "  {:>11}", n)?,
                    None => write!(f, "  {:>11}", "—")?,
                }
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Exchange;
    use RatingClass::*;

    fn table() -> RatingTable {
        RatingTable::new(Ticker::new("AAPL", Exchange::Nasdaq))
    }

    #[test]
    fn test_single_rating_populates_one_cell() {
        let mut t = table();
        t.insert(SourceName::Zacks, &SourceRating::Single(Hold));

        assert_eq!(t.cell(SourceName::Zacks, Hold), Some(1));
        for class in [StrongSell, Sell, Buy, StrongBuy] {
            assert_eq!(t.cell(SourceName::Zacks, class), None);
        }
        assert_eq!(t.row(SourceName::Zacks).total(), 1);
    }

    #[test]
    fn test_distribution_row_sums_to_analyst_count() {
        let mut t = table();
        t.insert(
            SourceName::WsjAnalysts,
            &SourceRating::distribution([2, 0, 5, 3, 0]),
        );

        let row = t.row(SourceName::WsjAnalysts);
        assert_eq!(row.get(StrongSell), Some(2));
        assert_eq!(row.get(Sell), None);
        assert_eq!(row.get(Hold), Some(5));
        assert_eq!(row.get(Buy), Some(3));
        assert_eq!(row.get(StrongBuy), None);
        assert_eq!(row.total(), 10);
    }

    #[test]
    fn test_empty_table_totals() {
        let t = table();
        assert_eq!(t.totals(), [0; 5]);
        assert!(t.compacted_totals().is_empty());
        assert!(SourceName::ALL.iter().all(|s| t.row(*s).is_empty()));
    }

    #[test]
    fn test_totals_and_compaction() {
        let mut t = table();
        t.insert(SourceName::Zacks, &SourceRating::Single(Hold));
        t.insert(SourceName::TheStreet, &SourceRating::Single(Buy));
        t.record_fault(SourceName::TradingView, "timeout");
        t.insert(
            SourceName::WsjAnalysts,
            &SourceRating::distribution([2, 0, 5, 3, 0]),
        );

        assert_eq!(t.totals(), [2, 0, 6, 4, 0]);
        assert_eq!(t.compacted_totals(), vec![(StrongSell, 2), (Hold, 6), (Buy, 4)]);
        assert_eq!(t.faults().len(), 1);
    }

    #[test]
    fn test_record_fault_clears_row() {
        let mut t = table();
        t.insert(SourceName::Zacks, &SourceRating::Single(Sell));
        t.record_fault(SourceName::Zacks, "layout changed");
        assert!(t.row(SourceName::Zacks).is_empty());
    }

    #[test]
    fn test_csv_export() {
        let mut t = table();
        t.insert(SourceName::Zacks, &SourceRating::Single(Hold));

        let mut buf = Vec::new();
        t.write_csv(&mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines[0], ",Strong Sell,Sell,Hold,Buy,Strong Buy");
        assert_eq!(lines[1], "Zacks,,,1,,");
        assert_eq!(lines[5], "Wall St. Analysts (WSJ),,,,,");
        assert_eq!(lines[6], "Totals,0,0,1,0,0");
        assert_eq!(lines[7], "MTotals,,,1,,");
    }

    #[test]
    fn test_json_export() {
        let mut t = table();
        t.insert(SourceName::SwingTradeBot, &SourceRating::Single(StrongBuy));
        t.record_fault(SourceName::Zacks, "HTTP 403");

        let v = t.to_json();
        assert_eq!(v["ticker"], "AAPL");
        assert_eq!(v["exchange"], "NASDAQ");
        assert_eq!(v["colours"][0], "darkred");
        assert_eq!(v["columns"][4], "Strong Buy");

        let rows = v["rows"].as_array().unwrap();
        assert_eq!(rows.len(), 6);
        assert_eq!(rows[0], json!({"source": "Zacks", "cells": [null, null, null, null, null]}));
        assert_eq!(rows[1], json!({"source": "SwingTradeBot", "cells": [null, null, null, null, 1]}));
        assert_eq!(rows[5], json!({"source": "Totals", "cells": [0, 0, 0, 0, 1]}));

        assert_eq!(
            v["mtotals"],
            json!([{"class": "Strong Buy", "count": 1, "colour": "darkgreen"}])
        );
        assert_eq!(v["faults"], json!([{"source": "Zacks", "reason": "HTTP 403"}]));
    }

    #[test]
    fn test_json_keeps_column_order() {
        let mut t = table();
        t.insert(
            SourceName::WsjAnalysts,
            &SourceRating::distribution([2, 0, 5, 3, 0]),
        );

        let v = t.to_json();
        assert_eq!(v["rows"][4]["source"], "Wall St. Analysts (WSJ)");
        assert_eq!(v["rows"][4]["cells"], json!([2, null, 5, 3, null]));

        let classes: Vec<&str> = v["mtotals"]
            .as_array()
            .unwrap()
            .iter()
            .map(|e| e["class"].as_str().unwrap())
            .collect();
        assert_eq!(classes, ["Strong Sell", "Hold", "Buy"]);
        assert_eq!(v["mtotals"][0]["colour"], "darkred");
        assert_eq!(v["mtotals"][1]["count"], 5);
        assert_eq!(v["mtotals"][2]["colour"], "lightgreen");
    }

    #[test]
    fn test_display_marks_absent_cells() {
        let mut t = table();
        t.insert(SourceName::Zacks, &SourceRating::Single(Hold));
        let text = t.to_string();
        assert!(text.starts_with("AAPL (NASDAQ)"));
        assert!(text.contains("MTotals"));
        assert!(text.contains("—"));
    }
}
