use scraper::{ElementRef, Html, Selector};

use super::ExtractionFault;

// Anchors below track each site's current markup and break when it changes.

pub const ZACKS_ANCHOR: &str = ".rank_view";
pub const SWINGTRADEBOT_ANCHOR: &str = "td.text-center";
pub const WSJ_ANCHOR: &str = ".cr_analystRatings.cr_data.module .cr_dataTable tbody";

/// WSJ table rows are `label, 3 months ago, 1 month ago, current`, best rating
/// first. Offsets of the "current" column, in canonical class order.
const WSJ_CURRENT_OFFSETS: [usize; 5] = [19, 15, 11, 7, 3];

fn selector(s: &str) -> Result<Selector, ExtractionFault> {
    Selector::parse(s).map_err(|e| ExtractionFault::Layout(format!("selector {}: {:?}", s, e)))
}

/// Visible text with runs of whitespace collapsed; adjacent cells stay separate.
fn element_text(el: ElementRef<'_>) -> String {
    el.text()
        .flat_map(str::split_whitespace)
        .collect::<Vec<_>>()
        .join(" ")
}

fn first_text(html: &str, anchor: &str) -> Result<String, ExtractionFault> {
    let doc = Html::parse_document(html);
    let sel = selector(anchor)?;

    doc.select(&sel)
        .next()
        .map(element_text)
        .ok_or_else(|| ExtractionFault::MissingElement {
            anchor: anchor.to_string(),
        })
}

// ── Zacks ─────────────────────────────────────────────────────────────────────

/// Raw rank text, e.g. "3-Hold of 5".
pub fn parse_zacks_rank(html: &str) -> Result<String, ExtractionFault> {
    first_text(html, ZACKS_ANCHOR)
}

// ── SwingTradeBot ─────────────────────────────────────────────────────────────

/// Text of the first centred table cell, which holds the letter grade.
pub fn parse_swingtradebot_cell(html: &str) -> Result<String, ExtractionFault> {
    first_text(html, SWINGTRADEBOT_ANCHOR)
}

// ── WSJ ───────────────────────────────────────────────────────────────────────

/// Current analyst counts as [Strong Sell, Sell, Hold, Buy, Strong Buy].
pub fn parse_wsj_counts(html: &str) -> Result<[u32; 5], ExtractionFault> {
    let body = first_text(html, WSJ_ANCHOR)?;
    let tokens: Vec<&str> = body.split_whitespace().collect();

    let mut counts = [0u32; 5];
    for (slot, &offset) in counts.iter_mut().zip(WSJ_CURRENT_OFFSETS.iter()) {
        let token = tokens.get(offset).ok_or_else(|| {
            ExtractionFault::Layout(format!(
                "ratings table has {} fields, expected at least {}",
                tokens.len(),
                offset + 1
            ))
        })?;
        *slot = token.parse().map_err(|_| {
            ExtractionFault::Layout(format!("non-numeric count {:?} at field {}", token, offset))
        })?;
    }

    Ok(counts)
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
pub(crate) mod fixtures {
    pub fn zacks_page(rank: &str) -> String {
        format!(
            r#"<html><body><div class="zr_rankbox">
                <p class="rank_view">
                    {rank}
                    <span class="rank_chip rankrect_1">&nbsp;</span>
                </p></div></body></html>"#
        )
    }

    pub fn swingtradebot_page(grade: &str) -> String {
        format!(
            r#"<html><body><table><tbody><tr>
                <td class="text-center"><span class="badge">{grade}</span></td>
                <td class="text-center">12.5</td>
            </tr></tbody></table></body></html>"#
        )
    }

    /// Rows: Buy, Overweight, Hold, Underweight, Sell; `current` in that order.
    pub fn wsj_page(current: [u32; 5]) -> String {
        let labels = ["Buy", "Overweight", "Hold", "Underweight", "Sell"];
        let rows: String = labels
            .iter()
            .zip(current)
            .map(|(label, n)| {
                format!(
                    "<tr><td>{label}</td><td>9</td><td>9</td><td>{n}</td></tr>"
                )
            })
            .collect();
        format!(
            r#"<html><body>
                <div class="cr_analystRatings cr_data module">
                  <table class="cr_dataTable"><thead><tr><th>x</th></tr></thead>
                  <tbody>{rows}</tbody></table>
                </div></body></html>"#
        )
    }
}
