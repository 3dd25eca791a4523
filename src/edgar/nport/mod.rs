pub mod document;
pub mod fields;

use log::{debug, warn};
use std::fmt;

use crate::error::Result;
use document::{Document, Element};
use fields::*;

/// One portfolio position.
#[derive(Debug, Clone, PartialEq)]
pub struct Holding {
    pub name: String,
    pub title: String,
    pub share_balance: f64,
    pub value_usd: f64,
    pub asset_category: String,
}

/// Fund and holding facts of one N-PORT filing.
///
/// Text defaults to `""` and numbers to `0.0` when the source omits them; only
/// `cik_number` and `series_number` can be missing, since 0 is a real series number.
#[derive(Debug, Clone, PartialEq)]
pub struct NportFiling {
    pub as_of_date: String,
    pub cik_number: Option<u64>,
    pub series_name: String,
    pub series_number: Option<u64>,
    pub total_assets: f64,
    pub net_assets: f64,
    pub series_tickers: Vec<String>,
    pub holdings: Vec<Holding>,
}

/// Data-quality notes raised while extracting. None of them stop extraction.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldIssue {
    /// `seriesId` starts with `S` but the rest is not a number
    MalformedSeriesId(String),
    /// Numeric tag present with non-numeric text
    UnparsableNumber { tag: &'static str, raw: String },
}

impl fmt::Display for FieldIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldIssue::MalformedSeriesId(id) => write!(f, "malformed series id '{}'", id),
            FieldIssue::UnparsableNumber { tag, raw } => {
                write!(f, "non-numeric <{}> value '{}'", tag, raw)
            }
        }
    }
}

#[derive(Debug, Clone)]
pub struct Extraction {
    pub filing: NportFiling,
    pub issues: Vec<FieldIssue>,
}

/// `S000007715` -> 7715. Ids without the `S` prefix carry no series number.
fn series_number(
    series_id: &str,
    source_name: &str,
    issues: &mut Vec<FieldIssue>,
) -> Option<u64> {
    let digits = series_id.strip_prefix('S')?;
    match digits.parse::<u64>() {
        Ok(number) => Some(number),
        Err(_) => {
            warn!("{}: malformed series id '{}'", source_name, series_id);
            issues.push(FieldIssue::MalformedSeriesId(series_id.to_string()));
            None
        }
    }
}

fn extract_holding(
    scope: Element<'_>,
    source_name: &str,
    issues: &mut Vec<FieldIssue>,
) -> Holding {
    Holding {
        name: HOLDING_NAME.read(scope),
        title: HOLDING_TITLE.read(scope),
        share_balance: HOLDING_BALANCE.read(scope, source_name, issues),
        value_usd: HOLDING_VALUE.read(scope, source_name, issues),
        asset_category: HOLDING_ASSET_CATEGORY.read(scope),
    }
}

/// Extracts one filing from its submission document.
///
/// `source_name` identifies the filing in diagnostics, usually its archive path.
pub fn extract_filing(source_name: &str, content: &str) -> Result<Extraction> {
    let document = Document::parse(source_name, content)?;
    let root = document.root();
    let mut issues = Vec::new();

    let series_id = SERIES_ID.read(root);
    let filing = NportFiling {
        as_of_date: REPORT_PERIOD_DATE.read(root),
        cik_number: CIK.read(root, source_name, &mut issues),
        series_name: SERIES_NAME.read(root),
        series_number: series_number(&series_id, source_name, &mut issues),
        total_assets: TOTAL_ASSETS.read(root, source_name, &mut issues),
        net_assets: NET_ASSETS.read(root, source_name, &mut issues),
        series_tickers: root
            .find_all(TICKER_TAG)
            .map(|e| e.text().trim().to_string())
            .collect(),
        holdings: root
            .find_all(HOLDING_TAG)
            .map(|scope| extract_holding(scope, source_name, &mut issues))
            .collect(),
    };

    debug!(
        "{}: {} tickers, {} holdings, {} issues",
        source_name,
        filing.series_tickers.len(),
        filing.holdings.len(),
        issues.len()
    );

    Ok(Extraction { filing, issues })
}
