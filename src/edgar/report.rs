use csv::{QuoteStyle, Terminator, WriterBuilder};
use std::collections::HashSet;
use std::io::Write;

use super::index::IndexRecord;
use super::nport::NportFiling;
use crate::error::Result;

pub const FUND_COLUMNS: [&str; 8] = [
    "As of Date",
    "Filing Date",
    "CIK Number",
    "Series Number",
    "Series name",
    "Total Stocks Value",
    "Total Assets",
    "Total net Assets",
];

pub const HOLDING_COLUMNS: [&str; 8] = [
    "Filing Classification",
    "Holding Type",
    "Holding Name",
    "Holding Share",
    "Holding Value",
    "Holding Face Amt",
    "Holding Number Of Contracts",
    "Future Gain Or Loss",
];

/// Renders decimals the way the feed's reports show them: whole values keep
/// a trailing `.0`.
pub fn format_decimal(value: f64) -> String {
    if value.is_finite() && value.fract() == 0.0 {
        format!("{:.1}", value)
    } else {
        value.to_string()
    }
}

fn format_optional(value: Option<u64>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

fn fund_header(filing: &NportFiling) -> Vec<String> {
    FUND_COLUMNS
        .iter()
        .map(|c| c.to_string())
        .chain((1..=filing.series_tickers.len()).map(|i| format!("Series Ticker{}", i)))
        .collect()
}

fn fund_row(filing: &NportFiling, record: &IndexRecord) -> Vec<String> {
    let mut row = vec![
        filing.as_of_date.clone(),
        record.filed_on.format("%Y-%m-%d").to_string(),
        format_optional(filing.cik_number),
        format_optional(filing.series_number),
        filing.series_name.clone(),
        // Total Stocks Value is never reported by the feed
        String::new(),
        format_decimal(filing.total_assets),
        format_decimal(filing.net_assets),
    ];
    row.extend(filing.series_tickers.iter().cloned());
    row
}

/// Writes the fund summary section followed by the holdings section.
///
/// Fields are pipe-delimited and never quoted or escaped, so a `|` or newline inside
/// a source value ends up in the output as-is.
pub fn write_report<W: Write>(
    writer: W,
    filing: &NportFiling,
    record: &IndexRecord,
) -> Result<()> {
    let mut writer = WriterBuilder::new()
        .delimiter(b'|')
        .quote_style(QuoteStyle::Never)
        .terminator(Terminator::Any(b'\n'))
        .flexible(true)
        .has_headers(false)
        .from_writer(writer);

    writer.write_record(fund_header(filing))?;
    writer.write_record(fund_row(filing, record))?;

    writer.write_record(HOLDING_COLUMNS)?;
    for holding in &filing.holdings {
        let share = format_decimal(holding.share_balance);
        let value = format_decimal(holding.value_usd);
        writer.write_record([
            holding.asset_category.as_str(),
            holding.asset_category.as_str(),
            holding.name.as_str(),
            share.as_str(),
            value.as_str(),
            "0",
            "0",
            "0",
        ])?;
    }

    writer.flush()?;
    Ok(())
}

pub fn render_report(filing: &NportFiling, record: &IndexRecord) -> Result<String> {
    let mut buf = Vec::new();
    write_report(&mut buf, filing, record)?;
    Ok(String::from_utf8_lossy(&buf).into_owned())
}

/// `NPORT-P_2020-07-17_GREEN CENTURY FUNDS_Green Century Equity Fund`
pub fn report_name(form_type: &str, record: &IndexRecord, series_name: &str) -> String {
    let name = format!(
        "{}_{}_{}_{}",
        form_type,
        record.filed_on.format("%Y-%m-%d"),
        record.company_name,
        series_name
    );
    name.replace(['/', '\\'], "-")
}

/// Hands out report names, suffixing `_2`, `_3`, ... to names already used.
#[derive(Debug, Default)]
pub struct ReportNamer {
    used: HashSet<String>,
}

impl ReportNamer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn unique(&mut self, name: String) -> String {
        if self.used.insert(name.clone()) {
            return name;
        }
        let mut n = 2;
        loop {
            let candidate = format!("{}_{}", name, n);
            if self.used.insert(candidate.clone()) {
                return candidate;
            }
            n += 1;
        }
    }
}
