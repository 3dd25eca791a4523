use chrono::NaiveDate;
use log::debug;
use std::collections::HashMap;

use crate::error::{Error, Result};

/// Number of descriptive lines at the top of a daily master index.
pub const DEFAULT_HEADER_LINES: usize = 5;

const COMPANY_NAME: &str = "Company Name";
const FORM_TYPE: &str = "Form Type";
const DATE_FILED: &str = "Date Filed";
const FILE_NAME: &str = "File Name";

/// One row of the master index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexRecord {
    pub company_name: String,
    pub form_type: String,
    /// Path of the filing document relative to the archives root
    pub file_path: String,
    pub filed_on: NaiveDate,
}

/// Column positions resolved from the index header row.
struct Columns {
    count: usize,
    company_name: usize,
    form_type: usize,
    date_filed: usize,
    file_name: usize,
}

impl Columns {
    fn from_header(line: &str) -> Result<Self> {
        let positions: HashMap<&str, usize> = line
            .split('|')
            .enumerate()
            .map(|(i, name)| (name.trim(), i))
            .collect();

        let find = |name: &str| {
            positions
                .get(name)
                .copied()
                .ok_or_else(|| Error::MissingIndexColumn(name.to_string()))
        };

        Ok(Self {
            count: line.split('|').count(),
            company_name: find(COMPANY_NAME)?,
            form_type: find(FORM_TYPE)?,
            date_filed: find(DATE_FILED)?,
            file_name: find(FILE_NAME)?,
        })
    }
}

fn is_separator(line: &str) -> bool {
    let line = line.trim();
    !line.is_empty() && line.chars().all(|c| c == '-')
}

/// Daily indices use `20200717`, quarterly full indices `2020-07-17`.
fn parse_filed_on(value: &str, line: u64) -> Result<NaiveDate> {
    let value = value.trim();
    NaiveDate::parse_from_str(value, "%Y%m%d")
        .or_else(|_| NaiveDate::parse_from_str(value, "%Y-%m-%d"))
        .map_err(|_| Error::InvalidIndexDate {
            line,
            value: value.to_string(),
        })
}

/// Parses the pipe-delimited master index into records, in file order.
///
/// The first `header_lines` lines are never interpreted. The first non-blank line
/// after them names the columns; a dashed rule line and blank lines are ignored.
/// Any data row whose column count differs from the header fails the whole parse.
pub fn parse_master_index(content: &str, header_lines: usize) -> Result<Vec<IndexRecord>> {
    let mut columns: Option<Columns> = None;
    let mut records = Vec::new();

    for (i, line) in content.lines().enumerate().skip(header_lines) {
        let line_no = i as u64 + 1;
        if line.trim().is_empty() || is_separator(line) {
            continue;
        }

        let Some(cols) = columns.as_ref() else {
            columns = Some(Columns::from_header(line)?);
            continue;
        };

        let fields: Vec<&str> = line.split('|').collect();
        if fields.len() != cols.count {
            return Err(Error::MalformedIndexRow {
                line: line_no,
                expected: cols.count,
                found: fields.len(),
            });
        }

        records.push(IndexRecord {
            company_name: fields[cols.company_name].to_string(),
            form_type: fields[cols.form_type].to_string(),
            file_path: fields[cols.file_name].to_string(),
            filed_on: parse_filed_on(fields[cols.date_filed], line_no)?,
        });
    }

    if columns.is_none() {
        return Err(Error::MissingIndexColumn(COMPANY_NAME.to_string()));
    }

    debug!("Parsed {} index rows", records.len());
    Ok(records)
}

/// Keeps the rows whose form type is exactly `form_type`, preserving order.
pub fn filter_by_form_type(records: Vec<IndexRecord>, form_type: &str) -> Vec<IndexRecord> {
    records
        .into_iter()
        .filter(|record| record.form_type == form_type)
        .collect()
}

/// Parses the index and selects the filings of one form type.
pub fn select_filings(
    content: &str,
    header_lines: usize,
    form_type: &str,
) -> Result<Vec<IndexRecord>> {
    let records = parse_master_index(content, header_lines)?;
    let total = records.len();
    let selected = filter_by_form_type(records, form_type);
    debug!(
        "Selected {} of {} index rows with form type {}",
        selected.len(),
        total,
        form_type
    );
    Ok(selected)
}
