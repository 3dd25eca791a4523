use chrono::{Datelike, NaiveDate};
use std::path::PathBuf;
use url::Url;

use crate::edgar::index::DEFAULT_HEADER_LINES;
use crate::error::{Error, Result};
use crate::fetch::make_url;

pub const ARCHIVES_URL: &str = "https://www.sec.gov/Archives";
pub const DAILY_INDEX_URL: &str = "https://www.sec.gov/Archives/edgar/daily-index";
pub const FORM_TYPE: &str = "NPORT-P";
pub const USER_AGENT: &str = "software@example.com";

#[derive(Clone, Debug)]
pub struct NportConfig {
    /// Day whose master index is processed
    pub index_date: NaiveDate,
    pub archives_url: String,
    pub daily_index_url: String,
    pub form_type: String,
    pub header_lines: usize,
    /// Index cache directory
    pub input_dir: PathBuf,
    pub output_dir: PathBuf,
    pub user_agent: String,
    /// Process at most this many selected filings
    pub limit: Option<usize>,
    pub show_progress: bool,
}

pub fn parse_date(value: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(value, "%Y%m%d")
        .or_else(|_| NaiveDate::parse_from_str(value, "%Y-%m-%d"))
        .map_err(|_| Error::Config(format!("invalid index date '{}'", value)))
}

impl NportConfig {
    pub fn new(index_date: NaiveDate) -> Self {
        Self {
            index_date,
            archives_url: ARCHIVES_URL.to_string(),
            daily_index_url: DAILY_INDEX_URL.to_string(),
            form_type: FORM_TYPE.to_string(),
            header_lines: DEFAULT_HEADER_LINES,
            input_dir: PathBuf::from("input"),
            output_dir: PathBuf::from("output"),
            user_agent: USER_AGENT.to_string(),
            limit: None,
            show_progress: false,
        }
    }

    /// Reads `NPORT_*` variables over the defaults. `index_date` takes precedence
    /// over `NPORT_INDEX_DATE`.
    pub fn from_env(index_date: Option<NaiveDate>) -> Result<Self> {
        let index_date = match index_date {
            Some(date) => date,
            None => {
                let value = std::env::var("NPORT_INDEX_DATE").map_err(|_| {
                    Error::Config("NPORT_INDEX_DATE environment variable not set".to_string())
                })?;
                parse_date(&value)?
            }
        };

        let mut config = Self::new(index_date);
        if let Ok(url) = std::env::var("NPORT_ARCHIVES_URL") {
            config.archives_url = url;
        }
        if let Ok(url) = std::env::var("NPORT_DAILY_INDEX_URL") {
            config.daily_index_url = url;
        }
        if let Ok(form_type) = std::env::var("NPORT_FORM_TYPE") {
            config.form_type = form_type;
        }
        if let Ok(lines) = std::env::var("NPORT_HEADER_LINES") {
            config.header_lines = lines
                .parse()
                .map_err(|_| Error::Config(format!("invalid NPORT_HEADER_LINES '{}'", lines)))?;
        }
        if let Ok(dir) = std::env::var("NPORT_INPUT_DIR") {
            config.input_dir = PathBuf::from(dir);
        }
        if let Ok(dir) = std::env::var("NPORT_OUTPUT_DIR") {
            config.output_dir = PathBuf::from(dir);
        }
        if let Ok(user_agent) = std::env::var("USER_AGENT") {
            config.user_agent = user_agent;
        }
        Ok(config)
    }

    /// Rejects base URLs that would only fail later, once per request.
    pub fn validate(&self) -> Result<()> {
        Url::parse(&self.archives_url)?;
        Url::parse(&self.daily_index_url)?;
        if self.form_type.is_empty() {
            return Err(Error::Config("form type must not be empty".to_string()));
        }
        Ok(())
    }

    pub fn quarter(&self) -> u32 {
        (self.index_date.month() - 1) / 3 + 1
    }

    /// `master.20200717.idx`
    pub fn index_file_name(&self) -> String {
        format!("master.{}.idx", self.index_date.format("%Y%m%d"))
    }

    pub fn index_url(&self) -> String {
        make_url(
            &self.daily_index_url,
            &[
                self.index_date.year().to_string(),
                format!("QTR{}", self.quarter()),
                self.index_file_name(),
            ],
        )
    }

    pub fn filing_url(&self, file_path: &str) -> String {
        make_url(&self.archives_url, &[file_path])
    }
}
