use async_trait::async_trait;
use chrono::NaiveDate;
use nport::core::config::NportConfig;
use nport::fetch::Fetcher;
use nport::storage::{FsReportStore, IndexStore, MemoryReportStore};
use nport::{Error, Result, RunSummary};
use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;
use std::sync::Mutex;
use tempfile::tempdir;

fn read_test_file(filename: &str) -> Vec<u8> {
    let path = PathBuf::from("tests/data").join(filename);
    fs::read(&path).unwrap_or_else(|e| panic!("Failed to read test file {}: {}", filename, e))
}

/// Serves fixed bodies by URL and answers 404 for anything else.
struct StaticFetcher {
    bodies: HashMap<String, Vec<u8>>,
    requests: Mutex<Vec<String>>,
}

impl StaticFetcher {
    fn new(bodies: Vec<(String, Vec<u8>)>) -> Self {
        Self {
            bodies: bodies.into_iter().collect(),
            requests: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl Fetcher for StaticFetcher {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>> {
        self.requests.lock().unwrap().push(url.to_string());
        self.bodies.get(url).cloned().ok_or_else(|| Error::Fetch {
            url: url.to_string(),
            status: 404,
        })
    }
}

fn config(input_dir: PathBuf) -> NportConfig {
    let mut config = NportConfig::new(NaiveDate::from_ymd_opt(2020, 7, 17).unwrap());
    config.input_dir = input_dir;
    config
}

fn fetcher(config: &NportConfig) -> StaticFetcher {
    let filing = read_test_file("0001752724-20-140001.txt");
    StaticFetcher::new(vec![
        (config.index_url(), read_test_file("master.20200717.idx")),
        (
            config.filing_url("edgar/data/877232/0001752724-20-140001.txt"),
            filing.clone(),
        ),
        (
            config.filing_url("edgar/data/877232/0001752724-20-140003.txt"),
            filing,
        ),
    ])
}

fn index_store(config: &NportConfig) -> IndexStore {
    IndexStore::new(
        &config.input_dir,
        &config.index_file_name(),
        &config.index_url(),
    )
}

const EXPECTED_REPORT: &str = "\
As of Date|Filing Date|CIK Number|Series Number|Series name|Total Stocks Value|Total Assets|Total net Assets|Series Ticker1|Series Ticker2
2020-04-30|2020-07-17|877232|7715|Green Century Equity Fund||318112687.0|318798341.25|GCEQX|GCEIX
Filing Classification|Holding Type|Holding Name|Holding Share|Holding Value|Holding Face Amt|Holding Number Of Contracts|Future Gain Or Loss
EC|EC|Apple Inc|41012.0|12060398.72|0|0|0
EC|EC|Procter & Gamble Co/The|50317.0|5930359.62|0|0|0
STIV|STIV|State Street Institutional US Government Money Market Fund|1500000.0|1500000.0|0|0|0
";

#[tokio::test]
async fn test_run_writes_one_report_per_filing() {
    let dir = tempdir().unwrap();
    let config = config(dir.path().join("input"));
    let fetcher = fetcher(&config);
    let mut reports = MemoryReportStore::default();

    let summary = nport::run(&config, &fetcher, &index_store(&config), &mut reports)
        .await
        .unwrap();

    assert_eq!(
        summary,
        RunSummary {
            selected: 3,
            processed: 2,
            skipped: 1,
            warnings: 0,
        }
    );

    let names: Vec<&str> = reports.reports.iter().map(|(n, _)| n.as_str()).collect();
    assert_eq!(
        names,
        vec![
            "NPORT-P_2020-07-17_GREEN CENTURY FUNDS_Green Century Equity Fund",
            "NPORT-P_2020-07-17_GREEN CENTURY FUNDS_Green Century Equity Fund_2",
        ]
    );
    assert_eq!(reports.reports[0].1, EXPECTED_REPORT);
}

#[tokio::test]
async fn test_filings_are_fetched_in_index_order() {
    let dir = tempdir().unwrap();
    let config = config(dir.path().join("input"));
    let fetcher = fetcher(&config);
    let mut reports = MemoryReportStore::default();

    nport::run(&config, &fetcher, &index_store(&config), &mut reports)
        .await
        .unwrap();

    let requests = fetcher.requests.lock().unwrap().clone();
    assert_eq!(
        requests,
        vec![
            config.index_url(),
            config.filing_url("edgar/data/877232/0001752724-20-140001.txt"),
            config.filing_url("edgar/data/1001234/0001752724-20-140002.txt"),
            config.filing_url("edgar/data/877232/0001752724-20-140003.txt"),
        ]
    );
}

#[tokio::test]
async fn test_limit() {
    let dir = tempdir().unwrap();
    let mut config = config(dir.path().join("input"));
    config.limit = Some(1);
    let fetcher = fetcher(&config);
    let mut reports = MemoryReportStore::default();

    let summary = nport::run(&config, &fetcher, &index_store(&config), &mut reports)
        .await
        .unwrap();

    assert_eq!(summary.selected, 1);
    assert_eq!(summary.processed, 1);
    assert_eq!(reports.reports.len(), 1);
}

#[tokio::test]
async fn test_missing_index_is_fatal() {
    let dir = tempdir().unwrap();
    let config = config(dir.path().join("input"));
    let fetcher = StaticFetcher::new(Vec::new());
    let mut reports = MemoryReportStore::default();

    let err = nport::run(&config, &fetcher, &index_store(&config), &mut reports)
        .await
        .unwrap_err();

    assert!(matches!(err, Error::Fetch { status: 404, .. }));
    assert!(reports.reports.is_empty());
}

#[tokio::test]
async fn test_malformed_index_is_fatal() {
    let dir = tempdir().unwrap();
    let config = config(dir.path().join("input"));
    let mut index = read_test_file("master.20200717.idx");
    index.extend_from_slice(b"999|TRUNCATED ROW\n");
    let fetcher = StaticFetcher::new(vec![(config.index_url(), index)]);
    let mut reports = MemoryReportStore::default();

    let err = nport::run(&config, &fetcher, &index_store(&config), &mut reports)
        .await
        .unwrap_err();

    match &err {
        Error::Index { path, source } => {
            assert!(path.ends_with("master.20200717.idx"));
            assert!(matches!(**source, Error::MalformedIndexRow { line: 12, .. }));
        }
        other => panic!("expected an index error, got {:?}", other),
    }
    let message = err.to_string();
    assert!(message.contains("master.20200717.idx"));
    assert!(message.contains("line 12"));
}

#[tokio::test]
async fn test_field_warnings_are_counted() {
    let dir = tempdir().unwrap();
    let config = config(dir.path().join("input"));
    let mut fetcher = fetcher(&config);
    let body = String::from_utf8(read_test_file("0001752724-20-140001.txt"))
        .unwrap()
        .replace("<seriesId>S000007715", "<seriesId>S")
        .replace("<valUSD>5930359.62", "<valUSD>N/A");
    fetcher.bodies.insert(
        config.filing_url("edgar/data/877232/0001752724-20-140003.txt"),
        body.into_bytes(),
    );
    let mut reports = MemoryReportStore::default();

    let summary = nport::run(&config, &fetcher, &index_store(&config), &mut reports)
        .await
        .unwrap();

    assert_eq!(summary.processed, 2);
    assert_eq!(summary.warnings, 2);

    let second = &reports.reports[1].1;
    let row = second.lines().nth(1).unwrap();
    assert!(row.starts_with("2020-04-30|2020-07-17|877232||Green Century Equity Fund|"));
    assert!(second.contains("EC|EC|Procter & Gamble Co/The|50317.0|0.0|0|0|0"));
}

#[tokio::test]
async fn test_unparsable_filing_is_skipped() {
    let dir = tempdir().unwrap();
    let config = config(dir.path().join("input"));
    let mut fetcher = fetcher(&config);
    fetcher.bodies.insert(
        config.filing_url("edgar/data/877232/0001752724-20-140001.txt"),
        b"<html><body>Request Rate Threshold Exceeded".to_vec(),
    );
    fetcher.bodies.insert(
        config.filing_url("edgar/data/877232/0001752724-20-140003.txt"),
        b"Request Rate Threshold Exceeded".to_vec(),
    );
    let mut reports = MemoryReportStore::default();

    let summary = nport::run(&config, &fetcher, &index_store(&config), &mut reports)
        .await
        .unwrap();

    // Markup without N-PORT facts is still a filing, just an empty one
    assert_eq!(summary.processed, 1);
    assert_eq!(summary.skipped, 2);
}

#[tokio::test]
async fn test_reports_written_to_disk() {
    let dir = tempdir().unwrap();
    let mut config = config(dir.path().join("input"));
    config.output_dir = dir.path().join("output");
    let fetcher = fetcher(&config);
    let mut reports = FsReportStore::new(&config.output_dir).unwrap();

    nport::run(&config, &fetcher, &index_store(&config), &mut reports)
        .await
        .unwrap();

    let report = fs::read_to_string(
        config
            .output_dir
            .join("NPORT-P_2020-07-17_GREEN CENTURY FUNDS_Green Century Equity Fund"),
    )
    .unwrap();
    assert_eq!(report, EXPECTED_REPORT);
    assert!(config.input_dir.join("master.20200717.idx").exists());
}
