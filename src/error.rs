use thiserror::Error;

/// Errors raised while loading the index or processing a filing.
///
/// Whether a variant is fatal depends on where it happens: anything raised while
/// loading the master index aborts the run, while the same error for a single
/// filing only skips that filing.
#[derive(Error, Debug)]
pub enum Error {
    /// The server answered with a non-success status
    #[error("HTTP request for {url} failed with status: {status}")]
    Fetch { url: String, status: u16 },

    /// Transport-level failure before a status was available
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Document is not parseable as XML
    #[error("Failed to parse {source_name} as XML: {message}")]
    Parse {
        source_name: String,
        message: String,
    },

    /// Index content could not be interpreted
    #[error("Invalid master index {path}: {source}")]
    Index {
        path: String,
        #[source]
        source: Box<Error>,
    },

    #[error("Malformed index row at line {line}: expected {expected} columns, found {found}")]
    MalformedIndexRow {
        line: u64,
        expected: usize,
        found: usize,
    },

    #[error("Index header is missing column '{0}'")]
    MissingIndexColumn(String),

    #[error("Invalid filing date '{value}' at index line {line}")]
    InvalidIndexDate { line: u64, value: String },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),

    #[error("File I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, Error>;
