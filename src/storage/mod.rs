use log::{debug, info};
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::fetch::Fetcher;

/// On-disk cache of one master index file.
pub struct IndexStore {
    path: PathBuf,
    url: String,
}

impl IndexStore {
    pub fn new(dir: &Path, file_name: &str, url: &str) -> Self {
        Self {
            path: dir.join(file_name),
            url: url.to_string(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns the cached index, downloading and caching it first if needed.
    pub async fn load_or_fetch(&self, fetcher: &dyn Fetcher) -> Result<Vec<u8>> {
        if self.path.exists() {
            debug!("Using cached index {:?}", self.path);
            return Ok(fs::read(&self.path)?);
        }

        let content = fetcher.fetch(&self.url).await?;
        info!("Downloaded {}", self.url);

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.path, &content)?;
        debug!("Saved index to {:?}", self.path);
        Ok(content)
    }
}

/// Destination for finished reports.
pub trait ReportStore {
    fn write(&mut self, name: &str, text: &str) -> Result<()>;
}

/// Writes each report as a file named after it in one directory.
pub struct FsReportStore {
    dir: PathBuf,
}

impl FsReportStore {
    pub fn new(dir: &Path) -> Result<Self> {
        fs::create_dir_all(dir)?;
        Ok(Self {
            dir: dir.to_path_buf(),
        })
    }
}

impl ReportStore for FsReportStore {
    fn write(&mut self, name: &str, text: &str) -> Result<()> {
        let path = self.dir.join(name);
        fs::write(&path, text)?;
        debug!("Saved report to {:?}", path);
        Ok(())
    }
}

/// Keeps reports in memory, in write order.
#[derive(Debug, Default)]
pub struct MemoryReportStore {
    pub reports: Vec<(String, String)>,
}

impl ReportStore for MemoryReportStore {
    fn write(&mut self, name: &str, text: &str) -> Result<()> {
        self.reports.push((name.to_string(), text.to_string()));
        Ok(())
    }
}
