use indicatif::{ProgressBar, ProgressStyle};
use log::{error, info, warn};

use crate::core::config::NportConfig;
use crate::edgar::index::{select_filings, IndexRecord};
use crate::edgar::nport::extract_filing;
use crate::edgar::report::{render_report, report_name, ReportNamer};
use crate::error::{Error, Result};
use crate::fetch::Fetcher;
use crate::storage::{IndexStore, ReportStore};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Index rows matching the form type
    pub selected: usize,
    pub processed: usize,
    pub skipped: usize,
    /// Field issues across processed filings, see `FieldIssue`
    pub warnings: usize,
}

struct Processed {
    name: String,
    warnings: usize,
}

fn progress_bar(config: &NportConfig, len: usize) -> ProgressBar {
    if !config.show_progress {
        return ProgressBar::hidden();
    }
    let pb = ProgressBar::new(len as u64);
    if let Ok(style) = ProgressStyle::default_bar()
        .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")
    {
        pb.set_style(style.progress_chars("#>-"));
    }
    pb
}

async fn process_filing(
    config: &NportConfig,
    fetcher: &dyn Fetcher,
    reports: &mut dyn ReportStore,
    namer: &mut ReportNamer,
    record: &IndexRecord,
) -> Result<Processed> {
    let url = config.filing_url(&record.file_path);
    let body = fetcher.fetch(&url).await?;
    let content = String::from_utf8_lossy(&body);

    let extraction = extract_filing(&record.file_path, &content)?;
    info!("Parsed {}", url);

    let filing = &extraction.filing;
    let text = render_report(filing, record)?;
    let name = namer.unique(report_name(&config.form_type, record, &filing.series_name));
    reports.write(&name, &text)?;
    Ok(Processed {
        name,
        warnings: extraction.issues.len(),
    })
}

/// Loads the index, then fetches, extracts and writes every selected filing in
/// index order.
///
/// Failing to load or parse the index aborts the run. A filing that cannot be
/// fetched, parsed or written is logged and skipped.
pub async fn run(
    config: &NportConfig,
    fetcher: &dyn Fetcher,
    index_store: &IndexStore,
    reports: &mut dyn ReportStore,
) -> Result<RunSummary> {
    let index = index_store.load_or_fetch(fetcher).await?;
    let index = String::from_utf8_lossy(&index);

    let mut selected = select_filings(&index, config.header_lines, &config.form_type)
        .map_err(|e| Error::Index {
            path: index_store.path().display().to_string(),
            source: Box::new(e),
        })?;
    info!(
        "Found {} {} filings in {}",
        selected.len(),
        config.form_type,
        config.index_file_name()
    );
    if let Some(limit) = config.limit {
        selected.truncate(limit);
    }

    let mut summary = RunSummary {
        selected: selected.len(),
        ..RunSummary::default()
    };
    let pb = progress_bar(config, selected.len());
    let mut namer = ReportNamer::new();

    for record in &selected {
        pb.set_message(record.company_name.clone());
        match process_filing(config, fetcher, reports, &mut namer, record).await {
            Ok(processed) => {
                if processed.warnings > 0 {
                    warn!(
                        "Created {} with {} field warnings",
                        processed.name, processed.warnings
                    );
                } else {
                    info!("Created {}", processed.name);
                }
                summary.processed += 1;
                summary.warnings += processed.warnings;
            }
            Err(e) => {
                error!("Skipping {}: {}", record.file_path, e);
                summary.skipped += 1;
            }
        }
        pb.inc(1);
    }

    pb.finish_and_clear();
    Ok(summary)
}
