use chrono::NaiveDate;
use colored::*;
use nport::core::config::{parse_date, NportConfig};
use nport::fetch::HttpFetcher;
use nport::storage::{FsReportStore, IndexStore};
use std::io::IsTerminal;
use std::path::PathBuf;
use structopt::StructOpt;

#[derive(StructOpt, Debug)]
#[structopt(
    name = "nport",
    about = "Extract N-PORT fund holdings from an EDGAR daily index"
)]
struct Opt {
    /// Index date (YYYYMMDD or YYYY-MM-DD), defaults to NPORT_INDEX_DATE
    #[structopt(short, long, parse(try_from_str = parse_date))]
    date: Option<NaiveDate>,

    /// Form type to select from the index
    #[structopt(long)]
    form_type: Option<String>,

    /// Directory caching downloaded index files
    #[structopt(long, parse(from_os_str))]
    input_dir: Option<PathBuf>,

    /// Directory receiving the reports
    #[structopt(short, long, parse(from_os_str))]
    output_dir: Option<PathBuf>,

    /// Only process the first N selected filings
    #[structopt(short, long)]
    limit: Option<usize>,

    /// User agent sent to the SEC
    #[structopt(long)]
    user_agent: Option<String>,
}

fn build_config(opt: Opt) -> nport::Result<NportConfig> {
    let mut config = NportConfig::from_env(opt.date)?;
    if let Some(form_type) = opt.form_type {
        config.form_type = form_type;
    }
    if let Some(dir) = opt.input_dir {
        config.input_dir = dir;
    }
    if let Some(dir) = opt.output_dir {
        config.output_dir = dir;
    }
    if let Some(user_agent) = opt.user_agent {
        config.user_agent = user_agent;
    }
    config.limit = opt.limit;
    config.show_progress = std::io::stderr().is_terminal();
    config.validate()?;
    Ok(config)
}

async fn run(config: &NportConfig) -> anyhow::Result<nport::RunSummary> {
    let fetcher = HttpFetcher::new(&config.user_agent)?;
    let index_store = IndexStore::new(
        &config.input_dir,
        &config.index_file_name(),
        &config.index_url(),
    );
    let mut reports = FsReportStore::new(&config.output_dir)?;
    Ok(nport::run(config, &fetcher, &index_store, &mut reports).await?)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    env_logger::init();
    let opt = Opt::from_args();

    let config = match build_config(opt) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{} {}", "Error:".red(), e);
            std::process::exit(2);
        }
    };

    match run(&config).await {
        Ok(summary) => {
            println!(
                "{} {} of {} {} filings, {} skipped, {} field warnings",
                "Processed".green(),
                summary.processed,
                summary.selected,
                config.form_type,
                if summary.skipped > 0 {
                    summary.skipped.to_string().yellow()
                } else {
                    summary.skipped.to_string().normal()
                },
                summary.warnings
            );
            Ok(())
        }
        Err(e) => {
            eprintln!("{} {}", "Error:".red(), e);
            std::process::exit(1);
        }
    }
}
