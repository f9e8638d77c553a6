use std::io::Write;
use std::path::{Path, PathBuf};

use clap::{ArgAction, Parser};
use serde::Serialize;
use tracing::{info, warn};

use csv_format_check::{CsvFormatCheckResult, CsvFormatChecker, NoSpecificChecks};

use crate::logging;

#[derive(Parser, Debug)]
#[command(name = "csv-format-check")]
#[command(
    about = "Check that CSV files are non-empty, UTF-8 or Shift-JIS, and within the record limit",
    long_about = None
)]
#[command(version)]
struct Cli {
    /// CSV files to check
    #[arg(required = true)]
    files: Vec<PathBuf>,

    /// Pretty-print the JSON output
    #[arg(long)]
    pretty: bool,

    /// Verbosity level (-v for INFO, -vv for DEBUG)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

/// Outcome for one file: either a check result or the reason it could not
/// be opened.
#[derive(Debug, Serialize)]
struct FileReport<'a> {
    file: &'a Path,
    #[serde(skip_serializing_if = "Option::is_none")]
    result: Option<CsvFormatCheckResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    open_error: Option<String>,
}

async fn check_path(path: &Path) -> FileReport<'_> {
    match tokio::fs::File::open(path).await {
        Ok(file) => {
            let mut checker = CsvFormatChecker::new(file, NoSpecificChecks);
            let result = checker.check_format().await;
            info!(file = %path.display(), errors = result.errors_count(), "checked");
            FileReport {
                file: path,
                result: Some(result),
                open_error: None,
            }
        }
        Err(e) => {
            warn!(file = %path.display(), error = %e, "failed to open");
            FileReport {
                file: path,
                result: None,
                open_error: Some(e.to_string()),
            }
        }
    }
}

/// Check every file given on the command line and print the results as JSON.
///
/// A file that cannot be opened is reported and the remaining files are
/// still checked. Returns `Ok(true)` if no file has errors.
///
/// # Errors
///
/// Returns an error if any file could not be opened (after printing every
/// report) or if writing to stdout fails.
pub async fn run() -> anyhow::Result<bool> {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    let mut reports = Vec::with_capacity(cli.files.len());
    for path in &cli.files {
        reports.push(check_path(path).await);
    }

    let unopened = reports.iter().filter(|r| r.open_error.is_some()).count();
    let ok = reports
        .iter()
        .filter_map(|r| r.result.as_ref())
        .all(|r| !r.has_errors());

    let mut stdout = std::io::stdout().lock();
    if cli.pretty {
        serde_json::to_writer_pretty(&mut stdout, &reports)?;
    } else {
        serde_json::to_writer(&mut stdout, &reports)?;
    }
    writeln!(stdout)?;

    if unopened > 0 {
        anyhow::bail!("{unopened} of {} file(s) could not be opened", reports.len());
    }
    Ok(ok)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_unopenable_file_is_reported_not_fatal() {
        let tmp = TempDir::new().unwrap();
        let missing = tmp.path().join("missing.csv");
        let present = tmp.path().join("present.csv");
        std::fs::write(&present, "id,name\n1,alice\n").unwrap();

        let missing_report = check_path(&missing).await;
        assert!(missing_report.result.is_none());
        assert!(missing_report.open_error.is_some());

        let present_report = check_path(&present).await;
        assert!(present_report.open_error.is_none());
        assert!(!present_report.result.as_ref().unwrap().has_errors());
    }

    #[tokio::test]
    async fn test_report_serializes_only_present_fields() {
        let tmp = TempDir::new().unwrap();
        let missing = tmp.path().join("missing.csv");

        let value = serde_json::to_value(check_path(&missing).await).unwrap();
        assert!(value.get("result").is_none());
        assert!(value["open_error"].is_string());
    }
}
