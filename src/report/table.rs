//! Fixed-width summary of a saved benchmark listing.
//!
//! Reads the JSON mirror written by [`crate::api::benchmarks`] and renders
//! one row per automated benchmark. Manual benchmarks are skipped.

use crate::client::http::truncate_chars;
use crate::protocol::models::{BenchmarkList, BenchmarkSummary};
use crate::WorkbenchError;
use std::fs;
use std::io;
use std::path::Path;
use tracing::info;

/// Default report file name.
pub const REPORT_FILE_NAME: &str = "benchmarks.txt";

const ID_WIDTH: usize = 15;
const TITLE_WIDTH: usize = 50;
const VERSION_WIDTH: usize = 15;
const STATUS_WIDTH: usize = 15;
const FORMATS_WIDTH: usize = 30;
const PROFILES_WIDTH: usize = 50;
const RULE_WIDTH: usize = 175;
const MISSING: &str = "N/A";

/// Load `list_path`, render the table and write it to `report_path`.
///
/// Returns the number of benchmark rows written.
pub fn write_benchmark_report(list_path: &Path, report_path: &Path) -> Result<usize, WorkbenchError> {
    let list = load_listing(list_path)?;
    let (table, rows) = render_table(&list);
    fs::write(report_path, table).map_err(|e| {
        WorkbenchError::OutputIO(format!("Failed to write {}: {}", report_path.display(), e))
    })?;
    info!(path = %report_path.display(), rows, "Benchmark report written");
    Ok(rows)
}

/// Read a saved listing, requiring the `Benchmarks` field.
///
/// Entries are read leniently, so any listing the client saved can be
/// reported on.
pub fn load_listing(path: &Path) -> Result<BenchmarkList, WorkbenchError> {
    let json = fs::read_to_string(path).map_err(|e| match e.kind() {
        io::ErrorKind::NotFound => {
            WorkbenchError::OutputIO(format!("File not found: {}", path.display()))
        }
        _ => WorkbenchError::OutputIO(format!("Failed to read {}: {}", path.display(), e)),
    })?;

    let document: serde_json::Value = serde_json::from_str(&json).map_err(|e| {
        WorkbenchError::MalformedResponse(format!("{} is not valid JSON: {}", path.display(), e))
    })?;
    if document.get("Benchmarks").is_none() {
        return Err(WorkbenchError::MalformedResponse(format!(
            "Invalid file format: 'Benchmarks' field missing in {}",
            path.display()
        )));
    }
    Ok(BenchmarkList::from_document(&document))
}

/// Render the table. Returns the text and the number of rows.
pub fn render_table(list: &BenchmarkList) -> (String, usize) {
    let mut out = format!(
        "{:<ID_WIDTH$} {:<TITLE_WIDTH$} {:<VERSION_WIDTH$} {:<STATUS_WIDTH$} {:<FORMATS_WIDTH$} {:<PROFILES_WIDTH$}\n",
        "workbenchId",
        "benchmarkTitle",
        "benchmarkVersion",
        "assessmentStatus",
        "availableFormats",
        "profiles",
    );
    out.push_str(&"-".repeat(RULE_WIDTH));
    out.push('\n');

    let mut rows = 0;
    for benchmark in list.benchmarks.iter().filter(|b| !b.is_manual()) {
        out.push_str(&render_row(benchmark));
        out.push('\n');
        rows += 1;
    }
    (out, rows)
}

fn render_row(benchmark: &BenchmarkSummary) -> String {
    let id = benchmark
        .workbench_id_text()
        .unwrap_or_else(|| MISSING.to_string());
    let title = benchmark.benchmark_title.as_deref().unwrap_or(MISSING);
    let version = benchmark.benchmark_version.as_deref().unwrap_or(MISSING);
    let status = benchmark.assessment_status.as_deref().unwrap_or(MISSING);

    let formats = match &benchmark.available_formats {
        Some(formats) => formats.join(", "),
        None => MISSING.to_string(),
    };

    let titles: Vec<&str> = benchmark
        .profiles
        .iter()
        .filter_map(|p| p.profile_title.as_deref())
        .collect();
    let profiles = if titles.is_empty() {
        MISSING.to_string()
    } else {
        titles.join(", ")
    };

    format!(
        "{:<ID_WIDTH$} {:<TITLE_WIDTH$} {:<VERSION_WIDTH$} {:<STATUS_WIDTH$} {:<FORMATS_WIDTH$} {:<PROFILES_WIDTH$}",
        id,
        fit(title, TITLE_WIDTH),
        version,
        status,
        fit(&formats, FORMATS_WIDTH),
        fit(&profiles, PROFILES_WIDTH),
    )
}

/// Cut to `width - 3` characters plus `...` when longer than `width`.
fn fit(text: &str, width: usize) -> String {
    if text.chars().count() > width {
        truncate_chars(text, width - 3)
    } else {
        text.to_string()
    }
}
