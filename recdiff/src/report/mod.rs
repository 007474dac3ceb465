//! Report rendering and output
//!
//! A run renders either as a self-contained HTML page ([`html`]) or as pretty
//! JSON ([`json`]); both carry the same data.

use chrono::{DateTime, Utc};
use recdiff_common::{Error, Result};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::run::ComparisonRun;

pub mod html;
pub mod json;

pub use html::render_html;
pub use json::render_json;

/// One compared instance as shown in the report header
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InstanceInfo {
    pub label: String,
    pub url: String,
}

/// Report context that is not part of the comparison data
#[derive(Debug, Clone)]
pub struct ReportMeta {
    pub instance_a: InstanceInfo,
    pub instance_b: InstanceInfo,
    pub query: String,
    pub generated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum ReportFormat {
    #[default]
    Html,
    Json,
}

impl ReportFormat {
    pub fn extension(self) -> &'static str {
        match self {
            ReportFormat::Html => "html",
            ReportFormat::Json => "json",
        }
    }
}

/// Render `run` and write it to `<output_dir>/<report_name>.<ext>`
///
/// The output directory is created when missing. Returns the written path.
pub fn write_report(
    run: &ComparisonRun,
    meta: &ReportMeta,
    format: ReportFormat,
    output_dir: &Path,
    report_name: &str,
) -> Result<PathBuf> {
    if report_name.trim().is_empty() || report_name.contains(['/', '\\']) {
        return Err(Error::InvalidInput(format!(
            "report name must be a plain file stem, got {:?}",
            report_name
        )));
    }

    let content = match format {
        ReportFormat::Html => render_html(run, meta),
        ReportFormat::Json => render_json(run, meta)?,
    };

    std::fs::create_dir_all(output_dir)?;
    let path = output_dir.join(format!("{}.{}", report_name, format.extension()));
    std::fs::write(&path, content)?;

    info!(path = %path.display(), records = run.records_compared(), "Report written");
    Ok(path)
}
