//! Comparison run: tables -> records -> comparisons
//!
//! Records are processed one at a time in table order, then listing order.
//! A failing table or record becomes an [`Omission`] and the run continues.

use recdiff_common::{compare, RecordComparison, SummaryEntry};
use serde::Serialize;
use tracing::{error, info, warn};

use crate::source::{RecordCatalog, RecordRef, RecordSource};

/// Comparison of one record, tagged with where it came from
#[derive(Debug, Clone, Serialize)]
pub struct RecordReport {
    pub table: String,
    pub record_id: String,
    pub comparison: RecordComparison,
}

/// A table or record left out of the report
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Omission {
    pub table: String,
    /// `None` when the whole table was skipped
    pub record_id: Option<String>,
    pub display_name: Option<String>,
    pub reason: String,
}

/// Result of a comparison run
#[derive(Debug, Clone, Default, Serialize)]
pub struct ComparisonRun {
    pub records: Vec<RecordReport>,
    pub summary: Vec<SummaryEntry>,
    pub omissions: Vec<Omission>,
}

impl ComparisonRun {
    pub fn records_compared(&self) -> usize {
        self.records.len()
    }

    pub fn records_with_differences(&self) -> usize {
        self.records.iter().filter(|r| r.comparison.has_differences()).count()
    }

    /// Skipped records; a skipped table counts once
    pub fn records_omitted(&self) -> usize {
        self.omissions.len()
    }

    fn push(&mut self, table: &str, record: &RecordRef, comparison: RecordComparison) {
        self.summary.push(SummaryEntry {
            table_name: table.to_string(),
            record_name: comparison.record_name.clone(),
            changed_count: comparison.changed_count,
        });
        self.records.push(RecordReport {
            table: table.to_string(),
            record_id: record.sys_id.clone(),
            comparison,
        });
    }
}

/// Compare every listed record of every table
///
/// Records are listed on instance A only; a record missing on B surfaces as
/// a fetch failure and is omitted.
pub async fn run_comparison(
    tables: &[String],
    query: &str,
    catalog: &dyn RecordCatalog,
    source_a: &dyn RecordSource,
    source_b: &dyn RecordSource,
) -> ComparisonRun {
    let mut run = ComparisonRun::default();

    for table in tables {
        let records = match catalog.list_records(table, query).await {
            Ok(records) => records,
            Err(e) => {
                error!(table = %table, error = %e, "Listing failed, table skipped");
                run.omissions.push(Omission {
                    table: table.clone(),
                    record_id: None,
                    display_name: None,
                    reason: format!("listing failed: {}", e),
                });
                continue;
            }
        };

        info!(table = %table, count = records.len(), "Comparing records");

        for record in &records {
            let fields_a = match source_a.fetch_fields(table, &record.sys_id).await {
                Ok(fields) => fields,
                Err(e) => {
                    omit_record(&mut run, table, record, "instance A", &e);
                    continue;
                }
            };
            let fields_b = match source_b.fetch_fields(table, &record.sys_id).await {
                Ok(fields) => fields,
                Err(e) => {
                    omit_record(&mut run, table, record, "instance B", &e);
                    continue;
                }
            };

            let comparison = compare(&fields_a, &fields_b, &record.display_name);
            run.push(table, record, comparison);
        }
    }

    info!(
        compared = run.records_compared(),
        with_differences = run.records_with_differences(),
        omitted = run.records_omitted(),
        "Comparison run finished"
    );
    run
}

fn omit_record(
    run: &mut ComparisonRun,
    table: &str,
    record: &RecordRef,
    side: &str,
    err: &dyn std::fmt::Display,
) {
    warn!(
        table = %table,
        sys_id = %record.sys_id,
        error = %err,
        "Fetch from {} failed, record skipped",
        side
    );
    run.omissions.push(Omission {
        table: table.to_string(),
        record_id: Some(record.sys_id.clone()),
        display_name: Some(record.display_name.clone()),
        reason: format!("{} fetch failed: {}", side, err),
    });
}
