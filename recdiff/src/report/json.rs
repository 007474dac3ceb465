//! JSON report

use recdiff_common::text_diff::SideBySideDiff;
use recdiff_common::{FieldDiff, SummaryEntry};
use serde::Serialize;

use super::{InstanceInfo, ReportMeta};
use crate::run::{ComparisonRun, Omission};

#[derive(Serialize)]
struct JsonReport<'a> {
    generated_at: String,
    instance_a: &'a InstanceInfo,
    instance_b: &'a InstanceInfo,
    query: &'a str,
    totals: Totals,
    summary: &'a [SummaryEntry],
    omissions: &'a [Omission],
    records: Vec<JsonRecord<'a>>,
}

#[derive(Serialize)]
struct Totals {
    records_compared: usize,
    records_with_differences: usize,
    records_omitted: usize,
}

#[derive(Serialize)]
struct JsonRecord<'a> {
    /// Same index as the HTML anchor `record-<index>`
    index: usize,
    table: &'a str,
    record_id: &'a str,
    record_name: &'a str,
    changed_count: usize,
    fields: Vec<JsonField<'a>>,
}

#[derive(Serialize)]
struct JsonField<'a> {
    #[serde(flatten)]
    diff: &'a FieldDiff,
    /// Present only for changed script fields
    #[serde(skip_serializing_if = "Option::is_none")]
    line_diff: Option<SideBySideDiff>,
}

/// Render a run as pretty-printed JSON
pub fn render_json(run: &ComparisonRun, meta: &ReportMeta) -> serde_json::Result<String> {
    let records = run
        .records
        .iter()
        .enumerate()
        .map(|(index, record)| JsonRecord {
            index,
            table: &record.table,
            record_id: &record.record_id,
            record_name: &record.comparison.record_name,
            changed_count: record.comparison.changed_count,
            fields: record
                .comparison
                .fields
                .iter()
                .map(|diff| JsonField {
                    diff,
                    line_diff: diff
                        .needs_text_diff()
                        .then(|| SideBySideDiff::new(&diff.value_a, &diff.value_b)),
                })
                .collect(),
        })
        .collect();

    let report = JsonReport {
        generated_at: meta.generated_at.to_rfc3339(),
        instance_a: &meta.instance_a,
        instance_b: &meta.instance_b,
        query: &meta.query,
        totals: Totals {
            records_compared: run.records_compared(),
            records_with_differences: run.records_with_differences(),
            records_omitted: run.records_omitted(),
        },
        summary: &run.summary,
        omissions: &run.omissions,
        records,
    };

    serde_json::to_string_pretty(&report)
}
