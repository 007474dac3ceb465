//! HTML report
//!
//! One page: header, summary grouped by table, omissions, then one section per
//! record. Record sections are anchored as `record-<index>` where index is
//! the record's position in the run. All text is escaped.

use recdiff_common::text_diff::{DiffLine, LineTag, SideBySideDiff};
use recdiff_common::{FieldDiff, RecordComparison};

use super::ReportMeta;
use crate::run::{ComparisonRun, Omission, RecordReport};

const STYLE: &str = r#"
        body { font-family: 'Segoe UI', Tahoma, Geneva, Verdana, sans-serif; margin: 20px; }
        table { border-collapse: collapse; margin-bottom: 12px; }
        th, td { border: 1px solid #ccc; padding: 4px 8px; vertical-align: top; text-align: left; }
        td.value, .diff td.line { font-family: 'Courier New', monospace; white-space: pre-wrap; }
        tr.table-name td { background: #e8f0fe; font-weight: bold; }
        .changed { color: #b00020; font-weight: bold; }
        .added { color: #1565c0; }
        .removed { color: #e65100; }
        .unchanged { color: #2e7d32; }
        .diff { font-size: 13px; }
        .diff td.num { color: #888; text-align: right; }
        .diff tr.delete td.line.left, .diff tr.replace td.line.left { background: #fdecea; }
        .diff tr.insert td.line.right, .diff tr.replace td.line.right { background: #e8f5e9; }
"#;

/// Escape text for element content and quoted attribute values
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Render a run as a self-contained HTML page
pub fn render_html(run: &ComparisonRun, meta: &ReportMeta) -> String {
    let sections: String = run
        .records
        .iter()
        .enumerate()
        .map(|(index, record)| render_record(index, record, meta))
        .collect();

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <title>Comparison Report</title>
    <style>{style}</style>
</head>
<body>
<h1>Comparison Report</h1>
<p><strong>{label_a}</strong> ({url_a}) compared with <strong>{label_b}</strong> ({url_b})</p>
<p>Query: <code>{query}</code></p>
<p>Generated {generated}. {compared} records compared, {differing} with differences, {omitted} omitted.</p>
{summary}{omissions}<hr>
{sections}</body>
</html>
"#,
        style = STYLE,
        label_a = escape_html(&meta.instance_a.label),
        url_a = escape_html(&meta.instance_a.url),
        label_b = escape_html(&meta.instance_b.label),
        url_b = escape_html(&meta.instance_b.url),
        query = escape_html(&meta.query),
        generated = meta.generated_at.format("%Y-%m-%d %H:%M:%S UTC"),
        compared = run.records_compared(),
        differing = run.records_with_differences(),
        omitted = run.records_omitted(),
        summary = render_summary(run),
        omissions = render_omissions(&run.omissions),
        sections = sections,
    )
}

/// Summary table, records grouped under their table in run order
fn render_summary(run: &ComparisonRun) -> String {
    let mut tables: Vec<(&str, Vec<(usize, &RecordReport)>)> = Vec::new();
    for (index, record) in run.records.iter().enumerate() {
        match tables.iter_mut().find(|(name, _)| *name == record.table) {
            Some((_, rows)) => rows.push((index, record)),
            None => tables.push((record.table.as_str(), vec![(index, record)])),
        }
    }

    let mut rows = String::new();
    for (table, records) in tables {
        rows.push_str(&format!(
            "<tr class=\"table-name\"><td colspan=\"4\">{}</td></tr>\n",
            escape_html(table)
        ));
        for (index, record) in records {
            let status = summary_status(&record.comparison);
            rows.push_str(&format!(
                "<tr data-status=\"{status}\"><td>{name}</td><td class=\"{status}\">{count}</td><td>{status}</td><td><a href=\"#record-{index}\">View</a></td></tr>\n",
                status = status,
                name = escape_html(&record.comparison.record_name),
                count = record.comparison.changed_count,
                index = index,
            ));
        }
    }

    format!(
        "<h2>Summary by Table and Record</h2>\n<table id=\"summary-table\">\n<thead><tr><th>Record</th><th>Diffs</th><th>Status</th><th>Link</th></tr></thead>\n<tbody>\n{}</tbody>\n</table>\n",
        rows
    )
}

fn summary_status(comparison: &RecordComparison) -> &'static str {
    if comparison.has_differences() {
        "changed"
    } else {
        "unchanged"
    }
}

fn render_omissions(omissions: &[Omission]) -> String {
    if omissions.is_empty() {
        return String::new();
    }

    let items: String = omissions
        .iter()
        .map(|o| {
            let subject = match (&o.display_name, &o.record_id) {
                (Some(name), Some(id)) => format!("{} ({})", escape_html(name), escape_html(id)),
                (None, Some(id)) => escape_html(id),
                _ => "whole table".to_string(),
            };
            format!(
                "<li><strong>{}</strong>: {}: {}</li>\n",
                escape_html(&o.table),
                subject,
                escape_html(&o.reason)
            )
        })
        .collect();

    format!("<h2>Omitted</h2>\n<ul id=\"omissions\">\n{}</ul>\n", items)
}

fn render_record(index: usize, record: &RecordReport, meta: &ReportMeta) -> String {
    let rows: String = record
        .comparison
        .fields
        .iter()
        .map(|field| render_field_row(index, field, meta))
        .collect();

    format!(
        r#"<section id="record-{index}">
<h3>{name}</h3>
<p>Table: {table}, sys_id: {sys_id}, {count} differences</p>
<table>
<thead><tr><th>Field</th><th>{label_a}</th><th>{label_b}</th><th>Status</th></tr></thead>
<tbody>
{rows}</tbody>
</table>
</section>
"#,
        index = index,
        name = escape_html(&record.comparison.record_name),
        table = escape_html(&record.table),
        sys_id = escape_html(&record.record_id),
        count = record.comparison.changed_count,
        label_a = escape_html(&meta.instance_a.label),
        label_b = escape_html(&meta.instance_b.label),
        rows = rows,
    )
}

fn render_field_row(index: usize, field: &FieldDiff, meta: &ReportMeta) -> String {
    let status = field.status.as_str();
    let name = escape_html(&field.name);

    if field.needs_text_diff() {
        let diff = SideBySideDiff::new(&field.value_a, &field.value_b);
        let (_, deleted, inserted, replaced) = diff.tag_counts();
        return format!(
            "<tr data-status=\"{status}\"><td>{name}</td><td colspan=\"2\"><details id=\"record-{index}-{name}\"><summary>Show diff ({changes} lines differ)</summary>\n{table}</details></td><td class=\"{status}\">{status}</td></tr>\n",
            status = status,
            name = name,
            index = index,
            changes = deleted + inserted + replaced,
            table = render_text_diff(&diff, meta),
        );
    }

    format!(
        "<tr data-status=\"{status}\"><td>{name}</td><td class=\"value\">{a}</td><td class=\"value\">{b}</td><td class=\"{status}\">{status}</td></tr>\n",
        status = status,
        name = name,
        a = escape_html(&field.value_a),
        b = escape_html(&field.value_b),
    )
}

/// Side-by-side line table: number and text for each side
fn render_text_diff(diff: &SideBySideDiff, meta: &ReportMeta) -> String {
    let mut rows = String::new();
    for row in &diff.rows {
        let (num_a, text_a) = line_cells(row.left.as_ref());
        let (num_b, text_b) = line_cells(row.right.as_ref());
        rows.push_str(&format!(
            "<tr class=\"{tag}\"><td class=\"num\">{num_a}</td><td class=\"line left\">{text_a}</td><td class=\"num\">{num_b}</td><td class=\"line right\">{text_b}</td></tr>\n",
            tag = tag_class(row.tag),
            num_a = num_a,
            text_a = text_a,
            num_b = num_b,
            text_b = text_b,
        ));
    }

    format!(
        "<table class=\"diff\">\n<thead><tr><th></th><th>{}</th><th></th><th>{}</th></tr></thead>\n<tbody>\n{}</tbody>\n</table>\n",
        escape_html(&meta.instance_a.label),
        escape_html(&meta.instance_b.label),
        rows
    )
}

fn line_cells(line: Option<&DiffLine>) -> (String, String) {
    match line {
        Some(line) => (line.number.to_string(), escape_html(&line.text)),
        None => (String::new(), String::new()),
    }
}

fn tag_class(tag: LineTag) -> &'static str {
    match tag {
        LineTag::Equal => "equal",
        LineTag::Delete => "delete",
        LineTag::Insert => "insert",
        LineTag::Replace => "replace",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_html() {
        assert_eq!(
            escape_html(r#"<a href="x">Tom & 'Jerry'</a>"#),
            "&lt;a href=&quot;x&quot;&gt;Tom &amp; &#39;Jerry&#39;&lt;/a&gt;"
        );
        assert_eq!(escape_html("plain"), "plain");
    }

    #[test]
    fn test_tag_classes_are_distinct() {
        let classes = [LineTag::Equal, LineTag::Delete, LineTag::Insert, LineTag::Replace].map(tag_class);
        for (i, a) in classes.iter().enumerate() {
            assert!(classes[i + 1..].iter().all(|b| b != a));
        }
    }

    #[test]
    fn test_line_cells() {
        let line = DiffLine { number: 7, text: "if (a < b)".to_string() };
        assert_eq!(line_cells(Some(&line)), ("7".to_string(), "if (a &lt; b)".to_string()));
        assert_eq!(line_cells(None), (String::new(), String::new()));
    }
}
