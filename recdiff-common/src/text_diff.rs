//! Side-by-side line diff for changed script fields
//!
//! Line alignment comes from the LCS algorithm of the `similar` crate. Runs of
//! deleted and inserted lines between two matching lines are paired row by
//! row as replacements; the surplus of the longer side is a plain deletion or
//! insertion.

use serde::{Deserialize, Serialize};
use similar::{capture_diff_slices, Algorithm, DiffTag};
use std::ops::Range;

/// Alignment of one side-by-side row
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LineTag {
    Equal,
    /// Left side only
    Delete,
    /// Right side only
    Insert,
    /// Both sides, differing
    Replace,
}

/// One line of one side, numbered from 1
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiffLine {
    pub number: usize,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiffRow {
    pub tag: LineTag,
    pub left: Option<DiffLine>,
    pub right: Option<DiffLine>,
}

/// Line-aligned comparison of two text blocks
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SideBySideDiff {
    pub rows: Vec<DiffRow>,
}

impl SideBySideDiff {
    pub fn new(old: &str, new: &str) -> Self {
        let old_lines: Vec<&str> = old.lines().collect();
        let new_lines: Vec<&str> = new.lines().collect();

        let mut builder = RowBuilder {
            old: &old_lines,
            new: &new_lines,
            rows: Vec::new(),
            deleted: Vec::new(),
            inserted: Vec::new(),
        };

        for op in capture_diff_slices(Algorithm::Lcs, &old_lines, &new_lines) {
            let (tag, old_range, new_range) = op.as_tag_tuple();
            match tag {
                DiffTag::Equal => {
                    builder.flush();
                    builder.equal(old_range, new_range);
                }
                DiffTag::Delete => builder.deleted.extend(old_range),
                DiffTag::Insert => builder.inserted.extend(new_range),
                DiffTag::Replace => {
                    builder.deleted.extend(old_range);
                    builder.inserted.extend(new_range);
                }
            }
        }
        builder.flush();

        Self { rows: builder.rows }
    }

    pub fn has_changes(&self) -> bool {
        self.rows.iter().any(|r| r.tag != LineTag::Equal)
    }

    /// Number of rows per tag: (equal, delete, insert, replace)
    pub fn tag_counts(&self) -> (usize, usize, usize, usize) {
        self.rows.iter().fold((0, 0, 0, 0), |(e, d, i, r), row| match row.tag {
            LineTag::Equal => (e + 1, d, i, r),
            LineTag::Delete => (e, d + 1, i, r),
            LineTag::Insert => (e, d, i + 1, r),
            LineTag::Replace => (e, d, i, r + 1),
        })
    }
}

struct RowBuilder<'a> {
    old: &'a [&'a str],
    new: &'a [&'a str],
    rows: Vec<DiffRow>,
    /// Pending unmatched line indexes since the last equal run
    deleted: Vec<usize>,
    inserted: Vec<usize>,
}

impl RowBuilder<'_> {
    fn old_line(&self, idx: usize) -> DiffLine {
        DiffLine {
            number: idx + 1,
            text: self.old[idx].to_string(),
        }
    }

    fn new_line(&self, idx: usize) -> DiffLine {
        DiffLine {
            number: idx + 1,
            text: self.new[idx].to_string(),
        }
    }

    fn equal(&mut self, old_range: Range<usize>, new_range: Range<usize>) {
        for (o, n) in old_range.zip(new_range) {
            let row = DiffRow {
                tag: LineTag::Equal,
                left: Some(self.old_line(o)),
                right: Some(self.new_line(n)),
            };
            self.rows.push(row);
        }
    }

    fn flush(&mut self) {
        let deleted = std::mem::take(&mut self.deleted);
        let inserted = std::mem::take(&mut self.inserted);
        let paired = deleted.len().min(inserted.len());

        for (&o, &n) in deleted.iter().zip(inserted.iter()) {
            let row = DiffRow {
                tag: LineTag::Replace,
                left: Some(self.old_line(o)),
                right: Some(self.new_line(n)),
            };
            self.rows.push(row);
        }
        for &o in &deleted[paired..] {
            let row = DiffRow {
                tag: LineTag::Delete,
                left: Some(self.old_line(o)),
                right: None,
            };
            self.rows.push(row);
        }
        for &n in &inserted[paired..] {
            let row = DiffRow {
                tag: LineTag::Insert,
                left: None,
                right: Some(self.new_line(n)),
            };
            self.rows.push(row);
        }
    }
}
