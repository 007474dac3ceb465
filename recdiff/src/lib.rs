//! recdiff library - record comparison between two platform instances
//!
//! Lists records of the configured tables on instance A, fetches each record
//! from both instances, compares the normalized field sets and renders a
//! report.

pub mod report;
pub mod run;
pub mod source;

pub use report::{write_report, InstanceInfo, ReportFormat, ReportMeta};
pub use run::{run_comparison, ComparisonRun, Omission, RecordReport};
pub use source::{InstanceClient, RecordCatalog, RecordRef, RecordSource, SourceError};
