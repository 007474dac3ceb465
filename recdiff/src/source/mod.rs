//! Record access on a remote instance
//!
//! Two capabilities feed a comparison run: listing the candidate records of a
//! table ([`RecordCatalog`]) and fetching one record's normalized field set
//! ([`RecordSource`]). [`InstanceClient`] implements both over HTTP; tests
//! implement them with in-memory fixtures.

use async_trait::async_trait;
use recdiff_common::FieldSet;
use serde::Serialize;
use thiserror::Error;

pub mod client;
pub mod listing;
pub mod xml_export;

pub use client::InstanceClient;

/// Platform access errors
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("HTTP status {0}: {1}")]
    Status(u16, String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Parse error: {0}")]
    Parse(String),
}

/// A listed record: identifier plus a name fit for display
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecordRef {
    pub sys_id: String,
    pub display_name: String,
}

/// Lists candidate records of a table
#[async_trait]
pub trait RecordCatalog: Send + Sync {
    /// Records of `table` matching the encoded `query` (empty matches all)
    async fn list_records(&self, table: &str, query: &str) -> Result<Vec<RecordRef>, SourceError>;
}

/// Fetches the normalized field set of one record
#[async_trait]
pub trait RecordSource: Send + Sync {
    async fn fetch_fields(&self, table: &str, sys_id: &str) -> Result<FieldSet, SourceError>;
}
