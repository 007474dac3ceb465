//! # recdiff Common Library
//!
//! Shared code for the recdiff tool:
//! - Field sets and the record comparison model
//! - Field normalization and the script formatter
//! - Line diffing for changed script fields
//! - Configuration loading
//! - Error types

pub mod compare;
pub mod config;
pub mod error;
pub mod fields;
pub mod normalize;
pub mod script_format;
pub mod text_diff;

pub use compare::{compare, ChangeStatus, FieldDiff, RecordComparison, SummaryEntry};
pub use error::{Error, Result};
pub use fields::FieldSet;
