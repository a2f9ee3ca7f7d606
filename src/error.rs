//! Error types for the basket analysis pipeline

use thiserror::Error;

/// Errors raised while loading, normalizing, or mining a transaction table.
///
/// The first three variants are the data problems a user can fix by
/// uploading a different file; the rest are parameter or I/O failures.
#[derive(Debug, Error)]
pub enum MiningError {
    /// A required column is missing from the input table
    #[error("dataset must contain a column named {expected} (found: {})", .found.join(", "))]
    Schema { expected: String, found: Vec<String> },

    /// An item cell is not a bracketed list of quoted item names
    #[error("record {record}: item cell {cell:?} is not a valid item list: {reason}")]
    MalformedItemList {
        record: usize,
        cell: String,
        reason: String,
    },

    /// Normalization produced no (transaction, item) pairs
    #[error("no usable transactions found in dataset")]
    EmptyDataset,

    #[error("invalid value {value} for {name}: {reason}")]
    InvalidParameter {
        name: &'static str,
        value: String,
        reason: String,
    },

    /// A rule needed the support of a subset that was not mined
    #[error("no support recorded for itemset {{{}}}", .itemset.join(", "))]
    MissingSupport { itemset: Vec<String> },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("DataFrame error: {0}")]
    Frame(#[from] polars::prelude::PolarsError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl MiningError {
    pub(crate) fn invalid_parameter(
        name: &'static str,
        value: impl ToString,
        reason: impl Into<String>,
    ) -> Self {
        MiningError::InvalidParameter {
            name,
            value: value.to_string(),
            reason: reason.into(),
        }
    }
}
