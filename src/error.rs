// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Error types for the ledger engine.
//!
//! Store failures are wrapped with the stage that issued them; concurrent
//! aggregation failures collapse into a single report-level error.

use std::fmt;
use thiserror::Error;

/// Failures raised by a [`crate::store::LedgerStore`] implementation.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("sqlite: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("invalid {column} value '{value}' in ledger")]
    Decode { column: &'static str, value: String },

    #[error("ledger store unavailable: {0}")]
    Unavailable(String),

    #[error("{0} total is out of range")]
    Overflow(&'static str),
}

/// The step of a transaction listing that failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListingStage {
    Count,
    Summary,
    Fetch,
}

impl fmt::Display for ListingStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Count => "count",
            Self::Summary => "summarize",
            Self::Fetch => "fetch",
        };
        f.write_str(s)
    }
}

#[derive(Error, Debug)]
pub enum LedgerError {
    #[error(transparent)]
    Store(#[from] StoreError),

    /// One aggregate query failed.
    #[error("failed to calculate {aggregate}")]
    Aggregation {
        aggregate: &'static str,
        #[source]
        source: StoreError,
    },

    #[error("failed to {stage} transactions")]
    Listing {
        stage: ListingStage,
        #[source]
        source: Box<LedgerError>,
    },

    /// Deliberately opaque: callers are not told which aggregate failed.
    #[error("failed to get financial overview")]
    Overview,

    #[error("failed to get dashboard charts")]
    Charts {
        #[source]
        source: Box<LedgerError>,
    },

    #[error("aggregation task '{0}' panicked")]
    TaskPanicked(&'static str),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: i64 },

    #[error("Export error: {0}")]
    Export(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Workbook error: {0}")]
    Xlsx(#[from] rust_xlsxwriter::XlsxError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl LedgerError {
    pub(crate) fn listing(stage: ListingStage, err: impl Into<LedgerError>) -> Self {
        Self::Listing {
            stage,
            source: Box::new(err.into()),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

impl From<rusqlite::Error> for LedgerError {
    fn from(err: rusqlite::Error) -> Self {
        Self::Store(StoreError::Sqlite(err))
    }
}

pub type LedgerResult<T> = Result<T, LedgerError>;
