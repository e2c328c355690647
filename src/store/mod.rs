//! File-backed collaborators: price table loading and series export.

pub mod export;
pub mod prices;

use crate::core::error::PriceTableError;
use chrono::NaiveDate;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("Missing required column: {0}")]
    MissingColumn(String),
    #[error("Column {0} appears more than once")]
    DuplicateColumn(String),
    #[error("Line {line}: cannot parse date '{value}': {source}")]
    DateParse {
        line: usize,
        value: String,
        source: chrono::ParseError,
    },
    #[error("Line {line}: invalid price '{value}' for {instrument}")]
    InvalidPrice {
        line: usize,
        instrument: String,
        value: String,
    },
    #[error("Line {line}: {source}")]
    InvalidRow {
        line: usize,
        source: PriceTableError,
    },
    #[error("Duplicate date {0}")]
    DuplicateDate(NaiveDate),
    #[error("Price file has no rows")]
    Empty,
}

pub type Result<T> = std::result::Result<T, StoreError>;
