//! Errors raised by the index calculation.

use crate::core::schedule::YearMonth;
use chrono::NaiveDate;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum IndexError {
    #[error("No priced dates between {start} and {end}")]
    InvalidRange { start: NaiveDate, end: NaiveDate },

    #[error("Missing price for {instrument} on {date}")]
    MissingPrice { date: NaiveDate, instrument: String },

    #[error("No prices recorded on {date}")]
    MissingDate { date: NaiveDate },

    #[error("No priced weekday in {0} within the requested range")]
    MissingTradingDay(YearMonth),

    #[error("No index value computed on or before {date}; extend the start of the range")]
    MissingBaseValue { date: NaiveDate },

    #[error("Need at least 3 instruments to select a composition, found {found}")]
    TooFewInstruments { found: usize },

    #[error("Index has not been calculated. Run the calculation first.")]
    NotCalculated,
}

/// Reasons a [`crate::core::PriceTable`] refuses its columns or a row.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PriceTableError {
    #[error("Instrument {0} appears more than once")]
    DuplicateInstrument(String),

    #[error("Row for {date} has {found} prices, expected {expected}")]
    RowWidth {
        date: NaiveDate,
        found: usize,
        expected: usize,
    },

    #[error("Price for {instrument} on {date} must be a positive number, got {price}")]
    InvalidPrice {
        date: NaiveDate,
        instrument: String,
        price: f64,
    },

    #[error("Duplicate prices for {0}")]
    DuplicateDate(NaiveDate),
}

impl IndexError {
    pub(crate) fn missing_price(date: NaiveDate, instrument: &str) -> Self {
        IndexError::MissingPrice {
            date,
            instrument: instrument.to_string(),
        }
    }

    /// True for both flavours of an absent price lookup.
    #[cfg(test)]
    pub(crate) fn is_missing_price(&self) -> bool {
        matches!(
            self,
            IndexError::MissingPrice { .. } | IndexError::MissingDate { .. }
        )
    }
}
