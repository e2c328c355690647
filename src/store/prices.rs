//! Loads the daily closing price table from CSV.
//!
//! Expected layout: a `Date` column plus one column per instrument, e.g.
//!
//! ```text
//! Date,Stock_A,Stock_B,Stock_C
//! 01/01/2020,10.0,8.0,6.0
//! ```
//!
//! Rows may appear in any order; the table is keyed and sorted by date.

use super::{Result, StoreError};
use crate::core::error::PriceTableError;
use crate::core::price::{PriceStore, PriceTable};
use chrono::NaiveDate;
use std::collections::HashSet;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::{debug, info};

const DATE_COLUMN: &str = "Date";

pub fn load_price_table<P: AsRef<Path>>(path: P, date_format: &str) -> Result<PriceTable> {
    let path = path.as_ref();
    info!("Loading prices from {}", path.display());
    let file = File::open(path)?;
    read_price_table(file, date_format)
}

pub fn read_price_table<R: Read>(input: R, date_format: &str) -> Result<PriceTable> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(input);

    let headers = reader.headers()?.clone();
    let mut seen = HashSet::new();
    if let Some(dup) = headers.iter().find(|h| !seen.insert(*h)) {
        return Err(StoreError::DuplicateColumn(dup.to_string()));
    }
    let date_idx = headers
        .iter()
        .position(|h| h == DATE_COLUMN)
        .ok_or_else(|| StoreError::MissingColumn(DATE_COLUMN.to_string()))?;
    let instruments: Vec<String> = headers
        .iter()
        .enumerate()
        .filter(|(idx, _)| *idx != date_idx)
        .map(|(_, h)| h.to_string())
        .collect();
    debug!("Instrument columns: {:?}", instruments);

    let mut table = PriceTable::new(instruments.clone()).map_err(|e| match e {
        PriceTableError::DuplicateInstrument(name) => StoreError::DuplicateColumn(name),
        source => StoreError::InvalidRow { line: 1, source },
    })?;
    for (idx, record) in reader.records().enumerate() {
        // records() starts after the header, lines are 1-based
        let line = idx + 2;
        let record = record?;

        let raw_date = record.get(date_idx).unwrap_or_default();
        let date = NaiveDate::parse_from_str(raw_date, date_format).map_err(|source| {
            StoreError::DateParse {
                line,
                value: raw_date.to_string(),
                source,
            }
        })?;
        let mut prices = Vec::with_capacity(instruments.len());
        for (field_idx, field) in record.iter().enumerate() {
            if field_idx == date_idx {
                continue;
            }
            let instrument = instruments[prices.len()].clone();
            let price = field.parse::<f64>().map_err(|_| StoreError::InvalidPrice {
                line,
                instrument,
                value: field.to_string(),
            })?;
            prices.push(price);
        }

        table
            .insert_row(date, prices)
            .map_err(|source| match source {
                PriceTableError::DuplicateDate(date) => StoreError::DuplicateDate(date),
                source => StoreError::InvalidRow { line, source },
            })?;
    }

    if table.is_empty() {
        return Err(StoreError::Empty);
    }
    info!(
        "Loaded {} dates for {} instruments",
        table.len(),
        table.instruments().len()
    );
    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::composition::rank_top;
    use crate::core::config::DEFAULT_DATE_FORMAT;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn read(csv: &str) -> Result<PriceTable> {
        read_price_table(csv.as_bytes(), DEFAULT_DATE_FORMAT)
    }

    #[test]
    fn test_reads_and_sorts_rows() {
        let table = read(
            "Date,Stock_A,Stock_B,Stock_C\n\
             02/01/2020, 11.5, 9, 7\n\
             31/12/2019,10,8,6\n",
        )
        .unwrap();

        assert_eq!(table.instruments(), &["Stock_A", "Stock_B", "Stock_C"]);
        assert_eq!(table.first_date(), Some(date(2019, 12, 31)));
        assert_eq!(table.last_date(), Some(date(2020, 1, 2)));
        assert_eq!(table.price(date(2020, 1, 2), "Stock_A"), Ok(11.5));
    }

    #[test]
    fn test_date_column_may_be_anywhere() {
        let table = read("Stock_A,Date,Stock_B\n1.0,15/01/2020,2.0\n").unwrap();
        assert_eq!(table.instruments(), &["Stock_A", "Stock_B"]);
        assert_eq!(table.row(date(2020, 1, 15)), Some(&[1.0, 2.0][..]));
    }

    #[test]
    fn test_rejects_malformed_input() {
        assert!(matches!(
            read("Day,Stock_A\n01/01/2020,1\n"),
            Err(StoreError::MissingColumn(_))
        ));
        assert!(matches!(
            read("Date,Stock_A\n2020-01-01,1\n"),
            Err(StoreError::DateParse { line: 2, .. })
        ));
        assert!(matches!(
            read("Date,Stock_A\n01/01/2020,1\n02/01/2020,\n"),
            Err(StoreError::InvalidPrice { line: 3, .. })
        ));
        assert!(matches!(
            read("Date,Stock_A\n01/01/2020,-1\n"),
            Err(StoreError::InvalidRow {
                line: 2,
                source: PriceTableError::InvalidPrice { .. }
            })
        ));
        assert!(matches!(
            read("Date,Stock_A\n01/01/2020,1\n01/01/2020,2\n"),
            Err(StoreError::DuplicateDate(_))
        ));
        assert!(matches!(read("Date,Stock_A\n"), Err(StoreError::Empty)));
        // Ragged rows are rejected by the reader itself
        assert!(matches!(
            read("Date,Stock_A,Stock_B\n01/01/2020,1\n"),
            Err(StoreError::Csv(_))
        ));
    }

    #[test]
    fn test_rejects_repeated_columns() {
        let csv = "Date,A,A,B,C\n31/12/2019,10,9,1,1\n";
        let err = read(csv).unwrap_err();
        assert!(matches!(err, StoreError::DuplicateColumn(ref name) if name == "A"));
        assert_eq!(err.to_string(), "Column A appears more than once");

        assert!(matches!(
            read("Date,A,Date,B\n31/12/2019,1,31/12/2019,2\n"),
            Err(StoreError::DuplicateColumn(ref name)) if name == "Date"
        ));

        // Distinct names that only share a prefix are separate instruments
        let table = read("Date,A,A.1,B,C\n31/12/2019,10,9,1,1\n").unwrap();
        let composition = rank_top(&table, date(2019, 12, 31)).unwrap();
        assert_eq!(composition.members(), &["A", "A.1", "B"]);
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("prices.csv");
        std::fs::write(&path, "Date,A,B,C\n01/01/2020,3,2,1\n").unwrap();

        let table = load_price_table(&path, DEFAULT_DATE_FORMAT).unwrap();
        assert_eq!(table.len(), 1);

        let err = load_price_table(dir.path().join("missing.csv"), DEFAULT_DATE_FORMAT)
            .unwrap_err();
        assert!(matches!(err, StoreError::Io(_)));
    }
}
