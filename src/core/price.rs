//! Price store abstraction and the in-memory price table

use crate::core::composition::Composition;
use crate::core::error::{IndexError, PriceTableError};
use chrono::NaiveDate;
use std::collections::{BTreeMap, HashSet};

/// Read-only access to daily closing prices.
pub trait PriceStore {
    /// Instrument identifiers in input column order.
    fn instruments(&self) -> &[String];

    /// Every instrument's price on `date`, aligned with `instruments()`.
    fn row(&self, date: NaiveDate) -> Option<&[f64]>;

    /// Priced dates within `[start, end]`, ascending.
    fn dates_between(&self, start: NaiveDate, end: NaiveDate) -> Vec<NaiveDate>;

    fn price(&self, date: NaiveDate, instrument: &str) -> Result<f64, IndexError> {
        let row = self.row(date).ok_or(IndexError::MissingDate { date })?;
        self.instruments()
            .iter()
            .position(|i| i == instrument)
            .and_then(|idx| row.get(idx).copied())
            .ok_or_else(|| IndexError::missing_price(date, instrument))
    }

    /// Prices of the composition's members on `date`, in rank order.
    fn prices_for(&self, date: NaiveDate, composition: &Composition) -> Result<[f64; 3], IndexError> {
        let mut prices = [0.0; 3];
        for (slot, instrument) in prices.iter_mut().zip(composition.members()) {
            *slot = self.price(date, instrument)?;
        }
        Ok(prices)
    }
}

#[derive(Debug, Clone, Default)]
pub struct PriceTable {
    instruments: Vec<String>,
    rows: BTreeMap<NaiveDate, Vec<f64>>,
}

impl PriceTable {
    /// Creates an empty table. Instrument identifiers must be distinct.
    pub fn new(instruments: Vec<String>) -> Result<Self, PriceTableError> {
        let mut seen = HashSet::new();
        if let Some(dup) = instruments.iter().find(|i| !seen.insert(i.as_str())) {
            return Err(PriceTableError::DuplicateInstrument(dup.clone()));
        }
        Ok(Self {
            instruments,
            rows: BTreeMap::new(),
        })
    }

    /// Adds one day of closing prices, aligned with the instrument columns.
    pub fn insert_row(
        &mut self,
        date: NaiveDate,
        prices: Vec<f64>,
    ) -> Result<(), PriceTableError> {
        if prices.len() != self.instruments.len() {
            return Err(PriceTableError::RowWidth {
                date,
                found: prices.len(),
                expected: self.instruments.len(),
            });
        }
        if let Some((idx, price)) = prices
            .iter()
            .enumerate()
            .find(|(_, p)| !p.is_finite() || **p <= 0.0)
        {
            return Err(PriceTableError::InvalidPrice {
                date,
                instrument: self.instruments[idx].clone(),
                price: *price,
            });
        }
        if self.rows.contains_key(&date) {
            return Err(PriceTableError::DuplicateDate(date));
        }
        self.rows.insert(date, prices);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    #[cfg(test)]
    pub(crate) fn first_date(&self) -> Option<NaiveDate> {
        self.rows.keys().next().copied()
    }

    #[cfg(test)]
    pub(crate) fn last_date(&self) -> Option<NaiveDate> {
        self.rows.keys().next_back().copied()
    }
}

impl PriceStore for PriceTable {
    fn instruments(&self) -> &[String] {
        &self.instruments
    }

    fn row(&self, date: NaiveDate) -> Option<&[f64]> {
        self.rows.get(&date).map(Vec::as_slice)
    }

    fn dates_between(&self, start: NaiveDate, end: NaiveDate) -> Vec<NaiveDate> {
        if start > end {
            return Vec::new();
        }
        self.rows.range(start..=end).map(|(date, _)| *date).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn sample_table() -> PriceTable {
        let mut table = PriceTable::new(vec!["A".into(), "B".into(), "C".into()]).unwrap();
        table
            .insert_row(date(2020, 1, 2), vec![11.0, 9.0, 7.0])
            .unwrap();
        table
            .insert_row(date(2020, 1, 1), vec![10.0, 8.0, 6.0])
            .unwrap();
        table
    }

    #[test]
    fn test_rows_are_kept_in_date_order() {
        let table = sample_table();
        assert_eq!(table.len(), 2);
        assert_eq!(table.first_date(), Some(date(2020, 1, 1)));
        assert_eq!(table.last_date(), Some(date(2020, 1, 2)));
        assert_eq!(
            table.dates_between(date(2019, 1, 1), date(2021, 1, 1)),
            vec![date(2020, 1, 1), date(2020, 1, 2)]
        );
        assert!(
            table
                .dates_between(date(2020, 1, 2), date(2020, 1, 1))
                .is_empty()
        );
    }

    #[test]
    fn test_price_lookup() {
        let table = sample_table();
        assert_eq!(table.price(date(2020, 1, 2), "B"), Ok(9.0));
        assert_eq!(
            table.price(date(2020, 1, 2), "Z"),
            Err(IndexError::missing_price(date(2020, 1, 2), "Z"))
        );
        assert_eq!(
            table.price(date(2020, 1, 3), "A"),
            Err(IndexError::MissingDate {
                date: date(2020, 1, 3)
            })
        );
    }

    #[test]
    fn test_insert_row_rejects_bad_rows() {
        let mut table = sample_table();

        let err = table
            .insert_row(date(2020, 1, 1), vec![1.0, 2.0, 3.0])
            .unwrap_err();
        assert_eq!(err, PriceTableError::DuplicateDate(date(2020, 1, 1)));

        let err = table.insert_row(date(2020, 1, 3), vec![1.0]).unwrap_err();
        assert_eq!(
            err,
            PriceTableError::RowWidth {
                date: date(2020, 1, 3),
                found: 1,
                expected: 3
            }
        );

        let err = table
            .insert_row(date(2020, 1, 3), vec![1.0, 0.0, 3.0])
            .unwrap_err();
        assert!(matches!(
            err,
            PriceTableError::InvalidPrice { ref instrument, .. } if instrument == "B"
        ));

        let err = table
            .insert_row(date(2020, 1, 3), vec![f64::NAN, 1.0, 3.0])
            .unwrap_err();
        assert!(err.to_string().contains("positive"));
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn test_instruments_must_be_distinct() {
        let err = PriceTable::new(vec!["A".into(), "B".into(), "A".into()]).unwrap_err();
        assert_eq!(err, PriceTableError::DuplicateInstrument("A".to_string()));

        let table = PriceTable::new(vec!["A".into(), "A.1".into(), "B".into()]).unwrap();
        assert_eq!(table.instruments().len(), 3);
    }
}
