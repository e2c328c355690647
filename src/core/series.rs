//! The daily index value series produced by a calculation run.

use chrono::NaiveDate;
use std::collections::BTreeMap;

/// Rounds to 2 decimals, half-to-even on the scaled value.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round_ties_even() / 100.0
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IndexPoint {
    pub unrounded: f64,
    pub rounded: f64,
}

impl IndexPoint {
    pub fn new(unrounded: f64) -> Self {
        Self {
            unrounded,
            rounded: round2(unrounded),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct IndexSeries {
    points: BTreeMap<NaiveDate, IndexPoint>,
}

impl IndexSeries {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn insert(&mut self, date: NaiveDate, value: f64) {
        self.points.insert(date, IndexPoint::new(value));
    }

    pub fn get(&self, date: NaiveDate) -> Option<IndexPoint> {
        self.points.get(&date).copied()
    }

    pub fn value(&self, date: NaiveDate) -> Option<f64> {
        self.get(date).map(|p| p.unrounded)
    }

    /// Most recent entry strictly before `date`.
    pub fn latest_before(&self, date: NaiveDate) -> Option<(NaiveDate, IndexPoint)> {
        self.points
            .range(..date)
            .next_back()
            .map(|(d, p)| (*d, *p))
    }

    pub fn iter(&self) -> impl Iterator<Item = (NaiveDate, IndexPoint)> + '_ {
        self.points.iter().map(|(d, p)| (*d, *p))
    }

    #[cfg(test)]
    pub(crate) fn first(&self) -> Option<(NaiveDate, IndexPoint)> {
        self.points.first_key_value().map(|(d, p)| (*d, *p))
    }

    pub fn last(&self) -> Option<(NaiveDate, IndexPoint)> {
        self.points.last_key_value().map(|(d, p)| (*d, *p))
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}
