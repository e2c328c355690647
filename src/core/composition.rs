//! Constituent selection and the fixed-weight blended return.

use crate::core::error::IndexError;
use crate::core::price::PriceStore;
use chrono::NaiveDate;
use std::fmt::Display;

/// Weights applied to the rank 1, 2 and 3 constituents.
pub const WEIGHTS: [f64; 3] = [0.5, 0.25, 0.25];

/// Three distinct instruments ranked by their selection-date price.
#[derive(Debug, Clone, PartialEq)]
pub struct Composition {
    members: [String; 3],
    selected_on: NaiveDate,
}

impl Composition {
    pub fn members(&self) -> &[String; 3] {
        &self.members
    }

    pub fn selected_on(&self) -> NaiveDate {
        self.selected_on
    }
}

impl Display for Composition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}]", self.members.join(", "))
    }
}

/// Ranks every instrument by its price on `date` and keeps the top three.
///
/// Equal prices keep the store's column order.
pub fn rank_top<S: PriceStore + ?Sized>(store: &S, date: NaiveDate) -> Result<Composition, IndexError> {
    let row = store.row(date).ok_or(IndexError::MissingDate { date })?;
    let instruments = store.instruments();
    if instruments.len() < 3 {
        return Err(IndexError::TooFewInstruments {
            found: instruments.len(),
        });
    }

    let mut ranked: Vec<(&String, f64)> = instruments.iter().zip(row.iter().copied()).collect();
    // sort_by is stable, so ties stay in column order
    ranked.sort_by(|a, b| b.1.total_cmp(&a.1));

    let members = [
        ranked[0].0.clone(),
        ranked[1].0.clone(),
        ranked[2].0.clone(),
    ];
    Ok(Composition {
        members,
        selected_on: date,
    })
}

/// Fixed-weight combination of each constituent's price ratio.
pub fn blended_return(base: &[f64; 3], current: &[f64; 3]) -> f64 {
    let ratios = [
        current[0] / base[0],
        current[1] / base[1],
        current[2] / base[2],
    ];
    WEIGHTS[0] * ratios[0] + WEIGHTS[1] * ratios[1] + WEIGHTS[2] * ratios[2]
}
