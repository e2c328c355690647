//! Holds a price store together with its most recent calculation.
use crate::core::calculator::{CalculationRun, IndexCalculator};
use crate::core::error::IndexError;
use crate::core::export::Exporter;
use crate::core::price::PriceStore;
use crate::core::series::IndexSeries;
use anyhow::Result;
use chrono::NaiveDate;
use std::path::Path;
use tracing::info;

pub struct IndexModel<S: PriceStore> {
    store: S,
    run: Option<CalculationRun>,
}

impl<S: PriceStore> IndexModel<S> {
    pub fn new(store: S) -> Self {
        Self { store, run: None }
    }

    /// Calculates the index over `[start, end]`, replacing any earlier result.
    ///
    /// A failed calculation leaves the model without a series.
    pub fn calc_index_level(
        &mut self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<&IndexSeries, IndexError> {
        self.run = None;
        let run = IndexCalculator::new(&self.store).run(start, end)?;
        Ok(&self.run.insert(run).series)
    }

    pub fn series(&self) -> Option<&IndexSeries> {
        self.run.as_ref().map(|run| &run.series)
    }

    pub fn run(&self) -> Option<&CalculationRun> {
        self.run.as_ref()
    }

    pub fn export_values(&self, exporter: &dyn Exporter, destination: &Path) -> Result<()> {
        let series = self.series().ok_or(IndexError::NotCalculated)?;
        info!(
            "Exporting {} index values to {}",
            series.len(),
            destination.display()
        );
        exporter.export(series, destination)
    }
}
