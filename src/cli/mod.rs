pub mod calculate;
pub mod compositions;
pub mod setup;
pub mod ui;

use crate::core::config::AppConfig;
use crate::core::{IndexModel, PriceTable};
use crate::store::prices::load_price_table;
use anyhow::{Context, Result};
use chrono::NaiveDate;
use std::path::PathBuf;

/// Inputs shared by the commands that run a calculation. Unset fields fall
/// back to the configuration file.
#[derive(Debug, Clone, Default)]
pub struct RunArgs {
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
    pub prices: Option<PathBuf>,
    pub output: Option<PathBuf>,
}

impl RunArgs {
    pub fn date_range(&self, config: &AppConfig) -> Result<(NaiveDate, NaiveDate)> {
        let start = self
            .start
            .or(config.calculation.start_date)
            .context("No start date given on the command line or in the config")?;
        let end = self
            .end
            .or(config.calculation.end_date)
            .context("No end date given on the command line or in the config")?;
        if start > end {
            anyhow::bail!("Start date {start} is after end date {end}");
        }
        Ok((start, end))
    }

    pub fn prices_path(&self, config: &AppConfig) -> PathBuf {
        self.prices
            .clone()
            .unwrap_or_else(|| config.prices_path())
    }

    pub fn output_path(&self, config: &AppConfig) -> PathBuf {
        self.output
            .clone()
            .unwrap_or_else(|| config.export_path())
    }

    /// Loads the price table and runs the calculation over the resolved range.
    pub fn calculate(&self, config: &AppConfig) -> Result<IndexModel<PriceTable>> {
        let (start, end) = self.date_range(config)?;
        let prices_path = self.prices_path(config);
        let table = load_price_table(&prices_path, &config.prices.date_format)
            .with_context(|| format!("Failed to load prices from {}", prices_path.display()))?;

        let mut model = IndexModel::new(table);
        model
            .calc_index_level(start, end)
            .with_context(|| format!("Failed to calculate index from {start} to {end}"))?;
        Ok(model)
    }
}
