//! Export abstraction for calculated series

use crate::core::series::IndexSeries;
use anyhow::Result;
use std::path::Path;

pub trait Exporter {
    fn export(&self, series: &IndexSeries, destination: &Path) -> Result<()>;
}
