//! Writes calculated index series to CSV or JSON files.

use crate::core::export::Exporter;
use crate::core::series::IndexSeries;
use anyhow::{Context, Result, bail};
use chrono::NaiveDate;
use serde::Serialize;
use std::fs::{self, File};
use std::io::BufWriter;
use std::path::Path;
use tracing::debug;

#[derive(Debug, Serialize)]
struct ExportRow {
    #[serde(rename = "Date")]
    date: NaiveDate,
    #[serde(rename = "Index_Value_Unrounded")]
    unrounded: f64,
    #[serde(rename = "Index_Value_Rounded")]
    rounded: f64,
}

fn rows(series: &IndexSeries) -> impl Iterator<Item = ExportRow> + '_ {
    series.iter().map(|(date, point)| ExportRow {
        date,
        unrounded: point.unrounded,
        rounded: point.rounded,
    })
}

fn create_file(destination: &Path) -> Result<File> {
    if let Some(parent) = destination.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }
    File::create(destination)
        .with_context(|| format!("Failed to create export file: {}", destination.display()))
}

/// One row per date, columns `Date`, `Index_Value_Unrounded`, `Index_Value_Rounded`.
pub struct CsvExporter;

impl Exporter for CsvExporter {
    fn export(&self, series: &IndexSeries, destination: &Path) -> Result<()> {
        let mut writer = csv::Writer::from_writer(create_file(destination)?);
        for row in rows(series) {
            writer.serialize(&row)?;
        }
        writer
            .flush()
            .with_context(|| format!("Failed to write {}", destination.display()))?;
        debug!("Wrote {} CSV rows", series.len());
        Ok(())
    }
}

/// An array of objects keyed like the CSV columns.
pub struct JsonExporter;

impl Exporter for JsonExporter {
    fn export(&self, series: &IndexSeries, destination: &Path) -> Result<()> {
        let writer = BufWriter::new(create_file(destination)?);
        let rows: Vec<ExportRow> = rows(series).collect();
        serde_json::to_writer_pretty(writer, &rows)
            .with_context(|| format!("Failed to write {}", destination.display()))?;
        debug!("Wrote {} JSON rows", rows.len());
        Ok(())
    }
}

/// Picks an exporter from the destination's extension, CSV when absent.
pub fn exporter_for_path(destination: &Path) -> Result<Box<dyn Exporter>> {
    let extension = destination
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);
    match extension.as_deref() {
        None | Some("csv") => Ok(Box::new(CsvExporter)),
        Some("json") => Ok(Box::new(JsonExporter)),
        Some(other) => bail!("Unsupported export format: .{other}"),
    }
}
