use super::{RunArgs, ui};
use crate::core::config::AppConfig;
use crate::core::schedule::YearMonth;
use crate::core::series::IndexSeries;
use crate::store::export::exporter_for_path;
use anyhow::Result;
use comfy_table::Cell;
use std::collections::BTreeMap;
use tracing::info;

#[derive(Debug, Clone, PartialEq)]
pub struct MonthSummary {
    pub month: YearMonth,
    pub days: usize,
    pub close: f64,
    pub change_pct: Option<f64>,
}

/// Month-end levels and their change over the previous month-end.
pub fn monthly_summary(series: &IndexSeries) -> Vec<MonthSummary> {
    let mut months: BTreeMap<YearMonth, (usize, f64)> = BTreeMap::new();
    for (date, point) in series.iter() {
        let entry = months.entry(YearMonth::of(date)).or_insert((0, 0.0));
        entry.0 += 1;
        entry.1 = point.unrounded;
    }

    let mut previous: Option<f64> = None;
    months
        .into_iter()
        .map(|(month, (days, close))| {
            let change_pct = previous.map(|p| (close / p - 1.0) * 100.0);
            previous = Some(close);
            MonthSummary {
                month,
                days,
                close,
                change_pct,
            }
        })
        .collect()
}

pub fn display_summary(series: &IndexSeries) -> String {
    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell("Month"),
        ui::header_cell("Days"),
        ui::header_cell("Month-end level"),
        ui::header_cell("Change (%)"),
    ]);

    for summary in monthly_summary(series) {
        table.add_row(vec![
            Cell::new(summary.month.to_string()),
            Cell::new(summary.days),
            ui::level_cell(summary.close),
            ui::format_optional_cell(summary.change_pct, ui::change_cell),
        ]);
    }

    let mut output = format!("{}\n\n", ui::style_text("Index levels", ui::StyleType::Title));
    output.push_str(&table.to_string());

    if let Some((date, point)) = series.last() {
        output.push_str(&format!(
            "\n\nLevel on {}: {}",
            ui::style_text(&date.to_string(), ui::StyleType::TotalLabel),
            ui::style_text(&format!("{:.2}", point.rounded), ui::StyleType::TotalValue)
        ));
    }
    output
}

pub fn run(config: &AppConfig, args: &RunArgs) -> Result<()> {
    let model = args.calculate(config)?;

    let output = args.output_path(config);
    let exporter = exporter_for_path(&output)?;
    model.export_values(exporter.as_ref(), &output)?;
    info!("Exported index values to {}", output.display());

    if let Some(series) = model.series() {
        println!("{}", display_summary(series));
        println!(
            "{}",
            ui::style_text(
                &format!("Wrote {} values to {}", series.len(), output.display()),
                ui::StyleType::Subtle
            )
        );
    }
    Ok(())
}
