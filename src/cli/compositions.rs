use super::{RunArgs, ui};
use crate::core::calculator::{ANCHOR_DATE, CalculationRun, EpochSource, INITIAL_LEVEL};
use crate::core::composition::Composition;
use crate::core::config::AppConfig;
use anyhow::Result;
use chrono::NaiveDate;
use comfy_table::{Cell, Table};

fn source_label(source: EpochSource) -> &'static str {
    match source {
        EpochSource::Transition => "launch base",
        EpochSource::FirstWeekday => "first weekday",
        EpochSource::SecondWeekday => "second weekday",
    }
}

fn add_row(
    table: &mut Table,
    label: String,
    composition: &Composition,
    base_date: NaiveDate,
    base_value: f64,
    source: &str,
) {
    let [first, second, third] = composition.members();
    table.add_row(vec![
        Cell::new(label),
        Cell::new(first),
        Cell::new(second),
        Cell::new(third),
        Cell::new(composition.selected_on()),
        Cell::new(base_date),
        ui::level_cell(base_value),
        Cell::new(source),
    ]);
}

pub fn compositions_table(run: &CalculationRun) -> Table {
    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell("Month"),
        ui::header_cell("Rank 1 (50%)"),
        ui::header_cell("Rank 2 (25%)"),
        ui::header_cell("Rank 3 (25%)"),
        ui::header_cell("Ranked on"),
        ui::header_cell("Base date"),
        ui::header_cell("Base level"),
        ui::header_cell("Set by"),
    ]);

    add_row(
        &mut table,
        "Launch".to_string(),
        &run.initial_composition,
        ANCHOR_DATE,
        INITIAL_LEVEL,
        "initial ranking",
    );
    for (month, epoch) in &run.epochs {
        add_row(
            &mut table,
            month.to_string(),
            &epoch.composition,
            epoch.base_date,
            epoch.base_value,
            source_label(epoch.source),
        );
    }
    table
}

pub fn display_compositions(run: &CalculationRun) -> String {
    format!(
        "{}\n\n{}",
        ui::style_text(
            &format!("Compositions from {} to {}", run.start, run.end),
            ui::StyleType::Title
        ),
        compositions_table(run)
    )
}

pub fn run(config: &AppConfig, args: &RunArgs) -> Result<()> {
    let model = args.calculate(config)?;
    if let Some(run) = model.run() {
        println!("{}", display_compositions(run));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::calculator::tests::{Fixture, date};
    use crate::core::calculator::IndexCalculator;

    #[test]
    fn test_display_compositions() {
        let table = Fixture::flat()
            .set(date(2020, 1, 31), "D", 100.0)
            .build();
        let run = IndexCalculator::new(&table)
            .run(date(2020, 1, 1), date(2020, 3, 31))
            .unwrap();

        let mut table = compositions_table(&run);
        let output = table.force_no_tty().to_string();
        assert!(output.contains("Launch"));
        assert!(output.contains("2020-02"));
        assert!(output.contains("2020-03"));
        assert!(output.contains("second weekday"));
        assert!(output.contains("2020-01-31"));

        let output = display_compositions(&run);
        assert!(output.contains("Compositions from 2020-01-01 to 2020-03-31"));
    }
}
