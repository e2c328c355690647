//! The rebalancing and compounding state machine.
//!
//! Dates are scanned in ascending order. Each date is classified into a
//! [`DayKind`], which decides which base prices and base index value its
//! blended return compounds onto. Later days may look up values computed
//! earlier in the same run, so the scan is strictly sequential.

use crate::core::composition::{Composition, blended_return, rank_top};
use crate::core::error::IndexError;
use crate::core::price::PriceStore;
use crate::core::schedule::{MonthAnchors, TradingCalendar, YearMonth};
use crate::core::series::IndexSeries;
use chrono::NaiveDate;
use std::collections::{BTreeMap, HashMap};
use std::fmt::Display;
use tracing::{debug, info};

const fn ymd(year: i32, month: u32, day: u32) -> NaiveDate {
    match NaiveDate::from_ymd_opt(year, month, day) {
        Some(date) => date,
        None => panic!("invalid calendar constant"),
    }
}

/// Starting level of the index.
pub const INITIAL_LEVEL: f64 = 100.0;
/// Date the index is launched at [`INITIAL_LEVEL`].
pub const ANCHOR_DATE: NaiveDate = ymd(2020, 1, 1);
/// Ranking snapshot for the launch composition.
pub const INITIAL_SELECTION_DATE: NaiveDate = ymd(2019, 12, 31);
/// Last date priced against the launch base.
pub const EARLY_CUTOFF: NaiveDate = ymd(2020, 1, 31);
/// First trading day of February 2020, priced against the launch base.
pub const TRANSITION_DATE: NaiveDate = ymd(2020, 2, 3);

/// Rule applied to a date during the scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DayKind {
    Anchor,
    Early,
    Transition,
    FirstWeekday,
    SecondWeekday,
    Ordinary,
    CarryForward,
}

impl Display for DayKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                DayKind::Anchor => "anchor",
                DayKind::Early => "early",
                DayKind::Transition => "transition",
                DayKind::FirstWeekday => "first-weekday",
                DayKind::SecondWeekday => "second-weekday",
                DayKind::Ordinary => "ordinary",
                DayKind::CarryForward => "carry-forward",
            }
        )
    }
}

/// Rule that produced a month's current base.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EpochSource {
    Transition,
    FirstWeekday,
    SecondWeekday,
}

/// Base prices and base index value shared by the days of one month.
#[derive(Debug, Clone, PartialEq)]
pub struct RebalanceEpoch {
    pub composition: Composition,
    pub base_date: NaiveDate,
    pub base_prices: [f64; 3],
    pub base_value: f64,
    pub source: EpochSource,
}

/// Everything one calculation run produced.
#[derive(Debug, Clone, PartialEq)]
pub struct CalculationRun {
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub series: IndexSeries,
    pub kinds: BTreeMap<NaiveDate, DayKind>,
    pub initial_composition: Composition,
    /// Compositions picked at reselection events, keyed by month.
    pub compositions: BTreeMap<YearMonth, Composition>,
    /// The base each month ended the run with.
    pub epochs: BTreeMap<YearMonth, RebalanceEpoch>,
}

/// Mutable state of one run, threaded through the date scan.
struct RunContext {
    series: IndexSeries,
    kinds: BTreeMap<NaiveDate, DayKind>,
    epochs: HashMap<YearMonth, RebalanceEpoch>,
    compositions: BTreeMap<YearMonth, Composition>,
}

impl RunContext {
    fn new() -> Self {
        Self {
            series: IndexSeries::new(),
            kinds: BTreeMap::new(),
            epochs: HashMap::new(),
            compositions: BTreeMap::new(),
        }
    }

    fn value_at(&self, date: NaiveDate) -> Result<f64, IndexError> {
        self.series
            .value(date)
            .ok_or(IndexError::MissingBaseValue { date })
    }
}

/// Decides which rule applies to `date`.
///
/// `anchors` are the month's first and second priced weekdays, and
/// `has_epoch` tells whether the month already has a base.
pub fn classify(date: NaiveDate, anchors: Option<MonthAnchors>, has_epoch: bool) -> DayKind {
    let first = anchors.map(|a| a.first);
    let second = anchors.and_then(|a| a.second);

    if date == ANCHOR_DATE {
        DayKind::Anchor
    } else if date <= EARLY_CUTOFF {
        DayKind::Early
    } else if first == Some(date) && date != TRANSITION_DATE {
        DayKind::FirstWeekday
    } else if date == TRANSITION_DATE {
        DayKind::Transition
    } else if second == Some(date) && date > TRANSITION_DATE {
        DayKind::SecondWeekday
    } else if has_epoch && second.is_some_and(|s| date > s) {
        DayKind::Ordinary
    } else {
        DayKind::CarryForward
    }
}

pub struct IndexCalculator<'a, S: PriceStore + ?Sized> {
    store: &'a S,
}

impl<'a, S: PriceStore + ?Sized> IndexCalculator<'a, S> {
    pub fn new(store: &'a S) -> Self {
        Self { store }
    }

    /// Computes the index level for every priced date in `[start, end]`.
    pub fn calculate(&self, start: NaiveDate, end: NaiveDate) -> Result<IndexSeries, IndexError> {
        self.run(start, end).map(|run| run.series)
    }

    /// Like [`Self::calculate`], also returning compositions and day classes.
    pub fn run(&self, start: NaiveDate, end: NaiveDate) -> Result<CalculationRun, IndexError> {
        let dates = self.store.dates_between(start, end);
        if dates.is_empty() {
            return Err(IndexError::InvalidRange { start, end });
        }
        info!(
            "Calculating index from {start} to {end} over {} priced dates",
            dates.len()
        );

        let calendar = TradingCalendar::from_dates(&dates);
        let initial = rank_top(self.store, INITIAL_SELECTION_DATE)?;
        let anchor_prices = self.store.prices_for(ANCHOR_DATE, &initial)?;
        debug!("Initial composition {initial} selected on {INITIAL_SELECTION_DATE}");

        let mut ctx = RunContext::new();
        for date in dates {
            let month = YearMonth::of(date);
            let anchors = calendar.anchors(month);
            let kind = classify(date, anchors, ctx.epochs.contains_key(&month));

            let value = match kind {
                DayKind::Anchor => INITIAL_LEVEL,
                DayKind::Early => {
                    let current = self.store.prices_for(date, &initial)?;
                    INITIAL_LEVEL * blended_return(&anchor_prices, &current)
                }
                DayKind::Transition => {
                    let current = self.store.prices_for(date, &initial)?;
                    let index_base = ctx.value_at(ANCHOR_DATE)?;
                    let value = index_base * blended_return(&anchor_prices, &current);
                    ctx.epochs.insert(
                        month,
                        RebalanceEpoch {
                            composition: initial.clone(),
                            base_date: ANCHOR_DATE,
                            base_prices: anchor_prices,
                            base_value: value,
                            source: EpochSource::Transition,
                        },
                    );
                    value
                }
                DayKind::FirstWeekday => self.first_weekday(&mut ctx, &calendar, date, month)?,
                DayKind::SecondWeekday => {
                    // A second weekday only exists when the first one does.
                    let base_date = anchors
                        .map(|a| a.first)
                        .ok_or(IndexError::MissingTradingDay(month))?;
                    self.second_weekday(&mut ctx, base_date, date, month)?
                }
                DayKind::Ordinary => {
                    let epoch = ctx
                        .epochs
                        .get(&month)
                        .ok_or(IndexError::MissingBaseValue { date })?;
                    let current = self.store.prices_for(date, &epoch.composition)?;
                    epoch.base_value * blended_return(&epoch.base_prices, &current)
                }
                DayKind::CarryForward => ctx
                    .series
                    .latest_before(date)
                    .map(|(_, point)| point.unrounded)
                    .ok_or(IndexError::MissingBaseValue { date })?,
            };

            debug!(%date, %kind, value, "Index level computed");
            ctx.series.insert(date, value);
            ctx.kinds.insert(date, kind);
        }

        info!("Calculated {} index values", ctx.series.len());
        Ok(CalculationRun {
            start,
            end,
            series: ctx.series,
            kinds: ctx.kinds,
            initial_composition: initial,
            compositions: ctx.compositions,
            epochs: ctx.epochs.into_iter().collect(),
        })
    }

    /// Reselects on the ranking two months back and compounds from the
    /// previous month's first weekday.
    fn first_weekday(
        &self,
        ctx: &mut RunContext,
        calendar: &TradingCalendar,
        date: NaiveDate,
        month: YearMonth,
    ) -> Result<f64, IndexError> {
        let selection_month = month.minus(2);
        let selection_date = selection_month
            .last_weekday()
            .ok_or(IndexError::MissingTradingDay(selection_month))?;
        let composition = rank_top(self.store, selection_date)?;

        let prev = month.prev();
        let base_date = calendar
            .first_weekday(prev)
            .ok_or(IndexError::MissingTradingDay(prev))?;
        let base_prices = self.store.prices_for(base_date, &composition)?;
        let index_base = ctx.value_at(base_date)?;

        let current = self.store.prices_for(date, &composition)?;
        let value = index_base * blended_return(&base_prices, &current);
        debug!(%month, %composition, %selection_date, %base_date, "First weekday reselection");

        ctx.compositions.insert(month, composition.clone());
        ctx.epochs.insert(
            month,
            RebalanceEpoch {
                composition,
                base_date,
                base_prices,
                base_value: value,
                source: EpochSource::FirstWeekday,
            },
        );
        Ok(value)
    }

    /// Reselects on last month's final weekday and compounds from this
    /// month's first weekday. Replaces the base set by the first weekday.
    fn second_weekday(
        &self,
        ctx: &mut RunContext,
        base_date: NaiveDate,
        date: NaiveDate,
        month: YearMonth,
    ) -> Result<f64, IndexError> {
        let selection_month = month.prev();
        let selection_date = selection_month
            .last_weekday()
            .ok_or(IndexError::MissingTradingDay(selection_month))?;
        let composition = rank_top(self.store, selection_date)?;

        let base_prices = self.store.prices_for(base_date, &composition)?;
        let index_base = ctx.value_at(base_date)?;

        let current = self.store.prices_for(date, &composition)?;
        let value = index_base * blended_return(&base_prices, &current);
        debug!(%month, %composition, %selection_date, %base_date, "Second weekday reselection");

        ctx.compositions.insert(month, composition.clone());
        ctx.epochs.insert(
            month,
            RebalanceEpoch {
                composition,
                base_date,
                base_prices,
                base_value: index_base,
                source: EpochSource::SecondWeekday,
            },
        );
        Ok(value)
    }
}
