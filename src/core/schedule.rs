//! Calendar rules used to place reselection events.

use chrono::{Datelike, Days, NaiveDate, Weekday};
use std::collections::BTreeMap;
use std::fmt::Display;

/// A calendar month, ordered chronologically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd)]
pub struct YearMonth {
    pub year: i32,
    pub month: u32,
}

impl YearMonth {
    pub fn new(year: i32, month: u32) -> Self {
        debug_assert!((1..=12).contains(&month));
        Self { year, month }
    }

    pub fn of(date: NaiveDate) -> Self {
        Self::new(date.year(), date.month())
    }

    /// Steps back `months` calendar months, rolling over year boundaries.
    pub fn minus(self, months: u32) -> Self {
        let index = self.year * 12 + self.month as i32 - 1 - months as i32;
        Self::new(index.div_euclid(12), index.rem_euclid(12) as u32 + 1)
    }

    pub fn prev(self) -> Self {
        self.minus(1)
    }

    pub fn next(self) -> Self {
        if self.month == 12 {
            Self::new(self.year + 1, 1)
        } else {
            Self::new(self.year, self.month + 1)
        }
    }

    pub fn first_day(self) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(self.year, self.month, 1)
    }

    /// Last Monday-Friday date of the month, regardless of which dates are priced.
    pub fn last_weekday(self) -> Option<NaiveDate> {
        let mut day = self.next().first_day()?.checked_sub_days(Days::new(1))?;
        while !is_weekday(day) {
            day = day.pred_opt()?;
        }
        Some(day)
    }
}

impl Display for YearMonth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

pub fn is_weekday(date: NaiveDate) -> bool {
    !matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

pub fn last_weekday(year: i32, month: u32) -> Option<NaiveDate> {
    YearMonth::new(year, month).last_weekday()
}

/// First and second priced weekday of a month.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonthAnchors {
    pub first: NaiveDate,
    pub second: Option<NaiveDate>,
}

/// Priced weekdays of the requested range, grouped by month.
#[derive(Debug, Default)]
pub struct TradingCalendar {
    months: BTreeMap<YearMonth, MonthAnchors>,
}

impl TradingCalendar {
    /// Builds the calendar from ascending dates. Weekend dates are ignored.
    pub fn from_dates(dates: &[NaiveDate]) -> Self {
        let mut months: BTreeMap<YearMonth, MonthAnchors> = BTreeMap::new();
        for &date in dates.iter().filter(|d| is_weekday(**d)) {
            months
                .entry(YearMonth::of(date))
                .and_modify(|anchors| {
                    if anchors.second.is_none() && date > anchors.first {
                        anchors.second = Some(date);
                    }
                })
                .or_insert(MonthAnchors {
                    first: date,
                    second: None,
                });
        }
        Self { months }
    }

    pub fn anchors(&self, month: YearMonth) -> Option<MonthAnchors> {
        self.months.get(&month).copied()
    }

    pub fn first_weekday(&self, month: YearMonth) -> Option<NaiveDate> {
        self.anchors(month).map(|a| a.first)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_month_arithmetic_rolls_over_years() {
        let jan = YearMonth::new(2020, 1);
        assert_eq!(jan.prev(), YearMonth::new(2019, 12));
        assert_eq!(jan.minus(2), YearMonth::new(2019, 11));
        assert_eq!(YearMonth::new(2020, 3).minus(2), YearMonth::new(2020, 1));
        assert_eq!(YearMonth::new(2019, 12).next(), jan);
        assert_eq!(jan.minus(13), YearMonth::new(2018, 12));
        assert_eq!(jan.to_string(), "2020-01");
    }

    #[test]
    fn test_last_weekday_skips_weekends() {
        // 2020-02-29 is a Saturday
        assert_eq!(last_weekday(2020, 2), Some(date(2020, 2, 28)));
        // 2020-05-31 is a Sunday
        assert_eq!(last_weekday(2020, 5), Some(date(2020, 5, 29)));
        assert_eq!(last_weekday(2019, 12), Some(date(2019, 12, 31)));
        assert_eq!(last_weekday(2020, 1), Some(date(2020, 1, 31)));
    }

    #[test]
    fn test_calendar_picks_first_two_priced_weekdays() {
        let dates = vec![
            date(2020, 2, 1), // Saturday
            date(2020, 2, 3),
            date(2020, 2, 4),
            date(2020, 2, 5),
            date(2020, 3, 1), // Sunday
            date(2020, 3, 2),
            date(2020, 4, 1),
        ];
        let calendar = TradingCalendar::from_dates(&dates);

        let feb = calendar.anchors(YearMonth::new(2020, 2)).unwrap();
        assert_eq!(feb.first, date(2020, 2, 3));
        assert_eq!(feb.second, Some(date(2020, 2, 4)));

        assert_eq!(
            calendar.first_weekday(YearMonth::new(2020, 3)),
            Some(date(2020, 3, 2))
        );
        assert_eq!(calendar.anchors(YearMonth::new(2020, 3)).unwrap().second, None);
        assert_eq!(calendar.anchors(YearMonth::new(2020, 4)).unwrap().second, None);
        assert!(calendar.anchors(YearMonth::new(2020, 5)).is_none());
    }
}
