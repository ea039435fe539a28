//! Calendar-period views: weeks, months and years.

use chrono::{Datelike, Duration, NaiveDate};
use serde::Serialize;

use super::Totals;
use crate::domain::CostedReading;

/// One Monday-anchored window.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeekTotals {
    /// Monday starting the window.
    pub week_start: NaiveDate,
    /// Last date present in the window (the Sunday for a full week).
    pub last_date: NaiveDate,
    pub totals: Totals,
}

impl WeekTotals {
    /// `false` for a trailing window with fewer than 7 days.
    pub fn is_full(&self) -> bool {
        self.totals.days == 7
    }
}

/// One calendar month.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthTotals {
    pub year: i32,
    pub month: u32,
    pub first_date: NaiveDate,
    pub last_date: NaiveDate,
    pub totals: Totals,
}

/// A record with its day-of-year, for lining years up against each other.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct YearDay {
    pub day_of_year: u32,
    pub record: CostedReading,
}

/// All records of one calendar year.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct YearSlice {
    pub year: i32,
    pub days: Vec<YearDay>,
    pub totals: Totals,
}

/// First Monday on or after `date`.
pub fn first_monday_on_or_after(date: NaiveDate) -> NaiveDate {
    let from_monday = i64::from(date.weekday().num_days_from_monday());
    date + Duration::days((7 - from_monday) % 7)
}

/// Sum usage and cost per week.
///
/// Windows start at the first Monday on/after the series start; days before
/// it are dropped. The last window may hold fewer than 7 days.
pub fn weekly(series: &[CostedReading]) -> Vec<WeekTotals> {
    let Some(first) = series.first() else {
        return Vec::new();
    };
    let anchor = first_monday_on_or_after(first.date);

    let mut out: Vec<WeekTotals> = Vec::new();
    for r in series.iter().filter(|r| r.date >= anchor) {
        let week = (r.date - anchor).num_days() / 7;
        let week_start = anchor + Duration::days(week * 7);
        match out.last_mut() {
            Some(w) if w.week_start == week_start => {
                w.totals.add(r);
                w.last_date = r.date;
            }
            _ => {
                let mut totals = Totals::default();
                totals.add(r);
                out.push(WeekTotals {
                    week_start,
                    last_date: r.date,
                    totals,
                });
            }
        }
    }
    out
}

/// Sum usage and cost per calendar month.
pub fn monthly(series: &[CostedReading]) -> Vec<MonthTotals> {
    let mut out: Vec<MonthTotals> = Vec::new();
    for r in series {
        let (year, month) = (r.date.year(), r.date.month());
        match out.last_mut() {
            Some(m) if m.year == year && m.month == month => {
                m.totals.add(r);
                m.last_date = r.date;
            }
            _ => {
                let mut totals = Totals::default();
                totals.add(r);
                out.push(MonthTotals {
                    year,
                    month,
                    first_date: r.date,
                    last_date: r.date,
                    totals,
                });
            }
        }
    }
    out
}

/// Split the series into calendar years.
pub fn yearly(series: &[CostedReading]) -> Vec<YearSlice> {
    let mut out: Vec<YearSlice> = Vec::new();
    for r in series {
        let year = r.date.year();
        let day = YearDay {
            day_of_year: r.date.ordinal(),
            record: *r,
        };
        match out.last_mut() {
            Some(slice) if slice.year == year => {
                slice.totals.add(r);
                slice.days.push(day);
            }
            _ => {
                let mut totals = Totals::default();
                totals.add(r);
                out.push(YearSlice {
                    year,
                    days: vec![day],
                    totals,
                });
            }
        }
    }
    out
}
