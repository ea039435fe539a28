//! Average usage and cost per day of the week.

use chrono::{Datelike, NaiveDate, Weekday};
use serde::Serialize;

use super::Totals;
use crate::domain::CostedReading;

const WEEK: [Weekday; 7] = [
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
    Weekday::Sat,
    Weekday::Sun,
];

/// Mean daily figures for one ISO weekday.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeekdayAverage {
    pub weekday: Weekday,
    /// Number of days averaged; all means are zero when this is zero.
    pub samples: usize,
    pub gas_used: f64,
    pub elec_used: f64,
    pub gas_cost: f64,
    pub elec_cost: f64,
    pub total_cost: f64,
}

impl WeekdayAverage {
    /// ISO number, Monday = 1 .. Sunday = 7.
    pub fn iso_number(&self) -> u32 {
        self.weekday.number_from_monday()
    }

    fn from_totals(weekday: Weekday, t: &Totals) -> Self {
        let n = t.days as f64;
        let mean = |v: f64| if t.days == 0 { 0.0 } else { v / n };
        Self {
            weekday,
            samples: t.days,
            gas_used: mean(t.gas_used),
            elec_used: mean(t.elec_used),
            gas_cost: mean(t.gas_cost),
            elec_cost: mean(t.elec_cost),
            total_cost: mean(t.total_cost),
        }
    }
}

/// Seven rows, Monday first, averaging records strictly after `since`
/// (every record when `since` is `None`).
pub fn by_weekday(series: &[CostedReading], since: Option<NaiveDate>) -> Vec<WeekdayAverage> {
    let mut totals = [Totals::default(); 7];
    for r in series.iter().filter(|r| since.is_none_or(|cutover| r.date > cutover)) {
        totals[r.date.weekday().num_days_from_monday() as usize].add(r);
    }

    WEEK.iter()
        .zip(totals.iter())
        .map(|(weekday, t)| WeekdayAverage::from_totals(*weekday, t))
        .collect()
}
