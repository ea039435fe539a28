//! Derived views over a costed daily series.
//!
//! Every view is a pure function of `&[CostedReading]`:
//!
//! - daily: the series itself
//! - weekly: Monday-anchored 7-day windows (`periods::weekly`)
//! - per-weekday averages after a cutover date (`weekday::by_weekday`)
//! - calendar-month totals (`periods::monthly`)
//! - one slice per calendar year (`periods::yearly`)
//! - trailing-average costs (`smoothed::smoothed`)
//!
//! Once costing is done the series is immutable, so `build_views` computes the
//! views concurrently on the rayon pool.

use serde::Serialize;
use tracing::info;

use crate::domain::{CostedReading, ViewConfig};

pub mod periods;
pub mod smoothed;
pub mod weekday;

pub use periods::{MonthTotals, WeekTotals, YearDay, YearSlice, monthly, weekly, yearly};
pub use smoothed::smoothed;
pub use weekday::{WeekdayAverage, by_weekday};

/// Summed usage and cost over a set of days.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct Totals {
    pub days: usize,
    pub gas_used: f64,
    pub elec_used: f64,
    pub gas_cost: f64,
    pub elec_cost: f64,
    pub total_cost: f64,
}

impl Totals {
    pub fn add(&mut self, r: &CostedReading) {
        self.days += 1;
        self.gas_used += r.gas_used;
        self.elec_used += r.elec_used;
        self.gas_cost += r.gas_cost;
        self.elec_cost += r.elec_cost;
        self.total_cost += r.total_cost;
    }

    pub fn of<'a>(records: impl IntoIterator<Item = &'a CostedReading>) -> Self {
        let mut t = Self::default();
        for r in records {
            t.add(r);
        }
        t
    }
}

/// Totals over the whole series.
pub fn grand_total(series: &[CostedReading]) -> Totals {
    Totals::of(series)
}

/// Every non-daily view of one run.
#[derive(Debug, Clone)]
pub struct Views {
    pub weekly: Vec<WeekTotals>,
    pub weekday: Vec<WeekdayAverage>,
    pub monthly: Vec<MonthTotals>,
    pub yearly: Vec<YearSlice>,
    pub smoothed: Vec<CostedReading>,
}

/// Compute all views of `series` concurrently.
pub fn build_views(series: &[CostedReading], config: &ViewConfig) -> Views {
    let ((weekly, monthly), ((weekday, yearly), smoothed)) = rayon::join(
        || rayon::join(|| weekly(series), || monthly(series)),
        || {
            rayon::join(
                || rayon::join(|| by_weekday(series, config.weekday_since), || yearly(series)),
                || smoothed(series, config.smoothing_window),
            )
        },
    );

    info!(
        weeks = weekly.len(),
        months = monthly.len(),
        years = yearly.len(),
        "built report views"
    );

    Views {
        weekly,
        weekday,
        monthly,
        yearly,
        smoothed,
    }
}


#[cfg(test)]
mod tests {
    use super::test_support::series;
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn totals_accumulate() {
        let s = series(NaiveDate::from_ymd_opt(2023, 1, 1).unwrap(), 4);
        let t = grand_total(&s);
        assert_eq!(t.days, 4);
        assert!((t.gas_used - 6.0).abs() < 1e-12);
        assert!((t.total_cost - s.iter().map(|r| r.total_cost).sum::<f64>()).abs() < 1e-12);
    }

    #[test]
    fn build_views_matches_individual_views() {
        let s = series(NaiveDate::from_ymd_opt(2023, 12, 20).unwrap(), 40);
        let config = ViewConfig::default();
        let views = build_views(&s, &config);
        assert_eq!(views.weekly, weekly(&s));
        assert_eq!(views.monthly, monthly(&s));
        assert_eq!(views.yearly, yearly(&s));
        assert_eq!(views.weekday, by_weekday(&s, None));
        assert_eq!(views.smoothed, smoothed(&s, config.smoothing_window));
    }

    #[test]
    fn empty_series_yields_empty_views() {
        let views = build_views(&[], &ViewConfig::default());
        assert!(views.weekly.is_empty());
        assert!(views.monthly.is_empty());
        assert!(views.yearly.is_empty());
        assert!(views.smoothed.is_empty());
        assert!(views.weekday.iter().all(|w| w.samples == 0));
    }
}
