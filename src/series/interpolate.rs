//! Gap filling between real readings.
//!
//! For two consecutive readings `prev` and `next` that are `g + 1` days apart,
//! the `j`-th missing day (`1 <= j <= g`) gets
//!
//! `value = prev + (next - prev) * j / (g + 1)`
//!
//! for both meters. The result has exactly one record per calendar day
//! between the first and last reading.

use tracing::info;

use crate::domain::{InterpolatedReading, RawReading};

/// Fill every calendar-day gap in `readings`.
///
/// `readings` must be sorted by date with unique dates (as produced by
/// `ReadingSeries::finalize`). Fewer than two readings pass through as-is.
pub fn interpolate(readings: &[RawReading]) -> Vec<InterpolatedReading> {
    let mut out = Vec::with_capacity(expected_len(readings));

    let Some(first) = readings.first() else {
        return out;
    };
    out.push(InterpolatedReading::measured(*first));

    let mut synthesized = 0usize;
    for pair in readings.windows(2) {
        let (prev, next) = (&pair[0], &pair[1]);
        let gap = (next.date - prev.date).num_days() - 1;
        for j in 1..=gap.max(0) {
            out.push(InterpolatedReading::synthetic(between(prev, next, j, gap + 1)));
            synthesized += 1;
        }
        out.push(InterpolatedReading::measured(*next));
    }

    if synthesized > 0 {
        info!(
            measured = readings.len(),
            synthesized,
            "filled gaps between readings"
        );
    }

    out
}

/// Reading `step` days after `prev` on the straight line to `next`, where the
/// two are `span` days apart.
fn between(prev: &RawReading, next: &RawReading, step: i64, span: i64) -> RawReading {
    let step_f = step as f64;
    let span_f = span as f64;
    RawReading {
        date: prev.date + chrono::Duration::days(step),
        gas_meter: prev.gas_meter + ((next.gas_meter - prev.gas_meter) / span_f) * step_f,
        elec_meter: prev.elec_meter + ((next.elec_meter - prev.elec_meter) / span_f) * step_f,
    }
}

fn expected_len(readings: &[RawReading]) -> usize {
    match (readings.first(), readings.last()) {
        (Some(first), Some(last)) => ((last.date - first.date).num_days().max(0) as usize) + 1,
        _ => 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn reading(day: u32, gas: f64, elec: f64) -> RawReading {
        RawReading {
            date: NaiveDate::from_ymd_opt(2023, 1, day).unwrap(),
            gas_meter: gas,
            elec_meter: elec,
        }
    }

    fn raw(series: &[InterpolatedReading]) -> Vec<RawReading> {
        series.iter().map(|r| r.reading).collect()
    }

    #[test]
    fn midpoint_of_four_day_gap() {
        let out = interpolate(&[reading(1, 100.0, 0.0), reading(5, 140.0, 8.0)]);
        assert_eq!(out.len(), 5);

        let day3 = out[2];
        assert_eq!(day3.date(), NaiveDate::from_ymd_opt(2023, 1, 3).unwrap());
        assert!(day3.interpolated);
        assert!((day3.reading.gas_meter - 120.0).abs() < 1e-9);
        assert!((day3.reading.elec_meter - 4.0).abs() < 1e-9);

        assert!((out[1].reading.gas_meter - 110.0).abs() < 1e-9);
        assert!((out[3].reading.gas_meter - 130.0).abs() < 1e-9);
        assert!(!out[0].interpolated && !out[4].interpolated);
    }

    #[test]
    fn every_day_covered_in_order() {
        let out = interpolate(&[reading(2, 0.0, 0.0), reading(3, 1.0, 1.0), reading(9, 7.0, 7.0)]);
        assert_eq!(out.len(), 8);
        for pair in out.windows(2) {
            assert_eq!((pair[1].date() - pair[0].date()).num_days(), 1);
        }
        assert_eq!(out.iter().filter(|r| r.interpolated).count(), 5);
    }

    #[test]
    fn idempotent_on_gap_free_series() {
        let once = interpolate(&[reading(1, 0.0, 0.0), reading(4, 3.0, 6.0), reading(6, 5.0, 7.0)]);
        let twice = interpolate(&raw(&once));
        assert_eq!(raw(&once), raw(&twice));
        assert!(twice.iter().all(|r| !r.interpolated));
    }

    #[test]
    fn fewer_than_two_readings_pass_through() {
        assert!(interpolate(&[]).is_empty());
        let single = interpolate(&[reading(7, 1.0, 2.0)]);
        assert_eq!(single.len(), 1);
        assert!(!single[0].interpolated);
    }

    #[test]
    fn decreasing_meter_is_interpolated_as_is() {
        let out = interpolate(&[reading(1, 10.0, 0.0), reading(3, 4.0, 0.0)]);
        assert!((out[1].reading.gas_meter - 7.0).abs() < 1e-9);
    }
}
