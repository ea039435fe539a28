//! Trailing-average cost series for trend plots.

use crate::domain::CostedReading;

/// Replace each record's costs with the mean over the record and up to
/// `window - 1` records before it. Fewer records are averaged at the start of
/// the series. Everything except the cost fields is carried through.
pub fn smoothed(series: &[CostedReading], window: usize) -> Vec<CostedReading> {
    let window = window.max(1);
    series
        .iter()
        .enumerate()
        .map(|(i, r)| {
            let trailing = &series[(i + 1).saturating_sub(window)..=i];
            let n = trailing.len() as f64;
            let gas_cost = trailing.iter().map(|t| t.gas_cost).sum::<f64>() / n;
            let elec_cost = trailing.iter().map(|t| t.elec_cost).sum::<f64>() / n;
            CostedReading {
                gas_cost,
                elec_cost,
                total_cost: gas_cost + elec_cost,
                ..*r
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::test_support::series;
    use chrono::NaiveDate;

    fn start() -> NaiveDate {
        NaiveDate::from_ymd_opt(2023, 1, 1).unwrap()
    }

    #[test]
    fn short_prefix_uses_available_records() {
        let s = series(start(), 5);
        let out = smoothed(&s, 30);
        assert_eq!(out[0].gas_cost, s[0].gas_cost);
        let mean3 = (s[0].gas_cost + s[1].gas_cost + s[2].gas_cost) / 3.0;
        assert!((out[2].gas_cost - mean3).abs() < 1e-12);
    }

    #[test]
    fn window_caps_the_average() {
        let s = series(start(), 40);
        let out = smoothed(&s, 30);
        let expected = s[10..=39].iter().map(|r| r.elec_cost).sum::<f64>() / 30.0;
        assert!((out[39].elec_cost - expected).abs() < 1e-12);
    }

    #[test]
    fn non_cost_fields_carried_through() {
        let s = series(start(), 12);
        for (orig, smooth) in s.iter().zip(smoothed(&s, 30)) {
            assert_eq!(orig.date, smooth.date);
            assert_eq!(orig.gas_meter, smooth.gas_meter);
            assert_eq!(orig.elec_used, smooth.elec_used);
            assert_eq!(orig.interpolated, smooth.interpolated);
            assert_eq!(orig.rates, smooth.rates);
            assert_eq!(smooth.total_cost, smooth.gas_cost + smooth.elec_cost);
        }
    }

    #[test]
    fn window_of_one_is_identity_on_costs() {
        let s = series(start(), 6);
        let out = smoothed(&s, 1);
        for (a, b) in s.iter().zip(&out) {
            assert_eq!(a.gas_cost, b.gas_cost);
            assert_eq!(a.elec_cost, b.elec_cost);
        }
    }
}
