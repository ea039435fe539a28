//! Daily usage and cost derivation.
//!
//! Usage is the difference from the previous record (zero for the first).
//! Costs per record:
//!
//! - gas: `tax * (gas_standing + gas_used * gas_unit * gas_factor)`
//! - electricity: `tax * (elec_standing + elec_used * elec_unit)`
//! - total: `gas + electricity`
//!
//! Negative usage (meter replaced, typo in a reading) is passed through
//! unchanged.

use tracing::{debug, info};

use crate::domain::{AppliedRates, CostConfig, CostedReading, InterpolatedReading};
use crate::tariff::TariffSchedule;

/// Cost every reading against `schedule`.
pub fn calculate(
    readings: &[InterpolatedReading],
    schedule: &TariffSchedule,
    config: &CostConfig,
) -> Vec<CostedReading> {
    let usage = usage(readings);

    let costed: Vec<CostedReading> = readings
        .iter()
        .zip(usage)
        .map(|(r, (gas_used, elec_used))| {
            let rates = schedule.applied_rates(r.date());
            let (gas_cost, elec_cost) = day_costs(gas_used, elec_used, &rates, config);
            CostedReading {
                date: r.date(),
                gas_meter: r.reading.gas_meter,
                elec_meter: r.reading.elec_meter,
                interpolated: r.interpolated,
                gas_used,
                elec_used,
                rates,
                gas_cost,
                elec_cost,
                total_cost: gas_cost + elec_cost,
            }
        })
        .collect();

    if !costed.is_empty() {
        let unpriced = costed.iter().filter(|c| c.rates.effective_from.is_none()).count();
        info!(records = costed.len(), unpriced, "calculated daily costs");
    }

    costed
}

/// `(gas_used, elec_used)` per reading.
fn usage(readings: &[InterpolatedReading]) -> Vec<(f64, f64)> {
    let mut out = Vec::with_capacity(readings.len());
    let mut prev: Option<&InterpolatedReading> = None;
    for r in readings {
        let used = match prev {
            None => (0.0, 0.0),
            Some(p) => (
                r.reading.gas_meter - p.reading.gas_meter,
                r.reading.elec_meter - p.reading.elec_meter,
            ),
        };
        if used.0 < 0.0 || used.1 < 0.0 {
            debug!(date = %r.date(), gas = used.0, elec = used.1, "negative usage");
        }
        out.push(used);
        prev = Some(r);
    }
    out
}

/// `(gas_cost, elec_cost)` for one day.
pub fn day_costs(gas_used: f64, elec_used: f64, rates: &AppliedRates, config: &CostConfig) -> (f64, f64) {
    let gas = config.tax_factor
        * (rates.gas_standing_charge
            + gas_used * rates.gas_unit_rate * config.gas_volume_to_energy_factor);
    let elec = config.tax_factor * (rates.elec_standing_charge + elec_used * rates.elec_unit_rate);
    (gas, elec)
}
