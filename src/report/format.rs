//! Plain-text tables and terminal summaries.
//!
//! Every table starts with `#` comment lines naming the report and its
//! columns, so the same text works on a terminal and as a report file that
//! plotting tools can read directly.

use chrono::NaiveDate;

use crate::aggregate::{MonthTotals, Totals, WeekTotals, WeekdayAverage, YearSlice};
use crate::app::pipeline::{CostedRun, RunOutput};
use crate::domain::{CostedReading, InterpolatedReading};
use crate::tariff::TariffSchedule;

/// Skipped lines listed per file before eliding the rest.
const MAX_LISTED_ERRORS: usize = 10;

/// Format the full run summary (inputs, series span, totals).
pub fn format_run_summary(output: &RunOutput) -> String {
    let mut out = format_costed_run(&output.run);
    let t = &output.totals;
    out.push_str(&format!(
        "Totals: gas_used={:.3} elec_used={:.3} | gas={:.2} elec={:.2} total={:.2}\n",
        t.gas_used, t.elec_used, t.gas_cost, t.elec_cost, t.total_cost
    ));
    if t.days > 0 {
        out.push_str(&format!(
            "Average per day: {:.2}\n",
            t.total_cost / t.days as f64
        ));
    }
    out.push('\n');
    out
}

/// Inputs and series span of a costed run.
pub fn format_costed_run(run: &CostedRun) -> String {
    let mut out = String::new();
    let inputs = &run.inputs;

    out.push_str("=== meter - utility cost reconciliation ===\n");

    let schedule = inputs.schedule();
    match schedule.span() {
        Some((from, to)) => out.push_str(&format!(
            "Tariffs: {} | records={} | effective {from} .. {to}\n",
            inputs.tariff_path.display(),
            schedule.len(),
        )),
        None => out.push_str(&format!(
            "Tariffs: {} | no usable records\n",
            inputs.tariff_path.display()
        )),
    }
    push_line_errors(&mut out, &inputs.tariffs.line_errors);

    for file in &inputs.files {
        out.push_str(&format!(
            "Readings: {} | rows={} skipped={} duplicates={}\n",
            file.path.display(),
            file.rows,
            file.line_errors.len(),
            file.duplicates,
        ));
        push_line_errors(&mut out, &file.line_errors);
    }

    if let (Some(first), Some(last)) = (run.first_date(), run.last_date()) {
        out.push_str(&format!(
            "Series: {first} .. {last} | days={} measured={} interpolated={} unpriced={}\n",
            run.daily.len(),
            inputs.series.len(),
            run.interpolated_days(),
            run.unpriced_days(),
        ));
    }
    out.push_str(&format!(
        "Pricing: gas_factor={} tax_factor={}\n",
        run.costs.gas_volume_to_energy_factor, run.costs.tax_factor
    ));

    out
}

fn push_line_errors(out: &mut String, errors: &[crate::io::ingest::LineError]) {
    for e in errors.iter().take(MAX_LISTED_ERRORS) {
        out.push_str(&format!("  line {}: {}\n", e.line, e.message));
    }
    if errors.len() > MAX_LISTED_ERRORS {
        out.push_str(&format!(
            "  ... {} more\n",
            errors.len() - MAX_LISTED_ERRORS
        ));
    }
}

/// Daily view: one row per date with meters, usage, rates and costs.
pub fn daily_table(series: &[CostedReading]) -> String {
    let mut out = String::new();
    out.push_str("# Daily usage and cost (flag i = interpolated reading)\n");
    out.push_str(
        "# columns: date gas_meter elec_meter gas_used elec_used gas_standing gas_unit \
         elec_standing elec_unit gas_cost elec_cost total_cost flag\n",
    );
    for r in series {
        push_row(
            &mut out,
            format!(
                "{} {:>10.3} {:>10.3} {:>8.3} {:>8.3} {:>7.4} {:>7.4} {:>7.4} {:>7.4} {:>8.2} {:>8.2} {:>8.2} {}",
                r.date,
                r.gas_meter,
                r.elec_meter,
                r.gas_used,
                r.elec_used,
                r.rates.gas_standing_charge,
                r.rates.gas_unit_rate,
                r.rates.elec_standing_charge,
                r.rates.elec_unit_rate,
                r.gas_cost,
                r.elec_cost,
                r.total_cost,
                if r.interpolated { "i" } else { "" },
            ),
        );
    }
    out
}

/// Weekly view: Monday-anchored windows.
pub fn weekly_table(weeks: &[WeekTotals]) -> String {
    let mut out = String::new();
    out.push_str("# Weekly totals (weeks start Monday; the last week may be partial)\n");
    out.push_str("# columns: week_start last_date days gas_used elec_used gas_cost elec_cost total_cost\n");
    for w in weeks {
        push_row(
            &mut out,
            format!("{} {} {}", w.week_start, w.last_date, totals_cols(&w.totals)),
        );
    }
    out
}

/// Per-weekday averages.
pub fn weekday_table(rows: &[WeekdayAverage], since: Option<NaiveDate>) -> String {
    let mut out = String::new();
    match since {
        Some(date) => out.push_str(&format!("# Average per weekday, days after {date}\n")),
        None => out.push_str("# Average per weekday, all days\n"),
    }
    out.push_str("# columns: iso_day weekday samples gas_used elec_used gas_cost elec_cost total_cost\n");
    for r in rows {
        push_row(
            &mut out,
            format!(
                "{} {:<3} {:>4} {:>9.3} {:>9.3} {:>9.2} {:>9.2} {:>9.2}",
                r.iso_number(),
                r.weekday,
                r.samples,
                r.gas_used,
                r.elec_used,
                r.gas_cost,
                r.elec_cost,
                r.total_cost,
            ),
        );
    }
    out
}

/// Monthly view.
pub fn monthly_table(months: &[MonthTotals]) -> String {
    let mut out = String::new();
    out.push_str("# Monthly totals\n");
    out.push_str("# columns: month days gas_used elec_used gas_cost elec_cost total_cost\n");
    for m in months {
        push_row(
            &mut out,
            format!("{}-{:02} {}", m.year, m.month, totals_cols(&m.totals)),
        );
    }
    out
}

/// One calendar year, keyed by day-of-year for cross-year plots.
pub fn year_table(slice: &YearSlice) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "# Daily usage and cost for {} (total cost {:.2})\n",
        slice.year, slice.totals.total_cost
    ));
    out.push_str("# columns: day_of_year date gas_used elec_used gas_cost elec_cost total_cost\n");
    for day in &slice.days {
        let r = &day.record;
        push_row(
            &mut out,
            format!(
                "{:>3} {} {:>8.3} {:>8.3} {:>8.2} {:>8.2} {:>8.2}",
                day.day_of_year, r.date, r.gas_used, r.elec_used, r.gas_cost, r.elec_cost, r.total_cost,
            ),
        );
    }
    out
}

/// Smoothed view.
pub fn smoothed_table(series: &[CostedReading], window: usize) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "# Costs averaged over a trailing {window}-day window\n"
    ));
    out.push_str("# columns: date gas_used elec_used gas_cost elec_cost total_cost\n");
    for r in series {
        push_row(
            &mut out,
            format!(
                "{} {:>8.3} {:>8.3} {:>8.2} {:>8.2} {:>8.2}",
                r.date, r.gas_used, r.elec_used, r.gas_cost, r.elec_cost, r.total_cost,
            ),
        );
    }
    out
}

/// Meter readings after gap filling.
pub fn readings_table(readings: &[InterpolatedReading]) -> String {
    let mut out = String::new();
    out.push_str("# Meter readings (source: m = measured, i = interpolated)\n");
    out.push_str("# columns: index date gas_meter elec_meter source\n");
    for (i, r) in readings.iter().enumerate() {
        push_row(
            &mut out,
            format!(
                "{i:>4} {} {:>10.3} {:>10.3} {}",
                r.date(),
                r.reading.gas_meter,
                r.reading.elec_meter,
                if r.interpolated { "i" } else { "m" },
            ),
        );
    }
    out
}

/// The rates in force on each of `dates`.
pub fn rate_lookup(schedule: &TariffSchedule, dates: &[NaiveDate]) -> String {
    let mut out = String::new();
    out.push_str("# columns: date effective_from gas_standing gas_unit elec_standing elec_unit\n");
    for date in dates {
        let line = match schedule.rate_at(*date) {
            Some(r) => format!(
                "{date} {} {:>8.4} {:>8.4} {:>8.4} {:>8.4}",
                r.effective_date,
                r.gas_standing_charge,
                r.gas_unit_rate,
                r.elec_standing_charge,
                r.elec_unit_rate,
            ),
            None => format!("{date} no rate"),
        };
        push_row(&mut out, line);
    }
    out
}

fn totals_cols(t: &Totals) -> String {
    format!(
        "{:>4} {:>10.3} {:>10.3} {:>9.2} {:>9.2} {:>9.2}",
        t.days, t.gas_used, t.elec_used, t.gas_cost, t.elec_cost, t.total_cost
    )
}

fn push_row(out: &mut String, row: String) {
    out.push_str(row.trim_end());
    out.push('\n');
}
