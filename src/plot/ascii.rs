//! ASCII plotting of daily cost for terminal output.
//!
//! This is intentionally "dumb" (fixed-size grid), optimized for:
//! - quick visual sanity checks in a terminal
//! - deterministic output (helpful for golden tests)
//!
//! Plot elements:
//! - daily total cost: `o`
//! - smoothed total cost: `-` line

use crate::domain::CostedReading;

/// Render daily totals with the smoothed series drawn as a line.
///
/// `smoothed` is expected to share the dates of `daily` (as produced by
/// `aggregate::smoothed`).
pub fn render_cost_plot(
    daily: &[CostedReading],
    smoothed: &[CostedReading],
    width: usize,
    height: usize,
) -> String {
    let width = width.max(10);
    let height = height.max(5);

    let (Some(first), Some(last)) = (daily.first(), daily.last()) else {
        return "Plot: no data\n".to_string();
    };

    let day = |r: &CostedReading| (r.date - first.date).num_days() as f64;
    let x_max = day(last).max(1.0);

    let points: Vec<(f64, f64)> = daily.iter().map(|r| (day(r), r.total_cost)).collect();
    let line: Vec<(f64, f64)> = smoothed.iter().map(|r| (day(r), r.total_cost)).collect();

    let (y_min, y_max) = y_range(&points, &line).unwrap_or((0.0, 1.0));
    let (y_min, y_max) = pad_range(y_min, y_max, 0.05);

    let mut grid = vec![vec![' '; width]; height];

    // Line first so points can overlay.
    draw_series(&mut grid, &line, x_max, y_min, y_max);

    for &(x, y) in &points {
        let col = map_x(x, x_max, width);
        let row = map_y(y, y_min, y_max, height);
        grid[row][col] = 'o';
    }

    let mut out = String::new();
    out.push_str(&format!(
        "Plot: {} .. {} | cost=[{y_min:.2}, {y_max:.2}]\n",
        first.date, last.date
    ));

    for row in grid {
        out.push_str(&row.into_iter().collect::<String>());
        out.push('\n');
    }

    out
}

fn y_range(points: &[(f64, f64)], line: &[(f64, f64)]) -> Option<(f64, f64)> {
    let mut min_y = f64::INFINITY;
    let mut max_y = f64::NEG_INFINITY;

    for &(_, y) in points.iter().chain(line) {
        min_y = min_y.min(y);
        max_y = max_y.max(y);
    }

    if min_y.is_finite() && max_y.is_finite() && max_y > min_y {
        Some((min_y, max_y))
    } else {
        None
    }
}

fn pad_range(min: f64, max: f64, frac: f64) -> (f64, f64) {
    let span = (max - min).abs();
    let pad = (span * frac).max(1e-12);
    (min - pad, max + pad)
}

fn map_x(x: f64, x_max: f64, width: usize) -> usize {
    let width = width.max(2);
    let u = (x / x_max).clamp(0.0, 1.0);
    (u * (width as f64 - 1.0)).round() as usize
}

fn map_y(y: f64, y_min: f64, y_max: f64, height: usize) -> usize {
    let height = height.max(2);
    let u = ((y - y_min) / (y_max - y_min)).clamp(0.0, 1.0);
    // y=top is max -> row 0
    (height as f64 - 1.0 - (u * (height as f64 - 1.0))).round() as usize
}

fn draw_series(grid: &mut [Vec<char>], series: &[(f64, f64)], x_max: f64, y_min: f64, y_max: f64) {
    if series.len() < 2 {
        return;
    }
    let height = grid.len();
    let width = grid[0].len();

    let mut prev = None;
    for &(x, y) in series {
        let col = map_x(x, x_max, width);
        let row = map_y(y, y_min, y_max, height);
        if let Some((c0, r0)) = prev {
            draw_line(grid, c0, r0, col, row, '-');
        } else {
            grid[row][col] = '-';
        }
        prev = Some((col, row));
    }
}

/// Integer line drawing (Bresenham-ish).
fn draw_line(grid: &mut [Vec<char>], x0: usize, y0: usize, x1: usize, y1: usize, ch: char) {
    let mut x0 = x0 as isize;
    let mut y0 = y0 as isize;
    let x1 = x1 as isize;
    let y1 = y1 as isize;

    let dx = (x1 - x0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let dy = -(y1 - y0).abs();
    let sy = if y0 < y1 { 1 } else { -1 };
    let mut err = dx + dy;

    loop {
        if y0 >= 0
            && (y0 as usize) < grid.len()
            && x0 >= 0
            && (x0 as usize) < grid[0].len()
            && grid[y0 as usize][x0 as usize] == ' '
        {
            grid[y0 as usize][x0 as usize] = ch;
        }

        if x0 == x1 && y0 == y1 {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x0 += sx;
        }
        if e2 <= dx {
            err += dx;
            y0 += sy;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::AppliedRates;
    use chrono::NaiveDate;

    fn day(d: u32, total: f64) -> CostedReading {
        CostedReading {
            date: NaiveDate::from_ymd_opt(2023, 1, d).unwrap(),
            gas_meter: 0.0,
            elec_meter: 0.0,
            interpolated: false,
            gas_used: 0.0,
            elec_used: 0.0,
            rates: AppliedRates::default(),
            gas_cost: total,
            elec_cost: 0.0,
            total_cost: total,
        }
    }

    #[test]
    fn plot_golden_snapshot_small() {
        let daily = vec![day(1, 1.0), day(2, 3.0)];
        let smoothed = vec![day(1, 1.0), day(2, 2.0)];

        let txt = render_cost_plot(&daily, &smoothed, 10, 5);
        let expected = concat!(
            "Plot: 2023-01-01 .. 2023-01-02 | cost=[0.90, 3.10]\n",
            "         o\n",
            "          \n",
            "       ---\n",
            "   ----   \n",
            "o--       \n",
        );
        assert_eq!(txt, expected);
    }

    #[test]
    fn empty_series() {
        assert_eq!(render_cost_plot(&[], &[], 40, 10), "Plot: no data\n");
    }
}
