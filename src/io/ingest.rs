//! Dated-line ingest shared by tariff and reading files.
//!
//! Both file kinds use the same layout:
//!
//! ```text
//! # comment
//! 31/01/2023  2.0  3.0  4.0  5.0
//! ```
//!
//! The first 10 characters are a `dd/mm/yyyy` date, followed by a fixed
//! number of whitespace-separated decimal fields. Extra trailing fields are
//! ignored.
//!
//! Row-level problems never abort a load: the line is skipped, recorded as a
//! `LineError` and logged. Only a file that cannot be opened or read is an
//! error for the caller.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use tracing::{debug, warn};

use crate::error::AppError;

/// Width of the leading date field.
pub const DATE_WIDTH: usize = 10;

const DATE_FORMAT: &str = "%d/%m/%Y";

/// A line that was skipped during ingest.
#[derive(Debug, Clone, PartialEq)]
pub struct LineError {
    /// 1-based line number.
    pub line: usize,
    pub message: String,
}

/// A successfully parsed line.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DatedRow<const N: usize> {
    pub line: usize,
    pub date: NaiveDate,
    pub values: [f64; N],
}

/// Ingest output: parsed rows in file order plus what was skipped.
#[derive(Debug, Clone)]
pub struct IngestedFile<const N: usize> {
    pub path: PathBuf,
    pub rows: Vec<DatedRow<N>>,
    pub line_errors: Vec<LineError>,
    pub lines_read: usize,
    pub comment_lines: usize,
}

/// Read every dated line of `path`, expecting `N` numeric fields per line.
///
/// `kind` names the file in messages ("tariff", "reading").
pub fn read_dated_file<const N: usize>(path: &Path, kind: &str) -> Result<IngestedFile<N>, AppError> {
    let file = File::open(path).map_err(|e| {
        AppError::input(format!("Failed to open {kind} file '{}': {e}", path.display()))
    })?;

    let mut out = IngestedFile {
        path: path.to_path_buf(),
        rows: Vec::new(),
        line_errors: Vec::new(),
        lines_read: 0,
        comment_lines: 0,
    };

    let mut reader = BufReader::new(file);
    let mut buf = Vec::new();
    let mut line_no = 0usize;
    loop {
        buf.clear();
        let n = reader.read_until(b'\n', &mut buf).map_err(|e| {
            AppError::input(format!(
                "Failed to read {kind} file '{}' after line {line_no}: {e}",
                path.display()
            ))
        })?;
        if n == 0 {
            break;
        }
        line_no += 1;
        out.lines_read += 1;

        // Comments are free text in any encoding; data lines must be UTF-8.
        let parsed = match std::str::from_utf8(&buf) {
            Ok(line) => parse_dated_line::<N>(line),
            Err(_) if buf.starts_with(b"#") => Ok(None),
            Err(e) => Err(format!("line is not valid UTF-8 ({e})")),
        };

        match parsed {
            Ok(Some((date, values))) => out.rows.push(DatedRow {
                line: line_no,
                date,
                values,
            }),
            Ok(None) => {
                if buf.starts_with(b"#") {
                    out.comment_lines += 1;
                }
            }
            Err(message) => {
                warn!(file = %path.display(), line = line_no, "skipping {kind} line: {message}");
                out.line_errors.push(LineError {
                    line: line_no,
                    message,
                });
            }
        }
    }

    debug!(
        file = %path.display(),
        lines = out.lines_read,
        rows = out.rows.len(),
        skipped = out.line_errors.len(),
        "read {kind} file"
    );

    Ok(out)
}

/// Parse one line.
///
/// Returns `Ok(None)` for comments and blank lines.
pub fn parse_dated_line<const N: usize>(line: &str) -> Result<Option<(NaiveDate, [f64; N])>, String> {
    let line = line.trim_end_matches(['\r', '\n']);
    if line.trim().is_empty() || is_comment(line) {
        return Ok(None);
    }

    let (Some(date_field), Some(rest)) = (line.get(..DATE_WIDTH), line.get(DATE_WIDTH..)) else {
        return Err(format!(
            "line shorter than the {DATE_WIDTH}-character date field"
        ));
    };

    let date = parse_date(date_field)?;

    let mut values = [0.0; N];
    let mut fields = rest.split_whitespace();
    for (i, slot) in values.iter_mut().enumerate() {
        let Some(token) = fields.next() else {
            return Err(format!("expected {N} numeric fields after the date, found {i}"));
        };
        *slot = parse_number(token)
            .ok_or_else(|| format!("invalid number '{token}' in field {}", i + 1))?;
    }

    Ok(Some((date, values)))
}

/// Parse a `dd/mm/yyyy` date.
pub fn parse_date(s: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(s.trim(), DATE_FORMAT)
        .map_err(|_| format!("invalid date '{}' (expected dd/mm/yyyy)", s.trim()))
}

fn is_comment(line: &str) -> bool {
    line.starts_with('#')
}

fn parse_number(token: &str) -> Option<f64> {
    let v = token.parse::<f64>().ok()?;
    if v.is_finite() { Some(v) } else { None }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn parses_date_and_fields() {
        let (date, values) = parse_dated_line::<2>("31/01/2023 1234.5  678.25")
            .unwrap()
            .unwrap();
        assert_eq!(date, d(2023, 1, 31));
        assert_eq!(values, [1234.5, 678.25]);
    }

    #[test]
    fn ignores_trailing_fields() {
        let (_, values) = parse_dated_line::<2>("01/02/2023 1 2 3 note").unwrap().unwrap();
        assert_eq!(values, [1.0, 2.0]);
    }

    #[test]
    fn comments_and_blank_lines_are_not_rows() {
        assert_eq!(parse_dated_line::<2>("# date elec gas").unwrap(), None);
        assert_eq!(parse_dated_line::<2>("   ").unwrap(), None);
        assert_eq!(parse_dated_line::<2>("").unwrap(), None);
    }

    #[test]
    fn short_or_malformed_lines_are_errors() {
        assert!(parse_dated_line::<2>("01/02/23").is_err());
        assert!(parse_dated_line::<2>("2023-02-01 1 2").is_err());
        assert!(parse_dated_line::<2>("01/02/2023 1").is_err());
        assert!(parse_dated_line::<2>("01/02/2023 1 x").is_err());
        assert!(parse_dated_line::<4>("01/02/2023 1 2 NaN 4").is_err());
    }

    #[test]
    fn handles_crlf_line_endings() {
        let (_, values) = parse_dated_line::<1>("01/02/2023 7\r").unwrap().unwrap();
        assert_eq!(values, [7.0]);
    }

    #[test]
    fn missing_file_is_an_input_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = read_dated_file::<2>(&dir.path().join("absent.dat"), "reading").unwrap_err();
        assert_eq!(err.exit_code(), crate::error::EXIT_INPUT);
        assert!(err.message().contains("reading file"));
    }

    #[test]
    fn skips_bad_lines_and_keeps_going() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("readings.dat");
        std::fs::write(
            &path,
            "# header\n01/01/2023 1 2\nbroken line here\n03/01/2023 3\n04/01/2023 5 6\n",
        )
        .unwrap();

        let file = read_dated_file::<2>(&path, "reading").unwrap();

        assert_eq!(file.lines_read, 5);
        assert_eq!(file.comment_lines, 1);
        assert_eq!(file.rows.len(), 2);
        assert_eq!(file.rows[1].line, 5);
        assert_eq!(
            file.line_errors.iter().map(|e| e.line).collect::<Vec<_>>(),
            vec![3, 4]
        );
    }

    #[test]
    fn latin1_bytes_do_not_abort_the_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("readings.dat");
        // 0xA3 is a Latin-1 pound sign.
        std::fs::write(
            &path,
            b"# costs in \xA3\n01/01/2023 1 2\n02/01/2023 \xA33 4\n03/01/2023 5 6",
        )
        .unwrap();

        let file = read_dated_file::<2>(&path, "reading").unwrap();

        assert_eq!(file.lines_read, 4);
        assert_eq!(file.comment_lines, 1);
        assert_eq!(
            file.rows.iter().map(|r| r.date).collect::<Vec<_>>(),
            vec![d(2023, 1, 1), d(2023, 1, 3)]
        );
        assert_eq!(file.line_errors.len(), 1);
        assert_eq!(file.line_errors[0].line, 3);
        assert!(file.line_errors[0].message.contains("UTF-8"));
    }
}
