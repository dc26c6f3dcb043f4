//! Shift-record CSV export parser.
//!
//! Expected header (column order is free, extra columns are ignored):
//!   user_id,date,start_time,end_time,hours_worked,earnings,orders_completed,note
//!
//! Rows that fail validation are skipped and reported, never fatal.

use anyhow::{Context, Result};
use chrono::{NaiveDate, NaiveTime};
use gigpulse_core::ShiftRecord;
use std::io::Read;
use std::path::Path;
use tracing::warn;

use crate::area_tag::extract_area_slug;
use crate::types::{ShiftRow, SkippedRow};

/// Parsed records plus the rows that were rejected.
#[derive(Debug, Clone, Default)]
pub struct ShiftImport {
    pub records: Vec<ShiftRecord>,
    pub skipped: Vec<SkippedRow>,
}

pub fn parse_shifts_csv(path: impl AsRef<Path>) -> Result<ShiftImport> {
    let path = path.as_ref();
    let file = std::fs::File::open(path).with_context(|| format!("opening {}", path.display()))?;
    parse_shifts_reader(file).with_context(|| format!("parsing {}", path.display()))
}

pub fn parse_shifts_reader<R: Read>(reader: R) -> Result<ShiftImport> {
    let mut rdr = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);
    let headers = rdr.headers()?.clone();

    let mut out = ShiftImport::default();
    for result in rdr.records() {
        let record = result?;
        let line = record.position().map(|p| p.line()).unwrap_or(0);

        let row: ShiftRow = match record.deserialize(Some(&headers)) {
            Ok(r) => r,
            Err(e) => {
                skip(&mut out, line, format!("malformed row: {e}"));
                continue;
            }
        };

        match row_to_record(&row) {
            Ok(r) => out.records.push(r),
            Err(reason) => skip(&mut out, line, reason),
        }
    }

    Ok(out)
}

fn skip(out: &mut ShiftImport, line: u64, reason: String) {
    warn!(line, %reason, "skipping shift row");
    out.skipped.push(SkippedRow { line, reason });
}

/// Validate one row. Times and area stay optional; the aggregator decides
/// whether the record is usable evidence.
pub fn row_to_record(row: &ShiftRow) -> Result<ShiftRecord, String> {
    let user_id = row.user_id.trim();
    if user_id.is_empty() {
        return Err("user_id is required".to_string());
    }

    let date = parse_date(&row.date).ok_or_else(|| format!("invalid date '{}'", row.date))?;

    let earnings = parse_number(&row.earnings)
        .ok_or_else(|| format!("earnings must be numeric, got '{}'", row.earnings))?;
    if earnings < 0.0 {
        return Err(format!("earnings must be >= 0, got {earnings}"));
    }

    let orders_completed = match non_empty(&row.orders_completed) {
        None => 0,
        Some(s) => s
            .parse::<u32>()
            .map_err(|_| format!("orders_completed must be a non-negative integer, got '{s}'"))?,
    };

    let hours_worked = match non_empty(&row.hours_worked) {
        None => None,
        Some(s) => {
            let h = parse_number(s).ok_or_else(|| format!("invalid hours_worked '{s}'"))?;
            if h < 0.0 {
                return Err(format!("hours_worked must be >= 0, got {h}"));
            }
            Some(h)
        }
    };

    let start_time = parse_opt_time(&row.start_time, "start_time")?;
    let end_time = parse_opt_time(&row.end_time, "end_time")?;

    let area = non_empty(&row.note).and_then(extract_area_slug);

    Ok(ShiftRecord {
        user_id: user_id.to_string(),
        date,
        start_time,
        end_time,
        hours_worked,
        earnings,
        orders_completed,
        area,
    })
}

fn non_empty(s: &Option<String>) -> Option<&str> {
    s.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

fn parse_date(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(s, "%Y/%m/%d"))
        .ok()
}

fn parse_time(s: &str) -> Option<NaiveTime> {
    NaiveTime::parse_from_str(s, "%H:%M:%S")
        .or_else(|_| NaiveTime::parse_from_str(s, "%H:%M"))
        .ok()
}

fn parse_opt_time(s: &Option<String>, field: &str) -> Result<Option<NaiveTime>, String> {
    match non_empty(s) {
        None => Ok(None),
        Some(v) => parse_time(v)
            .map(Some)
            .ok_or_else(|| format!("invalid {field} '{v}'")),
    }
}

/// Accepts thousands separators ("12,345.50").
fn parse_number(s: &str) -> Option<f64> {
    let cleaned = s.trim().replace(',', "");
    if cleaned.is_empty() {
        return None;
    }
    cleaned.parse::<f64>().ok().filter(|v| v.is_finite())
}
