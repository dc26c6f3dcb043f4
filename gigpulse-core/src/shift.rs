//! Shift record types and hour-bucket apportionment.

use chrono::{Datelike, NaiveDate, NaiveTime, Timelike};
use serde::{Deserialize, Serialize};

use crate::area::AreaRegistry;

/// One logged delivery shift, as provided by the record store.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ShiftRecord {
    pub user_id: String,
    pub date: NaiveDate,
    pub start_time: Option<NaiveTime>,
    pub end_time: Option<NaiveTime>,
    /// Total hours worked, used to resolve shifts that cross midnight
    pub hours_worked: Option<f64>,
    /// Non-negative amount earned over the whole shift
    pub earnings: f64,
    pub orders_completed: u32,
    /// Area slug tag, if the worker recorded one
    pub area: Option<String>,
}

impl ShiftRecord {
    pub fn new(user_id: impl Into<String>, date: NaiveDate, earnings: f64) -> Self {
        Self {
            user_id: user_id.into(),
            date,
            start_time: None,
            end_time: None,
            hours_worked: None,
            earnings,
            orders_completed: 0,
            area: None,
        }
    }

    pub fn with_times(mut self, start: NaiveTime, end: NaiveTime) -> Self {
        self.start_time = Some(start);
        self.end_time = Some(end);
        self
    }

    pub fn with_hours(mut self, hours: f64) -> Self {
        self.hours_worked = Some(hours);
        self
    }

    pub fn with_area(mut self, slug: impl Into<String>) -> Self {
        self.area = Some(slug.into());
        self
    }

    /// Day of week of the shift date, 0 = Monday.
    pub fn day_of_week(&self) -> u32 {
        self.date.weekday().num_days_from_monday()
    }

    /// Resolve the shift into a `[start, end)` span in fractional hours of its day.
    ///
    /// An end at or before the start is read as crossing midnight only when a
    /// positive `hours_worked` is present; the end is then capped at 24:00.
    pub fn span(&self) -> Result<ShiftSpan, Exclusion> {
        let (Some(st), Some(et)) = (self.start_time, self.end_time) else {
            return Err(Exclusion::MissingTime);
        };

        let start = clock_hours(st);
        let mut end = clock_hours(et);
        if end <= start {
            let dur = self.hours_worked.unwrap_or(0.0);
            if dur.is_nan() || dur <= 0.0 {
                return Err(Exclusion::UnresolvedSpan);
            }
            end = (start + dur).min(24.0);
        }

        if end - start <= 0.0 {
            return Err(Exclusion::UnresolvedSpan);
        }
        Ok(ShiftSpan { start, end })
    }

    /// Full eligibility check: resolvable area tag, span and positive rate.
    pub fn evidence(&self, areas: &AreaRegistry) -> Result<Evidence<'_>, Exclusion> {
        let slug = match self.area.as_deref() {
            None | Some("") => return Err(Exclusion::NoArea),
            Some(s) if !areas.contains(s) => return Err(Exclusion::UnknownArea),
            Some(s) => s,
        };
        let span = self.span()?;
        let rate = self.earnings / span.hours();
        if rate.is_nan() || rate <= 0.0 {
            return Err(Exclusion::NonPositiveRate);
        }
        Ok(Evidence {
            area: slug,
            day_of_week: self.day_of_week(),
            rate,
            span,
        })
    }
}

/// Fractional clock hours (minutes resolution, seconds ignored).
fn clock_hours(t: NaiveTime) -> f64 {
    t.hour() as f64 + t.minute() as f64 / 60.0
}

/// A resolved shift span within a single day, in hours since midnight.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShiftSpan {
    pub start: f64,
    pub end: f64,
}

impl ShiftSpan {
    pub fn hours(&self) -> f64 {
        self.end - self.start
    }

    /// Overlap with one specific hour bucket (0.0 if none).
    pub fn portion_in(&self, hour: u32) -> f64 {
        let left = self.start.max(hour as f64);
        let right = self.end.min(hour as f64 + 1.0);
        (right - left).max(0.0)
    }
}

/// Why a record carries no evidence for the aggregator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Exclusion {
    #[serde(rename = "missing-time")]
    MissingTime,
    #[serde(rename = "unresolved-span")]
    UnresolvedSpan,
    #[serde(rename = "no-area")]
    NoArea,
    #[serde(rename = "unknown-area")]
    UnknownArea,
    #[serde(rename = "non-positive-rate")]
    NonPositiveRate,
}

impl Exclusion {
    pub fn describe(&self) -> &'static str {
        match self {
            Exclusion::MissingTime => "start or end time missing",
            Exclusion::UnresolvedSpan => "end not after start and no hours worked",
            Exclusion::NoArea => "no area tag",
            Exclusion::UnknownArea => "area tag not in catalog",
            Exclusion::NonPositiveRate => "zero earnings over the shift",
        }
    }
}

/// An eligible record reduced to what the aggregator needs.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Evidence<'a> {
    pub area: &'a str,
    pub day_of_week: u32,
    /// Average hourly rate over the whole span
    pub rate: f64,
    pub span: ShiftSpan,
}
