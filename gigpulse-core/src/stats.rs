//! Hourly statistics aggregator: empirical-Bayes expected hourly rate per area
//! for one hour-of-week slot.
//!
//! Each eligible shift contributes its average rate to every clock-hour bucket
//! it overlaps, weighted by the overlap. Per-area sums are shrunk toward the
//! slot-wide mean (the prior) with `tau` hours of pseudo-evidence, so an area
//! backed by one lucky shift cannot outrank well-observed areas on noise alone.

use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::debug;

use crate::area::AreaRegistry;
use crate::shift::Exclusion;
use crate::store::{ConsentLookup, ShiftSource};

/// Pseudo-count (hours) of prior evidence mixed into every area.
pub const SHRINKAGE_TAU_HOURS: f64 = 2.0;

/// Expected hourly rate for one area at one hour-of-week slot.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct HourlyStat {
    /// Expected earnings per hour
    pub hourly: f64,
    /// Apportioned hours of evidence behind `hourly`
    pub samples_h: f64,
}

impl HourlyStat {
    pub fn new(hourly: f64, samples_h: f64) -> Self {
        Self { hourly, samples_h }
    }

    /// Presentation rounding: whole units, tenths of an hour.
    pub fn rounded(self) -> Self {
        Self {
            hourly: round_whole(self.hourly),
            samples_h: round_tenth(self.samples_h),
        }
    }
}

pub(crate) fn round_whole(x: f64) -> f64 {
    x.round_ties_even()
}

pub(crate) fn round_tenth(x: f64) -> f64 {
    (x * 10.0).round_ties_even() / 10.0
}

/// Per-area stats in registry order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HourlySurface {
    entries: Vec<(String, HourlyStat)>,
}

impl HourlySurface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, slug: impl Into<String>, stat: HourlyStat) {
        let slug = slug.into();
        match self.entries.iter_mut().find(|(s, _)| *s == slug) {
            Some((_, existing)) => *existing = stat,
            None => self.entries.push((slug, stat)),
        }
    }

    pub fn get(&self, slug: &str) -> Option<&HourlyStat> {
        self.entries.iter().find(|(s, _)| s == slug).map(|(_, st)| st)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &HourlyStat)> {
        self.entries.iter().map(|(s, st)| (s.as_str(), st))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn rounded(&self) -> Self {
        Self {
            entries: self
                .entries
                .iter()
                .map(|(s, st)| (s.clone(), st.rounded()))
                .collect(),
        }
    }
}

impl<S: Into<String>> FromIterator<(S, HourlyStat)> for HourlySurface {
    fn from_iter<I: IntoIterator<Item = (S, HourlyStat)>>(iter: I) -> Self {
        let mut out = Self::new();
        for (slug, stat) in iter {
            out.insert(slug, stat);
        }
        out
    }
}

/// Shrink a per-area average toward `prior` with `tau` hours of pseudo-evidence.
///
/// With no observed hours the result is exactly the prior.
pub fn shrink(sum_earn: f64, sum_hours: f64, prior: f64, tau: f64) -> f64 {
    if sum_hours <= 0.0 {
        return prior;
    }
    (sum_earn + prior * tau) / (sum_hours + tau)
}

/// Running sums for one hour-of-week slot.
#[derive(Debug, Default, Clone)]
pub struct SlotAccumulator {
    per_area: HashMap<String, (f64, f64)>,
    total_earn: f64,
    total_hours: f64,
}

impl SlotAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `portion` hours of evidence earning `rate` per hour.
    pub fn add(&mut self, area: &str, rate: f64, portion: f64) {
        let earn = rate * portion;
        let e = self.per_area.entry(area.to_string()).or_insert((0.0, 0.0));
        e.0 += earn;
        e.1 += portion;
        self.total_earn += earn;
        self.total_hours += portion;
    }

    /// Slot-wide mean hourly rate across every area.
    pub fn prior(&self) -> f64 {
        if self.total_hours > 0.0 {
            self.total_earn / self.total_hours
        } else {
            0.0
        }
    }

    pub fn total_hours(&self) -> f64 {
        self.total_hours
    }

    /// Shrunk stats for every registry area, unrounded.
    pub fn finish(&self, areas: &AreaRegistry, tau: f64) -> HourlySurface {
        let prior = self.prior();
        areas
            .iter()
            .map(|a| {
                let stat = match self.per_area.get(&a.slug) {
                    Some(&(earn, hours)) if hours > 0.0 => {
                        HourlyStat::new(shrink(earn, hours, prior, tau), hours)
                    }
                    _ => HourlyStat::new(prior, 0.0),
                };
                (a.slug.clone(), stat)
            })
            .collect()
    }
}

/// Computes per-area hourly stats from a record snapshot.
pub struct Aggregator<'a> {
    areas: &'a AreaRegistry,
    source: &'a dyn ShiftSource,
    consent: &'a dyn ConsentLookup,
    today: NaiveDate,
    tau: f64,
}

impl<'a> Aggregator<'a> {
    pub fn new(
        areas: &'a AreaRegistry,
        source: &'a dyn ShiftSource,
        consent: &'a dyn ConsentLookup,
        today: NaiveDate,
    ) -> Self {
        Self {
            areas,
            source,
            consent,
            today,
            tau: SHRINKAGE_TAU_HOURS,
        }
    }

    /// Rounded stats for `(day_of_week, hour)` over the last `lookback_days`.
    pub fn stats_for(&self, day_of_week: u32, hour: u32, lookback_days: u32) -> HourlySurface {
        self.raw_stats_for(day_of_week, hour, lookback_days).rounded()
    }

    /// Same as [`Aggregator::stats_for`] without presentation rounding.
    pub fn raw_stats_for(&self, day_of_week: u32, hour: u32, lookback_days: u32) -> HourlySurface {
        self.accumulate(day_of_week, hour, lookback_days)
            .finish(self.areas, self.tau)
    }

    /// Sums for one slot; exposed so callers can inspect the prior.
    pub fn accumulate(&self, day_of_week: u32, hour: u32, lookback_days: u32) -> SlotAccumulator {
        // windows reaching past the calendar start read everything
        let since = self
            .today
            .checked_sub_days(Days::new(u64::from(lookback_days.max(1))))
            .unwrap_or(NaiveDate::MIN);
        let mut acc = SlotAccumulator::new();
        let mut excluded: HashMap<Exclusion, usize> = HashMap::new();
        let mut no_consent = 0usize;

        for r in self.source.records_since(since) {
            if !self.consent.may_aggregate(&r.user_id) {
                no_consent += 1;
                continue;
            }
            let ev = match r.evidence(self.areas) {
                Ok(ev) => ev,
                Err(why) => {
                    *excluded.entry(why).or_default() += 1;
                    continue;
                }
            };
            if ev.day_of_week != day_of_week {
                continue;
            }
            let portion = ev.span.portion_in(hour);
            if portion > 0.0 {
                acc.add(ev.area, ev.rate, portion);
            }
        }

        debug!(
            day_of_week,
            hour,
            %since,
            evidence_hours = acc.total_hours(),
            no_consent,
            ?excluded,
            "aggregated hour-of-week slot"
        );
        acc
    }
}
