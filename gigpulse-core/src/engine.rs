//! Query entry points: area ranking and today's plan.
//!
//! An [`Engine`] borrows a read-only snapshot (catalog, records, consent,
//! optional model) and answers queries as pure functions of it.

use chrono::{NaiveDate, NaiveDateTime};
use tracing::info;

use crate::area::AreaRegistry;
use crate::blend::{apply_mode, BlendMode};
use crate::estimate::{probe, Estimate, EstimateProvider};
use crate::planner::{self, PlanBlock};
use crate::ranking::{plan_rows, rank_areas, AreaRanking, PlanRow};
use crate::stats::{Aggregator, HourlySurface};
use crate::store::{ConsentLookup, ShiftSource};

pub const DEFAULT_LOOKBACK_DAYS: u32 = 90;
pub const DEFAULT_PLAN_HOURS: u32 = 4;
pub const DEFAULT_BETA_PER_KM: f64 = 120.0;
/// Longest history window a query may ask for (about ten years).
pub const MAX_LOOKBACK_DAYS: u32 = 3650;

pub struct Engine<'a> {
    areas: &'a AreaRegistry,
    source: &'a dyn ShiftSource,
    consent: &'a dyn ConsentLookup,
    model: Option<&'a dyn EstimateProvider>,
    today: NaiveDate,
    lookback_days: u32,
}

impl<'a> Engine<'a> {
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
            model: None,
            today,
            lookback_days: DEFAULT_LOOKBACK_DAYS,
        }
    }

    pub fn with_model(mut self, model: &'a dyn EstimateProvider) -> Self {
        self.model = Some(model);
        self
    }

    pub fn with_lookback_days(mut self, days: u32) -> Self {
        self.lookback_days = days.clamp(1, MAX_LOOKBACK_DAYS);
        self
    }

    pub fn areas(&self) -> &AreaRegistry {
        self.areas
    }

    pub fn aggregator(&self) -> Aggregator<'a> {
        Aggregator::new(self.areas, self.source, self.consent, self.today)
    }

    /// Empirical stats for one hour-of-week slot.
    pub fn stats_for(&self, day_of_week: u32, hour: u32) -> HourlySurface {
        self.aggregator()
            .stats_for(day_of_week, hour, self.lookback_days)
    }

    /// Per-area expected hourly rate for a slot under `mode`.
    pub fn surface(&self, day_of_week: u32, hour: u32, mode: BlendMode) -> HourlySurface {
        let base = self.stats_for(day_of_week, hour);
        let estimate = match mode {
            BlendMode::Base => Estimate::Unavailable,
            BlendMode::Ml | BlendMode::Blend => probe(self.model, day_of_week, hour),
        };
        apply_mode(mode, self.areas, base, estimate)
    }

    pub fn ranking(&self, day_of_week: u32, hour: u32, mode: BlendMode) -> Vec<AreaRanking> {
        rank_areas(self.areas, &self.surface(day_of_week, hour, mode))
    }

    pub fn plan(
        &self,
        start: NaiveDateTime,
        horizon_hours: u32,
        beta_per_km: f64,
        mode: BlendMode,
    ) -> Vec<PlanBlock> {
        let blocks = planner::plan(self.areas, start, horizon_hours, beta_per_km, |dow, hour| {
            self.surface(dow, hour, mode)
        });
        info!(
            %start,
            horizon_hours,
            beta_per_km,
            %mode,
            blocks = blocks.len(),
            "planned route"
        );
        blocks
    }

    pub fn plan_report(
        &self,
        start: NaiveDateTime,
        horizon_hours: u32,
        beta_per_km: f64,
        mode: BlendMode,
    ) -> Vec<PlanRow> {
        plan_rows(self.areas, &self.plan(start, horizon_hours, beta_per_km, mode))
    }
}
