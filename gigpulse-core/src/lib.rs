//! gigpulse-core: area/time earnings estimation and route planning for delivery shifts

pub mod area;
pub mod blend;
pub mod engine;
pub mod estimate;
pub mod planner;
pub mod ranking;
pub mod shift;
pub mod stats;
pub mod store;
pub mod time;

pub use area::{haversine_km, Area, AreaRegistry};
pub use blend::{apply_mode, blend, empirical_weight, model_only, BlendMode};
pub use engine::{
    Engine, DEFAULT_BETA_PER_KM, DEFAULT_LOOKBACK_DAYS, DEFAULT_PLAN_HOURS, MAX_LOOKBACK_DAYS,
};
pub use estimate::{probe, Estimate, EstimateProvider, Predictions, StaticEstimates};
pub use planner::{merge_blocks, plan, plan_slots, PlanBlock, PlanSlot, MAX_PLAN_HOURS};
pub use ranking::{plan_rows, rank_areas, render_plan, render_ranking, AreaRanking, PlanRow};
pub use shift::{Evidence, Exclusion, ShiftRecord, ShiftSpan};
pub use stats::{shrink, Aggregator, HourlyStat, HourlySurface, SlotAccumulator, SHRINKAGE_TAU_HOURS};
pub use store::{ConsentLookup, ConsentSet, MemoryShiftStore, ShiftSource};
