//! Route planner: greedy hour-by-hour area choice with a travel penalty.
//!
//! For each hour of the horizon we pick the area with the best expected hourly
//! rate, minus `distance_km * beta_per_km` when it means leaving the area we
//! were in. No backtracking. Consecutive hours in the same area are merged
//! into blocks afterwards.

use chrono::{Datelike, Duration, NaiveDateTime, Timelike};
use serde::{Deserialize, Serialize};

use crate::area::AreaRegistry;
use crate::stats::{round_tenth, HourlySurface};

/// Longest horizon the planner will walk (one week).
pub const MAX_PLAN_HOURS: u32 = 24 * 7;

/// One planned hour.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanSlot {
    pub at: NaiveDateTime,
    pub area: String,
    pub hourly: i64,
    pub samples_h: f64,
}

/// Consecutive slots in one area, covering `[start, end)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanBlock {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    pub area: String,
    /// Plain mean of the merged slots' hourly values
    pub expected_hourly: f64,
    pub samples_h: f64,
}

/// Choose an area for each of `horizon_hours` hours starting at `start`.
///
/// `surface_at(day_of_week, hour)` supplies the per-area rates for a slot
/// (0 = Monday). The first slot carries no travel penalty; staying put never does.
/// Horizons beyond [`MAX_PLAN_HOURS`] are cut to it.
pub fn plan_slots<F>(
    areas: &AreaRegistry,
    start: NaiveDateTime,
    horizon_hours: u32,
    beta_per_km: f64,
    mut surface_at: F,
) -> Vec<PlanSlot>
where
    F: FnMut(u32, u32) -> HourlySurface,
{
    let horizon_hours = horizon_hours.min(MAX_PLAN_HOURS);
    let mut slots = Vec::with_capacity(horizon_hours as usize);
    let mut current: Option<String> = None;
    let mut t = start;

    for _ in 0..horizon_hours {
        let surface = surface_at(t.weekday().num_days_from_monday(), t.hour());

        // (slug, score, hourly, samples_h)
        let mut best: Option<(&str, f64, i64, f64)> = None;
        for area in areas.iter() {
            let stat = surface.get(&area.slug).copied().unwrap_or_default();
            let hourly = stat.hourly.round_ties_even() as i64;
            let mut score = hourly as f64;
            if let Some(cur) = current.as_deref() {
                if cur != area.slug {
                    score -= areas.distance_km(cur, &area.slug) * beta_per_km;
                }
            }

            match best {
                None => best = Some((&area.slug, score, hourly, stat.samples_h)),
                Some((_, best_score, _, _)) if score > best_score => {
                    best = Some((&area.slug, score, hourly, stat.samples_h))
                }
                _ => {}
            }
        }

        let Some((slug, _, hourly, samples_h)) = best else {
            break;
        };

        slots.push(PlanSlot {
            at: t,
            area: slug.to_string(),
            hourly,
            samples_h,
        });
        current = Some(slug.to_string());
        let Some(next) = t.checked_add_signed(Duration::hours(1)) else {
            break;
        };
        t = next;
    }

    slots
}

/// Collapse consecutive same-area slots into blocks.
pub fn merge_blocks(slots: &[PlanSlot]) -> Vec<PlanBlock> {
    let mut blocks: Vec<PlanBlock> = Vec::new();
    let mut run_start = 0usize;

    for i in 1..=slots.len() {
        let boundary = i == slots.len() || slots[i].area != slots[run_start].area;
        if !boundary {
            continue;
        }
        let run = &slots[run_start..i];
        let total: i64 = run.iter().map(|s| s.hourly).sum();
        let samples: f64 = run.iter().map(|s| s.samples_h).sum();
        blocks.push(PlanBlock {
            start: run[0].at,
            end: run[run.len() - 1].at + Duration::hours(1),
            area: run[0].area.clone(),
            expected_hourly: total as f64 / run.len() as f64,
            samples_h: round_tenth(samples),
        });
        run_start = i;
    }

    blocks
}

/// Greedy plan, merged into blocks.
pub fn plan<F>(
    areas: &AreaRegistry,
    start: NaiveDateTime,
    horizon_hours: u32,
    beta_per_km: f64,
    surface_at: F,
) -> Vec<PlanBlock>
where
    F: FnMut(u32, u32) -> HourlySurface,
{
    merge_blocks(&plan_slots(areas, start, horizon_hours, beta_per_km, surface_at))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::area::Area;
    use crate::stats::HourlyStat;
    use chrono::NaiveDate;

    fn at(h: u32) -> NaiveDateTime {
        // Monday
        NaiveDate::from_ymd_opt(2026, 3, 16)
            .unwrap()
            .and_hms_opt(h, 0, 0)
            .unwrap()
    }

    fn line_areas() -> AreaRegistry {
        // a, b ~5.6 km apart; c far east
        AreaRegistry::new(vec![
            Area::new("a", "A", 35.00, 139.00),
            Area::new("b", "B", 35.05, 139.00),
            Area::new("c", "C", 35.00, 139.50),
        ])
        .unwrap()
    }

    fn surface(rates: &[(&str, f64)]) -> HourlySurface {
        rates
            .iter()
            .map(|(s, r)| (*s, HourlyStat::new(*r, 1.0)))
            .collect()
    }

    #[test]
    fn test_zero_beta_picks_argmax_each_hour() {
        let areas = line_areas();
        let by_hour = |_: u32, h: u32| match h {
            9 => surface(&[("a", 1000.0), ("b", 1500.0), ("c", 1200.0)]),
            10 => surface(&[("a", 1000.0), ("b", 900.0), ("c", 2500.0)]),
            _ => surface(&[("a", 3000.0), ("b", 900.0), ("c", 800.0)]),
        };
        let slots = plan_slots(&areas, at(9), 3, 0.0, by_hour);
        let chosen: Vec<&str> = slots.iter().map(|s| s.area.as_str()).collect();
        assert_eq!(chosen, vec!["b", "c", "a"]);
    }

    #[test]
    fn test_penalty_keeps_worker_in_place() {
        let areas = line_areas();
        let d_ac = areas.distance_km("a", "c");
        assert!(d_ac > 40.0);

        let by_hour = |_: u32, h: u32| match h {
            9 => surface(&[("a", 2000.0), ("b", 1000.0), ("c", 1000.0)]),
            _ => surface(&[("a", 2000.0), ("b", 1000.0), ("c", 2100.0)]),
        };
        // 100 more per hour in c is not worth 40+ km at 120/km
        let slots = plan_slots(&areas, at(9), 2, 120.0, by_hour);
        assert_eq!(slots[1].area, "a");

        // without the penalty the worker moves
        let slots = plan_slots(&areas, at(9), 2, 0.0, by_hour);
        assert_eq!(slots[1].area, "c");
    }

    #[test]
    fn test_first_slot_has_no_penalty_and_stay_is_free() {
        let areas = line_areas();
        let flat = |_: u32, _: u32| surface(&[("a", 1000.0), ("b", 1000.0), ("c", 5000.0)]);
        let slots = plan_slots(&areas, at(9), 3, 1000.0, flat);
        assert!(slots.iter().all(|s| s.area == "c"));
        assert!(slots.iter().all(|s| s.hourly == 5000));
    }

    #[test]
    fn test_ties_go_to_first_in_catalog_order() {
        let areas = line_areas();
        let tie = |_: u32, _: u32| surface(&[("a", 1000.0), ("b", 1000.0), ("c", 1000.0)]);
        let slots = plan_slots(&areas, at(9), 1, 0.0, tie);
        assert_eq!(slots[0].area, "a");
    }

    #[test]
    fn test_slot_times_advance_hourly_across_midnight() {
        let areas = line_areas();
        let mut seen = Vec::new();
        let start = at(23) + Duration::minutes(15);
        let slots = plan_slots(&areas, start, 2, 0.0, |dow, h| {
            seen.push((dow, h));
            surface(&[("a", 1.0)])
        });
        assert_eq!(seen, vec![(0, 23), (1, 0)]);
        assert_eq!(slots[1].at, start + Duration::hours(1));
    }

    #[test]
    fn test_merge_blocks() {
        let slot = |h: u32, area: &str, hourly: i64| PlanSlot {
            at: at(h),
            area: area.to_string(),
            hourly,
            samples_h: 1.5,
        };
        let blocks = merge_blocks(&[slot(9, "a", 1000), slot(10, "a", 1501), slot(11, "b", 900)]);
        assert_eq!(blocks.len(), 2);
        assert_eq!(blocks[0].start, at(9));
        assert_eq!(blocks[0].end, at(11));
        assert_eq!(blocks[0].area, "a");
        assert_eq!(blocks[0].expected_hourly, 1250.5);
        assert_eq!(blocks[0].samples_h, 3.0);
        assert_eq!(blocks[1].start, at(11));
        assert_eq!(blocks[1].end, at(12));
        assert_eq!(blocks[1].expected_hourly, 900.0);
    }

    #[test]
    fn test_horizon_is_capped_at_one_week() {
        let areas = line_areas();
        let slots = plan_slots(&areas, at(9), u32::MAX, 0.0, |_, _| {
            surface(&[("a", 1000.0), ("b", 900.0), ("c", 800.0)])
        });
        assert_eq!(slots.len(), MAX_PLAN_HOURS as usize);
        assert_eq!(slots[slots.len() - 1].at, at(9) + Duration::hours(167));
    }

    #[test]
    fn test_empty_inputs_give_empty_plan() {
        let areas = line_areas();
        assert!(plan(&areas, at(9), 0, 120.0, |_, _| HourlySurface::new()).is_empty());

        let none = AreaRegistry::default();
        assert!(plan(&none, at(9), 4, 120.0, |_, _| HourlySurface::new()).is_empty());
        assert!(merge_blocks(&[]).is_empty());
    }
}
