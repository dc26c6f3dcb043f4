//! Ranking and report rows for area stats and plans.

use serde::{Deserialize, Serialize};
use std::fmt::Write as _;

use crate::area::AreaRegistry;
use crate::planner::PlanBlock;
use crate::stats::HourlySurface;

/// One row of an area ranking.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AreaRanking {
    pub area_slug: String,
    pub name: String,
    pub lat: f64,
    pub lng: f64,
    pub hourly: f64,
    pub samples_h: f64,
}

/// One block of a plan, resolved against the catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanRow {
    /// "HH:MM-HH:MM"
    pub time_range: String,
    pub start: chrono::NaiveDateTime,
    pub end: chrono::NaiveDateTime,
    pub area_slug: String,
    pub name: String,
    pub lat: f64,
    pub lng: f64,
    pub expected_hourly: f64,
    pub samples_h: f64,
}

/// Sort areas by hourly desc, then evidence desc. Full ties keep catalog order.
pub fn rank_areas(areas: &AreaRegistry, surface: &HourlySurface) -> Vec<AreaRanking> {
    let mut rows: Vec<AreaRanking> = surface
        .iter()
        .filter_map(|(slug, st)| {
            let a = areas.get(slug)?;
            Some(AreaRanking {
                area_slug: a.slug.clone(),
                name: a.name.clone(),
                lat: a.lat,
                lng: a.lng,
                hourly: st.hourly,
                samples_h: st.samples_h,
            })
        })
        .collect();

    rows.sort_by(|a, b| {
        b.hourly
            .total_cmp(&a.hourly)
            .then_with(|| b.samples_h.total_cmp(&a.samples_h))
    });
    rows
}

pub fn plan_rows(areas: &AreaRegistry, blocks: &[PlanBlock]) -> Vec<PlanRow> {
    blocks
        .iter()
        .filter_map(|b| {
            let a = areas.get(&b.area)?;
            Some(PlanRow {
                time_range: format!("{}-{}", b.start.format("%H:%M"), b.end.format("%H:%M")),
                start: b.start,
                end: b.end,
                area_slug: a.slug.clone(),
                name: a.name.clone(),
                lat: a.lat,
                lng: a.lng,
                expected_hourly: b.expected_hourly,
                samples_h: b.samples_h,
            })
        })
        .collect()
}

pub fn render_ranking(rows: &[AreaRanking]) -> String {
    let mut s = String::new();
    let _ = writeln!(s, "{:>3}  {:<12} {:>8} {:>9}  name", "#", "area", "hourly", "samples_h");
    for (i, r) in rows.iter().enumerate() {
        let _ = writeln!(
            s,
            "{:>3}  {:<12} {:>8.0} {:>9.1}  {}",
            i + 1,
            r.area_slug,
            r.hourly,
            r.samples_h,
            r.name
        );
    }
    s
}

pub fn render_plan(rows: &[PlanRow]) -> String {
    if rows.is_empty() {
        return "(no plan: empty horizon or area catalog)\n".to_string();
    }
    let mut s = String::new();
    for r in rows {
        let _ = writeln!(
            s,
            "{}  {:<12} ~{:.0}/h  (samples {:.1}h)  {}",
            r.time_range, r.area_slug, r.expected_hourly, r.samples_h, r.name
        );
    }
    s
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stats::HourlyStat;
    use chrono::{Duration, NaiveDate};

    #[test]
    fn test_rank_sorts_by_hourly_then_samples() {
        let areas = AreaRegistry::builtin();
        let surface: HourlySurface = [
            ("shibuya", HourlyStat::new(1800.0, 1.0)),
            ("ebisu", HourlyStat::new(2100.0, 0.0)),
            ("shinjuku", HourlyStat::new(1800.0, 6.5)),
            ("ueno", HourlyStat::new(1800.0, 1.0)),
        ]
        .into_iter()
        .collect();

        let rows = rank_areas(&areas, &surface);
        let order: Vec<&str> = rows.iter().map(|r| r.area_slug.as_str()).collect();
        assert_eq!(order, vec!["ebisu", "shinjuku", "shibuya", "ueno"]);
        assert_eq!(rows[0].name, "恵比寿駅周辺");
    }

    #[test]
    fn test_unknown_slugs_are_dropped() {
        let areas = AreaRegistry::builtin();
        let surface: HourlySurface = [("atlantis", HourlyStat::new(9000.0, 9.0))]
            .into_iter()
            .collect();
        assert!(rank_areas(&areas, &surface).is_empty());
    }

    #[test]
    fn test_plan_rows_time_range() {
        let areas = AreaRegistry::builtin();
        let start = NaiveDate::from_ymd_opt(2026, 3, 16)
            .unwrap()
            .and_hms_opt(10, 15, 0)
            .unwrap();
        let blocks = vec![PlanBlock {
            start,
            end: start + Duration::hours(2),
            area: "kanda".to_string(),
            expected_hourly: 1750.0,
            samples_h: 3.5,
        }];
        let rows = plan_rows(&areas, &blocks);
        assert_eq!(rows[0].time_range, "10:15-12:15");
        assert!(render_plan(&rows).contains("kanda"));

        let json = serde_json::to_value(&rows[0]).unwrap();
        assert_eq!(json["area_slug"], "kanda");
        assert_eq!(json["expected_hourly"], 1750.0);
    }
}
