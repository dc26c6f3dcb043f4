use anyhow::Result;
use gigpulse_core::{AreaRegistry, ConsentSet, MemoryShiftStore};
use gigpulse_ingest::{parse_consent_csv, parse_shifts_csv, SkippedRow};
use tracing::{debug, warn};

use crate::config::Config;

/// Everything a query reads, loaded once per invocation.
pub struct Snapshot {
    pub areas: AreaRegistry,
    pub store: MemoryShiftStore,
    pub consent: ConsentSet,
    pub skipped: Vec<SkippedRow>,
}

impl Snapshot {
    pub fn load(cfg: &Config) -> Result<Self> {
        let areas = match &cfg.data.areas_json {
            Some(p) => AreaRegistry::from_json_file(p)?,
            None => AreaRegistry::builtin(),
        };

        let (store, skipped) = if cfg.data.shifts_csv.exists() {
            let import = parse_shifts_csv(&cfg.data.shifts_csv)?;
            (MemoryShiftStore::new(import.records), import.skipped)
        } else {
            warn!(path = %cfg.data.shifts_csv.display(), "shift export not found; history is empty");
            (MemoryShiftStore::default(), Vec::new())
        };

        let consent = if cfg.data.consent_csv.exists() {
            parse_consent_csv(&cfg.data.consent_csv)?
        } else {
            warn!(path = %cfg.data.consent_csv.display(), "consent export not found; no user is aggregated");
            ConsentSet::new()
        };

        debug!(
            areas = areas.len(),
            records = store.len(),
            skipped = skipped.len(),
            opted_in = consent.opted_in_count(),
            "snapshot loaded"
        );

        Ok(Self {
            areas,
            store,
            consent,
            skipped,
        })
    }
}
