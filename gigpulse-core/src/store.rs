//! Record store and consent collaborators.
//!
//! Persistence lives outside the core. The engine only needs read access to
//! shift records dated on or after some day, plus a per-user "may aggregate" flag.

use chrono::NaiveDate;
use std::collections::HashMap;

use crate::shift::ShiftRecord;

/// Read access to historical shift records.
pub trait ShiftSource {
    /// Records dated on or after `since`.
    fn records_since(&self, since: NaiveDate) -> Vec<&ShiftRecord>;
}

/// Per-user opt-in for aggregate statistics.
pub trait ConsentLookup {
    fn may_aggregate(&self, user_id: &str) -> bool;
}

/// In-memory record snapshot.
#[derive(Debug, Clone, Default)]
pub struct MemoryShiftStore {
    records: Vec<ShiftRecord>,
}

impl MemoryShiftStore {
    pub fn new(records: Vec<ShiftRecord>) -> Self {
        Self { records }
    }

    pub fn push(&mut self, record: ShiftRecord) {
        self.records.push(record);
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &[ShiftRecord] {
        &self.records
    }
}

impl ShiftSource for MemoryShiftStore {
    fn records_since(&self, since: NaiveDate) -> Vec<&ShiftRecord> {
        self.records.iter().filter(|r| r.date >= since).collect()
    }
}

/// Explicit consent flags. Users without an entry are not aggregated.
#[derive(Debug, Clone, Default)]
pub struct ConsentSet {
    flags: HashMap<String, bool>,
}

impl ConsentSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, user_id: impl Into<String>, share: bool) {
        self.flags.insert(user_id.into(), share);
    }

    /// Opt every listed user in.
    pub fn opted_in<I, S>(users: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            flags: users.into_iter().map(|u| (u.into(), true)).collect(),
        }
    }

    pub fn opted_in_count(&self) -> usize {
        self.flags.values().filter(|&&v| v).count()
    }
}

impl ConsentLookup for ConsentSet {
    fn may_aggregate(&self, user_id: &str) -> bool {
        self.flags.get(user_id).copied().unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_records_since_filters_by_date() {
        let d = |day| NaiveDate::from_ymd_opt(2026, 3, day).unwrap();
        let store = MemoryShiftStore::new(vec![
            ShiftRecord::new("u1", d(1), 1000.0),
            ShiftRecord::new("u1", d(10), 1000.0),
        ]);
        let got = store.records_since(d(5));
        assert_eq!(got.len(), 1);
        assert_eq!(got[0].date, d(10));
    }

    #[test]
    fn test_consent_defaults_to_excluded() {
        let mut c = ConsentSet::opted_in(["u1"]);
        c.set("u2", false);
        assert!(c.may_aggregate("u1"));
        assert!(!c.may_aggregate("u2"));
        assert!(!c.may_aggregate("u3"));
        assert_eq!(c.opted_in_count(), 1);
    }
}
