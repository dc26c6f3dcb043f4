use serde::{Deserialize, Serialize};

/// A shift row as exported by the record store, before validation.
///
/// Every field stays textual here; `parsers::shifts_csv` decides what is usable.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ShiftRow {
    pub user_id: String,
    pub date: String,
    #[serde(default)]
    pub start_time: Option<String>,
    #[serde(default)]
    pub end_time: Option<String>,
    #[serde(default)]
    pub hours_worked: Option<String>,
    pub earnings: String,
    #[serde(default)]
    pub orders_completed: Option<String>,
    /// Free text; may carry an `[AREA:slug]` tag
    #[serde(default)]
    pub note: Option<String>,
}

/// A row that could not become a record, with the 1-based CSV line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkippedRow {
    pub line: u64,
    pub reason: String,
}
