//! gigpulse-ingest: shift-record and consent exports, area tags in notes.

pub mod area_tag;
pub mod parsers;
pub mod types;

pub use area_tag::extract_area_slug;
pub use parsers::consent_csv::{parse_consent_csv, parse_consent_reader};
pub use parsers::shifts_csv::{parse_shifts_csv, parse_shifts_reader, row_to_record, ShiftImport};
pub use types::{ShiftRow, SkippedRow};
