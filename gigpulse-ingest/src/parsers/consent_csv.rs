//! Aggregate-statistics consent export: `user_id,share_aggregated`.

use anyhow::{Context, Result};
use gigpulse_core::ConsentSet;
use std::io::Read;
use std::path::Path;
use tracing::warn;

pub fn parse_consent_csv(path: impl AsRef<Path>) -> Result<ConsentSet> {
    let path = path.as_ref();
    let file = std::fs::File::open(path).with_context(|| format!("opening {}", path.display()))?;
    parse_consent_reader(file).with_context(|| format!("parsing {}", path.display()))
}

pub fn parse_consent_reader<R: Read>(reader: R) -> Result<ConsentSet> {
    let mut rdr = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut consent = ConsentSet::new();
    for result in rdr.records() {
        let record = result?;
        let user = record.get(0).unwrap_or("");
        if user.is_empty() {
            continue;
        }
        match parse_flag(record.get(1).unwrap_or("")) {
            Some(flag) => consent.set(user, flag),
            None => {
                let line = record.position().map(|p| p.line()).unwrap_or(0);
                warn!(line, user, "unreadable consent flag; treating as opted out");
                consent.set(user, false);
            }
        }
    }
    Ok(consent)
}

fn parse_flag(s: &str) -> Option<bool> {
    match s.trim().to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}
