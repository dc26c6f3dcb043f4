//! `[AREA:slug]` tags embedded in free-text shift notes.
//!
//! Workers pick an area when logging a shift; it is stored as a tag at the
//! front of the note, e.g. `[AREA:shibuya] rainy, lots of cafe orders`.

use regex::Regex;
use std::sync::OnceLock;

fn tag_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\[AREA:([a-z0-9\-]+)\]").expect("valid area tag regex"))
}

/// First area slug tagged anywhere in `note`.
pub fn extract_area_slug(note: &str) -> Option<String> {
    tag_re()
        .captures(note)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string())
}
