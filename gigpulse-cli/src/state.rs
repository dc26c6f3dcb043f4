use anyhow::{Context, Result};
use std::fs;
use std::path::PathBuf;

/// `$GIGPULSE_HOME`, or `~/.gigpulse`.
pub fn gigpulse_home() -> Result<PathBuf> {
    if let Some(dir) = std::env::var_os("GIGPULSE_HOME").filter(|d| !d.is_empty()) {
        return Ok(PathBuf::from(dir));
    }
    let home = std::env::var("HOME").context("HOME is not set")?;
    Ok(PathBuf::from(home).join(".gigpulse"))
}

pub fn ensure_gigpulse_home() -> Result<PathBuf> {
    let dir = gigpulse_home()?;
    fs::create_dir_all(&dir).with_context(|| format!("create {}", dir.display()))?;
    Ok(dir)
}
