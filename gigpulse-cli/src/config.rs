use anyhow::{Context, Result};
use gigpulse_core::{BlendMode, DEFAULT_BETA_PER_KM, DEFAULT_LOOKBACK_DAYS, DEFAULT_PLAN_HOURS};
use gigpulse_model::{ModelPaths, MODEL_BLOB_FILE, MODEL_META_FILE};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::state::{ensure_gigpulse_home, gigpulse_home};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    pub data: DataSection,
    pub model: ModelSection,
    pub query: QuerySection,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataSection {
    pub shifts_csv: PathBuf,
    pub consent_csv: PathBuf,
    /// Custom area catalog (JSON array); the built-in Tokyo catalog when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub areas_json: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelSection {
    pub blob: PathBuf,
    pub meta: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QuerySection {
    /// IANA timezone used for "now" and the current slot
    pub timezone: String,
    pub lookback_days: u32,
    pub plan_hours: u32,
    /// Currency per km charged when the plan moves between areas
    pub beta_per_km: f64,
    pub mode: BlendMode,
}

impl Default for QuerySection {
    fn default() -> Self {
        Self {
            timezone: "Asia/Tokyo".to_string(),
            lookback_days: DEFAULT_LOOKBACK_DAYS,
            plan_hours: DEFAULT_PLAN_HOURS,
            beta_per_km: DEFAULT_BETA_PER_KM,
            mode: BlendMode::default(),
        }
    }
}

impl Config {
    /// Defaults rooted at `home`.
    pub fn defaults_in(home: &Path) -> Self {
        let model = home.join("model");
        Self {
            data: DataSection {
                shifts_csv: home.join("shifts.csv"),
                consent_csv: home.join("consent.csv"),
                areas_json: None,
            },
            model: ModelSection {
                blob: model.join(MODEL_BLOB_FILE),
                meta: model.join(MODEL_META_FILE),
            },
            query: QuerySection::default(),
        }
    }

    pub fn model_paths(&self) -> ModelPaths {
        ModelPaths::new(&self.model.blob, &self.model.meta)
    }
}

pub fn default_config() -> Result<Config> {
    Ok(Config::defaults_in(&gigpulse_home()?))
}

pub fn config_path() -> Result<PathBuf> {
    Ok(gigpulse_home()?.join("config.toml"))
}

pub fn load_config() -> Result<Config> {
    let p = config_path()?;
    if !p.exists() {
        return default_config();
    }
    load_config_from(&p)
}

pub fn load_config_from(path: &Path) -> Result<Config> {
    let s = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    toml::from_str(&s).with_context(|| format!("parse {}", path.display()))
}

pub fn save_config_to(cfg: &Config, path: &Path) -> Result<()> {
    let s = toml::to_string_pretty(cfg).context("serialize config")?;
    fs::write(path, s).with_context(|| format!("write {}", path.display()))?;
    Ok(())
}

pub fn init_config() -> Result<()> {
    ensure_gigpulse_home()?;
    let p = config_path()?;
    if p.exists() {
        println!("Config already exists: {}", p.display());
        return Ok(());
    }
    save_config_to(&default_config()?, &p)?;
    println!("Wrote {}", p.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_round_trip_through_toml() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = Config::defaults_in(dir.path());
        let path = dir.path().join("config.toml");
        save_config_to(&cfg, &path).unwrap();

        let back = load_config_from(&path).unwrap();
        assert_eq!(back, cfg);
        assert_eq!(back.query.timezone, "Asia/Tokyo");
        assert_eq!(back.query.mode, BlendMode::Blend);
        assert_eq!(back.model.blob, dir.path().join("model").join("model_tree.json"));
    }

    #[test]
    fn test_partial_query_section_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(
            &path,
            r#"
[data]
shifts_csv = "/srv/shifts.csv"
consent_csv = "/srv/consent.csv"
areas_json = "/srv/areas.json"

[model]
blob = "/srv/model/model_tree.json"
meta = "/srv/model/model_tree.meta.json"

[query]
mode = "ml"
beta_per_km = 80.0
"#,
        )
        .unwrap();

        let cfg = load_config_from(&path).unwrap();
        assert_eq!(cfg.query.mode, BlendMode::Ml);
        assert_eq!(cfg.query.beta_per_km, 80.0);
        assert_eq!(cfg.query.lookback_days, 90);
        assert_eq!(cfg.query.plan_hours, 4);
        assert_eq!(cfg.data.areas_json, Some(PathBuf::from("/srv/areas.json")));
        assert_eq!(cfg.model_paths().meta, PathBuf::from("/srv/model/model_tree.meta.json"));
    }

    #[test]
    fn test_bad_mode_is_a_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(
            &path,
            "[data]\nshifts_csv = \"a\"\nconsent_csv = \"b\"\n[model]\nblob = \"c\"\nmeta = \"d\"\n[query]\nmode = \"fast\"\n",
        )
        .unwrap();
        assert!(load_config_from(&path).is_err());
    }
}
