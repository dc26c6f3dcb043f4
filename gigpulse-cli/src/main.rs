use anyhow::{Context, Result};
use chrono::{NaiveDate, NaiveDateTime, Utc};
use clap::{Parser, Subcommand};
use gigpulse_core::time::{local_naive, next_quarter_hour, parse_start, parse_tz, slot_of};
use gigpulse_core::{
    render_plan, render_ranking, BlendMode, ConsentLookup, Engine, EstimateProvider,
    MAX_LOOKBACK_DAYS, MAX_PLAN_HOURS,
};
use gigpulse_model::{ModelSession, TreePredictor};
use std::collections::BTreeMap;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod config;
mod snapshot;
mod state;

use config::Config;
use snapshot::Snapshot;

#[derive(Parser, Debug)]
#[command(
    name = "gigpulse",
    version,
    long_version = concat!(env!("CARGO_PKG_VERSION"), " (", env!("GIGPULSE_BUILD_SHA"), ")"),
    about = "Where to work next: hourly earnings by area and a short route plan"
)]
struct Cli {
    /// Config file (default: $GIGPULSE_HOME/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List the area catalog
    Areas {
        #[arg(long)]
        json: bool,
    },

    /// Rank areas by expected hourly earnings for one hour-of-week slot
    Stats {
        /// Day of week, 0 = Monday (default: now)
        #[arg(long, value_parser = clap::value_parser!(u32).range(0..7))]
        dow: Option<u32>,

        /// Hour of day 0-23 (default: now)
        #[arg(long, value_parser = clap::value_parser!(u32).range(0..24))]
        hour: Option<u32>,

        /// base | ml | blend (default from config)
        #[arg(long)]
        mode: Option<BlendMode>,

        /// History window in days, 1-3650 (default from config)
        #[arg(long, value_parser = clap::value_parser!(u32).range(1..=MAX_LOOKBACK_DAYS as i64))]
        lookback_days: Option<u32>,

        #[arg(long)]
        json: bool,
    },

    /// Plan the next few hours: which area to work, hour by hour
    Plan {
        /// Start time today as HH:MM (default: now, rounded up to the quarter hour)
        #[arg(long)]
        start: Option<String>,

        /// Hours to plan, at most one week
        #[arg(long, value_parser = clap::value_parser!(u32).range(0..=MAX_PLAN_HOURS as i64))]
        hours: Option<u32>,

        /// Travel penalty per km
        #[arg(long)]
        beta: Option<f64>,

        #[arg(long)]
        mode: Option<BlendMode>,

        #[arg(long)]
        json: bool,
    },

    /// Show which shift records count as evidence and why others do not
    Records {
        /// Shift export to inspect (default from config)
        #[arg(long)]
        csv: Option<PathBuf>,
    },

    /// Model artifact status and metadata
    Model,

    /// Config file management
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },
}

#[derive(Subcommand, Debug)]
enum ConfigCommand {
    /// Write a default config if none exists
    Init,
    /// Print the effective config
    Show,
}

fn main() -> Result<()> {
    init_logging();
    let cli = Cli::parse();
    let config_path = cli.config;

    match cli.command {
        Command::Config { command } => match command {
            ConfigCommand::Init => config::init_config(),
            ConfigCommand::Show => {
                let cfg = load(&config_path)?;
                print!("{}", toml::to_string_pretty(&cfg).context("serialize config")?);
                Ok(())
            }
        },
        Command::Areas { json } => areas(&load(&config_path)?, json),
        Command::Stats {
            dow,
            hour,
            mode,
            lookback_days,
            json,
        } => stats(&load(&config_path)?, dow, hour, mode, lookback_days, json),
        Command::Plan {
            start,
            hours,
            beta,
            mode,
            json,
        } => plan(&load(&config_path)?, start, hours, beta, mode, json),
        Command::Records { csv } => records(&load(&config_path)?, csv),
        Command::Model => model(&load(&config_path)?),
    }
}

/// RUST_LOG filter (default `info`), stderr only.
fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn load(path: &Option<PathBuf>) -> Result<Config> {
    match path {
        Some(p) => config::load_config_from(p),
        None => config::load_config(),
    }
}

/// Local wall-clock now in the configured timezone.
fn local_now(cfg: &Config) -> Result<NaiveDateTime> {
    let tz = parse_tz(&cfg.query.timezone)?;
    Ok(local_naive(Utc::now(), tz))
}

fn build_engine<'a>(
    snap: &'a Snapshot,
    model: &'a TreePredictor,
    today: NaiveDate,
    lookback_days: u32,
) -> Engine<'a> {
    Engine::new(&snap.areas, &snap.store, &snap.consent, today)
        .with_model(model)
        .with_lookback_days(lookback_days)
}

fn areas(cfg: &Config, json: bool) -> Result<()> {
    let snap = Snapshot::load(cfg)?;
    let list: Vec<_> = snap.areas.iter().collect();
    if json {
        println!("{}", serde_json::to_string_pretty(&list)?);
        return Ok(());
    }
    for a in list {
        println!("{:<12} {:>9.4} {:>10.4}  {}", a.slug, a.lat, a.lng, a.name);
    }
    Ok(())
}

fn stats(
    cfg: &Config,
    dow: Option<u32>,
    hour: Option<u32>,
    mode: Option<BlendMode>,
    lookback_days: Option<u32>,
    json: bool,
) -> Result<()> {
    let now = local_now(cfg)?;
    let (now_dow, now_hour) = slot_of(now);
    let (dow, hour) = (dow.unwrap_or(now_dow), hour.unwrap_or(now_hour));
    let mode = mode.unwrap_or(cfg.query.mode);

    let snap = Snapshot::load(cfg)?;
    let model = TreePredictor::new(cfg.model_paths());
    let engine = build_engine(
        &snap,
        &model,
        now.date(),
        lookback_days.unwrap_or(cfg.query.lookback_days),
    );
    let rows = engine.ranking(dow, hour, mode);

    if json {
        println!("{}", serde_json::to_string_pretty(&rows)?);
    } else {
        println!("# dow={dow} hour={hour:02} mode={mode}\n");
        print!("{}", render_ranking(&rows));
    }
    Ok(())
}

fn plan(
    cfg: &Config,
    start: Option<String>,
    hours: Option<u32>,
    beta: Option<f64>,
    mode: Option<BlendMode>,
    json: bool,
) -> Result<()> {
    let now = local_now(cfg)?;
    let start = match start {
        Some(hhmm) => parse_start(now.date(), &hhmm)?,
        None => next_quarter_hour(now),
    };
    let hours = hours.unwrap_or(cfg.query.plan_hours);
    let beta = beta.unwrap_or(cfg.query.beta_per_km);
    let mode = mode.unwrap_or(cfg.query.mode);

    let snap = Snapshot::load(cfg)?;
    let model = TreePredictor::new(cfg.model_paths());
    let engine = build_engine(&snap, &model, now.date(), cfg.query.lookback_days);
    let rows = engine.plan_report(start, hours, beta, mode);

    if json {
        println!("{}", serde_json::to_string_pretty(&rows)?);
    } else {
        println!(
            "# plan from {} for {hours}h (beta={beta}/km, mode={mode})\n",
            start.format("%Y-%m-%d %H:%M")
        );
        print!("{}", render_plan(&rows));
    }
    Ok(())
}

fn records(cfg: &Config, csv: Option<PathBuf>) -> Result<()> {
    let mut cfg = cfg.clone();
    if let Some(p) = csv {
        cfg.data.shifts_csv = p;
    }
    let snap = Snapshot::load(&cfg)?;

    let mut usable = 0usize;
    let mut no_consent = 0usize;
    let mut excluded: BTreeMap<&'static str, usize> = BTreeMap::new();
    for r in snap.store.records() {
        if !snap.consent.may_aggregate(&r.user_id) {
            no_consent += 1;
            continue;
        }
        match r.evidence(&snap.areas) {
            Ok(_) => usable += 1,
            Err(reason) => *excluded.entry(reason.describe()).or_default() += 1,
        }
    }

    println!("Records: {} from {}", snap.store.len(), cfg.data.shifts_csv.display());
    println!("  usable evidence: {usable}");
    println!("  not shared (no consent): {no_consent}");
    for (reason, n) in &excluded {
        println!("  excluded, {reason}: {n}");
    }
    if !snap.skipped.is_empty() {
        println!("\nSkipped rows: {}", snap.skipped.len());
        for s in &snap.skipped {
            println!("  line {}: {}", s.line, s.reason);
        }
    }
    Ok(())
}

fn model(cfg: &Config) -> Result<()> {
    let predictor = TreePredictor::new(cfg.model_paths());
    let paths = predictor.paths();
    println!("blob: {}", paths.blob.display());
    println!("meta: {}", paths.meta.display());

    if !predictor.available() {
        println!("status: not available (queries use history only)");
        return Ok(());
    }

    match predictor.session() {
        Ok(session) => print_session(&session),
        Err(e) => println!("status: failed to load ({e})"),
    }
    Ok(())
}

fn print_session(session: &ModelSession) {
    let meta = session.meta();
    println!("status: loaded, {} trees", session.tree_count());
    println!("features: {}", meta.feature_order.join(", "));
    println!("areas: {}", meta.area_slugs.join(", "));
    if let Some(t) = &meta.trained_at {
        println!("trained_at: {t}");
    }
    if let Some(d) = meta.lookback_days {
        println!("lookback_days: {d}");
    }
    if let Some(mae) = meta.mae_val {
        println!("mae_val: {mae:.1}/h");
    }
}
