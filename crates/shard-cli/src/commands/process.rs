//! `shard process`: load inputs, reconstruct every site, validate, write JSON.

use anyhow::{Context, Result};
use clap::Args;
use serde::Serialize;
use shard_config::{LoadedMechanics, MechanicsConfig, UnusedKeyPolicy};
use shard_engine::{process_series, ProcessOptions, QualityWarning, SeriesCounts, SeriesInput};
use shard_schemas::RejectedRecord;
use shard_validate::{validate_series, ValidationReport};
use std::fs;
use std::path::Path;
use tracing::{info, warn};

use super::{load_ornaments, load_targets, load_telemetry};

#[derive(Args, Debug)]
pub struct ProcessArgs {
    /// Geocode file (JSON/YAML list of sites, or `{ sites: [...] }`)
    #[arg(long, conflicts_with = "custom", required_unless_present = "custom")]
    pub geocode: Option<String>,

    /// Derive sites from the telemetry itself, named `custom-<label>-<n>`
    #[arg(long, value_name = "LABEL")]
    pub custom: Option<String>,

    /// Telemetry exports (repeatable)
    #[arg(long = "telemetry", required = true)]
    pub telemetry: Vec<String>,

    /// Mechanics files in merge order (repeatable)
    #[arg(long = "mechanics")]
    pub mechanics: Vec<String>,

    #[arg(long)]
    pub ornaments: Option<String>,

    #[arg(long)]
    pub targets: Option<String>,

    /// Per-site output JSON
    #[arg(long)]
    pub out: String,

    /// Optional summary JSON (counts, warnings, validation)
    #[arg(long)]
    pub summary: Option<String>,

    /// Treat unknown mechanics keys as an error
    #[arg(long, default_value_t = false)]
    pub strict_config: bool,
}

/// Everything about a run except the sites themselves.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct RunSummary<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    config_hash: Option<&'a str>,
    counts: &'a SeriesCounts,
    warnings: &'a [QualityWarning],
    rejected_records: &'a [RejectedRecord],
    validation: &'a ValidationReport,
}

fn load_mechanics(paths: &[String], strict: bool) -> Result<Option<LoadedMechanics>> {
    if paths.is_empty() {
        return Ok(None);
    }
    let path_refs: Vec<&str> = paths.iter().map(|s| s.as_str()).collect();
    let loaded = shard_config::load_mechanics(&path_refs)?;

    let policy = if strict { UnusedKeyPolicy::Fail } else { UnusedKeyPolicy::Warn };
    let report = shard_config::report_unused_keys(&loaded.config.config_json, policy)?;
    for key in &report.unused_leaf_pointers {
        warn!(key = %key, "mechanics key not used");
    }
    Ok(Some(loaded))
}

fn write_json<T: Serialize>(path: &str, value: &T) -> Result<()> {
    if let Some(dir) = Path::new(path).parent().filter(|d| !d.as_os_str().is_empty()) {
        fs::create_dir_all(dir)
            .with_context(|| format!("create output dir failed: {}", dir.display()))?;
    }
    let json = serde_json::to_string_pretty(value).context("serialize output json failed")?;
    fs::write(path, json).with_context(|| format!("write failed: {}", path))
}

pub fn run(args: ProcessArgs, verbose: bool) -> Result<()> {
    let loaded = load_mechanics(&args.mechanics, args.strict_config)?;
    let (mechanics, config_hash) = match &loaded {
        Some(l) => (l.mechanics.clone(), Some(l.config.config_hash.clone())),
        None => (MechanicsConfig::default(), None),
    };

    let (telemetry, rejected) = load_telemetry(&args.telemetry)?;
    let ornaments = load_ornaments(args.ornaments.as_deref())?;
    let targets = load_targets(args.targets.as_deref())?;

    let geocode = match (&args.geocode, &args.custom) {
        (Some(path), _) => shard_config::load_geocode(path)?,
        (None, Some(label)) => {
            let sites = shard_engine::custom::derive_geocode(label, &telemetry);
            info!(label = %label, sites = sites.len(), "derived sites from telemetry");
            sites
        }
        (None, None) => anyhow::bail!("one of --geocode or --custom is required"),
    };

    let series = process_series(
        SeriesInput {
            geocode: &geocode,
            telemetry: &telemetry,
            ornaments: &ornaments,
            targets: &targets,
            mechanics: &mechanics,
        },
        &ProcessOptions {
            verbose,
            config_hash: config_hash.clone(),
        },
    );
    let validation = validate_series(&series, &mechanics);

    write_json(&args.out, &series.sites)?;
    if let Some(path) = &args.summary {
        write_json(
            path,
            &RunSummary {
                config_hash: config_hash.as_deref(),
                counts: &series.counts,
                warnings: &series.warnings,
                rejected_records: &rejected,
                validation: &validation,
            },
        )?;
    }

    println!(
        "process_ok=true sites={} records={} records_dropped={} records_rejected={} warnings={} \
         discrepancies={}",
        series.sites.len(),
        series.counts.records,
        series.counts.records_dropped,
        rejected.len(),
        series.warnings.len(),
        validation.discrepancies.len()
    );
    if let Some(h) = &config_hash {
        println!("config_hash={}", h);
    }
    println!("out_path={}", args.out);
    Ok(())
}
