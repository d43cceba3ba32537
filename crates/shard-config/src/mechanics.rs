use std::collections::BTreeMap;

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use shard_schemas::FactionTally;
use shard_scoring::{RuleBook, RuleTable, ScoringRule};

use crate::{load_layered_yaml, load_layered_yaml_from_strings, LoadedConfig};

/// One object wave, offsets in minutes from the site start. `end_offset`
/// is inclusive of its minute.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WaveSpec {
    pub start_offset: i64,
    pub end_offset: i64,
    #[serde(default)]
    pub quantity: u32,
}

/// Expected target sightings per faction for one window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TargetWaveSpec {
    pub start_offset: i64,
    pub end_offset: i64,
    #[serde(default)]
    pub faction_quantity: FactionTally,
}

/// Per-site replacement of wave quantities, matched on the geocode name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SiteOverride {
    pub site: String,
    #[serde(default)]
    pub shard_counts: Vec<u32>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BrandMechanics {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scoring: Option<Vec<ScoringRule>>,
    #[serde(default)]
    pub waves: Vec<WaveSpec>,
    #[serde(default)]
    pub target_waves: Vec<TargetWaveSpec>,
    #[serde(default)]
    pub overrides: Vec<SiteOverride>,
}

impl BrandMechanics {
    pub fn site_override(&self, site_name: &str) -> Option<&SiteOverride> {
        self.overrides.iter().rev().find(|o| o.site == site_name)
    }

    /// Wave quantity, replaced by the site override when it names this
    /// wave index.
    pub fn expected_quantity(&self, index: usize, site_name: &str) -> Option<u32> {
        let base = self.waves.get(index)?.quantity;
        let overridden = self
            .site_override(site_name)
            .and_then(|o| o.shard_counts.get(index).copied());
        Some(overridden.unwrap_or(base))
    }

    /// Total expected objects for the whole event at one site.
    pub fn expected_objects(&self, site_name: &str) -> u32 {
        (0..self.waves.len())
            .filter_map(|i| self.expected_quantity(i, site_name))
            .sum()
    }

    pub fn expected_targets(&self) -> FactionTally {
        let mut t = FactionTally::default();
        for w in &self.target_waves {
            for f in shard_schemas::Faction::ALL {
                t.add(f, w.faction_quantity.get(f));
            }
        }
        t
    }
}

/// Largest accepted wave offset either side of the site start: ten years.
pub const MAX_WAVE_OFFSET_MIN: i64 = 10 * 366 * 24 * 60;

/// Typed mechanics document: `brands: { BRAND: BrandMechanics }`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MechanicsConfig {
    #[serde(default)]
    pub brands: BTreeMap<String, BrandMechanics>,
}

impl MechanicsConfig {
    pub fn brand(&self, brand: &str) -> Option<&BrandMechanics> {
        self.brands.get(brand)
    }

    /// Built-in tables overlaid with every brand that declares `scoring`.
    pub fn rule_book(&self) -> RuleBook {
        let mut book = RuleBook::builtin();
        for (brand, m) in &self.brands {
            if let Some(rules) = &m.scoring {
                book.insert(brand.clone(), RuleTable::new(rules.clone()));
            }
        }
        book
    }

    pub fn from_loaded(loaded: &LoadedConfig) -> Result<Self> {
        let cfg: MechanicsConfig = serde_json::from_value(loaded.config_json.clone())
            .context("mechanics config does not match expected shape")?;
        cfg.check()?;
        Ok(cfg)
    }

    /// Load-time sanity checks on rule tables and wave windows.
    pub fn check(&self) -> Result<()> {
        for (brand, m) in &self.brands {
            if let Some(rules) = &m.scoring {
                for (i, r) in rules.iter().enumerate() {
                    check_rule(brand, i, r)?;
                }
            }
            for (i, w) in m.waves.iter().enumerate() {
                check_window(brand, "wave", i, w.start_offset, w.end_offset)?;
            }
            for (i, w) in m.target_waves.iter().enumerate() {
                check_window(brand, "targetWave", i, w.start_offset, w.end_offset)?;
            }
        }
        Ok(())
    }
}

fn check_window(brand: &str, what: &str, index: usize, start: i64, end: i64) -> Result<()> {
    for (name, offset) in [("startOffset", start), ("endOffset", end)] {
        if offset.unsigned_abs() > MAX_WAVE_OFFSET_MIN as u64 {
            bail!(
                "CONFIG_INVALID_WAVE brand={} {}={}: {} {} outside +/-{} minutes",
                brand,
                what,
                index,
                name,
                offset,
                MAX_WAVE_OFFSET_MIN
            );
        }
    }
    if end < start {
        bail!(
            "CONFIG_INVALID_WAVE brand={} {}={}: endOffset {} before startOffset {}",
            brand,
            what,
            index,
            end,
            start
        );
    }
    Ok(())
}

fn check_rule(brand: &str, index: usize, r: &ScoringRule) -> Result<()> {
    if !r.min_distance.is_finite() || r.min_distance < 0.0 {
        bail!(
            "CONFIG_INVALID_RULE brand={} rule={}: minDistance must be >= 0 (got {})",
            brand,
            index,
            r.min_distance
        );
    }
    if let Some(max) = r.max_distance {
        if max.is_nan() || max <= r.min_distance {
            bail!(
                "CONFIG_INVALID_RULE brand={} rule={}: maxDistance {} must exceed minDistance {}",
                brand,
                index,
                max,
                r.min_distance
            );
        }
    }
    Ok(())
}

/// Typed mechanics plus the provenance of the merged document.
#[derive(Debug, Clone)]
pub struct LoadedMechanics {
    pub mechanics: MechanicsConfig,
    pub config: LoadedConfig,
}

pub fn load_mechanics(paths: &[&str]) -> Result<LoadedMechanics> {
    let config = load_layered_yaml(paths)?;
    let mechanics = MechanicsConfig::from_loaded(&config)?;
    Ok(LoadedMechanics { mechanics, config })
}

pub fn load_mechanics_from_strings(docs: &[&str]) -> Result<LoadedMechanics> {
    let config = load_layered_yaml_from_strings(docs)?;
    let mechanics = MechanicsConfig::from_loaded(&config)?;
    Ok(LoadedMechanics { mechanics, config })
}
