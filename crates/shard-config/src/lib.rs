//! shard-config
//!
//! Layered mechanics config and geocode loading.
//!
//! - Mechanics YAML/JSON docs merge in order: earlier docs are the base,
//!   later docs override by deep merge.
//! - The merged document is canonicalized and hashed (SHA-256) so output can
//!   be traced back to the exact config that produced it.
//! - Typed views (`MechanicsConfig`, geocode entries) are validated at load
//!   time; bad rule tables and unparseable site dates are load errors.

mod consumption;
mod geocode;
mod mechanics;

pub use consumption::{report_unused_keys, UnusedKeyPolicy, UnusedKeyReport};
pub use geocode::{load_geocode, load_geocode_from_str};
pub use mechanics::{
    load_mechanics, load_mechanics_from_strings, BrandMechanics, LoadedMechanics,
    MechanicsConfig, SiteOverride, TargetWaveSpec, WaveSpec, MAX_WAVE_OFFSET_MIN,
};

use anyhow::{Context, Result};
use serde_json::Value;
use sha2::{Digest, Sha256};
use std::fs;

#[derive(Debug, Clone)]
pub struct LoadedConfig {
    pub config_hash: String,
    pub canonical_json: String,
    pub config_json: Value,
}

pub fn load_layered_yaml(paths: &[&str]) -> Result<LoadedConfig> {
    let mut docs: Vec<String> = Vec::new();
    for p in paths {
        let raw =
            fs::read_to_string(p).with_context(|| format!("failed to read config path: {p}"))?;
        docs.push(raw);
    }

    let doc_refs: Vec<&str> = docs.iter().map(|s| s.as_str()).collect();
    load_layered_yaml_from_strings(&doc_refs)
}

pub fn load_layered_yaml_from_strings(yaml_docs: &[&str]) -> Result<LoadedConfig> {
    let mut merged = serde_json::json!({});
    for (i, raw) in yaml_docs.iter().enumerate() {
        let v_yaml: serde_yaml::Value =
            serde_yaml::from_str(raw).with_context(|| format!("invalid yaml (layer {i})"))?;
        let v_json = serde_json::to_value(v_yaml).context("yaml->json conversion failed")?;
        merged = deep_merge(merged, v_json);
    }

    let canonical_json = canonicalize_json(&merged)?;
    let config_hash = sha256_hex(canonical_json.as_bytes());
    Ok(LoadedConfig {
        config_hash,
        canonical_json,
        config_json: merged,
    })
}

/// Objects merge key by key; anything else (arrays included) is replaced.
fn deep_merge(a: Value, b: Value) -> Value {
    match (a, b) {
        (Value::Object(mut a_map), Value::Object(b_map)) => {
            for (k, b_val) in b_map {
                let a_val = a_map.remove(&k).unwrap_or(Value::Null);
                a_map.insert(k, deep_merge(a_val, b_val));
            }
            Value::Object(a_map)
        }
        (_, b_other) => b_other,
    }
}

fn canonicalize_json(v: &Value) -> Result<String> {
    // serde_json's default Map is ordered by key, so compact output is
    // canonical for a given value.
    let s = serde_json::to_string(v).context("canonical json serialize failed")?;
    Ok(s)
}

fn sha256_hex(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn arrays_are_replaced_not_concatenated() {
        let a = serde_json::json!({ "w": [1, 2, 3], "k": { "x": 1 } });
        let b = serde_json::json!({ "w": [9], "k": { "y": 2 } });
        let m = deep_merge(a, b);
        assert_eq!(m, serde_json::json!({ "w": [9], "k": { "x": 1, "y": 2 } }));
    }
}
