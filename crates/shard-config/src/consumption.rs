//! Unused-key lint for mechanics documents.
//!
//! Consumed pointers are JSON Pointer patterns; a `*` token matches any one
//! key. A leaf under any consumed pattern is consumed, everything else is
//! reported. Typos in optional sections (`targetwaves`, `override`) would
//! otherwise be silently ignored by the typed loader.

use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;

static CONSUMED: &[&str] = &[
    "/brands/*/scoring",
    "/brands/*/waves",
    "/brands/*/targetWaves",
    "/brands/*/overrides",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnusedKeyPolicy {
    Warn,
    Fail,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnusedKeyReport {
    pub consumed_patterns: Vec<String>,
    /// Unused leaf pointers (sorted, unique).
    pub unused_leaf_pointers: Vec<String>,
}

impl UnusedKeyReport {
    pub fn is_clean(&self) -> bool {
        self.unused_leaf_pointers.is_empty()
    }
}

/// With `Fail`, unused keys are an error; with `Warn` the report is
/// returned for the caller to log.
pub fn report_unused_keys(config_json: &Value, policy: UnusedKeyPolicy) -> Result<UnusedKeyReport> {
    let mut leaves: Vec<String> = Vec::new();
    collect_leaf_pointers(config_json, "", &mut leaves);

    let mut unused: Vec<String> = leaves
        .into_iter()
        .filter(|lp| !CONSUMED.iter().any(|cp| is_consumed_by(cp, lp)))
        .collect();
    unused.sort();
    unused.dedup();

    let report = UnusedKeyReport {
        consumed_patterns: CONSUMED.iter().map(|s| s.to_string()).collect(),
        unused_leaf_pointers: unused,
    };

    if policy == UnusedKeyPolicy::Fail && !report.is_clean() {
        bail!(
            "CONFIG_UNUSED_KEYS: {} unused mechanics key(s). First few: {}",
            report.unused_leaf_pointers.len(),
            preview_list(&report.unused_leaf_pointers, 12)
        );
    }
    Ok(report)
}

/// `/a/*/c` consumes `/a/x/c` and `/a/x/c/d`, not `/a/x/cd`.
fn is_consumed_by(pattern: &str, leaf: &str) -> bool {
    let pat: Vec<&str> = pattern.split('/').skip(1).collect();
    let toks: Vec<&str> = leaf.split('/').skip(1).collect();
    if toks.len() < pat.len() {
        return false;
    }
    pat.iter().zip(&toks).all(|(p, t)| *p == "*" || p == t)
}

fn collect_leaf_pointers(v: &Value, prefix: &str, out: &mut Vec<String>) {
    match v {
        Value::Object(map) if !map.is_empty() => {
            for (k, vv) in map {
                let next = format!("{}/{}", prefix, escape_pointer_token(k));
                collect_leaf_pointers(vv, &next, out);
            }
        }
        Value::Array(arr) if !arr.is_empty() => {
            for (i, vv) in arr.iter().enumerate() {
                let next = format!("{}/{}", prefix, i);
                collect_leaf_pointers(vv, &next, out);
            }
        }
        _ => {
            if !prefix.is_empty() {
                out.push(prefix.to_string());
            }
        }
    }
}

fn escape_pointer_token(s: &str) -> String {
    s.replace('~', "~0").replace('/', "~1")
}

fn preview_list(items: &[String], n: usize) -> String {
    let take = items.iter().take(n).cloned().collect::<Vec<_>>();
    format!("{:?}", take)
}
