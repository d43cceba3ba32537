//! Command handlers for the `shard` binary.
//!
//! Input loading shared by the command paths lives here.

pub mod process;

use anyhow::{Context, Result};
use shard_schemas::{OrnamentSighting, RejectedRecord, ShardJumpTimes, TargetSighting};
use std::fs;
use tracing::warn;

/// Read a UTF-8 text file, tolerating a leading BOM.
pub fn read_text(path: &str) -> Result<String> {
    let bytes = fs::read(path).with_context(|| format!("read failed: {}", path))?;
    let bytes = bytes.strip_prefix(&[0xEF, 0xBB, 0xBF]).unwrap_or(&bytes);
    String::from_utf8(bytes.to_vec()).with_context(|| format!("{} must be UTF-8 text", path))
}

/// All telemetry exports, in the order given. Entries that could not be
/// read are logged and returned alongside; the rest of the file is kept.
pub fn load_telemetry(paths: &[String]) -> Result<(Vec<ShardJumpTimes>, Vec<RejectedRecord>)> {
    let mut exports = Vec::new();
    let mut rejected = Vec::new();
    for p in paths {
        let raw = read_text(p)?;
        let parsed =
            shard_schemas::parse_telemetry(&raw).with_context(|| format!("telemetry file: {}", p))?;
        for r in &parsed.rejected {
            warn!(file = %p, "telemetry record rejected: {r}");
        }
        exports.extend(parsed.exports);
        rejected.extend(parsed.rejected);
    }
    Ok((exports, rejected))
}

pub fn load_ornaments(path: Option<&str>) -> Result<Vec<OrnamentSighting>> {
    let Some(p) = path else {
        return Ok(Vec::new());
    };
    let raw = read_text(p)?;
    shard_schemas::parse_ornaments(&raw).with_context(|| format!("ornament file: {}", p))
}

pub fn load_targets(path: Option<&str>) -> Result<Vec<TargetSighting>> {
    let Some(p) = path else {
        return Ok(Vec::new());
    };
    let raw = read_text(p)?;
    shard_schemas::parse_targets(&raw).with_context(|| format!("target file: {}", p))
}
