//! Data-quality ledger.
//!
//! Nothing in the engine fails on bad data. Each problem is logged and kept
//! as a typed entry so callers can audit a pass without scraping logs.

use serde::Serialize;

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum QualityWarning {
    /// Geocode entry whose date or zone cannot be resolved; never matched.
    #[serde(rename_all = "camelCase")]
    SiteDateUnresolved { site: String, message: String },
    #[serde(rename_all = "camelCase")]
    RecordWithoutSpawn { record: String },
    #[serde(rename_all = "camelCase")]
    RecordWithoutPosition { record: String },
    #[serde(rename_all = "camelCase")]
    BadObjectId { record: String },
    #[serde(rename_all = "camelCase")]
    NoSiteMatch { record: String, spawn_ms: i64 },
    #[serde(rename_all = "camelCase")]
    EventBeforeSpawn { site: String, object_id: u64, reason: String, move_time: i64 },
    #[serde(rename_all = "camelCase")]
    MissingPortalInfo { site: String, object_id: u64, reason: String, move_time: i64 },
    #[serde(rename_all = "camelCase")]
    UnregisteredPortal { site: String, object_id: u64, portal: String },
    /// JUMP carrying a link creation time; probably a link.
    #[serde(rename_all = "camelCase")]
    JumpWithLinkTime { site: String, object_id: u64, move_time: i64 },
    /// LINK without a link creation time; probably a jump.
    #[serde(rename_all = "camelCase")]
    LinkWithoutLinkTime { site: String, object_id: u64, move_time: i64 },
    #[serde(rename_all = "camelCase")]
    UnknownReason { site: String, object_id: u64, reason: String },
    #[serde(rename_all = "camelCase")]
    AlignmentMismatch {
        site: String,
        object_id: u64,
        move_time: i64,
        origin: Option<String>,
        link: Option<String>,
        dest: Option<String>,
    },
    /// Wave window that cannot be placed relative to the site start.
    #[serde(rename_all = "camelCase")]
    WaveOutOfRange {
        site: String,
        wave: usize,
        start_offset: i64,
        end_offset: i64,
    },
    #[serde(rename_all = "camelCase")]
    ObservationWithoutPosition { ornament_id: String },
    #[serde(rename_all = "camelCase")]
    AmbiguousOrnament { ornament_id: String, portal: String, sites: Vec<String> },
}

impl std::fmt::Display for QualityWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        use QualityWarning::*;
        match self {
            SiteDateUnresolved { site, message } => {
                write!(f, "site {site}: unusable date ({message})")
            }
            RecordWithoutSpawn { record } => write!(f, "record {record}: no spawn event"),
            RecordWithoutPosition { record } => {
                write!(f, "record {record}: spawn has no portal info")
            }
            BadObjectId { record } => write!(f, "record {record}: no numeric object id"),
            NoSiteMatch { record, spawn_ms } => {
                write!(f, "record {record}: no site within range of spawn at {spawn_ms}")
            }
            EventBeforeSpawn { site, object_id, reason, move_time } => write!(
                f,
                "object {object_id} ({site}): {reason} at {move_time} before any spawn"
            ),
            MissingPortalInfo { site, object_id, reason, move_time } => write!(
                f,
                "object {object_id} ({site}): missing portal info for {reason} at {move_time}"
            ),
            UnregisteredPortal { site, object_id, portal } => {
                write!(f, "object {object_id} ({site}): portal {portal} not registered")
            }
            JumpWithLinkTime { site, object_id, move_time } => write!(
                f,
                "object {object_id} ({site}): jump at {move_time} has a link time; possibly a link"
            ),
            LinkWithoutLinkTime { site, object_id, move_time } => write!(
                f,
                "object {object_id} ({site}): link at {move_time} has no link time; possibly a jump"
            ),
            UnknownReason { site, object_id, reason } => {
                write!(f, "object {object_id} ({site}): unknown reason {reason:?}")
            }
            AlignmentMismatch { site, object_id, move_time, origin, link, dest } => write!(
                f,
                "object {object_id} ({site}): alignment mismatch at {move_time} \
                 (origin {}, link {}, dest {})",
                team_text(origin),
                team_text(link),
                team_text(dest)
            ),
            WaveOutOfRange { site, wave, start_offset, end_offset } => write!(
                f,
                "site {site}: wave {wave} offsets {start_offset}..={end_offset} min \
                 out of range; skipped"
            ),
            ObservationWithoutPosition { ornament_id } => {
                write!(f, "ornament {ornament_id}: observation has no position")
            }
            AmbiguousOrnament { ornament_id, portal, sites } => write!(
                f,
                "ornament {ornament_id} at {portal}: matches {} sites ({}); dropped",
                sites.len(),
                sites.join(", ")
            ),
        }
    }
}

fn team_text(t: &Option<String>) -> &str {
    t.as_deref().unwrap_or("none")
}

/// Ordered warnings from one pass.
#[derive(Clone, Debug, Default)]
pub struct WarningLedger {
    entries: Vec<QualityWarning>,
}

impl WarningLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Log at warn and record.
    pub fn push(&mut self, w: QualityWarning) {
        tracing::warn!("{w}");
        self.entries.push(w);
    }

    /// Record only; the caller picks the log level.
    pub fn record(&mut self, w: QualityWarning) {
        self.entries.push(w);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn into_vec(self) -> Vec<QualityWarning> {
        self.entries
    }
}
