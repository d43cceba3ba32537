//! Reconstructed output consumed by the rendering layer.
//!
//! Portals are referenced everywhere by their site-scoped integer id, never
//! embedded, so paths and objects stay flat.

use std::collections::BTreeMap;

use serde::{Serialize, Serializer};
use shard_geo::LatLng;

use crate::{Faction, FactionTally, HistoryReason, SiteGeocode};

/// Site-scoped portal id; assigned from 1 in first-sighting order.
pub type PortalId = u32;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Portal {
    pub id: PortalId,
    pub title: String,
    pub lat: f64,
    pub lng: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ornament_id: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub target_factions: Vec<Faction>,
}

/// One step of a reconstructed object timeline.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    pub reason: HistoryReason,
    pub move_time: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub portal_id: Option<PortalId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dest: Option<PortalId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub team: Option<Faction>,
}

/// One lifecycle (spawn to despawn) of a tracked object.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ShardObject {
    pub id: u64,
    pub history: Vec<HistoryEntry>,
    /// Whether any LINK/JUMP was accepted for this object.
    #[serde(skip)]
    pub moved: bool,
}

impl ShardObject {
    pub fn spawn_time(&self) -> Option<i64> {
        self.history
            .iter()
            .find(|h| h.reason == HistoryReason::Spawn)
            .map(|h| h.move_time)
    }
}

/// Order-independent key of a portal pair, rendered `"low-high"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PathKey {
    pub low: PortalId,
    pub high: PortalId,
}

impl PathKey {
    pub fn new(a: PortalId, b: PortalId) -> Self {
        if a <= b {
            Self { low: a, high: b }
        } else {
            Self { low: b, high: a }
        }
    }
}

impl std::fmt::Display for PathKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}-{}", self.low, self.high)
    }
}

impl Serialize for PathKey {
    fn serialize<S: Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
        s.collect_str(self)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkMove {
    pub origin: PortalId,
    pub dest: PortalId,
    pub object_id: u64,
    pub move_time: i64,
    pub points: u32,
}

/// A link, identified within its path by creation time. Several objects may
/// travel the same link.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PathLink {
    pub link_time: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub team: Option<Faction>,
    pub moves: Vec<LinkMove>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PathJump {
    pub origin: PortalId,
    pub dest: PortalId,
    pub object_id: u64,
    pub move_time: i64,
}

/// Everything observed between one unordered pair of portals.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ShardPath {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub links: Vec<PathLink>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub jumps: Vec<PathJump>,
    pub distance: f64,
}

impl ShardPath {
    pub fn new(distance: f64) -> Self {
        Self {
            links: Vec::new(),
            jumps: Vec::new(),
            distance,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectCounters {
    pub moving: u32,
    pub non_moving: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewCounters {
    pub objects: ObjectCounters,
    /// Distinct links (by path + creation time).
    pub links: u32,
    /// Distinct portal pairs.
    pub paths: u32,
    pub alignment_mismatches: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub targets: Option<FactionTally>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TargetEntry {
    pub portal_id: PortalId,
    pub faction: Faction,
    pub observed_at: i64,
}

/// Absolute bounds of a wave view, epoch ms, `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WaveWindow {
    pub index: usize,
    pub start_ms: i64,
    pub end_ms: i64,
}

/// One scored reconstruction: the full event or a single wave.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct View {
    pub objects: Vec<ShardObject>,
    pub paths: BTreeMap<PathKey, ShardPath>,
    pub scores: FactionTally,
    pub counters: ViewCounters,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub targets: Option<Vec<TargetEntry>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub window: Option<WaveWindow>,
    /// Expected object count for this wave (mechanic quantity or per-site
    /// override). Only used for validation.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expected_quantity: Option<u32>,
}

/// Per-site output.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SiteData {
    pub geocode: SiteGeocode,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub centroid: Option<LatLng>,
    pub portals: BTreeMap<PortalId, Portal>,
    pub full_event: View,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub waves: Option<Vec<View>>,
    pub has_target_data: bool,
}
