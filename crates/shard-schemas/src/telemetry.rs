use serde::{Deserialize, Serialize};
use shard_geo::LatLng;

use crate::epoch_ms;

/// Top-level telemetry export. Artifacts without fragments are ignored by
/// the engine.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ShardJumpTimes {
    #[serde(default)]
    pub artifact: Vec<Artifact>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Artifact {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fragment: Option<Vec<Fragment>>,
}

/// One tracked object's raw record. The `id` ends in a numeric suffix
/// (`abaddon1_12`) that may be reused by several lifecycles in one event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Fragment {
    pub id: String,
    #[serde(default)]
    pub history: Vec<HistoryEvent>,
}

impl Fragment {
    /// Stable sort of the history by move time. Input order is not
    /// guaranteed.
    pub fn sort_history(&mut self) {
        self.history.sort_by_key(|h| h.move_time_ms);
    }

    pub fn spawn_count(&self) -> usize {
        self.history
            .iter()
            .filter(|h| h.reason == HistoryReason::Spawn)
            .count()
    }

    /// Earliest SPAWN event. Expects a sorted history.
    pub fn first_spawn(&self) -> Option<&HistoryEvent> {
        self.history
            .iter()
            .find(|h| h.reason == HistoryReason::Spawn)
    }

    pub fn spawn_time_ms(&self) -> Option<i64> {
        self.first_spawn().map(|h| h.move_time_ms)
    }

    pub fn spawn_position(&self) -> Option<LatLng> {
        self.first_spawn()
            .and_then(|h| h.destination_portal_info.as_ref())
            .map(PortalInfo::position)
    }
}

/// Numeric object id: the digits after the last `_`, or the whole id when
/// there is no prefix. Trailing non-digits are ignored.
pub fn parse_object_id(raw: &str) -> Option<u64> {
    let suffix = match raw.rfind('_') {
        Some(i) => &raw[i + 1..],
        None => raw,
    };
    let digits: String = suffix
        .trim()
        .chars()
        .take_while(|c| c.is_ascii_digit())
        .collect();
    digits.parse().ok()
}

/// Why a history entry was written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "String", from = "String")]
pub enum HistoryReason {
    Spawn,
    NoMove,
    Link,
    Jump,
    Despawn,
    Unknown(String),
}

impl HistoryReason {
    pub fn as_str(&self) -> &str {
        match self {
            HistoryReason::Spawn => "spawn",
            HistoryReason::NoMove => "no move",
            HistoryReason::Link => "link",
            HistoryReason::Jump => "jump",
            HistoryReason::Despawn => "despawn",
            HistoryReason::Unknown(s) => s,
        }
    }
}

impl std::fmt::Display for HistoryReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<HistoryReason> for String {
    fn from(v: HistoryReason) -> Self {
        match v {
            HistoryReason::Unknown(s) => s,
            other => other.as_str().to_string(),
        }
    }
}

impl From<String> for HistoryReason {
    fn from(s: String) -> Self {
        match s.as_str() {
            "spawn" => HistoryReason::Spawn,
            "no move" => HistoryReason::NoMove,
            "link" => HistoryReason::Link,
            "jump" => HistoryReason::Jump,
            "despawn" => HistoryReason::Despawn,
            _ => HistoryReason::Unknown(s),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEvent {
    pub reason: HistoryReason,
    #[serde(deserialize_with = "epoch_ms::deserialize")]
    pub move_time_ms: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub origin_portal_info: Option<PortalInfo>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub destination_portal_info: Option<PortalInfo>,
    #[serde(
        default,
        deserialize_with = "epoch_ms::deserialize_opt",
        skip_serializing_if = "Option::is_none"
    )]
    pub link_creation_time_ms: Option<i64>,
    #[serde(default, alias = "originTeam", skip_serializing_if = "Option::is_none")]
    pub origin_capturer_team: Option<String>,
    #[serde(
        default,
        alias = "destinationTeam",
        skip_serializing_if = "Option::is_none"
    )]
    pub destination_capturer_team: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link_creator_team: Option<String>,
}

/// Portal as seen by one history entry. Coordinates are micro-degrees.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PortalInfo {
    #[serde(default)]
    pub title: String,
    #[serde(rename = "latE6")]
    pub lat_e6: i64,
    #[serde(rename = "lngE6")]
    pub lng_e6: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub team: Option<String>,
}

impl PortalInfo {
    pub fn key(&self) -> PortalKey {
        PortalKey::new(self.lat_e6, self.lng_e6)
    }

    pub fn position(&self) -> LatLng {
        LatLng::from_e6(self.lat_e6, self.lng_e6)
    }
}

/// Canonical portal identity: the quantized coordinates. Two observations
/// with equal keys are the same physical portal, whatever their source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PortalKey {
    pub lat_e6: i64,
    pub lng_e6: i64,
}

impl PortalKey {
    pub fn new(lat_e6: i64, lng_e6: i64) -> Self {
        Self { lat_e6, lng_e6 }
    }

    /// Quantize decimal degrees to micro-degrees.
    pub fn from_degrees(lat: f64, lng: f64) -> Self {
        Self {
            lat_e6: (lat * 1e6).round() as i64,
            lng_e6: (lng * 1e6).round() as i64,
        }
    }
}

impl std::fmt::Display for PortalKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}_{}", self.lat_e6, self.lng_e6)
    }
}
