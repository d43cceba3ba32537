use serde::{Deserialize, Serialize};
use shard_geo::LatLng;

use crate::{epoch_ms, Faction, PortalKey};

/// A portal observed carrying an ornament. Position arrives either as
/// micro-degrees or as decimal degrees.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrnamentSighting {
    #[serde(default)]
    pub title: String,
    #[serde(default, rename = "latE6", skip_serializing_if = "Option::is_none")]
    pub lat_e6: Option<i64>,
    #[serde(default, rename = "lngE6", skip_serializing_if = "Option::is_none")]
    pub lng_e6: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lat: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lng: Option<f64>,
    pub ornament_id: String,
    #[serde(deserialize_with = "epoch_ms::deserialize")]
    pub observed_at: i64,
}

impl OrnamentSighting {
    /// Canonical key; micro-degrees win over decimal degrees.
    pub fn key(&self) -> Option<PortalKey> {
        match (self.lat_e6, self.lng_e6, self.lat, self.lng) {
            (Some(lat), Some(lng), _, _) => Some(PortalKey::new(lat, lng)),
            (_, _, Some(lat), Some(lng)) => Some(PortalKey::from_degrees(lat, lng)),
            _ => None,
        }
    }

    pub fn position(&self) -> Option<LatLng> {
        self.key().map(|k| LatLng::from_e6(k.lat_e6, k.lng_e6))
    }
}

/// A faction target observed at a portal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TargetSighting {
    #[serde(default)]
    pub title: String,
    #[serde(rename = "latE6")]
    pub lat_e6: i64,
    #[serde(rename = "lngE6")]
    pub lng_e6: i64,
    pub faction: Faction,
    #[serde(deserialize_with = "epoch_ms::deserialize")]
    pub observed_at: i64,
}

impl TargetSighting {
    pub fn key(&self) -> PortalKey {
        PortalKey::new(self.lat_e6, self.lng_e6)
    }

    pub fn position(&self) -> LatLng {
        LatLng::from_e6(self.lat_e6, self.lng_e6)
    }
}
