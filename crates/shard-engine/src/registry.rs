use std::collections::BTreeMap;

use shard_geo::LatLng;
use shard_schemas::{Faction, Portal, PortalId, PortalKey};

/// Per-site portal arena. Ids start at 1 and follow first-sighting order;
/// the first observation of a key fixes its title and coordinates.
#[derive(Clone, Debug)]
pub struct PortalRegistry {
    by_key: BTreeMap<PortalKey, PortalId>,
    portals: BTreeMap<PortalId, Portal>,
    next_id: PortalId,
}

impl Default for PortalRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl PortalRegistry {
    pub fn new() -> Self {
        Self {
            by_key: BTreeMap::new(),
            portals: BTreeMap::new(),
            next_id: 1,
        }
    }

    pub fn get_or_create(&mut self, key: PortalKey, title: &str) -> PortalId {
        if let Some(id) = self.by_key.get(&key) {
            return *id;
        }
        let id = self.next_id;
        self.next_id += 1;
        let pos = LatLng::from_e6(key.lat_e6, key.lng_e6);
        self.by_key.insert(key, id);
        self.portals.insert(
            id,
            Portal {
                id,
                title: title.to_string(),
                lat: pos.lat,
                lng: pos.lng,
                ornament_id: None,
                target_factions: Vec::new(),
            },
        );
        id
    }

    pub fn lookup(&self, key: &PortalKey) -> Option<PortalId> {
        self.by_key.get(key).copied()
    }

    pub fn portal(&self, id: PortalId) -> Option<&Portal> {
        self.portals.get(&id)
    }

    pub fn position(&self, id: PortalId) -> Option<LatLng> {
        self.portal(id).map(|p| LatLng::new(p.lat, p.lng))
    }

    /// First ornament seen on a portal sticks.
    pub fn set_ornament(&mut self, id: PortalId, ornament_id: &str) {
        if let Some(p) = self.portals.get_mut(&id) {
            if p.ornament_id.is_none() {
                p.ornament_id = Some(ornament_id.to_string());
            }
        }
    }

    pub fn add_target_faction(&mut self, id: PortalId, faction: Faction) {
        if let Some(p) = self.portals.get_mut(&id) {
            if !p.target_factions.contains(&faction) {
                p.target_factions.push(faction);
                p.target_factions.sort();
            }
        }
    }

    pub fn len(&self) -> usize {
        self.portals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.portals.is_empty()
    }

    pub fn into_portals(self) -> BTreeMap<PortalId, Portal> {
        self.portals
    }
}
