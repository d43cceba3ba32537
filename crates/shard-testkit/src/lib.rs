//! shard-testkit
//!
//! Fixture builders for telemetry, sightings and geocode, shared by the
//! scenario tests of the other crates.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Serialize;
use shard_geo::EARTH_RADIUS_M;
use shard_schemas::{
    Artifact, Faction, Fragment, HistoryEvent, HistoryReason, OrnamentSighting, PortalInfo,
    ShardJumpTimes, SiteGeocode, TargetSighting,
};

/// 2025-06-01T14:00:00 Europe/Amsterdam (12:00Z).
pub const AMS_START_MS: i64 = 1_748_779_200_000;
pub const AMS_START_LOCAL: &str = "2025-06-01T14:00:00";
pub const AMS_ZONE: &str = "Europe/Amsterdam";
pub const MINUTE_MS: i64 = 60_000;

/// Dam square, Amsterdam.
pub const DAM_LAT_E6: i64 = 52_373_080;
pub const DAM_LNG_E6: i64 = 4_892_453;

pub const RES: &str = "RESISTANCE";
pub const ENL: &str = "ENLIGHTENED";
pub const MAC: &str = "MACHINA";

pub fn portal(title: &str, lat_e6: i64, lng_e6: i64) -> PortalInfo {
    PortalInfo {
        title: title.to_string(),
        lat_e6,
        lng_e6,
        team: None,
    }
}

pub fn with_team(mut p: PortalInfo, team: &str) -> PortalInfo {
    p.team = Some(team.to_string());
    p
}

/// Portal `meters` due north of `base` along the meridian (micro-degree
/// rounding keeps it within ~0.06 m).
pub fn north_of(base: &PortalInfo, title: &str, meters: f64) -> PortalInfo {
    let m_per_e6 = EARTH_RADIUS_M * std::f64::consts::PI / 180.0 / 1e6;
    portal(title, base.lat_e6 + (meters / m_per_e6).round() as i64, base.lng_e6)
}

pub fn dam() -> PortalInfo {
    portal("Dam", DAM_LAT_E6, DAM_LNG_E6)
}

fn event(reason: HistoryReason, t: i64) -> HistoryEvent {
    HistoryEvent {
        reason,
        move_time_ms: t,
        origin_portal_info: None,
        destination_portal_info: None,
        link_creation_time_ms: None,
        origin_capturer_team: None,
        destination_capturer_team: None,
        link_creator_team: None,
    }
}

/// Builds one raw record's history. Events are kept in call order; the
/// engine sorts by time itself.
#[derive(Clone, Debug)]
pub struct FragmentBuilder {
    id: String,
    history: Vec<HistoryEvent>,
}

impl FragmentBuilder {
    pub fn new(id: &str) -> Self {
        Self {
            id: id.to_string(),
            history: Vec::new(),
        }
    }

    pub fn spawn(mut self, t: i64, at: &PortalInfo, team: Option<&str>) -> Self {
        let mut e = event(HistoryReason::Spawn, t);
        e.destination_portal_info = Some(at.clone());
        e.destination_capturer_team = team.map(str::to_string);
        self.history.push(e);
        self
    }

    pub fn no_move(mut self, t: i64) -> Self {
        self.history.push(event(HistoryReason::NoMove, t));
        self
    }

    pub fn jump(mut self, t: i64, from: &PortalInfo, to: &PortalInfo) -> Self {
        let mut e = event(HistoryReason::Jump, t);
        e.origin_portal_info = Some(from.clone());
        e.destination_portal_info = Some(to.clone());
        self.history.push(e);
        self
    }

    pub fn link(
        mut self,
        t: i64,
        link_time: i64,
        from: &PortalInfo,
        to: &PortalInfo,
        team: &str,
    ) -> Self {
        let mut e = event(HistoryReason::Link, t);
        e.origin_portal_info = Some(from.clone());
        e.destination_portal_info = Some(to.clone());
        e.link_creation_time_ms = Some(link_time);
        e.link_creator_team = Some(team.to_string());
        self.history.push(e);
        self
    }

    pub fn despawn(mut self, t: i64, at: &PortalInfo, team: Option<&str>) -> Self {
        let mut e = event(HistoryReason::Despawn, t);
        e.origin_portal_info = Some(at.clone());
        e.origin_capturer_team = team.map(str::to_string);
        self.history.push(e);
        self
    }

    pub fn raw(mut self, e: HistoryEvent) -> Self {
        self.history.push(e);
        self
    }

    pub fn build(self) -> Fragment {
        Fragment {
            id: self.id,
            history: self.history,
        }
    }
}

/// Bare event, for malformed-history cases.
pub fn bare_event(reason: HistoryReason, t: i64) -> HistoryEvent {
    event(reason, t)
}

pub fn export(name: &str, fragments: Vec<Fragment>) -> ShardJumpTimes {
    ShardJumpTimes {
        artifact: vec![Artifact {
            id: name.to_string(),
            name: name.to_string(),
            fragment: Some(fragments),
        }],
    }
}

pub fn site(id: &str, lat: f64, lng: f64, brand: &str) -> SiteGeocode {
    SiteGeocode {
        id: id.to_string(),
        name: Some(id.to_string()),
        lat,
        lng,
        date: AMS_START_LOCAL.to_string(),
        timezone: Some(AMS_ZONE.to_string()),
        brand: brand.to_string(),
        country_code: None,
    }
}

/// Site centred on Dam square, starting at `AMS_START_LOCAL`.
pub fn dam_site(id: &str, brand: &str) -> SiteGeocode {
    site(id, DAM_LAT_E6 as f64 / 1e6, DAM_LNG_E6 as f64 / 1e6, brand)
}

pub fn ornament(at: &PortalInfo, ornament_id: &str, observed_at: i64) -> OrnamentSighting {
    OrnamentSighting {
        title: at.title.clone(),
        lat_e6: Some(at.lat_e6),
        lng_e6: Some(at.lng_e6),
        lat: None,
        lng: None,
        ornament_id: ornament_id.to_string(),
        observed_at,
    }
}

pub fn target(at: &PortalInfo, faction: Faction, observed_at: i64) -> TargetSighting {
    TargetSighting {
        title: at.title.clone(),
        lat_e6: at.lat_e6,
        lng_e6: at.lng_e6,
        faction,
        observed_at,
    }
}

pub fn write_json<T: Serialize>(dir: &Path, name: &str, value: &T) -> Result<PathBuf> {
    let path = dir.join(name);
    let raw = serde_json::to_string_pretty(value).context("serialize fixture")?;
    fs::write(&path, raw).with_context(|| format!("write fixture: {}", path.display()))?;
    Ok(path)
}
