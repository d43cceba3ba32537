//! Site derivation for telemetry uploaded without a geocode.

use shard_geo::{centroid, format_iso_utc, haversine_m, is_within_24_hours, LatLng};
use shard_schemas::{ShardJumpTimes, SiteGeocode};
use tracing::debug;

use crate::assign::AGGREGATION_RADIUS_M;

pub const SINGLE_SHARD: &str = "SINGLE_SHARD";
pub const MULTIPLE_SHARDS: &str = "MULTIPLE_SHARDS";

struct Derived {
    geocode: SiteGeocode,
    origin: LatLng,
    start_ms: i64,
    spawns: Vec<LatLng>,
}

/// Group records into sites: a record joins the first derived site within
/// range (distance and 24h) of its spawn, else opens `custom-<label>-<n>`
/// at that spawn. Each site is then branded by how many records it holds
/// and moved to the centroid of their spawns.
pub fn derive_geocode(label: &str, telemetry: &[ShardJumpTimes]) -> Vec<SiteGeocode> {
    let mut derived: Vec<Derived> = Vec::new();

    for export in telemetry {
        let mut artifacts: Vec<_> =
            export.artifact.iter().filter(|a| a.fragment.is_some()).collect();
        artifacts.sort_by(|a, b| a.name.cmp(&b.name));

        for artifact in artifacts {
            let mut fragments = artifact.fragment.clone().unwrap_or_default();
            fragments.sort_by(|a, b| a.id.cmp(&b.id));

            for mut fragment in fragments {
                fragment.sort_history();
                let (Some(position), Some(spawn_ms)) =
                    (fragment.spawn_position(), fragment.spawn_time_ms())
                else {
                    debug!(record = %fragment.id, "no spawn position; skipped for site derivation");
                    continue;
                };

                if let Some(site) = derived.iter_mut().find(|d| {
                    haversine_m(position, d.origin) < AGGREGATION_RADIUS_M
                        && is_within_24_hours(spawn_ms, d.start_ms)
                }) {
                    site.spawns.push(position);
                    continue;
                }

                let Some(date) = format_iso_utc(spawn_ms) else {
                    continue;
                };
                let n = derived.len() + 1;
                derived.push(Derived {
                    geocode: SiteGeocode {
                        id: format!("custom-{label}-{n}"),
                        name: Some(format!("{label}-{n}")),
                        lat: position.lat,
                        lng: position.lng,
                        date,
                        timezone: Some("UTC".to_string()),
                        brand: shard_schemas::UNKNOWN_BRAND.to_string(),
                        country_code: None,
                    },
                    origin: position,
                    start_ms: spawn_ms,
                    spawns: vec![position],
                });
            }
        }
    }

    derived
        .into_iter()
        .map(|d| {
            let mut g = d.geocode;
            let brand = if d.spawns.len() > 1 { MULTIPLE_SHARDS } else { SINGLE_SHARD };
            g.brand = brand.to_string();
            if let Some(c) = centroid(&d.spawns) {
                g.lat = c.lat;
                g.lng = c.lng;
            }
            g
        })
        .collect()
}
