//! Whole-series driver: site assignment, portal registration, full-event
//! and wave views per site.

use std::collections::{BTreeMap, BTreeSet};

use chrono::DateTime;
use chrono_tz::Tz;
use serde::Serialize;
use shard_config::MechanicsConfig;
use shard_geo::{centroid, parse_site_instant, LatLng};
use shard_schemas::{
    parse_object_id, Fragment, OrnamentSighting, PortalKey, ShardJumpTimes, SiteData,
    SiteGeocode, TargetEntry, TargetSighting,
};
use tracing::{debug, info};

use crate::assign::{find_site, match_candidates, split_reused, SiteCandidate};
use crate::reconstruct::{attach_targets, reconstruct, ObjectRecord, ViewContext};
use crate::waves::{partition, WavePlan};
use crate::{PortalRegistry, QualityWarning, WarningLedger};

/// Everything one pass consumes. Candidate order is geocode order; callers
/// that want a different tie-break sort the geocode first.
#[derive(Clone, Copy, Debug)]
pub struct SeriesInput<'a> {
    pub geocode: &'a [SiteGeocode],
    pub telemetry: &'a [ShardJumpTimes],
    pub ornaments: &'a [OrnamentSighting],
    pub targets: &'a [TargetSighting],
    pub mechanics: &'a MechanicsConfig,
}

#[derive(Clone, Debug, Default)]
pub struct ProcessOptions {
    /// Log alignment mismatches at warn.
    pub verbose: bool,
    /// Stamped on the result for provenance.
    pub config_hash: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SeriesCounts {
    pub records: u32,
    pub records_dropped: u32,
    pub objects: u32,
    pub ornaments_matched: u32,
    pub ornaments_dropped: u32,
    pub targets_matched: u32,
    pub targets_dropped: u32,
}

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessedSeries {
    pub sites: BTreeMap<String, SiteData>,
    pub warnings: Vec<QualityWarning>,
    pub counts: SeriesCounts,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub config_hash: Option<String>,
}

struct SiteWork<'g> {
    geocode: &'g SiteGeocode,
    anchor: DateTime<Tz>,
    registry: PortalRegistry,
    fragments: Vec<Fragment>,
    targets: Vec<TargetEntry>,
    has_ornaments: bool,
}

/// Run one full reconstruction pass. Never fails: bad data ends up in
/// `warnings` and dropped-record counts.
pub fn process_series(input: SeriesInput<'_>, options: &ProcessOptions) -> ProcessedSeries {
    let mut ledger = WarningLedger::new();
    let mut counts = SeriesCounts::default();
    let rule_book = input.mechanics.rule_book();

    // Sites whose date resolves; candidates[i] belongs to work[i].
    let mut work: Vec<SiteWork<'_>> = Vec::new();
    let mut candidates: Vec<SiteCandidate> = Vec::new();
    for g in input.geocode {
        match parse_site_instant(&g.date, g.timezone.as_deref()) {
            Ok(anchor) => {
                candidates.push(SiteCandidate::new(g, anchor.timestamp_millis()));
                work.push(SiteWork {
                    geocode: g,
                    anchor,
                    registry: PortalRegistry::new(),
                    fragments: Vec::new(),
                    targets: Vec::new(),
                    has_ornaments: false,
                });
            }
            Err(e) => ledger.push(QualityWarning::SiteDateUnresolved {
                site: g.id.clone(),
                message: e.to_string(),
            }),
        }
    }

    assign_telemetry(input.telemetry, &candidates, &mut work, &mut ledger, &mut counts);

    // Telemetry portals first, so their ids do not depend on sightings.
    let mut objects_by_site: Vec<Vec<ObjectRecord>> = Vec::with_capacity(work.len());
    for site in &mut work {
        site.fragments.sort_by(|a, b| a.id.cmp(&b.id));
        let objects: Vec<ObjectRecord> = std::mem::take(&mut site.fragments)
            .into_iter()
            .filter_map(ObjectRecord::from_fragment)
            .collect();
        for obj in &objects {
            for ev in &obj.history {
                for info in [&ev.origin_portal_info, &ev.destination_portal_info]
                    .into_iter()
                    .flatten()
                {
                    site.registry.get_or_create(info.key(), &info.title);
                }
            }
        }
        counts.objects += objects.len() as u32;
        objects_by_site.push(objects);
    }

    assign_ornaments(input.ornaments, &candidates, &mut work, &mut ledger, &mut counts);
    assign_targets(input.targets, &candidates, &mut work, &mut counts);

    let mut sites: BTreeMap<String, SiteData> = BTreeMap::new();
    for (site, objects) in work.into_iter().zip(objects_by_site) {
        if objects.is_empty() && site.targets.is_empty() && !site.has_ornaments {
            continue;
        }
        let g = site.geocode;
        let rules = rule_book.table(&g.brand);
        let positions: Vec<LatLng> =
            objects.iter().filter_map(ObjectRecord::spawn_position).collect();
        let has_target_data = !site.targets.is_empty();

        let mut ctx = ViewContext::new(&g.id, site.anchor.timezone(), &mut ledger);
        ctx.verbose = options.verbose;

        let mut full_event = reconstruct(&objects, &site.registry, rules, &mut ctx);
        if has_target_data {
            attach_targets(&mut full_event, site.targets.clone());
        }

        let waves = input
            .mechanics
            .brand(&g.brand)
            .and_then(|m| WavePlan::for_site(m, g.display_name(), site.anchor))
            .map(|plan| {
                let targets = has_target_data.then_some(site.targets.as_slice());
                partition(&objects, targets, &site.registry, rules, &plan, &mut ctx)
            });

        debug!(
            site = %g.id,
            objects = full_event.objects.len(),
            portals = site.registry.len(),
            "site reconstructed"
        );
        sites.insert(
            g.id.clone(),
            SiteData {
                geocode: g.clone(),
                centroid: centroid(&positions),
                portals: site.registry.into_portals(),
                full_event,
                waves,
                has_target_data,
            },
        );
    }

    info!(
        sites = sites.len(),
        records = counts.records,
        dropped = counts.records_dropped,
        warnings = ledger.len(),
        "series processed"
    );

    ProcessedSeries {
        sites,
        warnings: ledger.into_vec(),
        counts,
        config_hash: options.config_hash.clone(),
    }
}

/// Artifacts by name, records by id; each record goes to the site of its
/// first spawn, split by spawn if its id was reused.
fn assign_telemetry(
    telemetry: &[ShardJumpTimes],
    candidates: &[SiteCandidate],
    work: &mut [SiteWork<'_>],
    ledger: &mut WarningLedger,
    counts: &mut SeriesCounts,
) {
    for export in telemetry {
        let mut artifacts: Vec<_> =
            export.artifact.iter().filter(|a| a.fragment.is_some()).collect();
        artifacts.sort_by(|a, b| a.name.cmp(&b.name));

        for artifact in artifacts {
            let mut fragments = artifact.fragment.clone().unwrap_or_default();
            fragments.sort_by(|a, b| a.id.cmp(&b.id));

            for mut fragment in fragments {
                counts.records += 1;
                fragment.sort_history();

                let warning = if fragment.spawn_count() == 0 {
                    Some(QualityWarning::RecordWithoutSpawn { record: fragment.id.clone() })
                } else if parse_object_id(&fragment.id).is_none() {
                    Some(QualityWarning::BadObjectId { record: fragment.id.clone() })
                } else {
                    None
                };
                if let Some(w) = warning {
                    ledger.push(w);
                    counts.records_dropped += 1;
                    continue;
                }

                let (Some(position), Some(spawn_ms)) =
                    (fragment.spawn_position(), fragment.spawn_time_ms())
                else {
                    ledger.push(QualityWarning::RecordWithoutPosition {
                        record: fragment.id.clone(),
                    });
                    counts.records_dropped += 1;
                    continue;
                };

                match find_site(position, spawn_ms, candidates) {
                    Some(i) => work[i].fragments.extend(split_reused(&fragment)),
                    None => {
                        ledger.push(QualityWarning::NoSiteMatch {
                            record: fragment.id.clone(),
                            spawn_ms,
                        });
                        counts.records_dropped += 1;
                    }
                }
            }
        }
    }
}

/// Ornaments matching more than one site are dropped; each distinct
/// (portal, ornament) is reported once.
fn assign_ornaments(
    ornaments: &[OrnamentSighting],
    candidates: &[SiteCandidate],
    work: &mut [SiteWork<'_>],
    ledger: &mut WarningLedger,
    counts: &mut SeriesCounts,
) {
    let mut reported: BTreeSet<(PortalKey, String)> = BTreeSet::new();
    for o in ornaments {
        let Some(key) = o.key() else {
            ledger.push(QualityWarning::ObservationWithoutPosition {
                ornament_id: o.ornament_id.clone(),
            });
            counts.ornaments_dropped += 1;
            continue;
        };
        let position = LatLng::from_e6(key.lat_e6, key.lng_e6);
        match match_candidates(position, o.observed_at, candidates).as_slice() {
            [] => {
                debug!(ornament = %o.ornament_id, portal = %key, "ornament matches no site");
                counts.ornaments_dropped += 1;
            }
            [i] => {
                let site = &mut work[*i];
                let id = site.registry.get_or_create(key, &o.title);
                site.registry.set_ornament(id, &o.ornament_id);
                site.has_ornaments = true;
                counts.ornaments_matched += 1;
            }
            many => {
                counts.ornaments_dropped += 1;
                if reported.insert((key, o.ornament_id.clone())) {
                    ledger.push(QualityWarning::AmbiguousOrnament {
                        ornament_id: o.ornament_id.clone(),
                        portal: key.to_string(),
                        sites: many.iter().map(|i| candidates[*i].site_id.clone()).collect(),
                    });
                }
            }
        }
    }
}

/// Targets matching more than one site are dropped without a report.
fn assign_targets(
    targets: &[TargetSighting],
    candidates: &[SiteCandidate],
    work: &mut [SiteWork<'_>],
    counts: &mut SeriesCounts,
) {
    for t in targets {
        let key = t.key();
        match match_candidates(t.position(), t.observed_at, candidates).as_slice() {
            [i] => {
                let site = &mut work[*i];
                let id = site.registry.get_or_create(key, &t.title);
                site.registry.add_target_faction(id, t.faction);
                site.targets.push(TargetEntry {
                    portal_id: id,
                    faction: t.faction,
                    observed_at: t.observed_at,
                });
                counts.targets_matched += 1;
            }
            _ => counts.targets_dropped += 1,
        }
    }
}
