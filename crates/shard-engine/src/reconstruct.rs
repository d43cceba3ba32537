//! Per-view replay of object histories into timelines and a path graph.

use chrono_tz::Tz;
use shard_geo::{format_local_time, haversine_m, LatLng};
use shard_schemas::{
    parse_object_id, Faction, FactionTally, Fragment, HistoryEntry, HistoryEvent, HistoryReason,
    LinkMove, PathJump, PathKey, PathLink, PortalId, PortalInfo, ShardObject, ShardPath,
    TargetEntry, View,
};
use shard_scoring::{RuleTable, ScoringState};
use tracing::{debug, warn};

use crate::{PortalRegistry, QualityWarning, WarningLedger};

/// One lifecycle of a tracked object, ready for replay. History is sorted
/// by move time.
#[derive(Clone, Debug)]
pub struct ObjectRecord {
    pub id: u64,
    pub record_id: String,
    pub history: Vec<HistoryEvent>,
}

impl ObjectRecord {
    /// `None` when the record id carries no numeric suffix.
    pub fn from_fragment(mut fragment: Fragment) -> Option<Self> {
        let id = parse_object_id(&fragment.id)?;
        fragment.sort_history();
        Some(Self {
            id,
            record_id: fragment.id,
            history: fragment.history,
        })
    }

    fn spawn(&self) -> Option<&HistoryEvent> {
        self.history.iter().find(|h| h.reason == HistoryReason::Spawn)
    }

    pub fn spawn_time_ms(&self) -> Option<i64> {
        self.spawn().map(|h| h.move_time_ms)
    }

    pub fn spawn_position(&self) -> Option<LatLng> {
        self.spawn()
            .and_then(|h| h.destination_portal_info.as_ref())
            .map(PortalInfo::position)
    }
}

/// Where a view is being built and how loudly to report.
pub struct ViewContext<'a> {
    pub site: &'a str,
    pub zone: Tz,
    /// Data-quality problems are recorded once, on the full-event pass;
    /// wave passes see the same events again and only log at debug.
    pub full_event: bool,
    /// Log alignment mismatches at warn instead of debug.
    pub verbose: bool,
    pub warnings: &'a mut WarningLedger,
}

impl<'a> ViewContext<'a> {
    pub fn new(site: &'a str, zone: Tz, warnings: &'a mut WarningLedger) -> Self {
        Self {
            site,
            zone,
            full_event: true,
            verbose: false,
            warnings,
        }
    }

    /// Same site, wave pass.
    pub fn wave(&mut self) -> ViewContext<'_> {
        ViewContext {
            site: self.site,
            zone: self.zone,
            full_event: false,
            verbose: self.verbose,
            warnings: &mut *self.warnings,
        }
    }

    fn report(&mut self, w: QualityWarning) {
        if self.full_event {
            self.warnings.push(w);
        } else {
            debug!(site = self.site, "{w}");
        }
    }
}

fn team(raw: Option<&String>) -> Option<Faction> {
    raw.and_then(|t| Faction::from_team(t))
}

fn entry(
    ev: &HistoryEvent,
    portal_id: Option<PortalId>,
    dest: Option<PortalId>,
    team: Option<Faction>,
) -> HistoryEntry {
    HistoryEntry {
        reason: ev.reason.clone(),
        move_time: ev.move_time_ms,
        portal_id,
        dest,
        team,
    }
}

fn distance_between(registry: &PortalRegistry, a: PortalId, b: PortalId) -> f64 {
    match (registry.position(a), registry.position(b)) {
        (Some(pa), Some(pb)) => haversine_m(pa, pb),
        _ => 0.0,
    }
}

fn resolve(
    registry: &PortalRegistry,
    info: &PortalInfo,
    object_id: u64,
    ctx: &mut ViewContext<'_>,
) -> Option<PortalId> {
    let key = info.key();
    let id = registry.lookup(&key);
    if id.is_none() {
        ctx.report(QualityWarning::UnregisteredPortal {
            site: ctx.site.to_string(),
            object_id,
            portal: key.to_string(),
        });
    }
    id
}

/// Origin and destination ids of a move, or `None` (reported) when either
/// side is missing.
fn endpoints(
    ev: &HistoryEvent,
    registry: &PortalRegistry,
    object_id: u64,
    ctx: &mut ViewContext<'_>,
) -> Option<(PortalId, PortalId)> {
    let (Some(origin), Some(dest)) = (&ev.origin_portal_info, &ev.destination_portal_info) else {
        ctx.report(QualityWarning::MissingPortalInfo {
            site: ctx.site.to_string(),
            object_id,
            reason: ev.reason.to_string(),
            move_time: ev.move_time_ms,
        });
        return None;
    };
    let o = resolve(registry, origin, object_id, ctx)?;
    let d = resolve(registry, dest, object_id, ctx)?;
    Some((o, d))
}

/// Teams are compared as written, so `NEUTRAL` and an absent team differ.
fn check_alignment(
    ev: &HistoryEvent,
    object_id: u64,
    ctx: &mut ViewContext<'_>,
    view: &mut View,
) {
    let link = ev.link_creator_team.as_deref();
    let origin = ev.origin_portal_info.as_ref().and_then(|i| i.team.as_deref());
    let dest = ev.destination_portal_info.as_ref().and_then(|i| i.team.as_deref());
    if link == origin && link == dest {
        return;
    }
    view.counters.alignment_mismatches += 1;

    let w = QualityWarning::AlignmentMismatch {
        site: ctx.site.to_string(),
        object_id,
        move_time: ev.move_time_ms,
        origin: origin.map(str::to_string),
        link: link.map(str::to_string),
        dest: dest.map(str::to_string),
    };
    let local = format_local_time(ev.move_time_ms, ctx.zone);
    if ctx.full_event && ctx.verbose {
        warn!(site = ctx.site, local_time = %local, "{w}");
    } else {
        debug!(site = ctx.site, local_time = %local, "{w}");
    }
    if ctx.full_event {
        ctx.warnings.record(w);
    }
}

fn finish(view: &mut View, shard: ShardObject) {
    if shard.moved {
        view.counters.objects.moving += 1;
    } else {
        view.counters.objects.non_moving += 1;
    }
    view.objects.push(shard);
}

fn replay(
    obj: &ObjectRecord,
    registry: &PortalRegistry,
    rules: &RuleTable,
    ctx: &mut ViewContext<'_>,
    view: &mut View,
) {
    let mut scoring = ScoringState::new();
    let mut current: Option<ShardObject> = None;
    let mut last: Option<PortalId> = None;

    for ev in &obj.history {
        if ev.reason == HistoryReason::Spawn {
            if let Some(done) = current.take() {
                finish(view, done);
            }
            let portal_id = match &ev.destination_portal_info {
                Some(info) => resolve(registry, info, obj.id, ctx),
                None => {
                    ctx.report(QualityWarning::MissingPortalInfo {
                        site: ctx.site.to_string(),
                        object_id: obj.id,
                        reason: ev.reason.to_string(),
                        move_time: ev.move_time_ms,
                    });
                    None
                }
            };
            let spawn_team = team(ev.destination_capturer_team.as_ref());
            current = Some(ShardObject {
                id: obj.id,
                history: vec![entry(ev, portal_id, None, spawn_team)],
                moved: false,
            });
            scoring = ScoringState::new();
            last = portal_id;
            continue;
        }

        let Some(shard) = current.as_mut() else {
            ctx.report(QualityWarning::EventBeforeSpawn {
                site: ctx.site.to_string(),
                object_id: obj.id,
                reason: ev.reason.to_string(),
                move_time: ev.move_time_ms,
            });
            continue;
        };

        match &ev.reason {
            HistoryReason::Spawn => {}
            HistoryReason::NoMove => shard.history.push(entry(ev, last, None, None)),
            HistoryReason::Jump => {
                if ev.link_creation_time_ms.is_some() {
                    ctx.report(QualityWarning::JumpWithLinkTime {
                        site: ctx.site.to_string(),
                        object_id: obj.id,
                        move_time: ev.move_time_ms,
                    });
                    continue;
                }
                let Some((o, d)) = endpoints(ev, registry, obj.id, ctx) else {
                    continue;
                };
                let distance = distance_between(registry, o, d);
                shard.history.push(entry(ev, Some(o), Some(d), None));
                shard.moved = true;

                view.paths
                    .entry(PathKey::new(o, d))
                    .or_insert_with(|| ShardPath::new(distance))
                    .jumps
                    .push(PathJump {
                        origin: o,
                        dest: d,
                        object_id: obj.id,
                        move_time: ev.move_time_ms,
                    });
                last = Some(d);
            }
            HistoryReason::Link => {
                let Some(link_time) = ev.link_creation_time_ms else {
                    ctx.report(QualityWarning::LinkWithoutLinkTime {
                        site: ctx.site.to_string(),
                        object_id: obj.id,
                        move_time: ev.move_time_ms,
                    });
                    continue;
                };
                let Some((o, d)) = endpoints(ev, registry, obj.id, ctx) else {
                    continue;
                };
                check_alignment(ev, obj.id, ctx, view);

                let distance = distance_between(registry, o, d);
                let points = scoring.score_link(rules, distance);
                let link_team = team(ev.link_creator_team.as_ref());
                shard.history.push(entry(ev, Some(o), Some(d), link_team));
                shard.moved = true;

                let mv = LinkMove {
                    origin: o,
                    dest: d,
                    object_id: obj.id,
                    move_time: ev.move_time_ms,
                    points,
                };
                let path = view
                    .paths
                    .entry(PathKey::new(o, d))
                    .or_insert_with(|| ShardPath::new(distance));
                match path.links.iter_mut().find(|l| l.link_time == link_time) {
                    Some(existing) => existing.moves.push(mv),
                    None => {
                        path.links.push(PathLink {
                            link_time,
                            team: link_team,
                            moves: vec![mv],
                        });
                        view.counters.links += 1;
                    }
                }

                if points > 0 {
                    if let Some(f) = link_team {
                        view.scores.add(f, points);
                    }
                }
                last = Some(d);
            }
            HistoryReason::Despawn => {
                let at = last.or_else(|| {
                    ev.origin_portal_info
                        .as_ref()
                        .and_then(|i| registry.lookup(&i.key()))
                });
                let final_team = team(ev.origin_capturer_team.as_ref());
                shard.history.push(entry(ev, at, None, final_team));
            }
            HistoryReason::Unknown(reason) => {
                ctx.report(QualityWarning::UnknownReason {
                    site: ctx.site.to_string(),
                    object_id: obj.id,
                    reason: reason.clone(),
                });
            }
        }
    }

    if let Some(done) = current {
        finish(view, done);
    }
}

/// Replay every object, in order, into one view. Each object starts with
/// fresh scoring state.
pub fn reconstruct<'o>(
    objects: impl IntoIterator<Item = &'o ObjectRecord>,
    registry: &PortalRegistry,
    rules: &RuleTable,
    ctx: &mut ViewContext<'_>,
) -> View {
    let mut view = View::default();
    for obj in objects {
        replay(obj, registry, rules, ctx, &mut view);
    }
    view.counters.paths = view.paths.len() as u32;
    view
}

/// Attach target sightings and their per-faction tally.
pub fn attach_targets(view: &mut View, targets: Vec<TargetEntry>) {
    let mut tally = FactionTally::default();
    for t in &targets {
        tally.add(t.faction, 1);
    }
    view.counters.targets = Some(tally);
    view.targets = Some(targets);
}
