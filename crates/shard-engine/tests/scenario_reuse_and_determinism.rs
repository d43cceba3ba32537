//! Object-id reuse splitting, portal registration order, determinism.

use shard_config::MechanicsConfig;
use shard_engine::assign::split_reused;
use shard_engine::{process_series, ProcessOptions, ProcessedSeries, SeriesInput};
use shard_schemas::{
    Faction, HistoryReason, OrnamentSighting, ShardJumpTimes, SiteGeocode, TargetSighting,
};
use shard_testkit::*;

fn run(
    geocode: &[SiteGeocode],
    telemetry: &[ShardJumpTimes],
    ornaments: &[OrnamentSighting],
    targets: &[TargetSighting],
) -> ProcessedSeries {
    process_series(
        SeriesInput {
            geocode,
            telemetry,
            ornaments,
            targets,
            mechanics: &MechanicsConfig::default(),
        },
        &ProcessOptions::default(),
    )
}

fn reused_record() -> shard_schemas::Fragment {
    let a = dam();
    let b = north_of(&a, "B", 400.0);
    let c = north_of(&a, "C", 900.0);
    let d = north_of(&a, "D", 1_500.0);
    let t0 = AMS_START_MS;
    // Deliberately out of order; the engine sorts by move time.
    FragmentBuilder::new("abaddon1_7")
        .link(t0 + 3 * MINUTE_MS, t0 + 3 * MINUTE_MS, &c, &d, RES)
        .spawn(t0, &a, None)
        .spawn(t0 + 2 * MINUTE_MS, &c, None)
        .link(t0 + MINUTE_MS, t0 + MINUTE_MS, &a, &b, RES)
        .build()
}

#[test]
fn record_with_two_spawns_splits_into_two_objects() {
    let mut record = reused_record();
    record.sort_history();
    let pieces = split_reused(&record);

    assert_eq!(pieces.len(), 2);
    for p in &pieces {
        assert_eq!(p.id, "abaddon1_7");
        assert_eq!(p.history[0].reason, HistoryReason::Spawn);
        assert_eq!(p.spawn_count(), 1);
    }
    let reasons: Vec<Vec<HistoryReason>> = pieces
        .iter()
        .map(|p| p.history.iter().map(|h| h.reason.clone()).collect())
        .collect();
    assert_eq!(
        reasons,
        vec![
            vec![HistoryReason::Spawn, HistoryReason::Link],
            vec![HistoryReason::Spawn, HistoryReason::Link],
        ]
    );
    assert_eq!(pieces[0].history[1].move_time_ms, AMS_START_MS + MINUTE_MS);
    assert_eq!(pieces[1].history[1].move_time_ms, AMS_START_MS + 3 * MINUTE_MS);
}

#[test]
fn split_objects_keep_the_shared_id_in_the_view() {
    let out = run(&[dam_site("ams", "ANOMALY")], &[export("a", vec![reused_record()])], &[], &[]);
    let view = &out.sites["ams"].full_event;

    assert_eq!(view.objects.len(), 2);
    assert!(view.objects.iter().all(|o| o.id == 7));
    assert_eq!(view.counters.objects.moving, 2);
    assert_eq!(view.objects[0].spawn_time(), Some(AMS_START_MS));
    assert_eq!(view.objects[1].spawn_time(), Some(AMS_START_MS + 2 * MINUTE_MS));
    assert_eq!(out.counts.records, 1);
    assert_eq!(out.counts.objects, 2);
}

#[test]
fn equal_keys_share_one_portal_id_across_sources() {
    let a = dam();
    let b = north_of(&a, "B", 300.0);
    let shard = FragmentBuilder::new("shard_1")
        .spawn(AMS_START_MS, &a, None)
        .link(AMS_START_MS + MINUTE_MS, AMS_START_MS, &a, &b, RES)
        .build();
    let renamed_a = portal("Dam (renamed)", a.lat_e6, a.lng_e6);
    let extra = north_of(&a, "Extra", 700.0);

    let out = run(
        &[dam_site("ams", "ANOMALY")],
        &[export("a", vec![shard])],
        &[ornament(&extra, "ap7", AMS_START_MS), ornament(&renamed_a, "ap1", AMS_START_MS)],
        &[target(&b, Faction::Enl, AMS_START_MS)],
    );
    let site = &out.sites["ams"];

    assert_eq!(site.portals.len(), 3);
    // Telemetry portals come first, whatever order the sightings arrive in.
    assert_eq!(site.portals[&1].title, "Dam");
    assert_eq!(site.portals[&1].ornament_id.as_deref(), Some("ap1"));
    assert_eq!(site.portals[&2].target_factions, vec![Faction::Enl]);
    assert_eq!(site.portals[&3].title, "Extra");
    assert!(site.has_target_data);
    assert_eq!(site.full_event.targets.as_ref().map(Vec::len), Some(1));
    assert_eq!(site.full_event.counters.targets.map(|t| t.enl), Some(1));
}

#[test]
fn input_order_does_not_change_output() {
    let a = dam();
    let b = north_of(&a, "B", 300.0);
    let c = north_of(&a, "C", 600.0);
    let one = FragmentBuilder::new("shard_1")
        .spawn(AMS_START_MS, &a, None)
        .jump(AMS_START_MS + MINUTE_MS, &a, &b)
        .build();
    let two = FragmentBuilder::new("shard_2")
        .spawn(AMS_START_MS, &c, None)
        .link(AMS_START_MS + MINUTE_MS, AMS_START_MS, &c, &a, ENL)
        .build();

    let forward = run(
        &[dam_site("ams", "ANOMALY")],
        &[export("a", vec![one.clone(), two.clone()])],
        &[],
        &[],
    );
    let backward = run(&[dam_site("ams", "ANOMALY")], &[export("a", vec![two, one])], &[], &[]);

    let f = serde_json::to_string(&forward.sites).unwrap();
    let b = serde_json::to_string(&backward.sites).unwrap();
    assert_eq!(f, b);
    assert_eq!(forward.counts, backward.counts);
}

#[test]
fn path_keys_render_as_sorted_pairs() {
    let a = dam();
    let b = north_of(&a, "B", 300.0);
    // Registered b=1 via the first record, a=2 via the second.
    let first = FragmentBuilder::new("shard_1").spawn(AMS_START_MS, &b, None).build();
    let second = FragmentBuilder::new("shard_2")
        .spawn(AMS_START_MS, &a, None)
        .jump(AMS_START_MS + MINUTE_MS, &a, &b)
        .build();

    let out = run(&[dam_site("ams", "ANOMALY")], &[export("a", vec![first, second])], &[], &[]);
    let json = serde_json::to_value(&out.sites["ams"].full_event).unwrap();
    let jump = &json["paths"]["1-2"]["jumps"][0];
    assert_eq!(jump["origin"], 2);
    assert_eq!(jump["dest"], 1);
    assert!(json["paths"]["1-2"].get("links").is_none());
}
