//! Validation of a processed series against its mechanics.
//!
//! GREEN when:
//! - object shortfalls are reported for the full event and for each wave (override applied)
//! - target counts are compared only for sites with target data
//! - path-shape and team-change findings land in a sorted report
//! - a series that matches its mechanics is clean

use shard_config::{load_mechanics_from_strings, MechanicsConfig};
use shard_engine::{process_series, ProcessOptions, ProcessedSeries, SeriesInput};
use shard_schemas::{Faction, Fragment, TargetSighting};
use shard_testkit::*;
use shard_validate::*;

const MECHANICS: &str = r#"
brands:
  SINGULAR:
    waves:
      - { startOffset: 0, endOffset: 59, quantity: 2 }
      - { startOffset: 60, endOffset: 119, quantity: 2 }
    targetWaves:
      - { startOffset: 0, endOffset: 119, factionQuantity: { RES: 1, ENL: 1 } }
    overrides:
      - { site: "ams", shardCounts: [1] }
"#;

fn mechanics() -> MechanicsConfig {
    load_mechanics_from_strings(&[MECHANICS]).unwrap().mechanics
}

fn run(
    fragments: Vec<Fragment>,
    targets: &[TargetSighting],
    mechanics: &MechanicsConfig,
) -> ProcessedSeries {
    process_series(
        SeriesInput {
            geocode: &[dam_site("ams", "SINGULAR")],
            telemetry: &[export("a", fragments)],
            ornaments: &[],
            targets,
            mechanics,
        },
        &ProcessOptions::default(),
    )
}

fn spawn_only(id: &str, minutes: i64) -> Fragment {
    FragmentBuilder::new(id)
        .spawn(AMS_START_MS + minutes * MINUTE_MS, &dam(), None)
        .build()
}

#[test]
fn matching_series_is_clean() {
    let m = mechanics();
    // Expected: wave 0 = 1 (override), wave 1 = 2, total 3.
    let fragments = vec![
        spawn_only("shard_1", 5),
        spawn_only("shard_2", 70),
        spawn_only("shard_3", 80),
    ];
    let out = run(fragments, &[], &m);

    let report = validate_series(&out, &m);
    assert!(report.is_clean(), "{:?}", report.discrepancies);
    assert_eq!(report, ValidationReport::clean());
}

#[test]
fn shortfalls_are_reported_per_event_and_per_wave() {
    let m = mechanics();
    let a = dam();
    let out = run(
        vec![spawn_only("shard_1", 5), spawn_only("shard_2", 70)],
        &[target(&a, Faction::Res, AMS_START_MS + MINUTE_MS)],
        &m,
    );

    let report = validate_series(&out, &m);
    assert_eq!(report.reasons, vec![ValidationReason::CountMismatch]);
    assert_eq!(
        report.discrepancies,
        vec![
            Discrepancy::ObjectCount {
                site: "ams".to_string(),
                wave: None,
                expected: 3,
                actual: 2,
            },
            Discrepancy::ObjectCount {
                site: "ams".to_string(),
                wave: Some(1),
                expected: 2,
                actual: 1,
            },
            Discrepancy::TargetCount {
                site: "ams".to_string(),
                expected: 2,
                actual: 1,
            },
        ]
    );
}

#[test]
fn targets_are_not_compared_without_target_data() {
    let m = MechanicsConfig::default();
    let site_without_targets = run(vec![spawn_only("shard_1", 5)], &[], &m);
    let found = validate_site(
        &site_without_targets.sites["ams"],
        &ExpectedCounts {
            objects: None,
            targets: Some(10),
        },
    );
    assert!(found.is_empty());
}

#[test]
fn path_findings_are_collected_and_sorted() {
    let m = MechanicsConfig::default();
    let a = with_team(dam(), RES);
    let b = with_team(north_of(&a, "B", 300.0), RES);
    let t = AMS_START_MS;

    let one = FragmentBuilder::new("shard_1")
        .spawn(t, &a, Some(RES))
        .link(t + 10 * MINUTE_MS, t + 9 * MINUTE_MS, &a, &b, RES)
        .jump(t + 20 * MINUTE_MS, &b, &a)
        .build();
    let two = FragmentBuilder::new("shard_2")
        .spawn(t, &b, Some(ENL))
        .link(t + 30 * MINUTE_MS, t + 29 * MINUTE_MS, &b, &a, ENL)
        .build();

    let out = run(vec![one, two], &[], &m);
    let report = validate_series(&out, &m);

    assert_eq!(
        report.reasons,
        vec![ValidationReason::PathShape, ValidationReason::TeamChange]
    );
    assert!(matches!(
        report.discrepancies.as_slice(),
        [
            Discrepancy::MixedPath { links: 2, jumps: 1, .. },
            Discrepancy::TeamChange {
                previous: Some(Faction::Res),
                current: Some(Faction::Enl),
                bidirectional: true,
                ..
            },
        ]
    ));
}

#[test]
fn expected_counts_follow_brand_mechanics() {
    let m = mechanics();
    let brand = m.brand("SINGULAR").unwrap();

    let ams = ExpectedCounts::from_mechanics(brand, &dam_site("ams", "SINGULAR"));
    assert_eq!(ams, ExpectedCounts { objects: Some(3), targets: Some(2) });

    let other = ExpectedCounts::from_mechanics(brand, &dam_site("rotterdam", "SINGULAR"));
    assert_eq!(other.objects, Some(4));

    let empty = ExpectedCounts::from_mechanics(&Default::default(), &dam_site("ams", "SINGULAR"));
    assert_eq!(empty, ExpectedCounts::none());
}
