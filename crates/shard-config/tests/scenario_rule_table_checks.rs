//! Rule tables and wave windows are checked at load time.

use shard_config::{
    load_mechanics_from_strings, report_unused_keys, UnusedKeyPolicy, MAX_WAVE_OFFSET_MIN,
};

#[test]
fn negative_min_distance_is_rejected() {
    let yaml = r#"
brands:
  CUSTOM:
    scoring:
      - { minDistance: -1, maxDistance: 10, linkLengthPoints: 1 }
"#;
    let err = load_mechanics_from_strings(&[yaml]).unwrap_err();
    assert!(err.to_string().contains("CONFIG_INVALID_RULE"));
}

#[test]
fn max_not_above_min_is_rejected() {
    let yaml = r#"
brands:
  CUSTOM:
    scoring:
      - { minDistance: 500, maxDistance: 500, linkLengthPoints: 1 }
"#;
    assert!(load_mechanics_from_strings(&[yaml]).is_err());
}

#[test]
fn null_max_is_unbounded_and_overrides_builtin() {
    let yaml = r#"
brands:
  ANOMALY:
    scoring:
      - { description: "flat", minDistance: 0, maxDistance: null, linkLengthPoints: 4 }
"#;
    let loaded = load_mechanics_from_strings(&[yaml]).unwrap();
    let book = loaded.mechanics.rule_book();
    let table = book.table("ANOMALY");
    assert_eq!(table.rules.len(), 1);
    assert_eq!(table.rules[0].max_distance, None);
    assert_eq!(table.rules[0].points(), 4);
    // Untouched brands keep their built-in tables.
    assert_eq!(book.table("STORM").rules.len(), 2);
}

#[test]
fn inverted_wave_is_rejected() {
    let yaml = r#"
brands:
  ANOMALY:
    waves:
      - { startOffset: 60, endOffset: 0, quantity: 1 }
"#;
    let err = load_mechanics_from_strings(&[yaml]).unwrap_err();
    assert!(err.to_string().contains("CONFIG_INVALID_WAVE"));
}

#[test]
fn out_of_range_wave_offset_is_rejected() {
    let yaml = r#"
brands:
  ANOMALY:
    waves:
      - { startOffset: 60, endOffset: 9223372036854775807, quantity: 1 }
"#;
    let err = load_mechanics_from_strings(&[yaml]).unwrap_err();
    assert!(err.to_string().contains("CONFIG_INVALID_WAVE"));
    assert!(err.to_string().contains("endOffset 9223372036854775807"));
}

#[test]
fn out_of_range_target_wave_offset_is_rejected() {
    let yaml = format!(
        "brands:\n  ANOMALY:\n    targetWaves:\n      - {{ startOffset: {}, endOffset: 0 }}\n",
        -MAX_WAVE_OFFSET_MIN - 1
    );
    let err = load_mechanics_from_strings(&[yaml.as_str()]).unwrap_err();
    assert!(err.to_string().contains("targetWave=0"));
}

#[test]
fn offsets_at_the_limit_are_accepted() {
    let yaml = format!(
        "brands:\n  ANOMALY:\n    waves:\n      - {{ startOffset: {}, endOffset: {} }}\n",
        -MAX_WAVE_OFFSET_MIN, MAX_WAVE_OFFSET_MIN
    );
    assert!(load_mechanics_from_strings(&[yaml.as_str()]).is_ok());
}

#[test]
fn misspelled_section_is_reported_as_unused() {
    let yaml = r#"
brands:
  ANOMALY:
    waves:
      - { startOffset: 0, endOffset: 59, quantity: 10 }
    targetwaves:
      - { startOffset: 0, endOffset: 59 }
notes: "draft"
"#;
    let loaded = load_mechanics_from_strings(&[yaml]).unwrap();
    let report = report_unused_keys(&loaded.config.config_json, UnusedKeyPolicy::Warn).unwrap();
    assert_eq!(
        report.unused_leaf_pointers,
        vec![
            "/brands/ANOMALY/targetwaves/0/endOffset".to_string(),
            "/brands/ANOMALY/targetwaves/0/startOffset".to_string(),
            "/notes".to_string(),
        ]
    );
    assert!(report_unused_keys(&loaded.config.config_json, UnusedKeyPolicy::Fail).is_err());
}
