use std::collections::BTreeSet;

use shard_config::MechanicsConfig;
use shard_engine::ProcessedSeries;
use shard_schemas::{PathKey, ShardPath, SiteData};
use tracing::{debug, info, warn};

use crate::{Discrepancy, ExpectedCounts, ValidationReason, ValidationReport};

fn push_reason_once(reasons: &mut Vec<ValidationReason>, r: ValidationReason) {
    if !reasons.contains(&r) {
        reasons.push(r);
    }
}

fn check_path(site: &str, key: &PathKey, path: &ShardPath, out: &mut Vec<Discrepancy>) {
    let links = path.links.len() as u32;
    let jumps = path.jumps.len() as u32;
    if links > 0 && jumps > 0 {
        out.push(Discrepancy::MixedPath {
            site: site.to_string(),
            path: key.to_string(),
            links,
            jumps,
        });
    }
    if jumps > 1 {
        out.push(Discrepancy::RepeatedJumps {
            site: site.to_string(),
            path: key.to_string(),
            jumps,
        });
    }

    if path.links.len() < 2 {
        return;
    }
    let origins: BTreeSet<_> = path
        .links
        .iter()
        .flat_map(|l| l.moves.iter().map(|m| m.origin))
        .collect();
    let bidirectional = origins.len() > 1;

    let mut sorted: Vec<_> = path.links.iter().collect();
    sorted.sort_by_key(|l| l.link_time);
    for pair in sorted.windows(2) {
        let (prev, cur) = (pair[0], pair[1]);
        // Missing team compares as neutral.
        if prev.team != cur.team {
            out.push(Discrepancy::TeamChange {
                site: site.to_string(),
                path: key.to_string(),
                link_time: cur.link_time,
                previous: prev.team,
                current: cur.team,
                bidirectional,
            });
        }
    }
}

/// Checks one reconstructed site against its expected totals. Wave views
/// are checked against their own expected quantity; path shape is checked
/// on the full event only.
pub fn validate_site(site: &SiteData, expected: &ExpectedCounts) -> Vec<Discrepancy> {
    let id = site.geocode.id.as_str();
    let full = &site.full_event;
    let mut out = Vec::new();

    if let Some(want) = expected.objects {
        let actual = full.objects.len() as u32;
        if actual != want {
            out.push(Discrepancy::ObjectCount {
                site: id.to_string(),
                wave: None,
                expected: want,
                actual,
            });
        }
    }

    for view in site.waves.iter().flatten() {
        let (Some(window), Some(want)) = (view.window, view.expected_quantity) else {
            continue;
        };
        let actual = view.objects.len() as u32;
        if actual != want {
            out.push(Discrepancy::ObjectCount {
                site: id.to_string(),
                wave: Some(window.index),
                expected: want,
                actual,
            });
        }
    }

    // Only sites that actually carry target data are compared.
    if let (Some(want), Some(targets)) = (expected.targets, &full.targets) {
        let actual = targets.len() as u32;
        if actual != want {
            out.push(Discrepancy::TargetCount {
                site: id.to_string(),
                expected: want,
                actual,
            });
        }
    }

    for (key, path) in &full.paths {
        check_path(id, key, path, &mut out);
    }
    out
}

/// Validates every site of a processed series. Sites whose brand has no
/// mechanics only get the path checks.
pub fn validate_series(series: &ProcessedSeries, mechanics: &MechanicsConfig) -> ValidationReport {
    let mut reasons: Vec<ValidationReason> = Vec::new();
    let mut discrepancies: Vec<Discrepancy> = Vec::new();

    for site in series.sites.values() {
        let expected = mechanics
            .brand(&site.geocode.brand)
            .map(|m| ExpectedCounts::from_mechanics(m, &site.geocode))
            .unwrap_or_default();

        for d in validate_site(site, &expected) {
            match d.reason() {
                ValidationReason::TeamChange => debug!(site = %site.geocode.id, "{d}"),
                _ => warn!(site = %site.geocode.id, "{d}"),
            }
            push_reason_once(&mut reasons, d.reason());
            discrepancies.push(d);
        }
    }

    reasons.sort();
    discrepancies.sort();

    info!(
        sites = series.sites.len(),
        discrepancies = discrepancies.len(),
        "validation complete"
    );

    if discrepancies.is_empty() {
        ValidationReport::clean()
    } else {
        ValidationReport {
            reasons,
            discrepancies,
        }
    }
}
