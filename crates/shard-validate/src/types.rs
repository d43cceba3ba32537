use serde::Serialize;
use shard_config::BrandMechanics;
use shard_schemas::{Faction, SiteGeocode};

/// Expected totals for one site. `None` means the mechanics say nothing,
/// so there is nothing to compare against.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ExpectedCounts {
    pub objects: Option<u32>,
    pub targets: Option<u32>,
}

impl ExpectedCounts {
    pub fn none() -> Self {
        Self::default()
    }

    /// Summed wave quantities (site override applied) and summed target
    /// wave faction quantities. Zero totals count as undeclared.
    pub fn from_mechanics(mechanics: &BrandMechanics, geocode: &SiteGeocode) -> Self {
        let objects = mechanics.expected_objects(geocode.display_name());
        let targets = mechanics.expected_targets().total();
        Self {
            objects: (objects > 0).then_some(objects),
            targets: (targets > 0).then_some(targets),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ValidationReason {
    CountMismatch,
    PathShape,
    TeamChange,
}

/// One finding. Ordering is the report order.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Discrepancy {
    /// `wave` is `None` for the full event.
    #[serde(rename_all = "camelCase")]
    ObjectCount {
        site: String,
        wave: Option<usize>,
        expected: u32,
        actual: u32,
    },
    #[serde(rename_all = "camelCase")]
    TargetCount { site: String, expected: u32, actual: u32 },
    /// Path carrying both links and jumps.
    #[serde(rename_all = "camelCase")]
    MixedPath {
        site: String,
        path: String,
        links: u32,
        jumps: u32,
    },
    #[serde(rename_all = "camelCase")]
    RepeatedJumps { site: String, path: String, jumps: u32 },
    /// A link whose team differs from the previous link on the same path.
    /// `bidirectional` is set when objects travelled the path both ways.
    #[serde(rename_all = "camelCase")]
    TeamChange {
        site: String,
        path: String,
        link_time: i64,
        previous: Option<Faction>,
        current: Option<Faction>,
        bidirectional: bool,
    },
}

impl Discrepancy {
    pub fn reason(&self) -> ValidationReason {
        match self {
            Discrepancy::ObjectCount { .. } | Discrepancy::TargetCount { .. } => {
                ValidationReason::CountMismatch
            }
            Discrepancy::MixedPath { .. } | Discrepancy::RepeatedJumps { .. } => {
                ValidationReason::PathShape
            }
            Discrepancy::TeamChange { .. } => ValidationReason::TeamChange,
        }
    }
}

fn team_code(f: &Option<Faction>) -> &'static str {
    f.map_or("NEU", |f| f.as_str())
}

impl std::fmt::Display for Discrepancy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Discrepancy::ObjectCount { site, wave: None, expected, actual } => {
                write!(f, "site {site}: expected {expected} objects, found {actual}")
            }
            Discrepancy::ObjectCount { site, wave: Some(w), expected, actual } => {
                write!(f, "site {site} wave {w}: expected {expected} objects, found {actual}")
            }
            Discrepancy::TargetCount { site, expected, actual } => {
                write!(f, "site {site}: expected {expected} targets, found {actual}")
            }
            Discrepancy::MixedPath { site, path, links, jumps } => {
                write!(f, "site {site}: path {path} has {links} links and {jumps} jumps")
            }
            Discrepancy::RepeatedJumps { site, path, jumps } => {
                write!(f, "site {site}: {jumps} jumps on path {path}")
            }
            Discrepancy::TeamChange { site, path, link_time, previous, current, bidirectional } => {
                write!(
                    f,
                    "site {site}: path {path} link at {link_time} changes team {} -> {}",
                    team_code(previous),
                    team_code(current)
                )?;
                if *bidirectional {
                    f.write_str(" (moves in both directions)")?;
                }
                Ok(())
            }
        }
    }
}

/// Full report over a series. Reasons and discrepancies are sorted.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationReport {
    pub reasons: Vec<ValidationReason>,
    pub discrepancies: Vec<Discrepancy>,
}

impl ValidationReport {
    pub fn clean() -> Self {
        Self::default()
    }

    pub fn is_clean(&self) -> bool {
        self.discrepancies.is_empty()
    }
}
