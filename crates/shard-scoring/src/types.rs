use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// One distance bucket. `max_distance: None` means unbounded.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoringRule {
    #[serde(default)]
    pub description: String,
    pub min_distance: f64,
    #[serde(default)]
    pub max_distance: Option<f64>,
    #[serde(default)]
    pub jump_points: u32,
    #[serde(default)]
    pub link_length_points: u32,
    #[serde(default = "allow_by_default")]
    pub allow_further_points: bool,
}

fn allow_by_default() -> bool {
    true
}

impl ScoringRule {
    pub fn new(
        min_distance: f64,
        max_distance: Option<f64>,
        points: u32,
        allow_further_points: bool,
    ) -> Self {
        Self {
            description: String::new(),
            min_distance,
            max_distance,
            jump_points: 0,
            link_length_points: points,
            allow_further_points,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Half-open `[min, max)`.
    pub fn contains(&self, distance_m: f64) -> bool {
        distance_m >= self.min_distance && self.max_distance.map_or(true, |max| distance_m < max)
    }

    pub fn points(&self) -> u32 {
        self.jump_points + self.link_length_points
    }
}

/// Ordered rules for one brand.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RuleTable {
    pub rules: Vec<ScoringRule>,
}

impl RuleTable {
    pub fn new(rules: Vec<ScoringRule>) -> Self {
        Self { rules }
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

/// Rule tables keyed by brand. Read-only once built; shared by every site
/// and view of a pass.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RuleBook {
    tables: BTreeMap<String, RuleTable>,
    empty: RuleTable,
}

impl RuleBook {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, brand: impl Into<String>, table: RuleTable) {
        self.tables.insert(brand.into(), table);
    }

    /// Table for `brand`; brands without one get an empty table (no link
    /// ever scores).
    pub fn table(&self, brand: &str) -> &RuleTable {
        self.tables.get(brand).unwrap_or(&self.empty)
    }

    pub fn has_brand(&self, brand: &str) -> bool {
        self.tables.contains_key(brand)
    }
}
