use crate::{RuleTable, ScoringRule};

/// First rule whose `[min, max)` bucket contains the distance.
pub fn select_rule(rules: &[ScoringRule], distance_m: f64) -> Option<&ScoringRule> {
    rules.iter().find(|r| r.contains(distance_m))
}

/// Per-object cutoff state for one view pass. Never shared across objects
/// or views.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ScoringState {
    allow_further_points: bool,
}

impl Default for ScoringState {
    fn default() -> Self {
        Self::new()
    }
}

impl ScoringState {
    pub fn new() -> Self {
        Self {
            allow_further_points: true,
        }
    }

    pub fn is_open(&self) -> bool {
        self.allow_further_points
    }

    /// Points for one link of `distance_m`. Once a matched rule closes
    /// scoring, every later call returns 0.
    pub fn score_link(&mut self, table: &RuleTable, distance_m: f64) -> u32 {
        if !self.allow_further_points {
            return 0;
        }
        match select_rule(&table.rules, distance_m) {
            Some(rule) => {
                self.allow_further_points = rule.allow_further_points;
                rule.points()
            }
            None => 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bucket_is_half_open() {
        let r = ScoringRule::new(200.0, Some(500.0), 5, true);
        assert!(r.contains(200.0));
        assert!(r.contains(499.99));
        assert!(!r.contains(500.0));
        assert!(!r.contains(199.99));
    }

    #[test]
    fn unbounded_max() {
        let r = ScoringRule::new(249.5, None, 1, true);
        assert!(r.contains(1.0e9));
        assert!(!r.contains(249.49));
    }

    #[test]
    fn unmatched_distance_scores_zero_and_keeps_state_open() {
        let table = RuleTable::new(vec![ScoringRule::new(1000.0, Some(5000.0), 1, true)]);
        let mut s = ScoringState::new();
        assert_eq!(s.score_link(&table, 10.0), 0);
        assert!(s.is_open());
    }
}
