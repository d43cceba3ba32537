//! Record-to-site matching and object-id reuse splitting.

use shard_geo::{haversine_m, is_within_24_hours, LatLng};
use shard_schemas::{Fragment, HistoryReason, SiteGeocode};

/// Records further than this from a site centre never belong to it.
pub const AGGREGATION_RADIUS_M: f64 = 10_000.0;

/// A site reduced to what matching needs.
#[derive(Clone, Debug, PartialEq)]
pub struct SiteCandidate {
    pub site_id: String,
    pub position: LatLng,
    pub start_ms: i64,
}

impl SiteCandidate {
    pub fn new(g: &SiteGeocode, start_ms: i64) -> Self {
        Self {
            site_id: g.id.clone(),
            position: g.position(),
            start_ms,
        }
    }

    /// `distance < radius` and `|dt| <= 24h`.
    pub fn matches(&self, position: LatLng, t_ms: i64) -> bool {
        haversine_m(position, self.position) < AGGREGATION_RADIUS_M
            && is_within_24_hours(t_ms, self.start_ms)
    }
}

/// Index of the first matching candidate, in candidate order.
pub fn find_site(position: LatLng, t_ms: i64, candidates: &[SiteCandidate]) -> Option<usize> {
    candidates.iter().position(|c| c.matches(position, t_ms))
}

/// Every matching candidate index, in candidate order.
pub fn match_candidates(position: LatLng, t_ms: i64, candidates: &[SiteCandidate]) -> Vec<usize> {
    candidates
        .iter()
        .enumerate()
        .filter(|(_, c)| c.matches(position, t_ms))
        .map(|(i, _)| i)
        .collect()
}

/// Split a record whose id was reused for several lifecycles: one piece per
/// SPAWN, each holding the history up to the next SPAWN. Expects a sorted
/// history. Events ahead of the first SPAWN stay with the first piece.
pub fn split_reused(fragment: &Fragment) -> Vec<Fragment> {
    if fragment.spawn_count() <= 1 {
        return vec![fragment.clone()];
    }

    let mut pieces: Vec<Fragment> = Vec::new();
    let mut current = Fragment {
        id: fragment.id.clone(),
        history: Vec::new(),
    };
    let mut has_spawn = false;
    for ev in &fragment.history {
        if ev.reason == HistoryReason::Spawn {
            if has_spawn {
                pieces.push(std::mem::replace(
                    &mut current,
                    Fragment {
                        id: fragment.id.clone(),
                        history: Vec::new(),
                    },
                ));
            }
            has_spawn = true;
        }
        current.history.push(ev.clone());
    }
    pieces.push(current);
    pieces
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidate(id: &str, lat: f64, lng: f64, start_ms: i64) -> SiteCandidate {
        SiteCandidate {
            site_id: id.to_string(),
            position: LatLng::new(lat, lng),
            start_ms,
        }
    }

    #[test]
    fn needs_both_distance_and_time() {
        let c = candidate("ams", 52.37, 4.89, 0);
        assert!(c.matches(LatLng::new(52.38, 4.90), 3_600_000));
        assert!(!c.matches(LatLng::new(52.38, 4.90), shard_geo::MS_PER_DAY + 1));
        assert!(!c.matches(LatLng::new(51.92, 4.48), 0));
    }

    #[test]
    fn first_match_wins_in_candidate_order() {
        let cs = vec![
            candidate("far", 0.0, 0.0, 0),
            candidate("a", 52.37, 4.89, 0),
            candidate("b", 52.371, 4.891, 0),
        ];
        let p = LatLng::new(52.3705, 4.8905);
        assert_eq!(find_site(p, 0, &cs), Some(1));
        assert_eq!(match_candidates(p, 0, &cs), vec![1, 2]);
    }
}
