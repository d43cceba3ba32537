use crate::{RuleBook, RuleTable, ScoringRule};

fn single_jump() -> RuleTable {
    RuleTable::new(vec![ScoringRule {
        description: "1 point for a single jump.".to_string(),
        min_distance: 0.0,
        max_distance: None,
        jump_points: 1,
        link_length_points: 0,
        allow_further_points: true,
    }])
}

impl RuleBook {
    /// Tables for the known event brands.
    pub fn builtin() -> Self {
        let mut book = RuleBook::empty();
        for brand in ["ANOMALY", "SINGLE_SHARD", "MULTIPLE_SHARDS", "UNKNOWN"] {
            book.insert(brand, single_jump());
        }
        book.insert(
            "SKIRMISH",
            RuleTable::new(vec![ScoringRule::new(249.5, None, 1, true)
                .with_description("1 point for a jump over a link longer than 249.5m.")]),
        );
        book.insert(
            "SINGULAR",
            RuleTable::new(vec![
                ScoringRule::new(100_000.0, None, 3, false)
                    .with_description(
                        "3 points for a jump over a link longer than 100km; \
                         no further points for that object.",
                    ),
                ScoringRule::new(1_000.0, Some(5_000.0), 1, true)
                    .with_description("1 point for each jump over a link between 1km and 5km."),
            ]),
        );
        book.insert(
            "STORM",
            RuleTable::new(vec![
                ScoringRule::new(10_000.0, None, 10, false)
                    .with_description(
                        "10 points for a jump over a link longer than 10km; \
                         no further points for that object.",
                    ),
                ScoringRule::new(1_000.0, Some(5_000.0), 5, true)
                    .with_description("5 points for each jump over a link between 1km and 5km."),
            ]),
        );
        book.insert(
            "INVESTIGATION",
            RuleTable::new(vec![
                ScoringRule::new(200.0, Some(500.0), 5, true)
                    .with_description("5 points for links between 200m and 500m."),
                ScoringRule::new(0.0, Some(200.0), 10, true)
                    .with_description("10 points for links shorter than 200m."),
            ]),
        );
        book
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_brand_scores_nothing() {
        let book = RuleBook::builtin();
        assert!(book.table("NOT_A_BRAND").is_empty());
        assert!(!book.has_brand("NOT_A_BRAND"));
    }

    #[test]
    fn anomaly_pays_one_point_for_any_distance() {
        let book = RuleBook::builtin();
        let mut s = crate::ScoringState::new();
        assert_eq!(s.score_link(book.table("ANOMALY"), 0.0), 1);
        assert_eq!(s.score_link(book.table("ANOMALY"), 123_456.0), 1);
    }

    #[test]
    fn skirmish_threshold() {
        let book = RuleBook::builtin();
        let mut s = crate::ScoringState::new();
        assert_eq!(s.score_link(book.table("SKIRMISH"), 249.49), 0);
        assert_eq!(s.score_link(book.table("SKIRMISH"), 249.5), 1);
    }
}
