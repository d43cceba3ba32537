//! shard-scoring
//!
//! Tiered distance scoring for links.
//!
//! - A rule table is an ordered list of `[min, max)` distance buckets.
//! - Selection is first-match; narrower buckets must come first.
//! - A rule with `allow_further_points == false` closes scoring for the rest
//!   of that object's pass through one view.
//!
//! Deterministic, pure logic. No IO.

mod builtin;
mod engine;
mod types;

pub use engine::{select_rule, ScoringState};
pub use types::*;
