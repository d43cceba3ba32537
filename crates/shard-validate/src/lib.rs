//! shard-validate
//!
//! Post-reconstruction checks:
//! - object counts per site and per wave against the configured mechanics
//! - target counts against the configured target waves
//! - path shape: links mixed with jumps, repeated jumps
//! - team changes between consecutive links of one path
//!
//! Every finding is reported, none is fatal. Deterministic, pure logic. No IO.

mod engine;
mod types;

pub use engine::{validate_series, validate_site};
pub use types::*;
