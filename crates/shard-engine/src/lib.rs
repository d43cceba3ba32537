//! shard-engine
//!
//! Reconstruction of capture events from raw per-object telemetry.
//!
//! Pipeline per series:
//! - site assignment (distance + 24h window), with id-reuse splitting
//! - per-site portal registry, fed by telemetry, then ornaments, then targets
//! - full-event view: object timelines, path graph, faction scores
//! - optional wave views over spawn-time windows, with fresh scoring state
//!
//! Deterministic for identical input. No IO; data problems are reported as
//! `QualityWarning`s, never as errors.

pub mod assign;
pub mod custom;
mod reconstruct;
mod registry;
mod series;
mod warnings;
pub mod waves;

pub use reconstruct::{attach_targets, reconstruct, ObjectRecord, ViewContext};
pub use registry::PortalRegistry;
pub use series::{process_series, ProcessOptions, ProcessedSeries, SeriesCounts, SeriesInput};
pub use warnings::{QualityWarning, WarningLedger};
