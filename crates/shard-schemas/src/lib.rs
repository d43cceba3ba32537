//! shard-schemas
//!
//! Wire shapes in and out of the reconstruction engine.
//!
//! - `telemetry`: per-object movement history as exported by the game
//!   (`artifact[].fragment[].history[]`).
//! - `sighting`: ornament and target observations.
//! - `geocode`: configured event sites.
//! - `view`: the reconstructed per-site output consumed by the renderer.
//!   Field names are a downstream contract; keep them stable.
//!
//! Everything is plain data. No IO; parsing helpers take `&str`.

mod epoch_ms;
mod faction;
mod geocode;
mod parse;
mod sighting;
mod telemetry;
mod view;

pub use faction::{Faction, FactionTally};
pub use geocode::{SiteGeocode, UNKNOWN_BRAND};
pub use parse::{
    parse_ornaments, parse_targets, parse_telemetry, ParsedTelemetry, RecordError, RejectedRecord,
};
pub use sighting::{OrnamentSighting, TargetSighting};
pub use telemetry::{
    parse_object_id, Artifact, Fragment, HistoryEvent, HistoryReason, PortalInfo, PortalKey,
    ShardJumpTimes,
};
pub use view::{
    HistoryEntry, LinkMove, ObjectCounters, PathJump, PathKey, PathLink, Portal, PortalId,
    ShardObject, ShardPath, SiteData, TargetEntry, View, ViewCounters, WaveWindow,
};
