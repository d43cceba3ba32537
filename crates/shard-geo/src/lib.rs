//! shard-geo
//!
//! Geo and time helpers shared by the reconstruction engine.
//!
//! Pure deterministic logic. No IO, no wall-clock. Callers supply epoch
//! milliseconds and IANA zone names; everything else is arithmetic.

mod distance;
mod time;

pub use distance::{centroid, haversine_m, round_to, truncate_to, LatLng, EARTH_RADIUS_M};
pub use time::{
    format_iso_utc, format_local_time, is_within_24_hours, parse_site_instant, parse_zone,
    wave_bounds, TimeError, WaveBounds, MS_PER_DAY,
};
