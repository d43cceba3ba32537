//! Site-local time handling.
//!
//! Event dates are authored as local wall-clock times in the site's IANA
//! zone. Every comparison happens on absolute epoch milliseconds; the zone is
//! only used to turn the authored date into an instant and back for display.

use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, TimeZone, Utc};
use chrono_tz::Tz;

pub const MS_PER_DAY: i64 = 24 * 60 * 60 * 1000;

/// Errors from date/zone parsing. Small and explicit so callers can turn
/// them into warnings.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TimeError {
    UnknownZone(String),
    BadDate(String),
    NonexistentLocalTime(String),
}

impl std::fmt::Display for TimeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TimeError::UnknownZone(z) => write!(f, "unknown time zone: {}", z),
            TimeError::BadDate(d) => write!(f, "unparseable date: {}", d),
            TimeError::NonexistentLocalTime(d) => {
                write!(f, "local time does not exist in zone: {}", d)
            }
        }
    }
}

impl std::error::Error for TimeError {}

/// Parse an IANA zone name (`Europe/Amsterdam`).
pub fn parse_zone(name: &str) -> Result<Tz, TimeError> {
    name.trim()
        .parse::<Tz>()
        .map_err(|_| TimeError::UnknownZone(name.to_string()))
}

/// Resolve a site's declared start instant.
///
/// `date` may carry a bracketed zone suffix (`2025-06-01T14:00:00[Europe/Amsterdam]`).
/// Zone precedence: explicit `zone`, then the bracket suffix, then UTC.
///
/// Accepted bodies:
/// - RFC 3339 with offset or `Z` (the instant wins; re-expressed in the zone)
/// - `YYYY-MM-DDTHH:MM[:SS[.fff]]` local wall-clock time
/// - `YYYY-MM-DD` (local midnight)
///
/// DST-ambiguous local times take the earlier instant. Local times inside a
/// spring-forward gap are shifted one hour later.
pub fn parse_site_instant(date: &str, zone: Option<&str>) -> Result<DateTime<Tz>, TimeError> {
    let (body, bracket) = split_zone_suffix(date);

    let zone_name = zone
        .map(str::trim)
        .filter(|z| !z.is_empty())
        .or(bracket)
        .unwrap_or("UTC");
    let tz = parse_zone(zone_name)?;

    if let Ok(fixed) = DateTime::parse_from_rfc3339(body) {
        return Ok(fixed.with_timezone(&tz));
    }

    let naive = parse_naive(body).ok_or_else(|| TimeError::BadDate(date.to_string()))?;
    tz.from_local_datetime(&naive)
        .earliest()
        .or_else(|| tz.from_local_datetime(&(naive + Duration::hours(1))).earliest())
        .ok_or_else(|| TimeError::NonexistentLocalTime(date.to_string()))
}

fn split_zone_suffix(date: &str) -> (&str, Option<&str>) {
    let date = date.trim();
    match date.find('[') {
        Some(open) => {
            let zone = date[open + 1..].trim_end_matches(']').trim();
            let zone = if zone.is_empty() { None } else { Some(zone) };
            (date[..open].trim(), zone)
        }
        None => (date, None),
    }
}

fn parse_naive(body: &str) -> Option<NaiveDateTime> {
    const FORMATS: &[&str] = &[
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%dT%H:%M",
        "%Y-%m-%d %H:%M:%S",
    ];
    for fmt in FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(body, fmt) {
            return Some(dt);
        }
    }
    NaiveDate::parse_from_str(body, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}

/// Absolute bounds of one wave window, epoch milliseconds.
///
/// `start_ms` is inclusive, `end_ms` exclusive.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct WaveBounds {
    pub start_ms: i64,
    pub end_ms: i64,
}

impl WaveBounds {
    pub fn contains(&self, t_ms: i64) -> bool {
        t_ms >= self.start_ms && t_ms < self.end_ms
    }
}

/// Window `[anchor + start, anchor + end + 1min)`.
///
/// `end_offset_min` is inclusive of its whole minute, so the exclusive bound
/// is the start of the following minute. Offsets are absolute minutes, not
/// calendar units, so a DST switch inside the window does not stretch it.
/// `None` when either bound falls outside the representable range.
pub fn wave_bounds(
    anchor: &DateTime<Tz>,
    start_offset_min: i64,
    end_offset_min: i64,
) -> Option<WaveBounds> {
    let start = anchor.checked_add_signed(Duration::try_minutes(start_offset_min)?)?;
    let end_exclusive = end_offset_min.checked_add(1)?;
    let end = anchor.checked_add_signed(Duration::try_minutes(end_exclusive)?)?;
    Some(WaveBounds {
        start_ms: start.timestamp_millis(),
        end_ms: end.timestamp_millis(),
    })
}

/// `|a - b| <= 24h`, for any pair of instants.
pub fn is_within_24_hours(a_ms: i64, b_ms: i64) -> bool {
    a_ms.abs_diff(b_ms) <= MS_PER_DAY as u64
}

/// `YYYY-MM-DDTHH:MM:SS` in UTC without fraction or `Z`.
pub fn format_iso_utc(ms: i64) -> Option<String> {
    Utc.timestamp_millis_opt(ms)
        .single()
        .map(|dt| dt.format("%Y-%m-%dT%H:%M:%S").to_string())
}

/// `HH:MM:SS.mmm` wall-clock time in `tz`, for log lines.
pub fn format_local_time(ms: i64, tz: Tz) -> String {
    match Utc.timestamp_millis_opt(ms).single() {
        Some(dt) => dt.with_timezone(&tz).format("%H:%M:%S%.3f").to_string(),
        None => ms.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // 2025-06-01T12:00:00Z (CEST is UTC+2 in June).
    const AMS_14H_MS: i64 = 1_748_779_200_000;

    #[test]
    fn local_time_in_zone() {
        let t = parse_site_instant("2025-06-01T14:00:00", Some("Europe/Amsterdam")).unwrap();
        assert_eq!(t.timestamp_millis(), AMS_14H_MS);
    }

    #[test]
    fn bracket_suffix_supplies_zone() {
        let t = parse_site_instant("2025-06-01T14:00:00[Europe/Amsterdam]", None).unwrap();
        assert_eq!(t.timestamp_millis(), AMS_14H_MS);
    }

    #[test]
    fn explicit_zone_beats_bracket() {
        let t = parse_site_instant("2025-06-01T14:00:00[Asia/Tokyo]", Some("Europe/Amsterdam"))
            .unwrap();
        assert_eq!(t.timestamp_millis(), AMS_14H_MS);
    }

    #[test]
    fn offset_wins_over_zone() {
        let t = parse_site_instant("2025-06-01T12:00:00Z", Some("Europe/Amsterdam")).unwrap();
        assert_eq!(t.timestamp_millis(), AMS_14H_MS);
        assert_eq!(t.format("%H:%M").to_string(), "14:00");
    }

    #[test]
    fn bare_date_is_local_midnight() {
        let t = parse_site_instant("2025-06-01", Some("UTC")).unwrap();
        assert_eq!(t.timestamp_millis(), 1_748_736_000_000);
    }

    #[test]
    fn missing_zone_defaults_to_utc() {
        let t = parse_site_instant("2025-06-01T12:00", None).unwrap();
        assert_eq!(t.timestamp_millis(), AMS_14H_MS);
    }

    #[test]
    fn spring_forward_gap_shifts_later() {
        // 02:30 does not exist in Amsterdam on 2025-03-30; 03:30 CEST = 01:30Z.
        let t = parse_site_instant("2025-03-30T02:30:00", Some("Europe/Amsterdam")).unwrap();
        assert_eq!(t.timestamp_millis(), 1_743_298_200_000);
    }

    #[test]
    fn bad_inputs_are_errors() {
        assert_eq!(
            parse_site_instant("2025-06-01", Some("Mars/Olympus")),
            Err(TimeError::UnknownZone("Mars/Olympus".to_string()))
        );
        assert!(matches!(
            parse_site_instant("first of june", None),
            Err(TimeError::BadDate(_))
        ));
    }

    #[test]
    fn end_minute_is_inclusive() {
        let anchor = parse_site_instant("2025-06-01T14:00:00", Some("Europe/Amsterdam")).unwrap();
        let b = wave_bounds(&anchor, 0, 59).unwrap();
        assert_eq!(b.start_ms, AMS_14H_MS);
        assert_eq!(b.end_ms, AMS_14H_MS + 60 * 60_000);
        assert!(b.contains(AMS_14H_MS));
        assert!(b.contains(AMS_14H_MS + 59 * 60_000 + 59_999));
        assert!(!b.contains(AMS_14H_MS + 60 * 60_000));
    }

    #[test]
    fn within_24_hours_is_inclusive() {
        assert!(is_within_24_hours(0, MS_PER_DAY));
        assert!(is_within_24_hours(MS_PER_DAY, 0));
        assert!(!is_within_24_hours(0, MS_PER_DAY + 1));
    }

    #[test]
    fn extreme_instants_are_never_within_24_hours() {
        assert!(!is_within_24_hours(i64::MIN + 5, AMS_14H_MS));
        assert!(!is_within_24_hours(i64::MAX, i64::MIN));
        assert!(is_within_24_hours(i64::MIN, i64::MIN + MS_PER_DAY));
    }

    #[test]
    fn out_of_range_offsets_have_no_bounds() {
        let anchor = parse_site_instant("2025-06-01T14:00:00", Some("Europe/Amsterdam")).unwrap();
        assert_eq!(wave_bounds(&anchor, 60, i64::MAX), None);
        assert_eq!(wave_bounds(&anchor, i64::MIN, 0), None);
        assert_eq!(wave_bounds(&anchor, 0, 200_000_000_000_000), None);
        assert!(wave_bounds(&anchor, -60, 10 * 366 * 24 * 60).is_some());
    }

    #[test]
    fn formatting() {
        assert_eq!(
            format_iso_utc(AMS_14H_MS + 123).as_deref(),
            Some("2025-06-01T12:00:00")
        );
        let tz = parse_zone("Europe/Amsterdam").unwrap();
        assert_eq!(format_local_time(AMS_14H_MS + 45, tz), "14:00:00.045");
    }
}
