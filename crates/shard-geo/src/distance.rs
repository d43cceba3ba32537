use serde::{Deserialize, Serialize};

/// Mean Earth radius in meters.
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// A decoded geographic position in degrees.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

impl LatLng {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// Decode micro-degree integers (`latE6` / `lngE6`).
    pub fn from_e6(lat_e6: i64, lng_e6: i64) -> Self {
        Self {
            lat: lat_e6 as f64 / 1e6,
            lng: lng_e6 as f64 / 1e6,
        }
    }
}

/// Great-circle distance in meters, rounded to 2 decimals.
///
/// Symmetric, and zero for identical points.
pub fn haversine_m(a: LatLng, b: LatLng) -> f64 {
    let d_lat = (b.lat - a.lat).to_radians();
    let d_lng = (b.lng - a.lng).to_radians();

    let h = (d_lat / 2.0).sin().powi(2)
        + a.lat.to_radians().cos() * b.lat.to_radians().cos() * (d_lng / 2.0).sin().powi(2);
    let c = 2.0 * h.sqrt().atan2((1.0 - h).sqrt());

    round_to(EARTH_RADIUS_M * c, 2)
}

/// Round half away from zero to `decimals` places.
pub fn round_to(value: f64, decimals: u32) -> f64 {
    if decimals == 0 {
        return value.round();
    }
    let p = 10f64.powi(decimals as i32);
    (value * p).round() / p
}

/// Truncate toward zero to `decimals` places.
pub fn truncate_to(value: f64, decimals: u32) -> f64 {
    if decimals == 0 {
        return value.trunc();
    }
    let p = 10f64.powi(decimals as i32);
    (value * p).trunc() / p
}

/// Arithmetic mean of the points, truncated to 6 decimals. `None` when
/// empty.
pub fn centroid(points: &[LatLng]) -> Option<LatLng> {
    if points.is_empty() {
        return None;
    }
    let n = points.len() as f64;
    let (lat, lng) = points
        .iter()
        .fold((0.0, 0.0), |(la, ln), p| (la + p.lat, ln + p.lng));
    Some(LatLng::new(truncate_to(lat / n, 6), truncate_to(lng / n, 6)))
}

#[cfg(test)]
mod tests {
    use super::*;

    // Amsterdam Centraal -> Dam square, roughly 800 m apart.
    const CENTRAAL: LatLng = LatLng {
        lat: 52.378_901,
        lng: 4.900_272,
    };
    const DAM: LatLng = LatLng {
        lat: 52.373_080,
        lng: 4.892_453,
    };

    #[test]
    fn distance_is_symmetric() {
        assert_eq!(haversine_m(CENTRAAL, DAM), haversine_m(DAM, CENTRAAL));
    }

    #[test]
    fn distance_to_self_is_zero() {
        assert_eq!(haversine_m(DAM, DAM), 0.0);
    }

    #[test]
    fn distance_is_rounded_to_centimeters() {
        let d = haversine_m(CENTRAAL, DAM);
        assert!(d > 750.0 && d < 850.0, "got {d}");
        assert_eq!(d, round_to(d, 2));
    }

    #[test]
    fn one_degree_of_latitude_is_about_111km() {
        let d = haversine_m(LatLng::new(0.0, 0.0), LatLng::new(1.0, 0.0));
        assert!((d - 111_194.93).abs() < 0.01, "got {d}");
    }

    #[test]
    fn e6_decoding() {
        let p = LatLng::from_e6(52_373_080, -4_892_453);
        assert_eq!(p.lat, 52.37308);
        assert_eq!(p.lng, -4.892453);
    }

    #[test]
    fn rounding_and_truncation() {
        assert_eq!(round_to(1.005_1, 2), 1.01);
        assert_eq!(round_to(2.5, 0), 3.0);
        assert_eq!(truncate_to(52.123_456_9, 6), 52.123_456);
        assert_eq!(truncate_to(-4.999_999_99, 6), -4.999_999);
        assert_eq!(truncate_to(7.9, 0), 7.0);
    }

    #[test]
    fn centroid_is_truncated_mean() {
        assert_eq!(centroid(&[]), None);
        let c = centroid(&[
            LatLng::new(1.0, 2.0),
            LatLng::new(2.0, 3.0),
            LatLng::new(2.0, 3.0),
        ])
        .unwrap();
        assert_eq!(c, LatLng::new(1.666_666, 2.666_666));
    }
}
