use serde::{Deserialize, Serialize};
use shard_geo::LatLng;

/// Brand used when a geocode entry does not name one.
pub const UNKNOWN_BRAND: &str = "UNKNOWN";

fn unknown_brand() -> String {
    UNKNOWN_BRAND.to_string()
}

/// One configured event site.
///
/// `date` is the local start time, optionally with a `[Zone/Name]` suffix.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SiteGeocode {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub lat: f64,
    pub lng: f64,
    pub date: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timezone: Option<String>,
    #[serde(default = "unknown_brand", alias = "type")]
    pub brand: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country_code: Option<String>,
}

impl SiteGeocode {
    pub fn position(&self) -> LatLng {
        LatLng::new(self.lat, self.lng)
    }

    /// Name used for per-site schedule overrides and log lines.
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.id)
    }
}
