use std::collections::BTreeSet;
use std::fs;

use anyhow::{bail, Context, Result};
use serde::Deserialize;
use shard_schemas::SiteGeocode;

#[derive(Deserialize)]
#[serde(untagged)]
enum GeocodeFile {
    List(Vec<SiteGeocode>),
    Wrapped { sites: Vec<SiteGeocode> },
}

/// Geocode from JSON or YAML: a list of sites or `{ sites: [...] }`.
/// Every site date must resolve to an instant, and ids must be unique.
pub fn load_geocode_from_str(raw: &str) -> Result<Vec<SiteGeocode>> {
    let raw = raw.trim_start_matches('\u{feff}');
    let file: GeocodeFile = serde_yaml::from_str(raw)
        .context("geocode must be a list of sites or an object with a `sites` list")?;
    let sites = match file {
        GeocodeFile::List(s) => s,
        GeocodeFile::Wrapped { sites } => sites,
    };

    let mut seen: BTreeSet<&str> = BTreeSet::new();
    for site in &sites {
        if !seen.insert(site.id.as_str()) {
            bail!("GEOCODE_DUPLICATE_ID id={}", site.id);
        }
        shard_geo::parse_site_instant(&site.date, site.timezone.as_deref())
            .with_context(|| format!("GEOCODE_BAD_DATE id={} date={}", site.id, site.date))?;
    }
    Ok(sites)
}

pub fn load_geocode(path: &str) -> Result<Vec<SiteGeocode>> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read geocode path: {path}"))?;
    load_geocode_from_str(&raw).with_context(|| format!("invalid geocode file: {path}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_list_and_wrapped_forms() {
        let list = r#"[{ "id": "ams", "lat": 52.37, "lng": 4.89, "date": "2025-06-01T14:00",
                         "timezone": "Europe/Amsterdam", "type": "ANOMALY" }]"#;
        let wrapped = r#"
sites:
  - id: ams
    lat: 52.37
    lng: 4.89
    date: "2025-06-01T14:00[Europe/Amsterdam]"
    brand: ANOMALY
"#;
        let a = load_geocode_from_str(list).unwrap();
        let b = load_geocode_from_str(wrapped).unwrap();
        assert_eq!(a[0].brand, "ANOMALY");
        assert_eq!(b[0].brand, "ANOMALY");
        assert_eq!(a[0].id, b[0].id);
    }

    #[test]
    fn missing_brand_defaults_to_unknown() {
        let raw = r#"[{ "id": "x", "lat": 0, "lng": 0, "date": "2025-01-01" }]"#;
        let s = load_geocode_from_str(raw).unwrap();
        assert_eq!(s[0].brand, shard_schemas::UNKNOWN_BRAND);
    }

    #[test]
    fn rejects_duplicates_and_bad_zones() {
        let dup = r#"[
          { "id": "x", "lat": 0, "lng": 0, "date": "2025-01-01" },
          { "id": "x", "lat": 1, "lng": 1, "date": "2025-01-01" }
        ]"#;
        assert!(load_geocode_from_str(dup).is_err());
        let zone = r#"[{ "id": "x", "lat": 0, "lng": 0, "date": "2025-01-01",
                         "timezone": "Mars/Olympus" }]"#;
        let err = load_geocode_from_str(zone).unwrap_err();
        assert!(format!("{err:#}").contains("GEOCODE_BAD_DATE"));
    }
}
