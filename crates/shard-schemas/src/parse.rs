//! Parsing helpers for raw input files (pure; callers do the IO).

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::{Artifact, Fragment, OrnamentSighting, ShardJumpTimes, TargetSighting};

/// Structural input errors. Data-quality problems inside well-formed
/// records are not errors; the engine reports them as warnings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordError {
    Json { what: &'static str, message: String },
    WrongShape { what: &'static str, expected: &'static str },
}

impl std::fmt::Display for RecordError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RecordError::Json { what, message } => write!(f, "invalid {} json: {}", what, message),
            RecordError::WrongShape { what, expected } => {
                write!(f, "invalid {} shape: expected {}", what, expected)
            }
        }
    }
}

impl std::error::Error for RecordError {}

fn to_value(raw: &str, what: &'static str) -> Result<Value, RecordError> {
    let raw = raw.trim_start_matches('\u{feff}').trim();
    serde_json::from_str(raw).map_err(|e| RecordError::Json {
        what,
        message: e.to_string(),
    })
}

fn from_value<T: DeserializeOwned>(v: Value, what: &'static str) -> Result<T, RecordError> {
    serde_json::from_value(v).map_err(|e| RecordError::Json {
        what,
        message: e.to_string(),
    })
}

/// A telemetry entry that could not be read and was left out.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RejectedRecord {
    /// Owning artifact id; empty when the entry sits above artifact level.
    pub artifact: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub record: Option<String>,
    pub message: String,
}

impl std::fmt::Display for RejectedRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.record {
            Some(r) => write!(f, "artifact {:?} record {}: {}", self.artifact, r, self.message),
            None => write!(f, "artifact {:?}: {}", self.artifact, self.message),
        }
    }
}

/// Exports that parsed, plus the entries dropped along the way.
#[derive(Debug, Clone, Default)]
pub struct ParsedTelemetry {
    pub exports: Vec<ShardJumpTimes>,
    pub rejected: Vec<RejectedRecord>,
}

impl ParsedTelemetry {
    fn reject(&mut self, artifact: &str, record: Option<String>, message: impl Into<String>) {
        self.rejected.push(RejectedRecord {
            artifact: artifact.to_string(),
            record,
            message: message.into(),
        });
    }

    fn export(&mut self, v: Value) -> Option<ShardJumpTimes> {
        let Value::Object(mut map) = v else {
            self.reject("", None, "export is not an object");
            return None;
        };
        let items = match map.remove("artifact") {
            None | Some(Value::Null) => Vec::new(),
            Some(Value::Array(items)) => items,
            Some(_) => {
                self.reject("", None, "artifact is not an array");
                return None;
            }
        };
        let artifact = items.into_iter().filter_map(|a| self.artifact(a)).collect();
        Some(ShardJumpTimes { artifact })
    }

    fn artifact(&mut self, v: Value) -> Option<Artifact> {
        let Value::Object(mut map) = v else {
            self.reject("", None, "artifact is not an object");
            return None;
        };
        let fragments = map.remove("fragment");
        let mut artifact: Artifact = match serde_json::from_value(Value::Object(map)) {
            Ok(a) => a,
            Err(e) => {
                self.reject("", None, e.to_string());
                return None;
            }
        };
        let fragment = match fragments {
            None | Some(Value::Null) => None,
            Some(Value::Array(items)) => Some(
                items
                    .into_iter()
                    .filter_map(|f| self.fragment(&artifact.id, f))
                    .collect(),
            ),
            Some(_) => {
                self.reject(&artifact.id, None, "fragment is not an array");
                None
            }
        };
        artifact.fragment = fragment;
        Some(artifact)
    }

    fn fragment(&mut self, artifact: &str, v: Value) -> Option<Fragment> {
        let record = v.get("id").and_then(Value::as_str).map(str::to_string);
        match serde_json::from_value(v) {
            Ok(f) => Some(f),
            Err(e) => {
                self.reject(artifact, record, e.to_string());
                None
            }
        }
    }
}

/// Telemetry files hold either one export object or an array of them.
///
/// Only a file that is not JSON, or not an object/array, is an error.
/// Below that, each export, artifact and fragment is read on its own; an
/// entry that does not fit its shape is dropped and listed in `rejected`
/// so one bad record cannot sink the rest of the file.
pub fn parse_telemetry(raw: &str) -> Result<ParsedTelemetry, RecordError> {
    const WHAT: &str = "telemetry";
    let items = match to_value(raw, WHAT)? {
        Value::Array(items) => items,
        v @ Value::Object(_) => vec![v],
        _ => {
            return Err(RecordError::WrongShape {
                what: WHAT,
                expected: "object or array of objects",
            })
        }
    };
    let mut parsed = ParsedTelemetry::default();
    for v in items {
        if let Some(export) = parsed.export(v) {
            parsed.exports.push(export);
        }
    }
    Ok(parsed)
}

fn parse_list<T: DeserializeOwned>(raw: &str, what: &'static str) -> Result<Vec<T>, RecordError> {
    match to_value(raw, what)? {
        v @ Value::Array(_) => from_value(v, what),
        _ => Err(RecordError::WrongShape {
            what,
            expected: "array",
        }),
    }
}

pub fn parse_ornaments(raw: &str) -> Result<Vec<OrnamentSighting>, RecordError> {
    parse_list(raw, "ornament")
}

pub fn parse_targets(raw: &str) -> Result<Vec<TargetSighting>, RecordError> {
    parse_list(raw, "target")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn telemetry_object_or_array() {
        let one = parse_telemetry(r#"{ "artifact": [] }"#).unwrap();
        assert_eq!(one.exports.len(), 1);
        let two = parse_telemetry("\u{feff}[{ \"artifact\": [] }, {}]").unwrap();
        assert_eq!(two.exports.len(), 2);
        assert!(two.exports[1].artifact.is_empty());
        assert!(two.rejected.is_empty());
    }

    #[test]
    fn telemetry_scalar_is_wrong_shape() {
        assert!(matches!(
            parse_telemetry("42"),
            Err(RecordError::WrongShape {
                what: "telemetry",
                ..
            })
        ));
    }

    const ONE_BAD_FRAGMENT: &str = r#"{
      "artifact": [{
        "id": "shard",
        "fragment": [
          { "id": "s_1", "history": [
            { "reason": "spawn", "moveTimeMs": "1748779200000",
              "destinationPortalInfo": { "title": "Dam", "latE6": 52373080, "lngE6": 4892453 } }
          ] },
          { "id": "s_2", "history": [
            { "reason": "spawn", "moveTimeMs": "1748779200000",
              "destinationPortalInfo": { "title": "Dam", "latE6": 52373080 } }
          ] }
        ]
      }]
    }"#;

    #[test]
    fn bad_fragment_is_rejected_and_the_rest_kept() {
        let parsed = parse_telemetry(ONE_BAD_FRAGMENT).unwrap();

        let fragments = parsed.exports[0].artifact[0].fragment.as_ref().unwrap();
        assert_eq!(fragments.len(), 1);
        assert_eq!(fragments[0].id, "s_1");
        assert_eq!(parsed.rejected.len(), 1);
        assert_eq!(parsed.rejected[0].artifact, "shard");
        assert_eq!(parsed.rejected[0].record.as_deref(), Some("s_2"));
        assert!(parsed.rejected[0].message.contains("lngE6"));
    }

    #[test]
    fn null_move_time_rejects_only_that_fragment() {
        let raw = r#"[
          { "artifact": [{ "id": "a", "fragment": [
            { "id": "s_1", "history": [{ "reason": "no move", "moveTimeMs": null }] },
            { "id": "s_2", "history": [{ "reason": "no move", "moveTimeMs": 5 }] }
          ] }] },
          "not an export"
        ]"#;
        let parsed = parse_telemetry(raw).unwrap();

        assert_eq!(parsed.exports.len(), 1);
        let fragments = parsed.exports[0].artifact[0].fragment.as_ref().unwrap();
        assert_eq!(fragments.len(), 1);
        assert_eq!(fragments[0].id, "s_2");
        let records: Vec<Option<&str>> =
            parsed.rejected.iter().map(|r| r.record.as_deref()).collect();
        assert_eq!(records, vec![Some("s_1"), None]);
    }

    #[test]
    fn sightings_must_be_arrays() {
        assert!(parse_targets("{}").is_err());
        let t = parse_targets(
            r#"[{ "title": "T", "latE6": 1, "lngE6": 2,
                  "faction": "ENLIGHTENED", "observedAt": 3 }]"#,
        )
        .unwrap();
        assert_eq!(t[0].faction, crate::Faction::Enl);
        assert!(parse_ornaments("not json").is_err());
    }
}
