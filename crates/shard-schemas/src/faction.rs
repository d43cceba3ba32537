use serde::{Deserialize, Serialize};

/// Playable factions, serialized with their short codes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum Faction {
    Res,
    Enl,
    Mac,
}

impl Faction {
    pub const ALL: [Faction; 3] = [Faction::Res, Faction::Enl, Faction::Mac];

    pub fn as_str(&self) -> &'static str {
        match self {
            Faction::Res => "RES",
            Faction::Enl => "ENL",
            Faction::Mac => "MAC",
        }
    }

    /// Accepts the telemetry team names (`RESISTANCE`, `ENLIGHTENED`,
    /// `MACHINA`) and the short codes. Anything else (`NEUTRAL`, empty) has
    /// no faction.
    pub fn from_team(team: &str) -> Option<Faction> {
        match team.trim().to_ascii_uppercase().as_str() {
            "RESISTANCE" | "RES" => Some(Faction::Res),
            "ENLIGHTENED" | "ENL" => Some(Faction::Enl),
            "MACHINA" | "MAC" => Some(Faction::Mac),
            _ => None,
        }
    }
}

impl std::fmt::Display for Faction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<Faction> for String {
    fn from(v: Faction) -> Self {
        v.as_str().to_string()
    }
}

impl TryFrom<String> for Faction {
    type Error = String;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Faction::from_team(&s).ok_or_else(|| format!("unknown faction: {s}"))
    }
}

/// Per-faction counter (`{ "RES": n, "ENL": n, "MAC": n }`).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FactionTally {
    #[serde(rename = "RES")]
    pub res: u32,
    #[serde(rename = "ENL")]
    pub enl: u32,
    #[serde(rename = "MAC")]
    pub mac: u32,
}

impl FactionTally {
    pub fn add(&mut self, faction: Faction, n: u32) {
        match faction {
            Faction::Res => self.res += n,
            Faction::Enl => self.enl += n,
            Faction::Mac => self.mac += n,
        }
    }

    pub fn get(&self, faction: Faction) -> u32 {
        match faction {
            Faction::Res => self.res,
            Faction::Enl => self.enl,
            Faction::Mac => self.mac,
        }
    }

    pub fn total(&self) -> u32 {
        self.res + self.enl + self.mac
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn team_names_map_to_codes() {
        assert_eq!(Faction::from_team("RESISTANCE"), Some(Faction::Res));
        assert_eq!(Faction::from_team("enl"), Some(Faction::Enl));
        assert_eq!(Faction::from_team("MACHINA"), Some(Faction::Mac));
        assert_eq!(Faction::from_team("NEUTRAL"), None);
    }

    #[test]
    fn serializes_as_short_code() {
        let s = serde_json::to_string(&Faction::Enl).unwrap();
        assert_eq!(s, "\"ENL\"");
        let f: Faction = serde_json::from_str("\"RESISTANCE\"").unwrap();
        assert_eq!(f, Faction::Res);
    }

    #[test]
    fn tally_adds_per_faction() {
        let mut t = FactionTally::default();
        t.add(Faction::Res, 5);
        t.add(Faction::Res, 10);
        t.add(Faction::Mac, 1);
        assert_eq!(t.get(Faction::Res), 15);
        assert_eq!(t.total(), 16);
        let json = serde_json::to_value(t).unwrap();
        assert_eq!(json, serde_json::json!({ "RES": 15, "ENL": 0, "MAC": 1 }));
    }
}
