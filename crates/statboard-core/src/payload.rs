// Statistics payloads returned by the player-stats and team-stats endpoints.
//
// Stat mappings keep the field order the server emitted (serde_json is built
// with `preserve_order`), which is also the order rows are rendered in.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

// ---------------------------------------------------------------------------
// StatMap / StatValue
// ---------------------------------------------------------------------------

/// Mapping from stat name to display value, in server emission order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StatMap(Map<String, Value>);

impl StatMap {
    pub fn new() -> Self {
        StatMap(Map::new())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Append an entry. Re-inserting an existing key replaces its value but
    /// keeps the key's original position.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.0.insert(name.into(), value.into());
    }

    /// Iterate `(label, value)` pairs in emission order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, StatValue<'_>)> {
        self.0.iter().map(|(k, v)| (k.as_str(), StatValue(v)))
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for StatMap {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = StatMap::new();
        for (k, v) in iter {
            map.insert(k, v);
        }
        map
    }
}

/// Borrowed display view of a single stat value.
///
/// Numbers and strings are the contract; anything else the server sends is
/// shown as its compact JSON text so a surprising payload still renders.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StatValue<'a>(&'a Value);

impl fmt::Display for StatValue<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Value::Null => Ok(()),
            Value::String(s) => f.write_str(s),
            Value::Number(n) => write!(f, "{n}"),
            Value::Bool(b) => write!(f, "{b}"),
            other => write!(f, "{other}"),
        }
    }
}

// ---------------------------------------------------------------------------
// Player payload
// ---------------------------------------------------------------------------

/// Body of `GET /api/player-stats/{playerId}`.
///
/// Both fields are optional on the wire. An absent field renders as an empty
/// region.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerStatsPayload {
    pub career_stats: Option<StatMap>,
    pub position_analysis: Option<PositionAnalysis>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PositionAnalysis {
    #[serde(default)]
    pub explanation: String,
    #[serde(default)]
    pub stats: StatMap,
}

// ---------------------------------------------------------------------------
// Team payload
// ---------------------------------------------------------------------------

/// Body of `GET /api/team-stats/{teamId}`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamStatsPayload {
    pub team_stats: Option<StatMap>,
    pub roster_stats: Option<Vec<RosterEntry>>,
}

/// One roster player with their own stat mapping.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RosterEntry {
    pub name: String,
    #[serde(default)]
    pub stats: StatMap,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stat_map_preserves_server_order() {
        let json = r#"{ "Zeta": 1, "Alpha": 2, "Mid": 3 }"#;
        let map: StatMap = serde_json::from_str(json).unwrap();
        let keys: Vec<&str> = map.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["Zeta", "Alpha", "Mid"]);
    }

    #[test]
    fn stat_values_display_verbatim() {
        let json = r#"{ "Goals": 10, "Pct": 12.5, "Foot": "Left", "Note": null, "Active": true }"#;
        let map: StatMap = serde_json::from_str(json).unwrap();
        let shown: Vec<String> = map.iter().map(|(_, v)| v.to_string()).collect();
        assert_eq!(shown, vec!["10", "12.5", "Left", "", "true"]);
    }

    #[test]
    fn nested_values_display_as_json() {
        let json = r#"{ "Splits": [1, 2] }"#;
        let map: StatMap = serde_json::from_str(json).unwrap();
        let (_, v) = map.iter().next().unwrap();
        assert_eq!(v.to_string(), "[1,2]");
    }

    #[test]
    fn player_payload_parses_camel_case_fields() {
        let json = r#"{
            "careerStats": { "Goals": 10 },
            "positionAnalysis": { "explanation": "Forward", "stats": { "Speed": 90 } }
        }"#;
        let payload: PlayerStatsPayload = serde_json::from_str(json).unwrap();
        assert_eq!(payload.career_stats.unwrap().len(), 1);
        let analysis = payload.position_analysis.unwrap();
        assert_eq!(analysis.explanation, "Forward");
        assert_eq!(analysis.stats.len(), 1);
    }

    #[test]
    fn player_payload_missing_fields_are_none() {
        let payload: PlayerStatsPayload = serde_json::from_str("{}").unwrap();
        assert!(payload.career_stats.is_none());
        assert!(payload.position_analysis.is_none());
    }

    #[test]
    fn position_analysis_defaults_missing_parts() {
        let json = r#"{ "positionAnalysis": {} }"#;
        let payload: PlayerStatsPayload = serde_json::from_str(json).unwrap();
        let analysis = payload.position_analysis.unwrap();
        assert!(analysis.explanation.is_empty());
        assert!(analysis.stats.is_empty());
    }

    #[test]
    fn team_payload_keeps_roster_order() {
        let json = r#"{
            "teamStats": { "Wins": 20, "Losses": 4 },
            "rosterStats": [
                { "name": "Yara", "stats": { "Goals": 3 } },
                { "name": "Abe", "stats": {} }
            ]
        }"#;
        let payload: TeamStatsPayload = serde_json::from_str(json).unwrap();
        assert_eq!(payload.team_stats.unwrap().len(), 2);
        let names: Vec<String> = payload
            .roster_stats
            .unwrap()
            .into_iter()
            .map(|r| r.name)
            .collect();
        assert_eq!(names, vec!["Yara", "Abe"]);
    }

    #[test]
    fn roster_entry_without_name_is_rejected() {
        let json = r#"{ "rosterStats": [ { "stats": {} } ] }"#;
        assert!(serde_json::from_str::<TeamStatsPayload>(json).is_err());
    }

    #[test]
    fn insert_existing_key_keeps_position() {
        let mut map: StatMap = [("A", 1), ("B", 2)].into_iter().collect();
        map.insert("A", 5);
        let entries: Vec<(String, String)> = map
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        assert_eq!(
            entries,
            vec![("A".into(), "5".into()), ("B".into(), "2".into())]
        );
    }
}
