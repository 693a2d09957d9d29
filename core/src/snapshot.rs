//! Serialized match format used by persistence.

use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

use crate::{Archetype, CellIndex, Side, Unit};

/// Errors raised while encoding or decoding a [`MatchSnapshot`].
#[derive(Debug, Error)]
pub enum SnapshotError {
    /// The payload is not valid JSON.
    #[error("match payload is malformed: {0}")]
    Malformed(#[source] serde_json::Error),
    /// The payload is valid JSON but does not describe a match.
    #[error("match payload is invalid: {0}")]
    Invalid(#[source] serde_json::Error),
    /// The snapshot could not be written.
    #[error("failed to encode match: {0}")]
    Encode(#[source] serde_json::Error),
}

/// Persisted statistics of a single unit.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct UnitRecord {
    /// Unit level.
    pub level: u32,
    /// Attack value.
    pub attack: f64,
    /// Defence value.
    pub defence: f64,
    /// Health value.
    pub health: f64,
    /// Unit archetype.
    pub archetype: Archetype,
}

impl UnitRecord {
    /// Rebuilds the unit described by the record. Health is clamped to range.
    #[must_use]
    pub fn to_unit(&self) -> Unit {
        Unit::from_parts(
            self.level,
            self.attack,
            self.defence,
            self.health,
            self.archetype,
        )
    }
}

impl From<&Unit> for UnitRecord {
    fn from(unit: &Unit) -> Self {
        Self {
            level: unit.level(),
            attack: unit.attack(),
            defence: unit.defence(),
            health: unit.health(),
            archetype: unit.archetype(),
        }
    }
}

/// A persisted unit together with its board position.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlacedRecord {
    /// Unit statistics.
    pub unit: UnitRecord,
    /// Row-major cell the unit occupies.
    pub board_index: CellIndex,
}

/// Complete persisted state of a match.
///
/// Missing or `null` fields decode to their defaults: player turn, turn
/// number one, level one, zero scores, cleared flags and empty rosters.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchSnapshot {
    /// Side holding the turn.
    #[serde(default, deserialize_with = "null_as_default")]
    pub turn: Side,
    /// Current turn number.
    #[serde(default = "one", deserialize_with = "null_as_one")]
    pub turn_number: u32,
    /// Current score.
    #[serde(default, deserialize_with = "null_as_default")]
    pub score: u64,
    /// Best score ever observed.
    #[serde(default, deserialize_with = "null_as_default")]
    pub best_score: u64,
    /// Whether the match was lost.
    #[serde(default, deserialize_with = "null_as_default")]
    pub game_over: bool,
    /// Whether the match was won.
    #[serde(default, deserialize_with = "null_as_default")]
    pub game_completed: bool,
    /// Current level.
    #[serde(default = "one", deserialize_with = "null_as_one")]
    pub level: u32,
    /// Player units on the board.
    #[serde(default, deserialize_with = "null_as_default")]
    pub player_placed: Vec<PlacedRecord>,
    /// Computer units on the board.
    #[serde(default, deserialize_with = "null_as_default")]
    pub enemy_placed: Vec<PlacedRecord>,
}

impl Default for MatchSnapshot {
    fn default() -> Self {
        Self {
            turn: Side::Player,
            turn_number: 1,
            score: 0,
            best_score: 0,
            game_over: false,
            game_completed: false,
            level: 1,
            player_placed: Vec::new(),
            enemy_placed: Vec::new(),
        }
    }
}

impl MatchSnapshot {
    /// Encodes the snapshot as JSON text.
    pub fn to_json(&self) -> Result<String, SnapshotError> {
        serde_json::to_string(self).map_err(SnapshotError::Encode)
    }

    /// Decodes a snapshot from JSON text.
    ///
    /// Syntax errors and unknown archetypes fail the whole decode.
    pub fn from_json(text: &str) -> Result<Self, SnapshotError> {
        serde_json::from_str(text).map_err(|error| {
            if error.is_data() {
                SnapshotError::Invalid(error)
            } else {
                SnapshotError::Malformed(error)
            }
        })
    }

    /// Placed records for the provided side.
    #[must_use]
    pub fn placed(&self, side: Side) -> &[PlacedRecord] {
        match side {
            Side::Player => &self.player_placed,
            Side::Computer => &self.enemy_placed,
        }
    }
}

const fn one() -> u32 {
    1
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

fn null_as_one<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<u32>::deserialize(deserializer)?.unwrap_or_else(one))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn populated() -> MatchSnapshot {
        let mut swordsman = Unit::at_level(Archetype::Swordsman, 2);
        swordsman.set_health(61.5);
        MatchSnapshot {
            turn: Side::Computer,
            turn_number: 4,
            score: 120,
            best_score: 300,
            game_over: false,
            game_completed: false,
            level: 2,
            player_placed: vec![PlacedRecord {
                unit: UnitRecord::from(&swordsman),
                board_index: CellIndex::new(9),
            }],
            enemy_placed: vec![PlacedRecord {
                unit: UnitRecord::from(&Unit::new(Archetype::Daemon)),
                board_index: CellIndex::new(54),
            }],
        }
    }

    #[test]
    fn populated_match_round_trips() {
        let snapshot = populated();
        let json = snapshot.to_json().expect("encode");
        assert_eq!(MatchSnapshot::from_json(&json).expect("decode"), snapshot);
    }

    #[test]
    fn default_match_round_trips() {
        let json = MatchSnapshot::default().to_json().expect("encode");
        assert_eq!(
            MatchSnapshot::from_json(&json).expect("decode"),
            MatchSnapshot::default()
        );
    }

    #[test]
    fn uses_camel_case_field_names() {
        let json = populated().to_json().expect("encode");
        for field in [
            "\"turnNumber\"",
            "\"bestScore\"",
            "\"gameOver\"",
            "\"gameCompleted\"",
            "\"playerPlaced\"",
            "\"enemyPlaced\"",
            "\"boardIndex\"",
            "\"archetype\":\"swordsman\"",
            "\"turn\":\"computer\"",
        ] {
            assert!(json.contains(field), "missing {field} in {json}");
        }
    }

    #[test]
    fn partial_payload_fills_defaults() {
        let snapshot = MatchSnapshot::from_json(
            r#"{"score": 30, "turnNumber": null, "level": null, "enemyPlaced": null}"#,
        )
        .expect("decode");
        assert_eq!(snapshot.score, 30);
        assert_eq!(snapshot.turn, Side::Player);
        assert_eq!(snapshot.turn_number, 1);
        assert_eq!(snapshot.level, 1);
        assert!(snapshot.player_placed.is_empty());
        assert!(snapshot.enemy_placed.is_empty());

        assert_eq!(
            MatchSnapshot::from_json("{}").expect("decode"),
            MatchSnapshot::default()
        );
    }

    #[test]
    fn unknown_archetype_fails_decode() {
        let payload = r#"{"playerPlaced": [{"unit": {"level": 1, "attack": 1, "defence": 1,
            "health": 50, "archetype": "dragon"}, "boardIndex": 3}]}"#;
        assert!(matches!(
            MatchSnapshot::from_json(payload),
            Err(SnapshotError::Invalid(_))
        ));
    }

    #[test]
    fn malformed_json_fails_decode() {
        assert!(matches!(
            MatchSnapshot::from_json("{\"score\": "),
            Err(SnapshotError::Malformed(_))
        ));
    }

    #[test]
    fn record_clamps_health_when_rebuilt() {
        let record = UnitRecord {
            level: 3,
            attack: 20.0,
            defence: 20.0,
            health: 140.0,
            archetype: Archetype::Bowman,
        };
        let unit = record.to_unit();
        assert_eq!(unit.health(), 100.0);
        assert_eq!(unit.level(), 3);
    }
}
