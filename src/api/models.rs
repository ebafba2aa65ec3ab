use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

// Summoner V4 response
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SummonerInfo {
    pub id: String,
    pub account_id: String,
    pub puuid: String,
    pub name: String,
    pub profile_icon_id: i64,
    pub revision_date: i64,
    pub summoner_level: i64,
}

// Match V4 matchlist response
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MatchReference {
    pub lane: String,
    pub game_id: i64,
    pub champion: i64,
    pub platform_id: String,
    pub season: i64,
    pub queue: i64,
    pub role: String,
    pub timestamp: i64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Matchlist {
    pub matches: Vec<MatchReference>,
    pub total_games: i64,
    pub start_index: i64,
    pub end_index: i64,
}

impl Matchlist {
    /// Game ids in the order the API listed them (most recent first).
    pub fn game_ids(&self) -> Vec<i64> {
        self.matches.iter().map(|m| m.game_id).collect()
    }
}

// Match V4 response. This is also the record kept in local storage, so
// anything we don't model lands in `extra` and is written back untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Match {
    pub game_id: i64,
    pub season_id: i64,
    pub queue_id: i64,
    pub game_version: String,
    pub platform_id: String,
    pub game_mode: String,
    pub map_id: i64,
    pub game_type: String,
    pub game_duration: i64,
    pub game_creation: i64,
    pub participant_identities: Vec<ParticipantIdentity>,
    pub participants: Vec<Participant>,
    pub teams: Vec<TeamStats>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

impl Match {
    pub fn participant(&self, participant_id: i64) -> Option<&Participant> {
        self.participants
            .iter()
            .find(|p| p.participant_id == participant_id)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ParticipantIdentity {
    pub participant_id: i64,
    pub player: Player,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Player {
    pub current_platform_id: String,
    pub summoner_name: String,
    pub match_history_uri: String,
    pub platform_id: String,
    pub current_account_id: String,
    pub profile_icon: i64,
    pub summoner_id: String,
    pub account_id: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Participant {
    pub participant_id: i64,
    pub team_id: i64,
    pub champion_id: i64,
    pub spell1_id: i64,
    pub spell2_id: i64,
    pub highest_achieved_season_tier: String,
    pub stats: Option<ParticipantStats>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

impl Participant {
    pub fn won(&self) -> bool {
        self.stats.as_ref().map(|s| s.win).unwrap_or(false)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ParticipantStats {
    pub participant_id: i64,
    pub win: bool,
    pub kills: i64,
    pub deaths: i64,
    pub assists: i64,
    pub champ_level: i64,
    pub gold_earned: i64,
    pub total_minions_killed: i64,
    pub total_damage_dealt_to_champions: i64,
    pub vision_score: i64,
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TeamStats {
    pub team_id: i64,
    /// "Win" or "Fail"
    pub win: String,
    pub bans: Vec<TeamBan>,
    pub first_blood: bool,
    pub first_tower: bool,
    pub first_baron: bool,
    pub first_dragon: bool,
    pub tower_kills: i64,
    pub baron_kills: i64,
    pub dragon_kills: i64,
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TeamBan {
    pub pick_turn: i64,
    pub champion_id: i64,
}

// Data Dragon champion response
#[derive(Debug, Deserialize)]
pub struct DataDragonChampions {
    #[serde(default)]
    pub version: String,
    pub data: HashMap<String, ChampionInfo>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ChampionInfo {
    pub id: String,
    pub name: String,
    /// Numeric champion id, as a string.
    pub key: String,
}

impl DataDragonChampions {
    /// Map numeric champion ids to display names. Entries with a malformed
    /// key are skipped.
    pub fn names_by_id(&self) -> HashMap<i64, String> {
        self.data
            .values()
            .filter_map(|c| c.key.parse::<i64>().ok().map(|id| (id, c.name.clone())))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_match_keeps_unmodelled_fields() {
        let raw = json!({
            "gameId": 42,
            "gameVersion": "10.5.308.9158",
            "someFutureField": {"nested": [1, 2, 3]},
            "participants": [{
                "participantId": 1,
                "teamId": 100,
                "championId": 64,
                "timeline": {"lane": "JUNGLE"},
                "stats": {"win": true, "kills": 7, "perk0": 8010}
            }]
        });

        let m: Match = serde_json::from_value(raw.clone()).unwrap();
        assert_eq!(m.game_id, 42);
        assert!(m.participants[0].won());
        assert_eq!(m.participants[0].stats.as_ref().unwrap().kills, 7);

        let back = serde_json::to_value(&m).unwrap();
        assert_eq!(back["someFutureField"], raw["someFutureField"]);
        assert_eq!(back["participants"][0]["timeline"]["lane"], "JUNGLE");
        assert_eq!(back["participants"][0]["stats"]["perk0"], 8010);
    }

    #[test]
    fn test_participant_without_stats_did_not_win() {
        let p: Participant =
            serde_json::from_value(json!({"participantId": 3, "teamId": 200})).unwrap();
        assert!(!p.won());
    }

    #[test]
    fn test_matchlist_game_ids_in_order() {
        let ml: Matchlist = serde_json::from_value(json!({
            "matches": [{"gameId": 3}, {"gameId": 1}, {"gameId": 2}],
            "totalGames": 3
        }))
        .unwrap();
        assert_eq!(ml.game_ids(), vec![3, 1, 2]);
    }

    #[test]
    fn test_champion_names_by_numeric_key() {
        let dd: DataDragonChampions = serde_json::from_value(json!({
            "type": "champion",
            "version": "10.5.1",
            "data": {
                "Ahri": {"id": "Ahri", "key": "103", "name": "Ahri"},
                "MonkeyKing": {"id": "MonkeyKing", "key": "62", "name": "Wukong"},
                "Broken": {"id": "Broken", "key": "n/a", "name": "Broken"}
            }
        }))
        .unwrap();
        let names = dd.names_by_id();
        assert_eq!(names.len(), 2);
        assert_eq!(names[&62], "Wukong");
        assert_eq!(names[&103], "Ahri");
    }
}
