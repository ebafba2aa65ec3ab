// End-to-end checks of the cache and the ban ranking: raw v4 match JSON goes
// into storage, storage is reloaded from disk, and bans are ranked from it.

use std::collections::HashMap;
use std::path::PathBuf;

use leaguestats::analysis::recommender::best_bans;
use leaguestats::api::models::{Match, Matchlist};
use leaguestats::storage::Storage;
use serde_json::{json, Value};

fn temp_storage_path(name: &str) -> PathBuf {
    std::env::temp_dir()
        .join(format!("leaguestats-it-{}-{}", name, std::process::id()))
        .join("storage.json")
}

/// A 2v2 game. "Me" is participant 1 on team 100 playing champion 1.
fn raw_match(game_id: i64, creation: i64, me_won: bool, enemies: [i64; 2]) -> Value {
    let side = |won: bool| if won { "Win" } else { "Fail" };
    json!({
        "gameId": game_id,
        "platformId": "NA1",
        "gameCreation": creation,
        "gameDuration": 1800,
        "queueId": 420,
        "seasonId": 13,
        "gameVersion": "10.5.308.9158",
        "gameMode": "CLASSIC",
        "gameType": "MATCHED_GAME",
        "teams": [
            {"teamId": 100, "win": side(me_won), "bans": [{"championId": 555, "pickTurn": 1}]},
            {"teamId": 200, "win": side(!me_won), "bans": []}
        ],
        "participants": [
            {"participantId": 1, "teamId": 100, "championId": 1, "stats": {"participantId": 1, "win": me_won, "kills": 3}},
            {"participantId": 2, "teamId": 100, "championId": 2, "stats": {"participantId": 2, "win": me_won}},
            {"participantId": 3, "teamId": 200, "championId": enemies[0], "stats": {"participantId": 3, "win": !me_won}},
            {"participantId": 4, "teamId": 200, "championId": enemies[1], "stats": {"participantId": 4, "win": !me_won}}
        ],
        "participantIdentities": [
            {"participantId": 1, "player": {"summonerName": "Me", "accountId": "acc-me"}},
            {"participantId": 2, "player": {"summonerName": "Buddy", "accountId": "acc-buddy"}},
            {"participantId": 3, "player": {"summonerName": "Foe A", "accountId": "acc-a"}},
            {"participantId": 4, "player": {"summonerName": "Foe B", "accountId": "acc-b"}}
        ]
    })
}

fn parse(raw: Value) -> Match {
    serde_json::from_value(raw).unwrap()
}

#[test]
fn test_ranking_survives_reload() {
    let path = temp_storage_path("ranking");
    let _ = std::fs::remove_file(&path);

    let mut storage = Storage::load(&path).unwrap();
    storage
        .upsert_records(vec![
            parse(raw_match(1, 1_000, true, [10, 20])),
            parse(raw_match(2, 2_000, false, [10, 30])),
            parse(raw_match(3, 3_000, false, [10, 20])),
        ])
        .unwrap();

    let storage = Storage::load(&path).unwrap();
    assert_eq!(storage.len(), 3);

    let names = HashMap::from([(10, "Annie".to_string()), (20, "Olaf".to_string())]);
    let bans = best_bans(&storage, "Me", &names);

    let order: Vec<i64> = bans.iter().map(|b| b.champion_id).collect();
    assert_eq!(order, vec![10, 30, 20]);

    // Annie: 3 games, won 2 of them against Me.
    assert_eq!(bans[0].name, "Annie");
    assert_eq!(bans[0].total_matches, 3);
    assert_eq!(bans[0].victories, 2);
    assert_eq!(bans[0].win_rate, 0.667);
    assert_eq!(bans[0].ban_score, 1.589);

    // Champion 30 has no name available.
    assert_eq!(bans[1].name, "None");
    assert_eq!(bans[1].win_rate, 1.0);
    assert_eq!(bans[1].ban_score, 1.5);

    assert_eq!(bans[2].name, "Olaf");
    assert_eq!(bans[2].win_rate, 0.5);
    assert_eq!(bans[2].ban_score, 1.0);

    // Allies never show up as bans.
    assert!(bans.iter().all(|b| b.champion_id != 1 && b.champion_id != 2));
}

#[test]
fn test_ranking_from_an_ally_perspective() {
    let mut storage = Storage::new(temp_storage_path("ally"));
    storage.data.insert(1, parse(raw_match(1, 1, true, [10, 20])));

    let bans = best_bans(&storage, "Foe A", &HashMap::new());
    let ids: Vec<i64> = bans.iter().map(|b| b.champion_id).collect();
    // Foe A lost, so champions 1 and 2 both beat them once.
    assert_eq!(ids, vec![1, 2]);
    assert!(bans.iter().all(|b| b.ban_score == 1.5));
}

#[test]
fn test_unknown_summoner_gets_no_bans() {
    let mut storage = Storage::new(temp_storage_path("unknown"));
    storage.data.insert(1, parse(raw_match(1, 1, true, [10, 20])));
    assert!(best_bans(&storage, "Nobody", &HashMap::new()).is_empty());
}

#[test]
fn test_only_unseen_games_are_fetched() {
    let path = temp_storage_path("filter");
    let _ = std::fs::remove_file(&path);

    let mut storage = Storage::load(&path).unwrap();
    storage
        .upsert_records(vec![parse(raw_match(11, 1, true, [10, 20]))])
        .unwrap();

    let matchlist: Matchlist = serde_json::from_value(json!({
        "matches": [
            {"gameId": 13, "champion": 1, "queue": 420, "timestamp": 3},
            {"gameId": 12, "champion": 1, "queue": 420, "timestamp": 2},
            {"gameId": 11, "champion": 1, "queue": 420, "timestamp": 1}
        ],
        "startIndex": 0,
        "endIndex": 3,
        "totalGames": 3
    }))
    .unwrap();

    let reloaded = Storage::load(&path).unwrap();
    assert_eq!(reloaded.filter_game_ids(&matchlist.game_ids()), vec![13, 12]);
}

#[test]
fn test_cached_record_keeps_full_payload() {
    let path = temp_storage_path("payload");
    let _ = std::fs::remove_file(&path);

    let mut raw = raw_match(21, 1, true, [10, 20]);
    raw["mapId"] = json!(11);
    raw["participants"][0]["timeline"] = json!({"lane": "MIDDLE", "role": "SOLO"});

    let mut storage = Storage::load(&path).unwrap();
    storage.upsert_records(vec![parse(raw.clone())]).unwrap();

    let stored = Storage::load(&path).unwrap();
    let back = serde_json::to_value(stored.get(21).unwrap()).unwrap();
    assert_eq!(back["mapId"], 11);
    assert_eq!(back["participants"][0]["timeline"]["lane"], "MIDDLE");
    assert_eq!(back["teams"][0]["bans"][0]["championId"], 555);
}
