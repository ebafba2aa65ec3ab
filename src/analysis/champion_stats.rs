use crate::api::models::Match;
use crate::storage::Storage;
use std::collections::HashMap;

/// Appearances per champion id.
pub type ChampionCounts = HashMap<i64, u64>;

/// The participant id of `summoner_name` in `m`, matched exactly on the
/// summoner name recorded in the participant identities.
pub fn participant_id_for(summoner_name: &str, m: &Match) -> Option<i64> {
    m.participant_identities
        .iter()
        .find(|pi| pi.player.summoner_name == summoner_name)
        .map(|pi| pi.participant_id)
}

pub fn summoner_in_match(summoner_name: &str, m: &Match) -> bool {
    participant_id_for(summoner_name, m).is_some()
}

/// Whether the summoner's side won. No participant record (or no stats on
/// it) reads as a loss.
pub fn summoner_won(summoner_name: &str, m: &Match) -> bool {
    participant_id_for(summoner_name, m)
        .and_then(|pid| m.participant(pid))
        .map(|p| p.won())
        .unwrap_or(false)
}

pub fn matches_for_summoner<'a>(storage: &'a Storage, summoner_name: &str) -> Vec<&'a Match> {
    storage
        .matches()
        .filter(|m| summoner_in_match(summoner_name, m))
        .collect()
}

pub fn victory_matches_for_summoner<'a>(storage: &'a Storage, summoner_name: &str) -> Vec<&'a Match> {
    storage
        .matches()
        .filter(|m| summoner_in_match(summoner_name, m) && summoner_won(summoner_name, m))
        .collect()
}

pub fn defeat_matches_for_summoner<'a>(storage: &'a Storage, summoner_name: &str) -> Vec<&'a Match> {
    storage
        .matches()
        .filter(|m| summoner_in_match(summoner_name, m) && !summoner_won(summoner_name, m))
        .collect()
}

/// Count every champion that played on the other team from `summoner_name`.
/// Matches where the summoner has no participant record add nothing.
pub fn enemy_champion_counts<'a>(
    summoner_name: &str,
    matches: impl IntoIterator<Item = &'a Match>,
) -> ChampionCounts {
    let mut counts = ChampionCounts::new();

    for m in matches {
        let Some(team_id) = participant_id_for(summoner_name, m)
            .and_then(|pid| m.participant(pid))
            .map(|p| p.team_id)
        else {
            continue;
        };

        for p in m.participants.iter().filter(|p| p.team_id != team_id) {
            *counts.entry(p.champion_id).or_insert(0) += 1;
        }
    }

    counts
}

/// Count every champion picked in `matches`, regardless of side.
pub fn champion_counts<'a>(matches: impl IntoIterator<Item = &'a Match>) -> ChampionCounts {
    let mut counts = ChampionCounts::new();
    for m in matches {
        for p in &m.participants {
            *counts.entry(p.champion_id).or_insert(0) += 1;
        }
    }
    counts
}
