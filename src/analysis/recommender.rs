use super::champion_stats::{
    defeat_matches_for_summoner, enemy_champion_counts, matches_for_summoner, ChampionCounts,
};
use crate::storage::Storage;
use std::cmp::Ordering;
use std::collections::HashMap;

pub const UNKNOWN_CHAMPION: &str = "None";

#[derive(Debug, Clone, PartialEq)]
pub struct EnemyChampionStats {
    pub champion_id: i64,
    pub name: String,
    /// Games the champion played against the summoner.
    pub total_matches: u64,
    /// Of those, games the champion's side won.
    pub victories: u64,
    pub win_rate: f64,
    pub ban_score: f64,
}

/// Round to three decimals, ties to even on the exact binary value.
pub fn round3(value: f64) -> f64 {
    format!("{:.3}", value).parse().unwrap_or(value)
}

/// Victories over appearances per champion, to three decimals. Champions
/// without victories get 0.
pub fn champion_win_rates(
    counts: &ChampionCounts,
    victory_counts: &ChampionCounts,
) -> HashMap<i64, f64> {
    counts
        .iter()
        .map(|(&champion_id, &total)| {
            let wins = victory_counts.get(&champion_id).copied().unwrap_or(0);
            let rate = if total == 0 {
                0.0
            } else {
                round3(wins as f64 / total as f64)
            };
            (champion_id, rate)
        })
        .collect()
}

/// Ban score = (win_rate + 0.5) ^ appearances, to three decimals.
///
/// Anything the summoner beats more often than not scores below 1 and
/// shrinks with more games; anything that beats the summoner grows
/// geometrically with every additional meeting.
pub fn ban_scores(counts: &ChampionCounts, win_rates: &HashMap<i64, f64>) -> HashMap<i64, f64> {
    win_rates
        .iter()
        .map(|(&champion_id, &rate)| {
            let count = counts.get(&champion_id).copied().unwrap_or(1);
            let exponent = i32::try_from(count).unwrap_or(i32::MAX);
            (champion_id, round3((rate + 0.5).powi(exponent)))
        })
        .collect()
}

/// Rank every enemy champion the summoner has faced in storage, best ban first.
pub fn best_bans(
    storage: &Storage,
    summoner_name: &str,
    names: &HashMap<i64, String>,
) -> Vec<EnemyChampionStats> {
    let summoner_matches = matches_for_summoner(storage, summoner_name);
    let enemy_counts = enemy_champion_counts(summoner_name, summoner_matches);

    let defeat_matches = defeat_matches_for_summoner(storage, summoner_name);
    let enemy_victories = enemy_champion_counts(summoner_name, defeat_matches);

    let win_rates = champion_win_rates(&enemy_counts, &enemy_victories);
    let scores = ban_scores(&enemy_counts, &win_rates);

    let mut stats: Vec<EnemyChampionStats> = enemy_counts
        .iter()
        .map(|(&champion_id, &total_matches)| EnemyChampionStats {
            champion_id,
            name: names
                .get(&champion_id)
                .cloned()
                .unwrap_or_else(|| UNKNOWN_CHAMPION.to_string()),
            total_matches,
            victories: enemy_victories.get(&champion_id).copied().unwrap_or(0),
            win_rate: win_rates.get(&champion_id).copied().unwrap_or(0.0),
            ban_score: scores.get(&champion_id).copied().unwrap_or(0.0),
        })
        .collect();

    stats.sort_by(|a, b| {
        b.ban_score
            .partial_cmp(&a.ban_score)
            .unwrap_or(Ordering::Equal)
            .then_with(|| b.total_matches.cmp(&a.total_matches))
            .then_with(|| a.champion_id.cmp(&b.champion_id))
    });

    stats
}
