use crate::analysis::recommender::{EnemyChampionStats, UNKNOWN_CHAMPION};
use crate::storage::Storage;
use chrono::{DateTime, Local, Utc};
use colored::*;
use indicatif::{ProgressBar, ProgressStyle};
use tabled::{settings::Style, Table, Tabled};

#[derive(Tabled)]
struct BanRow {
    rank: String,
    champion: String,
    faced: String,
    #[tabled(rename = "enemy wins")]
    victories: String,
    #[tabled(rename = "enemy win rate")]
    win_rate: String,
    #[tabled(rename = "ban score")]
    score: String,
}

fn champion_label(ban: &EnemyChampionStats) -> String {
    if ban.name == UNKNOWN_CHAMPION {
        format!("#{}", ban.champion_id)
    } else {
        ban.name.clone()
    }
}

fn ban_rows(bans: &[EnemyChampionStats]) -> Vec<BanRow> {
    bans.iter()
        .enumerate()
        .map(|(idx, ban)| BanRow {
            rank: format!("#{}", idx + 1),
            champion: champion_label(ban),
            faced: ban.total_matches.to_string(),
            victories: ban.victories.to_string(),
            win_rate: format!("{:.1}%", ban.win_rate * 100.0),
            score: format!("{:.3}", ban.ban_score),
        })
        .collect()
}

pub fn display_ban_recommendations(bans: &[EnemyChampionStats], summoner_name: &str, top_n: usize) {
    println!(
        "\n{}",
        format!("🎮 Ban Recommendations for {} ", summoner_name)
            .bold()
            .cyan()
    );
    println!("{}\n", "=".repeat(60).cyan());

    if bans.is_empty() {
        println!(
            "{}",
            "No ban recommendations available (no cached games for this summoner)".yellow()
        );
        return;
    }

    let shown = &bans[..bans.len().min(top_n)];
    let mut table = Table::new(ban_rows(shown));
    table.with(Style::rounded());
    println!("{}", table);

    println!("\n{}", "Interpretation".bold().yellow());
    println!("• Faced: games this champion played against you");
    println!("• Enemy win rate: how often that champion's team won");
    println!("• Ban score: (enemy win rate + 0.5) ^ faced, higher = better ban\n");

    if let Some(top_ban) = bans.first() {
        println!("{}", "Top Priority Ban".bold().red());
        println!(
            "  {} beat you {}/{} times ({:.1}%)",
            champion_label(top_ban),
            top_ban.victories,
            top_ban.total_matches,
            top_ban.win_rate * 100.0
        );
    }

    println!();
}

pub fn display_cache_summary(storage: &Storage, summoner_games: usize) {
    let updated = storage
        .last_updated
        .map(|t: DateTime<Utc>| t.with_timezone(&Local).format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|| "never".to_string());

    println!(
        "{} {} games cached ({} with this summoner), last updated {}",
        "📦".cyan(),
        storage.len(),
        summoner_games,
        updated
    );
}

pub fn fetch_progress(len: usize) -> ProgressBar {
    let pb = ProgressBar::new(len as u64);
    if let Ok(style) = ProgressStyle::with_template("{spinner} [{bar:40}] {pos}/{len} {msg}") {
        pb.set_style(style.progress_chars("=> "));
    }
    pb.set_message("Fetching match details");
    pb
}

pub fn display_error(error: &str) {
    eprintln!("{} {}", "❌ Error:".red().bold(), error);
}

pub fn display_warning(message: &str) {
    eprintln!("{} {}", "⚠️".yellow(), message);
}

pub fn display_info(message: &str) {
    println!("{} {}", "ℹ️".cyan(), message);
}

pub fn display_success(message: &str) {
    println!("{} {}", "✓".green(), message);
}
