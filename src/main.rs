use anyhow::{Context, Result};
use clap::Parser;
use leaguestats::analysis::champion_stats::matches_for_summoner;
use leaguestats::analysis::recommender::best_bans;
use leaguestats::api::client::RiotClient;
use leaguestats::api::endpoints;
use leaguestats::config::{Config, StdinPrompt};
use leaguestats::display::output::{
    display_ban_recommendations, display_cache_summary, display_error, display_info,
    display_success, display_warning, fetch_progress,
};
use leaguestats::error::AppError;
use leaguestats::storage::Storage;
use leaguestats::sync::{fetch_and_store, pending_game_ids};
use std::collections::HashMap;
use std::path::PathBuf;
use tracing::warn;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "leaguestats")]
#[command(about = "Cache your games and find the enemy champion most worth banning", long_about = None)]
struct Args {
    /// Summoner name (default: the one saved in the config file)
    summoner: Option<String>,

    /// Platform to query, e.g. na1, euw1, kr (default: from config)
    #[arg(short, long)]
    region: Option<String>,

    /// Maximum number of new matches to download this run
    #[arg(short, long, default_value = "50")]
    max_fetch: usize,

    /// Number of bans to display
    #[arg(short, long, default_value = "10")]
    top_n: usize,

    /// Analyze the local cache only, without contacting the API
    #[arg(long)]
    offline: bool,

    /// Keep only the N most recent games in the cache (N >= 1)
    #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
    prune: Option<u64>,

    /// Config file path
    #[arg(long)]
    config: Option<PathBuf>,

    /// Debug logging (RUST_LOG takes precedence)
    #[arg(short, long)]
    verbose: bool,
}

fn main() {
    let args = Args::parse();
    init_logging(args.verbose);

    if let Err(e) = run(args) {
        display_error(&format!("{:#}", e));
        std::process::exit(1);
    }
}

fn init_logging(verbose: bool) {
    let default = if verbose { "leaguestats=debug" } else { "leaguestats=warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

fn run(args: Args) -> Result<()> {
    let config_path = args.config.clone().unwrap_or_else(Config::default_path);
    let mut config = Config::load(&config_path).context("loading configuration")?;

    if let Some(region) = &args.region {
        config.base_url = endpoints::platform_base_url(region);
    }

    let summoner_name = config
        .resolve_summoner(args.summoner.as_deref(), &mut StdinPrompt)
        .context("resolving summoner name")?;

    if !args.offline {
        config
            .ensure_api_key(&mut StdinPrompt)
            .context("validating configuration")?;
    }

    let mut storage = Storage::load(&config.storage_path).context("loading match storage")?;

    let mut names = HashMap::new();
    if !args.offline {
        let mut client = RiotClient::new(&config.base_url, &config.api_key);
        update_storage(&mut client, &mut config, &mut storage, &summoner_name, args.max_fetch)?;

        if let Some(version) = storage.champion_data_version() {
            names = client.get_champion_names(&version).unwrap_or_else(|e| {
                warn!(error = %e, version = version.as_str(), "champion names unavailable");
                display_warning("Champion names unavailable, showing ids instead");
                HashMap::new()
            });
        }
    }

    if let Some(keep) = args.prune {
        let keep = usize::try_from(keep).unwrap_or(usize::MAX);
        let removed = storage.prune(keep).context("pruning match storage")?;
        if removed > 0 {
            display_info(&format!("Pruned {} old games", removed));
        }
    }

    let summoner_games = matches_for_summoner(&storage, &summoner_name).len();
    display_cache_summary(&storage, summoner_games);

    let bans = best_bans(&storage, &summoner_name, &names);
    display_ban_recommendations(&bans, &summoner_name, args.top_n);

    Ok(())
}

/// Run `op` against the API, asking for a new key once if the current one
/// is rejected.
fn with_refresh<T>(
    client: &mut RiotClient,
    config: &mut Config,
    op: impl Fn(&RiotClient) -> Result<T, AppError>,
) -> Result<T, AppError> {
    client.with_key_refresh(
        || config.refresh_api_key(&mut StdinPrompt, "API Key was unauthorized (probably expired)"),
        op,
    )
}

/// Download the summoner's matches that are not cached yet, up to `max_fetch`.
fn update_storage(
    client: &mut RiotClient,
    config: &mut Config,
    storage: &mut Storage,
    summoner_name: &str,
    max_fetch: usize,
) -> Result<()> {
    display_info(&format!("Looking up {} on {}", summoner_name, client.base_url()));
    let summoner = with_refresh(client, config, |c| c.get_summoner(summoner_name))
        .context("looking up summoner")?;
    display_success(&format!(
        "Found {} (level {})",
        summoner.name, summoner.summoner_level
    ));

    let matchlist = with_refresh(client, config, |c| c.get_match_list(&summoner.account_id))
        .context("fetching match list")?;

    let new_ids = pending_game_ids(storage, &matchlist.game_ids(), max_fetch);
    if new_ids.is_empty() {
        display_success("⚡ Cache is up-to-date (no new matches)");
        return Ok(());
    }
    display_success(&format!("✨ Found {} new matches, fetching details...", new_ids.len()));

    let pb = fetch_progress(new_ids.len());
    let result = fetch_and_store(storage, &new_ids, |game_id| {
        let m = with_refresh(client, config, |c| c.get_match(game_id))?;
        pb.inc(1);
        Ok(m)
    });
    pb.finish_and_clear();

    let count = result.context("updating match storage")?;
    display_success(&format!("Saved {} new matches", count));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prune_rejects_zero() {
        assert!(Args::try_parse_from(["leaguestats", "--prune", "0"]).is_err());
        assert!(Args::try_parse_from(["leaguestats", "--prune", "-3"]).is_err());
    }

    #[test]
    fn test_prune_accepts_positive_count() {
        let args = Args::try_parse_from(["leaguestats", "Faker", "--prune", "5"]).unwrap();
        assert_eq!(args.prune, Some(5));
        assert_eq!(args.summoner.as_deref(), Some("Faker"));
        assert_eq!(args.max_fetch, 50);
    }
}
