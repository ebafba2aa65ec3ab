// Riot v4 endpoint paths and URL builders.

pub const DEFAULT_PLATFORM: &str = "na1";

pub const SUMMONER_BY_NAME: &str = "/lol/summoner/v4/summoners/by-name";
pub const MATCHLIST_BY_ACCOUNT: &str = "/lol/match/v4/matchlists/by-account";
pub const MATCH_BY_ID: &str = "/lol/match/v4/matches";

pub const DATA_DRAGON_CDN: &str = "https://ddragon.leagueoflegends.com/cdn";

pub fn platform_base_url(platform: &str) -> String {
    format!("https://{}.api.riotgames.com", platform.to_lowercase())
}

pub fn summoner_by_name(base_url: &str, name: &str) -> String {
    format!(
        "{}{}/{}",
        base_url.trim_end_matches('/'),
        SUMMONER_BY_NAME,
        urlencoding::encode(name)
    )
}

pub fn matchlist_by_account(base_url: &str, account_id: &str) -> String {
    format!(
        "{}{}/{}",
        base_url.trim_end_matches('/'),
        MATCHLIST_BY_ACCOUNT,
        urlencoding::encode(account_id)
    )
}

pub fn match_by_id(base_url: &str, game_id: i64) -> String {
    format!("{}{}/{}", base_url.trim_end_matches('/'), MATCH_BY_ID, game_id)
}

/// Data Dragon only publishes `major.minor.1` for each patch, so the
/// build components of a game version are replaced.
pub fn champion_data(game_version: &str) -> Option<String> {
    let mut parts = game_version.split('.');
    let major = parts.next().filter(|s| !s.is_empty())?;
    let minor = parts.next().filter(|s| !s.is_empty())?;
    Some(format!(
        "{}/{}.{}.1/data/en_US/champion.json",
        DATA_DRAGON_CDN, major, minor
    ))
}
