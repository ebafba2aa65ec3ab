use crate::error::AppError;
use governor::{
    clock::{Clock, DefaultClock},
    state::{InMemoryState, NotKeyed},
    Quota, RateLimiter,
};
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use std::num::NonZeroU32;
use std::thread;
use std::time::Duration;
use tracing::{debug, warn};

use super::endpoints;
use super::models::*;

// Development keys allow 20 requests per second.
const REQUESTS_PER_SECOND: u32 = 20;
const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);
const USER_AGENT: &str = concat!("leaguestats/", env!("CARGO_PKG_VERSION"));

pub struct RiotClient {
    agent: ureq::Agent,
    base_url: String,
    api_key: String,
    rate_limiter: RateLimiter<NotKeyed, InMemoryState, DefaultClock>,
}

impl RiotClient {
    pub fn new(base_url: &str, api_key: &str) -> Self {
        let per_second = NonZeroU32::new(REQUESTS_PER_SECOND).unwrap_or(NonZeroU32::MIN);
        let agent = ureq::AgentBuilder::new()
            .timeout(REQUEST_TIMEOUT)
            .user_agent(USER_AGENT)
            .build();

        RiotClient {
            agent,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            rate_limiter: RateLimiter::direct(Quota::per_second(per_second)),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn set_api_key(&mut self, api_key: &str) {
        self.api_key = api_key.to_string();
    }

    fn wait_for_slot(&self) {
        while let Err(not_until) = self.rate_limiter.check() {
            thread::sleep(not_until.wait_time_from(self.rate_limiter.clock().now()));
        }
    }

    fn execute_request<T: DeserializeOwned>(&self, url: &str, what: &str) -> Result<T, AppError> {
        self.wait_for_slot();
        debug!(url, "GET");

        let response = self
            .agent
            .get(url)
            .query("api_key", &self.api_key)
            .set("Accept", "application/json")
            .call();

        match response {
            Ok(resp) => resp
                .into_json::<T>()
                .map_err(|e| AppError::Json(format!("{}: {}", what, e))),
            Err(ureq::Error::Status(status, _)) => {
                warn!(status, url, "request rejected");
                Err(AppError::from_status(status, what))
            }
            Err(ureq::Error::Transport(t)) => Err(AppError::Http(t.to_string())),
        }
    }

    pub fn get_summoner(&self, name: &str) -> Result<SummonerInfo, AppError> {
        let url = endpoints::summoner_by_name(&self.base_url, name);
        self.execute_request(&url, &format!("summoner '{}'", name))
    }

    pub fn get_match_list(&self, account_id: &str) -> Result<Matchlist, AppError> {
        let url = endpoints::matchlist_by_account(&self.base_url, account_id);
        self.execute_request(&url, &format!("match list for account {}", account_id))
    }

    pub fn get_match(&self, game_id: i64) -> Result<Match, AppError> {
        let url = endpoints::match_by_id(&self.base_url, game_id);
        self.execute_request(&url, &format!("match {}", game_id))
    }

    /// Champion display names for the patch of `game_version`, keyed by
    /// numeric champion id. Served by Data Dragon, which takes no API key.
    pub fn get_champion_names(&self, game_version: &str) -> Result<HashMap<i64, String>, AppError> {
        let url = endpoints::champion_data(game_version).ok_or_else(|| {
            AppError::NotFound(format!("champion data for game version '{}'", game_version))
        })?;
        debug!(url = url.as_str(), "GET");

        let champions: DataDragonChampions = match self.agent.get(&url).call() {
            Ok(resp) => resp
                .into_json()
                .map_err(|e| AppError::Json(format!("champion data: {}", e)))?,
            Err(ureq::Error::Status(status, _)) => {
                return Err(AppError::from_status(status, "champion data"))
            }
            Err(ureq::Error::Transport(t)) => return Err(AppError::Http(t.to_string())),
        };

        Ok(champions.names_by_id())
    }

    /// Run `op`; if the key is rejected, obtain a new one from `refresh`,
    /// install it and run `op` once more.
    pub fn with_key_refresh<T, R, F>(&mut self, mut refresh: R, op: F) -> Result<T, AppError>
    where
        R: FnMut() -> Result<String, AppError>,
        F: Fn(&Self) -> Result<T, AppError>,
    {
        match op(self) {
            Err(AppError::Unauthorized) => {
                warn!("API key rejected, requesting a new one");
                let api_key = refresh()?;
                self.set_api_key(&api_key);
                op(self)
            }
            other => other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn test_refresh_retries_once_with_new_key() {
        let mut client = RiotClient::new("http://127.0.0.1:9", "RGAPI-old");
        let calls = Cell::new(0);

        let result = client.with_key_refresh(
            || Ok("RGAPI-new".to_string()),
            |c| {
                calls.set(calls.get() + 1);
                if c.api_key == "RGAPI-new" {
                    Ok(7)
                } else {
                    Err(AppError::Unauthorized)
                }
            },
        );

        assert_eq!(result.unwrap(), 7);
        assert_eq!(calls.get(), 2);
        assert_eq!(client.api_key, "RGAPI-new");
    }

    #[test]
    fn test_second_rejection_is_returned() {
        let mut client = RiotClient::new("http://127.0.0.1:9", "RGAPI-old");
        let refreshes = Cell::new(0);

        let result: Result<(), AppError> = client.with_key_refresh(
            || {
                refreshes.set(refreshes.get() + 1);
                Ok("RGAPI-still-bad".to_string())
            },
            |_| Err(AppError::Unauthorized),
        );

        assert!(matches!(result, Err(AppError::Unauthorized)));
        assert_eq!(refreshes.get(), 1);
    }

    #[test]
    fn test_other_errors_do_not_refresh() {
        let mut client = RiotClient::new("http://127.0.0.1:9", "RGAPI-key");
        let result: Result<(), AppError> = client.with_key_refresh(
            || panic!("refresh must not be called"),
            |_| Err(AppError::RateLimited),
        );
        assert!(matches!(result, Err(AppError::RateLimited)));
    }

    #[test]
    fn test_transport_failure_is_http_error() {
        // Port 9 (discard) is not listening on loopback in test environments.
        let client = RiotClient::new("http://127.0.0.1:9", "RGAPI-key");
        let result = client.get_match(1);
        assert!(matches!(result, Err(AppError::Http(_))));
    }

    #[test]
    fn test_pacing_waits_once_burst_is_spent() {
        let client = RiotClient::new("http://127.0.0.1:9", "RGAPI-key");
        let start = std::time::Instant::now();
        for _ in 0..=REQUESTS_PER_SECOND {
            client.wait_for_slot();
        }
        let elapsed = start.elapsed();
        // One extra slot refills after 1/20 s.
        assert!(elapsed >= Duration::from_millis(40), "elapsed {:?}", elapsed);
        assert!(elapsed < Duration::from_secs(2), "elapsed {:?}", elapsed);
    }

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        let client = RiotClient::new("https://na1.api.riotgames.com/", "k");
        assert_eq!(client.base_url(), "https://na1.api.riotgames.com");
    }
}
