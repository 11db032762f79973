// HTTP client for the player-stats and team-stats endpoints.
//
// `StatsSource` is the seam the controller depends on; `HttpStatsSource` is
// the reqwest-backed implementation. Tests substitute scripted sources.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Url;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use statboard_core::error::FetchError;
use statboard_core::payload::{PlayerStatsPayload, TeamStatsPayload};

use crate::config::ApiConfig;

// ---------------------------------------------------------------------------
// StatsSource
// ---------------------------------------------------------------------------

#[async_trait]
pub trait StatsSource: Send + Sync {
    async fn player_stats(&self, player_id: &str) -> Result<PlayerStatsPayload, FetchError>;
    async fn team_stats(&self, team_id: &str) -> Result<TeamStatsPayload, FetchError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    PlayerStats,
    TeamStats,
}

impl Endpoint {
    pub fn path(self) -> &'static str {
        match self {
            Endpoint::PlayerStats => "player-stats",
            Endpoint::TeamStats => "team-stats",
        }
    }
}

// ---------------------------------------------------------------------------
// HttpStatsSource
// ---------------------------------------------------------------------------

pub struct HttpStatsSource {
    http: reqwest::Client,
    base_url: Url,
    max_retries: u32,
    retry_delay: Duration,
}

impl HttpStatsSource {
    /// Build a client for `base_url` with a per-request `timeout`. Retries are
    /// off until `with_retries` is called.
    pub fn new(base_url: &str, timeout: Duration) -> anyhow::Result<Self> {
        let base_url = Url::parse(base_url)?;
        if base_url.cannot_be_a_base() {
            anyhow::bail!("base URL {base_url} cannot carry a path");
        }
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            base_url,
            max_retries: 0,
            retry_delay: Duration::ZERO,
        })
    }

    pub fn from_config(api: &ApiConfig) -> anyhow::Result<Self> {
        let source = Self::new(&api.base_url, api.timeout())?;
        Ok(source.with_retries(api.max_retries, api.retry_delay()))
    }

    pub fn with_retries(mut self, max_retries: u32, retry_delay: Duration) -> Self {
        self.max_retries = max_retries;
        self.retry_delay = retry_delay;
        self
    }

    /// `{base}/api/{endpoint}/{id}` with `id` encoded as one path segment, so
    /// `/`, `?`, `#` and `%` in a selector value cannot change the route.
    pub fn endpoint_url(&self, endpoint: Endpoint, id: &str) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().extend(["api", endpoint.path(), id]);
        }
        url
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T, FetchError> {
        let mut attempt = 0;
        loop {
            match self.get_once(&url).await {
                Err(e) if e.is_retryable() && attempt < self.max_retries => {
                    attempt += 1;
                    warn!(%url, attempt, "fetch failed, retrying: {e}");
                    tokio::time::sleep(self.retry_delay).await;
                }
                other => return other,
            }
        }
    }

    async fn get_once<T: DeserializeOwned>(&self, url: &Url) -> Result<T, FetchError> {
        debug!(%url, "GET");
        let transport = |e: reqwest::Error| FetchError::Transport {
            url: url.to_string(),
            message: e.to_string(),
        };

        let response = self.http.get(url.clone()).send().await.map_err(transport)?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let body = response.text().await.map_err(transport)?;
        serde_json::from_str(&body).map_err(|source| FetchError::Decode {
            url: url.to_string(),
            source,
        })
    }
}

#[async_trait]
impl StatsSource for HttpStatsSource {
    async fn player_stats(&self, player_id: &str) -> Result<PlayerStatsPayload, FetchError> {
        self.get_json(self.endpoint_url(Endpoint::PlayerStats, player_id))
            .await
    }

    async fn team_stats(&self, team_id: &str) -> Result<TeamStatsPayload, FetchError> {
        self.get_json(self.endpoint_url(Endpoint::TeamStats, team_id))
            .await
    }
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
