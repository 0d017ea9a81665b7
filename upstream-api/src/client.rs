use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use chrono::Utc;
use governor::{
    Quota, RateLimiter,
    clock::DefaultClock,
    state::{InMemoryState, NotKeyed},
};
use nonzero_ext::nonzero;
use reqwest::StatusCode;
use reqwest::header::{
    ACCEPT, ACCEPT_LANGUAGE, HeaderMap, HeaderValue, ORIGIN, REFERER, USER_AGENT,
};
use serde::de::DeserializeOwned;
use tokio::sync::Mutex;
use tracing::{debug, trace, warn};

use battletrack_shared::{
    Location, Match, Team, Tournament,
    errors::UpstreamError,
    traits::api::{LocationApi, Page, TeamApi, TournamentApi, UpstreamApiFull},
};

use crate::dto::{LocationDto, MatchDto, TeamPageDto, TournamentPageDto};
use crate::metrics::RequestMetrics;

/// Venue data barely moves during a day, one refresh per window is plenty.
const LOCATION_CACHE_TTL: Duration = Duration::from_secs(300);

/// Per-attempt socket/timeout budget.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

/// How request attempts are retried. Injectable so tests do not sit through
/// real backoff windows.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay: Duration,
    pub max_delay: Duration,
    /// Minimum delay once the upstream answered 403/429. A block signal
    /// gets a wider window than an ordinary transient failure.
    pub block_floor: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(8),
            block_floor: Duration::from_secs(5),
        }
    }
}

impl RetryPolicy {
    fn delay_for(&self, attempt: u32, blocked: bool) -> Duration {
        let exp = self
            .base_delay
            .saturating_mul(1u32 << (attempt.saturating_sub(1)).min(16));
        let delay = exp.min(self.max_delay);
        if blocked { delay.max(self.block_floor) } else { delay }
    }
}

/// How one attempt failed; decides both the retry delay and the error the
/// call ends in once attempts are exhausted.
enum Failure {
    Transient(String),
    Blocked(StatusCode),
    Schema(String),
}

impl Failure {
    fn is_block(&self) -> bool {
        matches!(self, Self::Blocked(_))
    }
}

struct CachedLocations {
    fetched_at: Instant,
    locations: Vec<Location>,
}

/// Client for the upstream tournament API.
///
/// All calls are rate limited, retried per [`RetryPolicy`] and decoded into
/// the shared domain types. The venue listing is cached for
/// [`LOCATION_CACHE_TTL`] and replaced wholesale on expiry.
#[derive(Debug)]
pub struct UpstreamClient {
    http: reqwest::Client,
    base_url: String,
    limiter: RateLimiter<NotKeyed, InMemoryState, DefaultClock>,
    retry: RetryPolicy,
    location_ttl: Duration,
    location_cache: Mutex<Option<CachedLocations>>,
    pub metrics: Arc<RequestMetrics>,
}

impl std::fmt::Debug for CachedLocations {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CachedLocations")
            .field("fetched_at", &self.fetched_at)
            .field("locations", &self.locations.len())
            .finish()
    }
}

impl UpstreamClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();

        let http = reqwest::Client::builder()
            .default_headers(Self::default_headers(&base_url))
            .timeout(REQUEST_TIMEOUT)
            .build()
            .expect("http client construction cannot fail with static configuration");

        // Stay well under the upstream block threshold, the collector only
        // ever issues sequential requests anyway.
        let quota = Quota::per_minute(nonzero!(60_u32)).allow_burst(nonzero!(5_u32));

        Self {
            http,
            base_url,
            limiter: RateLimiter::direct(quota),
            retry: RetryPolicy::default(),
            location_ttl: LOCATION_CACHE_TTL,
            location_cache: Mutex::new(None),
            metrics: RequestMetrics::new(),
        }
    }

    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn with_location_ttl(mut self, ttl: Duration) -> Self {
        self.location_ttl = ttl;
        self
    }

    /// Spawn a task logging periodic metrics about request volume.
    pub fn start_metrics_logging(&self) {
        let metrics = self.metrics.clone();
        tokio::spawn(async move { metrics.log_loop().await });
    }

    /// Browser-shaped headers the upstream expects; requests without them
    /// get blocked far earlier.
    fn default_headers(base_url: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(
            USER_AGENT,
            HeaderValue::from_static(
                "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36",
            ),
        );
        headers.insert(
            ACCEPT,
            HeaderValue::from_static("application/json, text/plain, */*"),
        );
        headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en-US,en;q=0.9"));
        if let Ok(referer) = HeaderValue::from_str(&format!("{base_url}/en/")) {
            headers.insert(REFERER, referer);
        }
        if let Ok(origin) = HeaderValue::from_str(base_url) {
            headers.insert(ORIGIN, origin);
        }
        headers
    }

    /// One logical GET: rate limited, retried with exponential backoff and
    /// decoded into `T`. Block signals (403/429) are logged distinctly and
    /// waited out with a wider floor before the next attempt.
    async fn request<T: DeserializeOwned>(&self, endpoint: &str) -> Result<T, UpstreamError> {
        let url = format!("{}{}", self.base_url, endpoint);
        let mut attempt = 0u32;

        loop {
            attempt += 1;
            self.limiter.until_ready().await;
            self.metrics.record_attempt();
            trace!(endpoint, attempt, "requesting");

            let failure = match self.http.get(&url).send().await {
                Ok(res) => {
                    let status = res.status();
                    if status.is_success() {
                        match res.json::<T>().await {
                            Ok(body) => return Ok(body),
                            Err(e) => Failure::Schema(e.to_string()),
                        }
                    } else if status == StatusCode::TOO_MANY_REQUESTS
                        || status == StatusCode::FORBIDDEN
                    {
                        Failure::Blocked(status)
                    } else if status.is_server_error() {
                        Failure::Transient(format!("HTTP {status}"))
                    } else {
                        // Other 4xx will not get better by retrying.
                        return Err(UpstreamError::Unavailable {
                            endpoint: endpoint.to_string(),
                            attempts: attempt,
                            reason: format!("HTTP {status}"),
                        });
                    }
                }
                Err(e) => Failure::Transient(e.to_string()),
            };

            if attempt >= self.retry.max_attempts {
                return Err(match failure {
                    Failure::Blocked(status) if status == StatusCode::TOO_MANY_REQUESTS => {
                        UpstreamError::RateLimited {
                            endpoint: endpoint.to_string(),
                            attempts: attempt,
                        }
                    }
                    Failure::Blocked(_) => UpstreamError::Forbidden {
                        endpoint: endpoint.to_string(),
                        attempts: attempt,
                    },
                    Failure::Schema(reason) => UpstreamError::Schema {
                        endpoint: endpoint.to_string(),
                        reason,
                    },
                    Failure::Transient(reason) => UpstreamError::Unavailable {
                        endpoint: endpoint.to_string(),
                        attempts: attempt,
                        reason,
                    },
                });
            }

            let delay = self.retry.delay_for(attempt, failure.is_block());
            match &failure {
                Failure::Blocked(status) => warn!(
                    endpoint,
                    attempt,
                    %status,
                    delay_ms = delay.as_millis() as u64,
                    "upstream signalled a block, widening backoff"
                ),
                Failure::Transient(reason) => debug!(
                    endpoint,
                    attempt,
                    %reason,
                    delay_ms = delay.as_millis() as u64,
                    "transient upstream failure, retrying"
                ),
                Failure::Schema(reason) => warn!(
                    endpoint,
                    attempt,
                    %reason,
                    delay_ms = delay.as_millis() as u64,
                    "malformed upstream response, retrying"
                ),
            }
            self.metrics.record_retry();
            tokio::time::sleep(delay).await;
        }
    }

    pub async fn get_locations(&self) -> Result<Vec<Location>, UpstreamError> {
        let mut cache = self.location_cache.lock().await;
        if let Some(cached) = cache.as_ref() {
            if cached.fetched_at.elapsed() < self.location_ttl {
                trace!("serving locations from cache");
                return Ok(cached.locations.clone());
            }
        }

        let dtos: Vec<LocationDto> = self.request("/api/locations").await?;
        let locations: Vec<Location> = dtos.into_iter().map(Into::into).collect();
        debug!(count = locations.len(), "refreshed location cache");

        *cache = Some(CachedLocations {
            fetched_at: Instant::now(),
            locations: locations.clone(),
        });
        Ok(locations)
    }

    pub async fn get_tournaments_page(&self, page: u32) -> Result<Page<Tournament>, UpstreamError> {
        let dto: TournamentPageDto = self
            .request(&format!("/api/tournaments?page={page}"))
            .await?;
        Ok(Page {
            total_pages: dto.total_pages,
            items: dto.tournaments.into_iter().map(Into::into).collect(),
        })
    }

    pub async fn get_teams_page(&self, page: u32) -> Result<Page<Team>, UpstreamError> {
        let dto: TeamPageDto = self.request(&format!("/api/teams?page={page}")).await?;
        Ok(Page {
            total_pages: dto.total_pages,
            items: dto.teams.into_iter().map(Into::into).collect(),
        })
    }

    pub async fn get_tournament_matches(
        &self,
        tournament: &Tournament,
    ) -> Result<Vec<Match>, UpstreamError> {
        let dtos: Vec<MatchDto> = self
            .request(&format!("/api/tournaments/{}/matches", tournament.id))
            .await?;
        let fetched_at = Utc::now();
        Ok(dtos
            .into_iter()
            .filter_map(|dto| dto.into_match(tournament, fetched_at))
            .collect())
    }
}

#[async_trait]
impl LocationApi for UpstreamClient {
    async fn get_locations(&self) -> Result<Vec<Location>, UpstreamError> {
        UpstreamClient::get_locations(self).await
    }
}

#[async_trait]
impl TournamentApi for UpstreamClient {
    async fn get_tournaments_page(&self, page: u32) -> Result<Page<Tournament>, UpstreamError> {
        UpstreamClient::get_tournaments_page(self, page).await
    }

    async fn get_tournament_matches(
        &self,
        tournament: &Tournament,
    ) -> Result<Vec<Match>, UpstreamError> {
        UpstreamClient::get_tournament_matches(self, tournament).await
    }
}

#[async_trait]
impl TeamApi for UpstreamClient {
    async fn get_teams_page(&self, page: u32) -> Result<Page<Team>, UpstreamError> {
        UpstreamClient::get_teams_page(self, page).await
    }
}

impl UpstreamApiFull for UpstreamClient {}
