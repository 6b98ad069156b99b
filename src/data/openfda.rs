//! OpenFDA drug-event count client.
//!
//! The signal core only ever sees the [`CountQueryClient`] trait; this module
//! provides the HTTP implementation together with the rolling-window rate
//! limiter OpenFDA requires (40 requests/minute anonymously, 240 with a key).

use std::{collections::VecDeque, time::Duration};

use async_trait::async_trait;
use reqwest::{header::RETRY_AFTER, Client, StatusCode};
use serde::{Deserialize, Serialize};
use tokio::{
    sync::Mutex,
    time::{sleep, sleep_until, Instant},
};
use tracing::{debug, warn};

use crate::{config::Settings, error::FetchError};

const EVENT_ENDPOINT: &str = "drug/event.json";
const ERROR_BODY_MAX_CHARS: usize = 512;

/// A (term, count) pair returned by a count aggregation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportCount {
    /// Aggregated label. Date aggregations report it under `time`.
    #[serde(alias = "time")]
    pub term: String,
    pub count: u64,
}

impl ReportCount {
    pub fn new(term: impl Into<String>, count: u64) -> Self {
        Self {
            term: term.into(),
            count,
        }
    }
}

/// Source of aggregated report counts.
#[async_trait]
pub trait CountQueryClient: Send + Sync {
    /// Run one count aggregation: `search_filter` scopes the reports (empty
    /// means all reports), `group_by_field` is the field counted. Terms come
    /// back ranked by descending count as the backend returns them.
    async fn query_counts(
        &self,
        search_filter: &str,
        group_by_field: &str,
    ) -> Result<Vec<ReportCount>, FetchError>;

    /// Total number of reports in the database at query time.
    async fn total_report_count(&self) -> Result<u64, FetchError>;
}

/// Allows at most `calls` acquisitions per rolling `period`.
///
/// Over-budget callers wait for the oldest call to leave the window instead
/// of failing.
#[derive(Debug)]
pub struct RateLimiter {
    calls: usize,
    period: Duration,
    history: Mutex<VecDeque<Instant>>,
}

impl RateLimiter {
    pub fn new(calls: usize, period: Duration) -> Self {
        Self {
            calls: calls.max(1),
            period,
            history: Mutex::new(VecDeque::with_capacity(calls.max(1))),
        }
    }

    pub async fn acquire(&self) {
        loop {
            let now = Instant::now();
            let mut history = self.history.lock().await;
            while history
                .front()
                .is_some_and(|oldest| now.duration_since(*oldest) >= self.period)
            {
                history.pop_front();
            }

            if history.len() < self.calls {
                history.push_back(now);
                return;
            }

            let Some(oldest) = history.front().copied() else {
                continue;
            };
            drop(history);
            debug!(window = ?self.period, "rate limit window full, pausing");
            sleep_until(oldest + self.period).await;
        }
    }
}

/// HTTP client for the OpenFDA drug-event endpoint.
pub struct OpenFdaClient {
    client: Client,
    base: String,
    api_key: Option<String>,
    default_limit: usize,
    max_retries: u32,
    limiter: RateLimiter,
}

impl OpenFdaClient {
    pub fn new(settings: &Settings) -> Result<Self, FetchError> {
        let client = Client::builder()
            .user_agent(concat!("fda-signal/", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_secs(30))
            .connect_timeout(Duration::from_secs(10))
            .gzip(true)
            .build()?;
        Ok(Self {
            client,
            base: settings.openfda_base.clone(),
            api_key: settings.openfda_api_key.clone(),
            default_limit: settings.default_limit,
            max_retries: settings.max_retries,
            limiter: RateLimiter::new(settings.rate_limit_calls, settings.rate_limit_period),
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    /// Count aggregation with an explicit result cap.
    pub async fn query_counts_limited(
        &self,
        search_filter: &str,
        group_by_field: &str,
        limit: usize,
    ) -> Result<Vec<ReportCount>, FetchError> {
        let mut params = vec![
            ("count", group_by_field.trim().to_string()),
            ("limit", limit.to_string()),
        ];
        let search_filter = search_filter.trim();
        if !search_filter.is_empty() {
            params.push(("search", search_filter.to_string()));
        }

        let url = self.endpoint(EVENT_ENDPOINT);
        let Some(bytes) = self.get_bytes(&url, &params).await? else {
            debug!(search = %search_filter, field = %group_by_field, "no matching reports");
            return Ok(Vec::new());
        };
        let response: CountResponse = serde_json::from_slice(&bytes)?;
        Ok(response.results)
    }

    /// Fetch an arbitrary text document through the same rate-limited client.
    pub async fn fetch_text(&self, url: &str) -> Result<String, FetchError> {
        match self.get_bytes(url, &[]).await? {
            Some(bytes) => Ok(String::from_utf8_lossy(&bytes).into_owned()),
            None => Err(FetchError::Status {
                status: StatusCode::NOT_FOUND.as_u16(),
                body: url.to_string(),
            }),
        }
    }

    /// GET with rate limiting and 429 retries. `Ok(None)` means HTTP 404,
    /// which OpenFDA uses for "No matches found".
    async fn get_bytes(
        &self,
        url: &str,
        params: &[(&str, String)],
    ) -> Result<Option<Vec<u8>>, FetchError> {
        let mut attempt = 0u32;
        loop {
            self.limiter.acquire().await;

            let mut req = self.client.get(url).query(params);
            if let Some(key) = self.api_key.as_deref() {
                req = req.query(&[("api_key", key)]);
            }
            let resp = req.send().await?;
            let status = resp.status();

            if status == StatusCode::TOO_MANY_REQUESTS {
                if attempt >= self.max_retries {
                    return Err(FetchError::RateLimited {
                        attempts: attempt + 1,
                    });
                }
                let retry_after = parse_retry_after(resp.headers());
                let pause = retry_sleep_duration(attempt, retry_after);
                warn!(attempt, ?pause, "OpenFDA rate limited, retrying");
                sleep(pause).await;
                attempt += 1;
                continue;
            }

            let bytes = resp.bytes().await?;
            if status == StatusCode::NOT_FOUND {
                return Ok(None);
            }
            if !status.is_success() {
                return Err(FetchError::Status {
                    status: status.as_u16(),
                    body: body_excerpt(&bytes),
                });
            }
            return Ok(Some(bytes.to_vec()));
        }
    }
}

#[async_trait]
impl CountQueryClient for OpenFdaClient {
    async fn query_counts(
        &self,
        search_filter: &str,
        group_by_field: &str,
    ) -> Result<Vec<ReportCount>, FetchError> {
        self.query_counts_limited(search_filter, group_by_field, self.default_limit)
            .await
    }

    async fn total_report_count(&self) -> Result<u64, FetchError> {
        let url = self.endpoint(EVENT_ENDPOINT);
        let params = [("limit", "1".to_string())];
        let bytes = self
            .get_bytes(&url, &params)
            .await?
            .ok_or(FetchError::MissingTotal)?;
        let response: SearchResponse = serde_json::from_slice(&bytes)?;
        response
            .meta
            .and_then(|meta| meta.results)
            .map(|results| results.total)
            .ok_or(FetchError::MissingTotal)
    }
}

#[derive(Debug, Deserialize)]
struct CountResponse {
    #[serde(default)]
    results: Vec<ReportCount>,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    meta: Option<SearchMeta>,
}

#[derive(Debug, Deserialize)]
struct SearchMeta {
    #[serde(default)]
    results: Option<SearchMetaResults>,
}

#[derive(Debug, Deserialize)]
struct SearchMetaResults {
    total: u64,
}

fn parse_retry_after(headers: &reqwest::header::HeaderMap) -> Option<Duration> {
    // integer seconds only
    headers
        .get(RETRY_AFTER)?
        .to_str()
        .ok()?
        .trim()
        .parse::<u64>()
        .ok()
        .map(Duration::from_secs)
}

fn retry_sleep_duration(attempt: u32, retry_after_floor: Option<Duration>) -> Duration {
    let backoff_ms = 100_u64.saturating_mul(2_u64.saturating_pow(attempt));
    let backoff = Duration::from_millis(backoff_ms);
    match retry_after_floor {
        Some(floor) if floor > backoff => floor,
        _ => backoff,
    }
}

fn body_excerpt(bytes: &[u8]) -> String {
    let text = String::from_utf8_lossy(bytes);
    let trimmed = text.trim();
    if trimmed.chars().count() <= ERROR_BODY_MAX_CHARS {
        return trimmed.to_string();
    }
    let cut: String = trimmed.chars().take(ERROR_BODY_MAX_CHARS).collect();
    format!("{cut}...")
}
