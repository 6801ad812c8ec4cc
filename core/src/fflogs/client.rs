//! HTTP layer: token requests, GraphQL queries, status mapping and retry.

use std::time::Duration;

use progchart_types::ApiSettings;
use rand::Rng;
use reqwest::header::{AUTHORIZATION, RETRY_AFTER};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};

use super::FetchError;

const USER_AGENT: &str = concat!("progchart/", env!("CARGO_PKG_VERSION"));
const MAX_BACKOFF: Duration = Duration::from_secs(30);

/// Backoff schedule for transient failures.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    pub max_retries: u32,
    /// Delay before the first retry; doubles for every following retry
    pub base_delay: Duration,
}

impl RetryPolicy {
    /// Jittered exponential delay for the given retry number (1-based).
    pub fn backoff(&self, retry: u32, error: &FetchError) -> Duration {
        let ceiling = match error {
            FetchError::RateLimited {
                retry_after: Some(retry_after),
                ..
            } if !retry_after.is_zero() => return (*retry_after).min(MAX_BACKOFF),
            _ => self
                .base_delay
                .saturating_mul(1 << retry.saturating_sub(1).min(16))
                .min(MAX_BACKOFF),
        };
        let ceiling_ms = ceiling.as_millis() as u64;
        let jittered_ms = rand::thread_rng().gen_range(ceiling_ms / 2..=ceiling_ms);
        Duration::from_millis(jittered_ms)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            base_delay: Duration::from_secs(1),
        }
    }
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

#[derive(Debug, Deserialize)]
struct GraphQlResponse<T> {
    data: Option<T>,
    #[serde(default)]
    errors: Vec<GraphQlMessage>,
}

#[derive(Debug, Deserialize)]
struct GraphQlMessage {
    message: String,
}

/// Client for the log site's GraphQL API.
#[derive(Debug, Clone)]
pub struct FflogsClient {
    http: reqwest::Client,
    settings: ApiSettings,
    retry: RetryPolicy,
}

impl FflogsClient {
    pub fn new(settings: ApiSettings) -> Result<Self, FetchError> {
        let http = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(settings.timeout_secs.max(1)))
            .build()
            .map_err(FetchError::Client)?;

        let retry = RetryPolicy {
            max_retries: settings.max_retries,
            ..Default::default()
        };

        Ok(Self {
            http,
            settings,
            retry,
        })
    }

    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn token(&self) -> Option<&str> {
        self.settings.token.as_deref().filter(|t| !t.is_empty())
    }

    /// Make sure a bearer token is available, requesting one with the client
    /// credentials when needed. Returns the token if it was newly issued.
    pub async fn ensure_token(&mut self) -> Result<Option<String>, FetchError> {
        if self.token().is_some() {
            tracing::debug!("Using stored API token");
            return Ok(None);
        }

        let token = self.request_token().await?;
        self.settings.token = Some(token.clone());
        tracing::info!("New API token issued");
        Ok(Some(token))
    }

    async fn request_token(&self) -> Result<String, FetchError> {
        if !self.settings.has_credentials() {
            return Err(FetchError::Token {
                reason: "client_id and client_secret are not configured".to_string(),
            });
        }

        let url = self.settings.token_url.as_str();
        let body = self
            .send_with_retry(url, || {
                self.http
                    .post(url)
                    .basic_auth(&self.settings.client_id, Some(&self.settings.client_secret))
                    .form(&[("grant_type", "client_credentials")])
            })
            .await?;

        let response: TokenResponse =
            serde_json::from_str(&body).map_err(|source| FetchError::Decode {
                url: url.to_string(),
                source,
            })?;

        if response.access_token.is_empty() {
            return Err(FetchError::Token {
                reason: "token endpoint returned an empty access_token".to_string(),
            });
        }
        Ok(response.access_token)
    }

    /// Run a GraphQL query and decode its `data` member.
    pub async fn query<T: DeserializeOwned>(
        &self,
        query: &str,
        variables: Value,
    ) -> Result<T, FetchError> {
        let url = self.settings.api_url.as_str();
        let token = self.token().ok_or_else(|| FetchError::Token {
            reason: "no API token available".to_string(),
        })?;
        let payload = json!({ "query": query, "variables": variables });

        let body = self
            .send_with_retry(url, || {
                self.http
                    .post(url)
                    .header(AUTHORIZATION, format!("Bearer {token}"))
                    .json(&payload)
            })
            .await?;

        let response: GraphQlResponse<T> =
            serde_json::from_str(&body).map_err(|source| FetchError::Decode {
                url: url.to_string(),
                source,
            })?;

        if !response.errors.is_empty() {
            return Err(FetchError::GraphQl {
                messages: response.errors.into_iter().map(|e| e.message).collect(),
            });
        }

        response.data.ok_or_else(|| FetchError::GraphQl {
            messages: vec!["response contained no data".to_string()],
        })
    }

    async fn send_with_retry<F>(&self, url: &str, build: F) -> Result<String, FetchError>
    where
        F: Fn() -> reqwest::RequestBuilder,
    {
        let mut retries = 0;

        loop {
            match self.send_once(url, build()).await {
                Ok(body) => return Ok(body),
                Err(e) if e.is_retryable() && retries < self.retry.max_retries => {
                    retries += 1;
                    let backoff = self.retry.backoff(retries, &e);

                    tracing::warn!(
                        error = %e,
                        retry = retries,
                        max_retries = self.retry.max_retries,
                        backoff_ms = backoff.as_millis() as u64,
                        "Retrying request"
                    );

                    tokio::time::sleep(backoff).await;
                }
                Err(e) if e.is_retryable() => {
                    return Err(FetchError::RetriesExhausted {
                        attempts: retries + 1,
                        source: Box::new(e),
                    });
                }
                Err(e) => return Err(e),
            }
        }
    }

    async fn send_once(
        &self,
        url: &str,
        request: reqwest::RequestBuilder,
    ) -> Result<String, FetchError> {
        let network = |source| FetchError::Network {
            url: url.to_string(),
            source,
        };

        let response = request.send().await.map_err(network)?;
        let status = response.status();

        if status.as_u16() == 429 {
            let retry_after = response
                .headers()
                .get(RETRY_AFTER)
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.trim().parse::<u64>().ok())
                .map(Duration::from_secs);
            return Err(FetchError::RateLimited {
                url: url.to_string(),
                retry_after,
            });
        }

        let body = response.text().await.map_err(network)?;

        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
                body: truncate(&body, 200),
            });
        }

        Ok(body)
    }
}

fn truncate(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((end, _)) => format!("{}...", &text[..end]),
        None => text.to_string(),
    }
}
