//! Rate-limited HTTP client for the actor platform API.

use actor_structs::{
    Actor, ActorDetail, ActorVersion, Build, DatasetItem, Record, Run, RunRequestOptions,
};
use async_trait::async_trait;
use config::Config;
use governor::clock::DefaultClock;
use governor::state::{InMemoryState, NotKeyed};
use governor::{Quota, RateLimiter};
use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use tracing::{debug, info};

use super::models::{DataEnvelope, PageList, User};
use crate::{ActorPlatform, ActorScope, ClientError};

/// Page size used for actor listings; large enough to cover any account.
const LISTING_LIMIT: u32 = 1000;

/// Error bodies longer than this are cut in error messages.
const MAX_ERROR_BODY_CHARS: usize = 500;

type RateLimiterType = RateLimiter<NotKeyed, InMemoryState, DefaultClock>;

/// Rate-limited client authenticated with one API token.
pub struct PlatformClient {
    client: Client,
    base_url: String,
    token: String,
    limiter: RateLimiterType,
}

impl PlatformClient {
    /// Creates a new client for the given token.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be created.
    pub fn new(config: &Config, token: &str) -> Result<Self, ClientError> {
        let client = Client::builder()
            .timeout(config.http_timeout)
            .build()
            .map_err(ClientError::Build)?;

        let limiter = RateLimiter::direct(Quota::per_second(config.requests_per_second));

        Ok(Self {
            client,
            base_url: config.api_base_url.trim_end_matches('/').to_owned(),
            token: token.to_owned(),
            limiter,
        })
    }

    /// Waits for the rate limiter before making a request.
    async fn wait_for_rate_limit(&self) {
        self.limiter.until_ready().await;
    }

    fn url(&self, endpoint: &str) -> String {
        format!("{}/{endpoint}", self.base_url)
    }

    /// Sends an authenticated request and rejects non-success statuses.
    async fn send(&self, endpoint: &str, request: RequestBuilder) -> Result<Response, ClientError> {
        self.wait_for_rate_limit().await;

        debug!(endpoint, "Sending platform request");

        let response = request
            .bearer_auth(&self.token)
            .send()
            .await
            .map_err(|source| ClientError::Transport {
                endpoint: endpoint.to_owned(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ClientError::Status {
                endpoint: endpoint.to_owned(),
                status: status.as_u16(),
                body: body.chars().take(MAX_ERROR_BODY_CHARS).collect(),
            });
        }

        Ok(response)
    }

    async fn decode<T: DeserializeOwned>(
        endpoint: &str,
        response: Response,
    ) -> Result<T, ClientError> {
        response
            .json()
            .await
            .map_err(|source| ClientError::Decode {
                endpoint: endpoint.to_owned(),
                source,
            })
    }

    /// Fetches an endpoint whose payload is wrapped in `{"data": ...}`.
    async fn get_data<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        query: &[(&str, String)],
    ) -> Result<T, ClientError> {
        let request = self.client.get(self.url(endpoint)).query(query);
        let response = self.send(endpoint, request).await?;
        let envelope: DataEnvelope<T> = Self::decode(endpoint, response).await?;
        Ok(envelope.data)
    }
}

/// Converts `owner/name` references to the `owner~name` path form.
fn actor_path(actor_id: &str) -> String {
    actor_id.replace('/', "~")
}

/// Query parameters for a most-recent-first listing.
fn latest_first(limit: u32) -> [(&'static str, String); 2] {
    [("desc", "1".to_owned()), ("limit", limit.to_string())]
}

#[async_trait]
impl ActorPlatform for PlatformClient {
    async fn current_user(&self) -> Result<User, ClientError> {
        self.get_data("users/me", &[]).await
    }

    async fn list_actors(&self, scope: ActorScope) -> Result<Vec<Actor>, ClientError> {
        let mut query = vec![("limit", LISTING_LIMIT.to_string())];
        if scope == ActorScope::Owned {
            query.push(("my", "true".to_owned()));
        }

        let page: PageList<Actor> = self.get_data("acts", &query).await?;

        info!(
            scope = ?scope,
            count = page.items.len(),
            total = page.total,
            "Listed actors"
        );

        Ok(page.items)
    }

    async fn get_actor(&self, actor_id: &str) -> Result<ActorDetail, ClientError> {
        let endpoint = format!("acts/{}", actor_path(actor_id));
        self.get_data(&endpoint, &[]).await
    }

    async fn list_versions(
        &self,
        actor_id: &str,
        limit: u32,
    ) -> Result<Vec<ActorVersion>, ClientError> {
        let endpoint = format!("acts/{}/versions", actor_path(actor_id));
        let page: PageList<ActorVersion> = self.get_data(&endpoint, &latest_first(limit)).await?;
        Ok(page.items)
    }

    async fn get_build(&self, build_id: &str) -> Result<Build, ClientError> {
        let endpoint = format!("actor-builds/{build_id}");
        self.get_data(&endpoint, &[]).await
    }

    async fn list_builds(&self, actor_id: &str, limit: u32) -> Result<Vec<Build>, ClientError> {
        let endpoint = format!("acts/{}/builds", actor_path(actor_id));
        let page: PageList<Build> = self.get_data(&endpoint, &latest_first(limit)).await?;
        Ok(page.items)
    }

    async fn start_run(
        &self,
        actor_id: &str,
        input: &Record,
        options: &RunRequestOptions,
    ) -> Result<Run, ClientError> {
        let endpoint = format!("acts/{}/runs", actor_path(actor_id));

        let mut query = Vec::new();
        if let Some(build) = &options.build {
            query.push(("build", build.clone()));
        }
        if let Some(timeout) = options.timeout_secs {
            query.push(("timeout", timeout.to_string()));
        }
        if let Some(memory) = options.memory_mbytes {
            query.push(("memory", memory.to_string()));
        }

        info!(
            actor_id,
            fields = input.len(),
            "Starting run"
        );

        let request = self
            .client
            .post(self.url(&endpoint))
            .query(&query)
            .json(input);
        let response = self.send(&endpoint, request).await?;
        let envelope: DataEnvelope<Run> = Self::decode(&endpoint, response).await?;

        info!(
            actor_id,
            run_id = %envelope.data.id,
            status = %envelope.data.status,
            "Run started"
        );

        Ok(envelope.data)
    }

    async fn get_run(&self, run_id: &str) -> Result<Run, ClientError> {
        let endpoint = format!("actor-runs/{run_id}");
        self.get_data(&endpoint, &[]).await
    }

    async fn dataset_items(&self, run_id: &str) -> Result<Vec<DatasetItem>, ClientError> {
        let endpoint = format!("actor-runs/{run_id}/dataset/items");
        let query = [("clean", "true"), ("format", "json")];

        let request = self.client.get(self.url(&endpoint)).query(&query);
        let response = self.send(&endpoint, request).await?;
        let items: Vec<DatasetItem> = Self::decode(&endpoint, response).await?;

        info!(run_id, count = items.len(), "Fetched dataset items");

        Ok(items)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_actor_path() {
        assert_eq!(actor_path("apify/web-scraper"), "apify~web-scraper");
        assert_eq!(actor_path("moJRLRc85AitArpNN"), "moJRLRc85AitArpNN");
    }

    #[test]
    fn test_url_strips_trailing_slash() {
        let config = Config {
            api_base_url: "https://platform.example/v2/".to_owned(),
            ..Config::default()
        };
        let client = PlatformClient::new(&config, "token").unwrap();
        assert_eq!(client.url("acts"), "https://platform.example/v2/acts");
    }
}
