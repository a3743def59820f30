//! HTTP client for the amenity search provider.
//!
//! Every request is `GET {base}/places/search` and every response is the
//! `{ success, data, error }` envelope. Transient failures are retried with
//! back-off before the error reaches the coordinator.

use std::time::Duration;

use reqwest::{Client, Url};

use rentscout_core::AppConfig;

use crate::error::LookupError;
use crate::lookup::{AmenityEnvelope, AmenityLookup, AmenityPage, AmenityRequest};
use crate::retry::retry_with_backoff;

const SEARCH_PATH: &str = "places/search";
const DEFAULT_MAX_RETRIES: u32 = 3;
const DEFAULT_BACKOFF_BASE_MS: u64 = 500;

/// Amenity provider client. Construct with [`AmenityApiClient::new`], or
/// [`AmenityApiClient::from_config`] to take everything from the environment.
pub struct AmenityApiClient {
    client: Client,
    search_url: Url,
    api_key: Option<String>,
    max_retries: u32,
    backoff_base_ms: u64,
}

impl AmenityApiClient {
    /// # Errors
    ///
    /// Returns [`LookupError::Http`] if the `reqwest::Client` cannot be
    /// built, or [`LookupError::InvalidBaseUrl`] if `base_url` does not parse.
    pub fn new(
        base_url: &str,
        api_key: Option<&str>,
        timeout_secs: u64,
        user_agent: &str,
    ) -> Result<Self, LookupError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(user_agent)
            .build()?;

        Ok(Self {
            client,
            search_url: endpoint_url(base_url, SEARCH_PATH)?,
            api_key: api_key.map(str::to_owned),
            max_retries: DEFAULT_MAX_RETRIES,
            backoff_base_ms: DEFAULT_BACKOFF_BASE_MS,
        })
    }

    /// # Errors
    ///
    /// Same as [`AmenityApiClient::new`].
    pub fn from_config(config: &AppConfig) -> Result<Self, LookupError> {
        Ok(Self::new(
            &config.amenity_api_url,
            config.amenity_api_key.as_deref(),
            config.request_timeout_secs,
            &config.user_agent,
        )?
        .with_retry_policy(config.max_retries, config.retry_backoff_base_ms))
    }

    #[must_use]
    pub fn with_retry_policy(mut self, max_retries: u32, backoff_base_ms: u64) -> Self {
        self.max_retries = max_retries;
        self.backoff_base_ms = backoff_base_ms;
        self
    }

    fn build_url(&self, request: &AmenityRequest) -> Url {
        let mut url = self.search_url.clone();
        {
            let mut pairs = url.query_pairs_mut();
            pairs.append_pair("query", &request.query_text);
            pairs.append_pair("lat", &request.center.lat.to_string());
            pairs.append_pair("lng", &request.center.lng.to_string());
            pairs.append_pair("radius", &format!("{:.0}", request.radius_meters));
            if let Some(page) = &request.page {
                pairs.append_pair("page", page);
            }
            if let Some(key) = &self.api_key {
                pairs.append_pair("key", key);
            }
        }
        url
    }

    async fn fetch_page(&self, url: &Url, category_id: &str) -> Result<AmenityPage, LookupError> {
        let response = self.client.get(url.clone()).send().await?;
        let response = response.error_for_status()?;
        let body = response.text().await?;
        let envelope: AmenityEnvelope =
            serde_json::from_str(&body).map_err(|e| LookupError::Deserialize {
                context: format!("places/search(category={category_id})"),
                source: e,
            })?;
        envelope.into_page(category_id)
    }
}

impl AmenityLookup for AmenityApiClient {
    async fn search(&self, request: AmenityRequest) -> Result<AmenityPage, LookupError> {
        let url = self.build_url(&request);
        let page = retry_with_backoff(self.max_retries, self.backoff_base_ms, || {
            self.fetch_page(&url, &request.category_id)
        })
        .await?;
        tracing::debug!(
            category = %request.category_id,
            count = page.locations.len(),
            has_more = page.next_page_token.is_some(),
            "amenity page fetched"
        );
        Ok(page)
    }
}

/// Joins `path` onto `base_url`, keeping any path prefix the base carries.
pub(crate) fn endpoint_url(base_url: &str, path: &str) -> Result<Url, LookupError> {
    let normalised = format!("{}/", base_url.trim_end_matches('/'));
    Url::parse(&normalised)
        .and_then(|base| base.join(path))
        .map_err(|e| LookupError::InvalidBaseUrl {
            url: base_url.to_string(),
            reason: e.to_string(),
        })
}
