//! HTTP client for the rental listing provider: `GET {base}/listings`.

use std::time::Duration;

use reqwest::{Client, Url};

use rentscout_core::{AppConfig, Listing};

use crate::amenity_client::endpoint_url;
use crate::error::LookupError;
use crate::lookup::{ListingEnvelope, ListingLookup, ListingRequest};
use crate::retry::retry_with_backoff;

pub struct ListingApiClient {
    client: Client,
    listings_url: Url,
    api_key: Option<String>,
    max_retries: u32,
    backoff_base_ms: u64,
}

impl ListingApiClient {
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
            listings_url: endpoint_url(base_url, "listings")?,
            api_key: api_key.map(str::to_owned),
            max_retries: 3,
            backoff_base_ms: 500,
        })
    }

    /// # Errors
    ///
    /// Same as [`ListingApiClient::new`].
    pub fn from_config(config: &AppConfig) -> Result<Self, LookupError> {
        Ok(Self::new(
            &config.listing_api_url,
            config.listing_api_key.as_deref(),
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

    fn build_url(&self, request: &ListingRequest) -> Url {
        let mut url = self.listings_url.clone();
        {
            let mut pairs = url.query_pairs_mut();
            pairs.append_pair("lat", &request.center.lat.to_string());
            pairs.append_pair("lng", &request.center.lng.to_string());
            pairs.append_pair("radius", &format!("{:.0}", request.radius_meters));
            if let Some(min) = request.price.min {
                pairs.append_pair("price_min", &min.to_string());
            }
            if let Some(max) = request.price.max {
                pairs.append_pair("price_max", &max.to_string());
            }
            if let Some(key) = &self.api_key {
                pairs.append_pair("key", key);
            }
        }
        url
    }

    async fn fetch(&self, url: &Url) -> Result<Vec<Listing>, LookupError> {
        let response = self.client.get(url.clone()).send().await?;
        let response = response.error_for_status()?;
        let body = response.text().await?;
        let envelope: ListingEnvelope =
            serde_json::from_str(&body).map_err(|e| LookupError::Deserialize {
                context: "listings".to_string(),
                source: e,
            })?;
        Ok(envelope.listings.into_iter().map(Listing::from).collect())
    }
}

impl ListingLookup for ListingApiClient {
    async fn find_listings(&self, request: ListingRequest) -> Result<Vec<Listing>, LookupError> {
        let url = self.build_url(&request);
        retry_with_backoff(self.max_retries, self.backoff_base_ms, || self.fetch(&url)).await
    }
}
