use crate::config::BackendSettings;
use crate::models::Listing;
use reqwest::Client;
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;

/// Errors that can occur when fetching listings from the backend
#[derive(Debug, Error)]
pub enum ListingsError {
    #[error("HTTP request failed: {0}")]
    RequestError(#[from] reqwest::Error),

    #[error("API returned error: {0}")]
    ApiError(String),

    #[error("Invalid response format: {0}")]
    InvalidResponse(String),
}

/// Marketplace backend client
///
/// Read-only: fetches the listing snapshot the filter engine runs over.
pub struct ListingsClient {
    base_url: String,
    api_token: Option<String>,
    client: Client,
}

impl ListingsClient {
    /// Create a new backend client
    pub fn new(
        base_url: String,
        api_token: Option<String>,
        timeout: Duration,
    ) -> Result<Self, ListingsError> {
        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            base_url,
            api_token,
            client,
        })
    }

    pub fn from_settings(settings: &BackendSettings) -> Result<Self, ListingsError> {
        Self::new(
            settings.base_url.clone(),
            settings.api_token.clone(),
            Duration::from_secs(settings.timeout_secs),
        )
    }

    /// URL of the listing collection
    pub fn listings_url(&self) -> String {
        format!("{}/hotels", self.base_url.trim_end_matches('/'))
    }

    /// Fetch every listing from `GET /hotels`
    ///
    /// Elements that fail to decode are skipped so one bad record cannot
    /// empty the whole snapshot.
    pub async fn fetch_listings(&self) -> Result<Vec<Listing>, ListingsError> {
        let url = self.listings_url();

        tracing::debug!("Fetching listings from: {}", url);

        let mut request = self.client.get(&url);
        if let Some(token) = &self.api_token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_else(|_| "Unable to read body".to_string());
            tracing::error!("Failed to fetch listings: {} - {}", status, body);
            return Err(ListingsError::ApiError(format!(
                "Failed to fetch listings: {}",
                status
            )));
        }

        let json: Value = response.json().await?;
        let listings = parse_listings(json)?;

        tracing::debug!("Fetched {} listings", listings.len());

        Ok(listings)
    }
}

/// Decode a `/hotels` body: either a bare array or an envelope holding one
pub fn parse_listings(json: Value) -> Result<Vec<Listing>, ListingsError> {
    let documents = match json {
        Value::Array(items) => items,
        Value::Object(mut obj) => ["data", "hotels", "documents"]
            .iter()
            .find_map(|key| match obj.remove(*key) {
                Some(Value::Array(items)) => Some(items),
                _ => None,
            })
            .ok_or_else(|| ListingsError::InvalidResponse("Missing listings array".into()))?,
        _ => {
            return Err(ListingsError::InvalidResponse(
                "Expected an array or an object".into(),
            ))
        }
    };

    let total = documents.len();
    let listings: Vec<Listing> = documents
        .into_iter()
        .enumerate()
        .filter_map(|(index, doc)| match serde_json::from_value::<Listing>(doc) {
            Ok(listing) => Some(listing),
            Err(e) => {
                tracing::warn!("Skipping malformed listing at index {}: {}", index, e);
                None
            }
        })
        .collect();

    if listings.len() < total {
        tracing::warn!("Decoded {} of {} listings", listings.len(), total);
    }

    Ok(listings)
}
