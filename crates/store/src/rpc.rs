//! PostgREST RPC property index.
//!
//! Calls a Postgres function exposed over PostgREST (`POST
//! /rest/v1/rpc/{function}`) that performs the vector search server-side.
//! The function receives the query embedding plus threshold and limit and
//! returns the matching rows already scored and ordered.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;

use rentier_config::AppConfig;
use rentier_core::error::ProviderError;
use rentier_core::property::{PropertyIndex, PropertyMatch};

const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);
const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Property index backed by a remote RPC endpoint.
pub struct RpcPropertyIndex {
    base_url: String,
    api_key: String,
    function: String,
    request_timeout: Duration,
    client: reqwest::Client,
}

impl std::fmt::Debug for RpcPropertyIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RpcPropertyIndex")
            .field("base_url", &self.base_url)
            .field("api_key", &"[REDACTED]")
            .field("function", &self.function)
            .field("request_timeout", &self.request_timeout)
            .finish()
    }
}

impl RpcPropertyIndex {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            base_url,
            api_key: api_key.into(),
            function: "match_properties".to_string(),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            client: reqwest::Client::builder()
                .connect_timeout(CONNECT_TIMEOUT)
                .build()
                .expect("Failed to create HTTP client"),
        }
    }

    /// Build from config. Requires both the endpoint URL and service key.
    pub fn from_config(config: &AppConfig) -> Result<Self, ProviderError> {
        let url = config.retrieval.supabase_url.clone().ok_or_else(|| {
            ProviderError::NotConfigured(
                "retrieval store \"rpc\" requires retrieval.supabase_url".to_string(),
            )
        })?;
        let key = config.retrieval.supabase_key.clone().ok_or_else(|| {
            ProviderError::NotConfigured(
                "retrieval store \"rpc\" requires retrieval.supabase_key".to_string(),
            )
        })?;

        let mut index = Self::new(url, key);
        index.function = config.retrieval.rpc_function.clone();
        index.request_timeout = Duration::from_secs(config.request_timeout_secs);
        Ok(index)
    }

    pub fn with_function(mut self, function: impl Into<String>) -> Self {
        self.function = function.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    fn rpc_url(&self) -> String {
        format!("{}/rest/v1/rpc/{}", self.base_url, self.function)
    }

    async fn status_error(response: reqwest::Response) -> ProviderError {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();

        match status.as_u16() {
            429 => ProviderError::RateLimited { retry_after_secs: 5 },
            401 | 403 => ProviderError::AuthenticationFailed(body),
            404 => ProviderError::ApiError {
                status_code: 404,
                message: format!("RPC function not found: {body}"),
            },
            code => ProviderError::ApiError {
                status_code: code,
                message: body,
            },
        }
    }
}

#[async_trait]
impl PropertyIndex for RpcPropertyIndex {
    fn name(&self) -> &str {
        "rpc"
    }

    async fn search(
        &self,
        embedding: &[f32],
        threshold: f32,
        limit: usize,
    ) -> Result<Vec<PropertyMatch>, ProviderError> {
        let body = serde_json::json!({
            "query_embedding": embedding,
            "match_threshold": threshold,
            "match_count": limit,
        });

        tracing::debug!(
            function = %self.function,
            threshold,
            limit,
            "Dispatching property search RPC"
        );

        let response = self
            .client
            .post(self.rpc_url())
            .header("apikey", &self.api_key)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .timeout(self.request_timeout)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    ProviderError::Timeout(format!("RPC request timed out: {e}"))
                } else {
                    ProviderError::Network(e.to_string())
                }
            })?;

        if !response.status().is_success() {
            return Err(Self::status_error(response).await);
        }

        let rows: Vec<RpcRow> = response.json().await.map_err(|e| {
            ProviderError::MalformedResponse(format!("Failed to parse RPC rows: {e}"))
        })?;

        tracing::debug!(rows = rows.len(), "Property search RPC returned");

        Ok(rows.into_iter().map(RpcRow::into_match).collect())
    }
}

#[derive(Debug, Deserialize)]
struct RpcRow {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    address: Option<String>,
    #[serde(default)]
    property_type: Option<String>,
    #[serde(default)]
    purchase_price: Option<f64>,
    #[serde(default)]
    monthly_rent: Option<f64>,
    #[serde(default)]
    purchase_date: Option<String>,
    #[serde(default)]
    similarity: f32,
}

impl RpcRow {
    fn into_match(self) -> PropertyMatch {
        PropertyMatch {
            name: self.name.unwrap_or_default(),
            address: self.address.unwrap_or_default(),
            property_type: self.property_type.unwrap_or_default(),
            purchase_price: self.purchase_price,
            monthly_rent: self.monthly_rent,
            purchase_date: self.purchase_date.unwrap_or_default(),
            similarity: self.similarity,
        }
    }
}
