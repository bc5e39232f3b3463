//! Commerce API HTTP client
//!
//! Authenticates with the OAuth2 client-credentials grant and talks to the
//! project-scoped REST endpoints (`{api_url}/{project_key}/...`).

use super::directory::{OrderDirectory, QueryPage, ResourceKind, UpdateResponse};
use crate::config::{credential_present, CommerceConfig};
use crate::domain::{OrderSyncError, Result, UpdateAction};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::{Client, ClientBuilder, RequestBuilder, Response};
use secrecy::ExposeSecret;
use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;
use tokio::sync::Mutex;

/// Tokens expiring within this window are fetched again before use
const TOKEN_REFRESH_MARGIN_SECS: i64 = 60;

#[derive(Debug, Default)]
struct TokenState {
    access_token: Option<String>,
    expires_at: Option<DateTime<Utc>>,
}

impl TokenState {
    fn valid_token(&self) -> Option<&str> {
        let token = self.access_token.as_deref()?;
        match self.expires_at {
            Some(expiry) if (expiry - Utc::now()).num_seconds() < TOKEN_REFRESH_MARGIN_SECS => {
                None
            }
            _ => Some(token),
        }
    }
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    expires_in: Option<i64>,
}

/// Commerce API client
///
/// A pre-issued `access_token` from the configuration is used as-is; otherwise
/// a token is requested on first use and cached until shortly before it
/// expires.
pub struct CommerceClient {
    client: Client,
    config: CommerceConfig,
    token_state: Mutex<TokenState>,
}

impl CommerceClient {
    /// Creates a client from configuration
    ///
    /// No request is sent until the first API call.
    ///
    /// # Errors
    ///
    /// Returns a `Configuration` error if the HTTP client cannot be built.
    pub fn new(config: CommerceConfig) -> Result<Self> {
        let client = ClientBuilder::new()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .connect_timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| {
                OrderSyncError::Configuration(format!("Failed to build HTTP client: {e}"))
            })?;

        Ok(Self {
            client,
            config,
            token_state: Mutex::new(TokenState::default()),
        })
    }

    /// Project key the client is scoped to
    pub fn project_key(&self) -> &str {
        &self.config.project_key
    }

    /// Number of orders requested per page
    pub fn per_page(&self) -> usize {
        self.config.per_page
    }

    fn endpoint(&self, path: &str) -> String {
        format!(
            "{}/{}/{}",
            self.config.api_url.trim_end_matches('/'),
            self.config.project_key,
            path
        )
    }

    /// Returns a bearer token, requesting a new one when none is cached
    async fn bearer_token(&self) -> Result<String> {
        if let Some(token) = self
            .config
            .access_token
            .as_ref()
            .filter(|t| credential_present(Some(*t)))
        {
            return Ok(token.expose_secret().to_string());
        }

        let mut state = self.token_state.lock().await;
        if let Some(token) = state.valid_token() {
            return Ok(token.to_string());
        }

        let token = self.request_token().await?;
        state.expires_at = token
            .expires_in
            .map(|secs| Utc::now() + chrono::Duration::seconds(secs));
        state.access_token = Some(token.access_token.clone());

        tracing::info!(
            expires_at = ?state.expires_at,
            "Acquired commerce API access token"
        );

        Ok(token.access_token)
    }

    async fn request_token(&self) -> Result<TokenResponse> {
        let client_id = self.config.client_id.as_deref().ok_or_else(|| {
            OrderSyncError::Configuration("commerce.client_id is required".to_string())
        })?;
        let client_secret = self.config.client_secret.as_ref().ok_or_else(|| {
            OrderSyncError::Configuration("commerce.client_secret is required".to_string())
        })?;

        let token_url = format!("{}/oauth/token", self.config.auth_url.trim_end_matches('/'));
        let mut form = vec![("grant_type", "client_credentials".to_string())];
        if !self.config.scopes.is_empty() {
            form.push(("scope", self.config.scopes.join(" ")));
        }

        tracing::debug!(token_url = %token_url, client_id = %client_id, "Requesting access token");

        let response = self
            .client
            .post(&token_url)
            .basic_auth(client_id, Some(client_secret.expose_secret()))
            .form(&form)
            .send()
            .await
            .map_err(|e| OrderSyncError::Transport(format!("Failed to request token: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(OrderSyncError::Transport(format!(
                "Token request failed with status {status}: {error_text}"
            )));
        }

        response.json().await.map_err(|e| {
            OrderSyncError::Transport(format!("Failed to parse token response: {e}"))
        })
    }

    async fn send(&self, request: RequestBuilder) -> Result<Response> {
        let token = self.bearer_token().await?;
        request
            .bearer_auth(token)
            .send()
            .await
            .map_err(|e| OrderSyncError::Transport(format!("Request failed: {e}")))
    }

    /// Fetches one page of a collection
    ///
    /// # Arguments
    ///
    /// * `kind` - Collection to query
    /// * `predicate` - Optional `where` predicate
    /// * `sort` - Optional sort expression (e.g. `createdAt asc`)
    /// * `limit` - Page size
    /// * `offset` - Number of results to skip
    pub async fn query_page(
        &self,
        kind: ResourceKind,
        predicate: Option<&str>,
        sort: Option<&str>,
        limit: usize,
        offset: usize,
    ) -> Result<QueryPage> {
        let mut params: Vec<(&str, String)> = vec![
            ("limit", limit.to_string()),
            ("offset", offset.to_string()),
        ];
        if let Some(predicate) = predicate {
            params.push(("where", predicate.to_string()));
        }
        if let Some(sort) = sort {
            params.push(("sort", sort.to_string()));
        }

        let url = self.endpoint(kind.endpoint());
        tracing::debug!(url = %url, predicate = ?predicate, offset, "Querying {}", kind.endpoint());

        let response = self.send(self.client.get(&url).query(&params)).await?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(OrderSyncError::Transport(format!(
                "Query on {} failed with status {status}: {error_text}",
                kind.endpoint()
            )));
        }

        response.json::<QueryPage>().await.map_err(|e| {
            OrderSyncError::Transport(format!(
                "Failed to parse {} query response: {e}",
                kind.endpoint()
            ))
        })
    }
}

#[async_trait]
impl OrderDirectory for CommerceClient {
    async fn find_by_query(&self, kind: ResourceKind, predicate: &str) -> Result<QueryPage> {
        self.query_page(kind, Some(predicate), None, self.config.per_page, 0)
            .await
    }

    async fn update_order(&self, order_id: &str, update: &UpdateAction) -> Result<UpdateResponse> {
        let url = self.endpoint(&format!("orders/{order_id}"));
        tracing::debug!(
            order_id = %order_id,
            version = update.version,
            actions = update.len(),
            "Submitting order update"
        );

        let response = self.send(self.client.post(&url).json(update)).await?;
        let status = response.status().as_u16();
        let text = response.text().await.map_err(|e| {
            OrderSyncError::Transport(format!("Failed to read update response: {e}"))
        })?;

        let body = if text.is_empty() {
            Value::Null
        } else {
            serde_json::from_str(&text).unwrap_or(Value::String(text))
        };

        Ok(UpdateResponse { status, body })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::secret_string;

    fn config(api_url: &str) -> CommerceConfig {
        CommerceConfig {
            project_key: "shop".to_string(),
            api_url: api_url.to_string(),
            access_token: Some(secret_string("static-token".to_string())),
            ..Default::default()
        }
    }

    #[test]
    fn test_endpoint_joins_project_key() {
        let client = CommerceClient::new(config("https://api.example.com/")).unwrap();
        assert_eq!(
            client.endpoint("orders/abc"),
            "https://api.example.com/shop/orders/abc"
        );
        assert_eq!(client.project_key(), "shop");
    }

    #[test]
    fn test_token_state_expiry() {
        let mut state = TokenState::default();
        assert!(state.valid_token().is_none());

        state.access_token = Some("t".to_string());
        assert_eq!(state.valid_token(), Some("t"));

        state.expires_at = Some(Utc::now() + chrono::Duration::seconds(10));
        assert!(state.valid_token().is_none());

        state.expires_at = Some(Utc::now() + chrono::Duration::hours(1));
        assert_eq!(state.valid_token(), Some("t"));
    }

    #[tokio::test]
    async fn test_static_token_is_used() {
        let client = CommerceClient::new(config("https://api.example.com")).unwrap();
        assert_eq!(client.bearer_token().await.unwrap(), "static-token");
    }
}
