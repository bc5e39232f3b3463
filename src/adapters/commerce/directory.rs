//! Order directory trait
//!
//! The narrow surface the reconciliation pass needs from the commerce API:
//! filtered lookups of channels, states and orders, and versioned order
//! updates. Implemented by [`CommerceClient`](super::CommerceClient) and by
//! in-memory fakes in tests.

use crate::domain::{Result, UpdateAction};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;

/// Remote resource collections that can be queried
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    /// Channels (`/channels`)
    Channel,
    /// States (`/states`)
    State,
    /// Orders (`/orders`)
    Order,
}

impl ResourceKind {
    /// Path segment of the collection endpoint
    pub fn endpoint(&self) -> &'static str {
        match self {
            ResourceKind::Channel => "channels",
            ResourceKind::State => "states",
            ResourceKind::Order => "orders",
        }
    }

    /// Singular name used in diagnostics
    pub fn name(&self) -> &'static str {
        match self {
            ResourceKind::Channel => "channel",
            ResourceKind::State => "state",
            ResourceKind::Order => "order",
        }
    }
}

impl std::fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// One page of a filtered query, `{ "total": n, "results": [...] }`
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct QueryPage {
    /// Total number of matches reported by the remote system
    #[serde(default)]
    pub total: Option<u64>,

    /// Matches on this page
    #[serde(default)]
    pub results: Vec<Value>,
}

impl QueryPage {
    /// Creates a page whose total equals its result count
    pub fn from_results(results: Vec<Value>) -> Self {
        Self {
            total: Some(results.len() as u64),
            results,
        }
    }

    /// Total matches, falling back to the page size when the remote omits it
    pub fn match_count(&self) -> u64 {
        self.total.unwrap_or(self.results.len() as u64)
    }
}

/// Raw answer to an update request
///
/// Returned for every HTTP status; interpreting the status is left to the
/// caller.
#[derive(Debug, Clone, PartialEq)]
pub struct UpdateResponse {
    /// HTTP status code
    pub status: u16,

    /// Response body, parsed as JSON when possible
    pub body: Value,
}

impl UpdateResponse {
    /// True for 2xx statuses
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Human-readable message extracted from the body
    pub fn message(&self) -> String {
        match &self.body {
            Value::Object(map) => map
                .get("message")
                .and_then(Value::as_str)
                .map(str::to_string)
                .unwrap_or_else(|| self.body.to_string()),
            Value::String(text) if !text.is_empty() => text.clone(),
            Value::Null => format!("HTTP {}", self.status),
            other => other.to_string(),
        }
    }
}

/// Lookup and update operations against the remote system of record
#[async_trait]
pub trait OrderDirectory: Send + Sync {
    /// Runs a filtered query against a resource collection
    ///
    /// # Errors
    ///
    /// Returns `Transport` if the request fails or the remote answers with a
    /// non-success status.
    async fn find_by_query(&self, kind: ResourceKind, predicate: &str) -> Result<QueryPage>;

    /// Submits a versioned update for an order
    ///
    /// Non-success statuses are returned as a normal [`UpdateResponse`].
    ///
    /// # Errors
    ///
    /// Returns `Transport` only when no response was received.
    async fn update_order(&self, order_id: &str, update: &UpdateAction) -> Result<UpdateResponse>;
}
