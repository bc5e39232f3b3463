//! Remote order locator
//!
//! Resolves keys and order numbers to remote entities with exact-match
//! queries. A query is expected to match at most one entity; what happens
//! when it matches several is decided by the [`MatchPolicy`].

use crate::adapters::commerce::{OrderDirectory, ResourceKind};
use crate::config::MatchPolicy;
use crate::domain::{
    OrderNumber, OrderSyncError, ReferenceEntity, RemoteOrder, ResourceKey, Result,
};
use serde::de::DeserializeOwned;
use std::sync::Arc;

/// Quotes a value for use in an equality predicate
pub fn quote(value: &str) -> String {
    format!("\"{}\"", value.replace('\\', "\\\\").replace('"', "\\\""))
}

/// Looks up channels, states and orders
#[derive(Clone)]
pub struct RemoteOrderLocator {
    directory: Arc<dyn OrderDirectory>,
    policy: MatchPolicy,
}

impl RemoteOrderLocator {
    /// Creates a locator over `directory`
    pub fn new(directory: Arc<dyn OrderDirectory>, policy: MatchPolicy) -> Self {
        Self { directory, policy }
    }

    async fn find_one<T: DeserializeOwned>(
        &self,
        kind: ResourceKind,
        field: &str,
        value: &str,
    ) -> Result<T> {
        let predicate = format!("{field}={}", quote(value));
        let page = self.directory.find_by_query(kind, &predicate).await?;
        let count = page.match_count();

        let first = match page.results.into_iter().next() {
            Some(first) => first,
            None => return Err(OrderSyncError::not_found(kind.name(), value)),
        };

        if count > 1 {
            match self.policy {
                MatchPolicy::Unique => {
                    return Err(OrderSyncError::AmbiguousMatch {
                        resource: kind.name().to_string(),
                        key: value.to_string(),
                        count,
                    })
                }
                MatchPolicy::First => {
                    tracing::warn!(
                        resource = %kind,
                        key = %value,
                        count,
                        "Lookup matched several results, using the first"
                    );
                }
            }
        }

        serde_json::from_value(first).map_err(|e| {
            OrderSyncError::Transport(format!("Unexpected {kind} payload for '{value}': {e}"))
        })
    }

    /// Resolves a channel key to its id
    ///
    /// # Errors
    ///
    /// `NotFound` if no channel has the key, `Transport` on API failure.
    pub async fn find_channel_id(&self, key: &ResourceKey) -> Result<String> {
        let channel: ReferenceEntity = self
            .find_one(ResourceKind::Channel, "key", key.as_str())
            .await?;
        Ok(channel.id)
    }

    /// Resolves a state key to its id
    ///
    /// # Errors
    ///
    /// `NotFound` if no state has the key, `Transport` on API failure.
    pub async fn find_state_id(&self, key: &ResourceKey) -> Result<String> {
        let state: ReferenceEntity = self
            .find_one(ResourceKind::State, "key", key.as_str())
            .await?;
        Ok(state.id)
    }

    /// Fetches the current state of an order by its order number
    ///
    /// # Errors
    ///
    /// `NotFound` if no order has the number, `Transport` on API failure.
    pub async fn find_order_by_number(&self, order_number: &OrderNumber) -> Result<RemoteOrder> {
        self.find_one(ResourceKind::Order, "orderNumber", order_number.as_str())
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::commerce::{QueryPage, UpdateResponse};
    use crate::domain::UpdateAction;
    use async_trait::async_trait;
    use serde_json::{json, Value};
    use std::str::FromStr;
    use std::sync::Mutex;

    /// Directory answering every query with a fixed page and recording predicates
    struct FixedDirectory {
        page: QueryPage,
        queries: Mutex<Vec<(ResourceKind, String)>>,
    }

    impl FixedDirectory {
        fn new(results: Vec<Value>) -> Arc<Self> {
            Arc::new(Self {
                page: QueryPage::from_results(results),
                queries: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait]
    impl OrderDirectory for FixedDirectory {
        async fn find_by_query(&self, kind: ResourceKind, predicate: &str) -> Result<QueryPage> {
            self.queries
                .lock()
                .unwrap()
                .push((kind, predicate.to_string()));
            Ok(self.page.clone())
        }

        async fn update_order(&self, _: &str, _: &UpdateAction) -> Result<UpdateResponse> {
            unreachable!("locator never updates")
        }
    }

    #[test]
    fn test_quote_escapes() {
        assert_eq!(quote("1001"), "\"1001\"");
        assert_eq!(quote("a\"b"), "\"a\\\"b\"");
    }

    #[tokio::test]
    async fn test_find_channel_id() {
        let directory = FixedDirectory::new(vec![json!({"id": "chan-1", "key": "OrderXmlFileExport"})]);
        let locator = RemoteOrderLocator::new(directory.clone(), MatchPolicy::First);

        let id = locator
            .find_channel_id(&ResourceKey::from_str("OrderXmlFileExport").unwrap())
            .await
            .unwrap();

        assert_eq!(id, "chan-1");
        let queries = directory.queries.lock().unwrap();
        assert_eq!(
            queries[0],
            (ResourceKind::Channel, "key=\"OrderXmlFileExport\"".to_string())
        );
    }

    #[tokio::test]
    async fn test_zero_results_is_not_found_with_key() {
        let locator = RemoteOrderLocator::new(FixedDirectory::new(vec![]), MatchPolicy::First);

        let err = locator
            .find_state_id(&ResourceKey::from_str("exported").unwrap())
            .await
            .unwrap_err();

        match err {
            OrderSyncError::NotFound { resource, key } => {
                assert_eq!(resource, "state");
                assert_eq!(key, "exported");
            }
            other => panic!("expected NotFound, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_multiple_results_first_policy() {
        let directory = FixedDirectory::new(vec![
            json!({"id": "o-1", "version": 1, "orderNumber": "1001"}),
            json!({"id": "o-2", "version": 5, "orderNumber": "1001"}),
        ]);
        let locator = RemoteOrderLocator::new(directory, MatchPolicy::First);

        let order = locator
            .find_order_by_number(&OrderNumber::from_str("1001").unwrap())
            .await
            .unwrap();
        assert_eq!(order.id, "o-1");
    }

    #[tokio::test]
    async fn test_multiple_results_unique_policy() {
        let directory = FixedDirectory::new(vec![json!({"id": "a"}), json!({"id": "b"})]);
        let locator = RemoteOrderLocator::new(directory, MatchPolicy::Unique);

        let err = locator
            .find_channel_id(&ResourceKey::from_str("OrderXmlFileExport").unwrap())
            .await
            .unwrap_err();
        assert!(matches!(err, OrderSyncError::AmbiguousMatch { count: 2, .. }));
    }
}
