//! Update applier
//!
//! Submits planned updates. Only an explicit 2xx status counts as success;
//! there is no retry.

use crate::adapters::commerce::OrderDirectory;
use crate::domain::{OrderSyncError, RemoteOrder, Result, UpdateAction};
use std::sync::Arc;

/// Outcome of an accepted update
#[derive(Debug, Clone, PartialEq)]
pub struct AppliedUpdate {
    /// HTTP status of the response
    pub status: u16,

    /// Order as returned by the remote system, when the body could be parsed
    pub order: Option<RemoteOrder>,
}

impl AppliedUpdate {
    /// Version reported by the remote system
    pub fn returned_version(&self) -> Option<u64> {
        self.order.as_ref().map(|o| o.version)
    }
}

/// Submits versioned order updates
#[derive(Clone)]
pub struct UpdateApplier {
    directory: Arc<dyn OrderDirectory>,
}

impl UpdateApplier {
    /// Creates an applier over `directory`
    pub fn new(directory: Arc<dyn OrderDirectory>) -> Self {
        Self { directory }
    }

    /// Submits `update` for `order_id`
    ///
    /// # Errors
    ///
    /// `RemoteUpdate` carrying the response message for any non-2xx status,
    /// `Transport` when no response was received.
    pub async fn apply(&self, order_id: &str, update: &UpdateAction) -> Result<AppliedUpdate> {
        let response = self.directory.update_order(order_id, update).await?;

        if !response.is_success() {
            return Err(OrderSyncError::RemoteUpdate {
                status: response.status,
                message: response.message(),
            });
        }

        let order = serde_json::from_value::<RemoteOrder>(response.body).ok();
        Ok(AppliedUpdate {
            status: response.status,
            order,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::commerce::{QueryPage, ResourceKind, UpdateResponse};
    use async_trait::async_trait;
    use serde_json::{json, Value};

    struct StaticResponse(std::result::Result<(u16, Value), String>);

    #[async_trait]
    impl OrderDirectory for StaticResponse {
        async fn find_by_query(&self, _: ResourceKind, _: &str) -> Result<QueryPage> {
            Ok(QueryPage::default())
        }

        async fn update_order(&self, _: &str, _: &UpdateAction) -> Result<UpdateResponse> {
            match &self.0 {
                Ok((status, body)) => Ok(UpdateResponse {
                    status: *status,
                    body: body.clone(),
                }),
                Err(msg) => Err(OrderSyncError::Transport(msg.clone())),
            }
        }
    }

    fn update() -> UpdateAction {
        UpdateAction {
            version: 1,
            actions: vec![],
        }
    }

    #[tokio::test]
    async fn test_success_returns_order() {
        let applier = UpdateApplier::new(Arc::new(StaticResponse(Ok((
            200,
            json!({"id": "o-1", "version": 2}),
        )))));

        let applied = applier.apply("o-1", &update()).await.unwrap();
        assert_eq!(applied.status, 200);
        assert_eq!(applied.returned_version(), Some(2));
    }

    #[tokio::test]
    async fn test_non_success_is_remote_update_error() {
        let applier = UpdateApplier::new(Arc::new(StaticResponse(Ok((
            409,
            json!({"statusCode": 409, "message": "Object has a different version"}),
        )))));

        match applier.apply("o-1", &update()).await.unwrap_err() {
            OrderSyncError::RemoteUpdate { status, message } => {
                assert_eq!(status, 409);
                assert_eq!(message, "Object has a different version");
            }
            other => panic!("expected RemoteUpdate, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_redirect_is_not_success() {
        let applier = UpdateApplier::new(Arc::new(StaticResponse(Ok((304, Value::Null)))));
        assert!(matches!(
            applier.apply("o-1", &update()).await,
            Err(OrderSyncError::RemoteUpdate { status: 304, .. })
        ));
    }

    #[tokio::test]
    async fn test_transport_error_propagates() {
        let applier = UpdateApplier::new(Arc::new(StaticResponse(Err("reset".to_string()))));
        assert!(matches!(
            applier.apply("o-1", &update()).await,
            Err(OrderSyncError::Transport(_))
        ));
    }
}
