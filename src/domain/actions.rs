//! Update requests sent to the remote order API
//!
//! Every request carries the version it expects to replace. The remote
//! system rejects a stale version atomically, with no partial effect.

use crate::domain::order::ResourceIdentifier;
use serde::{Deserialize, Serialize};

/// A single update action
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "camelCase")]
pub enum OrderUpdateAction {
    /// Records that the order was exported through a channel
    #[serde(rename_all = "camelCase")]
    UpdateSyncInfo {
        /// Channel the order was synced to
        channel: ResourceIdentifier,

        /// Location of the export file, when known
        #[serde(default, skip_serializing_if = "Option::is_none")]
        external_id: Option<String>,
    },

    /// Moves `quantity` units of a line item from one state to another
    #[serde(rename_all = "camelCase")]
    TransitionLineItemState {
        /// Line item being transitioned
        line_item_id: String,

        /// Units to move, copied from the source state bucket
        quantity: u64,

        /// State the units currently are in
        from_state: ResourceIdentifier,

        /// Target state
        to_state: ResourceIdentifier,
    },
}

/// A versioned update request, `{ "version": n, "actions": [...] }`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateAction {
    /// Version of the order the actions apply to
    pub version: u64,

    /// Actions, applied in order
    pub actions: Vec<OrderUpdateAction>,
}

impl UpdateAction {
    /// Number of actions in the request
    pub fn len(&self) -> usize {
        self.actions.len()
    }

    /// True if the request carries no actions
    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }
}
