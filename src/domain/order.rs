//! Remote order model
//!
//! The shapes the commerce API returns for orders and reference entities.
//! Orders are owned by the remote system: ordersync only reads them and
//! issues versioned update requests against them, it never caches an order
//! across the processing of another one.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Type id of channel references
pub const CHANNEL_TYPE_ID: &str = "channel";

/// Type id of state references
pub const STATE_TYPE_ID: &str = "state";

/// Reference to another remote resource, `{ "typeId": ..., "id": ... }`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceIdentifier {
    /// Resource type (`channel`, `state`, ...)
    pub type_id: String,

    /// Opaque remote id
    pub id: String,
}

impl ResourceIdentifier {
    /// Reference to a channel
    pub fn channel(id: impl Into<String>) -> Self {
        Self {
            type_id: CHANNEL_TYPE_ID.to_string(),
            id: id.into(),
        }
    }

    /// Reference to a state
    pub fn state(id: impl Into<String>) -> Self {
        Self {
            type_id: STATE_TYPE_ID.to_string(),
            id: id.into(),
        }
    }
}

/// A quantity-tagged state assignment on a line item
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemState {
    /// Number of units of the line item currently in this state
    pub quantity: u64,

    /// The state the units are in
    pub state: ResourceIdentifier,
}

/// Product variant details carried by a line item
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Variant {
    /// Stock keeping unit
    #[serde(default)]
    pub sku: Option<String>,
}

/// A line item of an order
///
/// The item's units may be split across several state buckets
/// (e.g. partially shipped), each with its own quantity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineItem {
    /// Line item id, unique within the order
    pub id: String,

    /// Product id
    #[serde(default)]
    pub product_id: Option<String>,

    /// Variant details
    #[serde(default)]
    pub variant: Option<Variant>,

    /// Total ordered quantity
    #[serde(default)]
    pub quantity: u64,

    /// State buckets, in the order the remote system reports them
    #[serde(default)]
    pub state: Vec<ItemState>,
}

impl LineItem {
    /// SKU of the ordered variant, if known
    pub fn sku(&self) -> Option<&str> {
        self.variant.as_ref().and_then(|v| v.sku.as_deref())
    }
}

/// Monetary amount
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Money {
    /// ISO 4217 currency code
    pub currency_code: String,

    /// Amount in the smallest currency unit
    pub cent_amount: i64,
}

/// Shipping details of an order
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShippingInfo {
    /// Name of the selected shipping method
    #[serde(default)]
    pub shipping_method_name: Option<String>,
}

/// An order as stored by the remote system of record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteOrder {
    /// Remote internal id
    pub id: String,

    /// Optimistic concurrency version, incremented by every accepted update
    pub version: u64,

    /// Business-facing order number
    #[serde(default)]
    pub order_number: Option<String>,

    /// Line items
    #[serde(default)]
    pub line_items: Vec<LineItem>,

    /// Creation timestamp
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,

    /// Customer email
    #[serde(default)]
    pub customer_email: Option<String>,

    /// Order state (Open, Confirmed, ...)
    #[serde(default)]
    pub order_state: Option<String>,

    /// Shipment state
    #[serde(default)]
    pub shipment_state: Option<String>,

    /// Payment state
    #[serde(default)]
    pub payment_state: Option<String>,

    /// Total price
    #[serde(default)]
    pub total_price: Option<Money>,

    /// Shipping details
    #[serde(default)]
    pub shipping_info: Option<ShippingInfo>,
}

/// A remote reference entity (channel or state) addressed by key
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReferenceEntity {
    /// Remote internal id
    pub id: String,

    /// Stable key
    #[serde(default)]
    pub key: Option<String>,
}
