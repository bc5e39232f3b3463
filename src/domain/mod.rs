//! Domain models and types for ordersync.
//!
//! # Overview
//!
//! The domain layer provides:
//! - **Strongly-typed identifiers** ([`OrderNumber`], [`ResourceKey`])
//! - **Remote order model** ([`RemoteOrder`], [`LineItem`], [`ItemState`])
//! - **Sync intent** ([`ExportRow`], [`SyncIntentRecord`])
//! - **Update requests** ([`UpdateAction`], [`OrderUpdateAction`])
//! - **Error types** ([`OrderSyncError`]) and the [`Result`] alias
//!
//! # Type Safety
//!
//! Order numbers and reference keys are distinct newtypes, so a channel key
//! can never be passed where an order number is expected:
//!
//! ```rust
//! use ordersync::domain::{OrderNumber, ResourceKey};
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let number = OrderNumber::new("1001")?;
//! let channel = ResourceKey::new("OrderXmlFileExport")?;
//! # Ok(())
//! # }
//! ```

pub mod actions;
pub mod errors;
pub mod ids;
pub mod order;
pub mod result;
pub mod sync_record;

// Re-export commonly used types for convenience
pub use actions::{OrderUpdateAction, UpdateAction};
pub use errors::OrderSyncError;
pub use ids::{OrderNumber, ResourceKey};
pub use order::{ItemState, LineItem, ReferenceEntity, RemoteOrder, ResourceIdentifier};
pub use result::Result;
pub use sync_record::{ExportRow, SyncInfoEntry, SyncIntentRecord};
